/// Lexical scorer for requirement text against a query term set.
///
/// Terms match as substrings of the lower-cased text. The raw match count
/// is normalized against a fixed denominator: with the default of 6.0, six
/// or more distinct term hits saturate the score at 1.0. Mandatory
/// requirements get a configurable boost, capped again at 1.0.
///
/// Both constants are empirical tuning values, kept configurable rather
/// than treated as invariants.
#[derive(Debug, Clone)]
pub struct LexicalMatcher {
    denominator: f32,
    mandatory_boost: f32,
}

pub const DEFAULT_DENOMINATOR: f32 = 6.0;
pub const DEFAULT_MANDATORY_BOOST: f32 = 1.2;

#[derive(Debug, Clone, PartialEq)]
pub struct LexicalMatch {
    pub score: f32,
    pub matched_terms: Vec<String>,
}

impl LexicalMatcher {
    pub fn new(denominator: f32, mandatory_boost: f32) -> Self {
        Self {
            denominator,
            mandatory_boost,
        }
    }

    /// Score `text` (already lower-cased) against the term set (already
    /// lower-cased and deduplicated). Returns `None` when no term matches:
    /// zero-match requirements are excluded from lexical candidates.
    pub fn score(&self, terms: &[String], text: &str, mandatory: bool) -> Option<LexicalMatch> {
        if text.is_empty() {
            return None;
        }

        let matched_terms: Vec<String> = terms
            .iter()
            .filter(|term| text.contains(term.as_str()))
            .cloned()
            .collect();

        if matched_terms.is_empty() {
            return None;
        }

        let mut score = (matched_terms.len() as f32 / self.denominator).min(1.0);
        if mandatory {
            score = (score * self.mandatory_boost).min(1.0);
        }

        Some(LexicalMatch {
            score,
            matched_terms,
        })
    }
}

impl Default for LexicalMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_DENOMINATOR, DEFAULT_MANDATORY_BOOST)
    }
}
