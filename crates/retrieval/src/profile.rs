use crate::expansion::expand_categories;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Description of the component a test plan is being generated for.
///
/// Drives both retrieval signals: the natural-language query text handed to
/// the semantic provider, and the term set scanned against requirement text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentProfile {
    #[serde(default)]
    pub name: String,

    #[serde(rename = "type", default)]
    pub component_type: String,

    #[serde(default)]
    pub application: String,

    #[serde(default)]
    pub test_level: String,

    #[serde(default)]
    pub test_categories: Vec<String>,

    /// Free-form key/value specifications (voltage, mass, mounting, ...).
    /// Ordered map so the derived query text is deterministic.
    #[serde(default)]
    pub specifications: BTreeMap<String, String>,
}

impl ComponentProfile {
    /// Natural-language query for the semantic provider.
    pub fn query_text(&self) -> String {
        let mut text = format!(
            "Test requirements for {} used in {} application. ",
            self.component_type, self.application
        );
        text.push_str(&format!("Test level: {}. ", self.test_level));
        text.push_str(&format!("Categories: {}. ", self.test_categories.join(", ")));
        if !self.specifications.is_empty() {
            let specs: Vec<String> = self
                .specifications
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect();
            text.push_str(&format!("Specs: {}", specs.join(", ")));
        }
        text
    }

    /// Lower-cased, deduplicated term set for the lexical matcher: words
    /// from the component type and application, category names, and the
    /// static category keyword expansion. Tokens of length <= 2 are
    /// dropped; the result is sorted for deterministic scan order.
    pub fn search_terms(&self) -> Vec<String> {
        let mut terms: BTreeSet<String> = BTreeSet::new();

        for word in self.component_type.split_whitespace() {
            terms.insert(word.to_lowercase());
        }
        for word in self.application.split_whitespace() {
            terms.insert(word.to_lowercase());
        }
        for category in &self.test_categories {
            terms.insert(category.to_lowercase());
            for keyword in expand_categories(category) {
                terms.insert((*keyword).to_string());
            }
        }

        // Length is counted in characters, not bytes, so multi-byte
        // tokens like "°c" are still dropped.
        terms.retain(|term| term.chars().count() > 2);
        terms.into_iter().collect()
    }
}
