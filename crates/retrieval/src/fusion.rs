use serde::{Deserialize, Serialize};

/// Weights for merging the semantic and lexical signals into one score.
///
/// The defaults assert that corroborated evidence from two independent
/// signals is more trustworthy than either alone, and that a signal's
/// absence should discount, not zero, the other signal's confidence.
/// They are empirical tuning values with no stated derivation; treat them
/// as configuration, not invariants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FusionWeights {
    /// Semantic share when both signals are present.
    pub semantic: f32,
    /// Keyword share when both signals are present.
    pub keyword: f32,
    /// Bonus for agreement between both signals.
    pub agreement_bonus: f32,
    /// Discount applied when only the semantic signal is present.
    pub semantic_only: f32,
    /// Discount applied when only the keyword signal is present.
    pub keyword_only: f32,
}

impl FusionWeights {
    /// Fuse the two signals. A score of 0.0 means "absent". The result is
    /// capped at 1.0; two absent signals fuse to 0.0.
    pub fn fuse(&self, semantic_score: f32, keyword_score: f32) -> f32 {
        let fused = if semantic_score > 0.0 && keyword_score > 0.0 {
            self.semantic * semantic_score + self.keyword * keyword_score + self.agreement_bonus
        } else if semantic_score > 0.0 {
            self.semantic_only * semantic_score
        } else if keyword_score > 0.0 {
            self.keyword_only * keyword_score
        } else {
            0.0
        };

        fused.min(1.0)
    }
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            semantic: 0.6,
            keyword: 0.4,
            agreement_bonus: 0.1,
            semantic_only: 0.9,
            keyword_only: 0.8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_signals_get_weighted_sum_plus_bonus() {
        let weights = FusionWeights::default();
        let fused = weights.fuse(0.5, 0.5);
        assert!((fused - (0.6 * 0.5 + 0.4 * 0.5 + 0.1)).abs() < 1e-6);
    }

    #[test]
    fn lone_signals_are_discounted_not_zeroed() {
        let weights = FusionWeights::default();
        assert!((weights.fuse(0.5, 0.0) - 0.45).abs() < 1e-6);
        assert!((weights.fuse(0.0, 0.5) - 0.4).abs() < 1e-6);
        assert_eq!(weights.fuse(0.0, 0.0), 0.0);
    }

    #[test]
    fn fused_score_is_capped() {
        let weights = FusionWeights::default();
        assert_eq!(weights.fuse(1.0, 1.0), 1.0);
    }

    // Monotone for present signals. A score of exactly 0.0 means the
    // signal is absent and switches the formula branch, so the sweep
    // starts just above zero.
    #[test]
    fn fusion_is_monotone_in_each_signal() {
        let weights = FusionWeights::default();
        let fixed_steps: Vec<f32> = (0..=10).map(|i| i as f32 / 10.0).collect();
        let moving_steps: Vec<f32> = (1..=20).map(|i| i as f32 / 20.0).collect();

        for &fixed in &fixed_steps {
            let mut previous = f32::MIN;
            for &semantic in &moving_steps {
                let fused = weights.fuse(semantic, fixed);
                assert!(fused >= previous - 1e-6, "semantic={semantic} fixed={fixed}");
                previous = fused;
            }

            let mut previous = f32::MIN;
            for &keyword in &moving_steps {
                let fused = weights.fuse(fixed, keyword);
                assert!(fused >= previous - 1e-6, "keyword={keyword} fixed={fixed}");
                previous = fused;
            }
        }
    }
}
