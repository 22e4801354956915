use crate::error::{Result, RetrievalError};
use crate::fusion::FusionWeights;
use crate::lexical::LexicalMatcher;
use crate::profile::ComponentProfile;
use crate::provider::{Reranker, SemanticProvider};
use serde::{Deserialize, Serialize};
use standards_document::RequirementType;
use standards_graph::{KnowledgeGraph, NodeKind};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::timeout;

/// Engine tuning knobs. The fusion weights and lexical constants are
/// empirical values inherited from evaluation runs; see `FusionWeights`.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub weights: FusionWeights,
    pub lexical: LexicalMatcher,
    /// Bound on each external collaborator call.
    pub collaborator_timeout: Duration,
    /// Minimum semantic candidate pool requested from the provider,
    /// regardless of `max_results`.
    pub semantic_pool_floor: usize,
    pub enable_reranking: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            weights: FusionWeights::default(),
            lexical: LexicalMatcher::default(),
            collaborator_timeout: Duration::from_secs(10),
            semantic_pool_floor: 100,
            enable_reranking: true,
        }
    }
}

/// One ranked requirement, carrying enough of the node's payload that
/// downstream generation stages need no second graph lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    pub node_id: String,
    pub requirement_type: RequirementType,
    pub keyword: String,
    pub text: String,
    pub parent_clause: String,
    pub semantic_score: f32,
    pub keyword_score: f32,
    /// Fused score, rounded to 3 decimals.
    pub final_score: f32,
    pub matched_terms: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalMetadata {
    pub search_terms: Vec<String>,
    pub requirements_scanned: usize,
    /// Confidence-surviving candidates before truncation.
    pub candidates_found: usize,
    pub semantic_hits: usize,
    pub reranked: bool,
    pub min_confidence: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalOutcome {
    pub results: Vec<RankedResult>,
    pub metadata: RetrievalMetadata,
}

/// Hybrid retrieval over the knowledge graph.
///
/// Holds the graph behind a read/write lock: queries take the read guard
/// for the requirement scan, a builder pass takes the write guard. The two
/// external collaborators are optional; the engine degrades to lexical-only
/// retrieval without a provider and to fused order without a reranker.
pub struct HybridRetrievalEngine {
    graph: Arc<RwLock<KnowledgeGraph>>,
    provider: Option<Arc<dyn SemanticProvider>>,
    reranker: Option<Arc<dyn Reranker>>,
    config: EngineConfig,
}

impl HybridRetrievalEngine {
    pub fn new(graph: Arc<RwLock<KnowledgeGraph>>) -> Self {
        Self {
            graph,
            provider: None,
            reranker: None,
            config: EngineConfig::default(),
        }
    }

    pub fn with_provider(mut self, provider: Arc<dyn SemanticProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_reranker(mut self, reranker: Arc<dyn Reranker>) -> Self {
        self.reranker = Some(reranker);
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Rank requirements relevant to `profile`.
    ///
    /// Results are filtered to `min_confidence`, ordered by fused score
    /// descending with node-id ascending tie-breaks, optionally reranked,
    /// and truncated to `max_results`.
    pub async fn query(
        &self,
        profile: &ComponentProfile,
        min_confidence: f32,
        max_results: usize,
    ) -> Result<RetrievalOutcome> {
        if max_results == 0 {
            return Err(RetrievalError::InvalidLimit);
        }
        if !(0.0..=1.0).contains(&min_confidence) {
            return Err(RetrievalError::InvalidThreshold(min_confidence));
        }

        let search_terms = profile.search_terms();
        if search_terms.is_empty() {
            return Err(RetrievalError::EmptyProfile);
        }

        let query_text = profile.query_text();
        log::debug!("Query text: {query_text}");
        log::debug!("Search terms: {search_terms:?}");

        let semantic_scores = self.semantic_candidates(&query_text, max_results).await;
        let semantic_hits = semantic_scores.len();

        let graph = self.graph.read().await;
        let (mut candidates, requirements_scanned) =
            self.collect_candidates(&graph, &search_terms, &semantic_scores);
        drop(graph);

        // Fuse, filter, and order deterministically.
        for candidate in candidates.values_mut() {
            let fused = self
                .config
                .weights
                .fuse(candidate.semantic_score, candidate.keyword_score);
            candidate.final_score = round3(fused);
        }

        let mut survivors: Vec<RankedResult> = candidates
            .into_values()
            .filter(|c| c.final_score >= min_confidence)
            .collect();
        survivors.sort_by(|a, b| {
            b.final_score
                .partial_cmp(&a.final_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.node_id.cmp(&b.node_id))
        });

        let candidates_found = survivors.len();
        let reranked = self.apply_rerank(&query_text, &mut survivors).await;

        survivors.truncate(max_results);

        log::info!(
            "Retrieval complete: {} results ({} candidates, {} semantic hits, reranked: {})",
            survivors.len(),
            candidates_found,
            semantic_hits,
            reranked
        );

        Ok(RetrievalOutcome {
            results: survivors,
            metadata: RetrievalMetadata {
                search_terms,
                requirements_scanned,
                candidates_found,
                semantic_hits,
                reranked,
                min_confidence,
            },
        })
    }

    /// Call the semantic provider, degrading to an empty candidate map on
    /// any failure or timeout.
    async fn semantic_candidates(&self, query_text: &str, max_results: usize) -> HashMap<String, f32> {
        let Some(provider) = &self.provider else {
            log::debug!("No semantic provider configured; lexical-only retrieval");
            return HashMap::new();
        };

        let pool = self.config.semantic_pool_floor.max(max_results * 2);
        let call = provider.similar_requirements(query_text, pool);

        match timeout(self.config.collaborator_timeout, call).await {
            Ok(Ok(hits)) => hits
                .into_iter()
                .map(|hit| (hit.node_id, hit.similarity.clamp(0.0, 1.0)))
                .collect(),
            Ok(Err(e)) => {
                log::warn!("Semantic provider failed, continuing lexical-only: {e}");
                HashMap::new()
            }
            Err(_) => {
                log::warn!(
                    "Semantic provider timed out after {:?}, continuing lexical-only",
                    self.config.collaborator_timeout
                );
                HashMap::new()
            }
        }
    }

    /// Full scan over Requirement nodes, merging lexical matches with the
    /// semantic candidate map into one record per node id.
    ///
    /// The scan is linear in the requirement count, which is acceptable to
    /// roughly 10^4 requirement nodes; larger graphs want an inverted index
    /// in place of the scan, with unchanged score semantics.
    fn collect_candidates(
        &self,
        graph: &KnowledgeGraph,
        search_terms: &[String],
        semantic_scores: &HashMap<String, f32>,
    ) -> (HashMap<String, RankedResult>, usize) {
        let mut candidates: HashMap<String, RankedResult> = HashMap::new();
        let mut scanned = 0usize;

        for (node_id, node) in graph.nodes_by_kind(NodeKind::Requirement) {
            let Some(requirement) = node.as_requirement() else {
                continue;
            };
            scanned += 1;

            let text = requirement.text.to_lowercase();
            let lexical = self.config.lexical.score(
                search_terms,
                &text,
                requirement.requirement_type.is_mandatory(),
            );
            let semantic = semantic_scores.get(node_id).copied();

            if lexical.is_none() && semantic.is_none() {
                continue;
            }

            let (keyword_score, matched_terms) = lexical
                .map(|hit| (hit.score, hit.matched_terms))
                .unwrap_or((0.0, Vec::new()));

            candidates.insert(
                node_id.to_string(),
                RankedResult {
                    node_id: node_id.to_string(),
                    requirement_type: requirement.requirement_type,
                    keyword: requirement.keyword.clone(),
                    text: requirement.text.clone(),
                    parent_clause: requirement.parent_clause.clone(),
                    semantic_score: semantic.unwrap_or(0.0),
                    keyword_score,
                    final_score: 0.0,
                    matched_terms,
                },
            );
        }

        (candidates, scanned)
    }

    /// Submit the entire survivor list to the reranker and apply its
    /// ordering. Returns whether reranking was applied; any failure keeps
    /// the fused order.
    async fn apply_rerank(&self, query_text: &str, survivors: &mut Vec<RankedResult>) -> bool {
        if !self.config.enable_reranking || survivors.is_empty() {
            return false;
        }
        let Some(reranker) = &self.reranker else {
            return false;
        };

        let texts: Vec<String> = survivors.iter().map(|r| r.text.clone()).collect();
        let call = reranker.rerank(query_text, &texts);

        let order = match timeout(self.config.collaborator_timeout, call).await {
            Ok(Ok(order)) => order,
            Ok(Err(e)) => {
                log::warn!("Reranker failed, keeping fused order: {e}");
                return false;
            }
            Err(_) => {
                log::warn!(
                    "Reranker timed out after {:?}, keeping fused order",
                    self.config.collaborator_timeout
                );
                return false;
            }
        };

        if !is_permutation(&order, survivors.len()) {
            log::warn!(
                "Reranker returned an invalid ordering ({} indices for {} candidates), keeping fused order",
                order.len(),
                survivors.len()
            );
            return false;
        }

        let mut reordered = Vec::with_capacity(survivors.len());
        for idx in order {
            reordered.push(survivors[idx].clone());
        }
        *survivors = reordered;
        true
    }
}

fn is_permutation(order: &[usize], len: usize) -> bool {
    if order.len() != len {
        return false;
    }
    let mut seen = vec![false; len];
    for &idx in order {
        if idx >= len || seen[idx] {
            return false;
        }
        seen[idx] = true;
    }
    true
}

fn round3(value: f32) -> f32 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round3_truncates_noise() {
        assert_eq!(round3(0.123456), 0.123);
        assert_eq!(round3(0.9996), 1.0);
    }

    #[test]
    fn permutation_check_rejects_bad_orders() {
        assert!(is_permutation(&[2, 0, 1], 3));
        assert!(!is_permutation(&[0, 0, 1], 3));
        assert!(!is_permutation(&[0, 3, 1], 3));
        assert!(!is_permutation(&[0, 1], 3));
        assert!(is_permutation(&[], 0));
    }
}
