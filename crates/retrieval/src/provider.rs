use async_trait::async_trait;

/// One candidate returned by a semantic provider.
#[derive(Debug, Clone, PartialEq)]
pub struct SemanticHit {
    /// Requirement node id in the knowledge graph.
    pub node_id: String,
    /// Similarity in [0, 1]; values outside the range are clamped by the
    /// engine.
    pub similarity: f32,
}

/// External vector-similarity collaborator.
///
/// The engine treats this as an opaque capability: given text, return an
/// ordered list of (id, similarity) pairs. How embeddings are computed or
/// persisted is out of scope. Calls run under a bounded timeout; failures
/// degrade retrieval to lexical-only.
#[async_trait]
pub trait SemanticProvider: Send + Sync {
    async fn similar_requirements(
        &self,
        query: &str,
        limit: usize,
    ) -> anyhow::Result<Vec<SemanticHit>>;
}

/// External reranking collaborator, typically a cross-encoder.
///
/// Receives the full confidence-surviving candidate list (not a truncated
/// top-K) and returns a total order over it as indices into `candidates`.
/// Failures or invalid permutations fall back to the fused order.
#[async_trait]
pub trait Reranker: Send + Sync {
    async fn rerank(&self, query: &str, candidates: &[String]) -> anyhow::Result<Vec<usize>>;
}
