//! # Standards Retrieval
//!
//! Hybrid retrieval over the standards knowledge graph: lexical term
//! matching fused with an external vector-similarity signal, optionally
//! refined by a reranking pass.
//!
//! ```text
//! ComponentProfile
//!     │
//!     ├──> query text ─────────> Semantic Provider (external, optional)
//!     ├──> term set ───────────> Lexical Matcher (graph scan)
//!     │
//!     └──> Fusion (0.6/0.4 + agreement bonus)
//!            ├─ confidence filter + deterministic ordering
//!            ├─ Reranker (external, optional, full survivor list)
//!            └─ truncate to max_results
//! ```
//!
//! Both external collaborators degrade gracefully: a failed provider call
//! drops to lexical-only retrieval, a failed rerank keeps the fused order.

mod engine;
mod error;
mod expansion;
mod fusion;
mod lexical;
mod profile;
mod provider;

pub use engine::{
    EngineConfig, HybridRetrievalEngine, RankedResult, RetrievalMetadata, RetrievalOutcome,
};
pub use error::{Result, RetrievalError};
pub use expansion::expand_categories;
pub use fusion::FusionWeights;
pub use lexical::{LexicalMatch, LexicalMatcher};
pub use profile::ComponentProfile;
pub use provider::{Reranker, SemanticHit, SemanticProvider};
