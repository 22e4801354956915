//! # Standards Graph
//!
//! Typed, multi-relation knowledge graph over standards documents.
//!
//! ## Architecture
//!
//! ```text
//! ClauseDocument[] (JSON files)
//!     │
//!     ├──> Graph Builder (incremental ingestion)
//!     │      ├─ Node pass: Standard / Clause / Requirement nodes
//!     │      ├─ Structural pass: PARENT_OF / SIBLING_OF edges
//!     │      └─ Reference pass: REFERENCES / CITES_STANDARD edges
//!     │
//!     └──> Knowledge Graph (petgraph)
//!            ├─ Nodes: Standard, Clause, Requirement, ExternalStandard
//!            ├─ Edges: typed, at most one per (src, dst, type) triple
//!            ├─ Checksum: coarse structural fingerprint
//!            └─ Snapshot: serde round-trip with processed-file set
//! ```
//!
//! The builder is the only writer; retrieval layers hold `&KnowledgeGraph`
//! and never mutate it. Callers serialize builds against queries (a single
//! write lock around `build_from_directory` is sufficient).

mod builder;
mod error;
mod snapshot;
mod store;
mod types;

pub use builder::{clause_depth, GraphBuilder};
pub use error::{GraphError, Result};
pub use snapshot::GraphSnapshot;
pub use store::KnowledgeGraph;
pub use types::{
    BuildResult, ClauseNode, EdgeType, GraphEdge, GraphNode, GraphStatistics, LinkingMethod,
    NodeKind, RequirementNode,
};
