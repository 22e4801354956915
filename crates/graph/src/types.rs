use serde::{Deserialize, Serialize};
use standards_document::{ContentBlock, Figure, References, RequirementType, Table};
use std::time::{SystemTime, UNIX_EPOCH};

/// Node in the knowledge graph, tagged by entity kind.
///
/// The node's graph id is kept by the store, not repeated here: a Standard
/// is keyed by its `document_id`, a Clause by its `chunk_id`, a Requirement
/// by its `requirement_id`, and an ExternalStandard by `"EXT::{name}"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node_type")]
pub enum GraphNode {
    Standard {
        document_id: String,
        title: String,
    },
    Clause(ClauseNode),
    Requirement(RequirementNode),
    ExternalStandard {
        standard_name: String,
    },
}

impl GraphNode {
    pub fn kind(&self) -> NodeKind {
        match self {
            GraphNode::Standard { .. } => NodeKind::Standard,
            GraphNode::Clause(_) => NodeKind::Clause,
            GraphNode::Requirement(_) => NodeKind::Requirement,
            GraphNode::ExternalStandard { .. } => NodeKind::ExternalStandard,
        }
    }

    pub fn as_clause(&self) -> Option<&ClauseNode> {
        match self {
            GraphNode::Clause(clause) => Some(clause),
            _ => None,
        }
    }

    pub fn as_requirement(&self) -> Option<&RequirementNode> {
        match self {
            GraphNode::Requirement(req) => Some(req),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Standard,
    Clause,
    Requirement,
    ExternalStandard,
}

/// A structural unit of a standards document (section/subsection).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClauseNode {
    pub chunk_id: String,
    pub document_id: String,
    pub clause_id: String,
    pub title: String,
    pub parent_id: Option<String>,
    pub children_ids: Vec<String>,
    pub text_blocks: Vec<ContentBlock>,
    pub tables: Vec<Table>,
    pub figures: Vec<Figure>,
    pub references: References,
    /// Provenance key of the source file this clause was ingested from.
    pub source_file: String,
    /// Number of dot-separated segments in `clause_id`; 0 for unplaced
    /// clauses (empty id or "misc").
    pub depth: usize,
}

/// An atomic testable obligation extracted from a clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementNode {
    /// `"{parent_clause}::req_{index}"` — deterministic across re-ingestion
    /// of the same file, since index is the zero-based position in the
    /// source clause's requirement list.
    pub requirement_id: String,
    pub parent_clause: String,
    pub requirement_type: RequirementType,
    pub keyword: String,
    pub text: String,
}

/// Relationship between two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgeType {
    /// Standard → Clause
    ContainsClause,
    /// Clause → Requirement
    ContainsRequirement,
    /// Clause → Clause, from the child's `parent_id`
    ParentOf,
    /// Clause → Clause, derived from a shared parent's `children_ids`
    SiblingOf,
    /// Clause → Clause, resolved internal cross-reference
    References,
    /// Clause → ExternalStandard
    CitesStandard,
}

/// How an edge was derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkingMethod {
    /// From document hierarchy, independent of clause text.
    Structural,
    /// From explicit citations inside clause text.
    Reference,
}

/// Edge payload. At most one edge of a given type exists per ordered node
/// pair; edges of different types may coexist between the same pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub edge_type: EdgeType,
    pub linking_method: LinkingMethod,
    pub confidence: f32,
    pub created_at_unix_ms: u64,
}

impl GraphEdge {
    pub fn structural(edge_type: EdgeType) -> Self {
        Self {
            edge_type,
            linking_method: LinkingMethod::Structural,
            confidence: 1.0,
            created_at_unix_ms: now_unix_ms(),
        }
    }

    pub fn reference(edge_type: EdgeType) -> Self {
        Self {
            edge_type,
            linking_method: LinkingMethod::Reference,
            confidence: 1.0,
            created_at_unix_ms: now_unix_ms(),
        }
    }
}

pub(crate) fn now_unix_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Per-kind node counts plus totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStatistics {
    pub nodes: usize,
    pub edges: usize,
    pub standards: usize,
    pub clauses: usize,
    pub requirements: usize,
    pub external_standards: usize,
}

/// Outcome of one builder pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildResult {
    pub nodes_total: usize,
    pub edges_total: usize,
    pub standards: usize,
    pub clauses: usize,
    pub requirements: usize,
    pub checksum: String,
    /// Number of source files ingested by this pass. Zero means the
    /// directory held nothing new and the graph is unchanged.
    pub new_files_processed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_type_serializes_screaming_snake() {
        let json = serde_json::to_string(&EdgeType::ContainsClause).unwrap();
        assert_eq!(json, "\"CONTAINS_CLAUSE\"");

        let json = serde_json::to_string(&EdgeType::CitesStandard).unwrap();
        assert_eq!(json, "\"CITES_STANDARD\"");
    }

    #[test]
    fn node_tag_round_trips() {
        let node = GraphNode::ExternalStandard {
            standard_name: "ISO 16750-3".to_string(),
        };
        let json = serde_json::to_string(&node).unwrap();
        assert!(json.contains("\"node_type\":\"ExternalStandard\""));

        let back: GraphNode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, node);
    }
}
