use crate::error::Result;
use crate::store::KnowledgeGraph;
use crate::types::{GraphEdge, GraphNode};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

/// Serialized form of the knowledge graph: node list, edge list, and the
/// ingestion bookkeeping needed to resume incremental builds.
///
/// The format is an implementation choice, not a compatibility contract;
/// `schema_version` guards against silent drift.
#[derive(Debug, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub schema_version: u32,
    pub nodes: Vec<SnapshotNode>,
    pub edges: Vec<SnapshotEdge>,
    pub processed_files: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated_unix_ms: Option<u64>,
    pub checksum: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SnapshotNode {
    pub id: String,
    #[serde(flatten)]
    pub node: GraphNode,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SnapshotEdge {
    pub source: String,
    pub target: String,
    #[serde(flatten)]
    pub edge: GraphEdge,
}

impl GraphSnapshot {
    pub fn capture(graph: &KnowledgeGraph) -> Self {
        let mut nodes: Vec<SnapshotNode> = graph
            .nodes()
            .map(|(id, node)| SnapshotNode {
                id: id.to_string(),
                node: node.clone(),
            })
            .collect();
        nodes.sort_by(|a, b| a.id.cmp(&b.id));

        let mut edges: Vec<SnapshotEdge> = graph
            .edges()
            .map(|(source, target, edge)| SnapshotEdge {
                source: source.to_string(),
                target: target.to_string(),
                edge: edge.clone(),
            })
            .collect();
        edges.sort_by(|a, b| {
            (a.source.as_str(), a.target.as_str(), a.edge.edge_type)
                .cmp(&(b.source.as_str(), b.target.as_str(), b.edge.edge_type))
        });

        Self {
            schema_version: SNAPSHOT_SCHEMA_VERSION,
            nodes,
            edges,
            processed_files: graph.processed_files().iter().cloned().collect(),
            last_updated_unix_ms: graph.last_updated_unix_ms(),
            checksum: graph.checksum(),
        }
    }

    pub fn restore(self) -> KnowledgeGraph {
        let mut graph = KnowledgeGraph::new();
        for SnapshotNode { id, node } in self.nodes {
            graph.add_node(id, node);
        }
        for SnapshotEdge {
            source,
            target,
            edge,
        } in self.edges
        {
            graph.add_edge(&source, &target, edge);
        }
        graph.restore_processed(self.processed_files);
        graph.set_last_updated(self.last_updated_unix_ms);
        graph
    }
}

impl KnowledgeGraph {
    /// Persist the graph as a JSON snapshot.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let snapshot = GraphSnapshot::capture(self);
        let payload = serde_json::to_vec_pretty(&snapshot)?;
        fs::write(path, payload)?;
        log::info!(
            "Graph saved to {} ({} nodes, {} edges)",
            path.display(),
            snapshot.nodes.len(),
            snapshot.edges.len()
        );
        Ok(())
    }

    /// Load a graph from a JSON snapshot, resuming incremental ingestion
    /// semantics: files recorded as processed stay processed.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let snapshot: GraphSnapshot = serde_json::from_str(&raw)?;
        let graph = snapshot.restore();
        log::info!(
            "Graph loaded from {}: {} nodes, {} edges",
            path.display(),
            graph.node_count(),
            graph.edge_count()
        );
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EdgeType, RequirementNode};
    use pretty_assertions::assert_eq;
    use standards_document::RequirementType;

    fn sample_graph() -> KnowledgeGraph {
        let mut graph = KnowledgeGraph::new();
        graph.add_node(
            "STD-1",
            GraphNode::Standard {
                document_id: "STD-1".to_string(),
                title: "STD-1".to_string(),
            },
        );
        graph.add_node(
            "c1::req_0",
            GraphNode::Requirement(RequirementNode {
                requirement_id: "c1::req_0".to_string(),
                parent_clause: "c1".to_string(),
                requirement_type: RequirementType::Mandatory,
                keyword: "shall".to_string(),
                text: "shall hold".to_string(),
            }),
        );
        graph.add_edge(
            "STD-1",
            "c1::req_0",
            GraphEdge::structural(EdgeType::ContainsRequirement),
        );
        graph.restore_processed(["docs/c1.json".to_string()]);
        graph
    }

    #[test]
    fn snapshot_round_trip_preserves_structure() {
        let graph = sample_graph();
        let restored = GraphSnapshot::capture(&graph).restore();

        assert_eq!(restored.node_count(), graph.node_count());
        assert_eq!(restored.edge_count(), graph.edge_count());
        assert_eq!(restored.checksum(), graph.checksum());
        assert!(restored.is_processed("docs/c1.json"));
        assert!(restored.has_edge("STD-1", "c1::req_0", EdgeType::ContainsRequirement));
    }

    #[test]
    fn snapshot_survives_disk_round_trip() {
        let graph = sample_graph();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.json");

        graph.save(&path).unwrap();
        let restored = KnowledgeGraph::load(&path).unwrap();

        assert_eq!(restored.checksum(), graph.checksum());
        assert_eq!(
            restored.processed_files().iter().cloned().collect::<Vec<_>>(),
            vec!["docs/c1.json".to_string()]
        );
    }
}
