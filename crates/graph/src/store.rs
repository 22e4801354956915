use crate::types::{now_unix_ms, EdgeType, GraphEdge, GraphNode, GraphStatistics, NodeKind};
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::{BTreeSet, HashMap, HashSet};

/// In-memory knowledge graph over standards documents.
///
/// Node ids are globally unique strings; the petgraph structure is wrapped
/// so that all access goes through the id index. Only the builder mutates
/// the graph; nodes and edges are never deleted in normal operation.
pub struct KnowledgeGraph {
    graph: DiGraph<GraphNode, GraphEdge>,
    /// Node id -> petgraph index, for O(1) lookup.
    node_index: HashMap<String, NodeIndex>,
    /// Uniqueness guard: one edge per (src, dst, type) triple.
    edge_keys: HashSet<(NodeIndex, NodeIndex, EdgeType)>,
    /// Provenance keys of source files already ingested. Monotonically
    /// non-decreasing, also across snapshot reload.
    processed_files: BTreeSet<String>,
    last_updated_unix_ms: Option<u64>,
}

impl KnowledgeGraph {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_index: HashMap::new(),
            edge_keys: HashSet::new(),
            processed_files: BTreeSet::new(),
            last_updated_unix_ms: None,
        }
    }

    /// Insert a node, or overwrite the attributes of an existing id.
    pub fn add_node(&mut self, id: impl Into<String>, node: GraphNode) -> NodeIndex {
        let id = id.into();
        match self.node_index.get(&id) {
            Some(&idx) => {
                self.graph[idx] = node;
                idx
            }
            None => {
                let idx = self.graph.add_node(node);
                self.node_index.insert(id, idx);
                idx
            }
        }
    }

    /// Add an edge between two existing nodes, at most once per
    /// `(src, dst, type)` triple.
    ///
    /// Returns `true` if the edge was inserted. A missing endpoint or an
    /// already-present triple is a no-op, matching the builder's policy of
    /// silently skipping unresolved references.
    pub fn add_edge(&mut self, src: &str, dst: &str, edge: GraphEdge) -> bool {
        let (Some(&src_idx), Some(&dst_idx)) =
            (self.node_index.get(src), self.node_index.get(dst))
        else {
            log::debug!(
                "Skipping {:?} edge {} -> {}: endpoint missing",
                edge.edge_type,
                src,
                dst
            );
            return false;
        };

        if !self.edge_keys.insert((src_idx, dst_idx, edge.edge_type)) {
            return false;
        }

        self.graph.add_edge(src_idx, dst_idx, edge);
        true
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }

    pub fn has_edge(&self, src: &str, dst: &str, edge_type: EdgeType) -> bool {
        match (self.node_index.get(src), self.node_index.get(dst)) {
            (Some(&src_idx), Some(&dst_idx)) => {
                self.edge_keys.contains(&(src_idx, dst_idx, edge_type))
            }
            _ => false,
        }
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.node_index.get(id).map(|&idx| &self.graph[idx])
    }

    /// Iterate over all `(id, node)` pairs. Iteration order is unspecified.
    pub fn nodes(&self) -> impl Iterator<Item = (&str, &GraphNode)> {
        self.node_index
            .iter()
            .map(|(id, &idx)| (id.as_str(), &self.graph[idx]))
    }

    /// Restartable iterator over nodes of one kind.
    pub fn nodes_by_kind(&self, kind: NodeKind) -> impl Iterator<Item = (&str, &GraphNode)> {
        self.nodes().filter(move |(_, node)| node.kind() == kind)
    }

    /// Iterate over all edges as `(src_id, dst_id, edge)` triples.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str, &GraphEdge)> {
        let index_to_id: HashMap<NodeIndex, &str> = self
            .node_index
            .iter()
            .map(|(id, &idx)| (idx, id.as_str()))
            .collect();

        self.graph.edge_indices().filter_map(move |edge_idx| {
            let (src, dst) = self.graph.edge_endpoints(edge_idx)?;
            let weight = self.graph.edge_weight(edge_idx)?;
            Some((
                *index_to_id.get(&src)?,
                *index_to_id.get(&dst)?,
                weight,
            ))
        })
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn statistics(&self) -> GraphStatistics {
        let mut stats = GraphStatistics {
            nodes: self.node_count(),
            edges: self.edge_count(),
            ..GraphStatistics::default()
        };

        for node in self.graph.node_weights() {
            match node.kind() {
                NodeKind::Standard => stats.standards += 1,
                NodeKind::Clause => stats.clauses += 1,
                NodeKind::Requirement => stats.requirements += 1,
                NodeKind::ExternalStandard => stats.external_standards += 1,
            }
        }

        stats
    }

    /// Deterministic structural fingerprint: SHA-256 over node count, edge
    /// count, and the lexicographically first 10 node ids.
    ///
    /// This is coarse by design. It detects gross drift between builds
    /// without being sensitive to volatile per-edge timestamps, but it is
    /// not a full content hash: callers needing integrity guarantees over
    /// node attributes must hash the snapshot instead.
    pub fn checksum(&self) -> String {
        #[derive(Serialize)]
        struct Canonical<'a> {
            nodes: usize,
            edges: usize,
            node_ids: Vec<&'a str>,
        }

        let mut ids: Vec<&str> = self.node_index.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids.truncate(10);

        let canonical = Canonical {
            nodes: self.node_count(),
            edges: self.edge_count(),
            node_ids: ids,
        };

        // Field order in the struct fixes the JSON byte layout.
        let payload = serde_json::to_vec(&canonical).unwrap_or_default();
        let digest = Sha256::digest(&payload);
        digest.iter().map(|byte| format!("{byte:02x}")).collect()
    }

    pub fn processed_files(&self) -> &BTreeSet<String> {
        &self.processed_files
    }

    pub fn is_processed(&self, provenance_key: &str) -> bool {
        self.processed_files.contains(provenance_key)
    }

    pub(crate) fn mark_processed(&mut self, provenance_key: String) {
        self.processed_files.insert(provenance_key);
        self.last_updated_unix_ms = Some(now_unix_ms());
    }

    pub(crate) fn restore_processed(&mut self, keys: impl IntoIterator<Item = String>) {
        self.processed_files.extend(keys);
    }

    pub fn last_updated_unix_ms(&self) -> Option<u64> {
        self.last_updated_unix_ms
    }

    pub(crate) fn set_last_updated(&mut self, unix_ms: Option<u64>) {
        self.last_updated_unix_ms = unix_ms;
    }
}

impl Default for KnowledgeGraph {
    fn default() -> Self {
        Self::new()
    }
}
