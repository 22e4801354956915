use crate::error::{GraphError, Result};
use crate::store::KnowledgeGraph;
use crate::types::{
    BuildResult, ClauseNode, EdgeType, GraphEdge, GraphNode, NodeKind, RequirementNode,
};
use standards_document::{load_document, ClauseDocument};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Incremental graph builder over a directory of clause documents.
///
/// Each `*.json` file under the source root is one clause. Files are
/// identified by their relative path (the provenance key); a file, once
/// ingested, is never reprocessed, also across snapshot reload.
pub struct GraphBuilder {
    enable_structural: bool,
    enable_reference: bool,
}

impl GraphBuilder {
    pub fn new(enable_structural: bool, enable_reference: bool) -> Self {
        Self {
            enable_structural,
            enable_reference,
        }
    }

    /// Ingest all new documents under `root` into `graph`.
    ///
    /// Requires exclusive access to the graph for the duration of the pass;
    /// the caller serializes builds against readers.
    pub fn build_from_directory(
        &self,
        graph: &mut KnowledgeGraph,
        root: &Path,
    ) -> Result<BuildResult> {
        if !root.is_dir() {
            return Err(GraphError::SourceDirectoryMissing(root.to_path_buf()));
        }

        log::info!("Building knowledge graph from {}", root.display());

        let candidates = enumerate_documents(root);
        let new_files: Vec<(PathBuf, String)> = candidates
            .into_iter()
            .filter(|(_, key)| !graph.is_processed(key))
            .collect();

        log::info!("{} new files to process", new_files.len());

        if new_files.is_empty() {
            return Ok(self.finish(graph, 0));
        }

        let mut documents = Vec::with_capacity(new_files.len());
        let mut ingested = 0usize;
        for (path, provenance_key) in new_files {
            match load_document(&path) {
                Ok(doc) => {
                    documents.push((doc, provenance_key.clone()));
                    graph.mark_processed(provenance_key);
                    ingested += 1;
                }
                Err(e) => {
                    // Unreadable or malformed: skip, leave unprocessed so a
                    // corrected file is picked up by the next pass.
                    log::warn!("Skipping {}: {e}", path.display());
                }
            }
        }

        self.create_nodes(graph, &documents);

        if self.enable_structural {
            self.create_structural_links(graph);
        }

        if self.enable_reference {
            self.create_reference_links(graph);
        }

        Ok(self.finish(graph, ingested))
    }

    /// Node pass: Standard, Clause, and Requirement nodes plus containment
    /// edges, in document order.
    fn create_nodes(&self, graph: &mut KnowledgeGraph, documents: &[(ClauseDocument, String)]) {
        for (doc, provenance_key) in documents {
            if doc.chunk_id.is_empty() || doc.document_id.is_empty() {
                log::warn!(
                    "Skipping {provenance_key}: missing chunk_id or document_id, cannot be addressed"
                );
                continue;
            }

            if !graph.has_node(&doc.document_id) {
                graph.add_node(
                    doc.document_id.clone(),
                    GraphNode::Standard {
                        document_id: doc.document_id.clone(),
                        title: doc.document_id.clone(),
                    },
                );
            }

            let clause = ClauseNode {
                chunk_id: doc.chunk_id.clone(),
                document_id: doc.document_id.clone(),
                clause_id: doc.clause_id.clone(),
                title: doc.title.clone(),
                parent_id: doc.parent_id.clone(),
                children_ids: doc.children_ids.clone(),
                text_blocks: doc.text_blocks.clone(),
                tables: doc.tables.clone(),
                figures: doc.figures.clone(),
                references: doc.references.clone(),
                source_file: provenance_key.clone(),
                depth: clause_depth(&doc.clause_id),
            };
            graph.add_node(doc.chunk_id.clone(), GraphNode::Clause(clause));
            graph.add_edge(
                &doc.document_id,
                &doc.chunk_id,
                GraphEdge::structural(EdgeType::ContainsClause),
            );

            for (index, entry) in doc.requirements.iter().enumerate() {
                let requirement_id = format!("{}::req_{index}", doc.chunk_id);
                graph.add_node(
                    requirement_id.clone(),
                    GraphNode::Requirement(RequirementNode {
                        requirement_id: requirement_id.clone(),
                        parent_clause: doc.chunk_id.clone(),
                        requirement_type: entry.requirement_type,
                        keyword: entry.keyword.clone(),
                        text: entry.text.clone(),
                    }),
                );
                graph.add_edge(
                    &doc.chunk_id,
                    &requirement_id,
                    GraphEdge::structural(EdgeType::ContainsRequirement),
                );
            }
        }
    }

    /// Structural pass: PARENT_OF from each clause's `parent_id`, SIBLING_OF
    /// between children listed on a shared parent.
    ///
    /// Runs over all Clause nodes, not just the current batch, so hierarchy
    /// split across ingestion batches still resolves. Edge uniqueness makes
    /// the re-walk idempotent.
    fn create_structural_links(&self, graph: &mut KnowledgeGraph) {
        let lookup = clause_lookup(graph);
        let clauses = collect_clauses(graph);

        for clause in &clauses {
            let Some(parent_clause_id) = clause.parent_id.as_deref() else {
                continue;
            };
            let Some(parent_node_id) = lookup.get(parent_clause_id) else {
                continue;
            };

            graph.add_edge(
                parent_node_id,
                &clause.node_id,
                GraphEdge::structural(EdgeType::ParentOf),
            );

            let siblings = clauses
                .iter()
                .find(|c| c.node_id == *parent_node_id)
                .map(|parent| parent.children_ids.clone())
                .unwrap_or_default();

            if !siblings.iter().any(|s| *s == clause.clause_id) {
                continue;
            }

            for sibling_clause_id in &siblings {
                if *sibling_clause_id == clause.clause_id {
                    continue;
                }
                if let Some(sibling_node_id) = lookup.get(sibling_clause_id) {
                    graph.add_edge(
                        &clause.node_id,
                        sibling_node_id,
                        GraphEdge::structural(EdgeType::SiblingOf),
                    );
                }
            }
        }
    }

    /// Reference pass: REFERENCES for resolvable internal cross-references,
    /// CITES_STANDARD for external citations (creating the ExternalStandard
    /// node lazily). Unresolved internal references are silently omitted.
    fn create_reference_links(&self, graph: &mut KnowledgeGraph) {
        let lookup = clause_lookup(graph);
        let clauses = collect_clauses(graph);

        for clause in &clauses {
            for internal_ref in &clause.internal_refs {
                if let Some(target_node_id) = lookup.get(internal_ref) {
                    graph.add_edge(
                        &clause.node_id,
                        target_node_id,
                        GraphEdge::reference(EdgeType::References),
                    );
                }
            }

            for standard_name in &clause.standard_refs {
                let ext_id = format!("EXT::{standard_name}");
                if !graph.has_node(&ext_id) {
                    graph.add_node(
                        ext_id.clone(),
                        GraphNode::ExternalStandard {
                            standard_name: standard_name.clone(),
                        },
                    );
                }
                graph.add_edge(
                    &clause.node_id,
                    &ext_id,
                    GraphEdge::reference(EdgeType::CitesStandard),
                );
            }
        }
    }

    fn finish(&self, graph: &KnowledgeGraph, new_files_processed: usize) -> BuildResult {
        let stats = graph.statistics();
        let result = BuildResult {
            nodes_total: stats.nodes,
            edges_total: stats.edges,
            standards: stats.standards,
            clauses: stats.clauses,
            requirements: stats.requirements,
            checksum: graph.checksum(),
            new_files_processed,
        };

        log::info!(
            "Graph: {} nodes, {} edges ({} standards, {} clauses, {} requirements), {} new files",
            result.nodes_total,
            result.edges_total,
            result.standards,
            result.clauses,
            result.requirements,
            result.new_files_processed
        );

        result
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new(true, true)
    }
}

/// Number of dot-separated segments in a clause id, after stripping an
/// `"Annex "` prefix. Unplaced clauses (empty or "misc") have depth 0.
pub fn clause_depth(clause_id: &str) -> usize {
    if clause_id.is_empty() || clause_id == "misc" {
        return 0;
    }
    let trimmed = clause_id.strip_prefix("Annex ").unwrap_or(clause_id);
    trimmed.split('.').count()
}

/// Enumerate `*.json` files under `root`, sorted by path for determinism.
/// Returns `(absolute_path, provenance_key)` pairs; the provenance key is
/// the relative path with `/` separators.
fn enumerate_documents(root: &Path) -> Vec<(PathBuf, String)> {
    let mut files: Vec<(PathBuf, String)> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::warn!("Failed to read entry: {e}");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
        })
        .map(|entry| {
            let path = entry.into_path();
            let key = path
                .strip_prefix(root)
                .unwrap_or(&path)
                .to_string_lossy()
                .replace('\\', "/");
            (path, key)
        })
        .collect();

    files.sort_by(|a, b| a.1.cmp(&b.1));
    files
}

/// Flattened view of a Clause node used by the link passes, so the passes
/// can mutate the graph without holding node borrows.
struct ClauseView {
    node_id: String,
    clause_id: String,
    parent_id: Option<String>,
    children_ids: Vec<String>,
    internal_refs: Vec<String>,
    standard_refs: Vec<String>,
}

fn collect_clauses(graph: &KnowledgeGraph) -> Vec<ClauseView> {
    let mut clauses: Vec<ClauseView> = graph
        .nodes_by_kind(NodeKind::Clause)
        .filter_map(|(node_id, node)| {
            let clause = node.as_clause()?;
            Some(ClauseView {
                node_id: node_id.to_string(),
                clause_id: clause.clause_id.clone(),
                parent_id: clause.parent_id.clone(),
                children_ids: clause.children_ids.clone(),
                internal_refs: clause.references.internal.clone(),
                standard_refs: clause.references.standards.clone(),
            })
        })
        .collect();

    // Stable order keeps edge insertion deterministic across passes.
    clauses.sort_by(|a, b| a.node_id.cmp(&b.node_id));
    clauses
}

/// `clause_id -> node id` lookup across all Clause nodes.
fn clause_lookup(graph: &KnowledgeGraph) -> HashMap<String, String> {
    graph
        .nodes_by_kind(NodeKind::Clause)
        .filter_map(|(node_id, node)| {
            let clause = node.as_clause()?;
            if clause.clause_id.is_empty() {
                return None;
            }
            Some((clause.clause_id.clone(), node_id.to_string()))
        })
        .collect()
}
