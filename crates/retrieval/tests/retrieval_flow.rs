//! End-to-end retrieval flow against an in-memory knowledge graph, with
//! stub semantic providers and rerankers standing in for the external
//! collaborators.

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use standards_document::{References, RequirementType};
use standards_graph::{
    ClauseNode, EdgeType, GraphEdge, GraphNode, KnowledgeGraph, RequirementNode,
};
use standards_retrieval::{
    ComponentProfile, EngineConfig, HybridRetrievalEngine, Reranker, SemanticHit,
    SemanticProvider,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn add_requirement(
    graph: &mut KnowledgeGraph,
    clause: &str,
    index: usize,
    requirement_type: RequirementType,
    keyword: &str,
    text: &str,
) -> String {
    let id = format!("{clause}::req_{index}");
    graph.add_node(
        id.clone(),
        GraphNode::Requirement(RequirementNode {
            requirement_id: id.clone(),
            parent_clause: clause.to_string(),
            requirement_type,
            keyword: keyword.to_string(),
            text: text.to_string(),
        }),
    );
    graph.add_edge(
        clause,
        &id,
        GraphEdge::structural(EdgeType::ContainsRequirement),
    );
    id
}

/// Standard with one clause ("4.2") holding a vibration and a humidity
/// requirement, per the reference scenario.
fn scenario_graph() -> Arc<RwLock<KnowledgeGraph>> {
    let mut graph = KnowledgeGraph::new();
    graph.add_node(
        "STD-1",
        GraphNode::Standard {
            document_id: "STD-1".to_string(),
            title: "STD-1".to_string(),
        },
    );

    graph.add_node(
        "std1_ch4_2",
        GraphNode::Clause(ClauseNode {
            chunk_id: "std1_ch4_2".to_string(),
            document_id: "STD-1".to_string(),
            clause_id: "4.2".to_string(),
            title: "Mechanical tests".to_string(),
            parent_id: None,
            children_ids: Vec::new(),
            text_blocks: Vec::new(),
            tables: Vec::new(),
            figures: Vec::new(),
            references: References::default(),
            source_file: "std1/ch4_2.json".to_string(),
            depth: 2,
        }),
    );
    graph.add_edge(
        "STD-1",
        "std1_ch4_2",
        GraphEdge::structural(EdgeType::ContainsClause),
    );

    add_requirement(
        &mut graph,
        "std1_ch4_2",
        0,
        RequirementType::Mandatory,
        "shall",
        "shall withstand vibration",
    );
    add_requirement(
        &mut graph,
        "std1_ch4_2",
        1,
        RequirementType::Recommended,
        "should",
        "should resist humidity",
    );

    Arc::new(RwLock::new(graph))
}

fn mechanical_profile() -> ComponentProfile {
    ComponentProfile {
        name: "LED Module".to_string(),
        component_type: "LED Module".to_string(),
        application: "Automotive".to_string(),
        test_level: "component".to_string(),
        test_categories: vec!["mechanical".to_string()],
        specifications: Default::default(),
    }
}

struct FixedProvider {
    hits: Vec<SemanticHit>,
}

#[async_trait]
impl SemanticProvider for FixedProvider {
    async fn similar_requirements(
        &self,
        _query: &str,
        _limit: usize,
    ) -> anyhow::Result<Vec<SemanticHit>> {
        Ok(self.hits.clone())
    }
}

struct FailingProvider;

#[async_trait]
impl SemanticProvider for FailingProvider {
    async fn similar_requirements(
        &self,
        _query: &str,
        _limit: usize,
    ) -> anyhow::Result<Vec<SemanticHit>> {
        anyhow::bail!("vector index unreachable")
    }
}

struct ReversingReranker;

#[async_trait]
impl Reranker for ReversingReranker {
    async fn rerank(&self, _query: &str, candidates: &[String]) -> anyhow::Result<Vec<usize>> {
        Ok((0..candidates.len()).rev().collect())
    }
}

struct FailingReranker;

#[async_trait]
impl Reranker for FailingReranker {
    async fn rerank(&self, _query: &str, _candidates: &[String]) -> anyhow::Result<Vec<usize>> {
        anyhow::bail!("cross-encoder unavailable")
    }
}

struct BogusReranker;

#[async_trait]
impl Reranker for BogusReranker {
    async fn rerank(&self, _query: &str, candidates: &[String]) -> anyhow::Result<Vec<usize>> {
        // Repeats index 0; not a permutation.
        Ok(vec![0; candidates.len()])
    }
}

#[tokio::test]
async fn lexical_only_ranks_vibration_above_humidity() {
    init_logs();
    let engine = HybridRetrievalEngine::new(scenario_graph());

    let outcome = engine.query(&mechanical_profile(), 0.1, 10).await.unwrap();

    assert_eq!(outcome.results.len(), 1, "humidity matches no mechanical term");
    assert_eq!(outcome.results[0].node_id, "std1_ch4_2::req_0");
    assert!(outcome.results[0].matched_terms.contains(&"vibration".to_string()));
    assert!(!outcome.metadata.reranked);
    assert_eq!(outcome.metadata.semantic_hits, 0);
    assert_eq!(outcome.metadata.requirements_scanned, 2);
}

#[tokio::test]
async fn semantic_signal_lifts_unmatched_requirements() {
    let provider = Arc::new(FixedProvider {
        hits: vec![SemanticHit {
            node_id: "std1_ch4_2::req_1".to_string(),
            similarity: 0.9,
        }],
    });
    let engine = HybridRetrievalEngine::new(scenario_graph()).with_provider(provider);

    let outcome = engine.query(&mechanical_profile(), 0.1, 10).await.unwrap();

    // Humidity now appears as a semantic-only candidate (0.9 * 0.9 = 0.81).
    assert_eq!(outcome.results.len(), 2);
    let humidity = outcome
        .results
        .iter()
        .find(|r| r.node_id == "std1_ch4_2::req_1")
        .unwrap();
    assert_eq!(humidity.semantic_score, 0.9);
    assert_eq!(humidity.keyword_score, 0.0);
    assert_eq!(humidity.final_score, 0.81);
    assert_eq!(outcome.metadata.semantic_hits, 1);
}

#[tokio::test]
async fn agreement_between_signals_earns_the_bonus() {
    let provider = Arc::new(FixedProvider {
        hits: vec![SemanticHit {
            node_id: "std1_ch4_2::req_0".to_string(),
            similarity: 0.5,
        }],
    });
    let engine = HybridRetrievalEngine::new(scenario_graph()).with_provider(provider);

    let outcome = engine.query(&mechanical_profile(), 0.1, 10).await.unwrap();
    let vibration = &outcome.results[0];

    assert_eq!(vibration.node_id, "std1_ch4_2::req_0");
    assert!(vibration.semantic_score > 0.0 && vibration.keyword_score > 0.0);
    let expected = 0.6 * 0.5 + 0.4 * vibration.keyword_score + 0.1;
    assert!((vibration.final_score - (expected * 1000.0).round() / 1000.0).abs() < 1e-6);
}

#[tokio::test]
async fn provider_failure_degrades_to_lexical_only() {
    init_logs();
    let engine =
        HybridRetrievalEngine::new(scenario_graph()).with_provider(Arc::new(FailingProvider));

    let outcome = engine.query(&mechanical_profile(), 0.1, 10).await.unwrap();

    assert_eq!(outcome.metadata.semantic_hits, 0);
    assert_eq!(outcome.results.len(), 1);
    assert_eq!(outcome.results[0].node_id, "std1_ch4_2::req_0");
}

#[tokio::test]
async fn slow_provider_is_cut_off_by_timeout() {
    struct SlowProvider;

    #[async_trait]
    impl SemanticProvider for SlowProvider {
        async fn similar_requirements(
            &self,
            _query: &str,
            _limit: usize,
        ) -> anyhow::Result<Vec<SemanticHit>> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Vec::new())
        }
    }

    let config = EngineConfig {
        collaborator_timeout: Duration::from_millis(50),
        ..EngineConfig::default()
    };
    let engine = HybridRetrievalEngine::new(scenario_graph())
        .with_provider(Arc::new(SlowProvider))
        .with_config(config);

    let outcome = engine.query(&mechanical_profile(), 0.1, 10).await.unwrap();
    assert_eq!(outcome.metadata.semantic_hits, 0);
    assert_eq!(outcome.results.len(), 1);
}

#[tokio::test]
async fn reranker_order_replaces_fused_order() {
    let graph = scenario_graph();
    {
        let mut guard = graph.write().await;
        add_requirement(
            &mut guard,
            "std1_ch4_2",
            2,
            RequirementType::Mandatory,
            "shall",
            "shall withstand mechanical shock and vibration stress",
        );
    }

    let engine = HybridRetrievalEngine::new(graph).with_reranker(Arc::new(ReversingReranker));
    let outcome = engine.query(&mechanical_profile(), 0.05, 10).await.unwrap();

    assert!(outcome.metadata.reranked);
    // Fused order puts req_2 (4 matches) first; the reverser flips it last.
    assert_eq!(outcome.results.last().unwrap().node_id, "std1_ch4_2::req_2");
}

#[tokio::test]
async fn reranker_failure_keeps_fused_order() {
    let engine =
        HybridRetrievalEngine::new(scenario_graph()).with_reranker(Arc::new(FailingReranker));

    let outcome = engine.query(&mechanical_profile(), 0.1, 10).await.unwrap();
    assert!(!outcome.metadata.reranked);
    assert_eq!(outcome.results[0].node_id, "std1_ch4_2::req_0");
}

#[tokio::test]
async fn invalid_rerank_permutation_is_rejected() {
    let engine =
        HybridRetrievalEngine::new(scenario_graph()).with_reranker(Arc::new(BogusReranker));

    let outcome = engine.query(&mechanical_profile(), 0.1, 10).await.unwrap();
    assert!(!outcome.metadata.reranked);
}

#[tokio::test]
async fn disabled_reranking_skips_the_reranker() {
    let config = EngineConfig {
        enable_reranking: false,
        ..EngineConfig::default()
    };
    let engine = HybridRetrievalEngine::new(scenario_graph())
        .with_reranker(Arc::new(ReversingReranker))
        .with_config(config);

    let outcome = engine.query(&mechanical_profile(), 0.1, 10).await.unwrap();
    assert!(!outcome.metadata.reranked);
}

#[tokio::test]
async fn no_result_falls_below_min_confidence() {
    let provider = Arc::new(FixedProvider {
        hits: vec![
            SemanticHit {
                node_id: "std1_ch4_2::req_0".to_string(),
                similarity: 0.9,
            },
            SemanticHit {
                node_id: "std1_ch4_2::req_1".to_string(),
                similarity: 0.2,
            },
        ],
    });
    let engine = HybridRetrievalEngine::new(scenario_graph()).with_provider(provider);

    let min_confidence = 0.5;
    let outcome = engine
        .query(&mechanical_profile(), min_confidence, 10)
        .await
        .unwrap();

    assert!(!outcome.results.is_empty());
    for result in &outcome.results {
        assert!(result.final_score >= min_confidence);
    }
    // Humidity at 0.2 * 0.9 = 0.18 is filtered out.
    assert!(outcome
        .results
        .iter()
        .all(|r| r.node_id != "std1_ch4_2::req_1"));
}

#[tokio::test]
async fn ties_break_by_node_id_ascending() {
    let mut graph = KnowledgeGraph::new();
    graph.add_node(
        "STD-1",
        GraphNode::Standard {
            document_id: "STD-1".to_string(),
            title: "STD-1".to_string(),
        },
    );
    // Identical text in two clauses: identical scores.
    for clause in ["clause_b", "clause_a"] {
        add_requirement(
            &mut graph,
            clause,
            0,
            RequirementType::Mandatory,
            "shall",
            "shall withstand vibration",
        );
    }

    let engine = HybridRetrievalEngine::new(Arc::new(RwLock::new(graph)));
    let outcome = engine.query(&mechanical_profile(), 0.1, 10).await.unwrap();

    let ids: Vec<&str> = outcome.results.iter().map(|r| r.node_id.as_str()).collect();
    assert_eq!(ids, vec!["clause_a::req_0", "clause_b::req_0"]);
}

#[tokio::test]
async fn max_results_truncates_after_ranking() {
    let graph = scenario_graph();
    {
        let mut guard = graph.write().await;
        for i in 2..8 {
            add_requirement(
                &mut guard,
                "std1_ch4_2",
                i,
                RequirementType::Mandatory,
                "shall",
                "shall withstand vibration and shock",
            );
        }
    }

    let engine = HybridRetrievalEngine::new(graph);
    let outcome = engine.query(&mechanical_profile(), 0.05, 3).await.unwrap();

    assert_eq!(outcome.results.len(), 3);
    assert!(outcome.metadata.candidates_found > 3);
}

#[tokio::test]
async fn invalid_parameters_are_fatal() {
    let engine = HybridRetrievalEngine::new(scenario_graph());
    let profile = mechanical_profile();

    assert!(engine.query(&profile, 0.1, 0).await.is_err());
    assert!(engine.query(&profile, 1.5, 10).await.is_err());
    assert!(engine.query(&profile, -0.1, 10).await.is_err());

    let empty = ComponentProfile::default();
    assert!(engine.query(&empty, 0.1, 10).await.is_err());
}
