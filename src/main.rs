use std::sync::Arc;

use anyhow::Result;
use indexmap::{IndexMap, IndexSet};
use log::{info, warn};

use dualsim::{match_all, GraphTraversal, LabeledGraph, MatcherConfig};

fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init();
}

fn graph_from(labels: &[&str], edges: &[(usize, usize)]) -> Result<LabeledGraph<String>> {
    let mut adjacency = vec![IndexSet::new(); labels.len()];
    for &(src, dst) in edges {
        adjacency[src].insert(dst);
    }
    LabeledGraph::new(adjacency, labels.iter().map(|label| label.to_string()).collect())
}

/// Small service-dependency graph used as the demo target.
fn data_graph() -> Result<LabeledGraph<String>> {
    let labels = [
        "gateway", "service", "service", "database", "cache", "service", "database", "gateway",
    ];
    let edges = [
        (0, 1),
        (0, 2),
        (1, 3),
        (1, 4),
        (2, 3),
        (2, 5),
        (5, 6),
        (5, 4),
        (7, 5),
        (7, 2),
    ];
    let mut edge_labels = IndexMap::new();
    edge_labels.insert((0, 1), "routes".to_string());
    edge_labels.insert((1, 3), "reads".to_string());
    edge_labels.insert((5, 6), "reads".to_string());
    Ok(graph_from(&labels, &edges)?
        .with_edge_labels(edge_labels)
        .with_inverse())
}

fn main() -> Result<()> {
    init_logging();

    let data = Arc::new(data_graph()?);
    info!(
        "data graph: {} vertices, {} edges, self-loops {}, connected {}",
        data.size(),
        data.n_edges(),
        data.self_loop_count(),
        data.is_connected()
    );
    if !data.validate_edge_labels() {
        warn!("edge-label map contains stale keys");
    }

    let mut search = GraphTraversal::bfs(&data);
    if let Some(vertex) = search.find(&"database".to_string()) {
        info!("first database vertex in BFS order: {vertex}");
    }
    info!("gateway 0 reaches database 6: {}", search.reach(0, 6));

    // Pattern 1: a gateway fronting a service that reads a database.
    let chain = Arc::new(graph_from(
        &["gateway", "service", "database"],
        &[(0, 1), (1, 2)],
    )?);
    // Pattern 2: a service with both a database and a cache behind it.
    let fanout = Arc::new(graph_from(
        &["service", "database", "cache"],
        &[(0, 1), (0, 2)],
    )?);

    let reports = match_all(&[chain, fanout], &data, &MatcherConfig::default());
    for (idx, report) in reports.iter().enumerate() {
        match report.outcome.mappings() {
            Some(phi) => info!(
                "pattern {idx}: mappings {:?} (passes {}, removals {}, {:?})",
                phi.to_vecs(),
                report.stats.passes,
                report.stats.removals,
                report.duration
            ),
            None => info!(
                "pattern {idx}: no match (passes {}, removals {})",
                report.stats.passes, report.stats.removals
            ),
        }
    }

    Ok(())
}
