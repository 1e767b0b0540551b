use std::sync::Arc;
use std::thread;

use indexmap::IndexSet;

use dualsim::{match_all, DualSimulationMatcher, LabeledGraph, MatcherConfig, PatternMatcher};

fn graph(labels: &[&'static str], edges: &[(usize, usize)]) -> LabeledGraph<&'static str> {
    let mut adjacency = vec![IndexSet::new(); labels.len()];
    for &(src, dst) in edges {
        adjacency[src].insert(dst);
    }
    LabeledGraph::new(adjacency, labels.to_vec()).expect("valid graph")
}

fn shared_data() -> Arc<LabeledGraph<&'static str>> {
    Arc::new(graph(
        &["G", "W", "S", "G", "W", "S"],
        &[(0, 1), (1, 2), (3, 4), (4, 5), (3, 1)],
    ))
}

#[test]
fn match_all_runs_every_query_against_one_graph() {
    let data = shared_data();
    let queries = vec![
        Arc::new(graph(&["G", "W"], &[(0, 1)])),
        Arc::new(graph(&["W", "S"], &[(0, 1)])),
        Arc::new(graph(&["S", "G"], &[(0, 1)])),
    ];

    let reports = match_all(&queries, &data, &MatcherConfig::default());
    assert_eq!(reports.len(), 3);

    let gw = reports[0].outcome.mappings().expect("gateway->worker");
    assert_eq!(gw.to_vecs(), vec![vec![0, 3], vec![1, 4]]);

    let ws = reports[1].outcome.mappings().expect("worker->store");
    assert_eq!(ws.to_vecs(), vec![vec![1, 4], vec![2, 5]]);

    // No store points at a gateway anywhere.
    assert!(reports[2].outcome.is_empty());
}

#[test]
fn concurrent_matchers_share_a_read_only_graph() {
    let data = shared_data();
    let mut handles = Vec::new();
    for _ in 0..4 {
        let data = Arc::clone(&data);
        handles.push(thread::spawn(move || {
            let matcher = DualSimulationMatcher::new(
                graph(&["G", "W", "S"], &[(0, 1), (1, 2)]),
                data,
                MatcherConfig::default(),
            );
            matcher.mappings()
        }));
    }

    let outcomes: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().expect("matcher thread"))
        .collect();
    for outcome in &outcomes {
        assert_eq!(outcome, &outcomes[0], "runs over a shared graph agree");
        let phi = outcome.mappings().expect("feasible");
        assert_eq!(phi.to_vecs(), vec![vec![0, 3], vec![1, 4], vec![2, 5]]);
    }
}
