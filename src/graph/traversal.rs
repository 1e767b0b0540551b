use std::collections::VecDeque;

use fixedbitset::FixedBitSet;

use crate::graph::model::{Label, LabeledGraph, VertexId};

/// Frontier discipline for [`GraphTraversal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOrder {
    /// FIFO queue.
    BreadthFirst,
    /// Explicit stack.
    DepthFirst,
}

/// Reusable BFS/DFS walker over a [`LabeledGraph`].
///
/// Vertices are marked visited when they are popped for processing, not when
/// they are pushed, so a vertex may sit in the frontier more than once. That
/// is the documented discipline and it keeps traversal order reproducible.
/// Every call clears its own visited state first; nothing leaks between
/// calls on the same walker.
pub struct GraphTraversal<'g, L: Label> {
    graph: &'g LabeledGraph<L>,
    order: SearchOrder,
    visited: FixedBitSet,
    frontier: VecDeque<VertexId>,
}

impl<'g, L: Label> GraphTraversal<'g, L> {
    pub fn new(graph: &'g LabeledGraph<L>, order: SearchOrder) -> Self {
        Self {
            graph,
            order,
            visited: FixedBitSet::with_capacity(graph.size()),
            frontier: VecDeque::new(),
        }
    }

    pub fn bfs(graph: &'g LabeledGraph<L>) -> Self {
        Self::new(graph, SearchOrder::BreadthFirst)
    }

    pub fn dfs(graph: &'g LabeledGraph<L>) -> Self {
        Self::new(graph, SearchOrder::DepthFirst)
    }

    pub fn order(&self) -> SearchOrder {
        self.order
    }

    /// First vertex carrying `label` in traversal order, scanning every
    /// component in ascending start-vertex order. The label is tested when
    /// the vertex is popped.
    pub fn find(&mut self, label: &L) -> Option<VertexId> {
        self.reset();
        for start in 0..self.graph.size() {
            if self.visited.contains(start) {
                continue;
            }
            self.frontier.push_back(start);
            while let Some(vertex) = self.pop() {
                if self.visited.contains(vertex) {
                    continue;
                }
                self.visited.insert(vertex);
                if self.graph.label(vertex) == label {
                    self.frontier.clear();
                    return Some(vertex);
                }
                self.push_children(vertex);
            }
        }
        None
    }

    /// True when a directed path runs from `from` to `to`. A vertex reaches
    /// itself by the empty path.
    pub fn reach(&mut self, from: VertexId, to: VertexId) -> bool {
        let size = self.graph.size();
        assert!(
            from < size && to < size,
            "reach endpoints ({from}, {to}) out of range for graph of size {size}"
        );
        self.reset();
        self.frontier.push_back(from);
        while let Some(vertex) = self.pop() {
            if self.visited.contains(vertex) {
                continue;
            }
            self.visited.insert(vertex);
            if vertex == to {
                self.frontier.clear();
                return true;
            }
            self.push_children(vertex);
        }
        false
    }

    fn reset(&mut self) {
        self.visited.clear();
        self.frontier.clear();
    }

    fn pop(&mut self) -> Option<VertexId> {
        match self.order {
            SearchOrder::BreadthFirst => self.frontier.pop_front(),
            SearchOrder::DepthFirst => self.frontier.pop_back(),
        }
    }

    fn push_children(&mut self, vertex: VertexId) {
        // No visited check here: marking happens on pop.
        for child in self.graph.children(vertex).ones() {
            self.frontier.push_back(child);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexSet;

    fn fork() -> LabeledGraph<&'static str> {
        // 0 -> 1, 0 -> 2, 1 -> 3, 2 -> 3
        let adjacency = vec![
            IndexSet::from([1, 2]),
            IndexSet::from([3]),
            IndexSet::from([3]),
            IndexSet::new(),
        ];
        LabeledGraph::new(adjacency, vec!["root", "x", "x", "sink"]).expect("valid graph")
    }

    #[test]
    fn bfs_and_dfs_disagree_on_tie_breaks() {
        let graph = fork();
        let mut bfs = GraphTraversal::bfs(&graph);
        let mut dfs = GraphTraversal::dfs(&graph);
        // BFS pops the earlier-pushed child, DFS the later-pushed one.
        assert_eq!(bfs.find(&"x"), Some(1));
        assert_eq!(dfs.find(&"x"), Some(2));
        assert_eq!(bfs.find(&"sink"), Some(3));
        assert_eq!(dfs.find(&"sink"), Some(3));
        assert_eq!(bfs.find(&"absent"), None);
    }

    #[test]
    fn find_scans_disconnected_components() {
        let adjacency = vec![IndexSet::from([1]), IndexSet::new(), IndexSet::new()];
        let graph = LabeledGraph::new(adjacency, vec!["a", "b", "far"]).expect("valid graph");
        let mut walker = GraphTraversal::bfs(&graph);
        assert_eq!(walker.find(&"far"), Some(2));
    }

    #[test]
    fn reach_follows_edge_direction() {
        let graph = fork();
        let mut walker = GraphTraversal::dfs(&graph);
        assert!(walker.reach(0, 3));
        assert!(!walker.reach(3, 0));
        assert!(walker.reach(1, 3));
        assert!(!walker.reach(1, 2));
    }

    #[test]
    fn reach_is_reflexive() {
        let graph = fork();
        let mut walker = GraphTraversal::bfs(&graph);
        assert!(walker.reach(3, 3), "empty path counts");
    }

    #[test]
    fn visited_state_does_not_leak_between_calls() {
        let graph = fork();
        let mut walker = GraphTraversal::bfs(&graph);
        assert_eq!(walker.find(&"sink"), Some(3));
        assert_eq!(walker.find(&"sink"), Some(3));
        assert!(walker.reach(0, 3));
        assert!(walker.reach(0, 3));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn reach_rejects_out_of_range_endpoints() {
        let graph = fork();
        let mut walker = GraphTraversal::bfs(&graph);
        walker.reach(0, 9);
    }
}
