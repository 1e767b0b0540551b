use fixedbitset::FixedBitSet;
use log::debug;

use crate::graph::model::{Label, LabeledGraph, VertexId};

/// The candidate mapping phi: one data-vertex bitset per query vertex.
///
/// Created fresh for a single matching run and mutated in place during
/// refinement; sets only ever shrink. Iteration is in ascending data-vertex
/// order, which keeps results deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateMap {
    sets: Vec<FixedBitSet>,
    width: usize,
}

impl CandidateMap {
    pub(crate) fn new(sets: Vec<FixedBitSet>, width: usize) -> Self {
        Self { sets, width }
    }

    /// Number of query vertices.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Size of the data graph the bitsets range over.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn set(&self, query_vertex: VertexId) -> &FixedBitSet {
        &self.sets[query_vertex]
    }

    pub(crate) fn set_mut(&mut self, query_vertex: VertexId) -> &mut FixedBitSet {
        &mut self.sets[query_vertex]
    }

    pub(crate) fn replace(&mut self, query_vertex: VertexId, set: FixedBitSet) {
        self.sets[query_vertex] = set;
    }

    pub fn candidates(&self, query_vertex: VertexId) -> impl Iterator<Item = VertexId> + '_ {
        self.sets[query_vertex].ones()
    }

    pub fn candidate_count(&self, query_vertex: VertexId) -> usize {
        self.sets[query_vertex].count_ones(..)
    }

    /// Total candidates across all query vertices; bounds refinement work.
    pub fn total_candidates(&self) -> usize {
        self.sets.iter().map(|set| set.count_ones(..)).sum()
    }

    pub fn to_vecs(&self) -> Vec<Vec<VertexId>> {
        self.sets.iter().map(|set| set.ones().collect()).collect()
    }
}

/// Seeds the initial candidate map by label and out-degree pruning.
pub struct FeasibleMateInitializer;

impl FeasibleMateInitializer {
    /// phi0(u) = { v : label(v) == label(u) and outdeg(v) >= outdeg(u) }.
    ///
    /// Label match is exact; the degree comparison uses `>=` because the data
    /// graph may carry extra fan-out. Returns `None` as soon as any query
    /// vertex ends up with no feasible mate, skipping refinement entirely.
    pub fn seed<L: Label>(
        query: &LabeledGraph<L>,
        data: &LabeledGraph<L>,
    ) -> Option<CandidateMap> {
        let width = data.size();
        let mut sets = Vec::with_capacity(query.size());

        for query_vertex in 0..query.size() {
            let mut mates = match data.vertices_with_label(query.label(query_vertex)) {
                Some(labeled) => labeled.clone(),
                None => FixedBitSet::with_capacity(width),
            };

            let required_degree = query.out_degree(query_vertex);
            if required_degree > 0 {
                let underpowered: Vec<VertexId> = mates
                    .ones()
                    .filter(|&mate| data.out_degree(mate) < required_degree)
                    .collect();
                for mate in underpowered {
                    mates.set(mate, false);
                }
            }

            if mates.is_clear() {
                debug!("query vertex {query_vertex} has no feasible mate; match is infeasible");
                return None;
            }
            sets.push(mates);
        }

        Some(CandidateMap::new(sets, width))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexSet;

    fn data_graph() -> LabeledGraph<&'static str> {
        // 0(a) -> {1, 2}, 1(b) -> {2}, 2(a) -> {}, 3(b) -> {0}
        let adjacency = vec![
            IndexSet::from([1, 2]),
            IndexSet::from([2]),
            IndexSet::new(),
            IndexSet::from([0]),
        ];
        LabeledGraph::new(adjacency, vec!["a", "b", "a", "b"]).expect("valid graph")
    }

    #[test]
    fn seeding_applies_label_and_degree_filters() {
        let query = LabeledGraph::new(
            vec![IndexSet::from([1]), IndexSet::new()],
            vec!["a", "b"],
        )
        .expect("valid query");
        let phi = FeasibleMateInitializer::seed(&query, &data_graph()).expect("feasible");

        // u0 needs label a and outdeg >= 1: vertex 2 is pruned by degree.
        assert_eq!(phi.to_vecs(), vec![vec![0], vec![1, 3]]);
        assert_eq!(phi.total_candidates(), 3);
        assert_eq!(phi.width(), 4);
    }

    #[test]
    fn degree_comparison_accepts_extra_fanout() {
        let query =
            LabeledGraph::new(vec![IndexSet::from([0])], vec!["a"]).expect("valid query");
        let phi = FeasibleMateInitializer::seed(&query, &data_graph()).expect("feasible");
        // vertex 0 has outdeg 2 >= 1, vertex 2 has outdeg 0 < 1.
        assert_eq!(phi.to_vecs(), vec![vec![0]]);
    }

    #[test]
    fn unknown_label_short_circuits_to_empty() {
        let query = LabeledGraph::new(vec![IndexSet::new()], vec!["z"]).expect("valid query");
        assert!(FeasibleMateInitializer::seed(&query, &data_graph()).is_none());
    }

    #[test]
    fn empty_query_seeds_vacuously() {
        let query: LabeledGraph<&str> =
            LabeledGraph::new(Vec::new(), Vec::new()).expect("empty query");
        let phi = FeasibleMateInitializer::seed(&query, &data_graph()).expect("vacuous");
        assert!(phi.is_empty());
        assert_eq!(phi.total_candidates(), 0);
    }
}
