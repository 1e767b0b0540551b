pub mod graph;
pub mod matching;

pub use graph::{GraphTraversal, Label, LabeledGraph, SearchOrder, VertexId};
pub use matching::{
    match_all, Bijection, CandidateMap, DualSimulationMatcher, FeasibleMateInitializer,
    MatchError, MatchOutcome, MatchReport, MatcherConfig, PatternMatcher, RefinementStats,
};
