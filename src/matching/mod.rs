pub mod candidate;
pub mod dual;

pub use candidate::{CandidateMap, FeasibleMateInitializer};
pub use dual::{DualSimulationMatcher, MatchReport, RefinementStats};

use std::sync::Arc;

use rayon::prelude::*;
use thiserror::Error;

use crate::graph::model::{Label, LabeledGraph, VertexId};

/// A 1-1 assignment of data vertices, indexed by query vertex.
pub type Bijection = Vec<VertexId>;

/// Typed failures of the matcher contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    /// The algorithm computes many-valued mappings and cannot resolve a 1-1
    /// assignment; asking it for bijections fails loudly rather than guessing.
    #[error("{algorithm} produces many-valued mappings; bijections are unsupported")]
    BijectionsUnsupported { algorithm: &'static str },
}

/// Result of one matching run: a mapping per query vertex, or the EMPTY
/// sentinel meaning no valid global assignment exists.
///
/// Infeasibility is an expected outcome, not an error, so it lives here and
/// not in [`MatchError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    Mappings(CandidateMap),
    Empty,
}

impl MatchOutcome {
    pub fn is_empty(&self) -> bool {
        matches!(self, MatchOutcome::Empty)
    }

    pub fn mappings(&self) -> Option<&CandidateMap> {
        match self {
            MatchOutcome::Mappings(map) => Some(map),
            MatchOutcome::Empty => None,
        }
    }

    pub fn into_mappings(self) -> Option<CandidateMap> {
        match self {
            MatchOutcome::Mappings(map) => Some(map),
            MatchOutcome::Empty => None,
        }
    }
}

/// Caller-supplied knobs for a matching run.
#[derive(Debug, Clone)]
pub struct MatcherConfig {
    /// On a query self-loop, intersect the vertex's candidate set with the
    /// freshly computed one instead of overwriting it. Intersection keeps
    /// constraints already established by other edges into the same vertex;
    /// overwrite reproduces the permissive behavior.
    pub intersect_self_loops: bool,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            intersect_self_loops: true,
        }
    }
}

/// Capability contract shared by all matching algorithm variants.
///
/// Dual simulation fully supports `mappings`; `bijections` is reserved for
/// exact-isomorphism variants and fails on simulation-only matchers.
pub trait PatternMatcher {
    fn mappings(&self) -> MatchOutcome;

    fn bijections(&self) -> Result<Vec<Bijection>, MatchError>;
}

/// Run one matcher per query against a shared data graph.
///
/// The data graph is read-only after construction, so runs proceed in
/// parallel; each run owns its candidate map exclusively.
pub fn match_all<L>(
    queries: &[Arc<LabeledGraph<L>>],
    data: &Arc<LabeledGraph<L>>,
    config: &MatcherConfig,
) -> Vec<MatchReport>
where
    L: Label + Send + Sync,
{
    queries
        .par_iter()
        .map(|query| {
            DualSimulationMatcher::new(Arc::clone(query), Arc::clone(data), config.clone()).run()
        })
        .collect()
}
