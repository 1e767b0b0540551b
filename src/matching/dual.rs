use std::sync::Arc;
use std::time::{Duration, Instant};

use fixedbitset::FixedBitSet;
use log::{debug, trace};

use crate::graph::model::{Label, LabeledGraph, VertexId};
use crate::matching::candidate::{CandidateMap, FeasibleMateInitializer};
use crate::matching::{Bijection, MatchError, MatchOutcome, MatcherConfig, PatternMatcher};

const ALGORITHM_NAME: &str = "dual simulation";

/// Counters gathered over one matching run.
#[derive(Debug, Default, Clone)]
pub struct RefinementStats {
    /// Total candidates seeded by the initializer.
    pub seeded: usize,
    /// Full passes over the query edge list, including the final quiet one.
    pub passes: usize,
    /// Mates dropped because no child landed in the partner set.
    pub removals: usize,
}

/// Outcome plus instrumentation for one matching run.
#[derive(Debug, Clone)]
pub struct MatchReport {
    pub outcome: MatchOutcome,
    pub stats: RefinementStats,
    pub duration: Duration,
}

enum Refinement {
    Converged,
    Infeasible,
}

enum EdgeStep {
    Continue,
    Infeasible,
}

/// Iterative dual-simulation refiner.
///
/// Seeds candidates by label/degree pruning, then sweeps every query edge
/// until a pass changes nothing. For a query edge `(u, u_c)` each surviving
/// mate of `u` must have a child inside phi(u_c); mates without one are dropped
/// and any set running empty makes the whole match infeasible immediately.
/// A pass that leaves the total candidate count untouched has left every set
/// identical (sets never grow across a pass) and would replay verbatim, so
/// refinement stops there; every continuing pass removes at least one
/// candidate, which bounds the pass count by the seeded total.
pub struct DualSimulationMatcher<L: Label> {
    query: Arc<LabeledGraph<L>>,
    data: Arc<LabeledGraph<L>>,
    config: MatcherConfig,
}

impl<L: Label> DualSimulationMatcher<L> {
    pub fn new(
        query: impl Into<Arc<LabeledGraph<L>>>,
        data: impl Into<Arc<LabeledGraph<L>>>,
        config: MatcherConfig,
    ) -> Self {
        Self {
            query: query.into(),
            data: data.into(),
            config,
        }
    }

    pub fn query(&self) -> &LabeledGraph<L> {
        &self.query
    }

    pub fn data(&self) -> &LabeledGraph<L> {
        &self.data
    }

    /// Execute one full run and report outcome, counters, and wall time.
    pub fn run(&self) -> MatchReport {
        let start = Instant::now();
        let mut stats = RefinementStats::default();

        let Some(mut phi) = FeasibleMateInitializer::seed(&self.query, &self.data) else {
            debug!("initializer found an empty candidate set; refinement skipped");
            return MatchReport {
                outcome: MatchOutcome::Empty,
                stats,
                duration: start.elapsed(),
            };
        };
        stats.seeded = phi.total_candidates();

        let outcome = match self.refine(&mut phi, &mut stats) {
            Refinement::Converged => MatchOutcome::Mappings(phi),
            Refinement::Infeasible => MatchOutcome::Empty,
        };
        debug!(
            "dual simulation finished: passes {}, removals {}, feasible {}",
            stats.passes,
            stats.removals,
            !outcome.is_empty()
        );

        MatchReport {
            outcome,
            stats,
            duration: start.elapsed(),
        }
    }

    fn refine(&self, phi: &mut CandidateMap, stats: &mut RefinementStats) -> Refinement {
        let edges = self.query_edges();
        loop {
            stats.passes += 1;
            let before = phi.total_candidates();
            for &(u, u_child) in &edges {
                match self.refine_edge(u, u_child, phi, stats) {
                    EdgeStep::Infeasible => return Refinement::Infeasible,
                    EdgeStep::Continue => {}
                }
            }
            // Any change a pass makes is a net removal somewhere, including
            // removals whose newSet happens to match the partner set in size.
            // Those still invalidate witnesses checked earlier in the pass,
            // so only an untouched total means a fixpoint.
            if phi.total_candidates() == before {
                trace!("pass {} changed nothing; fixpoint reached", stats.passes);
                return Refinement::Converged;
            }
        }
    }

    /// One refinement step for the query edge `(u, u_child)`.
    fn refine_edge(
        &self,
        u: VertexId,
        u_child: VertexId,
        phi: &mut CandidateMap,
        stats: &mut RefinementStats,
    ) -> EdgeStep {
        let mates: Vec<VertexId> = phi.candidates(u).collect();
        let mut new_set = FixedBitSet::with_capacity(phi.width());

        for mate in mates {
            let mut overlap = self.data.children(mate).clone();
            overlap.intersect_with(phi.set(u_child));
            if overlap.is_clear() {
                trace!("dropping mate {mate} of query vertex {u}: no child in phi({u_child})");
                phi.set_mut(u).set(mate, false);
                stats.removals += 1;
                if phi.set(u).is_clear() {
                    debug!("phi({u}) ran empty on edge ({u}, {u_child}); match infeasible");
                    return EdgeStep::Infeasible;
                }
            } else {
                new_set.union_with(&overlap);
            }
        }

        if new_set.is_clear() {
            debug!("no surviving mate of {u} satisfies {u_child}; match infeasible");
            return EdgeStep::Infeasible;
        }

        if u == u_child && self.config.intersect_self_loops {
            // Keep constraints other edges already established on this vertex.
            // The intersection can drain the set even though newSet itself is
            // non-empty, so it needs its own emptiness check.
            phi.set_mut(u_child).intersect_with(&new_set);
            if phi.set(u_child).is_clear() {
                debug!("phi({u_child}) ran empty intersecting its self-loop; match infeasible");
                return EdgeStep::Infeasible;
            }
        } else {
            phi.replace(u_child, new_set);
        }

        EdgeStep::Continue
    }

    fn query_edges(&self) -> Vec<(VertexId, VertexId)> {
        let mut edges = Vec::with_capacity(self.query.n_edges());
        for u in 0..self.query.size() {
            for u_child in self.query.children(u).ones() {
                edges.push((u, u_child));
            }
        }
        edges
    }
}

impl<L: Label> PatternMatcher for DualSimulationMatcher<L> {
    fn mappings(&self) -> MatchOutcome {
        self.run().outcome
    }

    /// Dual simulation is inherently many-valued and never resolves a 1-1
    /// assignment, so this fails on every call.
    fn bijections(&self) -> Result<Vec<Bijection>, MatchError> {
        Err(MatchError::BijectionsUnsupported {
            algorithm: ALGORITHM_NAME,
        })
    }
}
