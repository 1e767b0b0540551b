use std::fmt;
use std::hash::Hash;

use anyhow::{anyhow, Result};
use fixedbitset::FixedBitSet;
use indexmap::{IndexMap, IndexSet};
use log::warn;

/// Dense vertex identifier in `0..n`.
pub type VertexId = usize;

/// Bound alias for vertex and edge label values.
pub trait Label: Clone + Eq + Hash + fmt::Debug {}

impl<T> Label for T where T: Clone + Eq + Hash + fmt::Debug {}

/// Immutable directed labeled graph over dense vertex ids.
///
/// Adjacency is stored as one bitset of width `n` per vertex, so child sets
/// have set semantics (a duplicate edge collapses) and candidate intersection
/// during matching is a plain bitset AND. Instances are read-only after
/// construction and safe to share across concurrent matcher runs.
#[derive(Debug, Clone)]
pub struct LabeledGraph<L: Label> {
    adjacency: Vec<FixedBitSet>,
    labels: Vec<L>,
    label_index: IndexMap<L, FixedBitSet>,
    edge_labels: IndexMap<(VertexId, VertexId), L>,
    parents: Option<Vec<FixedBitSet>>,
    edge_count: usize,
}

impl<L: Label> LabeledGraph<L> {
    /// Build a graph from per-vertex child-id sets and a parallel label array.
    ///
    /// Fails if the arrays disagree in length or any child id is out of
    /// range. Zero vertices is a valid (trivial) graph; a vertex with no
    /// out-edges is not an error.
    pub fn new(children: Vec<IndexSet<VertexId>>, labels: Vec<L>) -> Result<Self> {
        if children.len() != labels.len() {
            return Err(anyhow!(
                "adjacency lists cover {} vertices but {} labels were supplied",
                children.len(),
                labels.len()
            ));
        }

        let size = labels.len();
        let mut adjacency = Vec::with_capacity(size);
        let mut edge_count = 0;
        for (vertex, child_set) in children.into_iter().enumerate() {
            let mut bits = FixedBitSet::with_capacity(size);
            for child in child_set {
                if child >= size {
                    return Err(anyhow!(
                        "vertex {vertex} references child {child}, outside 0..{size}"
                    ));
                }
                bits.insert(child);
            }
            edge_count += bits.count_ones(..);
            adjacency.push(bits);
        }

        let mut label_index: IndexMap<L, FixedBitSet> = IndexMap::new();
        for (vertex, label) in labels.iter().enumerate() {
            label_index
                .entry(label.clone())
                .or_insert_with(|| FixedBitSet::with_capacity(size))
                .insert(vertex);
        }

        Ok(Self {
            adjacency,
            labels,
            label_index,
            edge_labels: IndexMap::new(),
            parents: None,
            edge_count,
        })
    }

    /// Attach an edge-label map keyed by `(src, dst)`.
    ///
    /// Keys are not validated here; `validate_edge_labels` reports stale
    /// entries without mutating them.
    pub fn with_edge_labels(mut self, edge_labels: IndexMap<(VertexId, VertexId), L>) -> Self {
        self.edge_labels = edge_labels;
        self
    }

    /// Build the inverse adjacency so `parents` lookups become available.
    pub fn with_inverse(mut self) -> Self {
        let size = self.size();
        let mut parents = vec![FixedBitSet::with_capacity(size); size];
        for (vertex, children) in self.adjacency.iter().enumerate() {
            for child in children.ones() {
                parents[child].insert(vertex);
            }
        }
        self.parents = Some(parents);
        self
    }

    pub fn size(&self) -> usize {
        self.labels.len()
    }

    pub fn n_edges(&self) -> usize {
        self.edge_count
    }

    pub fn label(&self, vertex: VertexId) -> &L {
        assert!(
            vertex < self.size(),
            "vertex id {vertex} out of range for graph of size {}",
            self.size()
        );
        &self.labels[vertex]
    }

    pub fn children(&self, vertex: VertexId) -> &FixedBitSet {
        assert!(
            vertex < self.size(),
            "vertex id {vertex} out of range for graph of size {}",
            self.size()
        );
        &self.adjacency[vertex]
    }

    pub fn out_degree(&self, vertex: VertexId) -> usize {
        self.children(vertex).count_ones(..)
    }

    pub fn has_inverse(&self) -> bool {
        self.parents.is_some()
    }

    /// Parent set of `vertex`. Fails unless the graph was built `with_inverse`.
    pub fn parents(&self, vertex: VertexId) -> Result<&FixedBitSet> {
        assert!(
            vertex < self.size(),
            "vertex id {vertex} out of range for graph of size {}",
            self.size()
        );
        self.parents
            .as_ref()
            .map(|parents| &parents[vertex])
            .ok_or_else(|| anyhow!("inverse adjacency was not built for this graph"))
    }

    /// Vertices carrying `label`, or `None` when no vertex does.
    pub fn vertices_with_label(&self, label: &L) -> Option<&FixedBitSet> {
        self.label_index.get(label)
    }

    pub fn has_edge(&self, src: VertexId, dst: VertexId) -> bool {
        src < self.size() && self.adjacency[src].contains(dst)
    }

    pub fn edge_label(&self, src: VertexId, dst: VertexId) -> Option<&L> {
        self.edge_labels.get(&(src, dst))
    }

    pub fn self_loop_count(&self) -> usize {
        self.adjacency
            .iter()
            .enumerate()
            .filter(|(vertex, children)| children.contains(*vertex))
            .count()
    }

    /// Check that every edge-label key references an existing edge.
    ///
    /// Stale keys are reported through the log facade and left untouched;
    /// the caller decides whether a `false` verdict is fatal.
    pub fn validate_edge_labels(&self) -> bool {
        let mut valid = true;
        for (src, dst) in self.edge_labels.keys() {
            if !self.has_edge(*src, *dst) {
                warn!("edge label references missing edge ({src}, {dst})");
                valid = false;
            }
        }
        valid
    }

    /// True when every vertex is touched by at least one edge.
    ///
    /// This is the weak "has an edge at it" notion, not reachability: a
    /// vertex counts if it has an out-edge or appears as someone's child.
    pub fn is_connected(&self) -> bool {
        let size = self.size();
        let mut touched = FixedBitSet::with_capacity(size);
        for (vertex, children) in self.adjacency.iter().enumerate() {
            if !children.is_clear() {
                touched.insert(vertex);
                touched.union_with(children);
            }
        }
        touched.count_ones(..) == size
    }
}
