pub mod model;
pub mod traversal;

pub use model::{Label, LabeledGraph, VertexId};
pub use traversal::{GraphTraversal, SearchOrder};
