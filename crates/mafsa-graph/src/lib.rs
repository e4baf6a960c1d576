pub mod component;
pub mod error;
pub mod graph;
pub mod iterator;
pub mod node;
pub mod traversal;

pub use component::{get_transitive_paths, make_connected_components, ConnectedComponent, TransitivePath};
pub use error::{GraphError, Result};
pub use graph::{Graph, GraphStats};
pub use iterator::AcceptedStrings;
pub use node::{Label, Node, NodeId};
pub use traversal::{GraphTraversal, GraphVisitor, MatchKind, MatchResult, PathVisitor};
