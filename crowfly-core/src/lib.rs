//! Shortest paths on undirected road networks with A*
//!
//! The graph is built once from in-memory node and edge collections and is
//! immutable afterwards. Searches borrow it, so one [`GraphStore`] can serve
//! any number of concurrent queries. The heuristic is the great-circle
//! distance to the destination, memoized in a [`HeuristicCache`] shared by
//! all searches on the graph.
//!
//! ```no_run
//! use crowfly_core::{build_graph, find_path, Edge, Node};
//!
//! let graph = build_graph(
//!     vec![Node::new(1, 43.0, 1.0), Node::new(2, 43.0, 1.01)],
//!     vec![Edge::new(1, 2, 0.9)],
//! )?;
//! let path = find_path(&graph, 1, 2)?;
//! assert_eq!(path.total_distance_km, 0.9);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod graph;
pub mod heuristic;
pub mod path;
pub mod search;

pub use error::{ErrorKind, GraphError, InvariantViolation, SearchError};
pub use graph::{build_graph, Edge, GraphStore, Node, NodeId};
pub use heuristic::{haversine_km, HeuristicCache};
pub use path::{PathResult, PathStep};
pub use search::{
    find_path, find_path_with, NoopObserver, SearchObserver, SearchOptions, SearchStats,
    SettledNode,
};
