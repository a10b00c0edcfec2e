//! Graph algorithms over an abstract graph model.
//!
//! Producers implement [`Graph`] and [`Edge`] for their own node and edge
//! types (or use [`SimpleGraph`]); the algorithms read through those traits
//! only:
//!
//! * [`CycleDetector`] and [`CycleFinder`] for cycle existence and enumeration
//! * [`AstarPathFinder`] for single-pair shortest paths
//! * [`FloydWarshall`] for all-pairs shortest paths
//! * [`JohnsonTransformer`] for reweighting negative edge costs away

pub mod astar;
pub mod bellman_ford;
pub mod check;
pub mod config;
pub mod cycle;
pub mod error;
pub mod floyd_warshall;
pub mod graph;
pub mod johnson;
pub mod simple;

pub use astar::{AstarPath, AstarPathFinder, FnHeuristic, Heuristic, ZeroHeuristic};
pub use bellman_ford::{BellmanFord, ShortestPathSource};
pub use check::{CheckResult, DanglingRef, check_all, is_simple, validate_graph};
pub use config::Config;
pub use cycle::{Cycle, CycleAnalysis, CycleDetector, CycleFinder, CycleReport};
pub use error::{ErrorKind, GraphError, Result};
pub use floyd_warshall::FloydWarshall;
pub use graph::{Edge, Graph, NodeRef, edge_steps, path_cost, path_cost_with, path_nodes, step_cost};
pub use johnson::{Augmented, JohnsonTransformer, ReweightedEdge, ReweightedGraph};
pub use simple::{Direction, EdgeId, SimpleEdge, SimpleGraph};
