//! Abstract graph model consumed by every algorithm in this crate.
//!
//! A producer (a map loader, a puzzle generator, a test fixture) implements
//! [`Graph`] and [`Edge`] for its own types; the algorithms only ever read
//! through these traits and never construct nodes.
//!
//! # Directedness
//!
//! There is no separate directed/undirected graph type. Each edge decides,
//! relative to one of its endpoints, which other endpoints can be reached
//! through it. An undirected edge answers symmetrically, a directed edge
//! only from its tail.
//!
//! # Snapshot contract
//!
//! Algorithms borrow the graph immutably for their whole lifetime. A graph
//! must not be mutated behind that borrow (e.g. through interior
//! mutability) while an algorithm runs against it.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use crate::config::Config;

/// Bounds every node value must satisfy. Implemented for all such types.
pub trait NodeRef: Clone + Eq + Hash + Debug {}

impl<T: Clone + Eq + Hash + Debug> NodeRef for T {}

/// A connector between two or more node references.
///
/// Equality and hashing must reflect edge *identity*: two parallel edges
/// between the same nodes are different edges.
pub trait Edge: Clone + Eq + Hash + Debug {
    type Node: NodeRef;

    /// The node references this edge connects (at least two slots; a
    /// self-loop lists the same node twice).
    fn nodes(&self) -> &[Self::Node];

    /// Endpoints reachable through this edge when standing on `from`.
    ///
    /// Empty if `from` is not an endpoint or the edge cannot be used from it.
    fn traversable_nodes(&self, from: &Self::Node) -> Vec<Self::Node>;

    fn is_traversable(&self, from: &Self::Node) -> bool {
        !self.traversable_nodes(from).is_empty()
    }

    /// Scalar weight of the edge, if it carries one.
    fn weight(&self) -> Option<f64> {
        None
    }

    /// Weight of moving from `from` to `to` through this edge.
    fn traversal_weight(&self, _from: &Self::Node, _to: &Self::Node) -> Option<f64> {
        self.weight()
    }

    fn touches(&self, node: &Self::Node) -> bool {
        self.nodes().contains(node)
    }

    fn is_self_loop(&self) -> bool {
        let nodes = self.nodes();
        nodes.len() == 2 && nodes[0] == nodes[1]
    }
}

/// Read-only view of a graph: a node set plus an edge set with adjacency
/// queries.
///
/// Queries about a node that is not a member return empty results; the
/// algorithms check membership of their endpoints up front and report
/// [`GraphError::UnknownNode`](crate::GraphError::UnknownNode) instead.
pub trait Graph {
    type Node: NodeRef;
    type Edge: Edge<Node = Self::Node>;

    /// All nodes, each exactly once.
    fn nodes(&self) -> Vec<Self::Node>;

    /// All edges, each exactly once.
    fn edges(&self) -> Vec<Self::Edge>;

    /// Edges touching `node`, whether or not they are traversable from it.
    fn adjacent_edges(&self, node: &Self::Node) -> Vec<Self::Edge>;

    fn contains_node(&self, node: &Self::Node) -> bool {
        self.nodes().contains(node)
    }

    fn node_count(&self) -> usize {
        self.nodes().len()
    }

    /// Intrinsic cost of entering `node`, if the node type carries one.
    fn node_weight(&self, _node: &Self::Node) -> Option<f64> {
        None
    }

    /// Edges usable when leaving `node`.
    fn traversable_edges(&self, node: &Self::Node) -> Vec<Self::Edge> {
        self.adjacent_edges(node)
            .into_iter()
            .filter(|edge| edge.is_traversable(node))
            .collect()
    }

    /// Nodes reachable in one step from `node`, once per edge leading there.
    fn traversable_nodes(&self, node: &Self::Node) -> Vec<Self::Node> {
        self.traversable_edges(node)
            .iter()
            .flat_map(|edge| edge.traversable_nodes(node))
            .collect()
    }

    /// Distinct nodes sharing an edge with `node`, excluding `node` itself
    /// unless it has a self-loop.
    fn adjacent_nodes(&self, node: &Self::Node) -> Vec<Self::Node> {
        let mut seen = Vec::new();
        for edge in self.adjacent_edges(node) {
            let mut skipped_self = false;
            for other in edge.nodes() {
                if other == node && !skipped_self {
                    skipped_self = true;
                    continue;
                }
                if !seen.contains(other) {
                    seen.push(other.clone());
                }
            }
        }
        seen
    }
}

/// Distinct (from, to) moves `edge` offers, over all of its endpoints.
pub fn edge_steps<E: Edge>(edge: &E) -> Vec<(E::Node, E::Node)> {
    let mut steps: Vec<(E::Node, E::Node)> = Vec::new();
    for from in edge.nodes() {
        for to in edge.traversable_nodes(from) {
            let step = (from.clone(), to);
            if !steps.contains(&step) {
                steps.push(step);
            }
        }
    }
    steps
}

/// Cost of stepping from `from` to `to` through `edge`: the traversal weight
/// (or the configured default) plus the intrinsic weight of `to`.
pub fn step_cost<G: Graph>(
    graph: &G,
    edge: &G::Edge,
    from: &G::Node,
    to: &G::Node,
    config: &Config,
) -> f64 {
    let edge_weight = edge
        .traversal_weight(from, to)
        .unwrap_or(config.default_edge_weight);
    edge_weight + graph.node_weight(to).unwrap_or(0.0)
}

/// Total cost of walking `edges` in order starting at `start`, using the
/// default configuration. Returns `None` if the edges do not form a walk.
///
/// A hyper-edge can lead to several endpoints. Every one of them is
/// followed, and the cheapest complete walk wins.
pub fn path_cost<G: Graph>(graph: &G, start: &G::Node, edges: &[G::Edge]) -> Option<f64> {
    path_cost_with(graph, start, edges, &Config::default())
}

pub fn path_cost_with<G: Graph>(
    graph: &G,
    start: &G::Node,
    edges: &[G::Edge],
    config: &Config,
) -> Option<f64> {
    walk(start, edges, |edge, from, to| {
        step_cost(graph, edge, from, to, config)
    })
    .map(|(total, _)| total)
}

/// Nodes visited by walking `edges` from `start`, including `start`.
///
/// When a hyper-edge leaves a choice, the first endpoint from which the
/// remaining edges can still be walked is taken.
pub fn path_nodes<G: Graph>(start: &G::Node, edges: &[G::Edge]) -> Option<Vec<G::Node>> {
    walk(start, edges, |_, _, _| 0.0).map(|(_, nodes)| nodes)
}

/// Layered walk over `edges`: layer `i` holds every node reachable after
/// `i` edges, its best cost so far and its position in layer `i - 1`.
fn walk<N: NodeRef, E: Edge<Node = N>>(
    start: &N,
    edges: &[E],
    mut cost: impl FnMut(&E, &N, &N) -> f64,
) -> Option<(f64, Vec<N>)> {
    let mut layers: Vec<Vec<(N, f64, usize)>> = vec![vec![(start.clone(), 0.0, 0)]];

    for edge in edges {
        let prev = layers.last()?;
        let mut next: Vec<(N, f64, usize)> = Vec::new();
        let mut index: HashMap<N, usize> = HashMap::new();
        for (i, (from, total, _)) in prev.iter().enumerate() {
            for to in edge.traversable_nodes(from) {
                let candidate = total + cost(edge, from, &to);
                match index.get(&to) {
                    Some(&j) => {
                        if candidate < next[j].1 {
                            next[j] = (to, candidate, i);
                        }
                    }
                    None => {
                        index.insert(to.clone(), next.len());
                        next.push((to, candidate, i));
                    }
                }
            }
        }
        if next.is_empty() {
            return None;
        }
        layers.push(next);
    }

    let last = layers.last()?;
    let (mut pos, &(_, total, _)) = last
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.1.total_cmp(&b.1.1))?;
    let mut nodes = Vec::with_capacity(layers.len());
    for layer in layers.iter().rev() {
        let (node, _, back) = &layer[pos];
        nodes.push(node.clone());
        pos = *back;
    }
    nodes.reverse();
    Some((total, nodes))
}
