//! Johnson reweighting: make every edge cost non-negative while keeping
//! shortest paths intact.
//!
//! A virtual source is joined to every node by a zero-cost edge and a
//! [`ShortestPathSource`] (Bellman–Ford by default) computes the potential
//! `p(v)` of every node from it. Each step `u → v` of cost `w` is then
//! charged `w + p(u) - p(v)`, which is non-negative whenever there is no
//! negative cycle. Any path from `s` to `t` changes in cost by exactly
//! `p(s) - p(t)`, so the ranking of `s → t` paths is unchanged.
//!
//! The result, a [`ReweightedGraph`], is meant for repeated non-negative
//! single-source searches (e.g. one Dijkstra or A* run per source).

use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use crate::bellman_ford::{BellmanFord, ShortestPathSource};
use crate::check::validate_graph;
use crate::config::Config;
use crate::error::{GraphError, Result};
use crate::graph::{Edge, Graph, edge_steps, step_cost};
use crate::simple::SimpleGraph;

/// Node type of the augmented graph: the caller's nodes plus the virtual
/// source, which never collides with a real node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Augmented<N> {
    Source,
    Node(N),
}

pub struct JohnsonTransformer<S = BellmanFord> {
    source: S,
    config: Config,
}

impl JohnsonTransformer<BellmanFord> {
    pub fn new() -> Self {
        Self::with_source(BellmanFord)
    }
}

impl Default for JohnsonTransformer<BellmanFord> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ShortestPathSource> JohnsonTransformer<S> {
    /// Use a different single-source collaborator for the potentials.
    pub fn with_source(source: S) -> Self {
        Self {
            source,
            config: Config::default(),
        }
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Compute potentials and return the reweighted view of `graph`.
    ///
    /// Fails with `NonFiniteWeight` on infinite (or NaN) edge or node weights
    /// and with `NegativeCycle` when the potentials cannot be computed.
    pub fn reweight<'g, G: Graph>(&self, graph: &'g G) -> Result<ReweightedGraph<'g, G>> {
        validate_graph(graph)?;
        check_finite_weights(graph)?;

        let nodes = graph.nodes();
        let edges = graph.edges();

        let mut augmented: SimpleGraph<Augmented<G::Node>> = SimpleGraph::new();
        augmented.add_node(Augmented::Source);
        for node in &nodes {
            augmented.add_weighted_directed_edge(
                Augmented::Source,
                Augmented::Node(node.clone()),
                0.0,
            );
        }
        for edge in &edges {
            for (from, to) in edge_steps(edge) {
                let cost = step_cost(graph, edge, &from, &to, &self.config);
                augmented.add_weighted_directed_edge(
                    Augmented::Node(from),
                    Augmented::Node(to),
                    cost,
                );
            }
        }

        let distances =
            self.source
                .shortest_distances(&augmented, &Augmented::Source, &self.config)?;

        let mut potentials: HashMap<G::Node, f64> = HashMap::with_capacity(nodes.len());
        for node in &nodes {
            let potential = distances
                .get(&Augmented::Node(node.clone()))
                .copied()
                .unwrap_or(f64::INFINITY);
            if !potential.is_finite() {
                return Err(GraphError::InvalidPotential {
                    edge: format!("virtual source -> {:?}", node),
                    cost: potential,
                });
            }
            potentials.insert(node.clone(), potential);
        }
        log::debug!("Johnson: computed potentials for {} nodes", potentials.len());

        let mut reweighted = Vec::with_capacity(edges.len());
        let mut positions = HashMap::with_capacity(edges.len());
        for edge in edges {
            let mut weights = Vec::new();
            for (from, to) in edge_steps(&edge) {
                let cost = step_cost(graph, &edge, &from, &to, &self.config)
                    + potentials[&from]
                    - potentials[&to];
                let cost = if cost >= 0.0 {
                    cost
                } else if cost >= -self.config.reweight_tolerance {
                    0.0
                } else {
                    return Err(GraphError::InvalidPotential {
                        edge: format!("{:?}", edge),
                        cost,
                    });
                };
                weights.push((from, to, cost));
            }
            positions.insert(edge.clone(), reweighted.len());
            reweighted.push(ReweightedEdge {
                inner: edge,
                weights,
            });
        }

        Ok(ReweightedGraph {
            graph,
            edges: reweighted,
            positions,
            potentials,
        })
    }
}

fn check_finite_weights<G: Graph>(graph: &G) -> Result<()> {
    for edge in graph.edges() {
        if let Some(weight) = edge.weight()
            && !weight.is_finite()
        {
            return Err(GraphError::NonFiniteWeight {
                element: format!("{:?}", edge),
                weight,
            });
        }
        for (from, to) in edge_steps(&edge) {
            if let Some(weight) = edge.traversal_weight(&from, &to)
                && !weight.is_finite()
            {
                return Err(GraphError::NonFiniteWeight {
                    element: format!("{:?}", edge),
                    weight,
                });
            }
        }
    }
    for node in graph.nodes() {
        if let Some(weight) = graph.node_weight(&node)
            && !weight.is_finite()
        {
            return Err(GraphError::NonFiniteWeight {
                element: format!("{:?}", node),
                weight,
            });
        }
    }
    Ok(())
}

/// An original edge carrying its reweighted cost for each direction it can
/// be traversed in. Equality and hashing follow the original edge.
#[derive(Debug, Clone)]
pub struct ReweightedEdge<E: Edge> {
    inner: E,
    weights: Vec<(E::Node, E::Node, f64)>,
}

impl<E: Edge> ReweightedEdge<E> {
    pub fn original(&self) -> &E {
        &self.inner
    }
}

impl<E: Edge> PartialEq for ReweightedEdge<E> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<E: Edge> Eq for ReweightedEdge<E> {}

impl<E: Edge> Hash for ReweightedEdge<E> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.hash(state);
    }
}

impl<E: Edge> Edge for ReweightedEdge<E> {
    type Node = E::Node;

    fn nodes(&self) -> &[E::Node] {
        self.inner.nodes()
    }

    fn traversable_nodes(&self, from: &E::Node) -> Vec<E::Node> {
        self.inner.traversable_nodes(from)
    }

    /// Reweighted cost of the first direction; use `traversal_weight` for
    /// edges usable both ways.
    fn weight(&self) -> Option<f64> {
        self.weights.first().map(|&(_, _, w)| w)
    }

    fn traversal_weight(&self, from: &E::Node, to: &E::Node) -> Option<f64> {
        self.weights
            .iter()
            .find(|(f, t, _)| f == from && t == to)
            .map(|&(_, _, w)| w)
    }
}

/// Same topology as the input graph, with non-negative edge costs. Node
/// weights are folded into the edge costs, so nodes here carry none.
pub struct ReweightedGraph<'g, G: Graph> {
    graph: &'g G,
    edges: Vec<ReweightedEdge<G::Edge>>,
    positions: HashMap<G::Edge, usize>,
    potentials: HashMap<G::Node, f64>,
}

impl<'g, G: Graph> ReweightedGraph<'g, G> {
    pub fn original(&self) -> &'g G {
        self.graph
    }

    pub fn potential(&self, node: &G::Node) -> Option<f64> {
        self.potentials.get(node).copied()
    }

    pub fn potentials(&self) -> &HashMap<G::Node, f64> {
        &self.potentials
    }

    /// Translate a reweighted `start → end` path cost back to original units.
    pub fn original_cost(&self, start: &G::Node, end: &G::Node, reweighted_cost: f64) -> Result<f64> {
        let p_start = self
            .potential(start)
            .ok_or_else(|| GraphError::unknown_node(start))?;
        let p_end = self
            .potential(end)
            .ok_or_else(|| GraphError::unknown_node(end))?;
        Ok(reweighted_cost - p_start + p_end)
    }
}

impl<G: Graph> Graph for ReweightedGraph<'_, G> {
    type Node = G::Node;
    type Edge = ReweightedEdge<G::Edge>;

    fn nodes(&self) -> Vec<G::Node> {
        self.graph.nodes()
    }

    fn edges(&self) -> Vec<ReweightedEdge<G::Edge>> {
        self.edges.clone()
    }

    fn adjacent_edges(&self, node: &G::Node) -> Vec<ReweightedEdge<G::Edge>> {
        self.graph
            .adjacent_edges(node)
            .iter()
            .filter_map(|edge| self.positions.get(edge))
            .map(|&pos| self.edges[pos].clone())
            .collect()
    }

    fn contains_node(&self, node: &G::Node) -> bool {
        self.graph.contains_node(node)
    }

    fn node_count(&self) -> usize {
        self.graph.node_count()
    }
}
