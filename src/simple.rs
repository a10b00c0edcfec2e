//! A concrete, builder-style graph container.
//!
//! `SimpleGraph` is what fixtures and small producers use to hand a graph to
//! the algorithms. It supports directed and undirected edges, parallel
//! edges, self-loops, hyper-edges and intrinsic node weights. Edges get a
//! sequential [`EdgeId`] and compare by it, so parallel edges stay distinct.

use petgraph::EdgeType;
use petgraph::visit::EdgeRef;
use serde::Serialize;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use crate::error::{GraphError, Result};
use crate::graph::{Edge, Graph, NodeRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EdgeId(pub usize);

impl std::fmt::Display for EdgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "e{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    Undirected,
    /// Traversable only from the first node to the others.
    Directed,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimpleEdge<N> {
    id: EdgeId,
    nodes: Vec<N>,
    direction: Direction,
    #[serde(skip_serializing_if = "Option::is_none")]
    weight: Option<f64>,
}

impl<N> SimpleEdge<N> {
    pub fn id(&self) -> EdgeId {
        self.id
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_directed(&self) -> bool {
        self.direction == Direction::Directed
    }
}

impl<N> PartialEq for SimpleEdge<N> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<N> Eq for SimpleEdge<N> {}

impl<N> Hash for SimpleEdge<N> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<N: NodeRef> Edge for SimpleEdge<N> {
    type Node = N;

    fn nodes(&self) -> &[N] {
        &self.nodes
    }

    fn traversable_nodes(&self, from: &N) -> Vec<N> {
        match self.direction {
            Direction::Directed => {
                if self.nodes[0] == *from {
                    self.nodes[1..].to_vec()
                } else {
                    Vec::new()
                }
            }
            Direction::Undirected => match self.nodes.iter().position(|n| n == from) {
                Some(pos) => self
                    .nodes
                    .iter()
                    .enumerate()
                    .filter(|&(i, _)| i != pos)
                    .map(|(_, n)| n.clone())
                    .collect(),
                None => Vec::new(),
            },
        }
    }

    fn weight(&self) -> Option<f64> {
        self.weight
    }
}

#[derive(Debug, Clone)]
pub struct SimpleGraph<N: NodeRef> {
    nodes: Vec<N>,
    index: HashMap<N, usize>,
    /// Edge positions touching each node, indexed like `nodes`.
    incidence: Vec<Vec<usize>>,
    edges: Vec<SimpleEdge<N>>,
    node_weights: HashMap<N, f64>,
}

impl<N: NodeRef> Default for SimpleGraph<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: NodeRef> SimpleGraph<N> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            index: HashMap::new(),
            incidence: Vec::new(),
            edges: Vec::new(),
            node_weights: HashMap::new(),
        }
    }

    /// Add a node. Returns false if it was already present.
    pub fn add_node(&mut self, node: N) -> bool {
        if self.index.contains_key(&node) {
            return false;
        }
        self.index.insert(node.clone(), self.nodes.len());
        self.nodes.push(node);
        self.incidence.push(Vec::new());
        true
    }

    /// Add (or update) a node carrying an intrinsic entry cost.
    pub fn add_weighted_node(&mut self, node: N, weight: f64) {
        self.add_node(node.clone());
        self.node_weights.insert(node, weight);
    }

    pub fn add_edge(&mut self, a: N, b: N) -> SimpleEdge<N> {
        self.insert_edge(vec![a, b], Direction::Undirected, None)
    }

    pub fn add_weighted_edge(&mut self, a: N, b: N, weight: f64) -> SimpleEdge<N> {
        self.insert_edge(vec![a, b], Direction::Undirected, Some(weight))
    }

    pub fn add_directed_edge(&mut self, from: N, to: N) -> SimpleEdge<N> {
        self.insert_edge(vec![from, to], Direction::Directed, None)
    }

    pub fn add_weighted_directed_edge(&mut self, from: N, to: N, weight: f64) -> SimpleEdge<N> {
        self.insert_edge(vec![from, to], Direction::Directed, Some(weight))
    }

    /// Add an undirected edge joining every node in `nodes`.
    pub fn add_hyperedge(&mut self, nodes: Vec<N>, weight: Option<f64>) -> Result<SimpleEdge<N>> {
        if nodes.len() < 2 {
            return Err(GraphError::DegenerateEdge {
                edge: EdgeId(self.edges.len()).to_string(),
                count: nodes.len(),
            });
        }
        Ok(self.insert_edge(nodes, Direction::Undirected, weight))
    }

    fn insert_edge(
        &mut self,
        nodes: Vec<N>,
        direction: Direction,
        weight: Option<f64>,
    ) -> SimpleEdge<N> {
        let position = self.edges.len();
        let mut touched: Vec<usize> = Vec::with_capacity(nodes.len());
        for node in &nodes {
            self.add_node(node.clone());
            let idx = self.index[node];
            if !touched.contains(&idx) {
                touched.push(idx);
                self.incidence[idx].push(position);
            }
        }
        let edge = SimpleEdge {
            id: EdgeId(position),
            nodes,
            direction,
            weight,
        };
        self.edges.push(edge.clone());
        edge
    }

    pub fn edge(&self, id: EdgeId) -> Option<&SimpleEdge<N>> {
        self.edges.get(id.0)
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Convert a petgraph graph whose edge weights are costs.
    ///
    /// Node weights become the node values, so they must be distinct.
    pub fn from_petgraph<Ty: EdgeType>(source: &petgraph::Graph<N, f64, Ty>) -> Result<Self> {
        let mut graph = SimpleGraph::new();
        for idx in source.node_indices() {
            let node = &source[idx];
            if !graph.add_node(node.clone()) {
                return Err(GraphError::DuplicateNode(format!("{:?}", node)));
            }
        }

        let direction = if source.is_directed() {
            Direction::Directed
        } else {
            Direction::Undirected
        };
        for edge in source.edge_references() {
            let from = source[edge.source()].clone();
            let to = source[edge.target()].clone();
            graph.insert_edge(vec![from, to], direction, Some(*edge.weight()));
        }

        log::debug!(
            "converted petgraph graph: {} nodes, {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        Ok(graph)
    }
}

impl<N: NodeRef> Graph for SimpleGraph<N> {
    type Node = N;
    type Edge = SimpleEdge<N>;

    fn nodes(&self) -> Vec<N> {
        self.nodes.clone()
    }

    fn edges(&self) -> Vec<SimpleEdge<N>> {
        self.edges.clone()
    }

    fn adjacent_edges(&self, node: &N) -> Vec<SimpleEdge<N>> {
        match self.index.get(node) {
            Some(&idx) => self.incidence[idx]
                .iter()
                .map(|&pos| self.edges[pos].clone())
                .collect(),
            None => Vec::new(),
        }
    }

    fn contains_node(&self, node: &N) -> bool {
        self.index.contains_key(node)
    }

    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn node_weight(&self, node: &N) -> Option<f64> {
        self.node_weights.get(node).copied()
    }
}
