//! Cycle detection and enumeration over any [`Graph`].
//!
//! 1. **Cycle detection** ([`CycleDetector`]) answers "is there at least one
//!    cycle?" with a three-color DFS in O(V+E) time and O(V) space. It
//!    short-circuits on the first cycle and can hand that cycle back as a
//!    witness.
//!
//! 2. **Cycle enumeration** ([`CycleFinder`]) lists every simple cycle and
//!    derives girth, circumference, unicyclicity and pancyclicity from the
//!    result ([`CycleAnalysis`]).
//!
//! Both walk the graph with an explicit stack of frames instead of native
//! recursion, so deep graphs cannot overflow the call stack.
//!
//! # Undirected edges
//!
//! A DFS never leaves a node through the edge it arrived by. That keeps a
//! single undirected edge from looking like a 2-cycle, while two parallel
//! undirected edges between the same nodes still form one.
//!
//! # Performance
//!
//! Enumeration is exponential on dense graphs: the number of simple cycles
//! itself can be exponential in V (a complete graph on 12 nodes already has
//! tens of millions). Use [`CycleDetector`] when existence is enough.

use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::hash::{DefaultHasher, Hash, Hasher};

use crate::check::{is_simple, validate_graph};
use crate::error::{GraphError, Result};
use crate::graph::{Edge, Graph, NodeRef};

// ─────────────────────────────────────────────────────────────────────────────
// Cycle value
// ─────────────────────────────────────────────────────────────────────────────

/// A closed walk: `nodes[0] == nodes[len]`, and `edges[i]` leads from
/// `nodes[i]` to `nodes[i + 1]`.
///
/// Two cycles are equal when they use the same multiset of edges, regardless
/// of starting node or direction.
#[derive(Debug, Clone, Serialize)]
pub struct Cycle<N, E> {
    nodes: Vec<N>,
    edges: Vec<E>,
}

impl<N: NodeRef, E: Edge<Node = N>> Cycle<N, E> {
    /// Build a cycle from a closed walk, checking that it really is one.
    pub fn new(nodes: Vec<N>, edges: Vec<E>) -> Result<Self> {
        if edges.is_empty() {
            return Err(GraphError::MalformedCycle("no edges".to_string()));
        }
        if nodes.len() != edges.len() + 1 {
            return Err(GraphError::MalformedCycle(format!(
                "{} edges need {} nodes, got {}",
                edges.len(),
                edges.len() + 1,
                nodes.len()
            )));
        }
        if nodes.first() != nodes.last() {
            return Err(GraphError::MalformedCycle(format!(
                "walk starts at {:?} but ends at {:?}",
                nodes[0],
                nodes[nodes.len() - 1]
            )));
        }
        for (i, edge) in edges.iter().enumerate() {
            if !edge.traversable_nodes(&nodes[i]).contains(&nodes[i + 1]) {
                return Err(GraphError::MalformedCycle(format!(
                    "edge {:?} does not lead from {:?} to {:?}",
                    edge,
                    nodes[i],
                    nodes[i + 1]
                )));
            }
        }
        Ok(Self { nodes, edges })
    }

    /// Number of edges.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// The closed node sequence (first node repeated at the end).
    pub fn nodes(&self) -> &[N] {
        &self.nodes
    }

    pub fn edges(&self) -> &[E] {
        &self.edges
    }

    pub fn start(&self) -> &N {
        &self.nodes[0]
    }

    pub fn contains_node(&self, node: &N) -> bool {
        self.nodes.contains(node)
    }

    pub fn contains_edge(&self, edge: &E) -> bool {
        self.edges.contains(edge)
    }

    /// Fail if the cycle names a node outside `graph`.
    pub fn check_members<G: Graph<Node = N, Edge = E>>(&self, graph: &G) -> Result<()> {
        match self.nodes.iter().find(|n| !graph.contains_node(n)) {
            Some(node) => Err(GraphError::MalformedCycle(format!(
                "node {:?} is not a member of the graph",
                node
            ))),
            None => Ok(()),
        }
    }
}

fn edge_counts<E: Eq + Hash>(edges: &[E]) -> HashMap<&E, usize> {
    let mut counts = HashMap::new();
    for edge in edges {
        *counts.entry(edge).or_insert(0) += 1;
    }
    counts
}

impl<N, E: Eq + Hash> PartialEq for Cycle<N, E> {
    fn eq(&self, other: &Self) -> bool {
        self.edges.len() == other.edges.len()
            && edge_counts(&self.edges) == edge_counts(&other.edges)
    }
}

impl<N, E: Eq + Hash> Eq for Cycle<N, E> {}

impl<N, E: Hash> Hash for Cycle<N, E> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Order-independent: sum of per-edge hashes.
        let mut combined: u64 = 0;
        for edge in &self.edges {
            let mut hasher = DefaultHasher::new();
            edge.hash(&mut hasher);
            combined = combined.wrapping_add(hasher.finish());
        }
        self.edges.len().hash(state);
        combined.hash(state);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Shared DFS frame
// ─────────────────────────────────────────────────────────────────────────────

/// One entry of the explicit DFS stack.
struct Frame<N, E> {
    node: N,
    /// Edge used to reach `node` (None for the DFS root).
    incoming: Option<E>,
    /// Every (edge, target) step leaving `node`.
    steps: Vec<(E, N)>,
    next_step: usize,
}

impl<N: NodeRef, E: Edge<Node = N>> Frame<N, E> {
    fn open<G: Graph<Node = N, Edge = E>>(graph: &G, node: N, incoming: Option<E>) -> Self {
        let steps = graph
            .traversable_edges(&node)
            .into_iter()
            .flat_map(|edge| {
                edge.traversable_nodes(&node)
                    .into_iter()
                    .map(move |target| (edge.clone(), target))
            })
            .collect();
        Self {
            node,
            incoming,
            steps,
            next_step: 0,
        }
    }

    /// Next step that does not go back through the incoming edge.
    fn advance(&mut self) -> Option<(E, N)> {
        while self.next_step < self.steps.len() {
            let (edge, target) = self.steps[self.next_step].clone();
            self.next_step += 1;
            if self.incoming.as_ref() != Some(&edge) {
                return Some((edge, target));
            }
        }
        None
    }
}

/// Close the cycle formed by the stack from `from` to the top plus `closing`.
fn close_cycle<N: Clone, E: Clone>(stack: &[Frame<N, E>], from: usize, closing: E) -> Cycle<N, E> {
    let mut nodes: Vec<N> = stack[from..].iter().map(|f| f.node.clone()).collect();
    nodes.push(stack[from].node.clone());
    let mut edges: Vec<E> = stack[from + 1..]
        .iter()
        .filter_map(|f| f.incoming.clone())
        .collect();
    edges.push(closing);
    Cycle { nodes, edges }
}

// ─────────────────────────────────────────────────────────────────────────────
// 1. Cycle detection (three-color DFS)
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    /// Not visited yet.
    White,
    /// On the current DFS path.
    Gray,
    /// Fully explored.
    Black,
}

/// Existence check for cycles.
///
/// # Complexity
/// * Time: O(V + E)
/// * Space: O(V)
///
/// # Example
/// ```
/// use graphcore::{CycleDetector, SimpleGraph};
///
/// let mut graph = SimpleGraph::new();
/// graph.add_directed_edge("a", "b");
/// graph.add_directed_edge("b", "a");
/// assert!(CycleDetector::new(&graph).unwrap().has_cycle());
/// ```
pub struct CycleDetector<'g, G: Graph> {
    graph: &'g G,
}

impl<'g, G: Graph> CycleDetector<'g, G> {
    pub fn new(graph: &'g G) -> Result<Self> {
        validate_graph(graph)?;
        Ok(Self { graph })
    }

    pub fn has_cycle(&self) -> bool {
        self.find_cycle().is_some()
    }

    /// The first cycle the DFS runs into, if any.
    pub fn find_cycle(&self) -> Option<Cycle<G::Node, G::Edge>> {
        let mut color: HashMap<G::Node, Color> = HashMap::new();

        for start in self.graph.nodes() {
            if color.get(&start).copied().unwrap_or(Color::White) != Color::White {
                continue;
            }

            color.insert(start.clone(), Color::Gray);
            let mut stack = vec![Frame::open(self.graph, start, None)];

            while let Some(frame) = stack.last_mut() {
                match frame.advance() {
                    Some((edge, target)) => {
                        match color.get(&target).copied().unwrap_or(Color::White) {
                            Color::White => {
                                color.insert(target.clone(), Color::Gray);
                                stack.push(Frame::open(self.graph, target, Some(edge)));
                            }
                            Color::Gray => {
                                let from = stack.iter().rposition(|f| f.node == target)?;
                                let cycle = close_cycle(&stack, from, edge);
                                log::debug!(
                                    "cycle of length {} detected at {:?}",
                                    cycle.len(),
                                    target
                                );
                                return Some(cycle);
                            }
                            Color::Black => {}
                        }
                    }
                    None => {
                        if let Some(done) = stack.pop() {
                            color.insert(done.node, Color::Black);
                        }
                    }
                }
            }
        }

        None
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// 2. Cycle enumeration
// ─────────────────────────────────────────────────────────────────────────────

/// Exhaustive enumeration of simple cycles.
///
/// From every node not yet covered, a backtracking DFS walks all simple
/// paths; an edge back onto the current path closes a cycle. Cycles are
/// deduplicated by edge multiset, so a cycle met from both directions or
/// from several entry points is reported once. Nodes covered by one root
/// are skipped by later roots: every cycle through them is reachable from
/// that root and has already been found.
///
/// See the module docs for the exponential worst case.
pub struct CycleFinder<'g, G: Graph> {
    graph: &'g G,
}

impl<'g, G: Graph> CycleFinder<'g, G> {
    pub fn new(graph: &'g G) -> Result<Self> {
        validate_graph(graph)?;
        Ok(Self { graph })
    }

    /// Every simple cycle, in discovery order.
    pub fn find_cycles(&self) -> Vec<Cycle<G::Node, G::Edge>> {
        let mut covered: HashSet<G::Node> = HashSet::new();
        let mut seen: HashSet<Cycle<G::Node, G::Edge>> = HashSet::new();
        let mut cycles = Vec::new();

        for start in self.graph.nodes() {
            if covered.contains(&start) {
                continue;
            }

            let mut reached: HashSet<G::Node> = HashSet::new();
            reached.insert(start.clone());
            // Position of each node on the current path.
            let mut on_path: HashMap<G::Node, usize> = HashMap::new();
            on_path.insert(start.clone(), 0);
            let mut stack = vec![Frame::open(self.graph, start, None)];

            while let Some(frame) = stack.last_mut() {
                match frame.advance() {
                    Some((edge, target)) => {
                        if let Some(&from) = on_path.get(&target) {
                            let cycle = close_cycle(&stack, from, edge);
                            if seen.insert(cycle.clone()) {
                                log::trace!("found cycle of length {}", cycle.len());
                                cycles.push(cycle);
                            }
                            continue;
                        }
                        if covered.contains(&target) {
                            continue;
                        }
                        reached.insert(target.clone());
                        on_path.insert(target.clone(), stack.len());
                        stack.push(Frame::open(self.graph, target, Some(edge)));
                    }
                    None => {
                        if let Some(done) = stack.pop() {
                            on_path.remove(&done.node);
                        }
                    }
                }
            }

            covered.extend(reached);
        }

        log::debug!(
            "enumerated {} cycles over {} nodes",
            cycles.len(),
            covered.len()
        );
        cycles
    }

    pub fn analyze(&self) -> CycleAnalysis<G::Node, G::Edge> {
        CycleAnalysis {
            cycles: self.find_cycles(),
            node_count: self.graph.node_count(),
            simple: is_simple(self.graph),
        }
    }

    pub fn cycle_count(&self) -> usize {
        self.find_cycles().len()
    }

    pub fn girth(&self) -> Option<usize> {
        self.analyze().girth()
    }

    pub fn circumference(&self) -> Option<usize> {
        self.analyze().circumference()
    }

    pub fn is_unicyclic(&self) -> bool {
        self.analyze().is_unicyclic()
    }

    pub fn is_pancyclic(&self) -> bool {
        self.analyze().is_pancyclic()
    }
}

/// Enumerated cycles plus the graph facts needed to derive metrics.
#[derive(Debug, Clone)]
pub struct CycleAnalysis<N, E> {
    pub cycles: Vec<Cycle<N, E>>,
    pub node_count: usize,
    /// No self-loops, hyper-edges or parallel edges.
    pub simple: bool,
}

/// Serializable summary of a [`CycleAnalysis`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleReport {
    pub cycle_count: usize,
    pub girth: Option<usize>,
    pub circumference: Option<usize>,
    pub unicyclic: bool,
    pub pancyclic: bool,
    pub node_count: usize,
    pub simple: bool,
    /// Distinct cycle lengths, ascending.
    pub lengths: Vec<usize>,
}

impl<N, E> CycleAnalysis<N, E> {
    pub fn cycle_count(&self) -> usize {
        self.cycles.len()
    }

    pub fn is_acyclic(&self) -> bool {
        self.cycles.is_empty()
    }

    /// Shortest cycle length, None if acyclic.
    pub fn girth(&self) -> Option<usize> {
        self.cycles.iter().map(|c| c.edges.len()).min()
    }

    /// Longest cycle length, None if acyclic.
    pub fn circumference(&self) -> Option<usize> {
        self.cycles.iter().map(|c| c.edges.len()).max()
    }

    /// Exactly one cycle in a simple graph.
    pub fn is_unicyclic(&self) -> bool {
        self.simple && self.cycles.len() == 1
    }

    /// Cycles of every length from 3 to the node count. Graphs with fewer
    /// than 3 nodes are not pancyclic.
    pub fn is_pancyclic(&self) -> bool {
        if self.node_count < 3 {
            return false;
        }
        let lengths = self.lengths();
        (3..=self.node_count).all(|len| lengths.contains(&len))
    }

    pub fn lengths(&self) -> BTreeSet<usize> {
        self.cycles.iter().map(|c| c.edges.len()).collect()
    }

    pub fn cycles_of_length(&self, len: usize) -> impl Iterator<Item = &Cycle<N, E>> {
        self.cycles.iter().filter(move |c| c.edges.len() == len)
    }

    pub fn report(&self) -> CycleReport {
        CycleReport {
            cycle_count: self.cycle_count(),
            girth: self.girth(),
            circumference: self.circumference(),
            unicyclic: self.is_unicyclic(),
            pancyclic: self.is_pancyclic(),
            node_count: self.node_count,
            simple: self.simple,
            lengths: self.lengths().into_iter().collect(),
        }
    }
}
