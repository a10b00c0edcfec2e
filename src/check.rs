use serde::Serialize;
use std::collections::HashSet;

use crate::error::{GraphError, Result};
use crate::graph::{Edge, Graph};

/// Result of checking a graph for structural problems
#[derive(Debug, Clone, Default, Serialize)]
pub struct CheckResult {
    pub dangling_refs: Vec<DanglingRef>,
    pub degenerate_edges: Vec<String>,
    pub ok: bool,
}

/// An edge slot naming a node outside the graph
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DanglingRef {
    pub edge: String,
    pub node: String,
}

/// Check for edges referencing nodes that are not members of the graph
pub fn check_dangling_edges<G: Graph>(graph: &G) -> Vec<DanglingRef> {
    let members: HashSet<G::Node> = graph.nodes().into_iter().collect();
    let mut dangling = Vec::new();

    for edge in graph.edges() {
        for node in edge.nodes() {
            if !members.contains(node) {
                dangling.push(DanglingRef {
                    edge: format!("{:?}", edge),
                    node: format!("{:?}", node),
                });
            }
        }
    }

    dangling
}

/// Check for edges with fewer than two node slots
pub fn check_degenerate_edges<G: Graph>(graph: &G) -> Vec<String> {
    graph
        .edges()
        .iter()
        .filter(|edge| edge.nodes().len() < 2)
        .map(|edge| format!("{:?}", edge))
        .collect()
}

/// Run all checks and return a summary
pub fn check_all<G: Graph>(graph: &G) -> CheckResult {
    let dangling_refs = check_dangling_edges(graph);
    let degenerate_edges = check_degenerate_edges(graph);
    let ok = dangling_refs.is_empty() && degenerate_edges.is_empty();

    CheckResult {
        dangling_refs,
        degenerate_edges,
        ok,
    }
}

/// Fail on the first structural violation.
///
/// Every algorithm calls this before touching the graph.
pub fn validate_graph<G: Graph>(graph: &G) -> Result<()> {
    let members: HashSet<G::Node> = graph.nodes().into_iter().collect();
    let edges = graph.edges();

    for edge in &edges {
        let slots = edge.nodes();
        if slots.len() < 2 {
            return Err(GraphError::DegenerateEdge {
                edge: format!("{:?}", edge),
                count: slots.len(),
            });
        }
        if let Some(node) = slots.iter().find(|n| !members.contains(*n)) {
            return Err(GraphError::DanglingEdge {
                edge: format!("{:?}", edge),
                node: format!("{:?}", node),
            });
        }
    }

    log::trace!(
        "graph validated: {} nodes, {} edges",
        members.len(),
        edges.len()
    );
    Ok(())
}

/// Fail unless `node` is a member of `graph`.
pub fn require_node<G: Graph>(graph: &G, node: &G::Node) -> Result<()> {
    if graph.contains_node(node) {
        Ok(())
    } else {
        Err(GraphError::unknown_node(node))
    }
}

/// Whether the graph has no self-loops, no hyper-edges and no two edges
/// offering the same (from, to) step.
pub fn is_simple<G: Graph>(graph: &G) -> bool {
    let mut steps: HashSet<(G::Node, G::Node)> = HashSet::new();

    for edge in graph.edges() {
        let slots = edge.nodes();
        if slots.len() != 2 || edge.is_self_loop() {
            return false;
        }
        for from in slots {
            for to in edge.traversable_nodes(from) {
                if !steps.insert((from.clone(), to)) {
                    return false;
                }
            }
        }
    }

    true
}
