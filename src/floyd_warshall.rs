//! All-pairs shortest distances with Floyd–Warshall.
//!
//! The tables are computed once when the solver is built and never change;
//! after the graph changes, build a new solver.
//!
//! # Complexity
//! * Time: O(V³) to build, O(path length · degree) per path query
//! * Space: O(V²)

use std::collections::HashMap;

use crate::check::validate_graph;
use crate::config::Config;
use crate::error::{GraphError, Result};
use crate::graph::{Edge, Graph, edge_steps, step_cost};

/// Work item for the iterative in-order expansion of the next-hop table.
enum Expand {
    Segment(usize, usize),
    Emit(usize),
}

pub struct FloydWarshall<'g, G: Graph> {
    graph: &'g G,
    config: Config,
    nodes: Vec<G::Node>,
    index: HashMap<G::Node, usize>,
    /// `dist[x][y]`: best known cost from x to y.
    dist: Vec<Vec<f64>>,
    /// `next[x][y]`: an intermediate node on the best x→y path, None when the
    /// best path is a direct edge (or there is none).
    next: Vec<Vec<Option<usize>>>,
    negative_cycle: bool,
}

impl<'g, G: Graph> FloydWarshall<'g, G> {
    pub fn new(graph: &'g G) -> Result<Self> {
        Self::with_config(graph, Config::default())
    }

    pub fn with_config(graph: &'g G, config: Config) -> Result<Self> {
        validate_graph(graph)?;

        let nodes = graph.nodes();
        let index: HashMap<G::Node, usize> = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), i))
            .collect();
        let n = nodes.len();

        let mut dist = vec![vec![f64::INFINITY; n]; n];
        for (i, row) in dist.iter_mut().enumerate() {
            row[i] = 0.0;
        }
        for edge in graph.edges() {
            for (from, to) in edge_steps(&edge) {
                let (x, y) = (index[&from], index[&to]);
                // A self-loop only matters when it is negative.
                let cost = step_cost(graph, &edge, &from, &to, &config);
                if cost < dist[x][y] {
                    dist[x][y] = cost;
                }
            }
        }

        let mut next = vec![vec![None; n]; n];
        for k in 0..n {
            for x in 0..n {
                let via = dist[x][k];
                if via == f64::INFINITY {
                    continue;
                }
                for y in 0..n {
                    let candidate = via + dist[k][y];
                    if candidate < dist[x][y] {
                        dist[x][y] = candidate;
                        next[x][y] = Some(k);
                    }
                }
            }
        }

        let negative_cycle = (0..n).any(|i| dist[i][i] < 0.0);
        if negative_cycle {
            log::debug!("Floyd-Warshall found a negative cycle among {} nodes", n);
        } else {
            log::trace!("Floyd-Warshall tables built for {} nodes", n);
        }

        Ok(Self {
            graph,
            config,
            nodes,
            index,
            dist,
            next,
            negative_cycle,
        })
    }

    pub fn has_negative_cycle(&self) -> bool {
        self.negative_cycle
    }

    /// Node order used by [`distance_matrix`](Self::distance_matrix).
    pub fn node_order(&self) -> &[G::Node] {
        &self.nodes
    }

    pub fn distance_matrix(&self) -> &[Vec<f64>] {
        &self.dist
    }

    /// Shortest distance from `x` to `y`; infinite when unreachable.
    pub fn distance(&self, x: &G::Node, y: &G::Node) -> Result<f64> {
        let (i, j) = (self.position(x)?, self.position(y)?);
        self.ensure_no_negative_cycle()?;
        Ok(self.dist[i][j])
    }

    pub fn is_connected(&self, x: &G::Node, y: &G::Node) -> Result<bool> {
        Ok(self.distance(x, y)? < f64::INFINITY)
    }

    /// Nodes on the best path from `begin` to `end`, both included.
    pub fn path_nodes(&self, begin: &G::Node, end: &G::Node) -> Result<Option<Vec<G::Node>>> {
        Ok(self
            .path_positions(begin, end)?
            .map(|positions| positions.into_iter().map(|i| self.nodes[i].clone()).collect()))
    }

    /// Edges of the best path from `begin` to `end`, or None when they are not
    /// connected. Between consecutive nodes the cheapest edge is used.
    pub fn best_path(&self, begin: &G::Node, end: &G::Node) -> Result<Option<Vec<G::Edge>>> {
        let Some(positions) = self.path_positions(begin, end)? else {
            return Ok(None);
        };

        let mut edges = Vec::with_capacity(positions.len() - 1);
        for pair in positions.windows(2) {
            let (from, to) = (&self.nodes[pair[0]], &self.nodes[pair[1]]);
            let edge = self
                .cheapest_edge(from, to)
                .ok_or_else(|| GraphError::unknown_node(to))?;
            edges.push(edge);
        }
        Ok(Some(edges))
    }

    fn path_positions(&self, begin: &G::Node, end: &G::Node) -> Result<Option<Vec<usize>>> {
        let (i, j) = (self.position(begin)?, self.position(end)?);
        if i == j {
            return Err(GraphError::same_endpoints(begin));
        }
        self.ensure_no_negative_cycle()?;
        if self.dist[i][j] == f64::INFINITY {
            return Ok(None);
        }

        let mut positions = vec![i];
        let mut work = vec![Expand::Segment(i, j)];
        while let Some(item) = work.pop() {
            match item {
                Expand::Segment(x, y) => {
                    if let Some(k) = self.next[x][y] {
                        work.push(Expand::Segment(k, y));
                        work.push(Expand::Emit(k));
                        work.push(Expand::Segment(x, k));
                    }
                }
                Expand::Emit(k) => positions.push(k),
            }
        }
        positions.push(j);

        if positions.len() < 2 {
            return Ok(None);
        }
        Ok(Some(positions))
    }

    fn cheapest_edge(&self, from: &G::Node, to: &G::Node) -> Option<G::Edge> {
        self.graph
            .traversable_edges(from)
            .into_iter()
            .filter(|edge| edge.traversable_nodes(from).contains(to))
            .min_by(|a, b| {
                step_cost(self.graph, a, from, to, &self.config)
                    .total_cmp(&step_cost(self.graph, b, from, to, &self.config))
            })
    }

    fn position(&self, node: &G::Node) -> Result<usize> {
        self.index
            .get(node)
            .copied()
            .ok_or_else(|| GraphError::unknown_node(node))
    }

    fn ensure_no_negative_cycle(&self) -> Result<()> {
        if self.negative_cycle {
            let start = (0..self.nodes.len())
                .find(|&i| self.dist[i][i] < 0.0)
                .map(|i| format!("{:?}", self.nodes[i]))
                .unwrap_or_default();
            return Err(GraphError::NegativeCycle(start));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::path_cost;
    use crate::simple::SimpleGraph;

    fn weighted(edges: &[(&'static str, &'static str, f64)]) -> SimpleGraph<&'static str> {
        let mut graph = SimpleGraph::new();
        for &(a, b, w) in edges {
            graph.add_weighted_edge(a, b, w);
        }
        graph
    }

    #[test]
    fn test_direct_and_relayed_distances() {
        let graph = weighted(&[("a", "b", 1.0), ("b", "c", 2.0), ("a", "c", 5.0)]);
        let fw = FloydWarshall::new(&graph).unwrap();
        assert_eq!(fw.distance(&"a", &"b").unwrap(), 1.0);
        assert_eq!(fw.distance(&"a", &"c").unwrap(), 3.0);
        assert_eq!(fw.distance(&"c", &"a").unwrap(), 3.0);
        assert_eq!(fw.distance(&"a", &"a").unwrap(), 0.0);
    }

    #[test]
    fn test_best_path_reconstructs_edges() {
        let mut graph = SimpleGraph::new();
        let ab = graph.add_weighted_edge("a", "b", 1.0);
        let bc = graph.add_weighted_edge("b", "c", 1.0);
        let cd = graph.add_weighted_edge("c", "d", 1.0);
        graph.add_weighted_edge("a", "d", 10.0);
        let fw = FloydWarshall::new(&graph).unwrap();

        assert_eq!(
            fw.path_nodes(&"a", &"d").unwrap(),
            Some(vec!["a", "b", "c", "d"])
        );
        let edges = fw.best_path(&"a", &"d").unwrap().unwrap();
        assert_eq!(edges, vec![ab, bc, cd]);
        assert_eq!(path_cost(&graph, &"a", &edges), Some(3.0));
    }

    #[test]
    fn test_unweighted_edges_default_to_one() {
        let mut graph = SimpleGraph::new();
        graph.add_edge(1, 2);
        graph.add_edge(2, 3);
        let fw = FloydWarshall::new(&graph).unwrap();
        assert_eq!(fw.distance(&1, &3).unwrap(), 2.0);
    }

    #[test]
    fn test_node_weight_added_on_entry() {
        let mut graph = SimpleGraph::new();
        graph.add_weighted_node("b", 4.0);
        graph.add_weighted_edge("a", "b", 1.0);
        let fw = FloydWarshall::new(&graph).unwrap();
        assert_eq!(fw.distance(&"a", &"b").unwrap(), 5.0);
        assert_eq!(fw.distance(&"b", &"a").unwrap(), 1.0);
    }

    #[test]
    fn test_disconnected_pair_has_no_path() {
        let mut graph = weighted(&[("a", "b", 1.0)]);
        graph.add_node("c");
        let fw = FloydWarshall::new(&graph).unwrap();
        assert_eq!(fw.distance(&"a", &"c").unwrap(), f64::INFINITY);
        assert!(!fw.is_connected(&"a", &"c").unwrap());
        assert_eq!(fw.best_path(&"a", &"c").unwrap(), None);
    }

    #[test]
    fn test_directed_distances_are_asymmetric() {
        let mut graph = SimpleGraph::new();
        graph.add_weighted_directed_edge("a", "b", 2.0);
        graph.add_weighted_directed_edge("b", "a", 7.0);
        let fw = FloydWarshall::new(&graph).unwrap();
        assert_eq!(fw.distance(&"a", &"b").unwrap(), 2.0);
        assert_eq!(fw.distance(&"b", &"a").unwrap(), 7.0);
    }

    #[test]
    fn test_picks_cheapest_parallel_edge() {
        let mut graph = SimpleGraph::new();
        graph.add_weighted_edge("a", "b", 3.0);
        let cheap = graph.add_weighted_edge("a", "b", 1.0);
        let fw = FloydWarshall::new(&graph).unwrap();
        assert_eq!(fw.best_path(&"a", &"b").unwrap(), Some(vec![cheap]));
    }

    #[test]
    fn test_same_endpoints_rejected() {
        let graph = weighted(&[("a", "b", 1.0)]);
        let fw = FloydWarshall::new(&graph).unwrap();
        assert!(matches!(
            fw.best_path(&"a", &"a"),
            Err(GraphError::SameEndpoints(_))
        ));
    }

    #[test]
    fn test_unknown_node_rejected() {
        let graph = weighted(&[("a", "b", 1.0)]);
        let fw = FloydWarshall::new(&graph).unwrap();
        assert!(matches!(
            fw.distance(&"a", &"zz"),
            Err(GraphError::UnknownNode(_))
        ));
    }

    #[test]
    fn test_negative_edge_without_cycle() {
        let mut graph = SimpleGraph::new();
        graph.add_weighted_directed_edge("a", "b", 4.0);
        graph.add_weighted_directed_edge("a", "c", 1.0);
        graph.add_weighted_directed_edge("b", "c", -3.0);
        let fw = FloydWarshall::new(&graph).unwrap();
        assert!(!fw.has_negative_cycle());
        assert_eq!(fw.distance(&"a", &"c").unwrap(), 1.0);
        assert_eq!(fw.distance(&"b", &"c").unwrap(), -3.0);
    }

    #[test]
    fn test_negative_cycle_reported() {
        let mut graph = SimpleGraph::new();
        graph.add_weighted_directed_edge("a", "b", 1.0);
        graph.add_weighted_directed_edge("b", "a", -2.0);
        let fw = FloydWarshall::new(&graph).unwrap();
        assert!(fw.has_negative_cycle());
        assert!(matches!(
            fw.best_path(&"a", &"b"),
            Err(GraphError::NegativeCycle(_))
        ));
    }

    #[test]
    fn test_triangle_inequality_and_symmetry() {
        let graph = weighted(&[
            ("a", "b", 4.0),
            ("a", "c", 1.0),
            ("c", "b", 2.0),
            ("b", "d", 5.0),
            ("c", "d", 8.0),
            ("d", "e", 3.0),
        ]);
        let fw = FloydWarshall::new(&graph).unwrap();
        let dist = fw.distance_matrix();
        let n = fw.node_order().len();
        for x in 0..n {
            for y in 0..n {
                assert_eq!(dist[x][y], dist[y][x]);
                for k in 0..n {
                    assert!(dist[x][y] <= dist[x][k] + dist[k][y] + 1e-9);
                }
            }
        }
    }
}
