//! Single-pair shortest path with A*.
//!
//! The search keeps one [`PathedStep`] per discovered node in an arena and a
//! binary heap of `(f, step)` entries. A step is improved in place when a
//! cheaper predecessor turns up and re-queued; stale heap entries are skipped
//! when popped. Expanded steps are closed and never reopened, so edge and
//! node weights must be non-negative and the heuristic admissible for the
//! result to be optimal.

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::check::{require_node, validate_graph};
use crate::config::Config;
use crate::error::{GraphError, Result};
use crate::graph::{Edge, Graph, step_cost};

/// Estimate of the remaining cost from a node to the goal.
pub trait Heuristic<N> {
    fn estimate(&self, node: &N, goal: &N) -> f64;

    /// Whether the estimate never exceeds the true remaining cost. A finder
    /// refuses heuristics that report false.
    fn is_admissible(&self) -> bool {
        true
    }

    fn name(&self) -> String {
        "heuristic".to_string()
    }
}

/// h ≡ 0. Turns A* into Dijkstra.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroHeuristic;

impl<N> Heuristic<N> for ZeroHeuristic {
    fn estimate(&self, _node: &N, _goal: &N) -> f64 {
        0.0
    }

    fn name(&self) -> String {
        "zero".to_string()
    }
}

/// A heuristic backed by a closure, with its admissibility declared up front.
pub struct FnHeuristic<F> {
    name: String,
    estimate: F,
    admissible: bool,
}

impl<F> FnHeuristic<F> {
    pub fn admissible(name: impl Into<String>, estimate: F) -> Self {
        Self {
            name: name.into(),
            estimate,
            admissible: true,
        }
    }

    pub fn inadmissible(name: impl Into<String>, estimate: F) -> Self {
        Self {
            name: name.into(),
            estimate,
            admissible: false,
        }
    }
}

impl<N, F: Fn(&N, &N) -> f64> Heuristic<N> for FnHeuristic<F> {
    fn estimate(&self, node: &N, goal: &N) -> f64 {
        (self.estimate)(node, goal)
    }

    fn is_admissible(&self) -> bool {
        self.admissible
    }

    fn name(&self) -> String {
        self.name.clone()
    }
}

/// A path found by [`AstarPathFinder::search`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AstarPath<N, E> {
    /// Nodes from start to goal inclusive.
    pub nodes: Vec<N>,
    /// Edges in traversal order (`nodes.len() - 1` of them).
    pub edges: Vec<E>,
    pub cost: f64,
    /// Steps expanded before the goal was reached.
    pub expanded: usize,
}

/// Search state for one discovered node.
struct PathedStep<N, E> {
    node: N,
    /// Best known cost from the start.
    cost: f64,
    /// Cached heuristic estimate to the goal.
    estimate: f64,
    /// Predecessor step and the edge taken from it.
    back: Option<(usize, E)>,
    closed: bool,
}

/// Heap entry; ordered so that `BinaryHeap` pops the lowest f-score first.
#[derive(Debug, Clone, Copy)]
struct QueueEntry {
    f_score: f64,
    g_score: f64,
    step: usize,
    seq: u64,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for min-heap behavior
        other
            .f_score
            .total_cmp(&self.f_score)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

pub struct AstarPathFinder<'g, G: Graph, H> {
    graph: &'g G,
    heuristic: H,
    config: Config,
}

impl<'g, G: Graph, H: Heuristic<G::Node>> AstarPathFinder<'g, G, H> {
    /// Fails if the heuristic declares itself non-admissible or the graph is
    /// structurally invalid.
    pub fn new(graph: &'g G, heuristic: H) -> Result<Self> {
        if !heuristic.is_admissible() {
            return Err(GraphError::NonAdmissibleHeuristic(heuristic.name()));
        }
        validate_graph(graph)?;
        Ok(Self {
            graph,
            heuristic,
            config: Config::default(),
        })
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Edges of a cheapest path from `start` to `goal`, or None if the goal is
    /// unreachable.
    pub fn best_path(&self, start: &G::Node, goal: &G::Node) -> Result<Option<Vec<G::Edge>>> {
        Ok(self.search(start, goal)?.map(|path| path.edges))
    }

    /// Like [`best_path`](Self::best_path) but also reports the visited
    /// nodes, total cost and search effort.
    ///
    /// `start == goal` is rejected rather than answered with an empty path.
    ///
    /// # Requirements
    /// Step costs (edge weights plus destination node weights) must be
    /// non-negative. Closed steps are never reopened, so a negative cost
    /// can yield a path that is not the cheapest. Reweight such graphs
    /// with [`JohnsonTransformer`](crate::JohnsonTransformer) first and
    /// search the [`ReweightedGraph`](crate::ReweightedGraph).
    pub fn search(
        &self,
        start: &G::Node,
        goal: &G::Node,
    ) -> Result<Option<AstarPath<G::Node, G::Edge>>> {
        require_node(self.graph, start)?;
        require_node(self.graph, goal)?;
        if start == goal {
            return Err(GraphError::same_endpoints(start));
        }

        let mut steps: Vec<PathedStep<G::Node, G::Edge>> = Vec::new();
        let mut index: HashMap<G::Node, usize> = HashMap::new();
        let mut open: BinaryHeap<QueueEntry> = BinaryHeap::new();
        let mut seq: u64 = 0;
        let mut expanded = 0usize;

        let root_estimate = self.heuristic.estimate(start, goal);
        steps.push(PathedStep {
            node: start.clone(),
            cost: 0.0,
            estimate: root_estimate,
            back: None,
            closed: false,
        });
        index.insert(start.clone(), 0);
        open.push(QueueEntry {
            f_score: root_estimate,
            g_score: 0.0,
            step: 0,
            seq,
        });

        while let Some(entry) = open.pop() {
            let current = entry.step;
            if steps[current].closed || entry.g_score > steps[current].cost {
                continue;
            }

            if steps[current].node == *goal {
                log::debug!(
                    "A* reached {:?} after {} expansions, cost {}",
                    goal,
                    expanded,
                    steps[current].cost
                );
                return Ok(Some(reconstruct(&steps, current, expanded)));
            }

            if let Some(limit) = self.config.max_expansions
                && expanded >= limit
            {
                log::debug!("A* exploration limit reached: {} steps", expanded);
                return Ok(None);
            }

            steps[current].closed = true;
            expanded += 1;

            let node = steps[current].node.clone();
            let cost = steps[current].cost;

            for edge in self.graph.traversable_edges(&node) {
                for neighbor in edge.traversable_nodes(&node) {
                    let tentative =
                        cost + step_cost(self.graph, &edge, &node, &neighbor, &self.config);

                    let step = match index.get(&neighbor) {
                        Some(&i) => {
                            if steps[i].closed || tentative >= steps[i].cost {
                                continue;
                            }
                            steps[i].cost = tentative;
                            steps[i].back = Some((current, edge.clone()));
                            i
                        }
                        None => {
                            let i = steps.len();
                            steps.push(PathedStep {
                                node: neighbor.clone(),
                                cost: tentative,
                                estimate: self.heuristic.estimate(&neighbor, goal),
                                back: Some((current, edge.clone())),
                                closed: false,
                            });
                            index.insert(neighbor.clone(), i);
                            i
                        }
                    };

                    seq += 1;
                    open.push(QueueEntry {
                        f_score: tentative + steps[step].estimate,
                        g_score: tentative,
                        step,
                        seq,
                    });
                }
            }
        }

        log::debug!(
            "A* exhausted the frontier after {} expansions; {:?} unreachable",
            expanded,
            goal
        );
        Ok(None)
    }
}

fn reconstruct<N: Clone, E: Clone>(
    steps: &[PathedStep<N, E>],
    goal: usize,
    expanded: usize,
) -> AstarPath<N, E> {
    let mut nodes = vec![steps[goal].node.clone()];
    let mut edges = Vec::new();
    let mut current = goal;
    while let Some((prev, edge)) = &steps[current].back {
        edges.push(edge.clone());
        nodes.push(steps[*prev].node.clone());
        current = *prev;
    }
    nodes.reverse();
    edges.reverse();

    AstarPath {
        nodes,
        edges,
        cost: steps[goal].cost,
        expanded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::path_cost;
    use crate::simple::SimpleGraph;

    type Cell = (i32, i32);

    /// `width` x `height` 4-connected grid with unit edges, minus `walls`.
    fn grid(width: i32, height: i32, walls: &[Cell]) -> SimpleGraph<Cell> {
        let mut graph = SimpleGraph::new();
        for x in 0..width {
            for y in 0..height {
                if walls.contains(&(x, y)) {
                    continue;
                }
                graph.add_node((x, y));
                if x > 0 && !walls.contains(&(x - 1, y)) {
                    graph.add_edge((x - 1, y), (x, y));
                }
                if y > 0 && !walls.contains(&(x, y - 1)) {
                    graph.add_edge((x, y - 1), (x, y));
                }
            }
        }
        graph
    }

    fn manhattan() -> FnHeuristic<impl Fn(&Cell, &Cell) -> f64> {
        FnHeuristic::admissible("manhattan", |a: &Cell, b: &Cell| {
            ((a.0 - b.0).abs() + (a.1 - b.1).abs()) as f64
        })
    }

    #[test]
    fn test_straight_line_on_grid() {
        let graph = grid(5, 5, &[]);
        let finder = AstarPathFinder::new(&graph, manhattan()).unwrap();
        let path = finder.search(&(0, 0), &(4, 4)).unwrap().unwrap();
        assert_eq!(path.cost, 8.0);
        assert_eq!(path.edges.len(), 8);
        assert_eq!(path.nodes.first(), Some(&(0, 0)));
        assert_eq!(path.nodes.last(), Some(&(4, 4)));
    }

    #[test]
    fn test_routes_around_wall() {
        // Wall across column 2 except the top row.
        let walls = [(2, 0), (2, 1), (2, 2), (2, 3)];
        let graph = grid(5, 5, &walls);
        let finder = AstarPathFinder::new(&graph, manhattan()).unwrap();
        let path = finder.search(&(0, 0), &(4, 0)).unwrap().unwrap();
        assert_eq!(path.cost, 12.0);
        assert!(path.nodes.contains(&(2, 4)));
    }

    #[test]
    fn test_heuristic_reduces_expansions() {
        let graph = grid(20, 20, &[]);
        let guided = AstarPathFinder::new(&graph, manhattan())
            .unwrap()
            .search(&(0, 0), &(19, 0))
            .unwrap()
            .unwrap();
        let blind = AstarPathFinder::new(&graph, ZeroHeuristic)
            .unwrap()
            .search(&(0, 0), &(19, 0))
            .unwrap()
            .unwrap();
        assert_eq!(guided.cost, blind.cost);
        assert!(guided.expanded < blind.expanded);
    }

    #[test]
    fn test_no_path_is_none() {
        let mut graph = SimpleGraph::new();
        graph.add_edge("a", "b");
        graph.add_node("island");
        let finder = AstarPathFinder::new(&graph, ZeroHeuristic).unwrap();
        assert_eq!(finder.best_path(&"a", &"island").unwrap(), None);
    }

    #[test]
    fn test_respects_edge_direction() {
        let mut graph = SimpleGraph::new();
        graph.add_directed_edge("a", "b");
        let finder = AstarPathFinder::new(&graph, ZeroHeuristic).unwrap();
        assert!(finder.best_path(&"a", &"b").unwrap().is_some());
        assert!(finder.best_path(&"b", &"a").unwrap().is_none());
    }

    #[test]
    fn test_prefers_cheaper_parallel_edge() {
        let mut graph = SimpleGraph::new();
        graph.add_weighted_edge("a", "b", 5.0);
        let cheap = graph.add_weighted_edge("a", "b", 2.0);
        let finder = AstarPathFinder::new(&graph, ZeroHeuristic).unwrap();
        assert_eq!(finder.best_path(&"a", &"b").unwrap(), Some(vec![cheap]));
    }

    #[test]
    fn test_improves_discovered_step() {
        // a→c is discovered first at cost 10, then improved via b.
        let mut graph = SimpleGraph::new();
        graph.add_weighted_directed_edge("a", "c", 10.0);
        graph.add_weighted_directed_edge("a", "b", 1.0);
        graph.add_weighted_directed_edge("b", "c", 1.0);
        graph.add_weighted_directed_edge("c", "d", 1.0);
        let finder = AstarPathFinder::new(&graph, ZeroHeuristic).unwrap();
        let path = finder.search(&"a", &"d").unwrap().unwrap();
        assert_eq!(path.nodes, vec!["a", "b", "c", "d"]);
        assert_eq!(path.cost, 3.0);
        assert_eq!(path_cost(&graph, &"a", &path.edges), Some(3.0));
    }

    #[test]
    fn test_node_weights_divert_route() {
        let mut graph = SimpleGraph::new();
        graph.add_weighted_node("swamp", 10.0);
        graph.add_edge("start", "swamp");
        graph.add_edge("swamp", "goal");
        graph.add_edge("start", "hill");
        graph.add_edge("hill", "ridge");
        graph.add_edge("ridge", "goal");
        let finder = AstarPathFinder::new(&graph, ZeroHeuristic).unwrap();
        let path = finder.search(&"start", &"goal").unwrap().unwrap();
        assert_eq!(path.nodes, vec!["start", "hill", "ridge", "goal"]);
        assert_eq!(path.cost, 3.0);
    }

    #[test]
    fn test_start_equals_goal_rejected() {
        let graph = grid(2, 2, &[]);
        let finder = AstarPathFinder::new(&graph, ZeroHeuristic).unwrap();
        let err = finder.best_path(&(0, 0), &(0, 0)).unwrap_err();
        assert!(matches!(err, GraphError::SameEndpoints(_)));
    }

    #[test]
    fn test_unknown_endpoint_rejected() {
        let graph = grid(2, 2, &[]);
        let finder = AstarPathFinder::new(&graph, ZeroHeuristic).unwrap();
        assert_eq!(
            finder.best_path(&(0, 0), &(9, 9)),
            Err(GraphError::UnknownNode("(9, 9)".to_string()))
        );
    }

    #[test]
    fn test_inadmissible_heuristic_rejected_at_construction() {
        let graph = grid(2, 2, &[]);
        let greedy = FnHeuristic::inadmissible("greedy", |_: &Cell, _: &Cell| 100.0);
        let err = AstarPathFinder::new(&graph, greedy).err().unwrap();
        assert_eq!(err, GraphError::NonAdmissibleHeuristic("greedy".to_string()));
    }

    #[test]
    fn test_max_expansions_gives_up() {
        let graph = grid(10, 10, &[]);
        let finder = AstarPathFinder::new(&graph, ZeroHeuristic)
            .unwrap()
            .with_config(Config::default().with_max_expansions(3));
        assert!(finder.search(&(0, 0), &(9, 9)).unwrap().is_none());
        // A neighbor is still reachable within the budget.
        assert!(finder.search(&(0, 0), &(1, 0)).unwrap().is_some());
    }

    #[test]
    fn test_default_edge_weight_from_config() {
        let mut graph = SimpleGraph::new();
        graph.add_edge("a", "b");
        graph.add_edge("b", "c");
        let finder = AstarPathFinder::new(&graph, ZeroHeuristic)
            .unwrap()
            .with_config(Config::default().with_default_edge_weight(2.5));
        assert_eq!(finder.search(&"a", &"c").unwrap().unwrap().cost, 5.0);
    }

    #[test]
    fn test_queue_entry_orders_lowest_f_first() {
        let mut heap = BinaryHeap::new();
        for (i, f) in [3.0, 1.0, 2.0].into_iter().enumerate() {
            heap.push(QueueEntry {
                f_score: f,
                g_score: 0.0,
                step: i,
                seq: i as u64,
            });
        }
        let order: Vec<f64> = std::iter::from_fn(|| heap.pop().map(|e| e.f_score)).collect();
        assert_eq!(order, vec![1.0, 2.0, 3.0]);
    }
}
