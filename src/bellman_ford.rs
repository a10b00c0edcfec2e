//! Single-source shortest distances that tolerate negative weights.
//!
//! [`ShortestPathSource`] is the seam the Johnson transformer uses to obtain
//! node potentials; [`BellmanFord`] is the stock implementation. Any
//! replacement must refuse graphs with a negative cycle reachable from the
//! source, since reweighting is only sound without one.

use std::collections::HashMap;

use crate::check::{require_node, validate_graph};
use crate::config::Config;
use crate::error::{GraphError, Result};
use crate::graph::{Graph, edge_steps, step_cost};

pub trait ShortestPathSource {
    /// Distance from `source` to every node of `graph` (infinite when
    /// unreachable). Fails with [`GraphError::NegativeCycle`] when a negative
    /// cycle is reachable from `source`.
    fn shortest_distances<G: Graph>(
        &self,
        graph: &G,
        source: &G::Node,
        config: &Config,
    ) -> Result<HashMap<G::Node, f64>>;
}

/// Bellman–Ford: |V|-1 rounds of edge relaxation, stopping early once a
/// round changes nothing, then one more pass to expose negative cycles.
///
/// # Complexity
/// * Time: O(V·E)
/// * Space: O(V + E)
#[derive(Debug, Clone, Copy, Default)]
pub struct BellmanFord;

impl BellmanFord {
    pub fn distances<G: Graph>(&self, graph: &G, source: &G::Node) -> Result<HashMap<G::Node, f64>> {
        self.shortest_distances(graph, source, &Config::default())
    }
}

impl ShortestPathSource for BellmanFord {
    fn shortest_distances<G: Graph>(
        &self,
        graph: &G,
        source: &G::Node,
        config: &Config,
    ) -> Result<HashMap<G::Node, f64>> {
        validate_graph(graph)?;
        require_node(graph, source)?;

        let nodes = graph.nodes();
        let index: HashMap<G::Node, usize> = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), i))
            .collect();

        let mut relaxations: Vec<(usize, usize, f64)> = Vec::new();
        for edge in graph.edges() {
            for (from, to) in edge_steps(&edge) {
                let cost = step_cost(graph, &edge, &from, &to, config);
                relaxations.push((index[&from], index[&to], cost));
            }
        }

        let mut dist = vec![f64::INFINITY; nodes.len()];
        dist[index[source]] = 0.0;

        let mut rounds = 0;
        for _ in 1..nodes.len() {
            rounds += 1;
            let mut changed = false;
            for &(from, to, cost) in &relaxations {
                if dist[from] == f64::INFINITY {
                    continue;
                }
                if dist[from] + cost < dist[to] {
                    dist[to] = dist[from] + cost;
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }

        for &(from, to, cost) in &relaxations {
            if dist[from] != f64::INFINITY && dist[from] + cost < dist[to] {
                log::debug!(
                    "Bellman-Ford: negative cycle through {:?} reachable from {:?}",
                    nodes[to],
                    source
                );
                return Err(GraphError::NegativeCycle(format!("{:?}", source)));
            }
        }

        log::trace!(
            "Bellman-Ford settled {} nodes in {} rounds",
            nodes.len(),
            rounds
        );
        Ok(nodes.into_iter().zip(dist).collect())
    }
}
