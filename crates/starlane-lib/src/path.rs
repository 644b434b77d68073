use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{Error, Result};
use crate::graph::{RouteGraph, VertexId};

/// A path through a [`RouteGraph`] with its total weight.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphPath {
    /// Star names from source to destination, inclusive.
    pub vertices: Vec<String>,
    /// Sum of the transit distances along the path.
    pub weight: f64,
}

impl GraphPath {
    /// Number of jumps in the path.
    pub fn hop_count(&self) -> usize {
        self.vertices.len().saturating_sub(1)
    }

    /// Human-readable form such as `Sol -> Alpha -> Barnard`.
    pub fn describe(&self) -> String {
        self.vertices.join(" -> ")
    }
}

/// Find the least-weight path between two stars using Dijkstra's algorithm.
///
/// Equal-cost alternatives are resolved in favour of the one discovered
/// first, which makes the result deterministic for a given graph.
pub fn shortest_path(graph: &RouteGraph, source: &str, destination: &str) -> Option<GraphPath> {
    let start = graph.vertex(source)?;
    let goal = graph.vertex(destination)?;
    let (vertices, _) = dijkstra(graph, start, goal, &SearchMask::new(graph))?;
    to_graph_path(graph, &vertices)
}

/// Find up to `k` loopless paths ordered by non-decreasing weight (Yen).
///
/// The first path equals [`shortest_path`]. When fewer than `k` loopless
/// paths exist, all of them are returned.
pub fn k_shortest_paths(
    graph: &RouteGraph,
    source: &str,
    destination: &str,
    k: usize,
) -> Vec<GraphPath> {
    // A fresh token is never cancelled, so the search cannot fail.
    k_shortest_paths_cancellable(graph, source, destination, k, &CancellationToken::new())
        .unwrap_or_default()
}

/// [`k_shortest_paths`] that checks `cancel` before each spur search and
/// returns [`Error::Cancelled`] once it fires.
pub fn k_shortest_paths_cancellable(
    graph: &RouteGraph,
    source: &str,
    destination: &str,
    k: usize,
    cancel: &CancellationToken,
) -> Result<Vec<GraphPath>> {
    if k == 0 || !graph.is_connected(source, destination) {
        return Ok(Vec::new());
    }
    let (Some(start), Some(goal)) = (graph.vertex(source), graph.vertex(destination)) else {
        return Ok(Vec::new());
    };

    let Some(first) = dijkstra(graph, start, goal, &SearchMask::new(graph)) else {
        return Ok(Vec::new());
    };

    let mut accepted: Vec<(Vec<VertexId>, f64)> = vec![first];
    let mut candidates: Vec<Candidate> = Vec::new();
    let mut seen: HashSet<Vec<VertexId>> = HashSet::new();
    seen.insert(accepted[0].0.clone());
    let mut sequence = 0u64;

    while accepted.len() < k {
        let previous = accepted[accepted.len() - 1].0.clone();

        for spur_index in 0..previous.len().saturating_sub(1) {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }

            let spur = previous[spur_index];
            let root = &previous[..=spur_index];

            let mut mask = SearchMask::new(graph);
            for (path, _) in &accepted {
                if path.len() > spur_index + 1 && &path[..=spur_index] == root {
                    mask.remove_edge(path[spur_index], path[spur_index + 1]);
                }
            }
            for &vertex in &root[..spur_index] {
                mask.remove_vertex(vertex);
            }

            let Some((spur_path, _)) = dijkstra(graph, spur, goal, &mask) else {
                continue;
            };

            let mut total: Vec<VertexId> = root[..spur_index].to_vec();
            total.extend(spur_path);
            if seen.contains(&total) {
                continue;
            }
            let Some(weight) = path_weight(graph, &total) else {
                continue;
            };
            seen.insert(total.clone());
            candidates.push(Candidate {
                vertices: total,
                weight,
                sequence,
            });
            sequence += 1;
        }

        let Some(best) = candidates
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.rank(b))
            .map(|(index, _)| index)
        else {
            break;
        };
        let chosen = candidates.swap_remove(best);
        accepted.push((chosen.vertices, chosen.weight));
    }

    let paths: Vec<GraphPath> = accepted
        .iter()
        .filter_map(|(vertices, _)| to_graph_path(graph, vertices))
        .collect();

    debug!(
        source,
        destination,
        requested = k,
        found = paths.len(),
        "k-shortest path search complete"
    );
    Ok(paths)
}

/// Sum of edge weights along a vertex sequence, or `None` if two consecutive
/// vertices are not adjacent.
fn path_weight(graph: &RouteGraph, vertices: &[VertexId]) -> Option<f64> {
    vertices
        .windows(2)
        .map(|pair| graph.edge_weight(pair[0], pair[1]))
        .sum()
}

fn to_graph_path(graph: &RouteGraph, vertices: &[VertexId]) -> Option<GraphPath> {
    let names = vertices
        .iter()
        .map(|&vertex| graph.name(vertex).map(str::to_string))
        .collect::<Option<Vec<String>>>()?;
    let weight = path_weight(graph, vertices)?;
    Some(GraphPath {
        vertices: names,
        weight,
    })
}

/// Vertices and edges hidden from a single Dijkstra run.
struct SearchMask {
    removed_vertices: Vec<bool>,
    removed_edges: HashSet<(VertexId, VertexId)>,
}

impl SearchMask {
    fn new(graph: &RouteGraph) -> Self {
        Self {
            removed_vertices: vec![false; graph.vertex_count()],
            removed_edges: HashSet::new(),
        }
    }

    fn remove_vertex(&mut self, vertex: VertexId) {
        self.removed_vertices[vertex] = true;
    }

    fn remove_edge(&mut self, a: VertexId, b: VertexId) {
        self.removed_edges.insert((a.min(b), a.max(b)));
    }

    fn allows(&self, from: VertexId, to: VertexId) -> bool {
        !self.removed_vertices[to] && !self.removed_edges.contains(&(from.min(to), from.max(to)))
    }
}

fn dijkstra(
    graph: &RouteGraph,
    start: VertexId,
    goal: VertexId,
    mask: &SearchMask,
) -> Option<(Vec<VertexId>, f64)> {
    if start == goal {
        return Some((vec![start], 0.0));
    }

    let count = graph.vertex_count();
    let mut distances = vec![f64::INFINITY; count];
    let mut parents: Vec<Option<VertexId>> = vec![None; count];
    let mut settled = vec![false; count];
    let mut queue = BinaryHeap::new();
    let mut sequence = 0u64;

    distances[start] = 0.0;
    queue.push(QueueEntry::new(start, 0.0, sequence));

    while let Some(entry) = queue.pop() {
        if settled[entry.node] {
            continue;
        }
        settled[entry.node] = true;

        if entry.node == goal {
            return Some((reconstruct_path(&parents, start, goal), distances[goal]));
        }

        let current_distance = distances[entry.node];
        for edge in graph.neighbours(entry.node) {
            let next = edge.target;
            if settled[next] || !mask.allows(entry.node, next) {
                continue;
            }

            let next_cost = current_distance + edge.distance;
            if next_cost < distances[next] {
                distances[next] = next_cost;
                parents[next] = Some(entry.node);
                sequence += 1;
                queue.push(QueueEntry::new(next, next_cost, sequence));
            }
        }
    }

    None
}

fn reconstruct_path(parents: &[Option<VertexId>], start: VertexId, goal: VertexId) -> Vec<VertexId> {
    let mut path = Vec::new();
    let mut current = Some(goal);
    while let Some(node) = current {
        path.push(node);
        if node == start {
            break;
        }
        current = parents[node];
    }
    path.reverse();
    path
}

struct Candidate {
    vertices: Vec<VertexId>,
    weight: f64,
    sequence: u64,
}

impl Candidate {
    fn rank(&self, other: &Self) -> Ordering {
        self.weight
            .total_cmp(&other.weight)
            .then_with(|| self.sequence.cmp(&other.sequence))
    }
}

#[derive(Copy, Clone, Debug, Default)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq(&other.0)
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct QueueEntry {
    node: VertexId,
    cost: FloatOrd,
    sequence: u64,
}

impl QueueEntry {
    fn new(node: VertexId, cost: f64, sequence: u64) -> Self {
        Self {
            node,
            cost: FloatOrd(cost),
            sequence,
        }
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering so BinaryHeap becomes a min-heap by cost, then by
        // discovery order.
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
