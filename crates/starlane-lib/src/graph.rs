use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::config::DEFAULT_MAX_VERTICES;
use crate::error::{Error, Result};
use crate::transit::TransitEdge;

/// Dense vertex index inside a [`RouteGraph`].
pub type VertexId = usize;

/// Edge within the routing graph, stored once per direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub target: VertexId,
    pub distance: f64,
}

/// Undirected weighted graph of transits between named stars.
///
/// Vertices are numbered in first-seen order. Connected components are
/// labelled once at construction so connectivity queries are O(1).
#[derive(Debug, Clone, Default)]
pub struct RouteGraph {
    names: Vec<String>,
    index: HashMap<String, VertexId>,
    adjacency: Vec<Vec<Edge>>,
    edge_count: usize,
    components: Vec<usize>,
}

impl RouteGraph {
    pub fn vertex_count(&self) -> usize {
        self.names.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Vertex index for a star name.
    pub fn vertex(&self, name: &str) -> Option<VertexId> {
        self.index.get(name).copied()
    }

    /// Star name for a vertex index.
    pub fn name(&self, vertex: VertexId) -> Option<&str> {
        self.names.get(vertex).map(String::as_str)
    }

    /// Return the neighbours for a given vertex, in insertion order.
    pub fn neighbours(&self, vertex: VertexId) -> &[Edge] {
        self.adjacency
            .get(vertex)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Weight of the edge joining two vertices, if any.
    pub fn edge_weight(&self, a: VertexId, b: VertexId) -> Option<f64> {
        self.neighbours(a)
            .iter()
            .find(|edge| edge.target == b)
            .map(|edge| edge.distance)
    }

    /// Whether both stars are present and reachable from one another.
    pub fn is_connected(&self, a: &str, b: &str) -> bool {
        match (self.vertex(a), self.vertex(b)) {
            (Some(a), Some(b)) => self.components[a] == self.components[b],
            _ => false,
        }
    }

    /// Every star reachable from `name`, including itself. Empty when absent.
    pub fn connected_set(&self, name: &str) -> HashSet<&str> {
        let Some(start) = self.vertex(name) else {
            return HashSet::new();
        };
        let label = self.components[start];
        self.components
            .iter()
            .enumerate()
            .filter(|&(_, &component)| component == label)
            .map(|(vertex, _)| self.names[vertex].as_str())
            .collect()
    }

    /// Number of connected components.
    pub fn component_count(&self) -> usize {
        self.components
            .iter()
            .copied()
            .max()
            .map_or(0, |highest| highest + 1)
    }

    fn intern(&mut self, name: &str) -> VertexId {
        if let Some(&vertex) = self.index.get(name) {
            return vertex;
        }
        let vertex = self.names.len();
        self.names.push(name.to_string());
        self.index.insert(name.to_string(), vertex);
        self.adjacency.push(Vec::new());
        vertex
    }

    fn insert_edge(&mut self, edge: &TransitEdge) {
        if edge.source == edge.target {
            return;
        }
        let a = self.intern(&edge.source);
        let b = self.intern(&edge.target);
        if self.edge_weight(a, b).is_some() {
            return;
        }
        self.adjacency[a].push(Edge {
            target: b,
            distance: edge.distance,
        });
        self.adjacency[b].push(Edge {
            target: a,
            distance: edge.distance,
        });
        self.edge_count += 1;
    }

    fn label_components(&mut self) {
        let mut labels = vec![usize::MAX; self.names.len()];
        let mut stack = Vec::new();
        let mut label = 0;

        for start in 0..self.names.len() {
            if labels[start] != usize::MAX {
                continue;
            }
            labels[start] = label;
            stack.push(start);
            while let Some(current) = stack.pop() {
                for edge in &self.adjacency[current] {
                    if labels[edge.target] == usize::MAX {
                        labels[edge.target] = label;
                        stack.push(edge.target);
                    }
                }
            }
            label += 1;
        }

        self.components = labels;
    }
}

/// Assembles [`RouteGraph`]s while enforcing a vertex-count ceiling.
#[derive(Debug, Clone, Copy)]
pub struct GraphBuilder {
    max_vertices: usize,
}

impl GraphBuilder {
    pub fn new(max_vertices: usize) -> Self {
        Self { max_vertices }
    }

    /// Fail fast when `vertex_count` exceeds the ceiling.
    pub fn check_capacity(&self, vertex_count: usize) -> Result<()> {
        if vertex_count > self.max_vertices {
            return Err(Error::Capacity {
                count: vertex_count,
                max: self.max_vertices,
            });
        }
        Ok(())
    }

    /// Build a graph from transit edges. Duplicate pairs in either
    /// orientation collapse onto the first one seen; self-loops are skipped.
    pub fn build(&self, edges: &[TransitEdge]) -> Result<RouteGraph> {
        let distinct: HashSet<&str> = edges
            .iter()
            .flat_map(|edge| [edge.source.as_str(), edge.target.as_str()])
            .collect();
        self.check_capacity(distinct.len())?;

        let mut graph = RouteGraph::default();
        for edge in edges {
            graph.insert_edge(edge);
        }
        graph.label_components();

        debug!(
            vertices = graph.vertex_count(),
            edges = graph.edge_count(),
            components = graph.component_count(),
            "built route graph"
        );
        Ok(graph)
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_VERTICES)
    }
}

/// Build a graph with the default vertex ceiling.
pub fn build_graph(edges: &[TransitEdge]) -> Result<RouteGraph> {
    GraphBuilder::default().build(edges)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(source: &str, target: &str, distance: f64) -> TransitEdge {
        TransitEdge {
            source: source.to_string(),
            target: target.to_string(),
            distance,
        }
    }

    #[test]
    fn empty_transits_build_empty_graph() {
        let graph = build_graph(&[]).unwrap();
        assert!(graph.is_empty());
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.component_count(), 0);
    }

    #[test]
    fn duplicate_pairs_collapse() {
        let graph = build_graph(&[
            edge("Sol", "Alpha Centauri", 4.37),
            edge("Alpha Centauri", "Sol", 9.0),
            edge("Sol", "Alpha Centauri", 4.37),
        ])
        .unwrap();

        assert_eq!(graph.vertex_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        let sol = graph.vertex("Sol").unwrap();
        let alpha = graph.vertex("Alpha Centauri").unwrap();
        assert_eq!(graph.edge_weight(sol, alpha), Some(4.37));
        assert_eq!(graph.edge_weight(alpha, sol), Some(4.37));
    }

    #[test]
    fn self_loops_are_skipped() {
        let graph = build_graph(&[edge("Sol", "Sol", 0.0), edge("Sol", "Wolf", 7.9)]).unwrap();
        assert_eq!(graph.edge_count(), 1);
        let sol = graph.vertex("Sol").unwrap();
        assert!(graph.neighbours(sol).iter().all(|e| e.target != sol));
    }

    #[test]
    fn components_split_disconnected_clusters() {
        let graph = build_graph(&[
            edge("Sol", "Alpha", 4.37),
            edge("Alpha", "Barnard", 3.8),
            edge("Proxima", "Wolf", 3.8),
        ])
        .unwrap();

        assert_eq!(graph.component_count(), 2);
        assert!(graph.is_connected("Sol", "Barnard"));
        assert!(graph.is_connected("Barnard", "Sol"));
        assert!(!graph.is_connected("Sol", "Wolf"));
        assert!(!graph.is_connected("Sol", "Nowhere"));

        let reachable = graph.connected_set("Alpha");
        assert_eq!(reachable, HashSet::from(["Sol", "Alpha", "Barnard"]));
        assert!(graph.connected_set("Nowhere").is_empty());
    }

    #[test]
    fn capacity_guard_fails_fast() {
        let builder = GraphBuilder::new(2);
        let error = builder
            .build(&[edge("A", "B", 1.0), edge("B", "C", 1.0)])
            .unwrap_err();
        assert!(matches!(error, Error::Capacity { count: 3, max: 2 }));
        assert!(builder.build(&[edge("A", "B", 1.0)]).is_ok());
    }
}
