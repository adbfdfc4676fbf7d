use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use priority_queue::PriorityQueue;

use crate::error::GraphError;
use crate::models::{Distance, Point};

/// Undirected weighted graph of named points
///
/// Edge weights are geodesic distances in kilometers. There are no
/// self-loops and at most one edge per pair of nodes.
#[derive(Debug, Clone, Default)]
pub struct LocationGraph {
    graph: UnGraph<Point, Distance>,
    index: HashMap<String, NodeIndex>, // Point name -> node index
}

/// Queue priority for the Dijkstra search
#[derive(Copy, Clone, Debug, PartialEq)]
struct QueueKey {
    distance: Distance,
    node: NodeIndex,
}

impl Eq for QueueKey {}

// Reversed so that the smallest distance has the highest priority.
// Equal distances fall back to the earlier inserted node.
impl Ord for QueueKey {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .distance
            .total_cmp(&self.distance)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for QueueKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl LocationGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a point; names must be unique
    pub fn add_node(&mut self, point: Point) -> Result<(), GraphError> {
        if self.index.contains_key(&point.name) {
            return Err(GraphError::DuplicateNode(point.name));
        }

        let name = point.name.clone();
        let node = self.graph.add_node(point);
        self.index.insert(name, node);
        Ok(())
    }

    /// Adds an edge, or overwrites the weight of an existing one
    pub fn add_edge(&mut self, a: &str, b: &str, weight: Distance) -> Result<(), GraphError> {
        let from = self.index_of(a)?;
        let to = self.index_of(b)?;

        if from == to {
            return Err(GraphError::SelfLoop(a.to_string()));
        }
        if !weight.is_finite() || weight < 0.0 {
            return Err(GraphError::InvalidWeight {
                from: a.to_string(),
                to: b.to_string(),
                weight,
            });
        }

        // update_edge reuses the existing edge in either direction
        self.graph.update_edge(from, to, weight);
        Ok(())
    }

    /// Weight of the direct edge between two nodes
    pub fn edge_weight(&self, a: &str, b: &str) -> Result<Distance, GraphError> {
        let from = self.index_of(a)?;
        let to = self.index_of(b)?;

        self.graph
            .find_edge(from, to)
            .and_then(|edge| self.graph.edge_weight(edge))
            .copied()
            .ok_or_else(|| GraphError::NoSuchEdge(a.to_string(), b.to_string()))
    }

    /// Checks whether two nodes are directly connected
    pub fn has_edge(&self, a: &str, b: &str) -> bool {
        match (self.index.get(a), self.index.get(b)) {
            (Some(&from), Some(&to)) => self.graph.find_edge(from, to).is_some(),
            _ => false,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn point(&self, name: &str) -> Option<&Point> {
        self.index.get(name).map(|&node| &self.graph[node])
    }

    /// Looks up a point, failing with `UnknownNode`
    pub fn require_point(&self, name: &str) -> Result<&Point, GraphError> {
        self.point(name)
            .ok_or_else(|| GraphError::UnknownNode(name.to_string()))
    }

    /// All points in insertion order
    pub fn points(&self) -> impl Iterator<Item = &Point> {
        self.graph.node_weights()
    }

    /// The origin point, if one was added
    pub fn origin(&self) -> Option<&Point> {
        self.points().find(|point| point.is_origin())
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    fn index_of(&self, name: &str) -> Result<NodeIndex, GraphError> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| GraphError::UnknownNode(name.to_string()))
    }

    /// Shortest path between two nodes using Dijkstra's algorithm
    ///
    /// Returns the node names along the path (both ends included) and the
    /// total weight. A node to itself is the one-node path of weight 0.
    pub fn shortest_path(&self, a: &str, b: &str) -> Result<(Vec<String>, Distance), GraphError> {
        let start = self.index_of(a)?;
        let goal = self.index_of(b)?;

        // Special case: start and goal are the same node
        if start == goal {
            return Ok((vec![a.to_string()], 0.0));
        }

        let mut distances: HashMap<NodeIndex, Distance> = HashMap::new();
        let mut previous: HashMap<NodeIndex, NodeIndex> = HashMap::new();
        let mut settled: HashSet<NodeIndex> = HashSet::new();
        let mut queue = PriorityQueue::new();

        distances.insert(start, 0.0);
        queue.push(
            start,
            QueueKey {
                distance: 0.0,
                node: start,
            },
        );

        while let Some((node, key)) = queue.pop() {
            if node == goal {
                return Ok((self.trace_path(&previous, start, goal), key.distance));
            }

            settled.insert(node);

            for edge in self.graph.edges(node) {
                let neighbor = if edge.source() == node {
                    edge.target()
                } else {
                    edge.source()
                };
                if settled.contains(&neighbor) {
                    continue;
                }

                let candidate = key.distance + *edge.weight();
                let is_shorter = match distances.get(&neighbor) {
                    Some(&current) => candidate < current,
                    None => true,
                };

                if is_shorter {
                    distances.insert(neighbor, candidate);
                    previous.insert(neighbor, node);
                    queue.push_increase(
                        neighbor,
                        QueueKey {
                            distance: candidate,
                            node: neighbor,
                        },
                    );
                }
            }
        }

        Err(GraphError::NoPath(a.to_string(), b.to_string()))
    }

    /// Weight of the shortest path between two nodes
    pub fn shortest_distance(&self, a: &str, b: &str) -> Result<Distance, GraphError> {
        self.shortest_path(a, b).map(|(_, distance)| distance)
    }

    fn trace_path(
        &self,
        previous: &HashMap<NodeIndex, NodeIndex>,
        start: NodeIndex,
        goal: NodeIndex,
    ) -> Vec<String> {
        let mut path = vec![goal];
        let mut current = goal;
        while current != start {
            match previous.get(&current) {
                Some(&prev) => {
                    path.push(prev);
                    current = prev;
                }
                None => break,
            }
        }
        path.reverse();

        path.into_iter()
            .map(|node| self.graph[node].name.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Coordinate;

    fn point(name: &str) -> Point {
        Point::candidate(name, Coordinate::new(0.0, 0.0), name)
    }

    fn graph_with(names: &[&str]) -> LocationGraph {
        let mut graph = LocationGraph::new();
        for name in names {
            graph.add_node(point(name)).unwrap();
        }
        graph
    }

    #[test]
    fn test_duplicate_node() {
        let mut graph = graph_with(&["A"]);
        assert_eq!(
            graph.add_node(point("A")),
            Err(GraphError::DuplicateNode("A".to_string()))
        );
        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn test_edge_validation() {
        let mut graph = graph_with(&["A", "B"]);

        assert_eq!(
            graph.add_edge("A", "Z", 1.0),
            Err(GraphError::UnknownNode("Z".to_string()))
        );
        assert_eq!(
            graph.add_edge("A", "A", 1.0),
            Err(GraphError::SelfLoop("A".to_string()))
        );
        assert!(matches!(
            graph.add_edge("A", "B", -1.0),
            Err(GraphError::InvalidWeight { .. })
        ));
        assert!(matches!(
            graph.add_edge("A", "B", f64::NAN),
            Err(GraphError::InvalidWeight { .. })
        ));
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_edge_overwrite_is_idempotent() {
        let mut graph = graph_with(&["A", "B"]);
        graph.add_edge("A", "B", 3.0).unwrap();
        graph.add_edge("B", "A", 4.0).unwrap();
        graph.add_edge("A", "B", 4.0).unwrap();

        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.edge_weight("A", "B"), Ok(4.0));
        assert_eq!(graph.edge_weight("B", "A"), Ok(4.0));
    }

    #[test]
    fn test_missing_edge() {
        let graph = graph_with(&["A", "B"]);
        assert_eq!(
            graph.edge_weight("A", "B"),
            Err(GraphError::NoSuchEdge("A".to_string(), "B".to_string()))
        );
        assert!(!graph.has_edge("A", "B"));
        assert!(!graph.has_edge("A", "Z"));
    }

    #[test]
    fn test_trivial_path() {
        let graph = graph_with(&["A"]);
        assert_eq!(graph.shortest_path("A", "A"), Ok((vec!["A".to_string()], 0.0)));
    }

    #[test]
    fn test_path_through_intermediate() {
        let mut graph = graph_with(&["A", "B", "C"]);
        graph.add_edge("A", "B", 10.0).unwrap();
        graph.add_edge("A", "C", 1.0).unwrap();
        graph.add_edge("C", "B", 2.0).unwrap();

        let (path, distance) = graph.shortest_path("A", "B").unwrap();
        assert_eq!(path, vec!["A", "C", "B"]);
        assert_eq!(distance, 3.0);

        // Same answer in the reverse direction
        let (path, distance) = graph.shortest_path("B", "A").unwrap();
        assert_eq!(path, vec!["B", "C", "A"]);
        assert_eq!(distance, 3.0);
    }

    #[test]
    fn test_equal_paths_prefer_earlier_node() {
        let mut graph = graph_with(&["A", "B", "C", "D"]);
        // The route through C is inserted first
        graph.add_edge("A", "C", 1.0).unwrap();
        graph.add_edge("C", "D", 1.0).unwrap();
        graph.add_edge("A", "B", 1.0).unwrap();
        graph.add_edge("B", "D", 1.0).unwrap();

        let (path, distance) = graph.shortest_path("A", "D").unwrap();
        assert_eq!(path, vec!["A", "B", "D"]);
        assert_eq!(distance, 2.0);
    }

    #[test]
    fn test_no_path() {
        let mut graph = graph_with(&["A", "B", "C"]);
        graph.add_edge("A", "B", 1.0).unwrap();

        assert_eq!(
            graph.shortest_path("A", "C"),
            Err(GraphError::NoPath("A".to_string(), "C".to_string()))
        );
        assert_eq!(
            graph.shortest_distance("A", "Z"),
            Err(GraphError::UnknownNode("Z".to_string()))
        );
    }

    #[test]
    fn test_weights_reflect_latest_insert() {
        let mut graph = graph_with(&["A", "B", "C"]);
        graph.add_edge("A", "B", 1.0).unwrap();
        graph.add_edge("B", "C", 1.0).unwrap();
        graph.add_edge("A", "C", 5.0).unwrap();
        assert_eq!(graph.shortest_distance("A", "C"), Ok(2.0));

        graph.add_edge("A", "C", 1.5).unwrap();
        assert_eq!(graph.shortest_path("A", "C"), Ok((vec!["A".to_string(), "C".to_string()], 1.5)));
    }

    #[test]
    fn test_origin_lookup() {
        let mut graph = graph_with(&["A"]);
        assert!(graph.origin().is_none());

        graph
            .add_node(Point::origin("Buyer", Coordinate::new(1.0, 1.0), "Home"))
            .unwrap();
        assert_eq!(graph.origin().map(|p| p.name.as_str()), Some("Buyer"));
        assert_eq!(graph.require_point("Buyer").unwrap().address, "Home");
        assert!(graph.require_point("Nope").is_err());
    }
}
