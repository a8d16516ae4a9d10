//! Graph data model shared by every layout
//!
//! Nodes are identified by their payload: adding a payload that is already
//! present returns the existing node. Nodes and edges keep their insertion
//! order, which the layouts rely on (the first node is the tree root, children
//! are ordered by edge insertion).

mod events;

pub use events::GraphEvent;

use crate::{GraphError, NodeSizes, Rect, Size, Vector};
use crossbeam::channel::Receiver;
use events::Subscribers;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;
use std::ops::{Index, IndexMut};
use tracing::trace;

/// Bounds required from a node payload
pub trait Payload: Clone + Eq + Hash + fmt::Debug {}

impl<T> Payload for T where T: Clone + Eq + Hash + fmt::Debug {}

/// Stable handle to a node, valid until that node is removed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(NodeIndex);

impl NodeId {
    pub fn index(self) -> usize {
        self.0.index()
    }
}

/// A node placed by the layouts
#[derive(Debug, Clone, PartialEq)]
pub struct Node<T> {
    payload: T,
    /// Top-left corner, written by the layouts
    pub position: Vector,
    /// Measured extent, written by the caller before a layout runs
    pub size: Size,
}

impl<T> Node<T> {
    pub fn new(payload: T) -> Self {
        Self {
            payload,
            position: Vector::zero(),
            size: Size::zero(),
        }
    }

    pub fn payload(&self) -> &T {
        &self.payload
    }

    pub fn x(&self) -> f64 {
        self.position.x
    }

    pub fn y(&self) -> f64 {
        self.position.y
    }

    pub fn width(&self) -> f64 {
        self.size.width
    }

    pub fn height(&self) -> f64 {
        self.size.height
    }

    pub fn center(&self) -> Vector {
        Vector::new(
            self.position.x + self.size.width / 2.0,
            self.position.y + self.size.height / 2.0,
        )
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.position, self.size)
    }
}

/// A directed edge between two nodes of the same graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    pub source: NodeId,
    pub destination: NodeId,
}

impl Edge {
    pub fn new(source: NodeId, destination: NodeId) -> Self {
        Self {
            source,
            destination,
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.destination
    }
}

/// Directed graph of payload-identified nodes
pub struct Graph<T: Payload> {
    inner: StableDiGraph<Node<T>, ()>,
    nodes: Vec<NodeId>,
    edges: Vec<Edge>,
    lookup: HashMap<T, NodeId>,
    subscribers: Subscribers,
}

impl<T: Payload> Default for Graph<T> {
    fn default() -> Self {
        Self {
            inner: StableDiGraph::new(),
            nodes: Vec::new(),
            edges: Vec::new(),
            lookup: HashMap::new(),
            subscribers: Subscribers::default(),
        }
    }
}

/// Cloning yields an unobserved copy: subscribers stay with the original.
impl<T: Payload> Clone for Graph<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
            lookup: self.lookup.clone(),
            subscribers: Subscribers::default(),
        }
    }
}

impl<T: Payload> fmt::Debug for Graph<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field(
                "nodes",
                &self.nodes.iter().map(|&id| &self[id]).collect::<Vec<_>>(),
            )
            .field("edges", &self.edges)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl<T: Payload> Graph<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Receive a [`GraphEvent`] for every subsequent mutation
    pub fn subscribe(&mut self) -> Receiver<GraphEvent> {
        self.subscribers.subscribe()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node handles in insertion order
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Edges in insertion order
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: NodeId) -> Option<&Node<T>> {
        self.inner.node_weight(id.0)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node<T>> {
        self.inner.node_weight_mut(id.0)
    }

    pub fn payload(&self, id: NodeId) -> Option<&T> {
        self.node(id).map(Node::payload)
    }

    /// Find the node carrying `payload`
    pub fn node_id(&self, payload: &T) -> Option<NodeId> {
        self.lookup.get(payload).copied()
    }

    pub fn contains(&self, payload: &T) -> bool {
        self.lookup.contains_key(payload)
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.inner.contains_node(id.0)
    }

    pub fn contains_edge(&self, source: NodeId, destination: NodeId) -> bool {
        self.edge_between(source, destination).is_some()
    }

    /// Node at the given insertion index
    pub fn node_at(&self, position: usize) -> Result<NodeId, GraphError> {
        self.nodes
            .get(position)
            .copied()
            .ok_or(GraphError::IndexOutOfRange {
                index: position,
                len: self.nodes.len(),
            })
    }

    /// Add a node, or return the existing one carrying an equal payload
    pub fn add_node(&mut self, payload: T) -> NodeId {
        if let Some(&id) = self.lookup.get(&payload) {
            return id;
        }

        let id = NodeId(self.inner.add_node(Node::new(payload.clone())));
        self.lookup.insert(payload, id);
        self.nodes.push(id);
        self.subscribers.notify(GraphEvent::NodeAdded(id));
        id
    }

    pub fn add_nodes(&mut self, payloads: impl IntoIterator<Item = T>) -> Vec<NodeId> {
        payloads.into_iter().map(|p| self.add_node(p)).collect()
    }

    /// Add an edge between two payloads, adding missing endpoints first
    pub fn add_edge(&mut self, source: T, destination: T) -> Edge {
        let source = self.add_node(source);
        let destination = self.add_node(destination);
        self.insert_edge(source, destination)
    }

    /// Add an edge between two nodes already in the graph
    pub fn connect(&mut self, source: NodeId, destination: NodeId) -> Result<Edge, GraphError> {
        for id in [source, destination] {
            if !self.contains_node(id) {
                return Err(GraphError::UnknownNode(id));
            }
        }
        Ok(self.insert_edge(source, destination))
    }

    fn insert_edge(&mut self, source: NodeId, destination: NodeId) -> Edge {
        let edge = Edge::new(source, destination);
        if self.edges.contains(&edge) {
            return edge;
        }

        self.inner.add_edge(source.0, destination.0, ());
        self.edges.push(edge);
        self.subscribers.notify(GraphEvent::EdgeAdded(edge));
        edge
    }

    /// Remove the edge `source -> destination`, returning whether it existed
    pub fn remove_edge(&mut self, source: NodeId, destination: NodeId) -> bool {
        let Some(at) = self
            .edges
            .iter()
            .position(|e| e.source == source && e.destination == destination)
        else {
            return false;
        };

        let edge = self.edges.remove(at);
        if let Some(index) = self.inner.find_edge(source.0, destination.0) {
            self.inner.remove_edge(index);
        }
        self.subscribers.notify(GraphEvent::EdgeRemoved(edge));
        true
    }

    pub fn remove_edges(&mut self, edges: impl IntoIterator<Item = Edge>) {
        for edge in edges {
            self.remove_edge(edge.source, edge.destination);
        }
    }

    /// Remove a node and every edge touching it
    pub fn remove_node(&mut self, id: NodeId) -> Result<Node<T>, GraphError> {
        if !self.contains_node(id) {
            return Err(GraphError::UnknownNode(id));
        }

        let touching: Vec<Edge> = self
            .edges
            .iter()
            .filter(|e| e.source == id || e.destination == id)
            .copied()
            .collect();
        self.edges
            .retain(|e| e.source != id && e.destination != id);
        for edge in touching {
            self.subscribers.notify(GraphEvent::EdgeRemoved(edge));
        }

        let node = self
            .inner
            .remove_node(id.0)
            .ok_or(GraphError::UnknownNode(id))?;
        self.nodes.retain(|&n| n != id);
        self.lookup.remove(&node.payload);
        self.subscribers.notify(GraphEvent::NodeRemoved(id));
        Ok(node)
    }

    /// Remove a node together with everything reachable through its successors
    ///
    /// Returns the removed nodes, the given node first.
    pub fn remove_subtree(&mut self, id: NodeId) -> Result<Vec<Node<T>>, GraphError> {
        if !self.contains_node(id) {
            return Err(GraphError::UnknownNode(id));
        }

        let mut seen = HashSet::from([id]);
        let mut order = vec![id];
        let mut next = 0;
        while next < order.len() {
            let current = order[next];
            next += 1;
            for succ in self.successors_of(current).collect::<Vec<_>>() {
                if seen.insert(succ) {
                    order.push(succ);
                }
            }
        }
        trace!("Removing subtree of {id:?}: {} nodes", order.len());

        order.into_iter().map(|n| self.remove_node(n)).collect()
    }

    /// Replace the payload of a node, keeping its edges and geometry
    pub fn replace_payload(&mut self, id: NodeId, payload: T) -> Result<T, GraphError> {
        match self.lookup.get(&payload) {
            Some(&owner) if owner == id => return Ok(payload),
            Some(&owner) => return Err(GraphError::DuplicatePayload(owner)),
            None => {}
        }

        let node = self
            .inner
            .node_weight_mut(id.0)
            .ok_or(GraphError::UnknownNode(id))?;
        let old = std::mem::replace(&mut node.payload, payload.clone());
        self.lookup.remove(&old);
        self.lookup.insert(payload, id);
        self.subscribers.notify(GraphEvent::DataChanged(id));
        Ok(old)
    }

    /// Remove every node and edge
    pub fn clear(&mut self) {
        self.inner.clear();
        self.nodes.clear();
        self.edges.clear();
        self.lookup.clear();
        self.subscribers.notify(GraphEvent::Invalidated);
    }

    pub fn edge_between(&self, source: NodeId, destination: NodeId) -> Option<Edge> {
        self.edges
            .iter()
            .find(|e| e.source == source && e.destination == destination)
            .copied()
    }

    pub fn out_edges(&self, id: NodeId) -> impl Iterator<Item = Edge> + '_ {
        self.edges.iter().filter(move |e| e.source == id).copied()
    }

    pub fn in_edges(&self, id: NodeId) -> impl Iterator<Item = Edge> + '_ {
        self.edges.iter().filter(move |e| e.destination == id).copied()
    }

    pub fn has_successor(&self, id: NodeId) -> bool {
        self.edges.iter().any(|e| e.source == id)
    }

    pub fn has_predecessor(&self, id: NodeId) -> bool {
        self.edges.iter().any(|e| e.destination == id)
    }

    /// Successors in edge insertion order
    pub fn successors_of(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.out_edges(id).map(|e| e.destination)
    }

    /// Predecessors in edge insertion order
    pub fn predecessors_of(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.in_edges(id).map(|e| e.source)
    }

    /// First edge going from a node to itself, if any
    pub fn find_self_loop(&self) -> Option<NodeId> {
        self.edges.iter().find(|e| e.is_self_loop()).map(|e| e.source)
    }

    /// Store the measured size of every node
    pub fn measure<S>(&mut self, sizes: &S)
    where
        S: NodeSizes<T>,
    {
        for node in self.inner.node_weights_mut() {
            node.size = sizes.size(&node.payload);
        }
    }

    /// Shift every node position by `offset`
    pub fn translate(&mut self, offset: Vector) {
        for node in self.inner.node_weights_mut() {
            node.position = node.position + offset;
        }
    }

    /// Bounding box of all nodes, `None` for an empty graph
    pub fn bounding_rect(&self) -> Option<Rect> {
        Rect::enclosing(self.nodes.iter().map(|&id| self[id].rect()))
    }

    /// Extent of all placed nodes
    pub fn bounding_size(&self) -> Size {
        self.bounding_rect().map_or(Size::zero(), |r| r.size())
    }

    /// Underlying petgraph structure, for running petgraph algorithms
    pub fn as_petgraph(&self) -> &StableDiGraph<Node<T>, ()> {
        &self.inner
    }
}

impl<T: Payload> Index<NodeId> for Graph<T> {
    type Output = Node<T>;

    fn index(&self, id: NodeId) -> &Self::Output {
        &self.inner[id.0]
    }
}

impl<T: Payload> IndexMut<NodeId> for Graph<T> {
    fn index_mut(&mut self, id: NodeId) -> &mut Self::Output {
        &mut self.inner[id.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn add_node_deduplicates_by_payload() {
        let mut graph = Graph::new();
        let a = graph.add_node("a");
        let b = graph.add_node("b");

        assert_eq!(graph.add_node("a"), a);
        assert_ne!(a, b);
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.node_id(&"b"), Some(b));
        assert!(graph.contains(&"a"));
        assert!(!graph.contains(&"c"));
    }

    #[test]
    fn add_edge_adds_endpoints_once() {
        let mut graph = Graph::new();
        let first = graph.add_edge(1, 2);
        let second = graph.add_edge(1, 2);

        assert_eq!(first, second);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.as_petgraph().edge_count(), 1);

        // The reverse direction is a different edge
        graph.add_edge(2, 1);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn adjacency_follows_edge_insertion_order() {
        let mut graph = Graph::new();
        graph.add_edge(0, 3);
        graph.add_edge(0, 1);
        graph.add_edge(0, 2);
        graph.add_edge(4, 2);

        let root = graph.node_at(0).unwrap();
        let succs: Vec<_> = graph
            .successors_of(root)
            .map(|n| *graph.payload(n).unwrap())
            .collect();
        assert_eq!(succs, vec![3, 1, 2]);

        let two = graph.node_id(&2).unwrap();
        let preds: Vec<_> = graph
            .predecessors_of(two)
            .map(|n| *graph.payload(n).unwrap())
            .collect();
        assert_eq!(preds, vec![0, 4]);
        assert!(graph.has_predecessor(two));
        assert!(!graph.has_successor(two));
    }

    #[test]
    fn node_at_reports_out_of_range() {
        let mut graph = Graph::new();
        graph.add_node('x');

        assert!(graph.node_at(0).is_ok());
        assert_eq!(
            graph.node_at(3),
            Err(GraphError::IndexOutOfRange { index: 3, len: 1 })
        );
    }

    #[test]
    fn remove_node_drops_touching_edges_only() {
        let mut graph = Graph::new();
        graph.add_edge("a", "b");
        graph.add_edge("b", "c");
        graph.add_edge("a", "c");

        let b = graph.node_id(&"b").unwrap();
        let removed = graph.remove_node(b).unwrap();

        assert_eq!(removed.payload(), &"b");
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.node_id(&"c").is_some());
        assert_eq!(graph.remove_node(b), Err(GraphError::UnknownNode(b)));
    }

    #[test]
    fn remove_subtree_cascades_through_descendants() {
        let mut graph = Graph::new();
        graph.add_edge(1, 2);
        graph.add_edge(1, 3);
        graph.add_edge(2, 4);
        graph.add_edge(4, 2);
        graph.add_edge(5, 3);

        let two = graph.node_id(&2).unwrap();
        let removed = graph.remove_subtree(two).unwrap();

        let payloads: Vec<_> = removed.iter().map(|n| *n.payload()).collect();
        assert_eq!(payloads, vec![2, 4]);
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn subscribers_see_mutations() {
        let mut graph = Graph::new();
        let events = graph.subscribe();

        let edge = graph.add_edge("a", "b");
        graph.remove_edge(edge.source, edge.destination);
        graph.replace_payload(edge.source, "z").unwrap();
        graph.clear();

        let received: Vec<_> = events.try_iter().collect();
        assert_eq!(
            received,
            vec![
                GraphEvent::NodeAdded(edge.source),
                GraphEvent::NodeAdded(edge.destination),
                GraphEvent::EdgeAdded(edge),
                GraphEvent::EdgeRemoved(edge),
                GraphEvent::DataChanged(edge.source),
                GraphEvent::Invalidated,
            ]
        );
    }

    #[test]
    fn clones_are_not_observed() {
        let mut graph = Graph::new();
        let events = graph.subscribe();
        graph.add_node(1);
        let _ = events.try_iter().count();

        let mut copy = graph.clone();
        copy.add_edge(1, 2);
        copy.remove_node(copy.node_id(&1).unwrap()).unwrap();

        assert_eq!(events.try_iter().count(), 0);
        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn dropped_receivers_are_pruned() {
        let mut graph = Graph::new();
        drop(graph.subscribe());
        graph.add_node(1);
        assert_eq!(graph.subscribers.len(), 0);
    }

    #[test]
    fn replace_payload_rejects_duplicates() {
        let mut graph = Graph::new();
        let a = graph.add_node("a");
        let b = graph.add_node("b");

        assert_eq!(
            graph.replace_payload(a, "b"),
            Err(GraphError::DuplicatePayload(b))
        );
        assert_eq!(graph.replace_payload(a, "c"), Ok("a"));
        assert_eq!(graph.node_id(&"c"), Some(a));
        assert!(!graph.contains(&"a"));
    }

    #[test]
    fn measure_and_bounding_size() {
        let mut graph = Graph::new();
        let a = graph.add_node(10);
        let b = graph.add_node(20);
        graph.measure(&|p: &i32| Size::new(*p as f64, 5.0));

        graph[b].position = Vector::new(30.0, 10.0);
        assert_eq!(graph[a].size, Size::new(10.0, 5.0));
        assert_eq!(graph.bounding_size(), Size::new(50.0, 15.0));

        graph.translate(Vector::new(1.0, 1.0));
        assert_eq!(graph[a].position, Vector::new(1.0, 1.0));
        assert_eq!(Graph::<u8>::new().bounding_size(), Size::zero());
    }
}
