//! Layered layout for directed graphs after Sugiyama
//!
//! The graph is copied into a private working graph and run through five
//! phases: cycle removal, layer assignment with dummy nodes on long edges,
//! crossing minimisation, Brandes–Köpf coordinate assignment and finally
//! denormalisation, which turns the dummy chains into bend points on the
//! caller's edges. Only node positions are written back to the caller's
//! graph.

mod crossings;
mod cycles;
mod denormalize;
mod layers;
mod positions;
mod work;

use crate::render::{EdgeGeometry, EdgeRenderer, LayeredEdgeRenderer};
use crate::{Edge, Graph, LayoutEngine, LayoutError, NodeId, Payload, Rect, Size, Vector};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use crossings::minimize_crossings;
use cycles::remove_cycles;
use denormalize::denormalize;
use layers::{assign_layers, split_long_edges};
use positions::assign_coordinates;
use work::WorkGraph;

/// Configuration for [`SugiyamaLayout`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SugiyamaConfiguration {
    /// Horizontal gap between neighbouring nodes of a layer
    pub node_separation: f64,

    /// Vertical gap between consecutive layers
    pub level_separation: f64,

    /// Rounds of median reordering during crossing minimisation
    pub crossing_iterations: usize,
}

impl Default for SugiyamaConfiguration {
    fn default() -> Self {
        Self {
            node_separation: 100.0,
            level_separation: 100.0,
            crossing_iterations: 24,
        }
    }
}

impl SugiyamaConfiguration {
    pub fn with_node_separation(mut self, separation: f64) -> Self {
        self.node_separation = separation;
        self
    }

    pub fn with_level_separation(mut self, separation: f64) -> Self {
        self.level_separation = separation;
        self
    }

    pub fn with_crossing_iterations(mut self, iterations: usize) -> Self {
        self.crossing_iterations = iterations;
        self
    }
}

/// Layered layout engine
///
/// Besides node positions, a run leaves behind the route of every edge, the
/// layer of every node and the crossing count of the chosen ordering. These
/// stay available until the next run.
#[derive(Debug, Clone, Default)]
pub struct SugiyamaLayout {
    config: SugiyamaConfiguration,
    size: Size,
    bend_points: HashMap<Edge, Vec<Vector>>,
    layers: HashMap<NodeId, usize>,
    reversed: HashSet<Edge>,
    crossings: usize,
}

impl SugiyamaLayout {
    pub fn new(config: SugiyamaConfiguration) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn configuration(&self) -> &SugiyamaConfiguration {
        &self.config
    }

    /// Bend points of an edge from its source center to its destination
    /// center, empty for a straight edge
    pub fn bend_points(&self, edge: &Edge) -> &[Vector] {
        self.bend_points.get(edge).map_or(&[], Vec::as_slice)
    }

    /// Every edge of the last run, with or without bend points
    pub fn routed_edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.bend_points.keys()
    }

    /// Edge crossings left in the chosen layer ordering
    pub fn crossings(&self) -> usize {
        self.crossings
    }

    /// Layer of a node in the last run, counted from the top
    pub fn layer_of(&self, id: NodeId) -> Option<usize> {
        self.layers.get(&id).copied()
    }

    /// Whether the edge was turned around to break a cycle
    pub fn is_reversed(&self, edge: &Edge) -> bool {
        self.reversed.contains(edge)
    }

    fn reset(&mut self) {
        self.size = Size::zero();
        self.bend_points.clear();
        self.layers.clear();
        self.reversed.clear();
        self.crossings = 0;
    }
}

impl<T: Payload> LayoutEngine<T> for SugiyamaLayout {
    fn run(&mut self, graph: &mut Graph<T>) -> Result<Size, LayoutError> {
        self.reset();
        if let Some(node) = graph.find_self_loop() {
            warn!("Layered layout rejects self-loop on {node:?}");
            return Err(LayoutError::SelfLoop(node));
        }
        if graph.is_empty() {
            return Ok(self.size);
        }

        let mut work = WorkGraph::from_graph(graph);
        let reversed = remove_cycles(&mut work);
        let mut layers = assign_layers(&mut work);
        let chains = split_long_edges(&mut work, &mut layers);
        let dummies = work.node_count() - graph.node_count();

        let (layers, crossings) =
            minimize_crossings(&work, layers, self.config.crossing_iterations);
        let centers = assign_coordinates(
            &work,
            &layers,
            self.config.node_separation,
            self.config.level_separation,
        );

        for (node, &center) in work.nodes.iter().zip(&centers) {
            if let Some(id) = node.origin {
                let half = Vector::new(node.size.width, node.size.height) / 2.0;
                graph[id].position = center - half;
                self.layers.insert(id, node.layer);
            }
        }

        self.bend_points = denormalize(&chains, &centers);
        self.reversed = chains.iter().filter(|c| c.reversed).map(|c| c.origin).collect();
        self.crossings = crossings;

        // Dummies only leave their route behind and do not count towards the size
        let points = self.bend_points.values().flatten().map(|&p| Rect::new(p, Size::zero()));
        let nodes = graph.nodes().iter().map(|&id| graph[id].rect());
        let bounds = Rect::enclosing(nodes.chain(points));
        if let Some(bounds) = bounds {
            let anchor = Vector::new(-bounds.left, -bounds.top);
            graph.translate(anchor);
            LayoutEngine::<T>::translate(self, anchor);
            self.size = bounds.size();
        }

        debug!(
            "Layered layout of {} nodes: {} layers, {} dummies, {} reversed, {} crossings, {:?}",
            graph.node_count(),
            layers.len(),
            dummies,
            reversed,
            crossings,
            self.size
        );
        Ok(self.size)
    }

    fn graph_size(&self) -> Size {
        self.size
    }

    fn edge_geometry(&self, graph: &Graph<T>) -> Vec<EdgeGeometry> {
        LayeredEdgeRenderer::new(&self.bend_points).render(graph)
    }

    fn set_edge_renderer(
        &mut self,
        _renderer: Box<dyn EdgeRenderer<T>>,
    ) -> Result<(), LayoutError> {
        Err(LayoutError::UnsupportedOperation(
            "the layered layout routes its own edges",
        ))
    }

    fn translate(&mut self, shift: Vector) {
        for points in self.bend_points.values_mut() {
            for point in points {
                *point = *point + shift;
            }
        }
    }
}
