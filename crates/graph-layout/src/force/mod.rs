//! Force-directed layout after Fruchterman and Reingold
//!
//! Nodes repel each other and edges pull their endpoints together while a
//! cooling temperature limits how far a node may move per iteration. The
//! starting positions come from a seeded generator, so a given graph and
//! configuration always produce the same layout. Disconnected parts of the
//! graph are then laid out side by side.

mod clusters;

use crate::render::{ArrowEdgeRenderer, EdgeGeometry, EdgeRenderer};
use crate::{Graph, LayoutEngine, LayoutError, NodeId, Payload, Size, Vector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, trace, warn};

use clusters::separate_clusters;

/// Floor for distances, keeps coincident nodes from dividing by zero
const EPSILON: f64 = 1e-4;

/// Configuration for [`FruchtermanReingoldLayout`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FruchtermanReingoldConfiguration {
    /// Upper bound on simulation steps
    pub iterations: usize,

    /// Seed of the generator placing the nodes initially
    pub seed: u64,

    /// Gap left between disconnected parts of the graph
    pub cluster_padding: f64,
}

impl Default for FruchtermanReingoldConfiguration {
    fn default() -> Self {
        Self {
            iterations: 1000,
            seed: 401_678,
            cluster_padding: 100.0,
        }
    }
}

impl FruchtermanReingoldConfiguration {
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_cluster_padding(mut self, padding: f64) -> Self {
        self.cluster_padding = padding;
        self
    }
}

/// Force-directed layout engine
pub struct FruchtermanReingoldLayout<T: Payload> {
    config: FruchtermanReingoldConfiguration,
    renderer: Box<dyn EdgeRenderer<T>>,
    size: Size,
}

impl<T: Payload> FruchtermanReingoldLayout<T> {
    pub fn new(config: FruchtermanReingoldConfiguration) -> Self {
        Self {
            config,
            renderer: Box::new(ArrowEdgeRenderer::default()),
            size: Size::zero(),
        }
    }

    pub fn configuration(&self) -> &FruchtermanReingoldConfiguration {
        &self.config
    }

    /// Run the simulation and return the final node positions, in the order
    /// of `graph.nodes()`
    fn simulate(&self, graph: &Graph<T>) -> Vec<Vector> {
        let nodes = graph.nodes();
        let n = nodes.len();
        let index: HashMap<NodeId, usize> =
            nodes.iter().enumerate().map(|(i, &id)| (id, i)).collect();
        let edges: Vec<(usize, usize)> = graph
            .edges()
            .iter()
            .filter_map(|e| Some((*index.get(&e.source)?, *index.get(&e.destination)?)))
            .collect();

        let biggest = nodes
            .iter()
            .map(|&id| graph[id].width().max(graph[id].height()))
            .fold(1.0, f64::max);
        let width = biggest * n as f64;
        let height = width;

        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut positions: Vec<Vector> = (0..n)
            .map(|_| {
                Vector::new(
                    rng.gen_range(0.0..=width / 2.0),
                    rng.gen_range(0.0..=height / 2.0),
                )
            })
            .collect();

        let mut temperature = 0.1 * (width / 2.0 * height / 2.0).sqrt();
        let k = 0.75 * (width * height / n as f64).sqrt();
        let frozen = 1.0 / width.max(height);
        let iterations = self.config.iterations;

        let mut displacements = vec![Vector::zero(); n];
        for i in 0..iterations {
            displacements.fill(Vector::zero());

            for a in 0..n {
                for b in a + 1..n {
                    let delta = positions[a] - positions[b];
                    let distance = delta.length().max(EPSILON);
                    let push = delta / distance * (k * k / distance);
                    displacements[a] = displacements[a] + push;
                    displacements[b] = displacements[b] - push;
                }
            }

            for &(s, d) in &edges {
                let delta = positions[s] - positions[d];
                let distance = delta.length().max(EPSILON);
                let pull = delta / distance * (distance * distance / k);
                displacements[s] = displacements[s] - pull;
                displacements[d] = displacements[d] + pull;
            }

            for (position, displacement) in positions.iter_mut().zip(&displacements) {
                let length = displacement.length().max(EPSILON);
                *position = *position + *displacement / length * length.min(temperature);
            }

            temperature *= 1.0 - i as f64 / iterations as f64;
            if temperature < frozen {
                trace!("Force layout froze after {} iterations", i + 1);
                break;
            }
        }

        positions
    }
}

impl<T: Payload> Default for FruchtermanReingoldLayout<T> {
    fn default() -> Self {
        Self::new(FruchtermanReingoldConfiguration::default())
    }
}

impl<T: Payload> LayoutEngine<T> for FruchtermanReingoldLayout<T> {
    fn run(&mut self, graph: &mut Graph<T>) -> Result<Size, LayoutError> {
        self.size = Size::zero();
        if let Some(node) = graph.find_self_loop() {
            warn!("Force layout rejected self-loop at {node:?}");
            return Err(LayoutError::SelfLoop(node));
        }
        if graph.is_empty() {
            return Ok(self.size);
        }

        let positions = self.simulate(graph);
        for (i, position) in positions.into_iter().enumerate() {
            let id = graph.nodes()[i];
            graph[id].position = position;
        }

        if let Some(rect) = graph.bounding_rect() {
            graph.translate(Vector::new(-rect.left, -rect.top));
        }
        let clusters = separate_clusters(graph, self.config.cluster_padding);

        self.size = graph.bounding_size();
        debug!(
            "Force layout of {} nodes in {clusters} clusters: {:?}",
            graph.node_count(),
            self.size
        );
        Ok(self.size)
    }

    fn graph_size(&self) -> Size {
        self.size
    }

    fn edge_geometry(&self, graph: &Graph<T>) -> Vec<EdgeGeometry> {
        self.renderer.render(graph)
    }

    fn set_edge_renderer(&mut self, renderer: Box<dyn EdgeRenderer<T>>) -> Result<(), LayoutError> {
        self.renderer = renderer;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn sample_graph() -> Graph<char> {
        let mut graph = Graph::new();
        for (s, d) in [
            ('a', 'b'),
            ('a', 'c'),
            ('a', 'd'),
            ('c', 'e'),
            ('d', 'f'),
            ('f', 'c'),
            ('g', 'c'),
            ('h', 'g'),
        ] {
            graph.add_edge(s, d);
        }
        graph.measure(&|_: &char| Size::new(100.0, 100.0));
        graph
    }

    fn positions(graph: &Graph<char>) -> Vec<Vector> {
        graph.nodes().iter().map(|&id| graph[id].position).collect()
    }

    #[test]
    fn same_seed_same_layout() {
        let mut first = sample_graph();
        let mut second = sample_graph();
        let size = FruchtermanReingoldLayout::default().run(&mut first).unwrap();
        let again = FruchtermanReingoldLayout::default().run(&mut second).unwrap();

        assert_eq!(size, again);
        assert_eq!(positions(&first), positions(&second));

        let mut third = sample_graph();
        FruchtermanReingoldLayout::new(FruchtermanReingoldConfiguration::default().with_seed(7))
            .run(&mut third)
            .unwrap();
        assert_ne!(positions(&first), positions(&third));
    }

    #[test]
    fn connected_graph_is_anchored_at_origin() {
        let mut graph = sample_graph();
        let size = FruchtermanReingoldLayout::default().run(&mut graph).unwrap();

        let rect = graph.bounding_rect().unwrap();
        assert!(rect.left.abs() < 1e-9 && rect.top.abs() < 1e-9);
        assert_eq!(size, rect.size());
        for position in positions(&graph) {
            assert!(position.x.is_finite() && position.y.is_finite());
        }
    }

    #[test]
    fn connected_nodes_end_up_closer_than_the_start_area() {
        let mut graph = Graph::new();
        graph.add_edge(1, 2);
        graph.measure(&|_: &i32| Size::new(10.0, 10.0));
        FruchtermanReingoldLayout::default().run(&mut graph).unwrap();

        let (a, b) = (graph.nodes()[0], graph.nodes()[1]);
        let distance = (graph[a].center() - graph[b].center()).length();
        // k = 0.75 * sqrt(20 * 20 / 2), the balance point of the two forces
        assert!(distance > 1.0 && distance < 30.0, "distance {distance}");
    }

    #[test]
    fn rejects_self_loops() {
        let mut graph = sample_graph();
        let e = graph.add_edge('e', 'e');
        assert_eq!(
            FruchtermanReingoldLayout::default().run(&mut graph),
            Err(LayoutError::SelfLoop(e.source))
        );
    }

    #[test]
    fn empty_and_single_node() {
        let mut layout = FruchtermanReingoldLayout::default();
        let mut empty: Graph<char> = Graph::new();
        assert_eq!(layout.run(&mut empty), Ok(Size::zero()));

        let mut single = Graph::new();
        let id = single.add_node('x');
        single[id].size = Size::new(30.0, 20.0);
        assert_eq!(layout.run(&mut single), Ok(Size::new(30.0, 20.0)));
        assert_eq!(single[id].position, Vector::zero());
    }

    #[test]
    fn default_renderer_draws_arrows() {
        let mut graph = sample_graph();
        let mut layout = FruchtermanReingoldLayout::default();
        layout.run(&mut graph).unwrap();

        let geometry = layout.edge_geometry(&graph);
        assert_eq!(geometry.len(), graph.edge_count());
        assert!(geometry.iter().all(|g| g.arrow_head.is_some()));
    }
}
