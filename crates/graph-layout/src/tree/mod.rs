//! Tidy tree layout (Buchheim, Jünger and Leipert's linear-time version of
//! Walker's algorithm)
//!
//! The node at insertion index 0 is the root; children are ordered by edge
//! insertion. Parents are centered over their children and subtrees are packed
//! as closely as the separations allow.

mod placement;
mod walker;

use crate::render::{EdgeGeometry, EdgeRenderer, TreeEdgeRenderer};
use crate::{Graph, LayoutEngine, LayoutError, Payload, Size, Vector};
use serde::{Deserialize, Serialize};
use tracing::debug;

use placement::place;
use walker::Walker;

/// Direction in which the tree grows from its root
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    TopBottom,
    BottomTop,
    LeftRight,
    RightLeft,
}

impl Orientation {
    /// Whether levels are stacked vertically (siblings side by side)
    pub fn is_vertical(self) -> bool {
        matches!(self, Orientation::TopBottom | Orientation::BottomTop)
    }

    /// Extent of a node across the tree levels
    pub(crate) fn breadth(self, size: Size) -> f64 {
        if self.is_vertical() {
            size.width
        } else {
            size.height
        }
    }

    /// Extent of a node along the tree levels
    pub(crate) fn length(self, size: Size) -> f64 {
        if self.is_vertical() {
            size.height
        } else {
            size.width
        }
    }
}

/// Configuration for [`BuchheimWalkerLayout`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuchheimWalkerConfiguration {
    /// Gap between nodes sharing a parent
    pub sibling_separation: f64,

    /// Gap between neighbouring nodes of different parents
    pub subtree_separation: f64,

    /// Gap between consecutive levels
    pub level_separation: f64,

    pub orientation: Orientation,

    /// Deepest tree accepted before giving up
    pub max_depth: usize,
}

impl Default for BuchheimWalkerConfiguration {
    fn default() -> Self {
        Self {
            sibling_separation: 100.0,
            subtree_separation: 100.0,
            level_separation: 100.0,
            orientation: Orientation::TopBottom,
            max_depth: 10_000,
        }
    }
}

impl BuchheimWalkerConfiguration {
    pub fn with_sibling_separation(mut self, separation: f64) -> Self {
        self.sibling_separation = separation;
        self
    }

    pub fn with_subtree_separation(mut self, separation: f64) -> Self {
        self.subtree_separation = separation;
        self
    }

    pub fn with_level_separation(mut self, separation: f64) -> Self {
        self.level_separation = separation;
        self
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Tidy tree layout engine
pub struct BuchheimWalkerLayout<T: Payload> {
    config: BuchheimWalkerConfiguration,
    renderer: Box<dyn EdgeRenderer<T>>,
    size: Size,
}

impl<T: Payload> BuchheimWalkerLayout<T> {
    pub fn new(config: BuchheimWalkerConfiguration) -> Self {
        let renderer = TreeEdgeRenderer::new(config.orientation, config.level_separation);
        Self {
            config,
            renderer: Box::new(renderer),
            size: Size::zero(),
        }
    }

    pub fn configuration(&self) -> &BuchheimWalkerConfiguration {
        &self.config
    }
}

impl<T: Payload> Default for BuchheimWalkerLayout<T> {
    fn default() -> Self {
        Self::new(BuchheimWalkerConfiguration::default())
    }
}

impl<T: Payload> LayoutEngine<T> for BuchheimWalkerLayout<T> {
    fn run(&mut self, graph: &mut Graph<T>) -> Result<Size, LayoutError> {
        self.size = Size::zero();
        if graph.is_empty() {
            return Ok(self.size);
        }

        let mut walker = Walker::build(graph, &self.config)?;
        walker.first_walk();
        let breadth = walker.second_walk();
        place(graph, &walker, &breadth, &self.config);

        // Anchor the result at the origin
        if let Some(rect) = graph.bounding_rect() {
            graph.translate(Vector::new(-rect.left, -rect.top));
            self.size = rect.size();
        }

        debug!(
            "Tree layout of {} nodes over {} levels: {:?}",
            graph.node_count(),
            walker.depth() + 1,
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
