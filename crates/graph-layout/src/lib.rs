//! Layout algorithms for node-link graphs
//!
//! A [`Graph`] holds payloads, their measured sizes and directed edges. A
//! [`LayoutEngine`] assigns each node a position (its top-left corner) and
//! reports the overall size of the result. Edge strokes are produced
//! afterwards by the engine's [`EdgeRenderer`](render::EdgeRenderer).
//!
//! # Layout Engines
//!
//! - [`BuchheimWalkerLayout`]: tidy tree layout in linear time
//! - [`FruchtermanReingoldLayout`]: seeded force-directed layout with
//!   separated components
//! - [`SugiyamaLayout`]: layered layout for directed graphs, cycles allowed
//!
//! # Example
//!
//! ```
//! use graphview_layout::{Graph, LayoutEngine, Size, SugiyamaLayout};
//!
//! // Create a graph
//! let mut graph = Graph::new();
//! graph.add_edge("parse", "check");
//! graph.add_edge("check", "emit");
//! graph.add_edge("parse", "emit");
//!
//! // Provide node sizes
//! graph.measure(&|_: &&str| Size::new(100.0, 50.0));
//!
//! // Run the layout
//! let mut layout = SugiyamaLayout::default();
//! let size = layout.run(&mut graph).unwrap();
//! assert!(size.height > 0.0);
//!
//! // Draw the edges
//! let strokes = layout.edge_geometry(&graph);
//! assert_eq!(strokes.len(), 3);
//! ```

mod engine;
mod error;
mod geometry;
mod sizes;

pub mod force;
pub mod graph;
pub mod layered;
pub mod render;
pub mod tree;

// Re-export core types and traits
pub use engine::LayoutEngine;
pub use error::{GraphError, LayoutError};
pub use geometry::{Rect, Size, Vector};
pub use graph::{Edge, Graph, GraphEvent, Node, NodeId, Payload};
pub use sizes::NodeSizes;

// Re-export layout types
pub use force::{FruchtermanReingoldConfiguration, FruchtermanReingoldLayout};
pub use layered::{SugiyamaConfiguration, SugiyamaLayout};
pub use tree::{BuchheimWalkerConfiguration, BuchheimWalkerLayout, Orientation};
