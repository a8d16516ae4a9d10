//! Edge stroke geometry
//!
//! Renderers turn laid-out node boxes (and bend points, for the layered
//! layout) into polylines and arrow heads. Painting them is left to the caller.

use crate::{Edge, Graph, Node, Payload, Vector};
use crate::tree::Orientation;
use std::collections::HashMap;
use std::f64::consts::PI;

/// Stroke geometry of one edge
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeGeometry {
    pub edge: Edge,
    /// Points of the line, from the source side to the destination side
    pub polyline: Vec<Vector>,
    /// Filled triangle at the destination: tip first
    pub arrow_head: Option<[Vector; 3]>,
}

/// Produces edge geometry from a laid-out graph
pub trait EdgeRenderer<T: Payload> {
    fn render(&self, graph: &Graph<T>) -> Vec<EdgeGeometry>;
}

/// Center to center lines
#[derive(Debug, Clone, Copy, Default)]
pub struct StraightEdgeRenderer;

impl<T: Payload> EdgeRenderer<T> for StraightEdgeRenderer {
    fn render(&self, graph: &Graph<T>) -> Vec<EdgeGeometry> {
        graph
            .edges()
            .iter()
            .map(|&edge| EdgeGeometry {
                edge,
                polyline: vec![graph[edge.source].center(), graph[edge.destination].center()],
                arrow_head: None,
            })
            .collect()
    }
}

/// Lines ending on the destination border with a triangular arrow head
#[derive(Debug, Clone, Copy)]
pub struct ArrowEdgeRenderer {
    pub arrow_length: f64,
    /// Half opening angle of the head, in radians
    pub arrow_angle: f64,
}

impl Default for ArrowEdgeRenderer {
    fn default() -> Self {
        Self {
            arrow_length: 50.0,
            arrow_angle: 0.5,
        }
    }
}

impl ArrowEdgeRenderer {
    /// Geometry of a line running from `start` into the center of `destination`
    ///
    /// `leading` holds any points before `start` (bend points).
    fn arrow<T>(
        &self,
        edge: Edge,
        mut leading: Vec<Vector>,
        start: Vector,
        destination: &Node<T>,
    ) -> EdgeGeometry {
        let tip = clip_to_border(start, destination);
        let head = self.head(start, tip);
        let centroid = (head[0] + head[1] + head[2]) / 3.0;

        leading.push(start);
        leading.push(centroid);
        EdgeGeometry {
            edge,
            polyline: leading,
            arrow_head: Some(head),
        }
    }

    fn head(&self, start: Vector, tip: Vector) -> [Vector; 3] {
        let angle = (tip.y - start.y).atan2(tip.x - start.x) + PI;
        let wing = |a: f64| tip + Vector::new(a.cos(), a.sin()) * self.arrow_length;
        [tip, wing(angle - self.arrow_angle), wing(angle + self.arrow_angle)]
    }
}

impl<T: Payload> EdgeRenderer<T> for ArrowEdgeRenderer {
    fn render(&self, graph: &Graph<T>) -> Vec<EdgeGeometry> {
        graph
            .edges()
            .iter()
            .map(|&edge| {
                let start = graph[edge.source].center();
                self.arrow(edge, Vec::new(), start, &graph[edge.destination])
            })
            .collect()
    }
}

/// Point where the line from `from` to the center of `node` enters its box
fn clip_to_border<T>(from: Vector, node: &Node<T>) -> Vector {
    let center = node.center();
    let delta = from - center;
    let half_width = node.width() / 2.0;
    let half_height = node.height() / 2.0;

    let tx = if delta.x != 0.0 { half_width / delta.x.abs() } else { f64::INFINITY };
    let ty = if delta.y != 0.0 { half_height / delta.y.abs() } else { f64::INFINITY };
    let t = tx.min(ty);
    if !t.is_finite() {
        return center;
    }

    // `from` inside the box
    if t >= 1.0 {
        return from;
    }
    center + delta * t
}

/// Orthogonal parent-child connectors for tree layouts
///
/// Each connector leaves the child on the side facing its parent, turns
/// halfway across the level separation and enters the parent from the
/// opposite side.
#[derive(Debug, Clone, Copy)]
pub struct TreeEdgeRenderer {
    pub orientation: Orientation,
    pub level_separation: f64,
}

impl TreeEdgeRenderer {
    pub fn new(orientation: Orientation, level_separation: f64) -> Self {
        Self {
            orientation,
            level_separation,
        }
    }

    fn elbow<T>(&self, parent: &Node<T>, child: &Node<T>) -> Vec<Vector> {
        let half = self.level_separation / 2.0;
        let (p, c) = (parent.rect(), child.rect());
        let (pc, cc) = (parent.center(), child.center());

        match self.orientation {
            Orientation::TopBottom => {
                let turn = c.top - half;
                vec![
                    Vector::new(cc.x, c.top),
                    Vector::new(cc.x, turn),
                    Vector::new(pc.x, turn),
                    Vector::new(pc.x, p.bottom),
                ]
            }
            Orientation::BottomTop => {
                let turn = c.bottom + half;
                vec![
                    Vector::new(cc.x, c.bottom),
                    Vector::new(cc.x, turn),
                    Vector::new(pc.x, turn),
                    Vector::new(pc.x, p.top),
                ]
            }
            Orientation::LeftRight => {
                let turn = c.left - half;
                vec![
                    Vector::new(c.left, cc.y),
                    Vector::new(turn, cc.y),
                    Vector::new(turn, pc.y),
                    Vector::new(p.right, pc.y),
                ]
            }
            Orientation::RightLeft => {
                let turn = c.right + half;
                vec![
                    Vector::new(c.right, cc.y),
                    Vector::new(turn, cc.y),
                    Vector::new(turn, pc.y),
                    Vector::new(p.left, pc.y),
                ]
            }
        }
    }
}

impl<T: Payload> EdgeRenderer<T> for TreeEdgeRenderer {
    fn render(&self, graph: &Graph<T>) -> Vec<EdgeGeometry> {
        graph
            .edges()
            .iter()
            .map(|&edge| EdgeGeometry {
                edge,
                polyline: self.elbow(&graph[edge.source], &graph[edge.destination]),
                arrow_head: None,
            })
            .collect()
    }
}

/// Follows the bend points computed by the layered layout
///
/// Edges without bend points are drawn like [`ArrowEdgeRenderer`] does.
#[derive(Debug, Clone, Copy)]
pub struct LayeredEdgeRenderer<'a> {
    bend_points: &'a HashMap<Edge, Vec<Vector>>,
    arrow: ArrowEdgeRenderer,
}

impl<'a> LayeredEdgeRenderer<'a> {
    pub fn new(bend_points: &'a HashMap<Edge, Vec<Vector>>) -> Self {
        Self {
            bend_points,
            arrow: ArrowEdgeRenderer::default(),
        }
    }
}

impl<T: Payload> EdgeRenderer<T> for LayeredEdgeRenderer<'_> {
    fn render(&self, graph: &Graph<T>) -> Vec<EdgeGeometry> {
        graph
            .edges()
            .iter()
            .map(|&edge| {
                let destination = &graph[edge.destination];
                match self.bend_points.get(&edge).map(Vec::as_slice) {
                    // The last bend point is the destination center; the
                    // arrow starts from the one before it
                    Some([leading @ .., start, _]) => {
                        self.arrow.arrow(edge, leading.to_vec(), *start, destination)
                    }
                    _ => {
                        let start = graph[edge.source].center();
                        self.arrow.arrow(edge, Vec::new(), start, destination)
                    }
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Size;
    use test_log::test;

    fn two_boxes() -> (Graph<&'static str>, Edge) {
        let mut graph = Graph::new();
        let edge = graph.add_edge("a", "b");
        graph.measure(&|_: &&str| Size::new(100.0, 50.0));
        graph[edge.destination].position = Vector::new(300.0, 0.0);
        (graph, edge)
    }

    #[test]
    fn straight_lines_join_centers() {
        let (graph, edge) = two_boxes();
        let geometry = StraightEdgeRenderer.render(&graph);

        assert_eq!(geometry.len(), 1);
        assert_eq!(geometry[0].edge, edge);
        assert_eq!(
            geometry[0].polyline,
            vec![Vector::new(50.0, 25.0), Vector::new(350.0, 25.0)]
        );
    }

    #[test]
    fn arrow_is_clipped_to_destination_border() {
        let (graph, _) = two_boxes();
        let geometry = ArrowEdgeRenderer::default().render(&graph);

        let head = geometry[0].arrow_head.unwrap();
        // Horizontal line enters through the left border
        assert_eq!(head[0], Vector::new(300.0, 25.0));
        // Both wings point back toward the source
        assert!(head[1].x < 300.0 && head[2].x < 300.0);
        assert!(((head[1].y - 25.0) + (head[2].y - 25.0)).abs() < 1e-9);

        let end = geometry[0].polyline[1];
        assert!(end.x < 300.0 && end.x > 250.0);
        assert!((end.y - 25.0).abs() < 1e-9);
    }

    #[test]
    fn arrow_clips_vertical_lines() {
        let (mut graph, edge) = two_boxes();
        graph[edge.destination].position = Vector::new(0.0, 200.0);

        let geometry = ArrowEdgeRenderer::default().render(&graph);
        assert_eq!(geometry[0].arrow_head.unwrap()[0], Vector::new(50.0, 200.0));
    }

    #[test]
    fn tree_elbow_top_bottom() {
        let mut graph = Graph::new();
        let edge = graph.add_edge(1, 2);
        graph.measure(&|_: &i32| Size::new(100.0, 50.0));
        graph[edge.source].position = Vector::new(100.0, 0.0);
        graph[edge.destination].position = Vector::new(0.0, 150.0);

        let geometry = TreeEdgeRenderer::new(Orientation::TopBottom, 100.0).render(&graph);
        assert_eq!(
            geometry[0].polyline,
            vec![
                Vector::new(50.0, 150.0),
                Vector::new(50.0, 100.0),
                Vector::new(150.0, 100.0),
                Vector::new(150.0, 50.0),
            ]
        );
    }

    #[test]
    fn tree_elbow_right_left_enters_parent_left_side() {
        let mut graph = Graph::new();
        let edge = graph.add_edge(1, 2);
        graph.measure(&|_: &i32| Size::new(100.0, 50.0));
        graph[edge.source].position = Vector::new(200.0, 50.0);
        graph[edge.destination].position = Vector::new(0.0, 0.0);

        let geometry = TreeEdgeRenderer::new(Orientation::RightLeft, 100.0).render(&graph);
        let polyline = &geometry[0].polyline;
        assert_eq!(polyline[0], Vector::new(100.0, 25.0));
        assert_eq!(polyline[1], Vector::new(150.0, 25.0));
        assert_eq!(polyline[3], Vector::new(200.0, 75.0));
    }

    #[test]
    fn layered_edges_follow_bend_points() {
        let (graph, edge) = two_boxes();
        let bends = HashMap::from([(
            edge,
            vec![
                Vector::new(50.0, 25.0),
                Vector::new(200.0, 300.0),
                Vector::new(350.0, 25.0),
            ],
        )]);

        let geometry = LayeredEdgeRenderer::new(&bends).render(&graph);
        let polyline = &geometry[0].polyline;
        assert_eq!(polyline.len(), 3);
        assert_eq!(polyline[0], Vector::new(50.0, 25.0));
        assert_eq!(polyline[1], Vector::new(200.0, 300.0));
        // Arrow from the last bend point lands on the bottom border
        assert!((geometry[0].arrow_head.unwrap()[0].y - 50.0).abs() < 1e-9);
    }
}
