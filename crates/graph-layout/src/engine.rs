use crate::render::{EdgeGeometry, EdgeRenderer};
use crate::{Graph, LayoutError, Payload, Size, Vector};

/// A layout engine that computes positions for graph nodes
///
/// Engines write each node's `position` in place and keep whatever auxiliary
/// geometry they need (bend points, the overall size) until the next run. One
/// instance may be reused for any number of sequential runs.
pub trait LayoutEngine<T: Payload> {
    /// Compute node positions for the given graph
    ///
    /// Returns the bounding size of the result, which is also retained for
    /// [`graph_size`](Self::graph_size). An empty graph lays out to
    /// [`Size::zero`].
    ///
    /// # Errors
    /// Returns an error if the graph violates a precondition of the layout
    /// (e.g. a self-loop, or a non-tree given to the tree layout)
    fn run(&mut self, graph: &mut Graph<T>) -> Result<Size, LayoutError>;

    /// Bounding size computed by the last run
    fn graph_size(&self) -> Size;

    /// Stroke geometry for every edge of the last laid-out graph
    fn edge_geometry(&self, graph: &Graph<T>) -> Vec<EdgeGeometry>;

    /// Replace the edge renderer used by [`edge_geometry`](Self::edge_geometry)
    ///
    /// # Errors
    /// Layouts that compute their own edge routes reject this with
    /// [`LayoutError::UnsupportedOperation`]
    fn set_edge_renderer(&mut self, renderer: Box<dyn EdgeRenderer<T>>) -> Result<(), LayoutError>;

    /// Shift any auxiliary geometry kept by the engine
    fn translate(&mut self, _shift: Vector) {}

    /// Run, then move the whole result by `shift`
    fn run_shifted(&mut self, graph: &mut Graph<T>, shift: Vector) -> Result<Size, LayoutError> {
        let size = self.run(graph)?;
        graph.translate(shift);
        self.translate(shift);
        Ok(size)
    }
}
