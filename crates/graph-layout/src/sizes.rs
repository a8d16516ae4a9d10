use crate::Size;
use std::collections::HashMap;
use std::hash::Hash;

/// Trait for providing node sizes before a layout runs
///
/// The caller measures its node views and hands the result to
/// [`Graph::measure`](crate::Graph::measure).
pub trait NodeSizes<T> {
    /// Get the size of the node carrying `payload`
    fn size(&self, payload: &T) -> Size;
}

// Blanket implementation for closures
impl<T, F> NodeSizes<T> for F
where
    F: Fn(&T) -> Size,
{
    fn size(&self, payload: &T) -> Size {
        self(payload)
    }
}

// Implementation for HashMap
impl<T: Eq + Hash> NodeSizes<T> for HashMap<T, Size> {
    fn size(&self, payload: &T) -> Size {
        self.get(payload).copied().unwrap_or(Size::zero())
    }
}
