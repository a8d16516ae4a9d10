use super::BuchheimWalkerConfiguration;
use crate::{Graph, LayoutError, NodeId, Payload};
use std::collections::HashMap;
use tracing::{trace, warn};

/// Per-node state of the walks, indexed by arena position
#[derive(Debug, Clone)]
pub(super) struct TreeNode {
    pub(super) id: NodeId,
    pub(super) depth: usize,
    parent: Option<usize>,
    children: Vec<usize>,
    /// Index among the siblings
    number: usize,
    /// Extent across the levels
    breadth: f64,
    prelim: f64,
    modifier: f64,
    shift: f64,
    change: f64,
    thread: Option<usize>,
    ancestor: usize,
    default_ancestor: usize,
    /// Subtree extent across the levels, relative to the node's own coordinate
    low: f64,
    high: f64,
}

/// Arena holding the tree being laid out, root at index 0
pub(super) struct Walker {
    pub(super) nodes: Vec<TreeNode>,
    sibling_separation: f64,
    subtree_separation: f64,
}

impl Walker {
    /// Check that `graph` is a rooted tree and copy its shape into an arena
    pub(super) fn build<T: Payload>(
        graph: &Graph<T>,
        config: &BuchheimWalkerConfiguration,
    ) -> Result<Self, LayoutError> {
        if let Some(node) = graph.find_self_loop() {
            warn!("Tree layout rejected self-loop at {node:?}");
            return Err(LayoutError::SelfLoop(node));
        }

        let root = graph.node_at(0)?;
        for &node in graph.nodes() {
            let parents = graph.predecessors_of(node).count();
            let reason = match (node == root, parents) {
                (true, 0) | (false, 1) => continue,
                (true, _) => "the root has a parent",
                (false, 0) => "node has no parent",
                (false, _) => "node has several parents",
            };
            warn!("Tree layout rejected {node:?}: {reason}");
            return Err(LayoutError::NotATree { node, reason });
        }

        let mut nodes: Vec<TreeNode> = Vec::with_capacity(graph.node_count());
        let mut arena: HashMap<NodeId, usize> = HashMap::with_capacity(graph.node_count());
        let mut stack = vec![(root, None, 0)];

        // Pre-order, children in edge order
        while let Some((id, parent, number)) = stack.pop() {
            let index = nodes.len();
            let depth = parent.map_or(0, |p: usize| nodes[p].depth + 1);
            if depth > config.max_depth {
                return Err(LayoutError::TooDeep {
                    depth,
                    limit: config.max_depth,
                });
            }

            nodes.push(TreeNode {
                id,
                depth,
                parent,
                children: Vec::new(),
                number,
                breadth: config.orientation.breadth(graph[id].size),
                prelim: 0.0,
                modifier: 0.0,
                shift: 0.0,
                change: 0.0,
                thread: None,
                ancestor: index,
                default_ancestor: index,
                low: 0.0,
                high: 0.0,
            });
            arena.insert(id, index);
            if let Some(p) = parent {
                nodes[p].children.push(index);
            }

            let children: Vec<NodeId> = graph.successors_of(id).collect();
            for (number, child) in children.into_iter().enumerate().rev() {
                stack.push((child, Some(index), number));
            }
        }

        // Every node has one parent, so anything not reached hangs off a cycle
        if let Some(&node) = graph.nodes().iter().find(|id| !arena.contains_key(id)) {
            let reason = "node is not reachable from the root";
            warn!("Tree layout rejected {node:?}: {reason}");
            return Err(LayoutError::NotATree { node, reason });
        }

        Ok(Self {
            nodes,
            sibling_separation: config.sibling_separation,
            subtree_separation: config.subtree_separation,
        })
    }

    pub(super) fn depth(&self) -> usize {
        self.nodes.iter().map(|n| n.depth).max().unwrap_or(0)
    }

    fn left_sibling(&self, v: usize) -> Option<usize> {
        let node = &self.nodes[v];
        let parent = node.parent?;
        node.number
            .checked_sub(1)
            .map(|left| self.nodes[parent].children[left])
    }

    fn next_left(&self, v: usize) -> Option<usize> {
        let node = &self.nodes[v];
        node.children.first().copied().or(node.thread)
    }

    fn next_right(&self, v: usize) -> Option<usize> {
        let node = &self.nodes[v];
        node.children.last().copied().or(node.thread)
    }

    /// Minimal distance between the left corners of `left` and of a node
    /// to its right at the same level
    fn spacing(&self, left: usize, right: usize) -> f64 {
        let separation = if self.nodes[left].parent == self.nodes[right].parent {
            self.sibling_separation
        } else {
            self.subtree_separation
        };
        separation + self.nodes[left].breadth
    }

    /// Post-order pass computing preliminary coordinates and modifiers
    pub(super) fn first_walk(&mut self) {
        let mut stack = vec![(0, false)];
        while let Some((v, expanded)) = stack.pop() {
            if expanded {
                self.finish(v);
                continue;
            }

            stack.push((v, true));
            stack.extend(self.nodes[v].children.iter().rev().map(|&c| (c, false)));
        }
    }

    /// Place `v` once all its children are placed, then fit its subtree
    /// against its left siblings
    fn finish(&mut self, v: usize) {
        let left = self.left_sibling(v);
        let beside_left = left.map(|w| self.nodes[w].prelim + self.spacing(w, v));

        let children = &self.nodes[v].children;
        if let (Some(&first), Some(&last)) = (children.first(), children.last()) {
            self.execute_shifts(v);

            let midpoint = 0.5
                * (self.nodes[first].prelim + self.nodes[last].prelim + self.nodes[last].breadth
                    - self.nodes[v].breadth);
            let node = &mut self.nodes[v];
            match beside_left {
                Some(prelim) => {
                    node.prelim = prelim;
                    node.modifier = prelim - midpoint;
                }
                None => node.prelim = midpoint,
            }
        } else {
            self.nodes[v].prelim = beside_left.unwrap_or(0.0);
        }
        self.measure_subtree(v);

        if let Some(parent) = self.nodes[v].parent {
            let ancestor = self.apportion(v, self.nodes[parent].default_ancestor);
            self.nodes[parent].default_ancestor = ancestor;
        }
    }

    /// Extent of the subtree of `v` once its children are final relative to it
    fn measure_subtree(&mut self, v: usize) {
        let node = &self.nodes[v];
        let offset = node.modifier - node.prelim;
        let (low, high) = node
            .children
            .iter()
            .map(|&c| &self.nodes[c])
            .fold((0.0_f64, node.breadth), |(low, high), child| {
                let at = child.prelim + offset;
                (low.min(at + child.low), high.max(at + child.high))
            });

        let node = &mut self.nodes[v];
        node.low = low;
        node.high = high;
    }

    /// Push the subtree of `v` right until it clears the subtree of its left
    /// sibling and its left contour clears the right contour of the subtrees
    /// to its left
    ///
    /// Returns the default ancestor for the next sibling; the first child is
    /// its own.
    fn apportion(&mut self, v: usize, default_ancestor: usize) -> usize {
        let Some(left) = self.left_sibling(v) else {
            return v;
        };
        let Some(parent) = self.nodes[v].parent else {
            return default_ancestor;
        };

        // Sibling subtrees never share a stretch of the separation axis
        let reach = self.nodes[left].prelim + self.nodes[left].high + self.sibling_separation;
        let shift = reach - (self.nodes[v].prelim + self.nodes[v].low);
        if shift > 0.0 {
            self.move_subtree(left, v, shift);
        }

        let mut ancestor = default_ancestor;
        let (mut vip, mut vop) = (v, v);
        let mut vim = left;
        let mut vom = self.nodes[parent].children[0];

        let mut sip = self.nodes[vip].modifier;
        let mut sop = self.nodes[vop].modifier;
        let mut sim = self.nodes[vim].modifier;
        let mut som = self.nodes[vom].modifier;

        while let (Some(right_contour), Some(left_contour)) =
            (self.next_right(vim), self.next_left(vip))
        {
            let (Some(outer_left), Some(outer_right)) =
                (self.next_left(vom), self.next_right(vop))
            else {
                break;
            };
            vim = right_contour;
            vip = left_contour;
            vom = outer_left;
            vop = outer_right;

            self.nodes[vop].ancestor = v;

            let shift = self.nodes[vim].prelim + sim - (self.nodes[vip].prelim + sip)
                + self.spacing(vim, v);
            if shift > 0.0 {
                let from = self.ancestor_of(vim, v, ancestor);
                self.move_subtree(from, v, shift);
                sip += shift;
                sop += shift;
            }

            sim += self.nodes[vim].modifier;
            sip += self.nodes[vip].modifier;
            som += self.nodes[vom].modifier;
            sop += self.nodes[vop].modifier;
        }

        if let Some(next) = self.next_right(vim) {
            if self.next_right(vop).is_none() {
                self.nodes[vop].thread = Some(next);
                self.nodes[vop].modifier += sim - sop;
            }
        }

        if let Some(next) = self.next_left(vip) {
            if self.next_left(vom).is_none() {
                self.nodes[vom].thread = Some(next);
                self.nodes[vom].modifier += sip - som;
                ancestor = v;
            }
        }

        ancestor
    }

    /// Sibling of `v` whose subtree contains `vim`, or the default ancestor
    fn ancestor_of(&self, vim: usize, v: usize, default_ancestor: usize) -> usize {
        let candidate = self.nodes[vim].ancestor;
        if self.nodes[candidate].parent == self.nodes[v].parent {
            candidate
        } else {
            default_ancestor
        }
    }

    fn move_subtree(&mut self, wm: usize, wp: usize, shift: f64) {
        let subtrees = self.nodes[wp]
            .number
            .saturating_sub(self.nodes[wm].number)
            .max(1) as f64;
        trace!("Moving subtree {wp} by {shift} over {subtrees} subtrees");

        self.nodes[wm].change += shift / subtrees;
        let wp = &mut self.nodes[wp];
        wp.change -= shift / subtrees;
        wp.shift += shift;
        wp.prelim += shift;
        wp.modifier += shift;
    }

    /// Spread the moves recorded by `move_subtree` over the children of `v`
    fn execute_shifts(&mut self, v: usize) {
        let mut shift = 0.0;
        let mut change = 0.0;
        for i in (0..self.nodes[v].children.len()).rev() {
            let child = self.nodes[v].children[i];
            let w = &mut self.nodes[child];
            w.prelim += shift;
            w.modifier += shift;
            change += w.change;
            shift += w.shift + change;
        }
    }

    /// Pre-order pass summing modifiers into final coordinates across the
    /// levels, indexed like the arena
    pub(super) fn second_walk(&self) -> Vec<f64> {
        let mut coordinates = vec![0.0; self.nodes.len()];
        let mut stack = vec![(0, 0.0)];
        while let Some((v, modifier)) = stack.pop() {
            let node = &self.nodes[v];
            coordinates[v] = node.prelim + modifier;
            stack.extend(node.children.iter().map(|&c| (c, modifier + node.modifier)));
        }
        coordinates
    }
}
