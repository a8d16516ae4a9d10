use super::crossings::index_layers;
use super::work::WorkGraph;
use crate::Vector;
use std::collections::HashSet;
use tracing::trace;

/// Pairs of nodes whose edge may not be used to align blocks
type Conflicts = HashSet<(usize, usize)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Vertical {
    Down,
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Horizontal {
    Left,
    Right,
}

/// Assign centre coordinates to every node of the working graph
///
/// Horizontal coordinates follow Brandes and Köpf: four alignments (up or
/// down, left or right) are compacted separately and balanced. Layers become
/// rows as tall as their tallest node. The result is shifted so the leftmost
/// and topmost boxes touch zero.
pub(super) fn assign_coordinates(
    work: &WorkGraph,
    layers: &[Vec<usize>],
    node_separation: f64,
    level_separation: f64,
) -> Vec<Vector> {
    let n = work.node_count();
    if n == 0 {
        return Vec::new();
    }

    let mut positions = vec![0; n];
    index_layers(layers, &mut positions);
    let conflicts = find_type1_conflicts(work, layers, &positions);
    trace!("{} type 1 conflicts", conflicts.len());

    let mut candidates = Vec::with_capacity(4);
    for vertical in [Vertical::Down, Vertical::Up] {
        for horizontal in [Horizontal::Left, Horizontal::Right] {
            let layering = canonical_layering(layers, vertical, horizontal);
            let xs = align_and_compact(work, &layering, &conflicts, vertical, node_separation);
            let xs = match horizontal {
                Horizontal::Left => xs,
                Horizontal::Right => xs.into_iter().map(|x| -x).collect(),
            };
            candidates.push((horizontal, xs));
        }
    }

    let xs = balance(work, candidates);
    let ys = row_centers(work, layers, level_separation);

    let left = (0..n)
        .map(|v| xs[v] - work.nodes[v].size.width / 2.0)
        .fold(f64::INFINITY, f64::min);
    (0..n).map(|v| Vector::new(xs[v] - left, ys[v])).collect()
}

/// Dummy predecessor of a dummy node, the upper end of an inner segment
fn inner_segment_source(work: &WorkGraph, v: usize) -> Option<usize> {
    if !work.nodes[v].is_dummy() {
        return None;
    }
    work.predecessors(v).find(|&u| work.nodes[u].is_dummy())
}

fn conflict_key(a: usize, b: usize) -> (usize, usize) {
    (a.min(b), a.max(b))
}

/// Mark every non-inner segment that crosses an inner segment
///
/// Inner segments join two dummies and are kept straight, so the edges
/// crossing them lose their claim on alignment.
fn find_type1_conflicts(work: &WorkGraph, layers: &[Vec<usize>], positions: &[usize]) -> Conflicts {
    let mut conflicts = Conflicts::new();

    for pair in layers.windows(2) {
        let (upper, lower) = (&pair[0], &pair[1]);
        let mut k0 = 0;
        let mut scan_pos = 0;

        for (i, &v) in lower.iter().enumerate() {
            let inner = inner_segment_source(work, v);
            if inner.is_none() && i + 1 != lower.len() {
                continue;
            }
            let k1 = inner.map_or(upper.len(), |w| positions[w]);

            for &scan in &lower[scan_pos..=i] {
                for u in work.predecessors(scan) {
                    let p = positions[u];
                    let both_dummies = work.nodes[u].is_dummy() && work.nodes[scan].is_dummy();
                    if (p < k0 || p > k1) && !both_dummies {
                        conflicts.insert(conflict_key(u, scan));
                    }
                }
            }
            scan_pos = i + 1;
            k0 = k1;
        }
    }

    conflicts
}

/// Layers as seen by one of the four passes: upward passes walk the layers
/// bottom to top, rightward passes read each layer right to left
fn canonical_layering(
    layers: &[Vec<usize>],
    vertical: Vertical,
    horizontal: Horizontal,
) -> Vec<Vec<usize>> {
    let mut layering: Vec<Vec<usize>> = layers.to_vec();
    if vertical == Vertical::Up {
        layering.reverse();
    }
    if horizontal == Horizontal::Right {
        for layer in &mut layering {
            layer.reverse();
        }
    }
    layering
}

fn align_and_compact(
    work: &WorkGraph,
    layering: &[Vec<usize>],
    conflicts: &Conflicts,
    vertical: Vertical,
    node_separation: f64,
) -> Vec<f64> {
    let n = work.node_count();
    let mut positions = vec![0; n];
    index_layers(layering, &mut positions);

    let (root, align) = vertical_alignment(work, layering, &positions, conflicts, vertical);

    let mut left_of = vec![None; n];
    for layer in layering {
        for pair in layer.windows(2) {
            left_of[pair[1]] = Some(pair[0]);
        }
    }

    let mut block_width = vec![0.0f64; n];
    for v in 0..n {
        block_width[root[v]] = block_width[root[v]].max(work.nodes[v].size.width);
    }

    let mut compaction = Compaction {
        left_of,
        root: &root,
        align: &align,
        block_width,
        node_separation,
        sink: (0..n).collect(),
        x: vec![None; n],
        constraints: Vec::new(),
    };
    for v in 0..n {
        if root[v] == v {
            compaction.place_block(v);
        }
    }
    compaction.finish()
}

/// Group nodes into vertical blocks along median neighbours
///
/// Returns the block root of each node and the cyclic `align` successor
/// links within each block.
fn vertical_alignment(
    work: &WorkGraph,
    layering: &[Vec<usize>],
    positions: &[usize],
    conflicts: &Conflicts,
    vertical: Vertical,
) -> (Vec<usize>, Vec<usize>) {
    let n = work.node_count();
    let mut root: Vec<usize> = (0..n).collect();
    let mut align: Vec<usize> = (0..n).collect();

    for layer in layering {
        let mut previous: Option<usize> = None;
        for &v in layer {
            let mut neighbours: Vec<usize> = match vertical {
                Vertical::Down => work.predecessors(v).collect(),
                Vertical::Up => work.successors(v).collect(),
            };
            if neighbours.is_empty() {
                continue;
            }
            neighbours.sort_by_key(|&w| positions[w]);
            neighbours.dedup();

            let len = neighbours.len();
            for &w in &neighbours[(len - 1) / 2..=len / 2] {
                let free = previous.map_or(true, |p| p < positions[w]);
                if align[v] == v && free && !conflicts.contains(&conflict_key(v, w)) {
                    align[w] = v;
                    root[v] = root[w];
                    align[v] = root[v];
                    previous = Some(positions[w]);
                }
            }
        }
    }

    (root, align)
}

/// Horizontal compaction of the blocks of one alignment
struct Compaction<'a> {
    left_of: Vec<Option<usize>>,
    root: &'a [usize],
    align: &'a [usize],
    block_width: Vec<f64>,
    node_separation: f64,
    sink: Vec<usize>,
    /// Block coordinates relative to their class
    x: Vec<Option<f64>>,
    /// Left and right block roots of neighbours in different classes
    constraints: Vec<(usize, usize)>,
}

impl Compaction<'_> {
    fn separation(&self, u: usize, v: usize) -> f64 {
        self.node_separation + (self.block_width[u] + self.block_width[v]) / 2.0
    }

    /// Place the block rooted at `start` after every block to its left
    fn place_block(&mut self, start: usize) {
        if self.x[start].is_some() {
            return;
        }
        self.x[start] = Some(0.0);

        // Block root and the member currently being looked at
        let mut stack = vec![(start, start)];
        while let Some(&(v, w)) = stack.last() {
            if let Some(left) = self.left_of[w] {
                let u = self.root[left];
                if self.x[u].is_none() {
                    self.x[u] = Some(0.0);
                    stack.push((u, u));
                    continue;
                }

                if self.sink[v] == v {
                    self.sink[v] = self.sink[u];
                }
                if self.sink[v] == self.sink[u] {
                    let xu = self.x[u].unwrap_or(0.0);
                    let xv = self.x[v].unwrap_or(0.0);
                    self.x[v] = Some(xv.max(xu + self.separation(u, v)));
                } else {
                    self.constraints.push((u, v));
                }
            }

            let next = self.align[w];
            if next == v {
                stack.pop();
            } else if let Some(top) = stack.last_mut() {
                top.1 = next;
            }
        }
    }

    /// Shift each class as far right as its right neighbours allow
    fn class_shift(
        &self,
        class: usize,
        edges: &[Vec<(usize, f64)>],
        shift: &mut [Option<f64>],
        visiting: &mut [bool],
    ) -> f64 {
        if let Some(s) = shift[class] {
            return s;
        }
        if visiting[class] {
            return 0.0;
        }
        visiting[class] = true;

        let mut result: Option<f64> = None;
        for &(right, gap) in &edges[class] {
            let candidate = self.class_shift(right, edges, shift, visiting) + gap;
            result = Some(result.map_or(candidate, |r: f64| r.min(candidate)));
        }
        let result = result.unwrap_or(0.0);
        shift[class] = Some(result);
        result
    }

    fn finish(self) -> Vec<f64> {
        let n = self.x.len();
        let x: Vec<f64> = self.x.iter().map(|x| x.unwrap_or(0.0)).collect();

        let mut edges: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n];
        for &(u, v) in &self.constraints {
            let gap = x[v] - x[u] - self.separation(u, v);
            edges[self.sink[u]].push((self.sink[v], gap));
        }

        let mut shift = vec![None; n];
        let mut visiting = vec![false; n];
        (0..n)
            .map(|v| {
                let r = self.root[v];
                x[r] + self.class_shift(self.sink[r], &edges, &mut shift, &mut visiting)
            })
            .collect()
    }
}

/// Combine the four candidate coordinates
///
/// All candidates are aligned to the narrowest one, by left edge for the
/// leftward passes and by right edge for the rightward ones. Each node then
/// takes the mean of its two middle candidates.
fn balance(work: &WorkGraph, candidates: Vec<(Horizontal, Vec<f64>)>) -> Vec<f64> {
    let n = work.node_count();
    let extents: Vec<(f64, f64)> = candidates
        .iter()
        .map(|(_, xs)| {
            (0..n).fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), v| {
                let half = work.nodes[v].size.width / 2.0;
                (min.min(xs[v] - half), max.max(xs[v] + half))
            })
        })
        .collect();

    let mut narrowest = 0;
    for (i, &(min, max)) in extents.iter().enumerate() {
        let (ref_min, ref_max) = extents[narrowest];
        if max - min < ref_max - ref_min {
            narrowest = i;
        }
    }
    let (ref_min, ref_max) = extents[narrowest];

    let aligned: Vec<Vec<f64>> = candidates
        .into_iter()
        .zip(&extents)
        .map(|((horizontal, xs), &(min, max))| {
            let delta = match horizontal {
                Horizontal::Left => ref_min - min,
                Horizontal::Right => ref_max - max,
            };
            xs.into_iter().map(|x| x + delta).collect()
        })
        .collect();

    (0..n)
        .map(|v| {
            let mut values: Vec<f64> = aligned.iter().map(|xs| xs[v]).collect();
            values.sort_by(f64::total_cmp);
            (values[1] + values[2]) / 2.0
        })
        .collect()
}

/// Vertical centre of each node: rows are as tall as their tallest node and
/// `level_separation` apart
fn row_centers(work: &WorkGraph, layers: &[Vec<usize>], level_separation: f64) -> Vec<f64> {
    let heights: Vec<f64> = layers
        .iter()
        .map(|layer| {
            layer
                .iter()
                .map(|&v| work.nodes[v].size.height)
                .fold(0.0, f64::max)
        })
        .collect();

    let mut ys = vec![0.0; work.node_count()];
    let mut center = 0.0;
    for (i, layer) in layers.iter().enumerate() {
        center += match i {
            0 => heights[0] / 2.0,
            _ => level_separation + (heights[i - 1] + heights[i]) / 2.0,
        };
        for &v in layer {
            ys[v] = center;
        }
    }
    ys
}
