use super::work::WorkGraph;
use std::cmp::Ordering;
use tracing::trace;

/// Reorder the layers to reduce edge crossings
///
/// Each round sorts the layers by the median position of their neighbours
/// (downward against predecessors on even rounds, upward against successors
/// on odd rounds), then swaps adjacent nodes while that helps. The best
/// ordering seen is returned along with its crossing count.
pub(super) fn minimize_crossings(
    work: &WorkGraph,
    layers: Vec<Vec<usize>>,
    max_iterations: usize,
) -> (Vec<Vec<usize>>, usize) {
    let mut positions = vec![0; work.node_count()];
    index_layers(&layers, &mut positions);

    let mut best_crossings = count_crossings(work, &layers, &positions);
    let mut best = layers.clone();
    let mut current = layers;

    for iteration in 0..max_iterations {
        if best_crossings == 0 {
            break;
        }

        median_sweep(work, &mut current, &mut positions, iteration % 2 == 0);
        transpose(work, &mut current, &mut positions);

        let crossings = count_crossings(work, &current, &positions);
        trace!("Crossing round {iteration}: {crossings} crossings");
        if crossings < best_crossings {
            best_crossings = crossings;
            best = current.clone();
        }
    }

    (best, best_crossings)
}

/// Record the position of every node within its layer
pub(super) fn index_layers(layers: &[Vec<usize>], positions: &mut [usize]) {
    for layer in layers {
        for (i, &v) in layer.iter().enumerate() {
            positions[v] = i;
        }
    }
}

/// Median of sorted neighbour positions, `None` without neighbours
///
/// A lone neighbour gives -1, which sorts the node ahead of every other
/// movable node. With an even count above two the median leans toward the
/// side where the neighbours are packed more tightly.
fn median_value(sorted: &[usize]) -> Option<f64> {
    let n = sorted.len();
    let m = n / 2;
    match n {
        0 => None,
        1 => Some(-1.0),
        _ if n % 2 == 1 => Some(sorted[m] as f64),
        2 => Some((sorted[0] + sorted[1]) as f64 / 2.0),
        _ => {
            let left = (sorted[m - 1] - sorted[0]) as f64;
            let right = (sorted[n - 1] - sorted[m]) as f64;
            if left + right == 0.0 {
                Some((sorted[m - 1] + sorted[m]) as f64 / 2.0)
            } else {
                Some((sorted[m - 1] as f64 * right + sorted[m] as f64 * left) / (left + right))
            }
        }
    }
}

fn median_sweep(
    work: &WorkGraph,
    layers: &mut [Vec<usize>],
    positions: &mut [usize],
    downward: bool,
) {
    let order: Vec<usize> = if downward {
        (1..layers.len()).collect()
    } else {
        (0..layers.len().saturating_sub(1)).rev().collect()
    };

    for l in order {
        let medians: Vec<Option<f64>> = layers[l]
            .iter()
            .map(|&v| {
                let mut neighbours: Vec<usize> = if downward {
                    work.predecessors(v).map(|u| positions[u]).collect()
                } else {
                    work.successors(v).map(|u| positions[u]).collect()
                };
                neighbours.sort_unstable();
                median_value(&neighbours)
            })
            .collect();

        // Nodes without neighbours keep their slot, the others are sorted
        // into the remaining slots
        let mut movable: Vec<(f64, usize)> = layers[l]
            .iter()
            .zip(&medians)
            .filter_map(|(&v, median)| median.map(|m| (m, v)))
            .collect();
        movable.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));

        let mut movable = movable.into_iter().map(|(_, v)| v);
        for (slot, median) in medians.iter().enumerate() {
            if median.is_some() {
                if let Some(v) = movable.next() {
                    layers[l][slot] = v;
                }
            }
        }
        for (i, &v) in layers[l].iter().enumerate() {
            positions[v] = i;
        }
    }
}

/// Crossings between the edges of `v` and `w` when `v` is left of `w`,
/// counted against both neighbouring layers
fn pair_crossings(work: &WorkGraph, positions: &[usize], v: usize, w: usize) -> usize {
    let count = |a: Vec<usize>, b: Vec<usize>| -> usize {
        a.iter()
            .map(|&pa| b.iter().filter(|&&pb| pa > pb).count())
            .sum()
    };

    let above = count(
        work.predecessors(v).map(|u| positions[u]).collect(),
        work.predecessors(w).map(|u| positions[u]).collect(),
    );
    let below = count(
        work.successors(v).map(|u| positions[u]).collect(),
        work.successors(w).map(|u| positions[u]).collect(),
    );
    above + below
}

/// Swap adjacent nodes while that strictly reduces crossings
fn transpose(work: &WorkGraph, layers: &mut [Vec<usize>], positions: &mut [usize]) {
    let mut improved = true;
    while improved {
        improved = false;
        for layer in layers.iter_mut() {
            for i in 0..layer.len().saturating_sub(1) {
                let (v, w) = (layer[i], layer[i + 1]);
                if pair_crossings(work, positions, w, v) < pair_crossings(work, positions, v, w) {
                    layer.swap(i, i + 1);
                    positions[v] = i + 1;
                    positions[w] = i;
                    improved = true;
                }
            }
        }
    }
}

/// Count the number of edge crossings between consecutive layers
pub(super) fn count_crossings(
    work: &WorkGraph,
    layers: &[Vec<usize>],
    positions: &[usize],
) -> usize {
    let mut crossings = 0;

    for upper_layer in layers.iter().take(layers.len().saturating_sub(1)) {
        for (idx1, &node1) in upper_layer.iter().enumerate() {
            for &node2 in upper_layer.iter().skip(idx1 + 1) {
                for target1 in work.successors(node1) {
                    for target2 in work.successors(node2) {
                        if positions[target1] > positions[target2] {
                            crossings += 1;
                        }
                    }
                }
            }
        }
    }

    crossings
}

#[cfg(test)]
mod tests {
    use super::super::layers::{assign_layers, split_long_edges};
    use super::*;
    use crate::Graph;
    use test_log::test;

    fn prepare(edges: &[(u32, u32)]) -> (WorkGraph, Vec<Vec<usize>>) {
        let mut graph = Graph::new();
        let mut payloads: Vec<u32> = edges.iter().flat_map(|&(s, d)| [s, d]).collect();
        payloads.sort_unstable();
        graph.add_nodes(payloads);
        for &(s, d) in edges {
            graph.add_edge(s, d);
        }
        let mut work = WorkGraph::from_graph(&graph);
        let mut layers = assign_layers(&mut work);
        split_long_edges(&mut work, &mut layers);
        (work, layers)
    }

    #[test]
    fn median_rules() {
        assert_eq!(median_value(&[]), None);
        assert_eq!(median_value(&[4]), Some(-1.0));
        assert_eq!(median_value(&[1, 2, 7]), Some(2.0));
        assert_eq!(median_value(&[1, 4]), Some(2.5));
        // Left pair spans 1, right pair spans 5: lean toward the left median
        assert_eq!(median_value(&[0, 1, 3, 8]), Some((1.0 * 5.0 + 3.0 * 1.0) / 6.0));
        assert_eq!(median_value(&[2, 2, 2, 2]), Some(2.0));
    }

    #[test]
    fn lone_neighbour_sorts_first() {
        // 3 hangs below 1 and 2, 4 only below 1
        let (work, mut layers) = prepare(&[(1, 3), (2, 3), (1, 4)]);
        let mut positions = vec![0; work.node_count()];
        index_layers(&layers, &mut positions);
        assert_eq!(layers[1], vec![2, 3]);

        median_sweep(&work, &mut layers, &mut positions, true);
        assert_eq!(layers[1], vec![3, 2]);
        assert_eq!((positions[3], positions[2]), (0, 1));
    }

    #[test]
    fn counts_crossing_pairs() {
        // 1 -> 4 and 2 -> 3 cross once with layers [1, 2] / [3, 4]
        let (work, layers) = prepare(&[(1, 4), (2, 3)]);
        let mut positions = vec![0; work.node_count()];
        index_layers(&layers, &mut positions);
        assert_eq!(layers, vec![vec![0, 1], vec![2, 3]]);
        assert_eq!(count_crossings(&work, &layers, &positions), 1);
    }

    #[test]
    fn untangles_a_simple_crossing() {
        let (work, layers) = prepare(&[(1, 4), (2, 3)]);
        let (layers, crossings) = minimize_crossings(&work, layers, 24);
        assert_eq!(crossings, 0);

        let mut positions = vec![0; work.node_count()];
        index_layers(&layers, &mut positions);
        assert_eq!(count_crossings(&work, &layers, &positions), 0);
    }

    #[test]
    fn never_worse_than_the_input_order() {
        let edges = [(1, 5), (1, 6), (2, 4), (3, 4), (3, 6), (2, 5), (4, 7), (6, 7), (5, 8)];
        let (work, layers) = prepare(&edges);
        let mut positions = vec![0; work.node_count()];
        index_layers(&layers, &mut positions);
        let before = count_crossings(&work, &layers, &positions);

        let (layers, crossings) = minimize_crossings(&work, layers, 24);
        assert!(crossings <= before);

        // Same nodes, only reordered
        let mut all: Vec<usize> = layers.concat();
        all.sort_unstable();
        assert_eq!(all, (0..work.node_count()).collect::<Vec<_>>());
    }
}
