use super::walker::Walker;
use super::{BuchheimWalkerConfiguration, Orientation};
use crate::{Graph, Payload, Vector};

/// Write final positions from the walk coordinates
///
/// Levels are `minimal length + level separation` apart; a level holding
/// longer nodes pushes every later level further by the excess. The abstract
/// (breadth, depth) frame is then mapped to screen axes.
pub(super) fn place<T: Payload>(
    graph: &mut Graph<T>,
    walker: &Walker,
    breadth: &[f64],
    config: &BuchheimWalkerConfiguration,
) {
    let orientation = config.orientation;
    let lengths: Vec<f64> = walker
        .nodes
        .iter()
        .map(|n| orientation.length(graph[n.id].size))
        .collect();
    let min_length = lengths.iter().copied().fold(f64::INFINITY, f64::min);

    let levels = walker.depth() + 1;
    let mut excess = vec![0.0_f64; levels];
    for (node, &length) in walker.nodes.iter().zip(&lengths) {
        excess[node.depth] = excess[node.depth].max(length - min_length);
    }
    let mut padding = vec![0.0; levels];
    for depth in 1..levels {
        padding[depth] = padding[depth - 1] + excess[depth - 1];
    }

    let min_breadth = breadth.iter().copied().fold(f64::INFINITY, f64::min);
    let across =
        |depth: usize| depth as f64 * (min_length + config.level_separation) + padding[depth];
    let extent = walker
        .nodes
        .iter()
        .zip(&lengths)
        .map(|(n, length)| across(n.depth) + length)
        .fold(0.0, f64::max);

    for ((node, &u), &length) in walker.nodes.iter().zip(breadth).zip(&lengths) {
        let u = u - min_breadth;
        let v = across(node.depth);
        let position = match orientation {
            Orientation::TopBottom => Vector::new(u, v),
            Orientation::BottomTop => Vector::new(u, extent - v - length),
            Orientation::LeftRight => Vector::new(v, u),
            Orientation::RightLeft => Vector::new(extent - v - length, u),
        };
        graph[node.id].position = position;
    }
}
