use super::work::Chain;
use crate::{Edge, Vector};
use std::collections::HashMap;

/// Turn each dummy chain back into bend points on the caller's edge
///
/// Every edge gets an entry; edges spanning a single layer get an empty
/// route. Routes of reversed edges are flipped so they run from the edge's
/// source to its destination.
pub(super) fn denormalize(chains: &[Chain], centers: &[Vector]) -> HashMap<Edge, Vec<Vector>> {
    chains
        .iter()
        .map(|chain| {
            let mut points: Vec<Vector> = if chain.nodes.len() > 2 {
                chain.nodes.iter().map(|&v| centers[v]).collect()
            } else {
                Vec::new()
            };
            if chain.reversed {
                points.reverse();
            }
            (chain.origin, points)
        })
        .collect()
}
