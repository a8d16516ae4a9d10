use crate::{Graph, NodeId, Payload, Rect, Vector};
use std::collections::HashSet;

/// Connected part of the graph, ignoring edge direction
#[derive(Debug)]
struct Cluster {
    nodes: Vec<NodeId>,
    rect: Rect,
}

impl Cluster {
    fn new<T: Payload>(graph: &Graph<T>, node: NodeId) -> Self {
        Self {
            nodes: vec![node],
            rect: graph[node].rect(),
        }
    }

    fn add<T: Payload>(&mut self, graph: &Graph<T>, node: NodeId) {
        self.nodes.push(node);
        self.rect = self.rect.union(graph[node].rect());
    }

    /// Take over the nodes of `other`, each placed right of the current box
    fn absorb<T: Payload>(&mut self, graph: &mut Graph<T>, other: Cluster, padding: f64) {
        for node in other.nodes {
            graph[node].position = Vector::new(self.rect.right + padding, self.rect.top);
            self.add(graph, node);
        }
    }

    fn offset<T: Payload>(&mut self, graph: &mut Graph<T>, delta: Vector) {
        for &node in &self.nodes {
            graph[node].position = graph[node].position + delta;
        }
        self.rect.offset(delta);
    }
}

/// Partition in first-seen order, following successors and predecessors
fn find_clusters<T: Payload>(graph: &Graph<T>) -> Vec<Cluster> {
    let mut visited = HashSet::new();
    let mut clusters = Vec::new();

    for &start in graph.nodes() {
        if !visited.insert(start) {
            continue;
        }

        let mut cluster = Cluster::new(graph, start);
        let mut stack = vec![start];
        while let Some(node) = stack.pop() {
            let neighbours: Vec<NodeId> = graph
                .successors_of(node)
                .chain(graph.predecessors_of(node))
                .collect();
            for next in neighbours {
                if visited.insert(next) {
                    cluster.add(graph, next);
                    stack.push(next);
                }
            }
        }
        clusters.push(cluster);
    }

    clusters
}

/// Lay the connected parts of the graph out left to right, tops aligned
///
/// Isolated nodes are gathered into a single row first. Returns the number of
/// clusters placed.
pub(super) fn separate_clusters<T: Payload>(graph: &mut Graph<T>, padding: f64) -> usize {
    let mut clusters: Vec<Cluster> = Vec::new();
    let mut singles: Option<usize> = None;
    for cluster in find_clusters(graph) {
        match singles {
            Some(first) if cluster.nodes.len() == 1 => {
                clusters[first].absorb(graph, cluster, padding);
            }
            None if cluster.nodes.len() == 1 => {
                singles = Some(clusters.len());
                clusters.push(cluster);
            }
            _ => clusters.push(cluster),
        }
    }

    let mut clusters = clusters.into_iter();
    let Some(mut previous) = clusters.next() else {
        return 0;
    };
    let origin = Vector::new(-previous.rect.left, -previous.rect.top);
    previous.offset(graph, origin);

    let mut count = 1;
    for mut cluster in clusters {
        let delta = Vector::new(
            previous.rect.right + padding - cluster.rect.left,
            previous.rect.top - cluster.rect.top,
        );
        cluster.offset(graph, delta);
        previous = cluster;
        count += 1;
    }
    count
}
