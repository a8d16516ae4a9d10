use super::work::{Chain, WorkGraph};
use crate::Size;
use tracing::trace;

/// Assign layers by repeatedly peeling off the nodes without incoming edges
///
/// Each node lands one layer below its deepest predecessor (longest path from
/// the sources). Within a layer, nodes keep their insertion order. The
/// working graph must be acyclic; nodes left on a cycle are not layered.
pub(super) fn assign_layers(work: &mut WorkGraph) -> Vec<Vec<usize>> {
    let n = work.node_count();
    let mut in_degree: Vec<usize> = (0..n).map(|v| work.predecessors(v).count()).collect();
    let mut layers: Vec<Vec<usize>> = Vec::new();
    let mut current: Vec<usize> = (0..n).filter(|&v| in_degree[v] == 0).collect();

    while !current.is_empty() {
        let mut next = Vec::new();
        for &v in &current {
            work.nodes[v].layer = layers.len();
            for target in work.successors(v).collect::<Vec<_>>() {
                in_degree[target] -= 1;
                if in_degree[target] == 0 {
                    next.push(target);
                }
            }
        }
        next.sort_unstable();
        layers.push(std::mem::replace(&mut current, next));
    }

    layers
}

/// Split every edge spanning several layers into unit hops through dummies
///
/// Dummies are as wide as the hop's source and have no height. Returns one
/// chain per caller edge, in the order of the working edges.
pub(super) fn split_long_edges(work: &mut WorkGraph, layers: &mut [Vec<usize>]) -> Vec<Chain> {
    let original_edges = work.edges.len();
    let mut chains = Vec::with_capacity(original_edges);

    for e in 0..original_edges {
        let edge = work.edges[e].clone();
        let (from, to) = (work.nodes[edge.source].layer, work.nodes[edge.target].layer);
        let mut nodes = vec![edge.source];

        if to > from + 1 {
            let width = work.nodes[edge.source].size.width;
            let mut previous = edge.source;
            for layer in from + 1..to {
                let dummy = work.add_node(None, Size::new(width, 0.0));
                work.nodes[dummy].layer = layer;
                layers[layer].push(dummy);

                if previous == edge.source {
                    work.retarget(e, dummy);
                } else {
                    work.add_edge(previous, dummy, edge.origin, edge.reversed);
                }
                nodes.push(dummy);
                previous = dummy;
            }
            work.add_edge(previous, edge.target, edge.origin, edge.reversed);
            trace!("Split {:?} with {} dummies", edge.origin, to - from - 1);
        }

        nodes.push(edge.target);
        chains.push(Chain {
            origin: edge.origin,
            reversed: edge.reversed,
            nodes,
        });
    }

    chains
}

#[cfg(test)]
mod tests {
    use super::super::cycles::remove_cycles;
    use super::*;
    use crate::Graph;
    use test_log::test;

    #[test]
    fn layers_follow_longest_path() {
        let mut graph = Graph::new();
        graph.add_edge('a', 'b');
        graph.add_edge('b', 'c');
        graph.add_edge('a', 'c');
        graph.add_edge('d', 'c');

        let mut work = WorkGraph::from_graph(&graph);
        let layers = assign_layers(&mut work);

        // Working indices: a 0, b 1, c 2, d 3
        assert_eq!(layers, vec![vec![0, 3], vec![1], vec![2]]);
    }

    #[test]
    fn long_edges_become_chains() {
        let mut graph = Graph::new();
        graph.add_edge('a', 'b');
        graph.add_edge('b', 'c');
        graph.add_edge('c', 'd');
        let ad = graph.add_edge('a', 'd');
        graph.measure(&|_: &char| Size::new(40.0, 20.0));

        let mut work = WorkGraph::from_graph(&graph);
        let mut layers = assign_layers(&mut work);
        let chains = split_long_edges(&mut work, &mut layers);

        assert_eq!(work.node_count(), 6);
        assert_eq!(layers[1], vec![1, 4]);
        assert_eq!(layers[2], vec![2, 5]);

        let chain = chains.iter().find(|c| c.origin == ad).unwrap();
        assert_eq!(chain.nodes, vec![0, 4, 5, 3]);
        assert_eq!(work.nodes[4].size, Size::new(40.0, 0.0));

        // Every hop now spans exactly one layer
        for edge in &work.edges {
            assert_eq!(work.nodes[edge.target].layer, work.nodes[edge.source].layer + 1);
        }
    }

    #[test]
    fn reversed_edges_keep_their_flag_along_the_chain() {
        let mut graph = Graph::new();
        graph.add_edge(1, 2);
        graph.add_edge(2, 3);
        let back = graph.add_edge(3, 1);

        let mut work = WorkGraph::from_graph(&graph);
        remove_cycles(&mut work);
        let mut layers = assign_layers(&mut work);
        let chains = split_long_edges(&mut work, &mut layers);

        let chain = chains.iter().find(|c| c.origin == back).unwrap();
        assert!(chain.reversed);
        assert_eq!(chain.nodes.len(), 3);
        assert!(work
            .edges
            .iter()
            .filter(|e| e.origin == back)
            .all(|e| e.reversed));
    }
}
