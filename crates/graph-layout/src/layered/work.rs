use crate::{Edge, Graph, NodeId, Payload, Size};
use std::collections::HashMap;

/// Node of the working graph; dummies have no origin
#[derive(Debug, Clone)]
pub(super) struct WorkNode {
    pub(super) origin: Option<NodeId>,
    pub(super) size: Size,
    pub(super) layer: usize,
}

impl WorkNode {
    pub(super) fn is_dummy(&self) -> bool {
        self.origin.is_none()
    }
}

/// Hop of the working graph, remembering which caller edge it stands for
#[derive(Debug, Clone)]
pub(super) struct WorkEdge {
    pub(super) source: usize,
    pub(super) target: usize,
    pub(super) origin: Edge,
    /// Runs against the direction of `origin`
    pub(super) reversed: bool,
}

/// Path that replaces one caller edge once long edges are split
#[derive(Debug, Clone)]
pub(super) struct Chain {
    pub(super) origin: Edge,
    pub(super) reversed: bool,
    /// Work source, dummies, work target
    pub(super) nodes: Vec<usize>,
}

/// Private copy of the caller's graph that the phases are free to rewrite
///
/// Parallel edges are allowed: reversing one edge of a two-cycle yields two
/// hops between the same pair of nodes.
#[derive(Debug, Clone, Default)]
pub(super) struct WorkGraph {
    pub(super) nodes: Vec<WorkNode>,
    pub(super) edges: Vec<WorkEdge>,
    outgoing: Vec<Vec<usize>>,
    incoming: Vec<Vec<usize>>,
}

impl WorkGraph {
    pub(super) fn from_graph<T: Payload>(graph: &Graph<T>) -> Self {
        let mut work = Self::default();
        let mut index: HashMap<NodeId, usize> = HashMap::with_capacity(graph.node_count());
        for &id in graph.nodes() {
            index.insert(id, work.add_node(Some(id), graph[id].size));
        }
        for &edge in graph.edges() {
            if let (Some(&s), Some(&t)) = (index.get(&edge.source), index.get(&edge.destination)) {
                work.add_edge(s, t, edge, false);
            }
        }
        work
    }

    pub(super) fn add_node(&mut self, origin: Option<NodeId>, size: Size) -> usize {
        self.nodes.push(WorkNode {
            origin,
            size,
            layer: 0,
        });
        self.outgoing.push(Vec::new());
        self.incoming.push(Vec::new());
        self.nodes.len() - 1
    }

    pub(super) fn add_edge(
        &mut self,
        source: usize,
        target: usize,
        origin: Edge,
        reversed: bool,
    ) -> usize {
        let e = self.edges.len();
        self.edges.push(WorkEdge {
            source,
            target,
            origin,
            reversed,
        });
        self.outgoing[source].push(e);
        self.incoming[target].push(e);
        e
    }

    pub(super) fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub(super) fn out_edges(&self, v: usize) -> &[usize] {
        &self.outgoing[v]
    }

    pub(super) fn successors(&self, v: usize) -> impl Iterator<Item = usize> + '_ {
        self.outgoing[v].iter().map(|&e| self.edges[e].target)
    }

    pub(super) fn predecessors(&self, v: usize) -> impl Iterator<Item = usize> + '_ {
        self.incoming[v].iter().map(|&e| self.edges[e].source)
    }

    /// Turn edge `e` around in place
    pub(super) fn reverse_edge(&mut self, e: usize) {
        let WorkEdge { source, target, .. } = self.edges[e];
        self.outgoing[source].retain(|&x| x != e);
        self.incoming[target].retain(|&x| x != e);

        let edge = &mut self.edges[e];
        edge.source = target;
        edge.target = source;
        edge.reversed = !edge.reversed;
        self.outgoing[target].push(e);
        self.incoming[source].push(e);
    }

    /// Point edge `e` at a new target, keeping its source
    pub(super) fn retarget(&mut self, e: usize, target: usize) {
        let old = self.edges[e].target;
        self.incoming[old].retain(|&x| x != e);
        self.edges[e].target = target;
        self.incoming[target].push(e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn copies_graph_and_rewires_edges() {
        let mut graph = Graph::new();
        let ab = graph.add_edge('a', 'b');
        graph.add_edge('b', 'c');

        let mut work = WorkGraph::from_graph(&graph);
        assert_eq!(work.node_count(), 3);
        assert_eq!(work.successors(0).collect::<Vec<_>>(), vec![1]);

        work.reverse_edge(0);
        assert_eq!(work.successors(1).collect::<Vec<_>>(), vec![2, 0]);
        assert_eq!(work.predecessors(0).collect::<Vec<_>>(), vec![1]);
        assert!(work.edges[0].reversed);
        assert_eq!(work.edges[0].origin, ab);

        let dummy = work.add_node(None, Size::zero());
        work.retarget(1, dummy);
        assert_eq!(work.predecessors(2).count(), 0);
        assert_eq!(work.predecessors(dummy).collect::<Vec<_>>(), vec![1]);
        assert!(work.nodes[dummy].is_dummy());
    }
}
