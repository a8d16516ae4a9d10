use super::work::WorkGraph;
use tracing::trace;

/// Make the working graph acyclic by reversing its back edges
///
/// Depth-first search from every node in insertion order; an edge whose
/// target is still on the search path closes a cycle and is turned around.
/// Returns the number of reversed edges.
pub(super) fn remove_cycles(work: &mut WorkGraph) -> usize {
    let n = work.node_count();
    let mut visited = vec![false; n];
    let mut on_path = vec![false; n];
    let mut back_edges = Vec::new();

    for start in 0..n {
        if visited[start] {
            continue;
        }
        visited[start] = true;
        on_path[start] = true;
        let mut stack = vec![(start, 0)];

        while let Some((v, next)) = stack.last_mut() {
            let v = *v;
            let Some(&e) = work.out_edges(v).get(*next) else {
                on_path[v] = false;
                stack.pop();
                continue;
            };
            *next += 1;

            let target = work.edges[e].target;
            if on_path[target] {
                back_edges.push(e);
            } else if !visited[target] {
                visited[target] = true;
                on_path[target] = true;
                stack.push((target, 0));
            }
        }
    }

    for &e in &back_edges {
        trace!("Reversing back edge {:?}", work.edges[e].origin);
        work.reverse_edge(e);
    }
    back_edges.len()
}
