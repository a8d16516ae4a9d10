use graphview_layout::{
    BuchheimWalkerConfiguration, BuchheimWalkerLayout, Graph, GraphEvent, LayoutEngine, NodeId,
    Orientation, Rect, Size,
};
use proptest::prelude::*;
use std::collections::{HashMap, VecDeque};

const MAX_DEPTH: usize = 6;
const MAX_CHILDREN: usize = 8;

/// Tree grown breadth first: node `i` takes the `i`-th size and child count,
/// up to depth 6 and 8 children per node
fn random_tree() -> impl Strategy<Value = (Graph<u32>, HashMap<u32, Size>)> {
    let node = (0..=MAX_CHILDREN, 10.0..80.0f64, 10.0..60.0f64);
    prop::collection::vec(node, 1..80).prop_map(|nodes| {
        let mut graph = Graph::new();
        let sizes: HashMap<u32, Size> = nodes
            .iter()
            .enumerate()
            .map(|(i, &(_, width, height))| (i as u32, Size::new(width, height)))
            .collect();

        graph.add_node(0);
        let mut next = 1;
        let mut queue = VecDeque::from([(0u32, 0usize)]);
        while let Some((parent, depth)) = queue.pop_front() {
            if depth == MAX_DEPTH {
                continue;
            }
            for _ in 0..nodes[parent as usize].0 {
                if next == nodes.len() {
                    break;
                }
                let child = next as u32;
                graph.add_edge(parent, child);
                queue.push_back((child, depth + 1));
                next += 1;
            }
        }

        graph.measure(&sizes);
        (graph, sizes)
    })
}

/// Box around `node` and everything below it
fn subtree_rect(graph: &Graph<u32>, node: NodeId) -> Rect {
    graph
        .successors_of(node)
        .map(|child| subtree_rect(graph, child))
        .fold(graph[node].rect(), Rect::union)
}

fn orientation() -> impl Strategy<Value = Orientation> {
    prop_oneof![
        Just(Orientation::TopBottom),
        Just(Orientation::BottomTop),
        Just(Orientation::LeftRight),
        Just(Orientation::RightLeft),
    ]
}

proptest! {
    #[test]
    fn nodes_never_overlap((mut graph, _) in random_tree(), orientation in orientation()) {
        let config = BuchheimWalkerConfiguration::default()
            .with_sibling_separation(20.0)
            .with_subtree_separation(40.0)
            .with_orientation(orientation);
        let mut layout = BuchheimWalkerLayout::new(config);
        layout.run(&mut graph).unwrap();

        let rects: Vec<Rect> = graph.nodes().iter().map(|&n| graph[n].rect()).collect();
        for (i, a) in rects.iter().enumerate() {
            for b in &rects[i + 1..] {
                prop_assert!(!a.intersects(b), "{:?} overlaps {:?}", a, b);
            }
        }
    }

    #[test]
    fn sibling_subtrees_stay_apart((mut graph, _) in random_tree(), orientation in orientation()) {
        let config = BuchheimWalkerConfiguration::default()
            .with_sibling_separation(20.0)
            .with_subtree_separation(40.0)
            .with_orientation(orientation);
        BuchheimWalkerLayout::new(config).run(&mut graph).unwrap();

        // Siblings run left to right, or top to bottom when the tree grows sideways
        let span = |rect: Rect| match orientation.is_vertical() {
            true => (rect.left, rect.right),
            false => (rect.top, rect.bottom),
        };
        for &parent in graph.nodes() {
            let children: Vec<NodeId> = graph.successors_of(parent).collect();
            for pair in children.windows(2) {
                let (_, end) = span(subtree_rect(&graph, pair[0]));
                let (start, _) = span(subtree_rect(&graph, pair[1]));
                prop_assert!(
                    end + 20.0 <= start + 1e-6,
                    "subtree of {:?} ends at {} but the next starts at {}",
                    graph[pair[0]].payload(),
                    end,
                    start
                );
            }
        }
    }

    #[test]
    fn layout_is_deterministic((mut graph, _) in random_tree()) {
        let mut copy = graph.clone();
        let mut layout = BuchheimWalkerLayout::default();
        let first = layout.run(&mut graph).unwrap();
        let second = layout.run(&mut copy).unwrap();

        prop_assert_eq!(first, second);
        for &n in graph.nodes() {
            prop_assert_eq!(graph[n].position, copy[n].position);
        }
    }

    #[test]
    fn size_covers_every_node((mut graph, sizes) in random_tree()) {
        let mut layout = BuchheimWalkerLayout::default();
        let size = layout.run(&mut graph).unwrap();

        for &n in graph.nodes() {
            let node = &graph[n];
            prop_assert_eq!(node.size, sizes[node.payload()]);
            prop_assert!(node.x() >= 0.0 && node.y() >= 0.0);
            prop_assert!(node.x() + node.width() <= size.width + 1e-9);
            prop_assert!(node.y() + node.height() <= size.height + 1e-9);
        }
    }
}

#[test]
fn sample_tree_end_to_end() {
    let mut graph = Graph::new();
    let events = graph.subscribe();
    for (parent, child) in [
        (1, 2),
        (1, 3),
        (1, 4),
        (2, 5),
        (2, 6),
        (6, 7),
        (6, 8),
        (4, 9),
        (4, 10),
        (4, 11),
        (11, 12),
    ] {
        graph.add_edge(parent, child);
    }
    graph.measure(&|_: &u32| Size::new(100.0, 50.0));

    let config = BuchheimWalkerConfiguration::default().with_level_separation(300.0);
    let mut layout = BuchheimWalkerLayout::new(config);
    let size = layout.run(&mut graph).unwrap();

    let y = |p: u32| graph[graph.node_id(&p).unwrap()].y();
    assert_eq!(y(1), 0.0);
    assert_eq!([y(2), y(3), y(4)], [350.0; 3]);
    assert_eq!([y(5), y(6), y(9), y(10), y(11)], [700.0; 5]);
    assert_eq!([y(7), y(8), y(12)], [1050.0; 3]);
    assert_eq!(size.height, 1100.0);

    // Layout only moves nodes, it never edits the graph
    let received: Vec<GraphEvent> = events.try_iter().collect();
    assert_eq!(received.iter().filter(|e| matches!(e, GraphEvent::NodeAdded(_))).count(), 12);
    assert_eq!(received.iter().filter(|e| matches!(e, GraphEvent::EdgeAdded(_))).count(), 11);

    assert_eq!(layout.edge_geometry(&graph).len(), 11);
}
