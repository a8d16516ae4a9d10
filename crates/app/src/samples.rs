use graphview_layout::Graph;

/// Twelve nodes over four levels
pub fn tree() -> Graph<u32> {
    let mut graph = Graph::new();
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
    graph
}

/// Small cyclic graph with a dangling chain
pub fn force() -> Graph<char> {
    let mut graph = Graph::new();
    for (s, d) in [
        ('a', 'b'),
        ('a', 'c'),
        ('a', 'd'),
        ('c', 'e'),
        ('d', 'f'),
        ('f', 'c'),
        ('g', 'c'),
        ('h', 'g'),
    ] {
        graph.add_edge(s, d);
    }
    graph
}

/// Directed graph of 23 nodes with long and converging edges
pub fn layered() -> Graph<u32> {
    let mut graph = Graph::new();
    graph.add_nodes(1..=23);
    for (s, d) in [
        (1, 13),
        (1, 21),
        (1, 4),
        (1, 3),
        (2, 3),
        (2, 20),
        (3, 4),
        (3, 5),
        (3, 23),
        (4, 6),
        (5, 7),
        (6, 8),
        (6, 16),
        (6, 23),
        (7, 9),
        (8, 10),
        (8, 11),
        (9, 12),
        (10, 13),
        (10, 14),
        (10, 15),
        (11, 15),
        (11, 16),
        (12, 20),
        (13, 17),
        (14, 17),
        (14, 18),
        (16, 18),
        (16, 19),
        (16, 20),
        (18, 21),
        (19, 22),
        (21, 23),
        (22, 23),
    ] {
        graph.add_edge(s, d);
    }
    graph
}
