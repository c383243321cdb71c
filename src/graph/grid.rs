use crate::graph::{Graph, GraphBuilder};

/// Build a `width` x `height` rook-adjacent lattice.
/// Node `(x, y)` gets index `y * width + x` and id `"x,y"`; `attributes(x, y)` supplies its series.
pub fn grid<K, I>(width: usize, height: usize, mut attributes: impl FnMut(usize, usize) -> I) -> Graph
where
    K: Into<String>,
    I: IntoIterator<Item = (K, f64)>,
{
    let mut builder = GraphBuilder::new();
    for y in 0..height {
        for x in 0..width {
            // Ids are unique by construction.
            let _ = builder.add_node(format!("{x},{y}"), attributes(x, y));
        }
    }

    for y in 0..height {
        for x in 0..width {
            let u = y * width + x;
            if x + 1 < width { builder.connect(u, u + 1) }
            if y + 1 < height { builder.connect(u, u + width) }
        }
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeId;

    #[test]
    fn grid_has_lattice_shape() {
        let graph = grid(4, 3, |x, y| [("pop", (x + y) as f64)]);

        assert_eq!(graph.node_count(), 12);
        // 3 rows of 3 horizontal edges + 2 rows of 4 vertical edges
        assert_eq!(graph.edge_count(), 17);
        assert_eq!(graph.degree(0), 2);
        assert_eq!(graph.degree(5), 4);
        assert_eq!(graph.node_index(&NodeId::from("3,2")), Some(11));
        assert_eq!(graph.node_weights().get("pop", 11), Some(5.0));
        assert!(graph.check_connected().is_ok());
    }

    #[test]
    fn single_row_grid_is_a_path() {
        let graph = grid(5, 1, |_, _| [("pop", 1.0)]);
        assert_eq!(graph.edge_count(), 4);
        assert_eq!(graph.neighbors(2).collect::<Vec<_>>(), vec![1, 3]);
    }
}
