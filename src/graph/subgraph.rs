use std::collections::VecDeque;

/// Compact view of an induced subgraph over local indices `0..node_count()`.
/// `global(i)` maps a local index back into the parent graph.
#[derive(Debug, Clone)]
pub struct Subgraph {
    nodes: Vec<usize>,
    offsets: Vec<u32>,
    edges: Vec<u32>,
}

impl Subgraph {
    pub(crate) fn new(nodes: Vec<usize>, offsets: Vec<u32>, edges: Vec<u32>) -> Self {
        debug_assert!(offsets.len() == nodes.len() + 1, "offsets.len() must equal nodes.len() + 1");
        Self { nodes, offsets, edges }
    }

    #[inline] pub fn node_count(&self) -> usize { self.nodes.len() }

    /// Number of undirected edges.
    #[inline] pub fn edge_count(&self) -> usize { self.edges.len() / 2 }

    /// Parent-graph index of a local node.
    #[inline] pub fn global(&self, local: usize) -> usize { self.nodes[local] }

    /// Parent-graph indices of all nodes, in local order.
    #[inline] pub fn nodes(&self) -> &[usize] { &self.nodes }

    #[inline]
    fn range(&self, local: usize) -> std::ops::Range<usize> {
        self.offsets[local] as usize .. self.offsets[local + 1] as usize
    }

    #[inline] pub fn degree(&self, local: usize) -> usize { self.range(local).len() }

    /// Local neighbors of a local node.
    #[inline]
    pub fn neighbors(&self, local: usize) -> impl Iterator<Item = usize> + '_ {
        self.range(local).map(move |i| self.edges[i] as usize)
    }

    /// The `i`th local neighbor of a local node.
    #[inline]
    pub(crate) fn neighbor(&self, local: usize, i: usize) -> usize {
        self.edges[self.offsets[local] as usize + i] as usize
    }

    /// Iterate every undirected edge once, as local `(u, v)` with `u < v`.
    pub fn edge_pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.node_count()).flat_map(move |u| {
            self.neighbors(u).filter(move |&v| u < v).map(move |v| (u, v))
        })
    }

    /// Number of connected components (0 for an empty subgraph).
    pub fn component_count(&self) -> usize {
        let mut visited = vec![false; self.node_count()];
        let mut count = 0;
        for start in 0..self.node_count() {
            if visited[start] { continue }
            visited[start] = true;
            count += 1;
            let mut queue = VecDeque::from([start]);
            while let Some(u) = queue.pop_front() {
                for v in self.neighbors(u) {
                    if !visited[v] { visited[v] = true; queue.push_back(v) }
                }
            }
        }
        count
    }

    #[inline] pub fn is_connected(&self) -> bool { self.component_count() <= 1 }
}
