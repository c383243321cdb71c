use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{error::SplitError, graph::Subgraph, tree::union_find::DisjointSet};

/// Cut-friendly rooted spanning tree over the local indices of a `Subgraph`.
/// Every subtree is a contiguous slice of the preorder.
#[derive(Debug, Clone)]
pub struct SpanningTree {
    root: usize,
    parent: Vec<usize>, // parent[root] = root
    order: Vec<usize>,  // preorder from the root
    index: Vec<usize>,  // preorder position of each node
    size: Vec<usize>,   // subtree sizes
}

impl SpanningTree {
    /// Build from parent links (`parent[root] == root`).
    /// Fails if the links do not reach every node from `root`.
    pub(crate) fn from_parents(root: usize, parent: Vec<usize>) -> Result<Self, SplitError> {
        let n = parent.len();
        assert!(root < n && parent[root] == root, "root must be its own parent");

        // Build children lists once.
        let mut children = vec![Vec::new(); n];
        for (u, &p) in parent.iter().enumerate() {
            if u != root && p < n { children[p].push(u) }
        }

        let mut order = Vec::with_capacity(n);
        let mut index = vec![usize::MAX; n];
        let mut size = vec![0; n];

        // Iterative DFS preorder from the root; sizes on exit.
        let mut stack = vec![(root, false)];
        while let Some((u, entered)) = stack.pop() {
            if !entered {
                index[u] = order.len();
                order.push(u);
                stack.push((u, true));
                for &v in children[u].iter().rev() { stack.push((v, false)) }
            } else {
                size[u] = 1 + children[u].iter().map(|&v| size[v]).sum::<usize>();
            }
        }

        if order.len() != n {
            return Err(SplitError::Disconnected { nodes: n, edges: order.len() - 1 });
        }

        Ok(Self { root, parent, order, index, size })
    }

    /// Build from an undirected edge list, rooting at `root`.
    pub(crate) fn from_edges(n: usize, edges: &[(usize, usize)], root: usize) -> Result<Self, SplitError> {
        if edges.len() + 1 != n {
            return Err(SplitError::Disconnected { nodes: n, edges: edges.len() });
        }

        let mut adjacency = vec![Vec::new(); n];
        for &(u, v) in edges {
            adjacency[u].push(v);
            adjacency[v].push(u);
        }

        let mut parent = vec![usize::MAX; n];
        parent[root] = root;
        let mut stack = vec![root];
        while let Some(u) = stack.pop() {
            for &v in &adjacency[u] {
                if parent[v] == usize::MAX { parent[v] = u; stack.push(v) }
            }
        }

        Self::from_parents(root, parent)
    }

    #[inline] pub fn node_count(&self) -> usize { self.order.len() }

    #[inline] pub fn edge_count(&self) -> usize { self.order.len().saturating_sub(1) }

    #[inline] pub fn root(&self) -> usize { self.root }

    /// Parent of `node`, or None for the root.
    #[inline]
    pub fn parent(&self, node: usize) -> Option<usize> {
        (node != self.root).then(|| self.parent[node])
    }

    /// Nodes in preorder; `preorder()[0]` is the root.
    #[inline] pub fn preorder(&self) -> &[usize] { &self.order }

    /// Preorder position of `node`.
    #[inline] pub fn position(&self, node: usize) -> usize { self.index[node] }

    /// Number of nodes in the subtree hanging below (and including) `node`.
    #[inline] pub fn subtree_size(&self, node: usize) -> usize { self.size[node] }

    /// Subtree of `node` as a contiguous preorder slice.
    #[inline]
    pub fn subtree(&self, node: usize) -> &[usize] {
        let start = self.index[node];
        &self.order[start .. start + self.size[node]]
    }

    /// Tree edges as `(parent, child)` pairs.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.order[1..].iter().map(move |&u| (self.parent[u], u))
    }
}

/// How spanning trees are drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeSampler {
    /// Minimum spanning tree under iid uniform edge weights (Kruskal).
    #[default]
    RandomMst,
    /// Exactly uniform spanning tree (Wilson's loop-erased random walks).
    Uniform,
}

impl TreeSampler {
    /// Draw a spanning tree of `graph`, rooted at a random node.
    /// Fails with `Disconnected` if `graph` is not connected.
    pub fn sample<R: Rng + ?Sized>(self, graph: &Subgraph, rng: &mut R) -> Result<SpanningTree, SplitError> {
        assert!(graph.node_count() > 0, "cannot build a spanning tree of an empty node set");
        match self {
            TreeSampler::RandomMst => random_mst(graph, rng),
            TreeSampler::Uniform => wilson(graph, rng),
        }
    }
}

/// Kruskal's algorithm over randomly weighted edges.
fn random_mst<R: Rng + ?Sized>(graph: &Subgraph, rng: &mut R) -> Result<SpanningTree, SplitError> {
    let n = graph.node_count();

    let mut weighted = graph.edge_pairs()
        .map(|(u, v)| (rng.random::<f64>(), u, v))
        .collect::<Vec<_>>();
    weighted.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));

    let mut sets = DisjointSet::new(n);
    let mut edges = Vec::with_capacity(n.saturating_sub(1));
    for (_, u, v) in weighted {
        if edges.len() + 1 == n { break }
        if sets.union(u, v) { edges.push((u, v)) }
    }

    let root = rng.random_range(0..n);
    trace!(nodes = n, edges = edges.len(), root, "random minimum spanning tree");
    SpanningTree::from_edges(n, &edges, root)
}

/// Wilson's algorithm: each walk follows random edges until it hits the tree,
/// then the last exit from every visited node is kept (loop erasure).
fn wilson<R: Rng + ?Sized>(graph: &Subgraph, rng: &mut R) -> Result<SpanningTree, SplitError> {
    let n = graph.node_count();

    // Walks never terminate on a disconnected graph.
    let components = graph.component_count();
    if components != 1 {
        return Err(SplitError::Disconnected { nodes: n, edges: n - components });
    }

    let root = rng.random_range(0..n);
    let mut in_tree = vec![false; n];
    let mut next = vec![usize::MAX; n];
    in_tree[root] = true;
    next[root] = root;

    for start in 0..n {
        let mut u = start;
        while !in_tree[u] {
            let v = graph.neighbor(u, rng.random_range(0..graph.degree(u)));
            next[u] = v;
            u = v;
        }

        u = start;
        while !in_tree[u] {
            in_tree[u] = true;
            u = next[u];
        }
    }

    trace!(nodes = n, root, "uniform spanning tree");
    SpanningTree::from_parents(root, next)
}
