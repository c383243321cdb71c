use std::collections::VecDeque;

use ahash::{AHashMap, AHashSet};

use crate::{error::GraphError, graph::{NodeId, Subgraph, WeightMatrix}};

/// An undirected dual graph in compressed sparse row format.
/// Nodes are addressed by dense indices `0..node_count()`; `NodeId`s are kept for callers.
#[derive(Debug, Default)]
pub struct Graph {
    ids: Vec<NodeId>,
    index: AHashMap<NodeId, usize>,
    offsets: Vec<u32>,
    edges: Vec<u32>,
    node_weights: WeightMatrix,
}

impl Graph {
    /// Construct a graph from symmetric adjacency lists and node weights.
    /// Callers go through `GraphBuilder`, which guarantees symmetry and no self-loops.
    pub(crate) fn new(ids: Vec<NodeId>, adjacency: &[Vec<u32>], node_weights: WeightMatrix) -> Self {
        assert!(adjacency.len() == ids.len(), "adjacency.len() must equal ids.len()");
        assert!(node_weights.num_rows() == ids.len(), "node_weights rows must equal ids.len()");

        let index = ids.iter().cloned().enumerate().map(|(i, id)| (id, i)).collect();

        Self {
            ids,
            index,
            offsets: std::iter::once(0u32).chain(
                adjacency.iter()
                    .map(|v| v.len() as u32)
                    .scan(0u32, |acc, len| {*acc += len; Some(*acc)})
            ).collect::<Vec<u32>>(),
            edges: adjacency.iter().flatten().copied().collect(),
            node_weights,
        }
    }

    /// Get the number of nodes in the graph.
    #[inline] pub fn node_count(&self) -> usize { self.ids.len() }

    /// Get the number of undirected edges in the graph.
    #[inline] pub fn edge_count(&self) -> usize { self.edges.len() / 2 }

    /// Get a reference to the node weights matrix.
    #[inline] pub fn node_weights(&self) -> &WeightMatrix { &self.node_weights }

    /// Get the caller-facing id of a node.
    #[inline] pub fn node_id(&self, node: usize) -> &NodeId { &self.ids[node] }

    /// All node ids, in index order.
    #[inline] pub fn node_ids(&self) -> &[NodeId] { &self.ids }

    /// Look up the index of a node id.
    #[inline] pub fn node_index(&self, id: &NodeId) -> Option<usize> { self.index.get(id).copied() }

    /// Get the range of edges for a given node.
    #[inline]
    fn range(&self, node: usize) -> std::ops::Range<usize> {
        self.offsets[node] as usize .. self.offsets[node + 1] as usize
    }

    /// Get the degree (number of neighbors) of a given node.
    #[inline] pub fn degree(&self, node: usize) -> usize { self.range(node).len() }

    /// Get an iterator over the neighbors of a given node.
    #[inline]
    pub fn neighbors(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
        self.range(node).map(move |v| self.edges[v] as usize)
    }

    /// Iterate every undirected edge once, as `(u, v)` with `u < v`.
    pub fn edge_pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.node_count()).flat_map(move |u| {
            self.neighbors(u).filter(move |&v| u < v).map(move |v| (u, v))
        })
    }

    /// Read a node series as a population vector indexed by node.
    /// Fails if the series is missing or any value is negative, NaN or infinite.
    pub fn populations(&self, series: &str) -> Result<Vec<f64>, GraphError> {
        let column = self.node_weights.column(series)
            .ok_or_else(|| GraphError::MissingSeries(series.to_string()))?;

        column.iter().enumerate().map(|(node, &value)| {
            if value.is_finite() && value >= 0.0 { Ok(value) }
            else {
                Err(GraphError::InvalidPopulation {
                    node: self.ids[node].clone(),
                    series: series.to_string(),
                    value,
                })
            }
        }).collect()
    }

    /// Sum `populations` over a node set.
    #[inline]
    pub fn total_population(&self, nodes: &[usize], populations: &[f64]) -> f64 {
        debug_assert!(populations.len() == self.node_count(), "populations must be indexed by node");
        nodes.iter().map(|&u| populations[u]).sum()
    }

    /// Build the subgraph induced by `nodes`: those nodes plus every edge with both ends inside.
    /// Runs in O(|nodes| + sum of their degrees).
    pub fn induced_subgraph(&self, nodes: &[usize]) -> Subgraph {
        let mut local = AHashMap::with_capacity(nodes.len());
        for (i, &u) in nodes.iter().enumerate() {
            assert!(u < self.node_count(), "node {u} out of range");
            let prev = local.insert(u, i as u32);
            assert!(prev.is_none(), "node {u} listed twice in node set");
        }

        let mut offsets = Vec::with_capacity(nodes.len() + 1);
        let mut edges = Vec::new();
        offsets.push(0u32);
        for &u in nodes {
            edges.extend(self.neighbors(u).filter_map(|v| local.get(&v).copied()));
            offsets.push(edges.len() as u32);
        }

        Subgraph::new(nodes.to_vec(), offsets, edges)
    }

    /// Label each node with its connected component, returning (labels, component count).
    pub fn connected_components(&self) -> (Vec<usize>, usize) {
        let mut labels = vec![usize::MAX; self.node_count()];
        let mut count = 0;
        for start in 0..self.node_count() {
            if labels[start] != usize::MAX { continue }
            labels[start] = count;
            let mut queue = VecDeque::from([start]);
            while let Some(u) = queue.pop_front() {
                for v in self.neighbors(u) {
                    if labels[v] == usize::MAX { labels[v] = count; queue.push_back(v) }
                }
            }
            count += 1;
        }
        (labels, count)
    }

    /// Check that the whole graph is connected, reporting how much is reachable if not.
    pub fn check_connected(&self) -> Result<(), GraphError> {
        if self.node_count() == 0 { return Ok(()) }
        let (labels, count) = self.connected_components();
        if count == 1 { return Ok(()) }
        Err(GraphError::Disconnected {
            reached: labels.iter().filter(|&&c| c == 0).count(),
            total: self.node_count(),
        })
    }

    /// Check if `nodes` (no repeats) induces a connected subgraph (empty sets count as connected).
    /// Runs in O(|nodes| + sum of their degrees).
    pub fn is_connected_subset(&self, nodes: &[usize]) -> bool {
        let in_set = nodes.iter().copied().collect::<AHashSet<_>>();
        self.is_connected_by(nodes, |v| in_set.contains(&v))
    }

    /// Breadth-first search from `nodes[0]` through nodes accepted by `member`,
    /// checking that it reaches all of `nodes`. `member` must accept exactly `nodes`.
    pub(crate) fn is_connected_by(&self, nodes: &[usize], member: impl Fn(usize) -> bool) -> bool {
        let Some(&start) = nodes.first() else { return true };

        let mut visited = AHashSet::with_capacity(nodes.len());
        visited.insert(start);
        let mut queue = VecDeque::from([start]);
        while let Some(u) = queue.pop_front() {
            for v in self.neighbors(u) {
                if member(v) && visited.insert(v) { queue.push_back(v) }
            }
        }

        visited.len() == nodes.len()
    }
}
