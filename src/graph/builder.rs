use ahash::{AHashMap, AHashSet};

use crate::{error::GraphError, graph::{Graph, NodeId, WeightMatrix}};

/// Incrementally declares nodes (with numeric attributes) and undirected edges.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    ids: Vec<NodeId>,
    index: AHashMap<NodeId, usize>,
    adjacency: Vec<Vec<u32>>,
    edge_set: AHashSet<(u32, u32)>,
    series: Vec<String>,
    series_index: AHashMap<String, usize>,
    columns: Vec<Vec<f64>>, // columns[j][node]
}

impl GraphBuilder {
    pub fn new() -> Self { Self::default() }

    /// Declare a node with its attributes, returning its index.
    /// A node that lacks a series declared by other nodes reads as NaN for it.
    pub fn add_node<K: Into<String>>(
        &mut self,
        id: impl Into<NodeId>,
        attributes: impl IntoIterator<Item = (K, f64)>,
    ) -> Result<usize, GraphError> {
        let id = id.into();
        if self.index.contains_key(&id) { return Err(GraphError::DuplicateNode(id)) }

        let node = self.ids.len();
        self.index.insert(id.clone(), node);
        self.ids.push(id);
        self.adjacency.push(Vec::new());
        self.columns.iter_mut().for_each(|column| column.push(f64::NAN));

        for (name, value) in attributes {
            let name = name.into();
            let j = match self.series_index.get(&name) {
                Some(&j) => j,
                None => {
                    self.series_index.insert(name.clone(), self.series.len());
                    self.series.push(name);
                    self.columns.push(vec![f64::NAN; node + 1]);
                    self.columns.len() - 1
                }
            };
            self.columns[j][node] = value;
        }

        Ok(node)
    }

    /// Declare an undirected edge between two existing nodes. Repeated edges are collapsed.
    pub fn add_edge(&mut self, a: impl Into<NodeId>, b: impl Into<NodeId>) -> Result<(), GraphError> {
        let (a, b) = (a.into(), b.into());
        let &u = self.index.get(&a).ok_or_else(|| GraphError::UnknownNode(a.clone()))?;
        let &v = self.index.get(&b).ok_or_else(|| GraphError::UnknownNode(b.clone()))?;
        if u == v { return Err(GraphError::SelfLoop(a)) }
        self.connect(u, v);
        Ok(())
    }

    /// Same as `add_edge`, addressing nodes by index.
    pub(crate) fn connect(&mut self, u: usize, v: usize) {
        debug_assert!(u != v, "self-loop on node {u}");
        let key = (u.min(v) as u32, u.max(v) as u32);
        if self.edge_set.insert(key) {
            self.adjacency[u].push(v as u32);
            self.adjacency[v].push(u as u32);
        }
    }

    /// Number of nodes declared so far.
    #[inline] pub fn node_count(&self) -> usize { self.ids.len() }

    /// Freeze into a compressed sparse row graph.
    pub fn build(self) -> Graph {
        let num_nodes = self.ids.len();
        let weights = WeightMatrix::from_columns(num_nodes, self.series.into_iter().zip(self.columns).collect());
        Graph::new(self.ids, &self.adjacency, weights)
    }
}
