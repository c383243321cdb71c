use std::collections::HashMap;

use crate::{
    error::PartitionError,
    graph::{Graph, NodeId},
    tree::PopulationBounds,
};

/// A complete map from node index to district id `0..num_districts`.
/// Construction guarantees every node has one in-range district and no district is empty;
/// `validate` additionally checks contiguity and population balance against a graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assignment {
    districts: Vec<u32>,
    num_districts: u32,
}

impl Assignment {
    pub fn new(districts: Vec<u32>, num_districts: u32) -> Result<Self, PartitionError> {
        if num_districts == 0 {
            return Err(PartitionError::InvalidAssignment("num_districts must be at least 1".into()));
        }

        let mut sizes = vec![0usize; num_districts as usize];
        for (node, &d) in districts.iter().enumerate() {
            if d >= num_districts {
                return Err(PartitionError::InvalidAssignment(
                    format!("node {node} assigned to district {d}, expected < {num_districts}")));
            }
            sizes[d as usize] += 1;
        }

        if let Some(empty) = sizes.iter().position(|&s| s == 0) {
            return Err(PartitionError::InvalidAssignment(format!("district {empty} has no nodes")));
        }

        Ok(Self { districts, num_districts })
    }

    /// Build from a caller-facing map; every graph node must be present.
    pub fn from_map(graph: &Graph, map: &HashMap<NodeId, u32>, num_districts: u32) -> Result<Self, PartitionError> {
        let districts = graph.node_ids().iter()
            .map(|id| map.get(id).copied()
                .ok_or_else(|| PartitionError::InvalidAssignment(format!("node {id} is not assigned"))))
            .collect::<Result<Vec<_>, _>>()?;

        if map.len() != districts.len() {
            return Err(PartitionError::InvalidAssignment(
                format!("{} assigned ids are not graph nodes", map.len() - districts.len())));
        }

        Self::new(districts, num_districts)
    }

    #[inline] pub fn num_districts(&self) -> u32 { self.num_districts }

    #[inline] pub fn len(&self) -> usize { self.districts.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.districts.is_empty() }

    /// District of `node`.
    #[inline] pub fn district(&self, node: usize) -> u32 { self.districts[node] }

    #[inline] pub fn as_slice(&self) -> &[u32] { &self.districts }

    /// Nodes of each district, in node order.
    pub fn district_nodes(&self) -> Vec<Vec<usize>> {
        let mut nodes = vec![Vec::new(); self.num_districts as usize];
        for (u, &d) in self.districts.iter().enumerate() { nodes[d as usize].push(u) }
        nodes
    }

    /// Total of `populations` in each district.
    pub fn district_populations(&self, populations: &[f64]) -> Vec<f64> {
        let mut totals = vec![0.0; self.num_districts as usize];
        for (u, &d) in self.districts.iter().enumerate() { totals[d as usize] += populations[u] }
        totals
    }

    /// Number of graph edges whose endpoints lie in different districts.
    pub fn cut_edges(&self, graph: &Graph) -> usize {
        graph.edge_pairs().filter(|&(u, v)| self.districts[u] != self.districts[v]).count()
    }

    /// Map node ids to district ids.
    pub fn to_map(&self, graph: &Graph) -> HashMap<NodeId, u32> {
        graph.node_ids().iter().cloned().zip(self.districts.iter().copied()).collect()
    }

    /// Check this assignment against a graph: node count, contiguity of every district
    /// and, if `bounds` is given, every district population inside it.
    pub fn validate(&self, graph: &Graph, populations: &[f64], bounds: Option<PopulationBounds>) -> Result<(), PartitionError> {
        if self.districts.len() != graph.node_count() {
            return Err(PartitionError::InvalidAssignment(format!(
                "assignment covers {} nodes, graph has {}", self.districts.len(), graph.node_count())));
        }

        for (d, nodes) in self.district_nodes().iter().enumerate() {
            if !graph.is_connected_subset(nodes) {
                return Err(PartitionError::InvalidAssignment(format!("district {d} is not contiguous")));
            }
        }

        if let Some(bounds) = bounds {
            for (d, population) in self.district_populations(populations).into_iter().enumerate() {
                if !bounds.contains(population) {
                    return Err(PartitionError::InvalidAssignment(format!(
                        "district {d} population {population} outside ({}, {})", bounds.min, bounds.max)));
                }
            }
        }

        Ok(())
    }
}
