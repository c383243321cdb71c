use std::sync::Arc;

use crate::{
    error::PartitionError,
    graph::{Graph, WeightMatrix},
    partition::{Assignment, DistrictSets, RecomProposal},
};

/// An assignment of a graph's nodes to contiguous districts, plus cached per-district
/// tallies of every node series and the cut-edge count.
#[derive(Clone, Debug)]
pub struct Partition {
    districts: DistrictSets, // Sets of nodes in each district
    tallies: WeightMatrix,   // Per-district sums of node weights
    cut_edges: usize,        // Edges whose endpoints lie in different districts
    graph: Arc<Graph>,       // Shared, read-only dual graph
}

impl Partition {
    /// Build a partition (and its tallies) from an assignment of `graph`'s nodes.
    pub fn new(graph: impl Into<Arc<Graph>>, assignment: &Assignment) -> Result<Self, PartitionError> {
        let graph: Arc<Graph> = graph.into();
        if assignment.len() != graph.node_count() {
            return Err(PartitionError::InvalidAssignment(format!(
                "assignment covers {} nodes, graph has {}", assignment.len(), graph.node_count())));
        }

        let num_districts = assignment.num_districts() as usize;
        let districts = DistrictSets::from_assignments(num_districts, assignment.as_slice());

        let mut tallies = graph.node_weights().zeros_like(num_districts);
        for d in 0..num_districts {
            tallies.add_rows_from(d, graph.node_weights(), districts.get(d as u32));
        }

        Ok(Self { cut_edges: assignment.cut_edges(&graph), districts, tallies, graph })
    }

    /// Get the number of districts.
    #[inline] pub fn num_districts(&self) -> u32 { self.districts.num_sets() as u32 }

    /// Get the number of nodes in the underlying graph.
    #[inline] pub fn num_nodes(&self) -> usize { self.districts.num_elems() }

    /// Get a reference to the underlying graph.
    #[inline] pub fn graph(&self) -> &Graph { &self.graph }

    /// Get the district of a given node.
    #[inline] pub fn assignment(&self, node: usize) -> u32 { self.districts.find(node) }

    /// Get the district of every node.
    #[inline] pub fn assignments(&self) -> &[u32] { self.districts.assignments() }

    /// Copy out a standalone assignment.
    pub fn to_assignment(&self) -> Assignment {
        // Districts never become empty: proposals always return two non-empty pieces.
        Assignment::new(self.assignments().to_vec(), self.num_districts())
            .unwrap_or_else(|err| unreachable!("partition holds an invalid assignment: {err}"))
    }

    /// Get the nodes of a given district.
    #[inline] pub fn district_nodes(&self, district: u32) -> &[usize] { self.districts.get(district) }

    /// Sum of `series` over one district, or None if the series is missing.
    #[inline]
    pub fn tally(&self, series: &str, district: u32) -> Option<f64> {
        self.tallies.get(series, district as usize)
    }

    /// Sum of `series` for every district, or None if the series is missing.
    pub fn tallies(&self, series: &str) -> Option<Vec<f64>> {
        self.tallies.column_slice(series).map(|column| column.to_vec())
    }

    /// Number of edges whose endpoints lie in different districts.
    #[inline] pub fn cut_edges(&self) -> usize { self.cut_edges }

    /// Check if districts `a` and `b` share at least one edge.
    pub fn districts_adjacent(&self, a: u32, b: u32) -> bool {
        assert!(a < self.num_districts() && b < self.num_districts() && a != b,
            "a and b must be distinct districts in range [0, {})", self.num_districts());

        let (small, other) = if self.district_nodes(a).len() <= self.district_nodes(b).len() { (a, b) } else { (b, a) };
        self.district_nodes(small).iter()
            .any(|&u| self.graph.neighbors(u).any(|v| self.assignment(v) == other))
    }

    /// Every pair `(a, b)` with `a < b` of districts that share an edge.
    pub fn adjacent_district_pairs(&self) -> Vec<(u32, u32)> {
        let mut pairs = self.graph.edge_pairs()
            .filter_map(|(u, v)| {
                let (a, b) = (self.assignment(u), self.assignment(v));
                (a != b).then(|| (a.min(b), a.max(b)))
            })
            .collect::<Vec<_>>();
        pairs.sort_unstable();
        pairs.dedup();
        pairs
    }

    /// Check that `district` induces a connected subgraph, in O(size + boundary).
    pub fn is_district_contiguous(&self, district: u32) -> bool {
        self.graph.is_connected_by(self.district_nodes(district), |v| self.assignment(v) == district)
    }

    /// Check that every district induces a connected subgraph, in O(nodes + edges).
    pub fn is_contiguous(&self) -> bool {
        (0..self.num_districts()).all(|d| self.is_district_contiguous(d))
    }

    /// Commit a ReCom proposal, updating district sets, tallies and the cut-edge count.
    pub fn apply(&mut self, proposal: &RecomProposal) {
        let (a, b) = (proposal.a, proposal.b);
        assert!(a != b && a < self.num_districts() && b < self.num_districts(), "invalid proposal districts");

        let region = proposal.a_nodes.iter().chain(&proposal.b_nodes).copied().collect::<Vec<_>>();
        debug_assert!(region.iter().all(|&u| {
            let d = self.assignment(u);
            d == a || d == b
        }), "proposal must cover only districts {a} and {b}");

        let before = self.region_cut_edges(&region);
        for &u in &proposal.a_nodes { self.districts.move_to(u, a) }
        for &u in &proposal.b_nodes { self.districts.move_to(u, b) }
        let after = self.region_cut_edges(&region);
        self.cut_edges = self.cut_edges + after - before;

        // Recompute the two touched tally rows.
        self.tallies.clear_row(a as usize);
        self.tallies.clear_row(b as usize);
        self.tallies.add_rows_from(a as usize, self.graph.node_weights(), &proposal.a_nodes);
        self.tallies.add_rows_from(b as usize, self.graph.node_weights(), &proposal.b_nodes);
    }

    /// A copy of this partition with `proposal` committed; `self` is left untouched.
    pub fn with_proposal(&self, proposal: &RecomProposal) -> Self {
        let mut next = self.clone();
        next.apply(proposal);
        next
    }

    /// Cut edges with at least one endpoint in `region`, each counted once.
    fn region_cut_edges(&self, region: &[usize]) -> usize {
        let mut in_region = vec![false; self.num_nodes()];
        region.iter().for_each(|&u| in_region[u] = true);

        region.iter().map(|&u| {
            self.graph.neighbors(u)
                .filter(|&v| self.assignment(u) != self.assignment(v))
                .filter(|&v| !in_region[v] || u < v)
                .count()
        }).sum()
    }
}
