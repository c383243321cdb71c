/// Total assignment of nodes to districts, with O(1) lookup and move.
#[derive(Debug, Clone)]
pub(crate) struct DistrictSets {
    sets: Vec<Vec<usize>>,  // sets[d] = nodes currently in district d
    index: Vec<u32>,        // index[u] = d when u is in sets[d]
    position: Vec<usize>,   // position[u] = i when sets[d][i] is u
}

impl DistrictSets {
    /// Build from a complete slice of district ids, each below `num_sets`.
    pub(crate) fn from_assignments(num_sets: usize, assignments: &[u32]) -> Self {
        assert!(num_sets > 0, "must have at least one district");

        let mut sets = vec![Vec::new(); num_sets];
        let mut position = vec![0; assignments.len()];
        for (node, &set) in assignments.iter().enumerate() {
            assert!((set as usize) < num_sets, "district {set} out of range");
            position[node] = sets[set as usize].len();
            sets[set as usize].push(node);
        }

        Self { sets, index: assignments.to_vec(), position }
    }

    #[inline] pub(crate) fn num_sets(&self) -> usize { self.sets.len() }

    #[inline] pub(crate) fn num_elems(&self) -> usize { self.index.len() }

    /// District that `node` is currently in.
    #[inline]
    pub(crate) fn find(&self, node: usize) -> u32 {
        debug_assert!(node < self.index.len(), "node out of range");
        self.index[node]
    }

    /// Nodes currently in district `set`.
    #[inline]
    pub(crate) fn get(&self, set: u32) -> &[usize] {
        debug_assert!((set as usize) < self.sets.len(), "district out of range");
        &self.sets[set as usize]
    }

    /// District id of every node.
    #[inline] pub(crate) fn assignments(&self) -> &[u32] { &self.index }

    /// Move `node` to district `set`.
    pub(crate) fn move_to(&mut self, node: usize, set: u32) {
        debug_assert!(node < self.index.len(), "node out of range");
        debug_assert!((set as usize) < self.sets.len(), "district out of range");

        let (prev, pos) = (self.index[node] as usize, self.position[node]);
        if prev == set as usize { return }

        // Remove from previous set by swapping with last element.
        let last = self.sets[prev].pop().unwrap_or(node);
        if last != node {
            self.sets[prev][pos] = last;
            self.position[last] = pos;
        }

        self.index[node] = set;
        self.position[node] = self.sets[set as usize].len();
        self.sets[set as usize].push(node);
    }
}
