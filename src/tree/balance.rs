use rand::{Rng, seq::IndexedRandom};
use serde::{Deserialize, Serialize};

use crate::{error::SplitError, tree::SpanningTree};

/// Open population interval `(min, max)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PopulationBounds {
    pub min: f64,
    pub max: f64,
}

impl PopulationBounds {
    /// Populations `p` with `|p - target| < epsilon * target`.
    pub fn around(target: f64, epsilon: f64) -> Self {
        Self { min: target * (1.0 - epsilon), max: target * (1.0 + epsilon) }
    }

    /// Accepts every population.
    pub fn unbounded() -> Self {
        Self { min: f64::NEG_INFINITY, max: f64::INFINITY }
    }

    #[inline] pub fn contains(&self, population: f64) -> bool { self.min < population && population < self.max }

    /// Midpoint of the interval.
    #[inline] pub fn center(&self) -> f64 { (self.min + self.max) / 2.0 }
}

/// Acceptance rule for a cut: one side must land in `piece`, the other in `rest`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BalanceTarget {
    pub piece: PopulationBounds,
    pub rest: PopulationBounds,
}

impl BalanceTarget {
    /// Both sides within `epsilon` of `target` (a two-district re-split).
    pub fn pair(target: f64, epsilon: f64) -> Self {
        let bounds = PopulationBounds::around(target, epsilon);
        Self { piece: bounds, rest: bounds }
    }

    /// One side within `piece`, the other unconstrained (peeling one district off a remainder).
    pub fn peel(piece: PopulationBounds) -> Self {
        Self { piece, rest: PopulationBounds::unbounded() }
    }
}

/// How to pick among several acceptable cuts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CutChoice {
    /// Uniformly at random.
    #[default]
    Uniform,
    /// The cut whose piece is closest to the center of the piece bounds.
    MostBalanced,
}

/// An acceptable cut of the tree edge `(parent[node], node)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cut {
    /// Child endpoint of the cut edge.
    pub node: usize,
    /// Whether the piece is the subtree below `node` (otherwise it is everything else).
    pub piece_is_subtree: bool,
    pub piece_population: f64,
    pub rest_population: f64,
}

impl Cut {
    /// Split the tree's nodes into (piece, rest).
    pub fn sides(&self, tree: &SpanningTree) -> (Vec<usize>, Vec<usize>) {
        let start = tree.position(self.node);
        let end = start + tree.subtree_size(self.node);
        let order = tree.preorder();

        let inside = order[start..end].to_vec();
        let outside = order[..start].iter().chain(&order[end..]).copied().collect();

        if self.piece_is_subtree { (inside, outside) } else { (outside, inside) }
    }
}

/// Every acceptable cut of `tree`, given per-node `populations` (indexed like the tree's nodes).
pub fn balanced_cuts(tree: &SpanningTree, populations: &[f64], target: &BalanceTarget) -> Vec<Cut> {
    debug_assert!(populations.len() == tree.node_count(), "populations must cover every tree node");

    // Prefix sums over the preorder: subtree(u) = prefix[end] - prefix[start].
    let mut prefix = Vec::with_capacity(tree.node_count() + 1);
    prefix.push(0.0);
    for &u in tree.preorder() { prefix.push(prefix[prefix.len() - 1] + populations[u]) }
    let total = prefix[prefix.len() - 1];

    let mut cuts = Vec::new();
    for &u in &tree.preorder()[1..] { // preorder[0] is the root
        let start = tree.position(u);
        let below = prefix[start + tree.subtree_size(u)] - prefix[start];
        let above = total - below;

        if target.piece.contains(below) && target.rest.contains(above) {
            cuts.push(Cut { node: u, piece_is_subtree: true, piece_population: below, rest_population: above });
        } else if target.piece.contains(above) && target.rest.contains(below) {
            cuts.push(Cut { node: u, piece_is_subtree: false, piece_population: above, rest_population: below });
        }
    }
    cuts
}

/// Choose one acceptable cut, or report `NoBalancedSplit`.
pub fn find_balanced_cut<R: Rng + ?Sized>(
    tree: &SpanningTree,
    populations: &[f64],
    target: &BalanceTarget,
    choice: CutChoice,
    rng: &mut R,
) -> Result<Cut, SplitError> {
    let cuts = balanced_cuts(tree, populations, target);
    let center = target.piece.center();

    let cut = match choice {
        CutChoice::Uniform => cuts.choose(rng).copied(),
        CutChoice::MostBalanced => cuts.into_iter().min_by(|a, b| {
            (a.piece_population - center).abs().total_cmp(&(b.piece_population - center).abs())
        }),
    };

    cut.ok_or(SplitError::NoBalancedSplit)
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    /// Path 0 - 1 - 2 - ... rooted at 0.
    fn path_tree(n: usize) -> SpanningTree {
        let edges = (1..n).map(|i| (i - 1, i)).collect::<Vec<_>>();
        SpanningTree::from_edges(n, &edges, 0).unwrap()
    }

    #[test]
    fn bounds_are_open() {
        let bounds = PopulationBounds::around(20.0, 0.1);
        assert!(bounds.contains(20.0));
        assert!(bounds.contains(21.9));
        assert!(!bounds.contains(18.0));
        assert!(!bounds.contains(22.0));
        assert!(PopulationBounds::unbounded().contains(1e300));
    }

    #[test]
    fn path_of_ten_has_one_exact_cut_per_boundary() {
        let tree = path_tree(10);
        let pops = vec![10.0; 10];

        // Peel 20 out of 100: the cut must leave 20 on one side.
        let cuts = balanced_cuts(&tree, &pops, &BalanceTarget::peel(PopulationBounds::around(20.0, 0.1)));
        assert_eq!(cuts.len(), 2);
        for cut in &cuts {
            assert_eq!(cut.piece_population, 20.0);
            assert_eq!(cut.rest_population, 80.0);
            let (piece, rest) = cut.sides(&tree);
            assert_eq!(piece.len(), 2);
            assert_eq!(rest.len(), 8);
        }

        // The subtree below node 8 is {8, 9}; cutting above node 2 leaves {0, 1} as the piece.
        assert!(cuts.contains(&Cut { node: 8, piece_is_subtree: true, piece_population: 20.0, rest_population: 80.0 }));
        assert!(cuts.contains(&Cut { node: 2, piece_is_subtree: false, piece_population: 20.0, rest_population: 80.0 }));
    }

    #[test]
    fn pair_target_checks_both_sides() {
        let tree = path_tree(4);
        let pops = vec![1.0, 1.0, 1.0, 1.0];

        let cuts = balanced_cuts(&tree, &pops, &BalanceTarget::pair(2.0, 0.5));
        assert_eq!(cuts.len(), 1);
        let (mut piece, mut rest) = cuts[0].sides(&tree);
        piece.sort_unstable();
        rest.sort_unstable();
        assert_eq!((piece, rest), (vec![2, 3], vec![0, 1]));
    }

    #[test]
    fn skewed_tree_has_no_balanced_cut() {
        let tree = path_tree(3);
        let pops = vec![90.0, 5.0, 5.0];
        let mut rng = StdRng::seed_from_u64(0);

        let result = find_balanced_cut(&tree, &pops, &BalanceTarget::pair(50.0, 0.01), CutChoice::Uniform, &mut rng);
        assert_eq!(result, Err(SplitError::NoBalancedSplit));
    }

    #[test]
    fn most_balanced_prefers_center() {
        let tree = path_tree(5);
        let pops = vec![10.0, 9.0, 1.0, 10.0, 10.0];
        let mut rng = StdRng::seed_from_u64(0);

        // Piece bounds (15, 25): subtrees {2,3,4} = 21 and {3,4} = 20 qualify.
        let target = BalanceTarget::peel(PopulationBounds::around(20.0, 0.25));
        assert_eq!(balanced_cuts(&tree, &pops, &target).len(), 2);

        let cut = find_balanced_cut(&tree, &pops, &target, CutChoice::MostBalanced, &mut rng).unwrap();
        assert_eq!(cut.piece_population, 20.0);
    }

    #[test]
    fn single_node_tree_never_splits() {
        let tree = path_tree(1);
        let mut rng = StdRng::seed_from_u64(0);
        let result = find_balanced_cut(&tree, &[5.0], &BalanceTarget::peel(PopulationBounds::around(5.0, 0.5)), CutChoice::Uniform, &mut rng);
        assert_eq!(result, Err(SplitError::NoBalancedSplit));
    }
}
