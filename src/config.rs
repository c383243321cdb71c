//! Free parameters of the partitioner and the ReCom chain.
use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::{
    error::{ChainError, PartitionError},
    tree::{CutChoice, SplitParams, TreeSampler},
};

/// Parameters of recursive tree partitioning (and of ReCom proposals built from it).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartitionConfig {
    /// Node series holding population.
    pub pop_col: String,
    /// Number of districts to carve.
    pub num_districts: usize,
    /// Target population per district; defaults to total population / `num_districts`.
    pub ideal_population: Option<f64>,
    /// Allowed fractional deviation from the ideal population.
    pub epsilon: f64,
    /// Spanning trees to draw per split before giving up on it.
    pub node_repeats: usize,
    /// Whole-partition attempts before failing.
    pub max_attempts: usize,
    pub sampler: TreeSampler,
    pub cut_choice: CutChoice,
    /// Seed for reproducible runs; fresh entropy otherwise.
    pub seed: Option<u64>,
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self {
            pop_col: "population".to_string(),
            num_districts: 2,
            ideal_population: None,
            epsilon: 0.02,
            node_repeats: 1,
            max_attempts: 100,
            sampler: TreeSampler::default(),
            cut_choice: CutChoice::default(),
            seed: None,
        }
    }
}

impl PartitionConfig {
    pub fn new(pop_col: impl Into<String>, num_districts: usize, epsilon: f64) -> Self {
        Self { pop_col: pop_col.into(), num_districts, epsilon, ..Default::default() }
    }

    /// Parse a JSON object; missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Reject values that would make every split fail or every loop spin.
    pub fn validate(&self) -> Result<(), PartitionError> {
        let invalid = |msg: String| Err(PartitionError::InvalidConfig(msg));

        if self.pop_col.is_empty() { return invalid("pop_col must not be empty".into()) }
        if self.num_districts == 0 { return invalid("num_districts must be at least 1".into()) }
        if !(self.epsilon > 0.0 && self.epsilon < 1.0) {
            return invalid(format!("epsilon must be in (0, 1), got {}", self.epsilon));
        }
        if self.node_repeats == 0 { return invalid("node_repeats must be at least 1".into()) }
        if self.max_attempts == 0 { return invalid("max_attempts must be at least 1".into()) }
        if let Some(ideal) = self.ideal_population {
            if !(ideal.is_finite() && ideal > 0.0) {
                return invalid(format!("ideal_population must be positive, got {ideal}"));
            }
        }
        Ok(())
    }

    pub fn split_params(&self) -> SplitParams {
        SplitParams { node_repeats: self.node_repeats, sampler: self.sampler, cut_choice: self.cut_choice }
    }

    /// Random source for a run: seeded if `seed` is set.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        }
    }
}

/// Parameters of the Markov-chain driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Number of partitions yielded, including the initial one.
    pub total_steps: usize,
    /// Proposals drawn per step before holding the chain in place.
    pub max_proposals_per_step: usize,
}

impl Default for ChainConfig {
    fn default() -> Self { Self { total_steps: 100, max_proposals_per_step: 100 } }
}

impl ChainConfig {
    /// Reject a chain that could never yield or never move.
    pub fn validate(&self) -> Result<(), ChainError> {
        if self.total_steps == 0 {
            return Err(ChainError::InvalidConfig("total_steps must be at least 1".into()));
        }
        if self.max_proposals_per_step == 0 {
            return Err(ChainError::InvalidConfig("max_proposals_per_step must be at least 1".into()));
        }
        Ok(())
    }
}
