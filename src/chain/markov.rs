use rand::Rng;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    chain::{Acceptance, Constraint},
    config::ChainConfig,
    error::{ChainError, RecomError},
    partition::{Partition, RecomParams},
};

/// Per-chain counters for diagnosing a walk that rejects too often.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ChainStats {
    /// Steps taken after the initial state.
    pub steps: usize,
    /// ReCom proposals drawn.
    pub proposals: usize,
    /// Proposals that found no balanced re-split.
    pub rejected: usize,
    pub constraint_failures: usize,
    pub acceptance_failures: usize,
    pub accepted: usize,
    /// Steps that stayed at the current state.
    pub held: usize,
}

impl ChainStats {
    /// Fraction of proposals that were rejected or failed a constraint.
    pub fn rejection_rate(&self) -> f64 {
        if self.proposals == 0 { return 0.0 }
        (self.rejected + self.constraint_failures) as f64 / self.proposals as f64
    }
}

/// ReCom random walk. Iterating yields the initial partition and then the state after
/// each step, `total_steps` partitions in all.
///
/// Each step draws up to `max_proposals_per_step` proposals, redrawing on rejection or a
/// failed constraint. The first valid one is then accepted or not; a refused or
/// exhausted step holds the chain at its current state.
pub struct MarkovChain<R: Rng> {
    state: Partition,
    params: RecomParams,
    constraints: Vec<Constraint>,
    acceptance: Acceptance,
    config: ChainConfig,
    rng: R,
    yielded: usize,
    stats: ChainStats,
    error: Option<ChainError>,
}

impl<R: Rng> MarkovChain<R> {
    /// Set up a chain. Fails fast on invalid config or parameters, on a population series
    /// that is missing or holds negative or non-finite values, and on an initial partition
    /// that violates a constraint.
    pub fn new(
        initial: Partition,
        params: RecomParams,
        constraints: Vec<Constraint>,
        acceptance: Acceptance,
        config: ChainConfig,
        rng: R,
    ) -> Result<Self, ChainError> {
        config.validate()?;
        params.validate()?;
        initial.graph().populations(&params.pop_col).map_err(RecomError::from)?;

        if let Some(failed) = constraints.iter().find(|c| !c.check(&initial)) {
            return Err(ChainError::InvalidInitialState(failed.name().to_string()));
        }

        Ok(Self {
            state: initial,
            params,
            constraints,
            acceptance,
            config,
            rng,
            yielded: 0,
            stats: ChainStats::default(),
            error: None,
        })
    }

    #[inline] pub fn state(&self) -> &Partition { &self.state }

    #[inline] pub fn stats(&self) -> ChainStats { self.stats }

    /// The fault that ended iteration early, if any.
    #[inline] pub fn error(&self) -> Option<&ChainError> { self.error.as_ref() }

    /// Advance one step. Returns whether the state moved.
    pub fn step(&mut self) -> Result<bool, ChainError> {
        self.stats.steps += 1;

        for _ in 0..self.config.max_proposals_per_step {
            self.stats.proposals += 1;
            let proposal = match self.state.propose_recom(&self.params, &mut self.rng) {
                Ok(proposal) => proposal,
                Err(err) if err.is_rejection() => {
                    self.stats.rejected += 1;
                    continue;
                }
                Err(err) => return Err(err.into()),
            };

            let candidate = self.state.with_proposal(&proposal);
            if let Some(failed) = self.constraints.iter().find(|c| !c.check(&candidate)) {
                debug!(constraint = failed.name(), a = proposal.a, b = proposal.b, "proposal failed constraint");
                self.stats.constraint_failures += 1;
                continue;
            }

            if !self.acceptance.accept(&candidate) {
                self.stats.acceptance_failures += 1;
                self.stats.held += 1;
                return Ok(false);
            }

            self.stats.accepted += 1;
            self.state = candidate;
            return Ok(true);
        }

        warn!(step = self.stats.steps, max_proposals = self.config.max_proposals_per_step, "no valid proposal, holding chain");
        self.stats.held += 1;
        Ok(false)
    }
}

impl<R: Rng> Iterator for MarkovChain<R> {
    type Item = Partition;

    fn next(&mut self) -> Option<Partition> {
        if self.yielded >= self.config.total_steps || self.error.is_some() { return None }

        if self.yielded > 0 {
            if let Err(err) = self.step() {
                warn!(error = %err, step = self.stats.steps, "chain stopped");
                self.error = Some(err);
                return None;
            }
        }

        self.yielded += 1;
        if self.yielded == self.config.total_steps {
            info!(steps = self.stats.steps, accepted = self.stats.accepted, held = self.stats.held,
                rejection_rate = self.stats.rejection_rate(), "chain complete");
        }
        Some(self.state.clone())
    }
}
