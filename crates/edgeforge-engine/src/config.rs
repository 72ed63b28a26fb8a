//! Run configuration for the evolutionary search.
//!
//! One explicit structure with named, typed fields and documented defaults;
//! nothing here is environment-dependent or secret. The worker pool itself
//! is a run-scoped resource and never part of this state.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Policy for replacing the incumbent best on equal scores.
///
/// Observed deployments differ here, so the choice is explicit rather than
/// hard-coded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TiePolicy {
    /// Only a strictly better score replaces the incumbent.
    #[default]
    Strict,
    /// An equal score also replaces the incumbent.
    Permissive,
}

impl TiePolicy {
    /// Whether `score` displaces `incumbent` under this policy.
    #[inline]
    #[must_use]
    pub fn accepts(&self, score: f64, incumbent: f64) -> bool {
        match self {
            Self::Strict => score < incumbent,
            Self::Permissive => score <= incumbent,
        }
    }
}

/// Policy for choosing the event kind of newly added interactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum KindPolicy {
    /// Uniform over the observed vocabulary.
    #[default]
    Uniform,
    /// Half the probability mass on the member's currently-rarest kind and
    /// the remainder split evenly over the rest; keeps signature diversity
    /// from collapsing.
    RarityBiased,
}

/// Evolution strategy configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionConfig {
    /// Generation budget
    pub generations: usize,
    /// Parents kept each generation (μ)
    pub mu: usize,
    /// Initial population size (λ); after the first reproduction the
    /// per-generation size settles at `μ + μ·⌊λ/μ⌋`
    pub lambda: usize,
    /// Step-size growth factor applied after a successful generation (> 1)
    pub success_factor: f64,
    /// Step-size decay factor applied after a failed generation (< 1)
    pub decay_factor: f64,
    /// Worker threads for fitness evaluation
    pub workers: usize,
    /// RNG seed; the engine owns all randomness, so equal seeds reproduce
    /// equal runs
    pub seed: u64,
    /// Weight PageRank by edge weight instead of treating edges uniformly
    pub weighted: bool,
    /// Show the interactive progress bar
    pub progress: bool,
    /// Best-update tie policy
    pub tie_policy: TiePolicy,
    /// New-edge kind selection policy
    pub kind_policy: KindPolicy,
    /// Wall-clock ceiling for the deletion retry loop inside mutation
    pub delete_timeout: Duration,
}

impl EvolutionConfig {
    /// Create the default configuration.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With a generation budget.
    #[inline]
    #[must_use]
    pub fn with_generations(mut self, generations: usize) -> Self {
        self.generations = generations;
        self
    }

    /// With parent and population sizes.
    #[inline]
    #[must_use]
    pub fn with_population(mut self, mu: usize, lambda: usize) -> Self {
        self.mu = mu;
        self.lambda = lambda;
        self
    }

    /// With step-size adaptation factors.
    #[inline]
    #[must_use]
    pub fn with_adaptation(mut self, success_factor: f64, decay_factor: f64) -> Self {
        self.success_factor = success_factor;
        self.decay_factor = decay_factor;
        self
    }

    /// With a worker-thread count.
    #[inline]
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// With an RNG seed.
    #[inline]
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// With a best-update tie policy.
    #[inline]
    #[must_use]
    pub fn with_tie_policy(mut self, policy: TiePolicy) -> Self {
        self.tie_policy = policy;
        self
    }

    /// With a kind-selection policy.
    #[inline]
    #[must_use]
    pub fn with_kind_policy(mut self, policy: KindPolicy) -> Self {
        self.kind_policy = policy;
        self
    }

    /// With the progress bar shown or hidden.
    #[inline]
    #[must_use]
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// Validate the parameter combination.
    ///
    /// # Errors
    /// A message naming the offending field when a value is out of range.
    pub fn validate(&self) -> Result<(), String> {
        if self.mu == 0 {
            return Err("mu must be at least 1".into());
        }
        if self.lambda < self.mu {
            return Err(format!(
                "lambda ({}) must be at least mu ({})",
                self.lambda, self.mu
            ));
        }
        if self.success_factor <= 1.0 {
            return Err("success factor must exceed 1".into());
        }
        if self.decay_factor <= 0.0 || self.decay_factor >= 1.0 {
            return Err("decay factor must lie in (0, 1)".into());
        }
        if self.workers == 0 {
            return Err("workers must be at least 1".into());
        }
        Ok(())
    }
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            generations: 1000,
            mu: 1,
            lambda: 20,
            success_factor: 2.0,
            decay_factor: 0.5,
            workers: 4,
            seed: 42,
            weighted: false,
            progress: true,
            tie_policy: TiePolicy::default(),
            kind_policy: KindPolicy::default(),
            delete_timeout: Duration::from_secs(120),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(EvolutionConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_mu_rejected() {
        let config = EvolutionConfig::default().with_population(0, 4);
        assert!(config.validate().is_err());
    }

    #[test]
    fn lambda_below_mu_rejected() {
        let config = EvolutionConfig::default().with_population(4, 2);
        assert!(config.validate().is_err());
    }

    #[test]
    fn adaptation_factors_bounded() {
        assert!(EvolutionConfig::default()
            .with_adaptation(1.0, 0.5)
            .validate()
            .is_err());
        assert!(EvolutionConfig::default()
            .with_adaptation(2.0, 1.0)
            .validate()
            .is_err());
    }

    #[test]
    fn strict_policy_keeps_incumbent_on_tie() {
        assert!(!TiePolicy::Strict.accepts(0.5, 0.5));
        assert!(TiePolicy::Permissive.accepts(0.5, 0.5));
        assert!(TiePolicy::Strict.accepts(0.4, 0.5));
    }
}
