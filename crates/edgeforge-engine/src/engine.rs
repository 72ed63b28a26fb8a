//! (μ+λ) evolution strategy with a self-adaptive mutation step size.

use crate::config::EvolutionConfig;
use crate::error::EngineError;
use crate::mutation::MutationOperator;
use edgeforge_metrics::{evaluate, l2_star_discrepancy, FeatureOptions, MetricsError};
use edgeforge_model::{CombinationIndex, Dataset, EdgeList, EventKind, Universe};
use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Binomial, Distribution};
use rayon::prelude::*;
use std::time::Instant;

/// Outcome of a finished search.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// Generation index at which the best candidate was first observed
    pub best_generation: usize,
    /// Best edge list, in pre-Follow-completion form
    pub best: EdgeList,
    /// Its discrepancy score
    pub best_score: f64,
}

/// Drives population management, parallel scoring, selection, reproduction,
/// and step-size adaptation over a fixed user/repo universe.
///
/// The universe, event vocabulary, and signature index are computed once
/// from the seed dataset and are read-only for the whole run; population
/// members are value objects, so the parallel scoring section shares no
/// mutable state.
#[derive(Debug)]
pub struct EvolutionEngine {
    config: EvolutionConfig,
    universe: Universe,
    index: CombinationIndex,
    vocabulary: Vec<EventKind>,
    seed_edges: EdgeList,
}

impl EvolutionEngine {
    /// Build an engine from a seed dataset.
    ///
    /// # Errors
    /// [`EngineError::InvalidConfig`] when the parameter combination is
    /// unusable.
    pub fn new(dataset: Dataset, config: EvolutionConfig) -> Result<Self, EngineError> {
        config.validate().map_err(EngineError::InvalidConfig)?;
        let vocabulary = dataset.edges.kinds();
        let index = CombinationIndex::new(&vocabulary);
        Ok(Self {
            config,
            universe: dataset.universe,
            index,
            vocabulary,
            seed_edges: dataset.edges,
        })
    }

    /// The universe this engine searches over.
    #[inline]
    #[must_use]
    pub fn universe(&self) -> &Universe {
        &self.universe
    }

    /// Complete an edge list against this engine's universe, for export.
    #[must_use]
    pub fn complete(&self, edges: &EdgeList) -> EdgeList {
        edgeforge_metrics::complete(edges, &self.universe)
    }

    /// Run the search for the configured generation budget.
    ///
    /// The worker pool lives exactly as long as this call. Every generation
    /// is a full barrier: all scores return (positionally mapped to their
    /// candidates) before selection proceeds.
    ///
    /// # Errors
    /// - [`EngineError::Pool`] when the worker pool cannot be built
    /// - [`EngineError::Scoring`] when any candidate fails to score
    /// - [`EngineError::NoCandidate`] when the generation budget was zero
    pub fn run(&self) -> Result<SearchOutcome, EngineError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.workers)
            .build()?;
        let mut rng = StdRng::seed_from_u64(self.config.seed);

        let node_count = self.universe.node_count();
        let mut prob = 1.0 / node_count as f64;
        let prob_floor = 1.0 / (node_count as f64 * node_count as f64);
        let n_children = self.config.lambda / self.config.mu;
        let operator = MutationOperator::new(
            &self.universe,
            &self.vocabulary,
            self.config.kind_policy,
            self.config.delete_timeout,
        );

        let mut population: Vec<EdgeList> =
            vec![self.seed_edges.clone(); self.config.lambda];
        let mut best: Option<EdgeList> = None;
        let mut best_score = f64::INFINITY;
        let mut best_generation = 0usize;

        let bar = self.progress_bar();
        tracing::info!(
            mu = self.config.mu,
            lambda = self.config.lambda,
            generations = self.config.generations,
            "evolution strategy begins"
        );

        for generation in 0..self.config.generations {
            let started = Instant::now();
            let sample = draw_step_size(node_count as u64, prob, &mut rng)?;
            bar.set_message(format!(
                "best score: {best_score:.5}, step size: {sample}"
            ));

            let scores: Vec<f64> = pool
                .install(|| {
                    population
                        .par_iter()
                        .map(|candidate| self.objective(candidate))
                        .collect::<Result<Vec<_>, MetricsError>>()
                })
                .map_err(|source| EngineError::Scoring { generation, source })?;

            // rank ascending, ties broken by population index
            let mut order: Vec<usize> = (0..scores.len()).collect();
            order.sort_by(|&a, &b| {
                scores[a]
                    .partial_cmp(&scores[b])
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.cmp(&b))
            });
            tracing::info!(
                generation,
                best_of_generation = scores[order[0]],
                sample,
                "generation evaluated"
            );

            let mut improved = false;
            let mut next = Vec::with_capacity(self.config.mu * (1 + n_children));
            for &selected in &order[..self.config.mu] {
                // step adaptation keys on strict improvement regardless of
                // the tie policy used for the incumbent
                improved |= scores[selected] < best_score;
                if self.config.tie_policy.accepts(scores[selected], best_score) {
                    best = Some(population[selected].clone());
                    best_score = scores[selected];
                    best_generation = generation;
                    tracing::info!(
                        generation,
                        score = best_score,
                        sample,
                        "new best candidate"
                    );
                }

                next.push(population[selected].clone());
                for _ in 0..n_children {
                    next.push(operator.mutate(&population[selected], sample, &mut rng));
                }
            }
            population = next;

            prob = if improved {
                (prob * self.config.success_factor).min(0.5)
            } else {
                (prob * self.config.decay_factor).max(prob_floor)
            };

            tracing::debug!(
                op = "generation",
                generation,
                elapsed_ms = started.elapsed().as_millis() as u64,
                step_size = sample,
                prob,
                "generation complete"
            );
            bar.inc(1);
        }
        bar.finish_and_clear();
        tracing::info!(best_score, best_generation, "evolution strategy ended");

        let best = best.ok_or(EngineError::NoCandidate)?;
        Ok(SearchOutcome {
            best_generation,
            best: best.stripped(),
            best_score,
        })
    }

    /// Score one candidate: Follow completion, feature derivation, and the
    /// discrepancy statistic. Pure with respect to the candidate.
    fn objective(&self, candidate: &EdgeList) -> Result<f64, MetricsError> {
        let options = FeatureOptions {
            weighted: self.config.weighted,
            scale: true,
        };
        let table = evaluate(candidate, &self.universe, &self.index, options)?;
        Ok(l2_star_discrepancy(&table))
    }

    fn progress_bar(&self) -> ProgressBar {
        if !self.config.progress {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(self.config.generations as u64);
        bar.set_style(
            ProgressStyle::with_template("{msg} {wide_bar} {pos}/{len} [{elapsed_precise}]")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        bar
    }
}

/// Draw this generation's mutation sample size from Binomial(n, p), floored
/// at 1 so every child differs from its parent.
fn draw_step_size(n: u64, prob: f64, rng: &mut StdRng) -> Result<usize, EngineError> {
    let binomial = Binomial::new(n, prob).map_err(|_| EngineError::StepSize { prob })?;
    Ok((binomial.sample(rng) as usize).max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TiePolicy;
    use edgeforge_model::{Interaction, RepoId, UserId};

    fn seed_dataset() -> Dataset {
        let universe = Universe::from_names(["u: a", "u: b", "u: c"], ["r: x", "r: y"]);
        let edges = EdgeList::from_interactions(vec![
            Interaction::new(UserId(0), RepoId(0), EventKind::Push),
            Interaction::new(UserId(1), RepoId(1), EventKind::Watch),
            Interaction::new(UserId(2), RepoId(0), EventKind::Fork),
        ]);
        Dataset { universe, edges }
    }

    fn quiet_config() -> EvolutionConfig {
        EvolutionConfig::default()
            .with_population(1, 4)
            .with_generations(2)
            .with_workers(2)
            .with_seed(42)
            .with_progress(false)
    }

    #[test]
    fn zero_generations_yields_no_candidate() {
        let engine = EvolutionEngine::new(seed_dataset(), quiet_config().with_generations(0))
            .unwrap();
        assert!(matches!(engine.run(), Err(EngineError::NoCandidate)));
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let result = EvolutionEngine::new(
            seed_dataset(),
            EvolutionConfig::default().with_population(0, 4),
        );
        assert!(matches!(result, Err(EngineError::InvalidConfig(_))));
    }

    #[test]
    fn best_score_never_increases_across_generations() {
        let dataset = seed_dataset();
        let first = EvolutionEngine::new(dataset.clone(), quiet_config().with_generations(1))
            .unwrap()
            .run()
            .unwrap();
        let second = EvolutionEngine::new(dataset, quiet_config().with_generations(2))
            .unwrap()
            .run()
            .unwrap();
        assert!(second.best_score <= first.best_score);
    }

    #[test]
    fn equal_seeds_reproduce_equal_runs() {
        let a = EvolutionEngine::new(seed_dataset(), quiet_config())
            .unwrap()
            .run()
            .unwrap();
        let b = EvolutionEngine::new(seed_dataset(), quiet_config())
            .unwrap()
            .run()
            .unwrap();
        assert_eq!(a.best_score, b.best_score);
        assert_eq!(a.best_generation, b.best_generation);
        assert_eq!(a.best, b.best);
    }

    #[test]
    fn best_is_returned_without_follow_edges() {
        let outcome = EvolutionEngine::new(seed_dataset(), quiet_config())
            .unwrap()
            .run()
            .unwrap();
        assert!(outcome.best.follows().is_empty());
        assert!(!outcome.best.interactions().is_empty());
    }

    #[test]
    fn permissive_ties_still_produce_a_best() {
        let config = quiet_config().with_tie_policy(TiePolicy::Permissive);
        let outcome = EvolutionEngine::new(seed_dataset(), config)
            .unwrap()
            .run()
            .unwrap();
        assert!(outcome.best_score.is_finite());
    }
}
