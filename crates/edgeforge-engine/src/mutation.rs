//! Constraint-preserving edge-list mutation.

use crate::config::KindPolicy;
use edgeforge_metrics::similarity;
use edgeforge_model::{EdgeList, EventKind, Interaction, RepoId, Universe, UserId};
use rand::rngs::StdRng;
use rand::seq::index;
use rand::Rng;
use std::time::{Duration, Instant};

/// Mutates edge lists by random edge surgery while preserving the hard
/// coverage invariants: no user and no repository ever loses its last
/// observed interaction.
///
/// Holds only read-only shared state; the RNG comes in per call so the
/// engine controls seeding and reproducibility.
#[derive(Debug)]
pub struct MutationOperator<'a> {
    universe: &'a Universe,
    vocabulary: &'a [EventKind],
    kind_policy: KindPolicy,
    delete_timeout: Duration,
}

impl<'a> MutationOperator<'a> {
    /// Create an operator over the fixed universe and event vocabulary.
    #[inline]
    #[must_use]
    pub fn new(
        universe: &'a Universe,
        vocabulary: &'a [EventKind],
        kind_policy: KindPolicy,
        delete_timeout: Duration,
    ) -> Self {
        Self {
            universe,
            vocabulary,
            kind_policy,
            delete_timeout,
        }
    }

    /// Produce a mutated copy of `edges`.
    ///
    /// The perturbation budget `sample` splits into additions and deletions
    /// with additions always taking the larger share. Additions append
    /// random (user, repo, kind) triples; deletions remove random positions
    /// and are accepted only if every user and repository stays covered,
    /// retrying with a shrinking delete count under a wall-clock ceiling.
    /// On timeout the list as of the last successful add step is kept, so
    /// the universe can never shrink. Follow edges are regenerated before
    /// returning.
    ///
    /// Expects `edges` to cover the universe, which holds inductively from
    /// the seed onward.
    #[must_use]
    pub fn mutate(&self, edges: &EdgeList, sample: usize, rng: &mut StdRng) -> EdgeList {
        let started = Instant::now();
        let split = rng.gen_range(0..=sample);
        let additions = split.max(sample - split);
        let mut deletions = split.min(sample - split);

        let mut mutated = edges.stripped();
        for _ in 0..additions {
            let user = UserId(rng.gen_range(0..self.universe.user_count() as u32));
            let repo = RepoId(rng.gen_range(0..self.universe.repo_count() as u32));
            let kind = self.pick_kind(mutated.interactions(), rng);
            mutated.push(Interaction::new(user, repo, kind));
        }

        if deletions > 0 {
            let deadline = started + self.delete_timeout;
            loop {
                if deletions == 0 || Instant::now() >= deadline {
                    tracing::warn!(
                        additions,
                        deletions,
                        "deletion constraint unsatisfied, keeping additions only"
                    );
                    break;
                }
                let candidate = remove_random(&mutated, deletions, rng);
                if candidate.covers(self.universe) {
                    mutated = candidate;
                    break;
                }
                // shrink to make the constraint easier on the next draw
                deletions -= 1;
            }
        }

        let completed = similarity::complete(&mutated, self.universe);
        tracing::debug!(
            op = "mutate",
            elapsed_us = started.elapsed().as_micros() as u64,
            additions,
            edges = completed.interaction_count(),
            "mutated candidate"
        );
        completed
    }

    /// Pick the kind of a new interaction according to the configured
    /// policy.
    fn pick_kind(&self, current: &[Interaction], rng: &mut StdRng) -> EventKind {
        match self.kind_policy {
            KindPolicy::Uniform => self.vocabulary[rng.gen_range(0..self.vocabulary.len())],
            KindPolicy::RarityBiased => {
                if self.vocabulary.len() == 1 {
                    return self.vocabulary[0];
                }
                let rarest = self.rarest_kind(current);
                if rng.gen_bool(0.5) {
                    rarest
                } else {
                    let others: Vec<EventKind> = self
                        .vocabulary
                        .iter()
                        .copied()
                        .filter(|&k| k != rarest)
                        .collect();
                    others[rng.gen_range(0..others.len())]
                }
            }
        }
    }

    /// The vocabulary kind with the fewest occurrences in `current`,
    /// first-listed wins ties.
    fn rarest_kind(&self, current: &[Interaction]) -> EventKind {
        let mut counts = vec![0usize; self.vocabulary.len()];
        for interaction in current {
            if let Some(pos) = self.vocabulary.iter().position(|&k| k == interaction.kind) {
                counts[pos] += 1;
            }
        }
        let rarest = counts
            .iter()
            .enumerate()
            .min_by_key(|&(_, count)| count)
            .map_or(0, |(pos, _)| pos);
        self.vocabulary[rarest]
    }
}

/// Copy of `edges` with `count` random interaction positions removed,
/// sampled without replacement.
fn remove_random(edges: &EdgeList, count: usize, rng: &mut StdRng) -> EdgeList {
    let len = edges.interaction_count();
    let count = count.min(len);
    let mut removed = vec![false; len];
    for idx in index::sample(rng, len, count) {
        removed[idx] = true;
    }
    EdgeList::from_interactions(
        edges
            .interactions()
            .iter()
            .enumerate()
            .filter(|(i, _)| !removed[*i])
            .map(|(_, interaction)| *interaction)
            .collect(),
    )
}
