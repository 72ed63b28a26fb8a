//! Similarity-derived Follow completion.

use edgeforge_model::{EdgeList, FollowEdge, Universe, UserId};
use std::time::Instant;

/// Strip any existing Follow edges and re-derive the relation from the
/// bipartite interaction pattern.
///
/// Each user's outgoing profile is its vector of per-repository interaction
/// counts. The user-user matrix combines two directions over ordered pairs:
/// the outgoing (user→repo) cosine fills the strict lower triangle in
/// universe id order, and the incoming (repo-as-source) cosine fills the
/// strict upper one. Interactions are always user-sourced under the data
/// contract, so the incoming half carries no mass and that triangle stays
/// zero. The diagonal is zero, and any zero-norm profile compares as 0,
/// never NaN. Every strictly-positive cell becomes one directed Follow edge
/// weighted by the similarity.
///
/// Deterministic: depends only on the interaction pattern.
#[must_use]
pub fn complete(edges: &EdgeList, universe: &Universe) -> EdgeList {
    let started = Instant::now();
    let user_count = universe.user_count();
    let repo_count = universe.repo_count();

    let mut counts = vec![vec![0.0f64; repo_count]; user_count];
    for interaction in edges.interactions() {
        counts[interaction.user.0 as usize][interaction.repo.0 as usize] += 1.0;
    }
    let norms: Vec<f64> = counts
        .iter()
        .map(|row| row.iter().map(|c| c * c).sum::<f64>().sqrt())
        .collect();

    let mut follows = Vec::new();
    for source in 1..user_count {
        for target in 0..source {
            let weight = cosine(&counts[source], &counts[target], norms[source], norms[target]);
            if weight > 0.0 {
                follows.push(FollowEdge {
                    source: UserId(source as u32),
                    target: UserId(target as u32),
                    weight,
                });
            }
        }
    }

    let mut completed = edges.stripped();
    completed.set_follows(follows);
    tracing::debug!(
        op = "complete",
        elapsed_us = started.elapsed().as_micros() as u64,
        follows = completed.follows().len(),
        "derived follow relation"
    );
    completed
}

fn cosine(a: &[f64], b: &[f64], norm_a: f64, norm_b: f64) -> f64 {
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use edgeforge_model::{EventKind, Interaction, RepoId};
    use pretty_assertions::assert_eq;

    fn interaction(u: u32, r: u32, kind: EventKind) -> Interaction {
        Interaction::new(UserId(u), RepoId(r), kind)
    }

    #[test]
    fn identical_profiles_follow_with_weight_one() {
        // users A and B each push once to the same repo
        let universe = Universe::from_names(["u: a", "u: b"], ["r: x"]);
        let edges = EdgeList::from_interactions(vec![
            interaction(0, 0, EventKind::Push),
            interaction(1, 0, EventKind::Push),
        ]);

        let completed = complete(&edges, &universe);
        // the outgoing direction covers the lower triangle only; the
        // incoming direction has no repo-sourced interactions to draw on
        assert_eq!(completed.follows().len(), 1);
        let follow = completed.follows()[0];
        assert_eq!(follow.source, UserId(1));
        assert_eq!(follow.target, UserId(0));
        assert!((follow.weight - 1.0).abs() < 1e-12);
    }

    #[test]
    fn orthogonal_profiles_produce_no_follows() {
        let universe = Universe::from_names(["u: a", "u: b"], ["r: x", "r: y"]);
        let edges = EdgeList::from_interactions(vec![
            interaction(0, 0, EventKind::Push),
            interaction(1, 1, EventKind::Watch),
        ]);

        let completed = complete(&edges, &universe);
        assert!(completed.follows().is_empty());
    }

    #[test]
    fn zero_interaction_user_yields_zero_not_nan() {
        let universe = Universe::from_names(["u: a", "u: b", "u: c"], ["r: x"]);
        // user c has no interactions at all
        let edges = EdgeList::from_interactions(vec![
            interaction(0, 0, EventKind::Push),
            interaction(1, 0, EventKind::Push),
        ]);

        let completed = complete(&edges, &universe);
        assert!(completed.follows().iter().all(|f| f.weight.is_finite()));
        assert!(completed
            .follows()
            .iter()
            .all(|f| f.source != UserId(2) && f.target != UserId(2)));
    }

    #[test]
    fn existing_follows_are_stripped_and_rederived() {
        let universe = Universe::from_names(["u: a", "u: b"], ["r: x"]);
        let mut edges = EdgeList::from_interactions(vec![
            interaction(0, 0, EventKind::Push),
            interaction(1, 0, EventKind::Push),
        ]);
        edges.set_follows(vec![FollowEdge {
            source: UserId(0),
            target: UserId(1),
            weight: 0.123,
        }]);

        let completed = complete(&edges, &universe);
        assert_eq!(completed.follows().len(), 1);
        assert_eq!(completed.follows()[0].source, UserId(1));
    }

    #[test]
    fn completion_is_deterministic() {
        let universe = Universe::from_names(["u: a", "u: b", "u: c"], ["r: x", "r: y"]);
        let edges = EdgeList::from_interactions(vec![
            interaction(0, 0, EventKind::Push),
            interaction(1, 0, EventKind::Fork),
            interaction(1, 1, EventKind::Watch),
            interaction(2, 1, EventKind::Push),
        ]);

        let first = complete(&edges, &universe);
        let second = complete(&edges, &universe);
        assert_eq!(first.follows(), second.follows());
    }

    #[test]
    fn partial_overlap_uses_cosine_of_count_vectors() {
        let universe = Universe::from_names(["u: a", "u: b"], ["r: x", "r: y"]);
        // a: (1, 1), b: (1, 0) → cos = 1/√2
        let edges = EdgeList::from_interactions(vec![
            interaction(0, 0, EventKind::Push),
            interaction(0, 1, EventKind::Push),
            interaction(1, 0, EventKind::Push),
        ]);

        let completed = complete(&edges, &universe);
        assert_eq!(completed.follows().len(), 1);
        let expected = 1.0 / 2f64.sqrt();
        assert!((completed.follows()[0].weight - expected).abs() < 1e-12);
    }
}
