//! Copy-on-mutate edge lists.

use crate::event::EventKind;
use crate::universe::{RepoId, Universe, UserId};

/// An observed typed user→repository edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Interaction {
    /// Acting user
    pub user: UserId,
    /// Target repository
    pub repo: RepoId,
    /// Interaction kind (never `Follow`)
    pub kind: EventKind,
}

impl Interaction {
    /// Create a new interaction edge.
    #[inline]
    #[must_use]
    pub fn new(user: UserId, repo: RepoId, kind: EventKind) -> Self {
        Self { user, repo, kind }
    }
}

/// A derived user→user similarity edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FollowEdge {
    /// Following user
    pub source: UserId,
    /// Followed user
    pub target: UserId,
    /// Behavioral similarity in (0, 1]
    pub weight: f64,
}

/// Ordered multiset of edges; the unit of state copied, mutated, and scored.
///
/// Value semantics throughout: mutation and Follow completion produce new
/// lists, population members are never modified in place. Observed
/// interactions and derived follows are kept apart so stripping and
/// regenerating the Follow relation cannot disturb the observed edges.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeList {
    interactions: Vec<Interaction>,
    follows: Vec<FollowEdge>,
}

impl EdgeList {
    /// Build a list of observed interactions with no Follow edges.
    #[inline]
    #[must_use]
    pub fn from_interactions(interactions: Vec<Interaction>) -> Self {
        Self {
            interactions,
            follows: Vec::new(),
        }
    }

    /// Observed interactions, in insertion order.
    #[inline]
    #[must_use]
    pub fn interactions(&self) -> &[Interaction] {
        &self.interactions
    }

    /// Derived Follow edges, empty until completion.
    #[inline]
    #[must_use]
    pub fn follows(&self) -> &[FollowEdge] {
        &self.follows
    }

    /// Append one observed interaction.
    #[inline]
    pub fn push(&mut self, interaction: Interaction) {
        self.interactions.push(interaction);
    }

    /// Copy of this list without any Follow edges.
    #[must_use]
    pub fn stripped(&self) -> Self {
        Self {
            interactions: self.interactions.clone(),
            follows: Vec::new(),
        }
    }

    /// Replace the derived Follow relation wholesale.
    #[inline]
    pub fn set_follows(&mut self, follows: Vec<FollowEdge>) {
        self.follows = follows;
    }

    /// Number of observed interactions.
    #[inline]
    #[must_use]
    pub fn interaction_count(&self) -> usize {
        self.interactions.len()
    }

    /// Total edge count, observed plus derived.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.interactions.len() + self.follows.len()
    }

    /// Whether the list holds no edges at all.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.interactions.is_empty() && self.follows.is_empty()
    }

    /// Distinct interaction kinds in order of first appearance.
    #[must_use]
    pub fn kinds(&self) -> Vec<EventKind> {
        let mut kinds = Vec::new();
        for interaction in &self.interactions {
            if !kinds.contains(&interaction.kind) {
                kinds.push(interaction.kind);
            }
        }
        kinds
    }

    /// Whether the observed interactions still touch every user and every
    /// repository of the universe at least once.
    #[must_use]
    pub fn covers(&self, universe: &Universe) -> bool {
        let mut users_seen = vec![false; universe.user_count()];
        let mut repos_seen = vec![false; universe.repo_count()];
        let mut users_left = universe.user_count();
        let mut repos_left = universe.repo_count();

        for interaction in &self.interactions {
            let u = interaction.user.0 as usize;
            if !users_seen[u] {
                users_seen[u] = true;
                users_left -= 1;
            }
            let r = interaction.repo.0 as usize;
            if !repos_seen[r] {
                repos_seen[r] = true;
                repos_left -= 1;
            }
            if users_left == 0 && repos_left == 0 {
                return true;
            }
        }
        users_left == 0 && repos_left == 0
    }
}
