//! Fixed node universe established at ingestion.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Dense index of a user within the [`Universe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub u32);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "u#{}", self.0)
    }
}

/// Dense index of a repository within the [`Universe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RepoId(pub u32);

impl std::fmt::Display for RepoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "r#{}", self.0)
    }
}

/// The immutable sets of users and repositories a search runs over.
///
/// Both sets are fixed once, from the seed edge list, in order of first
/// appearance; ids are dense indices into that order. Nothing downstream may
/// grow or shrink either set for the lifetime of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Universe {
    users: IndexSet<String>,
    repos: IndexSet<String>,
}

impl Universe {
    /// Build a universe from explicit name lists, preserving order.
    pub fn from_names<U, R>(users: U, repos: R) -> Self
    where
        U: IntoIterator,
        U::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        Self {
            users: users.into_iter().map(Into::into).collect(),
            repos: repos.into_iter().map(Into::into).collect(),
        }
    }

    /// Intern a user name, returning its dense id.
    pub(crate) fn insert_user(&mut self, name: &str) -> UserId {
        let (idx, _) = self.users.insert_full(name.to_owned());
        UserId(idx as u32)
    }

    /// Intern a repository name, returning its dense id.
    pub(crate) fn insert_repo(&mut self, name: &str) -> RepoId {
        let (idx, _) = self.repos.insert_full(name.to_owned());
        RepoId(idx as u32)
    }

    /// Name of a user id.
    ///
    /// Ids handed out by this universe are always valid; the fallback covers
    /// ids fabricated by callers.
    #[inline]
    #[must_use]
    pub fn user_name(&self, id: UserId) -> &str {
        self.users
            .get_index(id.0 as usize)
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Name of a repository id.
    #[inline]
    #[must_use]
    pub fn repo_name(&self, id: RepoId) -> &str {
        self.repos
            .get_index(id.0 as usize)
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Number of users.
    #[inline]
    #[must_use]
    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    /// Number of repositories.
    #[inline]
    #[must_use]
    pub fn repo_count(&self) -> usize {
        self.repos.len()
    }

    /// Total node count, users plus repositories.
    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.users.len() + self.repos.len()
    }

    /// All user ids in universe order.
    pub fn users(&self) -> impl Iterator<Item = UserId> + '_ {
        (0..self.users.len() as u32).map(UserId)
    }

    /// All repository ids in universe order.
    pub fn repos(&self) -> impl Iterator<Item = RepoId> + '_ {
        (0..self.repos.len() as u32).map(RepoId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insertion_order_fixes_ids() {
        let mut universe = Universe::default();
        let a = universe.insert_user("u: alice");
        let b = universe.insert_user("u: bob");
        assert_eq!(a, UserId(0));
        assert_eq!(b, UserId(1));
        // re-inserting an existing name keeps its id
        assert_eq!(universe.insert_user("u: alice"), a);
        assert_eq!(universe.user_count(), 2);
    }

    #[test]
    fn names_round_trip() {
        let universe = Universe::from_names(["u: alice"], ["r: proj"]);
        assert_eq!(universe.user_name(UserId(0)), "u: alice");
        assert_eq!(universe.repo_name(RepoId(0)), "r: proj");
        assert_eq!(universe.node_count(), 2);
    }
}
