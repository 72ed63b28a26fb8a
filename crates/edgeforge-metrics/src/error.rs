//! Error types for feature derivation.

use edgeforge_model::UserId;

/// Errors raised while deriving per-user features.
///
/// A scoring failure inside the search indicates a logic defect in mutation
/// or metrics, not a transient condition; the engine treats it as fatal.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// A user has no observed interactions, so no signature code exists
    #[error("no activity signature for user {user}: user has no interactions")]
    MissingSignature {
        /// The uncovered user
        user: UserId,
    },
}
