//! EdgeForge metrics
//!
//! The scoring pipeline applied to every candidate edge list:
//! - Follow completion from behavioral (cosine) similarity
//! - Directed-graph feature derivation: PageRank, total degree, and the
//!   activity-signature code per user, min-max scaled to the unit cube
//! - The L2-star discrepancy objective over the resulting point cloud

pub mod discrepancy;
pub mod error;
pub mod features;
pub mod similarity;

pub use discrepancy::l2_star_discrepancy;
pub use error::MetricsError;
pub use features::{evaluate, FeatureOptions, FeatureRow, FeatureTable};
pub use similarity::complete;
