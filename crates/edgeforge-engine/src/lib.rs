//! EdgeForge engine
//!
//! The self-adaptive (μ+λ) evolution strategy over activity edge lists:
//! - Population management with elitist selection
//! - Constraint-preserving mutation with pluggable kind-selection policies
//! - Parallel fitness evaluation over a run-scoped worker pool
//! - Binomial step-size draws adapted by recent search success
//!
//! # Example
//!
//! ```rust,ignore
//! use edgeforge_engine::{EvolutionConfig, EvolutionEngine};
//! use edgeforge_model::read_edge_list;
//!
//! let dataset = read_edge_list("activity.csv")?;
//! let config = EvolutionConfig::new().with_generations(200);
//! let outcome = EvolutionEngine::new(dataset, config)?.run()?;
//! println!("best score {} at generation {}", outcome.best_score, outcome.best_generation);
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod mutation;

pub use config::{EvolutionConfig, KindPolicy, TiePolicy};
pub use engine::{EvolutionEngine, SearchOutcome};
pub use error::EngineError;
pub use mutation::MutationOperator;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for running a search
    pub use crate::{EvolutionConfig, EvolutionEngine, KindPolicy, SearchOutcome, TiePolicy};
    pub use edgeforge_model::{read_edge_list, write_edge_list, Dataset, EdgeList};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
