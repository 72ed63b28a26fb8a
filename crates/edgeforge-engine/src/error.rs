//! Error types for the evolution engine.

use edgeforge_metrics::MetricsError;

/// Errors surfaced by the evolution engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The parameter combination is unusable
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Worker pool construction failed
    #[error("worker pool error: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),

    /// A worker failed while scoring a candidate; indicates a logic defect
    /// in mutation or metrics, so the run aborts
    #[error("scoring failed at generation {generation}: {source}")]
    Scoring {
        /// Generation being evaluated when the failure surfaced
        generation: usize,
        /// The underlying metrics failure
        #[source]
        source: MetricsError,
    },

    /// The step-size distribution rejected its parameters
    #[error("step-size distribution rejected p = {prob}")]
    StepSize {
        /// The offending probability
        prob: f64,
    },

    /// The search finished without evaluating any candidate
    #[error("no candidate evaluated: generation budget is zero")]
    NoCandidate,
}
