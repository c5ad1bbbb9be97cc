use thiserror::Error;

use crate::entity::Category;

/// Why a pair of entities has no measurement.
///
/// Callers of [`crate::resolve`] only see an empty [`crate::Relation`]; the
/// variants matter for logging and tests.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RelationFailure {
    #[error("No relation between {first:?} and {second:?}: {reason}")]
    Unsupported {
        first: Category,
        second: Category,
        reason: &'static str,
    },

    #[error("Degenerate configuration: {reason}")]
    Degenerate { reason: &'static str },

    #[error("Nearest-point search did not converge after {iterations} iterations (gradient: {gradient})")]
    NotConverged { iterations: usize, gradient: f64 },
}
