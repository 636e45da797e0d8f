//! Error types for building a puzzle model and for fills that don't produce a solution.

use crate::model::Variable;
use crate::types::VariableId;

/// Precondition violations detected while building a `Crossword`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("variable at ({row}, {col}) has zero length")]
    ZeroLengthVariable { row: usize, col: usize },

    #[error("variable {variable:?} appears more than once")]
    DuplicateVariable { variable: Variable },

    #[error("variables {first} and {second} share more than one cell")]
    MultipleOverlaps { first: VariableId, second: VariableId },

    #[error("puzzle has {count} variables, more than the maximum of {max}")]
    TooManyVariables { count: usize, max: usize },
}

/// The ways a fill attempt can end without a complete assignment. Apart from
/// `StateLimitExceeded`, these all mean the puzzle has no solution.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FillFailure {
    #[error("no vocabulary word fits variable {variable_id}")]
    EmptyDomain { variable_id: VariableId },

    #[error("arc consistency emptied the domain of variable {variable_id}")]
    ArcInconsistent { variable_id: VariableId },

    #[error("search exhausted every branch without finding a fill")]
    Exhausted,

    #[error("search gave up after trying {states} candidates")]
    StateLimitExceeded { states: u64 },
}

impl FillFailure {
    /// Is this failure a proof that the puzzle can't be filled (as opposed to the search giving
    /// up early)?
    #[must_use]
    pub fn is_unsatisfiable(&self) -> bool {
        !matches!(self, FillFailure::StateLimitExceeded { .. })
    }
}
