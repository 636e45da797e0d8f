//! A constraint-satisfaction solver that fills crossword slots with words from a vocabulary.
//!
//! The pipeline is: build a [`Crossword`] model, seed [`Domains`] and filter them by length (node
//! consistency), shrink them with AC-3 ([`arc_consistency`]), then run a backtracking search
//! guided by minimum-remaining-values and least-constraining-value ordering
//! ([`backtracking_search`]).

pub mod arc_consistency;
pub mod backtracking_search;
pub mod config;
pub mod domains;
pub mod errors;
pub mod model;
pub mod types;

pub use backtracking_search::{
    establish_initial_consistency, find_fill, solve, Assignment, FillSuccess, Statistics,
};
pub use config::{SolverConfig, ValueOrdering, VariableOrdering};
pub use domains::Domains;
pub use errors::{FillFailure, ModelError};
pub use model::{Crossword, Direction, Overlap, Variable, Word};
pub use types::{GlyphId, VariableId, WordId};

/// The expected maximum number of distinct characters appearing in a vocabulary.
pub const MAX_GLYPH_COUNT: usize = 256;

/// The maximum number of variables (slots) a crossword may have.
pub const MAX_SLOT_COUNT: usize = 256;

/// The expected maximum length for a single variable. Longer variables are allowed; their
/// `SmallVec` buffers just spill to the heap.
pub const MAX_SLOT_LENGTH: usize = 21;
