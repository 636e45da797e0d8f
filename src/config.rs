/// How the search picks the next variable to fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VariableOrdering {
    /// Fewest remaining candidates first, then most neighbors, then lowest id.
    #[default]
    MinimumRemainingValues,

    /// Lowest unassigned id first.
    Declaration,
}

/// How the search orders candidate words for the chosen variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueOrdering {
    /// Words that rule out the fewest options in unassigned neighbors first, ties by word id.
    #[default]
    LeastConstraining,

    /// Ascending word id, i.e. vocabulary order.
    Vocabulary,
}

/// Knobs for `find_fill`. The defaults are what `solve` uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverConfig {
    pub variable_ordering: VariableOrdering,
    pub value_ordering: ValueOrdering,

    /// Re-run arc consistency after each tentative choice. Every branch works on its own copy of
    /// the domains, so siblings never see each other's pruning.
    pub maintain_arc_consistency: bool,

    /// Give up after trying this many candidate words.
    pub state_limit: Option<u64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            variable_ordering: VariableOrdering::default(),
            value_ordering: ValueOrdering::default(),
            maintain_arc_consistency: true,
            state_limit: None,
        }
    }
}
