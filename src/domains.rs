//! The domain store: the set of candidate words still considered possible for each variable.

use bit_set::BitSet;

use crate::model::Crossword;
use crate::types::{VariableId, WordId};

/// Candidate words for each variable, stored as a bit set of `WordId`s. Cloning a `Domains` is how
/// callers take a snapshot they can restore later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domains {
    by_variable: Vec<BitSet>,
}

impl Domains {
    /// Seed every variable's domain with the full vocabulary.
    #[must_use]
    pub fn initialize(crossword: &Crossword) -> Domains {
        let word_count = crossword.words().len();

        Domains {
            by_variable: crossword.variables().iter().map(|_| (0..word_count).collect()).collect(),
        }
    }

    /// Initialize and apply node consistency in one step.
    #[must_use]
    pub fn new(crossword: &Crossword) -> Domains {
        let mut domains = Domains::initialize(crossword);
        domains.enforce_node_consistency(crossword);
        domains
    }

    /// Remove every word whose length differs from its variable's length. There are no
    /// cross-variable effects, so this only ever needs to run once. Returns the number of words
    /// removed across all variables.
    pub fn enforce_node_consistency(&mut self, crossword: &Crossword) -> usize {
        let mut removed = 0;

        for (variable_id, domain) in self.by_variable.iter_mut().enumerate() {
            let length = crossword.variable(variable_id).length;
            let mismatched: Vec<WordId> =
                domain.iter().filter(|&word_id| crossword.word(word_id).len() != length).collect();

            for word_id in mismatched {
                domain.remove(word_id);
                removed += 1;
            }
        }

        removed
    }

    #[must_use]
    pub fn domain_of(&self, variable_id: VariableId) -> &BitSet {
        &self.by_variable[variable_id]
    }

    #[must_use]
    pub fn len(&self, variable_id: VariableId) -> usize {
        self.by_variable[variable_id].len()
    }

    #[must_use]
    pub fn is_empty(&self, variable_id: VariableId) -> bool {
        self.by_variable[variable_id].is_empty()
    }

    #[must_use]
    pub fn contains(&self, variable_id: VariableId, word_id: WordId) -> bool {
        self.by_variable[variable_id].contains(word_id)
    }

    /// Remove a single word from a variable's domain, returning whether it was present.
    pub fn remove(&mut self, variable_id: VariableId, word_id: WordId) -> bool {
        self.by_variable[variable_id].remove(word_id)
    }

    /// Shrink a variable's domain down to `word_id`. If the word isn't in the domain the domain
    /// becomes empty, since domains never grow. Returns whether anything was removed.
    pub fn restrict_to(&mut self, variable_id: VariableId, word_id: WordId) -> bool {
        let domain = &mut self.by_variable[variable_id];
        let had_word = domain.contains(word_id);
        let before = domain.len();

        domain.clear();
        if had_word {
            domain.insert(word_id);
        }

        domain.len() != before
    }

    /// The candidate strings for a variable, in `WordId` order.
    pub fn words_of<'a>(
        &'a self,
        crossword: &'a Crossword,
        variable_id: VariableId,
    ) -> impl Iterator<Item = &'a str> + 'a {
        self.by_variable[variable_id].iter().map(move |word_id| crossword.word(word_id).string.as_str())
    }

    /// Sum of all domain sizes.
    #[must_use]
    pub fn total_len(&self) -> usize {
        self.by_variable.iter().map(BitSet::len).sum()
    }

    #[must_use]
    pub fn variable_count(&self) -> usize {
        self.by_variable.len()
    }
}
