//! Backtracking search over partial assignments. Variables are chosen by minimum remaining values
//! (ties broken by degree), candidate words by least-constraining value, and every tentative
//! choice is checked against the words already placed before we recurse.
//!
//! When `maintain_arc_consistency` is enabled, each choice also prunes the other domains. That
//! pruning happens on a snapshot that is thrown away if the branch fails, so sibling candidates
//! always start from the same domains.

use bit_set::BitSet;
use instant::{Duration, Instant};
use log::{debug, trace};
use smallvec::SmallVec;

use crate::arc_consistency::{enforce_arc_consistency, ArcConsistencyFailure, DirectedArc};
use crate::config::{SolverConfig, ValueOrdering, VariableOrdering};
use crate::domains::Domains;
use crate::errors::FillFailure;
use crate::model::{Crossword, Overlap, Variable};
use crate::types::{VariableId, WordId};
use crate::MAX_SLOT_LENGTH;

/// A struct recording a single variable assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    pub variable_id: VariableId,
    pub word_id: WordId,
}

/// A possibly partial mapping from variables to words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    words_by_variable: Vec<Option<WordId>>,
    assigned_count: usize,
}

impl Assignment {
    /// An empty assignment for a puzzle with `variable_count` variables.
    #[must_use]
    pub fn new(variable_count: usize) -> Assignment {
        Assignment { words_by_variable: vec![None; variable_count], assigned_count: 0 }
    }

    /// Set a variable's word, returning the word it replaced.
    pub fn assign(&mut self, variable_id: VariableId, word_id: WordId) -> Option<WordId> {
        let previous = self.words_by_variable[variable_id].replace(word_id);
        if previous.is_none() {
            self.assigned_count += 1;
        }
        previous
    }

    pub fn unassign(&mut self, variable_id: VariableId) -> Option<WordId> {
        let previous = self.words_by_variable[variable_id].take();
        if previous.is_some() {
            self.assigned_count -= 1;
        }
        previous
    }

    #[must_use]
    pub fn get(&self, variable_id: VariableId) -> Option<WordId> {
        self.words_by_variable.get(variable_id).copied().flatten()
    }

    #[must_use]
    pub fn is_assigned(&self, variable_id: VariableId) -> bool {
        self.get(variable_id).is_some()
    }

    #[must_use]
    pub fn word<'a>(&self, crossword: &'a Crossword, variable_id: VariableId) -> Option<&'a str> {
        self.get(variable_id).map(|word_id| crossword.word(word_id).string.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.assigned_count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assigned_count == 0
    }

    /// Does every variable have a word?
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.assigned_count == self.words_by_variable.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Choice> + '_ {
        self.words_by_variable.iter().enumerate().filter_map(|(variable_id, word_id)| {
            word_id.map(|word_id| Choice { variable_id, word_id })
        })
    }

    /// The assigned variables paired with their words, in variable order.
    #[must_use]
    pub fn words<'a>(&self, crossword: &'a Crossword) -> Vec<(&'a Variable, &'a str)> {
        self.iter()
            .map(|Choice { variable_id, word_id }| {
                (crossword.variable(variable_id), crossword.word(word_id).string.as_str())
            })
            .collect()
    }

    /// Check the whole assignment: words are pairwise distinct, every word has its variable's
    /// length, and every pair of assigned, overlapping variables agrees on the shared cell.
    #[must_use]
    pub fn is_consistent(&self, crossword: &Crossword) -> bool {
        let mut used_words = BitSet::with_capacity(crossword.words().len());

        for Choice { variable_id, word_id } in self.iter() {
            if !used_words.insert(word_id) {
                return false;
            }
            if crossword.word(word_id).len() != crossword.variable(variable_id).length {
                return false;
            }
            for &neighbor_id in crossword.neighbors(variable_id) {
                if let Some(neighbor_word_id) = self.get(neighbor_id) {
                    if !words_agree(crossword, variable_id, word_id, neighbor_id, neighbor_word_id) {
                        return false;
                    }
                }
            }
        }

        true
    }

    /// Would the assignment stay consistent if `variable_id` were set to `word_id`? This only
    /// checks the new entry against the existing ones, so it's equivalent to `is_consistent` on
    /// the extended assignment as long as the current assignment is consistent.
    #[must_use]
    pub fn is_consistent_with(
        &self,
        crossword: &Crossword,
        variable_id: VariableId,
        word_id: WordId,
    ) -> bool {
        if crossword.word(word_id).len() != crossword.variable(variable_id).length {
            return false;
        }

        let duplicate = self
            .iter()
            .any(|choice| choice.variable_id != variable_id && choice.word_id == word_id);
        if duplicate {
            return false;
        }

        crossword.neighbors(variable_id).iter().all(|&neighbor_id| {
            self.get(neighbor_id).map_or(true, |neighbor_word_id| {
                words_agree(crossword, variable_id, word_id, neighbor_id, neighbor_word_id)
            })
        })
    }
}

/// Do two words placed in overlapping variables have the same glyph in the shared cell?
fn words_agree(
    crossword: &Crossword,
    x: VariableId,
    x_word_id: WordId,
    y: VariableId,
    y_word_id: WordId,
) -> bool {
    let Some(Overlap { index, other_index }) = crossword.overlap(x, y) else {
        return true;
    };

    match (
        crossword.word(x_word_id).glyphs.get(index),
        crossword.word(y_word_id).glyphs.get(other_index),
    ) {
        (Some(x_glyph), Some(y_glyph)) => x_glyph == y_glyph,
        _ => false,
    }
}

/// A struct tracking statistics about the filling process.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    /// Candidate words tried.
    pub states: u64,

    /// Candidates that were placed and later taken back.
    pub backtracks: u64,

    /// Calls to `revise`, both before and during search.
    pub revisions: u64,

    pub duration: Duration,
}

/// A struct representing the results of a fill operation.
#[derive(Debug, Clone)]
pub struct FillSuccess {
    pub statistics: Statistics,
    pub assignment: Assignment,
}

/// Choose the next variable to fill, or `None` if every variable is assigned.
#[must_use]
pub fn select_unassigned_variable(
    crossword: &Crossword,
    domains: &Domains,
    assignment: &Assignment,
    ordering: VariableOrdering,
) -> Option<VariableId> {
    let mut unassigned =
        (0..crossword.variable_count()).filter(|&variable_id| !assignment.is_assigned(variable_id));

    match ordering {
        VariableOrdering::Declaration => unassigned.next(),

        // Smallest domain first; among those, the variable crossing the most others. `min_by_key`
        // keeps the first of equal keys, so any remaining tie goes to the lowest id.
        VariableOrdering::MinimumRemainingValues => unassigned.min_by_key(|&variable_id| {
            (domains.len(variable_id), std::cmp::Reverse(crossword.degree(variable_id)))
        }),
    }
}

/// Return the candidate words for `variable_id`, in the order the search should try them.
#[must_use]
pub fn order_domain_values(
    crossword: &Crossword,
    domains: &Domains,
    assignment: &Assignment,
    variable_id: VariableId,
    ordering: ValueOrdering,
) -> Vec<WordId> {
    let mut candidates: Vec<WordId> = domains.domain_of(variable_id).iter().collect();

    if ordering == ValueOrdering::Vocabulary {
        return candidates;
    }

    // For each unassigned neighbor, count how many of its options place each glyph in the shared
    // cell. A candidate eliminates every option that doesn't have the candidate's glyph there.
    // Already-assigned neighbors are left out, since their options no longer matter.
    struct NeighborGlyphCounts {
        index: usize,
        option_count: usize,
        glyph_counts: Vec<usize>,
    }

    let neighbor_glyph_counts: SmallVec<[NeighborGlyphCounts; MAX_SLOT_LENGTH]> = crossword
        .neighbors(variable_id)
        .iter()
        .filter(|&&neighbor_id| !assignment.is_assigned(neighbor_id))
        .filter_map(|&neighbor_id| {
            let overlap = crossword.overlap(variable_id, neighbor_id)?;
            let mut glyph_counts = vec![0; crossword.glyph_count()];
            for word_id in domains.domain_of(neighbor_id) {
                if let Some(&glyph) = crossword.word(word_id).glyphs.get(overlap.other_index) {
                    glyph_counts[glyph] += 1;
                }
            }

            Some(NeighborGlyphCounts {
                index: overlap.index,
                option_count: domains.len(neighbor_id),
                glyph_counts,
            })
        })
        .collect();

    // `sort_by_cached_key` is stable, so equally disruptive words stay in word id order.
    candidates.sort_by_cached_key(|&word_id| {
        let word = crossword.word(word_id);

        neighbor_glyph_counts
            .iter()
            .map(|neighbor| {
                let compatible = word
                    .glyphs
                    .get(neighbor.index)
                    .map_or(0, |&glyph| neighbor.glyph_counts[glyph]);
                neighbor.option_count - compatible
            })
            .sum::<usize>()
    });

    candidates
}

/// Seed the domains, apply node consistency, and make the whole puzzle arc consistent.
fn initial_domains(crossword: &Crossword, statistics: &mut Statistics) -> Result<Domains, FillFailure> {
    let mut domains = Domains::initialize(crossword);
    let removed = domains.enforce_node_consistency(crossword);
    debug!(
        "node consistency removed {removed} options, {} remain across {} variables",
        domains.total_len(),
        crossword.variable_count(),
    );

    // A variable with no crossings never gets revised, so an empty domain has to be caught here.
    if let Some(variable_id) = (0..crossword.variable_count()).find(|&v| domains.is_empty(v)) {
        debug!("no word fits variable {variable_id} ({:?})", crossword.variable(variable_id));
        return Err(FillFailure::EmptyDomain { variable_id });
    }

    match enforce_arc_consistency(crossword, &mut domains, None) {
        Ok(success) => {
            statistics.revisions += success.revisions;
            debug!(
                "arc consistency removed {} options in {} revisions, {} remain",
                success.eliminations,
                success.revisions,
                domains.total_len(),
            );
            Ok(domains)
        }
        Err(failure) => {
            statistics.revisions += failure.revisions;
            debug!("arc consistency emptied variable {}", failure.variable_id);
            Err(failure.into())
        }
    }
}

/// Run the pre-search pipeline on its own, returning the pruned domains.
pub fn establish_initial_consistency(crossword: &Crossword) -> Result<Domains, FillFailure> {
    initial_domains(crossword, &mut Statistics::default())
}

struct Search<'a> {
    crossword: &'a Crossword,
    config: &'a SolverConfig,
    statistics: Statistics,
}

impl<'a> Search<'a> {
    /// Try to extend `assignment` to a complete one. Returns `Ok(false)` when every branch below
    /// this state fails; `Err` only for running out of states.
    fn backtrack(
        &mut self,
        assignment: &mut Assignment,
        domains: &mut Domains,
    ) -> Result<bool, FillFailure> {
        if assignment.is_complete() {
            return Ok(true);
        }

        let Some(variable_id) = select_unassigned_variable(
            self.crossword,
            domains,
            assignment,
            self.config.variable_ordering,
        ) else {
            return Ok(true);
        };

        let candidates = order_domain_values(
            self.crossword,
            domains,
            assignment,
            variable_id,
            self.config.value_ordering,
        );
        trace!(
            "depth {}: variable {variable_id} has {} candidates",
            assignment.len(),
            candidates.len(),
        );

        for word_id in candidates {
            if let Some(limit) = self.config.state_limit {
                if self.statistics.states >= limit {
                    return Err(FillFailure::StateLimitExceeded { states: self.statistics.states });
                }
            }
            self.statistics.states += 1;

            if !assignment.is_consistent_with(self.crossword, variable_id, word_id) {
                continue;
            }

            assignment.assign(variable_id, word_id);
            trace!("trying {:?} for variable {variable_id}", self.crossword.word(word_id).string);

            let found = if self.config.maintain_arc_consistency {
                let snapshot = domains.clone();
                let found = match self.infer(assignment, domains, variable_id, word_id) {
                    Ok(()) => self.backtrack(assignment, domains)?,
                    Err(failure) => {
                        trace!("choice empties variable {}", failure.variable_id);
                        false
                    }
                };
                if !found {
                    *domains = snapshot;
                }
                found
            } else {
                self.backtrack(assignment, domains)?
            };

            if found {
                return Ok(true);
            }

            assignment.unassign(variable_id);
            self.statistics.backtracks += 1;
        }

        Ok(false)
    }

    /// Prune the domains to reflect a new choice: the chosen variable keeps only its word, no
    /// other unassigned variable may use the same word, and arc consistency is restored from the
    /// variables that changed.
    fn infer(
        &mut self,
        assignment: &Assignment,
        domains: &mut Domains,
        variable_id: VariableId,
        word_id: WordId,
    ) -> Result<(), ArcConsistencyFailure> {
        let crossword = self.crossword;

        domains.restrict_to(variable_id, word_id);
        let mut arcs: Vec<DirectedArc> = crossword
            .neighbors(variable_id)
            .iter()
            .filter(|&&neighbor_id| !assignment.is_assigned(neighbor_id))
            .map(|&neighbor_id| (neighbor_id, variable_id))
            .collect();

        for other_id in 0..crossword.variable_count() {
            if other_id == variable_id || assignment.is_assigned(other_id) {
                continue;
            }
            if domains.remove(other_id, word_id) {
                if domains.is_empty(other_id) {
                    return Err(ArcConsistencyFailure { variable_id: other_id, revisions: 0 });
                }
                arcs.extend(crossword.neighbors(other_id).iter().map(|&n| (n, other_id)));
            }
        }

        match enforce_arc_consistency(crossword, domains, Some(&arcs)) {
            Ok(success) => {
                self.statistics.revisions += success.revisions;
                Ok(())
            }
            Err(failure) => {
                self.statistics.revisions += failure.revisions;
                Err(failure)
            }
        }
    }
}

/// Search for a complete, consistent assignment for the given puzzle.
pub fn find_fill(crossword: &Crossword, config: &SolverConfig) -> Result<FillSuccess, FillFailure> {
    let start = Instant::now();
    let mut statistics = Statistics::default();

    let mut domains = initial_domains(crossword, &mut statistics)?;

    let mut search = Search { crossword, config, statistics };
    let mut assignment = Assignment::new(crossword.variable_count());
    let result = search.backtrack(&mut assignment, &mut domains);

    search.statistics.duration = start.elapsed();
    debug!("fill finished: {:?}", search.statistics);

    match result {
        Ok(true) => Ok(FillSuccess { statistics: search.statistics, assignment }),
        Ok(false) => Err(FillFailure::Exhausted),
        Err(failure) => Err(failure),
    }
}

/// Solve with the default configuration, returning `None` if there is no solution.
#[must_use]
pub fn solve(crossword: &Crossword) -> Option<Assignment> {
    find_fill(crossword, &SolverConfig::default())
        .ok()
        .map(|success| success.assignment)
}
