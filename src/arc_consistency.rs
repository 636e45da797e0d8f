//! An implementation of the AC-3 algorithm for establishing arc consistency between crossing
//! variables. An arc `(x, y)` is consistent when every word left in `x`'s domain has at least one
//! word in `y`'s domain with the same glyph in their shared cell.
//!
//! Domains only ever shrink here, so the worklist always drains; we give up early as soon as any
//! domain becomes empty.

use std::collections::VecDeque;

use bit_set::BitSet;
use log::trace;

use crate::domains::Domains;
use crate::errors::FillFailure;
use crate::model::Crossword;
use crate::types::{VariableId, WordId};

/// A directed arc `(x, y)`, meaning "`x` must remain consistent with `y`".
pub type DirectedArc = (VariableId, VariableId);

/// FIFO worklist of arcs that never holds the same arc twice.
#[derive(Debug)]
pub struct ArcQueue {
    queue: VecDeque<DirectedArc>,
    queued: BitSet,
    variable_count: usize,
}

impl ArcQueue {
    #[must_use]
    pub fn new(variable_count: usize) -> ArcQueue {
        ArcQueue {
            queue: VecDeque::new(),
            queued: BitSet::with_capacity(variable_count * variable_count),
            variable_count,
        }
    }

    pub fn with_initial_queue<Items>(variable_count: usize, items: Items) -> ArcQueue
    where
        Items: IntoIterator<Item = DirectedArc>,
    {
        let mut queue = ArcQueue::new(variable_count);
        for arc in items {
            queue.enqueue(arc);
        }
        queue
    }

    fn key(&self, (x, y): DirectedArc) -> usize {
        x * self.variable_count + y
    }

    /// Add an arc to the back of the queue unless it's already waiting. Returns whether it was
    /// added.
    pub fn enqueue(&mut self, arc: DirectedArc) -> bool {
        let key = self.key(arc);
        if !self.queued.insert(key) {
            return false;
        }
        self.queue.push_back(arc);
        true
    }

    pub fn pop_front(&mut self) -> Option<DirectedArc> {
        let arc = self.queue.pop_front()?;
        let key = self.key(arc);
        self.queued.remove(key);
        Some(arc)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// Every ordered pair of neighboring variables.
#[must_use]
pub fn all_arcs(crossword: &Crossword) -> Vec<DirectedArc> {
    (0..crossword.variable_count())
        .flat_map(|x| crossword.neighbors(x).iter().map(move |&y| (x, y)))
        .collect()
}

/// Results from a successful call to `enforce_arc_consistency`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArcConsistencySuccess {
    /// How many times `revise` was called.
    pub revisions: u64,

    /// How many words were removed across all domains.
    pub eliminations: usize,
}

/// Results from a failed call to `enforce_arc_consistency`: the variable whose domain ran out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArcConsistencyFailure {
    pub variable_id: VariableId,
    pub revisions: u64,
}

pub type ArcConsistencyResult = Result<ArcConsistencySuccess, ArcConsistencyFailure>;

impl From<ArcConsistencyFailure> for FillFailure {
    fn from(failure: ArcConsistencyFailure) -> Self {
        FillFailure::ArcInconsistent { variable_id: failure.variable_id }
    }
}

/// Remove every word from `x`'s domain that has no partner in `y`'s domain agreeing at their
/// shared cell, and return how many were removed.
fn revise_impl(crossword: &Crossword, domains: &mut Domains, x: VariableId, y: VariableId) -> usize {
    let Some(overlap) = crossword.overlap(x, y) else {
        return 0;
    };

    // Rather than comparing every pair of words, collect the glyphs that `y` can still place in
    // the shared cell and check each `x` option against that.
    let mut supported_glyphs = BitSet::with_capacity(crossword.glyph_count());
    for word_id in domains.domain_of(y) {
        if let Some(&glyph) = crossword.word(word_id).glyphs.get(overlap.other_index) {
            supported_glyphs.insert(glyph);
        }
    }

    let unsupported: Vec<WordId> = domains
        .domain_of(x)
        .iter()
        .filter(|&word_id| {
            !crossword
                .word(word_id)
                .glyphs
                .get(overlap.index)
                .map_or(false, |&glyph| supported_glyphs.contains(glyph))
        })
        .collect();

    for &word_id in &unsupported {
        domains.remove(x, word_id);
    }

    unsupported.len()
}

/// Make `x` arc consistent with `y`. Returns whether `x`'s domain changed. Variables that don't
/// overlap are left alone.
pub fn revise(crossword: &Crossword, domains: &mut Domains, x: VariableId, y: VariableId) -> bool {
    revise_impl(crossword, domains, x, y) > 0
}

/// Run AC-3 starting from `initial_arcs`, or from every arc in the puzzle if none are given.
/// Whenever `x` loses a value while being revised against `y`, every arc `(z, x)` for the other
/// neighbors `z` of `x` is queued again.
pub fn enforce_arc_consistency(
    crossword: &Crossword,
    domains: &mut Domains,
    initial_arcs: Option<&[DirectedArc]>,
) -> ArcConsistencyResult {
    let variable_count = crossword.variable_count();
    let mut queue = match initial_arcs {
        Some(arcs) => ArcQueue::with_initial_queue(variable_count, arcs.iter().copied()),
        None => ArcQueue::with_initial_queue(variable_count, all_arcs(crossword)),
    };

    let mut revisions: u64 = 0;
    let mut eliminations: usize = 0;

    while let Some((x, y)) = queue.pop_front() {
        revisions += 1;

        let removed = revise_impl(crossword, domains, x, y);
        if removed == 0 {
            continue;
        }
        eliminations += removed;

        if domains.is_empty(x) {
            trace!("arc ({x}, {y}) emptied the domain of variable {x}");
            return Err(ArcConsistencyFailure { variable_id: x, revisions });
        }

        for &z in crossword.neighbors(x) {
            if z != y {
                queue.enqueue((z, x));
            }
        }
    }

    Ok(ArcConsistencySuccess { revisions, eliminations })
}
