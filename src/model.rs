//! The read-only puzzle model: the slots to fill, the vocabulary, and the overlap table between
//! slots that share a cell.

use std::collections::{HashMap, HashSet};
use std::fmt::{Debug, Formatter};

use smallvec::SmallVec;

use crate::errors::ModelError;
use crate::types::{GlyphId, VariableId, WordId};
use crate::{MAX_GLYPH_COUNT, MAX_SLOT_COUNT, MAX_SLOT_LENGTH};

/// Zero-indexed row and column for a cell in the grid, where row 0 is the top row.
pub type GridCoord = (usize, usize);

/// Direction that a variable is facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Across,
    Down,
}

/// A crossword slot. Two variables are equal iff all four fields match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Variable {
    pub row: usize,
    pub col: usize,
    pub direction: Direction,
    pub length: usize,
}

impl Variable {
    #[must_use]
    pub fn new(row: usize, col: usize, direction: Direction, length: usize) -> Variable {
        Variable { row, col, direction, length }
    }

    /// Generate the coords for each cell of this variable.
    #[must_use]
    pub fn cell_coords(&self) -> SmallVec<[GridCoord; MAX_SLOT_LENGTH]> {
        (0..self.length)
            .map(|cell_idx| match self.direction {
                Direction::Across => (self.row, self.col + cell_idx),
                Direction::Down => (self.row + cell_idx, self.col),
            })
            .collect()
    }
}

/// The shared cell between two variables: `index` is the position within the first variable and
/// `other_index` the position within the second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overlap {
    pub index: usize,
    pub other_index: usize,
}

impl Overlap {
    /// The same overlap as seen from the other variable.
    #[must_use]
    pub fn reversed(self) -> Overlap {
        Overlap { index: self.other_index, other_index: self.index }
    }
}

/// A vocabulary word, along with its glyph ids for fast comparison.
#[derive(Debug, Clone)]
pub struct Word {
    pub string: String,
    pub glyphs: SmallVec<[GlyphId; MAX_SLOT_LENGTH]>,
}

impl Word {
    /// Length in chars (not bytes).
    #[must_use]
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

/// A struct representing the aspects of a puzzle that are static during solving.
pub struct Crossword {
    glyphs: SmallVec<[char; MAX_GLYPH_COUNT]>,
    variables: Vec<Variable>,
    words: Vec<Word>,
    overlaps: HashMap<(VariableId, VariableId), Overlap>,
    neighbors: Vec<SmallVec<[VariableId; MAX_SLOT_LENGTH]>>,
}

impl Debug for Crossword {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Crossword")
            .field("glyphs", &self.glyphs)
            .field("variables", &self.variables)
            .field("words", &format!("({} entries)", self.words.len()))
            .field("overlaps", &self.overlaps.len())
            .finish()
    }
}

impl Crossword {
    /// Build a crossword from a list of variables and a vocabulary. Overlaps are derived from the
    /// variables' cells. Duplicate and empty words are dropped.
    pub fn new<I, S>(variables: Vec<Variable>, words: I) -> Result<Crossword, ModelError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if variables.len() > MAX_SLOT_COUNT {
            return Err(ModelError::TooManyVariables { count: variables.len(), max: MAX_SLOT_COUNT });
        }

        let mut seen_variables: HashSet<Variable> = HashSet::with_capacity(variables.len());
        for &variable in &variables {
            if variable.length == 0 {
                return Err(ModelError::ZeroLengthVariable { row: variable.row, col: variable.col });
            }
            if !seen_variables.insert(variable) {
                return Err(ModelError::DuplicateVariable { variable });
            }
        }

        // Intern every char we see, in first-seen order so that glyph ids are stable.
        let mut glyphs: SmallVec<[char; MAX_GLYPH_COUNT]> = SmallVec::new();
        let mut glyph_ids_by_char: HashMap<char, GlyphId> = HashMap::new();
        let mut seen_words: HashSet<String> = HashSet::new();
        let mut vocabulary: Vec<Word> = vec![];

        for word in words {
            let word = word.as_ref();
            if word.is_empty() || seen_words.contains(word) {
                continue;
            }
            seen_words.insert(word.to_string());

            let word_glyphs = word
                .chars()
                .map(|c| {
                    *glyph_ids_by_char.entry(c).or_insert_with(|| {
                        glyphs.push(c);
                        glyphs.len() - 1
                    })
                })
                .collect();

            vocabulary.push(Word { string: word.to_string(), glyphs: word_glyphs });
        }

        // Build a map from cell location to the variables involved, which we can then use to
        // calculate overlaps.
        let mut cells: HashMap<GridCoord, SmallVec<[(VariableId, usize); 2]>> = HashMap::new();
        for (variable_id, variable) in variables.iter().enumerate() {
            for (cell_idx, loc) in variable.cell_coords().into_iter().enumerate() {
                cells.entry(loc).or_default().push((variable_id, cell_idx));
            }
        }

        let mut overlaps: HashMap<(VariableId, VariableId), Overlap> = HashMap::new();
        for entries in cells.values() {
            for (pos, &(first, first_cell)) in entries.iter().enumerate() {
                for &(second, second_cell) in &entries[pos + 1..] {
                    let overlap = Overlap { index: first_cell, other_index: second_cell };
                    if overlaps.insert((first, second), overlap).is_some() {
                        return Err(ModelError::MultipleOverlaps {
                            first: first.min(second),
                            second: first.max(second),
                        });
                    }
                    overlaps.insert((second, first), overlap.reversed());
                }
            }
        }

        let mut neighbors: Vec<SmallVec<[VariableId; MAX_SLOT_LENGTH]>> =
            variables.iter().map(|_| SmallVec::new()).collect();
        for &(x, y) in overlaps.keys() {
            neighbors[x].push(y);
        }
        for variable_neighbors in &mut neighbors {
            variable_neighbors.sort_unstable();
        }

        Ok(Crossword { glyphs, variables, words: vocabulary, overlaps, neighbors })
    }

    /// Build a crossword from a grid of open (`true`) and blocked (`false`) cells. Every run of
    /// two or more open cells becomes a variable: across runs first, row by row, then down runs,
    /// column by column.
    pub fn from_structure<I, S>(structure: &[Vec<bool>], words: I) -> Result<Crossword, ModelError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let height = structure.len();
        let width = structure.iter().map(Vec::len).max().unwrap_or(0);
        let is_open = |row: usize, col: usize| -> bool {
            structure.get(row).and_then(|line| line.get(col)).copied().unwrap_or(false)
        };

        let mut variables: Vec<Variable> = vec![];

        for row in 0..height {
            let mut run_start: Option<usize> = None;
            for col in 0..=width {
                match (is_open(row, col), run_start) {
                    (true, None) => run_start = Some(col),
                    (false, Some(start)) => {
                        if col - start > 1 {
                            variables.push(Variable::new(row, start, Direction::Across, col - start));
                        }
                        run_start = None;
                    }
                    _ => {}
                }
            }
        }

        for col in 0..width {
            let mut run_start: Option<usize> = None;
            for row in 0..=height {
                match (is_open(row, col), run_start) {
                    (true, None) => run_start = Some(row),
                    (false, Some(start)) => {
                        if row - start > 1 {
                            variables.push(Variable::new(start, col, Direction::Down, row - start));
                        }
                        run_start = None;
                    }
                    _ => {}
                }
            }
        }

        Crossword::new(variables, words)
    }

    #[must_use]
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    #[must_use]
    pub fn variable(&self, variable_id: VariableId) -> &Variable {
        &self.variables[variable_id]
    }

    /// Look up the id of a variable by value.
    #[must_use]
    pub fn variable_id(&self, variable: &Variable) -> Option<VariableId> {
        self.variables.iter().position(|candidate| candidate == variable)
    }

    #[must_use]
    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    /// The deduplicated vocabulary, indexed by `WordId`.
    #[must_use]
    pub fn words(&self) -> &[Word] {
        &self.words
    }

    #[must_use]
    pub fn word(&self, word_id: WordId) -> &Word {
        &self.words[word_id]
    }

    /// Find a word's id by its string.
    #[must_use]
    pub fn word_id(&self, string: &str) -> Option<WordId> {
        self.words.iter().position(|word| word.string == string)
    }

    #[must_use]
    pub fn glyph(&self, glyph_id: GlyphId) -> char {
        self.glyphs[glyph_id]
    }

    #[must_use]
    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    /// The overlap between `x` and `y`, from `x`'s point of view, if they share a cell.
    #[must_use]
    pub fn overlap(&self, x: VariableId, y: VariableId) -> Option<Overlap> {
        self.overlaps.get(&(x, y)).copied()
    }

    /// All variables sharing a cell with `variable_id`, in ascending order.
    #[must_use]
    pub fn neighbors(&self, variable_id: VariableId) -> &[VariableId] {
        &self.neighbors[variable_id]
    }

    #[must_use]
    pub fn degree(&self, variable_id: VariableId) -> usize {
        self.neighbors[variable_id].len()
    }
}
