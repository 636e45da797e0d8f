/// An identifier for a given letter or symbol, based on its index in the `Crossword`'s `glyphs`
/// field.
pub type GlyphId = usize;

/// An identifier for a given variable (slot), based on its index in the `Crossword`'s
/// `variables` field.
pub type VariableId = usize;

/// An identifier for a given vocabulary word, based on its index in the `Crossword`'s `words`
/// field.
pub type WordId = usize;
