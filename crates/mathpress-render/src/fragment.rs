//! Math fragment value types.

use std::ops::Range;

/// Kind of math construct recognized in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathKind {
    /// Fenced code block tagged `pdflatex`.
    FencedBlock,
    /// `$$ ... $$` display math, possibly spanning multiple lines.
    DisplayMath,
    /// `$ ... $` inline math (optional extractor rule).
    InlineMath,
}

impl MathKind {
    /// Whether fragments of this kind are typeset in display mode.
    ///
    /// Fenced blocks and display math share the display discriminator in
    /// the formula digest; inline math uses its own.
    pub(crate) fn is_display(self) -> bool {
        !matches!(self, Self::InlineMath)
    }
}

/// A single math-bearing span extracted from a document.
///
/// Created by the extractor, consumed once by the render pipeline and the
/// substitution pass, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MathFragment {
    /// Which construct produced this fragment.
    pub kind: MathKind,
    /// Formula body with delimiters stripped and edges trimmed.
    pub body: String,
    /// Byte span of the whole construct in the original text.
    pub span: Range<usize>,
}
