//! Document scanning for math-bearing constructs.
//!
//! Produces ordered, non-overlapping [`MathFragment`]s from raw document
//! text. Three constructs are recognized:
//!
//! - fenced code blocks whose info string starts with the `pdflatex` tag
//!   (backtick or tilde fences, three or more characters)
//! - `$$ ... $$` display math, possibly spanning multiple lines
//! - `$ ... $` inline math, when enabled
//!
//! Fences are tracked line by line: the closing fence must use the same
//! character as the opening fence and be at least as long. Dollar delimiters
//! are only scanned outside fenced code blocks, so formulas quoted inside an
//! ordinary code block are left alone. An unterminated fence or delimiter
//! pair never produces a fragment; the text falls through verbatim.

use std::ops::Range;

use crate::consts::MATH_FENCE_TAG;
use crate::fragment::{MathFragment, MathKind};

/// An open code fence awaiting its closing line.
struct Fence {
    ch: char,
    len: usize,
    /// Whether the info string carried the math tag.
    math: bool,
    /// Byte offset of the opening fence line.
    start: usize,
    /// Byte offset just past the opening line (start of the body).
    body_start: usize,
}

/// Scan `text` and return every math fragment, ordered by span start.
///
/// `inline_math` enables the optional single-dollar rule; fenced blocks and
/// display math are always recognized. The input is never mutated and the
/// returned spans never overlap.
#[must_use]
pub fn extract_fragments(text: &str, inline_math: bool) -> Vec<MathFragment> {
    let mut fragments = Vec::new();
    let mut plain: Vec<Range<usize>> = Vec::new();
    let mut open: Option<Fence> = None;
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();

        let content = line.strip_suffix('\n').unwrap_or(line);
        let content = content.strip_suffix('\r').unwrap_or(content);

        match open.as_ref() {
            None => {
                if let Some((ch, len, info)) = detect_fence(content) {
                    open = Some(Fence {
                        ch,
                        len,
                        math: is_math_info(info),
                        start: line_start,
                        body_start: offset,
                    });
                } else {
                    extend_region(&mut plain, line_start, offset);
                }
            }
            Some(fence) => {
                if is_closing_fence(content, fence.ch, fence.len) {
                    if fence.math {
                        let body = text[fence.body_start..line_start].trim_end().to_owned();
                        fragments.push(MathFragment {
                            kind: MathKind::FencedBlock,
                            body,
                            span: fence.start..line_start + content.len(),
                        });
                    }
                    open = None;
                }
            }
        }
    }

    for region in plain {
        scan_dollar_spans(text, region, inline_math, &mut fragments);
    }

    fragments.sort_by_key(|f| f.span.start);
    fragments
}

/// Detect an opening code fence, returning its character, length and info string.
fn detect_fence(line: &str) -> Option<(char, usize, &str)> {
    let trimmed = line.trim_start();
    let first = trimmed.chars().next()?;
    if first != '`' && first != '~' {
        return None;
    }

    let count = trimmed.chars().take_while(|&c| c == first).count();
    if count >= 3 {
        Some((first, count, trimmed[count..].trim()))
    } else {
        None
    }
}

/// Check if a line closes the current fence.
///
/// The closing fence must use the same character, be at least as long as the
/// opening fence, and carry nothing but whitespace after the marker.
fn is_closing_fence(line: &str, expected_char: char, min_len: usize) -> bool {
    let trimmed = line.trim_start();
    if !trimmed.starts_with(expected_char) {
        return false;
    }

    let count = trimmed.chars().take_while(|&c| c == expected_char).count();
    count >= min_len && trimmed[count..].chars().all(char::is_whitespace)
}

/// Whether a fence info string marks the block as LaTeX math.
///
/// The tag must be the first word of the info string; trailing attribute
/// text is allowed (`pdflatex`, `pdflatex crop`), a longer word is not
/// (`pdflatexmk`).
fn is_math_info(info: &str) -> bool {
    match info.strip_prefix(MATH_FENCE_TAG) {
        Some(rest) => match rest.chars().next() {
            None => true,
            Some(c) => !c.is_alphanumeric() && c != '_',
        },
        None => false,
    }
}

/// Append the line `[start, end)` to the current plain region, merging
/// contiguous lines into one range.
fn extend_region(regions: &mut Vec<Range<usize>>, start: usize, end: usize) {
    match regions.last_mut() {
        Some(last) if last.end == start => last.end = end,
        _ => regions.push(start..end),
    }
}

/// Scan one plain region for dollar-delimited math.
///
/// Display pairs are matched non-greedily: the first unescaped closing `$$`
/// ends the match. A delimiter immediately preceded by a backslash is not a
/// delimiter. Inline math is restricted to a single line and closed by the
/// first unescaped `$`.
fn scan_dollar_spans(
    text: &str,
    region: Range<usize>,
    inline_math: bool,
    out: &mut Vec<MathFragment>,
) {
    let bytes = text.as_bytes();
    let end = region.end;
    let mut i = region.start;

    while i < end {
        if bytes[i] != b'$' {
            i += 1;
            continue;
        }
        if i > 0 && bytes[i - 1] == b'\\' {
            i += 1;
            continue;
        }

        if i + 1 < end && bytes[i + 1] == b'$' {
            let Some(close) = find_double_close(bytes, i + 2, end) else {
                // Unterminated opener: the rest of the region stays verbatim.
                return;
            };
            out.push(MathFragment {
                kind: MathKind::DisplayMath,
                body: text[i + 2..close].trim().to_owned(),
                span: i..close + 2,
            });
            i = close + 2;
        } else if inline_math {
            match find_single_close(bytes, i + 1, end) {
                // A closing `$` that abuts another `$` is half of a display
                // delimiter, not an inline close.
                Some(close) if close + 1 >= end || bytes[close + 1] != b'$' => {
                    out.push(MathFragment {
                        kind: MathKind::InlineMath,
                        body: text[i + 1..close].trim().to_owned(),
                        span: i..close + 1,
                    });
                    i = close + 1;
                }
                _ => i += 1,
            }
        } else {
            i += 1;
        }
    }
}

/// Find the first unescaped `$$` at or after `from`.
fn find_double_close(bytes: &[u8], from: usize, end: usize) -> Option<usize> {
    let mut j = from;
    while j + 1 < end {
        if bytes[j] == b'$' && bytes[j + 1] == b'$' && bytes[j - 1] != b'\\' {
            return Some(j);
        }
        j += 1;
    }
    None
}

/// Find the first unescaped `$` closing an inline span on the same line.
///
/// Returns `None` at a line break, so an unpaired dollar sign never swallows
/// the rest of the paragraph. The body must be non-empty.
fn find_single_close(bytes: &[u8], from: usize, end: usize) -> Option<usize> {
    let mut j = from;
    while j < end {
        match bytes[j] {
            b'\n' => return None,
            b'$' if bytes[j - 1] != b'\\' && j > from => return Some(j),
            _ => {}
        }
        j += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn kinds(fragments: &[MathFragment]) -> Vec<MathKind> {
        fragments.iter().map(|f| f.kind).collect()
    }

    #[test]
    fn test_fenced_block() {
        let text = "before\n```pdflatex\nx^2\n```\nafter\n";
        let fragments = extract_fragments(text, false);

        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].kind, MathKind::FencedBlock);
        assert_eq!(fragments[0].body, "x^2");
        assert_eq!(&text[fragments[0].span.clone()], "```pdflatex\nx^2\n```");
    }

    #[test]
    fn test_fenced_block_tilde_fence() {
        let text = "~~~pdflatex\n\\frac{a}{b}\n~~~\n";
        let fragments = extract_fragments(text, false);

        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].body, "\\frac{a}{b}");
    }

    #[test]
    fn test_fenced_block_longer_closing_fence() {
        let text = "````pdflatex\nx\n`````\n";
        let fragments = extract_fragments(text, false);

        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].body, "x");
    }

    #[test]
    fn test_fenced_block_shorter_closing_fence_does_not_close() {
        // ``` cannot close a ```` fence; the block runs to EOF unterminated
        let text = "````pdflatex\nx\n```\n";
        assert_eq!(extract_fragments(text, false), vec![]);
    }

    #[test]
    fn test_unterminated_fence_is_not_a_match() {
        let text = "```pdflatex\nx^2\nno closing fence";
        assert_eq!(extract_fragments(text, false), vec![]);
    }

    #[test]
    fn test_fence_with_other_tag_ignored() {
        let text = "```python\nprint(1)\n```\n";
        assert_eq!(extract_fragments(text, false), vec![]);
    }

    #[test]
    fn test_math_tag_requires_word_boundary() {
        assert!(is_math_info("pdflatex"));
        assert!(is_math_info("pdflatex crop"));
        assert!(!is_math_info("pdflatexmk"));
        assert!(!is_math_info("latex"));
    }

    #[test]
    fn test_dollars_inside_code_fence_ignored() {
        let text = "```sh\necho $$PID $$HOME\n```\n";
        assert_eq!(extract_fragments(text, false), vec![]);
    }

    #[test]
    fn test_display_math_single_line() {
        let text = "see $$a+b$$ here\n";
        let fragments = extract_fragments(text, false);

        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].kind, MathKind::DisplayMath);
        assert_eq!(fragments[0].body, "a+b");
        assert_eq!(&text[fragments[0].span.clone()], "$$a+b$$");
    }

    #[test]
    fn test_display_math_multiline() {
        let text = "$$\n\\int_0^1 f(x)dx\n$$\n";
        let fragments = extract_fragments(text, false);

        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].body, "\\int_0^1 f(x)dx");
    }

    #[test]
    fn test_display_math_non_greedy() {
        // First closing pair ends the match
        let text = "$$a$$ and $$b$$";
        let fragments = extract_fragments(text, false);

        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0].body, "a");
        assert_eq!(fragments[1].body, "b");
    }

    #[test]
    fn test_escaped_dollars_not_display_math() {
        assert_eq!(extract_fragments(r"\$\$x\$\$", false), vec![]);
    }

    #[test]
    fn test_escaped_opener_not_display_math() {
        // \$$ is an escaped dollar followed by a bare one, not a delimiter
        assert_eq!(extract_fragments(r"costs \$$5 or \$$6", false), vec![]);
    }

    #[test]
    fn test_unterminated_display_math_is_not_a_match() {
        assert_eq!(extract_fragments("$$a+b and nothing closes", false), vec![]);
    }

    #[test]
    fn test_whitespace_only_body_still_extracted() {
        let fragments = extract_fragments("$$   $$", false);

        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].body, "");
    }

    #[test]
    fn test_inline_math_disabled_by_default_rule() {
        assert_eq!(extract_fragments("price $x$ here", false), vec![]);
    }

    #[test]
    fn test_inline_math_enabled() {
        let text = "an $x^2$ term";
        let fragments = extract_fragments(text, true);

        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].kind, MathKind::InlineMath);
        assert_eq!(fragments[0].body, "x^2");
        assert_eq!(&text[fragments[0].span.clone()], "$x^2$");
    }

    #[test]
    fn test_inline_math_does_not_cross_lines() {
        assert_eq!(extract_fragments("a $x\ny$ b", true), vec![]);
    }

    #[test]
    fn test_inline_close_adjacent_to_dollar_rejected() {
        // The would-be close is half of a display pair
        assert_eq!(extract_fragments("$x$$", true), vec![]);
    }

    #[test]
    fn test_inline_does_not_hijack_display() {
        let fragments = extract_fragments("$$a+b$$", true);

        assert_eq!(kinds(&fragments), vec![MathKind::DisplayMath]);
    }

    #[test]
    fn test_mixed_constructs_ordered_and_disjoint() {
        let text = "$$first$$\n\n```pdflatex\nsecond\n```\n\n$$third$$\n";
        let fragments = extract_fragments(text, false);

        assert_eq!(
            kinds(&fragments),
            vec![
                MathKind::DisplayMath,
                MathKind::FencedBlock,
                MathKind::DisplayMath
            ]
        );
        for pair in fragments.windows(2) {
            assert!(pair[0].span.end <= pair[1].span.start);
        }
    }

    #[test]
    fn test_no_math_returns_empty() {
        assert_eq!(extract_fragments("plain text, no math at all\n", true), vec![]);
    }

    #[test]
    fn test_fenced_body_trailing_whitespace_trimmed() {
        let text = "```pdflatex\nx^2   \n\n```\n";
        let fragments = extract_fragments(text, false);

        assert_eq!(fragments[0].body, "x^2");
    }
}
