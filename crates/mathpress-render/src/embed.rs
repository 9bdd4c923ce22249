//! Image-reference generation and span substitution.
//!
//! Replaces each extracted fragment with an `<img>` reference to its cached
//! artifact. Substitution splices by byte span over the original text, so
//! earlier replacements can never disturb the offsets of later fragments.

use std::sync::LazyLock;

use regex::Regex;

use crate::consts::MAX_ALT_CHARS;
use crate::fragment::{MathFragment, MathKind};

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Sanitize a formula body for use inside a double-quoted alt attribute.
///
/// Double quotes become single quotes, whitespace runs collapse to one
/// space, and the result is truncated to 120 characters with an ellipsis.
pub(crate) fn sanitize_alt(body: &str) -> String {
    let alt = body.replace('"', "'");
    let alt = WHITESPACE_RE.replace_all(&alt, " ");

    if alt.chars().count() > MAX_ALT_CHARS {
        let truncated: String = alt.chars().take(MAX_ALT_CHARS).collect();
        format!("{truncated}…")
    } else {
        alt.into_owned()
    }
}

/// Build the image reference for a rendered fragment.
///
/// The `src` is absolute-rooted at the site root; display math carries
/// block styling so it sits on its own line like the source construct did.
pub(crate) fn image_tag(asset_subdir: &str, basename: &str, alt: &str, kind: MathKind) -> String {
    let src = format!("/{asset_subdir}/{basename}.svg");
    match kind {
        MathKind::DisplayMath => {
            format!(r#"<img src="{src}" alt="{alt}" style="display:block;margin:0.4em 0;">"#)
        }
        MathKind::FencedBlock | MathKind::InlineMath => {
            format!(r#"<img src="{src}" alt="{alt}">"#)
        }
    }
}

/// Splice replacements into `text` by fragment span.
///
/// Fragments must be ordered by span start and non-overlapping, as produced
/// by the extractor. A `None` replacement emits the fragment's original
/// source text unchanged, so a fragment that could not be recovered never
/// corrupts the document.
pub(crate) fn substitute(text: &str, replacements: Vec<(MathFragment, Option<String>)>) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;

    for (fragment, replacement) in replacements {
        out.push_str(&text[cursor..fragment.span.start]);
        match replacement {
            Some(tag) => out.push_str(&tag),
            None => out.push_str(&text[fragment.span.clone()]),
        }
        cursor = fragment.span.end;
    }
    out.push_str(&text[cursor..]);
    out
}
