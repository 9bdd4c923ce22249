//! Formula cache key computation.
//!
//! Provides [`FormulaKey`] for computing the content-based digest used both
//! as the cache lookup key and as the artifact filename stem.

use sha2::{Digest, Sha256};

use crate::consts::HASH_VERSION;

/// Formula parameters for cache key computation.
///
/// The digest covers everything that affects the rendered output: the
/// format-version constant, the display/inline discriminator and the raw
/// body bytes. Document position and timestamps deliberately do not
/// participate, so identical formulas anywhere in the site share one
/// artifact.
#[derive(Debug, Clone, Copy)]
pub struct FormulaKey<'a> {
    /// Formula body (delimiters stripped).
    pub body: &'a str,
    /// Whether the formula is typeset in display mode.
    pub display: bool,
}

impl FormulaKey<'_> {
    /// Compute the hex-encoded SHA-256 digest for this key.
    ///
    /// The version constant is hashed first, so a change of rendering
    /// convention can never collide with artifacts from an older one.
    #[must_use]
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(HASH_VERSION);
        hasher.update(if self.display { [1u8] } else { [0u8] });
        hasher.update(self.body.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Artifact filename stem (`latex-<digest>`).
    #[must_use]
    pub fn basename(&self) -> String {
        format!("latex-{}", self.digest())
    }
}
