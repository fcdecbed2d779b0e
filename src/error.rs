//! Unified error types for scan-digest.
//!
//! Translation and digest building are pure computations, so every error here
//! is terminal for the payload that produced it: there is nothing transient
//! to retry. Digest builds additionally aggregate failures per scan instead
//! of aborting, see [`ScanFailure`] and [`BuildErrors`].

use std::fmt;

use thiserror::Error;

/// Errors raised while decoding or encoding scan result payloads.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TranslateError {
    /// The payload's discriminator names no known result type.
    #[error("unsupported result type `{tag}`")]
    UnsupportedType { tag: String },

    /// The payload exists but does not deserialize into the tagged shape.
    #[error("malformed `{tag}` result payload: {message}")]
    Malformed { tag: String, message: String },

    /// A decoded variant failed to re-serialize.
    #[error("failed to encode `{tag}` results: {message}")]
    Encode { tag: String, message: String },
}

impl TranslateError {
    /// Create an unsupported-type error
    pub fn unsupported(tag: impl Into<String>) -> Self {
        Self::UnsupportedType { tag: tag.into() }
    }

    /// Create a malformed-payload error
    pub fn malformed(tag: impl Into<String>, message: impl ToString) -> Self {
        Self::Malformed {
            tag: tag.into(),
            message: message.to_string(),
        }
    }
}

/// Errors raised while building digests for a single scan.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum DigestError {
    /// The scan's category name matches no digest profile.
    #[error("unrecognized scan category `{name}`")]
    UnrecognizedCategory { name: String },

    /// The translated payload disagrees with the category builder's
    /// expectation, which signals upstream corruption.
    #[error("`{category}` scan carried `{found}` results, expected `{expected}`")]
    PayloadShapeMismatch {
        category: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    /// Translating the scan's evaluation failed.
    #[error(transparent)]
    Translate(#[from] TranslateError),
}

impl DigestError {
    /// Create a payload-shape mismatch error
    pub fn mismatch(category: &'static str, expected: &'static str, found: &'static str) -> Self {
        Self::PayloadShapeMismatch {
            category,
            expected,
            found,
        }
    }
}

/// A digest-build failure tied to the scan that caused it.
#[derive(Error, Debug)]
#[error("scan {scan_id} ({name}): {error}")]
pub struct ScanFailure {
    /// Id of the scan that failed to build.
    pub scan_id: String,
    /// The scan's category name.
    pub name: String,
    /// What went wrong.
    #[source]
    pub error: DigestError,
}

/// Aggregate error for a digest build in which one or more scans failed.
///
/// Keeps the per-scan association intact; the flattened display form exists
/// only for callers that need a single `impl Error` value.
#[derive(Debug)]
pub struct BuildErrors {
    failures: Vec<ScanFailure>,
}

impl BuildErrors {
    /// Wrap a failure list; `None` when every scan succeeded.
    #[must_use]
    pub fn from_failures(failures: Vec<ScanFailure>) -> Option<Self> {
        if failures.is_empty() {
            None
        } else {
            Some(Self { failures })
        }
    }

    /// The individual per-scan failures.
    #[must_use]
    pub fn failures(&self) -> &[ScanFailure] {
        &self.failures
    }
}

impl fmt::Display for BuildErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} scan(s) failed to build digests", self.failures.len())?;
        for failure in &self.failures {
            write!(f, "; {failure}")?;
        }
        Ok(())
    }
}

impl std::error::Error for BuildErrors {}
