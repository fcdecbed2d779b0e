//! **Scan result normalization and digest reporting for supply-chain analysis.**
//!
//! `scan-digest` is the reporting core of a supply-chain analysis pipeline.
//! Scanners emit heterogeneous result payloads — committer activity, code
//! coverage, dependency trees, license detection, ClamAV output, CVSS-scored
//! vulnerability lists, and more. This crate decodes those payloads into a
//! closed set of typed result variants, attaches them to rule evaluations,
//! and condenses everything into a small ordered list of "digest" records
//! that drive pass/fail reporting.
//!
//! It is a pure library: it runs no scans, performs no I/O, and persists
//! nothing. Callers fetch statuses and evaluations themselves and hand them
//! over as in-memory values.
//!
//! ## Key Concepts
//!
//! - **[`ResultVariant`]**: the ten known result payload shapes as a native
//!   sum type with a `{type, data}` wire envelope. Decoding dispatches on the
//!   discriminator (case-insensitively, with aliases); encoding is the exact
//!   inverse. Payloads that predate the envelope are recognized by a legacy
//!   field-detection fallback.
//! - **[`Evaluation`]**: a scan's result joined with the rule that graded it.
//!   The result payload is an explicit two-state value — raw bytes or the
//!   decoded variant, never both — and [`Evaluation::translate`] is the
//!   single, idempotent transition between the two.
//! - **[`Digest`]**: a display-ready report row with a fixed layout ordinal,
//!   a resolved singular/plural title, one of five typed value shapes, and
//!   independent pending/errored/evaluated/passed/warning flags.
//!
//! ## Getting Started: Building a Report
//!
//! ```
//! use scan_digest::{build_digests, Evaluation, RulesetEvaluation, ScanStatus};
//! use serde_json::json;
//!
//! let statuses = vec![ScanStatus {
//!     id: "scan-1".to_string(),
//!     name: "coverage".to_string(),
//!     status: "finished".to_string(),
//!     ..ScanStatus::default()
//! }];
//!
//! let ruleset = RulesetEvaluation {
//!     ruleset_name: "baseline".to_string(),
//!     evaluations: vec![Evaluation {
//!         id: "scan-1".to_string(),
//!         kind: "coverage".to_string(),
//!         ..Evaluation::default()
//!     }
//!     .with_raw_result(json!({"type": "coverage", "data": {"value": 81.25}}))],
//!     ..RulesetEvaluation::default()
//! };
//!
//! let (digests, failures) = build_digests(&statuses, Some(&ruleset));
//! assert!(failures.is_empty());
//! assert_eq!(digests[0].title, "code coverage");
//! ```
//!
//! ## Partial Failure
//!
//! [`build_digests`] never aborts on one scan's failure. It returns every
//! digest it could build together with a structured list of
//! [`ScanFailure`]s; wrap the list in [`BuildErrors`] when a single
//! `impl Error` value is needed.

// Lint to discourage unwrap() in production code - prefer explicit error handling
#![warn(clippy::unwrap_used)]
#![allow(
    // Doc completeness: # Errors / # Panics sections are aspirational
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    // Types like digests::DigestValue read fine at their call sites
    clippy::module_name_repetitions
)]

pub mod digests;
pub mod error;
pub mod model;

// Re-export main types for convenience
pub use digests::{build_digests, Digest, DigestValue};
pub use error::{BuildErrors, DigestError, ScanFailure, TranslateError};
pub use model::{
    summarize, Analysis, AnalysisSummary, Evaluation, EvaluationResult, ResultVariant,
    RulesetEvaluation, ScanStatus, SeverityTier, RULESET_NAME_UNAVAILABLE,
};
