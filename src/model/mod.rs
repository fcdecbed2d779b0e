//! Typed model for scan results, evaluations, and statuses.
//!
//! This module defines the canonical data structures the digest layer works
//! over. Raw scan payloads are decoded into a closed [`ResultVariant`] sum
//! type, attached to rule [`Evaluation`]s, and matched to [`ScanStatus`]
//! lifecycle records by scan id.

mod evaluation;
mod results;
mod scan;
mod vulnerability;

pub use evaluation::*;
pub use results::*;
pub use scan::*;
pub use vulnerability::*;
