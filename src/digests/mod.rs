//! Digest aggregation: condensing scan statuses and rule evaluations into
//! ordered, display-ready report rows.
//!
//! [`build_digests`] is the entry point. It walks the scan statuses for an
//! analysis, pairs each with its rule evaluation (when one exists),
//! translates the evaluation's raw results, and dispatches to a per-category
//! builder. One failing scan never sinks the report: failures are collected
//! per scan and returned alongside every digest that could be built.

mod builders;
mod digest;

pub use digest::{Digest, DigestValue};

use crate::error::{DigestError, ScanFailure};
use crate::model::{Evaluation, RulesetEvaluation, ScanStatus};

/// Build the ordered digest list for a set of scans.
///
/// Each status is matched to its evaluation by scan id; absence is legal and
/// yields an errored digest rather than a failure. The returned digests are
/// sorted by the fixed layout ordinal, so output order never depends on
/// input order. The failure list names every scan that could not be built;
/// partial success is the normal outcome.
#[must_use]
pub fn build_digests(
    statuses: &[ScanStatus],
    applied: Option<&RulesetEvaluation>,
) -> (Vec<Digest>, Vec<ScanFailure>) {
    let mut digests = Vec::new();
    let mut failures = Vec::new();

    for status in statuses {
        match digests_for_scan(status, applied) {
            Ok(scan_digests) => digests.extend(scan_digests),
            Err(error) => {
                tracing::debug!(
                    scan_id = %status.id,
                    category = %status.name,
                    %error,
                    "skipping digests for failed scan"
                );
                failures.push(ScanFailure {
                    scan_id: status.id.clone(),
                    name: status.name.clone(),
                    error,
                });
            }
        }
    }

    digests.sort_by_key(|digest| digest.index);
    (digests, failures)
}

/// Build the digests for a single scan.
fn digests_for_scan(
    status: &ScanStatus,
    applied: Option<&RulesetEvaluation>,
) -> Result<Vec<Digest>, DigestError> {
    // Translation works on a copy; the caller's summary is never mutated.
    let mut eval: Option<Evaluation> = applied
        .and_then(|ruleset| ruleset.evaluation_for(&status.id))
        .cloned();
    if let Some(eval) = eval.as_mut() {
        eval.translate()?;
    }
    let eval = eval.as_ref();

    let mut digests = match status.name.to_lowercase().as_str() {
        "ecosystems" => builders::ecosystems_digests(status, eval)?,
        "dependency" => builders::dependency_digests(status, eval)?,
        "vulnerability" => builders::vulnerability_digests(status, eval)?,
        "virus" => builders::virus_digests(status, eval)?,
        "community" => builders::community_digests(status, eval)?,
        "license" => builders::license_digests(status, eval)?,
        "external_coverage" | "code_coverage" | "coverage" => {
            builders::coverage_digests(status, eval)?
        }
        "difference" => builders::difference_digests(status, eval)?,
        // These scans feed other surfaces; they have no digest profile.
        "about_yml" | "file_type" => Vec::new(),
        _ => {
            return Err(DigestError::UnrecognizedCategory {
                name: status.name.clone(),
            })
        }
    };

    // A clean status whose builder appended no value means the evaluation
    // never arrived; surface that instead of rendering an empty row.
    for digest in &mut digests {
        if digest.data.is_none() && !digest.pending && !digest.errored {
            digest.errored = true;
            digest.errored_message = format!("{} evaluation not found", digest.title);
        }
    }

    Ok(digests)
}
