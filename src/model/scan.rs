//! Scan lifecycle status records.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a single scan within an analysis.
///
/// Statuses arrive before any rule evaluation exists and seed the
/// pending/errored state of the digests built for the scan.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScanStatus {
    /// Scan id; evaluations are matched against it.
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub analysis_id: String,
    #[serde(default)]
    pub project_id: String,
    /// Scan category, e.g. `"license"` or `"vulnerability"`.
    #[serde(default)]
    pub name: String,
    /// Lifecycle state, e.g. `"finished"` or `"errored"`.
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
}

impl ScanStatus {
    pub const STATUS_ERRORED: &'static str = "errored";
    pub const STATUS_FINISHED: &'static str = "finished";

    /// Whether the scan ended in an error state.
    #[must_use]
    pub fn errored(&self) -> bool {
        self.status.eq_ignore_ascii_case(Self::STATUS_ERRORED)
    }

    /// Whether the scan ran to completion.
    #[must_use]
    pub fn finished(&self) -> bool {
        self.status.eq_ignore_ascii_case(Self::STATUS_FINISHED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_checks_ignore_case() {
        let status = ScanStatus {
            status: "Errored".to_string(),
            ..ScanStatus::default()
        };
        assert!(status.errored());
        assert!(!status.finished());

        let status = ScanStatus {
            status: "FINISHED".to_string(),
            ..ScanStatus::default()
        };
        assert!(status.finished());
    }

    #[test]
    fn other_statuses_are_neither() {
        let status = ScanStatus {
            status: "queued".to_string(),
            ..ScanStatus::default()
        };
        assert!(!status.errored());
        assert!(!status.finished());
    }
}
