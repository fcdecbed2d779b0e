//! The digest report row, its typed value shapes, and the fixed layout table.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::model::{Evaluation, ScanStatus};

/// Typed value payload of a digest.
///
/// Regardless of which of the ten result variants produced it, a digest
/// renders as exactly one of these five shapes, e.g. `{"count": 4}` or
/// `{"percent": 93.88}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum DigestValue {
    Bool(bool),
    Chars(String),
    Count(u64),
    List(Vec<String>),
    Percent(f64),
}

/// Fixed layout slot for a digest: ordering ordinal plus its titles.
///
/// Builders and the final sort share this one table, so relative report
/// order cannot drift when a category is added: new slots get the next
/// ordinal here and nowhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DigestSlot {
    pub index: u32,
    pub singular: &'static str,
    pub plural: &'static str,
}

impl DigestSlot {
    const fn new(index: u32, singular: &'static str, plural: &'static str) -> Self {
        Self {
            index,
            singular,
            plural,
        }
    }
}

pub(crate) mod slots {
    use super::DigestSlot;

    pub const ECOSYSTEMS: DigestSlot = DigestSlot::new(0, "language", "languages");
    pub const OUTDATED_DEPENDENCIES: DigestSlot =
        DigestSlot::new(1, "outdated dependency", "outdated dependencies");
    pub const NO_VERSION_DEPENDENCIES: DigestSlot = DigestSlot::new(
        2,
        "dependency with no version specified",
        "dependencies with no version specified",
    );
    pub const DIRECT_DEPENDENCIES: DigestSlot =
        DigestSlot::new(3, "direct dependency", "direct dependencies");
    pub const TRANSITIVE_DEPENDENCIES: DigestSlot =
        DigestSlot::new(4, "transitive dependency", "transitive dependencies");
    pub const TOTAL_VULNERABILITIES: DigestSlot =
        DigestSlot::new(5, "total vulnerability", "total vulnerabilities");
    pub const UNIQUE_VULNERABILITIES: DigestSlot =
        DigestSlot::new(6, "unique vulnerability", "unique vulnerabilities");
    pub const HIGH_VULNERABILITIES: DigestSlot =
        DigestSlot::new(7, "high vulnerability", "high vulnerabilities");
    pub const CRITICAL_VULNERABILITIES: DigestSlot =
        DigestSlot::new(8, "critical vulnerability", "critical vulnerabilities");
    pub const LICENSES: DigestSlot = DigestSlot::new(9, "license", "licenses");
    pub const UNIQUE_COMMITTERS: DigestSlot =
        DigestSlot::new(10, "unique committer", "unique committers");
    pub const CODE_COVERAGE: DigestSlot = DigestSlot::new(11, "code coverage", "code coverage");
    pub const FILES_SCANNED: DigestSlot =
        DigestSlot::new(12, "total files scanned", "total files scanned");
    pub const VIRUSES_FOUND: DigestSlot = DigestSlot::new(13, "virus found", "viruses found");
    pub const DIFFERENCE_DETECTED: DigestSlot =
        DigestSlot::new(14, "difference detected", "difference detected");

    pub const ALL: [DigestSlot; 15] = [
        ECOSYSTEMS,
        OUTDATED_DEPENDENCIES,
        NO_VERSION_DEPENDENCIES,
        DIRECT_DEPENDENCIES,
        TRANSITIVE_DEPENDENCIES,
        TOTAL_VULNERABILITIES,
        UNIQUE_VULNERABILITIES,
        HIGH_VULNERABILITIES,
        CRITICAL_VULNERABILITIES,
        LICENSES,
        UNIQUE_COMMITTERS,
        CODE_COVERAGE,
        FILES_SCANNED,
        VIRUSES_FOUND,
        DIFFERENCE_DETECTED,
    ];
}

/// A normalized, display-ready summary row derived from one scan.
///
/// Digests are constructed once per (category, sub-metric) pair and are
/// immutable after their single value-append step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Digest {
    /// Position in the fixed report layout.
    pub index: u32,
    /// Resolved title; singular or plural form is chosen at construction.
    pub title: String,
    /// Typed value; absent while the digest is pending or errored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<DigestValue>,
    #[serde(default)]
    pub scan_id: String,
    #[serde(default)]
    pub rule_id: String,
    #[serde(default)]
    pub ruleset_id: String,
    /// Whether a rule actually graded this metric; informational rows stay
    /// false.
    #[serde(default)]
    pub evaluated: bool,
    /// No scan status has been seen yet.
    #[serde(default)]
    pub pending: bool,
    #[serde(default)]
    pub passed: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub passed_message: String,
    #[serde(default)]
    pub warning: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub warning_message: String,
    #[serde(default)]
    pub errored: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub errored_message: String,
}

impl Digest {
    /// Seed a digest for a layout slot from the scan's lifecycle status.
    ///
    /// With no status the digest is pending; an errored status carries its
    /// message over. The digest stays in that state until a value is
    /// appended.
    pub(crate) fn new(slot: DigestSlot, status: Option<&ScanStatus>) -> Self {
        let mut digest = Self {
            index: slot.index,
            title: slot.plural.to_string(),
            data: None,
            scan_id: String::new(),
            rule_id: String::new(),
            ruleset_id: String::new(),
            evaluated: false,
            pending: false,
            passed: false,
            passed_message: String::new(),
            warning: false,
            warning_message: String::new(),
            errored: false,
            errored_message: String::new(),
        };

        match status {
            None => digest.pending = true,
            Some(status) => {
                digest.scan_id = status.id.clone();
                if status.errored() {
                    digest.errored = true;
                    digest.errored_message = status.message.clone();
                }
            }
        }

        digest
    }

    /// Switch the title to the slot's singular form.
    pub(crate) fn use_singular_title(&mut self, slot: DigestSlot) {
        self.title = slot.singular.to_string();
    }

    /// Append the evaluated value.
    ///
    /// This is the single mutation step: it fills the correlation ids,
    /// derives the `evaluated` flag from the evaluation kind, and clears
    /// the error state the digest was seeded with.
    pub(crate) fn append_value(&mut self, eval: &Evaluation, value: DigestValue) {
        self.data = Some(value);
        if !eval.id.is_empty() {
            self.scan_id = eval.id.clone();
        }
        self.rule_id = eval.rule_id.clone();
        self.ruleset_id = eval.ruleset_id.clone();
        self.evaluated = eval.evaluated();
        self.errored = false;
        self.errored_message = String::new();
    }

    /// Flag the digest with a warning message.
    pub(crate) fn warn(&mut self, message: &str) {
        self.warning = true;
        self.warning_message = message.to_string();
    }
}
