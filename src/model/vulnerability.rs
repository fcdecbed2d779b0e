//! Vulnerability result payloads and severity tiering.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// CVSS base score floor for the high tier.
const HIGH_FLOOR: f64 = 7.0;
/// CVSS v3 base score floor for the critical tier. v2 has no critical tier.
const CRITICAL_FLOOR: f64 = 9.0;

/// Results of a vulnerability scan across the project's resolved packages.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VulnerabilityResults {
    #[serde(default)]
    pub vulnerabilities: Vec<VulnerablePackage>,
    #[serde(default)]
    pub meta: VulnerabilityMeta,
}

/// Aggregate counts for a vulnerability scan.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VulnerabilityMeta {
    #[serde(default)]
    pub vulnerability_count: u64,
}

/// A package with one or more known vulnerabilities.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VulnerablePackage {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub vulnerabilities: Vec<Vulnerability>,
}

/// A single vulnerability record with its CVSS scoring.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Vulnerability {
    /// External identifier, e.g. `CVE-2021-44228`.
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub score: String,
    #[serde(default)]
    pub score_version: String,
    #[serde(default)]
    pub score_system: String,
    #[serde(default)]
    pub score_details: ScoreDetails,
}

/// CVSS details per scoring system version.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreDetails {
    #[serde(default)]
    pub cvssv2: Option<CvssDetail>,
    #[serde(default)]
    pub cvssv3: Option<CvssDetail>,
}

/// A single CVSS assessment.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CvssDetail {
    #[serde(default)]
    pub vector_string: String,
    #[serde(default)]
    pub base_score: f64,
}

/// Severity tier a vulnerability falls into. Tiers are mutually exclusive:
/// a record lands in exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeverityTier {
    /// CVSS v3 base score >= 9.0.
    Critical,
    /// CVSS v3 base score in [7.0, 9.0), or CVSS v2 >= 7.0 for records
    /// without a v3 assessment.
    High,
    /// Everything below the high floor.
    Other,
}

impl Vulnerability {
    /// Classify this vulnerability into its severity tier.
    ///
    /// A v3 score, when present, decides the tier alone; v2 is consulted
    /// only for records scored before CVSS v3 existed, and carries no
    /// critical tier.
    #[must_use]
    pub fn severity_tier(&self) -> SeverityTier {
        if let Some(v3) = &self.score_details.cvssv3 {
            if v3.base_score >= CRITICAL_FLOOR {
                return SeverityTier::Critical;
            }
            if v3.base_score >= HIGH_FLOOR {
                return SeverityTier::High;
            }
            return SeverityTier::Other;
        }
        if let Some(v2) = &self.score_details.cvssv2 {
            if v2.base_score >= HIGH_FLOOR {
                return SeverityTier::High;
            }
        }
        SeverityTier::Other
    }

    /// Identifier used for uniqueness counting; records without an id fall
    /// back to their title.
    #[must_use]
    pub fn unique_key(&self) -> &str {
        if self.id.is_empty() {
            &self.title
        } else {
            &self.id
        }
    }
}

impl VulnerabilityResults {
    /// Iterate every vulnerability across all packages.
    pub fn all(&self) -> impl Iterator<Item = &Vulnerability> {
        self.vulnerabilities
            .iter()
            .flat_map(|pkg| pkg.vulnerabilities.iter())
    }

    /// Total vulnerability count as reported by the scanner.
    #[must_use]
    pub fn total_count(&self) -> u64 {
        self.meta.vulnerability_count
    }

    /// Count of distinct vulnerability identifiers across all packages.
    #[must_use]
    pub fn unique_count(&self) -> u64 {
        let ids: BTreeSet<&str> = self.all().map(Vulnerability::unique_key).collect();
        ids.len() as u64
    }

    /// Count of vulnerabilities in a severity tier.
    #[must_use]
    pub fn count_in_tier(&self, tier: SeverityTier) -> u64 {
        self.all().filter(|v| v.severity_tier() == tier).count() as u64
    }
}
