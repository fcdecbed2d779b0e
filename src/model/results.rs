//! Typed scan result payloads and the wire codec for them.
//!
//! Every scan emits a `{type, data}` envelope whose `data` shape depends on
//! the `type` discriminator. [`ResultVariant`] models the ten known shapes as
//! a closed sum type, so "more than one payload populated" is impossible to
//! represent. [`ResultVariant::decode`] and [`ResultVariant::encode`] convert
//! between the envelope and the typed form; payloads that predate the
//! envelope are recognized by [`ResultVariant::decode_envelope`]'s legacy
//! fallback.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::vulnerability::VulnerabilityResults;
use crate::error::TranslateError;

/// A decoded scan result. Exactly one shape per scan type.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ResultVariant {
    AboutYml(AboutYmlResults),
    Community(CommunityResults),
    Coverage(CoverageResults),
    Dependency(DependencyResults),
    Difference(DifferenceResults),
    Ecosystem(EcosystemResults),
    ExternalVulnerabilities(ExternalVulnerabilitiesResults),
    License(LicenseResults),
    Virus(VirusResults),
    Vulnerability(VulnerabilityResults),
}

/// Fields a pre-envelope payload may populate; exactly one must be non-null.
///
/// `committers` is the historical key for community results.
const LEGACY_FIELDS: [&str; 10] = [
    "about_yml",
    "committers",
    "coverage",
    "dependency",
    "difference",
    "ecosystems",
    "external_vulnerability",
    "license",
    "virus",
    "vulnerabilities",
];

impl ResultVariant {
    /// Canonical wire discriminator for this variant.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            Self::AboutYml(_) => "about_yml",
            Self::Community(_) => "community",
            Self::Coverage(_) => "coverage",
            Self::Dependency(_) => "dependency",
            Self::Difference(_) => "difference",
            Self::Ecosystem(_) => "ecosystems",
            Self::ExternalVulnerabilities(_) => "external_vulnerability",
            Self::License(_) => "license",
            Self::Virus(_) => "virus",
            Self::Vulnerability(_) => "vulnerability",
        }
    }

    /// Decode a tagged data payload into its typed variant.
    ///
    /// The tag is matched case-insensitively and known aliases are accepted:
    /// `external_coverage` for `coverage`, `clamav` for `virus`, and the
    /// singular/plural spellings of `ecosystems`, `external_vulnerability`
    /// and `vulnerability`.
    pub fn decode(tag: &str, data: &Value) -> Result<Self, TranslateError> {
        match tag.to_lowercase().as_str() {
            "about_yml" => Ok(Self::AboutYml(payload(tag, data)?)),
            "community" => Ok(Self::Community(payload(tag, data)?)),
            "coverage" | "external_coverage" => Ok(Self::Coverage(payload(tag, data)?)),
            "dependency" => Ok(Self::Dependency(payload(tag, data)?)),
            "difference" => Ok(Self::Difference(payload(tag, data)?)),
            "ecosystems" | "ecosystem" => Ok(Self::Ecosystem(payload(tag, data)?)),
            "external_vulnerability" | "external_vulnerabilities" => {
                Ok(Self::ExternalVulnerabilities(payload(tag, data)?))
            }
            "license" => Ok(Self::License(payload(tag, data)?)),
            "virus" | "clamav" => Ok(Self::Virus(payload(tag, data)?)),
            "vulnerability" | "vulnerabilities" => Ok(Self::Vulnerability(payload(tag, data)?)),
            _ => Err(TranslateError::unsupported(tag)),
        }
    }

    /// Decode a raw `results` payload.
    ///
    /// Payloads normally carry a `{type, data}` envelope. Older payloads do
    /// not; those are identified by which single known field is populated.
    pub fn decode_envelope(raw: &Value) -> Result<Self, TranslateError> {
        if let Some(tag) = raw.get("type").and_then(Value::as_str) {
            let data = raw.get("data").cloned().unwrap_or(Value::Null);
            return Self::decode(tag, &data);
        }
        Self::decode_legacy(raw)
    }

    fn decode_legacy(raw: &Value) -> Result<Self, TranslateError> {
        let Some(obj) = raw.as_object() else {
            return Err(TranslateError::malformed(
                "results",
                "payload is not a JSON object",
            ));
        };

        let populated: Vec<&str> = LEGACY_FIELDS
            .iter()
            .copied()
            .filter(|field| obj.get(*field).is_some_and(|v| !v.is_null()))
            .collect();

        let field = match populated.as_slice() {
            [one] => *one,
            [] => {
                return Err(TranslateError::malformed(
                    "results",
                    "payload carries no type envelope and no known result field",
                ))
            }
            many => {
                return Err(TranslateError::malformed(
                    "results",
                    format!("payload populates multiple result fields: {}", many.join(", ")),
                ))
            }
        };

        tracing::debug!(field, "results payload has no type envelope, using legacy field detection");

        let mut data = obj[field].clone();
        if field == "committers" {
            // Some historical community payloads arrive as a one-element
            // array instead of an object.
            data = match data {
                Value::Array(items) => items.into_iter().next().unwrap_or(Value::Null),
                other => other,
            };
        }

        let tag = match field {
            "committers" => "community",
            "vulnerabilities" => "vulnerability",
            other => other,
        };

        Self::decode(tag, &data)
    }

    /// Encode this variant into its `{type, data}` wire envelope.
    pub fn encode(&self) -> Result<Value, TranslateError> {
        let data = match self {
            Self::AboutYml(r) => serde_json::to_value(r),
            Self::Community(r) => serde_json::to_value(r),
            Self::Coverage(r) => serde_json::to_value(r),
            Self::Dependency(r) => serde_json::to_value(r),
            Self::Difference(r) => serde_json::to_value(r),
            Self::Ecosystem(r) => serde_json::to_value(r),
            Self::ExternalVulnerabilities(r) => serde_json::to_value(r),
            Self::License(r) => serde_json::to_value(r),
            Self::Virus(r) => serde_json::to_value(r),
            Self::Vulnerability(r) => serde_json::to_value(r),
        }
        .map_err(|e| TranslateError::Encode {
            tag: self.tag().to_string(),
            message: e.to_string(),
        })?;

        Ok(serde_json::json!({ "type": self.tag(), "data": data }))
    }
}

fn payload<T: DeserializeOwned>(tag: &str, data: &Value) -> Result<T, TranslateError> {
    serde_json::from_value(data.clone()).map_err(|e| TranslateError::malformed(tag, e))
}

// ============================================================================
// Payload shapes
// ============================================================================

/// Validity check of the project's `.about.yml` file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AboutYmlResults {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub valid: bool,
    #[serde(default)]
    pub content: String,
}

/// Committer activity observed on the project repository.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CommunityResults {
    #[serde(default)]
    pub committers: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub committed_at: Option<DateTime<Utc>>,
}

/// Code coverage as reported by an external coverage tool.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CoverageResults {
    #[serde(default)]
    pub value: f64,
}

/// The project's resolved dependency tree plus aggregate counts.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DependencyResults {
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
    #[serde(default)]
    pub meta: DependencyMeta,
}

/// Aggregate counts for a dependency scan.
///
/// `total_unique_count` covers the whole tree; first-degree entries are the
/// direct dependencies, so transitive = total unique − first degree.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DependencyMeta {
    #[serde(default)]
    pub first_degree_count: u64,
    #[serde(default)]
    pub no_version_count: u64,
    #[serde(default)]
    pub total_unique_count: u64,
    #[serde(default)]
    pub update_available_count: u64,
}

/// A single resolved dependency. Nested dependencies are its transitive
/// closure as reported by the resolver.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Dependency {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub latest_version: String,
    #[serde(default)]
    pub org: String,
    #[serde(default)]
    pub package: String,
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub requirement: String,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

/// Whether the analyzed artifact differs from the previously analyzed one.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DifferenceResults {
    #[serde(default)]
    pub checksum: String,
    #[serde(default)]
    pub difference: bool,
}

/// Languages detected in the project, with bytes of code per language.
///
/// The wire payload is the bare map (`{"C#": 430056}`), so the map is
/// flattened and keeps wire order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EcosystemResults {
    #[serde(flatten)]
    pub ecosystems: IndexMap<String, i64>,
}

/// Severity counts reported by an external vulnerability scanner.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExternalVulnerabilitiesResults {
    #[serde(default)]
    pub critical: u64,
    #[serde(default)]
    pub high: u64,
    #[serde(default)]
    pub medium: u64,
    #[serde(default)]
    pub low: u64,
}

/// License detection outcome for the project.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LicenseResults {
    #[serde(default)]
    pub license: License,
}

/// A detected license file and the license types matched inside it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct License {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub license_types: Vec<LicenseType>,
}

/// One license type matched within a license file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LicenseType {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub confidence: f32,
}

/// ClamAV virus scan output.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VirusResults {
    #[serde(default)]
    pub known_viruses: u64,
    #[serde(default)]
    pub engine_version: String,
    #[serde(default)]
    pub scanned_directories: u64,
    #[serde(default)]
    pub scanned_files: u64,
    #[serde(default)]
    pub infected_files: u64,
    #[serde(default)]
    pub data_scanned: String,
    #[serde(default)]
    pub data_read: String,
    #[serde(default)]
    pub time: String,
    /// Notes keyed by file path, in scanner output order.
    #[serde(default)]
    pub file_notes: IndexMap<String, Vec<String>>,
    #[serde(default)]
    pub clam_av_details: ClamAvDetails,
}

/// Engine and signature database versions used for the scan.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClamAvDetails {
    #[serde(default)]
    pub clamav_version: String,
    #[serde(default)]
    pub clamav_db_version: String,
}
