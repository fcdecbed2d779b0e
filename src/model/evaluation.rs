//! Rule evaluations and their lazily-translated results.
//!
//! An [`Evaluation`] arrives from the rules API with its result payload as
//! raw JSON. [`Evaluation::translate`] decodes it into a typed
//! [`ResultVariant`] exactly once; the payload is modeled as an explicit
//! two-state value ([`EvaluationResult`]) so a half-translated record cannot
//! exist.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use super::results::ResultVariant;
use crate::error::TranslateError;

/// Sentinel ruleset name for analyses no ruleset evaluation was supplied
/// for. Distinct from the empty string, which means "not yet evaluated".
pub const RULESET_NAME_UNAVAILABLE: &str = "N/A";

/// Evaluation kind marking metrics that are reported but not graded.
const KIND_NOT_EVALUATED: &str = "not evaluated";

/// The result payload of an evaluation.
///
/// Either raw bytes as fetched or the decoded variant, never both.
/// [`Evaluation::translate`] is the only transition between the two.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EvaluationResult {
    /// No result payload attached.
    #[default]
    Empty,
    /// Raw payload as fetched, not yet decoded.
    Raw(Value),
    /// Decoded canonical form.
    Translated(ResultVariant),
}

impl EvaluationResult {
    /// Whether no payload is attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// The decoded variant, if translation has happened.
    #[must_use]
    pub fn variant(&self) -> Option<&ResultVariant> {
        match self {
            Self::Translated(variant) => Some(variant),
            _ => None,
        }
    }
}

impl Serialize for EvaluationResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Empty => serializer.serialize_none(),
            Self::Raw(raw) => raw.serialize(serializer),
            Self::Translated(variant) => variant
                .encode()
                .map_err(serde::ser::Error::custom)?
                .serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for EvaluationResult {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(if value.is_null() {
            Self::Empty
        } else {
            Self::Raw(value)
        })
    }
}

/// A scan's result joined with the rule that graded it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Evaluation {
    /// Id of the scan this evaluation belongs to.
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub analysis_id: String,
    #[serde(default)]
    pub rule_id: String,
    #[serde(default)]
    pub ruleset_id: String,
    /// Evaluation kind; `"not evaluated"` marks informational metrics.
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub risk: String,
    #[serde(default)]
    pub passed: bool,
    /// Scan duration in milliseconds.
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Result payload; raw until [`Evaluation::translate`] is called.
    #[serde(
        default,
        rename = "results",
        skip_serializing_if = "EvaluationResult::is_empty"
    )]
    pub result: EvaluationResult,
}

impl Evaluation {
    /// Attach a raw result payload, replacing whatever was present.
    #[must_use]
    pub fn with_raw_result(mut self, raw: Value) -> Self {
        self.result = if raw.is_null() {
            EvaluationResult::Empty
        } else {
            EvaluationResult::Raw(raw)
        };
        self
    }

    /// Decode the raw result payload into its typed variant.
    ///
    /// Idempotent: already-translated and empty results are left untouched,
    /// and a raw `null` collapses to empty without error. Fails only when
    /// the raw payload is genuinely malformed.
    pub fn translate(&mut self) -> Result<(), TranslateError> {
        let EvaluationResult::Raw(raw) = &self.result else {
            return Ok(());
        };
        if raw.is_null() {
            self.result = EvaluationResult::Empty;
            return Ok(());
        }
        let variant = ResultVariant::decode_envelope(raw)?;
        self.result = EvaluationResult::Translated(variant);
        Ok(())
    }

    /// Whether a rule actually graded this metric.
    #[must_use]
    pub fn evaluated(&self) -> bool {
        !self.kind.eq_ignore_ascii_case(KIND_NOT_EVALUATED)
    }
}

/// Rule-evaluation summary for one analysis, as returned by the rules API.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RulesetEvaluation {
    #[serde(default)]
    pub ruleset_id: String,
    #[serde(default)]
    pub ruleset_name: String,
    /// Overall textual verdict, e.g. `"pass"` or `"fail"`.
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub risk: String,
    #[serde(default)]
    pub passed: bool,
    #[serde(default)]
    pub evaluations: Vec<Evaluation>,
}

impl RulesetEvaluation {
    /// Whether the overall verdict reads as a pass. `"pass"`, `"passed"`
    /// and `"passing"` all count, in any casing.
    #[must_use]
    pub fn passing(&self) -> bool {
        matches!(
            self.summary.trim().to_lowercase().as_str(),
            "pass" | "passed" | "passing"
        )
    }

    /// The evaluation belonging to a scan, if the ruleset graded it.
    #[must_use]
    pub fn evaluation_for(&self, scan_id: &str) -> Option<&Evaluation> {
        self.evaluations.iter().find(|e| e.id == scan_id)
    }
}

/// Analysis-level business fields carried into a denormalized summary.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Analysis {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub trigger_author: String,
    #[serde(default)]
    pub trigger_text: String,
    /// Analysis duration in milliseconds.
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Denormalized pass/fail record for one analysis.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub analysis_id: String,
    pub trigger_author: String,
    pub trigger_text: String,
    pub duration: f64,
    pub risk: String,
    pub passed: bool,
    pub ruleset_id: String,
    pub ruleset_name: String,
}

/// Combine an analysis' business fields with its ruleset verdict.
///
/// Without a ruleset evaluation the verdict defaults conservatively:
/// `risk = "high"`, `passed = false`, and the ruleset name becomes the
/// [`RULESET_NAME_UNAVAILABLE`] sentinel. An empty ruleset name on a
/// supplied evaluation means "not yet evaluated" and passes through
/// untouched.
#[must_use]
pub fn summarize(analysis: &Analysis, applied: Option<&RulesetEvaluation>) -> AnalysisSummary {
    let (risk, passed, ruleset_id, ruleset_name) = match applied {
        Some(ruleset) => (
            ruleset.risk.clone(),
            ruleset.passed,
            ruleset.ruleset_id.clone(),
            ruleset.ruleset_name.clone(),
        ),
        None => (
            "high".to_string(),
            false,
            String::new(),
            RULESET_NAME_UNAVAILABLE.to_string(),
        ),
    };

    AnalysisSummary {
        analysis_id: analysis.id.clone(),
        trigger_author: analysis.trigger_author.clone(),
        trigger_text: analysis.trigger_text.clone(),
        duration: analysis.duration,
        risk,
        passed,
        ruleset_id,
        ruleset_name,
    }
}
