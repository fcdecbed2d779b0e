//! Per-category digest builders.
//!
//! Each builder receives the scan's status plus its (possibly absent,
//! already-translated) evaluation and emits the category's digest rows. A
//! builder asserts the translated payload matches its category; a mismatch
//! is a hard error for the scan because the category tag and payload shape
//! must agree.

use super::digest::{slots, Digest, DigestValue};
use crate::error::DigestError;
use crate::model::{Evaluation, ResultVariant, ScanStatus, SeverityTier};

/// Round a coverage value to two decimal places.
fn round_percent(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// The evaluation and its translated results, if the scan finished cleanly
/// and a rule produced a payload for it.
fn scan_results<'a>(
    status: &ScanStatus,
    eval: Option<&'a Evaluation>,
) -> Option<(&'a Evaluation, &'a ResultVariant)> {
    if status.errored() {
        return None;
    }
    let eval = eval?;
    let variant = eval.result.variant()?;
    Some((eval, variant))
}

pub(crate) fn ecosystems_digests(
    status: &ScanStatus,
    eval: Option<&Evaluation>,
) -> Result<Vec<Digest>, DigestError> {
    let mut digest = Digest::new(slots::ECOSYSTEMS, Some(status));

    if let Some((eval, variant)) = scan_results(status, eval) {
        let ResultVariant::Ecosystem(results) = variant else {
            return Err(DigestError::mismatch("ecosystems", "ecosystems", variant.tag()));
        };

        let mut names = results.ecosystems.keys();
        let value = match (results.ecosystems.len(), names.next()) {
            (0, _) | (_, None) => DigestValue::Chars("none detected".to_string()),
            (1, Some(name)) => {
                digest.use_singular_title(slots::ECOSYSTEMS);
                DigestValue::Chars(name.clone())
            }
            (count, Some(_)) => DigestValue::Count(count as u64),
        };

        digest.append_value(eval, value);
        // Detected languages are reported for information only, never graded.
        digest.evaluated = false;
    }

    Ok(vec![digest])
}

pub(crate) fn community_digests(
    status: &ScanStatus,
    eval: Option<&Evaluation>,
) -> Result<Vec<Digest>, DigestError> {
    let mut digest = Digest::new(slots::UNIQUE_COMMITTERS, Some(status));

    if let Some((eval, variant)) = scan_results(status, eval) {
        let ResultVariant::Community(results) = variant else {
            return Err(DigestError::mismatch("community", "community", variant.tag()));
        };

        if results.committers == 1 {
            digest.use_singular_title(slots::UNIQUE_COMMITTERS);
            digest.warn("single committer repository");
        }
        digest.append_value(eval, DigestValue::Count(results.committers));
    }

    Ok(vec![digest])
}

pub(crate) fn coverage_digests(
    status: &ScanStatus,
    eval: Option<&Evaluation>,
) -> Result<Vec<Digest>, DigestError> {
    let mut digest = Digest::new(slots::CODE_COVERAGE, Some(status));

    if let Some((eval, variant)) = scan_results(status, eval) {
        let ResultVariant::Coverage(results) = variant else {
            return Err(DigestError::mismatch("coverage", "coverage", variant.tag()));
        };

        digest.append_value(eval, DigestValue::Percent(round_percent(results.value)));
    }

    Ok(vec![digest])
}

pub(crate) fn dependency_digests(
    status: &ScanStatus,
    eval: Option<&Evaluation>,
) -> Result<Vec<Digest>, DigestError> {
    let mut outdated = Digest::new(slots::OUTDATED_DEPENDENCIES, Some(status));
    let mut no_version = Digest::new(slots::NO_VERSION_DEPENDENCIES, Some(status));
    let mut direct = Digest::new(slots::DIRECT_DEPENDENCIES, Some(status));
    let mut transitive = Digest::new(slots::TRANSITIVE_DEPENDENCIES, Some(status));

    if let Some((eval, variant)) = scan_results(status, eval) {
        let ResultVariant::Dependency(results) = variant else {
            return Err(DigestError::mismatch("dependency", "dependency", variant.tag()));
        };
        let meta = &results.meta;

        outdated.append_value(eval, DigestValue::Count(meta.update_available_count));
        no_version.append_value(eval, DigestValue::Count(meta.no_version_count));

        if meta.first_degree_count == 0 {
            direct.warn("no direct dependencies found");
        }
        direct.append_value(eval, DigestValue::Count(meta.first_degree_count));

        let transitive_count = meta.total_unique_count.saturating_sub(meta.first_degree_count);
        if transitive_count == 0 {
            transitive.warn("no transitive dependencies found");
        }
        transitive.append_value(eval, DigestValue::Count(transitive_count));
    }

    let mut digests = vec![outdated, no_version, direct, transitive];
    // Dependency counts are informational only.
    for digest in &mut digests {
        digest.evaluated = false;
    }

    Ok(digests)
}

pub(crate) fn difference_digests(
    status: &ScanStatus,
    eval: Option<&Evaluation>,
) -> Result<Vec<Digest>, DigestError> {
    let mut digest = Digest::new(slots::DIFFERENCE_DETECTED, Some(status));

    if let Some((eval, variant)) = scan_results(status, eval) {
        let ResultVariant::Difference(results) = variant else {
            return Err(DigestError::mismatch("difference", "difference", variant.tag()));
        };

        digest.append_value(eval, DigestValue::Bool(results.difference));
        // Difference detection is informational only.
        digest.evaluated = false;
    }

    Ok(vec![digest])
}

pub(crate) fn license_digests(
    status: &ScanStatus,
    eval: Option<&Evaluation>,
) -> Result<Vec<Digest>, DigestError> {
    let mut digest = Digest::new(slots::LICENSES, Some(status));

    if let Some((eval, variant)) = scan_results(status, eval) {
        let ResultVariant::License(results) = variant else {
            return Err(DigestError::mismatch("license", "license", variant.tag()));
        };

        let types = &results.license.license_types;
        let value = match (types.len(), types.first()) {
            (0, _) | (_, None) => {
                digest.warn("no licenses found");
                DigestValue::Count(0)
            }
            (1, Some(license_type)) => {
                digest.use_singular_title(slots::LICENSES);
                DigestValue::Chars(license_type.name.clone())
            }
            (count, Some(_)) => DigestValue::Count(count as u64),
        };

        digest.append_value(eval, value);
    }

    Ok(vec![digest])
}

pub(crate) fn virus_digests(
    status: &ScanStatus,
    eval: Option<&Evaluation>,
) -> Result<Vec<Digest>, DigestError> {
    let mut scanned = Digest::new(slots::FILES_SCANNED, Some(status));
    let mut infected = Digest::new(slots::VIRUSES_FOUND, Some(status));

    if let Some((eval, variant)) = scan_results(status, eval) {
        let ResultVariant::Virus(results) = variant else {
            return Err(DigestError::mismatch("virus", "virus", variant.tag()));
        };

        if results.scanned_files == 0 {
            scanned.warn("no files were seen");
        }
        scanned.append_value(eval, DigestValue::Count(results.scanned_files));
        // The file total is informational; only infections are graded.
        scanned.evaluated = false;

        if results.infected_files > 0 {
            infected.warn("infected files were seen");
        }
        infected.append_value(eval, DigestValue::Count(results.infected_files));
    }

    Ok(vec![scanned, infected])
}

pub(crate) fn vulnerability_digests(
    status: &ScanStatus,
    eval: Option<&Evaluation>,
) -> Result<Vec<Digest>, DigestError> {
    let mut total = Digest::new(slots::TOTAL_VULNERABILITIES, Some(status));
    let mut unique = Digest::new(slots::UNIQUE_VULNERABILITIES, Some(status));
    let mut high = Digest::new(slots::HIGH_VULNERABILITIES, Some(status));
    let mut critical = Digest::new(slots::CRITICAL_VULNERABILITIES, Some(status));

    if let Some((eval, variant)) = scan_results(status, eval) {
        let ResultVariant::Vulnerability(results) = variant else {
            return Err(DigestError::mismatch(
                "vulnerability",
                "vulnerability",
                variant.tag(),
            ));
        };

        let total_count = results.total_count();
        if total_count == 1 {
            total.use_singular_title(slots::TOTAL_VULNERABILITIES);
        }
        if total_count > 0 {
            total.warn("vulnerabilities were found");
        }
        total.append_value(eval, DigestValue::Count(total_count));
        total.evaluated = false;

        let unique_count = results.unique_count();
        if unique_count == 1 {
            unique.use_singular_title(slots::UNIQUE_VULNERABILITIES);
        }
        if unique_count > 0 {
            unique.warn("vulnerabilities were found");
        }
        unique.append_value(eval, DigestValue::Count(unique_count));
        unique.evaluated = false;

        let high_count = results.count_in_tier(SeverityTier::High);
        high.passed = high_count == 0;
        high.append_value(eval, DigestValue::Count(high_count));

        let critical_count = results.count_in_tier(SeverityTier::Critical);
        critical.passed = critical_count == 0;
        critical.append_value(eval, DigestValue::Count(critical_count));
    }

    Ok(vec![total, unique, high, critical])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        CommunityResults, CoverageResults, CvssDetail, DependencyMeta, DependencyResults,
        DifferenceResults, EcosystemResults, EvaluationResult, License, LicenseResults,
        LicenseType, ScoreDetails, VirusResults, Vulnerability, VulnerabilityMeta,
        VulnerabilityResults, VulnerablePackage,
    };
    use indexmap::IndexMap;

    fn finished(name: &str) -> ScanStatus {
        ScanStatus {
            id: format!("scan-{name}"),
            name: name.to_string(),
            status: "finished".to_string(),
            ..ScanStatus::default()
        }
    }

    fn eval_with(variant: ResultVariant) -> Evaluation {
        Evaluation {
            id: "scan-1".to_string(),
            rule_id: "rule-1".to_string(),
            ruleset_id: "rs-1".to_string(),
            kind: "evaluation".to_string(),
            result: EvaluationResult::Translated(variant),
            ..Evaluation::default()
        }
    }

    fn ecosystems(entries: &[(&str, i64)]) -> ResultVariant {
        ResultVariant::Ecosystem(EcosystemResults {
            ecosystems: entries
                .iter()
                .map(|(k, v)| ((*k).to_string(), *v))
                .collect::<IndexMap<_, _>>(),
        })
    }

    #[test]
    fn ecosystems_none_detected() {
        let eval = eval_with(ecosystems(&[]));
        let digests = ecosystems_digests(&finished("ecosystems"), Some(&eval)).unwrap();
        assert_eq!(digests.len(), 1);
        assert_eq!(
            digests[0].data,
            Some(DigestValue::Chars("none detected".to_string()))
        );
        assert_eq!(digests[0].title, "languages");
        assert!(!digests[0].evaluated);
    }

    #[test]
    fn ecosystems_single_language_is_singular_chars() {
        let eval = eval_with(ecosystems(&[("C#", 430_056)]));
        let digests = ecosystems_digests(&finished("ecosystems"), Some(&eval)).unwrap();
        assert_eq!(digests[0].data, Some(DigestValue::Chars("C#".to_string())));
        assert_eq!(digests[0].title, "language");
    }

    #[test]
    fn ecosystems_many_languages_is_plural_count() {
        let eval = eval_with(ecosystems(&[("Go", 1), ("Rust", 2), ("C", 3), ("Sh", 4)]));
        let digests = ecosystems_digests(&finished("ecosystems"), Some(&eval)).unwrap();
        assert_eq!(digests[0].data, Some(DigestValue::Count(4)));
        assert_eq!(digests[0].title, "languages");
    }

    #[test]
    fn ecosystems_rejects_mismatched_payload() {
        let eval = eval_with(ResultVariant::Coverage(CoverageResults { value: 1.0 }));
        let err = ecosystems_digests(&finished("ecosystems"), Some(&eval)).unwrap_err();
        assert!(
            matches!(err, DigestError::PayloadShapeMismatch { found: "coverage", .. }),
            "{err}"
        );
    }

    #[test]
    fn community_single_committer_warns() {
        let eval = eval_with(ResultVariant::Community(CommunityResults {
            committers: 1,
            ..CommunityResults::default()
        }));
        let digests = community_digests(&finished("community"), Some(&eval)).unwrap();
        assert_eq!(digests[0].data, Some(DigestValue::Count(1)));
        assert_eq!(digests[0].title, "unique committer");
        assert!(digests[0].warning);
        assert_eq!(digests[0].warning_message, "single committer repository");
    }

    #[test]
    fn community_many_committers_plain_count() {
        let eval = eval_with(ResultVariant::Community(CommunityResults {
            committers: 12,
            ..CommunityResults::default()
        }));
        let digests = community_digests(&finished("community"), Some(&eval)).unwrap();
        assert_eq!(digests[0].data, Some(DigestValue::Count(12)));
        assert_eq!(digests[0].title, "unique committers");
        assert!(!digests[0].warning);
    }

    #[test]
    fn coverage_rounds_to_two_decimals() {
        let eval = eval_with(ResultVariant::Coverage(CoverageResults {
            value: 93.881_856_640_084_39,
        }));
        let digests = coverage_digests(&finished("coverage"), Some(&eval)).unwrap();
        assert_eq!(digests[0].data, Some(DigestValue::Percent(93.88)));
        assert_eq!(digests[0].title, "code coverage");
    }

    fn dependency_eval(meta: DependencyMeta) -> Evaluation {
        eval_with(ResultVariant::Dependency(DependencyResults {
            dependencies: Vec::new(),
            meta,
        }))
    }

    #[test]
    fn dependency_emits_four_informational_digests() {
        let eval = dependency_eval(DependencyMeta {
            first_degree_count: 2,
            no_version_count: 1,
            total_unique_count: 115,
            update_available_count: 2,
        });
        let digests = dependency_digests(&finished("dependency"), Some(&eval)).unwrap();
        assert_eq!(digests.len(), 4);

        assert_eq!(digests[0].title, "outdated dependencies");
        assert_eq!(digests[0].data, Some(DigestValue::Count(2)));
        assert_eq!(digests[1].data, Some(DigestValue::Count(1)));
        assert_eq!(digests[2].data, Some(DigestValue::Count(2)));
        assert_eq!(digests[3].title, "transitive dependencies");
        assert_eq!(digests[3].data, Some(DigestValue::Count(113)));
        assert!(!digests[3].warning);
        assert!(digests.iter().all(|d| !d.evaluated));
    }

    #[test]
    fn dependency_zero_transitive_warns() {
        let eval = dependency_eval(DependencyMeta {
            first_degree_count: 2,
            no_version_count: 1,
            total_unique_count: 2,
            update_available_count: 2,
        });
        let digests = dependency_digests(&finished("dependency"), Some(&eval)).unwrap();
        assert_eq!(digests[3].data, Some(DigestValue::Count(0)));
        assert!(digests[3].warning);
        assert_eq!(digests[3].warning_message, "no transitive dependencies found");
    }

    #[test]
    fn dependency_zero_direct_warns() {
        let eval = dependency_eval(DependencyMeta::default());
        let digests = dependency_digests(&finished("dependency"), Some(&eval)).unwrap();
        assert!(digests[2].warning);
        assert_eq!(digests[2].warning_message, "no direct dependencies found");
    }

    #[test]
    fn difference_is_informational_bool() {
        let eval = eval_with(ResultVariant::Difference(DifferenceResults {
            checksum: "abc".to_string(),
            difference: true,
        }));
        let digests = difference_digests(&finished("difference"), Some(&eval)).unwrap();
        assert_eq!(digests[0].data, Some(DigestValue::Bool(true)));
        assert_eq!(digests[0].title, "difference detected");
        assert!(!digests[0].evaluated);
    }

    fn license_eval(type_names: &[&str]) -> Evaluation {
        eval_with(ResultVariant::License(LicenseResults {
            license: License {
                name: "LICENSE.md".to_string(),
                license_types: type_names
                    .iter()
                    .map(|name| LicenseType {
                        name: (*name).to_string(),
                        confidence: 1.0,
                    })
                    .collect(),
            },
        }))
    }

    #[test]
    fn license_none_found_warns_with_zero_count() {
        let digests = license_digests(&finished("license"), Some(&license_eval(&[]))).unwrap();
        assert_eq!(digests[0].data, Some(DigestValue::Count(0)));
        assert!(digests[0].warning);
        assert_eq!(digests[0].warning_message, "no licenses found");
    }

    #[test]
    fn license_single_type_uses_name_and_singular_title() {
        let digests = license_digests(&finished("license"), Some(&license_eval(&["mit"]))).unwrap();
        assert_eq!(digests[0].data, Some(DigestValue::Chars("mit".to_string())));
        assert_eq!(digests[0].title, "license");
    }

    #[test]
    fn license_multiple_types_use_count() {
        let digests =
            license_digests(&finished("license"), Some(&license_eval(&["mit", "apache-2.0"])))
                .unwrap();
        assert_eq!(digests[0].data, Some(DigestValue::Count(2)));
        assert_eq!(digests[0].title, "licenses");
    }

    fn virus_eval(scanned_files: u64, infected_files: u64) -> Evaluation {
        eval_with(ResultVariant::Virus(VirusResults {
            scanned_files,
            infected_files,
            ..VirusResults::default()
        }))
    }

    #[test]
    fn virus_zero_scanned_warns_and_stays_informational() {
        let digests = virus_digests(&finished("virus"), Some(&virus_eval(0, 0))).unwrap();
        assert_eq!(digests.len(), 2);

        assert_eq!(digests[0].title, "total files scanned");
        assert_eq!(digests[0].data, Some(DigestValue::Count(0)));
        assert!(digests[0].warning);
        assert_eq!(digests[0].warning_message, "no files were seen");
        assert!(!digests[0].evaluated);

        assert_eq!(digests[1].title, "viruses found");
        assert_eq!(digests[1].data, Some(DigestValue::Count(0)));
        assert!(!digests[1].warning);
    }

    #[test]
    fn virus_infections_warn() {
        let digests = virus_digests(&finished("virus"), Some(&virus_eval(4000, 2))).unwrap();
        assert!(!digests[0].warning);
        assert!(digests[1].warning);
        assert_eq!(digests[1].warning_message, "infected files were seen");
    }

    fn vuln(id: &str, v2: Option<f64>, v3: Option<f64>) -> Vulnerability {
        Vulnerability {
            id: id.to_string(),
            score_details: ScoreDetails {
                cvssv2: v2.map(|base_score| CvssDetail {
                    base_score,
                    ..CvssDetail::default()
                }),
                cvssv3: v3.map(|base_score| CvssDetail {
                    base_score,
                    ..CvssDetail::default()
                }),
            },
            ..Vulnerability::default()
        }
    }

    fn vulnerability_eval(vulns: Vec<Vulnerability>) -> Evaluation {
        let count = vulns.len() as u64;
        eval_with(ResultVariant::Vulnerability(VulnerabilityResults {
            vulnerabilities: vec![VulnerablePackage {
                name: "pkg".to_string(),
                version: "0.1.0".to_string(),
                vulnerabilities: vulns,
            }],
            meta: VulnerabilityMeta {
                vulnerability_count: count,
            },
        }))
    }

    #[test]
    fn vulnerability_severity_buckets_are_exclusive() {
        let eval = vulnerability_eval(vec![
            vuln("CVE-1", None, Some(9.5)),
            vuln("CVE-2", None, Some(7.5)),
            vuln("CVE-3", Some(7.5), None),
        ]);
        let digests = vulnerability_digests(&finished("vulnerability"), Some(&eval)).unwrap();
        assert_eq!(digests.len(), 4);

        let high = &digests[2];
        assert_eq!(high.title, "high vulnerabilities");
        assert_eq!(high.data, Some(DigestValue::Count(2)));
        assert!(!high.passed);

        let critical = &digests[3];
        assert_eq!(critical.title, "critical vulnerabilities");
        assert_eq!(critical.data, Some(DigestValue::Count(1)));
        assert!(!critical.passed);
    }

    #[test]
    fn vulnerability_counts_warn_and_use_singular_at_one() {
        let eval = vulnerability_eval(vec![vuln("CVE-1", None, Some(3.0))]);
        let digests = vulnerability_digests(&finished("vulnerability"), Some(&eval)).unwrap();

        let total = &digests[0];
        assert_eq!(total.title, "total vulnerability");
        assert_eq!(total.data, Some(DigestValue::Count(1)));
        assert!(total.warning);
        assert!(!total.evaluated);

        let unique = &digests[1];
        assert_eq!(unique.title, "unique vulnerability");
        assert_eq!(unique.data, Some(DigestValue::Count(1)));
        assert!(unique.warning);
    }

    #[test]
    fn vulnerability_clean_scan_passes_graded_tiers() {
        let eval = vulnerability_eval(Vec::new());
        let digests = vulnerability_digests(&finished("vulnerability"), Some(&eval)).unwrap();

        assert!(!digests[0].warning);
        assert_eq!(digests[2].data, Some(DigestValue::Count(0)));
        assert!(digests[2].passed);
        assert!(digests[3].passed);
    }

    #[test]
    fn errored_status_skips_value_append() {
        let status = ScanStatus {
            id: "scan-v".to_string(),
            name: "virus".to_string(),
            status: "errored".to_string(),
            message: "clamav died".to_string(),
            ..ScanStatus::default()
        };
        let digests = virus_digests(&status, Some(&virus_eval(10, 0))).unwrap();
        assert!(digests[0].errored);
        assert_eq!(digests[0].errored_message, "clamav died");
        assert!(digests[0].data.is_none());
    }
}
