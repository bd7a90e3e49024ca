//! End-to-end validation scenarios

use chrono::Duration;
use esig_core::fixtures::{self, date, SIGNATURE, SIGNER, TSA};
use esig_core::{
    CertificateStatus, CertificateWrapper, CheckStatus, Conclusion, ContainerFacts, ContainerType, DiagnosticData,
    EsigError, Indication, SigningCertificateRef, SubIndication, TimestampType,
};
use esig_policy::{default_policy, ValidationPolicy};
use esig_process::*;
use esig_qualification::SignatureQualification;

fn certificate<'a>(data: &'a mut DiagnosticData, id: &str) -> &'a mut CertificateWrapper {
    data.certificates
        .iter_mut()
        .find(|c| c.id == id)
        .expect("fixture certificate")
}

fn only_signature(reports: &Reports) -> &SignatureValidation {
    &reports.detailed.signatures[0]
}

fn assert_verdict(conclusion: &Conclusion, indication: Indication, sub: SubIndication) {
    assert!(conclusion.has(indication, sub), "got {}", conclusion);
}

/// Signer expired on 2025-03-01, claimed signing time 2024-12-31
fn expired_signer() -> DiagnosticData {
    let mut data = fixtures::basic_signature();
    certificate(&mut data, SIGNER).not_after = date(2025, 3, 1);
    data.signatures[0].claimed_signing_time = Some(date(2024, 12, 31));
    data
}

// ============================================================================
// Basic level
// ============================================================================

#[test]
fn test_valid_signature_passes() {
    let reports = validate(&fixtures::basic_signature(), default_policy()).unwrap();
    let simple = &reports.simple.signatures[0];

    assert_eq!(simple.indication, Indication::Passed);
    assert_eq!(simple.sub_indication, None);
    assert_eq!(simple.level_reached, ValidationLevel::B);
    assert_eq!(simple.signed_by.as_deref(), Some("CN=Alice Example,C=BE"));
    assert_eq!(reports.simple.valid_signatures_count, 1);

    let detailed = only_signature(&reports);
    assert!(detailed.bbbs.conclusion.is_passed());
    assert!(detailed.level(ValidationLevel::Lta).is_none());
}

#[test]
fn test_hash_failure_keeps_reporting_other_blocks() {
    let mut data = fixtures::basic_signature();
    data.signatures[0].digest_matchers[0].data_intact = false;

    let reports = validate(&data, default_policy()).unwrap();
    let detailed = only_signature(&reports);
    assert_verdict(&detailed.conclusion, Indication::Failed, SubIndication::HashFailure);
    assert_verdict(&detailed.bbbs.cv.conclusion, Indication::Failed, SubIndication::HashFailure);
    assert!(detailed.bbbs.isc.is_passed());
    assert!(detailed.bbbs.xcv.is_passed());
    assert!(!detailed.bbbs.xcv.checks.is_empty());
    assert!(!reports.simple.signatures[0].errors.is_empty());
}

#[test]
fn test_container_with_unsigned_file_fails() {
    let mut data = fixtures::basic_signature();
    data.container = Some(ContainerFacts {
        container_type: ContainerType::AsicE,
        files: vec![fixtures::SIGNED_FILE.to_string(), "hidden.pdf".to_string()],
    });

    let reports = validate(&data, default_policy()).unwrap();
    assert_verdict(&only_signature(&reports).conclusion, Indication::Failed, SubIndication::FormatFailure);
}

#[test]
fn test_weak_digest_without_poe() {
    let mut data = fixtures::basic_signature();
    data.signatures[0].algorithms.digest_algorithm = Some("SHA1".to_string());

    let reports = validate(&data, default_policy()).unwrap();
    assert_verdict(
        &only_signature(&reports).conclusion,
        Indication::Indeterminate,
        SubIndication::CryptoConstraintsFailureNoPoe,
    );
}

// ============================================================================
// Past validation
// ============================================================================

#[test]
fn test_expired_signer_rescued_by_signature_timestamp() {
    let data = fixtures::with_signature_timestamp(expired_signer(), "TST-1", date(2025, 1, 1));
    let reports = validate(&data, default_policy()).unwrap();
    let detailed = only_signature(&reports);

    assert!(!detailed.bbbs.conclusion.is_passed());
    assert!(detailed.conclusion.is_passed(), "got {}", detailed.conclusion);

    let lt = detailed.level(ValidationLevel::Lt).unwrap();
    let past = lt.past.as_ref().unwrap();
    assert_eq!(past.control_time, Some(date(2025, 1, 1)));
    assert_eq!(detailed.best_signature_time, date(2025, 1, 1));
    assert_eq!(reports.simple.signatures[0].level_reached, ValidationLevel::Lt);
}

#[test]
fn test_expired_signer_without_timestamp() {
    let reports = validate(&expired_signer(), default_policy()).unwrap();
    assert_verdict(
        &only_signature(&reports).conclusion,
        Indication::Indeterminate,
        SubIndication::Expired,
    );
}

#[test]
fn test_revoked_after_timestamp_passes() {
    let mut data = fixtures::basic_signature();
    data.signatures[0].claimed_signing_time = Some(date(2024, 12, 31));
    let status = &mut certificate(&mut data, SIGNER).revocations[0];
    status.status = CertificateStatus::Revoked;
    status.revocation_date = Some(date(2025, 3, 1));

    let without = validate(&data, default_policy()).unwrap();
    assert_verdict(
        &only_signature(&without).conclusion,
        Indication::Indeterminate,
        SubIndication::RevokedNoPoe,
    );

    let data = fixtures::with_signature_timestamp(data, "TST-1", date(2025, 1, 1));
    let with = validate(&data, default_policy()).unwrap();
    assert!(only_signature(&with).conclusion.is_passed());
}

#[test]
fn test_revoked_before_timestamp_stays_indeterminate() {
    let mut data = fixtures::basic_signature();
    let status = &mut certificate(&mut data, SIGNER).revocations[0];
    status.status = CertificateStatus::Revoked;
    status.revocation_date = Some(date(2024, 6, 1));
    let data = fixtures::with_signature_timestamp(data, "TST-1", date(2025, 1, 1));

    let reports = validate(&data, default_policy()).unwrap();
    assert_verdict(
        &only_signature(&reports).conclusion,
        Indication::Indeterminate,
        SubIndication::RevokedNoPoe,
    );
}

#[test]
fn test_past_validation_visits_are_bounded() {
    let mut data = fixtures::with_signature_timestamp(expired_signer(), "TST-1", date(2025, 2, 1));
    data = fixtures::with_signature_timestamp(data, "TST-2", date(2025, 2, 15));
    // no time is acceptable: the signer was revoked before any timestamp
    let status = &mut certificate(&mut data, SIGNER).revocations[0];
    status.status = CertificateStatus::Revoked;
    status.revocation_date = Some(date(2025, 1, 1));

    let reports = validate(&data, default_policy()).unwrap();
    let detailed = only_signature(&reports);
    let lt = detailed.level(ValidationLevel::Lt).unwrap();
    let past = lt.past.as_ref().unwrap();

    // validation time, TST-1, TST-2; the first visit is the evaluation at validation time
    let distinct_poe_times = 3;
    let visits = past.attempts.len() + 1;
    assert!(visits <= distinct_poe_times + 1);
    assert_eq!(past.attempts.len(), 2);
    assert!(!past.succeeded());
}

// ============================================================================
// T and LTA levels
// ============================================================================

#[test]
fn test_timestamp_order_failure() {
    let mut data = fixtures::with_signature_timestamp(fixtures::basic_signature(), "TST-1", date(2025, 1, 1));
    data.signatures[0].claimed_signing_time = Some(date(2024, 12, 31));
    data.timestamps.push(fixtures::timestamp(
        "CTS-1",
        TimestampType::Content,
        date(2025, 2, 1),
        Vec::new(),
    ));
    data.signatures[0].timestamps.push("CTS-1".to_string());

    let warn = validate(&data, default_policy()).unwrap();
    assert!(only_signature(&warn).conclusion.is_passed());
    assert!(!warn.simple.signatures[0].warnings.is_empty());

    let policy = ValidationPolicy::from_yaml("signature:\n  timestamp_coherence: FAIL\n").unwrap();
    let fail = validate(&data, &policy).unwrap();
    assert_verdict(
        &only_signature(&fail).conclusion,
        Indication::Indeterminate,
        SubIndication::TimestampOrderFailure,
    );
}

#[test]
fn test_archive_timestamp_reaches_lta() {
    let mut data = fixtures::with_signature_timestamp(fixtures::basic_signature(), "TST-1", date(2025, 1, 1));
    data.signatures[0].claimed_signing_time = Some(date(2024, 12, 31));
    let data = fixtures::with_archive_timestamp(data, "ATST-1", date(2025, 3, 1));

    let reports = validate(&data, default_policy()).unwrap();
    let detailed = only_signature(&reports);
    assert!(detailed.conclusion.is_passed(), "got {}", detailed.conclusion);
    assert_eq!(detailed.level_reached, ValidationLevel::Lta);

    let lta = detailed.level(ValidationLevel::Lta).unwrap();
    assert!(lta.block.as_ref().unwrap().is_passed());
}

#[test]
fn test_archive_timestamp_must_cover_signed_files() {
    let mut data = fixtures::with_archive_timestamp(fixtures::basic_signature(), "ATST-1", date(2025, 3, 1));
    data.timestamps[0].covered_files.clear();

    let reports = validate(&data, default_policy()).unwrap();
    assert_verdict(&only_signature(&reports).conclusion, Indication::Failed, SubIndication::FormatFailure);
}

#[test]
fn test_archive_timestamp_rescues_expired_timestamp_authority() {
    let mut data = fixtures::with_signature_timestamp(expired_signer(), "TST-1", date(2025, 1, 1));
    data = fixtures::with_archive_timestamp(data, "ATST-1", date(2025, 2, 1));

    let mut second = fixtures::tsa_certificate();
    second.id = "TSA-2".to_string();
    data.certificates.push(second);
    let archive = data.timestamps.iter_mut().find(|t| t.id == "ATST-1").unwrap();
    archive.signing_certificate = Some(SigningCertificateRef::resolved("TSA-2"));
    archive.certificate_chain = vec!["TSA-2".to_string(), fixtures::ROOT.to_string()];
    certificate(&mut data, TSA).not_after = date(2025, 4, 1);

    let reports = validate(&data, default_policy()).unwrap();
    let tst = reports.detailed.timestamps.iter().find(|t| t.id == "TST-1").unwrap();
    assert!(tst.is_passed());
    assert!(tst.past.as_ref().map_or(false, |p| p.succeeded()));
    assert!(only_signature(&reports).conclusion.is_passed());
}

/// Signature timestamp on 2025-01-01 plus archive timestamps at the given dates
fn archived(archives: &[(&str, chrono::DateTime<chrono::Utc>)]) -> DiagnosticData {
    let mut data = fixtures::with_signature_timestamp(fixtures::basic_signature(), "TST-1", date(2025, 1, 1));
    data.signatures[0].claimed_signing_time = Some(date(2024, 12, 31));
    for (id, at) in archives {
        data = fixtures::with_archive_timestamp(data, id, *at);
    }
    data
}

fn break_timestamp(data: &mut DiagnosticData, id: &str) {
    let timestamp = data.timestamps.iter_mut().find(|t| t.id == id).expect("fixture timestamp");
    timestamp.signature_intact = false;
}

fn lta_statuses(validation: &SignatureValidation, name: &str) -> Vec<CheckStatus> {
    let lta = validation.level(ValidationLevel::Lta).expect("LTA level");
    let block = lta.block.as_ref().expect("LTA block");
    block.checks.iter().filter(|c| c.name == name).map(|c| c.status).collect()
}

#[test]
fn test_failed_signature_stays_failed_at_lta() {
    let mut data = archived(&[("ATST-1", date(2025, 3, 1))]);
    data.signatures[0].digest_matchers[0].data_intact = false;
    break_timestamp(&mut data, "ATST-1");

    let reports = validate(&data, default_policy()).unwrap();
    let detailed = only_signature(&reports);
    assert_verdict(&detailed.bbbs.conclusion, Indication::Failed, SubIndication::HashFailure);
    assert_verdict(&detailed.conclusion, Indication::Failed, SubIndication::HashFailure);
    assert_eq!(reports.simple.signatures[0].sub_indication, Some(SubIndication::HashFailure));
}

#[test]
fn test_one_valid_archive_timestamp_is_enough() {
    let mut data = archived(&[("ATST-1", date(2025, 2, 1)), ("ATST-2", date(2025, 3, 1))]);
    break_timestamp(&mut data, "ATST-1");

    let reports = validate(&data, default_policy()).unwrap();
    let detailed = only_signature(&reports);
    assert!(detailed.conclusion.is_passed(), "got {}", detailed.conclusion);
    assert!(detailed.level(ValidationLevel::Lta).unwrap().block.as_ref().unwrap().is_passed());

    let mut statuses = lta_statuses(detailed, "LTA_ARCHIVE_TIMESTAMP_VALID");
    statuses.sort_by_key(|s| *s != CheckStatus::Ok);
    assert_eq!(statuses, vec![CheckStatus::Ok, CheckStatus::Warned]);
    assert_eq!(lta_statuses(detailed, "LTA_ARCHIVAL_DATA_VALID"), vec![CheckStatus::Ok]);
}

#[test]
fn test_no_valid_archive_timestamp() {
    let mut data = archived(&[("ATST-1", date(2025, 2, 1)), ("ATST-2", date(2025, 3, 1))]);
    break_timestamp(&mut data, "ATST-1");
    break_timestamp(&mut data, "ATST-2");

    let reports = validate(&data, default_policy()).unwrap();
    let detailed = only_signature(&reports);
    assert_verdict(&detailed.conclusion, Indication::Indeterminate, SubIndication::NoPoe);
    assert_eq!(lta_statuses(detailed, "LTA_ARCHIVAL_DATA_VALID"), vec![CheckStatus::Failed]);
}

#[test]
fn test_archival_data_requirement_follows_policy() {
    let mut data = archived(&[("ATST-1", date(2025, 3, 1))]);
    break_timestamp(&mut data, "ATST-1");

    let yaml = "signature:\n  archival_data_valid: WARN\n  archival_data_coverage: INFORM\n";
    let policy = ValidationPolicy::from_yaml(yaml).unwrap();
    let reports = validate(&data, &policy).unwrap();
    let detailed = only_signature(&reports);
    assert!(detailed.conclusion.is_passed(), "got {}", detailed.conclusion);
    assert_eq!(lta_statuses(detailed, "LTA_ARCHIVAL_DATA_VALID"), vec![CheckStatus::Warned]);
    assert_eq!(lta_statuses(detailed, "LTA_ARCHIVAL_DATA_COVERAGE"), vec![CheckStatus::Informed]);
}

#[test]
fn test_claimed_signing_time_has_its_own_level() {
    let mut data = fixtures::with_signature_timestamp(fixtures::basic_signature(), "TST-1", date(2025, 1, 1));
    data.signatures[0].claimed_signing_time = Some(date(2025, 1, 2));

    let coherence_only = ValidationPolicy::from_yaml("signature:\n  timestamp_coherence: FAIL\n").unwrap();
    let reports = validate(&data, &coherence_only).unwrap();
    assert!(only_signature(&reports).conclusion.is_passed());

    let strict = ValidationPolicy::from_yaml("signature:\n  claimed_signing_time_order: FAIL\n").unwrap();
    let reports = validate(&data, &strict).unwrap();
    assert_verdict(
        &only_signature(&reports).conclusion,
        Indication::Indeterminate,
        SubIndication::TimestampOrderFailure,
    );
}

// ============================================================================
// Counter-signatures, qualification, certificates
// ============================================================================

#[test]
fn test_counter_signature_uses_its_own_context() {
    let mut data = fixtures::basic_signature();
    let mut counter = fixtures::signature();
    counter.id = "CS-1".to_string();
    counter.counter_signature_of = Some(SIGNATURE.to_string());
    counter.signed_files.clear();
    data.signatures.push(counter);

    let reports = validate(&data, default_policy()).unwrap();
    let counter = &reports.detailed.signatures[1];
    assert_eq!(counter.context, esig_core::Context::CounterSignature);
    assert!(counter.conclusion.is_passed());
    assert_eq!(reports.simple.signatures[1].counter_signature_of.as_deref(), Some(SIGNATURE));
}

#[test]
fn test_qualified_signature() {
    let mut data = fixtures::basic_signature();
    data.trusted_lists.push(fixtures::trusted_list());
    let index = data.certificates.iter().position(|c| c.id == SIGNER).unwrap();
    data.certificates[index] = fixtures::qualified_signing_certificate();

    let reports = validate(&data, default_policy()).unwrap();
    assert_eq!(reports.simple.signatures[0].qualification, Some(SignatureQualification::Qesig));
}

#[test]
fn test_validate_certificate() {
    let mut data = fixtures::basic_signature();
    let index = data.certificates.iter().position(|c| c.id == SIGNER).unwrap();
    data.certificates[index] = fixtures::qualified_signing_certificate();

    let reports = validate_certificate(&data, default_policy(), SIGNER).unwrap();
    let certificate = reports.simple.certificate.as_ref().unwrap();
    assert_eq!(certificate.indication, Indication::Passed);
    assert!(certificate.qualification_at_issuance.is_qc());
    assert!(certificate.qualification_at_validation_time.is_qc());
    assert!(reports.simple.signatures.is_empty());
}

// ============================================================================
// Input handling and report properties
// ============================================================================

#[test]
fn test_structural_errors() {
    let empty = DiagnosticData::new(fixtures::validation_time());
    assert!(matches!(validate(&empty, default_policy()), Err(EsigError::IllegalInput(_))));

    let data = fixtures::basic_signature();
    assert!(matches!(
        validate_certificate(&data, default_policy(), ""),
        Err(EsigError::IllegalInput(_))
    ));
    assert!(matches!(
        validate_certificate(&data, default_policy(), "GHOST"),
        Err(EsigError::InputFormat(_))
    ));

    let mut dangling = fixtures::basic_signature();
    dangling.signatures[0].certificate_chain.push("GHOST".to_string());
    assert!(matches!(validate(&dangling, default_policy()), Err(EsigError::InputFormat(_))));
}

#[test]
fn test_reports_are_deterministic() {
    let data = fixtures::with_archive_timestamp(
        fixtures::with_signature_timestamp(fixtures::basic_signature(), "TST-1", date(2025, 1, 1)),
        "ATST-1",
        date(2025, 3, 1),
    );
    let first = validate(&data, default_policy()).unwrap();
    let second = validate(&data, default_policy()).unwrap();
    assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
    assert_eq!(first.digest().unwrap(), second.digest().unwrap());
    assert!(first.digest().unwrap().starts_with("blake3:"));
}

#[test]
fn test_sub_indication_present_iff_not_passed() {
    let scenarios = [
        fixtures::basic_signature(),
        expired_signer(),
        fixtures::with_signature_timestamp(expired_signer(), "TST-1", date(2025, 1, 1)),
        fixtures::with_archive_timestamp(fixtures::basic_signature(), "ATST-1", date(2025, 3, 1)),
    ];
    for data in &scenarios {
        let reports = validate(data, default_policy()).unwrap();
        for signature in &reports.detailed.signatures {
            let mut conclusions = vec![&signature.conclusion, &signature.bbbs.conclusion];
            conclusions.extend(signature.levels.iter().map(|l| &l.conclusion));
            for conclusion in conclusions {
                assert_eq!(conclusion.sub_indication().is_some(), !conclusion.is_passed());
            }
        }
        for timestamp in &reports.detailed.timestamps {
            let c = &timestamp.conclusion;
            assert_eq!(c.sub_indication().is_some(), !c.is_passed());
        }
    }
}

#[test]
fn test_stale_revocation_with_policy_window() {
    let mut data = fixtures::basic_signature();
    data.revocations[0].production_date = data.validation_time - Duration::days(3);

    let tight = ValidationPolicy::from_yaml(
        "signature:\n  basic:\n    signing_certificate:\n      revocation_freshness:\n        level: FAIL\n        window:\n          value: 2\n          unit: DAYS\n",
    )
    .unwrap();
    let reports = validate(&data, &tight).unwrap();
    assert_verdict(&only_signature(&reports).conclusion, Indication::Indeterminate, SubIndication::TryLater);

    let reports = validate(&data, default_policy()).unwrap();
    assert!(only_signature(&reports).conclusion.is_passed());
}

// ============================================================================
// Fixture documents
// ============================================================================

const TIMESTAMPED_SIGNATURE: &str =
    include_str!("../../../testing/fixtures/timestamped_signature.json");
const STRICT_POLICY: &str = include_str!("../../../testing/fixtures/strict-policy.yaml");

#[test]
fn test_json_document_validates_at_lt() {
    let data = DiagnosticData::from_json(TIMESTAMPED_SIGNATURE).unwrap();
    let reports = validate(&data, default_policy()).unwrap();
    let simple = &reports.simple.signatures[0];

    assert_eq!(simple.indication, Indication::Passed);
    assert_eq!(simple.level_reached, ValidationLevel::Lt);
    assert_eq!(simple.best_signature_time, date(2025, 1, 1));
    assert_eq!(reports.simple.timestamps[0].indication, Indication::Passed);
}

#[test]
fn test_strict_policy_document_accepts_fresh_timestamped_signature() {
    let policy = ValidationPolicy::from_yaml(STRICT_POLICY).unwrap();
    assert_eq!(policy.name, "strict@1.0");

    let data = DiagnosticData::from_json(TIMESTAMPED_SIGNATURE).unwrap();
    let reports = validate(&data, &policy).unwrap();
    assert!(only_signature(&reports).conclusion.is_passed());

    // same signature without its timestamp
    let mut bare = data.clone();
    bare.signatures[0].timestamps.clear();
    bare.timestamps.clear();
    let reports = validate(&bare, &policy).unwrap();
    assert!(!only_signature(&reports).conclusion.is_passed());
}

#[test]
fn test_freshness_window_beyond_calendar_range() {
    let yaml = r#"
signature:
  basic:
    signing_certificate:
      revocation_freshness:
        level: FAIL
        window: { value: 100000000000, unit: DAYS }
"#;
    let policy = ValidationPolicy::from_yaml(yaml).unwrap();
    let reports = validate(&fixtures::basic_signature(), &policy).unwrap();
    assert!(only_signature(&reports).conclusion.is_passed());
}
