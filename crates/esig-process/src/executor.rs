//! Entry points
//!
//! `validate` runs one document: consistency check, POE extraction, then
//! every signature through the level state machine. `validate_certificate`
//! validates a single certificate without any signature around it.

use crate::bbb::{xcv, TokenUnderValidation};
use crate::extraction::extract_poe;
use crate::poe::PoeSet;
use crate::reports::{CertificateValidation, DetailedReport, Reports, SimpleReport};
use crate::signature::validate_signature;
use esig_core::{DiagnosticData, EsigError, ESIG_VERSION};
use esig_policy::ValidationPolicy;
use esig_qualification::{qualify_certificate_at, QualificationTime};
use tracing::{debug, info};

fn signer_lookup(diag: &DiagnosticData) -> impl Fn(&str) -> Option<String> + '_ {
    move |signature_id| {
        diag.find_signature(signature_id)
            .and_then(|s| s.signing_certificate_id())
            .and_then(|id| diag.find_certificate(id))
            .map(|c| c.subject_dn.clone())
    }
}

/// Validate every signature and timestamp of `diag` under `policy`
pub fn validate(diag: &DiagnosticData, policy: &ValidationPolicy) -> Result<Reports, EsigError> {
    diag.verify_consistency()?;
    if diag.signatures.is_empty() && diag.timestamps.is_empty() {
        return Err(EsigError::IllegalInput(
            "diagnostic data holds neither signatures nor timestamps".to_string(),
        ));
    }

    info!(
        policy = %policy.name,
        signatures = diag.signatures.len(),
        timestamps = diag.timestamps.len(),
        "validation started"
    );

    let extraction = extract_poe(diag, policy)?;
    let signatures = diag
        .signatures
        .iter()
        .map(|signature| validate_signature(diag, policy, &extraction, signature))
        .collect::<Result<Vec<_>, _>>()?;

    let detailed = DetailedReport {
        validation_time: diag.validation_time,
        policy: policy.name.clone(),
        engine_version: ESIG_VERSION,
        signatures,
        timestamps: extraction.timestamps.into_values().collect(),
        evidence_records: extraction.evidence_records.into_values().collect(),
        certificate: None,
    };
    let simple = SimpleReport::from_detailed(&detailed, signer_lookup(diag));

    info!(
        valid = simple.valid_signatures_count,
        total = simple.signatures_count,
        "validation finished"
    );
    Ok(Reports::new(detailed, simple))
}

/// Validate one certificate at the validation time, with its qualification
/// at issuance and at the validation time
pub fn validate_certificate(
    diag: &DiagnosticData,
    policy: &ValidationPolicy,
    certificate_id: &str,
) -> Result<Reports, EsigError> {
    if certificate_id.trim().is_empty() {
        return Err(EsigError::IllegalInput("certificate id is required".to_string()));
    }
    diag.verify_consistency()?;
    let certificate = diag.certificate(certificate_id)?;

    let poe = PoeSet::new(diag.validation_time);
    let token = TokenUnderValidation::for_certificate(diag, certificate)?;
    let xcv = xcv::execute(diag, policy, &poe, &token, diag.validation_time);
    debug!(certificate = %certificate_id, conclusion = %xcv.conclusion, "certificate chain validated");

    let at_issuance = qualify_certificate_at(
        certificate,
        certificate.not_before,
        QualificationTime::CertificateIssuance,
        &policy.qualification,
    );
    let at_validation_time = qualify_certificate_at(
        certificate,
        diag.validation_time,
        QualificationTime::ValidationTime,
        &policy.qualification,
    );

    let validation = CertificateValidation {
        certificate_id: certificate.id.clone(),
        subject_dn: certificate.subject_dn.clone(),
        conclusion: xcv.conclusion.clone(),
        xcv,
        at_issuance,
        at_validation_time,
    };
    info!(
        certificate = %certificate_id,
        indication = %validation.conclusion,
        qualification = validation.at_validation_time.qualification.label(),
        "certificate validated"
    );

    let detailed = DetailedReport {
        validation_time: diag.validation_time,
        policy: policy.name.clone(),
        engine_version: ESIG_VERSION,
        signatures: Vec::new(),
        timestamps: Vec::new(),
        evidence_records: Vec::new(),
        certificate: Some(validation),
    };
    let simple = SimpleReport::from_detailed(&detailed, |_| None);
    Ok(Reports::new(detailed, simple))
}
