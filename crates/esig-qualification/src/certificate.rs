//! Certificate qualification at a given time

use crate::filter::{applicable_services, FilterTrace};
use crate::status::{CertificateQualification, Era, QualificationOutcome};
use crate::strategy::{baseline, QualificationStrategy};
use chrono::{DateTime, Utc};
use esig_core::{BlockReport, CertificateWrapper, Chain, ChainItem, Indication, SubIndication};
use esig_policy::QualificationConstraints;
use serde::Serialize;
use tracing::warn;

/// Which reference time a qualification was computed for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QualificationTime {
    CertificateIssuance,
    BestSignatureTime,
    ValidationTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct CertificateQualificationResult {
    pub certificate_id: String,
    pub time: DateTime<Utc>,
    pub time_kind: QualificationTime,
    /// Names of the services that survived filtering
    pub services: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<QualificationStrategy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<QualificationOutcome>,
    pub qualification: CertificateQualification,
    pub block: BlockReport,
}

enum Resolution {
    None,
    Single(QualificationStrategy, QualificationOutcome),
    Conflict,
}

fn resolve(cert: &CertificateWrapper, trace: &FilterTrace<'_>) -> Resolution {
    let mut resolved: Option<(QualificationStrategy, QualificationOutcome)> = None;
    for service in &trace.acceptable {
        let strategy = QualificationStrategy::select(cert, service);
        let outcome = strategy.evaluate(cert, service);
        match &resolved {
            None => resolved = Some((strategy, outcome)),
            Some((_, existing)) if *existing == outcome => {}
            Some(_) => return Resolution::Conflict,
        }
    }
    match resolved {
        Some((strategy, outcome)) => Resolution::Single(strategy, outcome),
        None => Resolution::None,
    }
}

/// Qualification of `cert` at `at`, as asserted by its issuer's trusted services
pub fn qualify_certificate_at(
    cert: &CertificateWrapper,
    at: DateTime<Utc>,
    time_kind: QualificationTime,
    constraints: &QualificationConstraints,
) -> CertificateQualificationResult {
    let trace = applicable_services(cert, at);
    let resolution = resolve(cert, &trace);

    let block = Chain::new("Certificate Qualification")
        .item(
            ChainItem::fixed("QUAL_TRUST_SERVICE_AT_TIME", &constraints.trust_service_at_time, !trace.at_time.is_empty())
                .describe(format!("A trusted service of the issuer is in force at {}", at.to_rfc3339()))
                .on_failure(Indication::Indeterminate, SubIndication::Generic),
        )
        .item(
            ChainItem::fixed("QUAL_CA_QC", &constraints.ca_qc_service, !trace.ca_qc.is_empty())
                .describe("The trusted service is a CA/QC service")
                .on_failure(Indication::Indeterminate, SubIndication::Generic),
        )
        .item(
            ChainItem::fixed("QUAL_STATUS_ACCEPTABLE", &constraints.service_status_acceptable, !trace.acceptable.is_empty())
                .describe("The trusted service status is acceptable for its era")
                .on_failure(Indication::Indeterminate, SubIndication::Generic),
        )
        .item(
            ChainItem::fixed("QUAL_NO_CONFLICT", &constraints.no_conflict, !matches!(resolution, Resolution::Conflict))
                .describe("Applicable trusted services agree on the qualification")
                .on_failure(Indication::Indeterminate, SubIndication::Generic),
        )
        .execute();

    let (strategy, outcome, qualification) = match resolution {
        Resolution::Single(strategy, outcome) => (Some(strategy), Some(outcome), outcome.qualification()),
        Resolution::Conflict => {
            warn!(certificate = %cert.id, at = %at, "trusted services disagree on qualification");
            (None, None, CertificateQualification::Na)
        }
        Resolution::None => {
            // no acceptable service: nothing can be qualified
            let cert_type = baseline(cert, Era::at(cert.not_before)).cert_type;
            let outcome = QualificationOutcome::not_qualified(cert_type);
            (None, Some(outcome), outcome.qualification())
        }
    };

    CertificateQualificationResult {
        certificate_id: cert.id.clone(),
        time: at,
        time_kind,
        services: trace.acceptable.iter().map(|s| s.service_name.clone()).collect(),
        strategy,
        outcome,
        qualification,
        block,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::{CertificateType, QualifiedStatus};
    use crate::uri::qualifier;
    use esig_core::fixtures::{self, date, GRANTED, WITHDRAWN};

    fn constraints() -> QualificationConstraints {
        QualificationConstraints::default()
    }

    #[test]
    fn test_qualified_certificate() {
        let cert = fixtures::qualified_signing_certificate();
        let result = qualify_certificate_at(&cert, date(2024, 1, 1), QualificationTime::BestSignatureTime, &constraints());
        assert_eq!(result.qualification, CertificateQualification::QcForEsigQscd);
        assert!(result.block.is_passed());
        assert_eq!(result.block.conclusion.warnings().count(), 0);
    }

    #[test]
    fn test_withdrawn_service_means_not_qc() {
        let mut cert = fixtures::qualified_signing_certificate();
        let mut granted = fixtures::trusted_service(GRANTED, date(2016, 7, 1), &[]);
        granted.end_date = Some(date(2024, 1, 1));
        cert.trusted_services = vec![granted, fixtures::trusted_service(WITHDRAWN, date(2024, 1, 1), &[])];

        let result = qualify_certificate_at(&cert, date(2024, 6, 1), QualificationTime::BestSignatureTime, &constraints());
        let outcome = result.outcome.unwrap();
        assert_eq!(outcome.status, QualifiedStatus::NotQc);
        assert_eq!(result.qualification, CertificateQualification::CertForEsig);
        assert!(result.block.check("QUAL_STATUS_ACCEPTABLE").is_some());
        assert_eq!(result.block.conclusion.warnings().count(), 1);
    }

    #[test]
    fn test_conflicting_services_are_na() {
        let mut cert = fixtures::qualified_signing_certificate();
        cert.trusted_services = vec![
            fixtures::trusted_service(GRANTED, date(2016, 7, 1), &[qualifier::QC_FOR_ESIG]),
            fixtures::trusted_service(GRANTED, date(2016, 7, 1), &[qualifier::QC_FOR_ESEAL]),
        ];
        let result = qualify_certificate_at(&cert, date(2020, 1, 1), QualificationTime::CertificateIssuance, &constraints());
        assert_eq!(result.qualification, CertificateQualification::Na);
        assert!(result.outcome.is_none());
    }

    #[test]
    fn test_no_services_keeps_type() {
        let mut cert = fixtures::qualified_signing_certificate();
        cert.trusted_services.clear();
        let result = qualify_certificate_at(&cert, date(2020, 1, 1), QualificationTime::ValidationTime, &constraints());
        assert_eq!(result.outcome.unwrap().cert_type, CertificateType::Esign);
        assert_eq!(result.qualification, CertificateQualification::CertForEsig);
    }
}
