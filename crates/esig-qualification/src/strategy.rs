//! Qualification strategies
//!
//! The certificate alone yields a baseline (QC status, type, QSCD) using
//! era-specific rules. Qualifiers published for the issuing service then
//! override that baseline: "not qualified" always wins, an asserted type
//! or QSCD status always wins, and only the facets nobody asserts keep
//! the certificate's own claim.

use crate::status::{CertificateType, Era, QscdStatus, QualificationOutcome, QualifiedStatus};
use crate::uri::{additional_info, oid, qualifier};
use esig_core::{CertificateWrapper, QcType, TrustedServiceWrapper};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "strategy", content = "era", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QualificationStrategy {
    /// The service asserts nothing; certificate content decides
    FromCertificate(Era),
    /// The service declares the certificates not qualified
    FromTrustList,
    /// Service qualifiers override the certificate baseline facet by facet
    Combined,
}

impl QualificationStrategy {
    pub fn select(cert: &CertificateWrapper, service: &TrustedServiceWrapper) -> Self {
        if has(service, qualifier::NOT_QUALIFIED) {
            QualificationStrategy::FromTrustList
        } else if service.qualifiers.is_empty() {
            QualificationStrategy::FromCertificate(Era::at(cert.not_before))
        } else {
            QualificationStrategy::Combined
        }
    }

    pub fn evaluate(&self, cert: &CertificateWrapper, service: &TrustedServiceWrapper) -> QualificationOutcome {
        match self {
            QualificationStrategy::FromCertificate(era) => {
                let mut outcome = baseline(cert, *era);
                if outcome.cert_type == CertificateType::Unknown {
                    if let Some(t) = type_from_additional_info(service) {
                        outcome.cert_type = t;
                    }
                }
                outcome
            }
            QualificationStrategy::FromTrustList => {
                let era = Era::at(cert.not_before);
                let cert_type = type_override(service, era).unwrap_or(baseline(cert, era).cert_type);
                QualificationOutcome::not_qualified(cert_type)
            }
            QualificationStrategy::Combined => {
                let era = Era::at(cert.not_before);
                let base = baseline(cert, era);

                let status = status_override(service).unwrap_or(base.status);
                let cert_type = type_override(service, era)
                    .or_else(|| {
                        (base.cert_type == CertificateType::Unknown)
                            .then(|| type_from_additional_info(service))
                            .flatten()
                    })
                    .unwrap_or(base.cert_type);
                let qscd = match status {
                    QualifiedStatus::NotQc => QscdStatus::NotQscd,
                    QualifiedStatus::Qc => qscd_override(service).unwrap_or(base.qscd),
                };

                QualificationOutcome {
                    status,
                    cert_type,
                    qscd,
                }
            }
        }
    }
}

fn has(service: &TrustedServiceWrapper, uri: &str) -> bool {
    service.qualifiers.iter().any(|q| q == uri)
}

/// Certificate-only qualification
pub fn baseline(cert: &CertificateWrapper, era: Era) -> QualificationOutcome {
    let statements = &cert.qc_statements;
    let has_policy = |p: &str| cert.policy_ids.iter().any(|id| id == p);

    let qc = match era {
        Era::PreEidas => {
            statements.compliance || has_policy(oid::QCP_PUBLIC) || has_policy(oid::QCP_PUBLIC_WITH_SSCD)
        }
        Era::PostEidas => statements.compliance,
    };

    let cert_type = match era {
        Era::PreEidas if qc => CertificateType::Esign,
        Era::PreEidas => CertificateType::Unknown,
        Era::PostEidas => match statements.types.as_slice() {
            [] if qc => CertificateType::Esign,
            [] => CertificateType::Unknown,
            [single] => match single {
                QcType::Esign => CertificateType::Esign,
                QcType::Eseal => CertificateType::Eseal,
                QcType::Web => CertificateType::Wsa,
            },
            [first, rest @ ..] if rest.iter().all(|t| t == first) => match first {
                QcType::Esign => CertificateType::Esign,
                QcType::Eseal => CertificateType::Eseal,
                QcType::Web => CertificateType::Wsa,
            },
            _ => CertificateType::Unknown,
        },
    };

    let qscd = match era {
        Era::PreEidas => statements.sscd || has_policy(oid::QCP_PUBLIC_WITH_SSCD),
        Era::PostEidas => statements.sscd,
    };

    if qc {
        QualificationOutcome {
            status: QualifiedStatus::Qc,
            cert_type,
            qscd: if qscd { QscdStatus::Qscd } else { QscdStatus::NotQscd },
        }
    } else {
        QualificationOutcome::not_qualified(cert_type)
    }
}

fn status_override(service: &TrustedServiceWrapper) -> Option<QualifiedStatus> {
    if has(service, qualifier::NOT_QUALIFIED) {
        Some(QualifiedStatus::NotQc)
    } else if has(service, qualifier::QC_STATEMENT) {
        Some(QualifiedStatus::Qc)
    } else {
        None
    }
}

fn type_override(service: &TrustedServiceWrapper, era: Era) -> Option<CertificateType> {
    let mut asserted: Vec<CertificateType> = Vec::new();
    for q in &service.qualifiers {
        let t = match q.as_str() {
            qualifier::QC_FOR_ESIG => Some(CertificateType::Esign),
            qualifier::QC_FOR_ESEAL => Some(CertificateType::Eseal),
            qualifier::QC_FOR_WSA => Some(CertificateType::Wsa),
            qualifier::QC_FOR_LEGAL_PERSON if era == Era::PreEidas => Some(CertificateType::Eseal),
            _ => None,
        };
        if let Some(t) = t {
            if !asserted.contains(&t) {
                asserted.push(t);
            }
        }
    }
    match asserted.as_slice() {
        [] => None,
        [single] => Some(*single),
        _ => Some(CertificateType::Unknown),
    }
}

fn type_from_additional_info(service: &TrustedServiceWrapper) -> Option<CertificateType> {
    let types: Vec<CertificateType> = service
        .additional_service_info
        .iter()
        .filter_map(|info| match info.as_str() {
            additional_info::FOR_ESIGNATURES => Some(CertificateType::Esign),
            additional_info::FOR_ESEALS => Some(CertificateType::Eseal),
            additional_info::FOR_WSA => Some(CertificateType::Wsa),
            _ => None,
        })
        .collect();
    match types.as_slice() {
        [single] => Some(*single),
        _ => None,
    }
}

fn qscd_override(service: &TrustedServiceWrapper) -> Option<QscdStatus> {
    // "status as in cert" defers to the baseline
    if has(service, qualifier::QC_QSCD_STATUS_AS_IN_CERT) || has(service, qualifier::QC_SSCD_STATUS_AS_IN_CERT) {
        return None;
    }
    if has(service, qualifier::QC_WITH_QSCD)
        || has(service, qualifier::QC_WITH_SSCD)
        || has(service, qualifier::QC_QSCD_MANAGED_ON_BEHALF)
    {
        Some(QscdStatus::Qscd)
    } else if has(service, qualifier::QC_NO_QSCD) || has(service, qualifier::QC_NO_SSCD) {
        Some(QscdStatus::NotQscd)
    } else {
        None
    }
}
