//! Signature qualification
//!
//! Combines the AdES verdict of a signature with the qualification of its
//! signing certificate, computed at certificate issuance and at the best
//! signature time.

use crate::certificate::{qualify_certificate_at, CertificateQualificationResult, QualificationTime};
use crate::status::{CertificateQualification, CertificateType, QualificationOutcome, QscdStatus, QualifiedStatus};
use chrono::{DateTime, Utc};
use esig_core::{
    BlockReport, CertificateWrapper, Chain, ChainItem, DiagnosticData, Indication, SubIndication,
};
use esig_policy::QualificationConstraints;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignatureQualification {
    Qesig,
    Qeseal,
    AdesigQc,
    AdesealQc,
    Adesig,
    Adeseal,
    AdesQc,
    Ades,
    IndeterminateQesig,
    IndeterminateQeseal,
    IndeterminateAdesigQc,
    IndeterminateAdesealQc,
    IndeterminateAdesig,
    IndeterminateAdeseal,
    IndeterminateAdesQc,
    IndeterminateAdes,
    NotAdesQcQscd,
    NotAdesQc,
    NotAdes,
    Na,
}

impl SignatureQualification {
    /// AdES indication × certificate qualification
    pub fn from_matrix(indication: Indication, certificate: CertificateQualification) -> Self {
        use CertificateQualification as C;
        use SignatureQualification::*;

        if certificate == C::Na {
            return Na;
        }
        let qc = certificate.is_qc();
        let qscd = matches!(certificate, C::QcForEsigQscd | C::QcForEsealQscd | C::QcQscd);
        let kind = match certificate {
            C::QcForEsigQscd | C::QcForEsig | C::CertForEsig => CertificateType::Esign,
            C::QcForEsealQscd | C::QcForEseal | C::CertForEseal => CertificateType::Eseal,
            _ => CertificateType::Unknown,
        };

        match indication {
            Indication::Failed => match (qc, qscd) {
                (true, true) => NotAdesQcQscd,
                (true, false) => NotAdesQc,
                _ => NotAdes,
            },
            Indication::Passed => match (kind, qc, qscd) {
                (CertificateType::Esign, true, true) => Qesig,
                (CertificateType::Esign, true, false) => AdesigQc,
                (CertificateType::Esign, false, _) => Adesig,
                (CertificateType::Eseal, true, true) => Qeseal,
                (CertificateType::Eseal, true, false) => AdesealQc,
                (CertificateType::Eseal, false, _) => Adeseal,
                (_, true, _) => AdesQc,
                _ => Ades,
            },
            Indication::Indeterminate => match (kind, qc, qscd) {
                (CertificateType::Esign, true, true) => IndeterminateQesig,
                (CertificateType::Esign, true, false) => IndeterminateAdesigQc,
                (CertificateType::Esign, false, _) => IndeterminateAdesig,
                (CertificateType::Eseal, true, true) => IndeterminateQeseal,
                (CertificateType::Eseal, true, false) => IndeterminateAdesealQc,
                (CertificateType::Eseal, false, _) => IndeterminateAdeseal,
                (_, true, _) => IndeterminateAdesQc,
                _ => IndeterminateAdes,
            },
        }
    }

    pub fn label(&self) -> &'static str {
        use SignatureQualification::*;
        match self {
            Qesig => "QESig",
            Qeseal => "QESeal",
            AdesigQc => "AdESig-QC",
            AdesealQc => "AdESeal-QC",
            Adesig => "AdESig",
            Adeseal => "AdESeal",
            AdesQc => "AdES-QC",
            Ades => "AdES",
            IndeterminateQesig => "Indeterminate QESig",
            IndeterminateQeseal => "Indeterminate QESeal",
            IndeterminateAdesigQc => "Indeterminate AdESig-QC",
            IndeterminateAdesealQc => "Indeterminate AdESeal-QC",
            IndeterminateAdesig => "Indeterminate AdESig",
            IndeterminateAdeseal => "Indeterminate AdESeal",
            IndeterminateAdesQc => "Indeterminate AdES-QC",
            IndeterminateAdes => "Indeterminate AdES",
            NotAdesQcQscd => "Not AdES but QC with QSCD",
            NotAdesQc => "Not AdES but QC",
            NotAdes => "Not AdES",
            Na => "N/A",
        }
    }
}

impl fmt::Display for SignatureQualification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SignatureQualificationReport {
    pub signature_id: String,
    pub qualification: SignatureQualification,
    pub certificate_qualification: CertificateQualification,
    pub at_issuance: CertificateQualificationResult,
    pub at_best_signature_time: CertificateQualificationResult,
    pub block: BlockReport,
}

/// Final certificate qualification from the two reference times
///
/// QC requires both; the type must agree; QSCD is taken at signing time.
pub fn combine(at_issuance: &CertificateQualificationResult, at_signing: &CertificateQualificationResult) -> CertificateQualification {
    match (at_issuance.outcome, at_signing.outcome) {
        (Some(issued), Some(signed)) => {
            let status = if issued.is_qc() && signed.is_qc() {
                QualifiedStatus::Qc
            } else {
                QualifiedStatus::NotQc
            };
            let cert_type = if issued.cert_type == signed.cert_type {
                signed.cert_type
            } else {
                CertificateType::Unknown
            };
            let qscd = if status == QualifiedStatus::Qc { signed.qscd } else { QscdStatus::NotQscd };
            QualificationOutcome { status, cert_type, qscd }.qualification()
        }
        _ => CertificateQualification::Na,
    }
}

pub fn qualify_signature(
    diag: &DiagnosticData,
    constraints: &QualificationConstraints,
    signature_id: &str,
    signing_certificate: &CertificateWrapper,
    indication: Indication,
    best_signature_time: DateTime<Utc>,
) -> SignatureQualificationReport {
    let at_issuance = qualify_certificate_at(
        signing_certificate,
        signing_certificate.not_before,
        QualificationTime::CertificateIssuance,
        constraints,
    );
    let at_best_signature_time = qualify_certificate_at(
        signing_certificate,
        best_signature_time,
        QualificationTime::BestSignatureTime,
        constraints,
    );

    let tl_urls: BTreeSet<&str> = signing_certificate
        .trusted_services
        .iter()
        .filter_map(|s| s.tl_url.as_deref())
        .collect();

    let mut chain = Chain::new("Signature Qualification");
    for url in tl_urls {
        let tl = diag.find_trusted_list(url);
        chain.push(
            ChainItem::fixed("QUAL_TL_WELL_SIGNED", &constraints.trusted_list_well_signed, tl.map_or(false, |t| t.well_signed))
                .describe(format!("The trusted list {} is well signed", url))
                .on_failure(Indication::Indeterminate, SubIndication::Generic),
        );
        chain.push(
            ChainItem::fixed(
                "QUAL_TL_FRESH",
                &constraints.trusted_list_fresh,
                tl.map_or(false, |t| t.is_fresh_at(diag.validation_time)),
            )
            .describe(format!("The trusted list {} is not past its next update", url))
            .on_failure(Indication::Indeterminate, SubIndication::TryLater),
        );
    }

    let qc_consistent = at_issuance.qualification.is_qc() == at_best_signature_time.qualification.is_qc();
    let same_type = at_issuance.outcome.map(|o| o.cert_type) == at_best_signature_time.outcome.map(|o| o.cert_type);
    chain.push(
        ChainItem::fixed("QUAL_QC_STATUS_CONSISTENT", &constraints.qc_status_consistent, qc_consistent)
            .describe("The QC status is the same at issuance and at signing time")
            .on_failure(Indication::Indeterminate, SubIndication::Generic),
    );
    chain.push(
        ChainItem::fixed("QUAL_TYPE_CONSISTENT", &constraints.type_consistent, same_type)
            .describe("The certificate type is the same at issuance and at signing time")
            .on_failure(Indication::Indeterminate, SubIndication::Generic),
    );
    let block = chain.execute();

    let certificate_qualification = combine(&at_issuance, &at_best_signature_time);
    let qualification = if block.conclusion.is_passed() {
        SignatureQualification::from_matrix(indication, certificate_qualification)
    } else {
        SignatureQualification::Na
    };

    SignatureQualificationReport {
        signature_id: signature_id.to_string(),
        qualification,
        certificate_qualification,
        at_issuance,
        at_best_signature_time,
        block,
    }
}
