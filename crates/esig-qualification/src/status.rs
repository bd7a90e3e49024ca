//! Qualification outcomes and the eIDAS era

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use std::fmt;

/// 2016-07-01, when Regulation (EU) No 910/2014 became applicable
pub fn eidas_date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2016, 7, 1, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Era {
    PreEidas,
    PostEidas,
}

impl Era {
    pub fn at(date: DateTime<Utc>) -> Self {
        if date < eidas_date() {
            Era::PreEidas
        } else {
            Era::PostEidas
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QualifiedStatus {
    Qc,
    NotQc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CertificateType {
    Esign,
    Eseal,
    Wsa,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QscdStatus {
    Qscd,
    NotQscd,
}

/// The three facets computed for a certificate at one date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct QualificationOutcome {
    pub status: QualifiedStatus,
    pub cert_type: CertificateType,
    pub qscd: QscdStatus,
}

impl QualificationOutcome {
    pub fn not_qualified(cert_type: CertificateType) -> Self {
        Self {
            status: QualifiedStatus::NotQc,
            cert_type,
            qscd: QscdStatus::NotQscd,
        }
    }

    pub fn is_qc(&self) -> bool {
        self.status == QualifiedStatus::Qc
    }

    pub fn is_qscd(&self) -> bool {
        self.qscd == QscdStatus::Qscd
    }

    pub fn qualification(&self) -> CertificateQualification {
        CertificateQualification::from_outcome(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CertificateQualification {
    QcForEsigQscd,
    QcForEsig,
    QcForEsealQscd,
    QcForEseal,
    QcForWsa,
    QcQscd,
    Qc,
    CertForEsig,
    CertForEseal,
    CertForWsa,
    Cert,
    /// Not applicable (conflicting trust services)
    Na,
}

impl CertificateQualification {
    pub fn from_outcome(outcome: &QualificationOutcome) -> Self {
        use CertificateType::*;
        match (outcome.is_qc(), outcome.cert_type, outcome.is_qscd()) {
            (true, Esign, true) => Self::QcForEsigQscd,
            (true, Esign, false) => Self::QcForEsig,
            (true, Eseal, true) => Self::QcForEsealQscd,
            (true, Eseal, false) => Self::QcForEseal,
            (true, Wsa, _) => Self::QcForWsa,
            (true, Unknown, true) => Self::QcQscd,
            (true, Unknown, false) => Self::Qc,
            (false, Esign, _) => Self::CertForEsig,
            (false, Eseal, _) => Self::CertForEseal,
            (false, Wsa, _) => Self::CertForWsa,
            (false, Unknown, _) => Self::Cert,
        }
    }

    pub fn is_qc(&self) -> bool {
        matches!(
            self,
            Self::QcForEsigQscd | Self::QcForEsig | Self::QcForEsealQscd | Self::QcForEseal
                | Self::QcForWsa | Self::QcQscd | Self::Qc
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::QcForEsigQscd => "QC for eSig with QSCD",
            Self::QcForEsig => "QC for eSig",
            Self::QcForEsealQscd => "QC for eSeal with QSCD",
            Self::QcForEseal => "QC for eSeal",
            Self::QcForWsa => "QC for WSA",
            Self::QcQscd => "QC with QSCD",
            Self::Qc => "QC",
            Self::CertForEsig => "Certificate for eSig",
            Self::CertForEseal => "Certificate for eSeal",
            Self::CertForWsa => "Certificate for WSA",
            Self::Cert => "Certificate",
            Self::Na => "N/A",
        }
    }
}

impl fmt::Display for CertificateQualification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
