//! Detailed and simple reports
//!
//! Both are plain serde trees built from ordered collections only, so two
//! validations of the same input serialize to the same bytes.

use crate::evidence::EvidenceRecordValidation;
use crate::ltv::ValidationLevel;
use crate::signature::SignatureValidation;
use crate::timestamp::TimestampValidation;
use chrono::{DateTime, Utc};
use esig_core::{
    BlockReport, Conclusion, EsigError, Indication, SignatureFormat, SubIndication, TimestampType,
};
use esig_qualification::{CertificateQualification, CertificateQualificationResult, SignatureQualification};
use serde::Serialize;

/// Standalone certificate validation
#[derive(Debug, Clone, Serialize)]
pub struct CertificateValidation {
    pub certificate_id: String,
    pub subject_dn: String,
    pub xcv: BlockReport,
    pub at_issuance: CertificateQualificationResult,
    pub at_validation_time: CertificateQualificationResult,
    pub conclusion: Conclusion,
}

#[derive(Debug, Clone, Serialize)]
pub struct DetailedReport {
    pub validation_time: DateTime<Utc>,
    pub policy: String,
    pub engine_version: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub signatures: Vec<SignatureValidation>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub timestamps: Vec<TimestampValidation>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub evidence_records: Vec<EvidenceRecordValidation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate: Option<CertificateValidation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimpleSignature {
    pub id: String,
    pub format: SignatureFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counter_signature_of: Option<String>,
    pub level_reached: ValidationLevel,
    pub indication: Indication,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_indication: Option<SubIndication>,
    pub best_signature_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualification: Option<SignatureQualification>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub infos: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimpleTimestamp {
    pub id: String,
    pub timestamp_type: TimestampType,
    pub production_time: DateTime<Utc>,
    pub indication: Indication,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_indication: Option<SubIndication>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimpleCertificate {
    pub id: String,
    pub subject_dn: String,
    pub indication: Indication,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_indication: Option<SubIndication>,
    pub qualification_at_issuance: CertificateQualification,
    pub qualification_at_validation_time: CertificateQualification,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimpleReport {
    pub validation_time: DateTime<Utc>,
    pub policy: String,
    pub signatures_count: usize,
    pub valid_signatures_count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub signatures: Vec<SimpleSignature>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub timestamps: Vec<SimpleTimestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate: Option<SimpleCertificate>,
}

fn texts<'a>(messages: impl Iterator<Item = &'a esig_core::Message>) -> Vec<String> {
    let mut texts: Vec<String> = Vec::new();
    for message in messages {
        if !texts.contains(&message.text) {
            texts.push(message.text.clone());
        }
    }
    texts
}

impl SimpleReport {
    pub fn from_detailed(detailed: &DetailedReport, signers: impl Fn(&str) -> Option<String>) -> Self {
        let signatures: Vec<SimpleSignature> = detailed
            .signatures
            .iter()
            .map(|s| SimpleSignature {
                id: s.signature_id.clone(),
                format: s.format,
                counter_signature_of: s.counter_signature_of.clone(),
                level_reached: s.level_reached,
                indication: s.conclusion.indication(),
                sub_indication: s.conclusion.sub_indication(),
                best_signature_time: s.best_signature_time,
                signed_by: signers(&s.signature_id),
                qualification: s.qualification.as_ref().map(|q| q.qualification),
                errors: texts(s.conclusion.errors()),
                warnings: texts(s.conclusion.warnings()),
                infos: texts(s.conclusion.infos()),
            })
            .collect();

        let timestamps = detailed
            .timestamps
            .iter()
            .map(|t| SimpleTimestamp {
                id: t.id.clone(),
                timestamp_type: t.timestamp_type,
                production_time: t.production_time,
                indication: t.conclusion.indication(),
                sub_indication: t.conclusion.sub_indication(),
            })
            .collect();

        let certificate = detailed.certificate.as_ref().map(|c| SimpleCertificate {
            id: c.certificate_id.clone(),
            subject_dn: c.subject_dn.clone(),
            indication: c.conclusion.indication(),
            sub_indication: c.conclusion.sub_indication(),
            qualification_at_issuance: c.at_issuance.qualification,
            qualification_at_validation_time: c.at_validation_time.qualification,
        });

        Self {
            validation_time: detailed.validation_time,
            policy: detailed.policy.clone(),
            signatures_count: signatures.len(),
            valid_signatures_count: signatures
                .iter()
                .filter(|s| s.indication == Indication::Passed)
                .count(),
            signatures,
            timestamps,
            certificate,
        }
    }
}

/// The two artifacts of one validation
#[derive(Debug, Clone, Serialize)]
pub struct Reports {
    pub detailed: DetailedReport,
    pub simple: SimpleReport,
}

impl Reports {
    pub fn new(detailed: DetailedReport, simple: SimpleReport) -> Self {
        Self { detailed, simple }
    }

    pub fn to_json(&self) -> Result<String, EsigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn simple_json(&self) -> Result<String, EsigError> {
        Ok(serde_json::to_string_pretty(&self.simple)?)
    }

    /// Content hash of the serialized reports
    pub fn digest(&self) -> Result<String, EsigError> {
        let json = serde_json::to_vec(self)?;
        Ok(format!("blake3:{}", blake3::hash(&json)))
    }
}
