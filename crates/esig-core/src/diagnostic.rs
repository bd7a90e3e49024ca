//! Diagnostic data: the read-only fact model
//!
//! Everything the engine knows about a signed document has already been
//! collected upstream (parsing, cryptographic verification, revocation
//! fetching, trusted list loading). The wrappers below only carry those
//! facts; the engine never mutates them.

use crate::error::EsigError;
use crate::token::{Token, TokenKind, TokenRef};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

fn yes() -> bool {
    true
}

/// Algorithms and key size used to produce a token's signature
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlgorithmFacts {
    /// e.g. "RSA", "ECDSA", "Ed25519"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption_algorithm: Option<String>,
    /// e.g. "SHA256"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest_algorithm: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_length: Option<u32>,
}

impl AlgorithmFacts {
    pub fn new(encryption: &str, digest: &str, key_length: u32) -> Self {
        Self {
            encryption_algorithm: Some(encryption.to_string()),
            digest_algorithm: Some(digest.to_string()),
            key_length: Some(key_length),
        }
    }
}

// ============================================================================
// Certificates
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KeyUsage {
    DigitalSignature,
    NonRepudiation,
    KeyEncipherment,
    DataEncipherment,
    KeyAgreement,
    KeyCertSign,
    CrlSign,
}

impl KeyUsage {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyUsage::DigitalSignature => "digitalSignature",
            KeyUsage::NonRepudiation => "nonRepudiation",
            KeyUsage::KeyEncipherment => "keyEncipherment",
            KeyUsage::DataEncipherment => "dataEncipherment",
            KeyUsage::KeyAgreement => "keyAgreement",
            KeyUsage::KeyCertSign => "keyCertSign",
            KeyUsage::CrlSign => "crlSign",
        }
    }
}

/// QC statement types (ETSI EN 319 412-5)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QcType {
    Esign,
    Eseal,
    Web,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QcStatements {
    /// id-etsi-qcs-QcCompliance
    #[serde(default)]
    pub compliance: bool,
    /// id-etsi-qcs-QcSSCD
    #[serde(default)]
    pub sscd: bool,
    /// id-etsi-qcs-QcType
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<QcType>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CertificateStatus {
    Good,
    Revoked,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RevocationReason {
    Unspecified,
    KeyCompromise,
    CaCompromise,
    AffiliationChanged,
    Superseded,
    CessationOfOperation,
    CertificateHold,
    RemoveFromCrl,
    PrivilegeWithdrawn,
    AaCompromise,
}

/// Status of a certificate as asserted by one revocation token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateRevocation {
    pub revocation_id: String,
    pub status: CertificateStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revocation_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<RevocationReason>,
}

impl CertificateRevocation {
    pub fn is_on_hold(&self) -> bool {
        self.status == CertificateStatus::Revoked
            && self.reason == Some(RevocationReason::CertificateHold)
    }

    /// Revoked (not merely on hold) on or before `at`
    pub fn is_revoked_at(&self, at: DateTime<Utc>) -> bool {
        self.status == CertificateStatus::Revoked
            && !self.is_on_hold()
            && self.revocation_date.map_or(true, |d| d <= at)
    }

    pub fn is_on_hold_at(&self, at: DateTime<Utc>) -> bool {
        self.is_on_hold() && self.revocation_date.map_or(true, |d| d <= at)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateWrapper {
    pub id: String,
    pub subject_dn: String,
    pub issuer_dn: String,
    #[serde(default)]
    pub serial_number: String,
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
    #[serde(default)]
    pub self_signed: bool,
    /// Configured trust anchor
    #[serde(default)]
    pub trusted: bool,
    #[serde(default)]
    pub ca: bool,
    #[serde(default)]
    pub key_usages: Vec<KeyUsage>,
    /// Signature of the issuer over this certificate verifies
    #[serde(default = "yes")]
    pub signature_intact: bool,
    /// Issuer chain, closest issuer first (the certificate itself excluded)
    #[serde(default)]
    pub certificate_chain: Vec<String>,
    #[serde(default)]
    pub algorithms: AlgorithmFacts,
    #[serde(default)]
    pub policy_ids: Vec<String>,
    #[serde(default)]
    pub qc_statements: QcStatements,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    /// CRL distribution points or OCSP access location present
    #[serde(default)]
    pub revocation_access_points: bool,
    #[serde(default)]
    pub revocations: Vec<CertificateRevocation>,
    /// Trusted services of the issuing CA, as resolved from trusted lists
    #[serde(default)]
    pub trusted_services: Vec<TrustedServiceWrapper>,
}

impl CertificateWrapper {
    pub fn is_valid_at(&self, at: DateTime<Utc>) -> bool {
        self.not_before <= at && at <= self.not_after
    }

    pub fn has_key_usage(&self, usage: &str) -> bool {
        self.key_usages.iter().any(|k| k.as_str().eq_ignore_ascii_case(usage))
    }

    /// Self-signed or trust anchor: no revocation data is expected
    pub fn is_revocation_exempt(&self) -> bool {
        self.self_signed || self.trusted
    }
}

// ============================================================================
// Revocation data
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RevocationKind {
    Crl,
    Ocsp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevocationWrapper {
    pub id: String,
    pub kind: RevocationKind,
    /// producedAt (OCSP) or thisUpdate (CRL)
    pub production_date: DateTime<Utc>,
    pub this_update: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_update: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signing_certificate: Option<String>,
    #[serde(default = "yes")]
    pub signature_intact: bool,
    #[serde(default)]
    pub algorithms: AlgorithmFacts,
}

// ============================================================================
// Timestamps
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimestampType {
    Content,
    Signature,
    ValidationData,
    Archive,
    EvidenceRecord,
}

impl TimestampType {
    /// Timestamps used at LTA level
    pub fn is_archival(&self) -> bool {
        matches!(self, TimestampType::Archive | TimestampType::EvidenceRecord)
    }
}

/// Facts about the signing-certificate reference of a signature or timestamp
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningCertificateRef {
    /// Resolved certificate id
    pub id: String,
    /// The certificate's public key verifies the token's signature value
    #[serde(default = "yes")]
    pub public_key_match: bool,
    /// signing-certificate(-v2) attribute present
    #[serde(default = "yes")]
    pub attribute_present: bool,
    #[serde(default = "yes")]
    pub digest_present: bool,
    #[serde(default = "yes")]
    pub digest_match: bool,
    #[serde(default)]
    pub issuer_serial_present: bool,
    #[serde(default = "yes")]
    pub issuer_serial_match: bool,
}

impl SigningCertificateRef {
    pub fn resolved(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            public_key_match: true,
            attribute_present: true,
            digest_present: true,
            digest_match: true,
            issuer_serial_present: true,
            issuer_serial_match: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimestampWrapper {
    pub id: String,
    pub timestamp_type: TimestampType,
    pub production_time: DateTime<Utc>,
    #[serde(default = "yes")]
    pub message_imprint_found: bool,
    #[serde(default = "yes")]
    pub message_imprint_intact: bool,
    #[serde(default = "yes")]
    pub signature_intact: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signing_certificate: Option<SigningCertificateRef>,
    /// Signing certificate first
    #[serde(default)]
    pub certificate_chain: Vec<String>,
    #[serde(default)]
    pub timestamped_objects: Vec<TokenRef>,
    /// Names of the container files covered by the imprint
    #[serde(default)]
    pub covered_files: Vec<String>,
    #[serde(default)]
    pub algorithms: AlgorithmFacts,
}

impl TimestampWrapper {
    pub fn covers(&self, id: &str) -> bool {
        self.timestamped_objects.iter().any(|o| o.id == id)
    }
}

// ============================================================================
// Signatures
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignatureFormat {
    Xades,
    Cades,
    Pades,
    Jades,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DigestMatcherKind {
    Reference,
    SignedProperties,
    MessageDigest,
    ManifestEntry,
    ContentDigest,
}

/// One digest the signature commits to, and whether the data matched it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigestMatcher {
    pub name: String,
    pub kind: DigestMatcherKind,
    #[serde(default = "yes")]
    pub data_found: bool,
    #[serde(default = "yes")]
    pub data_intact: bool,
}

impl DigestMatcher {
    pub fn new(name: impl Into<String>, kind: DigestMatcherKind) -> Self {
        Self {
            name: name.into(),
            kind,
            data_found: true,
            data_intact: true,
        }
    }
}

/// Explicit signature policy identifier facts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignaturePolicyFacts {
    /// Policy OID or URI
    pub id: String,
    /// Implied by the signature's context rather than identified
    #[serde(default)]
    pub implicit: bool,
    /// The policy document could be retrieved
    #[serde(default)]
    pub identified: bool,
    /// The declared policy digest is all zeros
    #[serde(default)]
    pub zero_hash: bool,
    #[serde(default)]
    pub digest_match: bool,
    /// A signature policy store was embedded
    #[serde(default)]
    pub store_present: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureWrapper {
    pub id: String,
    pub format: SignatureFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claimed_signing_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signing_certificate: Option<SigningCertificateRef>,
    /// Signing certificate first
    #[serde(default)]
    pub certificate_chain: Vec<String>,
    #[serde(default)]
    pub digest_matchers: Vec<DigestMatcher>,
    #[serde(default = "yes")]
    pub signature_intact: bool,
    #[serde(default)]
    pub algorithms: AlgorithmFacts,
    /// Parent signature when this is a counter-signature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counter_signature_of: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<SignaturePolicyFacts>,
    /// Timestamps embedded in this signature (content, signature, archive...)
    #[serde(default)]
    pub timestamps: Vec<String>,
    #[serde(default)]
    pub evidence_records: Vec<String>,
    /// Container files covered by the signature's references
    #[serde(default)]
    pub signed_files: Vec<String>,
}

impl SignatureWrapper {
    pub fn is_counter_signature(&self) -> bool {
        self.counter_signature_of.is_some()
    }

    pub fn signing_certificate_id(&self) -> Option<&str> {
        self.signing_certificate.as_ref().map(|s| s.id.as_str())
    }
}

// ============================================================================
// Evidence records
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceRecordWrapper {
    pub id: String,
    #[serde(default)]
    pub covered_objects: Vec<TokenRef>,
    #[serde(default)]
    pub covered_files: Vec<String>,
    /// Timestamps of the archive time-stamp chain, oldest first
    #[serde(default)]
    pub timestamps: Vec<String>,
    #[serde(default = "yes")]
    pub hash_tree_intact: bool,
}

// ============================================================================
// Trusted lists
// ============================================================================

/// One status period of a trust service, as published in a trusted list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustedServiceWrapper {
    #[serde(default)]
    pub tsp_name: String,
    #[serde(default)]
    pub service_name: String,
    pub country_code: String,
    /// Service type identifier URI
    pub service_type: String,
    /// Service status URI
    pub status: String,
    pub start_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    /// Qualifier URIs from the Sie/Qualifications extension
    #[serde(default)]
    pub qualifiers: Vec<String>,
    #[serde(default)]
    pub additional_service_info: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tl_url: Option<String>,
}

impl TrustedServiceWrapper {
    /// Status period covers `at` (start inclusive, end exclusive)
    pub fn is_in_force_at(&self, at: DateTime<Utc>) -> bool {
        self.start_date <= at && self.end_date.map_or(true, |end| at < end)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustedListWrapper {
    pub url: String,
    #[serde(default)]
    pub country_code: String,
    #[serde(default = "yes")]
    pub well_signed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_update: Option<DateTime<Utc>>,
}

impl TrustedListWrapper {
    pub fn is_fresh_at(&self, at: DateTime<Utc>) -> bool {
        self.next_update.map_or(true, |next| at <= next)
    }
}

// ============================================================================
// Container
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContainerType {
    AsicS,
    AsicE,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerFacts {
    pub container_type: ContainerType,
    /// Data files physically present (signature files excluded)
    #[serde(default)]
    pub files: Vec<String>,
}

// ============================================================================
// Root
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticData {
    /// The "now" of this validation
    pub validation_time: DateTime<Utc>,
    #[serde(default)]
    pub signatures: Vec<SignatureWrapper>,
    #[serde(default)]
    pub certificates: Vec<CertificateWrapper>,
    #[serde(default)]
    pub revocations: Vec<RevocationWrapper>,
    #[serde(default)]
    pub timestamps: Vec<TimestampWrapper>,
    #[serde(default)]
    pub evidence_records: Vec<EvidenceRecordWrapper>,
    #[serde(default)]
    pub trusted_lists: Vec<TrustedListWrapper>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<ContainerFacts>,
}

impl DiagnosticData {
    pub fn new(validation_time: DateTime<Utc>) -> Self {
        Self {
            validation_time,
            signatures: Vec::new(),
            certificates: Vec::new(),
            revocations: Vec::new(),
            timestamps: Vec::new(),
            evidence_records: Vec::new(),
            trusted_lists: Vec::new(),
            container: None,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, EsigError> {
        serde_json::from_str(json).map_err(|e| EsigError::InputFormat(e.to_string()))
    }

    pub fn find_certificate(&self, id: &str) -> Option<&CertificateWrapper> {
        self.certificates.iter().find(|c| c.id == id)
    }

    pub fn find_revocation(&self, id: &str) -> Option<&RevocationWrapper> {
        self.revocations.iter().find(|r| r.id == id)
    }

    pub fn find_timestamp(&self, id: &str) -> Option<&TimestampWrapper> {
        self.timestamps.iter().find(|t| t.id == id)
    }

    pub fn find_signature(&self, id: &str) -> Option<&SignatureWrapper> {
        self.signatures.iter().find(|s| s.id == id)
    }

    pub fn find_evidence_record(&self, id: &str) -> Option<&EvidenceRecordWrapper> {
        self.evidence_records.iter().find(|e| e.id == id)
    }

    pub fn find_trusted_list(&self, url: &str) -> Option<&TrustedListWrapper> {
        self.trusted_lists.iter().find(|t| t.url == url)
    }

    pub fn certificate(&self, id: &str) -> Result<&CertificateWrapper, EsigError> {
        self.find_certificate(id)
            .ok_or_else(|| EsigError::InputFormat(format!("unknown certificate '{}'", id)))
    }

    pub fn timestamp(&self, id: &str) -> Result<&TimestampWrapper, EsigError> {
        self.find_timestamp(id)
            .ok_or_else(|| EsigError::InputFormat(format!("unknown timestamp '{}'", id)))
    }

    pub fn signature(&self, id: &str) -> Result<&SignatureWrapper, EsigError> {
        self.find_signature(id)
            .ok_or_else(|| EsigError::InputFormat(format!("unknown signature '{}'", id)))
    }

    pub fn evidence_record(&self, id: &str) -> Result<&EvidenceRecordWrapper, EsigError> {
        self.find_evidence_record(id)
            .ok_or_else(|| EsigError::InputFormat(format!("unknown evidence record '{}'", id)))
    }

    /// Look up any token by id
    pub fn token(&self, id: &str) -> Option<Token<'_>> {
        self.find_signature(id)
            .map(Token::Signature)
            .or_else(|| self.find_timestamp(id).map(Token::Timestamp))
            .or_else(|| self.find_certificate(id).map(Token::Certificate))
            .or_else(|| self.find_revocation(id).map(Token::Revocation))
            .or_else(|| self.find_evidence_record(id).map(Token::EvidenceRecord))
    }

    /// Resolve a list of certificate ids; fails on the first unknown id
    pub fn chain(&self, ids: &[String]) -> Result<Vec<&CertificateWrapper>, EsigError> {
        ids.iter().map(|id| self.certificate(id)).collect()
    }

    /// A certificate followed by its issuer chain
    pub fn certificate_path(&self, id: &str) -> Result<Vec<&CertificateWrapper>, EsigError> {
        let cert = self.certificate(id)?;
        let mut path = vec![cert];
        path.extend(self.chain(&cert.certificate_chain)?);
        Ok(path)
    }

    pub fn timestamps_of<'a>(
        &'a self,
        signature: &'a SignatureWrapper,
    ) -> impl Iterator<Item = &'a TimestampWrapper> + 'a {
        signature
            .timestamps
            .iter()
            .filter_map(move |id| self.find_timestamp(id))
    }

    pub fn evidence_records_of<'a>(
        &'a self,
        signature: &'a SignatureWrapper,
    ) -> impl Iterator<Item = &'a EvidenceRecordWrapper> + 'a {
        signature
            .evidence_records
            .iter()
            .filter_map(move |id| self.find_evidence_record(id))
    }

    pub fn counter_signatures_of<'a>(
        &'a self,
        signature_id: &'a str,
    ) -> impl Iterator<Item = &'a SignatureWrapper> + 'a {
        self.signatures
            .iter()
            .filter(move |s| s.counter_signature_of.as_deref() == Some(signature_id))
    }

    /// Reject snapshots with duplicate ids or references to unknown tokens
    pub fn verify_consistency(&self) -> Result<(), EsigError> {
        let mut kinds: HashMap<&str, TokenKind> = HashMap::new();
        let all = self
            .certificates
            .iter()
            .map(|c| (c.id.as_str(), TokenKind::Certificate))
            .chain(self.revocations.iter().map(|r| (r.id.as_str(), TokenKind::Revocation)))
            .chain(self.timestamps.iter().map(|t| (t.id.as_str(), TokenKind::Timestamp)))
            .chain(self.signatures.iter().map(|s| (s.id.as_str(), TokenKind::Signature)))
            .chain(
                self.evidence_records
                    .iter()
                    .map(|e| (e.id.as_str(), TokenKind::EvidenceRecord)),
            );
        for (id, kind) in all {
            if id.is_empty() {
                return Err(EsigError::InputFormat(format!("{} with empty id", kind)));
            }
            if kinds.insert(id, kind).is_some() {
                return Err(EsigError::InputFormat(format!("duplicate token id '{}'", id)));
            }
        }

        let require = |owner: &str, id: &str, kind: TokenKind| -> Result<(), EsigError> {
            match kinds.get(id) {
                Some(found) if *found == kind => Ok(()),
                _ => Err(EsigError::dangling(owner, &kind.to_string(), id)),
            }
        };

        for cert in &self.certificates {
            let owner = format!("certificate {}", cert.id);
            for id in &cert.certificate_chain {
                require(&owner, id, TokenKind::Certificate)?;
            }
            for rev in &cert.revocations {
                require(&owner, &rev.revocation_id, TokenKind::Revocation)?;
            }
        }

        for rev in &self.revocations {
            if let Some(id) = &rev.signing_certificate {
                require(&format!("revocation {}", rev.id), id, TokenKind::Certificate)?;
            }
        }

        for ts in &self.timestamps {
            let owner = format!("timestamp {}", ts.id);
            if let Some(sc) = &ts.signing_certificate {
                require(&owner, &sc.id, TokenKind::Certificate)?;
            }
            for id in &ts.certificate_chain {
                require(&owner, id, TokenKind::Certificate)?;
            }
            for object in &ts.timestamped_objects {
                require(&owner, &object.id, object.kind)?;
            }
        }

        for sig in &self.signatures {
            let owner = format!("signature {}", sig.id);
            if let Some(sc) = &sig.signing_certificate {
                require(&owner, &sc.id, TokenKind::Certificate)?;
            }
            for id in &sig.certificate_chain {
                require(&owner, id, TokenKind::Certificate)?;
            }
            for id in &sig.timestamps {
                require(&owner, id, TokenKind::Timestamp)?;
            }
            for id in &sig.evidence_records {
                require(&owner, id, TokenKind::EvidenceRecord)?;
            }
            if let Some(parent) = &sig.counter_signature_of {
                require(&owner, parent, TokenKind::Signature)?;
            }
        }

        for er in &self.evidence_records {
            let owner = format!("evidence record {}", er.id);
            for object in &er.covered_objects {
                require(&owner, &object.id, object.kind)?;
            }
            for id in &er.timestamps {
                require(&owner, id, TokenKind::Timestamp)?;
            }
        }

        Ok(())
    }

    /// Every container file covered by at least one signature or timestamp
    pub fn unsigned_container_files(&self) -> BTreeSet<&str> {
        let Some(container) = &self.container else {
            return BTreeSet::new();
        };
        let covered: BTreeSet<&str> = self
            .signatures
            .iter()
            .flat_map(|s| s.signed_files.iter())
            .chain(self.timestamps.iter().flat_map(|t| t.covered_files.iter()))
            .map(String::as_str)
            .collect();
        container
            .files
            .iter()
            .map(String::as_str)
            .filter(|f| !covered.contains(f))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn cert(id: &str) -> CertificateWrapper {
        CertificateWrapper {
            id: id.to_string(),
            subject_dn: format!("CN={}", id),
            issuer_dn: format!("CN={}", id),
            serial_number: "01".to_string(),
            not_before: Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
            not_after: Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap(),
            self_signed: true,
            trusted: true,
            ca: true,
            key_usages: vec![KeyUsage::KeyCertSign],
            signature_intact: true,
            certificate_chain: Vec::new(),
            algorithms: AlgorithmFacts::default(),
            policy_ids: Vec::new(),
            qc_statements: QcStatements::default(),
            country_code: None,
            revocation_access_points: false,
            revocations: Vec::new(),
            trusted_services: Vec::new(),
        }
    }

    #[test]
    fn test_dangling_chain_reference() {
        let mut data = DiagnosticData::new(Utc::now());
        let mut leaf = cert("LEAF");
        leaf.certificate_chain = vec!["MISSING".to_string()];
        data.certificates.push(leaf);

        let err = data.verify_consistency().unwrap_err();
        assert!(matches!(err, EsigError::InputFormat(_)));
        assert!(err.to_string().contains("MISSING"));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut data = DiagnosticData::new(Utc::now());
        data.certificates.push(cert("C1"));
        data.certificates.push(cert("C1"));
        assert!(data.verify_consistency().is_err());
    }

    #[test]
    fn test_kind_mismatch_is_dangling() {
        let mut data = DiagnosticData::new(Utc::now());
        data.certificates.push(cert("C1"));
        data.timestamps.push(TimestampWrapper {
            id: "T1".to_string(),
            timestamp_type: TimestampType::Signature,
            production_time: Utc::now(),
            message_imprint_found: true,
            message_imprint_intact: true,
            signature_intact: true,
            signing_certificate: None,
            certificate_chain: Vec::new(),
            timestamped_objects: vec![TokenRef::new("C1", TokenKind::Signature)],
            covered_files: Vec::new(),
            algorithms: AlgorithmFacts::default(),
        });
        assert!(data.verify_consistency().is_err());
    }

    #[test]
    fn test_revocation_status_at() {
        let date = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let rev = CertificateRevocation {
            revocation_id: "R".to_string(),
            status: CertificateStatus::Revoked,
            revocation_date: Some(date),
            reason: Some(RevocationReason::KeyCompromise),
        };
        assert!(rev.is_revoked_at(date));
        assert!(!rev.is_revoked_at(date - chrono::Duration::seconds(1)));
        assert!(!rev.is_on_hold_at(date));
    }

    #[test]
    fn test_service_period_end_exclusive() {
        let start = Utc.with_ymd_and_hms(2016, 7, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let service = TrustedServiceWrapper {
            tsp_name: String::new(),
            service_name: String::new(),
            country_code: "BE".to_string(),
            service_type: "type".to_string(),
            status: "granted".to_string(),
            start_date: start,
            end_date: Some(end),
            qualifiers: Vec::new(),
            additional_service_info: Vec::new(),
            tl_url: None,
        };
        assert!(service.is_in_force_at(start));
        assert!(!service.is_in_force_at(end));
    }
}
