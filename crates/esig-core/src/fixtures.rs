//! Scenario builders shared by the integration tests of the workspace
//!
//! The baseline is a single XAdES signature by `SIGNER`, issued by the
//! trusted `ROOT`, with a fresh CRL and intact digests.

use crate::diagnostic::*;
use crate::token::{TokenKind, TokenRef};
use chrono::{DateTime, Duration, TimeZone, Utc};

pub const ROOT: &str = "ROOT";
pub const SIGNER: &str = "SIGNER";
pub const TSA: &str = "TSA";
pub const CRL: &str = "CRL-1";
pub const SIGNATURE: &str = "S-1";
pub const SIGNED_FILE: &str = "contract.xml";

pub const CA_QC: &str = "http://uri.etsi.org/TrstSvc/Svctype/CA/QC";
pub const GRANTED: &str = "http://uri.etsi.org/TrstSvc/TrustedList/Svcstatus/granted";
pub const WITHDRAWN: &str = "http://uri.etsi.org/TrstSvc/TrustedList/Svcstatus/withdrawn";
pub const TL_URL: &str = "https://tsl.example.be/tsl-be.xml";

pub fn date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

/// 2025-06-01T00:00:00Z
pub fn validation_time() -> DateTime<Utc> {
    date(2025, 6, 1)
}

pub fn root_ca() -> CertificateWrapper {
    CertificateWrapper {
        id: ROOT.to_string(),
        subject_dn: "CN=Example Root CA,O=Example,C=BE".to_string(),
        issuer_dn: "CN=Example Root CA,O=Example,C=BE".to_string(),
        serial_number: "1000".to_string(),
        not_before: date(2015, 1, 1),
        not_after: date(2040, 1, 1),
        self_signed: true,
        trusted: true,
        ca: true,
        key_usages: vec![KeyUsage::KeyCertSign, KeyUsage::CrlSign],
        signature_intact: true,
        certificate_chain: Vec::new(),
        algorithms: AlgorithmFacts::new("RSA", "SHA256", 4096),
        policy_ids: Vec::new(),
        qc_statements: QcStatements::default(),
        country_code: Some("BE".to_string()),
        revocation_access_points: false,
        revocations: Vec::new(),
        trusted_services: Vec::new(),
    }
}

/// Issued by `ROOT`, valid 2023-01-01..2027-01-01, good on `CRL-1`
pub fn leaf(id: &str, subject: &str, usages: Vec<KeyUsage>) -> CertificateWrapper {
    CertificateWrapper {
        id: id.to_string(),
        subject_dn: subject.to_string(),
        issuer_dn: "CN=Example Root CA,O=Example,C=BE".to_string(),
        serial_number: format!("{}-01", id),
        not_before: date(2023, 1, 1),
        not_after: date(2027, 1, 1),
        self_signed: false,
        trusted: false,
        ca: false,
        key_usages: usages,
        signature_intact: true,
        certificate_chain: vec![ROOT.to_string()],
        algorithms: AlgorithmFacts::new("RSA", "SHA256", 2048),
        policy_ids: Vec::new(),
        qc_statements: QcStatements::default(),
        country_code: Some("BE".to_string()),
        revocation_access_points: true,
        revocations: vec![good_on(CRL)],
        trusted_services: Vec::new(),
    }
}

pub fn signing_certificate() -> CertificateWrapper {
    leaf(
        SIGNER,
        "CN=Alice Example,C=BE",
        vec![KeyUsage::NonRepudiation],
    )
}

pub fn tsa_certificate() -> CertificateWrapper {
    let mut tsa = leaf(TSA, "CN=Example TSA,C=BE", vec![KeyUsage::DigitalSignature]);
    tsa.not_before = date(2020, 1, 1);
    tsa.not_after = date(2035, 1, 1);
    tsa
}

pub fn good_on(revocation_id: &str) -> CertificateRevocation {
    CertificateRevocation {
        revocation_id: revocation_id.to_string(),
        status: CertificateStatus::Good,
        revocation_date: None,
        reason: None,
    }
}

/// CRL by `ROOT` produced one day before `at`, next update six days after
pub fn crl_fresh_at(id: &str, at: DateTime<Utc>) -> RevocationWrapper {
    RevocationWrapper {
        id: id.to_string(),
        kind: RevocationKind::Crl,
        production_date: at - Duration::days(1),
        this_update: at - Duration::days(1),
        next_update: Some(at + Duration::days(6)),
        signing_certificate: Some(ROOT.to_string()),
        signature_intact: true,
        algorithms: AlgorithmFacts::new("RSA", "SHA256", 4096),
    }
}

pub fn signature() -> SignatureWrapper {
    SignatureWrapper {
        id: SIGNATURE.to_string(),
        format: SignatureFormat::Xades,
        claimed_signing_time: Some(validation_time() - Duration::days(30)),
        signing_certificate: Some(SigningCertificateRef::resolved(SIGNER)),
        certificate_chain: vec![SIGNER.to_string(), ROOT.to_string()],
        digest_matchers: vec![
            DigestMatcher::new(SIGNED_FILE, DigestMatcherKind::Reference),
            DigestMatcher::new("SignedProperties", DigestMatcherKind::SignedProperties),
        ],
        signature_intact: true,
        algorithms: AlgorithmFacts::new("RSA", "SHA256", 2048),
        counter_signature_of: None,
        policy: None,
        timestamps: Vec::new(),
        evidence_records: Vec::new(),
        signed_files: vec![SIGNED_FILE.to_string()],
    }
}

/// Valid certificate, fresh CRL, intact digests and signature value
pub fn basic_signature() -> DiagnosticData {
    let mut data = DiagnosticData::new(validation_time());
    data.certificates = vec![root_ca(), signing_certificate()];
    data.revocations = vec![crl_fresh_at(CRL, validation_time())];
    data.signatures = vec![signature()];
    data
}

pub fn timestamp(
    id: &str,
    timestamp_type: TimestampType,
    production_time: DateTime<Utc>,
    covered: Vec<TokenRef>,
) -> TimestampWrapper {
    TimestampWrapper {
        id: id.to_string(),
        timestamp_type,
        production_time,
        message_imprint_found: true,
        message_imprint_intact: true,
        signature_intact: true,
        signing_certificate: Some(SigningCertificateRef::resolved(TSA)),
        certificate_chain: vec![TSA.to_string(), ROOT.to_string()],
        timestamped_objects: covered,
        covered_files: Vec::new(),
        algorithms: AlgorithmFacts::new("RSA", "SHA256", 2048),
    }
}

fn ensure_tsa(data: &mut DiagnosticData) {
    if data.find_certificate(TSA).is_none() {
        data.certificates.push(tsa_certificate());
    }
}

/// Attach a signature timestamp over `S-1`
pub fn with_signature_timestamp(
    mut data: DiagnosticData,
    id: &str,
    production_time: DateTime<Utc>,
) -> DiagnosticData {
    ensure_tsa(&mut data);
    data.timestamps.push(timestamp(
        id,
        TimestampType::Signature,
        production_time,
        vec![
            TokenRef::new(SIGNATURE, TokenKind::Signature),
            TokenRef::new(SIGNER, TokenKind::Certificate),
        ],
    ));
    if let Some(sig) = data.signatures.iter_mut().find(|s| s.id == SIGNATURE) {
        sig.timestamps.push(id.to_string());
    }
    data
}

/// Attach an archive timestamp over `S-1`, its file and every token present so far
pub fn with_archive_timestamp(
    mut data: DiagnosticData,
    id: &str,
    production_time: DateTime<Utc>,
) -> DiagnosticData {
    ensure_tsa(&mut data);
    let mut covered = vec![TokenRef::new(SIGNATURE, TokenKind::Signature)];
    covered.extend(
        data.timestamps
            .iter()
            .map(|t| TokenRef::new(t.id.clone(), TokenKind::Timestamp)),
    );
    covered.extend(
        data.certificates
            .iter()
            .map(|c| TokenRef::new(c.id.clone(), TokenKind::Certificate)),
    );
    covered.extend(
        data.revocations
            .iter()
            .map(|r| TokenRef::new(r.id.clone(), TokenKind::Revocation)),
    );
    let mut archive = timestamp(id, TimestampType::Archive, production_time, covered);
    archive.covered_files = vec![SIGNED_FILE.to_string()];
    data.timestamps.push(archive);
    if let Some(sig) = data.signatures.iter_mut().find(|s| s.id == SIGNATURE) {
        sig.timestamps.push(id.to_string());
    }
    data
}

pub fn trusted_service(status: &str, start: DateTime<Utc>, qualifiers: &[&str]) -> TrustedServiceWrapper {
    TrustedServiceWrapper {
        tsp_name: "Example TSP".to_string(),
        service_name: "Example Qualified CA".to_string(),
        country_code: "BE".to_string(),
        service_type: CA_QC.to_string(),
        status: status.to_string(),
        start_date: start,
        end_date: None,
        qualifiers: qualifiers.iter().map(|q| q.to_string()).collect(),
        additional_service_info: Vec::new(),
        tl_url: Some(TL_URL.to_string()),
    }
}

pub fn trusted_list() -> TrustedListWrapper {
    TrustedListWrapper {
        url: TL_URL.to_string(),
        country_code: "BE".to_string(),
        well_signed: true,
        next_update: Some(validation_time() + Duration::days(90)),
    }
}

/// Post-eIDAS qualified certificate for e-signatures on a QSCD
pub fn qualified_signing_certificate() -> CertificateWrapper {
    let mut cert = signing_certificate();
    cert.qc_statements = QcStatements {
        compliance: true,
        sscd: true,
        types: vec![QcType::Esign],
    };
    cert.trusted_services = vec![trusted_service(GRANTED, date(2016, 7, 1), &[])];
    cert
}
