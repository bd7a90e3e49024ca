//! ESIG Qualification: eIDAS qualified status from trusted lists
//!
//! ```text
//! trusted services ─▶ country ─▶ date ─▶ CA/QC ─▶ status(era) ─▶ strategy
//!                                                                 │
//!   certificate ─▶ baseline (QC, type, QSCD) ─────────────────────┴─▶ outcome
//! ```
//!
//! Qualification is a pure function of the signing certificate, a
//! reference date and the trusted services attached to its issuer. It
//! runs next to the AdES validation and only consumes its indication.

pub mod certificate;
pub mod filter;
pub mod signature;
pub mod status;
pub mod strategy;
pub mod uri;

pub use certificate::{qualify_certificate_at, CertificateQualificationResult, QualificationTime};
pub use filter::applicable_services;
pub use signature::{combine, qualify_signature, SignatureQualification, SignatureQualificationReport};
pub use status::{
    eidas_date, CertificateQualification, CertificateType, Era, QscdStatus, QualificationOutcome,
    QualifiedStatus,
};
pub use strategy::{baseline, QualificationStrategy};
