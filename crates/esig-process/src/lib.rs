//! ESIG Process: AdES validation processes
//!
//! ```text
//! DiagnosticData ─▶ consistency ─▶ POE extraction ─▶ per signature:
//!                                   (timestamps,      B ─▶ T ─▶ LT ─▶ LTA
//!                                    evidence records)            │
//!                                                     qualification ─▶ Reports
//! ```
//!
//! # Example
//!
//! ```ignore
//! use esig_policy::default_policy;
//! use esig_process::validate;
//!
//! let reports = validate(&diagnostic_data, default_policy())?;
//! println!("{}", reports.simple_json()?);
//! ```

pub mod archival;
pub mod bbb;
pub mod evidence;
pub mod executor;
pub mod extraction;
pub mod ltv;
pub mod past;
pub mod poe;
pub mod reports;
pub mod signature;
pub mod timestamp;

pub use bbb::{BasicBuildingBlocks, TokenUnderValidation};
pub use evidence::EvidenceRecordValidation;
pub use executor::{validate, validate_certificate};
pub use extraction::{extract_poe, PoeExtraction};
pub use ltv::{LevelResult, ValidationLevel};
pub use past::{past_validation, PastAttempt, PastValidation};
pub use poe::{PoeProvider, PoeRecord, PoeSet};
pub use reports::{
    CertificateValidation, DetailedReport, Reports, SimpleCertificate, SimpleReport, SimpleSignature,
    SimpleTimestamp,
};
pub use signature::{validate_signature, SignatureValidation};
pub use timestamp::{validate_timestamp, TimestampValidation};
