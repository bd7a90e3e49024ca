//! ESIG Core: conclusions, the chain engine and the fact model
//!
//! Shared vocabulary of the AdES validation engine:
//!
//! - `Indication` / `SubIndication` / `Conclusion`: the verdict model
//! - `Level` / `LevelConstraint`: how a policy governs a check
//! - `Chain` / `ChainItem`: the sequential constraint executor every
//!   building block is expressed with
//! - `DiagnosticData` and its wrappers: the read-only facts a validation
//!   consumes

pub mod chain;
pub mod conclusion;
pub mod constraint;
pub mod context;
pub mod diagnostic;
pub mod error;
pub mod indication;
pub mod token;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

pub use chain::{BlockReport, Chain, ChainItem, CheckRecord, CheckStatus};
pub use conclusion::{Conclusion, Message, MessageSeverity};
pub use constraint::{Level, LevelConstraint, TimeUnit, TimeWindow, ANY_VALUE};
pub use context::{Context, SubContext};
pub use diagnostic::{
    AlgorithmFacts, CertificateRevocation, CertificateStatus, CertificateWrapper, ContainerFacts,
    ContainerType, DiagnosticData, DigestMatcher, DigestMatcherKind, EvidenceRecordWrapper,
    KeyUsage, QcStatements, QcType, RevocationKind, RevocationReason, RevocationWrapper,
    SignatureFormat, SignaturePolicyFacts, SignatureWrapper, SigningCertificateRef,
    TimestampType, TimestampWrapper, TrustedListWrapper, TrustedServiceWrapper,
};
pub use error::EsigError;
pub use indication::{Indication, SubIndication};
pub use token::{Token, TokenKind, TokenRef};

/// Engine version reported in validation reports
pub const ESIG_VERSION: &str = "1.0.0";
