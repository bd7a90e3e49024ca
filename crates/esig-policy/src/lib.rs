//! ESIG Policy: the validation constraint tree
//!
//! # Example
//!
//! ```
//! use esig_policy::{default_policy, ValidationPolicy};
//! use esig_core::{Context, Level, SubContext};
//!
//! let policy = ValidationPolicy::from_yaml("signature:\n  timestamp_coherence: FAIL\n").unwrap();
//! assert_eq!(policy.signature.timestamp_coherence.level, Level::Fail);
//!
//! let usages = default_policy().required_key_usages(Context::Signature, SubContext::CaCertificate);
//! assert_eq!(usages, vec!["keyCertSign"]);
//! ```

pub mod constraints;
pub mod crypto;
pub mod policy;

pub use constraints::{
    BasicConstraints, CertificateConstraints, EvidenceRecordConstraints, IdentificationConstraints,
    PolicyConstraints, QualificationConstraints, RevocationConstraints, SignatureConstraints,
    TimestampConstraints, VerificationConstraints,
};
pub use crypto::{CryptoFailure, CryptographicConstraint};
pub use policy::{default_policy, ValidationPolicy};
