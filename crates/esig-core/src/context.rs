//! Validation contexts
//!
//! The policy is looked up per validation context (what kind of token is
//! being validated) and per sub-context (which certificate of its chain).

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Context {
    Signature,
    CounterSignature,
    Timestamp,
    Revocation,
    EvidenceRecord,
    Certificate,
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Context::Signature => "SIGNATURE",
            Context::CounterSignature => "COUNTER_SIGNATURE",
            Context::Timestamp => "TIMESTAMP",
            Context::Revocation => "REVOCATION",
            Context::EvidenceRecord => "EVIDENCE_RECORD",
            Context::Certificate => "CERTIFICATE",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubContext {
    SigningCert,
    CaCertificate,
}

impl SubContext {
    /// Sub-context of the certificate at `position` in a chain
    pub fn for_position(position: usize) -> Self {
        if position == 0 {
            SubContext::SigningCert
        } else {
            SubContext::CaCertificate
        }
    }
}
