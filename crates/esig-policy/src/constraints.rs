//! Constraint groups of the validation policy
//!
//! Each group maps one building block (or level) to the `LevelConstraint`s
//! governing its checks. Every struct is `#[serde(default)]` so a partial
//! document only overrides what it names.

use crate::crypto::CryptographicConstraint;
use esig_core::LevelConstraint;
use serde::{Deserialize, Serialize};

/// Validation Context Initialization (signature policy)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConstraints {
    /// Accepted policy identifiers; empty or `*` accepts any
    pub accepted_policies: LevelConstraint,
    pub policy_identified: LevelConstraint,
    pub policy_store_present: LevelConstraint,
    pub policy_digest_match: LevelConstraint,
    /// Zero-hash policies must be listed explicitly in `accepted_policies`
    pub zero_hash_policy: LevelConstraint,
}

impl Default for PolicyConstraints {
    fn default() -> Self {
        Self {
            accepted_policies: LevelConstraint::fail().with_values(["*"]),
            policy_identified: LevelConstraint::fail(),
            policy_store_present: LevelConstraint::inform(),
            policy_digest_match: LevelConstraint::fail(),
            zero_hash_policy: LevelConstraint::warn(),
        }
    }
}

/// Identification of the Signing Certificate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentificationConstraints {
    pub recognition: LevelConstraint,
    pub signed_by_certificate: LevelConstraint,
    pub attribute_present: LevelConstraint,
    pub digest_present: LevelConstraint,
    pub digest_match: LevelConstraint,
    pub issuer_serial_match: LevelConstraint,
}

impl Default for IdentificationConstraints {
    fn default() -> Self {
        Self {
            recognition: LevelConstraint::fail(),
            signed_by_certificate: LevelConstraint::fail(),
            attribute_present: LevelConstraint::fail(),
            digest_present: LevelConstraint::fail(),
            digest_match: LevelConstraint::fail(),
            issuer_serial_match: LevelConstraint::warn(),
        }
    }
}

/// Cryptographic Verification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerificationConstraints {
    pub reference_data_found: LevelConstraint,
    pub reference_data_intact: LevelConstraint,
    pub signature_intact: LevelConstraint,
    /// ASiC: every container file is covered by a signature or timestamp
    pub all_files_signed: LevelConstraint,
}

impl Default for VerificationConstraints {
    fn default() -> Self {
        Self {
            reference_data_found: LevelConstraint::fail(),
            reference_data_intact: LevelConstraint::fail(),
            signature_intact: LevelConstraint::fail(),
            all_files_signed: LevelConstraint::fail(),
        }
    }
}

/// Checks applied to one certificate of a chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CertificateConstraints {
    pub signature: LevelConstraint,
    /// Required key usages; any listed value satisfies the check. When
    /// empty, the usual usages of the certificate's position apply.
    pub key_usage: LevelConstraint,
    pub validity: LevelConstraint,
    pub revocation_data_available: LevelConstraint,
    /// `window` bounds the revocation age; unset falls back to the
    /// token's own nextUpdate − thisUpdate
    pub revocation_freshness: LevelConstraint,
    pub not_revoked: LevelConstraint,
    pub not_on_hold: LevelConstraint,
    /// Overrides the context cryptographic constraint for this certificate
    pub cryptographic: Option<CryptographicConstraint>,
}

impl Default for CertificateConstraints {
    fn default() -> Self {
        Self {
            signature: LevelConstraint::fail(),
            key_usage: LevelConstraint::warn(),
            validity: LevelConstraint::fail(),
            revocation_data_available: LevelConstraint::fail(),
            revocation_freshness: LevelConstraint::fail(),
            not_revoked: LevelConstraint::fail(),
            not_on_hold: LevelConstraint::fail(),
            cryptographic: None,
        }
    }
}

/// Constraints shared by every token with a signature of its own
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicConstraints {
    pub identification: IdentificationConstraints,
    pub verification: VerificationConstraints,
    pub prospective_chain: LevelConstraint,
    pub signing_certificate: CertificateConstraints,
    pub ca_certificate: CertificateConstraints,
    /// Overrides the global cryptographic constraint for this context
    pub cryptographic: Option<CryptographicConstraint>,
}

impl Default for BasicConstraints {
    fn default() -> Self {
        Self {
            identification: IdentificationConstraints::default(),
            verification: VerificationConstraints::default(),
            prospective_chain: LevelConstraint::fail(),
            signing_certificate: CertificateConstraints::default(),
            ca_certificate: CertificateConstraints::default(),
            cryptographic: None,
        }
    }
}

/// Signature and counter-signature contexts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignatureConstraints {
    pub policy: PolicyConstraints,
    pub basic: BasicConstraints,
    /// Claimed signing time inside the signing certificate validity
    pub signing_time_in_validity: LevelConstraint,
    /// At least one signature timestamp (T level)
    pub signature_timestamp_present: LevelConstraint,
    pub signature_timestamp_valid: LevelConstraint,
    /// content ≤ signature ≤ archive timestamp ordering
    pub timestamp_coherence: LevelConstraint,
    /// Claimed signing time not after the earliest signature timestamp
    pub claimed_signing_time_order: LevelConstraint,
    pub archive_timestamp_valid: LevelConstraint,
    pub evidence_record_valid: LevelConstraint,
    /// At least one archive timestamp or evidence record validates (LTA)
    pub archival_data_valid: LevelConstraint,
    /// Signed and time-stamped files covered by archival data
    pub archival_data_coverage: LevelConstraint,
}

impl Default for SignatureConstraints {
    fn default() -> Self {
        Self {
            policy: PolicyConstraints::default(),
            basic: BasicConstraints::default(),
            signing_time_in_validity: LevelConstraint::warn(),
            signature_timestamp_present: LevelConstraint::ignore(),
            signature_timestamp_valid: LevelConstraint::warn(),
            timestamp_coherence: LevelConstraint::warn(),
            claimed_signing_time_order: LevelConstraint::warn(),
            archive_timestamp_valid: LevelConstraint::warn(),
            evidence_record_valid: LevelConstraint::warn(),
            archival_data_valid: LevelConstraint::fail(),
            archival_data_coverage: LevelConstraint::fail(),
        }
    }
}

impl SignatureConstraints {
    /// Counter-signatures default to the same rules without a policy requirement
    pub fn counter_signature() -> Self {
        let mut constraints = Self::default();
        constraints.policy.accepted_policies = LevelConstraint::ignore();
        constraints
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimestampConstraints {
    pub basic: BasicConstraints,
    /// Production time inside the TSA certificate validity
    pub generation_time_in_validity: LevelConstraint,
}

impl Default for TimestampConstraints {
    fn default() -> Self {
        Self {
            basic: BasicConstraints::default(),
            generation_time_in_validity: LevelConstraint::fail(),
        }
    }
}

/// Acceptance of a revocation token before it is used by XCV
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevocationConstraints {
    pub signature_intact: LevelConstraint,
    pub issuer_known: LevelConstraint,
    /// Production date inside the issuer certificate validity
    pub issuer_valid_at_production: LevelConstraint,
}

impl Default for RevocationConstraints {
    fn default() -> Self {
        Self {
            signature_intact: LevelConstraint::fail(),
            issuer_known: LevelConstraint::fail(),
            issuer_valid_at_production: LevelConstraint::fail(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvidenceRecordConstraints {
    pub hash_tree_intact: LevelConstraint,
    /// At least one time-stamp of the record validates
    pub timestamp_valid: LevelConstraint,
}

impl Default for EvidenceRecordConstraints {
    fn default() -> Self {
        Self {
            hash_tree_intact: LevelConstraint::fail(),
            timestamp_valid: LevelConstraint::fail(),
        }
    }
}

/// Checks of the qualification blocks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualificationConstraints {
    pub trusted_list_well_signed: LevelConstraint,
    pub trusted_list_fresh: LevelConstraint,
    pub trust_service_at_time: LevelConstraint,
    pub ca_qc_service: LevelConstraint,
    pub service_status_acceptable: LevelConstraint,
    pub no_conflict: LevelConstraint,
    /// QC at issuance and at signing time agree; QC itself needs both
    pub qc_status_consistent: LevelConstraint,
    pub type_consistent: LevelConstraint,
}

impl Default for QualificationConstraints {
    fn default() -> Self {
        Self {
            trusted_list_well_signed: LevelConstraint::warn(),
            trusted_list_fresh: LevelConstraint::warn(),
            trust_service_at_time: LevelConstraint::warn(),
            ca_qc_service: LevelConstraint::warn(),
            service_status_acceptable: LevelConstraint::warn(),
            no_conflict: LevelConstraint::warn(),
            qc_status_consistent: LevelConstraint::warn(),
            type_consistent: LevelConstraint::warn(),
        }
    }
}

