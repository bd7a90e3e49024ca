//! Validation policy
//!
//! The whole constraint tree of one validation: per context, per
//! sub-context, the level of every check plus its parameters. Documents
//! are YAML or JSON overlays of the ETSI default policy.

use crate::constraints::*;
use crate::crypto::CryptographicConstraint;
use esig_core::{Context, EsigError, SubContext};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationPolicy {
    /// Policy name (e.g., "etsi-default@1.0")
    pub name: String,
    pub description: String,
    pub signature: SignatureConstraints,
    pub counter_signature: SignatureConstraints,
    pub timestamp: TimestampConstraints,
    pub revocation: RevocationConstraints,
    pub evidence_record: EvidenceRecordConstraints,
    pub qualification: QualificationConstraints,
    /// Applies wherever a context does not override it
    pub cryptographic: CryptographicConstraint,
}

static DEFAULT_POLICY: Lazy<ValidationPolicy> = Lazy::new(ValidationPolicy::etsi_default);

/// Process-wide default policy, built once on first use
pub fn default_policy() -> &'static ValidationPolicy {
    &DEFAULT_POLICY
}

impl ValidationPolicy {
    /// Constraints of ETSI EN 319 102-1 with the usual deployment choices
    pub fn etsi_default() -> Self {
        Self {
            name: "etsi-default@1.0".to_string(),
            description: "ETSI EN 319 102-1 default validation policy".to_string(),
            signature: SignatureConstraints::default(),
            counter_signature: SignatureConstraints::counter_signature(),
            timestamp: TimestampConstraints::default(),
            revocation: RevocationConstraints::default(),
            evidence_record: EvidenceRecordConstraints::default(),
            qualification: QualificationConstraints::default(),
            cryptographic: CryptographicConstraint::etsi_default(),
        }
    }

    /// Load from YAML; missing sections keep their defaults
    pub fn from_yaml(yaml: &str) -> Result<Self, EsigError> {
        serde_yaml::from_str(yaml).map_err(|e| EsigError::Policy(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, EsigError> {
        serde_json::from_str(json).map_err(|e| EsigError::Policy(e.to_string()))
    }

    pub fn to_yaml(&self) -> Result<String, EsigError> {
        serde_yaml::to_string(self).map_err(|e| EsigError::Serialize(e.to_string()))
    }

    /// Signature-level constraints for a signature or counter-signature
    pub fn signature_constraints(&self, context: Context) -> &SignatureConstraints {
        match context {
            Context::CounterSignature => &self.counter_signature,
            _ => &self.signature,
        }
    }

    /// Building-block constraints for a context
    pub fn basic_constraints(&self, context: Context) -> &BasicConstraints {
        match context {
            Context::CounterSignature => &self.counter_signature.basic,
            Context::Timestamp => &self.timestamp.basic,
            _ => &self.signature.basic,
        }
    }

    pub fn certificate_constraints(&self, context: Context, sub: SubContext) -> &CertificateConstraints {
        let basic = self.basic_constraints(context);
        match sub {
            SubContext::SigningCert => &basic.signing_certificate,
            SubContext::CaCertificate => &basic.ca_certificate,
        }
    }

    /// Key usages required of a certificate, any one of them being enough
    pub fn required_key_usages(&self, context: Context, sub: SubContext) -> Vec<&str> {
        let listed = &self.certificate_constraints(context, sub).key_usage.values;
        if !listed.is_empty() {
            return listed.iter().map(String::as_str).collect();
        }
        match (context, sub) {
            (_, SubContext::CaCertificate) => vec!["keyCertSign"],
            (Context::Timestamp, SubContext::SigningCert) => vec!["digitalSignature", "nonRepudiation"],
            (Context::Certificate, SubContext::SigningCert) => Vec::new(),
            (_, SubContext::SigningCert) => vec!["nonRepudiation", "digitalSignature"],
        }
    }

    /// Most specific cryptographic constraint for a context
    pub fn cryptographic(&self, context: Context) -> &CryptographicConstraint {
        self.basic_constraints(context)
            .cryptographic
            .as_ref()
            .unwrap_or(&self.cryptographic)
    }

    /// Certificate override, else the context constraint
    pub fn certificate_cryptographic(&self, context: Context, sub: SubContext) -> &CryptographicConstraint {
        self.certificate_constraints(context, sub)
            .cryptographic
            .as_ref()
            .unwrap_or_else(|| self.cryptographic(context))
    }
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self::etsi_default()
    }
}
