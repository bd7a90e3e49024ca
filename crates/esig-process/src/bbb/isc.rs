//! ISC: Identification of the Signing Certificate

use esig_core::{BlockReport, Chain, ChainItem, Context, Indication, SigningCertificateRef, SubIndication};
use esig_policy::ValidationPolicy;

pub const ISC: &str = "Identification of the Signing Certificate";

pub fn execute(policy: &ValidationPolicy, context: Context, reference: Option<&SigningCertificateRef>) -> BlockReport {
    let constraints = &policy.basic_constraints(context).identification;
    let fact = |f: fn(&SigningCertificateRef) -> bool| reference.map_or(false, f);
    let not_found = (Indication::Indeterminate, SubIndication::NoSigningCertificateFound);

    let mut chain = Chain::new(ISC).item(
        ChainItem::fixed("ISC_RECOGNITION", &constraints.recognition, reference.is_some())
            .describe("The signing certificate is identified")
            .on_failure(not_found.0, not_found.1),
    );
    chain.push(
        ChainItem::fixed(
            "ISC_SIGNED_BY_CERTIFICATE",
            &constraints.signed_by_certificate,
            fact(|r| r.public_key_match),
        )
        .describe("The public key of the signing certificate verifies the signature value")
        .on_failure(not_found.0, not_found.1),
    );
    chain.push(
        ChainItem::fixed("ISC_ATTRIBUTE_PRESENT", &constraints.attribute_present, fact(|r| r.attribute_present))
            .describe("The signing-certificate attribute is present")
            .on_failure(not_found.0, not_found.1),
    );
    chain.push(
        ChainItem::fixed("ISC_DIGEST_PRESENT", &constraints.digest_present, fact(|r| r.digest_present))
            .describe("The signing-certificate attribute carries a digest")
            .on_failure(not_found.0, not_found.1),
    );
    chain.push(
        ChainItem::fixed("ISC_DIGEST_MATCH", &constraints.digest_match, fact(|r| r.digest_match))
            .describe("The digest of the signing certificate matches")
            .on_failure(not_found.0, not_found.1),
    );
    if fact(|r| r.issuer_serial_present) {
        chain.push(
            ChainItem::fixed(
                "ISC_ISSUER_SERIAL_MATCH",
                &constraints.issuer_serial_match,
                fact(|r| r.issuer_serial_match),
            )
            .describe("The issuer and serial number of the signing certificate match")
            .on_failure(not_found.0, not_found.1),
        );
    }
    chain.execute()
}

#[cfg(test)]
mod tests {
    use super::*;
    use esig_core::CheckStatus;

    #[test]
    fn test_resolved_reference_passes() {
        let reference = SigningCertificateRef::resolved("SIGNER");
        let report = execute(&ValidationPolicy::etsi_default(), Context::Signature, Some(&reference));
        assert!(report.is_passed());
        assert_eq!(report.checks.len(), 6);
    }

    #[test]
    fn test_missing_reference() {
        let report = execute(&ValidationPolicy::etsi_default(), Context::Timestamp, None);
        assert!(report
            .conclusion
            .has(Indication::Indeterminate, SubIndication::NoSigningCertificateFound));
        assert_eq!(report.checks.len(), 1);
    }

    #[test]
    fn test_issuer_serial_mismatch_only_warns() {
        let mut reference = SigningCertificateRef::resolved("SIGNER");
        reference.issuer_serial_match = false;
        let report = execute(&ValidationPolicy::etsi_default(), Context::Signature, Some(&reference));
        assert!(report.is_passed());
        assert_eq!(
            report.check("ISC_ISSUER_SERIAL_MATCH").map(|c| c.status),
            Some(CheckStatus::Warned)
        );
    }

    #[test]
    fn test_digest_mismatch() {
        let mut reference = SigningCertificateRef::resolved("SIGNER");
        reference.digest_match = false;
        let report = execute(&ValidationPolicy::etsi_default(), Context::Signature, Some(&reference));
        assert!(!report.is_passed());
        assert!(report.check("ISC_ISSUER_SERIAL_MATCH").is_none());
    }
}
