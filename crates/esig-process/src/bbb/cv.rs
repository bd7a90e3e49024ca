//! CV: Cryptographic Verification
//!
//! Missing signed data is INDETERMINATE (it may appear later); altered
//! data or a broken signature value is FAILED.

use esig_core::{
    BlockReport, Chain, ChainItem, Context, DiagnosticData, DigestMatcherKind, Indication,
    SignatureFormat, SignatureWrapper, SubIndication, TimestampWrapper,
};
use esig_policy::ValidationPolicy;

pub const CV: &str = "Cryptographic Verification";

pub fn for_signature(
    diag: &DiagnosticData,
    policy: &ValidationPolicy,
    context: Context,
    signature: &SignatureWrapper,
) -> BlockReport {
    let constraints = &policy.basic_constraints(context).verification;
    let mut chain = Chain::new(CV);

    chain.push(
        ChainItem::fixed(
            "CV_REFERENCES_PRESENT",
            &constraints.reference_data_found,
            !signature.digest_matchers.is_empty(),
        )
        .describe("The signature references signed data")
        .on_failure(Indication::Indeterminate, SubIndication::SignedDataNotFound),
    );

    if signature.format == SignatureFormat::Xades {
        let signed_properties = signature
            .digest_matchers
            .iter()
            .any(|m| m.kind == DigestMatcherKind::SignedProperties);
        chain.push(
            ChainItem::fixed("CV_SIGNED_PROPERTIES_PRESENT", &constraints.reference_data_found, signed_properties)
                .describe("The signed properties are referenced")
                .on_failure(Indication::Indeterminate, SubIndication::SignedDataNotFound),
        );
    }

    for matcher in &signature.digest_matchers {
        chain.push(
            ChainItem::fixed("CV_REFERENCE_DATA_FOUND", &constraints.reference_data_found, matcher.data_found)
                .describe(format!("The data of reference {} is found", matcher.name))
                .on_failure(Indication::Indeterminate, SubIndication::SignedDataNotFound),
        );
    }
    for matcher in &signature.digest_matchers {
        chain.push(
            ChainItem::fixed("CV_REFERENCE_DATA_INTACT", &constraints.reference_data_intact, matcher.data_intact)
                .describe(format!("The data of reference {} is intact", matcher.name))
                .on_failure(Indication::Failed, SubIndication::HashFailure),
        );
    }

    chain.push(
        ChainItem::fixed("CV_SIGNATURE_INTACT", &constraints.signature_intact, signature.signature_intact)
            .describe("The signature value is intact")
            .on_failure(Indication::Failed, SubIndication::SigCryptoFailure),
    );

    if diag.container.is_some() {
        let unsigned = diag.unsigned_container_files();
        let description = if unsigned.is_empty() {
            "Every file of the container is signed or time-stamped".to_string()
        } else {
            format!(
                "Files not covered by any signature or timestamp: {}",
                unsigned.iter().copied().collect::<Vec<_>>().join(", ")
            )
        };
        chain.push(
            ChainItem::fixed("CV_ALL_FILES_SIGNED", &constraints.all_files_signed, unsigned.is_empty())
                .describe(description)
                .on_failure(Indication::Failed, SubIndication::FormatFailure),
        );
    }

    chain.execute()
}

pub fn for_timestamp(policy: &ValidationPolicy, timestamp: &TimestampWrapper) -> BlockReport {
    let constraints = &policy.basic_constraints(Context::Timestamp).verification;
    Chain::new(CV)
        .item(
            ChainItem::fixed(
                "CV_MESSAGE_IMPRINT_FOUND",
                &constraints.reference_data_found,
                timestamp.message_imprint_found,
            )
            .describe("The time-stamped data is found")
            .on_failure(Indication::Indeterminate, SubIndication::SignedDataNotFound),
        )
        .item(
            ChainItem::fixed(
                "CV_MESSAGE_IMPRINT_INTACT",
                &constraints.reference_data_intact,
                timestamp.message_imprint_intact,
            )
            .describe("The message imprint matches the time-stamped data")
            .on_failure(Indication::Failed, SubIndication::HashFailure),
        )
        .item(
            ChainItem::fixed("CV_SIGNATURE_INTACT", &constraints.signature_intact, timestamp.signature_intact)
                .describe("The signature value of the timestamp is intact")
                .on_failure(Indication::Failed, SubIndication::SigCryptoFailure),
        )
        .execute()
}
