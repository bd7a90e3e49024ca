//! VCI: Validation Context Initialization
//!
//! Only an explicit signature policy is checked; a signature without one,
//! or with an implicit one, passes.

use esig_core::{BlockReport, Chain, ChainItem, Context, Indication, SignaturePolicyFacts, SubIndication};
use esig_policy::ValidationPolicy;

pub const VCI: &str = "Validation Context Initialization";

pub fn execute(policy: &ValidationPolicy, context: Context, facts: Option<&SignaturePolicyFacts>) -> BlockReport {
    let constraints = &policy.signature_constraints(context).policy;
    let mut chain = Chain::new(VCI);

    let facts = match facts {
        Some(f) if !f.implicit => f,
        _ => return chain.execute(),
    };

    chain.push(
        ChainItem::fixed(
            "VCI_POLICY_ACCEPTED",
            &constraints.accepted_policies,
            constraints.accepted_policies.accepts(&facts.id),
        )
        .describe(format!("Signature policy {} is accepted", facts.id))
        .on_failure(Indication::Indeterminate, SubIndication::PolicyProcessingError),
    );
    chain.push(
        ChainItem::fixed("VCI_POLICY_IDENTIFIED", &constraints.policy_identified, facts.identified)
            .describe(format!("Signature policy {} could be retrieved", facts.id))
            .on_failure(Indication::Indeterminate, SubIndication::SignaturePolicyNotAvailable),
    );
    chain.push(
        ChainItem::fixed("VCI_POLICY_STORE_PRESENT", &constraints.policy_store_present, facts.store_present)
            .describe("A signature policy store is embedded"),
    );

    if facts.identified {
        if facts.zero_hash {
            chain.push(
                ChainItem::fixed(
                    "VCI_ZERO_HASH_POLICY",
                    &constraints.zero_hash_policy,
                    constraints.accepted_policies.lists(&facts.id),
                )
                .describe(format!("Zero-hash policy {} is explicitly accepted", facts.id))
                .on_failure(Indication::Indeterminate, SubIndication::PolicyProcessingError),
            );
        } else {
            chain.push(
                ChainItem::fixed("VCI_POLICY_DIGEST_MATCH", &constraints.policy_digest_match, facts.digest_match)
                    .describe(format!("The digest of signature policy {} matches", facts.id))
                    .on_failure(Indication::Indeterminate, SubIndication::PolicyProcessingError),
            );
        }
    }

    chain.execute()
}
