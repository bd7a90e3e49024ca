//! SAV: Signature Acceptance Validation (cryptographic constraints)

use super::TokenUnderValidation;
use chrono::{DateTime, Utc};
use esig_core::{BlockReport, Chain, ChainItem, Indication, LevelConstraint, SubIndication};
use esig_policy::ValidationPolicy;

pub const SAV: &str = "Signature Acceptance Validation";

pub fn execute(policy: &ValidationPolicy, token: &TokenUnderValidation<'_>, at: DateTime<Utc>) -> BlockReport {
    let crypto = policy.cryptographic(token.context);
    let constraint = LevelConstraint::new(crypto.level);
    let (outcome, description) = match crypto.check(token.algorithms, at) {
        Ok(()) => (true, format!("The algorithms of {} are reliable at {}", token.id, at.to_rfc3339())),
        Err(reason) => (false, format!("{}: {}", token.id, reason)),
    };

    Chain::new(SAV)
        .item(
            ChainItem::fixed("SAV_CRYPTOGRAPHIC_CONSTRAINTS", &constraint, outcome)
                .describe(description)
                .on_failure(Indication::Indeterminate, SubIndication::CryptoConstraintsFailureNoPoe),
        )
        .execute()
}
