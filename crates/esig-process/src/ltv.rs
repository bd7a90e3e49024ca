//! T and LT levels
//!
//! T adds the signature timestamps (their validity and the ordering of
//! all timestamps of the signature). LT re-anchors a recoverable verdict
//! at the long-term POEs of the signature.

use crate::bbb::{aggregate, chain_and_crypto_at, BasicBuildingBlocks, TokenUnderValidation};
use crate::extraction::PoeExtraction;
use crate::past::{past_validation, PastValidation};
use chrono::{DateTime, Utc};
use esig_core::{
    BlockReport, Chain, ChainItem, Conclusion, Context, DiagnosticData, Indication, SignatureWrapper,
    SubIndication, TimestampType, TimestampWrapper,
};
use esig_policy::ValidationPolicy;
use serde::Serialize;

pub const TLEVEL: &str = "Validation with Time";

/// Signature format levels, each including the previous
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationLevel {
    B,
    T,
    Lt,
    Lta,
}

impl std::fmt::Display for ValidationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ValidationLevel::B => "B",
            ValidationLevel::T => "T",
            ValidationLevel::Lt => "LT",
            ValidationLevel::Lta => "LTA",
        };
        write!(f, "{}", label)
    }
}

/// Outcome of one level of the orchestration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelResult {
    pub level: ValidationLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block: Option<BlockReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub past: Option<PastValidation>,
    pub conclusion: Conclusion,
}

fn timestamps_of_type<'a>(
    diag: &'a DiagnosticData,
    signature: &'a SignatureWrapper,
    accept: impl Fn(TimestampType) -> bool + 'a,
) -> impl Iterator<Item = &'a TimestampWrapper> + 'a {
    diag.timestamps_of(signature).filter(move |t| accept(t.timestamp_type))
}

/// Latest time of one group never after the earliest of the next
fn coherent(groups: &[Vec<DateTime<Utc>>]) -> bool {
    groups
        .iter()
        .filter(|g| !g.is_empty())
        .collect::<Vec<_>>()
        .windows(2)
        .all(|w| {
            let latest = w[0].iter().max();
            let earliest = w[1].iter().min();
            matches!((latest, earliest), (Some(a), Some(b)) if a <= b)
        })
}

pub fn with_time(
    diag: &DiagnosticData,
    policy: &ValidationPolicy,
    extraction: &PoeExtraction,
    signature: &SignatureWrapper,
    context: Context,
    basic: &Conclusion,
) -> LevelResult {
    let constraints = policy.signature_constraints(context);
    let signature_timestamps: Vec<_> =
        timestamps_of_type(diag, signature, |t| t == TimestampType::Signature).collect();

    let mut chain = Chain::new(TLEVEL);
    chain.push(
        ChainItem::fixed(
            "T_SIGNATURE_TIMESTAMP_PRESENT",
            &constraints.signature_timestamp_present,
            !signature_timestamps.is_empty(),
        )
        .describe(format!("Signature {} carries a signature timestamp", signature.id))
        .on_failure(Indication::Indeterminate, SubIndication::SigConstraintsFailure),
    );

    for timestamp in &signature_timestamps {
        let validation = extraction.timestamps.get(&timestamp.id);
        let (indication, sub_indication) = validation
            .map(|v| {
                (
                    v.conclusion.indication(),
                    v.conclusion.sub_indication().unwrap_or(SubIndication::Generic),
                )
            })
            .unwrap_or((Indication::Indeterminate, SubIndication::Generic));
        chain.push(
            ChainItem::fixed(
                "T_SIGNATURE_TIMESTAMP_VALID",
                &constraints.signature_timestamp_valid,
                validation.map_or(false, |v| v.is_passed()),
            )
            .describe(format!("Signature timestamp {} is valid", timestamp.id))
            .on_failure(indication, sub_indication),
        );
    }

    let passed_times = |accept: fn(TimestampType) -> bool| -> Vec<DateTime<Utc>> {
        timestamps_of_type(diag, signature, accept)
            .filter(|t| extraction.timestamps.get(&t.id).map_or(false, |v| v.is_passed()))
            .map(|t| t.production_time)
            .collect()
    };
    let groups = [
        passed_times(|t| t == TimestampType::Content),
        passed_times(|t| t == TimestampType::Signature),
        passed_times(|t| t == TimestampType::ValidationData),
        passed_times(|t| t == TimestampType::Archive),
    ];
    chain.push(
        ChainItem::fixed("T_TIMESTAMP_COHERENCE", &constraints.timestamp_coherence, coherent(&groups))
            .describe("Content, signature and archive timestamps are in chronological order")
            .on_failure(Indication::Indeterminate, SubIndication::TimestampOrderFailure),
    );

    if let (Some(claimed), Some(earliest)) = (signature.claimed_signing_time, groups[1].iter().min()) {
        chain.push(
            ChainItem::fixed("T_CLAIMED_SIGNING_TIME", &constraints.claimed_signing_time_order, claimed <= *earliest)
                .describe("The claimed signing time is not after the signature timestamps")
                .on_failure(Indication::Indeterminate, SubIndication::TimestampOrderFailure),
        );
    }

    let block = chain.execute();
    let merged = basic.clone().with_messages(block.conclusion.messages().iter().cloned());
    let conclusion = if !basic.is_failed() && !block.is_passed() {
        merged.with_verdict(&block.conclusion)
    } else {
        merged
    };

    LevelResult {
        level: ValidationLevel::T,
        block: Some(block),
        past: None,
        conclusion,
    }
}

/// Earliest long-term POE of the signature
pub fn best_signature_time(extraction: &PoeExtraction, signature: &SignatureWrapper) -> DateTime<Utc> {
    extraction
        .poe
        .times_desc(&signature.id, |r| r.provider.is_long_term())
        .last()
        .copied()
        .unwrap_or_else(|| extraction.poe.validation_time())
}

/// Re-anchor a recoverable verdict at earlier POEs of the signature
pub fn past_signature_validation(
    diag: &DiagnosticData,
    policy: &ValidationPolicy,
    extraction: &PoeExtraction,
    bbbs: &BasicBuildingBlocks,
    token: &TokenUnderValidation<'_>,
    initial: &Conclusion,
    times: &[DateTime<Utc>],
) -> PastValidation {
    past_validation(initial, diag.validation_time, times, |t| {
        let (xcv, sav) = chain_and_crypto_at(diag, policy, &extraction.poe, token, t);
        aggregate(bbbs.vci.as_ref(), &bbbs.isc, &bbbs.cv, &xcv, &sav)
    })
}

pub fn long_term(
    diag: &DiagnosticData,
    policy: &ValidationPolicy,
    extraction: &PoeExtraction,
    signature: &SignatureWrapper,
    bbbs: &BasicBuildingBlocks,
    token: &TokenUnderValidation<'_>,
    with_time: &Conclusion,
) -> LevelResult {
    let past = with_time.is_recoverable().then(|| {
        let times = extraction
            .poe
            .times_desc(&signature.id, |r| r.provider.is_long_term());
        past_signature_validation(diag, policy, extraction, bbbs, token, with_time, &times)
    });

    let conclusion = past
        .as_ref()
        .map_or_else(|| with_time.clone(), |p| p.conclusion.clone());

    LevelResult {
        level: ValidationLevel::Lt,
        block: None,
        past,
        conclusion,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use esig_core::fixtures::date;

    #[test]
    fn test_coherence_ignores_empty_groups() {
        let groups = [vec![date(2025, 1, 1)], vec![], vec![], vec![date(2025, 3, 1)]];
        assert!(coherent(&groups));

        let groups = [vec![date(2025, 4, 1)], vec![date(2025, 2, 1)], vec![], vec![]];
        assert!(!coherent(&groups));
    }

    #[test]
    fn test_coherence_allows_equal_times() {
        let groups = [vec![date(2025, 1, 1)], vec![date(2025, 1, 1), date(2025, 2, 1)], vec![], vec![date(2025, 2, 1)]];
        assert!(coherent(&groups));
    }
}
