//! LTA level
//!
//! Applies when the signature carries archive timestamps or evidence
//! records. At least one piece of archival data must validate, and every
//! file signed or time-stamped earlier must be covered by a later archive
//! timestamp or evidence record.

use crate::bbb::{BasicBuildingBlocks, TokenUnderValidation};
use crate::extraction::PoeExtraction;
use crate::ltv::{past_signature_validation, LevelResult, ValidationLevel};
use chrono::{DateTime, Utc};
use esig_core::{
    Chain, ChainItem, Context, DiagnosticData, Indication, SignatureWrapper,
    SubIndication, TimestampType,
};
use esig_policy::ValidationPolicy;
use std::collections::BTreeSet;

pub const LTA: &str = "Validation of Long-Term Availability";

pub fn has_archival_data(diag: &DiagnosticData, signature: &SignatureWrapper) -> bool {
    diag.timestamps_of(signature)
        .any(|t| t.timestamp_type == TimestampType::Archive)
        || diag.evidence_records_of(signature).next().is_some()
}

/// One validated archive timestamp or evidence record
struct ArchivalItem<'a> {
    time: DateTime<Utc>,
    files: &'a [String],
}

/// Files that no later archival item covers
fn uncovered_files<'a>(
    diag: &'a DiagnosticData,
    signature: &'a SignatureWrapper,
    items: &[ArchivalItem<'a>],
) -> BTreeSet<&'a str> {
    let mut missing = BTreeSet::new();
    let all_covered: BTreeSet<&str> = items.iter().flat_map(|i| i.files.iter().map(String::as_str)).collect();

    let earlier = signature.signed_files.iter().chain(
        diag.timestamps_of(signature)
            .filter(|t| t.timestamp_type != TimestampType::Archive)
            .flat_map(|t| t.covered_files.iter()),
    );
    missing.extend(earlier.map(String::as_str).filter(|f| !all_covered.contains(f)));

    let last = items.len().saturating_sub(1);
    for (index, item) in items.iter().enumerate().take(last) {
        let later: BTreeSet<&str> = items[index + 1..]
            .iter()
            .flat_map(|i| i.files.iter().map(String::as_str))
            .collect();
        missing.extend(item.files.iter().map(String::as_str).filter(|f| !later.contains(f)));
    }
    missing
}

#[allow(clippy::too_many_arguments)]
pub fn long_term_availability(
    diag: &DiagnosticData,
    policy: &ValidationPolicy,
    extraction: &PoeExtraction,
    signature: &SignatureWrapper,
    context: Context,
    bbbs: &BasicBuildingBlocks,
    token: &TokenUnderValidation<'_>,
    long_term: &LevelResult,
) -> LevelResult {
    let constraints = policy.signature_constraints(context);
    let mut chain = Chain::new(LTA);
    let mut items: Vec<ArchivalItem<'_>> = Vec::new();

    for record in diag.evidence_records_of(signature) {
        let validation = extraction.evidence_records.get(&record.id);
        let poe_time = validation.and_then(|v| v.poe_time);
        chain.push(
            ChainItem::fixed("LTA_EVIDENCE_RECORD_VALID", &constraints.evidence_record_valid, poe_time.is_some())
                .describe(format!("Evidence record {} is valid", record.id))
                .on_failure(Indication::Indeterminate, SubIndication::NoPoe),
        );
        if let Some(time) = poe_time {
            items.push(ArchivalItem {
                time,
                files: &record.covered_files,
            });
        }
    }

    let mut archives: Vec<_> = diag
        .timestamps_of(signature)
        .filter(|t| t.timestamp_type == TimestampType::Archive)
        .collect();
    archives.sort_by(|a, b| b.production_time.cmp(&a.production_time).then_with(|| a.id.cmp(&b.id)));
    for archive in archives {
        let passed = extraction.timestamps.get(&archive.id).map_or(false, |v| v.is_passed());
        chain.push(
            ChainItem::fixed("LTA_ARCHIVE_TIMESTAMP_VALID", &constraints.archive_timestamp_valid, passed)
                .describe(format!("Archive timestamp {} is valid", archive.id))
                .on_failure(Indication::Indeterminate, SubIndication::NoPoe),
        );
        if passed {
            items.push(ArchivalItem {
                time: archive.production_time,
                files: &archive.covered_files,
            });
        }
    }

    chain.push(
        ChainItem::fixed("LTA_ARCHIVAL_DATA_VALID", &constraints.archival_data_valid, !items.is_empty())
            .describe("At least one archive timestamp or evidence record is valid")
            .on_failure(Indication::Indeterminate, SubIndication::NoPoe),
    );

    items.sort_by_key(|i| i.time);
    let missing = uncovered_files(diag, signature, &items);
    let description = if missing.is_empty() {
        "Every signed or time-stamped file is covered by later archival data".to_string()
    } else {
        format!(
            "Files not covered by later archival data: {}",
            missing.iter().copied().collect::<Vec<_>>().join(", ")
        )
    };
    chain.push(
        ChainItem::fixed("LTA_ARCHIVAL_DATA_COVERAGE", &constraints.archival_data_coverage, missing.is_empty())
            .describe(description)
            .on_failure(Indication::Failed, SubIndication::FormatFailure),
    );

    let block = chain.execute();
    let merged = long_term
        .conclusion
        .clone()
        .with_messages(block.conclusion.messages().iter().cloned());

    let (past, conclusion) = if long_term.conclusion.is_failed() {
        (None, merged)
    } else if !block.is_passed() {
        (None, merged.with_verdict(&block.conclusion))
    } else if long_term.conclusion.is_recoverable() {
        let times = extraction.poe.all_times_desc(&signature.id);
        let past = past_signature_validation(diag, policy, extraction, bbbs, token, &merged, &times);
        let conclusion = past.conclusion.clone();
        (Some(past), conclusion)
    } else {
        (None, merged)
    };

    LevelResult {
        level: ValidationLevel::Lta,
        block: Some(block),
        past,
        conclusion,
    }
}
