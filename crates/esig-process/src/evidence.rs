//! Evidence record validation
//!
//! An evidence record is valid when its hash tree is intact and at least
//! one time-stamp of its archive time-stamp chain validated. Its POE time
//! is the production time of the oldest such time-stamp.

use crate::timestamp::TimestampValidation;
use chrono::{DateTime, Utc};
use esig_core::{BlockReport, Chain, ChainItem, EvidenceRecordWrapper, Indication, SubIndication};
use esig_policy::ValidationPolicy;
use serde::Serialize;
use std::collections::BTreeMap;

pub const ERV: &str = "Evidence Record Validation";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvidenceRecordValidation {
    pub id: String,
    pub block: BlockReport,
    /// Oldest validated time-stamp of the record
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poe_time: Option<DateTime<Utc>>,
}

impl EvidenceRecordValidation {
    pub fn is_passed(&self) -> bool {
        self.block.is_passed()
    }
}

pub fn validate_evidence_record(
    policy: &ValidationPolicy,
    record: &EvidenceRecordWrapper,
    timestamps: &BTreeMap<String, TimestampValidation>,
) -> EvidenceRecordValidation {
    let constraints = &policy.evidence_record;
    let poe_time = record
        .timestamps
        .iter()
        .filter_map(|id| timestamps.get(id))
        .filter(|t| t.is_passed())
        .map(|t| t.production_time)
        .min();

    let block = Chain::new(ERV)
        .item(
            ChainItem::fixed("ERV_HASH_TREE_INTACT", &constraints.hash_tree_intact, record.hash_tree_intact)
                .describe(format!("The hash tree of evidence record {} is intact", record.id))
                .on_failure(Indication::Failed, SubIndication::HashFailure),
        )
        .item(
            ChainItem::fixed("ERV_TIMESTAMP_VALID", &constraints.timestamp_valid, poe_time.is_some())
                .describe(format!("A time-stamp of evidence record {} is valid", record.id))
                .on_failure(Indication::Indeterminate, SubIndication::NoPoe),
        )
        .execute();

    EvidenceRecordValidation {
        id: record.id.clone(),
        poe_time: poe_time.filter(|_| block.is_passed()),
        block,
    }
}
