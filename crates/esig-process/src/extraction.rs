//! POE extraction
//!
//! Timestamps and evidence records are validated in rounds, youngest
//! first. Every one that validates hands its production time to the
//! tokens it covers, which may let an older timestamp validate in the
//! next round. The loop stops at the first round without progress.

use crate::evidence::{validate_evidence_record, EvidenceRecordValidation};
use crate::poe::{PoeProvider, PoeSet};
use crate::timestamp::{validate_timestamp, TimestampValidation};
use esig_core::{DiagnosticData, EsigError, Token};
use esig_policy::ValidationPolicy;
use std::collections::BTreeMap;
use tracing::debug;

pub struct PoeExtraction {
    pub poe: PoeSet,
    pub timestamps: BTreeMap<String, TimestampValidation>,
    pub evidence_records: BTreeMap<String, EvidenceRecordValidation>,
    pub rounds: usize,
}

pub fn extract_poe(diag: &DiagnosticData, policy: &ValidationPolicy) -> Result<PoeExtraction, EsigError> {
    let mut poe = PoeSet::new(diag.validation_time);
    let mut timestamps: BTreeMap<String, TimestampValidation> = BTreeMap::new();
    let mut evidence_records: BTreeMap<String, EvidenceRecordValidation> = BTreeMap::new();

    let mut order: Vec<_> = diag.timestamps.iter().collect();
    order.sort_by(|a, b| b.production_time.cmp(&a.production_time).then_with(|| a.id.cmp(&b.id)));

    let max_rounds = diag.timestamps.len() + diag.evidence_records.len() + 1;
    let mut rounds = 0;

    while rounds < max_rounds {
        rounds += 1;
        let mut progress = false;

        for timestamp in &order {
            if timestamps.get(&timestamp.id).map_or(false, |v| v.is_passed()) {
                continue;
            }
            let validation = validate_timestamp(diag, policy, &poe, timestamp)?;
            if validation.is_passed() {
                poe.propagate(
                    diag,
                    Token::Timestamp(timestamp),
                    timestamp.production_time,
                    PoeProvider::Timestamp(timestamp.timestamp_type),
                );
                progress = true;
            }
            timestamps.insert(timestamp.id.clone(), validation);
        }

        for record in &diag.evidence_records {
            if evidence_records.get(&record.id).map_or(false, |v| v.is_passed()) {
                continue;
            }
            let validation = validate_evidence_record(policy, record, &timestamps);
            if let Some(time) = validation.poe_time {
                poe.propagate(diag, Token::EvidenceRecord(record), time, PoeProvider::EvidenceRecord);
                progress = true;
            }
            evidence_records.insert(record.id.clone(), validation);
        }

        if !progress {
            break;
        }
    }

    debug!(rounds, tokens = poe.token_count(), "POE extraction finished");
    Ok(PoeExtraction {
        poe,
        timestamps,
        evidence_records,
        rounds,
    })
}
