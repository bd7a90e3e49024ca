//! Timestamp validation
//!
//! A timestamp runs ISC, CV, XCV and SAV at the validation time. When that
//! is recoverable and the timestamp itself has earlier POEs (from an
//! archive timestamp covering it), past validation may still accept it.

use crate::bbb::{self, aggregate, chain_and_crypto_at, BasicBuildingBlocks, TokenUnderValidation};
use crate::past::{past_validation, PastValidation};
use crate::poe::PoeSet;
use chrono::{DateTime, Utc};
use esig_core::{Conclusion, DiagnosticData, EsigError, TimestampType, TimestampWrapper};
use esig_policy::ValidationPolicy;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimestampValidation {
    pub id: String,
    pub timestamp_type: TimestampType,
    pub production_time: DateTime<Utc>,
    pub bbbs: BasicBuildingBlocks,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub past: Option<PastValidation>,
    pub conclusion: Conclusion,
}

impl TimestampValidation {
    pub fn is_passed(&self) -> bool {
        self.conclusion.is_passed()
    }
}

pub fn validate_timestamp(
    diag: &DiagnosticData,
    policy: &ValidationPolicy,
    poe: &PoeSet,
    timestamp: &TimestampWrapper,
) -> Result<TimestampValidation, EsigError> {
    let bbbs = bbb::for_timestamp(diag, policy, poe, timestamp)?;

    let past = if bbbs.conclusion.is_recoverable() {
        let token = TokenUnderValidation::for_timestamp(diag, timestamp)?;
        let times = poe.all_times_desc(&timestamp.id);
        Some(past_validation(&bbbs.conclusion, diag.validation_time, &times, |t| {
            let (xcv, sav) = chain_and_crypto_at(diag, policy, poe, &token, t);
            aggregate(None, &bbbs.isc, &bbbs.cv, &xcv, &sav)
        }))
    } else {
        None
    };

    let conclusion = past
        .as_ref()
        .map_or_else(|| bbbs.conclusion.clone(), |p| p.conclusion.clone());
    debug!(timestamp = %timestamp.id, conclusion = %conclusion, "timestamp validated");

    Ok(TimestampValidation {
        id: timestamp.id.clone(),
        timestamp_type: timestamp.timestamp_type,
        production_time: timestamp.production_time,
        bbbs,
        past,
        conclusion,
    })
}
