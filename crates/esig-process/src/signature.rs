//! Level-specific signature validation
//!
//! ```text
//! B (BBBs at validation time)
//!  └─▶ T   signature timestamps, timestamp ordering
//!       └─▶ LT  past validation at long-term POEs
//!            └─▶ LTA archive timestamps, evidence records, coverage
//! ```

use crate::archival::{has_archival_data, long_term_availability};
use crate::bbb::{self, BasicBuildingBlocks, TokenUnderValidation};
use crate::extraction::PoeExtraction;
use crate::ltv::{self, LevelResult, ValidationLevel};
use chrono::{DateTime, Utc};
use esig_core::{
    CertificateWrapper, Conclusion, Context, DiagnosticData, EsigError, SignatureFormat,
    SignatureWrapper, TimestampType,
};
use esig_policy::ValidationPolicy;
use esig_qualification::{qualify_signature, SignatureQualificationReport};
use serde::Serialize;
use tracing::{info, info_span};

#[derive(Debug, Clone, Serialize)]
pub struct SignatureValidation {
    pub signature_id: String,
    pub format: SignatureFormat,
    pub context: Context,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counter_signature_of: Option<String>,
    pub bbbs: BasicBuildingBlocks,
    pub levels: Vec<LevelResult>,
    pub best_signature_time: DateTime<Utc>,
    pub level_reached: ValidationLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualification: Option<SignatureQualificationReport>,
    pub conclusion: Conclusion,
}

impl SignatureValidation {
    pub fn level(&self, level: ValidationLevel) -> Option<&LevelResult> {
        self.levels.iter().find(|l| l.level == level)
    }
}

/// Highest format level the signature carries material for
pub fn level_reached(
    diag: &DiagnosticData,
    signature: &SignatureWrapper,
    chain: &[&CertificateWrapper],
) -> ValidationLevel {
    let with_time = diag
        .timestamps_of(signature)
        .any(|t| t.timestamp_type == TimestampType::Signature);
    let long_term = with_time
        && chain
            .iter()
            .filter(|c| !c.is_revocation_exempt())
            .all(|c| !c.revocations.is_empty());

    if long_term && has_archival_data(diag, signature) {
        ValidationLevel::Lta
    } else if long_term {
        ValidationLevel::Lt
    } else if with_time {
        ValidationLevel::T
    } else {
        ValidationLevel::B
    }
}

pub fn validate_signature(
    diag: &DiagnosticData,
    policy: &ValidationPolicy,
    extraction: &PoeExtraction,
    signature: &SignatureWrapper,
) -> Result<SignatureValidation, EsigError> {
    let context = if signature.is_counter_signature() {
        Context::CounterSignature
    } else {
        Context::Signature
    };
    let span = info_span!("signature", id = %signature.id, context = %context);
    let _enter = span.enter();

    let bbbs = bbb::for_signature(diag, policy, &extraction.poe, signature, context)?;
    let token = TokenUnderValidation::for_signature(diag, signature, context)?;

    let basic = LevelResult {
        level: ValidationLevel::B,
        block: None,
        past: None,
        conclusion: bbbs.conclusion.clone(),
    };
    let with_time = ltv::with_time(diag, policy, extraction, signature, context, &basic.conclusion);
    let long_term = ltv::long_term(diag, policy, extraction, signature, &bbbs, &token, &with_time.conclusion);
    let archival = has_archival_data(diag, signature).then(|| {
        long_term_availability(diag, policy, extraction, signature, context, &bbbs, &token, &long_term)
    });

    let conclusion = archival
        .as_ref()
        .unwrap_or(&long_term)
        .conclusion
        .clone();
    let best_signature_time = ltv::best_signature_time(extraction, signature);
    let level_reached = level_reached(diag, signature, &token.chain);

    let qualification = signature
        .signing_certificate_id()
        .and_then(|id| diag.find_certificate(id))
        .map(|cert| {
            qualify_signature(
                diag,
                &policy.qualification,
                &signature.id,
                cert,
                conclusion.indication(),
                best_signature_time,
            )
        });

    info!(
        indication = %conclusion,
        level = %level_reached,
        qualification = qualification.as_ref().map(|q| q.qualification.label()).unwrap_or("N/A"),
        "signature validated"
    );

    let mut levels = vec![basic, with_time, long_term];
    levels.extend(archival);

    Ok(SignatureValidation {
        signature_id: signature.id.clone(),
        format: signature.format,
        context,
        counter_signature_of: signature.counter_signature_of.clone(),
        bbbs,
        levels,
        best_signature_time,
        level_reached,
        qualification,
        conclusion,
    })
}
