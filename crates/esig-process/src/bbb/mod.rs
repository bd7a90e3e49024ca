//! Basic Building Blocks
//!
//! ```text
//! VCI ─▶ ISC ─▶ CV ─▶ XCV (+RFC per certificate) ─▶ SAV
//! ```
//!
//! Every block runs and is reported; the token conclusion is then taken
//! from the first non-passed block in this precedence:
//! VCI, ISC, CV when FAILED, XCV, CV, SAV.

pub mod cv;
pub mod isc;
pub mod rfc;
pub mod sav;
pub mod vci;
pub mod xcv;

use crate::poe::PoeSet;
use chrono::{DateTime, Utc};
use esig_core::{
    AlgorithmFacts, BlockReport, CertificateWrapper, Conclusion, Context, DiagnosticData,
    EsigError, SignatureWrapper, TimestampWrapper,
};
use esig_policy::ValidationPolicy;
use serde::Serialize;

/// A token as seen by XCV and SAV
#[derive(Debug, Clone)]
pub struct TokenUnderValidation<'a> {
    pub id: &'a str,
    pub context: Context,
    /// Signing certificate first, towards the trust anchor
    pub chain: Vec<&'a CertificateWrapper>,
    pub algorithms: &'a AlgorithmFacts,
    /// Claimed signing time of a signature, production time of a timestamp
    pub token_time: Option<DateTime<Utc>>,
}

impl<'a> TokenUnderValidation<'a> {
    pub fn for_signature(
        diag: &'a DiagnosticData,
        signature: &'a SignatureWrapper,
        context: Context,
    ) -> Result<Self, EsigError> {
        Ok(Self {
            id: &signature.id,
            context,
            chain: resolve_chain(diag, &signature.certificate_chain, signature.signing_certificate_id())?,
            algorithms: &signature.algorithms,
            token_time: signature.claimed_signing_time,
        })
    }

    pub fn for_timestamp(diag: &'a DiagnosticData, timestamp: &'a TimestampWrapper) -> Result<Self, EsigError> {
        let signer = timestamp.signing_certificate.as_ref().map(|r| r.id.as_str());
        Ok(Self {
            id: &timestamp.id,
            context: Context::Timestamp,
            chain: resolve_chain(diag, &timestamp.certificate_chain, signer)?,
            algorithms: &timestamp.algorithms,
            token_time: Some(timestamp.production_time),
        })
    }

    /// A bare certificate, for `validate_certificate`
    pub fn for_certificate(diag: &'a DiagnosticData, certificate: &'a CertificateWrapper) -> Result<Self, EsigError> {
        Ok(Self {
            id: &certificate.id,
            context: Context::Certificate,
            chain: diag.certificate_path(&certificate.id)?,
            algorithms: &certificate.algorithms,
            token_time: None,
        })
    }

    pub fn signing_certificate(&self) -> Option<&'a CertificateWrapper> {
        self.chain.first().copied()
    }
}

fn resolve_chain<'a>(
    diag: &'a DiagnosticData,
    chain: &[String],
    signer: Option<&str>,
) -> Result<Vec<&'a CertificateWrapper>, EsigError> {
    match (chain.is_empty(), signer) {
        (false, _) => diag.chain(chain),
        (true, Some(id)) => diag.certificate_path(id),
        (true, None) => Ok(Vec::new()),
    }
}

/// The five blocks of one token, and their aggregate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BasicBuildingBlocks {
    pub token_id: String,
    pub context: Context,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vci: Option<BlockReport>,
    pub isc: BlockReport,
    pub cv: BlockReport,
    pub xcv: BlockReport,
    pub sav: BlockReport,
    pub conclusion: Conclusion,
}

/// First non-passed block wins; messages of every block are kept
pub fn aggregate(
    vci: Option<&BlockReport>,
    isc: &BlockReport,
    cv: &BlockReport,
    xcv: &BlockReport,
    sav: &BlockReport,
) -> Conclusion {
    let cv_failed = cv.conclusion.is_failed().then_some(cv);
    let winner = [vci, Some(isc), cv_failed, Some(xcv), Some(cv), Some(sav)]
        .into_iter()
        .flatten()
        .find(|b| !b.is_passed());

    let messages = vci
        .into_iter()
        .chain([isc, cv, xcv, sav])
        .flat_map(|b| b.conclusion.messages().iter().cloned())
        .collect::<Vec<_>>();

    let merged = Conclusion::passed().with_messages(messages);
    match winner {
        Some(block) => merged.with_verdict(&block.conclusion),
        None => merged,
    }
}

/// Combined XCV and SAV verdict at a given time
pub fn chain_and_crypto_at(
    diag: &DiagnosticData,
    policy: &ValidationPolicy,
    poe: &PoeSet,
    token: &TokenUnderValidation<'_>,
    at: DateTime<Utc>,
) -> (BlockReport, BlockReport) {
    (xcv::execute(diag, policy, poe, token, at), sav::execute(policy, token, at))
}

pub fn for_signature(
    diag: &DiagnosticData,
    policy: &ValidationPolicy,
    poe: &PoeSet,
    signature: &SignatureWrapper,
    context: Context,
) -> Result<BasicBuildingBlocks, EsigError> {
    let token = TokenUnderValidation::for_signature(diag, signature, context)?;
    let at = diag.validation_time;

    let vci = vci::execute(policy, context, signature.policy.as_ref());
    let isc = isc::execute(policy, context, signature.signing_certificate.as_ref());
    let cv = cv::for_signature(diag, policy, context, signature);
    let (xcv, sav) = chain_and_crypto_at(diag, policy, poe, &token, at);
    let conclusion = aggregate(Some(&vci), &isc, &cv, &xcv, &sav);

    Ok(BasicBuildingBlocks {
        token_id: signature.id.clone(),
        context,
        vci: Some(vci),
        isc,
        cv,
        xcv,
        sav,
        conclusion,
    })
}

pub fn for_timestamp(
    diag: &DiagnosticData,
    policy: &ValidationPolicy,
    poe: &PoeSet,
    timestamp: &TimestampWrapper,
) -> Result<BasicBuildingBlocks, EsigError> {
    let token = TokenUnderValidation::for_timestamp(diag, timestamp)?;
    let at = diag.validation_time;

    let isc = isc::execute(policy, Context::Timestamp, timestamp.signing_certificate.as_ref());
    let cv = cv::for_timestamp(policy, timestamp);
    let (xcv, sav) = chain_and_crypto_at(diag, policy, poe, &token, at);
    let conclusion = aggregate(None, &isc, &cv, &xcv, &sav);

    Ok(BasicBuildingBlocks {
        token_id: timestamp.id.clone(),
        context: Context::Timestamp,
        vci: None,
        isc,
        cv,
        xcv,
        sav,
        conclusion,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use esig_core::{Indication, SubIndication};

    fn block(conclusion: Conclusion) -> BlockReport {
        BlockReport::skipped("test", conclusion)
    }

    #[test]
    fn test_precedence_cv_failure_before_xcv() {
        let passed = block(Conclusion::passed());
        let cv = block(Conclusion::failed(SubIndication::HashFailure));
        let xcv = block(Conclusion::indeterminate(SubIndication::OutOfBoundsNoPoe));

        let conclusion = aggregate(Some(&passed), &passed, &cv, &xcv, &passed);
        assert!(conclusion.has(Indication::Failed, SubIndication::HashFailure));
    }

    #[test]
    fn test_precedence_xcv_before_indeterminate_cv() {
        let passed = block(Conclusion::passed());
        let cv = block(Conclusion::indeterminate(SubIndication::SignedDataNotFound));
        let xcv = block(Conclusion::indeterminate(SubIndication::Expired));

        let conclusion = aggregate(None, &passed, &cv, &xcv, &passed);
        assert!(conclusion.has(Indication::Indeterminate, SubIndication::Expired));
    }

    #[test]
    fn test_isc_precedes_everything_but_vci() {
        let passed = block(Conclusion::passed());
        let isc = block(Conclusion::indeterminate(SubIndication::NoSigningCertificateFound));
        let vci = block(Conclusion::indeterminate(SubIndication::SignaturePolicyNotAvailable));
        let cv = block(Conclusion::failed(SubIndication::HashFailure));

        assert!(aggregate(None, &isc, &cv, &passed, &passed)
            .has(Indication::Indeterminate, SubIndication::NoSigningCertificateFound));
        assert!(aggregate(Some(&vci), &isc, &cv, &passed, &passed)
            .has(Indication::Indeterminate, SubIndication::SignaturePolicyNotAvailable));
    }

    #[test]
    fn test_all_passed() {
        let passed = block(Conclusion::passed());
        assert!(aggregate(Some(&passed), &passed, &passed, &passed, &passed).is_passed());
    }
}
