//! XCV: X.509 Certificate Validation
//!
//! Builds on a prospective chain (issuer DN linkage up to a trust anchor),
//! then checks every certificate below the anchor at the reference time:
//! signature, key usage, validity, revocation (via RFC) and algorithms.

use super::{rfc, TokenUnderValidation};
use crate::poe::PoeSet;
use chrono::{DateTime, Utc};
use esig_core::{
    BlockReport, CertificateWrapper, Chain, ChainItem, Context, DiagnosticData, Indication,
    LevelConstraint, SubContext, SubIndication,
};
use esig_policy::ValidationPolicy;

pub const XCV: &str = "X.509 Certificate Validation";

/// Index of the trust anchor, if the chain links up to one
pub fn prospective_anchor(chain: &[&CertificateWrapper]) -> Option<usize> {
    let anchor = chain.iter().position(|c| c.trusted)?;
    chain[..=anchor]
        .windows(2)
        .all(|w| w[0].issuer_dn == w[1].subject_dn)
        .then_some(anchor)
}

pub fn execute(
    diag: &DiagnosticData,
    policy: &ValidationPolicy,
    poe: &PoeSet,
    token: &TokenUnderValidation<'_>,
    at: DateTime<Utc>,
) -> BlockReport {
    let basic = policy.basic_constraints(token.context);
    let anchor = prospective_anchor(&token.chain);

    let mut chain = Chain::new(XCV);
    chain.push(
        ChainItem::fixed("XCV_PROSPECTIVE_CHAIN", &basic.prospective_chain, anchor.is_some())
            .describe(format!("The certificate chain of {} leads to a trust anchor", token.id))
            .on_failure(Indication::Indeterminate, SubIndication::NoCertificateChainFound),
    );

    let below_anchor = match anchor {
        Some(index) => &token.chain[..index],
        None => token.chain.as_slice(),
    };

    let mut rfc_blocks = Vec::new();
    for (position, &cert) in below_anchor.iter().enumerate() {
        let sub = SubContext::for_position(position);
        let checks = CertificateChecks {
            diag,
            policy,
            poe,
            token,
            cert,
            sub,
            at,
        };
        checks.push_into(&mut chain, &mut rfc_blocks);
    }

    chain.execute().with_sub_blocks(rfc_blocks)
}

struct CertificateChecks<'a, 'b> {
    diag: &'a DiagnosticData,
    policy: &'a ValidationPolicy,
    poe: &'a PoeSet,
    token: &'a TokenUnderValidation<'b>,
    cert: &'a CertificateWrapper,
    sub: SubContext,
    at: DateTime<Utc>,
}

impl CertificateChecks<'_, '_> {
    fn push_into(&self, chain: &mut Chain<'_>, rfc_blocks: &mut Vec<BlockReport>) {
        let constraints = self.policy.certificate_constraints(self.token.context, self.sub);
        let cert = self.cert;
        let signing = self.sub == SubContext::SigningCert;

        chain.push(
            ChainItem::fixed(format!("XCV_{}_SIGNATURE", self.prefix()), &constraints.signature, cert.signature_intact)
                .describe(format!("The signature of certificate {} is intact", cert.id))
                .on_failure(Indication::Indeterminate, SubIndication::CertificateChainGeneralFailure),
        );

        let usages = self.policy.required_key_usages(self.token.context, self.sub);
        let usage_ok = usages.is_empty() || usages.iter().any(|u| cert.has_key_usage(u));
        chain.push(
            ChainItem::fixed(format!("XCV_{}_KEY_USAGE", self.prefix()), &constraints.key_usage, usage_ok)
                .describe(format!("Certificate {} has key usage {}", cert.id, usages.join(" or ")))
                .on_failure(
                    Indication::Indeterminate,
                    if signing {
                        SubIndication::SigConstraintsFailure
                    } else {
                        SubIndication::ChainConstraintsFailure
                    },
                ),
        );

        let (indication, sub_indication) = self.validity_failure();
        chain.push(
            ChainItem::fixed(
                format!("XCV_{}_VALIDITY", self.prefix()),
                &constraints.validity,
                cert.is_valid_at(self.at),
            )
            .describe(format!(
                "Certificate {} is valid at {} ({} .. {})",
                cert.id,
                self.at.to_rfc3339(),
                cert.not_before.to_rfc3339(),
                cert.not_after.to_rfc3339()
            ))
            .on_failure(indication, sub_indication),
        );

        if signing {
            if let (Some(token_time), Some(constraint)) = (self.token.token_time, self.token_time_constraint()) {
                chain.push(
                    ChainItem::fixed("XCV_TOKEN_TIME_IN_VALIDITY", constraint, cert.is_valid_at(token_time))
                        .describe(format!(
                            "The time claimed by {} falls inside the validity of {}",
                            self.token.id, cert.id
                        ))
                        .on_failure(Indication::Indeterminate, SubIndication::OutOfBoundsNotRevoked),
                );
            }
        }

        if !cert.is_revocation_exempt() {
            self.push_revocation(chain, rfc_blocks);
        }

        let crypto = self.policy.certificate_cryptographic(self.token.context, self.sub);
        let (outcome, description) = match crypto.check(&cert.algorithms, self.at) {
            Ok(()) => (true, format!("The algorithms of certificate {} are reliable", cert.id)),
            Err(reason) => (false, format!("Certificate {}: {}", cert.id, reason)),
        };
        chain.push(
            ChainItem::fixed(
                format!("XCV_{}_CRYPTOGRAPHIC", self.prefix()),
                &LevelConstraint::new(crypto.level),
                outcome,
            )
            .describe(description)
            .on_failure(Indication::Indeterminate, SubIndication::CryptoConstraintsFailureNoPoe),
        );
    }

    fn push_revocation(&self, chain: &mut Chain<'_>, rfc_blocks: &mut Vec<BlockReport>) {
        let constraints = self.policy.certificate_constraints(self.token.context, self.sub);
        let cert = self.cert;
        let selection = rfc::select(self.diag, self.policy, cert);

        chain.push(
            ChainItem::fixed(
                format!("XCV_{}_REVOCATION_AVAILABLE", self.prefix()),
                &constraints.revocation_data_available,
                selection.is_some(),
            )
            .describe(format!("Acceptable revocation data about {} is available", cert.id))
            .on_failure(
                Indication::Indeterminate,
                if cert.revocation_access_points {
                    SubIndication::TryLater
                } else {
                    SubIndication::RevocationNotFound
                },
            ),
        );

        let Some(selection) = selection else {
            return;
        };

        let freshness = rfc::execute(selection.revocation, self.at, &constraints.revocation_freshness)
            .with_sub_block(selection.acceptance);
        chain.push(
            ChainItem::fixed(
                format!("XCV_{}_REVOCATION_FRESH", self.prefix()),
                &constraints.revocation_freshness,
                freshness.is_passed(),
            )
            .describe(format!("Revocation {} is fresh at {}", selection.revocation.id, self.at.to_rfc3339()))
            .on_failure(Indication::Indeterminate, SubIndication::TryLater),
        );
        rfc_blocks.push(freshness);

        chain.push(
            ChainItem::fixed(
                format!("XCV_{}_NOT_REVOKED", self.prefix()),
                &constraints.not_revoked,
                !selection.status.is_revoked_at(self.at),
            )
            .describe(format!("Certificate {} is not revoked at {}", cert.id, self.at.to_rfc3339()))
            .on_failure(
                Indication::Indeterminate,
                match self.sub {
                    SubContext::SigningCert => SubIndication::RevokedNoPoe,
                    SubContext::CaCertificate => SubIndication::RevokedCaNoPoe,
                },
            ),
        );
        chain.push(
            ChainItem::fixed(
                format!("XCV_{}_NOT_ON_HOLD", self.prefix()),
                &constraints.not_on_hold,
                !selection.status.is_on_hold_at(self.at),
            )
            .describe(format!("Certificate {} is not on hold", cert.id))
            .on_failure(Indication::Indeterminate, SubIndication::TryLater),
        );
    }

    fn prefix(&self) -> &'static str {
        match self.sub {
            SubContext::SigningCert => "SIGNING_CERT",
            SubContext::CaCertificate => "CA_CERT",
        }
    }

    fn token_time_constraint(&self) -> Option<&LevelConstraint> {
        match self.token.context {
            Context::Signature | Context::CounterSignature => Some(
                &self
                    .policy
                    .signature_constraints(self.token.context)
                    .signing_time_in_validity,
            ),
            Context::Timestamp => Some(&self.policy.timestamp.generation_time_in_validity),
            _ => None,
        }
    }

    /// NOT_YET_VALID before the validity; past it, OUT_OF_BOUNDS_NO_POE when
    /// the token has a POE inside the validity, EXPIRED otherwise
    fn validity_failure(&self) -> (Indication, SubIndication) {
        let cert = self.cert;
        if self.at < cert.not_before {
            (Indication::Failed, SubIndication::NotYetValid)
        } else if self.poe.has_poe_between(self.token.id, cert.not_before, cert.not_after) {
            (Indication::Indeterminate, SubIndication::OutOfBoundsNoPoe)
        } else {
            (Indication::Indeterminate, SubIndication::Expired)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use esig_core::fixtures::{self, date};
    use esig_core::{CertificateStatus, CheckStatus, RevocationReason};

    fn run(data: &DiagnosticData, at: DateTime<Utc>) -> BlockReport {
        let policy = ValidationPolicy::etsi_default();
        let poe = PoeSet::new(data.validation_time);
        let signature = &data.signatures[0];
        let token = TokenUnderValidation::for_signature(data, signature, Context::Signature).unwrap();
        execute(data, &policy, &poe, &token, at)
    }

    fn signer(data: &mut DiagnosticData) -> &mut CertificateWrapper {
        data.certificates.iter_mut().find(|c| c.id == fixtures::SIGNER).unwrap()
    }

    #[test]
    fn test_valid_chain() {
        let data = fixtures::basic_signature();
        let report = run(&data, data.validation_time);
        assert!(report.is_passed(), "{:?}", report.conclusion);
        assert_eq!(report.sub_blocks.len(), 1);
        assert!(report.check("XCV_CA_CERT_SIGNATURE").is_none());
    }

    #[test]
    fn test_missing_anchor() {
        let mut data = fixtures::basic_signature();
        data.certificates[0].trusted = false;
        let report = run(&data, data.validation_time);
        assert!(report
            .conclusion
            .has(Indication::Indeterminate, SubIndication::NoCertificateChainFound));
    }

    #[test]
    fn test_broken_dn_linkage() {
        let mut data = fixtures::basic_signature();
        signer(&mut data).issuer_dn = "CN=Someone Else".to_string();
        let report = run(&data, data.validation_time);
        assert!(!report.is_passed());
    }

    #[test]
    fn test_expired_without_poe() {
        let mut data = fixtures::basic_signature();
        signer(&mut data).not_after = date(2025, 1, 1);
        let report = run(&data, data.validation_time);
        assert!(report.conclusion.has(Indication::Indeterminate, SubIndication::Expired));
    }

    #[test]
    fn test_not_yet_valid() {
        let data = fixtures::basic_signature();
        let report = run(&data, date(2022, 6, 1));
        assert!(report.conclusion.has(Indication::Failed, SubIndication::NotYetValid));
    }

    #[test]
    fn test_revoked_signer_and_ca() {
        let mut data = fixtures::basic_signature();
        signer(&mut data).revocations[0].status = CertificateStatus::Revoked;
        signer(&mut data).revocations[0].revocation_date = Some(date(2025, 3, 1));

        let report = run(&data, data.validation_time);
        assert!(report.conclusion.has(Indication::Indeterminate, SubIndication::RevokedNoPoe));

        // before the revocation date the same data is acceptable
        let report = run(&data, date(2025, 2, 1));
        assert!(report.is_passed(), "{:?}", report.conclusion);
    }

    #[test]
    fn test_on_hold_is_try_later() {
        let mut data = fixtures::basic_signature();
        let status = &mut signer(&mut data).revocations[0];
        status.status = CertificateStatus::Revoked;
        status.reason = Some(RevocationReason::CertificateHold);
        status.revocation_date = Some(date(2025, 3, 1));
        let report = run(&data, data.validation_time);
        assert!(report.conclusion.has(Indication::Indeterminate, SubIndication::TryLater));
    }

    #[test]
    fn test_missing_revocation_depends_on_access_points() {
        let mut data = fixtures::basic_signature();
        data.revocations.clear();
        signer(&mut data).revocations.clear();
        let report = run(&data, data.validation_time);
        assert!(report.conclusion.has(Indication::Indeterminate, SubIndication::TryLater));

        signer(&mut data).revocation_access_points = false;
        let report = run(&data, data.validation_time);
        assert!(report
            .conclusion
            .has(Indication::Indeterminate, SubIndication::RevocationNotFound));
    }

    #[test]
    fn test_stale_revocation() {
        let mut data = fixtures::basic_signature();
        data.revocations[0] = fixtures::crl_fresh_at(fixtures::CRL, data.validation_time - Duration::days(30));
        let report = run(&data, data.validation_time);
        assert!(report.conclusion.has(Indication::Indeterminate, SubIndication::TryLater));
        assert!(!report.sub_blocks[0].is_passed());
    }

    #[test]
    fn test_claimed_time_outside_validity_warns() {
        let mut data = fixtures::basic_signature();
        data.signatures[0].claimed_signing_time = Some(date(2022, 1, 1));
        let report = run(&data, data.validation_time);
        assert!(report.is_passed());
        assert_eq!(
            report.check("XCV_TOKEN_TIME_IN_VALIDITY").map(|c| c.status),
            Some(CheckStatus::Warned)
        );
    }

    #[test]
    fn test_key_usage_mismatch_warns() {
        let mut data = fixtures::basic_signature();
        signer(&mut data).key_usages.clear();
        let report = run(&data, data.validation_time);
        assert!(report.is_passed());
        assert!(!report.conclusion.messages().is_empty());
    }
}
