//! RFC: Revocation Freshness Check
//!
//! A revocation token is fresh at `t` iff it was produced no earlier than
//! `t − maxFreshness` and its nextUpdate (if any) is not before `t`.
//! `maxFreshness` comes from the policy window; when the policy leaves it
//! unset or zero, the token's own `nextUpdate − thisUpdate` is used, and a
//! token without nextUpdate gets no tolerance at all.

use chrono::{DateTime, Duration, Utc};
use esig_core::{
    BlockReport, CertificateRevocation, CertificateWrapper, Chain, ChainItem, DiagnosticData,
    Indication, LevelConstraint, RevocationWrapper, SubIndication,
};
use esig_policy::ValidationPolicy;

pub const RFC: &str = "Revocation Freshness Checker";
pub const RAC: &str = "Revocation Acceptance Checker";

pub fn max_freshness(constraint: &LevelConstraint, revocation: &RevocationWrapper) -> Duration {
    constraint.duration().unwrap_or_else(|| {
        revocation
            .next_update
            .map(|next| next - revocation.this_update)
            .filter(|d| *d > Duration::zero())
            .unwrap_or_else(Duration::zero)
    })
}

/// A window reaching past the representable range accepts any production time
pub fn is_fresh(revocation: &RevocationWrapper, at: DateTime<Utc>, max_freshness: Duration) -> bool {
    at.checked_sub_signed(max_freshness)
        .map_or(true, |earliest| revocation.production_date >= earliest)
}

pub fn next_update_not_passed(revocation: &RevocationWrapper, at: DateTime<Utc>) -> bool {
    revocation.next_update.map_or(true, |next| next >= at)
}

pub fn execute(revocation: &RevocationWrapper, at: DateTime<Utc>, constraint: &LevelConstraint) -> BlockReport {
    let max = max_freshness(constraint, revocation);
    Chain::new(RFC)
        .item(
            ChainItem::fixed("RFC_NEXT_UPDATE", constraint, next_update_not_passed(revocation, at))
                .describe(format!("The next update of revocation {} is not before {}", revocation.id, at.to_rfc3339()))
                .on_failure(Indication::Indeterminate, SubIndication::TryLater),
        )
        .item(
            ChainItem::fixed("RFC_FRESHNESS", constraint, is_fresh(revocation, at, max))
                .describe(format!(
                    "Revocation {} was produced at most {}s before {}",
                    revocation.id,
                    max.num_seconds(),
                    at.to_rfc3339()
                ))
                .on_failure(Indication::Indeterminate, SubIndication::TryLater),
        )
        .execute()
}

/// Revocation Acceptance: the token itself can be relied upon
pub fn acceptance(diag: &DiagnosticData, policy: &ValidationPolicy, revocation: &RevocationWrapper) -> BlockReport {
    let constraints = &policy.revocation;
    let issuer = revocation
        .signing_certificate
        .as_deref()
        .and_then(|id| diag.find_certificate(id));

    Chain::new(RAC)
        .item(
            ChainItem::fixed("RAC_SIGNATURE_INTACT", &constraints.signature_intact, revocation.signature_intact)
                .describe(format!("The signature of revocation {} is intact", revocation.id))
                .on_failure(Indication::Indeterminate, SubIndication::TryLater),
        )
        .item(
            ChainItem::fixed("RAC_ISSUER_KNOWN", &constraints.issuer_known, issuer.is_some())
                .describe(format!("The issuer of revocation {} is known", revocation.id))
                .on_failure(Indication::Indeterminate, SubIndication::TryLater),
        )
        .item(
            ChainItem::fixed(
                "RAC_ISSUER_VALID",
                &constraints.issuer_valid_at_production,
                issuer.map_or(false, |c| c.is_valid_at(revocation.production_date)),
            )
            .describe(format!("The issuer of revocation {} was valid when it was produced", revocation.id))
            .on_failure(Indication::Indeterminate, SubIndication::RevocationOutOfBoundsNoPoe),
        )
        .execute()
}

/// Latest acceptable revocation data about a certificate
pub struct RevocationSelection<'a> {
    pub revocation: &'a RevocationWrapper,
    pub status: &'a CertificateRevocation,
    pub acceptance: BlockReport,
}

pub fn select<'a>(
    diag: &'a DiagnosticData,
    policy: &ValidationPolicy,
    cert: &'a CertificateWrapper,
) -> Option<RevocationSelection<'a>> {
    cert.revocations
        .iter()
        .filter_map(|status| {
            let revocation = diag.find_revocation(&status.revocation_id)?;
            let acceptance = acceptance(diag, policy, revocation);
            acceptance.is_passed().then_some(RevocationSelection {
                revocation,
                status,
                acceptance,
            })
        })
        .max_by(|a, b| {
            (a.revocation.production_date, &a.revocation.id)
                .cmp(&(b.revocation.production_date, &b.revocation.id))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use esig_core::fixtures::{self, date};
    use esig_core::{TimeUnit, TimeWindow};

    fn crl(production: DateTime<Utc>, next: Option<DateTime<Utc>>) -> RevocationWrapper {
        let mut crl = fixtures::crl_fresh_at("CRL-X", production);
        crl.production_date = production;
        crl.this_update = production;
        crl.next_update = next;
        crl
    }

    #[test]
    fn test_boundary_with_policy_window() {
        let at = date(2025, 6, 1);
        let window = LevelConstraint::fail().with_window(TimeWindow::new(1, TimeUnit::Days));
        let max = Duration::days(1);

        let exact = crl(at - max, None);
        assert!(execute(&exact, at, &window).is_passed());

        let one_ms_older = crl(at - max - Duration::milliseconds(1), None);
        let report = execute(&one_ms_older, at, &window);
        assert!(report.conclusion.has(Indication::Indeterminate, SubIndication::TryLater));
    }

    #[test]
    fn test_fallback_is_next_update_minus_this_update() {
        let unset = LevelConstraint::fail();
        let zero = LevelConstraint::fail().with_window(TimeWindow::new(0, TimeUnit::Hours));
        for (days, hours) in [(1, 0), (7, 0), (0, 6), (30, 12)] {
            let this_update = date(2025, 1, 1);
            let cadence = Duration::days(days) + Duration::hours(hours);
            let token = crl(this_update, Some(this_update + cadence));
            assert_eq!(max_freshness(&unset, &token), cadence);
            assert_eq!(max_freshness(&zero, &token), cadence);

            // fresh exactly at this_update + cadence, stale one millisecond later
            let limit = this_update + cadence;
            assert!(is_fresh(&token, limit, max_freshness(&unset, &token)));
            assert!(!is_fresh(&token, limit + Duration::milliseconds(1), max_freshness(&unset, &token)));
        }
    }

    #[test]
    fn test_no_next_update_means_zero_tolerance() {
        let token = crl(date(2025, 1, 1), None);
        assert_eq!(max_freshness(&LevelConstraint::fail(), &token), Duration::zero());
        assert!(is_fresh(&token, date(2025, 1, 1), Duration::zero()));
    }

    #[test]
    fn test_window_beyond_calendar_range_accepts_any_production() {
        let huge = LevelConstraint::fail().with_window(TimeWindow::new(100_000_000_000, TimeUnit::Days));
        let token = crl(date(2000, 1, 1), None);
        assert!(execute(&token, date(2025, 6, 1), &huge).is_passed());
    }

    #[test]
    fn test_next_update_in_the_past_fails() {
        let token = crl(date(2025, 1, 1), Some(date(2025, 1, 8)));
        let window = LevelConstraint::fail().with_window(TimeWindow::new(30, TimeUnit::Days));
        let report = execute(&token, date(2025, 1, 9), &window);
        assert!(!report.is_passed());
        assert_eq!(report.checks.len(), 1);
    }

    #[test]
    fn test_select_latest_acceptable() {
        let mut data = fixtures::basic_signature();
        let older = fixtures::crl_fresh_at("CRL-0", date(2025, 1, 1));
        let mut broken = fixtures::crl_fresh_at("CRL-2", date(2025, 6, 1));
        broken.production_date = date(2025, 5, 31) + Duration::hours(12);
        broken.signature_intact = false;
        data.revocations.push(older);
        data.revocations.push(broken);
        let signer = data.certificates.iter_mut().find(|c| c.id == fixtures::SIGNER).unwrap();
        signer.revocations.push(fixtures::good_on("CRL-0"));
        signer.revocations.push(fixtures::good_on("CRL-2"));

        let policy = ValidationPolicy::etsi_default();
        let cert = data.certificate(fixtures::SIGNER).unwrap();
        let selected = select(&data, &policy, cert).unwrap();
        assert_eq!(selected.revocation.id, fixtures::CRL);
    }
}
