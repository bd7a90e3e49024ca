//! Trusted service filters
//!
//! Narrow the services attached to a certificate down to those that can
//! assert its qualification at a given date.

use crate::status::Era;
use crate::uri::{self, status};
use chrono::{DateTime, Utc};
use esig_core::{CertificateWrapper, TrustedServiceWrapper};

/// Country of the service matches the certificate's, when the latter is known
pub fn by_country<'a>(
    services: impl IntoIterator<Item = &'a TrustedServiceWrapper>,
    country: Option<&'a str>,
) -> impl Iterator<Item = &'a TrustedServiceWrapper> {
    services.into_iter().filter(move |s| {
        country.map_or(true, |c| s.country_code.eq_ignore_ascii_case(c))
    })
}

/// Status period in force at `at`
pub fn by_date<'a>(
    services: impl IntoIterator<Item = &'a TrustedServiceWrapper>,
    at: DateTime<Utc>,
) -> impl Iterator<Item = &'a TrustedServiceWrapper> {
    services.into_iter().filter(move |s| s.is_in_force_at(at))
}

pub fn by_ca_qc<'a>(
    services: impl IntoIterator<Item = &'a TrustedServiceWrapper>,
) -> impl Iterator<Item = &'a TrustedServiceWrapper> {
    services.into_iter().filter(|s| s.service_type == uri::CA_QC)
}

/// Status acceptable for the era the status period started in
pub fn by_acceptable_status<'a>(
    services: impl IntoIterator<Item = &'a TrustedServiceWrapper>,
) -> impl Iterator<Item = &'a TrustedServiceWrapper> {
    services.into_iter().filter(|s| is_acceptable_status(s))
}

pub fn is_acceptable_status(service: &TrustedServiceWrapper) -> bool {
    match Era::at(service.start_date) {
        Era::PreEidas => status::is_acceptable_before_eidas(&service.status),
        Era::PostEidas => status::is_acceptable_after_eidas(&service.status),
    }
}

/// Intermediate counts kept for the qualification report
#[derive(Debug, Clone, Default)]
pub struct FilterTrace<'a> {
    pub in_country: Vec<&'a TrustedServiceWrapper>,
    pub at_time: Vec<&'a TrustedServiceWrapper>,
    pub ca_qc: Vec<&'a TrustedServiceWrapper>,
    pub acceptable: Vec<&'a TrustedServiceWrapper>,
}

/// Apply every filter in order, keeping each stage
pub fn applicable_services(cert: &CertificateWrapper, at: DateTime<Utc>) -> FilterTrace<'_> {
    let in_country: Vec<_> = by_country(&cert.trusted_services, cert.country_code.as_deref()).collect();
    let at_time: Vec<_> = by_date(in_country.iter().copied(), at).collect();
    let ca_qc: Vec<_> = by_ca_qc(at_time.iter().copied()).collect();
    let acceptable: Vec<_> = by_acceptable_status(ca_qc.iter().copied()).collect();
    FilterTrace {
        in_country,
        at_time,
        ca_qc,
        acceptable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use esig_core::fixtures::{self, date, GRANTED, WITHDRAWN};

    #[test]
    fn test_withdrawn_is_filtered_out() {
        let mut cert = fixtures::signing_certificate();
        let mut granted = fixtures::trusted_service(GRANTED, date(2017, 1, 1), &[]);
        granted.end_date = Some(date(2024, 1, 1));
        cert.trusted_services = vec![
            granted,
            fixtures::trusted_service(WITHDRAWN, date(2024, 1, 1), &[]),
        ];

        assert_eq!(applicable_services(&cert, date(2023, 6, 1)).acceptable.len(), 1);
        let later = applicable_services(&cert, date(2024, 6, 1));
        assert_eq!(later.ca_qc.len(), 1);
        assert!(later.acceptable.is_empty());
    }

    #[test]
    fn test_pre_eidas_status() {
        let accredited = fixtures::trusted_service(status::ACCREDITED, date(2010, 1, 1), &[]);
        assert!(is_acceptable_status(&accredited));
        let granted_too_early = fixtures::trusted_service(GRANTED, date(2010, 1, 1), &[]);
        assert!(!is_acceptable_status(&granted_too_early));
    }

    #[test]
    fn test_country_filter() {
        let mut cert = fixtures::signing_certificate();
        let mut foreign = fixtures::trusted_service(GRANTED, date(2017, 1, 1), &[]);
        foreign.country_code = "FR".to_string();
        cert.trusted_services = vec![foreign];
        assert!(applicable_services(&cert, date(2020, 1, 1)).in_country.is_empty());

        cert.country_code = None;
        assert_eq!(applicable_services(&cert, date(2020, 1, 1)).acceptable.len(), 1);
    }
}
