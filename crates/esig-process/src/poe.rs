//! Proof of Existence
//!
//! A token's own claimed time is never trusted. The only POEs are the
//! validation time itself and the production times of timestamps (or
//! evidence records) that validated, propagated to every token they
//! cover, transitively.

use chrono::{DateTime, Utc};
use esig_core::{DiagnosticData, TimestampType, Token};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(tag = "type", content = "timestamp_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PoeProvider {
    ValidationTime,
    Timestamp(TimestampType),
    EvidenceRecord,
}

impl PoeProvider {
    /// POE usable at LT level (archival material excluded)
    pub fn is_long_term(&self) -> bool {
        match self {
            PoeProvider::ValidationTime => true,
            PoeProvider::Timestamp(t) => !t.is_archival(),
            PoeProvider::EvidenceRecord => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct PoeRecord {
    pub time: DateTime<Utc>,
    pub provider: PoeProvider,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,
}

/// POEs of every token, for one validation
#[derive(Debug, Clone, Serialize)]
pub struct PoeSet {
    validation_time: DateTime<Utc>,
    records: BTreeMap<String, BTreeSet<PoeRecord>>,
}

impl PoeSet {
    pub fn new(validation_time: DateTime<Utc>) -> Self {
        Self {
            validation_time,
            records: BTreeMap::new(),
        }
    }

    pub fn validation_time(&self) -> DateTime<Utc> {
        self.validation_time
    }

    pub fn add(&mut self, token_id: &str, record: PoeRecord) {
        self.records
            .entry(token_id.to_string())
            .or_default()
            .insert(record);
    }

    /// Give `time` as POE to everything `provider` covers, transitively
    pub fn propagate(
        &mut self,
        diag: &DiagnosticData,
        provider: Token<'_>,
        time: DateTime<Utc>,
        kind: PoeProvider,
    ) {
        let mut visited: HashSet<&str> = HashSet::new();
        visited.insert(provider.id());
        let mut stack: Vec<&str> = provider.covered().iter().map(|r| r.id.as_str()).collect();

        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            self.add(
                id,
                PoeRecord {
                    time,
                    provider: kind,
                    provider_id: Some(provider.id().to_string()),
                },
            );
            if let Some(token) = diag.token(id) {
                stack.extend(token.covered().iter().map(|r| r.id.as_str()));
            }
        }
    }

    pub fn records(&self, token_id: &str) -> impl Iterator<Item = &PoeRecord> {
        self.records.get(token_id).into_iter().flatten()
    }

    /// Earliest proven time; the validation time when nothing better is known
    pub fn earliest(&self, token_id: &str) -> DateTime<Utc> {
        self.records(token_id)
            .map(|r| r.time)
            .min()
            .map_or(self.validation_time, |t| t.min(self.validation_time))
    }

    /// Some POE lies in `[from, to]`
    pub fn has_poe_between(&self, token_id: &str, from: DateTime<Utc>, to: DateTime<Utc>) -> bool {
        (from <= self.validation_time && self.validation_time <= to)
            || self.records(token_id).any(|r| from <= r.time && r.time <= to)
    }

    /// Distinct POE times accepted by `filter`, youngest first, validation time included
    pub fn times_desc(&self, token_id: &str, filter: impl Fn(&PoeRecord) -> bool) -> Vec<DateTime<Utc>> {
        let mut times: BTreeSet<DateTime<Utc>> = self
            .records(token_id)
            .filter(|r| filter(r))
            .map(|r| r.time)
            .filter(|t| *t <= self.validation_time)
            .collect();
        times.insert(self.validation_time);
        times.into_iter().rev().collect()
    }

    pub fn all_times_desc(&self, token_id: &str) -> Vec<DateTime<Utc>> {
        self.times_desc(token_id, |_| true)
    }

    pub fn token_count(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use esig_core::fixtures::{self, date, SIGNATURE, SIGNER};

    #[test]
    fn test_validation_time_is_always_poe() {
        let poe = PoeSet::new(date(2025, 1, 1));
        assert_eq!(poe.earliest("anything"), date(2025, 1, 1));
        assert_eq!(poe.all_times_desc("anything"), vec![date(2025, 1, 1)]);
    }

    #[test]
    fn test_propagation_is_transitive() {
        let data = fixtures::with_archive_timestamp(
            fixtures::with_signature_timestamp(fixtures::basic_signature(), "TST-1", date(2025, 1, 1)),
            "ATST-1",
            date(2025, 3, 1),
        );
        let mut poe = PoeSet::new(data.validation_time);
        let archive = data.token("ATST-1").unwrap();
        poe.propagate(&data, archive, date(2025, 3, 1), PoeProvider::Timestamp(TimestampType::Archive));

        assert_eq!(poe.earliest("TST-1"), date(2025, 3, 1));
        assert_eq!(poe.earliest(SIGNATURE), date(2025, 3, 1));
        assert!(poe.records("ATST-1").next().is_none());

        let sig_ts = data.token("TST-1").unwrap();
        poe.propagate(&data, sig_ts, date(2025, 1, 1), PoeProvider::Timestamp(TimestampType::Signature));
        assert_eq!(poe.earliest(SIGNER), date(2025, 1, 1));
        assert_eq!(
            poe.all_times_desc(SIGNATURE),
            vec![data.validation_time, date(2025, 3, 1), date(2025, 1, 1)]
        );
        assert_eq!(
            poe.times_desc(SIGNATURE, |r| r.provider.is_long_term()),
            vec![data.validation_time, date(2025, 1, 1)]
        );
    }

    #[test]
    fn test_has_poe_between() {
        let mut poe = PoeSet::new(date(2025, 1, 1));
        poe.add(
            "X",
            PoeRecord {
                time: date(2020, 1, 1),
                provider: PoeProvider::EvidenceRecord,
                provider_id: None,
            },
        );
        assert!(poe.has_poe_between("X", date(2019, 1, 1), date(2021, 1, 1)));
        assert!(!poe.has_poe_between("Y", date(2019, 1, 1), date(2021, 1, 1)));
    }
}
