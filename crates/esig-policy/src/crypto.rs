//! Cryptographic constraints
//!
//! Acceptable algorithms, minimum key sizes and per-algorithm expiration
//! dates. A token failing them at a time `t` is INDETERMINATE with
//! CRYPTO_CONSTRAINTS_FAILURE_NO_POE unless a POE before the expiration
//! date allows validation in the past.

use chrono::{DateTime, TimeZone, Utc};
use esig_core::{AlgorithmFacts, Level};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CryptographicConstraint {
    pub level: Level,
    /// Empty accepts any
    pub acceptable_encryption_algorithms: Vec<String>,
    /// Empty accepts any
    pub acceptable_digest_algorithms: Vec<String>,
    /// Minimum key length per encryption algorithm
    pub min_key_sizes: BTreeMap<String, u32>,
    /// Date after which an algorithm is no longer reliable
    pub algorithm_expiration: BTreeMap<String, DateTime<Utc>>,
}

/// Reason a token's algorithms are rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CryptoFailure {
    EncryptionNotAccepted(String),
    DigestNotAccepted(String),
    KeyTooShort { algorithm: String, length: u32, minimum: u32 },
    Expired { algorithm: String, at: DateTime<Utc> },
}

impl std::fmt::Display for CryptoFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EncryptionNotAccepted(a) => write!(f, "encryption algorithm {} is not acceptable", a),
            Self::DigestNotAccepted(a) => write!(f, "digest algorithm {} is not acceptable", a),
            Self::KeyTooShort { algorithm, length, minimum } => {
                write!(f, "{} key of {} bits is below the minimum of {}", algorithm, length, minimum)
            }
            Self::Expired { algorithm, at } => {
                write!(f, "algorithm {} is not reliable since {}", algorithm, at.to_rfc3339())
            }
        }
    }
}

fn expiry(year: i32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

impl CryptographicConstraint {
    /// Algorithms catalogue loosely following ETSI TS 119 312
    pub fn etsi_default() -> Self {
        let strings = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Self {
            level: Level::Fail,
            acceptable_encryption_algorithms: strings(&["RSA", "RSASSA-PSS", "DSA", "ECDSA", "Ed25519", "Ed448"]),
            acceptable_digest_algorithms: strings(&[
                "SHA1", "SHA224", "SHA256", "SHA384", "SHA512", "SHA3-256", "SHA3-384", "SHA3-512",
            ]),
            min_key_sizes: [("RSA", 1024), ("RSASSA-PSS", 1024), ("DSA", 1024), ("ECDSA", 160)]
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            algorithm_expiration: [("SHA1", 2009), ("SHA224", 2026), ("MD5", 2005)]
                .into_iter()
                .map(|(k, y)| (k.to_string(), expiry(y)))
                .collect(),
        }
    }

    /// First failure of `facts` at `at`, if any
    pub fn check(&self, facts: &AlgorithmFacts, at: DateTime<Utc>) -> Result<(), CryptoFailure> {
        if let Some(enc) = &facts.encryption_algorithm {
            if !accepted(&self.acceptable_encryption_algorithms, enc) {
                return Err(CryptoFailure::EncryptionNotAccepted(enc.clone()));
            }
            if let (Some(length), Some(minimum)) = (facts.key_length, lookup(&self.min_key_sizes, enc)) {
                if length < minimum {
                    return Err(CryptoFailure::KeyTooShort {
                        algorithm: enc.clone(),
                        length,
                        minimum,
                    });
                }
            }
        }
        if let Some(digest) = &facts.digest_algorithm {
            if !accepted(&self.acceptable_digest_algorithms, digest) {
                return Err(CryptoFailure::DigestNotAccepted(digest.clone()));
            }
        }
        for algorithm in [&facts.encryption_algorithm, &facts.digest_algorithm].into_iter().flatten() {
            if let Some(expires) = lookup(&self.algorithm_expiration, algorithm) {
                if at > expires {
                    return Err(CryptoFailure::Expired {
                        algorithm: algorithm.clone(),
                        at: expires,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn is_acceptable(&self, facts: &AlgorithmFacts, at: DateTime<Utc>) -> bool {
        self.check(facts, at).is_ok()
    }
}

impl Default for CryptographicConstraint {
    fn default() -> Self {
        Self::etsi_default()
    }
}

fn accepted(list: &[String], value: &str) -> bool {
    list.is_empty() || list.iter().any(|a| a.eq_ignore_ascii_case(value))
}

fn lookup<V: Copy>(map: &BTreeMap<String, V>, key: &str) -> Option<V> {
    map.iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| *v)
}
