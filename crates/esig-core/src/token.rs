//! Tokens: the unit of POE tracking and cross-referencing

use crate::diagnostic::{
    CertificateWrapper, EvidenceRecordWrapper, RevocationWrapper, SignatureWrapper,
    TimestampWrapper,
};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenKind {
    Certificate,
    Revocation,
    Timestamp,
    Signature,
    EvidenceRecord,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TokenKind::Certificate => "certificate",
            TokenKind::Revocation => "revocation",
            TokenKind::Timestamp => "timestamp",
            TokenKind::Signature => "signature",
            TokenKind::EvidenceRecord => "evidence record",
        };
        write!(f, "{}", label)
    }
}

/// Reference from one token to another
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TokenRef {
    pub id: String,
    pub kind: TokenKind,
}

impl TokenRef {
    pub fn new(id: impl Into<String>, kind: TokenKind) -> Self {
        Self { id: id.into(), kind }
    }
}

/// Borrowed view over any token of the fact model
#[derive(Debug, Clone, Copy)]
pub enum Token<'a> {
    Certificate(&'a CertificateWrapper),
    Revocation(&'a RevocationWrapper),
    Timestamp(&'a TimestampWrapper),
    Signature(&'a SignatureWrapper),
    EvidenceRecord(&'a EvidenceRecordWrapper),
}

impl<'a> Token<'a> {
    pub fn id(&self) -> &'a str {
        match self {
            Token::Certificate(c) => &c.id,
            Token::Revocation(r) => &r.id,
            Token::Timestamp(t) => &t.id,
            Token::Signature(s) => &s.id,
            Token::EvidenceRecord(e) => &e.id,
        }
    }

    pub fn kind(&self) -> TokenKind {
        match self {
            Token::Certificate(_) => TokenKind::Certificate,
            Token::Revocation(_) => TokenKind::Revocation,
            Token::Timestamp(_) => TokenKind::Timestamp,
            Token::Signature(_) => TokenKind::Signature,
            Token::EvidenceRecord(_) => TokenKind::EvidenceRecord,
        }
    }

    /// Tokens whose existence this token attests (timestamps and evidence records)
    pub fn covered(&self) -> &'a [TokenRef] {
        match self {
            Token::Timestamp(t) => &t.timestamped_objects,
            Token::EvidenceRecord(e) => &e.covered_objects,
            _ => &[],
        }
    }
}
