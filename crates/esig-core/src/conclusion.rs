//! Conclusion of a validation block
//!
//! A `Conclusion` carries an indication, a sub-indication (present iff
//! the indication is not PASSED) and the ordered messages produced while
//! reaching it. The fields are private so the sub-indication invariant
//! cannot be broken from outside.

use crate::indication::{Indication, SubIndication};
use serde::Serialize;
use std::fmt;

/// Severity of a message attached to a conclusion
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageSeverity {
    Info = 1,
    Warning = 2,
    Error = 3,
}

/// A tagged message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    /// Stable key of the check that produced the message
    pub tag: String,
    pub text: String,
    pub severity: MessageSeverity,
}

impl Message {
    pub fn new(tag: impl Into<String>, text: impl Into<String>, severity: MessageSeverity) -> Self {
        Self {
            tag: tag.into(),
            text: text.into(),
            severity,
        }
    }

    pub fn error(tag: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(tag, text, MessageSeverity::Error)
    }

    pub fn warning(tag: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(tag, text, MessageSeverity::Warning)
    }

    pub fn info(tag: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(tag, text, MessageSeverity::Info)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conclusion {
    indication: Indication,
    #[serde(skip_serializing_if = "Option::is_none")]
    sub_indication: Option<SubIndication>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    messages: Vec<Message>,
}

impl Conclusion {
    pub fn passed() -> Self {
        Self {
            indication: Indication::Passed,
            sub_indication: None,
            messages: Vec::new(),
        }
    }

    pub fn failed(sub_indication: SubIndication) -> Self {
        Self::of(Indication::Failed, sub_indication)
    }

    pub fn indeterminate(sub_indication: SubIndication) -> Self {
        Self::of(Indication::Indeterminate, sub_indication)
    }

    /// Build from a pair; the sub-indication is dropped for PASSED
    pub fn of(indication: Indication, sub_indication: SubIndication) -> Self {
        Self {
            indication,
            sub_indication: (!indication.is_passed()).then_some(sub_indication),
            messages: Vec::new(),
        }
    }

    /// Same verdict with extra messages appended
    pub fn with_messages(mut self, messages: impl IntoIterator<Item = Message>) -> Self {
        self.messages.extend(messages);
        self
    }

    pub fn with_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    /// Same messages, different verdict
    pub fn with_verdict(self, other: &Conclusion) -> Self {
        Self {
            indication: other.indication,
            sub_indication: other.sub_indication,
            messages: self.messages,
        }
    }

    pub fn indication(&self) -> Indication {
        self.indication
    }

    pub fn sub_indication(&self) -> Option<SubIndication> {
        self.sub_indication
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_passed(&self) -> bool {
        self.indication.is_passed()
    }

    pub fn is_failed(&self) -> bool {
        self.indication == Indication::Failed
    }

    pub fn is_indeterminate(&self) -> bool {
        self.indication == Indication::Indeterminate
    }

    /// INDETERMINATE with a sub-indication a past-time retry can resolve
    pub fn is_recoverable(&self) -> bool {
        self.is_indeterminate() && self.sub_indication.map_or(false, |s| s.is_recoverable())
    }

    pub fn has(&self, indication: Indication, sub_indication: SubIndication) -> bool {
        self.indication == indication && self.sub_indication == Some(sub_indication)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Message> {
        self.by_severity(MessageSeverity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Message> {
        self.by_severity(MessageSeverity::Warning)
    }

    pub fn infos(&self) -> impl Iterator<Item = &Message> {
        self.by_severity(MessageSeverity::Info)
    }

    fn by_severity(&self, severity: MessageSeverity) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(move |m| m.severity == severity)
    }
}

impl Default for Conclusion {
    fn default() -> Self {
        Self::passed()
    }
}

impl fmt::Display for Conclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.sub_indication {
            Some(sub) => write!(f, "{}/{}", self.indication, sub),
            None => write!(f, "{}", self.indication),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sub_indication_iff_not_passed() {
        let passed = Conclusion::of(Indication::Passed, SubIndication::Generic);
        assert!(passed.sub_indication().is_none());

        let failed = Conclusion::failed(SubIndication::HashFailure);
        assert_eq!(failed.sub_indication(), Some(SubIndication::HashFailure));
        assert_eq!(failed.to_string(), "FAILED/HASH_FAILURE");
    }

    #[test]
    fn test_recoverable() {
        assert!(Conclusion::indeterminate(SubIndication::RevokedNoPoe).is_recoverable());
        assert!(!Conclusion::indeterminate(SubIndication::NoCertificateChainFound).is_recoverable());
        assert!(!Conclusion::failed(SubIndication::Expired).is_recoverable());
    }

    #[test]
    fn test_with_verdict_keeps_messages() {
        let base = Conclusion::passed().with_message(Message::warning("T", "late timestamp"));
        let merged = base.with_verdict(&Conclusion::indeterminate(SubIndication::TryLater));
        assert!(merged.has(Indication::Indeterminate, SubIndication::TryLater));
        assert_eq!(merged.warnings().count(), 1);
    }
}
