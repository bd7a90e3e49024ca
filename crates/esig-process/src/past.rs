//! Past Validation
//!
//! Re-run a recoverable evaluation at earlier proven times, youngest
//! first. The first time at which the evaluation passes becomes the
//! control time; exhausting the candidates keeps the initial verdict.

use chrono::{DateTime, Utc};
use esig_core::{Conclusion, Message};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PastAttempt {
    pub time: DateTime<Utc>,
    pub conclusion: Conclusion,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PastValidation {
    pub attempts: Vec<PastAttempt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control_time: Option<DateTime<Utc>>,
    pub conclusion: Conclusion,
}

impl PastValidation {
    pub fn succeeded(&self) -> bool {
        self.control_time.is_some()
    }
}

/// Try `evaluate` at each of `times` strictly before `now`, in the given order.
///
/// `evaluate` is called at most once per distinct time.
pub fn past_validation(
    initial: &Conclusion,
    now: DateTime<Utc>,
    times: &[DateTime<Utc>],
    mut evaluate: impl FnMut(DateTime<Utc>) -> Conclusion,
) -> PastValidation {
    let mut attempts = Vec::new();
    let mut last: Option<DateTime<Utc>> = None;

    for &time in times {
        if time >= now || last == Some(time) {
            continue;
        }
        last = Some(time);

        let conclusion = evaluate(time);
        let passed = conclusion.is_passed();
        attempts.push(PastAttempt { time, conclusion });

        if passed {
            return PastValidation {
                attempts,
                control_time: Some(time),
                conclusion: Conclusion::passed()
                    .with_messages(initial.messages().iter().filter(|m| !is_error(m)).cloned())
                    .with_message(Message::info(
                        "PAST_VALIDATION",
                        format!("Validated at proven time {}", time.to_rfc3339()),
                    )),
            };
        }
    }

    PastValidation {
        attempts,
        control_time: None,
        conclusion: initial.clone(),
    }
}

fn is_error(message: &Message) -> bool {
    message.severity == esig_core::MessageSeverity::Error
}
