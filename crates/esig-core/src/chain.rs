//! Chain Engine
//!
//! Sequential constraint executor shared by every building block. A chain
//! is an ordered list of `ChainItem`s; each item carries a predicate, the
//! `Level` that governs it and the (indication, sub-indication) pair to
//! apply when it fails at FAIL level.
//!
//! ```text
//! item₁ ──ok──▶ item₂ ──fail@WARN──▶ item₃ ──fail@FAIL──▶ stop
//!                        │                      │
//!                     warning              INDETERMINATE/…
//! ```

use crate::conclusion::{Conclusion, Message};
use crate::constraint::{Level, LevelConstraint};
use crate::indication::{Indication, SubIndication};
use serde::Serialize;
use tracing::debug;

/// Outcome of a single executed check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckStatus {
    Ok,
    Informed,
    Warned,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckRecord {
    pub name: String,
    pub description: String,
    pub level: Level,
    pub status: CheckStatus,
}

/// Output of one chain execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockReport {
    pub title: String,
    pub checks: Vec<CheckRecord>,
    pub conclusion: Conclusion,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sub_blocks: Vec<BlockReport>,
}

impl BlockReport {
    /// A block that was not run, carrying a fixed conclusion
    pub fn skipped(title: impl Into<String>, conclusion: Conclusion) -> Self {
        Self {
            title: title.into(),
            checks: Vec::new(),
            conclusion,
            sub_blocks: Vec::new(),
        }
    }

    pub fn with_sub_block(mut self, block: BlockReport) -> Self {
        self.sub_blocks.push(block);
        self
    }

    pub fn with_sub_blocks(mut self, blocks: impl IntoIterator<Item = BlockReport>) -> Self {
        self.sub_blocks.extend(blocks);
        self
    }

    pub fn is_passed(&self) -> bool {
        self.conclusion.is_passed()
    }

    pub fn check(&self, name: &str) -> Option<&CheckRecord> {
        self.checks.iter().find(|c| c.name == name)
    }
}

type Predicate<'a> = Box<dyn Fn() -> bool + 'a>;

/// One check of a chain
pub struct ChainItem<'a> {
    name: String,
    description: String,
    level: Level,
    predicate: Predicate<'a>,
    on_failure: (Indication, SubIndication),
}

impl<'a> ChainItem<'a> {
    pub fn new(
        name: impl Into<String>,
        constraint: &LevelConstraint,
        predicate: impl Fn() -> bool + 'a,
    ) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            level: constraint.level,
            predicate: Box::new(predicate),
            on_failure: (Indication::Indeterminate, SubIndication::Generic),
        }
    }

    /// Item whose outcome is already known
    pub fn fixed(name: impl Into<String>, constraint: &LevelConstraint, outcome: bool) -> Self {
        Self::new(name, constraint, move || outcome)
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn on_failure(mut self, indication: Indication, sub_indication: SubIndication) -> Self {
        self.on_failure = (indication, sub_indication);
        self
    }

    pub fn at_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Ordered list of checks executed by `execute`
pub struct Chain<'a> {
    title: String,
    items: Vec<ChainItem<'a>>,
}

impl<'a> Chain<'a> {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            items: Vec::new(),
        }
    }

    pub fn item(mut self, item: ChainItem<'a>) -> Self {
        self.items.push(item);
        self
    }

    pub fn push(&mut self, item: ChainItem<'a>) -> &mut Self {
        self.items.push(item);
        self
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Run the items in order.
    ///
    /// IGNORE items are skipped without evaluation. A failing FAIL item
    /// sets the conclusion and stops; WARN and INFORM failures are
    /// recorded and never change the indication.
    pub fn execute(self) -> BlockReport {
        let mut checks = Vec::with_capacity(self.items.len());
        let mut messages = Vec::new();
        let mut verdict: Option<(Indication, SubIndication)> = None;

        for item in self.items {
            if item.level == Level::Ignore {
                continue;
            }

            let passed = (item.predicate)();
            let status = match (passed, item.level) {
                (true, _) => CheckStatus::Ok,
                (false, Level::Fail) => CheckStatus::Failed,
                (false, Level::Warn) => CheckStatus::Warned,
                (false, _) => CheckStatus::Informed,
            };

            if !passed {
                debug!(block = %self.title, check = %item.name, level = %item.level, "check failed");
                let text = if item.description.is_empty() {
                    item.name.clone()
                } else {
                    item.description.clone()
                };
                messages.push(match item.level {
                    Level::Fail => Message::error(item.name.clone(), text),
                    Level::Warn => Message::warning(item.name.clone(), text),
                    _ => Message::info(item.name.clone(), text),
                });
            }

            let stop = status == CheckStatus::Failed;
            checks.push(CheckRecord {
                name: item.name,
                description: item.description,
                level: item.level,
                status,
            });

            if stop {
                verdict = Some(item.on_failure);
                break;
            }
        }

        let conclusion = match verdict {
            Some((indication, sub_indication)) => Conclusion::of(indication, sub_indication),
            None => Conclusion::passed(),
        };

        BlockReport {
            title: self.title,
            checks,
            conclusion: conclusion.with_messages(messages),
            sub_blocks: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn failing(level: Level, sub: SubIndication) -> ChainItem<'static> {
        ChainItem::fixed("check", &LevelConstraint::new(level), false)
            .on_failure(Indication::Indeterminate, sub)
    }

    #[test]
    fn test_all_passing_chain() {
        let report = Chain::new("ISC")
            .item(ChainItem::fixed("a", &LevelConstraint::fail(), true))
            .item(ChainItem::fixed("b", &LevelConstraint::warn(), true))
            .execute();

        assert!(report.is_passed());
        assert_eq!(report.checks.len(), 2);
        assert!(report.conclusion.messages().is_empty());
    }

    #[test]
    fn test_fail_short_circuits() {
        let evaluated = Cell::new(false);
        let report = Chain::new("CV")
            .item(
                ChainItem::fixed("digest", &LevelConstraint::fail(), false)
                    .on_failure(Indication::Failed, SubIndication::HashFailure),
            )
            .item(ChainItem::new("later", &LevelConstraint::fail(), || {
                evaluated.set(true);
                false
            }))
            .execute();

        assert!(report
            .conclusion
            .has(Indication::Failed, SubIndication::HashFailure));
        assert!(!evaluated.get());
        assert_eq!(report.checks.len(), 1);
    }

    #[test]
    fn test_warn_and_inform_do_not_flip() {
        let report = Chain::new("XCV")
            .item(failing(Level::Warn, SubIndication::TryLater))
            .item(failing(Level::Inform, SubIndication::TryLater))
            .execute();

        assert!(report.is_passed());
        assert!(report.conclusion.sub_indication().is_none());
        assert_eq!(report.conclusion.warnings().count(), 1);
        assert_eq!(report.conclusion.infos().count(), 1);
    }

    #[test]
    fn test_ignore_is_not_executed() {
        let evaluated = Cell::new(0);
        let mut chain = Chain::new("VCI");
        for _ in 0..5 {
            chain.push(ChainItem::new("ignored", &LevelConstraint::ignore(), || {
                evaluated.set(evaluated.get() + 1);
                false
            }));
        }
        let report = chain.execute();

        assert!(report.is_passed());
        assert!(report.conclusion.messages().is_empty());
        assert!(report.checks.is_empty());
        assert_eq!(evaluated.get(), 0);
    }

    #[test]
    fn test_sub_indication_invariant_over_level_grid() {
        let levels = [Level::Ignore, Level::Inform, Level::Warn, Level::Fail];
        for first in levels {
            for second in levels {
                for outcome in [true, false] {
                    let report = Chain::new("grid")
                        .item(
                            ChainItem::fixed("x", &LevelConstraint::new(first), outcome)
                                .on_failure(Indication::Failed, SubIndication::FormatFailure),
                        )
                        .item(failing(second, SubIndication::NoPoe))
                        .execute();
                    let c = &report.conclusion;
                    assert_eq!(c.sub_indication().is_some(), !c.is_passed());
                }
            }
        }
    }
}
