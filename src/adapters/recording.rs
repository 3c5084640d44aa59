use crate::domain::model::{ConfirmControl, ExchangeSummary, Notice};
use crate::domain::ports::{ConfirmPrompt, DisplaySink};
use async_trait::async_trait;
use std::collections::{BTreeSet, VecDeque};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkCall {
    MarkSelected { id: String, selected: bool },
    ConfirmState(ConfirmControl),
    Remaining { text: String, low: bool },
    FlashInsufficient { id: String, message: String },
    ClearInsufficient { id: String },
    FlashSuccess { id: String },
    Notice(Notice),
}

/// In-memory display that records every write and keeps the resulting visual state.
#[derive(Debug, Clone)]
pub struct RecordingSink {
    calls: Vec<SinkCall>,
    selected: BTreeSet<String>,
    flashing: BTreeSet<String>,
    has_confirm: bool,
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingSink {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            selected: BTreeSet::new(),
            flashing: BTreeSet::new(),
            has_confirm: true,
        }
    }

    /// A page without a confirmation control.
    pub fn without_confirm_control() -> Self {
        Self {
            has_confirm: false,
            ..Self::new()
        }
    }

    pub fn calls(&self) -> &[SinkCall] {
        &self.calls
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }

    pub fn marked_selected(&self) -> Vec<String> {
        self.selected.iter().cloned().collect()
    }

    pub fn is_flashing_insufficient(&self, id: &str) -> bool {
        self.flashing.contains(id)
    }

    pub fn last_confirm(&self) -> Option<&ConfirmControl> {
        self.calls.iter().rev().find_map(|call| match call {
            SinkCall::ConfirmState(control) => Some(control),
            _ => None,
        })
    }

    pub fn last_remaining(&self) -> Option<(String, bool)> {
        self.calls.iter().rev().find_map(|call| match call {
            SinkCall::Remaining { text, low } => Some((text.clone(), *low)),
            _ => None,
        })
    }

    pub fn notices(&self) -> Vec<&Notice> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                SinkCall::Notice(notice) => Some(notice),
                _ => None,
            })
            .collect()
    }
}

impl DisplaySink for RecordingSink {
    fn mark_selected(&mut self, id: &str, selected: bool) {
        if selected {
            self.selected.insert(id.to_string());
        } else {
            self.selected.remove(id);
        }
        self.calls.push(SinkCall::MarkSelected {
            id: id.to_string(),
            selected,
        });
    }

    fn set_confirm_state(&mut self, control: &ConfirmControl) {
        self.calls.push(SinkCall::ConfirmState(control.clone()));
    }

    fn set_remaining_display(&mut self, text: &str, low: bool) {
        self.calls.push(SinkCall::Remaining {
            text: text.to_string(),
            low,
        });
    }

    fn flash_insufficient(&mut self, id: &str, message: &str) {
        self.flashing.insert(id.to_string());
        self.calls.push(SinkCall::FlashInsufficient {
            id: id.to_string(),
            message: message.to_string(),
        });
    }

    fn clear_insufficient(&mut self, id: &str) {
        self.flashing.remove(id);
        self.calls.push(SinkCall::ClearInsufficient { id: id.to_string() });
    }

    fn flash_success(&mut self, id: &str) {
        self.calls.push(SinkCall::FlashSuccess { id: id.to_string() });
    }

    fn show_notice(&mut self, notice: &Notice) {
        self.calls.push(SinkCall::Notice(notice.clone()));
    }

    fn has_confirm_control(&self) -> bool {
        self.has_confirm
    }
}

/// Prompt that answers from a script, then falls back to a fixed answer.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPrompt {
    answers: VecDeque<bool>,
    fallback: bool,
    seen: Vec<ExchangeSummary>,
}

impl ScriptedPrompt {
    pub fn new(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            fallback: false,
            seen: Vec::new(),
        }
    }

    pub fn always(answer: bool) -> Self {
        Self {
            fallback: answer,
            ..Self::default()
        }
    }

    /// Summaries shown so far.
    pub fn seen(&self) -> &[ExchangeSummary] {
        &self.seen
    }
}

#[async_trait]
impl ConfirmPrompt for ScriptedPrompt {
    async fn confirm(&mut self, summary: &ExchangeSummary) -> bool {
        self.seen.push(summary.clone());
        self.answers.pop_front().unwrap_or(self.fallback)
    }
}
