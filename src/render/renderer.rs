use chrono::Local;

use super::progress::{derive_progress, remaining_hint};
use super::view::{CardGroup, ChipGroup, ChipSource, Entry, ViewNode};
use crate::sanitize::to_safe_text;
use crate::session::{Item, QuestionKind, QuestionRecord};

/// Append-only conversation view plus the affordances that follow it
#[derive(Debug, Clone)]
pub struct Renderer {
    entries: Vec<Entry>,
    /// Progress bar width in percent
    progress: f64,
    /// "Composing" indicator below the last bubble
    composing: bool,
    /// Whether free-text submission is allowed
    input_enabled: bool,
    /// Lines scrolled up from the bottom; 0 means pinned to the newest bubble
    scroll_offset: u16,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            progress: 0.0,
            composing: false,
            input_enabled: true,
            scroll_offset: 0,
        }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn is_composing(&self) -> bool {
        self.composing
    }

    pub fn input_enabled(&self) -> bool {
        self.input_enabled
    }

    pub fn scroll_offset(&self) -> u16 {
        self.scroll_offset
    }

    fn push(&mut self, node: ViewNode) {
        self.entries.push(Entry {
            node,
            at: Local::now(),
        });
        self.scroll_to_bottom();
    }

    /// User text is kept verbatim and only ever shown as plain text
    pub fn append_user(&mut self, text: &str) {
        self.push(ViewNode::User {
            text: text.to_string(),
        });
    }

    /// Server text, sanitized on the way in
    pub fn append_bot(&mut self, raw: &str) {
        self.push(ViewNode::Bot {
            html: to_safe_text(raw),
        });
    }

    pub fn append_error(&mut self, description: &str) {
        self.push(ViewNode::Error {
            html: to_safe_text(description),
        });
    }

    pub fn set_composing(&mut self, on: bool) {
        if self.composing != on {
            self.composing = on;
            self.scroll_to_bottom();
        }
    }

    pub fn set_input_enabled(&mut self, enabled: bool) {
        self.input_enabled = enabled;
    }

    pub fn set_progress_by_remaining(&mut self, remaining: i64) {
        self.progress = derive_progress(remaining);
    }

    /// Question bubble with its remaining-count hint, followed by its chips
    pub fn render_question(&mut self, question: &QuestionRecord) {
        let remaining = question.remaining_questions;
        self.set_progress_by_remaining(remaining);

        if let Some(text) = &question.text {
            self.push(ViewNode::Question {
                html: to_safe_text(text),
                hint: remaining_hint(remaining),
            });
        }

        let group = match question.kind {
            QuestionKind::MultipleChoice if !question.options.is_empty() => {
                ChipGroup::new(ChipSource::Options, &question.options)
            }
            _ => ChipGroup::new(ChipSource::Suggestions, &question.suggestions),
        };
        if !group.is_empty() {
            self.push(ViewNode::Chips(group));
        }
    }

    /// Explanatory text followed by up to three item cards. Reaching this stage fills the bar.
    pub fn render_recommendation(&mut self, text: Option<&str>, items: &[Item]) {
        self.set_progress_by_remaining(0);

        if let Some(text) = text.filter(|t| !t.trim().is_empty()) {
            self.append_bot(text);
        }

        if !items.is_empty() {
            self.push(ViewNode::Cards(CardGroup::new(items)));
        }
    }

    /// Opening question plus suggestion chips from the starter payload
    pub fn render_starter(&mut self, question: &str, suggestions: &[String]) {
        self.append_bot(question);

        let group = ChipGroup::new(ChipSource::Starter, suggestions);
        if !group.is_empty() {
            self.push(ViewNode::Chips(group));
        }
    }

    /// Most recent chip group, the one keyboard selection acts on
    pub fn last_chip_group(&self) -> Option<&ChipGroup> {
        self.entries.iter().rev().find_map(|e| match &e.node {
            ViewNode::Chips(group) => Some(group),
            _ => None,
        })
    }

    pub fn last_card_group(&self) -> Option<&CardGroup> {
        self.entries.iter().rev().find_map(|e| match &e.node {
            ViewNode::Cards(group) => Some(group),
            _ => None,
        })
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_offset = 0;
    }

    /// Manual scroll, bounded by the number of rendered lines the frontend reports
    pub fn scroll_up(&mut self, amount: u16, max_offset: u16) {
        self.scroll_offset = self.scroll_offset.saturating_add(amount).min(max_offset);
    }

    pub fn scroll_down(&mut self, amount: u16) {
        self.scroll_offset = self.scroll_offset.saturating_sub(amount);
    }
}
