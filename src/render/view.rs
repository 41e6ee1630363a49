use chrono::{DateTime, Local};
use serde::Serialize;

use crate::constants::{DETAIL_PROMPT, PRIMARY_CHIP_COUNT, VIEW_ITEM_LABEL};
use crate::sanitize::{safe_image_src, to_safe_label, to_safe_text, SafeHtml};
use crate::session::{Item, Turn};

/// Where a chip group came from; decides what a click sends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChipSource {
    /// Options of a multiple-choice question
    Options,
    /// Suggestions of an open question
    Suggestions,
    /// Suggestions from the starter payload
    Starter,
}

/// One selectable button. The label is entity-decoded plain text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chip {
    pub label: String,
    pub primary: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChipGroup {
    pub source: ChipSource,
    pub chips: Vec<Chip>,
}

impl ChipGroup {
    /// Chips in server order; the first three are emphasised
    pub fn new(source: ChipSource, labels: &[String]) -> Self {
        let chips = labels
            .iter()
            .enumerate()
            .map(|(i, label)| Chip {
                label: to_safe_label(label),
                primary: i < PRIMARY_CHIP_COUNT,
            })
            .collect();
        Self { source, chips }
    }

    pub fn is_empty(&self) -> bool {
        self.chips.is_empty()
    }

    /// The turn a click on chip `index` submits.
    /// Question chips answer as a choice; starter chips open the guided questions.
    pub fn turn_for(&self, index: usize) -> Option<Turn> {
        let chip = self.chips.get(index)?;
        Some(match self.source {
            ChipSource::Options | ChipSource::Suggestions => Turn::choice(chip.label.clone()),
            ChipSource::Starter => Turn::Prompt {
                text: chip.label.clone(),
                reset: true,
            },
        })
    }
}

/// A product card; every field has already been sanitized
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemCard {
    /// 1-based position, shown when there is no image
    pub position: usize,
    pub title: SafeHtml,
    pub image: Option<SafeHtml>,
    pub facts: Vec<SafeHtml>,
}

impl ItemCard {
    pub fn from_item(item: &Item, index: usize) -> Self {
        Self {
            position: index + 1,
            title: to_safe_text(&item.title(index)),
            image: item.image().as_deref().and_then(safe_image_src),
            facts: item.facts().iter().map(|f| to_safe_text(f)).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardGroup {
    pub cards: Vec<ItemCard>,
    pub action_label: String,
}

impl CardGroup {
    pub fn new(items: &[Item]) -> Self {
        Self {
            cards: items
                .iter()
                .enumerate()
                .map(|(i, item)| ItemCard::from_item(item, i))
                .collect(),
            action_label: VIEW_ITEM_LABEL.to_string(),
        }
    }

    /// What the "Bekijk" button on any card submits
    pub fn detail_turn(&self) -> Turn {
        Turn::prompt(DETAIL_PROMPT)
    }
}

/// One immutable element of the conversation view
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViewNode {
    /// Typed by the user, plain text only
    User { text: String },
    Bot { html: SafeHtml },
    Question { html: SafeHtml, hint: String },
    Chips(ChipGroup),
    Cards(CardGroup),
    Error { html: SafeHtml },
}

/// A view node plus the moment it was appended
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    pub node: ViewNode,
    pub at: DateTime<Local>,
}
