use std::fmt::Write as _;

use super::view::{CardGroup, ChipGroup, Entry, ViewNode};
use crate::sanitize::escape_text;

/// Serialize the transcript as the markup fragments the web widget inserts.
///
/// User text and chip labels are escaped here; every other string is already a
/// [`SafeHtml`](crate::sanitize::SafeHtml).
pub fn render_html(entries: &[Entry]) -> String {
    let mut out = String::new();
    for entry in entries {
        render_node(&mut out, &entry.node);
        out.push('\n');
    }
    out
}

fn render_node(out: &mut String, node: &ViewNode) {
    match node {
        ViewNode::User { text } => {
            let _ = write!(out, r#"<div class="pp-msg pp-user">{}</div>"#, escape_text(text));
        }
        ViewNode::Bot { html } => {
            let _ = write!(out, r#"<div class="pp-msg pp-bot">{}</div>"#, html);
        }
        ViewNode::Question { html, hint } => {
            let _ = write!(
                out,
                r#"<div class="pp-msg pp-bot"><div>{}</div><div class="pp-hint">{}</div></div>"#,
                html,
                escape_text(hint)
            );
        }
        ViewNode::Chips(group) => render_chips(out, group),
        ViewNode::Cards(group) => render_cards(out, group),
        ViewNode::Error { html } => {
            let _ = write!(out, r#"<div class="pp-msg pp-bot pp-error">⚠️ {}</div>"#, html);
        }
    }
}

fn render_chips(out: &mut String, group: &ChipGroup) {
    out.push_str(r#"<div class="pp-chips">"#);
    for (idx, chip) in group.chips.iter().enumerate() {
        let class = if chip.primary {
            "pp-chip pp-chip--primary"
        } else {
            "pp-chip"
        };
        let _ = write!(
            out,
            r#"<button type="button" class="{}" data-idx="{}">{}</button>"#,
            class,
            idx,
            escape_text(&chip.label)
        );
    }
    out.push_str("</div>");
}

fn render_cards(out: &mut String, group: &CardGroup) {
    out.push_str(r#"<div class="pp-msg pp-bot"><div class="pp-cardlist">"#);
    for (idx, card) in group.cards.iter().enumerate() {
        out.push_str(r#"<div class="pp-card"><div class="pp-card-media">"#);
        match &card.image {
            Some(src) => {
                let _ = write!(out, r#"<img src="{}" alt="">"#, src);
            }
            None => {
                let _ = write!(out, "<span>{}</span>", card.position);
            }
        }
        let _ = write!(out, r#"</div><div><div class="pp-card-title">{}</div>"#, card.title);
        if !card.facts.is_empty() {
            let facts: Vec<&str> = card.facts.iter().map(|f| f.as_str()).collect();
            let _ = write!(out, r#"<div class="pp-card-facts">{}</div>"#, facts.join(" · "));
        }
        let _ = write!(
            out,
            r#"</div><button class="pp-chip" data-pp="view" data-idx="{}">{}</button></div>"#,
            idx,
            escape_text(&group.action_label)
        );
    }
    out.push_str("</div></div>");
}
