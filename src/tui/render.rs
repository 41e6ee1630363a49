use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};

use crate::render::{CardGroup, ChipGroup, Renderer, ViewNode};
use crate::tui::app::App;

/// Render the main UI
pub fn render_ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Header
            Constraint::Length(1), // Progress
            Constraint::Min(6),    // Conversation
            Constraint::Length(3), // Chips
            Constraint::Length(3), // Input
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    let view = app.view.lock();

    render_header(frame, chunks[0], app);
    render_progress(frame, chunks[1], &view);
    render_chat(frame, chunks[2], &view);
    render_chips(frame, chunks[3], &view, app.selected_chip);
    render_input(frame, chunks[4], app, view.input_enabled());
    render_status_bar(frame, chunks[5], app, &view);
}

fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled("🍷 ", Style::default().fg(Color::Magenta)),
        Span::styled(
            "PinterPal",
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" | Tabel: "),
        Span::styled(&app.table, Style::default().fg(Color::Green)),
        Span::raw(" | "),
        Span::styled(&app.base_url, Style::default().fg(Color::Gray)),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray)),
    )
    .alignment(Alignment::Center);

    frame.render_widget(header, area);
}

fn render_progress(frame: &mut Frame, area: Rect, view: &Renderer) {
    let progress = view.progress().clamp(0.0, 100.0);
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(Color::Magenta).bg(Color::Black))
        .ratio(progress / 100.0)
        .label(format!("{:.0}%", progress));
    frame.render_widget(gauge, area);
}

fn chip_spans(group: &ChipGroup, selected: Option<usize>) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    for (idx, chip) in group.chips.iter().enumerate() {
        let mut style = if chip.primary {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        if selected == Some(idx) {
            style = style.add_modifier(Modifier::REVERSED);
        }
        spans.push(Span::styled(format!("[{}]", chip.label), style));
        spans.push(Span::raw(" "));
    }
    spans
}

fn card_lines(group: &CardGroup, lines: &mut Vec<Line<'static>>) {
    for card in &group.cards {
        lines.push(Line::from(vec![
            Span::styled(
                format!("  {}. ", card.position),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(
                card.title.to_plain(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]));
        if let Some(image) = &card.image {
            lines.push(Line::styled(
                format!("     🖼  {}", image.to_plain()),
                Style::default().fg(Color::DarkGray),
            ));
        }
        if !card.facts.is_empty() {
            let facts: Vec<String> = card.facts.iter().map(|f| f.to_plain()).collect();
            lines.push(Line::styled(
                format!("     {}", facts.join(" · ")),
                Style::default().fg(Color::Gray),
            ));
        }
    }
    lines.push(Line::styled(
        format!("  [{}] | :why", group.action_label),
        Style::default().fg(Color::Cyan),
    ));
}

fn text_lines(text: &str, style: Style, lines: &mut Vec<Line<'static>>) {
    for line in text.lines() {
        lines.push(Line::styled(line.to_string(), style));
    }
}

/// Plain-text rendition of the transcript, one entry after another
pub fn transcript_lines(view: &Renderer) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let label = |name: &'static str, color: Color| {
        Line::from(Span::styled(
            format!("[{}]", name),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ))
    };

    for entry in view.entries() {
        match &entry.node {
            ViewNode::User { text } => {
                lines.push(label("Jij", Color::Blue));
                text_lines(text, Style::default(), &mut lines);
            }
            ViewNode::Bot { html } => {
                lines.push(label("PinterPal", Color::Green));
                text_lines(&html.to_plain(), Style::default(), &mut lines);
            }
            ViewNode::Question { html, hint } => {
                lines.push(label("PinterPal", Color::Green));
                text_lines(
                    &html.to_plain(),
                    Style::default().add_modifier(Modifier::BOLD),
                    &mut lines,
                );
                lines.push(Line::styled(
                    hint.clone(),
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::ITALIC),
                ));
            }
            ViewNode::Chips(group) => {
                let mut spans = vec![Span::raw("  ")];
                spans.extend(chip_spans(group, None));
                lines.push(Line::from(spans));
            }
            ViewNode::Cards(group) => card_lines(group, &mut lines),
            ViewNode::Error { html } => {
                lines.push(Line::styled(
                    format!("⚠️  {}", html.to_plain()),
                    Style::default().fg(Color::Red),
                ));
            }
        }
        lines.push(Line::default());
    }

    if view.is_composing() {
        lines.push(Line::styled(
            "PinterPal typt…",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::ITALIC),
        ));
    }

    lines
}

fn wrapped(lines: Vec<Line<'static>>) -> Paragraph<'static> {
    Paragraph::new(lines).wrap(Wrap { trim: false })
}

fn row_count(paragraph: &Paragraph<'_>, width: u16) -> u16 {
    u16::try_from(paragraph.line_count(width)).unwrap_or(u16::MAX)
}

/// Screen rows the transcript fills once wrapped to `width` columns
pub fn transcript_rows(view: &Renderer, width: u16) -> u16 {
    row_count(&wrapped(transcript_lines(view)), width)
}

fn render_chat(frame: &mut Frame, area: Rect, view: &Renderer) {
    let paragraph = wrapped(transcript_lines(view));

    // Offset counts from the bottom; the paragraph scrolls from the top, in wrapped rows
    let inner_height = area.height.saturating_sub(2);
    let total = row_count(&paragraph, area.width.saturating_sub(2));
    let top = total
        .saturating_sub(inner_height)
        .saturating_sub(view.scroll_offset());

    let paragraph = paragraph
        .block(
            Block::default()
                .title("Gesprek")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .scroll((top, 0));

    frame.render_widget(paragraph, area);
}

fn render_chips(frame: &mut Frame, area: Rect, view: &Renderer, selected: usize) {
    let line = match view.last_chip_group() {
        Some(group) if !group.is_empty() => Line::from(chip_spans(group, Some(selected))),
        _ => Line::styled("Geen keuzes", Style::default().fg(Color::DarkGray)),
    };

    let chips = Paragraph::new(line).block(
        Block::default()
            .title("Keuzes (←/→, Enter)")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(chips, area);
}

fn render_input(frame: &mut Frame, area: Rect, app: &App, enabled: bool) {
    let (title, border) = if enabled {
        ("Bericht", Color::Magenta)
    } else {
        ("Even geduld…", Color::DarkGray)
    };

    let input = Paragraph::new(app.input.as_str()).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border)),
    );
    frame.render_widget(input, area);

    let cursor_x = area.x + 1 + (app.input.chars().count() as u16).min(area.width.saturating_sub(3));
    frame.set_cursor_position((cursor_x, area.y + 1));
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App, view: &Renderer) {
    let status = if let Some(status) = &app.status_message {
        status.clone()
    } else if view.is_composing() {
        "Antwoord ophalen...".to_string()
    } else {
        "Klaar".to_string()
    };

    let spans = vec![
        Span::styled(
            " CHAT ",
            Style::default()
                .bg(Color::Magenta)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" | "),
        Span::raw(status),
        Span::raw(" | "),
        Span::styled(":help", Style::default().fg(Color::DarkGray)),
        Span::raw(" | "),
        Span::styled("Ctrl+C: quit", Style::default().fg(Color::DarkGray)),
    ];

    let status_bar = Paragraph::new(Line::from(spans))
        .style(Style::default().bg(Color::Black))
        .block(Block::default());
    frame.render_widget(status_bar, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Config;
    use crate::session::{Item, QuestionKind, QuestionRecord, SessionDriver};
    use crate::transport::testing::ScriptedTransport;
    use ratatui::{backend::TestBackend, Terminal};
    use serde_json::json;
    use std::sync::Arc;

    const LONG_BUBBLE: &str =
        "Een volle rode wijn met tonen van kers en vanille, zacht in de mond en met een lange afdronk. ";

    fn draw(app: &App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| render_ui(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    fn plain(lines: &[Line]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn test_transcript_shows_decoded_text() {
        let mut view = Renderer::new();
        view.append_user("<b>hoi</b>");
        view.append_bot("Caf&eacute; &amp; <i>wijn</i>");
        view.render_question(&QuestionRecord {
            kind: QuestionKind::MultipleChoice,
            text: Some("Rood of wit?".into()),
            remaining_questions: 1,
            options: vec!["Rood".into(), "Wit".into()],
            suggestions: vec![],
        });

        let text = plain(&transcript_lines(&view));
        assert!(text.contains(&"<b>hoi</b>".to_string()));
        assert!(text.contains(&"Café & wijn".to_string()));
        assert!(text.contains(&"Nog 1 vraag…".to_string()));
        assert!(text.contains(&"  [Rood] [Wit] ".to_string()));
    }

    #[test]
    fn test_cards_and_composing_indicator() {
        let mut view = Renderer::new();
        view.render_recommendation(None, &[Item::from_value(&json!({"title": "Rioja", "land": "Spanje"}))]);
        view.set_composing(true);

        let text = plain(&transcript_lines(&view));
        assert!(text.contains(&"  1. Rioja".to_string()));
        assert!(text.contains(&"     land: Spanje".to_string()));
        assert_eq!(text.last().map(String::as_str), Some("PinterPal typt…"));
    }

    #[tokio::test]
    async fn test_full_frame_draws() {
        let transport = Arc::new(ScriptedTransport::new([Ok(json!({
            "question_text": "Waar heb je zin in?",
            "suggestions": ["Rood", "Wit"]
        }))]));
        let driver = Arc::new(SessionDriver::new(transport, "wijnen"));
        driver.boot().await;
        let app = App::new(driver, &Config::default());

        let screen = draw(&app, 80, 30);
        assert!(screen.contains("PinterPal"));
        assert!(screen.contains("Waar heb je zin in?"));
        assert!(screen.contains("[Rood]"));
    }

    #[test]
    fn test_newest_bubble_stays_on_screen_when_bubbles_wrap() {
        let driver = Arc::new(SessionDriver::new(Arc::new(ScriptedTransport::new([])), "wijnen"));
        {
            let view = driver.renderer();
            let mut view = view.lock();
            for _ in 0..6 {
                view.append_bot(&LONG_BUBBLE.repeat(2));
            }
            view.append_bot("LAATSTE");
            assert_eq!(view.scroll_offset(), 0);
            assert!(transcript_rows(&view, 58) > transcript_lines(&view).len() as u16);
        }
        let app = App::new(driver, &Config::default());

        assert!(draw(&app, 60, 30).contains("LAATSTE"));
    }

    #[test]
    fn test_card_action_hint() {
        let mut view = Renderer::new();
        view.render_recommendation(None, &[Item::from_value(&json!({"title": "Rioja"}))]);

        let text = plain(&transcript_lines(&view));
        assert!(text.contains(&"  [Bekijk] | :why".to_string()));
    }
}
