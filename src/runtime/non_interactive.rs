use anyhow::Result;
use serde::Serialize;
use std::fmt::Write as _;

use crate::{
    app::Config,
    cli::OutputFormat,
    render::{render_html, Entry, ViewNode},
    session::{SessionDriver, Turn, TurnOutcome},
};

/// Result of a non-interactive run
#[derive(Debug, Serialize)]
pub struct NonInteractiveResult {
    /// The opening free-text turn
    pub prompt: String,
    /// Every turn that was sent, in order
    pub turns: Vec<TurnRecord>,
    /// Session adopted from the first reply, if any
    pub session_id: Option<String>,
    /// Everything the widget would show
    pub transcript: Vec<Entry>,
    /// Error bubbles, as plain text
    pub errors: Vec<String>,
    /// Metadata about the execution
    pub metadata: ExecutionMetadata,
}

#[derive(Debug, Serialize)]
pub struct TurnRecord {
    /// `prompt` or `choice`
    pub kind: &'static str,
    pub text: String,
    pub outcome: TurnOutcome,
}

#[derive(Debug, Serialize)]
pub struct ExecutionMetadata {
    pub table: String,
    /// Progress bar position after the last turn
    pub progress: f64,
    /// Execution time in milliseconds
    pub duration_ms: u128,
}

/// Plays one scripted conversation: a prompt followed by chip answers
pub struct NonInteractiveRunner {
    driver: SessionDriver,
}

impl NonInteractiveRunner {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self::with_driver(SessionDriver::from_config(config)?))
    }

    pub fn with_driver(driver: SessionDriver) -> Self {
        Self { driver }
    }

    /// Send the prompt, then each answer as a choice. Stops at the first failed turn.
    pub async fn execute(&self, prompt: String, answers: &[String]) -> NonInteractiveResult {
        let start_time = std::time::Instant::now();
        let mut turns = Vec::new();

        let script = std::iter::once(Turn::prompt(prompt.clone()))
            .chain(answers.iter().map(|a| Turn::choice(a.clone())));

        for turn in script {
            let kind = match turn {
                Turn::Prompt { .. } => "prompt",
                Turn::Choice { .. } => "choice",
            };
            let text = turn.text().to_string();
            let outcome = self.driver.submit(turn).await;
            turns.push(TurnRecord {
                kind,
                text,
                outcome,
            });
            if outcome == TurnOutcome::Failed {
                break;
            }
        }

        let (transcript, progress) = {
            let view = self.driver.renderer();
            let view = view.lock();
            (view.entries().to_vec(), view.progress())
        };

        let errors = transcript
            .iter()
            .filter_map(|e| match &e.node {
                ViewNode::Error { html } => Some(html.to_plain()),
                _ => None,
            })
            .collect();

        NonInteractiveResult {
            prompt,
            turns,
            session_id: self.driver.session_id().map(str::to_string),
            transcript,
            errors,
            metadata: ExecutionMetadata {
                table: self.driver.table_name().to_string(),
                progress,
                duration_ms: start_time.elapsed().as_millis(),
            },
        }
    }

    /// Format the result according to the output format
    pub fn format_result(&self, result: &NonInteractiveResult, format: OutputFormat) -> String {
        match format {
            OutputFormat::Json => serde_json::to_string_pretty(result).unwrap_or_else(|e| {
                format!("{{\"error\": \"Failed to serialize result: {}\"}}", e)
            }),
            OutputFormat::Html => render_html(&result.transcript),
            OutputFormat::Text => {
                let mut output = plain_transcript(&result.transcript);
                if !result.errors.is_empty() {
                    output.push_str("\n--- Errors ---\n");
                    for error in &result.errors {
                        let _ = writeln!(output, "• {}", error);
                    }
                }
                let _ = writeln!(
                    output,
                    "\n[{} | voortgang {:.0}% | {}ms]",
                    result.metadata.table, result.metadata.progress, result.metadata.duration_ms
                );
                output
            }
        }
    }
}

fn plain_transcript(entries: &[Entry]) -> String {
    let mut out = String::new();
    for entry in entries {
        match &entry.node {
            ViewNode::User { text } => {
                let _ = writeln!(out, "Jij: {}", text);
            }
            ViewNode::Bot { html } => {
                let _ = writeln!(out, "PinterPal: {}", html.to_plain());
            }
            ViewNode::Question { html, hint } => {
                let _ = writeln!(out, "PinterPal: {} ({})", html.to_plain(), hint);
            }
            ViewNode::Chips(group) => {
                let labels: Vec<String> = group
                    .chips
                    .iter()
                    .map(|c| {
                        if c.primary {
                            format!("[{}]", c.label)
                        } else {
                            c.label.clone()
                        }
                    })
                    .collect();
                let _ = writeln!(out, "  {}", labels.join(" "));
            }
            ViewNode::Cards(group) => {
                for card in &group.cards {
                    let _ = write!(out, "  {}. {}", card.position, card.title.to_plain());
                    if !card.facts.is_empty() {
                        let facts: Vec<String> = card.facts.iter().map(|f| f.to_plain()).collect();
                        let _ = write!(out, " ({})", facts.join(", "));
                    }
                    out.push('\n');
                }
            }
            ViewNode::Error { html } => {
                let _ = writeln!(out, "⚠️  {}", html.to_plain());
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::testing::ScriptedTransport;
    use crate::utils::WidgetError;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;

    fn runner(replies: Vec<Result<serde_json::Value, WidgetError>>) -> (NonInteractiveRunner, Arc<ScriptedTransport>) {
        let transport = Arc::new(ScriptedTransport::new(replies));
        let driver = SessionDriver::new(transport.clone(), "wijnen");
        (NonInteractiveRunner::with_driver(driver), transport)
    }

    fn question() -> serde_json::Value {
        json!({
            "stage": "question",
            "session_id": "s1",
            "response": {"type": "multiple_choice", "data": {
                "question_text": "Rood of wit?", "options": ["Rood", "Wit"], "remaining_questions": 2
            }}
        })
    }

    #[tokio::test]
    async fn test_prompt_then_answers() {
        let (runner, transport) = runner(vec![
            Ok(question()),
            Ok(json!({
                "stage": "recommendation",
                "session_id": "s1",
                "response": "Dit past het best",
                "item": {"title": "Pinot Noir 2021", "prijs": "12.50"}
            })),
        ]);

        let result = runner
            .execute("fruitige rode wijn".into(), &["Rood".to_string()])
            .await;

        assert_eq!(transport.requests()[1].path, "/enrich-data/choice");
        assert_eq!(result.session_id.as_deref(), Some("s1"));
        assert_eq!(result.turns.len(), 2);
        assert_eq!(result.turns[1].kind, "choice");
        assert!(result.errors.is_empty());
        assert_eq!(result.metadata.progress, 100.0);

        let text = runner.format_result(&result, OutputFormat::Text);
        assert!(text.starts_with("Jij: fruitige rode wijn\nPinterPal: Rood of wit? (Nog 2 vragen…)\n  [Rood] [Wit]\n"));
        assert!(text.contains("  1. Pinot Noir 2021 (prijs: 12.50)"));
    }

    #[tokio::test]
    async fn test_failure_stops_the_script() {
        let (runner, transport) = runner(vec![Err(WidgetError::http(502, "Bad Gateway"))]);

        let result = runner
            .execute("hallo".into(), &["Rood".to_string(), "Wit".to_string()])
            .await;

        assert_eq!(transport.call_count(), 1);
        assert_eq!(result.turns.len(), 1);
        assert_eq!(result.turns[0].outcome, TurnOutcome::Failed);
        assert_eq!(result.errors, vec!["HTTP 502: Bad Gateway".to_string()]);
    }

    #[tokio::test]
    async fn test_json_and_html_output() {
        let (runner, _) = runner(vec![Ok(question())]);
        let result = runner.execute("wijn".into(), &[]).await;

        let parsed: serde_json::Value =
            serde_json::from_str(&runner.format_result(&result, OutputFormat::Json)).unwrap();
        assert_eq!(parsed["session_id"], json!("s1"));
        assert_eq!(parsed["turns"][0]["outcome"], json!({"outcome": "rendered", "stage": "question"}));
        assert_eq!(parsed["transcript"][1]["node"]["kind"], json!("question"));

        let html = runner.format_result(&result, OutputFormat::Html);
        assert!(html.contains(r#"<div class="pp-msg pp-user">wijn</div>"#));
        assert!(html.contains("pp-chip--primary"));
    }
}
