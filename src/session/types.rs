use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::items::Item;
use crate::constants::{
    DEFAULT_STARTER_QUESTION, DEFAULT_STARTER_SUGGESTIONS, MAX_RECOMMENDED_ITEMS, RESTART_PROMPT,
};
use crate::utils::WidgetError;

/// One user action that produces a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Turn {
    /// Free text for the prompt endpoint; `reset` (re)starts the guided questions
    Prompt { text: String, reset: bool },
    /// A chip label for the choice endpoint
    Choice { text: String },
}

impl Turn {
    pub fn prompt(text: impl Into<String>) -> Self {
        Self::Prompt {
            text: text.into(),
            reset: false,
        }
    }

    pub fn restart() -> Self {
        Self::Prompt {
            text: RESTART_PROMPT.to_string(),
            reset: true,
        }
    }

    pub fn choice(text: impl Into<String>) -> Self {
        Self::Choice { text: text.into() }
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Prompt { text, .. } | Self::Choice { text } => text,
        }
    }
}

/// Body of `POST /enrich-data/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptRequest {
    pub prompt: String,
    pub session_id: Option<String>,
    pub table_name: String,
    pub reset_detail_mode: bool,
}

/// Body of `POST /enrich-data/choice`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceRequest {
    pub session_id: Option<String>,
    pub choice_text: String,
    pub table_name: String,
}

/// Stage tags the service emits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Question,
    Recommendation,
    Detail,
    Explain,
    Other,
}

impl Stage {
    /// Parse a known stage tag. Unknown tags are reported, the caller decides how to degrade.
    pub fn parse(tag: &str) -> Result<Self, WidgetError> {
        match tag {
            "question" => Ok(Self::Question),
            "recommendation" => Ok(Self::Recommendation),
            "detail" => Ok(Self::Detail),
            "explain" => Ok(Self::Explain),
            other => Err(WidgetError::UnrecognizedStage(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    MultipleChoice,
    Open,
}

/// The payload of a `question` stage
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionRecord {
    pub kind: QuestionKind,
    pub text: Option<String>,
    pub remaining_questions: i64,
    pub options: Vec<String>,
    pub suggestions: Vec<String>,
}

impl QuestionRecord {
    /// `response` is `{type, data: {question_text, options, suggestions, remaining_questions}}`
    fn from_response(response: &Value) -> Option<Self> {
        let response = response.as_object()?;

        let kind = match response.get("type").and_then(Value::as_str) {
            Some("multiple_choice") => QuestionKind::MultipleChoice,
            _ => QuestionKind::Open,
        };

        let empty = serde_json::Map::new();
        let data = response
            .get("data")
            .and_then(Value::as_object)
            .unwrap_or(&empty);

        Some(Self {
            kind,
            text: data
                .get("question_text")
                .and_then(Value::as_str)
                .filter(|t| !t.trim().is_empty())
                .map(str::to_string),
            remaining_questions: data
                .get("remaining_questions")
                .map(parse_count)
                .unwrap_or(0),
            options: labels(data.get("options")),
            suggestions: labels(data.get("suggestions")),
        })
    }
}

/// Numbers or numeric strings; anything else counts as zero
fn parse_count(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.round() as i64))
            .unwrap_or(0),
        Value::String(s) => s.trim().parse::<f64>().map(|f| f.round() as i64).unwrap_or(0),
        _ => 0,
    }
}

/// Option labels may be plain strings or `{label}` / `{value}` objects
fn labels(value: Option<&Value>) -> Vec<String> {
    let Some(Value::Array(entries)) = value else {
        return Vec::new();
    };

    entries
        .iter()
        .map(|entry| match entry {
            Value::String(label) => label.clone(),
            Value::Object(fields) => fields
                .get("label")
                .or_else(|| fields.get("value"))
                .and_then(Value::as_str)
                .filter(|l| !l.is_empty())
                .unwrap_or("Optie")
                .to_string(),
            _ => "Optie".to_string(),
        })
        .collect()
}

/// The payload of a `recommendation` stage
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub text: Option<String>,
    pub item: Option<Item>,
    pub alternatives: Vec<Item>,
}

impl Recommendation {
    /// Alternatives when present, otherwise just the primary item; at most three
    pub fn display_items(&self) -> Vec<Item> {
        let items: Vec<Item> = if self.alternatives.is_empty() {
            self.item.iter().cloned().collect()
        } else {
            self.alternatives.clone()
        };
        items.into_iter().take(MAX_RECOMMENDED_ITEMS).collect()
    }
}

/// Whatever arrived under an unknown (or missing) stage
#[derive(Debug, Clone, PartialEq)]
pub enum OtherPayload {
    Text(String),
    Unrecognized(Value),
}

/// A turn's reply, one variant per stage
#[derive(Debug, Clone, PartialEq)]
pub enum StageResponse {
    Question(QuestionRecord),
    Recommendation(Recommendation),
    Detail(Option<String>),
    Explain(Option<String>),
    Other(OtherPayload),
}

impl StageResponse {
    pub fn stage(&self) -> Stage {
        match self {
            Self::Question(_) => Stage::Question,
            Self::Recommendation(_) => Stage::Recommendation,
            Self::Detail(_) => Stage::Detail,
            Self::Explain(_) => Stage::Explain,
            Self::Other(_) => Stage::Other,
        }
    }

    fn other(response: &Value) -> Self {
        match response {
            Value::String(text) => Self::Other(OtherPayload::Text(text.clone())),
            other => Self::Other(OtherPayload::Unrecognized(other.clone())),
        }
    }
}

/// Parsed `{stage, session_id, response, item?, alternatives?}` envelope
#[derive(Debug, Clone, PartialEq)]
pub struct TurnReply {
    pub session_id: Option<String>,
    pub stage: StageResponse,
}

impl TurnReply {
    pub fn from_value(value: Value) -> Result<Self, WidgetError> {
        let envelope = match value {
            Value::Object(envelope) => envelope,
            other => {
                return Err(WidgetError::protocol(format!(
                    "expected a JSON object, got {}",
                    json_kind(&other)
                )))
            }
        };

        let session_id = envelope
            .get("session_id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map(str::to_string);

        let null = Value::Null;
        let response = envelope.get("response").unwrap_or(&null);
        let tag = envelope.get("stage").and_then(Value::as_str).unwrap_or("");

        let stage = match Stage::parse(tag) {
            Ok(Stage::Question) => QuestionRecord::from_response(response)
                .map(StageResponse::Question)
                .unwrap_or_else(|| StageResponse::other(response)),
            Ok(Stage::Recommendation) => StageResponse::Recommendation(Recommendation {
                text: response.as_str().map(str::to_string),
                item: envelope
                    .get("item")
                    .filter(|v| !v.is_null())
                    .map(Item::from_value),
                alternatives: envelope
                    .get("alternatives")
                    .and_then(Value::as_array)
                    .map(|alts| alts.iter().map(Item::from_value).collect())
                    .unwrap_or_default(),
            }),
            Ok(Stage::Detail) => StageResponse::Detail(response.as_str().map(str::to_string)),
            Ok(Stage::Explain) => StageResponse::Explain(response.as_str().map(str::to_string)),
            Ok(Stage::Other) | Err(_) => {
                debug!("Unrecognized stage {:?}, degrading to plain render", tag);
                StageResponse::other(response)
            }
        };

        Ok(Self { session_id, stage })
    }
}

/// `GET /starter` payload: an opening question plus suggestion chips
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Starter {
    pub question_text: String,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

impl Starter {
    pub fn from_value(value: Value) -> Result<Self, WidgetError> {
        let starter: Self = serde_json::from_value(value)?;
        if starter.question_text.trim().is_empty() {
            return Err(WidgetError::protocol("starter has an empty question_text"));
        }
        Ok(starter)
    }

    /// Built-in opening used when the starter endpoint can't be reached
    pub fn fallback() -> Self {
        Self {
            question_text: DEFAULT_STARTER_QUESTION.to_string(),
            suggestions: DEFAULT_STARTER_SUGGESTIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
