use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

use super::types::{
    ChoiceRequest, OtherPayload, PromptRequest, QuestionRecord, Stage, StageResponse, Starter,
    Turn, TurnReply,
};
use crate::app::Config;
use crate::constants::{
    CHOICE_PATH, DEFAULT_GREETING, GENERIC_ERROR_MESSAGE, PROMPT_PATH, STARTER_PATH,
    UNRECOGNIZED_RESPONSE_MESSAGE,
};
use crate::render::Renderer;
use crate::transport::{ApiRequest, HttpTransport, Transport};
use crate::utils::{log_info, log_warn, WidgetError};

/// How a submitted turn ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome", content = "stage")]
pub enum TurnOutcome {
    /// Another turn was in flight; nothing was sent
    Dropped,
    /// The reply was rendered
    Rendered(Stage),
    /// The call failed and an error bubble was shown
    Failed,
}

/// Holds the single-flight slot for one turn.
///
/// Dropping it is the only way back to idle, so every exit path (success,
/// failure, or the turn future being dropped) releases the slot and re-enables input.
struct InFlight<'a> {
    waiting: &'a AtomicBool,
    renderer: &'a Mutex<Renderer>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        {
            let mut view = self.renderer.lock();
            view.set_composing(false);
            view.set_input_enabled(true);
        }
        self.waiting.store(false, Ordering::Release);
    }
}

/// Turn engine for one widget instance.
///
/// Owns the session id (adopted once, never replaced), the waiting flag and the
/// boot guard, and maps each reply's stage onto the renderer.
pub struct SessionDriver {
    transport: Arc<dyn Transport>,
    table_name: String,
    greeting: String,
    session_id: OnceCell<String>,
    waiting: AtomicBool,
    booted: AtomicBool,
    last_question: Mutex<Option<QuestionRecord>>,
    renderer: Arc<Mutex<Renderer>>,
}

impl SessionDriver {
    pub fn new(transport: Arc<dyn Transport>, table_name: impl Into<String>) -> Self {
        Self {
            transport,
            table_name: table_name.into(),
            greeting: DEFAULT_GREETING.to_string(),
            session_id: OnceCell::new(),
            waiting: AtomicBool::new(false),
            booted: AtomicBool::new(false),
            last_question: Mutex::new(None),
            renderer: Arc::new(Mutex::new(Renderer::new())),
        }
    }

    /// Build a driver talking HTTP to the configured service
    pub fn from_config(config: &Config) -> Result<Self, WidgetError> {
        let transport = HttpTransport::from_config(&config.api)?;
        Ok(Self::new(Arc::new(transport), config.widget.table.clone())
            .with_greeting(config.widget.greeting.clone()))
    }

    pub fn with_greeting(mut self, greeting: impl Into<String>) -> Self {
        self.greeting = greeting.into();
        self
    }

    /// Shared handle on the view this driver appends to
    pub fn renderer(&self) -> Arc<Mutex<Renderer>> {
        self.renderer.clone()
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.get().map(String::as_str)
    }

    pub fn is_waiting(&self) -> bool {
        self.waiting.load(Ordering::Acquire)
    }

    pub fn is_booted(&self) -> bool {
        self.booted.load(Ordering::Acquire)
    }

    /// The most recent question, kept for context
    pub fn last_question(&self) -> Option<QuestionRecord> {
        self.last_question.lock().clone()
    }

    fn try_begin(&self) -> Option<InFlight<'_>> {
        self.waiting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;

        {
            let mut view = self.renderer.lock();
            view.set_input_enabled(false);
            view.set_composing(true);
        }

        Some(InFlight {
            waiting: &self.waiting,
            renderer: &self.renderer,
        })
    }

    /// Submit one turn. A submission while another turn is pending is dropped.
    pub async fn submit(&self, turn: Turn) -> TurnOutcome {
        let Some(_in_flight) = self.try_begin() else {
            debug!("Turn dropped, another one is in flight: {:?}", turn.text());
            return TurnOutcome::Dropped;
        };

        {
            let mut view = self.renderer.lock();
            view.append_user(turn.text());
        }

        match self.run_turn(&turn).await {
            Ok(reply) => {
                self.adopt_session(reply.session_id.as_deref());
                let stage = reply.stage.stage();
                self.dispatch(reply.stage);
                TurnOutcome::Rendered(stage)
            }
            Err(err) => {
                log_warn("⚠️", format!("Turn failed ({}): {}", err.kind(), err));
                let description = err.to_string();
                let mut view = self.renderer.lock();
                view.set_composing(false);
                view.append_error(if description.trim().is_empty() {
                    GENERIC_ERROR_MESSAGE
                } else {
                    description.as_str()
                });
                TurnOutcome::Failed
            }
        }
    }

    /// Send the `Start` prompt with the reset flag, restarting the guided questions
    pub async fn restart(&self) -> TurnOutcome {
        self.submit(Turn::restart()).await
    }

    /// First-open sequence: greeting, then the starter question (or the built-in one).
    /// Runs at most once per driver; returns whether it ran.
    pub async fn boot(&self) -> bool {
        if self
            .booted
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }

        let Some(_in_flight) = self.try_begin() else {
            // A turn got there first; allow a later boot attempt
            self.booted.store(false, Ordering::Release);
            return false;
        };

        self.renderer.lock().append_bot(&self.greeting);

        let starter = match self.fetch_starter().await {
            Ok(starter) => starter,
            Err(err) => {
                log_warn("⚠️", format!("Starter unavailable ({}), using built-in opening", err));
                Starter::fallback()
            }
        };
        log_info("🍷", format!("Conversation booted for table {}", self.table_name));

        let mut view = self.renderer.lock();
        view.set_composing(false);
        view.render_starter(&starter.question_text, &starter.suggestions);
        true
    }

    fn build_request(&self, turn: &Turn) -> Result<ApiRequest, WidgetError> {
        let session_id = self.session_id().map(str::to_string);

        let request = match turn {
            Turn::Choice { text } => ApiRequest::post(
                CHOICE_PATH,
                serde_json::to_value(ChoiceRequest {
                    session_id,
                    choice_text: text.clone(),
                    table_name: self.table_name.clone(),
                })?,
            ),
            Turn::Prompt { text, reset } => {
                let reset_detail_mode = *reset || session_id.is_none();
                ApiRequest::post(
                    PROMPT_PATH,
                    serde_json::to_value(PromptRequest {
                        prompt: text.clone(),
                        session_id,
                        table_name: self.table_name.clone(),
                        reset_detail_mode,
                    })?,
                )
            }
        };
        Ok(request)
    }

    async fn run_turn(&self, turn: &Turn) -> Result<TurnReply, WidgetError> {
        let request = self.build_request(turn)?;
        let value = self.transport.execute(request).await?;
        TurnReply::from_value(value)
    }

    async fn fetch_starter(&self) -> Result<Starter, WidgetError> {
        let request = ApiRequest::get(STARTER_PATH).with_query("table", self.table_name.clone());
        let value = self.transport.execute(request).await?;
        Starter::from_value(value)
    }

    /// Set-if-absent: the first id the service hands out sticks for the driver's lifetime
    fn adopt_session(&self, candidate: Option<&str>) {
        let Some(id) = candidate else {
            return;
        };
        if self.session_id.set(id.to_string()).is_ok() {
            log_info("🔗", format!("Adopted session {}", id));
        } else if self.session_id() != Some(id) {
            debug!("Ignoring session id {} from reply, keeping the adopted one", id);
        }
    }

    fn dispatch(&self, stage: StageResponse) {
        let mut view = self.renderer.lock();
        view.set_composing(false);

        match stage {
            StageResponse::Question(question) => {
                view.render_question(&question);
                *self.last_question.lock() = Some(question);
            }
            StageResponse::Recommendation(recommendation) => {
                view.render_recommendation(
                    recommendation.text.as_deref(),
                    &recommendation.display_items(),
                );
            }
            StageResponse::Detail(text) | StageResponse::Explain(text) => {
                if let Some(text) = text.filter(|t| !t.trim().is_empty()) {
                    view.append_bot(&text);
                }
            }
            StageResponse::Other(OtherPayload::Text(text)) => {
                if !text.trim().is_empty() {
                    view.append_bot(&text);
                }
            }
            StageResponse::Other(OtherPayload::Unrecognized(_)) => {
                view.append_bot(UNRECOGNIZED_RESPONSE_MESSAGE);
            }
        }
    }
}
