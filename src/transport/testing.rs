//! Scripted transport for driver tests
//!
//! Replies are served in order. When a gate is installed, every call parks until
//! the test releases it, which makes "a turn is in flight" observable.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

use super::traits::Transport;
use super::types::ApiRequest;
use crate::utils::WidgetError;

pub type ScriptedReply = Result<Value, WidgetError>;

#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<ScriptedReply>>,
    requests: Mutex<Vec<ApiRequest>>,
    gate: Option<Arc<Notify>>,
    started: Arc<Notify>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new(replies: impl IntoIterator<Item = ScriptedReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            ..Default::default()
        }
    }

    /// Park each call until `gate.notify_one()` is called
    pub fn gated(replies: impl IntoIterator<Item = ScriptedReply>, gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::new(replies)
        }
    }

    /// Notified each time a call has been recorded and is about to park
    pub fn started(&self) -> Arc<Notify> {
        self.started.clone()
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: ApiRequest) -> Result<Value, WidgetError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.requests.lock().push(request);
        self.started.notify_one();

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        let reply = self
            .replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(WidgetError::Network("no scripted reply left".to_string())));
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        reply
    }

    fn base_url(&self) -> &str {
        "http://scripted.test"
    }
}
