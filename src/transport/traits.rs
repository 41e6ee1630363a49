use async_trait::async_trait;
use serde_json::Value;

use super::types::ApiRequest;
use crate::utils::WidgetError;

/// Core trait for reaching the enrichment service
///
/// Exactly one attempt per call. Implementations must map an expired deadline to
/// [`WidgetError::Timeout`], a non-2xx status to [`WidgetError::HttpError`] and an
/// unparseable body to [`WidgetError::ProtocolError`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute a request and return the parsed JSON payload
    async fn execute(&self, request: ApiRequest) -> Result<Value, WidgetError>;

    /// Base URL requests are resolved against
    fn base_url(&self) -> &str;
}
