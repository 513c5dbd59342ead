//! The two backend calls the engine depends on, behind a trait so sessions can be
//! driven by HTTP or by an in-memory double.

use crate::error::ClientError;
use crate::submit::FormResponses;
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

mod http;

pub use http::HttpTransport;

/// Opaque routing context (template file, reply linkage) forwarded verbatim to both calls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryContext {
    raw: String,
}

impl QueryContext {
    /// Accepts a query string with or without the leading `?`.
    pub fn from_raw(raw: &str) -> Self {
        Self {
            raw: raw.trim_start_matches('?').to_string(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// First value of a query parameter, percent-decoded.
    pub fn get(&self, key: &str) -> Option<String> {
        url::form_urlencoded::parse(self.raw.as_bytes())
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    /// The `template` parameter, used as the form title.
    pub fn template_name(&self) -> Option<String> {
        self.get("template").filter(|name| !name.is_empty())
    }
}

/// Backend operations consumed by a form session.
#[async_trait]
pub trait FormTransport: Send + Sync {
    async fn fetch_template(&self, query: &QueryContext) -> Result<String, ClientError>;

    async fn submit_responses(
        &self,
        query: &QueryContext,
        responses: &FormResponses,
    ) -> Result<(), ClientError>;
}

/// Runs `call` with an upper time bound.
pub(crate) async fn bounded<T>(
    timeout: Duration,
    call: impl Future<Output = Result<T, ClientError>>,
) -> Result<T, ClientError> {
    tokio::time::timeout(timeout, call)
        .await
        .map_err(|_| ClientError::Timeout(timeout.as_secs()))?
}
