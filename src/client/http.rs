use crate::client::{FormTransport, QueryContext};
use crate::config::FormConfig;
use crate::error::ClientError;
use crate::submit::FormResponses;
use async_trait::async_trait;
use reqwest::{Client, Url};
use std::time::Duration;

/// Talks to the form backend over HTTP.
pub struct HttpTransport {
    http: Client,
    base_url: String,
    template_endpoint: String,
    submit_endpoint: String,
}

impl HttpTransport {
    pub fn new(config: &FormConfig) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ClientError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            template_endpoint: config.template_endpoint.clone(),
            submit_endpoint: config.submit_endpoint.clone(),
        })
    }

    fn endpoint(&self, path: &str, query: &QueryContext) -> Result<Url, ClientError> {
        let mut url = format!("{}{}", self.base_url, path);
        if !query.is_empty() {
            url.push('?');
            url.push_str(query.as_str());
        }
        Url::parse(&url).map_err(|e| ClientError::InvalidUrl {
            url,
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl FormTransport for HttpTransport {
    async fn fetch_template(&self, query: &QueryContext) -> Result<String, ClientError> {
        let url = self.endpoint(&self.template_endpoint, query)?;
        tracing::debug!("Fetching template from {}", url);

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::FetchRejected {
                status: status.to_string(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))
    }

    async fn submit_responses(
        &self,
        query: &QueryContext,
        responses: &FormResponses,
    ) -> Result<(), ClientError> {
        let url = self.endpoint(&self.submit_endpoint, query)?;
        tracing::debug!("Posting {} response(s) to {}", responses.len(), url);

        let response = self
            .http
            .post(url)
            .json(responses)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .map_err(|e| ClientError::Transport(format!("Failed to read response body: {}", e)))?;
            // Empty rejections report the status line.
            let body = if body.trim().is_empty() {
                status.to_string()
            } else {
                body
            };
            return Err(ClientError::SubmitRejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}
