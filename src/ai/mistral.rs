//! Mistral AI chat-completion client

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use url::Url;

use super::{ChatRequest, LanguageModel};
use crate::core::config::{MistralConfig, network};
use crate::core::error::{AppError, AppResult};
use crate::core::retry::{RetryConfig, retry};

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct MistralClient {
    client: Client,
    api_key: SecretString,
    api_url: Url,
    retry: RetryConfig,
}

impl MistralClient {
    /// # Errors
    /// Returns `AppError::Http` if the HTTP client cannot be built.
    pub fn new(config: &MistralConfig) -> AppResult<Self> {
        let client = Client::builder().timeout(network::mistral_timeout()).build()?;
        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            api_url: config.api_url.clone(),
            retry: RetryConfig::network(),
        })
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    fn endpoint(&self, path: &[&str]) -> AppResult<Url> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::Config(format!("MISTRAL_API_URL cannot be a base URL: {}", self.api_url)))?
            .pop_if_empty()
            .extend(path);
        Ok(url)
    }
}

/// Turns a non-success answer into an error; rate limits and 5xx stay retryable
async fn check_status(response: Response) -> AppResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        return Err(AppError::HttpStatus(status));
    }

    let body = response.text().await.unwrap_or_default();
    Err(AppError::Mistral(format!("{}: {}", status, body.trim())))
}

#[async_trait]
impl LanguageModel for MistralClient {
    async fn complete(&self, request: ChatRequest) -> AppResult<String> {
        let url = self.endpoint(&["v1", "chat", "completions"])?;

        let completion: CompletionResponse = retry(&self.retry, "mistral_complete", || async {
            let response = self
                .client
                .post(url.clone())
                .bearer_auth(self.api_key.expose_secret())
                .json(&request)
                .send()
                .await?;
            Ok(check_status(response).await?.json::<CompletionResponse>().await?)
        })
        .await?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AppError::Mistral("completion without content".to_string()))?;

        tracing::debug!(model = %request.model, length = content.len(), "completion received");
        Ok(content)
    }

    async fn ping(&self) -> AppResult<()> {
        let url = self.endpoint(&["v1", "models"])?;
        retry(&self.retry, "mistral_ping", || async {
            let response = self
                .client
                .get(url.clone())
                .bearer_auth(self.api_key.expose_secret())
                .send()
                .await?;
            check_status(response).await.map(|_| ())
        })
        .await
    }
}
