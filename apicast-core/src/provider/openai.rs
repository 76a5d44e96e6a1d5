use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::{
    config::OpenAiSettings, credential::Credential, error::ApiError, model::UsageReport,
};

use super::{ChatProvider, truncate_body};

const SYSTEM_PREAMBLE: &str = "You are a helpful assistant.";

#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    credential: Credential,
    settings: OpenAiSettings,
    http: Client,
}

impl OpenAiProvider {
    pub fn new(credential: Credential, settings: OpenAiSettings) -> Self {
        Self { credential, settings, http: Client::new() }
    }

    pub fn default_model(&self) -> &str {
        &self.settings.default_model
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.settings.base_url.trim_end_matches('/'))
    }

    async fn complete(&self, text: &str, model: &str) -> Result<ChatResponse, ApiError> {
        let url = self.completions_url();
        let request = ChatRequest {
            model,
            messages: [
                ChatMessage { role: "system", content: SYSTEM_PREAMBLE },
                ChatMessage { role: "user", content: text },
            ],
        };
        debug!(%url, model, "sending chat completion request");

        let res = self
            .http
            .post(&url)
            .bearer_auth(self.credential.expose())
            .json(&request)
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            debug!(status = status.as_u16(), "chat completion returned an error status");
            return Err(ApiError::UpstreamStatus {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl ChatProvider for OpenAiProvider {
    #[instrument(skip(self, text))]
    async fn query(&self, text: &str, model: &str) -> Result<String, ApiError> {
        self.complete(text, model).await?.first_content()
    }

    #[instrument(skip(self, text))]
    async fn query_with_usage(&self, text: &str, model: &str) -> Result<UsageReport, ApiError> {
        let response = self.complete(text, model).await?;
        let content = response.first_content()?;
        let usage = response
            .usage
            .ok_or_else(|| ApiError::MalformedResponse("response has no usage block".into()))?;

        let pricing = self.settings.pricing.pricing_for(model);
        let total_cost_usd = pricing.cost_usd(usage.prompt_tokens, usage.completion_tokens);
        debug!(
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            total_cost_usd,
            "usage computed"
        );

        Ok(UsageReport {
            response: content,
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
            total_cost_usd,
            model: model.to_string(),
        })
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

impl ChatResponse {
    fn first_content(&self) -> Result<String, ApiError> {
        self.choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or_else(|| ApiError::MalformedResponse("response has no message content".into()))
    }
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
    total_tokens: u64,
}
