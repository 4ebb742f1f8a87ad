use tracing::{debug, instrument, trace};

use crate::ai::common::{
    build_chat_body, parse_chat_completion, send_openai_request, ChatParams, Completion,
    OPENAI_CHAT_URL,
};
use crate::ai::config::AiConfig;
use crate::error::AiError;

/// Chat-completion client shared by every request of the process.
#[derive(Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    url: String,
    temperature: f32,
    max_tokens: u32,
}

impl ChatClient {
    pub fn new(config: &AiConfig) -> Self {
        Self::with_http(reqwest::Client::new(), config)
    }

    pub fn with_http(http: reqwest::Client, config: &AiConfig) -> Self {
        Self {
            http,
            api_key: config.api_key.clone(),
            model: config.gpt_model.clone(),
            url: config
                .openai_chat_url
                .clone()
                .unwrap_or_else(|| OPENAI_CHAT_URL.to_string()),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    #[instrument(level = "trace", skip(self, system, user), fields(model = %self.model))]
    pub async fn complete(
        &self,
        system: &str,
        user: &str,
        json_mode: bool,
    ) -> Result<Completion, AiError> {
        let body = build_chat_body(&ChatParams {
            model: &self.model,
            system,
            user,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            json_mode,
        });

        debug!(url = %self.url, json_mode, "sending chat completion request");
        let builder = self.http.post(&self.url).json(&body);
        let resp = send_openai_request(&self.api_key, builder).await?;

        let raw = resp.text().await?;
        let snippet: String = raw.chars().take(200).collect();
        debug!(snippet = %snippet, "chat response body");
        trace!(raw = %raw, "chat response");
        parse_chat_completion(&raw)
    }
}
