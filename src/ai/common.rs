use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::error::AiError;
use crate::recipe::Usage;

pub const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<Usage>,
}

/// Text of the first choice plus token counters, if the provider sent them.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub content: String,
    pub usage: Option<Usage>,
}

pub struct ChatParams<'a> {
    pub model: &'a str,
    pub system: &'a str,
    pub user: &'a str,
    pub temperature: f32,
    pub max_tokens: u32,
    pub json_mode: bool,
}

pub fn build_chat_body(params: &ChatParams<'_>) -> Value {
    let mut body = json!({
        "model": params.model,
        "temperature": params.temperature,
        "max_tokens": params.max_tokens,
        "messages": [
            { "role": "system", "content": params.system },
            { "role": "user", "content": params.user },
        ]
    });
    if params.json_mode {
        body["response_format"] = json!({ "type": "json_object" });
    }
    body
}

pub async fn send_openai_request(
    api_key: &str,
    builder: reqwest::RequestBuilder,
) -> Result<reqwest::Response, AiError> {
    let resp = builder.bearer_auth(api_key).send().await?;
    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        warn!(%status, "OpenAI API error");
        return Err(AiError::Provider { status, body });
    }
    Ok(resp)
}

pub fn parse_chat_completion(raw: &str) -> Result<Completion, AiError> {
    let chat: ChatResponse = serde_json::from_str(raw)?;
    let Some(choice) = chat.choices.into_iter().next() else {
        debug!("Chat response carried no choices");
        return Err(AiError::Empty);
    };
    // An empty message is still an answer; the parsers decide what it means.
    let content = choice
        .message
        .content
        .map(|content| content.trim().to_string())
        .unwrap_or_default();
    Ok(Completion {
        content,
        usage: chat.usage,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_includes_sampling_params() {
        let body = build_chat_body(&ChatParams {
            model: "m",
            system: "sys",
            user: "usr",
            temperature: 0.5,
            max_tokens: 99,
            json_mode: false,
        });
        assert_eq!(body["model"], "m");
        assert_eq!(body["max_tokens"], 99);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "usr");
        assert!(body.get("response_format").is_none());
    }

    #[test]
    fn json_mode_requests_json_object() {
        let body = build_chat_body(&ChatParams {
            model: "m",
            system: "sys",
            user: "usr",
            temperature: 0.5,
            max_tokens: 99,
            json_mode: true,
        });
        assert_eq!(body["response_format"]["type"], "json_object");
    }

    #[test]
    fn null_content_is_empty_text() {
        let completion =
            parse_chat_completion(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert_eq!(completion.content, "");
        assert!(completion.usage.is_none());
    }

    #[test]
    fn completion_with_usage() {
        let raw = r#"{"choices":[{"message":{"content":"  hi  "}}],
            "usage":{"prompt_tokens":3,"completion_tokens":4,"total_tokens":7}}"#;
        let completion = parse_chat_completion(raw).unwrap();
        assert_eq!(completion.content, "hi");
        assert_eq!(
            completion.usage,
            Some(Usage {
                prompt_tokens: 3,
                completion_tokens: 4,
                total_tokens: 7
            })
        );
    }

    #[test]
    fn missing_choice_is_empty() {
        assert!(matches!(
            parse_chat_completion(r#"{"choices":[]}"#),
            Err(AiError::Empty)
        ));
        assert!(matches!(
            parse_chat_completion(r#"{"error":"overloaded"}"#),
            Err(AiError::Empty)
        ));
        assert!(matches!(
            parse_chat_completion("not json"),
            Err(AiError::InvalidResponse(_))
        ));
    }
}
