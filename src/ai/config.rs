use std::env;
use std::str::FromStr;

pub const DEFAULT_GPT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 1500;

/// Reply contract agreed with the model: the system prompt and the parser
/// are always chosen together.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseFormat {
    /// Labeled sections (`TITLE:`, `INGREDIENTS:` ...), parsed leniently.
    Text,
    /// A single JSON object, parsed strictly.
    #[default]
    Json,
}

impl FromStr for ResponseFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(ResponseFormat::Text),
            "json" => Ok(ResponseFormat::Json),
            _ => Err(()),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AiConfig {
    pub api_key: String,
    pub gpt_model: String,
    pub openai_chat_url: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub format: ResponseFormat,
}

impl AiConfig {
    pub fn from_env() -> Option<Self> {
        let api_key = match env::var("OPENAI_API_KEY") {
            Ok(k) if !k.trim().is_empty() => k,
            _ => return None,
        };
        Some(Self {
            api_key,
            gpt_model: env::var("OPENAI_GPT_MODEL")
                .unwrap_or_else(|_| DEFAULT_GPT_MODEL.to_string()),
            openai_chat_url: env::var("OPENAI_CHAT_URL").ok(),
            temperature: parse_env("OPENAI_TEMPERATURE").unwrap_or(DEFAULT_TEMPERATURE),
            max_tokens: parse_env("OPENAI_MAX_TOKENS").unwrap_or(DEFAULT_MAX_TOKENS),
            format: parse_env("RECIPE_FORMAT").unwrap_or_default(),
        })
    }
}

/// Read and parse an env var, treating unparseable values as unset.
pub(crate) fn parse_env<T: FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "Ignoring unparseable environment value");
            None
        }
    }
}
