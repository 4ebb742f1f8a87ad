use thiserror::Error;

/// Failure to turn strict-JSON model output into a recipe.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("no JSON object found in model output")]
    NoJsonObject,
    #[error("invalid recipe JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("required field `{0}` is missing or empty")]
    MissingField(&'static str),
}

/// The model provider could not be reached or returned nothing usable.
#[derive(Debug, Error)]
pub enum AiError {
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),
    #[error("provider returned {status}: {body}")]
    Provider {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("malformed provider response: {0}")]
    InvalidResponse(#[from] serde_json::Error),
    #[error("empty response")]
    Empty,
}

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Upstream(#[from] AiError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("between 1 and {max} ingredients are required, got {got}")]
    IngredientCount { got: usize, max: usize },
    #[error("ingredient #{0} has an empty name")]
    EmptyIngredientName(usize),
    #[error("user prompt exceeds {max} characters")]
    PromptTooLong { max: usize },
    #[error("cooking time must be between {min} and {max} minutes, got {got}")]
    CookingTime { got: u32, min: u32, max: u32 },
    #[error("{0} must not be empty")]
    Empty(&'static str),
}
