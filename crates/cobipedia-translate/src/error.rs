use thiserror::Error;

/// Errors returned by a [`crate::Translator`].
#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("model API returned HTTP {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("model response contained no text")]
    EmptyResponse,

    /// The model's reply was not a JSON object. `raw` holds the start of the
    /// reply.
    #[error("failed to parse model response as JSON: {raw}")]
    Parse { raw: String },

    #[error("ANTHROPIC_API_KEY is not set")]
    MissingApiKey,

    #[error("invalid base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}
