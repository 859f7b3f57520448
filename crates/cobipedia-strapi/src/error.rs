use thiserror::Error;

/// Errors returned by a [`crate::ContentStore`] adapter.
#[derive(Debug, Error)]
pub enum StrapiError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The host answered with a non-success status.
    #[error("unexpected HTTP status {status} from {url}: {body}")]
    UnexpectedStatus {
        status: u16,
        url: String,
        body: String,
    },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },

    #[error("document {document_id} not found in {content_type}")]
    NotFound {
        content_type: String,
        document_id: String,
    },
}

impl StrapiError {
    /// HTTP status carried by the error, if the host answered at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            StrapiError::UnexpectedStatus { status, .. } => Some(*status),
            StrapiError::NotFound { .. } => Some(404),
            StrapiError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
