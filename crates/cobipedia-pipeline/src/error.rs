use std::path::PathBuf;

use cobipedia_strapi::StrapiError;
use cobipedia_translate::TranslateError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("failed to read ledger {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write ledger {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("ledger {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize ledger: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum PipelineError {
    /// A source page could not be fetched; the whole content type is abandoned.
    #[error("fetching {content_type} failed: {source}")]
    Fetch {
        content_type: String,
        #[source]
        source: StrapiError,
    },

    #[error("translation failed: {0}")]
    Translate(#[from] TranslateError),

    #[error("write failed: {0}")]
    Write(#[source] StrapiError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("pagination limit reached for {content_type}: exceeded {max_pages} pages")]
    PaginationLimit {
        content_type: String,
        max_pages: u32,
    },
}
