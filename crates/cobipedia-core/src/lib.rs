pub mod app_config;
pub mod config;
pub mod content_types;
pub mod entry;
pub mod locale;
pub mod slug;

use thiserror::Error;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use content_types::{
    find_content_type, ContentTypeProfile, ModelProfile, CONTENT_TYPES, DOCUMENT_ID_FIELD, MEDIA_FIELD,
};
pub use entry::{EntryError, FieldValue, SourceEntry};
pub use locale::language_name;
pub use slug::{slugify, slug_with_discriminator};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("configuration validation failed: {0}")]
    Validation(String),
}
