//! Machine translation of localized entry fields.

pub mod anthropic;
pub mod error;
pub mod parse;
pub mod prompt;

use async_trait::async_trait;
use cobipedia_core::{ContentTypeProfile, SourceEntry};

pub use anthropic::AnthropicClient;
pub use error::TranslateError;
pub use parse::{parse_translation, Translation};
pub use prompt::{build_prompt, Prompt};

/// Translates one entry's translatable fields into a target locale.
///
/// A failure is terminal for that entry; callers do not retry within a pass.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(
        &self,
        profile: &ContentTypeProfile,
        entry: &SourceEntry,
        source_locale: &str,
        target_locale: &str,
    ) -> Result<Translation, TranslateError>;
}
