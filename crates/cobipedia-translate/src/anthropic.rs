//! Client for the Anthropic Messages API.

use std::time::Duration;

use async_trait::async_trait;
use cobipedia_core::config::{DEFAULT_MODEL_LONG, DEFAULT_MODEL_SHORT};
use cobipedia_core::{AppConfig, ContentTypeProfile, ModelProfile, SourceEntry};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use crate::error::TranslateError;
use crate::parse::{parse_translation, Translation};
use crate::prompt::build_prompt;
use crate::Translator;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const TRANSLATE_MAX_TOKENS: u32 = 1024;
const PING_MAX_TOKENS: u32 = 10;

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

/// Messages API client holding the key and both model tiers.
pub struct AnthropicClient {
    client: Client,
    api_key: String,
    messages_url: Url,
    model_short: String,
    model_long: String,
}

impl AnthropicClient {
    /// Creates a client for `base_url` using the default model tiers.
    ///
    /// # Errors
    ///
    /// Returns [`TranslateError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`TranslateError::InvalidBaseUrl`] for a malformed URL.
    pub fn new(
        api_key: &str,
        base_url: &str,
        timeout_secs: Option<u64>,
    ) -> Result<Self, TranslateError> {
        let mut builder = Client::builder();
        if let Some(secs) = timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;

        let normalised = format!("{}/v1/messages", base_url.trim_end_matches('/'));
        let messages_url = Url::parse(&normalised).map_err(|e| TranslateError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            messages_url,
            model_short: DEFAULT_MODEL_SHORT.to_string(),
            model_long: DEFAULT_MODEL_LONG.to_string(),
        })
    }

    #[must_use]
    pub fn with_models(mut self, short: &str, long: &str) -> Self {
        self.model_short = short.to_string();
        self.model_long = long.to_string();
        self
    }

    /// Creates a client from the API key, URL, timeout and model tiers in
    /// `config`.
    ///
    /// # Errors
    ///
    /// Returns [`TranslateError::MissingApiKey`] when no key is configured,
    /// otherwise see [`AnthropicClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, TranslateError> {
        let api_key = config
            .anthropic_api_key
            .as_deref()
            .ok_or(TranslateError::MissingApiKey)?;
        Ok(
            Self::new(api_key, &config.anthropic_api_url, config.http_timeout_secs)?
                .with_models(&config.model_short, &config.model_long),
        )
    }

    #[must_use]
    pub fn model_for(&self, profile: ModelProfile) -> &str {
        match profile {
            ModelProfile::Short => &self.model_short,
            ModelProfile::Long => &self.model_long,
        }
    }

    /// Sends one user message and returns the trimmed text of the first
    /// content block.
    ///
    /// # Errors
    ///
    /// - [`TranslateError::Http`] on network failure.
    /// - [`TranslateError::UnexpectedStatus`] on a non-2xx status.
    /// - [`TranslateError::Deserialize`] if the body is not a Messages response.
    /// - [`TranslateError::EmptyResponse`] if it carries no text.
    pub async fn complete(
        &self,
        model: &str,
        system: Option<&str>,
        user: &str,
        max_tokens: u32,
    ) -> Result<String, TranslateError> {
        let request = MessagesRequest {
            model,
            max_tokens,
            system,
            messages: vec![Message {
                role: "user",
                content: user,
            }],
        };

        let response = self
            .client
            .post(self.messages_url.clone())
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(TranslateError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: MessagesResponse =
            serde_json::from_str(&body).map_err(|e| TranslateError::Deserialize {
                context: format!("messages response from {model}"),
                source: e,
            })?;

        parsed
            .content
            .into_iter()
            .next()
            .and_then(|block| block.text)
            .map(|text| text.trim().to_string())
            .ok_or(TranslateError::EmptyResponse)
    }

    /// Minimal round trip on the short tier, used as a reachability check.
    ///
    /// # Errors
    ///
    /// See [`AnthropicClient::complete`].
    pub async fn ping(&self) -> Result<String, TranslateError> {
        self.complete(&self.model_short, None, "Reply with ok", PING_MAX_TOKENS)
            .await
    }
}

#[async_trait]
impl Translator for AnthropicClient {
    async fn translate(
        &self,
        profile: &ContentTypeProfile,
        entry: &SourceEntry,
        source_locale: &str,
        target_locale: &str,
    ) -> Result<Translation, TranslateError> {
        let prompt = build_prompt(profile, entry, source_locale, target_locale);
        let model = self.model_for(profile.model_profile);
        tracing::debug!(
            content_type = profile.name,
            document_id = %entry.document_id,
            locale = target_locale,
            model,
            "requesting translation"
        );

        let text = self
            .complete(
                model,
                Some(&prompt.system),
                &prompt.user,
                TRANSLATE_MAX_TOKENS,
            )
            .await?;
        parse_translation(&text, &prompt.expected_fields)
    }
}
