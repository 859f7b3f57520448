use std::path::PathBuf;

#[derive(Clone)]
pub struct AppConfig {
    pub strapi_url: String,
    pub strapi_token: String,
    pub anthropic_api_key: Option<String>,
    pub anthropic_api_url: String,
    pub log_level: String,
    pub progress_file: PathBuf,
    pub source_locale: String,
    pub target_locales: Vec<String>,
    pub page_size: u32,
    pub http_timeout_secs: Option<u64>,
    pub model_delay_ms: u64,
    pub write_delay_ms: u64,
    pub model_short: String,
    pub model_long: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("strapi_url", &self.strapi_url)
            .field("strapi_token", &"[redacted]")
            .field(
                "anthropic_api_key",
                &self.anthropic_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("anthropic_api_url", &self.anthropic_api_url)
            .field("log_level", &self.log_level)
            .field("progress_file", &self.progress_file)
            .field("source_locale", &self.source_locale)
            .field("target_locales", &self.target_locales)
            .field("page_size", &self.page_size)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("model_delay_ms", &self.model_delay_ms)
            .field("write_delay_ms", &self.write_delay_ms)
            .field("model_short", &self.model_short)
            .field("model_long", &self.model_long)
            .finish()
    }
}
