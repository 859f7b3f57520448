use crate::app_config::AppConfig;
use crate::ConfigError;

pub const DEFAULT_STRAPI_URL: &str = "https://creative-candy-431b8ede18.strapiapp.com";
pub const DEFAULT_ANTHROPIC_API_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_MODEL_SHORT: &str = "claude-haiku-4-5-20251001";
pub const DEFAULT_MODEL_LONG: &str = "claude-sonnet-4-20250514";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let strapi_url = or_default("STRAPI_URL", DEFAULT_STRAPI_URL)
        .trim_end_matches('/')
        .to_string();
    let strapi_token = require("STRAPI_TOKEN")?;
    let anthropic_api_key = lookup("ANTHROPIC_API_KEY")
        .ok()
        .filter(|v| !v.trim().is_empty());
    let anthropic_api_url = or_default("ANTHROPIC_API_URL", DEFAULT_ANTHROPIC_API_URL)
        .trim_end_matches('/')
        .to_string();

    let log_level = or_default("COBIPEDIA_LOG_LEVEL", "info");
    let progress_file = PathBuf::from(or_default(
        "COBIPEDIA_PROGRESS_FILE",
        "./translate-progress.json",
    ));

    let source_locale = or_default("COBIPEDIA_SOURCE_LOCALE", "de");
    let target_locales = parse_locales(&or_default("COBIPEDIA_TARGET_LOCALES", "en,pl"));
    if target_locales.is_empty() {
        return Err(ConfigError::InvalidEnvVar {
            var: "COBIPEDIA_TARGET_LOCALES".to_string(),
            reason: "at least one target locale is required".to_string(),
        });
    }
    if target_locales.contains(&source_locale) {
        return Err(ConfigError::Validation(format!(
            "source locale '{source_locale}' cannot also be a target locale"
        )));
    }

    let page_size = parse_u32("COBIPEDIA_PAGE_SIZE", "50")?;
    if page_size == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "COBIPEDIA_PAGE_SIZE".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    let http_timeout_secs = match lookup("COBIPEDIA_HTTP_TIMEOUT_SECS") {
        Ok(raw) => Some(
            raw.parse::<u64>()
                .map_err(|e| ConfigError::InvalidEnvVar {
                    var: "COBIPEDIA_HTTP_TIMEOUT_SECS".to_string(),
                    reason: e.to_string(),
                })?,
        ),
        Err(_) => None,
    };

    let model_delay_ms = parse_u64("COBIPEDIA_MODEL_DELAY_MS", "250")?;
    let write_delay_ms = parse_u64("COBIPEDIA_WRITE_DELAY_MS", "150")?;
    let model_short = or_default("COBIPEDIA_MODEL_SHORT", DEFAULT_MODEL_SHORT);
    let model_long = or_default("COBIPEDIA_MODEL_LONG", DEFAULT_MODEL_LONG);

    Ok(AppConfig {
        strapi_url,
        strapi_token,
        anthropic_api_key,
        anthropic_api_url,
        log_level,
        progress_file,
        source_locale,
        target_locales,
        page_size,
        http_timeout_secs,
        model_delay_ms,
        write_delay_ms,
        model_short,
        model_long,
    })
}

/// Split a comma-separated locale list, dropping blanks and duplicates while
/// keeping the declared order.
fn parse_locales(raw: &str) -> Vec<String> {
    let mut locales: Vec<String> = Vec::new();
    for locale in raw.split(',').map(str::trim).filter(|l| !l.is_empty()) {
        if !locales.iter().any(|l| l == locale) {
            locales.push(locale.to_string());
        }
    }
    locales
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
