use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

/// Returns a map with all required env vars populated with valid defaults.
fn full_env<'a>() -> HashMap<&'a str, &'a str> {
    let mut m = HashMap::new();
    m.insert("STRAPI_TOKEN", "test-strapi-token");
    m
}

#[test]
fn build_app_config_fails_without_strapi_token() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "STRAPI_TOKEN"),
        "expected MissingEnvVar(STRAPI_TOKEN), got: {result:?}"
    );
}

#[test]
fn build_app_config_treats_blank_strapi_token_as_missing() {
    let mut map = HashMap::new();
    map.insert("STRAPI_TOKEN", "   ");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "STRAPI_TOKEN"),
        "expected MissingEnvVar(STRAPI_TOKEN), got: {result:?}"
    );
}

#[test]
fn build_app_config_succeeds_with_defaults() {
    let map = full_env();
    let result = build_app_config(lookup_from_map(&map));
    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    let cfg = result.unwrap();
    assert_eq!(cfg.strapi_url, DEFAULT_STRAPI_URL);
    assert_eq!(cfg.strapi_token, "test-strapi-token");
    assert!(cfg.anthropic_api_key.is_none());
    assert_eq!(cfg.anthropic_api_url, DEFAULT_ANTHROPIC_API_URL);
    assert_eq!(cfg.log_level, "info");
    assert_eq!(
        cfg.progress_file,
        std::path::PathBuf::from("./translate-progress.json")
    );
    assert_eq!(cfg.source_locale, "de");
    assert_eq!(cfg.target_locales, vec!["en".to_string(), "pl".to_string()]);
    assert_eq!(cfg.page_size, 50);
    assert!(cfg.http_timeout_secs.is_none());
    assert_eq!(cfg.model_delay_ms, 250);
    assert_eq!(cfg.write_delay_ms, 150);
    assert_eq!(cfg.model_short, DEFAULT_MODEL_SHORT);
    assert_eq!(cfg.model_long, DEFAULT_MODEL_LONG);
}

#[test]
fn strapi_url_trailing_slash_is_trimmed() {
    let mut map = full_env();
    map.insert("STRAPI_URL", "http://localhost:1337/");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.strapi_url, "http://localhost:1337");
}

#[test]
fn anthropic_api_key_is_read_when_present() {
    let mut map = full_env();
    map.insert("ANTHROPIC_API_KEY", "sk-test");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.anthropic_api_key.as_deref(), Some("sk-test"));
}

#[test]
fn target_locales_keep_declared_order_and_drop_duplicates() {
    let mut map = full_env();
    map.insert("COBIPEDIA_TARGET_LOCALES", "pl, en,,pl ,cs");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.target_locales, vec!["pl", "en", "cs"]);
}

#[test]
fn empty_target_locales_are_rejected() {
    let mut map = full_env();
    map.insert("COBIPEDIA_TARGET_LOCALES", " , ");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "COBIPEDIA_TARGET_LOCALES"),
        "expected InvalidEnvVar(COBIPEDIA_TARGET_LOCALES), got: {result:?}"
    );
}

#[test]
fn source_locale_in_targets_is_rejected() {
    let mut map = full_env();
    map.insert("COBIPEDIA_TARGET_LOCALES", "en,de");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::Validation(ref msg)) if msg.contains("'de'")),
        "expected Validation error, got: {result:?}"
    );
}

#[test]
fn page_size_override() {
    let mut map = full_env();
    map.insert("COBIPEDIA_PAGE_SIZE", "25");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.page_size, 25);
}

#[test]
fn page_size_zero_is_rejected() {
    let mut map = full_env();
    map.insert("COBIPEDIA_PAGE_SIZE", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "COBIPEDIA_PAGE_SIZE"),
        "expected InvalidEnvVar(COBIPEDIA_PAGE_SIZE), got: {result:?}"
    );
}

#[test]
fn page_size_invalid() {
    let mut map = full_env();
    map.insert("COBIPEDIA_PAGE_SIZE", "not-a-number");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "COBIPEDIA_PAGE_SIZE"),
        "expected InvalidEnvVar(COBIPEDIA_PAGE_SIZE), got: {result:?}"
    );
}

#[test]
fn http_timeout_is_opt_in() {
    let mut map = full_env();
    map.insert("COBIPEDIA_HTTP_TIMEOUT_SECS", "90");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.http_timeout_secs, Some(90));
}

#[test]
fn http_timeout_invalid() {
    let mut map = full_env();
    map.insert("COBIPEDIA_HTTP_TIMEOUT_SECS", "soon");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "COBIPEDIA_HTTP_TIMEOUT_SECS"),
        "expected InvalidEnvVar(COBIPEDIA_HTTP_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn delay_overrides() {
    let mut map = full_env();
    map.insert("COBIPEDIA_MODEL_DELAY_MS", "0");
    map.insert("COBIPEDIA_WRITE_DELAY_MS", "1000");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.model_delay_ms, 0);
    assert_eq!(cfg.write_delay_ms, 1000);
}

#[test]
fn model_delay_invalid() {
    let mut map = full_env();
    map.insert("COBIPEDIA_MODEL_DELAY_MS", "-5");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "COBIPEDIA_MODEL_DELAY_MS"),
        "expected InvalidEnvVar(COBIPEDIA_MODEL_DELAY_MS), got: {result:?}"
    );
}

#[test]
fn model_tiers_are_configurable() {
    let mut map = full_env();
    map.insert("COBIPEDIA_MODEL_SHORT", "short-model");
    map.insert("COBIPEDIA_MODEL_LONG", "long-model");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.model_short, "short-model");
    assert_eq!(cfg.model_long, "long-model");
}

#[test]
fn debug_output_redacts_secrets() {
    let mut map = full_env();
    map.insert("ANTHROPIC_API_KEY", "sk-very-secret");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("test-strapi-token"));
    assert!(!rendered.contains("sk-very-secret"));
    assert!(rendered.contains("[redacted]"));
}
