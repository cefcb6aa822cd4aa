use super::*;

use std::{
    env,
    time::{SystemTime, UNIX_EPOCH},
};

fn env_from(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
    move |name| {
        pairs
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.to_string())
    }
}

#[test]
fn defaults_point_at_local_backend() {
    let settings = Settings::default();
    assert_eq!(settings.api_base_url, "http://localhost:3000/api");
    assert_eq!(settings.log_filter, "info");
}

#[test]
fn toml_file_overrides_defaults() {
    let settings = Settings::default().merge_toml(
        r#"
api_base_url = "https://survey.example.com/api"
log_filter = "debug"
"#,
    );
    assert_eq!(settings.api_base_url, "https://survey.example.com/api");
    assert_eq!(settings.log_filter, "debug");
}

#[test]
fn malformed_toml_keeps_previous_values() {
    let settings = Settings::default().merge_toml("api_base_url = [1, 2");
    assert_eq!(settings, Settings::default());
}

#[test]
fn app_prefixed_env_wins_over_plain_env() {
    let settings = Settings::default().merge_env(env_from(&[
        ("SURVEY_API_BASE_URL", "http://plain:1/api"),
        ("APP__API_BASE_URL", "http://prefixed:2/api"),
        ("SURVEY_LOG", "warn"),
    ]));
    assert_eq!(settings.api_base_url, "http://prefixed:2/api");
    assert_eq!(settings.log_filter, "warn");
}

#[test]
fn blank_env_values_are_ignored() {
    let settings = Settings::default().merge_env(env_from(&[("SURVEY_API_BASE_URL", "   ")]));
    assert_eq!(settings.api_base_url, DEFAULT_API_BASE_URL);
}

#[test]
fn explicit_flag_overrides_everything() {
    let settings = Settings::default()
        .merge_env(env_from(&[("APP__API_BASE_URL", "http://env/api")]))
        .with_api_base_url(Some("http://flag/api".to_string()));
    assert_eq!(settings.api_base_url, "http://flag/api");
}

#[test]
fn reads_settings_file_from_disk() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let temp_root = env::temp_dir().join(format!("survey_client_config_test_{suffix}"));
    fs::create_dir_all(&temp_root).expect("temp root");
    let path = temp_root.join(SETTINGS_FILE);
    fs::write(&path, "api_base_url = \"http://from-file:9000/api\"\n").expect("write");

    let settings = Settings::default().merge_file(&path);
    assert_eq!(settings.api_base_url, "http://from-file:9000/api");

    let missing = Settings::default().merge_file(&temp_root.join("missing.toml"));
    assert_eq!(missing, Settings::default());

    fs::remove_dir_all(temp_root).expect("cleanup");
}

#[test]
fn base_url_is_trimmed_and_validated() {
    assert_eq!(
        normalize_base_url(" http://localhost:3000/api/ ").expect("valid"),
        "http://localhost:3000/api"
    );
    assert!(matches!(
        normalize_base_url("/api"),
        Err(ClientError::InvalidBaseUrl { .. })
    ));
    assert!(matches!(
        normalize_base_url("ftp://example.com/api"),
        Err(ClientError::InvalidBaseUrl { .. })
    ));
}
