use super::*;

use std::{
    env,
    time::{SystemTime, UNIX_EPOCH},
};

fn no_env(_: &str) -> Option<String> {
    None
}

fn temp_config(contents: &str) -> PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = env::temp_dir().join(format!("school_portal_config_{suffix}.toml"));
    fs::write(&path, contents).expect("write config");
    path
}

#[test]
fn defaults_apply_without_file_or_env() {
    let settings = load_settings_from(Path::new("/nonexistent/portal.toml"), no_env);
    assert_eq!(settings.api_base_url, "http://127.0.0.1:8080");
    assert_eq!(settings.request_timeout_secs, 30);
    assert_eq!(
        settings.stale_response_policy,
        StaleResponsePolicy::LastSettled
    );
    assert!(settings.session_path.ends_with("school-portal/session.json"));
}

#[test]
fn file_values_override_defaults() {
    let path = temp_config(
        r#"
api_base_url = "https://portal.school.test"
session_path = "/tmp/portal-session.json"
request_timeout_secs = 5
stale_responses = "last_issued"
"#,
    );

    let settings = load_settings_from(&path, no_env);
    assert_eq!(settings.api_base_url, "https://portal.school.test");
    assert_eq!(settings.session_path, PathBuf::from("/tmp/portal-session.json"));
    assert_eq!(settings.request_timeout_secs, 5);
    assert_eq!(
        settings.stale_response_policy,
        StaleResponsePolicy::LastIssued
    );

    fs::remove_file(path).expect("cleanup");
}

#[test]
fn environment_overrides_file() {
    let path = temp_config("api_base_url = \"https://file.school.test\"\nrequest_timeout_secs = \"12\"\n");

    let settings = load_settings_from(&path, |key| match key {
        "PORTAL_API_BASE" => Some("https://env.school.test".to_string()),
        "PORTAL_REQUEST_TIMEOUT_SECS" => Some("not-a-number".to_string()),
        "PORTAL_STALE_RESPONSES" => Some("last-issued".to_string()),
        _ => None,
    });
    assert_eq!(settings.api_base_url, "https://env.school.test");
    assert_eq!(settings.request_timeout_secs, 12);
    assert_eq!(
        settings.stale_response_policy,
        StaleResponsePolicy::LastIssued
    );

    fs::remove_file(path).expect("cleanup");
}

#[test]
fn app_prefixed_variable_wins_over_portal_variable() {
    let settings = load_settings_from(Path::new("/nonexistent/portal.toml"), |key| match key {
        "PORTAL_API_BASE" => Some("https://a.school.test".to_string()),
        "APP__API_BASE" => Some("https://b.school.test".to_string()),
        _ => None,
    });
    assert_eq!(settings.api_base_url, "https://b.school.test");
}

#[test]
fn prepares_api_base_url() {
    assert_eq!(
        prepare_api_base_url(" http://localhost:8080/ ").expect("valid"),
        "http://localhost:8080"
    );
    assert_eq!(
        prepare_api_base_url("https://portal.school.test/base/").expect("valid"),
        "https://portal.school.test/base"
    );
    assert!(prepare_api_base_url("ftp://portal.school.test").is_err());
    assert!(prepare_api_base_url("not a url").is_err());
}
