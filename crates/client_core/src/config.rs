use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::{anyhow, Context};
use url::Url;

/// How a controller treats a response that settles after a newer request was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StaleResponsePolicy {
    /// Every response is applied when it settles; the last to settle wins.
    #[default]
    LastSettled,
    /// Responses to superseded requests are discarded.
    LastIssued,
}

impl FromStr for StaleResponsePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "last_settled" => Ok(Self::LastSettled),
            "last_issued" => Ok(Self::LastIssued),
            other => Err(anyhow!("unknown stale response policy '{other}'")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub api_base_url: String,
    pub session_path: PathBuf,
    pub request_timeout_secs: u64,
    pub stale_response_policy: StaleResponsePolicy,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8080".into(),
            session_path: default_session_path(),
            request_timeout_secs: 30,
            stale_response_policy: StaleResponsePolicy::LastSettled,
        }
    }
}

pub fn default_session_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("school-portal")
        .join("session.json")
}

pub fn load_settings() -> ClientSettings {
    load_settings_from(Path::new("portal.toml"), |key| std::env::var(key).ok())
}

/// Defaults, then `config_path` (if readable), then environment variables.
pub fn load_settings_from(
    config_path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> ClientSettings {
    let mut settings = ClientSettings::default();

    if let Ok(raw) = fs::read_to_string(config_path) {
        match toml::from_str::<HashMap<String, toml::Value>>(&raw) {
            Ok(file_cfg) => {
                let get = |key: &str| file_cfg.get(key).and_then(value_as_string);
                if let Some(v) = get("api_base_url") {
                    settings.api_base_url = v;
                }
                if let Some(v) = get("session_path") {
                    settings.session_path = PathBuf::from(v);
                }
                if let Some(v) = get("request_timeout_secs").and_then(|v| v.parse().ok()) {
                    settings.request_timeout_secs = v;
                }
                if let Some(v) = get("stale_responses").and_then(|v| v.parse().ok()) {
                    settings.stale_response_policy = v;
                }
            }
            Err(err) => {
                tracing::warn!(path = %config_path.display(), error = %err, "ignoring unreadable settings file");
            }
        }
    }

    if let Some(v) = env("PORTAL_API_BASE") {
        settings.api_base_url = v;
    }
    if let Some(v) = env("APP__API_BASE") {
        settings.api_base_url = v;
    }

    if let Some(v) = env("PORTAL_SESSION_PATH") {
        settings.session_path = PathBuf::from(v);
    }

    if let Some(v) = env("PORTAL_REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_secs = parsed;
        }
    }

    if let Some(v) = env("PORTAL_STALE_RESPONSES") {
        if let Ok(parsed) = v.parse() {
            settings.stale_response_policy = parsed;
        }
    }

    settings
}

fn value_as_string(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(s) => Some(s.clone()),
        toml::Value::Integer(i) => Some(i.to_string()),
        _ => None,
    }
}

/// Validates an API base URL and strips trailing slashes.
pub fn prepare_api_base_url(raw: &str) -> anyhow::Result<String> {
    let raw = raw.trim();
    let url = Url::parse(raw).with_context(|| format!("invalid API base url '{raw}'"))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(anyhow!(
            "API base url '{raw}' must use http or https, not '{}'",
            url.scheme()
        ));
    }
    if url.host_str().is_none() {
        return Err(anyhow!("API base url '{raw}' has no host"));
    }
    Ok(url.as_str().trim_end_matches('/').to_string())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
