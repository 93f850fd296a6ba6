use crate::db::Database;
use reqwest::Url;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = match option_env!("PULSE_GATEWAY_URL") {
    Some(url) => url,
    None => "http://localhost:5678",
};

pub const SETTING_KEYS: &[&str] = &[
    "gateway_base_url",
    "upload_path",
    "chat_path",
    "cleanup_path",
    "chat_timeout_secs",
    "upload_timeout_secs",
    "cleanup_timeout_secs",
];

/// Endpoints and per-call deadlines of the remote gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayConfig {
    pub base_url: String,
    pub upload_path: String,
    pub chat_path: String,
    pub cleanup_path: String,
    pub chat_timeout: Duration,
    pub upload_timeout: Duration,
    pub cleanup_timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            upload_path: "/webhook/upload".to_string(),
            chat_path: "/webhook/chat".to_string(),
            cleanup_path: "/api/cleanup".to_string(),
            chat_timeout: Duration::from_secs(45),
            upload_timeout: Duration::from_secs(120),
            cleanup_timeout: Duration::from_secs(30),
        }
    }
}

impl GatewayConfig {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Defaults overlaid with whatever the settings table holds.
    /// Unreadable or malformed values fall back to the default.
    pub fn from_settings(db: &Database) -> Self {
        let mut config = Self::default();
        let get = |key: &str| db.get_setting(key).ok().flatten();

        if let Some(url) = get("gateway_base_url") {
            config.base_url = url;
        }
        if let Some(path) = get("upload_path") {
            config.upload_path = path;
        }
        if let Some(path) = get("chat_path") {
            config.chat_path = path;
        }
        if let Some(path) = get("cleanup_path") {
            config.cleanup_path = path;
        }
        if let Some(secs) = get("chat_timeout_secs").and_then(|v| parse_timeout_secs(&v).ok()) {
            config.chat_timeout = secs;
        }
        if let Some(secs) = get("upload_timeout_secs").and_then(|v| parse_timeout_secs(&v).ok()) {
            config.upload_timeout = secs;
        }
        if let Some(secs) = get("cleanup_timeout_secs").and_then(|v| parse_timeout_secs(&v).ok())
        {
            config.cleanup_timeout = secs;
        }
        config
    }

    pub fn upload_url(&self) -> String {
        join_url(&self.base_url, &self.upload_path)
    }

    /// The chat route with `upload_id` appended as one percent-encoded segment.
    /// `None` when the base URL does not parse or cannot carry a path.
    pub fn chat_url(&self, upload_id: &str) -> Option<Url> {
        let mut url = Url::parse(&join_url(&self.base_url, &self.chat_path)).ok()?;
        url.path_segments_mut().ok()?.pop_if_empty().push(upload_id);
        Some(url)
    }

    pub fn cleanup_url(&self) -> String {
        join_url(&self.base_url, &self.cleanup_path)
    }
}

pub fn parse_timeout_secs(value: &str) -> Result<Duration, String> {
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(format!("Timeout must be a positive number of seconds, got: {}", value)),
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/').trim_end_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls() {
        let config = GatewayConfig::with_base_url("http://gw.local/");
        assert_eq!(config.upload_url(), "http://gw.local/webhook/upload");
        assert_eq!(
            config.chat_url("u1").unwrap().as_str(),
            "http://gw.local/webhook/chat/u1"
        );
        assert_eq!(config.cleanup_url(), "http://gw.local/api/cleanup");
    }

    #[test]
    fn test_chat_url_encodes_upload_id() {
        let config = GatewayConfig::with_base_url("http://gw.local");
        assert_eq!(
            config.chat_url("q1/2024 v2?x#y").unwrap().as_str(),
            "http://gw.local/webhook/chat/q1%2F2024%20v2%3Fx%23y"
        );
        assert!(GatewayConfig::with_base_url("not a url").chat_url("u1").is_none());
    }

    #[test]
    fn test_default_timeouts() {
        let config = GatewayConfig::default();
        assert_eq!(config.chat_timeout, Duration::from_secs(45));
        assert_eq!(config.upload_timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_parse_timeout_secs() {
        assert_eq!(parse_timeout_secs(" 10 "), Ok(Duration::from_secs(10)));
        assert!(parse_timeout_secs("0").is_err());
        assert!(parse_timeout_secs("-3").is_err());
        assert!(parse_timeout_secs("soon").is_err());
    }

    #[test]
    fn test_from_settings_overlays_defaults() {
        let db = Database::in_memory().unwrap();
        db.set_setting("gateway_base_url", "https://pulse.example").unwrap();
        db.set_setting("chat_timeout_secs", "5").unwrap();
        db.set_setting("upload_timeout_secs", "nope").unwrap();

        let config = GatewayConfig::from_settings(&db);
        assert_eq!(config.base_url, "https://pulse.example");
        assert_eq!(config.chat_timeout, Duration::from_secs(5));
        assert_eq!(config.upload_timeout, Duration::from_secs(120));
        assert_eq!(config.chat_path, "/webhook/chat");
    }
}
