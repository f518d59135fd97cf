//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.dingrelay/config.json`) and environment.
//! Every field has a default, so an empty `{}` (or a missing file) yields the stock relay.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// DingTalk open API host used when nothing overrides it.
pub const DEFAULT_DINGTALK_BASE_URL: &str = "https://oapi.dingtalk.com";

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Inbound HTTP listener.
    #[serde(default)]
    pub server: ServerConfig,

    /// Outbound DingTalk robot settings.
    #[serde(default)]
    pub dingtalk: DingTalkConfig,
}

/// Listener bind address and port.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    /// Port for the webhook listener (default 8080).
    #[serde(default = "default_server_port")]
    pub port: u16,

    /// Bind address (default "0.0.0.0", all interfaces).
    #[serde(default = "default_server_bind")]
    pub bind: String,
}

fn default_server_port() -> u16 {
    8080
}

fn default_server_bind() -> String {
    "0.0.0.0".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_server_port(),
            bind: default_server_bind(),
        }
    }
}

impl ServerConfig {
    /// `bind:port` string handed to the TCP listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind.trim(), self.port)
    }

    /// Apply command-line `--port` / `--bind`; `None` keeps the file value.
    pub fn apply_overrides(&mut self, port: Option<u16>, bind: Option<String>) {
        if let Some(p) = port {
            self.port = p;
        }
        if let Some(b) = bind {
            self.bind = b;
        }
    }
}

/// DingTalk robot endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DingTalkConfig {
    /// Scheme and host of the robot API. Overridden by DINGTALK_API_BASE env when set.
    #[serde(default = "default_dingtalk_base_url")]
    pub base_url: String,

    /// Timeout for the outbound send, in seconds. When absent the HTTP client default applies.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_dingtalk_base_url() -> String {
    DEFAULT_DINGTALK_BASE_URL.to_string()
}

impl Default for DingTalkConfig {
    fn default() -> Self {
        Self {
            base_url: default_dingtalk_base_url(),
            timeout_secs: None,
        }
    }
}

impl DingTalkConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Environment variable that overrides `dingtalk.baseUrl`.
pub const DINGTALK_API_BASE_ENV: &str = "DINGTALK_API_BASE";

/// Resolve the DingTalk base URL: env DINGTALK_API_BASE overrides config. Trailing slashes are trimmed.
pub fn resolve_dingtalk_base_url(config: &Config) -> String {
    pick_base_url(
        std::env::var(DINGTALK_API_BASE_ENV).ok().as_deref(),
        &config.dingtalk.base_url,
    )
}

fn pick_base_url(env_value: Option<&str>, configured: &str) -> String {
    env_value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| configured.trim())
        .trim_end_matches('/')
        .to_string()
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("DINGRELAY_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".dingrelay").join("config.json"))
                .unwrap_or_else(|| PathBuf::from("config.json"))
        })
}

/// Load config from the given path, or the default path (DINGRELAY_CONFIG_PATH or ~/.dingrelay/config.json).
/// Missing file => default config. Returns the config and the path that was used.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_server_port_and_bind() {
        let s = ServerConfig::default();
        assert_eq!(s.port, 8080);
        assert_eq!(s.bind, "0.0.0.0");
        assert_eq!(s.bind_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn empty_object_yields_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.dingtalk.base_url, DEFAULT_DINGTALK_BASE_URL);
        assert!(config.dingtalk.timeout().is_none());
    }

    #[test]
    fn camel_case_keys_are_read() {
        let config: Config = serde_json::from_str(
            r#"{"server":{"port":9000},"dingtalk":{"baseUrl":"http://127.0.0.1:1234/","timeoutSecs":5}}"#,
        )
        .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.bind, "0.0.0.0");
        assert_eq!(config.dingtalk.base_url, "http://127.0.0.1:1234/");
        assert_eq!(config.dingtalk.timeout(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn cli_overrides_replace_only_given_fields() {
        let mut server = ServerConfig {
            port: 9000,
            bind: "10.0.0.1".to_string(),
        };
        server.apply_overrides(None, None);
        assert_eq!(server.bind_addr(), "10.0.0.1:9000");

        server.apply_overrides(Some(7070), None);
        assert_eq!(server.bind_addr(), "10.0.0.1:7070");

        server.apply_overrides(None, Some("127.0.0.1".to_string()));
        assert_eq!(server.bind_addr(), "127.0.0.1:7070");
    }

    #[test]
    fn base_url_env_wins_and_trailing_slash_is_trimmed() {
        assert_eq!(
            pick_base_url(None, "https://oapi.dingtalk.com/"),
            "https://oapi.dingtalk.com"
        );
        assert_eq!(
            pick_base_url(Some("http://127.0.0.1:9/"), "https://oapi.dingtalk.com"),
            "http://127.0.0.1:9"
        );
        assert_eq!(
            pick_base_url(Some("  "), "https://oapi.dingtalk.com"),
            "https://oapi.dingtalk.com"
        );
    }

    // The only test in this binary that touches DINGTALK_API_BASE.
    #[test]
    fn resolve_dingtalk_base_url_reads_env() {
        let saved = std::env::var(DINGTALK_API_BASE_ENV).ok();
        let mut config = Config::default();
        config.dingtalk.base_url = "http://from-file.example//".to_string();

        std::env::set_var(DINGTALK_API_BASE_ENV, "http://from-env.example/");
        let overridden = resolve_dingtalk_base_url(&config);
        std::env::remove_var(DINGTALK_API_BASE_ENV);
        let from_file = resolve_dingtalk_base_url(&config);

        if let Some(v) = saved {
            std::env::set_var(DINGTALK_API_BASE_ENV, v);
        }
        assert_eq!(overridden, "http://from-env.example");
        assert_eq!(from_file, "http://from-file.example");
    }

    #[test]
    fn load_config_missing_file_is_default() {
        let path = std::env::temp_dir().join("dingrelay-config-test-does-not-exist.json");
        let (config, used) = load_config(Some(path.clone())).unwrap();
        assert_eq!(used, path);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn load_config_rejects_malformed_file() {
        let path = std::env::temp_dir().join(format!(
            "dingrelay-config-test-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, b"{ not json").unwrap();
        let result = load_config(Some(path.clone()));
        let _ = std::fs::remove_file(&path);
        assert!(result.is_err());
    }
}
