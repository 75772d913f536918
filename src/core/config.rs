//! Runtime configuration.
//!
//! Values are layered: built-in defaults, then an optional TOML config file
//! (`config.toml` in the platform config directory for "sera"), then
//! environment variables. Every field has a default so both the client and
//! the relay run with no setup; only `serve` needs `GEMINI_API_KEY`.

use std::path::PathBuf;

use directories::ProjectDirs;
use serde::Deserialize;

use crate::relay::provider::DEFAULT_MODEL;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_RELAY_URL: &str = "http://localhost:5000";

/// On-disk shape of the config file. All keys optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub port: Option<u16>,
    pub relay_url: Option<String>,
    pub model: Option<String>,
    pub cors_allowed_origins: Option<String>,
    pub log_filter: Option<String>,
}

/// Fully-resolved configuration used by both entrypoints.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP port the relay binds (`PORT`).
    pub port: u16,
    /// Base URL the chat client uses to reach the relay (`SERA_API_URL`).
    pub relay_url: String,
    /// Gemini credential (`GEMINI_API_KEY`); never read from the config file.
    pub gemini_api_key: Option<String>,
    /// Gemini model identifier (`SERA_MODEL`).
    pub model: String,
    /// Comma-separated CORS origin allowlist (`SERA_CORS_ORIGINS`);
    /// absent means wildcard.
    pub cors_allowed_origins: Option<String>,
    /// `tracing` filter string (`SERA_LOG`), e.g. `"info"` or `"sera=debug"`.
    pub log_filter: String,
}

impl Config {
    /// Load configuration from the default config file and the process
    /// environment.
    pub fn load() -> Self {
        let file = config_file_path()
            .map(|path| FileConfig::read(&path))
            .unwrap_or_default();
        Self::resolve(file, &|key| std::env::var(key).ok())
    }

    /// Merge a parsed config file with an environment lookup. Split out from
    /// [`Config::load`] so tests can supply both layers.
    pub fn resolve(file: FileConfig, env: &dyn Fn(&str) -> Option<String>) -> Self {
        let port = env("PORT")
            .and_then(|v| v.parse().ok())
            .or(file.port)
            .unwrap_or(DEFAULT_PORT);
        Self {
            port,
            relay_url: env("SERA_API_URL")
                .or(file.relay_url)
                .unwrap_or_else(|| DEFAULT_RELAY_URL.to_string()),
            gemini_api_key: env("GEMINI_API_KEY").filter(|v| !v.is_empty()),
            model: env("SERA_MODEL")
                .or(file.model)
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            cors_allowed_origins: env("SERA_CORS_ORIGINS").or(file.cors_allowed_origins),
            log_filter: env("SERA_LOG")
                .or(file.log_filter)
                .unwrap_or_else(|| "info".to_string()),
        }
    }
}

impl FileConfig {
    /// Parse the config file, treating a missing or malformed file as empty.
    /// A malformed file is reported on stderr rather than aborting; the
    /// defaults still apply.
    pub fn read(path: &std::path::Path) -> Self {
        let Ok(contents) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        match toml::from_str(&contents) {
            Ok(parsed) => parsed,
            Err(e) => {
                eprintln!("warning: ignoring {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}

fn config_file_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "sera").map(|dirs| dirs.config_dir().join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_with_no_file_and_no_env() {
        let config = Config::resolve(FileConfig::default(), &|_| None);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.relay_url, DEFAULT_RELAY_URL);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert!(config.gemini_api_key.is_none());
        assert!(config.cors_allowed_origins.is_none());
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn env_overrides_file_values() {
        let file = FileConfig {
            port: Some(8080),
            relay_url: Some("http://file.example".into()),
            ..FileConfig::default()
        };
        let env = env_from(&[("PORT", "9000"), ("SERA_API_URL", "http://env.example")]);
        let config = Config::resolve(file, &env);
        assert_eq!(config.port, 9000);
        assert_eq!(config.relay_url, "http://env.example");
    }

    #[test]
    fn file_values_apply_when_env_is_absent() {
        let file = FileConfig {
            model: Some("gemini-2.0-flash".into()),
            log_filter: Some("sera=debug".into()),
            ..FileConfig::default()
        };
        let config = Config::resolve(file, &|_| None);
        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(config.log_filter, "sera=debug");
    }

    #[test]
    fn unparseable_port_env_falls_through() {
        let env = env_from(&[("PORT", "not-a-port")]);
        let config = Config::resolve(FileConfig::default(), &env);
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn empty_api_key_counts_as_unset() {
        let env = env_from(&[("GEMINI_API_KEY", "")]);
        let config = Config::resolve(FileConfig::default(), &env);
        assert!(config.gemini_api_key.is_none());
    }

    #[test]
    fn read_parses_a_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = 6001\nmodel = \"gemini-2.0-flash\"").unwrap();
        let parsed = FileConfig::read(file.path());
        assert_eq!(parsed.port, Some(6001));
        assert_eq!(parsed.model.as_deref(), Some("gemini-2.0-flash"));
    }

    #[test]
    fn read_treats_missing_file_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let parsed = FileConfig::read(&dir.path().join("nope.toml"));
        assert!(parsed.port.is_none());
    }

    #[test]
    fn read_ignores_a_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = [this is not toml").unwrap();
        let parsed = FileConfig::read(file.path());
        assert!(parsed.port.is_none());
    }
}
