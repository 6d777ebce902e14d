use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::facts::FactMode;
use crate::feed::DEFAULT_FEED_URL;

const DEFAULT_ENV_PREFIX: &str = "APOD_TUI";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub ui: UIConfig,
    #[serde(default)]
    pub facts: FactsConfig,
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeedConfig {
    #[serde(default = "default_feed_url")]
    pub url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_feed_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: default_feed_url(),
            user_agent: default_user_agent(),
            timeout: default_feed_timeout(),
        }
    }
}

fn default_feed_url() -> String {
    DEFAULT_FEED_URL.to_string()
}

fn default_user_agent() -> String {
    format!("apod-tui/{}", crate::VERSION)
}

fn default_feed_timeout() -> Duration {
    Duration::from_secs(20)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UIConfig {
    #[serde(default = "default_date_selector")]
    pub date_selector: bool,
    #[serde(default)]
    pub fetch_on_start: bool,
}

impl Default for UIConfig {
    fn default() -> Self {
        Self {
            date_selector: default_date_selector(),
            fetch_on_start: false,
        }
    }
}

fn default_date_selector() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FactsConfig {
    #[serde(default)]
    pub mode: FactMode,
    #[serde(default = "default_fact_transition", with = "humantime_serde")]
    pub transition: Duration,
}

impl Default for FactsConfig {
    fn default() -> Self {
        Self {
            mode: FactMode::default(),
            transition: default_fact_transition(),
        }
    }
}

fn default_fact_transition() -> Duration {
    Duration::from_millis(400)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerConfig {
    #[serde(default = "default_video_command")]
    pub video_command: Vec<String>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            video_command: default_video_command(),
        }
    }
}

fn default_video_command() -> Vec<String> {
    vec!["mpv".into(), "--really-quiet".into(), "%URL%".into()]
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogConfig {
    #[serde(default)]
    pub file: Option<PathBuf>,
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file: None,
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub config_file: Option<PathBuf>,
    pub env_prefix: Option<String>,
}

pub fn load(options: LoadOptions) -> Result<Config> {
    let mut cfg = Config::default();

    if let Some(path) = options.config_file.as_ref() {
        if path.exists() {
            let from_file = read_config_file(path)?;
            cfg = merge_config(cfg, from_file);
        }
    } else if let Some(default_path) = default_config_path() {
        if default_path.exists() {
            let from_file = read_config_file(&default_path)?;
            cfg = merge_config(cfg, from_file);
        }
    }

    let prefix = options.env_prefix.as_deref().unwrap_or(DEFAULT_ENV_PREFIX);
    cfg = merge_env(cfg, &env_values(prefix));

    Ok(cfg)
}

fn read_config_file(path: &Path) -> Result<Config> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file at {}", path.display()))?;
    let config: Config = serde_yaml::from_str(&data)
        .with_context(|| format!("Failed to parse config file at {}", path.display()))?;
    Ok(config)
}

fn merge_config(mut base: Config, other: Config) -> Config {
    if !other.feed.url.trim().is_empty() {
        base.feed.url = other.feed.url;
    }
    if !other.feed.user_agent.trim().is_empty() {
        base.feed.user_agent = other.feed.user_agent;
    }
    if !other.feed.timeout.is_zero() {
        base.feed.timeout = other.feed.timeout;
    }

    base.ui.date_selector = other.ui.date_selector;
    base.ui.fetch_on_start = other.ui.fetch_on_start;

    base.facts.mode = other.facts.mode;
    base.facts.transition = other.facts.transition;

    if !other.player.video_command.is_empty() {
        base.player.video_command = other.player.video_command;
    }

    if other.log.file.is_some() {
        base.log.file = other.log.file;
    }
    if !other.log.level.trim().is_empty() {
        base.log.level = other.log.level;
    }

    base
}

fn env_values(prefix: &str) -> HashMap<String, String> {
    let upper_prefix = format!("{}_", prefix.to_uppercase());
    env::vars()
        .filter_map(|(key, value)| {
            key.strip_prefix(&upper_prefix)
                .map(|stripped| (stripped.to_ascii_lowercase().replace("__", "."), value))
        })
        .collect()
}

fn merge_env(mut cfg: Config, values: &HashMap<String, String>) -> Config {
    for (key, value) in values {
        apply_env_value(&mut cfg, key, value.clone());
    }
    cfg
}

fn apply_env_value(cfg: &mut Config, key: &str, value: String) {
    match key {
        "feed.url" if !value.trim().is_empty() => cfg.feed.url = value,
        "feed.user_agent" if !value.trim().is_empty() => cfg.feed.user_agent = value,
        "feed.timeout" => {
            if let Ok(duration) = humantime::parse_duration(&value) {
                cfg.feed.timeout = duration;
            }
        }
        "ui.date_selector" => cfg.ui.date_selector = parse_bool(&value),
        "ui.fetch_on_start" => cfg.ui.fetch_on_start = parse_bool(&value),
        "facts.mode" => {
            if let Some(mode) = FactMode::parse(&value) {
                cfg.facts.mode = mode;
            }
        }
        "facts.transition" => {
            if let Ok(duration) = humantime::parse_duration(&value) {
                cfg.facts.transition = duration;
            }
        }
        "player.video_command" => {
            let command: Vec<String> = value
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if !command.is_empty() {
                cfg.player.video_command = command;
            }
        }
        "log.file" if !value.trim().is_empty() => cfg.log.file = Some(PathBuf::from(value)),
        "log.level" if !value.trim().is_empty() => cfg.log.level = value,
        _ => {}
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

pub fn default_path() -> Option<PathBuf> {
    default_config_path()
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("apod-tui").join("config.yaml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn isolated() -> LoadOptions {
        LoadOptions {
            config_file: Some(PathBuf::from("/nonexistent/apod-tui/config.yaml")),
            env_prefix: Some("APOD_TUI_TEST_UNUSED".into()),
        }
    }

    #[test]
    fn load_defaults_without_files() {
        let cfg = load(isolated()).unwrap();
        assert_eq!(cfg.feed.url, DEFAULT_FEED_URL);
        assert_eq!(cfg.feed.timeout, Duration::from_secs(20));
        assert!(cfg.ui.date_selector);
        assert!(!cfg.ui.fetch_on_start);
        assert_eq!(cfg.facts.mode, FactMode::OnDemand);
        assert_eq!(cfg.player.video_command[0], "mpv");
    }

    #[test]
    fn reads_yaml_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(
            &path,
            "feed:\n  url: http://localhost/feed.json\n  timeout: 5s\nui:\n  date_selector: false\nfacts:\n  mode: auto\n  transition: 250ms\n",
        )
        .unwrap();
        let cfg = load(LoadOptions {
            config_file: Some(path),
            env_prefix: Some("APOD_TUI_TEST_UNUSED".into()),
        })
        .unwrap();
        assert_eq!(cfg.feed.url, "http://localhost/feed.json");
        assert_eq!(cfg.feed.timeout, Duration::from_secs(5));
        assert_eq!(cfg.feed.user_agent, default_user_agent());
        assert!(!cfg.ui.date_selector);
        assert_eq!(cfg.facts.mode, FactMode::Auto);
        assert_eq!(cfg.facts.transition, Duration::from_millis(250));
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "feed: [unterminated").unwrap();
        assert!(load(LoadOptions {
            config_file: Some(path),
            env_prefix: None,
        })
        .is_err());
    }

    #[test]
    fn env_overrides() {
        let mut values = HashMap::new();
        values.insert("feed.url".to_string(), "http://env/feed.json".to_string());
        values.insert("facts.mode".to_string(), "off".to_string());
        values.insert("ui.date_selector".to_string(), "0".to_string());
        values.insert("player.video_command".to_string(), "vlc, %URL%".to_string());
        values.insert("feed.timeout".to_string(), "not a duration".to_string());
        let cfg = merge_env(Config::default(), &values);
        assert_eq!(cfg.feed.url, "http://env/feed.json");
        assert_eq!(cfg.facts.mode, FactMode::Off);
        assert!(!cfg.ui.date_selector);
        assert_eq!(cfg.player.video_command, vec!["vlc", "%URL%"]);
        assert_eq!(cfg.feed.timeout, default_feed_timeout());
    }

    #[test]
    fn env_prefix_is_stripped() {
        env::set_var("APOD_TUI_PREFIXTEST_LOG__LEVEL", "debug");
        let values = env_values("apod_tui_prefixtest");
        env::remove_var("APOD_TUI_PREFIXTEST_LOG__LEVEL");
        assert_eq!(values.get("log.level").map(String::as_str), Some("debug"));
    }
}
