use anyhow::{Context, bail};
use daw_core::{ActivityStyle, AppMatcher, MonitorConfig, Timing};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

const APP_DIR: &str = "ableton-rpc";
const CONFIG_FILE: &str = "config.toml";
/// Written by the old setup window as `KEY=VALUE` lines.
const LEGACY_CONFIG_FILE: &str = "config.txt";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Discord application client id.
    pub client_id: String,
    /// Where the Live script writes the current project.
    pub status_file: Option<PathBuf>,
    pub poll_interval_secs: u64,
    pub cooldown_secs: u64,
    pub debounce_ms: u64,
    pub retry_backoff_secs: u64,
    pub clear_on_launch: bool,
    pub restart_timer_per_project: bool,
    pub process_names: Vec<String>,
    pub process_prefixes: Vec<String>,
    /// Only track the Live copy installed under this path.
    pub installation: Option<PathBuf>,
    pub large_image: String,
    pub large_text: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        let timing = Timing::default();
        let matcher = AppMatcher::default();
        let style = ActivityStyle::default();

        Self {
            client_id: String::new(),
            status_file: None,
            poll_interval_secs: timing.poll_interval.as_secs(),
            cooldown_secs: timing.cooldown.as_secs(),
            debounce_ms: timing.debounce.as_millis() as u64,
            retry_backoff_secs: timing.retry_backoff.as_secs(),
            clear_on_launch: true,
            restart_timer_per_project: false,
            process_names: matcher.names,
            process_prefixes: matcher.prefixes,
            installation: None,
            large_image: style.large_image,
            large_text: style.large_text,
        }
    }
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load from `path`, falling back to the legacy `config.txt` next to it
    /// and then to defaults. Broken files are logged, not fatal.
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => config,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "invalid config file, using defaults");
                    Self::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let legacy = path.with_file_name(LEGACY_CONFIG_FILE);
                match fs::read_to_string(&legacy) {
                    Ok(contents) => {
                        debug!(path = %legacy.display(), "using legacy config");
                        Self::from_legacy(&contents)
                    }
                    Err(_) => Self::default(),
                }
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable config file, using defaults");
                Self::default()
            }
        }
    }

    /// Parse the `CLIENT_ID=` / `LOG_PATH=` format.
    pub fn from_legacy(contents: &str) -> Self {
        let mut config = Self::default();
        for line in contents.lines() {
            let Some((key, value)) = line.trim().split_once('=') else {
                continue;
            };
            let value = value.trim();
            match key.trim() {
                "CLIENT_ID" => config.client_id = value.to_string(),
                "LOG_PATH" if !value.is_empty() => config.status_file = Some(PathBuf::from(value)),
                _ => {}
            }
        }
        config
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let contents = toml::to_string_pretty(self).context("failed to serialize config")?;
        fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
    }

    pub fn client_id(&self) -> anyhow::Result<&str> {
        let id = self.client_id.trim();
        if id.is_empty() {
            bail!("no Discord client id configured; set `client_id` or pass --client-id");
        }
        Ok(id)
    }

    pub fn monitor_config(&self) -> anyhow::Result<MonitorConfig> {
        let Some(status_file) = &self.status_file else {
            bail!("no status file configured; set `status_file` or pass --status-file");
        };

        let mut matcher = AppMatcher {
            names: self.process_names.clone(),
            prefixes: self.process_prefixes.clone(),
            installation: None,
        };
        if let Some(installation) = &self.installation {
            matcher = matcher.with_installation(installation);
        }

        Ok(MonitorConfig {
            status_file: status_file.clone(),
            matcher,
            timing: Timing {
                poll_interval: Duration::from_secs(self.poll_interval_secs.max(1)),
                cooldown: Duration::from_secs(self.cooldown_secs),
                debounce: Duration::from_millis(self.debounce_ms),
                retry_backoff: Duration::from_secs(self.retry_backoff_secs.max(1)),
                ..Timing::default()
            },
            clear_on_launch: self.clear_on_launch,
            restart_timer_per_project: self.restart_timer_per_project,
            style: ActivityStyle {
                large_image: self.large_image.clone(),
                large_text: self.large_text.clone(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            client_id = "1180000000000000000"
            status_file = "/Volumes/Charidrive/rpctemp/CurrentProjectLog.txt"
            poll_interval_secs = 1
            "#,
        )
        .expect("parse");

        assert_eq!(config.client_id, "1180000000000000000");
        assert_eq!(config.poll_interval_secs, 1);
        assert_eq!(config.cooldown_secs, 5);
        assert!(config.clear_on_launch);
        assert_eq!(config.process_names, vec!["Live", "Ableton Live"]);
        assert_eq!(config.large_image, "ableton_image");
    }

    #[test]
    fn test_legacy_config_parse() {
        let config = Config::from_legacy("CLIENT_ID=12345\nLOG_PATH=/tmp/rpc/log.txt\nJUNK\n");

        assert_eq!(config.client_id, "12345");
        assert_eq!(config.status_file, Some(PathBuf::from("/tmp/rpc/log.txt")));
    }

    #[test]
    fn test_load_from_prefers_toml_then_legacy() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);

        assert_eq!(Config::load_from(&path), Config::default());

        fs::write(dir.path().join(LEGACY_CONFIG_FILE), "CLIENT_ID=legacy\n").expect("write");
        assert_eq!(Config::load_from(&path).client_id, "legacy");

        fs::write(&path, "client_id = \"toml\"\n").expect("write");
        assert_eq!(Config::load_from(&path).client_id, "toml");
    }

    #[test]
    fn test_load_from_invalid_toml_uses_defaults() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "client_id = [not toml").expect("write");

        assert_eq!(Config::load_from(&path), Config::default());
    }

    #[test]
    fn test_save_creates_directory_and_reloads() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("nested").join(CONFIG_FILE);
        let config = Config {
            client_id: "42".to_string(),
            status_file: Some(PathBuf::from("/tmp/log.txt")),
            restart_timer_per_project: true,
            ..Config::default()
        };

        config.save_to(&path).expect("save");

        assert_eq!(Config::load_from(&path), config);
    }

    #[test]
    fn test_client_id_required() {
        assert!(Config::default().client_id().is_err());

        let config = Config {
            client_id: "  99 ".to_string(),
            ..Config::default()
        };
        assert_eq!(config.client_id().expect("id"), "99");
    }

    #[test]
    fn test_monitor_config_requires_status_file() {
        assert!(Config::default().monitor_config().is_err());
    }

    #[test]
    fn test_monitor_config_conversion() {
        let config = Config {
            status_file: Some(PathBuf::from("/tmp/log.txt")),
            poll_interval_secs: 0,
            debounce_ms: 250,
            installation: Some(PathBuf::from("/Applications/Ableton Live 12 Suite.app")),
            large_text: None,
            ..Config::default()
        };

        let monitor = config.monitor_config().expect("monitor config");

        assert_eq!(monitor.status_file, PathBuf::from("/tmp/log.txt"));
        assert_eq!(monitor.timing.poll_interval, Duration::from_secs(1));
        assert_eq!(monitor.timing.debounce, Duration::from_millis(250));
        assert_eq!(
            monitor.matcher.installation(),
            Some(Path::new("/Applications/Ableton Live 12 Suite.app"))
        );
        assert_eq!(monitor.style.large_text, None);
        assert!(monitor.clear_on_launch);
    }
}
