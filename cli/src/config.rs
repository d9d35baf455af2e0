use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use market::indodax::client::DEFAULT_BASE_URL;
use monitor::{EngineConfig, Thresholds};
use notify::telegram::DEFAULT_API_URL;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Bot configuration as stored in `config.json`.
///
/// The first seven keys are required. The rest fall back to the defaults the
/// bot has always run with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub bot_token: String,
    #[serde(deserialize_with = "string_or_number")]
    pub chat_id: String,
    pub threshold_percent: f64,
    pub threshold_price_idr: f64,
    pub threshold_volume_change: f64,
    /// Price-change detector interval, seconds.
    pub interval: f64,
    /// Carried for compatibility; no rule reads it.
    pub volume_threshold: f64,

    #[serde(default = "default_pump_dump_threshold")]
    pub pump_dump_threshold: f64,
    #[serde(default = "default_pump_dump_volume_change")]
    pub pump_dump_volume_change: f64,
    #[serde(default = "default_pump_dump_interval")]
    pub pump_dump_interval: f64,
    #[serde(default = "default_pump_dump_window_minutes")]
    pub pump_dump_window_minutes: u64,
    #[serde(default = "default_maintenance_interval")]
    pub maintenance_interval: f64,
    #[serde(default = "default_restart_backoff")]
    pub restart_backoff: f64,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_telegram_api_url")]
    pub telegram_api_url: String,
}

fn default_pump_dump_threshold() -> f64 {
    20.0
}

fn default_pump_dump_volume_change() -> f64 {
    10_000_000.0
}

fn default_pump_dump_interval() -> f64 {
    10.0
}

fn default_pump_dump_window_minutes() -> u64 {
    240
}

fn default_maintenance_interval() -> f64 {
    30.0
}

fn default_restart_backoff() -> f64 {
    30.0
}

fn default_api_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_telegram_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn seconds(key: &str, secs: f64) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f64(secs).map_err(|e| {
        ConfigError::Invalid(format!("{key} is not a usable number of seconds: {e}"))
    })
}

// only reached after `validate`
fn duration_or_zero(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or_default()
}

// older files store the chat id as a number
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s.trim().to_string()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "chat_id must be a string or a number, got {other}"
        ))),
    }
}

impl AppConfig {
    /// Config holding the required keys and defaults for everything else.
    pub fn with_required(
        bot_token: String,
        chat_id: String,
        threshold_percent: f64,
        threshold_price_idr: f64,
        threshold_volume_change: f64,
        interval: f64,
        volume_threshold: f64,
    ) -> Self {
        Self {
            bot_token,
            chat_id,
            threshold_percent,
            threshold_price_idr,
            threshold_volume_change,
            interval,
            volume_threshold,
            pump_dump_threshold: default_pump_dump_threshold(),
            pump_dump_volume_change: default_pump_dump_volume_change(),
            pump_dump_interval: default_pump_dump_interval(),
            pump_dump_window_minutes: default_pump_dump_window_minutes(),
            maintenance_interval: default_maintenance_interval(),
            restart_backoff: default_restart_backoff(),
            api_base_url: default_api_base_url(),
            telegram_api_url: default_telegram_api_url(),
        }
    }

    /// `Ok(None)` when the file does not exist.
    pub fn load(path: &Path) -> Result<Option<Self>, ConfigError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        Ok(Some(Self::from_json(&raw)?))
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let raw = serde_json::to_string_pretty(self)?;
        fs::write(path, raw).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// `XYRA_BOT_TOKEN`, `XYRA_CHAT_ID` and `XYRA_API_BASE` win over the file.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(token) = lookup("XYRA_BOT_TOKEN") {
            self.bot_token = token;
        }
        if let Some(chat_id) = lookup("XYRA_CHAT_ID") {
            self.chat_id = chat_id;
        }
        if let Some(base) = lookup("XYRA_API_BASE") {
            self.api_base_url = base;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bot_token.trim().is_empty() {
            return Err(ConfigError::Invalid("bot_token is empty".into()));
        }
        if self.chat_id.parse::<i64>().is_err() {
            return Err(ConfigError::Invalid(format!(
                "chat_id must be numeric, got {:?}",
                self.chat_id
            )));
        }

        let thresholds = [
            ("threshold_percent", self.threshold_percent),
            ("threshold_price_idr", self.threshold_price_idr),
            ("threshold_volume_change", self.threshold_volume_change),
            ("volume_threshold", self.volume_threshold),
            ("pump_dump_threshold", self.pump_dump_threshold),
            ("pump_dump_volume_change", self.pump_dump_volume_change),
        ];
        for (key, value) in thresholds {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{key} must be a non-negative number"
                )));
            }
        }

        let intervals = [
            ("interval", self.interval),
            ("pump_dump_interval", self.pump_dump_interval),
            ("maintenance_interval", self.maintenance_interval),
        ];
        for (key, secs) in intervals {
            if secs <= 0.0 {
                return Err(ConfigError::Invalid(format!("{key} must be greater than zero")));
            }
            seconds(key, secs)?;
        }
        seconds("restart_backoff", self.restart_backoff)?;

        if self.pump_dump_window_minutes == 0 {
            return Err(ConfigError::Invalid(
                "pump_dump_window_minutes must be greater than zero".into(),
            ));
        }
        self.pump_dump_window_minutes
            .checked_mul(60)
            .ok_or_else(|| ConfigError::Invalid("pump_dump_window_minutes is too large".into()))?;
        Ok(())
    }

    pub fn admin_chat_id(&self) -> Option<i64> {
        self.chat_id.parse().ok()
    }

    pub fn restart_backoff(&self) -> Duration {
        duration_or_zero(self.restart_backoff)
    }

    /// Both detectors share the price floor.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            price_change: Thresholds {
                percent: self.threshold_percent,
                volume_change: self.threshold_volume_change,
                price_floor: self.threshold_price_idr,
            },
            price_change_interval: duration_or_zero(self.interval),
            pump_dump: Thresholds {
                percent: self.pump_dump_threshold,
                volume_change: self.pump_dump_volume_change,
                price_floor: self.threshold_price_idr,
            },
            pump_dump_interval: duration_or_zero(self.pump_dump_interval),
            pump_dump_window: Duration::from_secs(self.pump_dump_window_minutes.saturating_mul(60)),
            maintenance_interval: duration_or_zero(self.maintenance_interval),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    const MINIMAL: &str = r#"{
        "bot_token": "123:abc",
        "chat_id": -1001234,
        "threshold_percent": 5,
        "threshold_price_idr": 25,
        "threshold_volume_change": 500000000,
        "interval": 30,
        "volume_threshold": 300000000
    }"#;

    #[test]
    fn required_keys_with_defaults_for_the_rest() {
        let cfg = AppConfig::from_json(MINIMAL).unwrap();

        assert_eq!(cfg.chat_id, "-1001234");
        assert_eq!(cfg.pump_dump_threshold, 20.0);
        assert_eq!(cfg.pump_dump_window_minutes, 240);
        assert_eq!(cfg.api_base_url, "https://indodax.com");
        cfg.validate().unwrap();

        let engine = cfg.engine_config();
        assert_eq!(engine.price_change_interval, Duration::from_secs(30));
        assert_eq!(engine.pump_dump_interval, Duration::from_secs(10));
        assert_eq!(engine.pump_dump_window, Duration::from_secs(240 * 60));
        assert_eq!(engine.pump_dump.price_floor, 25.0);
        assert_eq!(engine.pump_dump.volume_change, 10_000_000.0);
    }

    #[test]
    fn missing_required_key_is_rejected() {
        let raw = MINIMAL.replace(r#""volume_threshold": 300000000"#, r#""unused": 1"#);
        assert!(matches!(AppConfig::from_json(&raw), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn overrides_replace_non_empty_values_only() {
        let mut cfg = AppConfig::from_json(MINIMAL).unwrap();
        let env: HashMap<&str, &str> =
            [("XYRA_BOT_TOKEN", "999:zzz"), ("XYRA_CHAT_ID", "  ")].into();

        cfg.apply_overrides(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(cfg.bot_token, "999:zzz");
        assert_eq!(cfg.chat_id, "-1001234");
    }

    #[test]
    fn validation_catches_bad_values() {
        let mut cfg = AppConfig::from_json(MINIMAL).unwrap();
        cfg.interval = 0.0;
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));

        let mut cfg = AppConfig::from_json(MINIMAL).unwrap();
        cfg.chat_id = "@channel".into();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn oversized_durations_are_rejected_not_panicking() {
        let raw = MINIMAL.replace(r#""interval": 30"#, r#""interval": 1e20"#);
        let cfg = AppConfig::from_json(&raw).unwrap();
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(m)) if m.contains("interval")));

        let mut cfg = AppConfig::from_json(MINIMAL).unwrap();
        cfg.restart_backoff = f64::INFINITY;
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));

        let mut cfg = AppConfig::from_json(MINIMAL).unwrap();
        cfg.pump_dump_window_minutes = u64::MAX;
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn save_then_load_preserves_values() {
        let path = std::env::temp_dir().join(format!("xyrabot-config-{}.json", std::process::id()));
        let cfg = AppConfig::with_required("t".into(), "42".into(), 5.0, 25.0, 1e6, 30.0, 3e8);

        cfg.save(&path).unwrap();
        let loaded = AppConfig::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded, Some(cfg));
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let path = std::env::temp_dir().join("xyrabot-definitely-missing.json");
        assert!(AppConfig::load(&path).unwrap().is_none());
    }
}
