//! Service settings and alert definitions
//!
//! Settings come from an optional TOML file with `HOUND__SECTION__KEY`
//! environment overrides. Alert definitions are a separate JSON file.

use alerting::{AlertDefinition, AlertError, Direction};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Default settings file location
const DEFAULT_CONFIG_PATH: &str = "config/hound.toml";

/// Settings loading errors
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid setting {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("cannot read alerts file {path}: {source}")]
    AlertsFile {
        path: String,
        source: std::io::Error,
    },

    #[error("cannot parse alerts file: {0}")]
    AlertsParse(#[from] serde_json::Error),

    #[error("alert {name}: {source}")]
    InvalidAlert { name: String, source: AlertError },
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphiteSettings {
    /// Render endpoint, e.g. `http://graphite.local/render/`
    pub base_url: String,
    /// Lookback window for the latest sample
    pub window: String,
    pub fetch_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CarbonSettings {
    /// Carbon line receiver; no export when unset
    pub address: Option<String>,
    pub metric_prefix: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmtpSettings {
    /// SMTP relay; notifications are only logged when unset
    pub server: Option<String>,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub from: String,
    pub email_on_error: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpSettings {
    pub bind_address: String,
    pub rate_limit_per_second: u64,
    pub rate_limit_burst: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
    pub format: LogFormat,
}

/// Service settings
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// JSON file with the alert definitions
    pub alerts_file: String,
    pub check_interval_secs: u64,
    /// Per-cycle budget for individual notifications of each category
    pub global_throttle: usize,
    /// Default recipient, also used for digests and error reports
    pub email_to: String,
    pub graphite: GraphiteSettings,
    pub carbon: CarbonSettings,
    pub smtp: SmtpSettings,
    pub http: HttpSettings,
    pub logging: LoggingSettings,
}

/// Settings file path from `HOUND_CONFIG`, or the default location
pub fn config_path() -> String {
    std::env::var("HOUND_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
}

impl Settings {
    /// Load settings from `config_path` (optional) with environment overrides,
    /// then validate them.
    pub fn from_file<P: AsRef<Path>>(config_path: P) -> Result<Self, SettingsError> {
        let settings: Settings = Config::builder()
            .set_default("alerts_file", "config/alerts.json")?
            .set_default("check_interval_secs", 300)?
            .set_default("global_throttle", 10)?
            .set_default("email_to", "")?
            .set_default("graphite.base_url", "")?
            .set_default("graphite.window", "10mins")?
            .set_default("graphite.fetch_timeout_secs", 10)?
            .set_default("carbon.metric_prefix", "hound.")?
            .set_default("carbon.timeout_secs", 5)?
            .set_default("smtp.port", 25)?
            .set_default("smtp.user", "")?
            .set_default("smtp.password", "")?
            .set_default("smtp.from", "hound@localhost")?
            .set_default("smtp.email_on_error", false)?
            .set_default("http.bind_address", "0.0.0.0:8080")?
            .set_default("http.rate_limit_per_second", 1)?
            .set_default("http.rate_limit_burst", 20)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .add_source(File::with_name(&config_path.as_ref().to_string_lossy()).required(false))
            .add_source(
                Environment::with_prefix("HOUND")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.global_throttle == 0 {
            return Err(SettingsError::Invalid {
                field: "global_throttle",
                reason: "must be at least 1".into(),
            });
        }
        if self.check_interval_secs == 0 {
            return Err(SettingsError::Invalid {
                field: "check_interval_secs",
                reason: "must be at least 1".into(),
            });
        }
        if self.graphite.base_url.trim().is_empty() {
            return Err(SettingsError::Invalid {
                field: "graphite.base_url",
                reason: "must be set".into(),
            });
        }
        if self.graphite.fetch_timeout_secs == 0 {
            return Err(SettingsError::Invalid {
                field: "graphite.fetch_timeout_secs",
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.graphite.fetch_timeout_secs)
    }
}

/// One entry of the alerts file.
///
/// Capitalised keys are accepted for older alert files.
#[derive(Debug, Clone, Deserialize)]
pub struct AlertEntry {
    #[serde(alias = "Name")]
    pub name: String,
    #[serde(alias = "Metric")]
    pub metric: String,
    #[serde(alias = "Threshold")]
    pub threshold: f64,
    #[serde(alias = "Direction")]
    pub direction: String,
    #[serde(default, alias = "EmailTo")]
    pub email_to: Option<String>,
    #[serde(default, alias = "RunBookLink")]
    pub runbook_link: Option<String>,
    #[serde(default, rename = "type", alias = "Type", alias = "kind")]
    pub kind: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AlertsFile {
    #[serde(alias = "Alerts")]
    alerts: Vec<AlertEntry>,
}

impl AlertEntry {
    /// Resolve the entry, falling back to `default_recipient` when it names none
    pub fn into_definition(
        self,
        default_recipient: &str,
    ) -> Result<AlertDefinition, SettingsError> {
        let direction: Direction = self
            .direction
            .parse()
            .map_err(|source| SettingsError::InvalidAlert {
                name: self.name.clone(),
                source,
            })?;

        let recipient = self
            .email_to
            .filter(|to| !to.trim().is_empty())
            .unwrap_or_else(|| default_recipient.to_string());

        Ok(AlertDefinition {
            name: self.name,
            metric: self.metric,
            kind: self.kind,
            threshold: self.threshold,
            direction,
            recipient,
            runbook_link: self.runbook_link.filter(|l| !l.trim().is_empty()),
        })
    }
}

/// Parse alert definitions from the JSON text of an alerts file
pub fn parse_alert_definitions(
    json: &str,
    default_recipient: &str,
) -> Result<Vec<AlertDefinition>, SettingsError> {
    let file: AlertsFile = serde_json::from_str(json)?;
    file.alerts
        .into_iter()
        .map(|entry| entry.into_definition(default_recipient))
        .collect()
}

/// Read and parse the alerts file at `path`
pub fn load_alert_definitions(
    path: &str,
    default_recipient: &str,
) -> Result<Vec<AlertDefinition>, SettingsError> {
    let json = std::fs::read_to_string(path).map_err(|source| SettingsError::AlertsFile {
        path: path.to_string(),
        source,
    })?;
    parse_alert_definitions(&json, default_recipient)
}
