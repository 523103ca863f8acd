//! Collector configuration via `collector.toml`
//!
//! Every field has a default, so an empty file is a valid configuration.
//! `CollectorConfig::default_toml()` documents each setting.

use adcollector_core::{attrs, Error, Expr, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Config file name conventionally used by a collector daemon.
pub const CONFIG_FILE_NAME: &str = "collector.toml";

/// Upper bound for every interval and timeout setting (one year).
pub const MAX_INTERVAL_SECS: u64 = 365 * 24 * 60 * 60;

/// Collector configuration loaded from `collector.toml`.
///
/// # Example
///
/// ```toml
/// requirements = "MyType != \"Machine\" || Cpus > 0"
/// forward_filtering = true
/// update_interval_secs = 300
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// Admission expression every incoming ad must satisfy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirements: Option<String>,
    /// Attributes whose change forces an update to be forwarded.
    #[serde(default = "default_watch_list")]
    pub forward_watch_list: Vec<String>,
    /// Compute `ShouldForward` for startd and submitter updates.
    #[serde(default)]
    pub forward_filtering: bool,
    /// Forward at least this often even without watched changes.
    /// Defaults to a third of the update interval.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forward_interval_secs: Option<u64>,
    /// Keep at most one negotiator ad.
    #[serde(default)]
    pub allow_only_one_negotiator: bool,
    /// Store this many renamed copies of every startd update (load testing).
    #[serde(default)]
    pub repeat_startd_ads: u32,
    /// Default ad lifetime and housekeeping period.
    #[serde(default = "default_update_interval_secs")]
    pub update_interval_secs: u64,
    /// Overall time allowed to a peer.
    #[serde(default = "default_client_timeout_secs")]
    pub client_timeout_secs: u64,
    /// Time allowed for reading the ad that follows a command.
    #[serde(default = "default_read_timeout_secs")]
    pub read_timeout_secs: u64,
}

fn default_watch_list() -> Vec<String> {
    attrs::DEFAULT_FORWARD_WATCH_LIST
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_update_interval_secs() -> u64 {
    900
}

fn default_client_timeout_secs() -> u64 {
    20
}

fn default_read_timeout_secs() -> u64 {
    1
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            requirements: None,
            forward_watch_list: default_watch_list(),
            forward_filtering: false,
            forward_interval_secs: None,
            allow_only_one_negotiator: false,
            repeat_startd_ads: 0,
            update_interval_secs: default_update_interval_secs(),
            client_timeout_secs: default_client_timeout_secs(),
            read_timeout_secs: default_read_timeout_secs(),
        }
    }
}

impl CollectorConfig {
    /// Forward interval, explicit or derived from the update interval.
    pub fn forward_interval_secs(&self) -> u64 {
        self.forward_interval_secs
            .unwrap_or(self.update_interval_secs / 3)
    }

    /// Read timeout as a `Duration`.
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    /// Client timeout as a `Duration`.
    pub fn client_timeout(&self) -> Duration {
        Duration::from_secs(self.client_timeout_secs)
    }

    /// Parsed requirements expression, if configured.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidExpression` if the text does not parse.
    pub fn requirements_expr(&self) -> Result<Option<Expr>> {
        match &self.requirements {
            Some(text) => Ok(Some(text.parse::<Expr>()?)),
            None => Ok(None),
        }
    }

    /// Check settings that serde cannot.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` for out-of-range values and
    /// `Error::InvalidExpression` for an unparseable requirements expression.
    pub fn validate(&self) -> Result<()> {
        if self.client_timeout_secs == 0 {
            return Err(Error::config("client_timeout_secs must be greater than 0"));
        }
        if self.read_timeout_secs == 0 {
            return Err(Error::config("read_timeout_secs must be greater than 0"));
        }
        let intervals = [
            ("update_interval_secs", Some(self.update_interval_secs)),
            ("forward_interval_secs", self.forward_interval_secs),
            ("client_timeout_secs", Some(self.client_timeout_secs)),
            ("read_timeout_secs", Some(self.read_timeout_secs)),
        ];
        for (field, value) in intervals {
            if let Some(secs) = value.filter(|secs| *secs > MAX_INTERVAL_SECS) {
                return Err(Error::config(format!(
                    "{} must be at most {} (got {})",
                    field, MAX_INTERVAL_SECS, secs
                )));
            }
        }
        if let Some(bad) = self.forward_watch_list.iter().find(|a| a.trim().is_empty()) {
            return Err(Error::config(format!(
                "forward_watch_list contains an empty attribute name: {:?}",
                bad
            )));
        }
        self.requirements_expr()?;
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Ad collector configuration

# Admission expression evaluated against every incoming ad (default: none).
# Ads for which it is not true are rejected before they are stored.
# requirements = "MyType != \"Machine\" || Cpus > 0"

# Forwarding filter for startd and submitter updates (default: false).
forward_filtering = false
forward_watch_list = ["State", "Cpus", "Memory", "IdleJobs", "ClaimId", "Capability", "ClaimIdList", "ChildClaimIds"]
# forward_interval_secs = 300   # default: update_interval_secs / 3

# Keep at most one negotiator ad (default: false).
allow_only_one_negotiator = false

# Renamed copies stored for every startd update, for load testing (default: 0).
repeat_startd_ads = 0

# Default ad lifetime and housekeeping period (default: 900).
update_interval_secs = 900

# Peer timeouts (defaults: 20 and 1).
client_timeout_secs = 20
read_timeout_secs = 1
"#
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: CollectorConfig = toml::from_str(&content).map_err(|e| {
            Error::config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml())?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
