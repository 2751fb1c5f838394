use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::core::errors::{ReconcileError, Result};
use crate::core::models::desired_state::{DesiredState, KeySource, KeyType};
use crate::core::models::endpoint::{Endpoint, normalize_servers};
use crate::core::services::retry_executor::RetryPolicy;

/// Keyserver used when none is configured.
pub const DEFAULT_SERVER: &str = "keys.openpgp.org";
pub const DEFAULT_TRIES: u32 = 3;
pub const DEFAULT_DELAY_SECS: f64 = 0.5;
pub const DEFAULT_GPG_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_GPG: &str = "gpg";

/// One layer of raw, unvalidated settings.
///
/// Layers come from the TOML config file and from the command line and are
/// merged before validation. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigLayer {
    pub key_id: Option<String>,
    pub key_file: Option<PathBuf>,
    pub key_type: Option<KeyType>,
    pub state: Option<DesiredState>,
    pub servers: Option<Vec<String>>,
    pub tries: Option<u32>,
    /// Seconds between failed attempts.
    pub delay: Option<f64>,
    /// Keyserver timeout in seconds, handed to gpg.
    pub gpg_timeout: Option<u64>,
    /// Binary name or path.
    pub gpg: Option<String>,
    pub trace_file: Option<PathBuf>,
    /// Only settable from the command line.
    #[serde(skip)]
    pub check_mode: Option<bool>,
}

impl ConfigLayer {
    /// Load a layer from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(ReconcileError::InvalidConfig {
                detail: format!("config file not found: {}", path.display()),
            });
        }
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| ReconcileError::InvalidConfig {
            detail: format!("failed to parse {}: {e}", path.display()),
        })
    }

    /// Merge two layers. Values set in `over` win.
    pub fn merge(self, over: Self) -> Self {
        Self {
            key_id: over.key_id.or(self.key_id),
            key_file: over.key_file.or(self.key_file),
            key_type: over.key_type.or(self.key_type),
            state: over.state.or(self.state),
            servers: over.servers.or(self.servers),
            tries: over.tries.or(self.tries),
            delay: over.delay.or(self.delay),
            gpg_timeout: over.gpg_timeout.or(self.gpg_timeout),
            gpg: over.gpg.or(self.gpg),
            trace_file: over.trace_file.or(self.trace_file),
            check_mode: over.check_mode.or(self.check_mode),
        }
    }
}

/// Validated settings for one run. Built once, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileConfig {
    pub key_id: Option<String>,
    pub key_file: Option<PathBuf>,
    pub key_type: KeyType,
    pub state: DesiredState,
    pub endpoints: Vec<Endpoint>,
    pub retry: RetryPolicy,
    pub gpg: String,
    pub check_mode: bool,
    pub trace_file: Option<PathBuf>,
}

impl ReconcileConfig {
    /// Validate a merged layer, filling in defaults.
    pub fn from_layer(layer: ConfigLayer) -> Result<Self> {
        let invalid = |detail: String| ReconcileError::InvalidConfig { detail };

        let key_id = layer.key_id.filter(|id| !id.trim().is_empty());
        let key_type = layer.key_type.unwrap_or_default();

        if key_id.is_none() && layer.key_file.is_none() {
            return Err(invalid("a key id or a key file is required".into()));
        }
        if key_type == KeyType::Public && layer.key_file.is_none() {
            return Err(invalid("key type 'public' requires a key file".into()));
        }
        if let Some(file) = &layer.key_file
            && !file.is_file()
        {
            return Err(invalid(format!("key file not found: {}", file.display())));
        }

        let tries = layer.tries.unwrap_or(DEFAULT_TRIES);
        if tries == 0 {
            return Err(invalid("tries must be at least 1".into()));
        }

        let delay = layer.delay.unwrap_or(DEFAULT_DELAY_SECS);
        let delay = Duration::try_from_secs_f64(delay).map_err(|e| {
            invalid(format!(
                "delay must be a non-negative number of seconds, got {delay} ({e})"
            ))
        })?;

        let timeout_secs = layer.gpg_timeout.unwrap_or(DEFAULT_GPG_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(invalid("gpg timeout must be at least 1 second".into()));
        }

        let servers = layer
            .servers
            .unwrap_or_else(|| vec![DEFAULT_SERVER.to_string()]);
        let servers: Vec<String> = servers
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if servers.is_empty() {
            return Err(invalid("at least one keyserver is required".into()));
        }

        Ok(Self {
            key_id,
            key_file: layer.key_file,
            key_type,
            state: layer.state.unwrap_or_default(),
            endpoints: normalize_servers(&servers),
            retry: RetryPolicy {
                tries,
                delay,
                timeout_secs,
            },
            gpg: layer.gpg.unwrap_or_else(|| DEFAULT_GPG.to_string()),
            check_mode: layer.check_mode.unwrap_or(false),
            trace_file: layer.trace_file,
        })
    }

    pub fn key_source(&self) -> KeySource {
        KeySource {
            key_type: self.key_type,
            from_file: self.key_file.is_some(),
        }
    }

    /// Label identifying the key in reports and the trace log.
    pub fn key_label(&self) -> String {
        match (&self.key_id, &self.key_file) {
            (Some(id), _) => id.clone(),
            (None, Some(file)) => file.display().to_string(),
            (None, None) => String::new(),
        }
    }
}
