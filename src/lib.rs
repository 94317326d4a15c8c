//! Accessibility-tree snapshot tools for AI agents
//!
//! Builds pruned, LLM-readable snapshots of a page's accessibility tree and
//! waits for text to appear on a page before re-snapshotting, via chromiumoxide.

pub mod browser;
mod browser_setup;
pub mod response;
pub mod snapshot;
pub mod tools;
mod utils;
pub mod wait;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::snapshot::{FilterPolicy, PolicyError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub browser: BrowserConfig,

    #[serde(default)]
    pub wait: WaitConfig,

    #[serde(default)]
    pub snapshot: SnapshotConfig,
}

/// Browser launch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Run browser in headless mode
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Disable web security features (Same-Origin Policy, etc.)
    /// WARNING: Only enable for trusted content
    #[serde(default = "default_disable_security")]
    pub disable_security: bool,

    /// Window dimensions
    #[serde(default)]
    pub window: WindowConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_window_width")]
    pub width: u32,

    #[serde(default = "default_window_height")]
    pub height: u32,
}

/// Polling and timeout settings for `wait_for`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaitConfig {
    /// Used when the caller omits `timeout`
    #[serde(default = "default_wait_timeout_ms")]
    pub default_timeout_ms: u64,

    /// Upper bound accepted from callers
    #[serde(default = "default_max_wait_timeout_ms")]
    pub max_timeout_ms: u64,

    #[serde(default = "default_initial_poll_interval_ms")]
    pub initial_poll_interval_ms: u64,

    #[serde(default = "default_max_poll_interval_ms")]
    pub max_poll_interval_ms: u64,
}

/// Snapshot policy defaults offered to hosts.
///
/// The filter itself never applies these; a host that wants the product
/// default passes `default_policy()` explicitly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotConfig {
    #[serde(default = "default_ignore_roles")]
    pub default_ignore_roles: Vec<String>,
}

fn default_headless() -> bool {
    true
}

fn default_disable_security() -> bool {
    false // SECURE BY DEFAULT
}

fn default_window_width() -> u32 {
    1280
}

fn default_window_height() -> u32 {
    720
}

fn default_wait_timeout_ms() -> u64 {
    30_000
}

fn default_max_wait_timeout_ms() -> u64 {
    300_000
}

fn default_initial_poll_interval_ms() -> u64 {
    50
}

fn default_max_poll_interval_ms() -> u64 {
    250
}

fn default_ignore_roles() -> Vec<String> {
    vec!["none".to_string(), "option".to_string()]
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: default_headless(),
            disable_security: default_disable_security(),
            window: WindowConfig::default(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: default_window_width(),
            height: default_window_height(),
        }
    }
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: default_wait_timeout_ms(),
            max_timeout_ms: default_max_wait_timeout_ms(),
            initial_poll_interval_ms: default_initial_poll_interval_ms(),
            max_poll_interval_ms: default_max_poll_interval_ms(),
        }
    }
}

impl WaitConfig {
    pub fn initial_poll_interval(&self) -> Duration {
        Duration::from_millis(self.initial_poll_interval_ms.max(1))
    }

    pub fn max_poll_interval(&self) -> Duration {
        Duration::from_millis(self.max_poll_interval_ms.max(self.initial_poll_interval_ms).max(1))
    }
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            default_ignore_roles: default_ignore_roles(),
        }
    }
}

impl SnapshotConfig {
    /// Build the configured default policy (ignore only, nothing preserved)
    pub fn default_policy(&self) -> Result<FilterPolicy, PolicyError> {
        FilterPolicy::new(&self.default_ignore_roles, std::iter::empty::<&str>())
    }
}

/// Load config from config.yaml in package root
pub fn load_yaml_config() -> anyhow::Result<Config> {
    let config_path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config.yaml");
    load_yaml_config_from(&config_path)
}

/// Load config from an explicit path, falling back to defaults when absent
pub fn load_yaml_config_from(config_path: &Path) -> anyhow::Result<Config> {
    if config_path.exists() {
        let contents = fs::read_to_string(config_path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    } else {
        Ok(Config::default())
    }
}

pub use browser::{BrowserWrapper, PageSession, launch_browser};
pub use response::ToolResponse;
pub use snapshot::{
    SnapshotError, SnapshotNode, SnapshotOptions, SnapshotSource, build_filtered_snapshot,
    filter_snapshot, format_snapshot,
};
pub use tools::{TakeSnapshotTool, Tool, ToolCategory, WaitForTool};
pub use utils::{ToolError, validate_wait_timeout};
pub use wait::{TextSampler, TextWaiter, WaitError, WaitOutcome, WaitSpec, await_text};
