use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::demo::DemoPage;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: General,
    pub scheduler: SchedulerConfig,
    pub notifications: NotificationConfig,
    pub demo: DemoConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct General {
    pub log_level: String,
}

impl Default for General {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Countdown timer settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Interval between countdown refreshes
    pub tick_interval_ms: u64,
    /// End-time countdowns below this are flagged urgent
    pub urgent_threshold_secs: i64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            urgent_threshold_secs: 3600,
        }
    }
}

impl SchedulerConfig {
    pub fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.tick_interval_ms.max(1))
    }

    pub fn urgent_threshold(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.urgent_threshold_secs)
    }
}

/// How long transient messages stay on the page.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub listing_message_secs: i64,
    pub system_message_secs: i64,
    /// How often expired messages are looked for
    pub sweep_interval_ms: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            listing_message_secs: 3,
            system_message_secs: 5,
            sweep_interval_ms: 250,
        }
    }
}

impl NotificationConfig {
    pub fn listing_message_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.listing_message_secs)
    }

    pub fn system_message_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.system_message_secs)
    }

    pub fn sweep_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.sweep_interval_ms.max(1))
    }
}

/// Demo binary behaviour.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Preview template to render
    pub page: DemoPage,
    /// Replay the scripted bidding session
    pub script: bool,
    /// Delay between scripted steps
    pub step_interval_ms: u64,
    /// Read JSON commands from stdin
    pub console: bool,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            page: DemoPage::Gallery,
            script: true,
            step_interval_ms: 2500,
            console: true,
        }
    }
}

impl DemoConfig {
    pub fn step_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.step_interval_ms)
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Like [`Config::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}
