use std::time::Duration;

use ambler_core::backfill::WalkerConfig;
use ambler_core::queue::RetentionPolicy;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Whether this process executes backfill tasks at all. Disabled, the
    /// process only seeds the queue and leaves the walking to designated
    /// consumer processes. Read once at startup.
    pub run_worker: bool,

    pub walker: WalkerSection,
    pub retention: RetentionSection,
    pub feed: FeedSection,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            run_worker: true,
            walker: WalkerSection::default(),
            retention: RetentionSection::default(),
            feed: FeedSection::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WalkerSection {
    pub page_size: u32,
    pub continuation_delay_ms: u64,
    pub fetch_timeout_secs: u64,
}

impl Default for WalkerSection {
    fn default() -> Self {
        Self {
            page_size: 2,
            continuation_delay_ms: 1000,
            fetch_timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetentionSection {
    pub max_completed: usize,
    pub max_failed: usize,
}

impl Default for RetentionSection {
    fn default() -> Self {
        Self {
            max_completed: 100,
            max_failed: 1000,
        }
    }
}

/// Shape of the simulated feed the demo walks.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedSection {
    /// Total pages of history available.
    pub pages: u32,
    /// Seconds of history each page spans.
    pub page_step_secs: u64,
    /// How far back the seeded chain should walk before stopping.
    pub backfill_window_secs: u64,
}

impl Default for FeedSection {
    fn default() -> Self {
        Self {
            pages: 8,
            page_step_secs: 3600,
            backfill_window_secs: 4 * 3600,
        }
    }
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        match std::fs::read_to_string(&path) {
            Ok(s) => Self::load_from_str(&s),
            // No config file is fine for the demo: run on defaults.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let config = Self::default();
                config.validate()?;
                Ok(config)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.walker.page_size > 0,
            "walker.page_size must be > 0, got {}",
            self.walker.page_size
        );
        anyhow::ensure!(
            self.walker.fetch_timeout_secs > 0,
            "walker.fetch_timeout_secs must be > 0, got {}",
            self.walker.fetch_timeout_secs
        );
        anyhow::ensure!(
            self.retention.max_completed > 0,
            "retention.max_completed must be > 0, got {}",
            self.retention.max_completed
        );
        anyhow::ensure!(
            self.retention.max_failed > 0,
            "retention.max_failed must be > 0, got {}",
            self.retention.max_failed
        );
        anyhow::ensure!(self.feed.pages > 0, "feed.pages must be > 0");
        anyhow::ensure!(
            self.feed.page_step_secs > 0,
            "feed.page_step_secs must be > 0"
        );
        Ok(())
    }

    pub fn walker_config(&self) -> WalkerConfig {
        WalkerConfig {
            page_size: self.walker.page_size,
            continuation_delay: Duration::from_millis(self.walker.continuation_delay_ms),
            fetch_timeout: Duration::from_secs(self.walker.fetch_timeout_secs),
        }
    }

    pub fn retention_policy(&self) -> RetentionPolicy {
        RetentionPolicy {
            max_completed: self.retention.max_completed,
            max_failed: self.retention.max_failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.run_worker);
        assert_eq!(config.walker_config().page_size, 2);
        assert_eq!(
            config.walker_config().continuation_delay,
            Duration::from_secs(1)
        );
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let config = AppConfig::load_from_str(
            r#"
            run_worker = false

            [walker]
            continuation_delay_ms = 250
            "#,
        )
        .unwrap();

        assert!(!config.run_worker);
        assert_eq!(config.walker.continuation_delay_ms, 250);
        assert_eq!(config.walker.page_size, 2);
        assert_eq!(config.retention.max_failed, 1000);
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let err = AppConfig::load_from_str(
            r#"
            [walker]
            page_size = 0
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("page_size"));
    }
}
