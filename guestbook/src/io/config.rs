//! Runtime configuration for the engagement pipeline.
//!
//! The display timings started life as constants tuned by eye (the highlight
//! window covers roughly two marquee loops); they are configuration here so
//! deployments can retune them without a rebuild. Missing fields default to
//! the tuned values.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// Guestbook configuration (TOML).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GuestbookConfig {
    /// Number of parallel marquee lanes on the wish wall.
    pub lane_count: usize,

    /// Seconds each new-wish popup stays on screen.
    pub popup_secs: u64,

    /// Seconds a newly arrived item keeps its highlight.
    pub highlight_secs: u64,

    /// Delay before resubscribing after a lost change feed.
    pub resubscribe_delay_ms: u64,

    /// Buffered events per session subscriber before it counts as lagged.
    pub event_capacity: usize,
}

impl Default for GuestbookConfig {
    fn default() -> Self {
        Self {
            lane_count: 3,
            popup_secs: 8,
            highlight_secs: 3 * 60,
            resubscribe_delay_ms: 750,
            event_capacity: 64,
        }
    }
}

impl GuestbookConfig {
    pub fn validate(&self) -> Result<()> {
        if self.lane_count == 0 {
            return Err(anyhow!("lane_count must be > 0"));
        }
        if self.popup_secs == 0 {
            return Err(anyhow!("popup_secs must be > 0"));
        }
        if self.highlight_secs == 0 {
            return Err(anyhow!("highlight_secs must be > 0"));
        }
        if self.event_capacity == 0 {
            return Err(anyhow!("event_capacity must be > 0"));
        }
        Ok(())
    }

    pub fn popup_duration(&self) -> Duration {
        Duration::from_secs(self.popup_secs)
    }

    pub fn highlight_window(&self) -> Duration {
        Duration::from_secs(self.highlight_secs)
    }

    pub fn resubscribe_delay(&self) -> Duration {
        Duration::from_millis(self.resubscribe_delay_ms)
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `GuestbookConfig::default()`.
pub fn load_config(path: &Path) -> Result<GuestbookConfig> {
    if !path.exists() {
        let cfg = GuestbookConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: GuestbookConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}
