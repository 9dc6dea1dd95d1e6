use std::{fs, path::Path};

use cl_structure::{MAX_TICK, MIN_TICK, Tick};
use eyre::{WrapErr, ensure};
use serde::{Deserialize, Serialize};

/// How a crossed tick refreshes `seconds_inactive`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecondsInactiveMode {
    /// Full age of the pool at the time of the crossing.
    #[default]
    PoolAge,
    /// Pool age minus the value recorded by the previous crossing.
    SinceLastCross
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub min_tick:              Tick,
    pub max_tick:              Tick,
    pub seconds_inactive_mode: SecondsInactiveMode,
    pub metrics_enabled:       bool
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            min_tick:              MIN_TICK,
            max_tick:              MAX_TICK,
            seconds_inactive_mode: SecondsInactiveMode::default(),
            metrics_enabled:       true
        }
    }
}

impl LedgerConfig {
    pub fn from_json_str(raw: &str) -> eyre::Result<Self> {
        let config: Self = serde_json::from_str(raw).wrap_err("invalid ledger config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read ledger config {}", path.display()))?;
        Self::from_json_str(&raw)
    }

    pub fn with_tick_bounds(mut self, min_tick: Tick, max_tick: Tick) -> Self {
        self.min_tick = min_tick;
        self.max_tick = max_tick;
        self
    }

    pub fn with_seconds_inactive_mode(mut self, mode: SecondsInactiveMode) -> Self {
        self.seconds_inactive_mode = mode;
        self
    }

    pub fn with_metrics(mut self, enabled: bool) -> Self {
        self.metrics_enabled = enabled;
        self
    }

    pub fn validate(&self) -> eyre::Result<()> {
        ensure!(
            self.min_tick < self.max_tick,
            "min_tick {} must be below max_tick {}",
            self.min_tick,
            self.max_tick
        );
        ensure!(
            self.min_tick >= MIN_TICK && self.max_tick <= MAX_TICK,
            "tick bounds [{}, {}] exceed the supported range [{MIN_TICK}, {MAX_TICK}]",
            self.min_tick,
            self.max_tick
        );
        Ok(())
    }
}
