use std::{
    collections::BTreeMap,
    net::SocketAddr,
    sync::{Arc, OnceLock}
};

use dashmap::DashMap;

/// Source label for values whose origin address is not known.
pub const UNKNOWN_SOURCE: &str = "IP_UNKNOWN";

static GLOBAL: OnceLock<Arc<Metrics>> = OnceLock::new();

/// Additive counters grouped by source then metric name.
#[derive(Debug, Default)]
pub struct Metrics {
    values: DashMap<String, BTreeMap<String, f64>>
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `metrics` the process-wide instance. Fails, handing it back, if
    /// one was already installed or handed out.
    pub fn install(metrics: Arc<Metrics>) -> Result<(), Arc<Metrics>> {
        GLOBAL.set(metrics)
    }

    pub fn global() -> Arc<Metrics> {
        GLOBAL.get_or_init(|| Arc::new(Metrics::new())).clone()
    }

    pub fn record_value(&self, source: &str, name: &str, value: f64) {
        *self
            .values
            .entry(source.to_string())
            .or_default()
            .entry(name.to_string())
            .or_default() += value;
    }

    /// Every non-zero value, printed with 18 decimals minus trailing zeros.
    pub fn values(&self) -> BTreeMap<String, BTreeMap<String, String>> {
        self.values
            .iter()
            .map(|entry| {
                let formatted = entry
                    .value()
                    .iter()
                    .filter(|(_, value)| **value != 0.0)
                    .map(|(name, value)| (name.clone(), format_value(*value)))
                    .collect();
                (entry.key().clone(), formatted)
            })
            .collect()
    }

    pub fn reset(&self) {
        self.values.clear();
    }
}

fn format_value(value: f64) -> String {
    format!("{value:.18}")
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

pub fn source_of(addr: Option<&SocketAddr>) -> String {
    match addr {
        Some(addr) => addr.ip().to_string(),
        None => UNKNOWN_SOURCE.to_string()
    }
}
