use std::str::FromStr;

use crate::error::{HarnessError, Result};

pub const FIFO_DEPTH: usize = 32;
pub const DATA_WIDTH: u32 = 8;
pub const TEST_ITERS: usize = 100;
pub const WCLK_PERIOD_NS: u64 = 7;
pub const RCLK_PERIOD_NS: u64 = 13;
pub const SETTLE_EDGES: usize = 3;
/// Idle level of `i_wdata` between writes. Not all-zero so a stuck-at-zero
/// data path cannot pass unnoticed.
pub const WDATA_FILLER: u32 = 0xbe;

/// Knobs of one harness session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    pub depth: usize,
    pub data_width: u32,
    /// Stimulus length N; each phase runs N/2 iterations.
    pub iterations: usize,
    pub wclk_period_ns: u64,
    pub rclk_period_ns: u64,
    pub wclk_phase_ps: u64,
    pub rclk_phase_ps: u64,
    /// Rising edges waited on each domain before flags are trusted.
    pub settle_edges: usize,
    pub wdata_filler: u32,
    /// Stimulus seed; drawn from entropy when unset.
    pub seed: Option<u64>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            depth: FIFO_DEPTH,
            data_width: DATA_WIDTH,
            iterations: TEST_ITERS,
            wclk_period_ns: WCLK_PERIOD_NS,
            rclk_period_ns: RCLK_PERIOD_NS,
            wclk_phase_ps: 0,
            rclk_phase_ps: 0,
            settle_edges: SETTLE_EDGES,
            wdata_filler: WDATA_FILLER,
            seed: None,
        }
    }
}

impl HarnessConfig {
    /// Defaults overlaid with `AFIFO_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`HarnessConfig::from_env`] with an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(v) = parse_var(&lookup, "AFIFO_ITERS")? {
            config.iterations = v;
        }
        if let Some(v) = parse_var(&lookup, "AFIFO_SEED")? {
            config.seed = Some(v);
        }
        if let Some(v) = parse_var(&lookup, "AFIFO_WCLK_NS")? {
            config.wclk_period_ns = v;
        }
        if let Some(v) = parse_var(&lookup, "AFIFO_RCLK_NS")? {
            config.rclk_period_ns = v;
        }
        if let Some(v) = parse_var(&lookup, "AFIFO_SETTLE")? {
            config.settle_edges = v;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.depth < 2 || !self.depth.is_power_of_two() {
            return Err(HarnessError::config(format!(
                "depth {} is not a power of two >= 2",
                self.depth
            )));
        }
        if !(1..=32).contains(&self.data_width) {
            return Err(HarnessError::config(format!(
                "data width {} outside 1..=32",
                self.data_width
            )));
        }
        if self.wclk_period_ns == 0 || self.rclk_period_ns == 0 {
            return Err(HarnessError::config("clock periods must be non-zero"));
        }
        if self.settle_edges == 0 {
            return Err(HarnessError::config("settle edge count must be non-zero"));
        }
        if self.wdata_filler > self.data_mask() {
            return Err(HarnessError::config(format!(
                "filler {:#x} does not fit in {} bits",
                self.wdata_filler, self.data_width
            )));
        }
        Ok(())
    }

    /// Largest value representable on the data bus.
    pub fn data_mask(&self) -> u32 {
        if self.data_width >= 32 {
            u32::MAX
        } else {
            (1u32 << self.data_width) - 1
        }
    }

    /// Iterations per phase.
    pub fn phase_len(&self) -> usize {
        self.iterations / 2
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| HarnessError::config(format!("{key}={raw:?} is not a valid number"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = HarnessConfig::default();
        assert_eq!(config.depth, 32);
        assert_eq!(config.data_width, 8);
        assert_eq!(config.iterations, 100);
        assert_eq!(config.phase_len(), 50);
        assert_eq!(config.data_mask(), 0xff);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let config = HarnessConfig::from_lookup(lookup(&[
            ("AFIFO_ITERS", "40"),
            ("AFIFO_SEED", " 7 "),
            ("AFIFO_RCLK_NS", "11"),
        ]))
        .unwrap();
        assert_eq!(config.iterations, 40);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.rclk_period_ns, 11);
        assert_eq!(config.wclk_period_ns, 7);
    }

    #[test]
    fn test_bad_env_value_is_config_error() {
        let err = HarnessConfig::from_lookup(lookup(&[("AFIFO_SEED", "abc")])).unwrap_err();
        assert!(matches!(err, HarnessError::Config { .. }));
    }

    #[test]
    fn test_validation_rejects_bad_geometry() {
        let mut config = HarnessConfig::default();
        config.depth = 24;
        assert!(config.validate().is_err());

        let mut config = HarnessConfig::default();
        config.rclk_period_ns = 0;
        assert!(config.validate().is_err());

        let mut config = HarnessConfig::default();
        config.data_width = 4;
        assert!(config.validate().is_err(), "0xbe filler needs 8 bits");
    }
}
