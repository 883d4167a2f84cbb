//! Configuration for the warp engine.

use serde::{Deserialize, Serialize};
use warp_common::{Result, WarpError};

/// Default memory budget for the output mosaic, in bytes.
pub const DEFAULT_MEMORY_BUDGET_BYTES: u64 = 4_000_000_000;

/// Default target track length covered by one segment, in kilometers.
pub const DEFAULT_SEGMENT_LENGTH_KM: f64 = 3000.0;

/// Default geodesic gap between consecutive GCPs that signals a data
/// discontinuity (loss of signal or pass boundary), in kilometers.
pub const DEFAULT_CUT_THRESHOLD_KM: f64 = 2000.0;

/// Default distance to a pole under which a segment switches to a
/// pole-centered working frame, in kilometers.
pub const DEFAULT_POLE_THRESHOLD_KM: f64 = 1000.0;

/// Default factor applied to both output dimensions on each shrink retry.
pub const DEFAULT_SHRINK_FACTOR: f64 = 0.9;

/// Default smallest output dimension the memory guard may shrink to.
pub const DEFAULT_MIN_OUTPUT_DIMENSION: usize = 16;

/// Default cap on boundary-expansion passes when pulling neighboring GCPs
/// into a segment.
pub const DEFAULT_OVERLAP_EXPANSION_PASSES: usize = 2;

/// Tuning knobs for the smart warp pipeline.
///
/// The distance thresholds come from operational tuning of real satellite
/// passes, not from derived values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarpEngineConfig {
    /// Memory budget for the output mosaic in bytes.
    pub memory_budget_bytes: u64,

    /// Track length one TPS segment is expected to cover, in kilometers.
    pub segment_length_km: f64,

    /// Geodesic gap between consecutive GCPs treated as a cut, in kilometers.
    pub cut_threshold_km: f64,

    /// Distance to a pole that forces a pole-centered segment frame,
    /// in kilometers.
    pub pole_threshold_km: f64,

    /// Factor applied to the output dimensions on each memory retry.
    pub shrink_factor: f64,

    /// Smallest output dimension the memory guard may produce before
    /// reporting the budget as unsatisfiable.
    pub min_output_dimension: usize,

    /// Cap on segment boundary-expansion passes.
    pub overlap_expansion_passes: usize,
}

impl Default for WarpEngineConfig {
    fn default() -> Self {
        Self {
            memory_budget_bytes: DEFAULT_MEMORY_BUDGET_BYTES,
            segment_length_km: DEFAULT_SEGMENT_LENGTH_KM,
            cut_threshold_km: DEFAULT_CUT_THRESHOLD_KM,
            pole_threshold_km: DEFAULT_POLE_THRESHOLD_KM,
            shrink_factor: DEFAULT_SHRINK_FACTOR,
            min_output_dimension: DEFAULT_MIN_OUTPUT_DIMENSION,
            overlap_expansion_passes: DEFAULT_OVERLAP_EXPANSION_PASSES,
        }
    }
}

impl WarpEngineConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("WARP_MEMORY_BUDGET_BYTES") {
            if let Ok(bytes) = val.parse() {
                config.memory_budget_bytes = bytes;
            }
        }

        if let Ok(val) = std::env::var("WARP_SEGMENT_LENGTH_KM") {
            if let Ok(km) = val.parse() {
                config.segment_length_km = km;
            }
        }

        if let Ok(val) = std::env::var("WARP_CUT_THRESHOLD_KM") {
            if let Ok(km) = val.parse() {
                config.cut_threshold_km = km;
            }
        }

        if let Ok(val) = std::env::var("WARP_POLE_THRESHOLD_KM") {
            if let Ok(km) = val.parse() {
                config.pole_threshold_km = km;
            }
        }

        if let Ok(val) = std::env::var("WARP_SHRINK_FACTOR") {
            if let Ok(factor) = val.parse() {
                config.shrink_factor = factor;
            }
        }

        if let Ok(val) = std::env::var("WARP_MIN_OUTPUT_DIMENSION") {
            if let Ok(dim) = val.parse() {
                config.min_output_dimension = dim;
            }
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if !(self.shrink_factor > 0.0 && self.shrink_factor < 1.0) {
            return Err(WarpError::Config(format!(
                "shrink factor must be in (0, 1), got {}",
                self.shrink_factor
            )));
        }
        if self.segment_length_km <= 0.0
            || self.cut_threshold_km <= 0.0
            || self.pole_threshold_km <= 0.0
        {
            return Err(WarpError::Config(
                "distance thresholds must be positive".to_string(),
            ));
        }
        if self.min_output_dimension == 0 {
            return Err(WarpError::Config(
                "minimum output dimension must be at least 1".to_string(),
            ));
        }
        if self.overlap_expansion_passes == 0 {
            return Err(WarpError::Config(
                "overlap expansion needs at least one pass".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(WarpEngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_shrink_factor_rejected() {
        let mut config = WarpEngineConfig::default();
        config.shrink_factor = 1.5;
        assert!(config.validate().is_err());

        config.shrink_factor = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = WarpEngineConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: WarpEngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.memory_budget_bytes, config.memory_budget_bytes);
        assert_eq!(back.segment_length_km, config.segment_length_km);
    }
}
