//! # Time Configuration
//!
//! Pool sizes, initial time scale and update gates, loaded once at startup
//! from TOML.
//!
//! ```toml
//! timer_capacity = 64
//! interpolator_capacity = 32
//! time_scale = 1.0
//! fixed_step_ratio = 0.2
//! enable_timers = true
//! enable_interpolators = true
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{TimeError, TimeResult};

/// Configuration for a [`TimeContext`](crate::TimeContext).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimeConfig {
    /// Fixed number of timer slots.
    pub timer_capacity: usize,
    /// Fixed number of interpolator slots.
    pub interpolator_capacity: usize,
    /// Initial global time scale.
    pub time_scale: f32,
    /// Host fixed-step interval as a proportion of the time scale.
    pub fixed_step_ratio: f32,
    /// Whether timers are updated on each tick.
    pub enable_timers: bool,
    /// Whether interpolators are updated on each tick.
    pub enable_interpolators: bool,
}

impl TimeConfig {
    /// Default slot count for both pools.
    pub const DEFAULT_CAPACITY: usize = 10;

    /// Default fixed-step proportion.
    pub const DEFAULT_FIXED_STEP_RATIO: f32 = 0.2;

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`TimeError::InvalidConfig`] if the document does not parse
    /// or fails [`validate`](Self::validate).
    pub fn from_toml_str(source: &str) -> TimeResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|err| TimeError::InvalidConfig(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`TimeError::InvalidConfig`] if the file cannot be read or
    /// its contents are invalid.
    pub fn from_toml_file(path: impl AsRef<Path>) -> TimeResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|err| TimeError::InvalidConfig(format!("{}: {err}", path.display())))?;
        let config = Self::from_toml_str(&source)?;
        tracing::info!(
            path = %path.display(),
            timers = config.timer_capacity,
            interpolators = config.interpolator_capacity,
            "loaded time config"
        );
        Ok(config)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`TimeError::InvalidConfig`] describing the first bad field.
    pub fn validate(&self) -> TimeResult<()> {
        if self.timer_capacity == 0 {
            return Err(TimeError::InvalidConfig("timer_capacity must be at least 1".into()));
        }
        if self.interpolator_capacity == 0 {
            return Err(TimeError::InvalidConfig(
                "interpolator_capacity must be at least 1".into(),
            ));
        }
        if !self.time_scale.is_finite() || self.time_scale < 0.0 {
            return Err(TimeError::InvalidConfig(format!(
                "time_scale must be finite and non-negative, got {}",
                self.time_scale
            )));
        }
        if !self.fixed_step_ratio.is_finite() || self.fixed_step_ratio <= 0.0 {
            return Err(TimeError::InvalidConfig(format!(
                "fixed_step_ratio must be positive, got {}",
                self.fixed_step_ratio
            )));
        }
        Ok(())
    }
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            timer_capacity: Self::DEFAULT_CAPACITY,
            interpolator_capacity: Self::DEFAULT_CAPACITY,
            time_scale: 1.0,
            fixed_step_ratio: Self::DEFAULT_FIXED_STEP_RATIO,
            enable_timers: true,
            enable_interpolators: true,
        }
    }
}
