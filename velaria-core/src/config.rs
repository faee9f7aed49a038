//! Device configuration
//!
//! Defaults match the demo hardware; a persisted [`CoverConfig`] from
//! the key-value store overrides them at boot.

use serde::{Deserialize, Serialize};

/// Coverings the device can manage
pub const MAX_COVERS: usize = 2;

/// Hold time before a press counts as a long press
pub const LONG_PRESS_TIMEOUT_MS: u64 = 3_000;

/// Interval between actuator movement steps
pub const ACTUATOR_TICK_MS: u64 = 500;

/// Motion parameters of one actuator axis, in raw actuator units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisConfig {
    pub open_limit: u16,
    pub closed_limit: u16,
    /// Units moved per timer tick
    pub step_delta: u16,
    /// Snap window around the target; also the smallest step taken
    pub step_minimum: u16,
}

/// Motion parameters of one covering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CoverConfig {
    pub lift: AxisConfig,
    pub tilt: AxisConfig,
}

impl Default for CoverConfig {
    fn default() -> Self {
        Self {
            lift: AxisConfig {
                open_limit: 0,
                closed_limit: 1000,
                step_delta: 50,
                step_minimum: 1,
            },
            tilt: AxisConfig {
                open_limit: 0,
                closed_limit: 100,
                step_delta: 5,
                step_minimum: 1,
            },
        }
    }
}
