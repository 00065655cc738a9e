//! # Swerve Module Equipment Data

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// The number of swerve modules on the vehicle.
pub const NUM_MODULES: usize = 4;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// IDs of the vehicle's swerve modules.
///
/// The ID doubles as the index into all per-module arrays.
#[derive(Serialize, Deserialize, Debug, Hash, Eq, PartialEq, Copy, Clone)]
pub enum ModuleId {
    FrontLeft,
    FrontRight,
    BackLeft,
    BackRight,
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Demands that are sent to the module actuators each cycle.
///
/// The steer angle loop is closed by the actuator itself, including taking
/// the shortest path to the demanded angle, so angles here may be in any
/// range.
#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct ModuleDems {
    /// Drive motor voltage demand for each module.
    ///
    /// Units: volts
    pub drv_voltage_v: [f64; NUM_MODULES],

    /// Steer axis absolute position demand for each module.
    ///
    /// Units: radians
    pub str_abs_pos_rad: [f64; NUM_MODULES],
}

/// Sensor data read back from the module mechanisms each cycle.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy)]
pub struct ModuleSens {
    /// Cumulative distance traveled by each module's wheel since power-on.
    ///
    /// Units: meters
    pub drv_dist_m: [f64; NUM_MODULES],

    /// Current steer axis absolute position of each module.
    ///
    /// Units: radians
    pub str_abs_pos_rad: [f64; NUM_MODULES],
}

/// Attitude data read from the IMU each cycle.
///
/// All angles follow the right hand rule about the respective vehicle body
/// axis. Yaw is continuous (not wrapped) so that heading-based control does
/// not see discontinuities.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy)]
pub struct ImuSens {
    /// Heading (yaw) in radians, increasing as the vehicle rotates
    /// counter-clockwise when viewed from above.
    pub yaw_rad: f64,

    /// Pitch in radians, positive nose-up.
    pub pitch_rad: f64,

    /// Roll in radians, positive rolling to the right.
    pub roll_rad: f64,
}

// -----------------------------------------------------------------------------------------------
// IMPLS
// -----------------------------------------------------------------------------------------------

impl ModuleId {
    /// All module IDs in per-module array order.
    pub const ALL: [ModuleId; NUM_MODULES] = [
        ModuleId::FrontLeft,
        ModuleId::FrontRight,
        ModuleId::BackLeft,
        ModuleId::BackRight,
    ];

    /// Get the index of this module in per-module arrays.
    pub fn index(&self) -> usize {
        match self {
            ModuleId::FrontLeft => 0,
            ModuleId::FrontRight => 1,
            ModuleId::BackLeft => 2,
            ModuleId::BackRight => 3,
        }
    }
}

impl Default for ModuleDems {
    fn default() -> Self {
        ModuleDems {
            drv_voltage_v: [0.0; NUM_MODULES],
            str_abs_pos_rad: [0.0; NUM_MODULES],
        }
    }
}
