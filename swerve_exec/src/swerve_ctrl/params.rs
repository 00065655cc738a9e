//! Parameters structure for SwerveCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use super::NUM_MODULES;
use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for Swerve control.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct Params {
    // ---- GEOMETRY ----
    /// The position of the module steer axes in the vehicle body frame, as
    /// `[x, y]` pairs in module array order.
    ///
    /// The four positions must be symmetric about the vehicle centre and span
    /// a non-degenerate quadrilateral.
    ///
    /// Units: meters,
    /// Frame: Vehicle body
    pub module_pos_m_rb: [[f64; 2]; NUM_MODULES],

    // ---- CAPABILITIES ----
    /// Maximum speed of a single module.
    ///
    /// This is the authoritative velocity ceiling for the whole control
    /// pipeline, derived from the gearing and motor characteristics.
    ///
    /// Units: meters/second
    pub max_speed_ms: f64,

    /// Maximum angular rate of the vehicle.
    ///
    /// Units: radians/second
    pub max_omega_rads: f64,

    // ---- ACTUATION ----
    /// The rated maximum voltage of the drive motors.
    ///
    /// Units: volts
    pub max_voltage_v: f64,

    /// Fixed attenuation applied when scaling speeds into voltages, leaving
    /// headroom for the actuators' own closed-loop steering correction.
    pub drive_voltage_scale: f64,
}

/// The authoritative chassis velocity ceilings, handed to the other control
/// modules at init so that a single pair of limits governs the pipeline.
#[derive(Debug, Default, Clone, Copy)]
pub struct DriveLimits {
    /// Maximum module speed in meters/second.
    pub max_speed_ms: f64,

    /// Maximum vehicle angular rate in radians/second.
    pub max_omega_rads: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    /// Get the chassis velocity ceilings from these parameters.
    pub fn limits(&self) -> DriveLimits {
        DriveLimits {
            max_speed_ms: self.max_speed_ms,
            max_omega_rads: self.max_omega_rads,
        }
    }
}
