//! Parameters structure for SelfRight

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for Self-right control.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct Params {
    /// Attitude controller gains, shared by the pitch and roll axes.
    pub k_p: f64,
    pub k_i: f64,
    pub k_d: f64,

    /// Tilt magnitudes at or below this threshold are treated as level and
    /// produce no correction, suppressing IMU noise.
    ///
    /// Units: radians
    pub tilt_deadband_rad: f64,

    /// Ceiling on the correction speed along each axis. At init this is
    /// further limited to the chassis velocity ceiling so a runaway gain can
    /// never command an illegal speed into the kinematics.
    ///
    /// Units: meters/second
    pub max_correction_ms: f64,
}
