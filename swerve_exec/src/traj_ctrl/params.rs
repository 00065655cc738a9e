//! Parameters structure for TrajCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for Trajectory control.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct Params {
    // ---- CONTROLLER GAINS ----
    /// Field X position controller gains.
    pub x_k_p: f64,
    pub x_k_i: f64,
    pub x_k_d: f64,

    /// Field Y position controller gains.
    pub y_k_p: f64,
    pub y_k_i: f64,
    pub y_k_d: f64,

    /// Heading controller gains.
    pub head_k_p: f64,
    pub head_k_i: f64,
    pub head_k_d: f64,

    // ---- DEMAND LIMITS ----
    /// Maximum translational speed demand the controllers may issue.
    ///
    /// Must not exceed the authoritative chassis ceiling, divergence is
    /// rejected at init.
    ///
    /// Units: meters/second
    pub max_speed_dem_ms: f64,

    /// Maximum angular rate demand the controllers may issue.
    ///
    /// Units: radians/second
    pub max_omega_dem_rads: f64,

    // ---- ERROR LIMITS ----
    /// If the position error exceeds this limit the trajectory is aborted.
    ///
    /// Units: meters
    pub pos_error_limit_m: f64,

    /// If the heading error exceeds this limit the trajectory is aborted.
    ///
    /// Units: radians
    pub head_error_limit_rad: f64,
}
