//! Parameters structure for FieldDrive

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for Field-oriented drive.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct Params {
    /// Axis values with an absolute magnitude at or below this threshold map
    /// to exactly zero, suppressing stick and sensor noise around centre.
    /// Values beyond it are rescaled so the full output range stays
    /// reachable.
    pub axis_deadband: f64,
}
