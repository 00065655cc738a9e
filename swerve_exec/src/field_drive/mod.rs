//! Field-oriented drive module
//!
//! Field drive turns raw operator axis values into a body-frame chassis
//! motion demand. The axes are shaped (deadband plus a squared response
//! curve) to make the vehicle controllable by a human, scaled to the chassis
//! velocity ceilings, and rotated from the field frame into the vehicle body
//! frame using the heading read on the same cycle, so that "forward" on the
//! stick always moves the vehicle away from the operator regardless of which
//! way the nose points.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during FieldDrive operation.
#[derive(Debug, thiserror::Error)]
pub enum FieldDriveError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(util::params::LoadError),
}
