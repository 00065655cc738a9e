//! # Self-right module
//!
//! Self-right is a continuously-running attitude hold command used to level
//! the vehicle on uneven terrain. Each cycle it reads the pitch and roll
//! from the IMU and drives both towards zero through a pair of PID
//! controllers, emitting the corrections as a field-relative chassis motion
//! into the same pipeline as operator input.
//!
//! The command never reports completion on its own; it runs until it is
//! interrupted externally, for example by an operator drive command taking
//! back control.

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

/// Possible errors that can occur during SelfRight operation.
#[derive(Debug, thiserror::Error)]
pub enum SelfRightError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(util::params::LoadError),
}
