//! Swerve control module
//!
//! Swerve control converts a chassis motion demand (robot-frame forward,
//! lateral and angular velocity) into a speed and steer angle for each of the
//! four modules, limits the module speeds to the vehicle's velocity ceiling,
//! and scales the result into the actuators' voltage command range.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod kinematics;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use kinematics::*;
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// The number of swerve modules on the vehicle.
pub use comms_if::eqpt::swerve::NUM_MODULES;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during SwerveCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum SwerveCtrlError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(util::params::LoadError),

    #[error("Invalid module geometry: {0}")]
    InvalidGeometry(KinematicsError),

    #[error("Attempted to process before the module was initialised")]
    NotInitialised,
}
