//! # Odometry module
//!
//! Odometry dead-reckons the vehicle's pose in the field frame. Each cycle
//! the change in every module's cumulative traveled distance, taken at the
//! module's current steer angle, gives four 2D displacement observations;
//! the kinematics least-squares inverse turns them into a body-frame
//! displacement which is rotated into the field frame by the current heading
//! and accumulated into the pose.
//!
//! Heading is taken directly from the gyroscope each cycle rather than
//! integrated from angular velocity, since the direct measurement is more
//! accurate than double-integration of wheel odometry. Drift in position is
//! expected and unbounded over time; there is no correction source here and
//! that is the accepted failure mode of dead-reckoning.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// Internal
pub use state::*;

use comms_if::tc::traj::PoseSpec;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The current pose (position and heading in the field frame) of the vehicle.
///
/// More specifically this represents the Vehicle Body (RB) frame in the
/// field frame. The pose is owned and mutated exclusively by [`Odom`]; every
/// other module reads it.
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize)]
pub struct Pose {
    /// The position in the field frame.
    ///
    /// Units: meters
    pub position_m_lm: [f64; 2],

    /// The heading (angle of the body X axis to the field X axis, right hand
    /// rule about Z+) in radians.
    pub heading_rad: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during Odom operation.
#[derive(Debug, thiserror::Error)]
pub enum OdomError {
    #[error("Attempted to process before the module was initialised")]
    NotInitialised,

    #[error("Attempted to update odometry before a baseline was set, call reset first")]
    NoBaseline,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Pose {
    /// Build a pose from its telecommand spec.
    pub fn from_spec(spec: &PoseSpec) -> Self {
        Pose {
            position_m_lm: [spec.x_m, spec.y_m],
            heading_rad: spec.heading_rad,
        }
    }
}
