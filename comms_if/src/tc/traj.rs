//! # Trajectory telecommands
//!
//! A trajectory is produced by an external generator as a sequence of
//! timestamped field-frame pose and feed-forward velocity samples. The specs
//! here are the wire format; the executable parses them into its own
//! trajectory type before following them.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A field-frame pose, used to reset odometry and to specify trajectory
/// samples.
#[derive(Debug, Default, Copy, Clone, Serialize, Deserialize)]
pub struct PoseSpec {
    /// Position along the field X (field-forward) axis in meters.
    pub x_m: f64,

    /// Position along the field Y (field-left) axis in meters.
    pub y_m: f64,

    /// Heading (angle to the field X axis, right hand rule about Z+) in
    /// radians.
    pub heading_rad: f64,
}

/// A single timestamped trajectory sample.
#[derive(Debug, Default, Copy, Clone, Serialize, Deserialize)]
pub struct TrajPointSpec {
    /// Time of this sample relative to the start of the trajectory in
    /// seconds.
    pub time_s: f64,

    /// Desired field-frame pose at this time.
    pub pose: PoseSpec,

    /// Feed-forward field-frame velocity along X in meters/second.
    pub vx_ms: f64,

    /// Feed-forward field-frame velocity along Y in meters/second.
    pub vy_ms: f64,
}

/// A complete trajectory to be followed.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct TrajSpec {
    /// Ordered samples, with monotonically increasing times.
    pub points: Vec<TrajPointSpec>,
}
