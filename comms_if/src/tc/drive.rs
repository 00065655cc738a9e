//! # Drive telecommands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Raw operator axis values, each in the range [-1, +1].
///
/// The axes are field-oriented: `x` is towards field-forward (away from the
/// operator), `y` is field-left, and `rot` is rotation following the right
/// hand rule about the vehicle's Z+ (upwards) axis, so that positive `rot`
/// turns the vehicle to the left.
#[derive(Debug, Default, Copy, Clone, Serialize, Deserialize)]
pub struct AxisValues {
    pub x: f64,
    pub y: f64,
    pub rot: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// An operator drive command.
#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub enum DriveCmd {
    /// Drive with the given field-oriented axis values.
    ///
    /// The values are raw operator input and will be shaped (deadband plus
    /// response curve) before being turned into a chassis motion demand.
    Axes(AxisValues),

    /// Stop the vehicle, maintaining the current steer angles but setting all
    /// drive axes to zero speed.
    Stop,
}

/// Start or stop the self-right (attitude hold) command.
#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub enum SelfRightCmd {
    Start,
    Stop,
}
