//! # Telecommand module
//!
//! This module provides the telecommands accepted by the control executable.
//! Telecommands are serialised as JSON, either in a drive script or injected
//! by an operator-input collaborator.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod drive;
pub mod traj;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Internal
pub use drive::{AxisValues, DriveCmd, SelfRightCmd};
pub use traj::{PoseSpec, TrajPointSpec, TrajSpec};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A telecommand, i.e. an instruction sent to the vehicle by the operator or
/// a drive script.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Tc {
    /// Put the vehicle into safe mode, zeroing all drive demands.
    MakeSafe,

    /// Take the vehicle out of safe mode.
    MakeUnsafe,

    /// An operator drive command.
    Drive(DriveCmd),

    /// Start or stop the self-right (attitude hold) command.
    SelfRight(SelfRightCmd),

    /// Load a trajectory and begin following it.
    LoadTraj(TrajSpec),

    /// Abort the currently-followed trajectory.
    AbortTraj,

    /// Zero the gyroscope heading so that the vehicle's current nose
    /// direction becomes field-forward.
    ZeroHeading,

    /// Reset the odometry to a known pose.
    ResetOdom(PoseSpec),
}

/// Possible parsing errors.
#[derive(Debug, Error)]
pub enum TcParseError {
    #[error("TC contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Tc {
    /// Parse a new TC from a JSON packet
    pub fn from_json(json_str: &str) -> Result<Self, TcParseError> {
        serde_json::from_str(json_str).map_err(TcParseError::InvalidJson)
    }

    /// Serialise this TC as a JSON packet
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_drive_axes() {
        let tc = Tc::from_json(
            r#"{"Drive": {"Axes": {"x": 0.5, "y": -0.25, "rot": 0.0}}}"#,
        )
        .unwrap();

        match tc {
            Tc::Drive(DriveCmd::Axes(axes)) => {
                assert_eq!(axes.x, 0.5);
                assert_eq!(axes.y, -0.25);
                assert_eq!(axes.rot, 0.0);
            }
            _ => panic!("Parsed the wrong TC variant"),
        }
    }

    #[test]
    fn test_parse_unit_variants() {
        assert!(matches!(
            Tc::from_json(r#""ZeroHeading""#).unwrap(),
            Tc::ZeroHeading
        ));
        assert!(matches!(
            Tc::from_json(r#""MakeSafe""#).unwrap(),
            Tc::MakeSafe
        ));
        assert!(matches!(
            Tc::from_json(r#"{"Drive": "Stop"}"#).unwrap(),
            Tc::Drive(DriveCmd::Stop)
        ));
    }

    #[test]
    fn test_parse_invalid() {
        assert!(matches!(
            Tc::from_json("not even json"),
            Err(TcParseError::InvalidJson(_))
        ));
        assert!(matches!(
            Tc::from_json(r#"{"NoSuchTc": 1}"#),
            Err(TcParseError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_json_round_trip() {
        let tc = Tc::ResetOdom(PoseSpec {
            x_m: 1.0,
            y_m: -2.0,
            heading_rad: 0.5,
        });

        let json = tc.to_json().unwrap();
        match Tc::from_json(&json).unwrap() {
            Tc::ResetOdom(p) => {
                assert_eq!(p.x_m, 1.0);
                assert_eq!(p.y_m, -2.0);
                assert_eq!(p.heading_rad, 0.5);
            }
            _ => panic!("Parsed the wrong TC variant"),
        }
    }
}
