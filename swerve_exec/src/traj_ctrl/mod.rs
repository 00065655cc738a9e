//! # Trajectory control module
//!
//! Trajectory control is responsible for keeping the vehicle on a target
//! trajectory supplied by an external generator. The trajectory is a sequence
//! of timestamped samples, each giving a desired field-frame pose and a
//! feed-forward field-frame velocity.
//!
//! Each cycle the module samples the trajectory at the elapsed time and runs
//! one PID controller per chassis degree of freedom: the X and Y position
//! errors and the (wrapped) heading error. The controller corrections are
//! added to the feed-forward velocity, limited, and rotated into the body
//! frame to produce the chassis motion demand passed on to swerve control.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod controllers;
pub mod params;
pub mod state;
pub mod trajectory;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use controllers::*;
pub use params::Params;
pub use state::*;
pub use trajectory::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Potential errors that can occur during processing of the module.
#[derive(Debug, thiserror::Error)]
pub enum TrajCtrlError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(util::params::LoadError),

    /// The trajectory speed limits exceed the authoritative chassis ceiling.
    /// A single ceiling governs the pipeline; diverging limits are a
    /// configuration error, not a second ceiling to run with.
    #[error(
        "Trajectory speed limits ({0} m/s, {1} rad/s) exceed the chassis \
        ceilings ({2} m/s, {3} rad/s)"
    )]
    ConfigDivergence(f64, f64, f64, f64),

    /// A trajectory is already loaded. This error occurs when attempting to
    /// load a new trajectory before the current one has finished.
    #[error("Attempted to load a trajectory while one is already loaded")]
    TrajectoryAlreadyLoaded,

    /// Attempted to build a trajectory with fewer than two samples.
    #[error("A trajectory requires at least two samples, got {0}")]
    TooFewPoints(usize),

    /// Attempted to build a trajectory whose sample times don't increase
    /// monotonically.
    #[error("Trajectory sample times must increase monotonically")]
    NonMonotonicTimes,

    /// Attempted to control trajectory when the pose is not known.
    #[error("No pose has been set")]
    NoPose,
}
