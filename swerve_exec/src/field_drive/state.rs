//! Implementations for the FieldDrive state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use super::{FieldDriveError, Params};
use crate::swerve_ctrl::{ChassisMotion, DriveLimits, SwerveCmd};
use comms_if::tc::drive::{AxisValues, DriveCmd};
use util::{maths::clamp, module::State, params, session::Session};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Field-oriented drive module state
#[derive(Default)]
pub struct FieldDrive {
    params: Params,

    /// The chassis velocity ceilings, injected from the swerve control
    /// parameters at init.
    limits: DriveLimits,

    report: StatusReport,

    /// The most recently commanded operator axes. `None` until the first
    /// command, and after a stop.
    current_axes: Option<AxisValues>,
}

/// Data required to initialise FieldDrive.
pub struct InitData {
    /// Path to the parameter file.
    pub params_path: &'static str,

    /// The authoritative chassis velocity ceilings.
    pub limits: DriveLimits,
}

/// Input data to Field-oriented drive.
#[derive(Debug, Default, Clone, Copy)]
pub struct InputData {
    /// The operator drive command for this cycle, or `None` if no new
    /// command arrived. The last commanded axes are held between commands.
    pub cmd: Option<DriveCmd>,

    /// The current heading of the vehicle, which must be re-read every cycle
    /// since it changes continuously during motion.
    pub heading_rad: f64,
}

/// Status report for FieldDrive processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// The shaped axis values used for this cycle's demand.
    pub shaped_x: f64,
    pub shaped_y: f64,
    pub shaped_rot: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for FieldDrive {
    type InitData = InitData;
    type InitError = FieldDriveError;

    type InputData = InputData;
    type OutputData = SwerveCmd;
    type StatusReport = StatusReport;
    type ProcError = FieldDriveError;

    /// Initialise the FieldDrive module.
    fn init(
        &mut self,
        init_data: Self::InitData,
        _session: &Session,
    ) -> Result<(), Self::InitError> {
        self.params = params::load(init_data.params_path)
            .map_err(FieldDriveError::ParamLoadError)?;

        self.limits = init_data.limits;

        Ok(())
    }

    /// Perform cyclic processing of Field-oriented drive.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        // Clear the status report
        self.report = StatusReport::default();

        // Update the internal axes from any new command
        match input_data.cmd {
            Some(DriveCmd::Axes(axes)) => self.current_axes = Some(axes),
            Some(DriveCmd::Stop) => self.current_axes = None,
            None => (),
        }

        // With no axes commanded the output is a stop
        let axes = match self.current_axes {
            Some(a) => a,
            None => return Ok((SwerveCmd::Stop, self.report)),
        };

        // Shape each axis independently before any frame transform
        let shaped_x = shape_axis(axes.x, self.params.axis_deadband);
        let shaped_y = shape_axis(axes.y, self.params.axis_deadband);
        let shaped_rot = shape_axis(axes.rot, self.params.axis_deadband);

        self.report.shaped_x = shaped_x;
        self.report.shaped_y = shaped_y;
        self.report.shaped_rot = shaped_rot;

        // Scale the shaped axes to the chassis ceilings and rotate the
        // translation demand from the field frame into the body frame
        let motion = ChassisMotion::from_field_relative(
            shaped_x * self.limits.max_speed_ms,
            shaped_y * self.limits.max_speed_ms,
            shaped_rot * self.limits.max_omega_rads,
            input_data.heading_rad,
        );

        Ok((SwerveCmd::Motion(motion), self.report))
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Shape a raw operator axis value into a control-grade value.
///
/// Two stages, in order:
///  1. Deadband - magnitudes at or below the threshold map to exactly zero,
///     and the remaining range is rescaled linearly so full output is still
///     reachable.
///  2. Response curve - the magnitude is squared while preserving sign,
///     giving finer control near centre and full output at the extremes.
pub fn shape_axis(raw: f64, deadband: f64) -> f64 {
    let value = clamp(&raw, &-1.0, &1.0);

    let value = if value.abs() <= deadband {
        0.0
    } else {
        (value.abs() - deadband) / (1.0 - deadband) * value.signum()
    };

    value * value.abs()
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
