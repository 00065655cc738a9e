//! Self-right module state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::info;
use serde::Serialize;

// Internal
use super::{Params, SelfRightError};
use crate::swerve_ctrl::{ChassisMotion, DriveLimits, SwerveCmd};
use crate::traj_ctrl::PidController;
use comms_if::eqpt::swerve::ImuSens;
use util::{maths::clamp, params};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

pub struct SelfRight {
    params: Params,

    /// Executing mode
    mode: SelfRightMode,

    /// Pitch error controller, drives the field X correction
    pitch_ctrl: PidController,

    /// Roll error controller, drives the field Y correction
    roll_ctrl: PidController,

    /// The correction ceiling actually in force, the smaller of the
    /// parameter and the chassis velocity ceiling.
    correction_limit_ms: f64,

    report: StatusReport,
}

/// Status report for SelfRight processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// Field-frame correction speed demanded along X this cycle.
    pub x_correction_ms: f64,

    /// Field-frame correction speed demanded along Y this cycle.
    pub y_correction_ms: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The possible modes of execution of SelfRight.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SelfRightMode {
    /// Not running, produces no command.
    Idle,

    /// Actively correcting attitude every cycle.
    Running,

    /// Interruption requested, the next cycle issues a stop and goes idle.
    Interrupted,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SelfRight {
    /// Initialise the SelfRight module.
    ///
    /// Expected init data is a path to the parameter file plus the
    /// authoritative chassis velocity ceilings, which bound the correction
    /// output.
    pub fn init(
        params_path: &str,
        limits: DriveLimits,
    ) -> Result<Self, SelfRightError> {
        let params: Params = params::load(params_path)
            .map_err(SelfRightError::ParamLoadError)?;

        let correction_limit_ms =
            params.max_correction_ms.min(limits.max_speed_ms);

        Ok(Self {
            pitch_ctrl: PidController::new(
                params.k_p, params.k_i, params.k_d,
            ),
            roll_ctrl: PidController::new(params.k_p, params.k_i, params.k_d),
            params,
            mode: SelfRightMode::Idle,
            correction_limit_ms,
            report: StatusReport::default(),
        })
    }

    /// Start the attitude hold loop.
    ///
    /// From the next call to `proc` onwards corrections are issued every
    /// cycle until `interrupt` is called.
    pub fn start(&mut self) {
        if self.mode != SelfRightMode::Running {
            info!("SelfRight started");
            self.pitch_ctrl.reset();
            self.roll_ctrl.reset();
            self.mode = SelfRightMode::Running;
        }
    }

    /// Interrupt the attitude hold loop.
    ///
    /// The next call to `proc` will issue a single stop command, leaving the
    /// actuators in a safe zero-speed state, and the module goes idle.
    pub fn interrupt(&mut self) {
        if self.mode == SelfRightMode::Running {
            info!("SelfRight interrupted");
            self.mode = SelfRightMode::Interrupted;
        }
    }

    /// Whether the command has completed.
    ///
    /// Attitude hold is a continuously-running command: it never completes
    /// on its own and must be interrupted externally, so this is permanently
    /// false.
    pub fn is_finished(&self) -> bool {
        false
    }

    /// True if the loop is running or stopping (needs to be processed this
    /// cycle).
    pub fn is_active(&self) -> bool {
        self.mode != SelfRightMode::Idle
    }

    /// Process self-right control.
    ///
    /// The returned command is `None` while idle.
    pub fn proc(
        &mut self,
        imu_sens: &ImuSens,
        dt_s: f64,
    ) -> (Option<SwerveCmd>, StatusReport) {
        self.report = StatusReport::default();

        let cmd = match self.mode {
            SelfRightMode::Idle => None,
            SelfRightMode::Running => {
                Some(self.calc_correction(imu_sens, dt_s))
            }
            SelfRightMode::Interrupted => {
                self.mode = SelfRightMode::Idle;
                Some(SwerveCmd::Stop)
            }
        };

        (cmd, self.report)
    }

    /// Calculate the attitude correction command.
    ///
    /// The controllers run against a zero setpoint: the error is the negated
    /// tilt, so the correction motion opposes the tilt. Pitch corrects along
    /// field X, roll along field Y, with no rotation component; the
    /// correction is clamped to the legal velocity range before it can reach
    /// the kinematics.
    fn calc_correction(&mut self, imu_sens: &ImuSens, dt_s: f64) -> SwerveCmd {
        let pitch_rad = apply_deadband(
            imu_sens.pitch_rad,
            self.params.tilt_deadband_rad,
        );
        let roll_rad = apply_deadband(
            imu_sens.roll_rad,
            self.params.tilt_deadband_rad,
        );

        let x_correction_ms = clamp(
            &self.pitch_ctrl.get(-pitch_rad, dt_s),
            &-self.correction_limit_ms,
            &self.correction_limit_ms,
        );
        let y_correction_ms = clamp(
            &self.roll_ctrl.get(-roll_rad, dt_s),
            &-self.correction_limit_ms,
            &self.correction_limit_ms,
        );

        self.report.x_correction_ms = x_correction_ms;
        self.report.y_correction_ms = y_correction_ms;

        SwerveCmd::Motion(ChassisMotion::from_field_relative(
            x_correction_ms,
            y_correction_ms,
            0.0,
            imu_sens.yaw_rad,
        ))
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Zero values whose magnitude is at or below the threshold.
fn apply_deadband(value: f64, threshold: f64) -> f64 {
    if value.abs() <= threshold {
        0.0
    } else {
        value
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn test_self_right() -> SelfRight {
        let params = Params {
            k_p: 2.0,
            k_i: 0.0,
            k_d: 0.0,
            tilt_deadband_rad: 0.02,
            max_correction_ms: 1.0,
        };

        SelfRight {
            pitch_ctrl: PidController::new(
                params.k_p, params.k_i, params.k_d,
            ),
            roll_ctrl: PidController::new(params.k_p, params.k_i, params.k_d),
            params,
            mode: SelfRightMode::Idle,
            correction_limit_ms: 1.0,
            report: StatusReport::default(),
        }
    }

    #[test]
    fn test_idle_issues_nothing() {
        let mut sr = test_self_right();

        let (cmd, _) = sr.proc(&ImuSens::default(), 0.02);
        assert!(cmd.is_none());
        assert!(!sr.is_active());
    }

    #[test]
    fn test_level_vehicle_no_correction() {
        let mut sr = test_self_right();
        sr.start();

        let imu = ImuSens {
            yaw_rad: 0.0,
            pitch_rad: 0.01,
            roll_rad: -0.015,
        };

        // Tilts within the deadband produce a zero-motion command
        let (cmd, report) = sr.proc(&imu, 0.02);
        match cmd {
            Some(SwerveCmd::Motion(m)) => assert!(m.is_zero()),
            _ => panic!("Expected a motion command"),
        }
        assert_eq!(report.x_correction_ms, 0.0);
        assert_eq!(report.y_correction_ms, 0.0);
    }

    #[test]
    fn test_correction_opposes_tilt() {
        let mut sr = test_self_right();
        sr.start();

        // Nose-up pitch at zero heading: correction drives backwards along X
        let imu = ImuSens {
            yaw_rad: 0.0,
            pitch_rad: 0.2,
            roll_rad: 0.0,
        };

        let (cmd, report) = sr.proc(&imu, 0.02);
        match cmd {
            Some(SwerveCmd::Motion(m)) => {
                assert!(m.vx_ms < 0.0);
                assert_eq!(m.omega_rads, 0.0);
            }
            _ => panic!("Expected a motion command"),
        }
        assert!(report.x_correction_ms < 0.0);
    }

    #[test]
    fn test_correction_clamped() {
        let mut sr = test_self_right();
        sr.start();

        // A huge tilt must not exceed the correction ceiling
        let imu = ImuSens {
            yaw_rad: 0.0,
            pitch_rad: 10.0,
            roll_rad: -10.0,
        };

        let (_, report) = sr.proc(&imu, 0.02);
        assert_eq!(report.x_correction_ms, -1.0);
        assert_eq!(report.y_correction_ms, 1.0);
    }

    #[test]
    fn test_never_finishes_until_interrupted() {
        let mut sr = test_self_right();
        sr.start();

        for _ in 0..100 {
            sr.proc(&ImuSens::default(), 0.02);
            assert!(!sr.is_finished());
            assert!(sr.is_active());
        }

        // Interruption produces exactly one stop command, then idle
        sr.interrupt();
        let (cmd, _) = sr.proc(&ImuSens::default(), 0.02);
        assert!(matches!(cmd, Some(SwerveCmd::Stop)));

        let (cmd, _) = sr.proc(&ImuSens::default(), 0.02);
        assert!(cmd.is_none());
        assert!(!sr.is_active());
    }
}
