//! Trajectory control module state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::info;
use serde::Serialize;

// Internal
use super::{Params, TrajControllers, TrajCtrlError, Trajectory};
use crate::odom::Pose;
use crate::swerve_ctrl::{DriveLimits, SwerveCmd};
use util::params;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

pub struct TrajCtrl {
    params: Params,

    /// Executing mode
    mode: TrajCtrlMode,

    /// The trajectory being followed.
    trajectory: Option<Trajectory>,

    /// Time elapsed since following began, accumulated from the cycle time
    /// steps.
    elapsed_s: f64,

    /// Controller objects used to calculate motion demands
    controllers: TrajControllers,

    report: StatusReport,
}

/// The status report containing various error flags and monitoring
/// quantities.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// Field X error to the current trajectory sample
    pub x_error_m: f64,

    /// Field Y error to the current trajectory sample
    pub y_error_m: f64,

    /// Heading error to the current trajectory sample
    pub head_error_rad: f64,

    /// If true the limit on the position error has been exceeded
    pub pos_error_limit_exceeded: bool,

    /// If true the limit on the heading error has been exceeded
    pub head_error_limit_exceeded: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The possible modes of execution of TrajCtrl. Each mode is handled by a
/// `mode_xyz` function.
#[derive(Debug, Copy, Clone)]
pub enum TrajCtrlMode {
    Off,
    Follow,
    Finished,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TrajCtrl {
    /// Intiailise the TrajCtrl module.
    ///
    /// Expected init data is a path to the parameter file plus the
    /// authoritative chassis velocity ceilings. Parameters whose demand
    /// limits exceed the ceilings are rejected here rather than silently
    /// running the pipeline with two different ceilings.
    pub fn init(
        params_path: &str,
        limits: DriveLimits,
    ) -> Result<Self, TrajCtrlError> {
        // Load the parameters
        let params: Params = params::load(params_path)
            .map_err(TrajCtrlError::ParamLoadError)?;

        // Enforce the single-ceiling rule
        if params.max_speed_dem_ms > limits.max_speed_ms
            || params.max_omega_dem_rads > limits.max_omega_rads
        {
            return Err(TrajCtrlError::ConfigDivergence(
                params.max_speed_dem_ms,
                params.max_omega_dem_rads,
                limits.max_speed_ms,
                limits.max_omega_rads,
            ));
        }

        // Initialise the controllers
        let controllers = TrajControllers::new(&params);

        // Build self
        Ok(Self {
            params,
            mode: TrajCtrlMode::Off,
            controllers,
            trajectory: None,
            elapsed_s: 0f64,
            report: StatusReport::default(),
        })
    }

    /// Process trajectory control.
    ///
    /// Processing involves sampling the trajectory at the elapsed time and
    /// calculating the SwerveCtrl command that will keep the vehicle on it.
    /// The returned command is `None` while no trajectory is executing.
    pub fn proc(
        &mut self,
        pose: &Option<Pose>,
        dt_s: f64,
    ) -> Result<(Option<SwerveCmd>, StatusReport), TrajCtrlError> {
        // Setup cycle data
        self.report = StatusReport::default();

        // Mode execution. Each of the mode functions returns the command to
        // issue or an error.
        let cmd = match self.mode {
            TrajCtrlMode::Off => None,
            TrajCtrlMode::Follow => self.mode_follow(pose, dt_s)?,
            TrajCtrlMode::Finished => self.mode_finished(),
        };

        Ok((cmd, self.report))
    }

    /// Begin executing a trajectory.
    ///
    /// Execution will begin on the next call to `proc`. Loading a new
    /// trajectory before the current one has finished results in an error;
    /// to stop a trajectory whilst it's executing you must call
    /// `abort_trajectory`.
    pub fn begin_trajectory(
        &mut self,
        trajectory: Trajectory,
    ) -> Result<(), TrajCtrlError> {
        // Check to see if there's already a trajectory loaded
        if self.trajectory.is_some() {
            return Err(TrajCtrlError::TrajectoryAlreadyLoaded);
        }

        info!(
            "Beginning trajectory of {} points lasting {:.2} s",
            trajectory.get_num_points(),
            trajectory.get_duration()
        );

        self.trajectory = Some(trajectory);
        self.elapsed_s = 0f64;
        self.controllers.reset();

        self.mode = TrajCtrlMode::Follow;

        Ok(())
    }

    /// Abort the currently executing trajectory.
    ///
    /// This will transfer the mode into finished so that on the next call to
    /// `proc` a stop command is issued and the trajectory cleared.
    pub fn abort_trajectory(&mut self) {
        if self.trajectory.is_some() {
            self.mode = TrajCtrlMode::Finished;
        }
    }

    /// True if a trajectory is loaded (executing or stopping).
    pub fn is_active(&self) -> bool {
        self.trajectory.is_some()
    }

    /// Mode following trajectory.
    ///
    /// In this mode TrajCtrl will command SwerveCtrl to track the current
    /// trajectory sample.
    fn mode_follow(
        &mut self,
        pose: &Option<Pose>,
        dt_s: f64,
    ) -> Result<Option<SwerveCmd>, TrajCtrlError> {
        // Validate pose
        let pose = match pose {
            Some(p) => p,
            None => return Err(TrajCtrlError::NoPose),
        };

        // Advance along the trajectory and take this cycle's target sample
        let elapsed_s = self.elapsed_s + dt_s;

        let (duration_s, target) = match self.trajectory {
            Some(ref t) => (t.get_duration(), t.sample(elapsed_s)),
            None => {
                // Can't follow nothing, issue a stop and clear up
                self.mode = TrajCtrlMode::Finished;
                return Ok(self.mode_finished());
            }
        };

        self.elapsed_s = elapsed_s;

        // Past the end of the trajectory the vehicle is brought to a stop
        if elapsed_s >= duration_s {
            self.mode = TrajCtrlMode::Finished;
            return Ok(self.mode_finished());
        }

        // Get the command
        let motion = self.controllers.get_motion_dem(
            &target,
            pose,
            &mut self.report,
            &self.params,
            dt_s,
        );

        // Check for error exceedance
        if self.report.pos_error_limit_exceeded
            || self.report.head_error_limit_exceeded
        {
            // Switch to finished mode immediately so that we are stopped as
            // close to the trajectory as possible.
            self.mode = TrajCtrlMode::Finished;
            return Ok(self.mode_finished());
        }

        Ok(Some(SwerveCmd::Motion(motion)))
    }

    /// Mode trajectory finished.
    ///
    /// This mode is run when the trajectory has been completed or aborted
    /// and the vehicle should come to a full stop. It issues a stop command,
    /// clears the trajectory, and switches back to Off.
    fn mode_finished(&mut self) -> Option<SwerveCmd> {
        self.trajectory = None;
        self.elapsed_s = 0f64;

        self.mode = TrajCtrlMode::Off;

        Some(SwerveCmd::Stop)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::swerve_ctrl::ChassisMotion;
    use comms_if::tc::traj::{PoseSpec, TrajPointSpec, TrajSpec};

    fn test_params() -> Params {
        Params {
            x_k_p: 1.0,
            y_k_p: 1.0,
            head_k_p: 2.0,
            max_speed_dem_ms: 4.0,
            max_omega_dem_rads: 11.0,
            pos_error_limit_m: 1.0,
            head_error_limit_rad: 1.0,
            ..Default::default()
        }
    }

    fn test_ctrl() -> TrajCtrl {
        let params = test_params();
        TrajCtrl {
            controllers: TrajControllers::new(&params),
            params,
            mode: TrajCtrlMode::Off,
            trajectory: None,
            elapsed_s: 0f64,
            report: StatusReport::default(),
        }
    }

    /// 2 s straight line along field X at 1 m/s
    fn test_traj() -> Trajectory {
        Trajectory::from_spec(&TrajSpec {
            points: vec![
                TrajPointSpec {
                    time_s: 0.0,
                    pose: PoseSpec::default(),
                    vx_ms: 1.0,
                    vy_ms: 0.0,
                },
                TrajPointSpec {
                    time_s: 2.0,
                    pose: PoseSpec {
                        x_m: 2.0,
                        y_m: 0.0,
                        heading_rad: 0.0,
                    },
                    vx_ms: 1.0,
                    vy_ms: 0.0,
                },
            ],
        })
        .unwrap()
    }

    #[test]
    fn test_off_issues_nothing() {
        let mut ctrl = test_ctrl();

        let (cmd, _) = ctrl.proc(&Some(Pose::default()), 0.02).unwrap();
        assert!(cmd.is_none());
    }

    #[test]
    fn test_follow_straight_line() {
        let mut ctrl = test_ctrl();
        ctrl.begin_trajectory(test_traj()).unwrap();

        // On the trajectory at the start: the demand is dominated by the
        // feed-forward velocity, straight ahead
        let (cmd, report) = ctrl.proc(&Some(Pose::default()), 0.02).unwrap();

        match cmd {
            Some(SwerveCmd::Motion(m)) => {
                assert!(m.vx_ms > 0.9);
                assert!(m.vy_ms.abs() < 0.1);
            }
            _ => panic!("Expected a motion command"),
        }
        assert!(!report.pos_error_limit_exceeded);
    }

    #[test]
    fn test_double_load_rejected() {
        let mut ctrl = test_ctrl();
        ctrl.begin_trajectory(test_traj()).unwrap();

        assert!(matches!(
            ctrl.begin_trajectory(test_traj()),
            Err(TrajCtrlError::TrajectoryAlreadyLoaded)
        ));
    }

    #[test]
    fn test_finishes_at_end() {
        let mut ctrl = test_ctrl();
        ctrl.begin_trajectory(test_traj()).unwrap();

        // Walk a perfectly-tracking pose through the whole trajectory
        let mut last_cmd = None;
        for i in 0..110 {
            let pose = Pose {
                position_m_lm: [0.02 * i as f64, 0.0],
                heading_rad: 0.0,
            };
            let (cmd, _) = ctrl.proc(&Some(pose), 0.02).unwrap();
            last_cmd = cmd;
            if matches!(last_cmd, Some(SwerveCmd::Stop)) {
                break;
            }
        }

        // The trajectory ends with a stop and the module goes idle
        assert!(matches!(last_cmd, Some(SwerveCmd::Stop)));
        assert!(!ctrl.is_active());

        let (cmd, _) = ctrl.proc(&Some(Pose::default()), 0.02).unwrap();
        assert!(cmd.is_none());
    }

    #[test]
    fn test_abort_stops() {
        let mut ctrl = test_ctrl();
        ctrl.begin_trajectory(test_traj()).unwrap();
        ctrl.proc(&Some(Pose::default()), 0.02).unwrap();

        ctrl.abort_trajectory();

        let (cmd, _) = ctrl.proc(&Some(Pose::default()), 0.02).unwrap();
        assert!(matches!(cmd, Some(SwerveCmd::Stop)));
        assert!(!ctrl.is_active());
    }

    #[test]
    fn test_error_limit_aborts() {
        let mut ctrl = test_ctrl();
        ctrl.begin_trajectory(test_traj()).unwrap();

        // A pose far off the trajectory must trip the error limit and stop
        let pose = Pose {
            position_m_lm: [0.0, 5.0],
            heading_rad: 0.0,
        };
        let (cmd, report) = ctrl.proc(&Some(pose), 0.02).unwrap();

        assert!(report.pos_error_limit_exceeded);
        assert!(matches!(cmd, Some(SwerveCmd::Stop)));
    }

    #[test]
    fn test_demand_limited() {
        let mut ctrl = test_ctrl();

        // Huge proportional gain to force saturation
        ctrl.params.x_k_p = 100.0;
        ctrl.params.pos_error_limit_m = 10.0;
        ctrl.controllers = TrajControllers::new(&ctrl.params);

        ctrl.begin_trajectory(test_traj()).unwrap();

        let pose = Pose {
            position_m_lm: [-0.5, 0.0],
            heading_rad: 0.0,
        };
        let (cmd, _) = ctrl.proc(&Some(pose), 0.02).unwrap();

        match cmd {
            Some(SwerveCmd::Motion(ChassisMotion { vx_ms, .. })) => {
                assert!(vx_ms <= 4.0 + 1e-12);
            }
            _ => panic!("Expected a motion command"),
        }
    }
}
