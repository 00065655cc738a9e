//! Implementations for the Odom state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use super::{OdomError, Pose};
use crate::swerve_ctrl::{ModuleState, SwerveKinematics, NUM_MODULES};
use comms_if::eqpt::swerve::ModuleSens;
use util::{
    archive::{Archived, Archiver},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Odometry module state
#[derive(Default)]
pub struct Odom {
    /// The kinematics transform shared with swerve control, cloned in at
    /// init.
    kinematics: Option<SwerveKinematics>,

    /// The accumulated pose. `None` until `reset` establishes one.
    pose: Option<Pose>,

    /// The measurement snapshot the next update will integrate from.
    last_sens: Option<ModuleSens>,

    pub(crate) report: StatusReport,

    arch_pose: Archiver,
}

/// Input data to Odometry.
#[derive(Debug, Default, Clone, Copy)]
pub struct InputData {
    /// The heading read from the gyroscope this cycle.
    ///
    /// Units: radians
    pub heading_rad: f64,

    /// The module sensor readings taken this cycle.
    pub module_sens: ModuleSens,
}

/// Status report for Odom processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// Body-frame displacement integrated this cycle.
    pub delta_x_m: f64,
    pub delta_y_m: f64,
}

// ---------------------------------------------------------------------------
// ARCHIVE RECORDS
// ---------------------------------------------------------------------------

/// Flat record of the pose for the csv archive.
#[derive(Serialize)]
struct PoseRecord {
    time_s: f64,
    x_m: f64,
    y_m: f64,
    heading_rad: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for Odom {
    type InitData = SwerveKinematics;
    type InitError = OdomError;

    type InputData = InputData;
    type OutputData = Pose;
    type StatusReport = StatusReport;
    type ProcError = OdomError;

    /// Initialise the Odom module.
    ///
    /// Expected init data is the precomputed kinematics transform. A baseline
    /// must still be established with [`Odom::reset`] before the first call
    /// to `proc`.
    fn init(
        &mut self,
        init_data: Self::InitData,
        session: &Session,
    ) -> Result<(), Self::InitError> {
        self.kinematics = Some(init_data);

        // Create the arch folder for odom
        let mut arch_path = session.arch_root.clone();
        arch_path.push("odom");
        std::fs::create_dir_all(arch_path).unwrap();

        self.arch_pose = Archiver::from_path(session, "odom/pose.csv").unwrap();

        Ok(())
    }

    /// Perform cyclic processing of Odometry.
    ///
    /// Each call consumes exactly one measurement snapshot and advances the
    /// pose exactly once. Cycles must not be skipped or double-applied, the
    /// pose is a monotonic accumulation over them.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        self.report = StatusReport::default();

        let kinematics = match self.kinematics {
            Some(ref k) => k,
            None => return Err(OdomError::NotInitialised),
        };

        let mut pose = self.pose.ok_or(OdomError::NoBaseline)?;
        let last_sens = self.last_sens.ok_or(OdomError::NoBaseline)?;

        // Form the per-module displacement observations: the change in
        // cumulative distance since the last snapshot, at the current steer
        // angle. The kinematics relation is linear so it maps displacements
        // exactly as it maps velocities.
        let mut deltas = [ModuleState::default(); NUM_MODULES];
        for i in 0..NUM_MODULES {
            deltas[i] = ModuleState {
                speed_ms: input_data.module_sens.drv_dist_m[i]
                    - last_sens.drv_dist_m[i],
                angle_rad: input_data.module_sens.str_abs_pos_rad[i],
            };
        }

        // Least-squares body-frame displacement over this cycle
        let delta = kinematics.to_chassis_motion(&deltas);

        self.report.delta_x_m = delta.vx_ms;
        self.report.delta_y_m = delta.vy_ms;

        // Rotate the body-frame displacement into the field frame using the
        // current heading and accumulate
        let (sin_h, cos_h) = input_data.heading_rad.sin_cos();

        pose.position_m_lm[0] += delta.vx_ms * cos_h - delta.vy_ms * sin_h;
        pose.position_m_lm[1] += delta.vx_ms * sin_h + delta.vy_ms * cos_h;

        // Heading comes straight from the sensor, not from integration
        pose.heading_rad = input_data.heading_rad;

        self.pose = Some(pose);
        self.last_sens = Some(input_data.module_sens);

        Ok((pose, self.report))
    }
}

impl Archived for Odom {
    fn write(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(ref pose) = self.pose {
            self.arch_pose.serialise(PoseRecord {
                time_s: util::session::get_elapsed_seconds(),
                x_m: pose.position_m_lm[0],
                y_m: pose.position_m_lm[1],
                heading_rad: pose.heading_rad,
            })?;
        }

        Ok(())
    }
}

impl Odom {
    /// Reset the accumulated pose to a known value.
    ///
    /// The given measurements become the new integration baseline. This must
    /// be called before the first `proc`, and whenever ground truth (for
    /// example a known starting pose for an autonomous routine) is
    /// available.
    pub fn reset(&mut self, pose: Pose, module_sens: &ModuleSens) {
        self.pose = Some(pose);
        self.last_sens = Some(*module_sens);
    }

    /// Get the current pose estimate, if one has been established.
    pub fn pose(&self) -> Option<&Pose> {
        self.pose.as_ref()
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    const FRAC_PI_2: f64 = std::f64::consts::FRAC_PI_2;

    fn test_odom() -> Odom {
        let kinematics = SwerveKinematics::new(&[
            [0.25, 0.25],
            [0.25, -0.25],
            [-0.25, 0.25],
            [-0.25, -0.25],
        ])
        .unwrap();

        Odom {
            kinematics: Some(kinematics),
            ..Default::default()
        }
    }

    #[test]
    fn test_update_without_reset_fails() {
        let mut odom = test_odom();

        assert!(matches!(
            odom.proc(&InputData::default()),
            Err(OdomError::NoBaseline)
        ));
    }

    #[test]
    fn test_no_motion_is_idempotent() {
        let mut odom = test_odom();

        let start = Pose {
            position_m_lm: [1.0, -2.0],
            heading_rad: 0.3,
        };
        let sens = ModuleSens::default();

        odom.reset(start, &sens);

        // Many updates with zero net module displacement and constant
        // heading must leave the pose where it started
        for _ in 0..100 {
            let (pose, _) = odom
                .proc(&InputData {
                    heading_rad: 0.3,
                    module_sens: sens,
                })
                .unwrap();

            assert!((pose.position_m_lm[0] - 1.0).abs() < 1e-12);
            assert!((pose.position_m_lm[1] + 2.0).abs() < 1e-12);
            assert_eq!(pose.heading_rad, 0.3);
        }
    }

    #[test]
    fn test_straight_line_accumulation() {
        let mut odom = test_odom();

        odom.reset(Pose::default(), &ModuleSens::default());

        // Constant 1.5 m/s forwards at zero heading for 10 s of 20 ms cycles
        let speed_ms = 1.5;
        let dt_s = 0.02;
        let cycles = 500;

        let mut sens = ModuleSens::default();
        let mut pose = Pose::default();

        for _ in 0..cycles {
            for i in 0..4 {
                sens.drv_dist_m[i] += speed_ms * dt_s;
            }

            let (p, _) = odom
                .proc(&InputData {
                    heading_rad: 0.0,
                    module_sens: sens,
                })
                .unwrap();
            pose = p;
        }

        assert!((pose.position_m_lm[0] - speed_ms * dt_s * cycles as f64).abs() < 1e-9);
        assert!(pose.position_m_lm[1].abs() < 1e-9);
    }

    #[test]
    fn test_heading_rotates_displacement_into_field_frame() {
        let mut odom = test_odom();

        odom.reset(Pose::default(), &ModuleSens::default());

        // Modules rolling forwards (angle zero) while the nose points
        // field-left: the displacement must accumulate along field Y
        let mut sens = ModuleSens::default();
        for i in 0..4 {
            sens.drv_dist_m[i] = 2.0;
        }

        let (pose, _) = odom
            .proc(&InputData {
                heading_rad: FRAC_PI_2,
                module_sens: sens,
            })
            .unwrap();

        assert!(pose.position_m_lm[0].abs() < 1e-9);
        assert!((pose.position_m_lm[1] - 2.0).abs() < 1e-9);
        assert_eq!(pose.heading_rad, FRAC_PI_2);
    }

    #[test]
    fn test_reset_rebaselines_measurements() {
        let mut odom = test_odom();

        // Distances already accumulated before the reset must not be applied
        // to the new pose
        let mut sens = ModuleSens::default();
        for i in 0..4 {
            sens.drv_dist_m[i] = 123.0;
        }

        odom.reset(Pose::default(), &sens);

        let (pose, _) = odom
            .proc(&InputData {
                heading_rad: 0.0,
                module_sens: sens,
            })
            .unwrap();

        assert!(pose.position_m_lm[0].abs() < 1e-12);
        assert!(pose.position_m_lm[1].abs() < 1e-12);
    }
}
