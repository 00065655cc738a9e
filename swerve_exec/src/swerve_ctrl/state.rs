//! Implementations for the SwerveCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use serde::Serialize;

// Internal
use super::{
    desaturate, ChassisMotion, Params, SwerveCtrlError, SwerveKinematics,
    NUM_MODULES,
};
use comms_if::eqpt::swerve::{ModuleDems, ModuleId};
use util::{
    archive::{Archived, Archiver},
    module::State,
    params,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Swerve control module state
#[derive(Default)]
pub struct SwerveCtrl {
    pub(crate) params: Params,

    /// The kinematics transform, built once from the geometry at init.
    kinematics: Option<SwerveKinematics>,

    pub(crate) report: StatusReport,
    arch_report: Archiver,

    current_cmd: Option<SwerveCmd>,

    output: Option<ModuleDems>,
    arch_output: Archiver,
}

/// Input data to Swerve control.
#[derive(Debug, Default, Clone, Copy)]
pub struct InputData {
    /// The command to be executed, or `None` if there is no new command on
    /// this cycle.
    pub cmd: Option<SwerveCmd>,
}

/// Status report for SwerveCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// True if the commanded motion had to be scaled down to respect the
    /// module speed ceiling.
    pub desaturated: bool,

    /// The largest commanded module speed after desaturation.
    pub max_module_speed_ms: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A command that can be executed by Swerve control.
#[derive(Debug, Clone, Copy)]
pub enum SwerveCmd {
    /// Drive with the given body-frame chassis motion.
    Motion(ChassisMotion),

    /// Stop the vehicle, maintaining the current steer angles but dropping
    /// all drive voltages to zero.
    Stop,
}

// ---------------------------------------------------------------------------
// ARCHIVE RECORDS
// ---------------------------------------------------------------------------

/// Flat record of the output demands for the csv archive.
#[derive(Serialize)]
struct OutputRecord {
    time_s: f64,
    drv_voltage_fl_v: f64,
    drv_voltage_fr_v: f64,
    drv_voltage_bl_v: f64,
    drv_voltage_br_v: f64,
    str_pos_fl_rad: f64,
    str_pos_fr_rad: f64,
    str_pos_bl_rad: f64,
    str_pos_br_rad: f64,
}

/// Flat record of the status report for the csv archive.
#[derive(Serialize)]
struct ReportRecord {
    time_s: f64,
    desaturated: bool,
    max_module_speed_ms: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for SwerveCtrl {
    type InitData = &'static str;
    type InitError = SwerveCtrlError;

    type InputData = InputData;
    type OutputData = ModuleDems;
    type StatusReport = StatusReport;
    type ProcError = SwerveCtrlError;

    /// Initialise the SwerveCtrl module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(
        &mut self,
        init_data: Self::InitData,
        session: &Session,
    ) -> Result<(), Self::InitError> {
        // Load the parameters
        self.params = params::load(init_data)
            .map_err(SwerveCtrlError::ParamLoadError)?;

        // Precompute the kinematics transform from the geometry
        self.kinematics = Some(
            SwerveKinematics::new(&self.params.module_pos_m_rb)
                .map_err(SwerveCtrlError::InvalidGeometry)?,
        );

        // Create the arch folder for swerve_ctrl
        let mut arch_path = session.arch_root.clone();
        arch_path.push("swerve_ctrl");
        std::fs::create_dir_all(arch_path).unwrap();

        // Initialise the archivers
        self.arch_report =
            Archiver::from_path(session, "swerve_ctrl/status_report.csv")
                .unwrap();
        self.arch_output =
            Archiver::from_path(session, "swerve_ctrl/output.csv").unwrap();

        Ok(())
    }

    /// Perform cyclic processing of Swerve control.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        // Clear the status report
        self.report = StatusReport::default();

        // Check to see if there's a new command
        if let Some(cmd) = input_data.cmd {
            self.current_cmd = Some(cmd);
        }

        // Calculate the output demands for the current command. With no
        // command yet received the output holds the default (zero) position
        // and voltage.
        let output = match self.current_cmd {
            Some(SwerveCmd::Motion(motion)) if !motion.is_zero() => {
                self.calc_motion(&motion)?
            }
            Some(_) => self.calc_stop(),
            None => ModuleDems::default(),
        };

        trace!(
            "SwerveCtrl output:\n    drv: {:?}\n    str: {:?}",
            output.drv_voltage_v,
            output.str_abs_pos_rad
        );

        // Update the output in self
        self.output = Some(output);

        Ok((output, self.report))
    }
}

impl Archived for SwerveCtrl {
    fn write(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let time_s = util::session::get_elapsed_seconds();

        self.arch_report.serialise(ReportRecord {
            time_s,
            desaturated: self.report.desaturated,
            max_module_speed_ms: self.report.max_module_speed_ms,
        })?;

        if let Some(ref output) = self.output {
            self.arch_output.serialise(OutputRecord {
                time_s,
                drv_voltage_fl_v: output.drv_voltage_v[0],
                drv_voltage_fr_v: output.drv_voltage_v[1],
                drv_voltage_bl_v: output.drv_voltage_v[2],
                drv_voltage_br_v: output.drv_voltage_v[3],
                str_pos_fl_rad: output.str_abs_pos_rad[0],
                str_pos_fr_rad: output.str_abs_pos_rad[1],
                str_pos_bl_rad: output.str_abs_pos_rad[2],
                str_pos_br_rad: output.str_abs_pos_rad[3],
            })?;
        }

        Ok(())
    }
}

impl SwerveCtrl {
    /// Get the precomputed kinematics transform.
    ///
    /// Returns `None` if the module hasn't been initialised yet.
    pub fn kinematics(&self) -> Option<&SwerveKinematics> {
        self.kinematics.as_ref()
    }

    /// Get the module's parameters.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Get the authoritative chassis velocity ceilings, for injection into
    /// the other control modules.
    pub fn limits(&self) -> super::DriveLimits {
        self.params.limits()
    }

    /// Put the module into a safe state.
    ///
    /// The current command is replaced by a stop, so that from the next cycle
    /// onwards all drive voltages are zero with the steer angles held.
    pub fn make_safe(&mut self) {
        self.current_cmd = Some(SwerveCmd::Stop);
    }

    /// Calculate the module demands for a motion command.
    ///
    /// The chassis motion is mapped through the kinematics, desaturated to
    /// the module speed ceiling, and scaled into the actuator voltage range.
    fn calc_motion(
        &mut self,
        motion: &ChassisMotion,
    ) -> Result<ModuleDems, SwerveCtrlError> {
        let kinematics = match self.kinematics {
            Some(ref k) => k,
            None => return Err(SwerveCtrlError::NotInitialised),
        };

        let mut states = kinematics.to_module_states(motion);

        // Desaturation must run on every cycle between the kinematics and
        // actuation. Clamping wheels individually downstream instead would
        // break the intended centre of rotation.
        self.report.desaturated =
            desaturate(&mut states, self.params.max_speed_ms);
        self.report.max_module_speed_ms = states
            .iter()
            .map(|s| s.speed_ms.abs())
            .fold(0f64, f64::max);

        // Scale each module speed into the actuator voltage range. The
        // steer angle passes through unchanged, shortest-path steering is the
        // actuator's responsibility.
        let mut dems = ModuleDems::default();
        for id in ModuleId::ALL.iter() {
            let i = id.index();
            dems.drv_voltage_v[i] = states[i].speed_ms
                / self.params.max_speed_ms
                * self.params.max_voltage_v
                * self.params.drive_voltage_scale;
            dems.str_abs_pos_rad[i] = states[i].angle_rad;
        }

        Ok(dems)
    }

    /// Calculate the module demands for a stop.
    ///
    /// The stop command shall:
    ///     1. Maintain the current steer axis positions
    ///     2. Set all drive voltages to zero.
    ///
    /// Stop shall never error and must always succeed in bringing the
    /// vehicle to a full and complete stop. A module is never commanded to
    /// snap to a default angle when commanded to stop, only its voltage
    /// drops to zero.
    fn calc_stop(&mut self) -> ModuleDems {
        match self.output {
            Some(previous) => ModuleDems {
                drv_voltage_v: [0.0; NUM_MODULES],
                str_abs_pos_rad: previous.str_abs_pos_rad,
            },
            None => ModuleDems::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    /// Build an initialised module without going through a param file.
    fn test_ctrl() -> SwerveCtrl {
        let params = Params {
            module_pos_m_rb: [
                [0.25, 0.25],
                [0.25, -0.25],
                [-0.25, 0.25],
                [-0.25, -0.25],
            ],
            max_speed_ms: 4.0,
            max_omega_rads: 11.0,
            max_voltage_v: 12.0,
            drive_voltage_scale: 0.5,
        };

        SwerveCtrl {
            kinematics: Some(
                SwerveKinematics::new(&params.module_pos_m_rb).unwrap(),
            ),
            params,
            ..Default::default()
        }
    }

    #[test]
    fn test_voltage_scaling() {
        let mut ctrl = test_ctrl();

        // Full forward speed maps to the attenuated maximum voltage at zero
        // angle on every module
        let (dems, report) = ctrl
            .proc(&InputData {
                cmd: Some(SwerveCmd::Motion(ChassisMotion {
                    vx_ms: 4.0,
                    vy_ms: 0.0,
                    omega_rads: 0.0,
                })),
            })
            .unwrap();

        for i in 0..NUM_MODULES {
            assert!((dems.drv_voltage_v[i] - 6.0).abs() < 1e-12);
            assert!(dems.str_abs_pos_rad[i].abs() < 1e-12);
        }
        assert!(!report.desaturated);
    }

    #[test]
    fn test_desaturation_reported() {
        let mut ctrl = test_ctrl();

        let (dems, report) = ctrl
            .proc(&InputData {
                cmd: Some(SwerveCmd::Motion(ChassisMotion {
                    vx_ms: 8.0,
                    vy_ms: 0.0,
                    omega_rads: 0.0,
                })),
            })
            .unwrap();

        assert!(report.desaturated);
        assert!((report.max_module_speed_ms - 4.0).abs() < 1e-12);

        // After desaturation the voltage must be at the scaled maximum, not
        // beyond it
        for i in 0..NUM_MODULES {
            assert!((dems.drv_voltage_v[i] - 6.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_zero_motion_holds_angles() {
        let mut ctrl = test_ctrl();

        // Command a strafe to the left so that all modules point at 90 deg
        let (dems, _) = ctrl
            .proc(&InputData {
                cmd: Some(SwerveCmd::Motion(ChassisMotion {
                    vx_ms: 0.0,
                    vy_ms: 2.0,
                    omega_rads: 0.0,
                })),
            })
            .unwrap();
        let strafe_angles = dems.str_abs_pos_rad;

        // An exactly-zero motion must hold the previous angles with zero
        // voltage
        let (dems, _) = ctrl
            .proc(&InputData {
                cmd: Some(SwerveCmd::Motion(ChassisMotion::default())),
            })
            .unwrap();

        assert_eq!(dems.str_abs_pos_rad, strafe_angles);
        assert_eq!(dems.drv_voltage_v, [0.0; NUM_MODULES]);
    }

    #[test]
    fn test_no_command_coasts() {
        let mut ctrl = test_ctrl();

        let (_, _) = ctrl
            .proc(&InputData {
                cmd: Some(SwerveCmd::Motion(ChassisMotion {
                    vx_ms: 1.0,
                    vy_ms: 1.0,
                    omega_rads: 0.0,
                })),
            })
            .unwrap();

        // The command is held between cycles: a cycle without a new command
        // keeps driving rather than snapping to a stop
        let (dems, _) = ctrl.proc(&InputData { cmd: None }).unwrap();
        assert!(dems.drv_voltage_v[0] > 0.0);
    }

    #[test]
    fn test_make_safe() {
        let mut ctrl = test_ctrl();

        let (dems, _) = ctrl
            .proc(&InputData {
                cmd: Some(SwerveCmd::Motion(ChassisMotion {
                    vx_ms: 0.0,
                    vy_ms: 2.0,
                    omega_rads: 0.0,
                })),
            })
            .unwrap();
        let strafe_angles = dems.str_abs_pos_rad;

        ctrl.make_safe();

        let (dems, _) = ctrl.proc(&InputData { cmd: None }).unwrap();
        assert_eq!(dems.drv_voltage_v, [0.0; NUM_MODULES]);
        assert_eq!(dems.str_abs_pos_rad, strafe_angles);
    }
}
