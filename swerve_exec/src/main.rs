//! Main swerve drive control executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop:
//!         - System input acquisition:
//!             - Module sensing
//!             - IMU sensing
//!         - Telecommand processing and handling
//!         - Odometry processing
//!         - Control source arbitration:
//!             - Self-right (attitude hold)
//!             - Trajectory control
//!             - Field-oriented operator drive
//!         - Swerve control processing
//!         - Actuation
//!
//! # Modules
//!
//! All cyclic modules (e.g. `swerve_ctrl`) shall meet the following
//! requirements:
//!     1. Provide a public struct implementing the `util::module::State`
//!        trait, or an equivalent `init`/`proc` pair for commanded modules.

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use swerve_lib::{
    data_store::{DataStore, SafeModeCause},
    field_drive, odom,
    odom::Pose,
    self_right::SelfRight,
    sim_client::SimClient,
    swerve_ctrl::{self, SwerveCmd},
    traj_ctrl::{TrajCtrl, Trajectory},
};

mod tc_processor;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{info, warn};
use std::env;
use std::thread;
use std::time::{Duration, Instant};

// Internal
use comms_if::tc::drive::SelfRightCmd;
use util::{
    archive::Archived,
    logger::{logger_init, LevelFilter},
    module::State,
    script_interpreter::{PendingTcs, ScriptInterpreter},
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Target period of one cycle.
const CYCLE_PERIOD_S: f64 = 0.02;

/// Number of cycles per second
const CYCLE_FREQUENCY_HZ: f64 = 1.0 / CYCLE_PERIOD_S;

/// Limit on the number of consecutive cycle overruns before safe mode is
/// engaged.
const MAX_CONSEC_CYCLE_OVERRUNS: u64 = 25;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session =
        Session::new("swerve_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Swerve Drive Control Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- INITIALISE TC SOURCE ----

    // Collect all arguments
    let args: Vec<String> = env::args().collect();

    // A single argument giving the drive script is expected
    if args.len() != 2 {
        return Err(eyre!(
            "Expected exactly one argument (the drive script path), found {}",
            args.len() - 1
        ));
    }

    info!("Loading script from \"{}\"", &args[1]);

    let mut script =
        ScriptInterpreter::new(&args[1]).wrap_err("Failed to load script")?;

    info!(
        "Loaded script lasts {:.02} s and contains {} TCs\n",
        script.get_duration(),
        script.get_num_tcs()
    );

    // ---- INITIALISE DATASTORE ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();

    // ---- INITIALISE MODULES ----

    ds.swerve_ctrl
        .init("swerve_ctrl.toml", &session)
        .wrap_err("Failed to initialise SwerveCtrl")?;
    info!("SwerveCtrl init complete");

    // The kinematics transform and velocity ceilings are owned by
    // SwerveCtrl; everything downstream gets them injected from here so a
    // single authoritative set governs the pipeline.
    let kinematics = ds
        .swerve_ctrl
        .kinematics()
        .ok_or(eyre!("SwerveCtrl has no kinematics after init"))?
        .clone();
    let limits = ds.swerve_ctrl.limits();

    ds.field_drive
        .init(
            field_drive::InitData {
                params_path: "field_drive.toml",
                limits,
            },
            &session,
        )
        .wrap_err("Failed to initialise FieldDrive")?;
    info!("FieldDrive init complete");

    ds.odom
        .init(kinematics.clone(), &session)
        .wrap_err("Failed to initialise Odom")?;
    info!("Odom init complete");

    let mut traj_ctrl = TrajCtrl::init("traj_ctrl.toml", limits)
        .wrap_err("Failed to initialise TrajCtrl")?;
    info!("TrajCtrl init complete");

    let mut self_right = SelfRight::init("self_right.toml", limits)
        .wrap_err("Failed to initialise SelfRight")?;
    info!("SelfRight init complete");

    let mut sim_client =
        SimClient::new("sim_client.toml", kinematics, ds.swerve_ctrl.params())
            .wrap_err("Failed to initialise SimClient")?;
    info!("SimClient init complete");

    info!("Module initialisation complete\n");

    // Establish the odometry baseline at the field origin. An autonomous
    // routine resets this to its known starting pose via the ResetOdom TC.
    ds.module_sens = sim_client.module_sens();
    ds.odom.reset(Pose::default(), &ds.module_sens);

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // Clear items that need wiping at the start of the cycle
        ds.cycle_start(CYCLE_FREQUENCY_HZ);

        // ---- DATA INPUT ----

        ds.module_sens = sim_client.module_sens();
        ds.imu_sens = sim_client.imu_sens();

        // ---- TELECOMMAND PROCESSING ----

        match script.get_pending_tcs() {
            PendingTcs::None => (),
            PendingTcs::Some(tc_vec) => {
                for tc in tc_vec.iter() {
                    tc_processor::exec(&mut ds, tc);
                }
            }
            // Exit if end of script reached
            PendingTcs::EndOfScript => {
                info!("End of TC script reached, stopping");
                break;
            }
        }

        // Zero the heading before any control uses it this cycle
        if ds.zero_heading_request {
            sim_client.zero_heading();
            ds.imu_sens = sim_client.imu_sens();
            ds.zero_heading_request = false;
            info!("Heading zeroed");
        }

        // ---- ODOMETRY PROCESSING ----

        if let Some(pose_spec) = ds.odom_reset_request.take() {
            ds.odom.reset(Pose::from_spec(&pose_spec), &ds.module_sens);
            info!("Odometry reset");
        }

        match ds.odom.proc(&odom::InputData {
            heading_rad: ds.imu_sens.yaw_rad,
            module_sens: ds.module_sens,
        }) {
            Ok((pose, report)) => {
                ds.pose = Some(pose);
                ds.odom_status_rpt = report;
            }
            Err(e) => warn!("Error during Odom processing: {}", e),
        }

        // ---- CONTROL SOURCE ARBITRATION ----

        // Self-right start/stop requests
        match ds.self_right_cmd.take() {
            Some(SelfRightCmd::Start) => self_right.start(),
            Some(SelfRightCmd::Stop) => self_right.interrupt(),
            None => (),
        }

        // An operator drive command takes back control from the continuous
        // commands: self-right is interrupted and any trajectory aborted
        if ds.drive_cmd.is_some() {
            self_right.interrupt();
            traj_ctrl.abort_trajectory();
        }

        // Trajectory load/abort requests
        if let Some(traj_spec) = ds.pending_traj.take() {
            match Trajectory::from_spec(&traj_spec) {
                Ok(trajectory) => match traj_ctrl.begin_trajectory(trajectory) {
                    Ok(()) => (),
                    Err(e) => warn!("Could not begin trajectory: {}", e),
                },
                Err(e) => warn!("Invalid trajectory spec: {}", e),
            }
        }
        if ds.abort_traj {
            traj_ctrl.abort_trajectory();
            ds.abort_traj = false;
        }

        // FieldDrive always processes so that operator axes stay current
        // even while a higher-priority source is driving
        ds.field_drive_input.cmd = ds.drive_cmd.take();
        ds.field_drive_input.heading_rad = ds.imu_sens.yaw_rad;

        let field_cmd = match ds.field_drive.proc(&ds.field_drive_input) {
            Ok((cmd, report)) => {
                ds.field_drive_status_rpt = report;
                Some(cmd)
            }
            Err(e) => {
                warn!("Error during FieldDrive processing: {}", e);
                None
            }
        };

        let (self_right_cmd, _) = self_right.proc(&ds.imu_sens, CYCLE_PERIOD_S);

        let traj_cmd = match traj_ctrl.proc(&ds.pose, CYCLE_PERIOD_S) {
            Ok((cmd, _report)) => cmd,
            Err(e) => {
                warn!("Error during TrajCtrl processing: {}", e);
                Some(SwerveCmd::Stop)
            }
        };

        // Priority order: safe mode, then self-right, then trajectory, then
        // the default operator drive
        ds.swerve_ctrl_input.cmd = if ds.safe {
            Some(SwerveCmd::Stop)
        } else if self_right_cmd.is_some() {
            self_right_cmd
        } else if traj_cmd.is_some() {
            traj_cmd
        } else {
            field_cmd
        };

        // ---- CONTROL ALGORITHM PROCESSING ----

        match ds.swerve_ctrl.proc(&ds.swerve_ctrl_input) {
            Ok((output, report)) => {
                ds.swerve_ctrl_output = output;
                ds.swerve_ctrl_status_rpt = report;
            }
            Err(e) => {
                // SwerveCtrl errors usually just mean you sent the wrong TC,
                // so just issue the warning and continue. The output remains
                // at its safe default (zero voltage).
                warn!("Error during SwerveCtrl processing: {}", e)
            }
        };

        // ---- ACTUATION ----

        sim_client.step(&ds.swerve_ctrl_output, CYCLE_PERIOD_S);

        // ---- WRITE ARCHIVES ----

        if let Err(e) = ds.swerve_ctrl.write() {
            warn!("Could not write SwerveCtrl archives: {}", e);
        }
        if let Err(e) = ds.odom.write() {
            warn!("Could not write Odom archives: {}", e);
        }

        // ---- TELEMETRY ----

        if ds.is_1_hz_cycle {
            if let Some(pose) = ds.pose {
                session.save(format!("tm/pose_{:06}.json", ds.num_cycles), pose);
            }
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match Duration::from_secs_f64(CYCLE_PERIOD_S).checked_sub(cycle_dur) {
            Some(d) => {
                ds.num_consec_cycle_overruns = 0;
                thread::sleep(d);
            }
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - CYCLE_PERIOD_S
                );
                ds.num_consec_cycle_overruns += 1;

                // A control loop which can't keep its period isn't driving
                // the vehicle it thinks it is
                if ds.num_consec_cycle_overruns > MAX_CONSEC_CYCLE_OVERRUNS {
                    ds.make_safe(SafeModeCause::CycleOverrunLimit);
                }
            }
        }

        // Increment cycle counter
        ds.num_cycles += 1;
    }

    // ---- SHUTDOWN ----

    // Never leave the actuators at a stale nonzero command: issue a final
    // stop before exiting
    ds.swerve_ctrl.make_safe();
    match ds.swerve_ctrl.proc(&swerve_ctrl::InputData {
        cmd: Some(SwerveCmd::Stop),
    }) {
        Ok((output, _)) => sim_client.step(&output, CYCLE_PERIOD_S),
        Err(e) => warn!("Could not issue final stop: {}", e),
    }

    info!("End of execution");

    session.exit();

    Ok(())
}
