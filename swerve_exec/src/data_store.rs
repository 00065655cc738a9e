//! # Data Store

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::{
    eqpt::swerve::{ImuSens, ModuleDems, ModuleSens},
    tc::drive::{DriveCmd, SelfRightCmd},
    tc::traj::{PoseSpec, TrajSpec},
};
use log::{info, warn};

use crate::{
    field_drive::{self, FieldDrive},
    odom::{self, Odom, Pose},
    swerve_ctrl::{self, SwerveCtrl},
};

// ---------------------------------------------------------------------------
// ENUMS
// ---------------------------------------------------------------------------

/// Gives the reason the vehicle has been put into safe mode
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum SafeModeCause {
    MakeSafeTc,
    CycleOverrunLimit,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
#[derive(Default)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// True if this cycle falls on a 1Hz boundary
    pub is_1_hz_cycle: bool,

    // Safe mode variables
    /// Determines if the vehicle is in safe mode.
    pub safe: bool,

    /// Gives the reason for the vehicle being in safe mode.
    pub safe_cause: Option<SafeModeCause>,

    // Sensors
    /// Module sensor readings taken at the start of this cycle
    pub module_sens: ModuleSens,

    /// IMU readings taken at the start of this cycle
    pub imu_sens: ImuSens,

    // Localisation
    pub pose: Option<Pose>,

    // FieldDrive
    pub field_drive: FieldDrive,
    pub field_drive_input: field_drive::InputData,
    pub field_drive_status_rpt: field_drive::StatusReport,

    // SwerveCtrl
    pub swerve_ctrl: SwerveCtrl,
    pub swerve_ctrl_input: swerve_ctrl::InputData,
    pub swerve_ctrl_output: ModuleDems,
    pub swerve_ctrl_status_rpt: swerve_ctrl::StatusReport,

    // Odom
    pub odom: Odom,
    pub odom_status_rpt: odom::StatusReport,

    // Telecommand requests routed to the modules owned by the main loop
    pub drive_cmd: Option<DriveCmd>,
    pub self_right_cmd: Option<SelfRightCmd>,
    pub pending_traj: Option<TrajSpec>,
    pub abort_traj: bool,
    pub zero_heading_request: bool,
    pub odom_reset_request: Option<PoseSpec>,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Puts the vehicle into safe mode with the given cause.
    pub fn make_safe(&mut self, cause: SafeModeCause) {
        if !self.safe {
            warn!("Make safe requested, cause: {:?}", cause);
            self.safe = true;
            self.safe_cause = Some(cause);

            // Make swerve_ctrl safe
            self.swerve_ctrl.make_safe();
        }
    }

    /// Attempts to disable the safe mode by clearing the given cause.
    ///
    /// Returns `Ok(())` if this cause was cleared and safe mode was disabled,
    /// or `Err(())` otherwise. To remove safe mode the provided cause must
    /// match the initial reason for safe mode being enabled.
    ///
    /// If safe mode was not enabled `Ok(())` is returned
    pub fn make_unsafe(&mut self, cause: SafeModeCause) -> Result<(), ()> {
        if !self.safe {
            return Ok(());
        }

        match self.safe_cause {
            Some(root_cause) => {
                if cause == root_cause {
                    self.safe = false;
                    self.safe_cause = None;
                    info!("Make unsafe requested, root cause match, safe mode disabled");
                    Ok(())
                } else {
                    Err(())
                }
            }
            None => Ok(()),
        }
    }

    /// Perform actions required at the start of a cycle.
    ///
    /// Clears those items that need clearing at the start of a cycle, and
    /// sets the 1Hz cycle flag.
    pub fn cycle_start(&mut self, cycle_frequency_hz: f64) {
        self.is_1_hz_cycle = self.num_cycles % (cycle_frequency_hz as u128) == 0;

        self.field_drive_input = field_drive::InputData::default();
        self.field_drive_status_rpt = field_drive::StatusReport::default();

        self.swerve_ctrl_input = swerve_ctrl::InputData::default();
        self.swerve_ctrl_output = ModuleDems::default();
        self.swerve_ctrl_status_rpt = swerve_ctrl::StatusReport::default();

        self.odom_status_rpt = odom::StatusReport::default();
    }
}
