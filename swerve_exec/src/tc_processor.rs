//! # Telecommand processor module
//!
//! The telecommand processor handles TCs coming from any source.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, warn};

// Internal
use comms_if::tc::Tc;
use swerve_lib::data_store::{DataStore, SafeModeCause};

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Execute a telecommand.
///
/// Mutates the datastore to send commands to different modules. While the
/// vehicle is in safe mode only `MakeUnsafe` is accepted, everything else is
/// dropped with a warning.
pub(crate) fn exec(ds: &mut DataStore, tc: &Tc) {
    // Safe mode gate
    if ds.safe && !matches!(tc, Tc::MakeUnsafe) {
        warn!("In safe mode, dropping TC: {:?}", tc);
        return;
    }

    // Handle different Tcs
    match tc {
        Tc::MakeSafe => {
            debug!("Recieved MakeSafe command");
            ds.make_safe(SafeModeCause::MakeSafeTc);
        }
        Tc::MakeUnsafe => {
            debug!("Recieved MakeUnsafe command");
            ds.make_unsafe(SafeModeCause::MakeSafeTc).ok();
        }
        Tc::Drive(cmd) => {
            ds.drive_cmd = Some(*cmd);
        }
        Tc::SelfRight(cmd) => {
            ds.self_right_cmd = Some(*cmd);
        }
        Tc::LoadTraj(spec) => {
            ds.pending_traj = Some(spec.clone());
        }
        Tc::AbortTraj => {
            ds.abort_traj = true;
        }
        Tc::ZeroHeading => {
            ds.zero_heading_request = true;
        }
        Tc::ResetOdom(pose_spec) => {
            ds.odom_reset_request = Some(*pose_spec);
        }
    }
}
