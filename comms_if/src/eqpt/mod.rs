//! # Equipment interface module
//!
//! Data exchanged with the equipment collaborators: the swerve module
//! mechanisms and the IMU.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

pub mod swerve;
