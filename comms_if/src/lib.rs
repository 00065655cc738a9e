//! # Communications interface
//!
//! This library defines the vocabulary shared between the control executable
//! and its collaborators: telecommands coming in from the operator (or a
//! script), and the equipment data exchanged with the mechanisms and IMU.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod eqpt;
pub mod tc;
