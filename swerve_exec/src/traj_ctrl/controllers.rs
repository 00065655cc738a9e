//! # Trajectory controllers module
//!
//! This module provides the PID controllers used for TrajCtrl, including
//! their error calculations. One controller runs per chassis degree of
//! freedom: X position, Y position, and heading.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use super::TrajPoint;
use crate::odom::Pose;
use crate::swerve_ctrl::ChassisMotion;
use util::maths::{clamp, get_ang_dist};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A PID controller
#[derive(Debug, Serialize, Clone)]
pub struct PidController {
    /// Proportional gain
    k_p: f64,

    /// Integral gain
    k_i: f64,

    /// Dervative gain
    k_d: f64,

    /// Previous error
    prev_error: Option<f64>,

    /// The integral accumulation
    integral: f64,
}

/// The trajectory controllers
#[derive(Debug, Serialize, Clone)]
pub struct TrajControllers {
    /// Field X position error controller
    x_ctrl: PidController,

    /// Field Y position error controller
    y_ctrl: PidController,

    /// Heading error controller
    head_ctrl: PidController,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PidController {
    /// Create a new controller with the given gains.
    pub fn new(k_p: f64, k_i: f64, k_d: f64) -> Self {
        Self {
            k_p,
            k_i,
            k_d,
            integral: 0f64,
            prev_error: None,
        }
    }

    /// Get the value of the controller for the given error.
    ///
    /// The cycle time step is passed in explicitly so that control is
    /// deterministic under the fixed-period loop.
    pub fn get(&mut self, error: f64, dt_s: f64) -> f64 {
        // Accumulate the integral term.
        //
        // If there's no time difference then we don't accumulate the
        // integral. The other option is to add on the error and that will
        // produce a large spike in integral compared to normal operation, so
        // we don't do this.
        if dt_s > 0f64 {
            self.integral += error * dt_s;
        }

        // Calculate the derivative.
        //
        // Without a previous error or a time difference we assume no
        // derivative, for the same reason as for integral.
        let deriv = match self.prev_error {
            Some(e) if dt_s > 0f64 => (error - e) / dt_s,
            _ => 0f64,
        };

        // Remember the previous error
        self.prev_error = Some(error);

        self.k_p * error + self.k_i * self.integral + self.k_d * deriv
    }

    /// Clear the accumulated state, ready for a new control session.
    pub fn reset(&mut self) {
        self.integral = 0f64;
        self.prev_error = None;
    }
}

impl TrajControllers {
    /// Create a new instance of the controllers from the parameters
    pub fn new(params: &super::Params) -> Self {
        Self {
            x_ctrl: PidController::new(
                params.x_k_p, params.x_k_i, params.x_k_d,
            ),
            y_ctrl: PidController::new(
                params.y_k_p, params.y_k_i, params.y_k_d,
            ),
            head_ctrl: PidController::new(
                params.head_k_p, params.head_k_i, params.head_k_d,
            ),
        }
    }

    /// Clear all controller state.
    pub fn reset(&mut self) {
        self.x_ctrl.reset();
        self.y_ctrl.reset();
        self.head_ctrl.reset();
    }

    /// Get the chassis motion demand for the current trajectory sample and
    /// pose.
    ///
    /// The demand is the feed-forward velocity of the sample plus the
    /// controller corrections, limited to the configured speed demands and
    /// rotated from the field frame into the body frame.
    pub fn get_motion_dem(
        &mut self,
        target: &TrajPoint,
        pose: &Pose,
        report: &mut super::StatusReport,
        params: &super::Params,
        dt_s: f64,
    ) -> ChassisMotion {
        // Field-frame position errors
        let x_err_m = target.pose.position_m_lm[0] - pose.position_m_lm[0];
        let y_err_m = target.pose.position_m_lm[1] - pose.position_m_lm[1];

        // Heading error along the shortest angular distance, so control
        // never unwinds through a full turn
        let head_err_rad =
            get_ang_dist(pose.heading_rad, target.pose.heading_rad);

        report.x_error_m = x_err_m;
        report.y_error_m = y_err_m;
        report.head_error_rad = head_err_rad;

        // Enforce limits on position and heading errors
        if x_err_m.hypot(y_err_m) > params.pos_error_limit_m {
            report.pos_error_limit_exceeded = true;
        }
        if head_err_rad.abs() > params.head_error_limit_rad {
            report.head_error_limit_exceeded = true;
        }

        // Feed-forward plus correction on each axis
        let vx_ms = target.vx_ms + self.x_ctrl.get(x_err_m, dt_s);
        let vy_ms = target.vy_ms + self.y_ctrl.get(y_err_m, dt_s);
        let omega_rads = self.head_ctrl.get(head_err_rad, dt_s);

        // Apply the speed demand limits
        let vx_ms = clamp(
            &vx_ms,
            &-params.max_speed_dem_ms,
            &params.max_speed_dem_ms,
        );
        let vy_ms = clamp(
            &vy_ms,
            &-params.max_speed_dem_ms,
            &params.max_speed_dem_ms,
        );
        let omega_rads = clamp(
            &omega_rads,
            &-params.max_omega_dem_rads,
            &params.max_omega_dem_rads,
        );

        // Rotate the demand into the body frame for swerve control
        ChassisMotion::from_field_relative(
            vx_ms,
            vy_ms,
            omega_rads,
            pose.heading_rad,
        )
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_proportional_only() {
        let mut ctrl = PidController::new(2.0, 0.0, 0.0);

        assert_eq!(ctrl.get(1.5, 0.02), 3.0);
        assert_eq!(ctrl.get(-0.5, 0.02), -1.0);
    }

    #[test]
    fn test_integral_accumulates() {
        let mut ctrl = PidController::new(0.0, 1.0, 0.0);

        // Constant error of 1 for 1 s of 20 ms cycles integrates to 1
        let mut out = 0f64;
        for _ in 0..50 {
            out = ctrl.get(1.0, 0.02);
        }
        assert!((out - 1.0).abs() < 1e-9);

        ctrl.reset();
        assert_eq!(ctrl.get(0.0, 0.02), 0.0);
    }

    #[test]
    fn test_derivative() {
        let mut ctrl = PidController::new(0.0, 0.0, 1.0);

        // No derivative on the first sample
        assert_eq!(ctrl.get(1.0, 0.02), 0.0);

        // Error rising by 0.1 over 0.02 s gives a derivative of 5
        assert!((ctrl.get(1.1, 0.02) - 5.0).abs() < 1e-9);
    }
}
