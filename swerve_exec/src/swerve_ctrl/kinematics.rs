//! Swerve kinematics calculations
//!
//! The kinematics of the vehicle are a fixed linear relation between the
//! chassis motion (forward, lateral and angular velocity) and the velocity
//! vector of each module. Each module's velocity is the chassis translational
//! velocity plus the tangential velocity induced by rotation about the centre
//! of the vehicle body:
//!
//! ```text
//! v_i = (vx - omega * r_iy, vy + omega * r_ix)
//! ```
//!
//! where `r_i` is the fixed position of module `i` in the vehicle body frame.
//! The relation is assembled into a matrix once at construction; the inverse
//! mapping (used by odometry) is the least-squares solution of the same
//! relation, since four 2D module observations over-determine the three
//! chassis degrees of freedom.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::{Matrix3, MatrixMN, Vector2, VectorN, U3, U8};
use serde::Serialize;

// Internal
use super::NUM_MODULES;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The vehicle's net instantaneous velocity.
///
/// The frame (vehicle body or field) depends on context; kinematics always
/// operates on body-frame motions. X is forwards, Y is to the left, and
/// `omega` follows the right hand rule about the Z+ (upwards) axis.
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct ChassisMotion {
    /// Forward velocity in meters/second.
    pub vx_ms: f64,

    /// Lateral velocity in meters/second, positive to the left.
    pub vy_ms: f64,

    /// Angular velocity in radians/second, positive counter-clockwise.
    pub omega_rads: f64,
}

/// The demanded or measured state of a single module.
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct ModuleState {
    /// Signed wheel speed in meters/second.
    pub speed_ms: f64,

    /// Steer angle in radians. May be in any range, consumers must normalise.
    pub angle_rad: f64,
}

/// Precomputed transform between chassis motion and module states.
///
/// Built once from the module geometry at init, this must only be recomputed
/// if the module geometry changes.
#[derive(Debug, Clone)]
pub struct SwerveKinematics {
    /// Module steer axis positions in the vehicle body frame.
    module_pos_m_rb: [Vector2<f64>; NUM_MODULES],

    /// Least-squares inverse of the forward kinematics matrix.
    inverse: MatrixMN<f64, U3, U8>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors that can occur when constructing the kinematics.
#[derive(Debug, thiserror::Error)]
pub enum KinematicsError {
    /// The module positions don't span a non-degenerate quadrilateral, so the
    /// kinematics matrix cannot be inverted.
    #[error("The module positions produce a non-invertible kinematics matrix")]
    DegenerateGeometry,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ChassisMotion {
    /// True if this is exactly zero motion on all three axes.
    pub fn is_zero(&self) -> bool {
        self.vx_ms == 0.0 && self.vy_ms == 0.0 && self.omega_rads == 0.0
    }

    /// Build a body-frame motion from a field-relative velocity demand and
    /// the current heading.
    ///
    /// The translational components are rotated by the negative of the
    /// heading, so that a field-forward demand moves the vehicle in the same
    /// field direction regardless of which way its nose points. The rotation
    /// component is frame-independent and passes through unchanged.
    pub fn from_field_relative(
        vx_ms: f64,
        vy_ms: f64,
        omega_rads: f64,
        heading_rad: f64,
    ) -> Self {
        let (sin_h, cos_h) = heading_rad.sin_cos();

        ChassisMotion {
            vx_ms: vx_ms * cos_h + vy_ms * sin_h,
            vy_ms: -vx_ms * sin_h + vy_ms * cos_h,
            omega_rads,
        }
    }
}

impl SwerveKinematics {
    /// Build the kinematics transform from the module positions.
    ///
    /// The forward matrix and its least-squares inverse (via the normal
    /// equations) are computed here once. Geometry which collapses the
    /// normal matrix to singular is rejected.
    pub fn new(
        module_pos_m_rb: &[[f64; 2]; NUM_MODULES],
    ) -> Result<Self, KinematicsError> {
        let mut positions = [Vector2::zeros(); NUM_MODULES];
        for (i, pos) in module_pos_m_rb.iter().enumerate() {
            positions[i] = Vector2::new(pos[0], pos[1]);
        }

        // Assemble the forward matrix, one pair of rows per module:
        //
        //     [vix]   [1  0  -riy] [vx   ]
        //     [viy] = [0  1   rix] [vy   ]
        //                          [omega]
        let mut forward = MatrixMN::<f64, U8, U3>::zeros();
        for (i, pos) in positions.iter().enumerate() {
            forward[(2 * i, 0)] = 1.0;
            forward[(2 * i, 2)] = -pos[1];
            forward[(2 * i + 1, 1)] = 1.0;
            forward[(2 * i + 1, 2)] = pos[0];
        }

        // Least-squares inverse from the normal equations
        let normal: Matrix3<f64> = forward.transpose() * forward;
        let inverse = match normal.try_inverse() {
            Some(n) => n * forward.transpose(),
            None => return Err(KinematicsError::DegenerateGeometry),
        };

        Ok(Self {
            module_pos_m_rb: positions,
            inverse,
        })
    }

    /// Compute the module states required to achieve the given body-frame
    /// chassis motion.
    ///
    /// A zero chassis motion produces zero speeds with all angles at zero;
    /// holding the previously commanded angle in that case is the
    /// responsibility of the caller, which knows what the previous command
    /// was.
    pub fn to_module_states(
        &self,
        motion: &ChassisMotion,
    ) -> [ModuleState; NUM_MODULES] {
        let mut states = [ModuleState::default(); NUM_MODULES];

        for (i, pos) in self.module_pos_m_rb.iter().enumerate() {
            let vx = motion.vx_ms - motion.omega_rads * pos[1];
            let vy = motion.vy_ms + motion.omega_rads * pos[0];

            states[i] = ModuleState {
                speed_ms: vx.hypot(vy),
                angle_rad: vy.atan2(vx),
            };
        }

        states
    }

    /// Compute the body-frame chassis motion implied by the given module
    /// states.
    ///
    /// This is the least-squares solution over the four 2D module velocity
    /// observations. Because the relation is linear it applies equally to
    /// displacements over a cycle, which is how odometry uses it.
    pub fn to_chassis_motion(
        &self,
        states: &[ModuleState; NUM_MODULES],
    ) -> ChassisMotion {
        let mut observations = VectorN::<f64, U8>::zeros();

        for (i, state) in states.iter().enumerate() {
            observations[2 * i] = state.speed_ms * state.angle_rad.cos();
            observations[2 * i + 1] = state.speed_ms * state.angle_rad.sin();
        }

        let solution = self.inverse * observations;

        ChassisMotion {
            vx_ms: solution[0],
            vy_ms: solution[1],
            omega_rads: solution[2],
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Limit the module speeds to the given maximum while preserving the
/// commanded motion.
///
/// If any module's speed exceeds the maximum all module speeds are scaled by
/// the same ratio, keeping the speed ratios between modules, and so the
/// intended direction and curvature of the motion, intact. Angles are never
/// modified. Returns `true` if scaling was applied.
pub fn desaturate(
    states: &mut [ModuleState; NUM_MODULES],
    max_speed_ms: f64,
) -> bool {
    let top_speed_ms = states
        .iter()
        .map(|s| s.speed_ms.abs())
        .fold(0f64, f64::max);

    if top_speed_ms > max_speed_ms {
        let scale = max_speed_ms / top_speed_ms;

        for state in states.iter_mut() {
            state.speed_ms *= scale;
        }

        true
    } else {
        false
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    const FRAC_PI_2: f64 = std::f64::consts::FRAC_PI_2;

    /// Symmetric 0.5 m square test geometry
    fn test_geom() -> [[f64; 2]; NUM_MODULES] {
        [
            [0.25, 0.25],
            [0.25, -0.25],
            [-0.25, 0.25],
            [-0.25, -0.25],
        ]
    }

    #[test]
    fn test_pure_translation() {
        let kin = SwerveKinematics::new(&test_geom()).unwrap();

        // With no rotation all modules must point the same way, at the angle
        // of the translation vector, with equal speeds
        let states = kin.to_module_states(&ChassisMotion {
            vx_ms: 1.0,
            vy_ms: 1.0,
            omega_rads: 0.0,
        });

        for state in states.iter() {
            assert!((state.angle_rad - (1f64).atan2(1f64)).abs() < 1e-12);
            assert!((state.speed_ms - 2f64.sqrt()).abs() < 1e-12);
        }
    }

    #[test]
    fn test_pure_rotation() {
        let geom = test_geom();
        let kin = SwerveKinematics::new(&geom).unwrap();

        let states = kin.to_module_states(&ChassisMotion {
            vx_ms: 0.0,
            vy_ms: 0.0,
            omega_rads: 1.0,
        });

        let radius_m = (0.25f64).hypot(0.25);

        for (state, pos) in states.iter().zip(geom.iter()) {
            // All modules equidistant from the centre turn at the same
            // tangential speed
            assert!((state.speed_ms - radius_m).abs() < 1e-12);

            // Each angle is perpendicular to the module's offset vector
            let offset_ang_rad = pos[1].atan2(pos[0]);
            let ang_diff_rad =
                util::maths::get_ang_dist(offset_ang_rad, state.angle_rad);
            assert!((ang_diff_rad.abs() - FRAC_PI_2).abs() < 1e-12);
        }
    }

    #[test]
    fn test_least_squares_round_trip() {
        let kin = SwerveKinematics::new(&test_geom()).unwrap();

        let motion = ChassisMotion {
            vx_ms: 1.2,
            vy_ms: -0.4,
            omega_rads: 0.7,
        };

        let recovered = kin.to_chassis_motion(&kin.to_module_states(&motion));

        assert!((recovered.vx_ms - motion.vx_ms).abs() < 1e-9);
        assert!((recovered.vy_ms - motion.vy_ms).abs() < 1e-9);
        assert!((recovered.omega_rads - motion.omega_rads).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_geometry() {
        // All modules on top of each other cannot resolve rotation
        let geom = [[0.0, 0.0]; NUM_MODULES];

        assert!(matches!(
            SwerveKinematics::new(&geom),
            Err(KinematicsError::DegenerateGeometry)
        ));
    }

    #[test]
    fn test_desaturate() {
        let kin = SwerveKinematics::new(&test_geom()).unwrap();

        // A combined translation and rotation which overdrives the outside
        // modules
        let mut states = kin.to_module_states(&ChassisMotion {
            vx_ms: 3.0,
            vy_ms: 0.0,
            omega_rads: 4.0,
        });
        let unsaturated = states.clone();

        let max_speed_ms = 2.0;
        assert!(desaturate(&mut states, max_speed_ms));

        let top_speed_ms = states
            .iter()
            .map(|s| s.speed_ms.abs())
            .fold(0f64, f64::max);

        // The ceiling must be respected exactly
        assert!((top_speed_ms - max_speed_ms).abs() < 1e-12);

        for (scaled, raw) in states.iter().zip(unsaturated.iter()) {
            // Desaturation never increases a module's speed and never touches
            // angles
            assert!(scaled.speed_ms.abs() <= raw.speed_ms.abs());
            assert_eq!(scaled.angle_rad, raw.angle_rad);

            // Speed ratios are preserved
            assert!(
                (scaled.speed_ms / states[0].speed_ms
                    - raw.speed_ms / unsaturated[0].speed_ms)
                    .abs()
                    < 1e-12
            );
        }

        // A motion within limits is untouched
        let mut states = kin.to_module_states(&ChassisMotion {
            vx_ms: 1.0,
            vy_ms: 0.0,
            omega_rads: 0.0,
        });
        assert!(!desaturate(&mut states, max_speed_ms));
        assert_eq!(states[0].speed_ms, 1.0);
    }

    #[test]
    fn test_field_relative_at_zero_heading() {
        let motion = ChassisMotion::from_field_relative(1.0, 0.0, 0.5, 0.0);

        assert!((motion.vx_ms - 1.0).abs() < 1e-12);
        assert!(motion.vy_ms.abs() < 1e-12);
        assert_eq!(motion.omega_rads, 0.5);
    }

    #[test]
    fn test_field_relative_at_90_deg() {
        // Nose pointing field-left: a field-forward demand must come out as
        // motion to the vehicle's right
        let motion =
            ChassisMotion::from_field_relative(1.0, 0.0, 0.0, FRAC_PI_2);

        assert!(motion.vx_ms.abs() < 1e-12);
        assert!((motion.vy_ms + 1.0).abs() < 1e-12);
    }
}
