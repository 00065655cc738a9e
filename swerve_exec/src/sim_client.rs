//! # Simulation client
//!
//! The simulation client is a kinematic stand-in for the mechanisms and IMU
//! collaborators, letting the full control pipeline run closed-loop with no
//! hardware attached. It accepts the same per-module demands the real
//! actuators would, inverts the command scaling back to wheel speeds,
//! integrates the cumulative module distances, and integrates the vehicle
//! heading from the forward kinematics solution so the simulated gyroscope
//! responds to commanded rotation.
//!
//! Steering is ideal: the steer axes snap to their demanded positions within
//! one cycle. Pitch and roll are held at whatever attitude has been injected
//! (from parameters or `set_attitude`), which is enough to exercise the
//! self-right loop.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// Internal
use crate::swerve_ctrl::{self, ModuleState, SwerveKinematics, NUM_MODULES};
use comms_if::eqpt::swerve::{ImuSens, ModuleDems, ModuleSens};
use util::maths::clamp;
use util::params;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the simulation client.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct Params {
    /// Initial pitch of the simulated vehicle, for self-right testing.
    ///
    /// Units: radians
    pub initial_pitch_rad: f64,

    /// Initial roll of the simulated vehicle, for self-right testing.
    ///
    /// Units: radians
    pub initial_roll_rad: f64,
}

/// Kinematic simulation of the mechanisms and IMU.
pub struct SimClient {
    /// The kinematics transform shared with swerve control.
    kinematics: SwerveKinematics,

    /// Velocity ceiling used to invert the command scaling.
    max_speed_ms: f64,

    /// Voltage range used to invert the command scaling.
    max_voltage_v: f64,
    drive_voltage_scale: f64,

    module_sens: ModuleSens,
    imu_sens: ImuSens,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimClient {
    /// Create a new simulation client.
    ///
    /// Expected init data is the path to the sim parameter file, the
    /// precomputed kinematics transform, and the swerve control parameters
    /// whose scaling the sim inverts.
    pub fn new(
        params_path: &str,
        kinematics: SwerveKinematics,
        chassis_params: &swerve_ctrl::Params,
    ) -> Result<Self, params::LoadError> {
        let sim_params: Params = params::load(params_path)?;

        Ok(Self {
            kinematics,
            max_speed_ms: chassis_params.max_speed_ms,
            max_voltage_v: chassis_params.max_voltage_v,
            drive_voltage_scale: chassis_params.drive_voltage_scale,
            module_sens: ModuleSens::default(),
            imu_sens: ImuSens {
                yaw_rad: 0.0,
                pitch_rad: sim_params.initial_pitch_rad,
                roll_rad: sim_params.initial_roll_rad,
            },
        })
    }

    /// Advance the simulation by one cycle with the given demands.
    pub fn step(&mut self, dems: &ModuleDems, dt_s: f64) {
        let full_scale_v = self.max_voltage_v * self.drive_voltage_scale;

        let mut states = [ModuleState::default(); NUM_MODULES];

        for i in 0..NUM_MODULES {
            // Invert the command scaling back to a wheel speed
            let speed_ms = clamp(
                &(dems.drv_voltage_v[i] / full_scale_v * self.max_speed_ms),
                &-self.max_speed_ms,
                &self.max_speed_ms,
            );

            // Ideal steering
            self.module_sens.str_abs_pos_rad[i] = dems.str_abs_pos_rad[i];

            // Accumulate the traveled distance, signed so that reversing
            // winds the odometer backwards
            self.module_sens.drv_dist_m[i] += speed_ms * dt_s;

            states[i] = ModuleState {
                speed_ms,
                angle_rad: dems.str_abs_pos_rad[i],
            };
        }

        // Integrate the heading from the body angular rate implied by the
        // module states. Yaw is continuous, never wrapped.
        let motion = self.kinematics.to_chassis_motion(&states);
        self.imu_sens.yaw_rad += motion.omega_rads * dt_s;
    }

    /// Read the module sensors.
    pub fn module_sens(&self) -> ModuleSens {
        self.module_sens
    }

    /// Read the IMU.
    pub fn imu_sens(&self) -> ImuSens {
        self.imu_sens
    }

    /// Zero the gyroscope heading, making the vehicle's current nose
    /// direction the new field-forward.
    pub fn zero_heading(&mut self) {
        self.imu_sens.yaw_rad = 0.0;
    }

    /// Inject a pitch/roll attitude, simulating uneven terrain.
    pub fn set_attitude(&mut self, pitch_rad: f64, roll_rad: f64) {
        self.imu_sens.pitch_rad = pitch_rad;
        self.imu_sens.roll_rad = roll_rad;
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn test_sim() -> SimClient {
        let kinematics = SwerveKinematics::new(&[
            [0.25, 0.25],
            [0.25, -0.25],
            [-0.25, 0.25],
            [-0.25, -0.25],
        ])
        .unwrap();

        SimClient {
            kinematics,
            max_speed_ms: 4.0,
            max_voltage_v: 12.0,
            drive_voltage_scale: 0.5,
            module_sens: ModuleSens::default(),
            imu_sens: ImuSens::default(),
        }
    }

    #[test]
    fn test_forward_demand_integrates_distance() {
        let mut sim = test_sim();

        // Full-scale voltage is 6 V, which maps back to the 4 m/s ceiling
        let dems = ModuleDems {
            drv_voltage_v: [6.0; NUM_MODULES],
            str_abs_pos_rad: [0.0; NUM_MODULES],
        };

        for _ in 0..50 {
            sim.step(&dems, 0.02);
        }

        let sens = sim.module_sens();
        for i in 0..NUM_MODULES {
            assert!((sens.drv_dist_m[i] - 4.0).abs() < 1e-9);
        }

        // Pure translation induces no heading change
        assert!(sim.imu_sens().yaw_rad.abs() < 1e-9);
    }

    #[test]
    fn test_rotation_demand_turns_gyro() {
        let mut sim = test_sim();

        // Tangential demands spin the vehicle counter-clockwise: each module
        // perpendicular to its offset
        let radius_m = (0.25f64).hypot(0.25);
        let omega_rads = 1.0;
        let speed_ms = omega_rads * radius_m;
        let voltage_v = speed_ms / 4.0 * 6.0;

        let dems = ModuleDems {
            drv_voltage_v: [voltage_v; NUM_MODULES],
            str_abs_pos_rad: [
                (0.25f64).atan2(-0.25),
                (0.25f64).atan2(0.25),
                (-0.25f64).atan2(-0.25),
                (-0.25f64).atan2(0.25),
            ],
        };

        for _ in 0..50 {
            sim.step(&dems, 0.02);
        }

        assert!((sim.imu_sens().yaw_rad - omega_rads).abs() < 1e-9);

        sim.zero_heading();
        assert_eq!(sim.imu_sens().yaw_rad, 0.0);
    }

    #[test]
    fn test_attitude_injection() {
        let mut sim = test_sim();

        sim.set_attitude(0.3, -0.1);
        assert_eq!(sim.imu_sens().pitch_rad, 0.3);
        assert_eq!(sim.imu_sens().roll_rad, -0.1);
    }
}
