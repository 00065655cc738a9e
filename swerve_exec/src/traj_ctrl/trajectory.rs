//! # Trajectory
//!
//! This module defines the trajectory type followed by trajectory control.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// Internal
use super::TrajCtrlError;
use crate::odom::Pose;
use comms_if::tc::traj::TrajSpec;
use util::maths::get_ang_dist;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A single timestamped trajectory sample.
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize)]
pub struct TrajPoint {
    /// Time of this sample relative to the start of the trajectory.
    ///
    /// Units: seconds
    pub time_s: f64,

    /// Desired field-frame pose at this time.
    pub pose: Pose,

    /// Feed-forward field-frame velocity along X.
    ///
    /// Units: meters/second
    pub vx_ms: f64,

    /// Feed-forward field-frame velocity along Y.
    ///
    /// Units: meters/second
    pub vy_ms: f64,
}

/// A trajectory defining the desired motion of the vehicle over time.
///
/// Built exclusively through [`Trajectory::from_spec`], which guarantees at
/// least two samples in time order.
#[derive(Debug, Clone, Serialize)]
pub struct Trajectory {
    points: Vec<TrajPoint>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Trajectory {
    /// Build a trajectory from its telecommand spec.
    ///
    /// The spec must contain at least two samples with monotonically
    /// increasing times.
    pub fn from_spec(spec: &TrajSpec) -> Result<Self, TrajCtrlError> {
        if spec.points.len() < 2 {
            return Err(TrajCtrlError::TooFewPoints(spec.points.len()));
        }

        for pair in spec.points.windows(2) {
            if pair[1].time_s <= pair[0].time_s {
                return Err(TrajCtrlError::NonMonotonicTimes);
            }
        }

        let points = spec
            .points
            .iter()
            .map(|p| TrajPoint {
                time_s: p.time_s,
                pose: Pose::from_spec(&p.pose),
                vx_ms: p.vx_ms,
                vy_ms: p.vy_ms,
            })
            .collect();

        Ok(Trajectory { points })
    }

    /// Get the number of samples in the trajectory.
    pub fn get_num_points(&self) -> usize {
        self.points.len()
    }

    /// Get the total duration of the trajectory in seconds.
    pub fn get_duration(&self) -> f64 {
        self.points.last().map(|p| p.time_s).unwrap_or(0f64)
    }

    /// Sample the trajectory at the given elapsed time.
    ///
    /// Between samples the pose and feed-forward velocity are linearly
    /// interpolated, with the heading interpolated along the shortest
    /// angular distance. Times before the first sample and after the last
    /// clamp to the respective end.
    pub fn sample(&self, time_s: f64) -> TrajPoint {
        let first = self.points.first().unwrap();
        let last = self.points.last().unwrap();

        if time_s <= first.time_s {
            return *first;
        }
        if time_s >= last.time_s {
            return *last;
        }

        // Find the segment which brackets the requested time. The bounds
        // checks above guarantee one exists.
        let ahead_idx = self
            .points
            .iter()
            .position(|p| p.time_s > time_s)
            .unwrap();
        let behind = &self.points[ahead_idx - 1];
        let ahead = &self.points[ahead_idx];

        let frac =
            (time_s - behind.time_s) / (ahead.time_s - behind.time_s);

        TrajPoint {
            time_s,
            pose: Pose {
                position_m_lm: [
                    behind.pose.position_m_lm[0]
                        + frac
                            * (ahead.pose.position_m_lm[0]
                                - behind.pose.position_m_lm[0]),
                    behind.pose.position_m_lm[1]
                        + frac
                            * (ahead.pose.position_m_lm[1]
                                - behind.pose.position_m_lm[1]),
                ],
                heading_rad: behind.pose.heading_rad
                    + frac
                        * get_ang_dist(
                            behind.pose.heading_rad,
                            ahead.pose.heading_rad,
                        ),
            },
            vx_ms: behind.vx_ms + frac * (ahead.vx_ms - behind.vx_ms),
            vy_ms: behind.vy_ms + frac * (ahead.vy_ms - behind.vy_ms),
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use comms_if::tc::traj::{PoseSpec, TrajPointSpec};

    fn test_spec() -> TrajSpec {
        TrajSpec {
            points: vec![
                TrajPointSpec {
                    time_s: 0.0,
                    pose: PoseSpec::default(),
                    vx_ms: 1.0,
                    vy_ms: 0.0,
                },
                TrajPointSpec {
                    time_s: 2.0,
                    pose: PoseSpec {
                        x_m: 2.0,
                        y_m: 0.0,
                        heading_rad: 1.0,
                    },
                    vx_ms: 1.0,
                    vy_ms: 0.0,
                },
            ],
        }
    }

    #[test]
    fn test_validation() {
        assert!(matches!(
            Trajectory::from_spec(&TrajSpec { points: vec![] }),
            Err(TrajCtrlError::TooFewPoints(0))
        ));

        let mut spec = test_spec();
        spec.points[1].time_s = 0.0;
        assert!(matches!(
            Trajectory::from_spec(&spec),
            Err(TrajCtrlError::NonMonotonicTimes)
        ));
    }

    #[test]
    fn test_sample_interpolates() {
        let traj = Trajectory::from_spec(&test_spec()).unwrap();

        let mid = traj.sample(1.0);
        assert!((mid.pose.position_m_lm[0] - 1.0).abs() < 1e-12);
        assert!((mid.pose.heading_rad - 0.5).abs() < 1e-12);
        assert!((mid.vx_ms - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_sample_clamps_to_ends() {
        let traj = Trajectory::from_spec(&test_spec()).unwrap();

        assert_eq!(traj.sample(-1.0).pose.position_m_lm[0], 0.0);
        assert_eq!(traj.sample(10.0).pose.position_m_lm[0], 2.0);
        assert_eq!(traj.get_duration(), 2.0);
    }
}
