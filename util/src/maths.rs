//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Map a value from one range into another.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where
    T: Float,
{
    target_range.0
        + ((value - source_range.0)
        * (target_range.1 - target_range.0)
        / (source_range.1 - source_range.0))
}

/// Clamp a value between a minimum and maximum.
pub fn clamp<T>(value: &T, min: &T, max: &T) -> T
where
    T: Float,
{
    let mut ret = *value;

    if ret > *max {
        ret = *max
    }
    if ret < *min {
        ret = *min
    }

    ret
}

/// Wrap an angle into the range (-pi, pi].
pub fn wrap_pi<T>(angle: T) -> T
where
    T: Float,
{
    let pi_t: T = T::from(std::f64::consts::PI).unwrap();
    let tau_t: T = T::from(std::f64::consts::TAU).unwrap();

    let wrapped = rem_euclid(angle + pi_t, tau_t) - pi_t;

    // rem_euclid gives [0, tau), so -pi maps onto itself rather than +pi
    if wrapped == -pi_t {
        pi_t
    } else {
        wrapped
    }
}

/// Get the signed angular distance between two angles.
///
/// This function will return the shortest signed distance from `a` to `b`
/// accounting for wrapping, so that `a + get_ang_dist(a, b)` points in the
/// direction of `b`.
pub fn get_ang_dist<T>(a: T, b: T) -> T
where
    T: Float,
{
    let tau_t: T = T::from(std::f64::consts::TAU).unwrap();

    let c = rem_euclid(a - b, tau_t);
    let d = rem_euclid(b - a, tau_t);

    if c < d {
        -c
    } else {
        d
    }
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float,
{
    let r = lhs % rhs;
    if r < T::from(0.0).unwrap() {
        r + rhs.abs()
    } else {
        r
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    const PI: f64 = std::f64::consts::PI;
    const TAU: f64 = std::f64::consts::TAU;

    #[test]
    fn test_lin_map() {
        assert_eq!(lin_map((0f64, 1f64), (0f64, 10f64), 0.5), 5.0);
        assert_eq!(lin_map((-1f64, 1f64), (0f64, 1f64), 0.0), 0.5);
        assert_eq!(lin_map((0f64, 12f64), (-1f64, 1f64), 12.0), 1.0);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(&2f64, &-1f64, &1f64), 1f64);
        assert_eq!(clamp(&-2f64, &-1f64, &1f64), -1f64);
        assert_eq!(clamp(&0.5f64, &-1f64, &1f64), 0.5f64);
    }

    #[test]
    fn test_wrap_pi() {
        assert!((wrap_pi(TAU + 1f64) - 1f64).abs() < 1e-12);
        assert!((wrap_pi(-TAU - 1f64) + 1f64).abs() < 1e-12);
        assert_eq!(wrap_pi(PI), PI);
        assert_eq!(wrap_pi(0f64), 0f64);
    }

    #[test]
    fn test_get_ang_dist() {
        assert_eq!(get_ang_dist(1f64, 2f64), 1f64);
        assert_eq!(get_ang_dist(2f64, 1f64), -1f64);
        assert_eq!(get_ang_dist(0f64, TAU), 0f64);
        assert_eq!(get_ang_dist(TAU, 0f64), 0f64);
        assert_eq!(get_ang_dist(1f64, TAU), -1f64);
        assert_eq!(get_ang_dist(0f64, TAU - 1f64), -1f64);
        assert_eq!(get_ang_dist(TAU - 1f64, 1f64), 2f64);
    }
}
