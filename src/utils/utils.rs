//! Helper functions

use nalgebra::{Point3, Vector3};

use crate::kinematic_traits::{Joints, Position};

/// Checks if all joint angles are finite
pub fn is_valid(qs: &[f64]) -> bool {
    qs.iter().all(|&q| q.is_finite())
}

/// Print joint values, degrees.
pub fn dump_joints(joints: &Joints) {
    let mut row_str = String::new();
    for angle in joints {
        row_str.push_str(&format!("{:7.2} ", angle));
    }
    println!("[{}]", row_str.trim_end());
}

pub fn dump_position(position: &Position) {
    println!("x: {:.5}, y: {:.5}, z: {:.5}", position.x, position.y, position.z);
}

/// Panics (after printing both) if the two positions are further apart than the tolerance.
pub fn assert_position_eq(ta: &Position, tb: &Position, tolerance: f64) -> bool {
    let distance = (ta - tb).norm();
    if distance > tolerance {
        dump_position(ta);
        dump_position(tb);
        panic!("Positions are {} apart, tolerance {}", distance, tolerance);
    }
    true
}

/// formatting for YAML output
pub(crate) fn fmt_point(p: &Point3<f64>) -> String {
    format!("[{}, {}, {}]", p.x, p.y, p.z)
}

pub(crate) fn fmt_vector(v: &Vector3<f64>) -> String {
    format!("[{}, {}, {}]", v.x, v.y, v.z)
}

/// Linear interpolation between two positions.
pub fn lerp(a: &Position, b: &Position, t: f64) -> Position {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_with_all_finite() {
        let qs = [0.0, 1.0, -1.0, 0.5, -0.5, 180.0];
        assert!(is_valid(&qs));
    }

    #[test]
    fn test_is_valid_with_nan() {
        let qs = [0.0, f64::NAN, 1.0];
        assert!(!is_valid(&qs));
    }

    #[test]
    fn test_is_valid_with_infinity() {
        let qs = [0.0, f64::INFINITY];
        assert!(!is_valid(&qs));
    }

    #[test]
    fn test_lerp_ends() {
        let a = Position::new(1.0, 2.0, 3.0);
        let b = Position::new(-1.0, 0.0, 7.0);
        assert_eq!(lerp(&a, &b, 0.0), a);
        assert_eq!(lerp(&a, &b, 1.0), b);
        assert_eq!(lerp(&a, &b, 0.5), Position::new(0.0, 1.0, 5.0));
    }

    #[test]
    #[should_panic]
    fn test_position_mismatch_panics() {
        assert_position_eq(&Position::origin(), &Position::new(0.0, 1.0, 0.0), 0.5);
    }
}
