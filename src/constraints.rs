//! Angular limits of the rotational joints. All values are in degrees.

/// Allowed rotation range of a single joint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointLimits {
    /// Lower limit, degrees
    pub min: f64,

    /// Upper limit, degrees
    pub max: f64,
}

impl JointLimits {
    /// Joint that may rotate freely within one turn.
    pub const FULL_TURN: JointLimits = JointLimits { min: -180.0, max: 180.0 };

    /// Limits in degrees. Reversed bounds are swapped rather than rejected.
    pub fn new(min: f64, max: f64) -> Self {
        if min <= max {
            JointLimits { min, max }
        } else {
            JointLimits { min: max, max: min }
        }
    }

    pub fn compliant(&self, angle: f64) -> bool {
        angle >= self.min && angle <= self.max
    }

    /// Wrap the angle into the turn centered on this range, then clamp to the range.
    pub fn clamp(&self, angle: f64) -> f64 {
        clamp_angle(angle, self.min, self.max)
    }

    pub fn center(&self) -> f64 {
        0.5 * (self.min + self.max)
    }
}

impl Default for JointLimits {
    fn default() -> Self {
        JointLimits::FULL_TURN
    }
}

/// Brings `angle` into the 360 degree window centered on the middle of `[min, max]`,
/// then hard-clamps it to `[min, max]`. Non-finite input yields the middle of the range.
pub fn clamp_angle(angle: f64, min: f64, max: f64) -> f64 {
    let center = 0.5 * (min + max);
    if !angle.is_finite() {
        return center;
    }
    let wrapped = (angle - center + 180.0).rem_euclid(360.0) - 180.0 + center;
    wrapped.max(min).min(max)
}
