//! Cartesian trajectories from the current end effector position to the target

use tracing::debug;

use crate::chain::KinematicChain;
use crate::kinematic_traits::{Interpolation, Position};
use crate::utils::lerp;

/// Fixed-length, eagerly sampled path. Start and end are always included.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    points: Vec<Position>,
    pub interpolation: Interpolation,
}

impl Trajectory {
    pub fn new(points: Vec<Position>, interpolation: Interpolation) -> Self {
        Trajectory { points, interpolation }
    }

    pub fn points(&self) -> &[Position] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Position> {
        self.points.get(index)
    }

    pub fn first(&self) -> Option<&Position> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&Position> {
        self.points.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Position> {
        self.points.iter()
    }

    /// Sum of the distances between consecutive samples.
    pub fn length(&self) -> f64 {
        self.points.windows(2).map(|w| (w[1] - w[0]).norm()).sum()
    }
}

/// The four points of a cubic Bezier segment: start, two interior handles, end.
pub type ControlPoints = [Position; 4];

/// Shape tunables of the generated paths.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectorySettings {
    /// Number of intervals; every trajectory has `intervals + 1` samples.
    pub intervals: usize,

    /// Lift of the parabolic apex above the chord midpoint, as a fraction of the path length.
    pub arc_height_ratio: f64,

    /// Lift of the spline handles above the start height, as a fraction of the path length.
    pub spline_lift_ratio: f64,
}

impl Default for TrajectorySettings {
    fn default() -> Self {
        TrajectorySettings {
            intervals: 50,
            arc_height_ratio: 0.5,
            spline_lift_ratio: 0.3,
        }
    }
}

#[derive(Debug, Clone)]
struct CachedControlPoints {
    start: Position,
    end: Position,
    points: ControlPoints,
}

/// Builds trajectories and keeps the spline control points between calls, so the user
/// interface can edit the interior handles and see the path follow.
#[derive(Debug, Clone, Default)]
pub struct TrajectoryGenerator {
    pub settings: TrajectorySettings,
    control_points: Option<CachedControlPoints>,
}

/// Start and end are considered unchanged if they moved less than this.
const SAME_ENDPOINTS: f64 = 1e-9;

impl TrajectoryGenerator {
    pub fn new(settings: TrajectorySettings) -> Self {
        TrajectoryGenerator {
            settings,
            control_points: None,
        }
    }

    /// Generates the path from `start` to `end`. The parabolic arc also needs the chain
    /// to keep clear of the arm's highest pivot.
    pub fn generate(
        &mut self,
        start: &Position,
        end: &Position,
        interpolation: Interpolation,
        chain: &KinematicChain,
    ) -> Trajectory {
        let intervals = self.settings.intervals.max(1);
        let points = match interpolation {
            Interpolation::Linear => Self::sample(intervals, |t| lerp(start, end, t)),
            Interpolation::Parabolic => {
                let apex = self.arc_apex(start, end, chain.max_pivot_height());
                Self::sample(intervals, |t| quadratic_bezier(start, &apex, end, t))
            }
            Interpolation::Spline => {
                let cp = self.spline_control_points(start, end);
                Self::sample(intervals, |t| cubic_bezier(&cp, t))
            }
        };
        debug!(?interpolation, samples = points.len(), "trajectory generated");
        Trajectory::new(points, interpolation)
    }

    /// Generates the path through explicitly supplied control points, bypassing the cache.
    pub fn generate_with_control_points(&self, control_points: &ControlPoints) -> Trajectory {
        let intervals = self.settings.intervals.max(1);
        Trajectory::new(
            Self::sample(intervals, |t| cubic_bezier(control_points, t)),
            Interpolation::Spline,
        )
    }

    fn sample(intervals: usize, f: impl Fn(f64) -> Position) -> Vec<Position> {
        (0..=intervals).map(|i| f(i as f64 / intervals as f64)).collect()
    }

    /// Chord midpoint lifted by a share of the path length, plus as much clearance over
    /// the highest pivot as the path length allows. A zero length path stays degenerate.
    fn arc_apex(&self, start: &Position, end: &Position, highest_pivot: f64) -> Position {
        let length = (end - start).norm();
        let mut apex = lerp(start, end, 0.5);
        let clearance = (highest_pivot - apex.y).clamp(0.0, length);
        apex.y += length * self.settings.arc_height_ratio + clearance;
        apex
    }

    /// Cached control points if they were made for the same start and end, otherwise new ones.
    fn spline_control_points(&mut self, start: &Position, end: &Position) -> ControlPoints {
        if let Some(cached) = &self.control_points {
            if (cached.start - start).norm() < SAME_ENDPOINTS && (cached.end - end).norm() < SAME_ENDPOINTS {
                return cached.points;
            }
        }
        let length = (end - start).norm();
        let lift = length * self.settings.spline_lift_ratio;
        let mut first = lerp(start, end, 0.25);
        let mut second = lerp(start, end, 0.75);
        first.y = start.y + lift;
        second.y = start.y + lift;
        let points = [*start, first, second, *end];
        self.control_points = Some(CachedControlPoints {
            start: *start,
            end: *end,
            points,
        });
        points
    }

    /// Currently cached spline control points, if any.
    pub fn control_points(&self) -> Option<&ControlPoints> {
        self.control_points.as_ref().map(|c| &c.points)
    }

    /// Replaces the cached control points (interactive editing). The first and the last point
    /// define which start/end pair the handles belong to.
    pub fn set_control_points(&mut self, points: ControlPoints) {
        self.control_points = Some(CachedControlPoints {
            start: points[0],
            end: points[3],
            points,
        });
    }

    pub fn clear_control_points(&mut self) {
        self.control_points = None;
    }
}

fn quadratic_bezier(p0: &Position, p1: &Position, p2: &Position, t: f64) -> Position {
    let u = 1.0 - t;
    Position::from(p0.coords * (u * u) + p1.coords * (2.0 * u * t) + p2.coords * (t * t))
}

fn cubic_bezier(cp: &ControlPoints, t: f64) -> Position {
    let u = 1.0 - t;
    Position::from(
        cp[0].coords * (u * u * u)
            + cp[1].coords * (3.0 * u * u * t)
            + cp[2].coords * (3.0 * u * t * t)
            + cp[3].coords * (t * t * t),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::ChainParameters;
    use crate::utils::assert_position_eq;

    const EPS: f64 = 1e-9;

    fn chain() -> KinematicChain {
        KinematicChain::new(&ChainParameters::desktop_arm())
    }

    #[test]
    fn test_endpoints_and_count() {
        let chain = chain();
        let start = Position::new(-4.0, 7.0, 0.0);
        let end = Position::new(3.0, 2.0, 1.5);
        for interpolation in [Interpolation::Linear, Interpolation::Parabolic, Interpolation::Spline] {
            let mut generator = TrajectoryGenerator::default();
            let trajectory = generator.generate(&start, &end, interpolation, &chain);
            assert_eq!(trajectory.len(), 51, "{:?}", interpolation);
            assert_position_eq(trajectory.first().unwrap(), &start, EPS);
            assert_position_eq(trajectory.last().unwrap(), &end, EPS);
        }
    }

    #[test]
    fn test_zero_length_path() {
        let chain = chain();
        let point = Position::new(1.0, 2.0, 3.0);
        for interpolation in [Interpolation::Linear, Interpolation::Parabolic, Interpolation::Spline] {
            let mut generator = TrajectoryGenerator::default();
            let trajectory = generator.generate(&point, &point, interpolation, &chain);
            assert_eq!(trajectory.len(), 51);
            assert!(trajectory.iter().all(|p| (p - point).norm() < EPS));
        }
    }

    #[test]
    fn test_parabola_clears_highest_pivot() {
        let chain = chain();
        let start = Position::new(-3.0, 1.0, 0.0);
        let end = Position::new(3.0, 1.0, 0.0);
        let mut generator = TrajectoryGenerator::default();
        let trajectory = generator.generate(&start, &end, Interpolation::Parabolic, &chain);
        let middle = trajectory.get(25).unwrap();
        // Apex is at least the arc lift above the chord; the curve reaches half of it at t = 0.5
        assert!(middle.y > 1.0 + 0.5 * 6.0 * 0.5 - EPS);
        assert!(trajectory.length() > 6.0);
    }

    #[test]
    fn test_spline_control_points_cached() {
        let chain = chain();
        let start = Position::new(0.0, 1.0, 0.0);
        let end = Position::new(4.0, 1.0, 0.0);
        let mut generator = TrajectoryGenerator::default();
        generator.generate(&start, &end, Interpolation::Spline, &chain);
        let generated = *generator.control_points().unwrap();
        assert_position_eq(&generated[1], &Position::new(1.0, 1.0 + 4.0 * 0.3, 0.0), EPS);
        assert_position_eq(&generated[2], &Position::new(3.0, 1.0 + 4.0 * 0.3, 0.0), EPS);

        // Edited handles survive regeneration for the same geometry.
        let mut edited = generated;
        edited[1].y = 5.0;
        generator.set_control_points(edited);
        let trajectory = generator.generate(&start, &end, Interpolation::Spline, &chain);
        assert_eq!(generator.control_points().unwrap()[1].y, 5.0);
        assert!(trajectory.get(10).unwrap().y > 1.5);

        // New geometry derives new handles
        let other_end = Position::new(-4.0, 1.0, 0.0);
        let trajectory = generator.generate(&start, &other_end, Interpolation::Spline, &chain);
        assert_position_eq(trajectory.last().unwrap(), &other_end, EPS);

        generator.clear_control_points();
        assert!(generator.control_points().is_none());
    }

    #[test]
    fn test_explicit_control_points() {
        let generator = TrajectoryGenerator::new(TrajectorySettings {
            intervals: 4,
            ..Default::default()
        });
        let cp = [
            Position::new(0.0, 0.0, 0.0),
            Position::new(0.0, 1.0, 0.0),
            Position::new(1.0, 1.0, 0.0),
            Position::new(1.0, 0.0, 0.0),
        ];
        let trajectory = generator.generate_with_control_points(&cp);
        assert_eq!(trajectory.len(), 5);
        assert_position_eq(trajectory.get(2).unwrap(), &Position::new(0.5, 0.75, 0.0), EPS);
    }
}
