//! Iterative inverse kinematics: damped cyclic coordinate descent over the joints of
//! a [`KinematicChain`].
//!
//! Joint axes are not orthogonal and every joint has hard limits, so there is no closed-form
//! solution for arbitrary chains. The solver adjusts one joint at a time, base first, by a
//! damped fraction of the angle that would swing the end effector towards the target.
//!
//! Plain coordinate descent crawls when the arm is nearly stretched and stalls outright when
//! it is straight, as every joint then sees the goal in line with the effector. After each
//! sweep the solver therefore extrapolates along the joint motion of that sweep while this
//! keeps getting closer. A sweep that no longer helps bends the inner joints out of the pose
//! and carries on; the best pose seen is what the chain is left in.

use nalgebra::Vector3;
use tracing::debug;

use crate::chain::KinematicChain;
use crate::kinematic_traits::{Interpolation, Joints, Kinematics, Position};

/// Tunables of the solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IkSettings {
    /// Maximal number of passes over all joints per `solve` call, restarts included.
    pub max_iterations: usize,

    /// Fraction of the corrective angle applied per joint and pass, in (0, 1].
    pub damping: f64,

    /// Distance to the target, world units, that counts as arrived.
    pub tolerance: f64,

    /// A pass that shortens the remaining distance by no more than this fraction of it
    /// counts as stalled.
    pub min_improvement: f64,

    /// How many times a stalled solve may bend the chain out of its pose and continue.
    /// Zero makes the first stall final.
    pub max_restarts: usize,
}

impl IkSettings {
    pub const MAX_ITERATIONS: usize = 100;
    pub const DAMPING: f64 = 1.0;
    pub const TOLERANCE: f64 = 0.001;
    pub const MIN_IMPROVEMENT: f64 = 1e-4;
    pub const MAX_RESTARTS: usize = 30;
}

impl Default for IkSettings {
    fn default() -> Self {
        IkSettings {
            max_iterations: Self::MAX_ITERATIONS,
            damping: Self::DAMPING,
            tolerance: Self::TOLERANCE,
            min_improvement: Self::MIN_IMPROVEMENT,
            max_restarts: Self::MAX_RESTARTS,
        }
    }
}

/// Cartesian goal of the solver, with reachability feedback for the user interface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IkTarget {
    pub position: Position,
    pub interpolation: Interpolation,

    /// False if the requested position is out of reach or below the ground plane.
    pub reachable: bool,

    /// Last requested position that was reachable.
    pub last_valid_position: Position,
}

impl IkTarget {
    pub fn new(position: Position, chain: &KinematicChain) -> Self {
        let mut target = IkTarget {
            position,
            interpolation: Interpolation::Linear,
            reachable: true,
            last_valid_position: chain.end_effector_position(),
        };
        target.refresh(chain);
        target
    }

    /// Sets a new position and recomputes reachability.
    pub fn set_position(&mut self, position: Position, chain: &KinematicChain) {
        self.position = position;
        self.refresh(chain);
    }

    /// Recomputes reachability, needed after the position or the chain scale changed.
    pub fn refresh(&mut self, chain: &KinematicChain) {
        self.reachable = is_reachable(chain, &self.position);
        if self.reachable {
            self.last_valid_position = self.position;
        }
    }
}

/// A position is reachable if it is not below the ground plane and not further from
/// the base than the fully extended arm.
pub fn is_reachable(chain: &KinematicChain, position: &Position) -> bool {
    if !position.coords.iter().all(|c| c.is_finite()) {
        return false;
    }
    if position.y < 0.0 {
        return false;
    }
    (position - chain.base_position()).norm() <= chain.reach()
}

/// Nearest reachable position along the same direction from the base: lifted onto the
/// ground plane, then pulled into the reach sphere.
pub fn clamp_to_reach(chain: &KinematicChain, position: &Position) -> Position {
    let mut clamped = *position;
    if clamped.y < 0.0 {
        clamped.y = 0.0;
    }
    let base = chain.base_position();
    let offset = clamped - base;
    let distance = offset.norm();
    let reach = chain.reach();
    if distance > reach && distance > 0.0 {
        clamped = base + offset * (reach / distance);
    }
    clamped
}

/// Result of a single `solve` call.
#[derive(Debug, Clone, Copy)]
pub struct IkOutcome {
    /// Position the solver actually aimed at (after clamping into reach).
    pub goal: Position,

    /// Remaining distance from the end effector to the goal.
    pub distance: f64,

    pub iterations: usize,

    pub converged: bool,
}

/// Largest multiple of a pass the extrapolation tries.
const MAX_EXTRAPOLATION: f64 = 64.0;

/// Bend applied to each inner joint on the first restart, degrees.
const RESTART_DEGREES: f64 = 30.0;

#[derive(Debug, Clone, Default)]
pub struct IkSolver {
    pub settings: IkSettings,
}

impl IkSolver {
    pub fn new(settings: IkSettings) -> Self {
        IkSolver { settings }
    }

    /// Moves the end effector of the chain towards the target position by mutating the joint
    /// angles in place. The terminal (gripper) joint is left as is. Stops once within
    /// `tolerance`, after `max_iterations` passes, or when a stall persists through all
    /// restarts. The chain ends in the closest pose found.
    pub fn solve(&self, chain: &mut KinematicChain, target: &Position) -> IkOutcome {
        let settings = &self.settings;
        let goal = clamp_to_reach(chain, target);
        let movable = chain.joint_count().saturating_sub(1);
        let damping = settings.damping.clamp(0.0, 1.0);

        let mut distance = (chain.end_effector_position() - goal).norm();
        let mut best = (distance, chain.angles());
        let mut iterations = 0;
        let mut restarts = 0;

        while iterations < settings.max_iterations && distance >= settings.tolerance {
            iterations += 1;
            let previous = distance;
            let before = chain.angles();

            for index in 0..movable {
                let correction = Self::joint_correction(chain, index, &goal);
                if correction.abs() > f64::EPSILON {
                    let angle = chain.angle(index).unwrap_or_default() + correction * damping;
                    chain.set_angle_limited(index, angle);
                }
            }

            distance = (chain.end_effector_position() - goal).norm();
            if distance < previous {
                distance = Self::extrapolate(chain, movable, &before, &goal, distance);
            }
            if distance < best.0 {
                best = (distance, chain.angles());
            }

            if distance >= settings.tolerance && previous - distance <= settings.min_improvement * distance {
                if restarts >= settings.max_restarts {
                    break;
                }
                restarts += 1;
                Self::bend(chain, movable, restarts);
                distance = (chain.end_effector_position() - goal).norm();
            }
        }

        if best.0 < distance {
            chain.set_angles(&best.1);
            distance = best.0;
        }

        let converged = distance < settings.tolerance;
        debug!(iterations, restarts, distance, converged, "ik solve");
        IkOutcome {
            goal,
            distance,
            iterations,
            converged,
        }
    }

    /// Keeps moving the joints the way the last pass moved them, doubling the step, for as
    /// long as the effector gets closer. Returns the distance left.
    fn extrapolate(
        chain: &mut KinematicChain,
        movable: usize,
        before: &Joints,
        goal: &Position,
        mut distance: f64,
    ) -> f64 {
        let step: Joints = chain.angles().iter().zip(before).map(|(a, b)| a - b).collect();
        let mut factor = 1.0;
        while factor <= MAX_EXTRAPOLATION {
            let accepted = chain.angles();
            for (index, (angle, delta)) in accepted.iter().zip(&step).enumerate().take(movable) {
                chain.set_angle_limited(index, angle + delta * factor);
            }
            let trial = (chain.end_effector_position() - goal).norm();
            if trial < distance {
                distance = trial;
                factor *= 2.0;
            } else {
                chain.set_angles(&accepted);
                break;
            }
        }
        distance
    }

    /// Bends the joints above the base in alternating directions, further on every other
    /// restart, to leave a straight or locked pose.
    fn bend(chain: &mut KinematicChain, movable: usize, restart: usize) {
        let magnitude = RESTART_DEGREES * restart.div_ceil(2) as f64;
        for index in 1..movable {
            let sign = if (index + restart) % 2 == 0 { 1.0 } else { -1.0 };
            let angle = chain.angle(index).unwrap_or_default() + sign * magnitude;
            chain.set_angle_limited(index, angle);
        }
    }

    /// Signed angle, degrees, that rotates the end effector around the world axis of the
    /// joint so that it lines up with the goal as seen from the joint. Both directions are
    /// projected onto the plane of rotation first; components along the axis cannot be
    /// changed by this joint.
    fn joint_correction(chain: &KinematicChain, index: usize, goal: &Position) -> f64 {
        let (pivot, axis) = match (chain.pivot_position(index), chain.axis(index)) {
            (Some(pivot), Some(axis)) => {
                let transform = chain.forward_transform(index);
                (pivot, transform.transform_vector(&axis).normalize())
            }
            _ => return 0.0,
        };

        let to_effector = project(&(chain.end_effector_position() - pivot), &axis);
        let to_goal = project(&(goal - pivot), &axis);
        let (to_effector, to_goal) = match (to_effector, to_goal) {
            (Some(e), Some(g)) => (e, g),
            _ => return 0.0,
        };

        let cos = to_effector.dot(&to_goal).clamp(-1.0, 1.0);
        let angle = cos.acos().to_degrees();
        let direction = to_effector.cross(&to_goal).dot(&axis);
        if direction.abs() < 1e-12 && cos > 0.0 {
            return 0.0;
        }
        if direction < 0.0 { -angle } else { angle }
    }
}

/// Component of `v` perpendicular to `axis`, normalized. None if `v` is (almost) parallel to it.
fn project(v: &Vector3<f64>, axis: &Vector3<f64>) -> Option<Vector3<f64>> {
    (v - axis * v.dot(axis)).try_normalize(1e-9)
}
