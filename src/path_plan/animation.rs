//! Time based playback of a trajectory through the IK solver

use crate::chain::KinematicChain;
use crate::ik::{IkOutcome, IkSolver};
use crate::path_plan::trajectory::Trajectory;

/// Samples the trajectory over wall-clock time. Each update picks the sample matching the
/// elapsed fraction of the duration and solves towards it; the last update solves towards
/// the final sample so the arm ends where the path ends.
#[derive(Debug, Clone)]
pub struct AnimationPlayer {
    trajectory: Option<Trajectory>,
    elapsed: f64,
    duration: f64,
    active: bool,
}

impl AnimationPlayer {
    pub const DEFAULT_DURATION: f64 = 1.0;

    /// Player with the given duration in seconds. Non-positive durations are replaced by the default.
    pub fn new(duration: f64) -> Self {
        let duration = if duration.is_finite() && duration > 0.0 {
            duration
        } else {
            Self::DEFAULT_DURATION
        };
        AnimationPlayer {
            trajectory: None,
            elapsed: 0.0,
            duration,
            active: false,
        }
    }

    /// Starts (or restarts) playback from the beginning of the given trajectory.
    /// An empty trajectory leaves the player inactive.
    pub fn start(&mut self, trajectory: Trajectory) {
        self.elapsed = 0.0;
        self.active = !trajectory.is_empty();
        self.trajectory = Some(trajectory);
    }

    /// Stops playback where it is.
    pub fn cancel(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Fraction of playback done, 0 to 1.
    pub fn progress(&self) -> f64 {
        (self.elapsed / self.duration).clamp(0.0, 1.0)
    }

    pub fn trajectory(&self) -> Option<&Trajectory> {
        self.trajectory.as_ref()
    }

    /// Advances playback by `dt` seconds and drives the chain. Does nothing while inactive.
    /// Returns the outcome of the solve performed, if any.
    pub fn update(&mut self, dt: f64, chain: &mut KinematicChain, solver: &IkSolver) -> Option<IkOutcome> {
        if !self.active {
            return None;
        }
        let trajectory = self.trajectory.as_ref()?;
        self.elapsed += dt;

        let t = self.elapsed / self.duration;
        let target = if t < 1.0 {
            let n = trajectory.len();
            let index = if n < 2 {
                0
            } else {
                ((t * (n - 1) as f64).floor() as usize).clamp(0, n - 2)
            };
            trajectory.get(index)
        } else {
            self.active = false;
            trajectory.last()
        };
        target.map(|target| solver.solve(chain, target))
    }
}

impl Default for AnimationPlayer {
    fn default() -> Self {
        AnimationPlayer::new(Self::DEFAULT_DURATION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ik::IkSettings;
    use crate::kinematic_traits::{Interpolation, Kinematics, Position};
    use crate::parameters::ChainParameters;
    use crate::path_plan::trajectory::TrajectoryGenerator;

    #[test]
    fn test_inactive_update_is_noop() {
        let mut chain = KinematicChain::new(&ChainParameters::planar_arm());
        let mut player = AnimationPlayer::default();
        assert!(player.update(0.1, &mut chain, &IkSolver::default()).is_none());
        assert_eq!(chain.angles(), vec![0.0; 4]);
    }

    #[test]
    fn test_completes_and_deactivates() {
        let mut chain = KinematicChain::new(&ChainParameters::planar_arm());
        let solver = IkSolver::default();
        let start = chain.end_effector_position();
        let end = Position::new(1.0, 2.5, 0.0);
        let trajectory = TrajectoryGenerator::default().generate(&start, &end, Interpolation::Linear, &chain);

        let mut player = AnimationPlayer::new(0.5);
        player.start(trajectory.clone());
        let mut ticks = 0;
        let mut last = None;
        while player.is_active() {
            last = player.update(0.05, &mut chain, &solver);
            ticks += 1;
            assert!(ticks < 100);
        }
        assert!(player.progress() >= 1.0);
        let distance = (chain.end_effector_position() - trajectory.last().unwrap()).norm();
        assert!(distance < IkSettings::TOLERANCE, "distance {}", distance);
        assert!(last.is_some_and(|outcome| outcome.converged));

        // Restart resets time
        player.start(trajectory);
        assert!(player.is_active());
        assert_eq!(player.elapsed(), 0.0);
    }
}
