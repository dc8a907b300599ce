//! One simulated arm: chain, solver, target, path generator, animation and gripper

use std::sync::Arc;

use tracing::debug;

use crate::chain::KinematicChain;
use crate::collisions::GripperController;
use crate::ik::{clamp_to_reach, IkOutcome, IkSolver, IkTarget};
use crate::kinematic_traits::{Interpolation, Kinematics, Position};
use crate::log_sink::{LogLevel, LogSink};
use crate::parameters::ChainParameters;
use crate::path_plan::animation::AnimationPlayer;
use crate::path_plan::trajectory::TrajectoryGenerator;
use crate::scene::SceneObject;
use crate::scripting::session::ScriptHost;
use crate::settings::SimulationSettings;

pub struct RobotArm {
    pub chain: KinematicChain,
    pub solver: IkSolver,
    pub target: IkTarget,
    pub generator: TrajectoryGenerator,
    pub player: AnimationPlayer,
    pub gripper: GripperController,
    sink: Arc<dyn LogSink>,
}

impl RobotArm {
    pub fn new(parameters: &ChainParameters, settings: &SimulationSettings, sink: Arc<dyn LogSink>) -> Self {
        let chain = KinematicChain::new(parameters);
        let target = IkTarget::new(chain.end_effector_position(), &chain);
        RobotArm {
            solver: IkSolver::new(settings.ik),
            target,
            generator: TrajectoryGenerator::new(settings.trajectory),
            player: AnimationPlayer::new(settings.animation_duration),
            gripper: GripperController::new(settings.gripper, sink.clone()),
            chain,
            sink,
        }
    }

    /// Moves the target without moving the arm. Warns when it is out of reach.
    pub fn set_target(&mut self, position: Position) {
        let was_reachable = self.target.reachable;
        self.target.set_position(position, &self.chain);
        if was_reachable && !self.target.reachable {
            self.sink.add_log(
                &format!(
                    "Target ({:.3}, {:.3}, {:.3}) is out of reach",
                    position.x, position.y, position.z
                ),
                LogLevel::Warning,
            );
        }
    }

    pub fn set_interpolation(&mut self, interpolation: Interpolation) {
        self.target.interpolation = interpolation;
    }

    /// Interactive IK: sets the target and solves towards it right away.
    pub fn solve_to(&mut self, position: Position) -> IkOutcome {
        self.set_target(position);
        self.solver.solve(&mut self.chain, &position)
    }

    /// Sets the target and starts an animated move from where the effector is now. The path
    /// ends at the nearest reachable point. Restarts playback if a move is in progress.
    pub fn move_to(&mut self, position: Position, interpolation: Interpolation) {
        self.set_target(position);
        self.set_interpolation(interpolation);
        let start = self.chain.end_effector_position();
        let end = clamp_to_reach(&self.chain, &position);
        let trajectory = self.generator.generate(&start, &end, interpolation, &self.chain);
        debug!(?interpolation, length = trajectory.length(), "move started");
        self.player.start(trajectory);
    }

    /// Sets one joint angle, clamped into its limits. Returns false for a bad index or angle.
    pub fn rotate_joint(&mut self, joint: usize, degrees: f64) -> bool {
        let done = self.chain.set_angle_limited(joint, degrees);
        if done {
            self.target.refresh(&self.chain);
        }
        done
    }

    /// Rescales the arm; the reachability of the current target is re-evaluated.
    pub fn set_scale(&mut self, scale: f64) {
        self.chain.set_scale(scale);
        self.target.refresh(&self.chain);
    }

    pub fn is_animating(&self) -> bool {
        self.player.is_active()
    }

    /// Advances the move animation.
    pub fn update(&mut self, dt: f64) -> Option<IkOutcome> {
        self.player.update(dt, &mut self.chain, &self.solver)
    }

    /// Refreshes gripper contact and carries the held object along.
    pub fn update_gripper(&mut self, scene: &mut [Box<dyn SceneObject>]) {
        self.gripper.check_collisions(&self.chain, scene);
        self.gripper.follow(&self.chain, scene);
    }

    pub fn grip(&mut self, scene: &[Box<dyn SceneObject>]) -> bool {
        self.gripper.grip_object(&self.chain, scene)
    }

    pub fn release(&mut self) -> bool {
        self.gripper.release_object()
    }
}

/// Lends an arm and the scene to a script for one update.
pub struct ArmHost<'a> {
    pub arm: &'a mut RobotArm,
    pub scene: &'a mut [Box<dyn SceneObject>],
}

impl ScriptHost for ArmHost<'_> {
    fn set_joint_rotation(&mut self, joint: usize, degrees: f64) -> bool {
        self.arm.rotate_joint(joint, degrees)
    }

    fn move_to(&mut self, target: Position, interpolation: Interpolation) {
        self.arm.move_to(target, interpolation);
    }

    fn grip(&mut self) -> bool {
        self.arm.grip(self.scene)
    }

    fn release(&mut self) -> bool {
        self.arm.release()
    }

    fn is_busy(&self) -> bool {
        self.arm.is_animating()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ik::IkSettings;
    use crate::log_sink::MemorySink;

    fn planar() -> (RobotArm, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let arm = RobotArm::new(&ChainParameters::planar_arm(), &SimulationSettings::default(), sink.clone());
        (arm, sink)
    }

    #[test]
    fn test_move_to_arrives() {
        let (mut arm, _) = planar();
        let goal = Position::new(1.5, 1.5, 0.0);
        arm.move_to(goal, Interpolation::Parabolic);
        assert!(arm.is_animating());
        let mut frames = 0;
        while arm.is_animating() {
            arm.update(1.0 / 60.0);
            frames += 1;
            assert!(frames < 200);
        }
        let distance = (arm.chain.end_effector_position() - goal).norm();
        assert!(distance < IkSettings::TOLERANCE, "distance {}", distance);
        assert_eq!(arm.target.interpolation, Interpolation::Parabolic);
    }

    #[test]
    fn test_unreachable_target_warns() {
        let (mut arm, sink) = planar();
        arm.set_target(Position::new(10.0, 0.5, 0.0));
        assert!(!arm.target.reachable);
        assert!(sink.contains("out of reach"));
        assert_eq!(arm.target.last_valid_position, Position::new(0.0, 3.5, 0.0));
    }

    #[test]
    fn test_rotate_joint_respects_limits() {
        let (mut arm, _) = planar();
        assert!(arm.rotate_joint(1, 170.0));
        assert_eq!(arm.chain.angle(1), Some(150.0));
        assert!(!arm.rotate_joint(7, 10.0));
    }
}
