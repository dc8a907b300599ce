//! Tunables of the whole simulation, with defaults matching the desktop arm scene

use crate::collisions::GripperSettings;
use crate::ik::IkSettings;
use crate::path_plan::animation::AnimationPlayer;
use crate::path_plan::trajectory::TrajectorySettings;
use crate::scripting::session::ScriptSession;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationSettings {
    pub ik: IkSettings,
    pub trajectory: TrajectorySettings,

    /// Duration of every move animation, seconds.
    pub animation_duration: f64,

    pub gripper: GripperSettings,

    /// Pause a script takes after gripping or releasing, seconds.
    pub grip_settle_seconds: f64,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        SimulationSettings {
            ik: IkSettings::default(),
            trajectory: TrajectorySettings::default(),
            animation_duration: AnimationPlayer::DEFAULT_DURATION,
            gripper: GripperSettings::default(),
            grip_settle_seconds: ScriptSession::DEFAULT_SETTLE_SECONDS,
        }
    }
}
