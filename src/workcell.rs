//! Per-frame driver: an arm, the script controlling it and the log sink they report to.

use std::sync::Arc;

use crate::log_sink::{LogLevel, LogSink};
use crate::parameters::ChainParameters;
use crate::robot_arm::{ArmHost, RobotArm};
use crate::scene::SceneObject;
use crate::scripting::command::ScriptError;
use crate::scripting::session::ScriptSession;
use crate::settings::SimulationSettings;

pub struct Workcell {
    pub arm: RobotArm,
    pub session: ScriptSession,
    sink: Arc<dyn LogSink>,
}

impl Workcell {
    pub fn new(parameters: &ChainParameters, settings: &SimulationSettings, sink: Arc<dyn LogSink>) -> Self {
        let mut session = ScriptSession::new(sink.clone());
        session.set_settle_seconds(settings.grip_settle_seconds);
        Workcell {
            arm: RobotArm::new(parameters, settings, sink.clone()),
            session,
            sink,
        }
    }

    pub fn sink(&self) -> &Arc<dyn LogSink> {
        &self.sink
    }

    pub fn load_script(&mut self, source: &str) -> Result<(), ScriptError> {
        self.session.load_script(source)
    }

    pub fn run(&mut self) {
        self.session.run();
    }

    /// Stops the script. The arm and the gripper stay as they are, a move in progress finishes.
    pub fn stop(&mut self) {
        self.session.stop();
    }

    /// Step mode: executes the next script segment.
    pub fn step(&mut self, scene: &mut [Box<dyn SceneObject>]) -> Option<usize> {
        let mut host = ArmHost { arm: &mut self.arm, scene };
        self.session.step(&mut host)
    }

    /// Call once per frame with the frame time in seconds. Order: move animation, gripper
    /// contact and held object, then the script. Negative or non-finite `dt` is ignored.
    pub fn update(&mut self, dt: f64, scene: &mut [Box<dyn SceneObject>]) {
        if !dt.is_finite() || dt < 0.0 {
            self.sink
                .add_log(&format!("Ignoring invalid frame time {}", dt), LogLevel::Warning);
            return;
        }
        self.arm.update(dt);
        self.arm.update_gripper(scene);
        let mut host = ArmHost { arm: &mut self.arm, scene };
        self.session.update(dt, &mut host);
    }
}
