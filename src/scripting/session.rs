//! Cooperative execution of a compiled script against a host.
//!
//! A session runs statements until one of them suspends (a wait, a move, a grip or a
//! release), then hands control back. The host calls [`ScriptSession::update`] once per
//! frame; a suspended session resumes within the same call as soon as its condition is
//! met and runs on until the next suspension point. In step mode only
//! [`ScriptSession::step`] resumes it.

use std::fmt;
use std::sync::Arc;

use crate::kinematic_traits::{Interpolation, Position};
use crate::log_sink::{LogLevel, LogSink};
use crate::scripting::command::{Command, ScriptError, Statement};
use crate::scripting::parser::parse;
use crate::utils::is_valid;

/// What a script can do to the world.
pub trait ScriptHost {
    /// Sets the joint angle right away. Returns false if there is no such joint.
    fn set_joint_rotation(&mut self, joint: usize, degrees: f64) -> bool;

    /// Starts an animated move of the end effector towards the target.
    fn move_to(&mut self, target: Position, interpolation: Interpolation);

    /// Grips the object the gripper touches, if any.
    fn grip(&mut self) -> bool;

    /// Releases the held object, if any.
    fn release(&mut self) -> bool;

    /// True while a move animation is playing.
    fn is_busy(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptStatus {
    /// No program.
    Idle,

    /// Compiled and waiting for [`ScriptSession::run`].
    Loaded,

    /// Ready to execute on the next update or step.
    Running,

    /// Parked at a suspension point.
    Suspended,

    /// Ran to the end. The program is discarded.
    Finished,

    /// The last load did not compile.
    Failed,
}

impl fmt::Display for ScriptStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            ScriptStatus::Idle => "idle",
            ScriptStatus::Loaded => "loaded",
            ScriptStatus::Running => "running",
            ScriptStatus::Suspended => "suspended",
            ScriptStatus::Finished => "finished",
            ScriptStatus::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// Condition a suspended program waits for.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Resume {
    After(f64),
    MotionDone,
}

#[derive(Debug)]
struct Execution {
    program: Vec<Statement>,
    next: usize,
    resume: Option<Resume>,
}

pub struct ScriptSession {
    status: ScriptStatus,
    program: Option<Vec<Statement>>,
    execution: Option<Execution>,
    step_mode: bool,
    current_line: Option<usize>,
    last_error: Option<ScriptError>,
    settle_seconds: f64,
    sink: Arc<dyn LogSink>,
}

impl ScriptSession {
    pub const DEFAULT_SETTLE_SECONDS: f64 = 0.5;

    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        ScriptSession {
            status: ScriptStatus::Idle,
            program: None,
            execution: None,
            step_mode: false,
            current_line: None,
            last_error: None,
            settle_seconds: Self::DEFAULT_SETTLE_SECONDS,
            sink,
        }
    }

    /// Pause after grip and release, seconds. Negative or non-finite values are ignored.
    pub fn set_settle_seconds(&mut self, seconds: f64) {
        if seconds.is_finite() && seconds >= 0.0 {
            self.settle_seconds = seconds;
        }
    }

    pub fn settle_seconds(&self) -> f64 {
        self.settle_seconds
    }

    pub fn status(&self) -> ScriptStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        matches!(self.status, ScriptStatus::Running | ScriptStatus::Suspended)
    }

    pub fn is_step_mode(&self) -> bool {
        self.step_mode
    }

    /// Line of the statement executed last, 1-based.
    pub fn current_line(&self) -> Option<usize> {
        self.current_line
    }

    pub fn last_error(&self) -> Option<&ScriptError> {
        self.last_error.as_ref()
    }

    /// Discards whatever runs now and compiles the new script. On a compile error the
    /// session ends up [`ScriptStatus::Failed`] with the diagnostic logged and kept.
    pub fn load_script(&mut self, source: &str) -> Result<(), ScriptError> {
        self.discard();
        self.last_error = None;
        match parse(source) {
            Ok(program) => {
                self.sink.add_log(
                    &format!("Script loaded, {} statement(s)", program.len()),
                    LogLevel::Info,
                );
                self.program = Some(program);
                self.status = ScriptStatus::Loaded;
                Ok(())
            }
            Err(error) => {
                self.sink.add_log(&error.to_string(), LogLevel::Error);
                self.last_error = Some(error.clone());
                self.status = ScriptStatus::Failed;
                Err(error)
            }
        }
    }

    /// Starts a loaded program, or switches a suspended one back to continuous execution.
    /// Execution happens in [`ScriptSession::update`] or [`ScriptSession::step`].
    pub fn run(&mut self) {
        match self.status {
            ScriptStatus::Loaded => {
                let Some(program) = self.program.clone() else {
                    return;
                };
                self.execution = Some(Execution {
                    program,
                    next: 0,
                    resume: None,
                });
                self.current_line = None;
                self.status = ScriptStatus::Running;
                self.sink.add_log("Script started", LogLevel::Info);
            }
            ScriptStatus::Suspended | ScriptStatus::Running => {
                if self.step_mode {
                    self.step_mode = false;
                    self.sink.add_log("Step mode off, script continues", LogLevel::Info);
                }
                self.status = ScriptStatus::Running;
            }
            _ => {
                self.sink.add_log("No script loaded", LogLevel::Warning);
            }
        }
    }

    /// Abandons the program and any pending wait. Safe to call in any state.
    pub fn stop(&mut self) {
        let was_active = self.execution.is_some() || self.program.is_some();
        self.discard();
        self.status = ScriptStatus::Idle;
        if was_active {
            self.sink.add_log("Script stopped", LogLevel::Info);
        }
    }

    fn discard(&mut self) {
        self.program = None;
        self.execution = None;
        self.current_line = None;
    }

    pub fn set_step_mode(&mut self, enabled: bool) {
        if self.step_mode != enabled {
            self.step_mode = enabled;
            let state = if enabled { "on" } else { "off" };
            self.sink.add_log(&format!("Step mode {}", state), LogLevel::Info);
        }
    }

    /// Continuous-mode tick. Advances the pending wait by `dt` and resumes the program once
    /// the wait has run out or the motion it waits for has finished.
    pub fn update(&mut self, dt: f64, host: &mut dyn ScriptHost) {
        if self.step_mode || !self.is_running() {
            return;
        }
        if !dt.is_finite() || dt < 0.0 {
            self.sink
                .add_log(&format!("Ignoring invalid time step {}", dt), LogLevel::Warning);
            return;
        }
        let Some(execution) = self.execution.as_mut() else {
            return;
        };

        let ready = match execution.resume {
            None => !host.is_busy(),
            Some(Resume::After(remaining)) => {
                let remaining = remaining - dt;
                execution.resume = Some(Resume::After(remaining));
                remaining <= 0.0
            }
            Some(Resume::MotionDone) => !host.is_busy(),
        };
        if !ready {
            if execution.resume.is_some() {
                self.status = ScriptStatus::Suspended;
            }
            return;
        }
        execution.resume = None;
        self.status = ScriptStatus::Running;
        self.execute_segment(host);
    }

    /// Runs the next segment in step mode, regardless of any pending wait. Refused while
    /// the arm is still moving. Returns the line the program stopped at.
    pub fn step(&mut self, host: &mut dyn ScriptHost) -> Option<usize> {
        if !self.step_mode {
            self.sink.add_log("Step ignored, step mode is off", LogLevel::Warning);
            return None;
        }
        if !self.is_running() {
            self.sink.add_log("Step ignored, no script is running", LogLevel::Warning);
            return None;
        }
        if host.is_busy() {
            self.sink.add_log("Step ignored, arm is still moving", LogLevel::Warning);
            return None;
        }
        if let Some(execution) = self.execution.as_mut() {
            execution.resume = None;
        }
        self.status = ScriptStatus::Running;
        self.execute_segment(host);
        if let Some(line) = self.current_line {
            self.sink.add_log(&format!("Line {}", line), LogLevel::Info);
        }
        self.current_line
    }

    /// Executes statements until one suspends, the program ends or a statement fails.
    fn execute_segment(&mut self, host: &mut dyn ScriptHost) {
        loop {
            let Some(execution) = self.execution.as_mut() else {
                return;
            };
            let Some(statement) = execution.program.get(execution.next).cloned() else {
                self.finish();
                return;
            };
            execution.next += 1;
            self.current_line = Some(statement.line);

            match self.execute(&statement, host) {
                Ok(None) => continue,
                Ok(Some(resume)) => {
                    if let Some(execution) = self.execution.as_mut() {
                        execution.resume = Some(resume);
                    }
                    self.status = ScriptStatus::Suspended;
                    return;
                }
                Err(error) => {
                    self.sink.add_log(&error.to_string(), LogLevel::Error);
                    self.last_error = Some(error);
                    self.stop();
                    return;
                }
            }
        }
    }

    fn execute(&self, statement: &Statement, host: &mut dyn ScriptHost) -> Result<Option<Resume>, ScriptError> {
        let line = statement.line;
        match &statement.command {
            Command::SetJointRotation { joint, degrees } => {
                if !degrees.is_finite() {
                    return Err(ScriptError::runtime(line, "joint angle is not a finite number"));
                }
                let done = usize::try_from(*joint)
                    .map(|index| host.set_joint_rotation(index, *degrees))
                    .unwrap_or(false);
                if !done {
                    self.sink.add_log(
                        &format!("Line {}: no joint {}, rotation ignored", line, joint),
                        LogLevel::Warning,
                    );
                }
                Ok(None)
            }
            Command::Wait { seconds } => {
                if !seconds.is_finite() || *seconds < 0.0 {
                    return Err(ScriptError::runtime(line, format!("invalid wait time {}", seconds)));
                }
                Ok(Some(Resume::After(*seconds)))
            }
            Command::Move { target, interpolation } => {
                if !is_valid(target.coords.as_slice()) {
                    return Err(ScriptError::runtime(line, "move target is not a finite position"));
                }
                host.move_to(*target, *interpolation);
                Ok(Some(Resume::MotionDone))
            }
            Command::Grip => {
                if !host.grip() {
                    self.sink
                        .add_log(&format!("Line {}: nothing to grip", line), LogLevel::Warning);
                }
                Ok(Some(Resume::After(self.settle_seconds)))
            }
            Command::Release => {
                if !host.release() {
                    self.sink
                        .add_log(&format!("Line {}: nothing to release", line), LogLevel::Warning);
                }
                Ok(Some(Resume::After(self.settle_seconds)))
            }
            Command::Print { text } => {
                self.sink.add_log(text, LogLevel::Info);
                Ok(None)
            }
        }
    }

    fn finish(&mut self) {
        // The last line stays visible
        self.program = None;
        self.execution = None;
        self.status = ScriptStatus::Finished;
        self.sink.add_log("Script finished", LogLevel::Info);
    }
}
