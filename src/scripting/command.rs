//! Commands understood by the script engine and the errors it reports

use std::fmt;

use crate::kinematic_traits::{Interpolation, Position};

/// One executable statement of a compiled script.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `setJointRotation(joint, degrees)`, immediate
    SetJointRotation { joint: i64, degrees: f64 },

    /// `wait(seconds)`, suspends for the given time
    Wait { seconds: f64 },

    /// `moveLinear(x, y, z)`, `moveParabolic(x, y, z)`, `moveSpline(x, y, z)`, suspends
    /// until the arm arrives
    Move { target: Position, interpolation: Interpolation },

    /// `gripObject()`
    Grip,

    /// `releaseObject()`
    Release,

    /// `print("text")`, logs the text, immediate
    Print { text: String },
}

impl Command {
    /// True if executing this command hands control back to the host.
    pub fn suspends(&self) -> bool {
        !matches!(self, Command::SetJointRotation { .. } | Command::Print { .. })
    }
}

/// Statement with the source line it came from (1-based).
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub command: Command,
    pub line: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptErrorKind {
    Compile,
    Runtime,
}

/// Diagnostic for a script that does not compile or that failed while running.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptError {
    pub kind: ScriptErrorKind,
    pub line: usize,
    pub message: String,
}

impl ScriptError {
    pub fn compile(line: usize, message: impl Into<String>) -> Self {
        ScriptError {
            kind: ScriptErrorKind::Compile,
            line,
            message: message.into(),
        }
    }

    pub fn runtime(line: usize, message: impl Into<String>) -> Self {
        ScriptError {
            kind: ScriptErrorKind::Runtime,
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            ScriptErrorKind::Compile => write!(f, "Compile error at line {}: {}", self.line, self.message),
            ScriptErrorKind::Runtime => write!(f, "Runtime error at line {}: {}", self.line, self.message),
        }
    }
}

impl std::error::Error for ScriptError {}
