// src/types.rs

use std::fmt;

/// A logical action exposed over HTTP, mapped onto one invocation of the
/// external program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// `<program> -g=<difficulty>`, no input.
    Generate { difficulty: i64 },
    /// `<program> -s`, request body on stdin.
    Solve,
}

impl Action {
    /// Command-line arguments for this action, in order.
    pub fn args(&self) -> Vec<String> {
        match self {
            Action::Generate { difficulty } => vec![format!("-g={difficulty}")],
            Action::Solve => vec!["-s".to_string()],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Action::Generate { .. } => "generate",
            Action::Solve => "solve",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Generate { difficulty } => write!(f, "generate(difficulty={difficulty})"),
            Action::Solve => f.write_str("solve"),
        }
    }
}
