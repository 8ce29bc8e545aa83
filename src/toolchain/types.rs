use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// A fully constructed compiler or linker invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl CommandLine {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(&mut self, arg: impl Into<String>) -> &mut Self {
        self.args.push(arg.into());
        self
    }

    /// Append an opaque flag string, one argument per whitespace-separated word
    pub fn flags(&mut self, flags: &str) -> &mut Self {
        self.args.extend(flags.split_whitespace().map(str::to_string));
        self
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Outcome of one toolchain process.
///
/// A nonzero exit is data, not an error: the caller decides what it means.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandResult {
    /// Exit code, `None` if the process could not be spawned or was killed
    pub status: Option<i32>,
    /// stdout followed by stderr
    pub output: String,
}

impl CommandResult {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}
