//! Toolchain invocation
//!
//! Builds compiler/linker command lines and runs them through a
//! [`CommandRunner`]. The same compiler driver performs both compile and link
//! steps; there is no separate archiver or linker stage.

pub mod types;

pub use types::{CommandLine, CommandResult};

use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Executes a command line in a working directory.
pub trait CommandRunner: Send + Sync {
    fn run(&self, command: &CommandLine, work_dir: &Path) -> CommandResult;
}

/// Runs commands as real child processes
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, command: &CommandLine, work_dir: &Path) -> CommandResult {
        let output = Command::new(&command.program)
            .args(&command.args)
            .current_dir(work_dir)
            .output();

        match output {
            Ok(out) => {
                let mut merged = String::from_utf8_lossy(&out.stdout).into_owned();
                merged.push_str(&String::from_utf8_lossy(&out.stderr));
                CommandResult {
                    status: out.status.code(),
                    output: merged,
                }
            }
            Err(e) => CommandResult {
                status: None,
                output: format!(
                    "Failed to execute '{}': {}",
                    command.program.display(),
                    e
                ),
            },
        }
    }
}

/// `<cc> -I<dir>... <flags> -c <input> -o <output>`
pub fn compile_command<'a>(
    compiler: &Path,
    include_dirs: impl IntoIterator<Item = &'a PathBuf>,
    flags: &str,
    input: &Path,
    output: &Path,
) -> CommandLine {
    let mut cmd = CommandLine::new(compiler);
    for dir in include_dirs {
        cmd.arg(format!("-I{}", dir.display()));
    }
    cmd.flags(flags)
        .arg("-c")
        .arg(input.to_string_lossy())
        .arg("-o")
        .arg(output.to_string_lossy());
    cmd
}

/// `<cc> <objects>... <flags> [-T <script>] -o <output>`
pub fn link_command(
    compiler: &Path,
    objects: &[PathBuf],
    flags: &str,
    link_script: Option<&Path>,
    output: &Path,
) -> CommandLine {
    let mut cmd = CommandLine::new(compiler);
    for obj in objects {
        cmd.arg(obj.to_string_lossy());
    }
    cmd.flags(flags);
    if let Some(script) = link_script {
        cmd.arg("-T").arg(script.to_string_lossy());
    }
    cmd.arg("-o").arg(output.to_string_lossy());
    cmd
}

/// Compile and link operations bound to a runner and a project root.
pub struct Toolchain<'a> {
    runner: &'a dyn CommandRunner,
    work_dir: &'a Path,
}

impl<'a> Toolchain<'a> {
    pub fn new(runner: &'a dyn CommandRunner, work_dir: &'a Path) -> Self {
        Self { runner, work_dir }
    }

    pub fn compile<'p>(
        &self,
        compiler: &Path,
        include_dirs: impl IntoIterator<Item = &'p PathBuf>,
        flags: &str,
        input: &Path,
        output: &Path,
    ) -> CommandResult {
        self.execute(compile_command(compiler, include_dirs, flags, input, output))
    }

    pub fn link(
        &self,
        compiler: &Path,
        objects: &[PathBuf],
        flags: &str,
        link_script: Option<&Path>,
        output: &Path,
    ) -> CommandResult {
        self.execute(link_command(compiler, objects, flags, link_script, output))
    }

    fn execute(&self, cmd: CommandLine) -> CommandResult {
        debug!(command = %cmd, "running toolchain");
        let result = self.runner.run(&cmd, self.work_dir);
        debug!(status = ?result.status, "toolchain finished");
        result
    }
}
