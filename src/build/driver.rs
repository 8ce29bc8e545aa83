//! Single-target build: prepare directories, compile every unit in order,
//! then link.
//!
//! Compilation is fail-fast within a target. The link step runs whenever
//! every compile succeeded, including the zero-unit case.

use super::paths::{CompileUnit, PathResolver};
use crate::config::{BuildLayout, ProjectDescriptor, Target};
use crate::toolchain::{CommandRunner, Toolchain};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Step at which a target build stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailedStep {
    None,
    /// Output directories could not be created
    Prepare,
    Compile,
    Link,
}

/// Progress of one target build.
///
/// Preparing object directories belongs to `Compiling` and preparing the
/// executable directory to `Linking`, so a `Prepare` failure leaves from one
/// of those two states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetState {
    Pending,
    Compiling,
    Linking,
    Succeeded,
    Failed,
}

impl TargetState {
    pub fn can_advance_to(self, next: TargetState) -> bool {
        use TargetState::*;
        matches!(
            (self, next),
            (Pending, Compiling)
                | (Compiling, Linking)
                | (Compiling, Failed)
                | (Linking, Succeeded)
                | (Linking, Failed)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildResult {
    pub target: String,
    pub succeeded: bool,
    pub failed_step: FailedStep,
    /// Logical source that failed to compile
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Verbatim toolchain output of the failing step
    pub message: String,
}

impl BuildResult {
    fn success(target: &Target) -> Self {
        Self {
            target: target.arch.clone(),
            succeeded: true,
            failed_step: FailedStep::None,
            unit: None,
            message: String::new(),
        }
    }

    fn failure(target: &Target, step: FailedStep, unit: Option<&str>, message: String) -> Self {
        Self {
            target: target.arch.clone(),
            succeeded: false,
            failed_step: step,
            unit: unit.map(str::to_string),
            message,
        }
    }
}

pub struct TargetBuilder<'a> {
    root: &'a Path,
    layout: &'a BuildLayout,
    runner: &'a dyn CommandRunner,
    show_progress: bool,
}

impl<'a> TargetBuilder<'a> {
    pub fn new(root: &'a Path, layout: &'a BuildLayout, runner: &'a dyn CommandRunner) -> Self {
        Self {
            root,
            layout,
            runner,
            show_progress: false,
        }
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn build(&self, target: &Target, descriptor: &ProjectDescriptor) -> BuildResult {
        let mut state = TargetState::Pending;
        let result = self.run(target, descriptor, &mut state);
        let end = if result.succeeded {
            TargetState::Succeeded
        } else {
            TargetState::Failed
        };
        advance(&target.arch, &mut state, end);
        result
    }

    fn run(&self, target: &Target, descriptor: &ProjectDescriptor, state: &mut TargetState) -> BuildResult {
        let resolver = PathResolver::new(self.layout);
        let include_dirs = resolver.include_dirs(descriptor);
        let units = resolver.compile_units(target, descriptor);
        let compiler = target.compiler(&self.layout.compiler);
        let toolchain = Toolchain::new(self.runner, self.root);

        info!(arch = %target.arch, units = units.len(), compiler = %compiler.display(), "building target");

        advance(&target.arch, state, TargetState::Compiling);
        let object_dirs: BTreeSet<&Path> = units.iter().filter_map(|u| u.object.parent()).collect();
        for dir in object_dirs {
            if let Err(message) = self.ensure_dir(dir) {
                return BuildResult::failure(target, FailedStep::Prepare, None, message);
            }
        }

        let pb = self.progress_bar(units.len());
        for unit in &units {
            pb.set_message(format!("{} {}", target.arch, unit.source));
            let result = toolchain.compile(
                &compiler,
                &include_dirs,
                &target.compile_flags,
                &unit.input,
                &unit.object,
            );
            if !result.success() {
                pb.abandon();
                return BuildResult::failure(
                    target,
                    FailedStep::Compile,
                    Some(&unit.source),
                    result.output,
                );
            }
            if !result.output.trim().is_empty() {
                warn!(arch = %target.arch, unit = %unit.source, "{}", result.output.trim_end());
            }
            pb.inc(1);
        }
        pb.finish_and_clear();

        advance(&target.arch, state, TargetState::Linking);
        let executable = resolver.executable(target, descriptor);
        if let Some(dir) = executable.parent()
            && let Err(message) = self.ensure_dir(dir)
        {
            return BuildResult::failure(target, FailedStep::Prepare, None, message);
        }

        let objects: Vec<PathBuf> = units.into_iter().map(|CompileUnit { object, .. }| object).collect();
        let link_script = resolver.link_script(target);
        let result = toolchain.link(
            &compiler,
            &objects,
            &target.link_flags,
            link_script.as_deref(),
            &executable,
        );
        if !result.success() {
            return BuildResult::failure(target, FailedStep::Link, None, result.output);
        }

        BuildResult::success(target)
    }

    fn ensure_dir(&self, dir: &Path) -> Result<(), String> {
        let full = self.root.join(dir);
        fs::create_dir_all(&full)
            .map_err(|e| format!("Failed to create directory '{}': {}", full.display(), e))
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        let pb = ProgressBar::new(len as u64);
        pb.set_style(style);
        pb
    }
}

fn advance(arch: &str, state: &mut TargetState, next: TargetState) {
    debug_assert!(state.can_advance_to(next), "{:?} -> {:?}", state, next);
    debug!(arch, from = ?*state, to = ?next, "target state");
    *state = next;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toolchain::fake::{FakeRunner, is_link};

    fn descriptor(src: &[&str]) -> ProjectDescriptor {
        let json = serde_json::json!({
            "info": { "name": "app" },
            "targets": [ { "arch": "x64", "compile_flags": "-O2", "link_flags": "-lm" } ],
            "code": { "inc": ["app.h"], "src": src }
        });
        ProjectDescriptor::parse(&json.to_string(), Path::new("project.json")).unwrap()
    }

    #[test]
    fn test_successful_build() {
        let dir = tempfile::tempdir().unwrap();
        let layout = BuildLayout::default();
        let runner = FakeRunner::ok();
        let d = descriptor(&["main", "hal/uart"]);

        let result = TargetBuilder::new(dir.path(), &layout, &runner).build(&d.targets[0], &d);

        assert!(result.succeeded);
        assert_eq!(result.failed_step, FailedStep::None);
        let calls = runner.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(
            calls[0].to_string(),
            "gcc -Icode/inc -O2 -c code/src/main.c -o tmp/x64/code/src/main.o"
        );
        assert_eq!(
            calls[2].to_string(),
            "gcc tmp/x64/code/src/main.o tmp/x64/code/src/hal/uart.o -lm -o build/x64/app"
        );
        assert!(dir.path().join("tmp/x64/code/src/hal").is_dir());
        assert!(dir.path().join("build/x64").is_dir());
    }

    #[test]
    fn test_compile_failure_stops_target() {
        let dir = tempfile::tempdir().unwrap();
        let layout = BuildLayout::default();
        let runner = FakeRunner::failing_when(|c| c.args.iter().any(|a| a == "code/src/bad.c"));
        let d = descriptor(&["main", "bad", "never"]);

        let result = TargetBuilder::new(dir.path(), &layout, &runner).build(&d.targets[0], &d);

        assert!(!result.succeeded);
        assert_eq!(result.failed_step, FailedStep::Compile);
        assert_eq!(result.unit.as_deref(), Some("bad"));
        assert!(result.message.contains("failed"));
        let calls = runner.calls();
        assert_eq!(calls.len(), 2);
        assert!(!calls.iter().any(is_link));
    }

    #[test]
    fn test_link_failure() {
        let dir = tempfile::tempdir().unwrap();
        let layout = BuildLayout::default();
        let runner = FakeRunner::failing_when(is_link);
        let d = descriptor(&["main"]);

        let result = TargetBuilder::new(dir.path(), &layout, &runner).build(&d.targets[0], &d);

        assert!(!result.succeeded);
        assert_eq!(result.failed_step, FailedStep::Link);
        assert_eq!(result.unit, None);
    }

    #[test]
    fn test_zero_sources_still_links() {
        let dir = tempfile::tempdir().unwrap();
        let layout = BuildLayout::default();
        let runner = FakeRunner::failing_when(is_link);
        let d = descriptor(&[]);

        let result = TargetBuilder::new(dir.path(), &layout, &runner).build(&d.targets[0], &d);

        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].args, vec!["-lm", "-o", "build/x64/app"]);
        assert_eq!(result.failed_step, FailedStep::Link);
    }

    #[test]
    fn test_state_transitions() {
        use TargetState::*;
        assert!(Pending.can_advance_to(Compiling));
        assert!(Compiling.can_advance_to(Failed));
        assert!(Linking.can_advance_to(Failed));
        assert!(Linking.can_advance_to(Succeeded));
        assert!(!Pending.can_advance_to(Failed));
        assert!(!Pending.can_advance_to(Linking));
        assert!(!Compiling.can_advance_to(Succeeded));
        assert!(!Succeeded.can_advance_to(Failed));
    }

    #[test]
    fn test_executable_directory_failure_is_prepare() {
        let dir = tempfile::tempdir().unwrap();
        // A file named build/ blocks the executable directory only
        fs::write(dir.path().join("build"), "").unwrap();
        let layout = BuildLayout::default();
        let runner = FakeRunner::ok();
        let d = descriptor(&["main"]);

        let result = TargetBuilder::new(dir.path(), &layout, &runner).build(&d.targets[0], &d);

        assert_eq!(result.failed_step, FailedStep::Prepare);
        assert_eq!(runner.calls().len(), 1);
        assert!(!runner.calls().iter().any(is_link));
    }

    #[test]
    fn test_directory_creation_failure() {
        let dir = tempfile::tempdir().unwrap();
        // A file where the temp tree should go blocks directory creation
        fs::write(dir.path().join("tmp"), "").unwrap();
        let layout = BuildLayout::default();
        let runner = FakeRunner::ok();
        let d = descriptor(&["main"]);

        let result = TargetBuilder::new(dir.path(), &layout, &runner).build(&d.targets[0], &d);

        assert_eq!(result.failed_step, FailedStep::Prepare);
        assert!(runner.calls().is_empty());
    }
}
