//! Whole-project build.
//!
//! Loads the descriptor, builds every target in declaration order and
//! decides whether the temporary tree survives. Target failures never stop
//! the iteration; only descriptor errors escape.

use super::driver::{BuildResult, TargetBuilder};
use crate::config::{BuildLayout, ProjectDescriptor};
use crate::error::DescriptorError;
use crate::toolchain::{CommandRunner, SystemRunner};
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub layout: BuildLayout,
    pub remove_temp_on_success: bool,
    /// Build targets concurrently; results keep declaration order
    pub parallel: bool,
    pub progress: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            layout: BuildLayout::default(),
            remove_temp_on_success: true,
            parallel: false,
            progress: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub project: String,
    pub results: Vec<BuildResult>,
    pub succeeded: bool,
    pub temp_removed: bool,
}

/// Build the project described by `descriptor_path` with real processes.
pub fn build_project(descriptor_path: &Path, options: &BuildOptions) -> Result<BuildReport, DescriptorError> {
    run(descriptor_path, options, &SystemRunner)
}

pub fn run(
    descriptor_path: &Path,
    options: &BuildOptions,
    runner: &dyn CommandRunner,
) -> Result<BuildReport, DescriptorError> {
    let descriptor = ProjectDescriptor::load(descriptor_path)?;
    let root = project_root(descriptor_path);
    let layout = &options.layout;
    let temp_root = root.join(&layout.temp_dir);

    if let Err(e) = fs::create_dir_all(&temp_root) {
        warn!(path = %temp_root.display(), error = %e, "could not create temporary tree");
    }

    info!(
        project = %descriptor.info.name,
        targets = descriptor.targets.len(),
        parallel = options.parallel,
        "starting build"
    );

    let builder = TargetBuilder::new(root, layout, runner).with_progress(options.progress && !options.parallel);
    let results: Vec<BuildResult> = if options.parallel {
        descriptor
            .targets
            .par_iter()
            .map(|target| builder.build(target, &descriptor))
            .collect()
    } else {
        descriptor
            .targets
            .iter()
            .map(|target| builder.build(target, &descriptor))
            .collect()
    };

    let succeeded = results.iter().all(|r| r.succeeded);
    let mut temp_removed = false;
    if succeeded && options.remove_temp_on_success && temp_root.exists() {
        match fs::remove_dir_all(&temp_root) {
            Ok(()) => temp_removed = true,
            Err(e) => warn!(path = %temp_root.display(), error = %e, "could not remove temporary tree"),
        }
    }

    Ok(BuildReport {
        project: descriptor.info.name,
        results,
        succeeded,
        temp_removed,
    })
}

fn project_root(descriptor_path: &Path) -> &Path {
    match descriptor_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::FailedStep;
    use crate::config::DESCRIPTOR_FILE;
    use crate::toolchain::fake::{FakeRunner, is_link};
    use std::path::PathBuf;

    fn write_project(dir: &Path, arches: &[&str], src: &[&str]) -> PathBuf {
        let json = serde_json::json!({
            "info": { "name": "demo", "version": "0.1.0" },
            "targets": arches.iter().map(|a| serde_json::json!({ "arch": a })).collect::<Vec<_>>(),
            "code": { "inc": [], "src": src },
            "libs": []
        });
        let path = dir.join(DESCRIPTOR_FILE);
        fs::write(&path, serde_json::to_string_pretty(&json).unwrap()).unwrap();
        path
    }

    #[test]
    fn test_one_result_per_target_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_project(dir.path(), &["x64", "arm", "riscv"], &["main"]);
        let runner = FakeRunner::ok();

        let report = run(&path, &BuildOptions::default(), &runner).unwrap();

        let names: Vec<_> = report.results.iter().map(|r| r.target.as_str()).collect();
        assert_eq!(names, vec!["x64", "arm", "riscv"]);
        assert!(report.succeeded);
        assert_eq!(report.project, "demo");
        assert_eq!(runner.calls().len(), 6);
    }

    #[test]
    fn test_failing_target_does_not_stop_others() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_project(dir.path(), &["x64", "arm", "riscv"], &["main"]);
        let runner = FakeRunner::failing_when(|c| {
            c.args.iter().any(|a| a == "tmp/arm/code/src/main.o") && !is_link(c)
        });

        let report = run(&path, &BuildOptions::default(), &runner).unwrap();

        assert!(!report.succeeded);
        assert!(report.results[0].succeeded);
        assert_eq!(report.results[1].failed_step, FailedStep::Compile);
        assert!(report.results[2].succeeded);
        assert!(!report.temp_removed);
        assert!(dir.path().join("tmp").is_dir());
    }

    #[test]
    fn test_temp_tree_removed_on_success() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_project(dir.path(), &["x64"], &["main"]);
        let runner = FakeRunner::ok();

        let report = run(&path, &BuildOptions::default(), &runner).unwrap();

        assert!(report.temp_removed);
        assert!(!dir.path().join("tmp").exists());
        assert!(dir.path().join("build/x64").is_dir());
    }

    #[test]
    fn test_temp_tree_kept_on_request() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_project(dir.path(), &["x64"], &["main"]);
        let runner = FakeRunner::ok();
        let options = BuildOptions {
            remove_temp_on_success: false,
            ..Default::default()
        };

        let report = run(&path, &options, &runner).unwrap();

        assert!(report.succeeded);
        assert!(!report.temp_removed);
        assert!(dir.path().join("tmp/x64/code/src").is_dir());
    }

    #[test]
    fn test_missing_descriptor_attempts_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let runner = FakeRunner::ok();

        let err = run(&dir.path().join(DESCRIPTOR_FILE), &BuildOptions::default(), &runner).unwrap_err();

        assert!(matches!(err, DescriptorError::NotFound { .. }));
        assert!(runner.calls().is_empty());
        assert!(!dir.path().join("tmp").exists());
    }

    #[test]
    fn test_parallel_keeps_declaration_order() {
        let dir = tempfile::tempdir().unwrap();
        let arches = ["a", "b", "c", "d", "e", "f"];
        let path = write_project(dir.path(), &arches, &["main", "util"]);
        let runner = FakeRunner::failing_when(|c| c.args.iter().any(|a| a == "build/c/demo"));
        let options = BuildOptions {
            parallel: true,
            ..Default::default()
        };

        let report = run(&path, &options, &runner).unwrap();

        let names: Vec<_> = report.results.iter().map(|r| r.target.as_str()).collect();
        assert_eq!(names, arches);
        assert_eq!(report.results[2].failed_step, FailedStep::Link);
        assert_eq!(runner.calls().len(), 18);
    }

    #[test]
    fn test_project_root() {
        assert_eq!(project_root(Path::new("project.json")), Path::new("."));
        assert_eq!(project_root(Path::new("demo/project.json")), Path::new("demo"));
    }
}
