//! # g2pm CLI Entry Point
//!
//! Parses CLI arguments with clap and dispatches to the build engine.
//! Project scaffolding, library installation, cleaning and test runs are
//! handled by separate tools and are not part of this binary.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use std::time::Instant;

use g2pm::build::{self, BuildOptions};
use g2pm::config::{BuildLayout, DESCRIPTOR_FILE};
use g2pm::ui;

#[derive(Parser)]
#[command(name = "g2pm")]
#[command(about = "G2 package manager - builds C projects described by project.json", version = env!("CARGO_PKG_VERSION"))]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile and link every target in the project
    Build {
        /// Show every toolchain command and state transition
        #[arg(short, long)]
        verbose: bool,
        /// Path to the project descriptor
        #[arg(long, default_value = DESCRIPTOR_FILE)]
        project: PathBuf,
        /// Keep the temporary object tree after a successful build
        #[arg(long)]
        keep_temp: bool,
        /// Build targets in parallel
        #[arg(short = 'j', long)]
        parallel: bool,
        /// Compiler driver to use instead of gcc (a target prefix is prepended)
        #[arg(long)]
        cc: Option<String>,
        /// Print the build report as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Commands {
    fn verbose(&self) -> bool {
        match self {
            Commands::Build { verbose, .. } => *verbose,
        }
    }

    /// Returns whether the action succeeded.
    fn execute(&self) -> Result<bool> {
        match self {
            Commands::Build {
                project,
                keep_temp,
                parallel,
                cc,
                json,
                ..
            } => {
                let start_time = Instant::now();
                let mut layout = BuildLayout::default();
                if let Some(cc) = cc {
                    layout = layout.with_compiler(cc.as_str());
                }
                let options = BuildOptions {
                    layout,
                    remove_temp_on_success: !keep_temp,
                    parallel: *parallel,
                    progress: !json,
                };

                let report = build::build_project(project, &options)
                    .with_context(|| format!("Failed to load {}", project.display()))?;

                if *json {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                    return Ok(report.succeeded);
                }

                println!(
                    "{} Project: {} ({} target{})",
                    "🚀".blue(),
                    report.project.bold(),
                    report.results.len(),
                    if report.results.len() == 1 { "" } else { "s" }
                );
                ui::print_report(&report);

                if report.succeeded {
                    println!(
                        "{} Build finished in {:.2?}",
                        "✓".green(),
                        start_time.elapsed()
                    );
                } else {
                    let failed = report.results.iter().filter(|r| !r.succeeded).count();
                    println!(
                        "{} {} of {} targets failed",
                        "x".red(),
                        failed,
                        report.results.len()
                    );
                }
                Ok(report.succeeded)
            }
        }
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.command.verbose());

    if !cli.command.execute()? {
        std::process::exit(1);
    }
    Ok(())
}
