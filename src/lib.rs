//! # g2pm - a minimal C project build orchestrator
//!
//! g2pm reads a declarative `project.json` (metadata, targets, include and
//! source lists, library references) and compiles and links one native
//! executable per target with an external compiler driver.
//!
//! ## Quick Start
//!
//! ```bash
//! # Build every target listed in ./project.json
//! g2pm build
//!
//! # Keep tmp/ around and show every compiler invocation
//! g2pm build --keep-temp --verbose
//! ```
//!
//! ## Layout produced
//!
//! - `tmp/<arch>/code/src/<source>.o` - object files, removed after a fully
//!   successful build unless asked otherwise
//! - `build/<arch>/<project name>` - linked executables
//!
//! ## Module Organization
//!
//! - [`config`] - Project descriptor model and build layout
//! - [`build`] - Path resolution, per-target driver and orchestrator
//! - [`toolchain`] - Compiler/linker command construction and execution

/// Build engine: path resolution, target driver, orchestrator.
pub mod build;

/// Project descriptor (`project.json`) parsing.
pub mod config;

/// Error types.
pub mod error;

/// Compiler invocation.
pub mod toolchain;

/// Terminal UI utilities (summary table, failure report).
pub mod ui;
