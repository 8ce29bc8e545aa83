//! Project descriptor (`project.json`) model and build layout.
//!
//! The descriptor is loaded once per build run and never mutated afterwards.
//! Only `info.name`, `targets` and `code` are required; everything else has
//! a default. No structural validation happens here: a bad target name
//! surfaces later as a path or toolchain failure.

use crate::error::DescriptorError;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Default descriptor file name, looked up in the current directory.
pub const DESCRIPTOR_FILE: &str = "project.json";

#[derive(Deserialize, Debug, Clone)]
pub struct ProjectDescriptor {
    pub info: ProjectInfo,
    pub targets: Vec<Target>,
    pub code: CodeSet,
    /// Test sources; carried for the test collaborator, never built here.
    #[serde(default)]
    pub test: Option<CodeSet>,
    #[serde(default, alias = "libraries")]
    pub libs: Vec<LibraryRef>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ProjectInfo {
    /// Base name of every linked executable
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub licence: String,
}

/// One build configuration (architecture or platform).
#[derive(Deserialize, Debug, Clone, Default)]
pub struct Target {
    /// Used verbatim as a directory name under `tmp/` and `build/`.
    pub arch: String,
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub compile_flags: String,
    #[serde(default)]
    pub link_flags: String,
    #[serde(default)]
    pub link_script: String,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct CodeSet {
    #[serde(default)]
    pub inc: Vec<String>,
    #[serde(default)]
    pub src: Vec<String>,
}

/// External library reference. Opaque to the build engine.
#[derive(Deserialize, Debug, Clone)]
pub struct LibraryRef {
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub repo: String,
}

impl ProjectDescriptor {
    pub fn load(path: &Path) -> Result<Self, DescriptorError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(DescriptorError::NotFound {
                    path: path.to_path_buf(),
                });
            }
            Err(source) => {
                return Err(DescriptorError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        Self::parse(&content, path)
    }

    /// Parse descriptor text; `path` is only used for error reporting.
    pub fn parse(content: &str, path: &Path) -> Result<Self, DescriptorError> {
        serde_json::from_str(content).map_err(|source| DescriptorError::Malformed {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl Target {
    /// Compiler binary for this target: `<location>/<prefix><default>` or a
    /// bare `<prefix><default>` resolved through PATH.
    pub fn compiler(&self, default: &str) -> PathBuf {
        let binary = format!("{}{}", self.prefix, default);
        if self.location.is_empty() {
            PathBuf::from(binary)
        } else {
            Path::new(&self.location).join(binary)
        }
    }
}

/// Directory names and toolchain defaults used to place build artifacts.
#[derive(Debug, Clone)]
pub struct BuildLayout {
    pub temp_dir: PathBuf,
    pub build_dir: PathBuf,
    pub code_dir: PathBuf,
    pub src_subdir: PathBuf,
    pub inc_subdir: PathBuf,
    pub lnk_subdir: PathBuf,
    pub source_ext: String,
    pub object_ext: String,
    pub compiler: String,
}

impl Default for BuildLayout {
    fn default() -> Self {
        Self {
            temp_dir: PathBuf::from("tmp"),
            build_dir: PathBuf::from("build"),
            code_dir: PathBuf::from("code"),
            src_subdir: PathBuf::from("src"),
            inc_subdir: PathBuf::from("inc"),
            lnk_subdir: PathBuf::from("lnk"),
            source_ext: "c".to_string(),
            object_ext: "o".to_string(),
            compiler: "gcc".to_string(),
        }
    }
}

impl BuildLayout {
    pub fn with_compiler(mut self, compiler: impl Into<String>) -> Self {
        self.compiler = compiler.into();
        self
    }
}
