//! Artifact path resolution.
//!
//! All paths are relative to the project root. Object files are namespaced
//! under the target name so two targets never share an output path:
//!
//! ```text
//! tmp/<arch>/code/src/<logical>.o
//! build/<arch>/<project name>
//! ```

use crate::config::{BuildLayout, ProjectDescriptor, Target};
use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

/// One source file resolved for one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileUnit {
    /// Identifier as written in `code.src`
    pub source: String,
    pub input: PathBuf,
    pub object: PathBuf,
}

pub struct PathResolver<'a> {
    layout: &'a BuildLayout,
}

impl<'a> PathResolver<'a> {
    pub fn new(layout: &'a BuildLayout) -> Self {
        Self { layout }
    }

    fn include_root(&self) -> PathBuf {
        self.layout.code_dir.join(&self.layout.inc_subdir)
    }

    fn source_root(&self) -> PathBuf {
        self.layout.code_dir.join(&self.layout.src_subdir)
    }

    /// Containing directory of every `code.inc` entry, de-duplicated.
    pub fn include_dirs(&self, descriptor: &ProjectDescriptor) -> BTreeSet<PathBuf> {
        let root = self.include_root();
        descriptor
            .code
            .inc
            .iter()
            .map(|inc| match Path::new(inc).parent() {
                Some(dir) if Path::new(inc).file_name().is_some() => root.join(dir),
                _ => root.clone(),
            })
            .collect()
    }

    /// One unit per `code.src` entry, in declaration order.
    pub fn compile_units(&self, target: &Target, descriptor: &ProjectDescriptor) -> Vec<CompileUnit> {
        let source_root = self.source_root();
        let object_root = self.target_temp_dir(target).join(&source_root);

        descriptor
            .code
            .src
            .iter()
            .map(|src| CompileUnit {
                source: src.clone(),
                input: source_root.join(with_suffix(src, &self.layout.source_ext)),
                object: object_root.join(object_name(src, &self.layout.object_ext)),
            })
            .collect()
    }

    pub fn target_temp_dir(&self, target: &Target) -> PathBuf {
        self.layout.temp_dir.join(&target.arch)
    }

    pub fn executable(&self, target: &Target, descriptor: &ProjectDescriptor) -> PathBuf {
        self.layout
            .build_dir
            .join(&target.arch)
            .join(&descriptor.info.name)
    }

    pub fn link_script(&self, target: &Target) -> Option<PathBuf> {
        if target.link_script.is_empty() {
            None
        } else {
            Some(
                self.layout
                    .code_dir
                    .join(&self.layout.lnk_subdir)
                    .join(&target.link_script),
            )
        }
    }
}

// Appended, not substituted: "util.v2" must not collide with "util.v3".
fn with_suffix(logical: &str, ext: &str) -> String {
    format!("{}.{}", logical, ext)
}

/// Object path relative to the target's object root. Root and parent
/// components become plain segments so the result never leaves that root.
fn object_name(logical: &str, ext: &str) -> PathBuf {
    let mut rel = PathBuf::new();
    for component in Path::new(logical).components() {
        match component {
            Component::Normal(part) => rel.push(part),
            Component::ParentDir => rel.push("__"),
            Component::RootDir => rel.push("__root"),
            Component::CurDir | Component::Prefix(_) => {}
        }
    }
    let mut name = rel.into_os_string();
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}
