//! Build-system detection.
//!
//! One detection run looks for Maven, Gradle, Ant and Ivy descriptors across
//! the whole tree and keeps the first kind found, in that order. Every
//! descriptor becomes one [`BuildModule`]; a descriptor that cannot be read
//! degrades to a stub module and a diagnostic instead of failing the run.

pub mod ant;
pub mod config;
pub mod gradle;
pub mod ivy;
pub mod markup;
pub mod maven;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::core::scanner::walk_project;
use crate::error::{DetectionError, Diagnostics, Stage};

pub use config::ConfigMerger;

pub const DEFAULT_SCOPE: &str = "compile";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildSystem {
    Maven,
    Gradle,
    Ant,
    Ivy,
    Unknown,
}

impl BuildSystem {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Maven => "maven",
            Self::Gradle => "gradle",
            Self::Ant => "ant",
            Self::Ivy => "ivy",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for BuildSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependency {
    pub group: String,
    pub name: String,
    pub version: Option<String>,
    pub scope: String,
    pub optional: bool,
}

impl Dependency {
    pub fn new(group: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            name: name.into(),
            version: None,
            scope: DEFAULT_SCOPE.to_string(),
            optional: false,
        }
    }

    pub fn with_version(mut self, version: Option<String>) -> Self {
        self.version = version;
        self
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    pub fn with_optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentCoordinates {
    pub group: String,
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildModule {
    pub name: String,
    pub group: String,
    pub version: Option<String>,
    /// Directory holding the module's descriptor.
    pub path: PathBuf,
    pub build_system: BuildSystem,
    pub dependencies: Vec<Dependency>,
    pub properties: BTreeMap<String, String>,
    pub parent: Option<ParentCoordinates>,
    pub submodules: Vec<String>,
}

impl BuildModule {
    pub fn new(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        build_system: BuildSystem,
    ) -> Self {
        Self {
            name: name.into(),
            group: String::new(),
            version: None,
            path: path.into(),
            build_system,
            dependencies: Vec::new(),
            properties: BTreeMap::new(),
            parent: None,
            submodules: Vec::new(),
        }
    }

    /// Placeholder for a descriptor that could not be parsed.
    pub fn stub(directory: &Path, build_system: BuildSystem) -> Self {
        Self::new(directory_name(directory), directory, build_system)
    }

    pub fn directory_name(&self) -> String {
        directory_name(&self.path)
    }
}

/// Outcome of one detection run.
#[derive(Debug, Clone)]
pub struct Detection {
    pub build_system: BuildSystem,
    pub modules: Vec<BuildModule>,
}

/// Last path component, used wherever a directory stands in for a name.
pub fn directory_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "project".to_string())
}

/// Descriptor text, tolerating stray non-UTF-8 bytes.
pub(crate) fn read_descriptor(path: &Path) -> Result<String, DetectionError> {
    let bytes = fs::read(path).map_err(|source| DetectionError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub(crate) fn parent_dir(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}

#[derive(Debug, Default)]
struct Descriptors {
    poms: Vec<PathBuf>,
    gradle_builds: Vec<PathBuf>,
    ant_builds: Vec<PathBuf>,
    ivy_files: Vec<PathBuf>,
}

impl Descriptors {
    fn collect(root: &Path) -> Self {
        let mut found = Self::default();
        for entry in walk_project(root) {
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.into_path();
            match path.file_name().and_then(|name| name.to_str()) {
                Some("pom.xml") => found.poms.push(path),
                Some("build.gradle") | Some("build.gradle.kts") => found.gradle_builds.push(path),
                Some("build.xml") => found.ant_builds.push(path),
                Some("ivy.xml") => found.ivy_files.push(path),
                _ => {}
            }
        }
        found.poms.sort();
        found.gradle_builds.sort();
        found.ant_builds.sort();
        found.ivy_files.sort();
        found
    }
}

pub struct BuildSystemDetector;

impl BuildSystemDetector {
    pub fn new() -> Self {
        Self
    }

    pub fn detect(&self, root: &Path, diagnostics: &mut Diagnostics) -> Detection {
        let descriptors = Descriptors::collect(root);
        debug!(
            poms = descriptors.poms.len(),
            gradle = descriptors.gradle_builds.len(),
            ant = descriptors.ant_builds.len(),
            ivy = descriptors.ivy_files.len(),
            "build descriptors found"
        );

        let detection = if !descriptors.poms.is_empty() {
            self.detect_maven(&descriptors, diagnostics)
        } else if !descriptors.gradle_builds.is_empty() {
            self.detect_gradle(root, &descriptors, diagnostics)
        } else if !descriptors.ant_builds.is_empty() {
            self.detect_ant(&descriptors, diagnostics)
        } else if !descriptors.ivy_files.is_empty() {
            self.detect_ivy(&descriptors, diagnostics)
        } else {
            Detection {
                build_system: BuildSystem::Unknown,
                modules: vec![BuildModule::stub(root, BuildSystem::Unknown)],
            }
        };

        info!(
            build_system = %detection.build_system,
            modules = detection.modules.len(),
            "build system detected"
        );
        detection
    }

    fn detect_maven(&self, descriptors: &Descriptors, diagnostics: &mut Diagnostics) -> Detection {
        let modules = descriptors
            .poms
            .iter()
            .map(|pom| {
                maven::parse_pom(pom).unwrap_or_else(|err| {
                    diagnostics.push(Stage::Detection, Some(pom), err.to_string());
                    BuildModule::stub(&parent_dir(pom), BuildSystem::Maven)
                })
            })
            .collect();

        Detection {
            build_system: BuildSystem::Maven,
            modules,
        }
    }

    fn detect_gradle(
        &self,
        root: &Path,
        descriptors: &Descriptors,
        diagnostics: &mut Diagnostics,
    ) -> Detection {
        let subprojects = gradle::find_settings(root)
            .map(|settings| match gradle::parse_settings(&settings) {
                Ok(names) => names,
                Err(err) => {
                    diagnostics.push(Stage::Detection, Some(&settings), err.to_string());
                    Vec::new()
                }
            })
            .unwrap_or_default();

        let mut modules: Vec<BuildModule> = descriptors
            .gradle_builds
            .iter()
            .map(|build| {
                let mut module = gradle::parse_build(build).unwrap_or_else(|err| {
                    diagnostics.push(Stage::Detection, Some(build), err.to_string());
                    BuildModule::stub(&parent_dir(build), BuildSystem::Gradle)
                });
                if module.path == root {
                    module.submodules = subprojects.clone();
                }
                module
            })
            .collect();

        merge_ivy_companions(&mut modules, &descriptors.ivy_files, diagnostics);
        Detection {
            build_system: BuildSystem::Gradle,
            modules,
        }
    }

    fn detect_ant(&self, descriptors: &Descriptors, diagnostics: &mut Diagnostics) -> Detection {
        let mut modules: Vec<BuildModule> = descriptors
            .ant_builds
            .iter()
            .map(|build| {
                ant::parse_build(build).unwrap_or_else(|err| {
                    diagnostics.push(Stage::Detection, Some(build), err.to_string());
                    BuildModule::stub(&parent_dir(build), BuildSystem::Ant)
                })
            })
            .collect();

        merge_ivy_companions(&mut modules, &descriptors.ivy_files, diagnostics);
        Detection {
            build_system: BuildSystem::Ant,
            modules,
        }
    }

    fn detect_ivy(&self, descriptors: &Descriptors, diagnostics: &mut Diagnostics) -> Detection {
        let modules = descriptors
            .ivy_files
            .iter()
            .map(|ivy_file| {
                ivy::parse_module(ivy_file).unwrap_or_else(|err| {
                    diagnostics.push(Stage::Detection, Some(ivy_file), err.to_string());
                    BuildModule::stub(&parent_dir(ivy_file), BuildSystem::Ivy)
                })
            })
            .collect();

        Detection {
            build_system: BuildSystem::Ivy,
            modules,
        }
    }
}

impl Default for BuildSystemDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// Append dependencies from an `ivy.xml` sitting next to a Gradle or Ant descriptor.
fn merge_ivy_companions(
    modules: &mut [BuildModule],
    ivy_files: &[PathBuf],
    diagnostics: &mut Diagnostics,
) {
    for ivy_file in ivy_files {
        let directory = parent_dir(ivy_file);
        let Some(module) = modules.iter_mut().find(|module| module.path == directory) else {
            continue;
        };
        match ivy::parse_dependencies(ivy_file) {
            Ok(dependencies) => {
                debug!(
                    module = %module.name,
                    count = dependencies.len(),
                    "merged ivy dependencies"
                );
                module.dependencies.extend(dependencies);
            }
            Err(err) => diagnostics.push(Stage::Detection, Some(ivy_file), err.to_string()),
        }
    }
}
