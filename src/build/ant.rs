//! Ant `build.xml` reader.
//!
//! Ant build graphs do not name artifacts, so the dependency list stays
//! empty. Classpath library references are only counted.

use std::path::Path;
use tracing::debug;

use super::markup::{parse_document, XmlElement};
use super::{directory_name, parent_dir, read_descriptor, BuildModule, BuildSystem};
use crate::error::DetectionError;

pub fn parse_build(build_path: &Path) -> Result<BuildModule, DetectionError> {
    let content = read_descriptor(build_path)?;
    parse_build_str(&content, build_path)
}

pub fn parse_build_str(content: &str, build_path: &Path) -> Result<BuildModule, DetectionError> {
    let project = parse_document(content).map_err(|err| DetectionError::Malformed {
        path: build_path.to_path_buf(),
        reason: err.to_string(),
    })?;
    if project.local_name() != "project" {
        return Err(DetectionError::UnexpectedRoot {
            path: build_path.to_path_buf(),
            expected: "project",
            found: project.name.clone(),
        });
    }

    let directory = parent_dir(build_path);
    let name = project
        .attribute("name")
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| directory_name(&directory));

    debug!(
        module = %name,
        library_references = library_references(&project),
        "parsed ant build"
    );
    Ok(BuildModule::new(name, directory, BuildSystem::Ant))
}

/// Filesets under `<path>`/`<classpath>` that point at jar libraries.
pub fn library_references(project: &XmlElement) -> usize {
    ["path", "classpath"]
        .iter()
        .flat_map(|container| project.descendants_named(container))
        .flat_map(|container| container.descendants_named("fileset"))
        .filter(|fileset| {
            let dir = fileset.attribute("dir").unwrap_or_default();
            let includes = fileset.attribute("includes").unwrap_or_default();
            dir.to_lowercase().contains("lib") || includes.contains(".jar")
        })
        .count()
}
