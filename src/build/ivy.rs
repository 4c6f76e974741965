//! `ivy.xml` reader, used standalone or merged into a co-located module.

use std::path::Path;
use tracing::debug;

use super::markup::{parse_document, XmlElement};
use super::{directory_name, parent_dir, read_descriptor, BuildModule, BuildSystem, Dependency};
use crate::error::DetectionError;

fn parse_ivy_module(content: &str, ivy_path: &Path) -> Result<XmlElement, DetectionError> {
    let document = parse_document(content).map_err(|err| DetectionError::Malformed {
        path: ivy_path.to_path_buf(),
        reason: err.to_string(),
    })?;
    if document.local_name() != "ivy-module" {
        return Err(DetectionError::UnexpectedRoot {
            path: ivy_path.to_path_buf(),
            expected: "ivy-module",
            found: document.name.clone(),
        });
    }
    Ok(document)
}

pub fn parse_dependencies(ivy_path: &Path) -> Result<Vec<Dependency>, DetectionError> {
    let content = read_descriptor(ivy_path)?;
    let document = parse_ivy_module(&content, ivy_path)?;
    Ok(dependencies(&document))
}

/// A directory-scoped module built from a standalone `ivy.xml`.
pub fn parse_module(ivy_path: &Path) -> Result<BuildModule, DetectionError> {
    let content = read_descriptor(ivy_path)?;
    parse_module_str(&content, ivy_path)
}

pub fn parse_module_str(content: &str, ivy_path: &Path) -> Result<BuildModule, DetectionError> {
    let document = parse_ivy_module(content, ivy_path)?;
    let directory = parent_dir(ivy_path);

    let mut module = BuildModule::new(directory_name(&directory), directory, BuildSystem::Ivy);
    if let Some(info) = document.child("info") {
        module.group = info.attribute("organisation").unwrap_or_default().to_string();
        module.version = info.attribute("revision").map(str::to_string);
    }
    module.dependencies = dependencies(&document);

    debug!(
        module = %module.name,
        dependencies = module.dependencies.len(),
        "parsed ivy module"
    );
    Ok(module)
}

fn dependencies(document: &XmlElement) -> Vec<Dependency> {
    let Some(dependencies) = document.child("dependencies") else {
        return Vec::new();
    };
    dependencies
        .children_named("dependency")
        .map(|dependency| {
            Dependency::new(
                dependency.attribute("org").unwrap_or_default(),
                dependency.attribute("name").unwrap_or_default(),
            )
            .with_version(dependency.attribute("rev").map(str::to_string))
        })
        .collect()
}
