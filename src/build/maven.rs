//! `pom.xml` reader.

use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use super::markup::{parse_document, XmlElement};
use super::{
    directory_name, parent_dir, read_descriptor, BuildModule, BuildSystem, Dependency,
    ParentCoordinates, DEFAULT_SCOPE,
};
use crate::error::DetectionError;

pub fn parse_pom(pom_path: &Path) -> Result<BuildModule, DetectionError> {
    let content = read_descriptor(pom_path)?;
    parse_pom_str(&content, pom_path)
}

/// Builds a module from POM text; `pom_path` only names the module's directory.
pub fn parse_pom_str(content: &str, pom_path: &Path) -> Result<BuildModule, DetectionError> {
    let project = parse_document(content).map_err(|err| DetectionError::Malformed {
        path: pom_path.to_path_buf(),
        reason: err.to_string(),
    })?;
    if project.local_name() != "project" {
        return Err(DetectionError::UnexpectedRoot {
            path: pom_path.to_path_buf(),
            expected: "project",
            found: project.name.clone(),
        });
    }

    let directory = parent_dir(pom_path);
    let parent = project.child("parent").map(|parent| ParentCoordinates {
        group: parent.child_text("groupId").unwrap_or_default(),
        name: parent.child_text("artifactId").unwrap_or_default(),
        version: parent.child_text("version").unwrap_or_default(),
    });

    let group = project
        .child_text("groupId")
        .or_else(|| parent.as_ref().map(|parent| parent.group.clone()))
        .unwrap_or_default();
    let name = project
        .child_text("artifactId")
        .unwrap_or_else(|| directory_name(&directory));

    let mut module = BuildModule::new(name, directory, BuildSystem::Maven);
    module.group = group;
    module.version = project.child_text("version");
    module.parent = parent;
    module.submodules = submodules(&project);
    module.properties = properties(&project);
    module.dependencies = dependencies(&project);

    debug!(
        module = %module.name,
        dependencies = module.dependencies.len(),
        submodules = module.submodules.len(),
        "parsed pom"
    );
    Ok(module)
}

fn submodules(project: &XmlElement) -> Vec<String> {
    project
        .child("modules")
        .map(|modules| {
            modules
                .children_named("module")
                .map(|module| module.text.trim().to_string())
                .filter(|name| !name.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

fn properties(project: &XmlElement) -> BTreeMap<String, String> {
    project
        .child("properties")
        .map(|properties| {
            properties
                .children
                .iter()
                .map(|property| {
                    (
                        property.local_name().to_string(),
                        property.text.trim().to_string(),
                    )
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Direct `<dependencies>` only; `<dependencyManagement>` pins versions but declares nothing.
fn dependencies(project: &XmlElement) -> Vec<Dependency> {
    let Some(dependencies) = project.child("dependencies") else {
        return Vec::new();
    };
    dependencies
        .children_named("dependency")
        .map(|dependency| {
            Dependency::new(
                dependency.child_text("groupId").unwrap_or_default(),
                dependency.child_text("artifactId").unwrap_or_default(),
            )
            .with_version(dependency.child_text("version"))
            .with_scope(
                dependency
                    .child_text("scope")
                    .unwrap_or_else(|| DEFAULT_SCOPE.to_string()),
            )
            .with_optional(
                dependency
                    .child_text("optional")
                    .is_some_and(|optional| optional.eq_ignore_ascii_case("true")),
            )
        })
        .collect()
}
