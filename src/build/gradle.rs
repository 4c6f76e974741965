//! `build.gradle` / `build.gradle.kts` reader.
//!
//! Gradle scripts are programs, not data, so only literal declarations are
//! recognised: `group`/`version` assignments, `group:artifact:version`
//! coordinates and `project(':x')` references in the four supported
//! configurations, and `include` lists in the settings script.

use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{directory_name, parent_dir, read_descriptor, BuildModule, BuildSystem, Dependency};
use crate::error::DetectionError;

const SETTINGS_FILES: [&str; 2] = ["settings.gradle", "settings.gradle.kts"];

struct Patterns {
    group: Regex,
    version: Regex,
    coordinate: Regex,
    project: Regex,
    include: Regex,
    quoted: Regex,
}

impl Patterns {
    fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            group: Regex::new(r#"(?m)^\s*group\s*=?\s*["']([^"']+)["']"#)?,
            version: Regex::new(r#"(?m)^\s*version\s*=?\s*["']([^"']+)["']"#)?,
            coordinate: Regex::new(
                r#"\b(?:implementation|api|compile|testImplementation)\s*\(?\s*["']([^:"']+):([^:"']+):([^"']+)["']"#,
            )?,
            project: Regex::new(
                r#"\b(?:implementation|api|compile|testImplementation)\s*\(?\s*project\s*\(\s*(?:path\s*:\s*)?["']([^"']+)["']"#,
            )?,
            include: Regex::new(r#"(?m)^\s*include\b(.*)$"#)?,
            quoted: Regex::new(r#"["']([^"']+)["']"#)?,
        })
    }
}

pub fn parse_build(build_path: &Path) -> Result<BuildModule, DetectionError> {
    let content = read_descriptor(build_path)?;
    Ok(parse_build_str(&content, &parent_dir(build_path))?)
}

pub fn parse_build_str(content: &str, directory: &Path) -> Result<BuildModule, regex::Error> {
    let patterns = Patterns::compile()?;
    let mut module = BuildModule::new(directory_name(directory), directory, BuildSystem::Gradle);

    module.group = patterns
        .group
        .captures(content)
        .map(|caps| caps[1].to_string())
        .unwrap_or_default();
    module.version = patterns
        .version
        .captures(content)
        .map(|caps| caps[1].to_string());

    for caps in patterns.coordinate.captures_iter(content) {
        module.dependencies.push(
            Dependency::new(&caps[1], &caps[2]).with_version(Some(caps[3].to_string())),
        );
    }
    for caps in patterns.project.captures_iter(content) {
        let name = caps[1].rsplit(':').next().unwrap_or(&caps[1]).to_string();
        if name.is_empty() {
            continue;
        }
        module
            .dependencies
            .push(Dependency::new(module.group.clone(), name));
    }

    debug!(
        module = %module.name,
        dependencies = module.dependencies.len(),
        "parsed gradle build"
    );
    Ok(module)
}

/// The settings script at the project root, if there is one.
pub fn find_settings(root: &Path) -> Option<PathBuf> {
    SETTINGS_FILES
        .iter()
        .map(|name| root.join(name))
        .find(|path| path.is_file())
}

pub fn parse_settings(settings_path: &Path) -> Result<Vec<String>, DetectionError> {
    let content = read_descriptor(settings_path)?;
    Ok(parse_settings_str(&content)?)
}

/// Every quoted name on an `include` line, with leading `:` stripped.
pub fn parse_settings_str(content: &str) -> Result<Vec<String>, regex::Error> {
    let patterns = Patterns::compile()?;
    let names = patterns
        .include
        .captures_iter(content)
        .flat_map(|line| {
            patterns
                .quoted
                .captures_iter(line.get(1).map_or("", |m| m.as_str()))
                .map(|caps| caps[1].trim_start_matches(':').to_string())
                .filter(|name| !name.is_empty())
                .collect::<Vec<_>>()
        })
        .collect();
    Ok(names)
}
