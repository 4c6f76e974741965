//! Scalar configuration merged into module properties.
//!
//! Each module picks up `application*.properties`, `application*.yaml` and
//! `application*.yml` from beneath its own directory. Properties files are
//! applied first and YAML files second, so YAML wins on key collisions. Within
//! a multi-document YAML file, later documents win.

use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

use super::BuildModule;
use crate::core::scanner::is_ignored_dir;
use crate::error::{Diagnostics, Stage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum ConfigFormat {
    Properties,
    Yaml,
}

impl ConfigFormat {
    fn of(path: &Path) -> Option<Self> {
        let file_name = path.file_name()?.to_str()?;
        if !file_name.starts_with("application") {
            return None;
        }
        match path.extension()?.to_str()? {
            "properties" => Some(Self::Properties),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

pub struct ConfigMerger;

impl ConfigMerger {
    pub fn new() -> Self {
        Self
    }

    pub fn merge(&self, modules: &mut [BuildModule], diagnostics: &mut Diagnostics) {
        let module_dirs: Vec<PathBuf> = modules.iter().map(|module| module.path.clone()).collect();
        let mut merged = 0;

        for module in modules.iter_mut() {
            for (path, format) in self.config_files(&module.path, &module_dirs) {
                let content = match fs::read(&path) {
                    Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                    Err(err) => {
                        diagnostics.push(Stage::Config, Some(&path), err.to_string());
                        continue;
                    }
                };
                let entries = match format {
                    ConfigFormat::Properties => parse_properties(&content),
                    ConfigFormat::Yaml => match flatten_yaml(&content) {
                        Ok(entries) => entries,
                        Err(reason) => {
                            diagnostics.push(Stage::Config, Some(&path), reason);
                            continue;
                        }
                    },
                };
                debug!(
                    module = %module.name,
                    file = %path.display(),
                    entries = entries.len(),
                    "merging configuration"
                );
                module.properties.extend(entries);
                merged += 1;
            }
        }

        info!(files = merged, "configuration merged");
    }

    /// Config files under `module_dir`, properties before YAML, each group sorted.
    ///
    /// Directories owned by another module and any path with a `test`
    /// segment are skipped.
    fn config_files(
        &self,
        module_dir: &Path,
        module_dirs: &[PathBuf],
    ) -> Vec<(PathBuf, ConfigFormat)> {
        let mut files: Vec<(PathBuf, ConfigFormat)> = WalkDir::new(module_dir)
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0
                    || !(is_ignored_dir(entry)
                        || (entry.file_type().is_dir()
                            && module_dirs.iter().any(|dir| dir.as_path() == entry.path())))
            })
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| {
                !entry
                    .path()
                    .strip_prefix(module_dir)
                    .unwrap_or(entry.path())
                    .components()
                    .any(|component| component.as_os_str() == "test")
            })
            .filter_map(|entry| {
                let format = ConfigFormat::of(entry.path())?;
                Some((entry.into_path(), format))
            })
            .collect();

        files.sort_by(|(a_path, a_format), (b_path, b_format)| {
            a_format.cmp(b_format).then_with(|| a_path.cmp(b_path))
        });
        files
    }
}

impl Default for ConfigMerger {
    fn default() -> Self {
        Self::new()
    }
}

/// `key=value` lines; blank lines and `#`/`!` comments are skipped.
pub fn parse_properties(content: &str) -> Vec<(String, String)> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with('!'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .collect()
}

/// Top-level scalar entries of every document in a YAML stream, in document
/// order. Nested values and nulls are ignored.
pub fn flatten_yaml(content: &str) -> Result<Vec<(String, String)>, String> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    let documents: Vec<Value> =
        serde_saphyr::from_multiple(content).map_err(|err| err.to_string())?;
    Ok(documents
        .into_iter()
        .filter_map(|document| match document {
            Value::Object(mapping) => Some(mapping),
            _ => None,
        })
        .flatten()
        .filter_map(|(key, value)| {
            let value = match value {
                Value::String(text) => text,
                Value::Bool(flag) => flag.to_string(),
                Value::Number(number) => number.to_string(),
                _ => return None,
            };
            Some((key, value))
        })
        .collect())
}
