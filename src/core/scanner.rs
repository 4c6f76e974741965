use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

use crate::parsers::Language;

/// Build output and tool state directories; never descended into.
pub const IGNORED_DIRS: [&str; 5] = ["target", "build", "out", ".gradle", ".git"];

/// Directory suffixes marking backup or scratch copies of a tree.
pub const BACKUP_SUFFIXES: [&str; 5] = [".backup", ".old", ".bak", ".tmp", "~"];

fn is_excluded_segment(segment: &str) -> bool {
    IGNORED_DIRS.contains(&segment)
        || BACKUP_SUFFIXES
            .iter()
            .any(|suffix| segment.ends_with(suffix))
}

/// Whether the walk should skip this directory and everything below it.
pub fn is_ignored_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(is_excluded_segment)
}

/// Every entry under `root`, skipping ignored directories. The root itself
/// is always walked even when its own name would be ignored.
pub fn walk_project(root: &Path) -> impl Iterator<Item = DirEntry> {
    WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_ignored_dir(entry))
        .filter_map(|entry| entry.ok())
}

fn segments(relative: &Path) -> Vec<&str> {
    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(segment) => segment.to_str(),
            _ => None,
        })
        .collect()
}

/// Source-layout acceptance rules, applied to a path relative to the project root.
///
/// Java is strict about tests while the other languages are not: Kotlin,
/// Scala and Groovy files are accepted anywhere below a `src` directory.
pub fn accepts(language: Language, relative: &Path) -> bool {
    let segments = segments(relative);
    let directories = &segments[..segments.len().saturating_sub(1)];
    if directories.iter().any(|segment| is_excluded_segment(segment)) {
        return false;
    }

    let has_src = directories.contains(&"src");
    match language {
        Language::Java => {
            let maven_layout = directories
                .windows(3)
                .any(|window| window == ["src", "main", "java"]);
            if maven_layout {
                true
            } else if has_src {
                !directories.contains(&"test")
            } else {
                segments.len() >= 3
            }
        }
        Language::Kotlin | Language::Scala | Language::Groovy => has_src,
    }
}

pub struct FileScanner;

impl FileScanner {
    pub fn new() -> Self {
        Self
    }

    /// Candidate source files per language, each list sorted.
    pub fn scan_directory(
        &self,
        root_path: &Path,
        languages: &[Language],
    ) -> BTreeMap<Language, Vec<PathBuf>> {
        let entries: Vec<DirEntry> = walk_project(root_path)
            .filter(|entry| entry.file_type().is_file())
            .collect();

        let candidates: Vec<(Language, PathBuf)> = entries
            .par_iter()
            .filter_map(|entry| {
                let path = entry.path();
                let language = path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .and_then(Language::from_extension)
                    .filter(|language| languages.contains(language))?;
                let relative = path.strip_prefix(root_path).unwrap_or(path);
                if accepts(language, relative) {
                    Some((language, path.to_path_buf()))
                } else {
                    debug!(path = %relative.display(), %language, "outside source layout, skipped");
                    None
                }
            })
            .collect();

        let mut files: BTreeMap<Language, Vec<PathBuf>> =
            languages.iter().map(|&language| (language, Vec::new())).collect();
        for (language, path) in candidates {
            files.entry(language).or_default().push(path);
        }
        for paths in files.values_mut() {
            paths.sort();
        }

        info!(
            files = files.values().map(Vec::len).sum::<usize>(),
            "source discovery complete"
        );
        files
    }
}

impl Default for FileScanner {
    fn default() -> Self {
        Self::new()
    }
}
