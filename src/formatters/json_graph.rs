use anyhow::Result;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;

use crate::core::{GraphIndex, KnowledgeGraph};

/// Writes the graph document as JSON.
pub struct JsonGraphFormatter {
    pretty: bool,
    /// Append an `externalLibraries` map grouping dangling targets by library.
    library_groups: bool,
}

impl JsonGraphFormatter {
    pub fn new() -> Self {
        Self {
            pretty: false,
            library_groups: false,
        }
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn with_library_groups(mut self, library_groups: bool) -> Self {
        self.library_groups = library_groups;
        self
    }

    pub fn format_to_file(&self, graph: &KnowledgeGraph, output_path: &Path) -> Result<()> {
        let content = self.format_graph(graph)?;
        if let Some(parent) = output_path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(output_path, content)?;
        Ok(())
    }

    pub fn format_graph(&self, graph: &KnowledgeGraph) -> Result<String> {
        let mut document = serde_json::to_value(graph)?;
        if self.library_groups {
            let groups = GraphIndex::new(graph).external_libraries();
            if let Value::Object(fields) = &mut document {
                fields.insert("externalLibraries".to_string(), json!(groups));
            }
        }

        let content = if self.pretty {
            serde_json::to_string_pretty(&document)?
        } else {
            serde_json::to_string(&document)?
        };
        Ok(content)
    }
}

impl Default for JsonGraphFormatter {
    fn default() -> Self {
        Self::new()
    }
}
