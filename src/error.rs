use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

use crate::parsers::Language;

/// A build descriptor that could not be turned into a module record.
#[derive(Debug, Error)]
pub enum DetectionError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed markup in {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },

    #[error("{path}: expected root element <{expected}>, found <{found}>")]
    UnexpectedRoot {
        path: PathBuf,
        expected: &'static str,
        found: String,
    },

    #[error("descriptor pattern failed to compile: {0}")]
    Pattern(#[from] regex::Error),
}

/// A source file that could not be turned into a syntax tree.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not valid UTF-8")]
    Decode { path: PathBuf },

    #[error("{language} grammar could not be loaded: {reason}")]
    Grammar { language: Language, reason: String },

    #[error("parser produced no syntax tree for {path}")]
    NoTree { path: PathBuf },
}

#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("project root {path} is not readable: {source}")]
    UnreadableRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Pipeline stage a diagnostic originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Stage {
    Detection,
    Config,
    Discovery,
    Grammar,
    Parse,
}

/// Non-fatal failure recorded alongside the partial result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub stage: Stage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    pub message: String,
}

/// Collects diagnostics for one pipeline run, logging each as it arrives.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, stage: Stage, path: Option<&Path>, message: impl Into<String>) {
        let message = message.into();
        match path {
            Some(path) => warn!(?stage, path = %path.display(), "{message}"),
            None => warn!(?stage, "{message}"),
        }
        self.entries.push(Diagnostic {
            stage,
            path: path.map(Path::to_path_buf),
            message,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("module dependency cycle through {module}")]
    Cycle { module: String },

    #[error("no node with id {0}")]
    UnknownNode(String),
}
