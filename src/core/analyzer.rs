use anyhow::Result;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::assembler::GraphAssembler;
use super::graph::KnowledgeGraph;
use super::FileScanner;
use crate::build::{directory_name, BuildSystemDetector, ConfigMerger};
use crate::error::{AnalyzeError, Diagnostics, ParseError, Stage};
use crate::parsers::{Language, LanguageParser, ParsedFile, ParserFactory};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerOptions {
    pub languages: Vec<Language>,
    /// Fan file parsing out over the rayon pool.
    pub parallel: bool,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        Self {
            languages: Language::ALL.to_vec(),
            parallel: true,
        }
    }
}

impl AnalyzerOptions {
    pub fn with_languages(mut self, languages: Vec<Language>) -> Self {
        self.languages = languages;
        self
    }

    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

type ParseOutcome = Result<Option<ParsedFile>, ParseError>;

/// Runs the whole pipeline: detection, config merge, discovery, parsing and assembly.
pub struct CodebaseAnalyzer {
    options: AnalyzerOptions,
    detector: BuildSystemDetector,
    config_merger: ConfigMerger,
    file_scanner: FileScanner,
}

impl CodebaseAnalyzer {
    pub fn new() -> Self {
        Self::with_options(AnalyzerOptions::default())
    }

    pub fn with_options(options: AnalyzerOptions) -> Self {
        Self {
            options,
            detector: BuildSystemDetector::new(),
            config_merger: ConfigMerger::new(),
            file_scanner: FileScanner::new(),
        }
    }

    pub fn options(&self) -> &AnalyzerOptions {
        &self.options
    }

    /// Analyse the tree at `root_path`. Only an unreadable root is an error;
    /// everything else degrades into diagnostics on the returned graph.
    pub fn analyze(&self, root_path: &Path) -> Result<KnowledgeGraph> {
        let root = root_path
            .canonicalize()
            .and_then(|root| std::fs::read_dir(&root).map(|_| root))
            .map_err(|source| AnalyzeError::UnreadableRoot {
                path: root_path.to_path_buf(),
                source,
            })?;
        let project_name = directory_name(&root);
        info!(project = %project_name, root = %root.display(), "analyzing project");

        let mut diagnostics = Diagnostics::new();

        let mut detection = self.detector.detect(&root, &mut diagnostics);
        self.config_merger.merge(&mut detection.modules, &mut diagnostics);

        let factory = ParserFactory::load(&self.options.languages, &mut diagnostics);
        let discovered = self
            .file_scanner
            .scan_directory(&root, &self.options.languages);
        let files_discovered = discovered.values().map(Vec::len).sum();

        let jobs: Vec<(Language, PathBuf)> = discovered
            .into_iter()
            .filter(|(language, _)| factory.is_available(*language))
            .flat_map(|(language, paths)| paths.into_iter().map(move |path| (language, path)))
            .collect();
        info!(files = jobs.len(), parallel = self.options.parallel, "parsing sources");

        let outcomes = if self.options.parallel {
            parse_parallel(&factory, &root, &jobs)
        } else {
            parse_sequential(&factory, &root, &jobs)
        };

        let mut parsed_files = Vec::with_capacity(outcomes.len());
        for ((_, path), outcome) in jobs.iter().zip(outcomes) {
            match outcome {
                Ok(Some(parsed)) => parsed_files.push(parsed),
                Ok(None) => debug!(path = %path.display(), "no type declarations"),
                Err(err) => diagnostics.push(Stage::Parse, Some(path), err.to_string()),
            }
        }
        info!(parsed = parsed_files.len(), "parsing complete");

        let graph = GraphAssembler::new(project_name, root).assemble(
            &detection,
            &parsed_files,
            files_discovered,
            diagnostics,
        );
        Ok(graph)
    }
}

impl Default for CodebaseAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_one(
    parser: &mut Option<LanguageParser>,
    factory: &ParserFactory,
    language: Language,
    path: &Path,
    root: &Path,
) -> ParseOutcome {
    if parser.as_ref().map(LanguageParser::language) != Some(language) {
        *parser = Some(factory.get_parser(language)?);
    }
    match parser.as_mut() {
        Some(parser) => parser.parse_file(path, root),
        None => Err(ParseError::Grammar {
            language,
            reason: "parser unavailable".to_string(),
        }),
    }
}

/// One parser per rayon worker, rebuilt only when the language changes.
/// Results come back in `jobs` order.
fn parse_parallel(
    factory: &ParserFactory,
    root: &Path,
    jobs: &[(Language, PathBuf)],
) -> Vec<ParseOutcome> {
    jobs.par_iter()
        .map_init(
            || None,
            |parser, (language, path)| parse_one(parser, factory, *language, path, root),
        )
        .collect()
}

fn parse_sequential(
    factory: &ParserFactory,
    root: &Path,
    jobs: &[(Language, PathBuf)],
) -> Vec<ParseOutcome> {
    let mut parser = None;
    jobs.iter()
        .map(|(language, path)| parse_one(&mut parser, factory, *language, path, root))
        .collect()
}
