use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use jvmgraph::core::{AnalyzerOptions, CodebaseAnalyzer};
use jvmgraph::formatters::JsonGraphFormatter;
use jvmgraph::parsers::Language;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "jvmgraph",
    version,
    author = "jvmgraph developers",
    about = "Dependency graph of modules and types for Java, Kotlin, Scala and Groovy projects"
)]
struct Cli {
    /// Project root to analyze
    #[arg(short, long, value_name = "PATH")]
    input: PathBuf,

    /// Output file path
    #[arg(short, long, value_name = "FILE", default_value = "knowledge-graph.json")]
    output: PathBuf,

    /// Comma-separated list of languages to analyze
    #[arg(
        short,
        long,
        value_name = "LANGS",
        value_delimiter = ',',
        default_value = "java,kotlin,scala,groovy"
    )]
    languages: Vec<String>,

    /// Parse files on the calling thread only
    #[arg(long)]
    sequential: bool,

    /// Indent the JSON document
    #[arg(long)]
    pretty: bool,

    /// Add an externalLibraries section grouping unresolved targets by library
    #[arg(long)]
    library_groups: bool,

    /// Debug-level logging (RUST_LOG still applies otherwise)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    run(cli)
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("jvmgraph=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("jvmgraph=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr).compact())
        .init();
}

fn parse_languages(names: &[String]) -> Result<Vec<Language>> {
    let mut languages = Vec::with_capacity(names.len());
    for name in names.iter().map(|name| name.trim()).filter(|name| !name.is_empty()) {
        match Language::from_name(name) {
            Some(language) if !languages.contains(&language) => languages.push(language),
            Some(_) => {}
            None => bail!("unsupported language '{name}' (expected java, kotlin, scala or groovy)"),
        }
    }
    if languages.is_empty() {
        bail!("no languages selected");
    }
    Ok(languages)
}

fn run(cli: Cli) -> Result<()> {
    let Cli {
        input,
        output,
        languages,
        sequential,
        pretty,
        library_groups,
        verbose: _,
    } = cli;

    let start_time = Instant::now();

    let mut options = AnalyzerOptions::default().with_languages(parse_languages(&languages)?);
    if sequential {
        options = options.sequential();
    }
    info!(
        input = %input.display(),
        output = %output.display(),
        languages = ?options.languages,
        "starting analysis"
    );

    let analyzer = CodebaseAnalyzer::with_options(options);
    let graph = analyzer.analyze(&input)?;

    JsonGraphFormatter::new()
        .with_pretty(pretty)
        .with_library_groups(library_groups)
        .format_to_file(&graph, &output)?;

    info!(
        modules = graph.stats.modules,
        types = graph.stats.types,
        edges = graph.edges.len(),
        diagnostics = graph.diagnostics.len(),
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        output = %output.display(),
        "knowledge graph written"
    );
    Ok(())
}
