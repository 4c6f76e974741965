//! # jvmgraph
//!
//! Build-system aware dependency graphs for JVM source trees.
//!
//! jvmgraph detects the build system of a project (Maven, Gradle, Ant or
//! Ivy), reads its modules and their declared dependencies, parses every
//! Java, Kotlin, Scala and Groovy source file with tree-sitter, and merges
//! both views into one graph of modules and type declarations.
//!
//! ## Pipeline
//!
//! 1. [`build::BuildSystemDetector`] finds descriptors and builds module records
//! 2. [`build::ConfigMerger`] folds `application*` properties/YAML into them
//! 3. [`core::FileScanner`] discovers candidate sources per language
//! 4. [`parsers::ParserFactory`] parses them; the class extractor pulls out
//!    packages, imports and type declarations
//! 5. [`core::GraphAssembler`] deduplicates, resolves and classifies into a
//!    [`core::KnowledgeGraph`]
//!
//! Edges may point at ids with no node: those are external libraries or
//! unresolved references.

pub mod build;
pub mod core;
pub mod error;
pub mod formatters;
pub mod parsers;

pub use crate::core::{AnalyzerOptions, CodebaseAnalyzer, KnowledgeGraph};
