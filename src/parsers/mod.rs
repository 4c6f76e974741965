pub mod common;
pub mod extractor;
pub mod grammar;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{Diagnostics, ParseError, Stage};
use common::TreeSitterParser;
use extractor::ClassExtractor;
use grammar::GrammarKinds;

/// The four JVM source languages the analyzer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Java,
    Kotlin,
    Scala,
    Groovy,
}

impl Language {
    pub const ALL: [Language; 4] = [
        Language::Java,
        Language::Kotlin,
        Language::Scala,
        Language::Groovy,
    ];

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "java" => Some(Self::Java),
            "kt" => Some(Self::Kotlin),
            "scala" => Some(Self::Scala),
            "groovy" => Some(Self::Groovy),
            _ => None,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "java" => Some(Self::Java),
            "kotlin" | "kt" => Some(Self::Kotlin),
            "scala" => Some(Self::Scala),
            "groovy" => Some(Self::Groovy),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Java => "java",
            Self::Kotlin => "kotlin",
            Self::Scala => "scala",
            Self::Groovy => "groovy",
        }
    }

    /// Import prefixes treated as the platform standard library for this language.
    pub fn stdlib_roots(self) -> &'static [&'static str] {
        match self {
            Self::Java => &["java."],
            Self::Kotlin => &["kotlin.", "java."],
            Self::Scala => &["scala.", "java."],
            Self::Groovy => &["groovy.", "java."],
        }
    }

    pub fn tree_sitter_language(self) -> tree_sitter::Language {
        match self {
            Self::Java => tree_sitter_java::LANGUAGE.into(),
            Self::Kotlin => tree_sitter_kotlin_ng::LANGUAGE.into(),
            Self::Scala => tree_sitter_scala::LANGUAGE.into(),
            Self::Groovy => tree_sitter_groovy::LANGUAGE.into(),
        }
    }

    pub fn grammar(self) -> &'static GrammarKinds {
        match self {
            Self::Java => &grammar::JAVA,
            Self::Kotlin => &grammar::KOTLIN,
            Self::Scala => &grammar::SCALA,
            Self::Groovy => &grammar::GROOVY,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    Annotation,
    Object,
}

impl TypeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Interface => "interface",
            Self::Enum => "enum",
            Self::Annotation => "annotation",
            Self::Object => "object",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDeclaration {
    pub name: String,
    pub package: String,
    pub kind: TypeKind,
    pub modifiers: Vec<String>,
    pub annotations: Vec<String>,
    pub superclass: Option<String>,
    pub interfaces: Vec<String>,
}

impl TypeDeclaration {
    /// `package.name`, or the bare name for the default package.
    pub fn qualified_name(&self) -> String {
        if self.package.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.package, self.name)
        }
    }
}

/// One import statement, with its path normalised to dotted form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportDecl {
    pub path: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub wildcard: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub static_member: bool,
}

impl ImportDecl {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            wildcard: false,
            static_member: false,
        }
    }

    pub fn wildcard(mut self) -> Self {
        self.wildcard = true;
        self
    }

    pub fn static_member(mut self) -> Self {
        self.static_member = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedFile {
    /// Path relative to the project root.
    pub path: PathBuf,
    pub language: Language,
    pub package: String,
    pub imports: Vec<ImportDecl>,
    pub declarations: Vec<TypeDeclaration>,
}

/// Holds the grammars that loaded successfully; built once per run.
pub struct ParserFactory {
    grammars: BTreeMap<Language, tree_sitter::Language>,
}

impl ParserFactory {
    pub fn new() -> Self {
        let mut diagnostics = Diagnostics::new();
        Self::load(&Language::ALL, &mut diagnostics)
    }

    /// Probe each requested grammar once. A grammar that fails to load is
    /// reported and left out; the other languages are unaffected.
    pub fn load(languages: &[Language], diagnostics: &mut Diagnostics) -> Self {
        let mut grammars = BTreeMap::new();
        for &language in languages {
            let ts_language = language.tree_sitter_language();
            match TreeSitterParser::new(language, &ts_language) {
                Ok(_) => {
                    debug!(%language, "grammar loaded");
                    grammars.insert(language, ts_language);
                }
                Err(err) => {
                    diagnostics.push(
                        Stage::Grammar,
                        None,
                        format!("skipping all {language} sources: {err}"),
                    );
                }
            }
        }
        info!(loaded = grammars.len(), "grammars ready");
        Self { grammars }
    }

    pub fn is_available(&self, language: Language) -> bool {
        self.grammars.contains_key(&language)
    }

    pub fn get_parser(&self, language: Language) -> Result<LanguageParser, ParseError> {
        let ts_language = self
            .grammars
            .get(&language)
            .ok_or_else(|| ParseError::Grammar {
                language,
                reason: "grammar was not loaded".to_string(),
            })?;
        Ok(LanguageParser {
            language,
            parser: TreeSitterParser::new(language, ts_language)?,
        })
    }
}

impl Default for ParserFactory {
    fn default() -> Self {
        Self::new()
    }
}

/// A parser bound to one grammar. Not shareable across threads; create one
/// per worker from the [`ParserFactory`].
pub struct LanguageParser {
    language: Language,
    parser: TreeSitterParser,
}

impl LanguageParser {
    pub fn language(&self) -> Language {
        self.language
    }

    /// Parse `file_path` and extract its declarations. `Ok(None)` means the
    /// file parsed but declared no types.
    pub fn parse_file(
        &mut self,
        file_path: &Path,
        project_root: &Path,
    ) -> Result<Option<ParsedFile>, ParseError> {
        let bytes = fs::read(file_path).map_err(|source| ParseError::Read {
            path: file_path.to_path_buf(),
            source,
        })?;
        let source = String::from_utf8(bytes).map_err(|_| ParseError::Decode {
            path: file_path.to_path_buf(),
        })?;

        let relative = file_path
            .strip_prefix(project_root)
            .unwrap_or(file_path)
            .to_path_buf();
        self.parse_source(&relative, &source)
    }

    /// Parse in-memory source; `path` is recorded as-is on the result.
    pub fn parse_source(
        &mut self,
        path: &Path,
        source: &str,
    ) -> Result<Option<ParsedFile>, ParseError> {
        let tree = self
            .parser
            .parse(source.as_bytes())
            .ok_or_else(|| ParseError::NoTree {
                path: path.to_path_buf(),
            })?;
        if tree.root_node().has_error() {
            debug!(path = %path.display(), "syntax tree contains error nodes");
        }

        Ok(ClassExtractor::new(self.language).extract(&tree, source.as_bytes(), path))
    }
}
