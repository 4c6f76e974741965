pub mod analyzer;
pub mod assembler;
pub mod classify;
pub mod graph;
pub mod query;
pub mod resolver;
pub mod scanner;

pub use analyzer::{AnalyzerOptions, CodebaseAnalyzer};
pub use assembler::GraphAssembler;
pub use graph::{Edge, EdgeKind, GraphBuilder, GraphNode, GraphStats, KnowledgeGraph};
pub use query::GraphIndex;
pub use resolver::{resolve_type_name, NameResolver};
pub use scanner::FileScanner;
