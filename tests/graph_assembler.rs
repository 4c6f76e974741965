use jvmgraph::build::{BuildModule, BuildSystem, Dependency, Detection};
use jvmgraph::core::graph::{module_id, system_id};
use jvmgraph::core::{EdgeKind, GraphAssembler, GraphNode, KnowledgeGraph};
use jvmgraph::error::{Diagnostics, Stage};
use jvmgraph::parsers::{ImportDecl, Language, ParsedFile, TypeDeclaration, TypeKind};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

fn detection() -> Detection {
    let mut shop = BuildModule::new("shop", "/work/shop", BuildSystem::Maven);
    shop.group = "com.acme".to_string();
    shop.submodules = vec!["a".to_string(), "b".to_string(), "missing".to_string()];

    let a = BuildModule::new("a", "/work/shop/a", BuildSystem::Maven);

    let mut b = BuildModule::new("b", "/work/shop/b", BuildSystem::Maven);
    b.dependencies = vec![
        Dependency::new("com.acme", "a"),
        Dependency::new("org.junit.jupiter", "junit-jupiter").with_scope("test"),
    ];

    Detection {
        build_system: BuildSystem::Maven,
        modules: vec![shop, a, b],
    }
}

fn declaration(package: &str, name: &str, annotations: &[&str]) -> TypeDeclaration {
    TypeDeclaration {
        name: name.to_string(),
        package: package.to_string(),
        kind: TypeKind::Class,
        modifiers: vec!["public".to_string()],
        annotations: annotations.iter().map(|a| a.to_string()).collect(),
        superclass: None,
        interfaces: Vec::new(),
    }
}

fn parsed_files() -> Vec<ParsedFile> {
    let base = ParsedFile {
        path: PathBuf::from("a/src/main/java/com/acme/a/Base.java"),
        language: Language::Java,
        package: "com.acme.a".to_string(),
        imports: vec![ImportDecl::new("javax.persistence.Entity")],
        declarations: vec![declaration("com.acme.a", "Base", &["Entity"])],
    };

    let mut service = declaration("com.acme.b", "OrderService", &["Service"]);
    service.superclass = Some("Base".to_string());
    service.interfaces = vec!["OrderApi".to_string()];
    let order_service = ParsedFile {
        path: PathBuf::from("b/src/main/java/com/acme/b/OrderService.java"),
        language: Language::Java,
        package: "com.acme.b".to_string(),
        imports: vec![
            ImportDecl::new("com.acme.a.Base"),
            ImportDecl::new("java.util.List"),
            ImportDecl::new("org.springframework.stereotype.Service"),
            ImportDecl::new("com.acme.util").wildcard(),
            ImportDecl::new("com.acme.a.Base.helper").static_member(),
        ],
        declarations: vec![service.clone()],
    };

    // Same type declared again, e.g. from a generated source copy.
    let mut again = service;
    again.annotations = vec!["Transactional".to_string(), "Service".to_string()];
    let duplicate = ParsedFile {
        declarations: vec![again],
        ..order_service.clone()
    };

    let tool = ParsedFile {
        path: PathBuf::from("tools/Gen.java"),
        language: Language::Java,
        package: String::new(),
        imports: Vec::new(),
        declarations: vec![declaration("", "Gen", &[])],
    };

    vec![base, order_service, duplicate, tool]
}

fn assemble() -> KnowledgeGraph {
    GraphAssembler::new("shop", "/work/shop").assemble(
        &detection(),
        &parsed_files(),
        7,
        Diagnostics::new(),
    )
}

fn has_edge(graph: &KnowledgeGraph, kind: EdgeKind, from: &str, to: &str) -> bool {
    graph
        .edges
        .iter()
        .any(|edge| edge.kind == kind && edge.from == from && edge.to == to)
}

#[test]
fn nodes_are_deduplicated_by_id() {
    let graph = assemble();

    let ids: Vec<&str> = graph.nodes.iter().map(GraphNode::id).collect();
    assert_eq!(
        ids,
        vec![
            "system:shop",
            "module:shop",
            "module:a",
            "module:b",
            "com.acme.a.Base",
            "com.acme.b.OrderService",
            "Gen",
        ]
    );

    let service = graph.node("com.acme.b.OrderService").and_then(GraphNode::as_type).unwrap();
    assert_eq!(service.annotations, vec!["Service", "Transactional"]);
    assert_eq!(service.module.as_deref(), Some("b"));
    assert_eq!(service.layer, "service");
    assert_eq!(service.feature, "order");
}

#[test]
fn structural_edges() {
    let graph = assemble();
    let system = system_id("shop");

    for module in ["shop", "a", "b"] {
        assert!(has_edge(&graph, EdgeKind::Contains, &system, &module_id(module)));
    }
    assert!(has_edge(&graph, EdgeKind::Contains, "module:a", "com.acme.a.Base"));
    assert!(has_edge(&graph, EdgeKind::Contains, "module:b", "com.acme.b.OrderService"));
    // Outside every submodule, so the root module owns it.
    assert!(has_edge(&graph, EdgeKind::Contains, "module:shop", "Gen"));
    let gen = graph.node("Gen").and_then(GraphNode::as_type).unwrap();
    assert_eq!(gen.module.as_deref(), Some("shop"));

    let aggregates: Vec<&str> = graph
        .edges_of_kind(EdgeKind::Aggregates)
        .map(|edge| edge.to.as_str())
        .collect();
    assert_eq!(aggregates, vec!["module:a", "module:b"]);
}

#[test]
fn module_dependencies_only_link_known_modules() {
    let graph = assemble();
    let depends: Vec<_> = graph.edges_of_kind(EdgeKind::DependsOn).collect();
    assert_eq!(depends.len(), 1);
    assert_eq!(depends[0].from, "module:b");
    assert_eq!(depends[0].to, "module:a");
    assert_eq!(depends[0].scope.as_deref(), Some("compile"));
}

#[test]
fn type_edges_are_resolved_and_filtered() {
    let graph = assemble();
    let service = "com.acme.b.OrderService";

    assert!(has_edge(&graph, EdgeKind::Extends, service, "com.acme.a.Base"));
    assert!(has_edge(&graph, EdgeKind::Implements, service, "com.acme.b.OrderApi"));
    assert!(has_edge(&graph, EdgeKind::Imports, "com.acme.a.Base", "javax.persistence.Entity"));

    let mut imports: Vec<&str> = graph
        .edges_of_kind(EdgeKind::Imports)
        .filter(|edge| edge.from == service)
        .map(|edge| edge.to.as_str())
        .collect();
    imports.sort_unstable();
    assert_eq!(imports, vec!["com.acme.a.Base", "org.springframework.stereotype.Service"]);
}

#[test]
fn edges_are_unique_and_start_at_known_nodes() {
    let graph = assemble();
    let ids: HashSet<&str> = graph.nodes.iter().map(GraphNode::id).collect();
    let unique: HashSet<_> = graph.edges.iter().collect();

    assert_eq!(unique.len(), graph.edges.len());
    assert!(graph.edges.iter().all(|edge| ids.contains(edge.from.as_str())));
    // Dangling targets are kept.
    assert!(graph.edges.iter().any(|edge| !ids.contains(edge.to.as_str())));
}

#[test]
fn stats_and_metadata() {
    let mut diagnostics = Diagnostics::new();
    diagnostics.push(Stage::Parse, Some(Path::new("b/Broken.java")), "not valid UTF-8");
    let graph = GraphAssembler::new("shop", "/work/shop").assemble(
        &detection(),
        &parsed_files(),
        7,
        diagnostics,
    );

    assert_eq!(graph.metadata.project, "shop");
    assert_eq!(graph.metadata.build_system, BuildSystem::Maven);
    assert_eq!(graph.metadata.languages, vec![Language::Java]);
    assert_eq!(graph.diagnostics.len(), 1);

    let stats = &graph.stats;
    assert_eq!(stats.files, 7);
    assert_eq!(stats.files_parsed, 4);
    assert_eq!(stats.modules, 3);
    assert_eq!(stats.types, 3);
    assert_eq!(stats.classes, 3);
    assert_eq!(stats.module_dependencies, 1);
    assert_eq!(stats.module_aggregations, 2);
    assert_eq!(stats.dependencies, 5);
    assert_eq!(stats.by_module.get("b"), Some(&1));
}

#[test]
fn assembly_is_deterministic() {
    let first = assemble();
    let second = assemble();
    assert_eq!(first.nodes, second.nodes);
    assert_eq!(first.edges, second.edges);
    assert_eq!(first.stats, second.stats);
}

fn source_file(
    path: &str,
    language: Language,
    package: &str,
    imports: &[&str],
    name: &str,
) -> ParsedFile {
    ParsedFile {
        path: PathBuf::from(path),
        language,
        package: package.to_string(),
        imports: imports.iter().map(|import| ImportDecl::new(*import)).collect(),
        declarations: vec![declaration(package, name, &[])],
    }
}

fn import_targets<'a>(graph: &'a KnowledgeGraph, from: &str) -> Vec<&'a str> {
    let mut targets: Vec<&str> = graph
        .edges_of_kind(EdgeKind::Imports)
        .filter(|edge| edge.from == from)
        .map(|edge| edge.to.as_str())
        .collect();
    targets.sort_unstable();
    targets
}

#[test]
fn each_language_skips_its_own_standard_library() {
    let detection = Detection {
        build_system: BuildSystem::Gradle,
        modules: vec![BuildModule::new("app", "/work/app", BuildSystem::Gradle)],
    };
    let files = vec![
        source_file(
            "src/main/kotlin/com/acme/Routes.kt",
            Language::Kotlin,
            "com.acme",
            &["kotlin.collections.List", "java.time.Instant", "javax.inject.Inject"],
            "Routes",
        ),
        source_file(
            "src/main/scala/com/acme/Ledger.scala",
            Language::Scala,
            "com.acme",
            &["scala.collection.mutable", "java.util.UUID", "javax.sql.DataSource"],
            "Ledger",
        ),
        source_file(
            "src/main/groovy/com/acme/Greeter.groovy",
            Language::Groovy,
            "com.acme",
            &["groovy.transform.CompileStatic", "java.io.File", "javax.annotation.PostConstruct"],
            "Greeter",
        ),
    ];
    let graph = GraphAssembler::new("app", "/work/app").assemble(
        &detection,
        &files,
        3,
        Diagnostics::new(),
    );

    assert_eq!(import_targets(&graph, "com.acme.Routes"), vec!["javax.inject.Inject"]);
    assert_eq!(import_targets(&graph, "com.acme.Ledger"), vec!["javax.sql.DataSource"]);
    assert_eq!(
        import_targets(&graph, "com.acme.Greeter"),
        vec!["javax.annotation.PostConstruct"]
    );
}

#[test]
fn deepest_module_directory_owns_the_file() {
    let detection = Detection {
        build_system: BuildSystem::Maven,
        modules: vec![
            BuildModule::new("platform", "/work/platform", BuildSystem::Maven),
            BuildModule::new("orders-api", "/work/platform/orders/api", BuildSystem::Maven),
            BuildModule::new("users-api", "/work/platform/users/api", BuildSystem::Maven),
        ],
    };
    let files = vec![source_file(
        "users/api/src/main/java/com/acme/users/UserResource.java",
        Language::Java,
        "com.acme.users",
        &[],
        "UserResource",
    )];
    let graph = GraphAssembler::new("platform", "/work/platform").assemble(
        &detection,
        &files,
        1,
        Diagnostics::new(),
    );

    let resource = graph
        .node("com.acme.users.UserResource")
        .and_then(GraphNode::as_type)
        .unwrap();
    assert_eq!(resource.module.as_deref(), Some("users-api"));
    let id = "com.acme.users.UserResource";
    assert!(has_edge(&graph, EdgeKind::Contains, "module:users-api", id));
    assert!(!has_edge(&graph, EdgeKind::Contains, "module:orders-api", id));
    assert!(!has_edge(&graph, EdgeKind::Contains, "module:platform", id));
}

#[test]
fn directory_name_segment_is_the_fallback_owner() {
    // Module paths recorded under another root: no directory contains the file.
    let detection = Detection {
        build_system: BuildSystem::Gradle,
        modules: vec![
            BuildModule::new("core", "/checkout/core", BuildSystem::Gradle),
            BuildModule::new("web", "/checkout/web", BuildSystem::Gradle),
        ],
    };
    let files = vec![source_file(
        "web/src/main/kotlin/com/acme/web/Routes.kt",
        Language::Kotlin,
        "com.acme.web",
        &[],
        "Routes",
    )];
    let graph = GraphAssembler::new("app", "/work/app").assemble(
        &detection,
        &files,
        1,
        Diagnostics::new(),
    );

    let routes = graph.node("com.acme.web.Routes").and_then(GraphNode::as_type).unwrap();
    assert_eq!(routes.module.as_deref(), Some("web"));
}
