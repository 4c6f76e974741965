use jvmgraph::build::config::{flatten_yaml, parse_properties};
use jvmgraph::build::{BuildModule, BuildSystem, ConfigMerger};
use jvmgraph::error::{Diagnostics, Stage};
use std::fs;
use std::path::Path;

fn write<P: AsRef<Path>>(path: P, content: &str) {
    let path = path.as_ref();
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

#[test]
fn properties_lines_skip_comments_and_blanks() {
    let entries = parse_properties(
        "# comment\n! also a comment\n\nserver.port = 8080\nurl=jdbc:h2:mem:db;MODE=x\nno-separator\n",
    );
    assert_eq!(
        entries,
        vec![
            ("server.port".to_string(), "8080".to_string()),
            ("url".to_string(), "jdbc:h2:mem:db;MODE=x".to_string()),
        ]
    );
}

#[test]
fn yaml_flattens_one_level_of_scalars() {
    let entries = flatten_yaml(
        "name: orders\nport: 8081\nenabled: true\nspring:\n  datasource:\n    url: x\nempty:\n",
    )
    .unwrap();
    assert!(entries.contains(&("name".to_string(), "orders".to_string())));
    assert!(entries.contains(&("port".to_string(), "8081".to_string())));
    assert!(entries.contains(&("enabled".to_string(), "true".to_string())));
    assert!(!entries.iter().any(|(key, _)| key == "spring" || key == "empty"));
}

#[test]
fn yaml_overrides_properties_and_test_resources_are_skipped() {
    let dir = tempfile::TempDir::new().unwrap();
    let module_dir = dir.path().join("orders");
    write(
        module_dir.join("src/main/resources/application.properties"),
        "app.name=from-properties\napp.only-props=1\n",
    );
    write(
        module_dir.join("src/main/resources/application.yml"),
        "app.name: from-yaml\n",
    );
    write(
        module_dir.join("src/test/resources/application.properties"),
        "app.test=leaked\n",
    );
    write(module_dir.join("src/main/resources/logback.properties"), "x=1\n");

    let mut modules = vec![BuildModule::new("orders", &module_dir, BuildSystem::Maven)];
    let mut diagnostics = Diagnostics::new();
    ConfigMerger::new().merge(&mut modules, &mut diagnostics);

    let properties = &modules[0].properties;
    assert_eq!(properties.get("app.name").map(String::as_str), Some("from-yaml"));
    assert_eq!(properties.get("app.only-props").map(String::as_str), Some("1"));
    assert!(!properties.contains_key("app.test"));
    assert!(!properties.contains_key("x"));
    assert!(diagnostics.is_empty());
}

#[test]
fn nested_module_config_stays_with_the_nested_module() {
    let dir = tempfile::TempDir::new().unwrap();
    let root = dir.path().to_path_buf();
    write(root.join("application.properties"), "owner=root\n");
    write(root.join("child/application.properties"), "owner=child\nchild.only=yes\n");

    let mut modules = vec![
        BuildModule::new("parent", &root, BuildSystem::Gradle),
        BuildModule::new("child", root.join("child"), BuildSystem::Gradle),
    ];
    let mut diagnostics = Diagnostics::new();
    ConfigMerger::new().merge(&mut modules, &mut diagnostics);

    assert_eq!(modules[0].properties.get("owner").map(String::as_str), Some("root"));
    assert!(!modules[0].properties.contains_key("child.only"));
    assert_eq!(modules[1].properties.get("owner").map(String::as_str), Some("child"));
}

#[test]
fn unparsable_yaml_is_a_diagnostic_not_a_failure() {
    let dir = tempfile::TempDir::new().unwrap();
    let module_dir = dir.path().join("svc");
    write(module_dir.join("application.yaml"), "key: [unclosed\n");
    write(module_dir.join("application.properties"), "kept=yes\n");

    let mut modules = vec![BuildModule::new("svc", &module_dir, BuildSystem::Maven)];
    let mut diagnostics = Diagnostics::new();
    ConfigMerger::new().merge(&mut modules, &mut diagnostics);

    assert_eq!(modules[0].properties.get("kept").map(String::as_str), Some("yes"));
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics.iter().next().unwrap().stage, Stage::Config);
}

#[test]
fn yaml_profile_documents_are_read_in_order() {
    let entries = flatten_yaml("a: 1\n---\nb: 2\n---\na: 3\n").unwrap();
    assert_eq!(
        entries,
        vec![
            ("a".to_string(), "1".to_string()),
            ("b".to_string(), "2".to_string()),
            ("a".to_string(), "3".to_string()),
        ]
    );
}

#[test]
fn later_yaml_documents_win_when_merged() {
    let dir = tempfile::TempDir::new().unwrap();
    let module_dir = dir.path().join("gateway");
    write(
        module_dir.join("src/main/resources/application.yml"),
        "server.port: 8080\nspring.application.name: gateway\n---\nserver.port: 9090\n",
    );

    let mut modules = vec![BuildModule::new("gateway", &module_dir, BuildSystem::Gradle)];
    let mut diagnostics = Diagnostics::new();
    ConfigMerger::new().merge(&mut modules, &mut diagnostics);

    let properties = &modules[0].properties;
    assert_eq!(properties.get("server.port").map(String::as_str), Some("9090"));
    assert_eq!(
        properties.get("spring.application.name").map(String::as_str),
        Some("gateway")
    );
    assert!(diagnostics.is_empty());
}
