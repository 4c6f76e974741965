use jvmgraph::build::maven::parse_pom_str;
use jvmgraph::build::{BuildSystem, BuildSystemDetector};
use jvmgraph::error::{DetectionError, Diagnostics, Stage};
use std::fs;
use std::path::Path;

fn write<P: AsRef<Path>>(path: P, content: &str) {
    let path = path.as_ref();
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

const PARENT_POM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0">
  <modelVersion>4.0.0</modelVersion>
  <groupId>com.acme</groupId>
  <artifactId>shop</artifactId>
  <version>1.0.0</version>
  <packaging>pom</packaging>
  <modules>
    <module>a</module>
    <module>b</module>
  </modules>
  <properties>
    <java.version>17</java.version>
  </properties>
</project>
"#;

const POM_A: &str = r#"<project xmlns="http://maven.apache.org/POM/4.0.0">
  <parent>
    <groupId>com.acme</groupId>
    <artifactId>shop</artifactId>
    <version>1.0.0</version>
  </parent>
  <artifactId>a</artifactId>
</project>
"#;

const POM_B: &str = r#"<project xmlns="http://maven.apache.org/POM/4.0.0">
  <parent>
    <groupId>com.acme</groupId>
    <artifactId>shop</artifactId>
    <version>1.0.0</version>
  </parent>
  <artifactId>b</artifactId>
  <dependencies>
    <dependency>
      <groupId>com.acme</groupId>
      <artifactId>a</artifactId>
      <version>1.0.0</version>
    </dependency>
    <dependency>
      <groupId>org.junit.jupiter</groupId>
      <artifactId>junit-jupiter</artifactId>
      <scope>test</scope>
      <optional>true</optional>
    </dependency>
  </dependencies>
</project>
"#;

#[test]
fn detects_every_pom_in_a_multi_module_build() {
    let dir = tempfile::TempDir::new().unwrap();
    let root = dir.path();
    write(root.join("pom.xml"), PARENT_POM);
    write(root.join("a/pom.xml"), POM_A);
    write(root.join("b/pom.xml"), POM_B);

    let mut diagnostics = Diagnostics::new();
    let detection = BuildSystemDetector::new().detect(root, &mut diagnostics);

    assert_eq!(detection.build_system, BuildSystem::Maven);
    assert!(diagnostics.is_empty());
    let names: Vec<_> = detection.modules.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b", "shop"]);
    assert!(detection.modules.iter().all(|m| !m.name.is_empty()));

    let shop = detection.modules.iter().find(|m| m.name == "shop").unwrap();
    assert_eq!(shop.submodules, vec!["a", "b"]);
    assert_eq!(shop.properties.get("java.version").map(String::as_str), Some("17"));
    assert_eq!(shop.version.as_deref(), Some("1.0.0"));

    let b = detection.modules.iter().find(|m| m.name == "b").unwrap();
    assert_eq!(b.group, "com.acme", "group falls back to the parent's");
    assert_eq!(b.parent.as_ref().unwrap().name, "shop");
    assert_eq!(b.dependencies.len(), 2);
    assert_eq!(b.dependencies[0].name, "a");
    assert_eq!(b.dependencies[0].scope, "compile");
    assert!(!b.dependencies[0].optional);
    assert_eq!(b.dependencies[1].scope, "test");
    assert!(b.dependencies[1].optional);
    assert_eq!(b.dependencies[1].version, None);
}

#[test]
fn poms_under_output_directories_are_ignored() {
    let dir = tempfile::TempDir::new().unwrap();
    let root = dir.path();
    write(root.join("pom.xml"), POM_A);
    write(root.join("target/classes/META-INF/pom.xml"), POM_B);
    write(root.join("build/pom.xml"), POM_B);

    let mut diagnostics = Diagnostics::new();
    let detection = BuildSystemDetector::new().detect(root, &mut diagnostics);
    assert_eq!(detection.modules.len(), 1);
    assert_eq!(detection.modules[0].name, "a");
}

#[test]
fn malformed_pom_degrades_to_a_stub_module() {
    let dir = tempfile::TempDir::new().unwrap();
    let root = dir.path();
    write(root.join("good/pom.xml"), POM_A);
    write(root.join("broken/pom.xml"), "<project><artifactId>oops</project");

    let mut diagnostics = Diagnostics::new();
    let detection = BuildSystemDetector::new().detect(root, &mut diagnostics);

    assert_eq!(detection.build_system, BuildSystem::Maven);
    assert_eq!(detection.modules.len(), 2);
    let stub = detection.modules.iter().find(|m| m.name == "broken").unwrap();
    assert!(stub.dependencies.is_empty());
    assert_eq!(stub.build_system, BuildSystem::Maven);

    assert_eq!(diagnostics.len(), 1);
    let diagnostic = diagnostics.iter().next().unwrap();
    assert_eq!(diagnostic.stage, Stage::Detection);
    assert!(diagnostic.path.as_ref().unwrap().ends_with("broken/pom.xml"));
}

#[test]
fn root_element_must_be_project() {
    let err = parse_pom_str("<settings><localRepository/></settings>", Path::new("/x/pom.xml"))
        .unwrap_err();
    assert!(matches!(err, DetectionError::UnexpectedRoot { expected: "project", .. }));
}

#[test]
fn missing_artifact_id_falls_back_to_directory_name() {
    let module = parse_pom_str(
        "<project><groupId>g</groupId></project>",
        Path::new("/work/inventory/pom.xml"),
    )
    .unwrap();
    assert_eq!(module.name, "inventory");
    assert_eq!(module.group, "g");
}

#[test]
fn managed_dependencies_are_not_declared_dependencies() {
    let pom = r#"<project>
      <artifactId>bom-user</artifactId>
      <dependencyManagement>
        <dependencies>
          <dependency><groupId>x</groupId><artifactId>y</artifactId><version>1</version></dependency>
        </dependencies>
      </dependencyManagement>
    </project>"#;
    let module = parse_pom_str(pom, Path::new("/p/pom.xml")).unwrap();
    assert!(module.dependencies.is_empty());
}
