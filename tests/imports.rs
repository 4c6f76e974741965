use jvmgraph::parsers::extractor::{annotation_name, parse_import, type_name};
use jvmgraph::parsers::ImportDecl;

#[test]
fn plain_static_and_wildcard_imports() {
    assert_eq!(parse_import("import java.util.List;"), vec![ImportDecl::new("java.util.List")]);
    assert_eq!(
        parse_import("import static org.junit.Assert.*;"),
        vec![ImportDecl::new("org.junit.Assert").wildcard().static_member()]
    );
    assert_eq!(
        parse_import("import static com.z.Util.helper;"),
        vec![ImportDecl::new("com.z.Util.helper").static_member()]
    );
}

#[test]
fn aliases_keep_the_imported_path() {
    assert_eq!(
        parse_import("import com.acme.Foo as Bar"),
        vec![ImportDecl::new("com.acme.Foo")]
    );
}

#[test]
fn scala_selectors_expand() {
    assert_eq!(
        parse_import("import scala.collection._"),
        vec![ImportDecl::new("scala.collection").wildcard()]
    );
    assert_eq!(
        parse_import("import com.acme.{Order, Invoice => Bill, _}"),
        vec![
            ImportDecl::new("com.acme.Order"),
            ImportDecl::new("com.acme.Invoice"),
            ImportDecl::new("com.acme").wildcard(),
        ]
    );
    assert_eq!(
        parse_import("import com.acme.{given, Codec}"),
        vec![ImportDecl::new("com.acme.Codec")]
    );
    assert_eq!(
        parse_import("import a.B, c.D"),
        vec![ImportDecl::new("a.B"), ImportDecl::new("c.D")]
    );
}

#[test]
fn type_names_drop_arguments_and_annotations() {
    assert_eq!(type_name("Base<T>(arg)").as_deref(), Some("Base"));
    assert_eq!(type_name("a.b.Repo[Int]").as_deref(), Some("a.b.Repo"));
    assert_eq!(type_name("@NonNull Foo").as_deref(), Some("Foo"));
    assert_eq!(type_name("String?").as_deref(), Some("String"));
    assert_eq!(type_name("  Iface  ").as_deref(), Some("Iface"));
    assert_eq!(type_name("123"), None);
    assert_eq!(type_name(""), None);
}

#[test]
fn annotation_names() {
    assert_eq!(annotation_name("@RestController(\"x\")").as_deref(), Some("RestController"));
    assert_eq!(annotation_name("@Service").as_deref(), Some("Service"));
    assert_eq!(annotation_name("Service"), None);
    assert_eq!(annotation_name("@"), None);
}
