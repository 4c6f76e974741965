use criterion::{black_box, criterion_group, criterion_main, Criterion};
use jvmgraph::core::{AnalyzerOptions, CodebaseAnalyzer};
use jvmgraph::parsers::{Language, ParserFactory};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write(path: PathBuf, content: String) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

/// A Maven reactor with `modules` children, each holding `classes` services.
fn generate_project(root: &Path, modules: usize, classes: usize) {
    let module_list: String = (0..modules)
        .map(|m| format!("<module>module{m}</module>"))
        .collect();
    write(
        root.join("pom.xml"),
        format!(
            r#"<project>
  <groupId>com.bench</groupId>
  <artifactId>bench</artifactId>
  <version>1.0.0</version>
  <modules>{module_list}</modules>
</project>"#
        ),
    );

    for m in 0..modules {
        let dependency = if m > 0 {
            format!(
                "<dependencies><dependency><groupId>com.bench</groupId><artifactId>module{}</artifactId></dependency></dependencies>",
                m - 1
            )
        } else {
            String::new()
        };
        let module_dir = root.join(format!("module{m}"));
        write(
            module_dir.join("pom.xml"),
            format!(
                r#"<project>
  <parent><groupId>com.bench</groupId><artifactId>bench</artifactId><version>1.0.0</version></parent>
  <artifactId>module{m}</artifactId>
  {dependency}
</project>"#
            ),
        );

        for i in 0..classes {
            let content = format!(
                r#"package com.bench.module{m}.service;

import java.util.List;
import java.util.Map;
import org.springframework.stereotype.Service;
import com.bench.module{m}.model.Item{i};

@Service
public class Item{i}Service extends AbstractService implements Handler<Item{i}>, Auditable {{
    private final Map<String, Item{i}> cache;

    public Item{i}Service(Map<String, Item{i}> cache) {{
        this.cache = cache;
    }}

    public List<Item{i}> all() {{
        return List.copyOf(cache.values());
    }}

    static final class Entry {{}}
}}
"#
            );
            write(
                module_dir.join(format!(
                    "src/main/java/com/bench/module{m}/service/Item{i}Service.java"
                )),
                content,
            );
        }
    }
}

fn benchmark_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("codebase_analysis");
    group.sample_size(20);

    let small = TempDir::new().unwrap();
    generate_project(small.path(), 2, 10);

    group.bench_function("small_project", |b| {
        b.iter(|| {
            let analyzer = CodebaseAnalyzer::new();
            black_box(analyzer.analyze(black_box(small.path())).unwrap())
        });
    });

    let large = TempDir::new().unwrap();
    generate_project(large.path(), 8, 50);

    group.bench_function("large_project_parallel", |b| {
        b.iter(|| {
            let analyzer = CodebaseAnalyzer::with_options(
                AnalyzerOptions::default().with_languages(vec![Language::Java]),
            );
            black_box(analyzer.analyze(black_box(large.path())).unwrap())
        });
    });

    group.bench_function("large_project_sequential", |b| {
        b.iter(|| {
            let analyzer = CodebaseAnalyzer::with_options(
                AnalyzerOptions::default()
                    .with_languages(vec![Language::Java])
                    .sequential(),
            );
            black_box(analyzer.analyze(black_box(large.path())).unwrap())
        });
    });

    group.finish();
}

fn benchmark_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("java_parsing");

    let source = r#"package com.bench;

import java.util.List;
import com.bench.model.Order;

@Service
public class OrderService extends BaseService implements OrderApi {
    public List<Order> all() { return List.of(); }
    static class Inner {}
}
"#;
    let factory = ParserFactory::new();
    let mut parser = factory.get_parser(Language::Java).unwrap();

    group.bench_function("single_file", |b| {
        b.iter(|| {
            black_box(
                parser
                    .parse_source(Path::new("OrderService.java"), black_box(source))
                    .unwrap(),
            )
        });
    });

    group.finish();
}

criterion_group!(benches, benchmark_analysis, benchmark_parsing);
criterion_main!(benches);
