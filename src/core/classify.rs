//! Architectural classification tables.
//!
//! Layer, feature and external-library labels are fixed lookup tables kept
//! as literal data. First match wins in table order.

pub const OTHER_LAYER: &str = "other";
pub const DEFAULT_FEATURE: &str = "common";

pub const LAYER_PATTERNS: &[(&str, &[&str])] = &[
    (
        "controller",
        &["controller", "web", "api", "rest", "endpoint", "resource", "action", "handler"],
    ),
    ("service", &["service", "business", "application", "manager", "facade", "processor"]),
    ("repository", &["repository", "dao", "persistence", "mapper", "store", "accessor"]),
    ("model", &["model", "entity", "dto", "vo", "domain", "pojo", "bean", "data", "document"]),
    ("config", &["config", "configuration", "setting", "properties", "setup"]),
    ("util", &["util", "utils", "helper", "common", "support", "tools"]),
    ("exception", &["exception", "error", "fault"]),
    ("security", &["security", "auth", "authentication", "authorization", "jwt", "oauth"]),
    ("filter", &["filter", "interceptor", "aspect", "aop", "advice"]),
    ("converter", &["converter", "transformer", "adapter", "serializer"]),
    ("validator", &["validator", "validation", "constraint"]),
    ("event", &["event", "listener", "subscriber", "publisher"]),
    ("worker", &["worker", "job", "task", "scheduler", "cron", "batch"]),
];

/// Checked in order; `Service` precedes `ServiceImpl`, which only matters
/// for names ending in both.
pub const TECH_SUFFIXES: &[&str] = &[
    "Controller", "Service", "ServiceImpl", "Repository", "Dao", "Mapper", "Entity", "DTO", "VO",
    "Config", "Util", "Exception",
];

const GENERIC_ROOTS: &[&str] = &["com", "org", "io", "net"];

const TECH_KEYWORDS: &[&str] = &[
    "controller", "service", "repository", "dao", "model", "entity", "dto", "config", "util",
    "exception", "common",
];

/// Namespace prefix to canonical library key.
pub const LIBRARY_PREFIXES: &[(&str, &str)] = &[
    ("org.springframework.boot", "spring-boot"),
    ("org.springframework.cloud", "spring-cloud"),
    ("org.springframework.data", "spring-data"),
    ("org.springframework.security", "spring-security"),
    ("org.springframework.web", "spring-web"),
    ("org.springframework.batch", "spring-batch"),
    ("org.springframework.integration", "spring-integration"),
    ("org.springframework.session", "spring-session"),
    ("org.springframework.hateoas", "spring-hateoas"),
    ("org.springframework.modulith", "spring-modulith"),
    ("org.springframework.restdocs", "spring-restdocs"),
    ("org.springframework.ai", "spring-ai"),
    ("org.springframework.amqp", "spring-amqp"),
    ("org.springframework.kafka", "spring-kafka"),
    ("org.springframework.ldap", "spring-ldap"),
    ("org.springframework.pulsar", "spring-pulsar"),
    ("org.springframework.shell", "spring-shell"),
    ("org.springframework.statemachine", "spring-statemachine"),
    ("org.springframework.webflow", "spring-webflow"),
    ("org.springframework.ws", "spring-ws"),
    ("org.springframework.graphql", "spring-graphql"),
    ("org.springframework.vault", "spring-vault"),
    ("org.springframework", "spring-framework"),
    ("io.quarkus", "quarkus"),
    ("io.micronaut", "micronaut"),
    ("io.vertx", "vertx"),
    ("jakarta.persistence", "jakarta-persistence"),
    ("jakarta.validation", "jakarta-validation"),
    ("jakarta", "jakarta-ee"),
    ("javax.persistence", "jpa"),
    ("javax.validation", "bean-validation"),
    ("javax", "javax"),
    ("org.hibernate", "hibernate"),
    ("org.jooq", "jooq"),
    ("com.fasterxml.jackson.dataformat", "jackson-dataformat"),
    ("com.fasterxml.jackson", "jackson"),
    ("com.google.gson", "gson"),
    ("io.projectreactor", "reactor"),
    ("io.reactivex", "rxjava"),
    ("org.reactivestreams", "reactive-streams"),
    ("lombok", "lombok"),
    ("org.projectlombok", "lombok"),
    ("org.junit", "junit"),
    ("org.mockito", "mockito"),
    ("org.assertj", "assertj"),
    ("io.rest-assured", "rest-assured"),
    ("com.google.guava", "guava"),
    ("org.apache.commons", "apache-commons"),
    ("org.slf4j", "slf4j"),
    ("ch.qos.logback", "logback"),
    ("org.apache.logging.log4j", "log4j"),
    ("org.mapstruct", "mapstruct"),
    ("org.modelmapper", "modelmapper"),
    ("org.apache.kafka", "kafka"),
    ("com.rabbitmq", "rabbitmq"),
    ("io.nats", "nats"),
    ("org.redisson", "redisson"),
    ("redis.clients.jedis", "jedis"),
    ("com.netflix", "netflix-oss"),
    ("org.mongodb", "mongodb"),
    ("org.postgresql", "postgresql"),
    ("com.mysql", "mysql"),
    ("com.h2database", "h2"),
    ("io.jsonwebtoken", "jjwt"),
    ("org.keycloak", "keycloak"),
    ("com.auth0", "auth0"),
    ("org.bouncycastle", "bouncycastle"),
    ("io.swagger", "swagger"),
    ("org.springdoc", "springdoc"),
    ("io.micrometer", "micrometer"),
    ("org.apache.httpcomponents", "apache-httpclient"),
    ("com.squareup.okhttp3", "okhttp"),
    ("io.netty", "netty"),
    ("reactivefeign", "reactive-feign"),
    ("io.github.reactivefeign", "reactive-feign"),
    ("org.thymeleaf", "thymeleaf"),
    ("org.freemarker", "freemarker"),
    ("com.hubspot.jinjava", "jinjava"),
    ("org.joda.time", "joda-time"),
    ("org.yaml.snakeyaml", "snakeyaml"),
    ("org.dom4j", "dom4j"),
    ("com.amazonaws", "aws-sdk"),
    ("com.google.cloud", "google-cloud"),
    ("com.azure", "azure-sdk"),
    ("org.quartz", "quartz"),
    ("com.graphql-java", "graphql-java"),
    ("net.bytebuddy", "bytebuddy"),
    ("org.javassist", "javassist"),
    ("org.ow2.asm", "asm"),
    ("io.opentelemetry", "opentelemetry"),
    ("io.zipkin", "zipkin"),
    ("io.jaegertracing", "jaeger"),
    ("org.apache.avro", "avro"),
    ("com.google.protobuf", "protobuf"),
    ("org.apache.thrift", "thrift"),
];

/// Layer label for a type, matched case-insensitively against `package.name`.
pub fn detect_layer(package: &str, name: &str) -> &'static str {
    let full_name = format!("{package}.{name}").to_lowercase();
    LAYER_PATTERNS
        .iter()
        .find(|(_, patterns)| patterns.iter().any(|pattern| full_name.contains(pattern)))
        .map(|(layer, _)| *layer)
        .unwrap_or(OTHER_LAYER)
}

/// Business feature: the simple name minus a technical suffix, else the
/// first meaningful package segment.
pub fn extract_feature(package: &str, name: &str) -> String {
    if let Some(stem) = TECH_SUFFIXES
        .iter()
        .find_map(|suffix| name.strip_suffix(suffix))
        .filter(|stem| !stem.is_empty())
    {
        return stem.to_lowercase();
    }

    let mut segments: Vec<&str> = package
        .split('.')
        .filter(|segment| !segment.is_empty() && !GENERIC_ROOTS.contains(segment))
        .collect();
    if segments.len() > 1 {
        segments.remove(0);
    }
    segments
        .into_iter()
        .find(|segment| !TECH_KEYWORDS.contains(&segment.to_lowercase().as_str()))
        .map(str::to_string)
        .unwrap_or_else(|| DEFAULT_FEATURE.to_string())
}

/// Canonical library key for an external qualified name.
///
/// The longest table prefix ending on a segment boundary wins; otherwise
/// the first two segments stand in for the library.
pub fn library_group(qualified_name: &str) -> String {
    let matched = LIBRARY_PREFIXES
        .iter()
        .filter(|(prefix, _)| {
            qualified_name
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
        })
        .max_by_key(|(prefix, _)| prefix.len());
    if let Some((_, key)) = matched {
        return (*key).to_string();
    }

    let segments: Vec<&str> = qualified_name
        .split('.')
        .filter(|segment| !segment.is_empty())
        .collect();
    match segments.as_slice() {
        [] => "unknown".to_string(),
        [only] => (*only).to_string(),
        [first, second, ..] => format!("{first}.{second}"),
    }
}
