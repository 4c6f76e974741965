use crate::parsers::{ImportDecl, ParsedFile};

/// Best-effort qualification of type references within one source file.
///
/// This is a lookup, not type resolution: wildcard imports and the default
/// package are invisible to it, so such references fall back to the file's
/// own package.
pub struct NameResolver<'a> {
    package: &'a str,
    imports: &'a [ImportDecl],
}

impl<'a> NameResolver<'a> {
    pub fn new(package: &'a str, imports: &'a [ImportDecl]) -> Self {
        Self { package, imports }
    }

    pub fn for_file(file: &'a ParsedFile) -> Self {
        Self::new(&file.package, &file.imports)
    }

    pub fn resolve(&self, name: &str) -> String {
        resolve_type_name(name, self.imports, self.package)
    }
}

pub fn resolve_type_name(name: &str, imports: &[ImportDecl], package: &str) -> String {
    if name.contains('.') {
        return name.to_string();
    }

    let suffix = format!(".{name}");
    if let Some(import) = imports
        .iter()
        .find(|import| !import.wildcard && import.path.ends_with(&suffix))
    {
        return import.path.clone();
    }

    if package.is_empty() {
        name.to_string()
    } else {
        format!("{package}.{name}")
    }
}
