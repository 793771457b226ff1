//! `# METADATA` comment blocks.
//!
//! A block is a `# METADATA` line followed by consecutive comment lines holding YAML. It
//! attaches to the first `package` clause or rule head after it.

use regoq_core::{Error, Result};
use regoq_types::{AnnotationScope, AnnotationSet, Annotations, AnnotationsRef, Location};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

const METADATA_MARKER: &str = "# METADATA";

/// What the scanner learned from one bundle entry.
#[derive(Clone, Debug, Default)]
pub struct ModuleMetadata {
    pub package: Option<String>,
    pub annotations: Vec<AnnotationsRef>,
}

#[derive(Debug, Default, Deserialize)]
struct RawAnnotations {
    #[serde(default)]
    scope: Option<AnnotationScope>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    authors: Vec<String>,
    #[serde(default)]
    organizations: Vec<String>,
    #[serde(default)]
    entrypoint: bool,
    #[serde(default)]
    custom: BTreeMap<String, Value>,
}

struct Block {
    row: u32,
    yaml: String,
}

enum Target<'a> {
    Package(&'a str),
    Rule { package: &'a str, rule: &'a str },
}

/// Scan one bundle entry for its package name and metadata blocks.
pub fn scan_module(name: &str, text: &str) -> Result<ModuleMetadata> {
    let lines: Vec<&str> = text.lines().collect();
    let mut out = ModuleMetadata::default();
    let mut pending: Option<Block> = None;

    let mut idx = 0;
    while idx < lines.len() {
        let trimmed = lines[idx].trim();

        if trimmed == METADATA_MARKER {
            let row = row_number(idx);
            let mut yaml = Vec::new();
            idx += 1;
            while let Some(rest) = lines
                .get(idx)
                .and_then(|line| line.trim_start().strip_prefix('#'))
            {
                yaml.push(rest.strip_prefix(' ').unwrap_or(rest));
                idx += 1;
            }
            if pending.is_some() {
                return Err(dangling(name, row));
            }
            pending = Some(Block {
                row,
                yaml: yaml.join("\n"),
            });
            continue;
        }
        idx += 1;

        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with("import ") {
            continue;
        }

        if let Some(package) = package_clause(trimmed) {
            out.package = Some(package.to_string());
            if let Some(block) = pending.take() {
                out.annotations
                    .push(resolve(name, block, Target::Package(package))?);
            }
            continue;
        }

        let Some(block) = pending.take() else {
            continue;
        };
        let Some(package) = out.package.as_deref() else {
            return Err(compile_error(
                name,
                block.row,
                "rule metadata appears before the package clause",
            ));
        };
        let Some(rule) = rule_name(trimmed) else {
            return Err(dangling(name, block.row));
        };
        out.annotations
            .push(resolve(name, block, Target::Rule { package, rule })?);
    }

    if let Some(block) = pending {
        return Err(dangling(name, block.row));
    }
    Ok(out)
}

/// Merge per-entry annotations and reject duplicate package or document level blocks.
pub fn build_set(entries: Vec<AnnotationsRef>) -> Result<AnnotationSet> {
    let mut seen: BTreeMap<(AnnotationScope, &str), &Location> = BTreeMap::new();
    for entry in &entries {
        let scope = entry.annotations.scope;
        if scope == AnnotationScope::Rule {
            continue;
        }
        if let Some(previous) = seen.insert((scope, entry.path.as_str()), &entry.location) {
            return Err(Error::Compile {
                name: entry.location.file.clone(),
                message: format!(
                    "{}: {scope} annotations for {} conflict with {previous}",
                    entry.location, entry.path
                ),
            });
        }
    }
    Ok(AnnotationSet::new(entries))
}

fn resolve(name: &str, block: Block, target: Target<'_>) -> Result<AnnotationsRef> {
    let raw: RawAnnotations = if block.yaml.trim().is_empty() {
        RawAnnotations::default()
    } else {
        serde_yaml::from_str(&block.yaml)
            .map_err(|err| {
                compile_error(name, block.row, &format!("malformed metadata: {err}"))
            })?
    };

    let (path, scope) = match target {
        Target::Package(package) => {
            let scope = raw.scope.unwrap_or(AnnotationScope::Package);
            if !scope.targets_package() {
                return Err(compile_error(
                    name,
                    block.row,
                    &format!("{scope} scope cannot be applied to a package"),
                ));
            }
            (format!("data.{package}"), scope)
        }
        Target::Rule { package, rule } => {
            let scope = raw.scope.unwrap_or(AnnotationScope::Rule);
            if scope.targets_package() {
                return Err(compile_error(
                    name,
                    block.row,
                    &format!("{scope} scope cannot be applied to a rule"),
                ));
            }
            (format!("data.{package}.{rule}"), scope)
        }
    };

    Ok(AnnotationsRef {
        path,
        location: Location::new(name, block.row),
        annotations: Annotations {
            scope,
            title: raw.title,
            description: raw.description,
            authors: raw.authors,
            organizations: raw.organizations,
            entrypoint: raw.entrypoint,
            custom: raw.custom,
        },
    })
}

fn package_clause(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("package")?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let package = rest.split('#').next().unwrap_or_default().trim();
    (!package.is_empty()).then_some(package)
}

/// Leading identifier of a rule head: `allow if {`, `default allow := false`, `deny contains msg`.
fn rule_name(line: &str) -> Option<&str> {
    let head = line.strip_prefix("default ").map(str::trim_start).unwrap_or(line);
    let end = head
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(head.len());
    let name = &head[..end];
    (!name.is_empty() && !name.starts_with(|c: char| c.is_ascii_digit())).then_some(name)
}

fn row_number(idx: usize) -> u32 {
    u32::try_from(idx + 1).unwrap_or(u32::MAX)
}

fn dangling(name: &str, row: u32) -> Error {
    compile_error(name, row, "metadata block is not followed by a package or rule")
}

fn compile_error(name: &str, row: u32, message: &str) -> Error {
    Error::Compile {
        name: name.to_string(),
        message: format!("{name}:{row}: {message}"),
    }
}
