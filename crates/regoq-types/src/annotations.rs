//! Annotation metadata attached to policy packages and rules.
//!
//! Only local sources populate an [`AnnotationSet`]; remote and mock sources
//! expose an empty one.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// What an annotation block applies to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationScope {
    Package,
    Subpackages,
    #[default]
    Rule,
    Document,
}

impl AnnotationScope {
    pub fn as_str(self) -> &'static str {
        match self {
            AnnotationScope::Package => "package",
            AnnotationScope::Subpackages => "subpackages",
            AnnotationScope::Rule => "rule",
            AnnotationScope::Document => "document",
        }
    }

    /// Package-level scopes address the package path, the others a rule path.
    pub fn targets_package(self) -> bool {
        matches!(self, AnnotationScope::Package | AnnotationScope::Subpackages)
    }
}

impl fmt::Display for AnnotationScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position of an annotation block inside a bundle entry. `row` is 1-based.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    pub row: u32,
}

impl Location {
    pub fn new(file: impl Into<String>, row: u32) -> Self {
        Self {
            file: file.into(),
            row,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.row)
    }
}

/// Author supplied metadata of a single `# METADATA` block.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Annotations {
    pub scope: AnnotationScope,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub organizations: Vec<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub entrypoint: bool,

    /// Free-form key/values under `custom:`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom: BTreeMap<String, Value>,
}

/// Annotations bound to the policy path they describe.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnnotationsRef {
    /// Dotted path, e.g. `data.authz` or `data.authz.allow`.
    pub path: String,
    pub location: Location,
    pub annotations: Annotations,
}

/// All annotations found in a compiled bundle.
///
/// Built once at configure time and read-only afterwards.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationSet {
    entries: Vec<AnnotationsRef>,
}

impl AnnotationSet {
    pub const fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn new(entries: Vec<AnnotationsRef>) -> Self {
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Flat, stably ordered list of every annotation.
    ///
    /// Ordering: path, then file, then row.
    pub fn flatten(&self) -> Vec<AnnotationsRef> {
        let mut out = self.entries.clone();
        out.sort_by(|a, b| {
            a.path
                .cmp(&b.path)
                .then_with(|| a.location.cmp(&b.location))
        });
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str, file: &str, row: u32, scope: AnnotationScope) -> AnnotationsRef {
        AnnotationsRef {
            path: path.to_string(),
            location: Location::new(file, row),
            annotations: Annotations {
                scope,
                ..Annotations::default()
            },
        }
    }

    #[test]
    fn flatten_orders_by_path_then_location() {
        let set = AnnotationSet::new(vec![
            entry("data.b.allow", "b.rego", 3, AnnotationScope::Rule),
            entry("data.a", "a.rego", 1, AnnotationScope::Package),
            entry("data.a.allow", "z.rego", 2, AnnotationScope::Rule),
            entry("data.a.allow", "a.rego", 9, AnnotationScope::Rule),
        ]);

        let paths: Vec<String> = set
            .flatten()
            .into_iter()
            .map(|r| format!("{}@{}", r.path, r.location))
            .collect();
        assert_eq!(
            paths,
            vec![
                "data.a@a.rego:1",
                "data.a.allow@a.rego:9",
                "data.a.allow@z.rego:2",
                "data.b.allow@b.rego:3",
            ]
        );
    }

    #[test]
    fn empty_set_flattens_to_nothing() {
        let set = AnnotationSet::empty();
        assert!(set.is_empty());
        assert!(set.flatten().is_empty());
    }

    #[test]
    fn scope_serializes_lowercase() {
        let json = serde_json::to_string(&AnnotationScope::Subpackages).expect("serialize");
        assert_eq!(json, "\"subpackages\"");
        assert!(AnnotationScope::Subpackages.targets_package());
        assert!(!AnnotationScope::Document.targets_package());
    }

    #[test]
    fn set_counts_every_entry() {
        let set = AnnotationSet::new(vec![
            entry("data.a", "a.rego", 1, AnnotationScope::Package),
            entry("data.a.allow", "a.rego", 5, AnnotationScope::Rule),
        ]);
        assert_eq!(set.len(), 2);
        assert!(!set.is_empty());
        assert!(AnnotationSet::default().is_empty());
    }
}
