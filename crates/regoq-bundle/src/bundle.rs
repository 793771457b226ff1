use camino::{Utf8Path, Utf8PathBuf};
use std::collections::BTreeMap;

/// Named policy source texts compiled together.
///
/// Keys are unique; inserting an existing key replaces its text. Once handed to a source the
/// bundle is only read.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PolicyBundle {
    entries: BTreeMap<String, String>,
    files: Vec<Utf8PathBuf>,
}

impl PolicyBundle {
    /// Bundle made only of in-memory policies.
    pub fn from_policies<I, K, V>(policies: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut bundle = Self::default();
        for (name, text) in policies {
            bundle.insert(name, text);
        }
        bundle
    }

    pub(crate) fn insert(&mut self, name: impl Into<String>, text: impl Into<String>) {
        self.entries.insert(name.into(), text.into());
    }

    pub(crate) fn record_file(&mut self, path: &Utf8Path) {
        self.files.push(path.to_path_buf());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Files read from disk, in load order.
    pub fn loaded_files(&self) -> &[Utf8PathBuf] {
        &self.files
    }
}
