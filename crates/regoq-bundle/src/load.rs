use crate::bundle::PolicyBundle;
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use regoq_core::{Error, Result};
use regoq_types::POLICY_EXTENSION;
use std::io;
use std::path::PathBuf;
use walkdir::WalkDir;

/// Collects policy inputs and reads them into a [`PolicyBundle`].
///
/// Merge order:
/// - files discovered under each directory (in the order directories were added)
/// - explicit files
/// - in-memory policies
///
/// A later entry with the same key replaces an earlier one, so in-memory policies always win
/// over files of the same name.
#[derive(Clone, Debug, Default)]
pub struct BundleLoader {
    files: Vec<Utf8PathBuf>,
    dirs: Vec<Utf8PathBuf>,
    policies: Vec<(String, String)>,
}

impl BundleLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(mut self, path: impl AsRef<Utf8Path>) -> Self {
        self.files.push(normalize_path(path.as_ref()));
        self
    }

    /// Directory searched recursively for `.rego` files.
    pub fn dir(mut self, path: impl AsRef<Utf8Path>) -> Self {
        self.dirs.push(normalize_path(path.as_ref()));
        self
    }

    pub fn policy(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.policies.push((name.into(), text.into()));
        self
    }

    /// Read every input. Fails with [`Error::NoPolicyData`] when nothing was collected.
    pub fn load(&self) -> Result<PolicyBundle> {
        let mut targets: Vec<Utf8PathBuf> = Vec::new();
        for dir in &self.dirs {
            targets.extend(discover_policy_files(dir)?);
        }
        targets.extend(self.files.iter().cloned());

        let mut bundle = PolicyBundle::default();
        for path in &targets {
            let text = std::fs::read_to_string(path).map_err(|source| Error::ReadPolicyFile {
                path: path.clone().into_std_path_buf(),
                source,
            })?;
            bundle.insert(path.as_str(), text);
            bundle.record_file(path);
        }

        for (name, text) in &self.policies {
            bundle.insert(name.clone(), text.clone());
        }

        if bundle.is_empty() {
            return Err(Error::NoPolicyData);
        }
        Ok(bundle)
    }
}

/// Every `.rego` file below `dir`, at any depth, sorted by path.
///
/// Directories and files with other extensions are skipped. Linked directories are not
/// descended into; linked files are kept and read like any other file, so a dangling link
/// fails at load time.
pub fn discover_policy_files(dir: &Utf8Path) -> Result<Vec<Utf8PathBuf>> {
    let mut out = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|err| walk_error(dir, err))?;
        if entry.file_type().is_dir() || (entry.path_is_symlink() && entry.path().is_dir()) {
            continue;
        }
        let path = pathbuf_to_utf8(entry.into_path())?;
        if path.extension() != Some(POLICY_EXTENSION) {
            continue;
        }
        out.push(path);
    }
    Ok(out)
}

/// Lexical cleanup used for bundle keys: drops `.` components, repeated and trailing separators.
pub fn normalize_path(path: &Utf8Path) -> Utf8PathBuf {
    let cleaned: Utf8PathBuf = path
        .components()
        .filter(|c| !matches!(c, Utf8Component::CurDir))
        .collect();
    if cleaned.as_str().is_empty() {
        Utf8PathBuf::from(".")
    } else {
        cleaned
    }
}

fn walk_error(dir: &Utf8Path, err: walkdir::Error) -> Error {
    let path = err
        .path()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| dir.as_std_path().to_path_buf());
    Error::ReadPolicyFile {
        path,
        source: io::Error::from(err),
    }
}

fn pathbuf_to_utf8(path: PathBuf) -> Result<Utf8PathBuf> {
    Utf8PathBuf::from_path_buf(path).map_err(|path| Error::ReadPolicyFile {
        path,
        source: io::Error::new(io::ErrorKind::InvalidData, "path is not valid UTF-8"),
    })
}
