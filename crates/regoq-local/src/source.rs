use crate::compiled::CompiledPolicy;
use async_trait::async_trait;
use camino::Utf8Path;
use regoq_bundle::{BundleLoader, PolicyBundle};
use regoq_core::{
    AnnotationSet, Config, EMPTY_ANNOTATIONS, Error, QueryOptions, Result, Source, SupportedOptions,
};
use serde_json::Value;

const LOCAL_OPTIONS: SupportedOptions = SupportedOptions {
    print_hook: true,
    package_suffix: true,
    headers: false,
};

/// Compiled state shared by the local variants. Empty until configured.
#[derive(Debug, Default)]
struct LocalState {
    compiled: Option<CompiledPolicy>,
}

impl LocalState {
    fn configure(
        &mut self,
        kind: &'static str,
        bundle: &PolicyBundle,
        config: &Config,
    ) -> Result<()> {
        if self.compiled.is_some() {
            return Err(Error::invalid_input(format!("{kind} source is already configured")));
        }
        let compiled = CompiledPolicy::compile(bundle, config.logger().clone())?;
        self.compiled = Some(compiled);
        Ok(())
    }

    fn query(
        &self,
        kind: &'static str,
        query: &str,
        input: &Value,
        options: &QueryOptions,
    ) -> Result<Value> {
        LOCAL_OPTIONS.check(kind, options)?;
        let compiled = self
            .compiled
            .as_ref()
            .ok_or_else(|| Error::invalid_input(format!("{kind} source is not configured")))?;
        compiled.evaluate(query, input, options)
    }

    fn annotation_set(&self) -> &AnnotationSet {
        self.compiled
            .as_ref()
            .map_or(&EMPTY_ANNOTATIONS, CompiledPolicy::annotations)
    }
}

/// Policies read from files and directories on disk, optionally overlaid with in-memory text.
///
/// Nothing is read until [`Source::configure`]; after that the files are never looked at again.
#[derive(Debug, Default)]
pub struct FileSource {
    loader: BundleLoader,
    state: LocalState,
}

impl FileSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl AsRef<Utf8Path>) -> Self {
        self.loader = self.loader.file(path);
        self
    }

    /// Every `.rego` file below `dir`, at any depth.
    pub fn with_dir(mut self, dir: impl AsRef<Utf8Path>) -> Self {
        self.loader = self.loader.dir(dir);
        self
    }

    /// In-memory policy text. Replaces a file with the same normalized name.
    pub fn with_policy_data(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.loader = self.loader.policy(name, text);
        self
    }
}

#[async_trait]
impl Source for FileSource {
    fn kind(&self) -> &'static str {
        "file"
    }

    fn configure(&mut self, config: &Config) -> Result<()> {
        let kind = self.kind();
        let bundle = self.loader.load()?;
        self.state.configure(kind, &bundle, config)
    }

    async fn query(&self, query: &str, input: &Value, options: &QueryOptions) -> Result<Value> {
        self.state.query(self.kind(), query, input, options)
    }

    fn annotation_set(&self) -> &AnnotationSet {
        self.state.annotation_set()
    }
}

/// Policies supplied entirely in memory.
#[derive(Debug, Default)]
pub struct DataSource {
    policies: Vec<(String, String)>,
    state: LocalState,
}

impl DataSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.policies.push((name.into(), text.into()));
        self
    }
}

impl<K, V> FromIterator<(K, V)> for DataSource
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |source, (name, text)| source.with_policy(name, text))
    }
}

#[async_trait]
impl Source for DataSource {
    fn kind(&self) -> &'static str {
        "data"
    }

    fn configure(&mut self, config: &Config) -> Result<()> {
        let kind = self.kind();
        let bundle = PolicyBundle::from_policies(self.policies.iter().cloned());
        self.state.configure(kind, &bundle, config)
    }

    async fn query(&self, query: &str, input: &Value, options: &QueryOptions) -> Result<Value> {
        self.state.query(self.kind(), query, input, options)
    }

    fn annotation_set(&self) -> &AnnotationSet {
        self.state.annotation_set()
    }
}
