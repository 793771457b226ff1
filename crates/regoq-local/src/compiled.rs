use crate::annotations::{build_set, scan_module};
use regoq_bundle::PolicyBundle;
use regoq_core::{Error, Logger, QueryOptions, Result, marshal};
use regoq_types::AnnotationSet;
use serde_json::Value;
use std::sync::{Mutex, PoisonError};

/// A bundle compiled into an engine, plus the annotations found in it.
///
/// The engine is never evaluated in place; every query runs on a clone so concurrent
/// queries never observe each other's input or `print` output.
pub struct CompiledPolicy {
    engine: Mutex<regorus::Engine>,
    annotations: AnnotationSet,
    packages: Vec<String>,
    logger: Logger,
}

impl CompiledPolicy {
    pub fn compile(bundle: &PolicyBundle, logger: Logger) -> Result<Self> {
        if bundle.is_empty() {
            return Err(Error::NoPolicyData);
        }

        let mut engine = regorus::Engine::new();
        let mut annotations = Vec::new();
        let mut packages = Vec::new();
        for (name, text) in bundle.iter() {
            engine
                .add_policy(name.to_string(), text.to_string())
                .map_err(|err| Error::Compile {
                    name: name.to_string(),
                    message: format!("{err:#}"),
                })?;

            let module = scan_module(name, text)?;
            packages.extend(module.package);
            annotations.extend(module.annotations);
        }
        packages.sort();
        packages.dedup();

        let annotations = build_set(annotations)?;
        logger.in_scope(|| {
            tracing::debug!(
                files = ?bundle.loaded_files(),
                entries = bundle.len(),
                packages = ?packages,
                annotations = annotations.len(),
                "compiled policy bundle"
            )
        });

        Ok(Self {
            engine: Mutex::new(engine),
            annotations,
            packages,
            logger,
        })
    }

    pub fn annotations(&self) -> &AnnotationSet {
        &self.annotations
    }

    /// Package names declared by the bundle, sorted and deduplicated.
    pub fn packages(&self) -> &[String] {
        &self.packages
    }

    /// Evaluate `query` (with the package suffix from `options` applied) against `input`.
    pub fn evaluate(&self, query: &str, input: &Value, options: &QueryOptions) -> Result<Value> {
        let query = options.effective_query(query);
        self.logger
            .in_scope(|| tracing::debug!(query = %query, "local query"));

        let mut engine = self
            .engine
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        let input_json = serde_json::to_string(input)
            .map_err(|err| Error::invalid_input(format!("cannot encode input: {err}")))?;
        let input = regorus::Value::from_json_str(&input_json)
            .map_err(|err| Error::invalid_input(format!("cannot bind input: {err:#}")))?;
        engine.set_input(input);
        engine.set_gather_prints(true);

        let results = engine.eval_query(query.clone(), false);
        self.forward_prints(&mut engine, options);
        let results = results.map_err(|err| Error::Eval {
            query: query.clone(),
            message: format!("{err:#}"),
        })?;

        let value = results
            .result
            .first()
            .and_then(|result| result.expressions.first())
            .map(|expr| &expr.value)
            .filter(|value| !matches!(value, regorus::Value::Undefined));

        let Some(value) = value else {
            self.logger
                .in_scope(|| tracing::debug!(query = %query, defined = false, "local query done"));
            return Err(Error::NoEvalResult);
        };

        let json = value.to_json_str().map_err(|err| Error::Eval {
            query: query.clone(),
            message: format!("result is not representable as JSON: {err:#}"),
        })?;
        self.logger
            .in_scope(|| tracing::debug!(query = %query, defined = true, "local query done"));
        marshal::from_json_slice(json.as_bytes())
    }

    fn forward_prints(&self, engine: &mut regorus::Engine, options: &QueryOptions) {
        let lines = match engine.take_prints() {
            Ok(lines) => lines,
            Err(err) => {
                self.logger
                    .in_scope(|| tracing::warn!(error = %err, "failed to collect print output"));
                return;
            }
        };
        match options.print_hook() {
            Some(hook) => lines.iter().for_each(|line| hook.print(line)),
            None if !lines.is_empty() => self
                .logger
                .in_scope(|| tracing::trace!(lines = lines.len(), "discarded print output")),
            None => {}
        }
    }
}

impl std::fmt::Debug for CompiledPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledPolicy")
            .field("packages", &self.packages)
            .field("annotations", &self.annotations.len())
            .finish_non_exhaustive()
    }
}
