use async_trait::async_trait;
use regoq_core::{Config, QueryOptions, Result, Source, SupportedOptions, marshal};
use serde::Serialize;
use serde_json::Value;

type Handler = dyn Fn(&Value, &QueryOptions) -> Result<Value> + Send + Sync;

/// Source backed by a closure, for testing code that consumes a [`crate::Client`].
///
/// The closure's result goes through the same JSON re-encoding as real sources, and its
/// errors reach the caller unchanged. Every query option is accepted.
pub struct MockSource {
    handler: Box<Handler>,
}

impl MockSource {
    pub fn new<F, R>(handler: F) -> Self
    where
        F: Fn(&Value, &QueryOptions) -> Result<R> + Send + Sync + 'static,
        R: Serialize,
    {
        Self {
            handler: Box::new(move |input: &Value, options: &QueryOptions| {
                let result = handler(input, options)?;
                marshal::convert(&result)
            }),
        }
    }
}

impl std::fmt::Debug for MockSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockSource").finish_non_exhaustive()
    }
}

#[async_trait]
impl Source for MockSource {
    fn kind(&self) -> &'static str {
        "mock"
    }

    fn configure(&mut self, _config: &Config) -> Result<()> {
        Ok(())
    }

    async fn query(&self, _query: &str, input: &Value, options: &QueryOptions) -> Result<Value> {
        SupportedOptions::ALL.check(self.kind(), options)?;
        (self.handler)(input, options)
    }
}
