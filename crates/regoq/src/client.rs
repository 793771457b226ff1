use regoq_core::{
    AnnotationsRef, Config, ConfigOption, Error, Logger, QueryOptions, Result, Source, marshal,
    with_logger,
};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Binds one configured [`Source`] and answers typed queries against it.
///
/// A `Client` is only ever handed out after its source configured successfully. It is
/// `Send + Sync`; share it behind an `Arc` to query from many tasks at once.
pub struct Client {
    source: Box<dyn Source>,
    logger: Logger,
}

impl Client {
    /// Configure `source` with default settings.
    pub fn new<S>(source: S) -> Result<Self>
    where
        S: Source + 'static,
    {
        Self::builder(source).build()
    }

    pub fn builder<S>(source: S) -> ClientBuilder
    where
        S: Source + 'static,
    {
        ClientBuilder {
            source: Box::new(source),
            options: Vec::new(),
        }
    }

    pub async fn query<I, O>(&self, query: &str, input: &I) -> Result<O>
    where
        I: Serialize + ?Sized,
        O: DeserializeOwned,
    {
        self.query_with(query, input, QueryOptions::new()).await
    }

    /// Evaluate `query` against `input` and decode the decision into `O`.
    ///
    /// Source errors are returned as-is. An undefined or `null` decision is
    /// [`Error::NoEvalResult`], whichever source produced it.
    pub async fn query_with<I, O>(&self, query: &str, input: &I, options: QueryOptions) -> Result<O>
    where
        I: Serialize + ?Sized,
        O: DeserializeOwned,
    {
        if query.trim().is_empty() {
            return Err(Error::invalid_input("query must not be empty"));
        }
        let input = marshal::input_value(input)?;
        self.logger.in_scope(|| {
            tracing::debug!(source = self.source.kind(), query, options = ?options, "client query")
        });

        let result = self.source.query(query, &input, &options).await?;
        if result.is_null() {
            return Err(Error::NoEvalResult);
        }
        marshal::convert(&result)
    }

    /// Like [`Client::query_with`], with the undefined decision mapped to `Ok(None)`.
    pub async fn query_optional<I, O>(
        &self,
        query: &str,
        input: &I,
        options: QueryOptions,
    ) -> Result<Option<O>>
    where
        I: Serialize + ?Sized,
        O: DeserializeOwned,
    {
        match self.query_with(query, input, options).await {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.is_no_result() => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Every annotation of the source's policies, ordered by path then location.
    pub fn metadata(&self) -> Vec<AnnotationsRef> {
        self.source.annotation_set().flatten()
    }

    pub fn source_kind(&self) -> &'static str {
        self.source.kind()
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("source", &self.source.kind())
            .finish_non_exhaustive()
    }
}

/// Collects configuration mutators, applies them in order, then configures the source.
pub struct ClientBuilder {
    source: Box<dyn Source>,
    options: Vec<ConfigOption>,
}

impl ClientBuilder {
    pub fn logger(self, logger: Logger) -> Self {
        self.option(with_logger(logger))
    }

    pub fn configure<F>(self, mutate: F) -> Self
    where
        F: FnOnce(&mut Config) + Send + 'static,
    {
        self.option(Box::new(mutate))
    }

    pub fn option(mut self, option: ConfigOption) -> Self {
        self.options.push(option);
        self
    }

    /// Fails with [`Error::ClientInit`] wrapping the source's configure error.
    pub fn build(self) -> Result<Client> {
        let ClientBuilder {
            mut source,
            options,
        } = self;
        let config = Config::default().apply(options);
        let source_kind = source.kind();

        if let Err(err) = source.configure(&config) {
            config.logger().in_scope(|| {
                tracing::debug!(source = source_kind, error = %err, "source configure failed")
            });
            return Err(Error::ClientInit {
                source_kind,
                source: Box::new(err),
            });
        }

        config
            .logger()
            .in_scope(|| tracing::debug!(source = source_kind, "client ready"));
        Ok(Client {
            source,
            logger: config.logger().clone(),
        })
    }
}

impl std::fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("source", &self.source.kind())
            .field("options", &self.options.len())
            .finish()
    }
}
