//! Execution context for the Tenantry runtime.
//!
//! A [`Context`] is built once per process from a validated
//! [`Config`](tenantry_config::Config) and threaded through every other layer.
//! It owns:
//! - the configuration
//! - the [`ComponentRepository`], pre-populated with the built-in components
//! - a logging sink (a void sink unless one is supplied)
//! - the shared [`MessagingContext`], created on first use

pub mod messaging;
pub mod repository;

use std::sync::{Arc, OnceLock};

use tenantry_config::Config;
use tenantry_core::logging::{Logger, LoggingSink, VoidSink};
use tenantry_core::plugin::PluginConfig;
use tenantry_core::storage::Storage;
use tenantry_core::{ConfigError, Result};
use tenantry_storage::{FILES_KIND, FileStorage};
use tracing::debug;

pub use messaging::{MessagingContext, Payload};
pub use repository::{Capability, ComponentRepository, Factory};

/// Constructor for the lazily created messaging resource.
pub type MessagingFactory = Box<dyn Fn(&Config) -> MessagingContext + Send + Sync>;

/// The long-lived object graph every runtime layer depends on.
///
/// `Context` is `Send + Sync`; share it behind an `Arc`.
pub struct Context {
    config: Config,
    repository: ComponentRepository,
    sink: Arc<dyn LoggingSink>,
    messaging: OnceLock<Arc<MessagingContext>>,
    messaging_factory: MessagingFactory,
}

impl Context {
    /// Build a context with the default messaging constructor.
    ///
    /// Never fails: `config` has already been validated.
    pub fn new(config: Config, sink: Option<Arc<dyn LoggingSink>>) -> Self {
        let mut builder = Self::builder(config);
        if let Some(sink) = sink {
            builder = builder.sink(sink);
        }
        builder.build()
    }

    pub fn builder(config: Config) -> ContextBuilder {
        ContextBuilder {
            config,
            sink: None,
            messaging_factory: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get a named logger from the sink.
    pub fn log(&self, name: &str) -> Arc<dyn Logger> {
        self.sink.get(name)
    }

    pub fn sink(&self) -> &Arc<dyn LoggingSink> {
        &self.sink
    }

    pub fn repository(&self) -> &ComponentRepository {
        &self.repository
    }

    /// Mutable access for the plugin-loading phase.
    pub fn repository_mut(&mut self) -> &mut ComponentRepository {
        &mut self.repository
    }

    /// The shared messaging resource.
    ///
    /// The first call constructs it; concurrent first calls block until that
    /// construction finishes, so exactly one instance ever exists.
    pub fn messaging_context(&self) -> Arc<MessagingContext> {
        self.messaging
            .get_or_init(|| {
                debug!(hostname = %self.config.hostname(), "Initializing messaging context");
                Arc::new((self.messaging_factory)(&self.config))
            })
            .clone()
    }

    /// Instantiate the storage configured under `name`.
    ///
    /// A name missing from the configuration is a [`ConfigError`]; a
    /// configured backend type nobody registered surfaces as an
    /// unknown-component error from the repository.
    pub fn storage(&self, name: &str) -> Result<Arc<dyn Storage>> {
        let info = self
            .config
            .storage(name)
            .ok_or_else(|| ConfigError::UnknownStorage(name.to_string()))?;
        self.repository
            .create_storage(&info.backend_type, &info.plugin_config)
    }
}

/// Builder for [`Context`], for callers that need to inject collaborators.
pub struct ContextBuilder {
    config: Config,
    sink: Option<Arc<dyn LoggingSink>>,
    messaging_factory: Option<MessagingFactory>,
}

impl ContextBuilder {
    pub fn sink(mut self, sink: Arc<dyn LoggingSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Replace the constructor used for the messaging resource.
    pub fn messaging_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn(&Config) -> MessagingContext + Send + Sync + 'static,
    {
        self.messaging_factory = Some(Box::new(factory));
        self
    }

    pub fn build(self) -> Context {
        let sink: Arc<dyn LoggingSink> = match self.sink {
            Some(sink) => sink,
            None => Arc::new(VoidSink),
        };
        let messaging_factory: MessagingFactory = match self.messaging_factory {
            Some(factory) => factory,
            None => Box::new(|config: &Config| {
                MessagingContext::new(config.defaults().io_bulk_size as usize)
            }),
        };

        let mut repository = ComponentRepository::new();
        register_builtins(&mut repository, &self.config);

        debug!(
            config = %self.config.config_path().display(),
            storages = self.config.storages().len(),
            "Context created"
        );

        Context {
            config: self.config,
            repository,
            sink,
            messaging: OnceLock::new(),
            messaging_factory,
        }
    }
}

fn register_builtins(repository: &mut ComponentRepository, config: &Config) {
    let spool_path = config.spool_path().to_path_buf();
    repository.register_storage(FILES_KIND, move |plugin: &PluginConfig| {
        let storage: Arc<dyn Storage> =
            Arc::new(FileStorage::from_plugin_config(plugin, &spool_path)?);
        Ok(storage)
    });
}
