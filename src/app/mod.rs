//! Application context: configuration, background executor and UI queue.
//!
//! The context is created explicitly on the UI thread and passed to whatever
//! needs it. [`AppContext::terminate`] shuts everything down.

use std::path::Path;

use crate::config::{ConfigStore, TESTING};
use crate::errors::AppError;
use crate::log::{debug, info};

mod executor;
mod ui;

pub use executor::{ExecutorConfig, TaskExecutor, TaskHandle};
pub use ui::{UiDispatcher, UiHandle};

/// Everything an application shares between its windows.
#[derive(Debug)]
pub struct AppContext {
    config: ConfigStore,
    ui: UiDispatcher,
    executor: TaskExecutor,
}

impl AppContext {
    /// Build a context on the calling thread, which becomes the UI thread.
    pub fn new(config: ConfigStore) -> Result<Self, AppError> {
        let ui = UiDispatcher::new();
        let executor = TaskExecutor::new(ExecutorConfig::from_config(&config), ui.handle())?;
        let context = Self { config, ui, executor };
        info!(testing = context.testing(), "application context ready");
        Ok(context)
    }

    /// Load (or create from defaults) the configuration at `path`, then
    /// build the context.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let config = ConfigStore::load_or_init(path)?;
        Self::new(config)
    }

    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ConfigStore {
        &mut self.config
    }

    pub fn executor(&self) -> &TaskExecutor {
        &self.executor
    }

    pub fn ui(&self) -> &UiDispatcher {
        &self.ui
    }

    pub fn ui_handle(&self) -> UiHandle {
        self.ui.handle()
    }

    /// Development-mode flag (`rcore.testing`).
    pub fn testing(&self) -> bool {
        self.config.get_typed(TESTING).unwrap_or(false)
    }

    /// Join the executor threads and drop pending UI callbacks. Returns the
    /// configuration so callers can store it.
    pub fn terminate(mut self) -> ConfigStore {
        self.executor.shutdown();
        let dropped = self.ui.discard();
        debug!(dropped, "application context terminated");
        self.config
    }
}
