//! Producer Thread Configuration
//!
//! Controls how the engine spawns the producer thread behind each generator.
//! Can be loaded from JSON:
//!
//! ```json
//! { "thread_name": "reader", "stack_size": 262144 }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default name given to producer threads.
pub const DEFAULT_THREAD_NAME: &str = "lazyseq-producer";

/// Configuration applied when a generator spawns its producer thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Name of the producer thread (shows up in panics and debuggers).
    #[serde(default = "default_thread_name")]
    pub thread_name: String,
    /// Stack size in bytes; `None` uses the platform default.
    #[serde(default)]
    pub stack_size: Option<usize>,
}

fn default_thread_name() -> String {
    DEFAULT_THREAD_NAME.to_string()
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            thread_name: default_thread_name(),
            stack_size: None,
        }
    }
}

impl GeneratorConfig {
    /// Default configuration with a specific thread name.
    pub fn named(thread_name: impl Into<String>) -> Self {
        Self {
            thread_name: thread_name.into(),
            ..Self::default()
        }
    }

    /// Set the producer stack size.
    pub fn with_stack_size(mut self, bytes: usize) -> Self {
        self.stack_size = Some(bytes);
        self
    }

    /// Parse a configuration from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::ConfigError(format!("invalid generator config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::ConfigError(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&contents)
    }

    /// Reject values the thread builder cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.thread_name.contains('\0') {
            return Err(Error::ConfigError(
                "thread_name must not contain NUL bytes".to_string(),
            ));
        }
        if self.stack_size == Some(0) {
            return Err(Error::ConfigError("stack_size must be non-zero".to_string()));
        }
        Ok(())
    }

    /// Thread builder for a producer thread.
    pub(crate) fn thread_builder(&self) -> std::thread::Builder {
        let builder = std::thread::Builder::new().name(self.thread_name.clone());
        match self.stack_size {
            Some(bytes) => builder.stack_size(bytes),
            None => builder,
        }
    }
}
