//! Client configuration.
//!
//! [`ClientConfig::load`] layers, in order: the built-in defaults, an optional
//! TOML file, and `HYPERCLIENT__SECTION__KEY` environment variables.
//! [`ClientConfig::defaults`] returns the defaults alone.

use serde::Deserialize;
use std::path::Path;

use crate::error::Result;

const DEFAULT_CONFIG: &str = r#"
[coordinator]
host = "127.0.0.1"
port = 1982

[logging]
filter = "info"
"#;

pub const DEFAULT_CONFIG_FILE: &str = "hyperclient.toml";

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ClientConfig {
    pub coordinator: CoordinatorConfig,
    pub logging: LoggingConfig,
}

/// `[coordinator]`: where the cluster coordinator listens.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CoordinatorConfig {
    pub host: String,
    pub port: u16,
}

/// `[logging]`: an `EnvFilter` directive used when `RUST_LOG` is not set.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    pub filter: String,
}

impl ClientConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(p) => config::File::from(p).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };
        let cfg = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .add_source(file)
            .add_source(config::Environment::with_prefix("HYPERCLIENT").separator("__"))
            .build()?
            .try_deserialize()?;
        Ok(cfg)
    }

    pub fn defaults() -> Self {
        Self {
            coordinator: CoordinatorConfig {
                host: "127.0.0.1".into(),
                port: 1982,
            },
            logging: LoggingConfig {
                filter: "info".into(),
            },
        }
    }

    pub fn coordinator_address(&self) -> String {
        format!("{}:{}", self.coordinator.host, self.coordinator.port)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::defaults()
    }
}
