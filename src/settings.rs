use std::path::PathBuf;

use config::{builder::DefaultState, Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ServerSettings {
    pub host: String,
    // env variables always arrive as strings
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
}

impl ServerSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct DatabaseSettings {
    pub path: PathBuf,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_connections: u32,
}

impl Settings {
    /// Defaults, then `configuration.yaml` if present, then `TRIVIA__*` env variables.
    pub fn load() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        let builder = Config::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(
                Environment::with_prefix("TRIVIA")
                    .prefix_separator("__")
                    .separator("__"),
            );
        Self::from_builder(builder)
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        builder
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("database.path", "trivia.db")?
            .set_default("database.max_connections", 5)?
            .build()?
            .try_deserialize()
    }
}
