use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs;

use std::path::Path;
use std::time::Duration;

pub const DEFAULT_PATH: &str = "/etc/tunnel-netcfg/config.toml";
pub const ENV_VAR: &str = "TUNNEL_NETCFG_CONFIG_PATH";

pub const DEFAULT_MACOS_NETWORK_SERVICE: &str = "Wi-Fi";

const KNOWN_KEYS: [&str; 2] = ["timeout", "macos"];
const KNOWN_MACOS_KEYS: [&str; 1] = ["network_service"];

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Upper bound for every external command. No deadline when absent.
    #[serde(default, with = "humantime_serde::option")]
    pub timeout: Option<Duration>,
    #[serde(default)]
    pub macos: MacOsOptions,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MacOsOptions {
    /// `networksetup` service whose resolvers are changed.
    #[serde(default = "default_network_service")]
    pub network_service: String,
}

impl Default for MacOsOptions {
    fn default() -> Self {
        Self {
            network_service: default_network_service(),
        }
    }
}

fn default_network_service() -> String {
    DEFAULT_MACOS_NETWORK_SERVICE.to_string()
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration file not found")]
    NoFile,
    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),
    #[error("Deserialization error: {0}")]
    TomlDeserialization(#[from] toml::de::Error),
}

pub async fn read(path: &Path) -> Result<Config, Error> {
    let content = fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::NoFile
        } else {
            Error::IO(e)
        }
    })?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<Config, Error> {
    let table = content.parse::<toml::Table>()?;
    for key in wrong_keys(&table) {
        tracing::warn!(%key, "ignoring unsupported key in configuration file");
    }
    Ok(toml::from_str::<Config>(content)?)
}

fn wrong_keys(table: &toml::Table) -> Vec<String> {
    let mut wrong = Vec::new();
    for (key, value) in table {
        if !KNOWN_KEYS.contains(&key.as_str()) {
            wrong.push(key.clone());
            continue;
        }
        if let Some(macos) = value.as_table().filter(|_| key == "macos") {
            wrong.extend(
                macos
                    .keys()
                    .filter(|k| !KNOWN_MACOS_KEYS.contains(&k.as_str()))
                    .map(|k| format!("macos.{k}")),
            );
        }
    }
    wrong
}
