// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of GridCast.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

use anyhow::{Context, Result, bail};
use gridcast_store::Credentials;
use serde::Deserialize;
use std::path::Path;
use tracing::warn;

/// Main application configuration, read from `gridcast.toml` (path
/// overridable via `GRIDCAST_CONFIG`).
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    pub store: StoreSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreSettings {
    /// Object-store endpoint; defaults to the AWS regional endpoint.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_region")]
    pub region: String,
    pub bucket: String,
    #[serde(default)]
    pub access_key_id: Option<String>,
    #[serde(default)]
    pub secret_access_key: Option<String>,
}

impl StoreSettings {
    pub fn endpoint(&self) -> String {
        self.endpoint
            .clone()
            .unwrap_or_else(|| format!("https://s3.{}.amazonaws.com", self.region))
    }

    /// Resolve credentials from config, falling back to the standard
    /// AWS environment variables. Both halves must be present;
    /// otherwise the client runs anonymously.
    pub fn credentials(&self) -> Option<Credentials> {
        let access_key_id = self
            .access_key_id
            .clone()
            .or_else(|| std::env::var("AWS_ACCESS_KEY_ID").ok());
        let secret_access_key = self
            .secret_access_key
            .clone()
            .or_else(|| std::env::var("AWS_SECRET_ACCESS_KEY").ok());

        match (access_key_id, secret_access_key) {
            (Some(access_key_id), Some(secret_access_key)) => Some(Credentials {
                access_key_id,
                secret_access_key,
            }),
            (None, None) => None,
            _ => {
                warn!("⚠️ Only one of access key id / secret access key is set, running anonymously");
                None
            }
        }
    }
}

fn default_bind_address() -> String {
    "0.0.0.0".to_owned()
}

fn default_port() -> u16 {
    8000
}

fn default_region() -> String {
    "us-east-1".to_owned()
}

/// Load and validate the configuration file.
pub fn load_config() -> Result<AppConfig> {
    let path =
        std::env::var("GRIDCAST_CONFIG").unwrap_or_else(|_| "gridcast.toml".to_owned());

    if !Path::new(&path).exists() {
        bail!(
            "Config file '{path}' not found. Create it or point GRIDCAST_CONFIG at one; \
             a [store] section with at least 'bucket' is required."
        );
    }

    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file: {path}"))?;
    let config: AppConfig =
        toml::from_str(&raw).with_context(|| format!("Failed to parse config file: {path}"))?;

    if config.store.bucket.trim().is_empty() {
        bail!("Config file '{path}' has an empty store.bucket");
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_applies_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [store]
            bucket = "ieso-data"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.bind_address, "0.0.0.0");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.store.region, "us-east-1");
        assert_eq!(config.store.endpoint(), "https://s3.us-east-1.amazonaws.com");
    }

    #[test]
    fn test_full_config_round_trip() {
        let config: AppConfig = toml::from_str(
            r#"
            [server]
            bind_address = "127.0.0.1"
            port = 9000

            [store]
            endpoint = "http://localhost:9090"
            region = "ca-central-1"
            bucket = "ieso-data"
            access_key_id = "AKID"
            secret_access_key = "secret"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.store.endpoint(), "http://localhost:9090");
        let credentials = config.store.credentials().unwrap();
        assert_eq!(credentials.access_key_id, "AKID");
    }

    #[test]
    fn test_missing_bucket_is_rejected() {
        let result = toml::from_str::<AppConfig>("[store]\nregion = \"us-east-1\"\n");
        assert!(result.is_err());
    }
}
