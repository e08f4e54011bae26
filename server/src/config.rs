use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Result;
use facevault_core::{RegistryConfig, DEFAULT_DB_FILENAME, DEFAULT_MATCH_THRESHOLD};

use crate::env_utils::{parse_bool_env, parse_number_env, parse_path_env, parse_socket_addr_env};

#[derive(Debug, Clone)]
pub(crate) struct AppConfig {
    pub(crate) bind: SocketAddr,
    pub(crate) data_dir: PathBuf,
    pub(crate) db_filename: String,
    pub(crate) match_threshold: f32,
    /// Zero lets the first enrollment fix the dimension.
    pub(crate) expected_dimension: usize,
    pub(crate) max_dimension: usize,
    pub(crate) sync_on_write: bool,
    pub(crate) request_timeout_ms: u64,
    pub(crate) max_body_bytes: usize,
    pub(crate) max_concurrency: usize,
}

impl AppConfig {
    pub(crate) fn from_env() -> Result<Self> {
        let bind = parse_socket_addr_env("FACEVAULT_BIND", "127.0.0.1:8080")?;
        let data_dir = parse_path_env("FACEVAULT_DATA_DIR", "data")?;
        let db_filename = parse_path_env("FACEVAULT_DB_FILENAME", DEFAULT_DB_FILENAME)?
            .to_string_lossy()
            .into_owned();
        let match_threshold =
            parse_number_env("FACEVAULT_MATCH_THRESHOLD", DEFAULT_MATCH_THRESHOLD)?;
        let expected_dimension = parse_number_env("FACEVAULT_EXPECTED_DIMENSION", 0usize)?;
        let max_dimension = parse_number_env("FACEVAULT_MAX_DIMENSION", 4096usize)?;
        let sync_on_write = parse_bool_env("FACEVAULT_SYNC_ON_WRITE", true)?;
        let request_timeout_ms = parse_number_env("FACEVAULT_REQUEST_TIMEOUT_MS", 2000u64)?;
        let max_body_bytes = parse_number_env("FACEVAULT_MAX_BODY_BYTES", 1_048_576usize)?;
        let max_concurrency = parse_number_env("FACEVAULT_MAX_CONCURRENCY", 256usize)?;

        if !(-1.0..=1.0).contains(&match_threshold) {
            anyhow::bail!("FACEVAULT_MATCH_THRESHOLD must be within [-1, 1]");
        }
        if max_dimension == 0 {
            anyhow::bail!("FACEVAULT_MAX_DIMENSION must be > 0");
        }
        if expected_dimension > max_dimension {
            anyhow::bail!("FACEVAULT_EXPECTED_DIMENSION must not exceed FACEVAULT_MAX_DIMENSION");
        }
        if request_timeout_ms == 0 {
            anyhow::bail!("FACEVAULT_REQUEST_TIMEOUT_MS must be > 0");
        }
        if max_body_bytes == 0 {
            anyhow::bail!("FACEVAULT_MAX_BODY_BYTES must be > 0");
        }
        if max_concurrency == 0 {
            anyhow::bail!("FACEVAULT_MAX_CONCURRENCY must be > 0");
        }

        Ok(Self {
            bind,
            data_dir,
            db_filename,
            match_threshold,
            expected_dimension,
            max_dimension,
            sync_on_write,
            request_timeout_ms,
            max_body_bytes,
            max_concurrency,
        })
    }

    pub(crate) fn db_path(&self) -> PathBuf {
        self.data_dir.join(&self.db_filename)
    }

    pub(crate) fn registry_config(&self) -> RegistryConfig {
        let mut config = RegistryConfig::new(self.db_path());
        config.sync_on_write = self.sync_on_write;
        if self.expected_dimension > 0 {
            config.expected_dimension = Some(self.expected_dimension);
        }
        config
    }
}
