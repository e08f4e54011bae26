use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

fn raw_or_default(key: &str, default: impl ToString) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

pub(crate) fn parse_bool_env(key: &str, default: bool) -> Result<bool> {
    let raw = raw_or_default(key, default);
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => anyhow::bail!("{key} must be a boolean, got '{raw}'"),
    }
}

pub(crate) fn parse_number_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr + ToString,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = raw_or_default(key, default);
    raw.trim()
        .parse()
        .with_context(|| format!("{key} must be a number, got '{raw}'"))
}

pub(crate) fn parse_socket_addr_env(key: &str, default: &str) -> Result<SocketAddr> {
    let raw = raw_or_default(key, default);
    raw.trim()
        .parse()
        .with_context(|| format!("{key} must be a valid socket address, got '{raw}'"))
}

pub(crate) fn parse_path_env(key: &str, default: &str) -> Result<PathBuf> {
    let raw = raw_or_default(key, default);
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        anyhow::bail!("{key} must not be empty");
    }
    Ok(PathBuf::from(trimmed))
}

pub(crate) fn parse_optional_path_env(key: &str) -> Result<Option<PathBuf>> {
    let Ok(raw) = env::var(key) else {
        return Ok(None);
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        anyhow::bail!("{key} must not be empty when set");
    }
    Ok(Some(PathBuf::from(trimmed)))
}
