use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Server settings, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let db_path = lookup("MINIFB_DB_PATH").unwrap_or_else(|| "minifb.db".into()).into();
        let host = lookup("MINIFB_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = lookup("MINIFB_PORT")
            .unwrap_or_else(|| "3000".into())
            .parse()
            .context("MINIFB_PORT must be a port number")?;

        Ok(Self { db_path, host, port })
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid bind address {}:{}", self.host, self.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.db_path, PathBuf::from("minifb.db"));
        assert_eq!(config.bind_addr().unwrap(), "0.0.0.0:3000".parse().unwrap());
    }

    #[test]
    fn overrides_and_bad_port() {
        let config = Config::from_lookup(lookup(&[("MINIFB_HOST", "127.0.0.1"), ("MINIFB_PORT", "8080")])).unwrap();
        assert_eq!(config.bind_addr().unwrap(), "127.0.0.1:8080".parse().unwrap());

        assert!(Config::from_lookup(lookup(&[("MINIFB_PORT", "eighty")])).is_err());
    }
}
