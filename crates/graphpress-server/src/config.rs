use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &["change-me-to-a-random-string", "dev-secret-change-me"];

pub struct Config {
    pub jwt_secret: String,
    pub db_path: PathBuf,
    pub addr: SocketAddr,
}

impl Config {
    /// Read `GRAPHPRESS_*` variables. Call after `.env` has been loaded.
    pub fn from_env() -> Result<Self> {
        let jwt_secret = std::env::var("GRAPHPRESS_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("GRAPHPRESS_JWT_SECRET is unset or still a placeholder");
        }

        let db_path: PathBuf = std::env::var("GRAPHPRESS_DB_PATH")
            .unwrap_or_else(|_| "graphpress.db".into())
            .into();
        let host = std::env::var("GRAPHPRESS_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = std::env::var("GRAPHPRESS_PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .context("GRAPHPRESS_PORT must be a port number")?;

        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", host, port))?;

        Ok(Self {
            jwt_secret,
            db_path,
            addr,
        })
    }
}
