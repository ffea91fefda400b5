use anyhow::Context;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub root: PathBuf,
    pub staging_root: PathBuf,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub max_connections: u32,
    pub storage: StorageConfig,
    pub request_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<AppConfig> {
        let host = env::var("HOST").unwrap_or_else(|_| "localhost".to_owned());
        let port = env::var("PORT")
            .map(|x| x.parse::<u16>())
            .unwrap_or(Ok(8084))
            .context("PORT")?;
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL")?;
        let max_connections = env::var("MAX_CONNECTIONS")
            .map(|x| x.parse::<u32>())
            .unwrap_or(Ok(10))
            .context("MAX_CONNECTIONS")?;
        let root = PathBuf::from(env::var("STORAGE_ROOT").context("STORAGE_ROOT")?);
        // promotion renames across these two, so the default keeps them on
        // one filesystem
        let staging_root = env::var("STAGING_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| root.join("staging"));
        let request_timeout = env::var("REQUEST_TIMEOUT_SECS")
            .map(|x| x.parse::<u64>())
            .unwrap_or(Ok(30))
            .context("REQUEST_TIMEOUT_SECS")?;

        Ok(AppConfig {
            host,
            port,
            database_url,
            max_connections,
            storage: StorageConfig {
                root: root.join("files"),
                staging_root,
            },
            request_timeout: Duration::from_secs(request_timeout),
        })
    }
}
