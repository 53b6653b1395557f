//! Configuration management for Pecha Server

use serde::Deserialize;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub database: DatabaseConfig,
    pub pedurma: PedurmaConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Root directory holding `{pecha}/{pecha}.opf` trees (local backend)
    pub opf_root: PathBuf,
    pub s3: Option<S3Config>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Local,
    S3,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Config {
    pub endpoint: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: Option<String>,
    /// Key prefix under which pechas live inside the bucket
    pub prefix: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PedurmaConfig {
    /// Pecha whose pagination layers receive note references
    pub pecha_id: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
            },
            storage: StorageConfig {
                backend: StorageBackend::Local,
                opf_root: PathBuf::from("./pechas"),
                s3: None,
            },
            database: DatabaseConfig {
                url: "sqlite:./pecha.db".to_string(),
            },
            pedurma: PedurmaConfig {
                pecha_id: "P000792".to_string(),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        let backend = match env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "local".to_string())
            .to_lowercase()
            .as_str()
        {
            "s3" => StorageBackend::S3,
            _ => StorageBackend::Local,
        };

        // S3 credentials are only mandatory when the S3 backend is selected
        let s3 = match backend {
            StorageBackend::S3 => Some(S3Config {
                endpoint: env::var("S3_ENDPOINT")?,
                bucket: env::var("S3_BUCKET")?,
                access_key: env::var("S3_ACCESS_KEY")?,
                secret_key: env::var("S3_SECRET_KEY")?,
                region: env::var("S3_REGION").ok(),
                prefix: env::var("S3_PREFIX").unwrap_or_default(),
            }),
            StorageBackend::Local => None,
        };

        Ok(Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("SERVER_PORT")
                    .unwrap_or_else(|_| "8000".to_string())
                    .parse()
                    .unwrap_or(8000),
            },
            storage: StorageConfig {
                backend,
                opf_root: env::var("OPF_ROOT")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("./pechas")),
                s3,
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:./pecha.db".to_string()),
            },
            pedurma: PedurmaConfig {
                pecha_id: env::var("PEDURMA_PECHA_ID").unwrap_or_else(|_| "P000792".to_string()),
            },
        })
    }
}
