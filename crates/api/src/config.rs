use tabforge_pipeline::worker::{DEFAULT_QUEUE_CAPACITY, DEFAULT_WORKERS};

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Directory artifacts are written to (default: `./artifacts`).
    pub artifact_root: String,
    /// Number of concurrent pipeline workers (default: `2`).
    pub workers: usize,
    /// Capacity of the pending-job queue (default: `8`).
    pub queue_capacity: usize,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                 |
    /// |------------------------|-------------------------|
    /// | `HOST`                 | `0.0.0.0`               |
    /// | `PORT`                 | `3000`                  |
    /// | `ARTIFACT_ROOT`        | `./artifacts`           |
    /// | `WORKERS`              | `2`                     |
    /// | `QUEUE_CAPACITY`       | `8`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                    |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let artifact_root =
            std::env::var("ARTIFACT_ROOT").unwrap_or_else(|_| "./artifacts".into());

        let workers: usize = std::env::var("WORKERS")
            .unwrap_or_else(|_| DEFAULT_WORKERS.to_string())
            .parse()
            .expect("WORKERS must be a valid usize");

        let queue_capacity: usize = std::env::var("QUEUE_CAPACITY")
            .unwrap_or_else(|_| DEFAULT_QUEUE_CAPACITY.to_string())
            .parse()
            .expect("QUEUE_CAPACITY must be a valid usize");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            artifact_root,
            workers,
            queue_capacity,
            cors_origins,
            request_timeout_secs,
        }
    }
}
