//! Engine configuration
//!
//! All settings load from environment variables with safe defaults:
//!
//! | Environment variable | Default | Purpose |
//! |----------------------|---------|---------|
//! | WORK_DIR | /var/lib/station | Work directory (database, scratchpad, logs) |
//! | REMOTE_BASE_URL | http://localhost:5000 | Remote catalog/order service |
//! | REQUEST_TIMEOUT_SECS | 10 | Remote request timeout |
//! | EXPIRY_SWEEP_INTERVAL_MS | 1000 | Ticket expiry sweep tick |
//! | PROMO_CHECK_INTERVAL_SECS | 3600 | Promotion day-gate re-evaluation |
//! | ENVIRONMENT | development | development \| staging \| production |

use std::path::PathBuf;

/// Engine configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Work directory for the database, scratchpad and logs
    pub work_dir: String,
    /// Base URL of the remote catalog/order service
    pub remote_base_url: String,
    /// Remote request timeout (seconds)
    pub request_timeout_secs: u64,
    /// Ticket expiry sweep interval (milliseconds)
    pub expiry_sweep_interval_ms: u64,
    /// Promotion day-gate re-evaluation interval (seconds)
    pub promo_check_interval_secs: u64,
    /// Running environment: development | staging | production
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/station".into()),
            remote_base_url: std::env::var("REMOTE_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:5000".into()),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            expiry_sweep_interval_ms: std::env::var("EXPIRY_SWEEP_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1000),
            promo_check_interval_secs: std::env::var("PROMO_CHECK_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3600),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
        }
    }

    /// Override the paths and remote endpoint; used by tests
    pub fn with_overrides(work_dir: impl Into<String>, remote_base_url: impl Into<String>) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.remote_base_url = remote_base_url.into();
        config
    }

    /// Path of the redb database file
    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database/station.redb")
    }

    /// Path of the scratchpad file
    pub fn scratchpad_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("scratchpad.json")
    }

    /// Create the work directory structure
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(PathBuf::from(&self.work_dir).join("database"))?;
        std::fs::create_dir_all(PathBuf::from(&self.work_dir).join("logs"))?;
        Ok(())
    }

    /// Whether this is a production deployment
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Whether this is a development deployment
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_derive_from_work_dir() {
        let config = Config::with_overrides("/tmp/station-test", "http://localhost:9999");
        assert_eq!(
            config.database_path(),
            PathBuf::from("/tmp/station-test/database/station.redb")
        );
        assert_eq!(
            config.scratchpad_path(),
            PathBuf::from("/tmp/station-test/scratchpad.json")
        );
    }
}
