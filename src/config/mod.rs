use crate::services::identity::IdentityMode;
use std::env;

/// Which record store backs the drop service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Sqlite,
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sqlite" | "database" | "db" => Ok(Self::Sqlite),
            "memory" | "mem" => Ok(Self::Memory),
            other => Err(format!("unknown store backend '{}'", other)),
        }
    }
}

/// Runtime configuration for the file drop
#[derive(Debug, Clone)]
pub struct DropConfig {
    /// Database URL for the sqlite backend (default: "sqlite://file-drop.db?mode=rwc")
    pub database_url: String,

    /// Listen address (default: "127.0.0.1:3000")
    pub bind_addr: String,

    /// How long a stored file stays retrievable, in seconds (default: 3600)
    pub retention_secs: u64,

    /// How callers are identified: "open", "password" or "session" (default: "session")
    pub identity_mode: IdentityMode,

    /// Salt mixed into password-derived identities
    pub identity_salt: String,

    /// Length of generated access codes (default: 8, never lower)
    pub access_code_length: usize,

    /// Maximum file size in bytes (default: 64 MB)
    pub max_file_size: usize,

    /// Background reap interval in seconds, 0 disables the timer (default: 300)
    pub reap_interval_secs: u64,

    /// Lifetime of the anonymous session cookie in days (default: 7)
    pub session_cookie_days: i64,

    /// Answer "not found" instead of "forbidden" for records owned by someone else
    pub hide_foreign_records: bool,

    /// Record store backend (default: sqlite)
    pub store_backend: StoreBackend,
}

const DEV_IDENTITY_SALT: &str = "rust-file-drop/dev-identity-salt";

/// Upper bound on the retention window (100 years), keeps timestamp math in range
const MAX_RETENTION_SECS: u64 = 100 * 365 * 24 * 60 * 60;

impl Default for DropConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://file-drop.db?mode=rwc".to_string(),
            bind_addr: "127.0.0.1:3000".to_string(),
            retention_secs: 3600,
            identity_mode: IdentityMode::Session,
            identity_salt: DEV_IDENTITY_SALT.to_string(),
            access_code_length: 8,
            max_file_size: 64 * 1024 * 1024, // 64 MB
            reap_interval_secs: 300,
            session_cookie_days: 7,
            hide_foreign_records: true,
            store_backend: StoreBackend::Sqlite,
        }
    }
}

impl DropConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup, falling back to
    /// defaults for missing or unparseable values
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let default = Self::default();

        Self {
            database_url: lookup("DATABASE_URL").unwrap_or(default.database_url),

            bind_addr: lookup("BIND_ADDR").unwrap_or(default.bind_addr),

            retention_secs: lookup("RETENTION_SECS")
                .and_then(|v| v.parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(default.retention_secs),

            identity_mode: lookup("IDENTITY_MODE")
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.identity_mode),

            identity_salt: lookup("IDENTITY_SALT")
                .filter(|v| !v.is_empty())
                .unwrap_or(default.identity_salt),

            access_code_length: lookup("ACCESS_CODE_LENGTH")
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.access_code_length),

            max_file_size: lookup("MAX_FILE_SIZE")
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_file_size),

            reap_interval_secs: lookup("REAP_INTERVAL_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.reap_interval_secs),

            session_cookie_days: lookup("SESSION_COOKIE_DAYS")
                .and_then(|v| v.parse().ok())
                .filter(|days| *days > 0)
                .unwrap_or(default.session_cookie_days),

            hide_foreign_records: lookup("HIDE_FOREIGN_RECORDS")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(default.hide_foreign_records),

            store_backend: lookup("STORE_BACKEND")
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.store_backend),
        }
    }

    /// Create config for development (in-memory store, frequent reaping)
    pub fn development() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            reap_interval_secs: 60,
            store_backend: StoreBackend::Memory,
            ..Self::default()
        }
    }

    /// Create config for production: environment values, sqlite store and
    /// hidden foreign records. Password mode refuses the development salt.
    pub fn production() -> anyhow::Result<Self> {
        Self::production_from_lookup(|key| env::var(key).ok())
    }

    pub fn production_from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self {
            store_backend: StoreBackend::Sqlite,
            hide_foreign_records: true,
            ..Self::from_lookup(lookup)
        };

        if config.identity_mode == IdentityMode::Password && config.uses_default_salt() {
            anyhow::bail!("IDENTITY_SALT must be set in production when IDENTITY_MODE=password");
        }

        Ok(config)
    }

    pub fn retention(&self) -> chrono::Duration {
        let secs = self.retention_secs.min(MAX_RETENTION_SECS);
        chrono::Duration::seconds(i64::try_from(secs).unwrap_or_default())
    }

    /// True when the production salt was never configured
    pub fn uses_default_salt(&self) -> bool {
        self.identity_salt == DEV_IDENTITY_SALT
    }
}
