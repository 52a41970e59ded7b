use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Minimum length of the HMAC key used to sign session tokens.
pub const MIN_SESSION_SECRET_LEN: usize = 32;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub security: SecurityConfig,

    pub totp: TotpConfig,

    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_url: String,

    pub log_level: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    /// Maximum database connections (default: 5)
    pub max_db_connections: u32,

    /// Minimum database connections (default: 1)
    pub min_db_connections: u32,

    /// How long a request may wait for a pooled connection
    pub db_acquire_timeout_seconds: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite:data/entrygate.db".to_string(),
            log_level: "info".to_string(),
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
            db_acquire_timeout_seconds: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,

    pub port: u16,

    pub cors_allowed_origins: Vec<String>,

    /// Whether to set the Secure flag on session cookies.
    /// Set to false for local development without HTTPS.
    pub secure_cookies: bool,

    /// Upper bound on the handling time of a single request.
    pub request_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8080,
            cors_allowed_origins: vec![
                "http://localhost:8080".to_string(),
                "http://127.0.0.1:8080".to_string(),
            ],
            secure_cookies: true,
            request_timeout_seconds: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Argon2 memory cost in KiB (default: 8192 = 8MB)
    pub argon2_memory_cost_kib: u32,

    /// Argon2 time cost (iterations)
    pub argon2_time_cost: u32,

    /// Argon2 parallelism (default: 1)
    pub argon2_parallelism: u32,

    /// HMAC key for admin session tokens. Prefer `ENTRYGATE_SESSION_SECRET`.
    pub session_secret: String,

    pub session_ttl_hours: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            argon2_memory_cost_kib: 8192,
            argon2_time_cost: 3,
            argon2_parallelism: 1,
            session_secret: String::new(),
            session_ttl_hours: 24,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TotpConfig {
    /// Issuer shown by authenticator apps
    pub issuer: String,

    pub digits: usize,

    pub step_seconds: u64,

    /// Adjacent time steps accepted on either side of the current one
    pub skew: u8,
}

impl Default for TotpConfig {
    fn default() -> Self {
        Self {
            issuer: "EntryGate".to_string(),
            digits: 6,
            step_seconds: 30,
            skew: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,

    /// Emit logs as JSON lines instead of the human format
    pub json_logs: bool,

    pub loki_enabled: bool,

    pub loki_url: String,

    /// Value of the `env` field attached to every Loki entry
    pub environment: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
            json_logs: false,
            loki_enabled: false,
            loki_url: "http://localhost:3100".to_string(),
            environment: "development".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        let mut config = None;
        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                config = Some(Self::load_from_path(path)?);
                break;
            }
        }

        let mut config = config.unwrap_or_else(|| {
            info!("No config file found, using defaults");
            Self::default()
        });
        config.apply_env_overrides()?;
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    /// Environment variables win over the file.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(url) = std::env::var("ENTRYGATE_DATABASE_URL") {
            self.general.database_url = url;
        }

        if let Ok(secret) =
            std::env::var("ENTRYGATE_SESSION_SECRET").or_else(|_| std::env::var("JWT_SECRET"))
        {
            self.security.session_secret = secret;
        }

        if let Ok(port) = std::env::var("ENTRYGATE_PORT") {
            self.server.port = port
                .parse()
                .with_context(|| format!("Invalid ENTRYGATE_PORT: {port}"))?;
        }

        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![Self::default_config_path()];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("entrygate").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".entrygate").join("config.toml"));
        }

        paths
    }

    #[must_use]
    pub fn default_config_path() -> PathBuf {
        PathBuf::from("entrygate.toml")
    }

    /// Writes a default config with a freshly generated session secret.
    pub fn create_default_if_missing(path: &Path) -> Result<bool> {
        if path.exists() {
            return Ok(false);
        }

        let mut config = Self::default();
        config.security.session_secret = generate_session_secret()?;
        config.save_to_path(path)?;
        info!("Created default config file: {}", path.display());
        Ok(true)
    }

    pub fn validate(&self) -> Result<()> {
        if self.security.session_secret.len() < MIN_SESSION_SECRET_LEN {
            anyhow::bail!(
                "Session secret must be at least {MIN_SESSION_SECRET_LEN} characters \
                 (set ENTRYGATE_SESSION_SECRET or security.session_secret)"
            );
        }

        if self.security.session_ttl_hours == 0 {
            anyhow::bail!("security.session_ttl_hours must be > 0");
        }

        if self.totp.step_seconds == 0 {
            anyhow::bail!("totp.step_seconds must be > 0");
        }

        if !(6..=8).contains(&self.totp.digits) {
            anyhow::bail!("totp.digits must be between 6 and 8");
        }

        if self.totp.issuer.is_empty() || self.totp.issuer.contains(':') {
            anyhow::bail!("totp.issuer must be non-empty and must not contain ':'");
        }

        if self.observability.loki_enabled && self.observability.environment.is_empty() {
            anyhow::bail!("observability.environment must be set when Loki is enabled");
        }

        if self.server.request_timeout_seconds == 0 {
            anyhow::bail!("server.request_timeout_seconds must be > 0");
        }

        Ok(())
    }
}

fn generate_session_secret() -> Result<String> {
    use base64::Engine;
    use rand::TryRngCore;

    let mut bytes = [0u8; 48];
    rand::rngs::OsRng
        .try_fill_bytes(&mut bytes)
        .context("OS randomness unavailable")?;
    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
}
