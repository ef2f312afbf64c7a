use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    /// Maximum upload size in bytes
    pub max_upload_size: u64,
    /// Edge length of generated QR codes in pixels
    pub qr_size: u32,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_address: String,
    /// Absolute base for share links, e.g. `https://drop.lan`. When unset,
    /// links are built from the request's Host header.
    pub public_base_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Flat directory holding uploaded objects
    pub upload_dir: String,
    /// JSON snapshot of the snippet store
    pub snapshot_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8090".to_string(),
            public_base_url: None,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: "./uploads".to_string(),
            snapshot_path: "./snippets.json".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            max_upload_size: 10 * 1024 * 1024, // 10MB
            qr_size: 256,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = Config::default();

        let bind_address =
            std::env::var("BIND_ADDRESS").unwrap_or(defaults.server.bind_address);

        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .ok()
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty());

        let upload_dir = std::env::var("UPLOAD_DIR").unwrap_or(defaults.storage.upload_dir);

        let snapshot_path =
            std::env::var("SNAPSHOT_PATH").unwrap_or(defaults.storage.snapshot_path);

        let max_upload_size = match std::env::var("MAX_UPLOAD_SIZE") {
            Ok(raw) => parse_number("MAX_UPLOAD_SIZE", &raw)?,
            Err(_) => defaults.max_upload_size,
        };

        let qr_size = match std::env::var("QR_SIZE") {
            Ok(raw) => parse_number("QR_SIZE", &raw)?,
            Err(_) => defaults.qr_size,
        };

        let config = Config {
            server: ServerConfig {
                bind_address,
                public_base_url,
            },
            storage: StorageConfig {
                upload_dir,
                snapshot_path,
            },
            max_upload_size,
            qr_size,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_upload_size == 0 {
            return Err(ConfigError::ValidationError(
                "MAX_UPLOAD_SIZE must be greater than 0".to_string(),
            ));
        }

        let snapshot = std::path::Path::new(&self.storage.snapshot_path);
        if snapshot.file_name().is_none() {
            return Err(ConfigError::ValidationError(format!(
                "SNAPSHOT_PATH must name a file, got {:?}",
                self.storage.snapshot_path
            )));
        }

        if let Some(ref base) = self.server.public_base_url {
            if !base.starts_with("http://") && !base.starts_with("https://") {
                return Err(ConfigError::ValidationError(format!(
                    "PUBLIC_BASE_URL must start with http:// or https://, got {base:?}"
                )));
            }
        }

        // Version 1 QR symbols are 21 modules wide.
        if self.qr_size < 21 {
            return Err(ConfigError::ValidationError(format!(
                "QR_SIZE must be at least 21 pixels, got {}",
                self.qr_size
            )));
        }

        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| {
        ConfigError::ValidationError(format!("{name} must be a positive integer, got {raw:?}"))
    })
}
