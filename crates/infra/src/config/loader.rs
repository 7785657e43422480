//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `SALESBRIDGE_ERP_BASE_URL`: ERP base URL (optional, defaults to the
//!   sandbox endpoint)
//! - `SALESBRIDGE_ERP_SERVICE_TOKEN`: service token login header
//! - `SALESBRIDGE_ERP_APP_KEY`: application key login header
//! - `SALESBRIDGE_ERP_USERNAME`: service account username
//! - `SALESBRIDGE_ERP_PASSWORD`: service account password
//!
//! Client and listing tunables always start from their defaults when
//! loading from the environment; use a config file to override them.
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.json` or `./config.toml` (current working directory)
//! 2. `./salesbridge.json` or `./salesbridge.toml`
//! 3. Parent directories (up to 2 levels)
//! 4. Relative to executable location

use std::path::{Path, PathBuf};

use salesbridge_domain::{
    constants, ClientConfig, Config, ErpConfig, ListingConfig, Result, SalesbridgeError,
};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `SalesbridgeError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Required fields are missing
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// All required variables must be present; see the module documentation
/// for the complete list.
///
/// # Errors
/// Returns `SalesbridgeError::Config` if required variables are missing.
pub fn load_from_env() -> Result<Config> {
    let base_url = std::env::var("SALESBRIDGE_ERP_BASE_URL")
        .unwrap_or_else(|_| constants::DEFAULT_ERP_BASE_URL.to_string());
    let service_token = env_var("SALESBRIDGE_ERP_SERVICE_TOKEN")?;
    let app_key = env_var("SALESBRIDGE_ERP_APP_KEY")?;
    let username = env_var("SALESBRIDGE_ERP_USERNAME")?;
    let password = env_var("SALESBRIDGE_ERP_PASSWORD")?;

    Ok(Config {
        erp: ErpConfig { base_url, service_token, app_key, username, password },
        client: ClientConfig::default(),
        listing: ListingConfig::default(),
    })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `SalesbridgeError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(SalesbridgeError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            SalesbridgeError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| SalesbridgeError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| SalesbridgeError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| SalesbridgeError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(SalesbridgeError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(vec![
            cwd.join("config.json"),
            cwd.join("config.toml"),
            cwd.join("salesbridge.json"),
            cwd.join("salesbridge.toml"),
            cwd.join("../config.json"),
            cwd.join("../config.toml"),
            cwd.join("../../config.json"),
            cwd.join("../../config.toml"),
        ]);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(vec![
                exe_dir.join("config.json"),
                exe_dir.join("config.toml"),
                exe_dir.join("salesbridge.json"),
                exe_dir.join("salesbridge.toml"),
            ]);
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        SalesbridgeError::Config(format!("Missing required environment variable: {key}"))
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use once_cell::sync::Lazy;
    use tempfile::NamedTempFile;

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const ENV_KEYS: [&str; 5] = [
        "SALESBRIDGE_ERP_BASE_URL",
        "SALESBRIDGE_ERP_SERVICE_TOKEN",
        "SALESBRIDGE_ERP_APP_KEY",
        "SALESBRIDGE_ERP_USERNAME",
        "SALESBRIDGE_ERP_PASSWORD",
    ];

    fn clear_env() {
        for key in ENV_KEYS {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn loads_from_env_when_all_vars_set() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("SALESBRIDGE_ERP_BASE_URL", "https://erp.example.com");
        std::env::set_var("SALESBRIDGE_ERP_SERVICE_TOKEN", "svc-token");
        std::env::set_var("SALESBRIDGE_ERP_APP_KEY", "app-key");
        std::env::set_var("SALESBRIDGE_ERP_USERNAME", "svc-user");
        std::env::set_var("SALESBRIDGE_ERP_PASSWORD", "secret");

        let config = load_from_env().expect("config should load from env");
        assert_eq!(config.erp.base_url, "https://erp.example.com");
        assert_eq!(config.erp.username, "svc-user");
        assert_eq!(config.client.request_max_attempts, 3);
        assert_eq!(config.listing.enrichment_group_size, 5);

        clear_env();
    }

    #[test]
    fn base_url_defaults_to_the_sandbox_endpoint() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("SALESBRIDGE_ERP_SERVICE_TOKEN", "t");
        std::env::set_var("SALESBRIDGE_ERP_APP_KEY", "k");
        std::env::set_var("SALESBRIDGE_ERP_USERNAME", "u");
        std::env::set_var("SALESBRIDGE_ERP_PASSWORD", "p");

        let config = load_from_env().expect("config should load from env");
        assert_eq!(config.erp.base_url, constants::DEFAULT_ERP_BASE_URL);

        clear_env();
    }

    #[test]
    fn fails_when_a_required_var_is_missing() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("SALESBRIDGE_ERP_SERVICE_TOKEN", "t");

        let result = load_from_env();
        assert!(matches!(result, Err(SalesbridgeError::Config(_))));

        clear_env();
    }

    #[test]
    fn loads_from_json_file() {
        let json_content = r#"{
            "erp": {
                "base_url": "https://erp.example.com",
                "service_token": "svc",
                "app_key": "key",
                "username": "user",
                "password": "pass"
            },
            "client": {
                "request_timeout_secs": 20
            },
            "listing": {
                "enrichment_group_size": 10
            }
        }"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(json_content.as_bytes()).unwrap();
        let path = temp_file.path().with_extension("json");
        std::fs::copy(temp_file.path(), &path).unwrap();

        let config = load_from_file(Some(path.clone())).expect("JSON config should load");
        assert_eq!(config.erp.base_url, "https://erp.example.com");
        assert_eq!(config.client.request_timeout_secs, 20);
        // Unspecified tunables keep their defaults.
        assert_eq!(config.client.request_max_attempts, 3);
        assert_eq!(config.listing.enrichment_group_size, 10);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn loads_from_toml_file() {
        let toml_content = r#"
[erp]
base_url = "https://erp.example.com"
service_token = "svc"
app_key = "key"
username = "user"
password = "pass"

[client]
backoff_step_ms = 50

[listing]
group_pause_ms = 10
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        let path = temp_file.path().with_extension("toml");
        std::fs::copy(temp_file.path(), &path).unwrap();

        let config = load_from_file(Some(path.clone())).expect("TOML config should load");
        assert_eq!(config.client.backoff_step_ms, 50);
        assert_eq!(config.listing.group_pause_ms, 10);
        assert_eq!(config.listing.item_save_pause_ms, 200);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let result = load_from_file(Some(PathBuf::from("/nonexistent/config.json")));
        assert!(matches!(result, Err(SalesbridgeError::Config(_))));
    }

    #[test]
    fn invalid_json_is_a_config_error() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(br#"{ "erp": "#).unwrap();
        let path = temp_file.path().with_extension("json");
        std::fs::copy(temp_file.path(), &path).unwrap();

        let result = load_from_file(Some(path.clone()));
        assert!(matches!(result, Err(SalesbridgeError::Config(_))));

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let result = parse_config("anything", &PathBuf::from("config.yaml"));
        assert!(matches!(result, Err(SalesbridgeError::Config(_))));
    }
}
