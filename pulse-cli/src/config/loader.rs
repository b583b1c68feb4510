use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;

use super::types::{
    BackendSection, KernelConfig, PulseConfig, RawBackendConfig, RawPulseConfig, RawServerConfig,
    ServerSection,
};

/// Env var that relocates the project config directory
pub const PROJECT_CONFIG_DIR_ENV: &str = "PULSE_PROJECT_CONFIG_DIR";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load merged configuration (user + project)
    pub fn load() -> Result<PulseConfig> {
        Self::load_layers(
            Self::user_config_path().as_deref(),
            &Self::project_config_path(),
        )
    }

    /// Load configuration from explicit user and project file locations
    ///
    /// Missing files are skipped; a file that exists but does not parse is an error.
    pub fn load_layers(user: Option<&Path>, project: &Path) -> Result<PulseConfig> {
        let mut raw = RawPulseConfig::default();

        // Layer 1: User config
        if let Some(user_path) = user
            && user_path.exists()
        {
            raw = Self::merge_raw(raw, Self::read_raw(user_path)?);
        }

        // Layer 2: Project config
        if project.exists() {
            raw = Self::merge_raw(raw, Self::read_raw(project)?);
        }

        Ok(Self::finalize(raw))
    }

    /// Load a single config file on top of the defaults
    pub fn load_from_path(path: &Path) -> Result<PulseConfig> {
        if path.exists() {
            Ok(Self::finalize(Self::read_raw(path)?))
        } else {
            Ok(PulseConfig::default())
        }
    }

    /// Get user config path (platform-specific)
    pub fn user_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "pulse").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Get project config path
    /// Can be overridden with PULSE_PROJECT_CONFIG_DIR env var
    pub fn project_config_path() -> PathBuf {
        if let Ok(dir) = std::env::var(PROJECT_CONFIG_DIR_ENV) {
            PathBuf::from(dir).join("config.toml")
        } else {
            PathBuf::from(".pulse/config.toml")
        }
    }

    fn read_raw(path: &Path) -> Result<RawPulseConfig> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Merge two raw configs (overlay values override base only if explicitly set)
    fn merge_raw(base: RawPulseConfig, overlay: RawPulseConfig) -> RawPulseConfig {
        RawPulseConfig {
            server: RawServerConfig {
                host: overlay.server.host.or(base.server.host),
                port: overlay.server.port.or(base.server.port),
                static_dir: overlay.server.static_dir.or(base.server.static_dir),
            },
            backend: RawBackendConfig {
                base_url: overlay.backend.base_url.or(base.backend.base_url),
                verify_tls: overlay.backend.verify_tls.or(base.backend.verify_tls),
                token: overlay.backend.token.or(base.backend.token),
                timeout_secs: overlay.backend.timeout_secs.or(base.backend.timeout_secs),
            },
            kernel: KernelConfig {
                supported_version: overlay
                    .kernel
                    .supported_version
                    .or(base.kernel.supported_version),
            },
        }
    }

    /// Convert raw config to final config with defaults applied
    fn finalize(raw: RawPulseConfig) -> PulseConfig {
        let server = ServerSection::default();
        let backend = BackendSection::default();
        PulseConfig {
            server: ServerSection {
                host: raw.server.host.unwrap_or(server.host),
                port: raw.server.port.unwrap_or(server.port),
                static_dir: raw.server.static_dir.unwrap_or(server.static_dir),
            },
            backend: BackendSection {
                base_url: raw.backend.base_url.unwrap_or(backend.base_url),
                verify_tls: raw.backend.verify_tls.unwrap_or(backend.verify_tls),
                token: raw.backend.token,
                timeout_secs: raw.backend.timeout_secs.unwrap_or(backend.timeout_secs),
            },
            kernel: raw.kernel,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "{}", contents).unwrap();
        path
    }

    // ==================== Load Tests ====================

    #[test]
    fn test_load_nonexistent_returns_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nonexistent.toml");

        let config = ConfigLoader::load_from_path(&path).unwrap();

        assert_eq!(config.server.port, 8001);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.backend.timeout_secs, 30);
    }

    #[test]
    fn test_load_from_valid_toml() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_file(
            &temp_dir,
            "config.toml",
            r#"
[server]
port = 9999
static_dir = "/srv/pulse"

[backend]
base_url = "https://appliance.local/api"
verify_tls = true
token = "abc123"
"#,
        );

        let config = ConfigLoader::load_from_path(&path).unwrap();

        assert_eq!(config.server.port, 9999);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.static_dir, PathBuf::from("/srv/pulse"));
        assert_eq!(config.backend.base_url, "https://appliance.local/api");
        assert!(config.backend.verify_tls);
        assert_eq!(config.backend.token.as_deref(), Some("abc123"));
    }

    #[test]
    fn test_load_invalid_toml_returns_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_file(&temp_dir, "invalid.toml", "this is not valid toml {{{{");

        let result = ConfigLoader::load_from_path(&path);
        assert!(result.is_err());
    }

    #[test]
    fn test_project_layer_overrides_user_layer() {
        let temp_dir = TempDir::new().unwrap();
        let user = write_file(
            &temp_dir,
            "user.toml",
            "[server]\nhost = \"0.0.0.0\"\nport = 9000\n\n[kernel]\nsupported_version = \"4.12\"\n",
        );
        let project = write_file(&temp_dir, "project.toml", "[server]\nport = 9100\n");

        let config = ConfigLoader::load_layers(Some(&user), &project).unwrap();

        assert_eq!(config.server.port, 9100);
        // Unset in the project layer, so the user value survives
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.kernel.supported_version.as_deref(), Some("4.12"));
    }

    #[test]
    fn test_load_layers_missing_files_use_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.toml");

        let config = ConfigLoader::load_layers(None, &missing).unwrap();

        assert_eq!(config.server.port, 8001);
        assert_eq!(config.backend.base_url, "https://localhost/api");
    }

    #[test]
    fn test_merge_raw_none_preserves_base() {
        let base = RawPulseConfig {
            server: RawServerConfig {
                host: Some("0.0.0.0".to_string()),
                port: Some(9000),
                static_dir: None,
            },
            backend: RawBackendConfig {
                timeout_secs: Some(10),
                ..Default::default()
            },
            kernel: KernelConfig::default(),
        };

        let merged = ConfigLoader::merge_raw(base, RawPulseConfig::default());

        assert_eq!(merged.server.host, Some("0.0.0.0".to_string()));
        assert_eq!(merged.server.port, Some(9000));
        assert_eq!(merged.backend.timeout_secs, Some(10));
    }

    #[test]
    fn test_user_config_path_returns_some() {
        let path = ConfigLoader::user_config_path();
        assert!(path.is_some());
        let path = path.unwrap();
        assert!(path.to_string_lossy().contains("pulse"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    #[serial]
    fn test_project_config_path() {
        // SAFETY: serialized with the other env-mutating test
        unsafe { std::env::remove_var(PROJECT_CONFIG_DIR_ENV) };
        let path = ConfigLoader::project_config_path();
        assert_eq!(path, PathBuf::from(".pulse/config.toml"));
    }

    #[test]
    #[serial]
    fn test_project_config_path_env_override() {
        // SAFETY: serialized with the other env-mutating test
        unsafe { std::env::set_var(PROJECT_CONFIG_DIR_ENV, "/tmp/pulse-e2e") };
        let path = ConfigLoader::project_config_path();
        unsafe { std::env::remove_var(PROJECT_CONFIG_DIR_ENV) };

        assert_eq!(path, PathBuf::from("/tmp/pulse-e2e/config.toml"));
    }
}
