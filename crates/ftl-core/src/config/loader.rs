//! Configuration file discovery and loading

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{ConfigError, FtlConfig};

/// File names searched in each directory, in priority order.
pub const CONFIG_FILE_NAMES: [&str; 3] = ["ftl.toml", ".ftlrc.toml", ".ftlrc.json"];

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Finds and loads configuration files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Search `start_path` and its ancestors for a config file.
    pub fn auto_discover(start_path: &Path) -> Result<Option<PathBuf>> {
        let mut current = start_path
            .canonicalize()
            .map_err(|source| ConfigError::Read {
                path: start_path.to_path_buf(),
                source,
            })?;

        loop {
            for filename in CONFIG_FILE_NAMES {
                let config_path = current.join(filename);
                if config_path.is_file() {
                    debug!("Found config: {}", config_path.display());
                    return Ok(Some(config_path));
                }
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => break,
            }
        }

        Ok(None)
    }

    /// Load and validate one file; the format follows the extension.
    pub fn load_from_file(path: &Path) -> Result<FtlConfig> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => FtlConfig::from_toml_str(&content).map_err(|source| ConfigError::Toml {
                path: path.to_path_buf(),
                source,
            })?,
            Some("json") => FtlConfig::from_json_str(&content).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            })?,
            _ => {
                return Err(ConfigError::UnsupportedFormat {
                    path: path.to_path_buf(),
                });
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Load `custom_path` if given, else the discovered file, else defaults.
    pub fn load(custom_path: Option<&Path>, start_dir: Option<&Path>) -> Result<FtlConfig> {
        if let Some(path) = custom_path {
            if !path.exists() {
                return Err(ConfigError::NotFound {
                    path: path.to_path_buf(),
                });
            }
            return Self::load_from_file(path);
        }

        let search_dir = start_dir.unwrap_or_else(|| Path::new("."));
        match Self::auto_discover(search_dir)? {
            Some(path) => Self::load_from_file(&path),
            None => {
                debug!("No config file found, using defaults");
                Ok(FtlConfig::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_temp_config(dir: &Path, filename: &str, content: &str) -> PathBuf {
        let path = dir.join(filename);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_toml() {
        let temp_dir = TempDir::new().unwrap();
        let path = create_temp_config(
            temp_dir.path(),
            "ftl.toml",
            "[resolver]\nlocale = \"de\"\nuseIsolating = true\n",
        );
        let config = ConfigLoader::load_from_file(&path).unwrap();
        assert_eq!(config.resolver.locale, "de");
        assert!(config.resolver.use_isolating);
    }

    #[test]
    fn test_load_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = create_temp_config(
            temp_dir.path(),
            ".ftlrc.json",
            r#"{"serializer": {"withJunk": true}}"#,
        );
        let config = ConfigLoader::load_from_file(&path).unwrap();
        assert!(config.serializer.with_junk);
    }

    #[test]
    fn test_auto_discover_from_nested_dir() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("locales/en");
        fs::create_dir_all(&nested).unwrap();
        create_temp_config(temp_dir.path(), ".ftlrc.toml", "[limits]\nmaxDepth = 7\n");

        let found = ConfigLoader::auto_discover(&nested).unwrap().unwrap();
        assert!(found.ends_with(".ftlrc.toml"));
        let config = ConfigLoader::load(None, Some(&nested)).unwrap();
        assert_eq!(config.limits.max_depth, 7);
    }

    #[test]
    fn test_priority_order() {
        let temp_dir = TempDir::new().unwrap();
        create_temp_config(temp_dir.path(), ".ftlrc.json", "{}");
        create_temp_config(temp_dir.path(), "ftl.toml", "");
        let found = ConfigLoader::auto_discover(temp_dir.path()).unwrap().unwrap();
        assert!(found.ends_with("ftl.toml"));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = create_temp_config(temp_dir.path(), "ftl.toml", "[limits]\nmaxDepth = 0\n");
        assert!(matches!(
            ConfigLoader::load_from_file(&path),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn test_syntax_errors() {
        let temp_dir = TempDir::new().unwrap();
        let toml = create_temp_config(temp_dir.path(), "ftl.toml", "[limits\n");
        assert!(matches!(
            ConfigLoader::load_from_file(&toml),
            Err(ConfigError::Toml { .. })
        ));
        let json = create_temp_config(temp_dir.path(), ".ftlrc.json", "{");
        assert!(matches!(
            ConfigLoader::load_from_file(&json),
            Err(ConfigError::Json { .. })
        ));
    }

    #[test]
    fn test_missing_custom_path() {
        assert!(matches!(
            ConfigLoader::load(Some(Path::new("does/not/exist.toml")), None),
            Err(ConfigError::NotFound { .. })
        ));
    }
}
