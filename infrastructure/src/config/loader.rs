//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

const PROJECT_FILES: [&str; 2] = ["stagegate.toml", ".stagegate.toml"];
const ENV_PREFIX: &str = "STAGEGATE_";

/// One configuration source and whether it was found
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigSource {
    pub label: &'static str,
    pub location: String,
    pub found: bool,
}

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. Environment: `STAGEGATE_<SECTION>__<KEY>`
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./stagegate.toml` or `./.stagegate.toml`
    /// 4. Global: `$XDG_CONFIG_HOME/stagegate/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&PathBuf>) -> Result<FileConfig, Box<figment::Error>> {
        let global = Self::global_config_path();
        let project = Self::project_config_path();
        Self::load_from(
            global.as_deref(),
            project.as_deref(),
            config_path.map(PathBuf::as_path),
        )
    }

    /// Load from explicit file locations; missing global or project files are skipped
    pub fn load_from(
        global: Option<&Path>,
        project: Option<&Path>,
        explicit: Option<&Path>,
    ) -> Result<FileConfig, Box<figment::Error>> {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(path) = global.filter(|p| p.exists()) {
            figment = figment.merge(Toml::file(path));
        }
        if let Some(path) = project.filter(|p| p.exists()) {
            figment = figment.merge(Toml::file(path));
        }
        // An explicit path that does not exist is an error
        if let Some(path) = explicit {
            figment = figment.merge(Toml::file_exact(path));
        }

        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(Box::new)
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// Get the global config file path
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("stagegate").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Config file locations in priority order, for `show-config`
    pub fn config_sources(explicit: Option<&PathBuf>) -> Vec<ConfigSource> {
        let mut sources = Vec::new();

        sources.push(ConfigSource {
            label: "Env",
            location: format!("{}*", ENV_PREFIX),
            found: std::env::vars().any(|(key, _)| key.starts_with(ENV_PREFIX)),
        });
        if let Some(path) = explicit {
            sources.push(ConfigSource {
                label: "Explicit",
                location: path.display().to_string(),
                found: path.exists(),
            });
        }
        sources.push(match Self::project_config_path() {
            Some(path) => ConfigSource {
                label: "Project",
                location: path.display().to_string(),
                found: true,
            },
            None => ConfigSource {
                label: "Project",
                location: "./stagegate.toml or ./.stagegate.toml".to_string(),
                found: false,
            },
        });
        if let Some(path) = Self::global_config_path() {
            sources.push(ConfigSource {
                label: "Global",
                found: path.exists(),
                location: path.display().to_string(),
            });
        }
        sources.push(ConfigSource {
            label: "Default",
            location: "built-in defaults".to_string(),
            found: true,
        });
        sources
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert!(config.evaluation.backends.is_empty());
        assert!(config.output.color);
    }

    #[test]
    fn test_global_config_path_returns_some() {
        let path = ConfigLoader::global_config_path();
        assert!(path.is_some());
        assert!(path.unwrap().to_string_lossy().contains("stagegate"));
    }

    #[test]
    fn test_layers_override_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("global.toml");
        let project = dir.path().join("stagegate.toml");
        let explicit = dir.path().join("explicit.toml");

        fs::write(
            &global,
            "[evaluation]\nbackends = [\"a\"]\ntemperature = 0.1\nmax_tokens = 100\n",
        )
        .unwrap();
        fs::write(&project, "[evaluation]\ntemperature = 0.2\n").unwrap();
        fs::write(&explicit, "[evaluation]\nmax_tokens = 300\n").unwrap();

        let config = ConfigLoader::load_from(
            Some(global.as_path()),
            Some(project.as_path()),
            Some(explicit.as_path()),
        )
        .unwrap();
        assert_eq!(config.evaluation.backends, ["a"]);
        assert_eq!(config.evaluation.temperature, 0.2);
        assert_eq!(config.evaluation.max_tokens, 300);
        // Untouched sections keep their defaults
        assert_eq!(config.store.directory, PathBuf::from("projects"));
    }

    #[test]
    fn test_missing_optional_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("nope.toml");
        let project = dir.path().join("also-nope.toml");
        let config =
            ConfigLoader::load_from(Some(global.as_path()), Some(project.as_path()), None).unwrap();
        assert_eq!(config.evaluation.max_tokens, 2000);
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let explicit = dir.path().join("nope.toml");
        let result = ConfigLoader::load_from(None, None, Some(explicit.as_path()));
        assert!(result.is_err());
    }

    #[test]
    fn test_config_sources_end_with_defaults() {
        let sources = ConfigLoader::config_sources(None);
        assert_eq!(sources.first().map(|s| s.label), Some("Env"));
        assert_eq!(sources.last().map(|s| s.label), Some("Default"));
        assert!(sources.iter().all(|s| s.label != "Explicit"));
    }
}
