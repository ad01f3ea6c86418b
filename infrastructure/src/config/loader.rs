//! Configuration file loader with multi-source merging

use super::error::ConfigLoadError;
use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};
use tracing::debug;

const PROJECT_FILENAMES: [&str; 2] = ["udc.toml", ".udc.toml"];

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables: `UDC_SETTINGS__MAX_ATTEMPTS=5`
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./udc.toml` or `./.udc.toml`
    /// 4. XDG config: `$XDG_CONFIG_HOME/udc/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&Path>) -> Result<FileConfig, ConfigLoadError> {
        Self::load_from(
            Self::global_config_path().as_deref(),
            Path::new("."),
            config_path,
        )
    }

    fn load_from(
        global_path: Option<&Path>,
        project_dir: &Path,
        config_path: Option<&Path>,
    ) -> Result<FileConfig, ConfigLoadError> {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global_path) = global_path
            && global_path.exists()
        {
            debug!(path = %global_path.display(), "Merging global config");
            figment = figment.merge(Toml::file(global_path));
        }

        if let Some(project_path) = Self::find_project_config(project_dir) {
            debug!(path = %project_path.display(), "Merging project config");
            figment = figment.merge(Toml::file(project_path));
        }

        if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigLoadError::NotFound(path.to_path_buf()));
            }
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed("UDC_").split("__"));

        Ok(figment.extract()?)
    }

    /// Get the global config file path
    ///
    /// Returns XDG_CONFIG_HOME/udc/config.toml if set,
    /// otherwise falls back to ~/.config/udc/config.toml
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("udc").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        Self::find_project_config(Path::new("."))
    }

    fn find_project_config(dir: &Path) -> Option<PathBuf> {
        PROJECT_FILENAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
    }

    /// Print the config file locations being used (for debugging)
    pub fn print_config_sources(config_path: Option<&Path>) {
        println!("Configuration sources (in priority order):");
        println!("  [ENV  ] UDC_* variables");

        if let Some(path) = config_path {
            let mark = if path.exists() { "FOUND" } else { "MISSING" };
            println!("  [{mark}] Explicit: {}", path.display());
        }

        if let Some(path) = Self::project_config_path() {
            println!("  [FOUND] Project: {}", path.display());
        } else {
            println!("  [     ] Project: ./udc.toml or ./.udc.toml");
        }

        if let Some(path) = Self::global_config_path() {
            if path.exists() {
                println!("  [FOUND] Global:  {}", path.display());
            } else {
                println!("  [     ] Global:  {}", path.display());
            }
        }

        println!("  [     ] Default: built-in defaults");
    }
}
