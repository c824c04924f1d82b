//! Configuration surface: the options the core recognizes, loaded as an
//! explicit value and threaded into construction rather than read from
//! ambient global state.
//!
//! Priority, low to high: built-in defaults, `~/.resolvecore/config.toml`,
//! then `RESOLVER_*` environment variables — the same layering this
//! codebase uses for its own global configuration file.

use crate::error::ResolverError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The four options the core recognizes. `release_packages_path` and
/// `local_packages_path` are consumed only by the external binding tool
/// (out of scope here) but are still parsed and carried so a config file
/// shared between the core and that tool round-trips cleanly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    pub resolve_caching: bool,
    pub prune_failed_graph: bool,
    pub release_packages_path: Option<PathBuf>,
    pub local_packages_path: Option<PathBuf>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            resolve_caching: true,
            prune_failed_graph: false,
            release_packages_path: None,
            local_packages_path: None,
        }
    }
}

impl ResolverConfig {
    /// Default location: `~/.resolvecore/config.toml` (platform path via
    /// [`dirs::home_dir`]), overridable with `RESOLVER_CONFIG_PATH`.
    pub fn default_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("RESOLVER_CONFIG_PATH") {
            return Some(PathBuf::from(path));
        }
        dirs::home_dir().map(|home| home.join(".resolvecore").join("config.toml"))
    }

    /// Loads defaults, merges a config file if present, then applies
    /// environment overrides. Never errors on a missing file — only a
    /// present-but-unparseable file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ResolverError> {
        let mut config = match path.map(Path::to_path_buf).or_else(Self::default_path) {
            Some(path) if path.is_file() => {
                let text = std::fs::read_to_string(&path)?;
                toml::from_str(&text)?
            }
            _ => Self::default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Some(v) = env_bool("RESOLVER_RESOLVE_CACHING") {
            self.resolve_caching = v;
        }
        if let Some(v) = env_bool("RESOLVER_PRUNE_FAILED_GRAPH") {
            self.prune_failed_graph = v;
        }
        if let Ok(v) = std::env::var("RESOLVER_RELEASE_PACKAGES_PATH") {
            self.release_packages_path = Some(PathBuf::from(v));
        }
        if let Ok(v) = std::env::var("RESOLVER_LOCAL_PACKAGES_PATH") {
            self.local_packages_path = Some(PathBuf::from(v));
        }
    }
}

fn env_bool(name: &str) -> Option<bool> {
    std::env::var(name).ok().and_then(|v| match v.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    })
}
