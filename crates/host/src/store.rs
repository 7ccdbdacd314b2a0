//! File-backed configuration store
//!
//! Stand-in persistence boundary for hosts that only provide a directory.
//! Each plugin gets a single document at `{config_dir}/{internal_name}.toml`.

use std::io;
use std::path::{Path, PathBuf};

use dynamis_sdk::PluginInterface;

use crate::error::{HostError, HostResult};

/// Returns the path for a plugin's config document.
///
/// Path: `{config_dir}/{internal_name}.toml`
pub fn plugin_config_path(config_dir: &Path, internal_name: &str) -> PathBuf {
    config_dir.join(format!("{}.toml", internal_name))
}

/// [`PluginInterface`] storing the configuration document in a file
#[derive(Debug, Clone)]
pub struct FileConfigStore {
    internal_name: String,
    config_dir: PathBuf,
    path: PathBuf,
}

impl FileConfigStore {
    /// Create a store rooted at `config_dir`
    ///
    /// The directory does not need to exist yet; it is created on first save.
    pub fn new(config_dir: impl Into<PathBuf>, internal_name: &str) -> HostResult<Self> {
        let config_dir = config_dir.into();

        if config_dir.as_os_str().is_empty() || config_dir.is_file() {
            return Err(HostError::InvalidConfigDirectory(config_dir));
        }
        if internal_name.is_empty() || internal_name.contains(['/', '\\']) {
            return Err(HostError::InvalidInternalName(internal_name.to_string()));
        }

        let path = plugin_config_path(&config_dir, internal_name);
        Ok(Self {
            internal_name: internal_name.to_string(),
            config_dir,
            path,
        })
    }

    /// Full path of the config document
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PluginInterface for FileConfigStore {
    fn internal_name(&self) -> &str {
        &self.internal_name
    }

    fn config_directory(&self) -> &Path {
        &self.config_dir
    }

    fn load_config(&self) -> io::Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => {
                tracing::debug!("Loaded config document from {:?}", self.path);
                Ok(Some(content))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn save_config(&self, document: &str) -> io::Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::write(&self.path, document)?;
        tracing::debug!("Saved config document to {:?}", self.path);
        Ok(())
    }
}
