use anyhow::{Context, Result};
use directories::BaseDirs;
use std::path::PathBuf;

/// Directory name under the home directory where pip looks for its legacy config
const PIP_DIR_NAME: &str = ".pip";

/// All computed paths used by chpip
#[derive(Debug, Clone)]
pub struct Paths {
    /// ~/.pip
    pub pip_dir: PathBuf,
    /// ~/.pip/pip.conf
    pub pip_conf: PathBuf,
    /// ~/.pip/.chpip.yml
    pub registry_file: PathBuf,
}

impl Paths {
    pub fn new() -> Result<Self> {
        let base_dirs = BaseDirs::new().context("Failed to determine home directory")?;
        Ok(Self::in_dir(base_dirs.home_dir().join(PIP_DIR_NAME)))
    }

    /// Lay out all files inside an explicit pip config directory
    pub fn in_dir(pip_dir: impl Into<PathBuf>) -> Self {
        let pip_dir = pip_dir.into();
        let pip_conf = pip_dir.join("pip.conf");
        let registry_file = pip_dir.join(".chpip.yml");

        Self {
            pip_dir,
            pip_conf,
            registry_file,
        }
    }

    /// Ensure the pip config directory exists
    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(&self.pip_dir).with_context(|| {
            format!("Failed to create pip config directory: {:?}", self.pip_dir)
        })?;
        Ok(())
    }
}
