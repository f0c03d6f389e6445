use std::fs;
use std::net::SocketAddr;

use camino::{Utf8Path, Utf8PathBuf};
use eyre::{Result as EyreResult, WrapErr};
use serde::{Deserialize, Serialize};
use versemark_server::config::ServerConfig;

pub const CONFIG_FILE: &str = "config.toml";

/// On-disk service configuration, one `config.toml` per home directory.
#[derive(Debug, Deserialize, Serialize)]
pub struct ConfigFile {
    pub listen: SocketAddr,
    /// Database location, relative to the home directory.
    pub data_dir: Utf8PathBuf,
}

impl ConfigFile {
    #[must_use]
    pub fn exists(dir: &Utf8Path) -> bool {
        dir.join(CONFIG_FILE).is_file()
    }

    pub fn load(dir: &Utf8Path) -> EyreResult<Self> {
        let path = dir.join(CONFIG_FILE);
        let raw = fs::read_to_string(&path).wrap_err_with(|| format!("failed to read {path}"))?;

        toml::from_str(&raw).wrap_err_with(|| format!("failed to parse {path}"))
    }

    pub fn save(&self, dir: &Utf8Path) -> EyreResult<()> {
        let path = dir.join(CONFIG_FILE);
        let raw = toml::to_string_pretty(self)?;

        fs::write(&path, raw).wrap_err_with(|| format!("failed to write {path}"))
    }

    #[must_use]
    pub const fn server_config(&self) -> ServerConfig {
        ServerConfig::new(self.listen)
    }
}
