use std::fs;
use std::net::SocketAddr;

use camino::Utf8PathBuf;
use clap::Parser;
use eyre::{bail, Result as EyreResult, WrapErr};
use tracing::info;
use versemark_server::config::DEFAULT_PORT;

use crate::cli::RootArgs;
use crate::config::ConfigFile;

/// Initialize a service home directory
#[derive(Debug, Parser)]
pub struct InitCommand {
    /// Address the service will listen on
    #[arg(long, value_name = "ADDR")]
    pub listen: Option<SocketAddr>,

    /// Overwrite an existing configuration
    #[arg(long)]
    pub force: bool,
}

impl InitCommand {
    pub fn run(self, root_args: &RootArgs) -> EyreResult<()> {
        let home = &root_args.home;

        fs::create_dir_all(home).wrap_err_with(|| format!("failed to create {home}"))?;

        if ConfigFile::exists(home) && !self.force {
            bail!("home {home} is already initialized, pass --force to overwrite");
        }

        let config = ConfigFile {
            listen: self
                .listen
                .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT))),
            data_dir: Utf8PathBuf::from("data"),
        };

        fs::create_dir_all(home.join(&config.data_dir))
            .wrap_err_with(|| format!("failed to create data dir under {home}"))?;

        config.save(home)?;

        info!(%home, listen = %config.listen, "initialized service home");

        Ok(())
    }
}
