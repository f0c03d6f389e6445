use clap::Parser;
use eyre::{bail, Result as EyreResult};
use tracing::info;
use versemark_server::start;
use versemark_store::config::StoreConfig;
use versemark_store::Store;
use versemark_store_rocksdb::RocksDB;

use crate::cli::RootArgs;
use crate::config::ConfigFile;

/// Run the annotation service
#[derive(Debug, Parser)]
pub struct RunCommand;

impl RunCommand {
    pub async fn run(self, root_args: &RootArgs) -> EyreResult<()> {
        let home = &root_args.home;

        if !ConfigFile::exists(home) {
            bail!("home {home} is not initialized, run `versemarkd init` first");
        }

        let config = ConfigFile::load(home)?;

        let store = Store::open::<RocksDB>(&StoreConfig::new(home.join(&config.data_dir)))?;

        info!(%home, "opened annotation database");

        start(config.server_config(), store).await
    }
}
