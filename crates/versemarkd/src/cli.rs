use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use eyre::Result as EyreResult;

use crate::defaults;

mod init;
mod run;

use init::InitCommand;
use run::RunCommand;

pub const EXAMPLES: &str = r"
  # Initialize a new service home
  $ versemarkd --home data/ init

  # Initialize with a custom listen address
  $ versemarkd --home data/ init --listen 0.0.0.0:3380

  # Run the annotation service
  $ versemarkd --home data/ run
";

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(after_help = EXAMPLES)]
pub struct RootCommand {
    #[command(flatten)]
    pub args: RootArgs,

    #[command(subcommand)]
    pub action: SubCommands,
}

#[derive(Debug, Subcommand)]
pub enum SubCommands {
    Init(InitCommand),
    #[command(alias = "up")]
    Run(RunCommand),
}

#[derive(Debug, Parser)]
pub struct RootArgs {
    /// Directory for config and data
    #[arg(long, value_name = "PATH", default_value_t = defaults::default_home_dir())]
    #[arg(env = "VERSEMARK_HOME", hide_env_values = true)]
    pub home: Utf8PathBuf,
}

impl RootCommand {
    pub async fn run(self) -> EyreResult<()> {
        match self.action {
            SubCommands::Init(init) => init.run(&self.args),
            SubCommands::Run(run) => run.run(&self.args).await,
        }
    }
}
