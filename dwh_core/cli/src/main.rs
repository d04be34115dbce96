mod commands;

use crate::commands::{handle_etl, handle_provision, handle_schema, handle_teardown};

use clap::{Parser, Subcommand};
use common::error::DwhError;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dwh")]
pub struct Cli {
    #[arg(
        long = "config-path",
        short = 'c',
        help = "path to the project directory",
        global = true
    )]
    pub config_path: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Cmd,
}

#[derive(Subcommand)]
pub enum Cmd {
    /// Provision the warehouse: role, cluster, network access
    Provision,
    /// Delete the warehouse cluster, skipping the final snapshot
    Teardown,
    /// Drop and recreate the staging and star-schema tables
    Schema,
    /// Copy raw data into staging, then build the star schema
    Etl,
}

fn run_cmd(result: Result<(), DwhError>) {
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[tokio::main]
async fn main() {
    logging::init_logger();
    let cli = Cli::parse();

    match cli.command {
        Cmd::Provision => run_cmd(handle_provision(cli.config_path.clone()).await),
        Cmd::Teardown => run_cmd(handle_teardown(cli.config_path.clone()).await),
        Cmd::Schema => run_cmd(handle_schema(cli.config_path.clone()).await),
        Cmd::Etl => run_cmd(handle_etl(cli.config_path.clone()).await),
    }
}
