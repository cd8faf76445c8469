use std::path::PathBuf;
use std::process::ExitCode;

use bioscrap::config::{AssociationsOptions, Cli, Command, HttpOptions, ProteinTreeOptions};
use bioscrap::locate::resolve_output_dir;
use bioscrap::process::{process_associations, process_protein_tree};
use bioscrap::{info_time, Result, DBDB_LEVELS_UP, SYNSYS_LEVELS_UP};
use chrono::Local;
use clap::Parser;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let start_time = Local::now();
    let cli = Cli::parse();
    let http = HttpOptions::from(&cli.http);
    let cwd = std::env::current_dir()?;
    let out_dir = |levels_up: usize| -> Result<PathBuf> {
        resolve_output_dir(cli.out_dir.as_deref(), &cwd, levels_up)
    };

    match &cli.command {
        Command::Dbdb(args) => {
            let opts = AssociationsOptions::from(args);
            process_associations(&http, &opts, &out_dir(DBDB_LEVELS_UP)?).await?;
        }
        Command::Synsys(args) => {
            let opts = ProteinTreeOptions::from(args);
            process_protein_tree(&http, &opts, &out_dir(SYNSYS_LEVELS_UP)?).await?;
        }
        Command::All => {
            let dbdb = AssociationsOptions::default();
            process_associations(&http, &dbdb, &out_dir(DBDB_LEVELS_UP)?).await?;
            let synsys = ProteinTreeOptions::default();
            process_protein_tree(&http, &synsys, &out_dir(SYNSYS_LEVELS_UP)?).await?;
        }
    }

    info_time!(start_time, "Full program time:");
    Ok(())
}
