mod align;
mod cli;
mod config;
mod download;
mod payload;
mod persist;
mod report;
mod source;
mod stats;

use anyhow::{Error, Result};
use clap::Parser;
use cli::{command, Cli, Commands};
use config::Config;
use source::SourceKind;

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(mirror_dir) = cli.mirror_dir {
        config.mirror_dir = Some(mirror_dir);
    }

    match cli.command {
        Commands::Nowcast {} => saved(command::fetch(&config, &[SourceKind::Nowcast]).await),
        Commands::Forecast {} => saved(command::fetch(&config, &[SourceKind::Forecast]).await),
        Commands::Fetch {} => {
            saved(command::fetch(&config, &[SourceKind::Nowcast, SourceKind::Forecast]).await)
        }
        Commands::Report {} => match command::report(&config).await {
            Ok(filename) => println!("Analysis saved to `{}`", filename),
            Err(e) => eprintln!("Error: {:#}", e),
        },
        Commands::Analyze { file } => match command::analyze(&config, &file).await {
            Ok(filename) => println!("Analysis saved to `{}`", filename),
            Err(e) => eprintln!("Error: {:#}", e),
        },
        Commands::Summary { source, file } => match command::summary(&config, source, file) {
            Ok(text) => print!("{}", text),
            Err(e) => eprintln!("Error: {:#}", e),
        },
    }

    Ok(())
}

fn saved(result: Result<Vec<String>>) {
    match result {
        Ok(filenames) => {
            for filename in filenames {
                println!("File saved to `{}`", filename);
            }
        }
        Err(e) => eprintln!("Error: {:#}", e),
    }
}
