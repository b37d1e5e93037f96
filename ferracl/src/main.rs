use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, warn};

use ferracl::SshConnector;
use ferracl::job::{self, JobConfig, TerminalPrompt};

/// Apply one ACL change to a fleet of Cisco IOS / NX-OS devices.
#[derive(Parser, Debug)]
#[command(name = "ferracl", version, about)]
struct Cli {
    /// Job file (.yaml, .yml, .toml or .json)
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Skip the confirmation prompt
    #[arg(short = 'y', long)]
    yes: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();

    let Some(path) = cli.config else {
        println!("Please specify a configuration file");
        return Ok(());
    };

    let config = JobConfig::load(&path)
        .with_context(|| format!("Failed to load job file {}", path.display()))?;

    if !cli.yes && !job::confirm_change(&config.acl_name, config.mode())? {
        println!("Aborted, no devices were changed");
        return Ok(());
    }

    let connector = Arc::new(SshConnector::new(config.session_options()));
    let report = job::run_job(&config, connector, &mut TerminalPrompt).await?;

    println!("{}", report.render());
    if report.summary.any_inconsistent() {
        warn!("result line counts differ between devices of the same platform");
    }

    if config.export_result {
        let dir = config.export_dir.clone().unwrap_or_else(|| PathBuf::from("."));
        let exported = report.export(&dir, chrono::Local::now())?;
        println!("Results written to {}", exported.display());
    }

    Ok(())
}
