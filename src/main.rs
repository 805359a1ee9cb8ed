use clap::Parser;
use community_dues::args::{Args, Command};
use community_dues::{commands, Config, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    if let Err(e) = main_inner(args).await {
        error!("Exiting with error: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().dues_home().path();

    // Every command except init works on an existing home.
    if let Command::Init(init_args) = args.command() {
        commands::init(home, init_args.community()).await?.print();
        return Ok(());
    }
    let config = Config::load(home).await?;
    debug!("Loaded the dues home for {}", config.community_name());

    match args.command().clone() {
        Command::Init(_) => {}
        Command::Import(import_args) => commands::import(config, import_args).await?.print(),
        Command::Groups(view_args) => commands::groups(config, view_args).await?.print(),
        Command::Calendar(calendar_args) => {
            commands::calendar(config, calendar_args).await?.print()
        }
        Command::Pay(pay_args) => commands::pay(config, pay_args).await?.print(),
        Command::Unassign(charge_args) => commands::unassign(config, charge_args).await?.print(),
    }
    Ok(())
}

/// Sends logs to stderr. `RUST_LOG` takes precedence over `level` when it is set.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => EnvFilter::from_default_env(),
        // Without RUST_LOG, only the library and this binary log, at the requested level.
        None => EnvFilter::new(format!(
            "{}={},{}={}",
            env!("CARGO_PKG_NAME").replace('-', "_"),
            level,
            env!("CARGO_CRATE_NAME"),
            level
        )),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
