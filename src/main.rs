use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use studylog::cli::args::{Cli, Commands};
use studylog::cli::commands::{self, Context};
use studylog::config::ColorSetting;
use studylog::core::{Clock, SystemClock};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(|_| "studylog=info,warn".into()))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    if let Commands::Completions { shell } = cli.command {
        print!("{}", commands::completions(shell)?);
        return Ok(());
    }

    let ctx = Context::load(cli.home, cli.output)?;
    match ctx.config.general.color {
        ColorSetting::Always => colored::control::set_override(true),
        ColorSetting::Never => colored::control::set_override(false),
        ColorSetting::Auto => {}
    }

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let output = match cli.command {
        Commands::Serve { events } => commands::serve(&ctx, clock, events).await?,
        Commands::Today { user } => commands::today(&ctx, clock, user)?,
        Commands::Reset { user_id } => commands::reset(&ctx, clock, user_id)?,
        Commands::History { user, date, limit } => {
            commands::history(&ctx, clock.now(), user, date.as_deref(), limit)?
        }
        Commands::Summary => commands::summary(&ctx, clock)?,
        Commands::Completions { .. } => String::new(),
    };

    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}
