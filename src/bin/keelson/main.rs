//! Keelson CLI - package resolution for embedded C projects

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use keelson::util::diagnostic::{emit, UnresolvedDependencyError};
use keelson::util::GlobalContext;
use keelson::BuildError;

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color;

    if let Err(e) = run(cli) {
        report(e, color);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("keelson=debug")
    } else {
        EnvFilter::new("keelson=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let mut ctx = GlobalContext::new()?;
    ctx.set_verbose(cli.verbose);
    ctx.set_color(!cli.no_color);

    match cli.command {
        Commands::Resolve(args) => commands::resolve::execute(args, &ctx),
        Commands::Flags(args) => commands::flags::execute(args, &ctx),
        Commands::Tree(args) => commands::tree::execute(args, &ctx),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

fn report(e: anyhow::Error, color: bool) {
    if let Some(err) = e.downcast_ref::<BuildError>() {
        emit(&err.to_diagnostic(), color);
        return;
    }

    match e.downcast::<UnresolvedDependencyError>() {
        Ok(err) => eprintln!("{:?}", miette::Report::new(err)),
        Err(e) => eprintln!("error: {:#}", e),
    }
}
