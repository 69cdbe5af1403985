//! recipebox-cli: command-line host for the recipe client.

#![deny(clippy::all, clippy::pedantic)]

mod args;
mod context;
mod handlers;
mod print;
mod prompt;


use std::process::ExitCode;

use clap::Parser;
use recipebox::{config, infra::telemetry};
use tracing::error;

use args::{Cli, Commands};
use context::{CliError, Ctx, build_ctx};
use handlers::{auth, ratings, recipes};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "command failed");
            eprintln!("error: {}", err.render());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let settings = config::load(cli.config_file.as_ref(), &cli.overrides)?;
    telemetry::init(&settings.logging)?;
    let ctx = build_ctx(&settings)?;
    dispatch(&ctx, cli.command).await
}

pub(crate) async fn dispatch(ctx: &Ctx, command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Login(args) => auth::login(ctx, args).await,
        Commands::Register(args) => auth::register(ctx, args).await,
        Commands::Logout => auth::logout(ctx),
        Commands::Whoami => auth::whoami(ctx),
        Commands::Recipes(cmd) => recipes::handle(ctx, cmd.action).await,
        Commands::Ratings(cmd) => ratings::handle(ctx, cmd.action).await,
    }
}
