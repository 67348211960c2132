use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use bindery::app::{AppContext, BinderyError};
use bindery::cli::commands::{self, BuildOptions};
use bindery::cli::{Cli, Commands};
use bindery::config::Config;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            let code = e
                .chain()
                .find_map(|cause| cause.downcast_ref::<BinderyError>())
                .map(BinderyError::exit_code)
                .unwrap_or(1);
            ExitCode::from(code)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(cli.config.as_deref())
        .map_err(BinderyError::from)
        .context("Could not load configuration")?;

    match cli.command {
        Commands::Build {
            offline,
            no_images,
            no_convert,
            open,
        } => {
            let ctx = if offline {
                AppContext::offline(config)
            } else {
                AppContext::new(config)?
            };
            let options = BuildOptions {
                images: !no_images,
                convert: !no_convert,
                open,
            };
            let report = commands::build(&ctx, &options)
                .await
                .context("Build failed")?;
            println!(
                "Done: {} posts, {} links rewritten, {} images localized",
                report.posts,
                report.links_rewritten,
                report.media.localized()
            );
        }
        Commands::Fetch => {
            let ctx = AppContext::new(config)?;
            commands::fetch(&ctx).await.context("Fetch failed")?;
        }
        Commands::Status => {
            commands::status(&AppContext::offline(config))?;
        }
        Commands::Convert => {
            commands::convert(&AppContext::offline(config))?;
        }
    }

    Ok(())
}
