//! envetcd entry point.

use anyhow::{Context, Result};
use clap::Parser;
use envetcd_env::Supervisor;
use envetcd_types::{exit, EnvEtcdError};
use tracing::error;

mod cli;

use cli::Cli;

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            let code = if e.use_stderr() {
                exit::PARSE
            } else {
                exit::SUCCESS
            };
            std::process::exit(code);
        }
    };

    if let Err(e) = envetcd_core::log::init(cli.log_level) {
        eprintln!("envetcd: {}", e);
        std::process::exit(e.exit_code());
    }

    let code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            exit_code(&e)
        }
    };
    std::process::exit(code);
}

async fn run(cli: Cli) -> Result<i32> {
    let supervisor = Supervisor::new(cli.into_config()).context("invalid configuration")?;
    let action = match &supervisor.config().write_env {
        Some(path) => format!("writing {}", path.display()),
        None => format!("running {}", supervisor.config().command.join(" ")),
    };
    let code = supervisor.run().await.context(action)?;
    Ok(code)
}

/// Exit status for a fatal error.
fn exit_code(e: &anyhow::Error) -> i32 {
    e.downcast_ref::<EnvEtcdError>()
        .map(EnvEtcdError::exit_code)
        .unwrap_or(exit::GENERIC)
}
