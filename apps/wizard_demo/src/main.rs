use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::Parser;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;
use wizard_core::{
    config::load_settings_from, load_settings, SubmitHandler, ValueSet, WizardSession,
};

mod driver;
mod manifest;

use driver::DriverExit;
use manifest::WizardManifest;

#[derive(Parser, Debug)]
struct Args {
    /// Wizard manifest to run; defaults to the built-in registration wizard.
    #[arg(long)]
    manifest: Option<PathBuf>,
    /// Settings file; defaults to `wizard.toml` in the working directory.
    #[arg(long)]
    settings: Option<PathBuf>,
}

/// Prints the submitted values as pretty JSON on stdout.
struct PrintSubmitHandler;

#[async_trait]
impl SubmitHandler for PrintSubmitHandler {
    async fn submit(&self, values: ValueSet) -> Result<()> {
        let rendered =
            serde_json::to_string_pretty(&values).context("failed to render submitted values")?;
        println!("{rendered}");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let settings = match &args.settings {
        Some(path) => load_settings_from(path),
        None => load_settings(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let manifest = match &args.manifest {
        Some(path) => WizardManifest::load(path)?,
        None => WizardManifest::registration()?,
    };
    let definition = manifest.into_definition(Arc::new(PrintSubmitHandler))?;
    let session = WizardSession::initialize_with_settings(definition, settings)
        .context("failed to start wizard session")?;

    let exit = driver::run(
        &session,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await?;

    match exit {
        DriverExit::Submitted => {}
        DriverExit::Quit | DriverExit::EndOfInput => {
            tracing::info!(?exit, "wizard closed before submission");
        }
    }

    Ok(())
}
