//! `bloodbank` entry-point: loads settings, restores the session and runs one command.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io::{self, Write};
use std::sync::Arc;

use bloodbank_client::cli::{App, Cli};
use bloodbank_client::config::ClientSettings;
use clap::Parser;
use color_eyre::eyre::{Result, WrapErr, eyre};
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let cli = Cli::parse();
    let settings = ClientSettings::load_from_iter([OsString::from("bloodbank")])
        .map_err(|err| eyre!("load bloodbank settings: {err}"))?;

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("create Tokio runtime")?;
    let app = App::from_settings(&settings, Arc::new(DefaultClock))?;
    let output = runtime.block_on(app.run(cli.command))?;

    let rendered = serde_json::to_string_pretty(&output).wrap_err("render output")?;
    writeln!(io::stdout().lock(), "{rendered}").wrap_err("write output")?;
    Ok(())
}
