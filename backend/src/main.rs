//! Appointment API entry-point: loads settings, installs logging and serves
//! the envelope-wrapped endpoints.

mod server;

use std::env;

use color_eyre::eyre::{Result, WrapErr};
use ortho_config::OrthoConfig;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use appointment_api::settings::AppSettings;
use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load_from_iter(env::args_os())
        .map_err(|e| color_eyre::eyre::eyre!("{e}"))
        .wrap_err("failed to load settings")?;
    let server = create_server(ServerConfig::from_settings(&settings))
        .wrap_err("failed to start HTTP server")?;
    server.await.wrap_err("HTTP server terminated with an error")
}
