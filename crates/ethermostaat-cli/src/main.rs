//! E-Thermostaat CLI - read and set an ICY E-Thermostaat from the terminal.
//!
//! Pair once with `ethermostaat pair`; the password goes to the OS keychain
//! and the thermostat serial to the config file. Later commands log in to
//! the portal on every call.

mod cli;
mod config;
mod host;

use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use ethermostaat_core::auth::CredentialStore;
use ethermostaat_core::utils::{format_age, format_celsius};
use ethermostaat_core::{ApiClient, Capability, Device, PairingSession, PairingStep, ThermostatDriver};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Command};
use config::Config;
use host::{CliSettings, LogNotifier, LogSocket, PASSWORD_ENV};

/// Initialize the tracing subscriber for logging.
/// The returned guard must stay alive for file logging to flush.
fn init_tracing(log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file_name = path
                .file_name()
                .ok_or_else(|| anyhow!("Invalid log file path: {}", path.display()))?;
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));

            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .with(filter)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(io::stderr))
                .with(filter)
                .init();
            Ok(None)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _guard = init_tracing(cli.log_file.as_deref())?;

    let mut config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, "Failed to load config, using defaults");
            Config::default()
        }
    };

    let api_url = cli.api_url.clone().unwrap_or_else(|| config.api_url());
    info!(api_url = %api_url, "E-Thermostaat CLI starting");
    let api = ApiClient::with_base_url(api_url)?;

    match cli.command {
        Command::Pair { username } => pair(&mut config, api, username).await,
        Command::Get { capability, force } => {
            let (mut driver, device_id) = build_driver(&config, api)?;
            if force {
                driver.refresh(&device_id).await?;
            }
            let capability = Capability::from(capability);
            let value = driver.get(&device_id, capability).await?;
            println!("{}: {}", capability, format_celsius(value));
            Ok(())
        }
        Command::Set { celsius } => {
            let (mut driver, device_id) = build_driver(&config, api)?;
            let sent = driver
                .set(&device_id, Capability::TargetTemperature, celsius)
                .await?;
            if sent != celsius {
                println!("Requested {} adjusted to {}", format_celsius(celsius), format_celsius(sent));
            }
            let measured = driver.get(&device_id, Capability::MeasureTemperature).await?;
            println!("Target set to {} (room {})", format_celsius(sent), format_celsius(measured));
            Ok(())
        }
        Command::Status { force } => {
            let (mut driver, device_id) = build_driver(&config, api)?;
            if force {
                driver.refresh(&device_id).await?;
            }
            let target = driver.get(&device_id, Capability::TargetTemperature).await?;
            let measured = driver.get(&device_id, Capability::MeasureTemperature).await?;
            let age = driver
                .cache(&device_id)?
                .age()
                .map(format_age)
                .unwrap_or_else(|| "never".to_string());

            println!("Thermostat:  {}", device_id);
            println!("Target:      {}", format_celsius(target));
            println!("Measured:    {}", format_celsius(measured));
            println!("Updated:     {}", age);
            Ok(())
        }
        Command::Logout => logout(&mut config),
    }
}

/// Build a driver holding the paired thermostat
fn build_driver(config: &Config, api: ApiClient) -> Result<(ThermostatDriver, String)> {
    let device_id = config
        .device_id
        .clone()
        .ok_or_else(|| anyhow!("No thermostat paired. Run `ethermostaat pair` first."))?;

    let settings = CliSettings::new(config.last_username.clone());
    let username = settings
        .username()
        .ok_or_else(|| anyhow!("No username configured. Run `ethermostaat pair` first."))?
        .to_string();

    // The password is looked up through the settings on every call
    let device = Device::new(device_id.clone(), username, String::new());

    let mut driver = ThermostatDriver::new(api, Arc::new(settings), Arc::new(LogNotifier))
        .with_max_age(config.cache_max_age());
    driver.init([device]);
    Ok((driver, device_id))
}

async fn pair(config: &mut Config, api: ApiClient, username: Option<String>) -> Result<()> {
    let username = match username {
        Some(u) => u,
        None => prompt_username(config.last_username.as_deref())?,
    };
    if username.is_empty() {
        bail!("Username required");
    }

    let password = match std::env::var(PASSWORD_ENV).ok().filter(|p| !p.is_empty()) {
        Some(p) => p,
        None => rpassword::prompt_password("Password: ").context("Failed to read password")?,
    };

    println!("Checking credentials...");
    let mut session = PairingSession::new(api, Arc::new(LogSocket));
    match session.get_devices(&username, &password).await {
        PairingStep::Continue => {}
        PairingStep::NotAuthorized => bail!("Invalid username or password"),
        PairingStep::Failed => bail!("Unable to reach the E-Thermostaat portal. Check your internet connection."),
    }

    let descriptor = session
        .list_devices()
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("No thermostat found on this account"))?;
    session.disconnect();

    if let Err(e) = CredentialStore::store(&username, &password) {
        warn!(error = %e, "Failed to store credentials");
        println!("Warning: password not saved to keychain; set {} to use other commands", PASSWORD_ENV);
    }

    config.last_username = Some(username);
    config.device_id = Some(descriptor.data.id.clone());
    config.save()?;

    println!("Paired {} ({})", descriptor.name, descriptor.data.id);
    Ok(())
}

fn prompt_username(last_username: Option<&str>) -> Result<String> {
    match last_username {
        Some(last) => print!("Username [{}]: ", last),
        None => print!("Username: "),
    }
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();

    Ok(match (input.is_empty(), last_username) {
        (true, Some(last)) => last.to_string(),
        _ => input.to_string(),
    })
}

fn logout(config: &mut Config) -> Result<()> {
    if let Some(username) = config.last_username.as_deref() {
        if CredentialStore::has_credentials(username) {
            CredentialStore::delete(username)?;
        }
    }
    config.device_id = None;
    config.save()?;
    println!("Logged out");
    Ok(())
}
