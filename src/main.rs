mod config;
mod error;
mod monitor;
mod notify;
mod store;
mod wifi;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Result, bail};
use secrecy::SecretString;
use std::process::ExitCode;
use std::time::Duration;

use crate::{
    error::WifiError,
    monitor::{Monitor, connect_once},
    notify::DesktopNotifier,
    store::{MonitorChoice, MonitorSettings, ProfileStore},
    wifi::NetworkAdapter,
};

/// Keeps a Windows host connected to its preferred Wi-Fi network
#[derive(Parser, Debug)]
#[command(
    name = "wifiguard",
    about = "Stores Wi-Fi credentials and keeps the default network connected.",
    long_about = None,
    version = env!("CARGO_PKG_VERSION"),
    disable_version_flag = true
)]
struct Args {
    /// Print version information
    #[arg(short = 'v', long = "version", action = clap::ArgAction::Version)]
    version: (),

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List stored networks
    List,
    /// Store a network credential (overwrites an existing one)
    Add { ssid: String, password: String },
    /// Forget a stored network
    Remove { ssid: String },
    /// Choose the network the daemon keeps alive
    SetDefault { ssid: String },
    /// Show the current connection state
    Status {
        /// Check against this SSID instead of the default network
        #[arg(long)]
        ssid: Option<String>,
    },
    /// Connect once to the given network, or to the default
    Connect { ssid: Option<String> },
    /// Turn keep-alive monitoring on or off
    Monitor {
        #[arg(value_enum)]
        state: MonitorToggle,
    },
    /// Watch the default network, reconnecting when the link drops
    Daemon {
        /// Seconds between connectivity checks
        #[arg(long, default_value_t = config::DEFAULT_MONITOR_INTERVAL_SECS)]
        interval: u64,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum MonitorToggle {
    On,
    Off,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    color_eyre::install()?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match args.command {
        Command::List => list(),
        Command::Add { ssid, password } => add(&ssid, &password),
        Command::Remove { ssid } => remove(&ssid),
        Command::SetDefault { ssid } => set_default(&ssid),
        Command::Status { ssid } => status(ssid).await,
        Command::Connect { ssid } => connect(ssid).await,
        Command::Monitor { state } => toggle_monitor(state),
        Command::Daemon { interval } => daemon(interval).await,
    }
}

fn list() -> Result<ExitCode> {
    let store = ProfileStore::load();
    if store.is_empty() {
        println!("no stored networks");
        return Ok(ExitCode::SUCCESS);
    }
    for name in store.names() {
        let marker = if store.default_name() == Some(name) {
            "*"
        } else {
            " "
        };
        println!("{marker} {name}");
    }
    Ok(ExitCode::SUCCESS)
}

fn add(ssid: &str, password: &str) -> Result<ExitCode> {
    let mut store = ProfileStore::load();
    let had_default = store.default_name().is_some();
    store.add(ssid, password)?;
    store.save()?;
    println!("stored {}", ssid.trim());
    if !had_default {
        println!("{} is now the default network", ssid.trim());
    }
    Ok(ExitCode::SUCCESS)
}

fn remove(ssid: &str) -> Result<ExitCode> {
    let mut store = ProfileStore::load();
    if !store.remove(ssid) {
        bail!(WifiError::UnknownProfile(ssid.to_string()));
    }
    store.save()?;
    println!("removed {ssid}");
    if store.default_name().is_none() {
        println!("no default network is set");
    }
    Ok(ExitCode::SUCCESS)
}

fn set_default(ssid: &str) -> Result<ExitCode> {
    let mut store = ProfileStore::load();
    if !store.contains(ssid) {
        bail!(WifiError::UnknownProfile(ssid.to_string()));
    }
    store.set_default(ssid);
    store.save()?;
    println!("{ssid} is now the default network");
    Ok(ExitCode::SUCCESS)
}

async fn status(ssid: Option<String>) -> Result<ExitCode> {
    let store = ProfileStore::load();
    let target = ssid.or_else(|| store.default_name().map(str::to_string));

    let state =
        tokio::task::spawn_blocking(|| NetworkAdapter::new().connection_state()).await?;
    println!("{state}");

    if let Some(target) = target {
        if state.is_connected_to(&target) {
            println!("on the preferred network ({target})");
        } else {
            println!("not on the preferred network ({target})");
        }
    }
    Ok(ExitCode::SUCCESS)
}

async fn connect(ssid: Option<String>) -> Result<ExitCode> {
    let store = ProfileStore::load();
    let name = match ssid.or_else(|| store.default_name().map(str::to_string)) {
        Some(name) => name,
        None => bail!(WifiError::NoDefaultProfile),
    };
    let Some(secret) = store.secret(&name) else {
        bail!(WifiError::UnknownProfile(name));
    };
    let secret = SecretString::from(secret.to_string());

    let joined = tokio::task::spawn_blocking(move || {
        connect_once(&NetworkAdapter::new(), &DesktopNotifier, &name, &secret)
    })
    .await?;
    Ok(exit_code(joined))
}

fn toggle_monitor(state: MonitorToggle) -> Result<ExitCode> {
    let mut settings = MonitorSettings::load();
    settings.monitor_enabled = match state {
        MonitorToggle::On => MonitorChoice::Enabled,
        MonitorToggle::Off => MonitorChoice::Disabled,
    };
    settings.save()?;
    println!(
        "monitoring {}",
        if settings.monitor_enabled.is_enabled() {
            "enabled"
        } else {
            "disabled"
        }
    );
    Ok(ExitCode::SUCCESS)
}

/// Run the keep-alive loop when monitoring is enabled; otherwise make one
/// connect attempt and exit with its verdict.
async fn daemon(interval: u64) -> Result<ExitCode> {
    let store = ProfileStore::load();
    let settings = MonitorSettings::load();

    let Some((name, secret)) = store.default_profile() else {
        log::error!("no default network configured, nothing to watch");
        return Ok(exit_code(false));
    };
    let name = name.to_string();
    let secret = SecretString::from(secret.to_string());

    if settings.monitor_enabled.is_enabled() {
        log::info!("starting keep-alive for {name}");
        let monitor = Monitor::new(
            NetworkAdapter::new(),
            DesktopNotifier,
            Duration::from_secs(interval),
        );
        tokio::task::spawn_blocking(move || monitor.run(&name, &secret)).await?;
        Ok(ExitCode::SUCCESS)
    } else {
        log::info!("monitoring is disabled, trying {name} once");
        let joined = tokio::task::spawn_blocking(move || {
            connect_once(&NetworkAdapter::new(), &DesktopNotifier, &name, &secret)
        })
        .await?;
        Ok(exit_code(joined))
    }
}

fn exit_code(ok: bool) -> ExitCode {
    if ok { ExitCode::SUCCESS } else { ExitCode::from(1) }
}
