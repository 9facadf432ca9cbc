mod api;
mod config;
mod ddns;
mod error;
mod lookup;

use anyhow::Result;
use config::Config;
use ddns::DynamicDns;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let config = Config::from_env()?;

    let mut ddns = DynamicDns::new(&config).await?;

    ddns.start().await;
    wait_for_shutdown().await?;
    ddns.stop().await;

    Ok(())
}

#[cfg(unix)]
async fn wait_for_shutdown() -> Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::select! {
        _ = sigterm.recv() => info!("received SIGTERM"),
        _ = sigint.recv() => info!("received SIGINT"),
    }

    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<()> {
    tokio::signal::ctrl_c().await?;
    info!("received interrupt");
    Ok(())
}
