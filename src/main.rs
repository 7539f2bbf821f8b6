//! Binary entrypoint for the presentation surface.

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

use presentation_surface::config::Configuration;
use presentation_surface::events::CanvasCommand;
use presentation_surface::tasks::{control, ui_thread::CanvasHandle, ui_thread::UiThread};

#[derive(Debug, Parser)]
#[command(
    name = "presentation-surface",
    version,
    about = "Display surface for live presentation output"
)]
struct Args {
    /// Path to YAML config
    #[arg(value_name = "CONFIG")]
    config: PathBuf,
    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let filter = match verbosity {
        0 => filter,
        1 => filter.add_directive("presentation_surface=debug".parse()?),
        _ => filter.add_directive("presentation_surface=trace".parse()?),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let Args { config, verbose } = Args::parse();
    init_tracing(verbose)?;

    let cfg = Configuration::from_yaml_file(&config)
        .with_context(|| format!("failed to load configuration from {}", config.display()))?
        .validated()
        .context("invalid configuration values")?;
    tracing::info!(
        "Loaded configuration from {}:\n{:#?}",
        config.display(),
        cfg
    );

    let ui = UiThread::from_config(&cfg).context("failed to start UI thread")?;
    let handle = ui.handle();
    let cancel = CancellationToken::new();

    // Ctrl-D closes the surface when attached to a terminal
    if io::stdin().is_terminal() {
        let cancel = cancel.clone();
        tokio::task::spawn_blocking(move || {
            let mut sink = Vec::new();
            match io::stdin().read_to_end(&mut sink) {
                Ok(_) => tracing::info!("stdin closed; initiating shutdown"),
                Err(err) => tracing::warn!("stdin watcher failed: {err}"),
            }
            cancel.cancel();
        });
    }

    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::warn!("ctrl-c handler failed: {err}");
                return;
            }
            tracing::info!("ctrl-c received; initiating shutdown");
            cancel.cancel();
        });
    }

    #[cfg(unix)]
    {
        spawn_signal_toggle(
            SignalKind::user_defined1(),
            "SIGUSR1",
            CanvasCommand::ToggleBlack,
            handle.clone(),
            cancel.clone(),
        );
        spawn_signal_toggle(
            SignalKind::user_defined2(),
            "SIGUSR2",
            CanvasCommand::ToggleClear,
            handle.clone(),
            cancel.clone(),
        );
    }

    let control_task = tokio::spawn({
        let path = cfg.control_socket_path.clone();
        let handle = handle.clone();
        let cancel = cancel.clone();
        async move {
            if let Err(e) = control::run(path, handle, cancel.clone())
                .await
                .context("control task failed")
            {
                tracing::error!("{e:?}");
                cancel.cancel();
            }
        }
    });

    cancel.cancelled().await;
    if let Err(e) = control_task.await {
        tracing::error!("join error: {e}");
    }

    tokio::task::spawn_blocking(move || ui.join())
        .await
        .context("UI thread join task failed")?
        .context("UI thread failed")?;
    Ok(())
}

#[cfg(unix)]
fn spawn_signal_toggle(
    kind: SignalKind,
    name: &'static str,
    command: CanvasCommand,
    handle: CanvasHandle,
    cancel: CancellationToken,
) {
    tokio::spawn(async move {
        match signal(kind) {
            Ok(mut stream) => loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    received = stream.recv() => {
                        if received.is_none() {
                            break;
                        }
                        tracing::info!(signal = name, ?command, "signal received");
                        if let Err(err) = handle.send(command.clone()) {
                            tracing::warn!("failed to forward {name}: {err}");
                            break;
                        }
                    }
                }
            },
            Err(err) => tracing::warn!("failed to register {name} handler: {err}"),
        }
    });
}
