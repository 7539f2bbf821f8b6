use std::io::{BufRead, BufReader, Write};
use std::net::Shutdown;
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use presentation_surface::config::DEFAULT_CONTROL_SOCKET_PATH;
use presentation_surface::events::CanvasCommand;
use presentation_surface::surface::background::BackgroundSpec;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "surface-ctl",
    about = "Send control commands to a running presentation surface"
)]
struct Args {
    /// Presentation surface control socket.
    #[arg(long, default_value = DEFAULT_CONTROL_SOCKET_PATH)]
    control_socket: PathBuf,

    /// Seconds to wait for the surface to reply.
    #[arg(long, default_value_t = 5)]
    timeout_secs: u64,

    /// Logging level (error|warn|info|debug|trace).
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    action: Action,
}

#[derive(Debug, Clone, Subcommand)]
enum Action {
    /// Toggle the black screen.
    Black,
    /// Toggle clearing of text over the background.
    Clear,
    /// Report the current surface state.
    State,
    /// Resize the surface.
    Resize { width: f64, height: f64 },
    /// Show an image or video file as the background.
    Background { path: PathBuf },
    /// Fill the background with a solid colour.
    Colour { r: u8, g: u8, b: u8 },
    /// Queue a notice over the background.
    Notice {
        text: String,
        /// Display cycles; the surface default applies when omitted.
        #[arg(long)]
        times: Option<u32>,
    },
    /// Remove all queued notices.
    ClearNotices,
}

impl Action {
    fn into_command(self) -> CanvasCommand {
        match self {
            Action::Black => CanvasCommand::ToggleBlack,
            Action::Clear => CanvasCommand::ToggleClear,
            Action::State => CanvasCommand::State,
            Action::Resize { width, height } => CanvasCommand::Resize { width, height },
            Action::Background { path } => CanvasCommand::SetBackgroundPath { path },
            Action::Colour { r, g, b } => CanvasCommand::SetBackground {
                background: BackgroundSpec::Colour { rgb: [r, g, b] },
            },
            Action::Notice { text, times } => CanvasCommand::AddNotice { text, times },
            Action::ClearNotices => CanvasCommand::ClearNotices,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level)?;

    let command = args.action.clone().into_command();
    let reply = send_command(
        &args.control_socket,
        &command,
        Duration::from_secs(args.timeout_secs),
    )?;
    println!("{reply}");
    Ok(())
}

fn init_tracing(level: &str) -> Result<()> {
    let filter = EnvFilter::builder()
        .parse(level)
        .with_context(|| format!("invalid log level '{level}'"))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

/// Sends one command and returns the surface's reply line.
fn send_command(socket: &Path, command: &CanvasCommand, timeout: Duration) -> Result<String> {
    let mut stream = UnixStream::connect(socket).with_context(|| {
        format!(
            "failed to connect to control socket at {}",
            socket.display()
        )
    })?;
    stream
        .set_read_timeout(Some(timeout))
        .context("failed to set read timeout")?;

    let mut payload = serde_json::to_string(command).context("failed to encode command")?;
    debug!(%payload, "sending control command");
    payload.push('\n');
    stream
        .write_all(payload.as_bytes())
        .context("failed to send command")?;
    stream
        .shutdown(Shutdown::Write)
        .context("failed to close write half")?;

    let mut reply = String::new();
    BufReader::new(&stream)
        .read_line(&mut reply)
        .context("failed to read reply")?;
    let reply = reply.trim_end().to_string();
    if reply.is_empty() {
        bail!("surface closed the connection without replying");
    }

    let value: serde_json::Value =
        serde_json::from_str(&reply).context("surface sent a malformed reply")?;
    if let Some(error) = value.get("error").and_then(|e| e.as_str()) {
        bail!("surface rejected command: {error}");
    }
    Ok(reply)
}
