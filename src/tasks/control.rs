use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::select;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::events::CanvasCommand;
use crate::tasks::ui_thread::CanvasHandle;

/// Serves newline-delimited JSON commands on a Unix socket.
///
/// Every command line gets exactly one reply line: the surface state after
/// the command was applied, or `{"error": "..."}`.
pub async fn run(socket_path: PathBuf, handle: CanvasHandle, cancel: CancellationToken) -> Result<()> {
    prepare_socket_path(&socket_path)?;
    let listener = UnixListener::bind(&socket_path)
        .with_context(|| format!("failed to bind control socket {}", socket_path.display()))?;
    info!(path = %socket_path.display(), "control socket listening");

    loop {
        select! {
            _ = cancel.cancelled() => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, _)) => {
                    let handle = handle.clone();
                    let cancel = cancel.clone();
                    tokio::spawn(async move {
                        if let Err(err) = serve_connection(stream, handle, cancel).await {
                            warn!(error = ?err, "control connection failed");
                        }
                    });
                }
                Err(err) => warn!(error = %err, "control socket accept failed"),
            }
        }
    }

    if let Err(err) = std::fs::remove_file(&socket_path) {
        if err.kind() != io::ErrorKind::NotFound {
            warn!(error = %err, "failed to remove control socket");
        }
    }
    Ok(())
}

async fn serve_connection(
    stream: UnixStream,
    handle: CanvasHandle,
    cancel: CancellationToken,
) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();
    loop {
        let line = select! {
            _ = cancel.cancelled() => break,
            line = lines.next_line() => line.context("failed to read control command")?,
        };
        let Some(line) = line else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let reply = respond(&handle, line).await;
        writer.write_all(reply.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }
    Ok(())
}

/// Parses one command line, applies it on the UI thread and renders the reply.
pub async fn respond(handle: &CanvasHandle, line: &str) -> String {
    let command = match CanvasCommand::from_json(line) {
        Ok(command) => command,
        Err(err) => {
            warn!(error = %err, "malformed control command");
            return error_reply(&err.to_string());
        }
    };
    debug!(?command, "control command received");

    let handle = handle.clone();
    match tokio::task::spawn_blocking(move || handle.execute(command)).await {
        Ok(Ok(state)) => serde_json::to_string(&state).unwrap_or_else(|err| error_reply(&err.to_string())),
        Ok(Err(err)) => error_reply(&err.to_string()),
        Err(err) => error_reply(&format!("control worker failed: {err}")),
    }
}

fn error_reply(message: &str) -> String {
    serde_json::json!({ "error": message }).to_string()
}

fn prepare_socket_path(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    match std::fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "removed stale control socket"),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to remove stale socket {}", path.display()));
        }
    }
    Ok(())
}
