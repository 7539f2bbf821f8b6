//! The single UI thread that owns a [`DisplayCanvas`].
//!
//! Other threads never touch the canvas. They post messages through a
//! [`CanvasHandle`]; the UI thread applies them one at a time, in arrival
//! order, and drains the canvas's render queue after each one.

use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded, select, tick, unbounded};
use tracing::{debug, error, info, warn};

use crate::config::Configuration;
use crate::error::{Error, Result};
use crate::events::{CanvasCommand, SurfaceState};
use crate::surface::DisplayCanvas;
use crate::surface::background::Background;
use crate::surface::geometry::Size;
use crate::surface::notice::Notice;

/// Work posted from another thread to run on the UI thread.
pub type RunLater = Box<dyn FnOnce(&mut DisplayCanvas) + Send>;

enum UiMessage {
    Command(CanvasCommand),
    RunLater(RunLater),
    Render(Option<RunLater>),
    Snapshot(Sender<SurfaceState>),
    Execute(CanvasCommand, Sender<SurfaceState>),
    Shutdown,
}

#[derive(Debug, Clone)]
pub struct UiSettings {
    pub initial_size: Size,
    pub tick_interval: Duration,
    pub reply_timeout: Duration,
    pub default_notice_times: u32,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            initial_size: Size::ZERO,
            tick_interval: Duration::from_millis(250),
            reply_timeout: Duration::from_secs(2),
            default_notice_times: 1,
        }
    }
}

impl From<&Configuration> for UiSettings {
    fn from(cfg: &Configuration) -> Self {
        Self {
            initial_size: cfg.surface.initial_size,
            tick_interval: cfg.ui.tick_interval,
            reply_timeout: cfg.ui.reply_timeout,
            default_notice_times: cfg.notices.default_times,
        }
    }
}

/// Cloneable, thread-safe entry point to a canvas running on its UI thread.
#[derive(Clone)]
pub struct CanvasHandle {
    tx: Sender<UiMessage>,
    reply_timeout: Duration,
}

impl CanvasHandle {
    pub fn send(&self, command: CanvasCommand) -> Result<()> {
        self.post(UiMessage::Command(command))
    }

    pub fn run_later(&self, work: impl FnOnce(&mut DisplayCanvas) + Send + 'static) -> Result<()> {
        self.post(UiMessage::RunLater(Box::new(work)))
    }

    pub fn render(&self) -> Result<()> {
        self.post(UiMessage::Render(None))
    }

    /// Queues a render pass whose first step is `callback`.
    pub fn render_with(
        &self,
        callback: impl FnOnce(&mut DisplayCanvas) + Send + 'static,
    ) -> Result<()> {
        self.post(UiMessage::Render(Some(Box::new(callback))))
    }

    /// Blocks until the UI thread reports its state, after all earlier
    /// messages have been applied.
    pub fn state(&self) -> Result<SurfaceState> {
        let (reply_tx, reply_rx) = bounded(1);
        self.post(UiMessage::Snapshot(reply_tx))?;
        self.await_reply(&reply_rx)
    }

    /// Applies `command` and returns the state right after it, in a single
    /// UI-thread turn so no other caller's command lands in between.
    pub fn execute(&self, command: CanvasCommand) -> Result<SurfaceState> {
        let (reply_tx, reply_rx) = bounded(1);
        self.post(UiMessage::Execute(command, reply_tx))?;
        self.await_reply(&reply_rx)
    }

    fn await_reply(&self, reply_rx: &Receiver<SurfaceState>) -> Result<SurfaceState> {
        reply_rx
            .recv_timeout(self.reply_timeout)
            .map_err(|err| match err {
                RecvTimeoutError::Timeout => Error::UiThreadTimeout,
                RecvTimeoutError::Disconnected => Error::UiThreadClosed,
            })
    }

    pub fn shutdown(&self) -> Result<()> {
        self.post(UiMessage::Shutdown)
    }

    fn post(&self, msg: UiMessage) -> Result<()> {
        self.tx.send(msg).map_err(|_| Error::UiThreadClosed)
    }
}

pub struct UiThread {
    handle: CanvasHandle,
    join: Option<JoinHandle<()>>,
}

impl UiThread {
    /// Starts the UI thread. `build` runs on that thread, so the canvas is
    /// created where it lives.
    pub fn spawn<B>(settings: UiSettings, build: B) -> Result<Self>
    where
        B: FnOnce() -> DisplayCanvas + Send + 'static,
    {
        let (tx, rx) = unbounded();
        let handle = CanvasHandle {
            tx,
            reply_timeout: settings.reply_timeout,
        };
        let join = thread::Builder::new()
            .name("surface-ui".into())
            .spawn(move || run(rx, settings, build))?;
        Ok(Self {
            handle,
            join: Some(join),
        })
    }

    pub fn from_config(cfg: &Configuration) -> Result<Self> {
        let options = cfg.canvas_options();
        let notices = cfg.notices.clone();
        Self::spawn(UiSettings::from(cfg), move || {
            DisplayCanvas::with_options(options, Box::new(notices.drawer()))
        })
    }

    pub fn handle(&self) -> CanvasHandle {
        self.handle.clone()
    }

    /// Asks the thread to stop and waits for it.
    pub fn join(mut self) -> Result<()> {
        self.stop()
    }

    fn stop(&mut self) -> Result<()> {
        let Some(join) = self.join.take() else {
            return Ok(());
        };
        let _ = self.handle.shutdown();
        join.join().map_err(|_| Error::UiThreadPanicked)
    }
}

impl Drop for UiThread {
    fn drop(&mut self) {
        if let Err(err) = self.stop() {
            error!(error = %err, "UI thread did not stop cleanly");
        }
    }
}

fn run<B>(rx: Receiver<UiMessage>, settings: UiSettings, build: B)
where
    B: FnOnce() -> DisplayCanvas,
{
    let mut canvas = build();
    canvas.resize(settings.initial_size);
    canvas.run_pending();
    info!(
        width = settings.initial_size.width,
        height = settings.initial_size.height,
        stage_view = canvas.is_stage_view(),
        "UI thread started"
    );

    let ticker = tick(settings.tick_interval);
    let mut last_tick = Instant::now();

    loop {
        select! {
            recv(rx) -> msg => match msg {
                Ok(UiMessage::Shutdown) | Err(_) => break,
                Ok(msg) => handle_message(&mut canvas, msg, &settings),
            },
            recv(ticker) -> at => {
                let now = at.unwrap_or_else(|_| Instant::now());
                let elapsed = now.saturating_duration_since(last_tick);
                last_tick = now;
                if canvas.overlay_mut().advance(elapsed) {
                    canvas.render(None);
                }
            }
        }
        canvas.run_pending();
    }

    info!(renders = canvas.render_count(), "UI thread stopped");
}

fn handle_message(canvas: &mut DisplayCanvas, msg: UiMessage, settings: &UiSettings) {
    match msg {
        UiMessage::Command(command) => {
            debug!(?command, "applying canvas command");
            apply_command(canvas, command, settings.default_notice_times);
        }
        UiMessage::RunLater(work) => work(canvas),
        UiMessage::Render(callback) => match callback {
            Some(callback) => canvas.render_with(callback),
            None => canvas.render(None),
        },
        UiMessage::Snapshot(reply) => {
            canvas.run_pending();
            let _ = reply.send(canvas.snapshot());
        }
        UiMessage::Execute(command, reply) => {
            debug!(?command, "executing canvas command");
            apply_command(canvas, command, settings.default_notice_times);
            canvas.run_pending();
            let _ = reply.send(canvas.snapshot());
        }
        UiMessage::Shutdown => {}
    }
}

/// Applies one command to a canvas on its own thread. Background changes are
/// made from inside the render pass they trigger, so the new handle and its
/// layout land in the same turn.
pub fn apply_command(canvas: &mut DisplayCanvas, command: CanvasCommand, default_notice_times: u32) {
    match command {
        CanvasCommand::ToggleBlack => canvas.toggle_black(),
        CanvasCommand::ToggleClear => canvas.toggle_clear(),
        CanvasCommand::Resize { width, height } => canvas.resize(Size::new(width, height)),
        CanvasCommand::SetBackground { background } => {
            let background = background.build();
            canvas.render_with(move |c| c.set_background(background));
        }
        CanvasCommand::SetBackgroundPath { path } => match Background::from_path(&path) {
            Ok(background) => canvas.render_with(move |c| c.set_background(background)),
            Err(err) => {
                warn!(error = %err, "keeping current background");
            }
        },
        CanvasCommand::AddNotice { text, times } => {
            let times = times.unwrap_or(default_notice_times);
            canvas.overlay_mut().add_notice(Notice::new(text, times));
            canvas.render(None);
        }
        CanvasCommand::ClearNotices => {
            canvas.overlay_mut().clear();
            canvas.render(None);
        }
        CanvasCommand::Render => canvas.render(None),
        CanvasCommand::State => {}
    }
}
