use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::surface::background::BackgroundSpec;
use crate::surface::geometry::Size;

/// Commands accepted by the UI thread, locally or over the control socket.
///
/// On the wire each command is a JSON object tagged by `command`, e.g.
/// `{"command":"toggle-black"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "kebab-case")]
pub enum CanvasCommand {
    ToggleBlack,
    ToggleClear,
    Resize {
        width: f64,
        height: f64,
    },
    SetBackground {
        background: BackgroundSpec,
    },
    SetBackgroundPath {
        path: PathBuf,
    },
    AddNotice {
        text: String,
        #[serde(default)]
        times: Option<u32>,
    },
    ClearNotices,
    Render,
    /// No-op; the reply carries the current state.
    State,
}

impl CanvasCommand {
    /// Decodes one control-socket line.
    pub fn from_json(line: &str) -> Result<Self> {
        Ok(serde_json::from_str(line)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BackgroundState {
    pub kind: String,
    pub source: String,
    pub fit: Size,
    pub preserve_ratio: bool,
}

/// Point-in-time view of a surface, as reported to control clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SurfaceState {
    pub cleared: bool,
    pub blacked: bool,
    pub stage_view: bool,
    pub size: Size,
    pub background: BackgroundState,
    pub placeholder_fit: Size,
    /// Child layers, bottom-most first.
    pub layers: Vec<String>,
    pub notice: Option<String>,
    pub render_count: u64,
}
