use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

#[cfg(doc)]
use crate::error::Error;
use crate::surface::CanvasOptions;
use crate::surface::background::BackgroundSpec;
use crate::surface::geometry::Size;
use crate::surface::notice::NoticeDrawer;

pub const DEFAULT_CONTROL_SOCKET_PATH: &str = "/run/presentation-surface/control.sock";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct SurfaceConfig {
    /// Marks this surface as a stage (confidence monitor) view.
    pub stage_view: bool,
    /// Whether text drawn on this surface may carry an outline.
    pub show_border: bool,
    /// Size applied once the UI thread starts, as if the window laid out.
    pub initial_size: Size,
    /// Fill colour of the placeholder shown while blacked.
    pub placeholder_colour: [u8; 3],
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            stage_view: false,
            show_border: true,
            initial_size: Size {
                width: 1920.0,
                height: 1080.0,
            },
            placeholder_colour: [0, 0, 0],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct NoticeConfig {
    /// Length of one display cycle of a notice.
    #[serde(with = "humantime_serde")]
    pub cycle: Duration,
    /// Cycles a notice stays up when the sender does not say.
    pub default_times: u32,
    /// Height of the notice band as a fraction of surface height.
    pub band_fraction: f64,
}

impl Default for NoticeConfig {
    fn default() -> Self {
        Self {
            cycle: Duration::from_secs(10),
            default_times: 1,
            band_fraction: 0.1,
        }
    }
}

impl NoticeConfig {
    pub fn drawer(&self) -> NoticeDrawer {
        NoticeDrawer::new(self.cycle, self.band_fraction)
    }

    fn validate(&self) -> Result<()> {
        ensure!(
            self.cycle > Duration::ZERO,
            "notices.cycle must be positive"
        );
        ensure!(
            self.default_times >= 1,
            "notices.default-times must be >= 1"
        );
        ensure!(
            self.band_fraction > 0.0 && self.band_fraction <= 1.0,
            "notices.band-fraction must be in (0, 1]"
        );
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct UiConfig {
    /// How often the UI thread advances notice timers.
    #[serde(with = "humantime_serde")]
    pub tick_interval: Duration,
    /// How long callers wait for the UI thread to answer a state request.
    #[serde(with = "humantime_serde")]
    pub reply_timeout: Duration,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(250),
            reply_timeout: Duration::from_secs(2),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Configuration {
    /// Unix domain socket accepting runtime control commands.
    #[serde(default = "Configuration::default_control_socket_path")]
    pub control_socket_path: PathBuf,
    pub surface: SurfaceConfig,
    /// Background shown at startup.
    pub background: BackgroundSpec,
    pub notices: NoticeConfig,
    pub ui: UiConfig,
}

impl Configuration {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Ok(Self::from_yaml_str(&s)?)
    }

    /// Parses a YAML document. Syntax and schema problems surface as
    /// [`Error::Config`].
    pub fn from_yaml_str(s: &str) -> crate::error::Result<Self> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Validate runtime invariants that cannot be expressed via serde defaults alone.
    pub fn validated(self) -> Result<Self> {
        ensure!(
            !self.control_socket_path.as_os_str().is_empty(),
            "control-socket-path must not be empty"
        );
        ensure!(
            self.control_socket_path.file_name().is_some(),
            "control-socket-path must include a socket file name"
        );
        ensure!(
            self.surface.initial_size.is_finite_non_negative(),
            "surface.initial-size must be finite and non-negative"
        );
        self.notices
            .validate()
            .context("invalid notice configuration")?;
        ensure!(
            self.ui.tick_interval > Duration::ZERO,
            "ui.tick-interval must be positive"
        );
        ensure!(
            self.ui.reply_timeout > Duration::ZERO,
            "ui.reply-timeout must be positive"
        );
        Ok(self)
    }

    pub fn canvas_options(&self) -> CanvasOptions {
        CanvasOptions {
            show_border: self.surface.show_border,
            stage_view: self.surface.stage_view,
            placeholder_colour: self.surface.placeholder_colour,
            background: self.background.clone(),
        }
    }

    fn default_control_socket_path() -> PathBuf {
        PathBuf::from(DEFAULT_CONTROL_SOCKET_PATH)
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            control_socket_path: Self::default_control_socket_path(),
            surface: SurfaceConfig::default(),
            background: BackgroundSpec::default(),
            notices: NoticeConfig::default(),
            ui: UiConfig::default(),
        }
    }
}
