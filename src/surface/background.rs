//! Background handles shown in the bottom layer of the surface.
//!
//! A background is either a still image or a video stream. The set of kinds
//! is closed, so the render pass resolves it with an exhaustive `match`; the
//! only place an unknown kind can appear is when a background is built from
//! an external description such as a file path.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use super::geometry::Size;
use crate::error::{Error, Result};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp", "tif", "tiff"];
const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "m4v", "mov", "avi", "mkv", "webm", "flv", "mpg", "mpeg", "wmv",
];

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a visual node in the surface's child list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u64);

impl NodeId {
    fn next() -> Self {
        NodeId(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Builds the 1x1 image used to paint a solid colour at any size.
pub fn solid_colour(rgb: [u8; 3]) -> RgbaImage {
    RgbaImage::from_pixel(1, 1, Rgba([rgb[0], rgb[1], rgb[2], 255]))
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    File(PathBuf),
    Colour(RgbaImage),
}

impl ImageSource {
    pub fn describe(&self) -> String {
        match self {
            ImageSource::File(path) => path.display().to_string(),
            ImageSource::Colour(img) => {
                let Rgba([r, g, b, _]) = *img.get_pixel(0, 0);
                format!("#{r:02x}{g:02x}{b:02x}")
            }
        }
    }
}

/// Still image element with a fit box.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageView {
    pub source: ImageSource,
    pub fit_width: f64,
    pub fit_height: f64,
    pub preserve_ratio: bool,
}

impl ImageView {
    pub fn new(source: ImageSource) -> Self {
        Self {
            source,
            fit_width: 0.0,
            fit_height: 0.0,
            preserve_ratio: false,
        }
    }

    pub fn from_colour(rgb: [u8; 3]) -> Self {
        Self::new(ImageSource::Colour(solid_colour(rgb)))
    }

    pub fn fit(&mut self, size: Size) {
        self.fit_width = size.width;
        self.fit_height = size.height;
    }

    pub fn fit_size(&self) -> Size {
        Size {
            width: self.fit_width,
            height: self.fit_height,
        }
    }
}

/// Video stream element with a fit box. Aspect preservation starts enabled,
/// matching a freshly created media view.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaView {
    pub source: PathBuf,
    pub fit_width: f64,
    pub fit_height: f64,
    pub preserve_ratio: bool,
}

impl MediaView {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            fit_width: 0.0,
            fit_height: 0.0,
            preserve_ratio: true,
        }
    }

    pub fn fit(&mut self, size: Size) {
        self.fit_width = size.width;
        self.fit_height = size.height;
    }

    pub fn fit_size(&self) -> Size {
        Size {
            width: self.fit_width,
            height: self.fit_height,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BackgroundKind {
    Image(ImageView),
    Video(MediaView),
}

/// The element occupying the bottom layer of the surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Background {
    id: NodeId,
    kind: BackgroundKind,
}

impl Background {
    pub fn image(view: ImageView) -> Self {
        Self::with_kind(BackgroundKind::Image(view))
    }

    pub fn video(view: MediaView) -> Self {
        Self::with_kind(BackgroundKind::Video(view))
    }

    pub fn colour(rgb: [u8; 3]) -> Self {
        Self::image(ImageView::from_colour(rgb))
    }

    fn with_kind(kind: BackgroundKind) -> Self {
        Self {
            id: NodeId::next(),
            kind,
        }
    }

    /// Picks the background kind from the file extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Ok(Self::image(ImageView::new(ImageSource::File(path.to_path_buf()))))
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Ok(Self::video(MediaView::new(path)))
        } else {
            Err(Error::UnsupportedBackground {
                path: path.to_path_buf(),
            })
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> &BackgroundKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut BackgroundKind {
        &mut self.kind
    }

    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            BackgroundKind::Image(_) => "image",
            BackgroundKind::Video(_) => "video",
        }
    }

    pub fn fit_size(&self) -> Size {
        match &self.kind {
            BackgroundKind::Image(view) => view.fit_size(),
            BackgroundKind::Video(view) => view.fit_size(),
        }
    }

    pub fn preserve_ratio(&self) -> bool {
        match &self.kind {
            BackgroundKind::Image(view) => view.preserve_ratio,
            BackgroundKind::Video(view) => view.preserve_ratio,
        }
    }

    pub fn describe_source(&self) -> String {
        match &self.kind {
            BackgroundKind::Image(view) => view.source.describe(),
            BackgroundKind::Video(view) => view.source.display().to_string(),
        }
    }
}

/// Serializable description of a background, used by config and the control
/// protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum BackgroundSpec {
    Image { path: PathBuf },
    Video { path: PathBuf },
    Colour { rgb: [u8; 3] },
}

impl Default for BackgroundSpec {
    fn default() -> Self {
        BackgroundSpec::Colour { rgb: [0, 0, 0] }
    }
}

impl BackgroundSpec {
    pub fn build(&self) -> Background {
        match self {
            BackgroundSpec::Image { path } => {
                Background::image(ImageView::new(ImageSource::File(path.clone())))
            }
            BackgroundSpec::Video { path } => Background::video(MediaView::new(path.clone())),
            BackgroundSpec::Colour { rgb } => Background::colour(*rgb),
        }
    }
}
