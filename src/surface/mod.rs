//! The display surface: a background layer (image or video), a black
//! placeholder swapped in while the surface is blacked, and a notice overlay
//! on top.
//!
//! All state lives on the UI thread. Toggles and resizes never lay out the
//! surface inline; they queue a render pass which the owning thread drains
//! with [`DisplayCanvas::run_pending`].

pub mod background;
pub mod geometry;
pub mod layers;
pub mod notice;

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use tracing::{debug, info, trace};

use crate::events::{BackgroundState, SurfaceState};
use background::{Background, BackgroundKind, BackgroundSpec, ImageView};
use geometry::{ObservableSize, Size, SizeListener};
use layers::{ChildList, Layer};
use notice::{NoticeDrawer, NoticeOverlay, OverlayContext};

const BLACK: [u8; 3] = [0, 0, 0];

/// Work run at the start of a render pass, before layout.
pub type RenderCallback = Box<dyn FnOnce(&mut DisplayCanvas)>;

type RenderQueue = Rc<RefCell<VecDeque<Option<RenderCallback>>>>;

/// Construction-time settings for a [`DisplayCanvas`].
#[derive(Debug, Clone)]
pub struct CanvasOptions {
    pub show_border: bool,
    pub stage_view: bool,
    pub placeholder_colour: [u8; 3],
    pub background: BackgroundSpec,
}

impl Default for CanvasOptions {
    fn default() -> Self {
        Self {
            show_border: false,
            stage_view: false,
            placeholder_colour: BLACK,
            background: BackgroundSpec::default(),
        }
    }
}

/// State machine for one presentation surface: clear and black flags, the
/// current background, the layer stack and a queue of pending render passes.
/// Owned by a single thread; see [`crate::tasks::ui_thread`] for sharing.
pub struct DisplayCanvas {
    cleared: bool,
    blacked: bool,
    stage_view: bool,
    show_border: bool,
    background: Background,
    placeholder: ImageView,
    overlay: Box<dyn NoticeOverlay>,
    size: ObservableSize,
    children: ChildList,
    pending: RenderQueue,
    render_count: u64,
}

impl DisplayCanvas {
    pub fn new(show_border: bool, stage_view: bool) -> Self {
        let options = CanvasOptions {
            show_border,
            stage_view,
            ..CanvasOptions::default()
        };
        Self::with_options(options, Box::new(NoticeDrawer::default()))
    }

    pub fn with_options(options: CanvasOptions, overlay: Box<dyn NoticeOverlay>) -> Self {
        let pending: RenderQueue = Rc::new(RefCell::new(VecDeque::new()));
        let mut size = ObservableSize::new(Size::ZERO);
        {
            let pending = pending.clone();
            size.add_listener(Box::new(move |dimension, old, new| {
                trace!(?dimension, old, new, "surface dimension changed");
                pending.borrow_mut().push_back(None);
            }));
        }

        let background = options.background.build();
        let mut children = ChildList::new();
        children.push(Layer::Background(background.id()));
        children.push(Layer::Notices);

        Self {
            cleared: false,
            blacked: false,
            stage_view: options.stage_view,
            show_border: options.show_border,
            background,
            placeholder: ImageView::from_colour(options.placeholder_colour),
            overlay,
            size,
            children,
            pending,
            render_count: 0,
        }
    }

    /// Replaces the background handle. The surface is not laid out again
    /// until the next render pass.
    pub fn set_background(&mut self, background: Background) {
        info!(
            kind = background.kind_name(),
            source = %background.describe_source(),
            "background replaced"
        );
        self.background = background;
    }

    pub fn background(&self) -> &Background {
        &self.background
    }

    pub fn placeholder(&self) -> &ImageView {
        &self.placeholder
    }

    pub fn children(&self) -> &ChildList {
        &self.children
    }

    /// Keeps the background but hides text drawn over it.
    pub fn toggle_clear(&mut self) {
        self.cleared ^= true;
        info!(cleared = self.cleared, "toggled clear");
        self.render(None);
    }

    /// Hides background and content behind a solid black placeholder.
    pub fn toggle_black(&mut self) {
        self.blacked ^= true;
        info!(blacked = self.blacked, "toggled black");
        self.render(None);
    }

    pub fn is_cleared(&self) -> bool {
        self.cleared
    }

    pub fn is_blacked(&self) -> bool {
        self.blacked
    }

    pub fn is_stage_view(&self) -> bool {
        self.stage_view
    }

    pub fn shows_border(&self) -> bool {
        self.show_border
    }

    pub fn overlay(&self) -> &dyn NoticeOverlay {
        self.overlay.as_ref()
    }

    pub fn overlay_mut(&mut self) -> &mut dyn NoticeOverlay {
        self.overlay.as_mut()
    }

    pub fn size(&self) -> Size {
        self.size.get()
    }

    pub fn set_width(&mut self, width: f64) {
        self.size.set_width(width);
    }

    pub fn set_height(&mut self, height: f64) {
        self.size.set_height(height);
    }

    pub fn resize(&mut self, size: Size) {
        self.set_width(size.width);
        self.set_height(size.height);
    }

    /// Registers an extra listener for width/height changes.
    pub fn on_resize(&mut self, listener: SizeListener) {
        self.size.add_listener(listener);
    }

    /// Queues a render pass. `callback`, if any, runs first within that pass.
    pub fn render(&mut self, callback: Option<RenderCallback>) {
        self.pending.borrow_mut().push_back(callback);
    }

    pub fn render_with(&mut self, callback: impl FnOnce(&mut DisplayCanvas) + 'static) {
        self.render(Some(Box::new(callback)));
    }

    pub fn pending_renders(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Number of completed render passes.
    pub fn render_count(&self) -> u64 {
        self.render_count
    }

    /// Runs queued render passes in order, including any queued while
    /// draining. Returns how many ran.
    pub fn run_pending(&mut self) -> usize {
        let mut ran = 0;
        loop {
            let next = self.pending.borrow_mut().pop_front();
            let Some(callback) = next else {
                break;
            };
            self.render_pass(callback);
            ran += 1;
        }
        ran
    }

    /// Runs `callback`, then orders the layers for the current flags and fits
    /// every layer to the surface size.
    fn render_pass(&mut self, callback: Option<RenderCallback>) {
        if let Some(callback) = callback {
            callback(self);
        }

        let current = Layer::Background(self.background.id());
        let stale = self.children.retain_background(self.background.id());
        if stale > 0 {
            debug!(stale, "dropped replaced background nodes");
        }
        if self.blacked {
            self.children.ensure_first(Layer::Placeholder);
            self.children.remove(current);
        } else {
            self.children.remove(Layer::Placeholder);
            self.children.ensure_first(current);
        }
        self.children.ensure_last(Layer::Notices);

        let size = self.size.get();
        match self.background.kind_mut() {
            BackgroundKind::Image(view) => view.fit(size),
            BackgroundKind::Video(view) => {
                view.preserve_ratio = false;
                view.fit(size);
            }
        }
        self.placeholder.fit(size);

        self.overlay.draw(&OverlayContext {
            size,
            blacked: self.blacked,
            cleared: self.cleared,
            stage_view: self.stage_view,
        });

        self.render_count += 1;
        debug!(
            width = size.width,
            height = size.height,
            blacked = self.blacked,
            cleared = self.cleared,
            layers = self.children.len(),
            "render pass complete"
        );
    }

    pub fn snapshot(&self) -> SurfaceState {
        SurfaceState {
            cleared: self.cleared,
            blacked: self.blacked,
            stage_view: self.stage_view,
            size: self.size.get(),
            background: BackgroundState {
                kind: self.background.kind_name().to_string(),
                source: self.background.describe_source(),
                fit: self.background.fit_size(),
                preserve_ratio: self.background.preserve_ratio(),
            },
            placeholder_fit: self.placeholder.fit_size(),
            layers: self.children.names(),
            notice: self.overlay.visible_notice().map(|n| n.text.clone()),
            render_count: self.render_count,
        }
    }
}
