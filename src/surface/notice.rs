//! Transient notices drawn above the background.

use std::collections::VecDeque;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::geometry::Size;

const MIN_CYCLE: Duration = Duration::from_millis(1);

/// Surface state handed to the overlay on every render pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayContext {
    pub size: Size,
    pub blacked: bool,
    pub cleared: bool,
    pub stage_view: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub text: String,
    /// How many display cycles the notice stays up.
    pub times: u32,
}

impl Notice {
    pub fn new(text: impl Into<String>, times: u32) -> Self {
        Self {
            text: text.into(),
            times: times.max(1),
        }
    }
}

/// Delegate that draws notices on top of the surface.
pub trait NoticeOverlay {
    /// Lays out the overlay for the current surface state.
    fn draw(&mut self, ctx: &OverlayContext);
    fn add_notice(&mut self, notice: Notice);
    fn remove_notice(&mut self, text: &str) -> bool;
    fn clear(&mut self);
    fn notices(&self) -> Vec<Notice>;
    fn visible_notice(&self) -> Option<&Notice>;
    /// Advances notice timers. Returns true when the visible notice changed.
    fn advance(&mut self, elapsed: Duration) -> bool;
}

/// Geometry of the notice strip along the bottom edge.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NoticeBand {
    pub visible: bool,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone)]
struct Queued {
    notice: Notice,
    remaining: u32,
    elapsed: Duration,
}

/// FIFO notice overlay. The front notice stays up for `times` cycles and is
/// then dropped so the next one can show.
#[derive(Debug, Clone)]
pub struct NoticeDrawer {
    queue: VecDeque<Queued>,
    cycle: Duration,
    band_fraction: f64,
    band: NoticeBand,
}

impl NoticeDrawer {
    pub fn new(cycle: Duration, band_fraction: f64) -> Self {
        Self {
            queue: VecDeque::new(),
            cycle: cycle.max(MIN_CYCLE),
            band_fraction: band_fraction.clamp(0.0, 1.0),
            band: NoticeBand::default(),
        }
    }

    pub fn band(&self) -> NoticeBand {
        self.band
    }
}

impl Default for NoticeDrawer {
    fn default() -> Self {
        Self::new(Duration::from_secs(10), 0.1)
    }
}

impl NoticeOverlay for NoticeDrawer {
    fn draw(&mut self, ctx: &OverlayContext) {
        if ctx.blacked || self.queue.is_empty() {
            self.band.visible = false;
            return;
        }
        let height = ctx.size.height * self.band_fraction;
        self.band = NoticeBand {
            visible: true,
            y: ctx.size.height - height,
            width: ctx.size.width,
            height,
        };
    }

    fn add_notice(&mut self, notice: Notice) {
        tracing::debug!(text = %notice.text, times = notice.times, "notice queued");
        self.queue.push_back(Queued {
            remaining: notice.times,
            notice,
            elapsed: Duration::ZERO,
        });
    }

    fn remove_notice(&mut self, text: &str) -> bool {
        let before = self.queue.len();
        self.queue.retain(|q| q.notice.text != text);
        before != self.queue.len()
    }

    fn clear(&mut self) {
        self.queue.clear();
    }

    fn notices(&self) -> Vec<Notice> {
        self.queue.iter().map(|q| q.notice.clone()).collect()
    }

    fn visible_notice(&self) -> Option<&Notice> {
        self.queue.front().map(|q| &q.notice)
    }

    fn advance(&mut self, elapsed: Duration) -> bool {
        let mut carry = elapsed;
        let mut changed = false;
        while let Some(front) = self.queue.front_mut() {
            front.elapsed += carry;
            if front.elapsed < self.cycle {
                break;
            }
            carry = front.elapsed - self.cycle;
            front.elapsed = Duration::ZERO;
            front.remaining = front.remaining.saturating_sub(1);
            if front.remaining > 0 {
                continue;
            }
            if let Some(done) = self.queue.pop_front() {
                tracing::debug!(text = %done.notice.text, "notice expired");
            }
            changed = true;
        }
        changed
    }
}
