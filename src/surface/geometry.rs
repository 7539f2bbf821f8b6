use serde::{Deserialize, Serialize};

/// Width/height pair in layout units. Fractional values are kept as-is so
/// sub-pixel layout passes propagate unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: sanitize(width),
            height: sanitize(height),
        }
    }

    pub fn is_finite_non_negative(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width >= 0.0 && self.height >= 0.0
    }
}

/// Which side of the surface changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Width,
    Height,
}

pub type SizeListener = Box<dyn FnMut(Dimension, f64, f64)>;

/// Surface size plus the listeners notified whenever one of its dimensions
/// changes. Listeners run synchronously, once per changed dimension, with the
/// old and new values.
pub struct ObservableSize {
    value: Size,
    listeners: Vec<SizeListener>,
}

impl ObservableSize {
    pub fn new(initial: Size) -> Self {
        Self {
            value: Size::new(initial.width, initial.height),
            listeners: Vec::new(),
        }
    }

    pub fn get(&self) -> Size {
        self.value
    }

    pub fn add_listener(&mut self, listener: SizeListener) {
        self.listeners.push(listener);
    }

    pub fn set_width(&mut self, width: f64) -> bool {
        let width = sanitize(width);
        let old = self.value.width;
        if old == width {
            return false;
        }
        self.value.width = width;
        self.notify(Dimension::Width, old, width);
        true
    }

    pub fn set_height(&mut self, height: f64) -> bool {
        let height = sanitize(height);
        let old = self.value.height;
        if old == height {
            return false;
        }
        self.value.height = height;
        self.notify(Dimension::Height, old, height);
        true
    }

    fn notify(&mut self, dimension: Dimension, old: f64, new: f64) {
        for listener in &mut self.listeners {
            listener(dimension, old, new);
        }
    }
}

impl std::fmt::Debug for ObservableSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObservableSize")
            .field("value", &self.value)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

fn sanitize(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn listeners_fire_once_per_changed_dimension() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut size = ObservableSize::new(Size::ZERO);
        {
            let seen = seen.clone();
            size.add_listener(Box::new(move |dim, old, new| {
                seen.borrow_mut().push((dim, old, new));
            }));
        }

        assert!(size.set_width(800.0));
        assert!(!size.set_width(800.0));
        assert!(size.set_height(600.5));

        assert_eq!(
            *seen.borrow(),
            vec![
                (Dimension::Width, 0.0, 800.0),
                (Dimension::Height, 0.0, 600.5)
            ]
        );
        assert_eq!(size.get(), Size::new(800.0, 600.5));
    }

    #[test]
    fn invalid_values_clamp_to_zero() {
        let mut size = ObservableSize::new(Size::new(10.0, 10.0));
        size.set_width(f64::NAN);
        size.set_height(-4.0);
        assert_eq!(size.get(), Size::ZERO);
    }
}
