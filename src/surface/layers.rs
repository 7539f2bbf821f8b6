use std::fmt;

use super::background::NodeId;

/// One entry of the surface's child list, bottom-most first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Background(NodeId),
    Placeholder,
    Notices,
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layer::Background(_) => f.write_str("background"),
            Layer::Placeholder => f.write_str("placeholder"),
            Layer::Notices => f.write_str("notices"),
        }
    }
}

/// Ordered children of the surface. Index 0 is drawn first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChildList {
    layers: Vec<Layer>,
}

impl ChildList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, layer: Layer) -> bool {
        self.layers.contains(&layer)
    }

    pub fn first(&self) -> Option<Layer> {
        self.layers.first().copied()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Layer> + '_ {
        self.layers.iter().copied()
    }

    pub fn push(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    pub fn remove(&mut self, layer: Layer) -> bool {
        let before = self.layers.len();
        self.layers.retain(|l| *l != layer);
        before != self.layers.len()
    }

    /// Moves `layer` to slot 0, inserting it when absent.
    pub fn ensure_first(&mut self, layer: Layer) {
        if self.first() == Some(layer) {
            return;
        }
        self.remove(layer);
        self.layers.insert(0, layer);
    }

    /// Moves `layer` to the top, inserting it when absent.
    pub fn ensure_last(&mut self, layer: Layer) {
        if self.layers.last() == Some(&layer) {
            return;
        }
        self.remove(layer);
        self.layers.push(layer);
    }

    /// Drops background nodes that are not `current`.
    pub fn retain_background(&mut self, current: NodeId) -> usize {
        let before = self.layers.len();
        self.layers
            .retain(|l| !matches!(l, Layer::Background(id) if *id != current));
        before - self.layers.len()
    }

    pub fn names(&self) -> Vec<String> {
        self.layers.iter().map(ToString::to_string).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::background::Background;

    #[test]
    fn ensure_first_moves_without_duplicating() {
        let bg = Background::colour([0, 0, 0]).id();
        let mut list = ChildList::new();
        list.push(Layer::Notices);
        list.push(Layer::Placeholder);
        list.ensure_first(Layer::Placeholder);
        list.ensure_first(Layer::Placeholder);
        assert_eq!(list.iter().collect::<Vec<_>>(), vec![Layer::Placeholder, Layer::Notices]);

        list.ensure_first(Layer::Background(bg));
        assert_eq!(list.first(), Some(Layer::Background(bg)));
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn stale_backgrounds_are_dropped() {
        let old = Background::colour([0, 0, 0]).id();
        let new = Background::colour([1, 1, 1]).id();
        let mut list = ChildList::new();
        list.push(Layer::Background(old));
        list.push(Layer::Background(new));
        list.push(Layer::Notices);
        assert_eq!(list.retain_background(new), 1);
        assert_eq!(list.names(), vec!["background", "notices"]);
    }
}
