use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Whether the point lies inside the rectangle (edges inclusive).
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.x + self.w && y >= self.y && y <= self.y + self.h
    }
}

/// Logical object a drawn shape stands for, so a backend can route
/// pointer events back to the core without re-deriving geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HitTarget {
    /// Index into the view's band layout.
    Band(usize),
    /// Registry id of a selection range.
    Selector(u64),
    /// Left or right resize grip of a selection range.
    SelectorEdge { selector: u64, right: bool },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_contains_edges() {
        let r = Rect::new(10.0, 30.0, 90.0, 20.0);
        assert!(r.contains(10.0, 30.0));
        assert!(r.contains(100.0, 50.0));
        assert!(!r.contains(100.1, 40.0));
        assert!(!r.contains(50.0, 29.9));
    }
}
