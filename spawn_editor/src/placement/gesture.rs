//! Gesture state for click-or-drag spawn placement.

use serde::{Deserialize, Serialize};
use spawn_model::GridBounds;

/// A pointer position in canvas pixels, relative to the canvas' top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PixelPos {
    pub x: f32,
    pub y: f32,
}

impl PixelPos {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A cell on the placement grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridPoint {
    pub x: i32,
    pub y: i32,
}

impl GridPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A rectangle between two grid cells, not necessarily normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridRect {
    pub start: GridPoint,
    pub end: GridPoint,
}

impl GridRect {
    pub const fn new(start: GridPoint, end: GridPoint) -> Self {
        Self { start, end }
    }

    /// Same rectangle with `start` as the min corner and `end` as the max corner.
    pub fn normalized(&self) -> Self {
        Self {
            start: GridPoint::new(self.start.x.min(self.end.x), self.start.y.min(self.end.y)),
            end: GridPoint::new(self.start.x.max(self.end.x), self.start.y.max(self.end.y)),
        }
    }

    /// Same rectangle with both corners saturated into the grid.
    pub fn clamped(&self, grid: GridBounds) -> Self {
        let clamp = |p: GridPoint| GridPoint::new(grid.clamp(p.x as i64), grid.clamp(p.y as i64));
        Self {
            start: clamp(self.start),
            end: clamp(self.end),
        }
    }

    /// Horizontal extent in cells.
    pub fn width(&self) -> i64 {
        (self.end.x as i64 - self.start.x as i64).abs()
    }

    /// Vertical extent in cells.
    pub fn height(&self) -> i64 {
        (self.end.y as i64 - self.start.y as i64).abs()
    }

    /// Half the length of the diagonal, in cells.
    pub fn half_diagonal(&self) -> f64 {
        let w = self.width() as f64;
        let h = self.height() as f64;
        (w * w + h * h).sqrt() / 2.0
    }
}

/// Where the placement gesture currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    /// Pointer is held down; `start` is where it went down, `end` where it is now.
    Dragging { start: GridPoint, end: GridPoint },
}

impl GestureState {
    /// Check if a drag is in progress.
    pub fn is_dragging(&self) -> bool {
        matches!(self, GestureState::Dragging { .. })
    }

    /// The in-flight rectangle, as dragged.
    pub fn rect(&self) -> Option<GridRect> {
        match *self {
            GestureState::Idle => None,
            GestureState::Dragging { start, end } => Some(GridRect::new(start, end)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        let rect = GridRect::new(GridPoint::new(50, 10), GridPoint::new(10, 80)).normalized();
        assert_eq!(rect.start, GridPoint::new(10, 10));
        assert_eq!(rect.end, GridPoint::new(50, 80));
    }

    #[test]
    fn test_extent() {
        let rect = GridRect::new(GridPoint::new(0, 0), GridPoint::new(6, 8));
        assert_eq!(rect.width(), 6);
        assert_eq!(rect.height(), 8);
        assert!((rect.half_diagonal() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_extent_of_extreme_corners() {
        let rect = GridRect::new(GridPoint::new(i32::MIN, 0), GridPoint::new(i32::MAX, 0));
        assert_eq!(rect.width(), u32::MAX as i64);
        assert_eq!(rect.height(), 0);
    }

    #[test]
    fn test_clamped() {
        let rect = GridRect::new(GridPoint::new(i32::MIN, 300), GridPoint::new(i32::MAX, -4))
            .clamped(GridBounds::default());
        assert_eq!(rect.start, GridPoint::new(0, 255));
        assert_eq!(rect.end, GridPoint::new(255, 0));
    }

    #[test]
    fn test_state_rect() {
        assert_eq!(GestureState::Idle.rect(), None);

        let state = GestureState::Dragging {
            start: GridPoint::new(1, 2),
            end: GridPoint::new(3, 4),
        };
        assert!(state.is_dragging());
        assert_eq!(state.rect().unwrap().end, GridPoint::new(3, 4));
    }
}
