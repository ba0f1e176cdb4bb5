//! Logical board geometry.
//!
//! All collision and persistence work on the *world* rectangle: integer,
//! axis-aligned, independent of camera zoom or board rotation. Screen
//! projection is a presentation concern and only exists here as
//! [`Rect::scaled`] for renderers that want it.
//!
//! Positions written by moves are quantized to a fixed grid (see
//! [`snap_to_grid`]) so that every replica ends on the same integer
//! coordinates regardless of how it interpolated.

use serde::{Deserialize, Serialize};

/// Rotation quantum in degrees.
pub const ROTATION_STEP: u16 = 90;

/// Full turn in degrees.
pub const FULL_TURN: u16 = 360;

/// Largest coordinate or size the board accepts, in either direction.
///
/// Keeps `x + width` and layout sums well inside `i32`.
pub const BOARD_LIMIT: i32 = 1 << 20;

/// Is `value` a coordinate the board can hold?
#[must_use]
pub const fn within_board(value: i32) -> bool {
    value >= -BOARD_LIMIT && value <= BOARD_LIMIT
}

/// A logical pointer or object position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Linear interpolation towards `other` (`t` in `0.0..=1.0`).
    #[must_use]
    pub fn lerp(self, other: Point, t: f32) -> Point {
        Point {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }

    #[must_use]
    pub fn offset(self, dx: f32, dy: f32) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }

    /// Euclidean distance.
    #[must_use]
    pub fn distance(self, other: Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Axis-aligned integer rectangle in world coordinates.
///
/// Semantics follow the usual half-open convention: a rect covers
/// `x..x+width` horizontally and `y..y+height` vertically.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Rectangle spanned by two corner points, in any order.
    #[must_use]
    pub fn from_corners(a: Point, b: Point) -> Self {
        let x = a.x.min(b.x);
        let y = a.y.min(b.y);
        Self {
            x: x.round() as i32,
            y: y.round() as i32,
            width: (a.x - b.x).abs().round() as i32,
            height: (a.y - b.y).abs().round() as i32,
        }
    }

    #[must_use]
    pub const fn right(&self) -> i32 {
        self.x + self.width
    }

    #[must_use]
    pub const fn bottom(&self) -> i32 {
        self.y + self.height
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    #[must_use]
    pub fn top_left(&self) -> Point {
        Point::new(self.x as f32, self.y as f32)
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(
            self.x as f32 + self.width as f32 / 2.0,
            self.y as f32 + self.height as f32 / 2.0,
        )
    }

    /// Does the rect contain the point?
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x as f32
            && p.x < self.right() as f32
            && p.y >= self.y as f32
            && p.y < self.bottom() as f32
    }

    /// Do the two rects overlap with a non-zero area?
    #[must_use]
    pub fn intersects(&self, other: &Rect) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Smallest rect covering both.
    #[must_use]
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect {
            x,
            y,
            width: self.right().max(other.right()) - x,
            height: self.bottom().max(other.bottom()) - y,
        }
    }

    /// Same size, new top-left corner.
    #[must_use]
    pub const fn moved_to(self, x: i32, y: i32) -> Rect {
        Rect { x, y, ..self }
    }

    /// Position inside the board and a size no larger than it.
    #[must_use]
    pub const fn within_board(&self) -> bool {
        within_board(self.x)
            && within_board(self.y)
            && self.width >= 0
            && self.width <= BOARD_LIMIT
            && self.height >= 0
            && self.height <= BOARD_LIMIT
    }

    /// Width and height exchanged (a quarter turn of an axis-aligned box).
    #[must_use]
    pub const fn swapped(self) -> Rect {
        Rect {
            width: self.height,
            height: self.width,
            ..self
        }
    }

    /// Presentation-only projection for a renderer at `zoom`.
    #[must_use]
    pub fn scaled(&self, zoom: f32) -> Rect {
        Rect {
            x: (self.x as f32 * zoom).round() as i32,
            y: (self.y as f32 * zoom).round() as i32,
            width: (self.width as f32 * zoom).round() as i32,
            height: (self.height as f32 * zoom).round() as i32,
        }
    }
}

/// Quantize a coordinate to the nearest multiple of `step`.
///
/// A `step` of 1 or less only rounds to the nearest integer. The result is
/// clamped to [`BOARD_LIMIT`]; NaN snaps to 0.
#[must_use]
pub fn snap_to_grid(value: f32, step: i32) -> i32 {
    let value = f64::from(value);
    let snapped = if step <= 1 {
        value.round()
    } else {
        let step = f64::from(step);
        (value / step).round() * step
    };
    let limit = f64::from(BOARD_LIMIT);
    // `as` maps NaN to 0
    snapped.clamp(-limit, limit) as i32
}

/// Rotation of a board object, always a multiple of 90° in `0..360`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct Rotation(u16);

impl Rotation {
    pub const ZERO: Rotation = Rotation(0);

    /// Build from degrees. Returns `None` unless `degrees` is a multiple of 90.
    #[must_use]
    pub fn from_degrees(degrees: i32) -> Option<Self> {
        if degrees % ROTATION_STEP as i32 != 0 {
            return None;
        }
        Some(Self(degrees.rem_euclid(FULL_TURN as i32) as u16))
    }

    #[must_use]
    pub const fn degrees(self) -> u16 {
        self.0
    }

    /// Rotate one quarter turn in `direction` (`+1` or `-1`).
    #[must_use]
    pub fn turned(self, direction: i8) -> Rotation {
        let next = self.0 as i32 + ROTATION_STEP as i32 * direction as i32;
        Rotation(next.rem_euclid(FULL_TURN as i32) as u16)
    }

    /// Is the object lying sideways relative to its loaded orientation?
    #[must_use]
    pub const fn is_sideways(self) -> bool {
        self.0 == 90 || self.0 == 270
    }
}

impl TryFrom<u16> for Rotation {
    type Error = String;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Rotation::from_degrees(value as i32)
            .ok_or_else(|| format!("rotation {value} is not a multiple of {ROTATION_STEP}"))
    }
}

impl From<Rotation> for u16 {
    fn from(r: Rotation) -> u16 {
        r.0
    }
}

impl std::fmt::Display for Rotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}°", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_is_half_open() {
        let r = Rect::new(0, 0, 10, 10);
        assert!(r.contains(Point::new(0.0, 0.0)));
        assert!(r.contains(Point::new(9.5, 9.5)));
        assert!(!r.contains(Point::new(10.0, 5.0)));
        assert!(!r.contains(Point::new(5.0, 10.0)));
    }

    #[test]
    fn test_intersects() {
        let a = Rect::new(0, 0, 10, 10);
        assert!(a.intersects(&Rect::new(5, 5, 10, 10)));
        // Touching edges do not overlap
        assert!(!a.intersects(&Rect::new(10, 0, 10, 10)));
        // Empty rects never collide
        assert!(!a.intersects(&Rect::new(2, 2, 0, 5)));
    }

    #[test]
    fn test_union() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(20, 5, 10, 20);
        assert_eq!(a.union(&b), Rect::new(0, 0, 30, 25));
    }

    #[test]
    fn test_from_corners_any_order() {
        let r = Rect::from_corners(Point::new(50.0, 40.0), Point::new(10.0, 60.0));
        assert_eq!(r, Rect::new(10, 40, 40, 20));
    }

    #[test]
    fn test_snap_to_grid() {
        assert_eq!(snap_to_grid(101.0, 5), 100);
        assert_eq!(snap_to_grid(103.0, 5), 105);
        assert_eq!(snap_to_grid(-7.0, 5), -5);
        assert_eq!(snap_to_grid(12.4, 1), 12);
    }

    #[test]
    fn test_rotation_wraps() {
        let r = Rotation::ZERO.turned(-1);
        assert_eq!(r.degrees(), 270);
        assert_eq!(r.turned(1), Rotation::ZERO);
        assert!(r.is_sideways());
    }

    #[test]
    fn test_rotation_rejects_odd_angles() {
        assert!(Rotation::from_degrees(45).is_none());
        assert_eq!(Rotation::from_degrees(450), Rotation::from_degrees(90));
        assert!(serde_json::from_str::<Rotation>("45").is_err());
        assert_eq!(serde_json::from_str::<Rotation>("180").unwrap().degrees(), 180);
    }

    #[test]
    fn test_swapped() {
        assert_eq!(Rect::new(1, 2, 50, 70).swapped(), Rect::new(1, 2, 70, 50));
    }

    #[test]
    fn test_snap_saturates_at_board_limit() {
        assert_eq!(snap_to_grid(f32::MAX, 5), BOARD_LIMIT);
        assert_eq!(snap_to_grid(-3.0e9, 5), -BOARD_LIMIT);
        assert_eq!(snap_to_grid(2_147_483_647.0, 1), BOARD_LIMIT);
        assert_eq!(snap_to_grid(f32::NAN, 5), 0);
    }

    #[test]
    fn test_within_board() {
        assert!(Rect::new(-100, 40, 50, 70).within_board());
        assert!(!Rect::new(i32::MAX, 0, 50, 70).within_board());
        assert!(!Rect::new(0, 0, -1, 70).within_board());
        assert!(!Rect::new(0, 0, 50, BOARD_LIMIT + 1).within_board());
    }

    #[test]
    fn test_scaled_leaves_world_rect_alone() {
        let world = Rect::new(10, 20, 50, 70);
        assert_eq!(world.scaled(2.0), Rect::new(20, 40, 100, 140));
        assert_eq!(world.scaled(0.5), Rect::new(5, 10, 25, 35));
        assert_eq!(world, Rect::new(10, 20, 50, 70));
    }
}
