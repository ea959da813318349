//! Geometry primitives
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::cmp::{max, min};

/// An x,y coordinate pair
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Point {
    /// An absolute x coordinate relative to the root window
    pub x: u32,
    /// An absolute y coordinate relative to the root window
    pub y: u32,
}

impl Point {
    /// Create a new Point.
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// An X window / screen position: top left corner + extent
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Default, Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Rect {
    /// The x-coordinate of the top left corner of this rect
    pub x: u32,
    /// The y-coordinate of the top left corner of this rect
    pub y: u32,
    /// The width of this rect
    pub w: u32,
    /// The height of this rect
    pub h: u32,
}

impl Rect {
    /// Create a new Rect.
    pub const fn new(x: u32, y: u32, w: u32, h: u32) -> Rect {
        Rect { x, y, w, h }
    }

    /// The midpoint of this rectangle.
    ///
    /// Odd side lengths will lead to a truncated point towards the top left corner
    /// in order to maintain integer coordinates.
    /// ```
    /// # use gowm::pure::geometry::{Rect, Point};
    /// let r = Rect::new(0, 0, 100, 200);
    ///
    /// assert_eq!(r.midpoint(), Point { x: 50, y: 100 });
    /// ```
    pub fn midpoint(&self) -> Point {
        Point {
            x: self.x + self.w / 2,
            y: self.y + self.h / 2,
        }
    }

    /// The area of the region shared by this [Rect] and `other`, zero if they do not overlap.
    /// ```
    /// # use gowm::pure::geometry::Rect;
    /// let a = Rect::new(0, 0, 100, 100);
    /// let b = Rect::new(50, 50, 100, 100);
    ///
    /// assert_eq!(a.overlap_area(&b), 2500);
    /// assert_eq!(a.overlap_area(&Rect::new(100, 0, 10, 10)), 0);
    /// ```
    pub fn overlap_area(&self, other: &Rect) -> u64 {
        let x1 = max(self.x as u64, other.x as u64);
        let y1 = max(self.y as u64, other.y as u64);
        let x2 = min(
            self.x as u64 + self.w as u64,
            other.x as u64 + other.w as u64,
        );
        let y2 = min(
            self.y as u64 + self.h as u64,
            other.y as u64 + other.h as u64,
        );

        if x2 <= x1 || y2 <= y1 {
            return 0;
        }

        (x2 - x1) * (y2 - y1)
    }
}
