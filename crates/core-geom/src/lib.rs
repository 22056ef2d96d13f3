//! Integer pixel geometry shared by layout and selection.
//!
//! Rectangles are half-open (`min` inclusive, `max` exclusive) and always held
//! in canonical form (`min <= max` on both axes). An empty rectangle covers no
//! pixels; all empty rectangles behave as identities for `union` and
//! `difference`.

use std::fmt;
use thiserror::Error;

/// A pixel position. `y` grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn add(self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }

    pub fn sub(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    /// True when `self` comes strictly before `other` in reading order
    /// (earlier line, or same line and further left).
    pub fn precedes(self, other: Point) -> bool {
        self.y < other.y || (self.y == other.y && self.x < other.x)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Axis-aligned half-open rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub min: Point,
    pub max: Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeomError {
    /// The two rectangles share neither a corner nor an extent, so the region
    /// between them is not a single rectangle.
    #[error("cannot take difference of {a} and {b}")]
    Incomparable { a: Rect, b: Rect },
}

impl Rect {
    pub const ZERO: Rect = Rect {
        min: Point::ZERO,
        max: Point::ZERO,
    };

    /// Build a rectangle from two corners, swapping coordinates as needed.
    pub fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self {
            min: Point::new(x0.min(x1), y0.min(y1)),
            max: Point::new(x0.max(x1), y0.max(y1)),
        }
    }

    pub fn from_points(a: Point, b: Point) -> Self {
        Self::new(a.x, a.y, b.x, b.y)
    }

    pub fn dx(&self) -> i32 {
        self.max.x - self.min.x
    }

    pub fn dy(&self) -> i32 {
        self.max.y - self.min.y
    }

    pub fn area(&self) -> i64 {
        if self.is_empty() {
            return 0;
        }
        i64::from(self.dx()) * i64::from(self.dy())
    }

    pub fn is_empty(&self) -> bool {
        self.min.x >= self.max.x || self.min.y >= self.max.y
    }

    /// Collapse any empty rectangle to `Rect::ZERO`.
    pub fn canon(self) -> Rect {
        if self.is_empty() { Rect::ZERO } else { self }
    }

    pub fn contains(&self, pt: Point) -> bool {
        self.min.x <= pt.x && pt.x < self.max.x && self.min.y <= pt.y && pt.y < self.max.y
    }

    /// True when every pixel of `other` lies inside `self`. Empty rectangles
    /// are contained everywhere.
    pub fn contains_rect(&self, other: Rect) -> bool {
        if other.is_empty() {
            return true;
        }
        self.min.x <= other.min.x
            && self.min.y <= other.min.y
            && other.max.x <= self.max.x
            && other.max.y <= self.max.y
    }

    pub fn translate(self, by: Point) -> Rect {
        Rect {
            min: self.min.add(by),
            max: self.max.add(by),
        }
    }

    /// Smallest rectangle covering both operands.
    pub fn union(self, other: Rect) -> Rect {
        if self.is_empty() {
            return other.canon();
        }
        if other.is_empty() {
            return self;
        }
        Rect {
            min: Point::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Point::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    pub fn intersect(self, other: Rect) -> Rect {
        Rect {
            min: Point::new(self.min.x.max(other.min.x), self.min.y.max(other.min.y)),
            max: Point::new(self.max.x.min(other.max.x), self.max.y.min(other.max.y)),
        }
        .canon()
    }

    /// The strip covered by exactly one of `self` and `other`.
    ///
    /// Defined only when the pair can be related by a single strip: either
    /// operand empty, equal operands, equal heights sharing the top-left or
    /// bottom-right corner (horizontal strip), or equal widths sharing one of
    /// those corners (vertical strip).
    pub fn difference(self, other: Rect) -> Result<Rect, GeomError> {
        let (a, b) = (self, other);
        match (a.is_empty(), b.is_empty()) {
            (true, true) => return Ok(Rect::ZERO),
            (true, false) => return Ok(b),
            (false, true) => return Ok(a),
            (false, false) => {}
        }
        if a == b {
            return Ok(Rect::ZERO);
        }
        if a.dy() == b.dy() {
            let (y0, y1) = (a.min.y, a.max.y);
            if a.min == b.min {
                // erase from the left edge outward
                return Ok(Rect::new(a.max.x.min(b.max.x), y0, a.max.x.max(b.max.x), y1));
            }
            if a.max == b.max {
                return Ok(Rect::new(a.min.x.min(b.min.x), y0, a.min.x.max(b.min.x), y1));
            }
        }
        if a.dx() == b.dx() {
            let (x0, x1) = (a.min.x, a.max.x);
            if a.min == b.min {
                return Ok(Rect::new(x0, a.max.y.min(b.max.y), x1, a.max.y.max(b.max.y)));
            }
            if a.max == b.max {
                return Ok(Rect::new(x0, a.min.y.min(b.min.y), x1, a.min.y.max(b.min.y)));
            }
        }
        Err(GeomError::Incomparable { a, b })
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}
