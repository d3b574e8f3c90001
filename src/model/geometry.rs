//! Points, rectangles, and affine transforms.

use serde::{Deserialize, Serialize};

/// A 2D point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
}

impl Point {
    /// Create a new point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Translate by another point.
    pub fn offset(&self, by: Point) -> Point {
        Point::new(self.x + by.x, self.y + by.y)
    }
}

/// An axis-aligned rectangle. `y` grows downward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x: f64,
    /// Top edge
    pub y: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle spanning two opposite corners, in any order.
    pub fn from_corners(a: Point, b: Point) -> Self {
        let (x0, x1) = (a.x.min(b.x), a.x.max(b.x));
        let (y0, y1) = (a.y.min(b.y), a.y.max(b.y));
        Self::new(x0, y0, x1 - x0, y1 - y0)
    }

    /// Bounding box of a set of points; `None` if empty.
    pub fn bounding(points: &[Point]) -> Option<Rect> {
        let first = points.first()?;
        let (mut min, mut max) = (*first, *first);
        for p in &points[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Some(Rect::from_corners(min, max))
    }

    /// Right edge.
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Center point.
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Area.
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Four corners: top-left, top-right, bottom-right, bottom-left.
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.x, self.y),
            Point::new(self.right(), self.y),
            Point::new(self.right(), self.bottom()),
            Point::new(self.x, self.bottom()),
        ]
    }

    /// Whether the point lies inside or on the edge.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// Whether this rectangle covers `other` with `tolerance` slack per side.
    pub fn covers(&self, other: &Rect, tolerance: f64) -> bool {
        self.x <= other.x + tolerance
            && self.y <= other.y + tolerance
            && self.right() >= other.right() - tolerance
            && self.bottom() >= other.bottom() - tolerance
    }

    /// Translate by a point.
    pub fn offset(&self, by: Point) -> Rect {
        Rect::new(self.x + by.x, self.y + by.y, self.width, self.height)
    }

    /// Scale every coordinate.
    pub fn scaled(&self, factor: f64) -> Rect {
        Rect::new(
            self.x * factor,
            self.y * factor,
            self.width * factor,
            self.height * factor,
        )
    }

    /// Round every coordinate to two decimals.
    pub fn rounded(&self) -> Rect {
        use crate::units::round2;
        Rect::new(
            round2(self.x),
            round2(self.y),
            round2(self.width),
            round2(self.height),
        )
    }
}

/// A 2D affine transform `[a b c d tx ty]`, applied as
/// `x' = a·x + c·y + tx`, `y' = b·x + d·y + ty`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// X scale / rotation
    pub a: f64,
    /// Rotation / skew
    pub b: f64,
    /// Rotation / skew
    pub c: f64,
    /// Y scale / rotation
    pub d: f64,
    /// X translation
    pub tx: f64,
    /// Y translation
    pub ty: f64,
}

impl Transform {
    /// The identity transform.
    pub const IDENTITY: Transform = Transform {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    /// Create a transform from its six components.
    pub fn new(a: f64, b: f64, c: f64, d: f64, tx: f64, ty: f64) -> Self {
        Self { a, b, c, d, tx, ty }
    }

    /// Pure translation.
    pub fn translation(tx: f64, ty: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    /// Build from exactly six finite numbers.
    pub fn from_slice(values: &[f64]) -> Option<Self> {
        match values {
            [a, b, c, d, tx, ty] if values.iter().all(|v| v.is_finite()) => {
                Some(Self::new(*a, *b, *c, *d, *tx, *ty))
            }
            _ => None,
        }
    }

    /// Apply `self` first, then `outer`.
    pub fn then(&self, outer: &Transform) -> Transform {
        Transform {
            a: self.a * outer.a + self.b * outer.c,
            b: self.a * outer.b + self.b * outer.d,
            c: self.c * outer.a + self.d * outer.c,
            d: self.c * outer.b + self.d * outer.d,
            tx: self.tx * outer.a + self.ty * outer.c + outer.tx,
            ty: self.tx * outer.b + self.ty * outer.d + outer.ty,
        }
    }

    /// Transform a point.
    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            self.a * p.x + self.c * p.y + self.tx,
            self.b * p.x + self.d * p.y + self.ty,
        )
    }

    /// Horizontal scale factor.
    pub fn scale_x(&self) -> f64 {
        (self.a * self.a + self.b * self.b).sqrt()
    }

    /// Vertical scale factor.
    pub fn scale_y(&self) -> f64 {
        (self.c * self.c + self.d * self.d).sqrt()
    }

    /// Rotation in degrees.
    pub fn rotation_degrees(&self) -> f64 {
        self.b.atan2(self.a).to_degrees()
    }

    /// Axis-aligned bounds of a transformed rectangle.
    pub fn apply_rect(&self, rect: &Rect) -> Rect {
        let corners = rect.corners().map(|p| self.apply(p));
        Rect::bounding(&corners).unwrap_or_default()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}
