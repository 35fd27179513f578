use crate::math::Point2;

/// An axis-aligned box in the radial/axial (r, z) plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Box2 {
    /// Minimum corner of the box.
    pub min: Point2,
    /// Maximum corner of the box.
    pub max: Point2,
}

impl Box2 {
    /// Creates a box from two opposite corners, normalizing bound order.
    #[must_use]
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            min: Point2::new(x0.min(x1), y0.min(y1)),
            max: Point2::new(x0.max(x1), y0.max(y1)),
        }
    }

    /// Smallest box enclosing a set of points.
    ///
    /// Returns `None` for an empty set.
    #[must_use]
    pub fn from_points(points: &[Point2]) -> Option<Self> {
        let first = points.first()?;
        let mut b = Self::new(first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            b.min.x = b.min.x.min(p.x);
            b.min.y = b.min.y.min(p.y);
            b.max.x = b.max.x.max(p.x);
            b.max.y = b.max.y.max(p.y);
        }
        Some(b)
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    #[must_use]
    pub fn center(&self) -> Point2 {
        Point2::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }

    /// Whether `p` lies inside or on the boundary of the box.
    #[must_use]
    pub fn contains_point(&self, p: &Point2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Whether `other` lies entirely inside this box (boundary included).
    #[must_use]
    pub fn contains_box(&self, other: &Self) -> bool {
        self.contains_point(&other.min) && self.contains_point(&other.max)
    }

    /// Whether the two boxes overlap (touching counts).
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// Smallest box enclosing both operands.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: Point2::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Point2::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    /// Expands the box by a relative tolerance, sign-aware.
    ///
    /// Positive bounds grow away from zero by a factor `1 + eps` (max side) or
    /// shrink towards zero by `1 - eps` (min side); negative bounds mirror
    /// that, and an exact-zero bound is replaced by `±eps` so the box never
    /// degenerates to a zero-width slab. The padded box always contains the
    /// original, and growing `eps` only grows the box further.
    #[must_use]
    pub fn padded(&self, eps: f64) -> Self {
        Self {
            min: Point2::new(pad_low(self.min.x, eps), pad_low(self.min.y, eps)),
            max: Point2::new(pad_high(self.max.x, eps), pad_high(self.max.y, eps)),
        }
    }
}

fn pad_low(v: f64, eps: f64) -> f64 {
    if v == 0.0 {
        -eps
    } else if v > 0.0 {
        v * (1.0 - eps)
    } else {
        v * (1.0 + eps)
    }
}

fn pad_high(v: f64, eps: f64) -> f64 {
    if v == 0.0 {
        eps
    } else if v > 0.0 {
        v * (1.0 + eps)
    } else {
        v * (1.0 - eps)
    }
}
