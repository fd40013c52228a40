use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle placed in the plane, carrying the value of the
/// catalog shape it was cut from. Positions are mutable (the compaction
/// sweeps translate rectangles); extents and value are not.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacedRect {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
    pub value: f64,
}

impl PlacedRect {
    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    pub fn density(&self) -> f64 {
        self.value / (self.width() * self.height())
    }

    /// Disjointness test. Closed-edge touching counts as non-overlapping,
    /// so compacted rectangles may share edges.
    pub fn not_overlaps(&self, other: &PlacedRect) -> bool {
        other.y_max <= self.y_min
            || other.y_min >= self.y_max
            || other.x_max <= self.x_min
            || other.x_min >= self.x_max
    }

    /// Corner-sampled containment: all four corners inside the disc. A
    /// rectangle whose edge bulges past the arc between two inside corners
    /// is accepted; known limitation, kept for fidelity.
    pub fn in_circle(&self, radius: f64) -> bool {
        let r2 = radius * radius;
        self.x_max * self.x_max + self.y_max * self.y_max <= r2
            && self.x_max * self.x_max + self.y_min * self.y_min <= r2
            && self.x_min * self.x_min + self.y_max * self.y_max <= r2
            && self.x_min * self.x_min + self.y_min * self.y_min <= r2
    }

    /// At least one bottom corner strictly below the line `y = a*x + b`.
    pub fn under_line(&self, a: f64, b: f64) -> bool {
        self.y_min < a * self.x_max + b || self.y_min < a * self.x_min + b
    }

    /// At least one top corner strictly above the line `y = a*x + b`.
    pub fn over_line(&self, a: f64, b: f64) -> bool {
        self.y_max > a * self.x_max + b || self.y_max > a * self.x_min + b
    }

    pub fn move_left_to(&mut self, x: f64) {
        let width = self.width();
        self.x_min = x;
        self.x_max = x + width;
    }

    pub fn move_down_to(&mut self, y: f64) {
        let height = self.height();
        self.y_min = y;
        self.y_max = y + height;
    }

    /// Leftmost `x_min` still inside the disc for the current y-span.
    pub fn left_in_circle(&self, radius: f64) -> f64 {
        let y = self.y_min.abs().max(self.y_max.abs());
        -(radius * radius - y * y).sqrt()
    }

    /// Lowest `y_min` still inside the disc for the current x-span.
    pub fn down_in_circle(&self, radius: f64) -> f64 {
        let x = self.x_min.abs().max(self.x_max.abs());
        -(radius * radius - x * x).sqrt()
    }
}

impl std::fmt::Display for PlacedRect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}x{} @ ({:.2}, {:.2})",
            self.width(),
            self.height(),
            self.x_min,
            self.y_min
        )
    }
}
