use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::geometry::PlacedRect;

/// An instantiable shape from the stock catalog.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RectangleType {
    pub width: f64,
    pub height: f64,
    pub value: f64,
}

impl RectangleType {
    pub fn new(width: f64, height: f64, value: f64) -> Self {
        Self {
            width,
            height,
            value,
        }
    }

    pub fn rotated(&self) -> Self {
        Self {
            width: self.height,
            height: self.width,
            value: self.value,
        }
    }

    /// Instantiate at a lower-left anchor point.
    pub fn place(&self, x: f64, y: f64) -> PlacedRect {
        PlacedRect {
            x_min: x,
            y_min: y,
            x_max: x + self.width,
            y_max: y + self.height,
            value: self.value,
        }
    }
}

impl std::fmt::Display for RectangleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{} (value {})", self.width, self.height, self.value)
    }
}

/// The finite set of shapes available to growth and mutation. Each input
/// shape is stored twice, once per orientation, so sampling picks either
/// orientation with equal probability regardless of aspect ratio.
#[derive(Debug, Clone)]
pub struct Catalog {
    types: Vec<RectangleType>,
}

impl Catalog {
    pub fn new(rows: impl IntoIterator<Item = RectangleType>) -> Self {
        let mut types = Vec::new();
        for row in rows {
            types.push(row);
            types.push(row.rotated());
        }
        Self { types }
    }

    pub fn count(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn types(&self) -> &[RectangleType] {
        &self.types
    }

    /// A uniformly chosen catalog entry anchored at `(x, y)`.
    ///
    /// Panics on an empty catalog; `Evolution::new` rejects those up front.
    pub fn place_random<R: Rng>(&self, rng: &mut R, x: f64, y: f64) -> PlacedRect {
        self.types[rng.gen_range(0..self.types.len())].place(x, y)
    }
}
