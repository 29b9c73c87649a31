//! Axis-aligned bounding boxes in pixel coordinates

use serde::{Deserialize, Serialize};

/// Axis-aligned box `[x1, y1, x2, y2]` in pixels, top-left origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl BoundingBox {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Build from center, width and height
    pub fn from_center(cx: f64, cy: f64, width: f64, height: f64) -> Self {
        Self {
            x1: cx - width / 2.0,
            y1: cy - height / 2.0,
            x2: cx + width / 2.0,
            y2: cy + height / 2.0,
        }
    }

    /// Build from a `[cx, cy, area, aspect]` filter measurement
    pub fn from_measurement(cx: f64, cy: f64, area: f64, aspect: f64) -> Option<Self> {
        if !(area > 0.0 && aspect > 0.0) {
            return None;
        }
        let width = (area * aspect).sqrt();
        let height = area / width;
        let bbox = Self::from_center(cx, cy, width, height);
        bbox.is_valid().then_some(bbox)
    }

    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    pub fn area(&self) -> f64 {
        self.width().max(0.0) * self.height().max(0.0)
    }

    pub fn center(&self) -> (f64, f64) {
        ((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }

    /// Width over height
    pub fn aspect_ratio(&self) -> f64 {
        self.width() / self.height()
    }

    /// Finite coordinates and strictly positive extent
    pub fn is_valid(&self) -> bool {
        [self.x1, self.y1, self.x2, self.y2].iter().all(|v| v.is_finite())
            && self.x2 > self.x1
            && self.y2 > self.y1
    }

    /// `[cx, cy, area, aspect]` as consumed by the Kalman filter
    pub fn to_measurement(&self) -> [f64; 4] {
        let (cx, cy) = self.center();
        [cx, cy, self.area(), self.aspect_ratio()]
    }

    /// Intersection over union, 0.0 for disjoint or degenerate boxes
    pub fn iou(&self, other: &BoundingBox) -> f64 {
        let ix = (self.x2.min(other.x2) - self.x1.max(other.x1)).max(0.0);
        let iy = (self.y2.min(other.y2) - self.y1.max(other.y1)).max(0.0);
        let intersection = ix * iy;
        let union = self.area() + other.area() - intersection;

        if union <= 0.0 || !union.is_finite() {
            return 0.0;
        }
        (intersection / union).clamp(0.0, 1.0)
    }
}
