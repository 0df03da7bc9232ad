use serde::{Deserialize, Serialize};

#[derive(Default, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImcbBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub w: f32,
    pub h: f32,
}

impl ImcbBox {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            x1,
            y1,
            x2,
            y2,
            w: x2 - x1,
            h: y2 - y1,
        }
    }

    /// Returns the width of the bounding box.
    pub fn width(&self) -> f32 {
        self.w
    }

    /// Returns the height of the bounding box.
    pub fn height(&self) -> f32 {
        self.h
    }

    /// Computes the area of the bounding box.
    pub fn area(&self) -> f32 {
        self.h * self.w
    }

    /// Computes the intersection area between this bounding box and another.
    pub fn intersect(&self, other: &ImcbBox) -> f32 {
        let left = self.x1.max(other.x1);
        let right = self.x2.min(other.x2);
        let top = self.y1.max(other.y1);
        let bottom = self.y2.min(other.y2);
        (right - left).max(0.) * (bottom - top).max(0.)
    }

    /// Computes the union area between this bounding box and another.
    pub fn union(&self, other: &ImcbBox) -> f32 {
        self.area() + other.area() - self.intersect(other)
    }

    /// Computes the intersection over union (IoU) between this bounding box and another.
    pub fn iou(&self, other: &ImcbBox) -> f32 {
        self.intersect(other) / self.union(other)
    }

    pub fn as_xy_wh_i32(&self) -> (i32, i32, i32, i32) {
        (self.x1.round() as i32,
         self.y1.round() as i32,
         self.w.round() as i32,
         self.h.round() as i32)
    }

    pub fn as_x1y1_x2y2_i32(&self) -> (i32, i32, i32, i32) {
        (self.x1.round() as i32,
         self.y1.round() as i32,
         self.x2.round() as i32,
         self.y2.round() as i32)
    }

    /// Sets the bounding box's coordinates using `(x1, y1, x2, y2)` and calculates width and height.
    pub fn with_x1y1_x2y2(mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        self.x1 = x1;
        self.y1 = y1;
        self.x2 = x2;
        self.y2 = y2;

        self.w = x2 - x1;
        self.h = y2 - y1;
        self
    }
}
