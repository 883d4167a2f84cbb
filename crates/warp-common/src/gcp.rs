//! Ground control points.

use serde::{Deserialize, Serialize};

/// A correspondence between a source-image pixel and a geodetic position.
///
/// GCPs are produced by the upstream geolocation stage and are immutable
/// once created. When the list is sorted by raster scan order, `y` is
/// monotonic non-decreasing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gcp {
    /// Pixel column in the source raster.
    pub x: f64,
    /// Pixel row (scanline) in the source raster.
    pub y: f64,
    /// Geodetic latitude in degrees.
    pub lat: f64,
    /// Geodetic longitude in degrees.
    pub lon: f64,
}

impl Gcp {
    /// Create a new ground control point.
    pub fn new(x: f64, y: f64, lat: f64, lon: f64) -> Self {
        Self { x, y, lat, lon }
    }

    /// Raster scan-order key: row-major position of this GCP in an image
    /// of the given width.
    pub fn scan_order_key(&self, image_width: usize) -> f64 {
        self.y * image_width as f64 + self.x
    }
}
