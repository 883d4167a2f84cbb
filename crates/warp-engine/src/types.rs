//! Core types for the warp pipeline.

use warp_common::{Gcp, Image16};

use crate::tps::TpsTransform;

/// A full georeferencing request: the source raster, its ground control
/// points, and the requested output canvas.
///
/// `output_width` and `output_height` describe the full-world
/// equirectangular canvas the final crop window is cut from, not the size
/// of the returned raster.
#[derive(Debug, Clone)]
pub struct WarpOperation {
    /// Source raster, scanlines in capture order.
    pub input_image: Image16,
    /// Ground control points over the whole source raster.
    pub ground_control_points: Vec<Gcp>,
    /// Width of the full-world output canvas in pixels.
    pub output_width: usize,
    /// Height of the full-world output canvas in pixels.
    pub output_height: usize,
    /// Emit an RGBA raster instead of the native channel count.
    pub output_rgba: bool,
    /// Longitude re-centering shift applied before projection, degrees.
    pub shift_lon: f64,
    /// Latitude re-centering shift applied before projection, degrees.
    pub shift_lat: f64,
}

impl WarpOperation {
    /// Create an operation with no re-centering shift and RGBA output.
    pub fn new(
        input_image: Image16,
        ground_control_points: Vec<Gcp>,
        output_width: usize,
        output_height: usize,
    ) -> Self {
        Self {
            input_image,
            ground_control_points,
            output_width,
            output_height,
            output_rgba: true,
            shift_lon: 0.0,
            shift_lat: 0.0,
        }
    }

    /// Channel count of the warped raster, alpha included.
    ///
    /// RGBA output carries alpha as its fourth channel; native output
    /// appends alpha after the source channels.
    pub fn warped_channel_count(&self) -> usize {
        if self.output_rgba {
            4
        } else {
            self.input_image.channels() + 1
        }
    }

    /// Clone this operation scoped to one segment: the source raster is
    /// cut down to the segment's scanlines and the GCP list replaced with
    /// the segment's rebased subset.
    pub fn scoped_to_segment(&self, segment: &SegmentConfig) -> Self {
        Self {
            input_image: self
                .input_image
                .crop_rows(segment.y_start.max(0) as usize, segment.y_end.max(0) as usize),
            ground_control_points: segment.gcps.clone(),
            output_width: self.output_width,
            output_height: self.output_height,
            output_rgba: self.output_rgba,
            shift_lon: segment.shift_lon,
            shift_lat: segment.shift_lat,
        }
    }
}

/// One scanline range of the source raster, warped with its own transform.
#[derive(Debug, Clone)]
pub struct SegmentConfig {
    /// First source scanline of the segment (inclusive).
    pub y_start: i64,
    /// One past the last source scanline of the segment.
    pub y_end: i64,
    /// Longitude re-centering shift for this segment, degrees.
    pub shift_lon: f64,
    /// Latitude re-centering shift for this segment, degrees.
    pub shift_lat: f64,
    /// GCPs inside the segment, with `y` rebased to segment-local rows.
    pub gcps: Vec<Gcp>,
    /// Fitted transform, filled in by the parallel fit phase.
    pub transform: Option<TpsTransform>,
}

/// A raster pixel annotated with its geodetic position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoreferencedCorner {
    pub x: f64,
    pub y: f64,
    pub lon: f64,
    pub lat: f64,
}

/// A warped raster and the geodetic positions of its corners.
///
/// Produced once per segment during warping and once for the final mosaic.
#[derive(Debug, Clone)]
pub struct WarpResult {
    /// Warped raster; the last channel is validity alpha.
    pub raster: Image16,
    pub top_left: GeoreferencedCorner,
    pub top_right: GeoreferencedCorner,
    pub bottom_left: GeoreferencedCorner,
    pub bottom_right: GeoreferencedCorner,
}
