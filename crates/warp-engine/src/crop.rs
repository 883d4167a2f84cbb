//! Crop planning: derive the output window from the GCP footprint.

use warp_common::{CropSettings, Result, WarpError};

use crate::types::WarpOperation;

/// Derive the pixel and geographic bounding box of the output mosaic.
///
/// The operation's `output_width x output_height` define a full-world
/// equirectangular canvas (longitude -180..180 across, latitude 90..-90
/// down). The GCP extremes are quantized to that canvas's pixel grid and
/// the geographic extent is re-derived from the quantized box, so pixel
/// and geographic bounds stay exactly consistent. Windows quantizing to
/// zero size are widened to one pixel.
pub fn choose_crop_area(op: &WarpOperation) -> Result<CropSettings> {
    let gcps = &op.ground_control_points;
    if gcps.is_empty() {
        return Err(WarpError::NotEnoughGcps { needed: 1, got: 0 });
    }

    let mut lat_min = 90.0_f64;
    let mut lat_max = -90.0_f64;
    let mut lon_min = 180.0_f64;
    let mut lon_max = -180.0_f64;
    for gcp in gcps {
        lat_min = lat_min.min(gcp.lat);
        lat_max = lat_max.max(gcp.lat);
        lon_min = lon_min.min(gcp.lon);
        lon_max = lon_max.max(gcp.lon);
    }

    let canvas_w = op.output_width as f64;
    let canvas_h = op.output_height as f64;

    let mut x_min = ((lon_min + 180.0) / 360.0 * canvas_w).floor() as i64;
    let mut x_max = ((lon_max + 180.0) / 360.0 * canvas_w).ceil() as i64;
    let mut y_min = ((90.0 - lat_max) / 180.0 * canvas_h).floor() as i64;
    let mut y_max = ((90.0 - lat_min) / 180.0 * canvas_h).ceil() as i64;

    x_min = x_min.clamp(0, op.output_width as i64);
    x_max = x_max.clamp(0, op.output_width as i64);
    y_min = y_min.clamp(0, op.output_height as i64);
    y_max = y_max.clamp(0, op.output_height as i64);

    // A track hugging one meridian or parallel can quantize to an empty
    // window; keep at least one pixel.
    if x_max <= x_min {
        x_max = (x_min + 1).min(op.output_width as i64);
        x_min = x_max - 1;
    }
    if y_max <= y_min {
        y_max = (y_min + 1).min(op.output_height as i64);
        y_min = y_max - 1;
    }

    Ok(CropSettings {
        x_min,
        x_max,
        y_min,
        y_max,
        lon_min: x_min as f64 / canvas_w * 360.0 - 180.0,
        lon_max: x_max as f64 / canvas_w * 360.0 - 180.0,
        lat_min: 90.0 - y_max as f64 / canvas_h * 180.0,
        lat_max: 90.0 - y_min as f64 / canvas_h * 180.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use warp_common::{Gcp, Image16};

    fn operation_with_gcps(gcps: Vec<Gcp>) -> WarpOperation {
        WarpOperation::new(Image16::new(8, 8, 1), gcps, 360, 180)
    }

    #[test]
    fn test_no_gcps_is_an_error() {
        let op = operation_with_gcps(Vec::new());
        assert!(matches!(
            choose_crop_area(&op),
            Err(WarpError::NotEnoughGcps { .. })
        ));
    }

    #[test]
    fn test_pixel_and_geo_bounds_agree() {
        let op = operation_with_gcps(vec![
            Gcp::new(0.0, 0.0, 50.0, 10.0),
            Gcp::new(7.0, 7.0, 43.0, 17.0),
        ]);
        let crop = choose_crop_area(&op).unwrap();

        // On a 360x180 canvas one pixel is one degree.
        assert_eq!(crop.x_min, 190);
        assert_eq!(crop.x_max, 197);
        assert_eq!(crop.y_min, 40);
        assert_eq!(crop.y_max, 47);
        assert!((crop.lon_min - 10.0).abs() < 1e-9);
        assert!((crop.lon_max - 17.0).abs() < 1e-9);
        assert!((crop.lat_max - 50.0).abs() < 1e-9);
        assert!((crop.lat_min - 43.0).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_window_is_widened() {
        // All GCPs at a single position.
        let op = operation_with_gcps(vec![
            Gcp::new(0.0, 0.0, 45.0, 45.0),
            Gcp::new(1.0, 1.0, 45.0, 45.0),
        ]);
        let crop = choose_crop_area(&op).unwrap();
        assert_eq!(crop.width(), 1);
        assert_eq!(crop.height(), 1);
        assert!(crop.lon_max > crop.lon_min);
        assert!(crop.lat_max > crop.lat_min);
    }

    #[test]
    fn test_crop_is_clamped_to_canvas() {
        let op = operation_with_gcps(vec![
            Gcp::new(0.0, 0.0, 90.0, -180.0),
            Gcp::new(1.0, 1.0, -90.0, 180.0),
        ]);
        let crop = choose_crop_area(&op).unwrap();
        assert_eq!(crop.x_min, 0);
        assert_eq!(crop.x_max, 360);
        assert_eq!(crop.y_min, 0);
        assert_eq!(crop.y_max, 180);
    }
}
