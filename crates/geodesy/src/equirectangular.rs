//! Equirectangular (plate carrée) projection over a pixel grid.

use crate::GeodesyError;

/// Linear lon/lat to pixel mapping over a bounded grid.
///
/// The grid is described by its pixel dimensions and the geographic
/// coordinates of its top-left and bottom-right corners. Forward projection
/// reports positions outside the grid as `None` rather than clamping.
#[derive(Debug, Clone)]
pub struct EquirectangularProjection {
    width: f64,
    height: f64,
    tl_lon: f64,
    tl_lat: f64,
    br_lon: f64,
    br_lat: f64,
}

impl EquirectangularProjection {
    /// Create a projection over a `width x height` pixel grid spanning the
    /// given corners.
    pub fn new(
        width: usize,
        height: usize,
        tl_lon: f64,
        tl_lat: f64,
        br_lon: f64,
        br_lat: f64,
    ) -> Result<Self, GeodesyError> {
        if width == 0 || height == 0 {
            return Err(GeodesyError::DegenerateGrid(format!(
                "zero-size grid {}x{}",
                width, height
            )));
        }
        if br_lon <= tl_lon || tl_lat <= br_lat {
            return Err(GeodesyError::DegenerateGrid(format!(
                "inverted corners lon {}..{} lat {}..{}",
                tl_lon, br_lon, br_lat, tl_lat
            )));
        }

        Ok(Self {
            width: width as f64,
            height: height as f64,
            tl_lon,
            tl_lat,
            br_lon,
            br_lat,
        })
    }

    /// Project geodetic coordinates (degrees) to a pixel position.
    ///
    /// Returns `None` when the position falls outside the grid.
    pub fn forward(&self, lon: f64, lat: f64) -> Option<(i64, i64)> {
        let x = ((lon - self.tl_lon) / (self.br_lon - self.tl_lon) * self.width).floor();
        let y = ((self.tl_lat - lat) / (self.tl_lat - self.br_lat) * self.height).floor();

        if x < 0.0 || x >= self.width || y < 0.0 || y >= self.height {
            return None;
        }
        Some((x as i64, y as i64))
    }

    /// Geodetic coordinates (degrees) of a pixel position.
    ///
    /// `x` and `y` may be fractional; positions outside the grid
    /// extrapolate linearly.
    pub fn reverse(&self, x: f64, y: f64) -> (f64, f64) {
        let lon = self.tl_lon + (x / self.width) * (self.br_lon - self.tl_lon);
        let lat = self.tl_lat - (y / self.height) * (self.tl_lat - self.br_lat);
        (lon, lat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world_grid() -> EquirectangularProjection {
        EquirectangularProjection::new(360, 180, -180.0, 90.0, 180.0, -90.0).unwrap()
    }

    #[test]
    fn test_forward_corners() {
        let proj = world_grid();
        assert_eq!(proj.forward(-180.0, 90.0), Some((0, 0)));
        assert_eq!(proj.forward(0.0, 0.0), Some((180, 90)));
        assert_eq!(proj.forward(179.5, -89.5), Some((359, 179)));
    }

    #[test]
    fn test_forward_out_of_grid() {
        let proj = EquirectangularProjection::new(100, 50, -10.0, 10.0, 10.0, -10.0).unwrap();
        assert_eq!(proj.forward(-20.0, 0.0), None);
        assert_eq!(proj.forward(0.0, 20.0), None);
        // The bottom-right corner itself maps past the last pixel.
        assert_eq!(proj.forward(10.0, -10.0), None);
    }

    #[test]
    fn test_reverse_of_pixel_origin() {
        let proj = world_grid();
        let (lon, lat) = proj.reverse(0.0, 0.0);
        assert!((lon + 180.0).abs() < 1e-9);
        assert!((lat - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_forward_reverse_roundtrip() {
        let proj = world_grid();
        let (lon, lat) = proj.reverse(123.0, 45.0);
        assert_eq!(proj.forward(lon, lat), Some((123, 45)));
    }

    #[test]
    fn test_degenerate_grid_rejected() {
        assert!(EquirectangularProjection::new(0, 10, -10.0, 10.0, 10.0, -10.0).is_err());
        assert!(EquirectangularProjection::new(10, 10, 10.0, 10.0, -10.0, -10.0).is_err());
    }
}
