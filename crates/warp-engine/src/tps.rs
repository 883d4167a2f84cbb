//! Thin-plate spline transform from geodetic coordinates to source pixels.
//!
//! Fits a smooth interpolating surface through the ground control points:
//! the shifted (lon, lat) of each GCP maps to its source pixel (x, y).
//! The warper evaluates the fitted transform as the inverse mapping for
//! every output pixel.

use nalgebra::DMatrix;
use warp_common::{Gcp, Result, WarpError};

use geodesy::wrap_longitude;

/// Control points closer than this in shifted degrees collapse to one.
const DUPLICATE_EPSILON: f64 = 1e-9;

/// A fitted thin-plate spline mapping shifted geodetic coordinates to
/// source pixel coordinates.
///
/// Pure value: fitting reads only its inputs, so transforms for many
/// segments can be solved in parallel with no shared state.
#[derive(Debug, Clone)]
pub struct TpsTransform {
    /// Control point positions in the shifted frame.
    points: Vec<(f64, f64)>,
    /// Spline weights followed by the three affine coefficients, for x.
    x_coefs: Vec<f64>,
    /// Spline weights followed by the three affine coefficients, for y.
    y_coefs: Vec<f64>,
    shift_lon: f64,
    shift_lat: f64,
}

impl TpsTransform {
    /// Fit a transform through the given GCPs in the shifted frame.
    ///
    /// Needs at least three distinct control points; degenerate
    /// geometries that make the spline system singular are an error.
    pub fn fit(gcps: &[Gcp], shift_lon: f64, shift_lat: f64) -> Result<Self> {
        // Shift into the segment's working frame and drop exact
        // duplicates, which would make the system singular.
        let mut points: Vec<(f64, f64)> = Vec::with_capacity(gcps.len());
        let mut targets: Vec<(f64, f64)> = Vec::with_capacity(gcps.len());
        for gcp in gcps {
            let u = wrap_longitude(gcp.lon + shift_lon);
            let v = gcp.lat + shift_lat;
            let duplicate = points
                .iter()
                .any(|&(pu, pv)| (pu - u).abs() < DUPLICATE_EPSILON && (pv - v).abs() < DUPLICATE_EPSILON);
            if !duplicate {
                points.push((u, v));
                targets.push((gcp.x, gcp.y));
            }
        }

        let n = points.len();
        if n < 3 {
            return Err(WarpError::NotEnoughGcps { needed: 3, got: n });
        }

        // Interpolation system: radial kernel block bordered by the
        // affine terms, one right-hand side per output dimension.
        let dim = n + 3;
        let mut a = DMatrix::<f64>::zeros(dim, dim);
        let mut rhs = DMatrix::<f64>::zeros(dim, 2);
        for i in 0..n {
            let (ui, vi) = points[i];
            for j in 0..n {
                let (uj, vj) = points[j];
                a[(i, j)] = kernel(ui, vi, uj, vj);
            }
            a[(i, n)] = 1.0;
            a[(i, n + 1)] = ui;
            a[(i, n + 2)] = vi;
            a[(n, i)] = 1.0;
            a[(n + 1, i)] = ui;
            a[(n + 2, i)] = vi;

            rhs[(i, 0)] = targets[i].0;
            rhs[(i, 1)] = targets[i].1;
        }

        let coefs = a.lu().solve(&rhs).ok_or(WarpError::SingularSystem)?;
        if coefs.iter().any(|c| !c.is_finite()) {
            return Err(WarpError::SingularSystem);
        }

        Ok(Self {
            points,
            x_coefs: coefs.column(0).iter().copied().collect(),
            y_coefs: coefs.column(1).iter().copied().collect(),
            shift_lon,
            shift_lat,
        })
    }

    /// Map geodetic coordinates (degrees, unshifted) to a source pixel
    /// position. The segment shift is applied internally.
    pub fn transform(&self, lon: f64, lat: f64) -> (f64, f64) {
        let u = wrap_longitude(lon + self.shift_lon);
        let v = lat + self.shift_lat;

        let n = self.points.len();
        let mut x = self.x_coefs[n] + self.x_coefs[n + 1] * u + self.x_coefs[n + 2] * v;
        let mut y = self.y_coefs[n] + self.y_coefs[n + 1] * u + self.y_coefs[n + 2] * v;
        for (i, &(pu, pv)) in self.points.iter().enumerate() {
            let k = kernel(u, v, pu, pv);
            x += self.x_coefs[i] * k;
            y += self.y_coefs[i] * k;
        }
        (x, y)
    }

    /// Number of distinct control points the transform was fit on.
    pub fn control_point_count(&self) -> usize {
        self.points.len()
    }
}

/// Thin-plate radial basis r^2 ln(r^2) over squared Euclidean distance.
fn kernel(u1: f64, v1: f64, u2: f64, v2: f64) -> f64 {
    let r_sq = (u2 - u1) * (u2 - u1) + (v2 - v1) * (v2 - v1);
    if r_sq == 0.0 {
        0.0
    } else {
        r_sq * r_sq.ln()
    }
}
