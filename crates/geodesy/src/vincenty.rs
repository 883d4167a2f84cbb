//! Vincenty's inverse formula on the WGS-84 ellipsoid.

/// WGS-84 semi-major axis in kilometers.
pub const WGS84_SEMI_MAJOR_KM: f64 = 6378.137;

/// WGS-84 semi-minor axis in kilometers.
pub const WGS84_SEMI_MINOR_KM: f64 = 6356.752_314_245;

/// WGS-84 flattening.
pub const WGS84_FLATTENING: f64 = 1.0 / 298.257_223_563;

/// Convergence threshold for the longitude iteration, in radians.
const CONVERGENCE_EPSILON: f64 = 1e-12;

/// Iteration cap. Near-antipodal pairs may not converge; the last iterate
/// is still a usable distance for the heuristics built on top of this.
const MAX_ITERATIONS: usize = 200;

/// Ellipsoidal distance in kilometers between two geodetic positions,
/// given as (latitude, longitude) pairs in degrees.
pub fn vincenty_inverse(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let a = WGS84_SEMI_MAJOR_KM;
    let b = WGS84_SEMI_MINOR_KM;
    let f = WGS84_FLATTENING;

    let l = (lon2 - lon1).to_radians();
    let u1 = ((1.0 - f) * lat1.to_radians().tan()).atan();
    let u2 = ((1.0 - f) * lat2.to_radians().tan()).atan();
    let (sin_u1, cos_u1) = u1.sin_cos();
    let (sin_u2, cos_u2) = u2.sin_cos();

    let mut lambda = l;
    let mut sin_sigma = 0.0;
    let mut cos_sigma = 0.0;
    let mut sigma = 0.0;
    let mut cos_sq_alpha = 0.0;
    let mut cos_2sigma_m = 0.0;

    for _ in 0..MAX_ITERATIONS {
        let (sin_lambda, cos_lambda) = lambda.sin_cos();
        sin_sigma = ((cos_u2 * sin_lambda).powi(2)
            + (cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda).powi(2))
        .sqrt();

        // Coincident points.
        if sin_sigma == 0.0 {
            return 0.0;
        }

        cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;
        sigma = sin_sigma.atan2(cos_sigma);

        let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
        cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;

        // Equatorial geodesics have cos²α = 0.
        cos_2sigma_m = if cos_sq_alpha.abs() < 1e-12 {
            0.0
        } else {
            cos_sigma - 2.0 * sin_u1 * sin_u2 / cos_sq_alpha
        };

        let c = f / 16.0 * cos_sq_alpha * (4.0 + f * (4.0 - 3.0 * cos_sq_alpha));
        let lambda_prev = lambda;
        lambda = l
            + (1.0 - c)
                * f
                * sin_alpha
                * (sigma
                    + c * sin_sigma
                        * (cos_2sigma_m
                            + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)));

        if (lambda - lambda_prev).abs() < CONVERGENCE_EPSILON {
            break;
        }
    }

    let u_sq = cos_sq_alpha * (a * a - b * b) / (b * b);
    let big_a = 1.0 + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
    let big_b = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));

    let delta_sigma = big_b
        * sin_sigma
        * (cos_2sigma_m
            + big_b / 4.0
                * (cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)
                    - big_b / 6.0
                        * cos_2sigma_m
                        * (-3.0 + 4.0 * sin_sigma * sin_sigma)
                        * (-3.0 + 4.0 * cos_2sigma_m * cos_2sigma_m)));

    b * big_a * (sigma - delta_sigma)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coincident_points() {
        assert_eq!(vincenty_inverse(48.0, 2.0, 48.0, 2.0), 0.0);
    }

    #[test]
    fn test_one_degree_on_equator() {
        let d = vincenty_inverse(0.0, 0.0, 0.0, 1.0);
        assert!((d - 111.319).abs() < 0.01, "expected ~111.32 km, got {}", d);
    }

    #[test]
    fn test_london_to_paris() {
        let d = vincenty_inverse(51.5074, -0.1278, 48.8566, 2.3522);
        assert!((d - 344.0).abs() < 2.0, "expected ~344 km, got {}", d);
    }

    #[test]
    fn test_equator_to_north_pole() {
        // Quarter meridian of the WGS-84 ellipsoid.
        let d = vincenty_inverse(0.0, 0.0, 90.0, 0.0);
        assert!((d - 10001.96).abs() < 0.1, "expected ~10002 km, got {}", d);
    }

    #[test]
    fn test_symmetry() {
        let d1 = vincenty_inverse(10.0, 20.0, -30.0, 40.0);
        let d2 = vincenty_inverse(-30.0, 40.0, 10.0, 20.0);
        assert!((d1 - d2).abs() < 1e-6);
    }
}
