//! Per-segment raster warping.
//!
//! Applies a fitted transform to one segment-scoped operation: every
//! output pixel is reverse-projected to geodetic coordinates and mapped
//! through the spline back into the segment's source rows. Pixels whose
//! inverse mapping lands outside the source keep a zero alpha.

use geodesy::EquirectangularProjection;
use warp_common::{Image16, Result, WarpError};

use crate::crop::choose_crop_area;
use crate::tps::TpsTransform;
use crate::types::{GeoreferencedCorner, WarpOperation, WarpResult};

/// Warp one segment-scoped operation into an equirectangular raster with
/// a validity alpha channel.
///
/// The raster is the operation's crop window cut from the same
/// full-world canvas the final mosaic uses, so its pixels line up 1:1
/// with the final grid.
pub fn warp_segment(op: &WarpOperation, transform: &TpsTransform) -> Result<WarpResult> {
    let crop = choose_crop_area(op)?;
    let width = crop.width();
    let height = crop.height();
    let channels = op.warped_channel_count();

    let projector = EquirectangularProjection::new(
        width,
        height,
        crop.lon_min,
        crop.lat_max,
        crop.lon_max,
        crop.lat_min,
    )
    .map_err(|e| WarpError::Projection(e.to_string()))?;

    let source = &op.input_image;
    let src_width = source.width() as i64;
    let src_height = source.height() as i64;
    let alpha_ch = channels - 1;

    let mut raster = Image16::new(width, height, channels);
    for y in 0..height {
        for x in 0..width {
            let (lon, lat) = projector.reverse(x as f64, y as f64);
            let (src_x, src_y) = transform.transform(lon, lat);
            let src_x = src_x.round() as i64;
            let src_y = src_y.round() as i64;
            if src_x < 0 || src_x >= src_width || src_y < 0 || src_y >= src_height {
                continue;
            }

            let src_idx = src_y as usize * source.width() + src_x as usize;
            let dst_idx = y * width + x;
            for ch in 0..alpha_ch {
                // Grayscale sources replicate their single channel when
                // RGBA output was requested.
                let src_ch = ch.min(source.channels() - 1);
                raster.channel_mut(ch)[dst_idx] = source.channel(src_ch)[src_idx];
            }
            raster.channel_mut(alpha_ch)[dst_idx] = u16::MAX;
        }
    }

    Ok(WarpResult {
        raster,
        top_left: GeoreferencedCorner {
            x: 0.0,
            y: 0.0,
            lon: crop.lon_min,
            lat: crop.lat_max,
        },
        top_right: GeoreferencedCorner {
            x: (width - 1) as f64,
            y: 0.0,
            lon: crop.lon_max,
            lat: crop.lat_max,
        },
        bottom_left: GeoreferencedCorner {
            x: 0.0,
            y: (height - 1) as f64,
            lon: crop.lon_min,
            lat: crop.lat_min,
        },
        bottom_right: GeoreferencedCorner {
            x: (width - 1) as f64,
            y: (height - 1) as f64,
            lon: crop.lon_max,
            lat: crop.lat_min,
        },
    })
}
