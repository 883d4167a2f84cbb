//! Mosaic composition: fold warped segments into the output raster.

use geodesy::EquirectangularProjection;
use warp_common::Image16;

use crate::types::WarpResult;

/// Fold one warped segment into the mosaic accumulator.
///
/// The segment raster is placed at the final-grid position of its
/// top-left corner; a segment projecting outside the final grid is
/// skipped. Only pixels with nonzero segment alpha are written, and
/// later segments overwrite earlier ones where expanded boundaries
/// overlap, which keeps seams invisible.
pub fn composite_segment(
    mut mosaic: Image16,
    projector: &EquirectangularProjection,
    segment: &WarpResult,
) -> Image16 {
    let Some((x_offset, y_offset)) = projector.forward(segment.top_left.lon, segment.top_left.lat)
    else {
        tracing::trace!(
            lon = segment.top_left.lon,
            lat = segment.top_left.lat,
            "segment outside the output grid, skipping"
        );
        return mosaic;
    };

    let seg = &segment.raster;
    if seg.channels() != mosaic.channels() {
        tracing::warn!(
            segment_channels = seg.channels(),
            mosaic_channels = mosaic.channels(),
            "segment channel count does not match mosaic, skipping"
        );
        return mosaic;
    }

    // Overlap rectangle clipped to both rasters.
    let copy_width = (mosaic.width() as i64).min(x_offset + seg.width() as i64) - x_offset;
    let copy_height = (mosaic.height() as i64).min(y_offset + seg.height() as i64) - y_offset;
    if copy_width <= 0 || copy_height <= 0 {
        return mosaic;
    }

    let alpha_ch = seg.channels() - 1;
    for y in 0..copy_height as usize {
        for x in 0..copy_width as usize {
            let src_idx = y * seg.width() + x;
            if seg.channel(alpha_ch)[src_idx] == 0 {
                continue;
            }

            let dst_idx =
                (y + y_offset as usize) * mosaic.width() + x + x_offset as usize;
            for ch in 0..alpha_ch {
                mosaic.channel_mut(ch)[dst_idx] = seg.channel(ch)[src_idx];
            }
            mosaic.channel_mut(alpha_ch)[dst_idx] = u16::MAX;
        }
    }

    mosaic
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GeoreferencedCorner;

    fn corner(x: f64, y: f64, lon: f64, lat: f64) -> GeoreferencedCorner {
        GeoreferencedCorner { x, y, lon, lat }
    }

    /// A 2x2 two-channel segment raster at the given geographic corner.
    fn segment_at(lon: f64, lat: f64, value: u16, opaque: bool) -> WarpResult {
        let mut raster = Image16::new(2, 2, 2);
        for i in 0..4 {
            raster.channel_mut(0)[i] = value;
            if opaque {
                raster.channel_mut(1)[i] = u16::MAX;
            }
        }
        WarpResult {
            raster,
            top_left: corner(0.0, 0.0, lon, lat),
            top_right: corner(1.0, 0.0, lon + 2.0, lat),
            bottom_left: corner(0.0, 1.0, lon, lat - 2.0),
            bottom_right: corner(1.0, 1.0, lon + 2.0, lat - 2.0),
        }
    }

    fn ten_degree_grid() -> EquirectangularProjection {
        // 10x10 pixel grid over lon 0..10, lat 10..0; one degree per pixel.
        EquirectangularProjection::new(10, 10, 0.0, 10.0, 10.0, 0.0).unwrap()
    }

    #[test]
    fn test_opaque_segment_is_placed_at_projected_offset() {
        let mosaic = Image16::new(10, 10, 2);
        let result = composite_segment(mosaic, &ten_degree_grid(), &segment_at(3.0, 7.0, 42, true));

        // Top-left corner (lon 3, lat 7) lands at pixel (3, 3).
        assert_eq!(result.get(0, 3, 3), Some(42));
        assert_eq!(result.get(1, 3, 3), Some(u16::MAX));
        assert_eq!(result.get(0, 4, 4), Some(42));
        // Outside the 2x2 footprint nothing is written.
        assert_eq!(result.get(1, 5, 3), Some(0));
        assert_eq!(result.get(1, 2, 3), Some(0));
    }

    #[test]
    fn test_zero_alpha_segment_leaves_mosaic_unchanged() {
        let mut mosaic = Image16::new(10, 10, 2);
        mosaic.channel_mut(0)[0] = 7;
        let before = mosaic.clone();

        let result =
            composite_segment(mosaic, &ten_degree_grid(), &segment_at(3.0, 7.0, 42, false));
        assert_eq!(result, before);
    }

    #[test]
    fn test_out_of_grid_segment_is_skipped() {
        let mosaic = Image16::new(10, 10, 2);
        let before = mosaic.clone();

        // Corner far west of the grid.
        let result =
            composite_segment(mosaic, &ten_degree_grid(), &segment_at(-60.0, 7.0, 42, true));
        assert_eq!(result, before);
    }

    #[test]
    fn test_overlapping_segments_resolve_last_writer_wins() {
        let mosaic = Image16::new(10, 10, 2);
        let projector = ten_degree_grid();

        let first = segment_at(3.0, 7.0, 11, true);
        let second = segment_at(4.0, 6.0, 22, true);

        let mosaic = composite_segment(mosaic, &projector, &first);
        let mosaic = composite_segment(mosaic, &projector, &second);

        // The shared pixel (4, 4) takes the later segment's value.
        assert_eq!(mosaic.get(0, 4, 4), Some(22));
        // Pixels only the first segment covers keep its value.
        assert_eq!(mosaic.get(0, 3, 3), Some(11));
    }

    #[test]
    fn test_segment_extending_past_grid_edge_is_clipped() {
        let mosaic = Image16::new(10, 10, 2);
        // Top-left at the last pixel; the 2x2 raster hangs off the edge.
        let result =
            composite_segment(mosaic, &ten_degree_grid(), &segment_at(9.5, 0.5, 42, true));

        assert_eq!(result.get(0, 9, 9), Some(42));
        assert_eq!(result.get(1, 9, 9), Some(u16::MAX));
    }
}
