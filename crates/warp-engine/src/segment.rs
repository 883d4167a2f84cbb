//! Adaptive segmentation of the scan track.
//!
//! Long satellite passes curve too much for a single thin-plate spline to
//! track accurately, so the scan is split into geographically coherent
//! scanline segments. Segment count scales with total track length
//! (median GCP spacing times point count) against a configured
//! kilometers-per-segment target. Within a slice, a large geodesic gap
//! between consecutive GCPs marks a signal cut and splits the slice again.

use std::cmp::Ordering;

use geodesy::vincenty_inverse;
use warp_common::{Gcp, Result, WarpError};

use crate::config::WarpEngineConfig;
use crate::types::{SegmentConfig, WarpOperation};

/// Estimate how many segments the scan track should be split into.
///
/// Deterministic for a given GCP set; always at least 1. Requires at
/// least two GCPs on distinct scanlines.
pub fn estimate_segment_count(op: &WarpOperation, config: &WarpEngineConfig) -> Result<usize> {
    let deduped = dedup_by_scanline(&sorted_by_scan_order(
        &op.ground_control_points,
        op.input_image.width(),
    ));
    if deduped.len() < 2 {
        return Err(WarpError::NotEnoughGcps {
            needed: 2,
            got: deduped.len(),
        });
    }

    let mut distances: Vec<f64> = deduped
        .windows(2)
        .map(|pair| vincenty_inverse(pair[0].lat, pair[0].lon, pair[1].lat, pair[1].lon))
        .collect();
    distances.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let median_km = distances[distances.len() / 2];

    let count = ((median_km * deduped.len() as f64) / config.segment_length_km) as usize;
    let count = count.max(1);

    tracing::debug!(
        segments = count,
        median_distance_km = median_km,
        track_length_km = median_km * deduped.len() as f64,
        "estimated segment split"
    );

    Ok(count)
}

/// Split the source image into per-segment configurations, cutting slices
/// again where the GCP track jumps by more than the cut threshold.
pub fn build_segments(
    segment_count: usize,
    op: &WarpOperation,
    config: &WarpEngineConfig,
) -> Vec<SegmentConfig> {
    let mut segments = Vec::new();

    for (y_start, y_end) in segment_slices(segment_count, op.input_image.height()) {
        // GCPs belonging to this slice, one per scanline.
        let slice_gcps: Vec<Gcp> = op
            .ground_control_points
            .iter()
            .filter(|gcp| (gcp.y as i64) >= y_start && (gcp.y as i64) < y_end)
            .copied()
            .collect();
        let deduped = dedup_by_scanline(&sorted_by_scan_order(&slice_gcps, op.input_image.width()));

        match find_cut(&deduped, config.cut_threshold_km) {
            Some(cut_y) => {
                tracing::debug!(cut_y, y_start, y_end, "scan track cut inside slice");
                segments.push(generate_segment(op, y_start, cut_y, true, false, config));
                segments.push(generate_segment(op, cut_y, y_end, false, true, config));
            }
            None => {
                segments.push(generate_segment(op, y_start, y_end, true, true, config));
            }
        }
    }

    segments
}

/// Equal slices of `[0, height)`. Exact partition: no gaps, no overlaps.
pub(crate) fn segment_slices(segment_count: usize, height: usize) -> Vec<(i64, i64)> {
    let count = segment_count.max(1) as i64;
    let height = height as i64;
    (0..count)
        .map(|i| (i * height / count, (i + 1) * height / count))
        .collect()
}

/// Scanline of the first GCP pair whose geodesic gap exceeds the cut
/// threshold, if any. The cut lands on the second GCP of the pair.
fn find_cut(deduped: &[Gcp], cut_threshold_km: f64) -> Option<i64> {
    deduped.windows(2).find_map(|pair| {
        let gap = vincenty_inverse(pair[0].lat, pair[0].lon, pair[1].lat, pair[1].lon);
        (gap > cut_threshold_km).then(|| pair[1].y as i64)
    })
}

/// Build one segment over a candidate scanline range: expand its
/// boundaries to pull in the nearest outside GCPs, collect and rebase the
/// GCPs inside, and choose the segment's working frame.
fn generate_segment(
    op: &WarpOperation,
    y_start: i64,
    y_end: i64,
    start_overlap: bool,
    end_overlap: bool,
    config: &WarpEngineConfig,
) -> SegmentConfig {
    let mut y_start = y_start;
    let mut y_end = y_end;
    expand_overlap(
        &op.ground_control_points,
        &mut y_start,
        &mut y_end,
        start_overlap,
        end_overlap,
        op.input_image.height() as i64,
        config.overlap_expansion_passes,
    );

    let gcps: Vec<Gcp> = op
        .ground_control_points
        .iter()
        .filter(|gcp| (gcp.y as i64) >= y_start && (gcp.y as i64) < y_end)
        .map(|gcp| Gcp::new(gcp.x, gcp.y - y_start as f64, gcp.lat, gcp.lon))
        .collect();

    // Longitude-centered frame by default, pole-centered when the track
    // approaches a pole and longitude degenerates.
    let (center_lon, _center_lat) = compute_gcp_center(&gcps);
    let mut shift_lon = -center_lon;
    let mut shift_lat = 0.0;

    for gcp in &gcps {
        let south_km = vincenty_inverse(gcp.lat, gcp.lon, -90.0, 0.0);
        let north_km = vincenty_inverse(gcp.lat, gcp.lon, 90.0, 0.0);
        if south_km < config.pole_threshold_km {
            shift_lon = 0.0;
            shift_lat = -90.0;
        }
        if north_km < config.pole_threshold_km {
            shift_lon = 0.0;
            shift_lat = 90.0;
        }
    }

    SegmentConfig {
        y_start,
        y_end,
        shift_lon,
        shift_lat,
        gcps,
        transform: None,
    }
}

/// Push segment boundaries outward so the nearest GCP beyond each
/// requested boundary falls just inside the segment.
///
/// Each pass absorbs the next GCP outside a boundary; the loop exits as
/// soon as neither boundary moves and is capped at `max_passes`. Both
/// boundaries are clamped to `[0, source_height]` afterwards.
fn expand_overlap(
    gcps: &[Gcp],
    y_start: &mut i64,
    y_end: &mut i64,
    start_overlap: bool,
    end_overlap: bool,
    source_height: i64,
    max_passes: usize,
) {
    for _ in 0..max_passes {
        let mut nearest_before: Option<i64> = None;
        let mut nearest_after: Option<i64> = None;
        for gcp in gcps {
            let gy = gcp.y as i64;
            let before = *y_start - gy;
            if before > 0 {
                nearest_before = Some(nearest_before.map_or(before, |d| d.min(before)));
            }
            let after = gy - *y_end;
            if after > 0 {
                nearest_after = Some(nearest_after.map_or(after, |d| d.min(after)));
            }
        }

        let mut moved = false;
        if start_overlap {
            if let Some(distance) = nearest_before {
                *y_start -= distance + 1;
                moved = true;
            }
        }
        if end_overlap {
            if let Some(distance) = nearest_after {
                *y_end += distance + 1;
                moved = true;
            }
        }
        if !moved {
            break;
        }
    }

    *y_start = (*y_start).max(0);
    *y_end = (*y_end).min(source_height);
}

/// Mean GCP position as (lon, lat) in degrees.
///
/// Averages unit vectors on the sphere rather than raw angles, so tracks
/// straddling the antimeridian get a meaningful center.
fn compute_gcp_center(gcps: &[Gcp]) -> (f64, f64) {
    if gcps.is_empty() {
        return (0.0, 0.0);
    }

    let mut x_total = 0.0;
    let mut y_total = 0.0;
    let mut z_total = 0.0;
    for gcp in gcps {
        let lat = gcp.lat.to_radians();
        let lon = gcp.lon.to_radians();
        x_total += lat.cos() * lon.cos();
        y_total += lat.cos() * lon.sin();
        z_total += lat.sin();
    }
    x_total /= gcps.len() as f64;
    y_total /= gcps.len() as f64;
    z_total /= gcps.len() as f64;

    let lon = y_total.atan2(x_total).to_degrees();
    let hyp = (x_total * x_total + y_total * y_total).sqrt();
    let lat = z_total.atan2(hyp).to_degrees();
    (lon, lat)
}

fn sorted_by_scan_order(gcps: &[Gcp], image_width: usize) -> Vec<Gcp> {
    let mut sorted = gcps.to_vec();
    sorted.sort_by(|a, b| {
        a.scan_order_key(image_width)
            .partial_cmp(&b.scan_order_key(image_width))
            .unwrap_or(Ordering::Equal)
    });
    sorted
}

/// Keep the first GCP encountered for each distinct scanline.
/// Assumes the input is already in scan order.
fn dedup_by_scanline(gcps: &[Gcp]) -> Vec<Gcp> {
    let mut deduped: Vec<Gcp> = Vec::with_capacity(gcps.len());
    for gcp in gcps {
        if deduped.last().map_or(true, |prev| prev.y != gcp.y) {
            deduped.push(*gcp);
        }
    }
    deduped
}
