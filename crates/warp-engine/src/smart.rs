//! The smart warp pipeline.
//!
//! Orchestrates the full georeferencing run: crop planning, memory
//! bounding, track segmentation, a parallel transform fit phase, and a
//! sequential warp-and-composite fold into the final mosaic.

use rayon::prelude::*;

use geodesy::EquirectangularProjection;
use warp_common::{Image16, Result, WarpError};

use crate::compose::composite_segment;
use crate::config::WarpEngineConfig;
use crate::crop::choose_crop_area;
use crate::memory::ensure_memory_limit;
use crate::segment::{build_segments, estimate_segment_count};
use crate::tps::TpsTransform;
use crate::types::{GeoreferencedCorner, WarpOperation, WarpResult};
use crate::warper::warp_segment;

/// Georeference a full operation with the default configuration.
///
/// See [`perform_smart_warp_with_config`].
pub fn perform_smart_warp(
    operation: WarpOperation,
    progress: Option<&mut f32>,
) -> Result<WarpResult> {
    perform_smart_warp_with_config(operation, &WarpEngineConfig::default(), progress)
}

/// Georeference a full operation: produce the cropped, memory-bounded
/// equirectangular mosaic of the warped scan track.
///
/// The output grid is fixed before any segment is processed: the crop
/// window is derived from the GCP footprint and shrunk until it fits the
/// memory budget. Transforms for all segments are fitted in parallel;
/// warping and compositing then run sequentially in planner emission
/// order, which resolves overlapping segment boundaries last-writer-wins.
///
/// `progress`, when provided, is updated to `completed / total` after
/// each segment. The run is not cancellable once started.
pub fn perform_smart_warp_with_config(
    mut operation: WarpOperation,
    config: &WarpEngineConfig,
    mut progress: Option<&mut f32>,
) -> Result<WarpResult> {
    config.validate()?;
    if operation.input_image.is_empty() {
        return Err(WarpError::EmptyImage);
    }

    // Fix the output frame first: crop to the GCP footprint, then shrink
    // until the mosaic fits the memory budget. Nothing is allocated per
    // segment before this resolves.
    let crop = choose_crop_area(&operation)?;
    let channels = operation.warped_channel_count();
    let crop = ensure_memory_limit(
        crop,
        &mut operation,
        channels,
        config.memory_budget_bytes,
        config,
    )?;

    let out_width = crop.width();
    let out_height = crop.height();

    let top_left = GeoreferencedCorner {
        x: 0.0,
        y: 0.0,
        lon: crop.lon_min,
        lat: crop.lat_max,
    };
    let top_right = GeoreferencedCorner {
        x: (out_width - 1) as f64,
        y: 0.0,
        lon: crop.lon_max,
        lat: crop.lat_max,
    };
    let bottom_left = GeoreferencedCorner {
        x: 0.0,
        y: (out_height - 1) as f64,
        lon: crop.lon_min,
        lat: crop.lat_min,
    };
    let bottom_right = GeoreferencedCorner {
        x: (out_width - 1) as f64,
        y: (out_height - 1) as f64,
        lon: crop.lon_max,
        lat: crop.lat_min,
    };

    let final_projector = EquirectangularProjection::new(
        out_width,
        out_height,
        crop.lon_min,
        crop.lat_max,
        crop.lon_max,
        crop.lat_min,
    )
    .map_err(|e| WarpError::Projection(e.to_string()))?;

    let segment_count = estimate_segment_count(&operation, config)?;
    let mut segments = build_segments(segment_count, &operation, config);

    // Fit phase: every segment's transform depends only on that
    // segment's own GCPs, so all fits run in parallel and are gathered
    // before any warping starts.
    let fitted: Vec<Result<TpsTransform>> = segments
        .par_iter()
        .map(|segment| TpsTransform::fit(&segment.gcps, segment.shift_lon, segment.shift_lat))
        .collect();
    for (segment, fit) in segments.iter_mut().zip(fitted) {
        match fit {
            Ok(transform) => segment.transform = Some(transform),
            Err(e) => tracing::warn!(
                error = %e,
                y_start = segment.y_start,
                y_end = segment.y_end,
                "could not fit a transform for segment, skipping it"
            ),
        }
    }

    // Warp and composite phase: a strictly sequential fold. Emission
    // order is a correctness invariant where expanded segments overlap.
    let total = segments.len();
    let mut mosaic = Image16::new(out_width, out_height, channels);
    for (index, segment) in segments.iter().enumerate() {
        if let Some(transform) = &segment.transform {
            let segment_op = operation.scoped_to_segment(segment);
            let warped = warp_segment(&segment_op, transform)?;
            mosaic = composite_segment(mosaic, &final_projector, &warped);
        }

        tracing::trace!(completed = index + 1, total, "segment composited");
        if let Some(p) = progress.as_mut() {
            **p = (index + 1) as f32 / total as f32;
        }
    }

    Ok(WarpResult {
        raster: mosaic,
        top_left,
        top_right,
        bottom_left,
        bottom_right,
    })
}
