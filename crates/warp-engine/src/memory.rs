//! Memory guard: shrink the output footprint until it fits a byte budget.

use warp_common::{CropSettings, Result, WarpError};

use crate::config::WarpEngineConfig;
use crate::crop::choose_crop_area;
use crate::types::WarpOperation;

/// Bytes needed for the raster described by a crop window.
pub fn raster_footprint_bytes(crop: &CropSettings, channels: usize) -> u64 {
    crop.pixel_count() * channels as u64 * std::mem::size_of::<u16>() as u64
}

/// Shrink the operation's output canvas until the cropped raster fits the
/// byte budget.
///
/// Each retry scales both output dimensions by the configured shrink
/// factor and re-derives the crop window. Fails once either dimension
/// would drop below the configured floor, which bounds the loop for
/// budgets no positive output size can satisfy.
pub fn ensure_memory_limit(
    crop: CropSettings,
    op: &mut WarpOperation,
    channels: usize,
    budget_bytes: u64,
    config: &WarpEngineConfig,
) -> Result<CropSettings> {
    let mut crop = crop;
    loop {
        let footprint = raster_footprint_bytes(&crop, channels);
        if footprint <= budget_bytes {
            return Ok(crop);
        }

        tracing::trace!(
            footprint,
            budget_bytes,
            output_width = op.output_width,
            output_height = op.output_height,
            "output raster exceeds memory budget, shrinking"
        );

        let new_width = (op.output_width as f64 * config.shrink_factor) as usize;
        let new_height = (op.output_height as f64 * config.shrink_factor) as usize;
        if new_width < config.min_output_dimension || new_height < config.min_output_dimension {
            return Err(WarpError::BudgetUnsatisfiable {
                budget_bytes,
                floor: config.min_output_dimension,
            });
        }

        op.output_width = new_width;
        op.output_height = new_height;
        crop = choose_crop_area(op)?;
    }
}
