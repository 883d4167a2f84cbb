//! Smart warp engine for satellite imagery georeferencing.
//!
//! Turns a raster captured along a sensor scan track plus a sparse set of
//! ground control points into a cropped, pixel-projected equirectangular
//! mosaic.
//!
//! # Architecture
//!
//! ```text
//! WarpOperation
//!      │
//!      ▼
//! choose_crop_area ──► ensure_memory_limit (re-plans the crop until the
//!      │                output raster fits the byte budget)
//!      ▼
//! estimate_segment_count ──► build_segments (cut and pole handling)
//!      │
//!      ▼
//! TpsTransform::fit        one fit per segment, in parallel
//!      │
//!      ▼
//! warp_segment ──► composite_segment   sequential fold, emission order
//!      │
//!      ▼
//! WarpResult (mosaic + georeferenced corners)
//! ```

pub mod compose;
pub mod config;
pub mod crop;
pub mod memory;
pub mod segment;
pub mod smart;
pub mod tps;
pub mod types;
pub mod warper;

pub use compose::composite_segment;
pub use config::WarpEngineConfig;
pub use crop::choose_crop_area;
pub use memory::ensure_memory_limit;
pub use segment::{build_segments, estimate_segment_count};
pub use smart::{perform_smart_warp, perform_smart_warp_with_config};
pub use tps::TpsTransform;
pub use types::{GeoreferencedCorner, SegmentConfig, WarpOperation, WarpResult};
pub use warper::warp_segment;

// Re-export the shared leaf types alongside the engine API.
pub use warp_common::{CropSettings, Gcp, Image, Image16, WarpError};
