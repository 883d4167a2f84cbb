//! Common types shared across the sat-georef crates.

pub mod crop;
pub mod error;
pub mod gcp;
pub mod image;

pub use crop::CropSettings;
pub use error::{Result, WarpError};
pub use gcp::Gcp;
pub use image::{Image, Image16};
