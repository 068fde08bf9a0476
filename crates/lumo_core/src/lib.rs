//! LUMO core - radiance buffers and HDR image I/O.
//!
//! This crate provides:
//!
//! - **Color**: linear RGB radiance values (an alias of `glam::Vec3`)
//! - **HdrImage**: a floating-point pixel buffer with PFM read/write,
//!   tone mapping, and gamma-corrected LDR export

pub mod color;
pub mod hdr;

// Re-export commonly used types
pub use color::{luminosity, Color, BLACK, WHITE};
pub use hdr::{read_pfm_image, Endianness, FormatError, HdrImage};
