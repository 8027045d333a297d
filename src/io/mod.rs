//! I/O collaborators for reading, writing, and warping raster files

pub mod reader;
pub mod warp;
pub mod writer;

pub use reader::{RasterReader, SourceInfo};
pub use warp::{reproject_band, WarpedBand};
pub use writer::{BandData, RasterWriter};
