//! satscene: A Fast, Modular Multispectral Scene and Product Processor
//!
//! This library assembles multi-band satellite scenes from single-band
//! raster files and derives raster products (vegetation indices,
//! true-color composites, cloud/snow statistics) on demand, computing
//! each derived product at most once per scene and memoizing the result.

pub mod core;
pub mod io;
pub mod raster;
pub mod scene;
pub mod sensors;
pub mod types;

// Re-export main types and functions for easier access
pub use crate::core::{
    Dependency, Product, ProductKind, ProductOutput, ProductParams, ProductRegistry, ProductValue,
};
pub use raster::{BandSource, Raster};
pub use scene::{BandKey, Scene};
pub use sensors::BandMap;
pub use types::{DType, GeoTransform, PixelArray, PixelValue, SceneError, SceneResult};
