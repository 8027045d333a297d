//! Core processing modules: raster algebra, quality decoding, color
//! stretching, and the product machinery

pub mod algebra;
pub mod color;
pub mod product;
pub mod products;
pub mod quality;

// Re-export main types
pub use product::{
    Dependency, Product, ProductKind, ProductOutput, ProductParams, ProductRegistry, ProductValue,
};
pub use products::{Color, Evi, Mask, Nbr, Ndvi, Ndwi, Toa};
pub use quality::QualityMasks;
