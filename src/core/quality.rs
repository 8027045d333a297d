//! Quality-band decoding: cloud, snow, and fill detection
//!
//! The quality band is a bit-packed integer raster. Each mask is applied
//! with a bitwise AND and compared for exact equality, so partial matches
//! (lower-confidence flags) do not count.

use crate::types::{PixelArray, PixelValue};
use ndarray::Array2;

/// High-confidence cloud flag
pub const CLOUD_HIGH_CONF: u16 = 0b1100_0000_0000_0000;
/// High-confidence snow/ice flag
pub const SNOW_HIGH_CONF: u16 = 0b0000_1100_0000_0000;
/// Designated fill pixel flag
pub const FILL_PIXEL: u16 = 0b0000_0000_0000_0001;

/// Mask raster value for clear pixels
pub const MASK_CLEAR: PixelValue = 0.0;
/// Mask raster value for cloud or snow pixels
pub const MASK_CLOUD_SNOW: PixelValue = 1.0;
/// Mask raster value for fill pixels
pub const MASK_FILL: PixelValue = 255.0;

/// Per-pixel boolean masks decoded from a quality band
#[derive(Debug, Clone)]
pub struct QualityMasks {
    pub cloud: Array2<bool>,
    pub snow: Array2<bool>,
    pub fill: Array2<bool>,
}

/// Decode the cloud/snow/fill masks of a quality band
pub fn decode_quality(quality: &PixelArray) -> QualityMasks {
    let cloud = quality.mapv(|v| v as u16 & CLOUD_HIGH_CONF == CLOUD_HIGH_CONF);
    let snow = quality.mapv(|v| v as u16 & SNOW_HIGH_CONF == SNOW_HIGH_CONF);
    let fill = quality.mapv(|v| v as u16 & FILL_PIXEL == FILL_PIXEL);
    QualityMasks { cloud, snow, fill }
}

/// Percentage of non-fill pixels covered by high-confidence cloud or snow.
///
/// A quality band consisting entirely of fill pixels yields `0.0`.
pub fn snow_cloud_coverage(quality: &PixelArray) -> f32 {
    let masks = decode_quality(quality);
    let total = quality.len();
    let fill = masks.fill.iter().filter(|&&f| f).count();
    if total == fill {
        return 0.0;
    }

    let covered = masks
        .cloud
        .iter()
        .zip(masks.snow.iter())
        .filter(|(&c, &s)| c || s)
        .count();
    let coverage = covered as f32 / (total - fill) as f32 * 100.0;
    log::debug!(
        "Snow/cloud coverage: {:.2}% ({} of {} valid pixels)",
        coverage,
        covered,
        total - fill
    );
    coverage
}

/// Encode a quality band as a mask raster: 0 clear, 1 cloud or snow, 255 fill.
///
/// Fill takes precedence over cloud/snow so coverage statistics can be
/// recovered from the mask alone.
pub fn mask_raster(quality: &PixelArray) -> PixelArray {
    quality.mapv(|v| {
        let bits = v as u16;
        if bits & FILL_PIXEL == FILL_PIXEL {
            MASK_FILL
        } else if bits & CLOUD_HIGH_CONF == CLOUD_HIGH_CONF || bits & SNOW_HIGH_CONF == SNOW_HIGH_CONF
        {
            MASK_CLOUD_SNOW
        } else {
            MASK_CLEAR
        }
    })
}

/// Recover the snow/cloud coverage percentage from a mask raster
pub fn coverage_from_mask(mask: &PixelArray) -> f32 {
    let total = mask.len();
    let fill = mask.iter().filter(|&&v| v == MASK_FILL).count();
    if total == fill {
        return 0.0;
    }
    let covered = mask.iter().filter(|&&v| v == MASK_CLOUD_SNOW).count();
    covered as f32 / (total - fill) as f32 * 100.0
}
