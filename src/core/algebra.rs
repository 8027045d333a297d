//! Elementwise raster algebra kernels
//!
//! Zero denominators and non-finite intermediate values degrade to a
//! defined output value instead of raising; an undefined ratio is a
//! meaningful pixel state, not a fault.

use crate::types::{PixelArray, PixelValue};
use ndarray::Zip;

/// Normalized difference of two bands: `(a - b) / (a + b)`.
///
/// Pixels with a zero denominator produce `0.0`.
pub fn normalized_difference(a: &PixelArray, b: &PixelArray) -> PixelArray {
    Zip::from(a).and(b).map_collect(|&a, &b| nd_pixel(a, b))
}

/// Parallel variant of [`normalized_difference`]
#[cfg(feature = "parallel")]
pub fn normalized_difference_parallel(a: &PixelArray, b: &PixelArray) -> PixelArray {
    Zip::from(a).and(b).par_map_collect(|&a, &b| nd_pixel(a, b))
}

#[inline]
fn nd_pixel(a: PixelValue, b: PixelValue) -> PixelValue {
    let denom = a + b;
    if denom == 0.0 {
        return 0.0;
    }
    let value = (a - b) / denom;
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Enhanced Vegetation Index:
/// `2.5 * (nir - red) / (nir + 6*red - 7.5*blue + 1)`.
///
/// Pixels with a zero denominator produce `0.0`.
pub fn enhanced_vegetation_index(
    nir: &PixelArray,
    red: &PixelArray,
    blue: &PixelArray,
) -> PixelArray {
    Zip::from(nir)
        .and(red)
        .and(blue)
        .map_collect(|&nir, &red, &blue| evi_pixel(nir, red, blue))
}

/// Parallel variant of [`enhanced_vegetation_index`]
#[cfg(feature = "parallel")]
pub fn enhanced_vegetation_index_parallel(
    nir: &PixelArray,
    red: &PixelArray,
    blue: &PixelArray,
) -> PixelArray {
    Zip::from(nir)
        .and(red)
        .and(blue)
        .par_map_collect(|&nir, &red, &blue| evi_pixel(nir, red, blue))
}

#[inline]
fn evi_pixel(nir: PixelValue, red: PixelValue, blue: PixelValue) -> PixelValue {
    let denom = nir + 6.0 * red - 7.5 * blue + 1.0;
    if denom == 0.0 {
        return 0.0;
    }
    let value = 2.5 * (nir - red) / denom;
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Percentile of ascending-sorted values with linear interpolation.
///
/// `q` is a percentage in `[0, 100]`; an empty slice yields `0.0`.
pub fn percentile(sorted: &[PixelValue], q: PixelValue) -> PixelValue {
    if sorted.is_empty() {
        return 0.0;
    }
    let q = num_traits::clamp(q, 0.0, 100.0);
    let rank = (q / 100.0) * (sorted.len() - 1) as PixelValue;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as PixelValue;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Rescale a value from `in_range` to `out_range`, clipping to `in_range`
/// first. A degenerate input range maps everything to the low output bound.
pub fn rescale_intensity(
    value: PixelValue,
    in_range: (PixelValue, PixelValue),
    out_range: (PixelValue, PixelValue),
) -> PixelValue {
    let (in_min, in_max) = in_range;
    let (out_min, out_max) = out_range;
    if in_max <= in_min {
        return out_min;
    }
    let clipped = num_traits::clamp(value, in_min, in_max);
    (clipped - in_min) / (in_max - in_min) * (out_max - out_min) + out_min
}
