//! Percentile-based contrast stretching for color composites
//!
//! The stretch reserves headroom for bright cloud and snow pixels: as
//! detected coverage rises, the percentile cutoff and both output
//! sub-ranges shrink, so noisy scenes are stretched less aggressively.

use crate::core::algebra::{percentile, rescale_intensity};
use crate::types::{PixelArray, PixelValue};

/// Exclusive lower bound of the stretchable value range
const IN_RANGE_MIN: PixelValue = 0.0;
/// Exclusive upper bound of the stretchable value range (saturated pixels)
const IN_RANGE_MAX: PixelValue = 65535.0;
/// Lower bound of the stretched output range
const OUT_LOW: PixelValue = 256.0;
/// Upper bound of the stretched output range
const OUT_HIGH: PixelValue = 65535.0;

/// Stretch one color band, scaled by the scene's snow/cloud coverage.
///
/// `coverage` is a percentage in `[0, 100]`. Pixels at or above the
/// cloud-adjusted percentile cutoff rescale into the high output
/// sub-range, in-range pixels below it into the low sub-range, and
/// zero/saturated pixels map to zero.
pub fn color_correction(band: &PixelArray, coverage: f32) -> PixelArray {
    let mut in_range: Vec<PixelValue> = band
        .iter()
        .copied()
        .filter(|&v| v > IN_RANGE_MIN && v < IN_RANGE_MAX)
        .collect();

    if in_range.is_empty() {
        log::warn!("No in-range pixels to stretch, returning band unchanged");
        return band.clone();
    }
    in_range.sort_by(|a, b| a.total_cmp(b));

    let p_low = percentile(&in_range, 0.0);
    let cloud_cut = percentile(&in_range, 100.0 - coverage * 3.0 / 4.0);
    let cloud_divide = 65000.0 - coverage * 100.0;

    // the high segment stretches between its own extremes
    let mut high_min = PixelValue::INFINITY;
    let mut high_max = PixelValue::NEG_INFINITY;
    for &v in band.iter() {
        if v >= cloud_cut {
            high_min = high_min.min(v);
            high_max = high_max.max(v);
        }
    }

    log::debug!(
        "Color stretch: p_low={:.1}, cutoff={:.1}, divide={:.1} (coverage {:.2}%)",
        p_low,
        cloud_cut,
        cloud_divide,
        coverage
    );

    band.mapv(|v| {
        if v >= cloud_cut {
            rescale_intensity(v, (high_min, high_max), (cloud_divide, OUT_HIGH))
        } else if v > IN_RANGE_MIN {
            rescale_intensity(v, (p_low, cloud_cut), (OUT_LOW, cloud_divide))
        } else {
            0.0
        }
    })
}
