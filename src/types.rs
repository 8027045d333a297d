use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Real-valued pixel data
pub type PixelValue = f32;

/// 2D pixel array (rows x cols)
pub type PixelArray = Array2<PixelValue>;

/// Nominal pixel data type of a band as stored on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DType {
    UInt8,
    UInt16,
    Int16,
    UInt32,
    Int32,
    Float32,
    Float64,
}

impl DType {
    /// Parse a data type from its lowercase name (e.g. "uint16", "float32")
    pub fn parse(name: &str) -> SceneResult<Self> {
        match name.to_lowercase().as_str() {
            "uint8" | "byte" => Ok(DType::UInt8),
            "uint16" => Ok(DType::UInt16),
            "int16" => Ok(DType::Int16),
            "uint32" => Ok(DType::UInt32),
            "int32" => Ok(DType::Int32),
            "float32" => Ok(DType::Float32),
            "float64" => Ok(DType::Float64),
            _ => Err(SceneError::InvalidDType(name.to_string())),
        }
    }

    /// Representable value range, used to clamp pixel data on recast
    pub fn value_range(&self) -> (f64, f64) {
        match self {
            DType::UInt8 => (u8::MIN as f64, u8::MAX as f64),
            DType::UInt16 => (u16::MIN as f64, u16::MAX as f64),
            DType::Int16 => (i16::MIN as f64, i16::MAX as f64),
            DType::UInt32 => (u32::MIN as f64, u32::MAX as f64),
            DType::Int32 => (i32::MIN as f64, i32::MAX as f64),
            DType::Float32 => (f64::NEG_INFINITY, f64::INFINITY),
            DType::Float64 => (f64::NEG_INFINITY, f64::INFINITY),
        }
    }

    /// Whether values of this type are whole numbers
    pub fn is_integer(&self) -> bool {
        !matches!(self, DType::Float32 | DType::Float64)
    }

    /// Clamp (and for integer types, round) a value into this type's range
    pub fn clamp_value(&self, value: PixelValue) -> PixelValue {
        let (min, max) = self.value_range();
        let v = num_traits::clamp(value as f64, min, max);
        if self.is_integer() {
            v.round() as PixelValue
        } else {
            v as PixelValue
        }
    }
}

impl std::fmt::Display for DType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DType::UInt8 => "uint8",
            DType::UInt16 => "uint16",
            DType::Int16 => "int16",
            DType::UInt32 => "uint32",
            DType::Int32 => "int32",
            DType::Float32 => "float32",
            DType::Float64 => "float64",
        };
        write!(f, "{}", name)
    }
}

/// Geospatial transformation parameters, in GDAL order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub top_left_x: f64,
    pub pixel_width: f64,
    pub rotation_x: f64,
    pub top_left_y: f64,
    pub rotation_y: f64,
    pub pixel_height: f64,
}

impl GeoTransform {
    pub fn from_array(gt: &[f64; 6]) -> Self {
        Self {
            top_left_x: gt[0],
            pixel_width: gt[1],
            rotation_x: gt[2],
            top_left_y: gt[3],
            rotation_y: gt[4],
            pixel_height: gt[5],
        }
    }

    pub fn to_array(&self) -> [f64; 6] {
        [
            self.top_left_x,
            self.pixel_width,
            self.rotation_x,
            self.top_left_y,
            self.rotation_y,
            self.pixel_height,
        ]
    }
}

impl Default for GeoTransform {
    fn default() -> Self {
        Self {
            top_left_x: 0.0,
            pixel_width: 1.0,
            rotation_x: 0.0,
            top_left_y: 0.0,
            rotation_y: 0.0,
            pixel_height: -1.0,
        }
    }
}

/// Error types for scene and product processing
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("missing band: {0}")]
    MissingBand(String),

    #[error("invalid band: {0}")]
    InvalidBand(String),

    #[error("scene is not open: {0}")]
    SceneNotOpen(String),

    #[error("backing source error: {0}")]
    BackingSource(String),

    #[error("unknown data type: {0}")]
    InvalidDType(String),

    #[error("unknown product: {0}")]
    UnknownProduct(String),

    #[error("processing error: {0}")]
    Processing(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),
}

/// Result type for scene operations
pub type SceneResult<T> = Result<T, SceneError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dtype_parse() {
        assert_eq!(DType::parse("uint16").unwrap(), DType::UInt16);
        assert_eq!(DType::parse("Float32").unwrap(), DType::Float32);
        assert_eq!(DType::parse("byte").unwrap(), DType::UInt8);

        let err = DType::parse("complex128").unwrap_err();
        assert!(matches!(err, SceneError::InvalidDType(_)));
        assert!(err.to_string().contains("complex128"));
    }

    #[test]
    fn test_dtype_clamp() {
        assert_eq!(DType::UInt8.clamp_value(300.0), 255.0);
        assert_eq!(DType::UInt8.clamp_value(-5.0), 0.0);
        assert_eq!(DType::UInt16.clamp_value(12.4), 12.0);
        assert_eq!(DType::Float32.clamp_value(-5.5), -5.5);
    }

    #[test]
    fn test_geotransform_roundtrip() {
        let gt = GeoTransform::from_array(&[300.0, 30.0, 0.0, 4500.0, 0.0, -30.0]);
        assert_eq!(gt.to_array(), [300.0, 30.0, 0.0, 4500.0, 0.0, -30.0]);
    }
}
