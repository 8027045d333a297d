use crate::types::{DType, GeoTransform, PixelArray, SceneError, SceneResult};
use gdal::raster::GdalDataType;
use gdal::Dataset;
use ndarray::Array2;
use std::path::Path;

/// Metadata of an opened raster file
#[derive(Debug, Clone)]
pub struct SourceInfo {
    pub width: usize,
    pub height: usize,
    pub crs: String,
    pub geo_transform: GeoTransform,
    pub dtype: DType,
    pub num_bands: usize,
}

/// Raster file reader
pub struct RasterReader;

impl RasterReader {
    /// Read the spatial metadata of a raster file without touching pixel data
    pub fn info<P: AsRef<Path>>(path: P) -> SceneResult<SourceInfo> {
        let path = path.as_ref();
        log::debug!("Opening raster metadata: {}", path.display());

        let dataset = Self::open(path)?;
        let (width, height) = dataset.raster_size();
        let crs = dataset.projection();
        let geo_transform = dataset
            .geo_transform()
            .map(|gt| GeoTransform::from_array(&gt))
            .unwrap_or_default();
        let num_bands = dataset.raster_count() as usize;

        let band = dataset.rasterband(1)?;
        let dtype = match band.band_type() {
            GdalDataType::UInt8 => DType::UInt8,
            GdalDataType::UInt16 => DType::UInt16,
            GdalDataType::Int16 => DType::Int16,
            GdalDataType::UInt32 => DType::UInt32,
            GdalDataType::Int32 => DType::Int32,
            GdalDataType::Float32 => DType::Float32,
            GdalDataType::Float64 => DType::Float64,
            other => {
                log::warn!(
                    "Unsupported band type {:?} in {}, treating as float32",
                    other,
                    path.display()
                );
                DType::Float32
            }
        };

        log::debug!(
            "{}: {}x{}, {} band(s), {}",
            path.display(),
            width,
            height,
            num_bands,
            dtype
        );

        Ok(SourceInfo {
            width,
            height,
            crs,
            geo_transform,
            dtype,
            num_bands,
        })
    }

    /// Read one band (1-based index) of a raster file as a pixel array
    pub fn read_band<P: AsRef<Path>>(path: P, band_index: usize) -> SceneResult<PixelArray> {
        let path = path.as_ref();
        log::debug!("Reading band {} from {}", band_index, path.display());

        let dataset = Self::open(path)?;
        let num_bands = dataset.raster_count() as usize;
        if band_index == 0 || band_index > num_bands {
            return Err(SceneError::BackingSource(format!(
                "{} has {} band(s), cannot read band {}",
                path.display(),
                num_bands,
                band_index
            )));
        }

        let (width, height) = dataset.raster_size();
        let rasterband = dataset.rasterband(band_index as isize)?;
        let band_data = rasterband.read_as::<f32>((0, 0), (width, height), (width, height), None)?;

        Array2::from_shape_vec((height, width), band_data.data).map_err(|e| {
            SceneError::BackingSource(format!(
                "failed to reshape band {} of {}: {}",
                band_index,
                path.display(),
                e
            ))
        })
    }

    fn open(path: &Path) -> SceneResult<Dataset> {
        Dataset::open(path)
            .map_err(|e| SceneError::BackingSource(format!("{}: {}", path.display(), e)))
    }
}
