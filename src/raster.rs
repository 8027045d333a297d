use crate::io::{self, RasterReader, SourceInfo};
use crate::types::{DType, GeoTransform, PixelArray, SceneError, SceneResult};
use std::path::PathBuf;
use std::sync::OnceLock;

/// Backing file and band index of a file-based raster
#[derive(Debug, Clone)]
pub struct BandSource {
    pub path: PathBuf,
    /// 1-based band index within the file
    pub band_index: usize,
}

/// A single named band: one 2D pixel array plus geospatial metadata.
///
/// Pixel data is loaded lazily from the backing source on first read and
/// cached; the cache is only replaced by `write`, `recast` or `reproject`.
#[derive(Debug, Clone)]
pub struct Raster {
    bandname: String,
    source: Option<BandSource>,
    cache: OnceLock<PixelArray>,
    pub crs: String,
    pub geo_transform: GeoTransform,
    pub width: usize,
    pub height: usize,
    pub dtype: DType,
    reprojected: bool,
}

impl Raster {
    /// Create a raster backed by one band of a file
    pub fn from_source(bandname: impl Into<String>, source: BandSource, info: &SourceInfo) -> Self {
        Self {
            bandname: bandname.into(),
            source: Some(source),
            cache: OnceLock::new(),
            crs: info.crs.clone(),
            geo_transform: info.geo_transform.clone(),
            width: info.width,
            height: info.height,
            dtype: info.dtype,
            reprojected: false,
        }
    }

    /// Create a raster from an in-memory pixel array
    pub fn from_array(
        bandname: impl Into<String>,
        pixels: PixelArray,
        crs: impl Into<String>,
        geo_transform: GeoTransform,
        dtype: DType,
    ) -> Self {
        let (height, width) = pixels.dim();
        let cache = OnceLock::new();
        let _ = cache.set(pixels);
        Self {
            bandname: bandname.into(),
            source: None,
            cache,
            crs: crs.into(),
            geo_transform,
            width,
            height,
            dtype,
            reprojected: false,
        }
    }

    /// Create a raster from a pixel array, taking spatial metadata from another band
    pub fn derived(
        bandname: impl Into<String>,
        pixels: PixelArray,
        like: &Raster,
        dtype: DType,
    ) -> Self {
        Self::from_array(bandname, pixels, like.crs.clone(), like.geo_transform.clone(), dtype)
    }

    pub fn bandname(&self) -> &str {
        &self.bandname
    }

    pub fn set_bandname(&mut self, name: impl Into<String>) {
        self.bandname = name.into();
    }

    /// Name of the backing file without directory and extension; rasters
    /// with no backing file report their bandname.
    pub fn basename(&self) -> String {
        match &self.source {
            Some(source) => source
                .path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| self.bandname.clone()),
            None => self.bandname.clone(),
        }
    }

    pub fn is_reprojected(&self) -> bool {
        self.reprojected
    }

    /// Whether pixel data has been materialized
    pub fn is_loaded(&self) -> bool {
        self.cache.get().is_some()
    }

    /// Return the pixel array, loading it from the backing source on first access
    pub fn read(&self) -> SceneResult<&PixelArray> {
        if let Some(pixels) = self.cache.get() {
            return Ok(pixels);
        }
        let source = self.source.as_ref().ok_or_else(|| {
            SceneError::SceneNotOpen(format!(
                "band {} has no pixel data and no backing file",
                self.bandname
            ))
        })?;
        log::debug!(
            "Loading band {} from {} (band {})",
            self.bandname,
            source.path.display(),
            source.band_index
        );
        let pixels = RasterReader::read_band(&source.path, source.band_index)?;
        Ok(self.cache.get_or_init(|| pixels))
    }

    /// Replace the cached pixel array; the backing file is not touched
    pub fn write(&mut self, pixels: PixelArray) {
        let (height, width) = pixels.dim();
        self.height = height;
        self.width = width;
        self.replace_cache(pixels);
    }

    /// Convert the cached pixel data to a new nominal type, clamping values
    /// into the target range
    pub fn recast(&mut self, dtype_name: &str) -> SceneResult<()> {
        let dtype = DType::parse(dtype_name)?;
        let recast = self.read()?.mapv(|v| dtype.clamp_value(v));
        log::debug!("Recasting band {} from {} to {}", self.bandname, self.dtype, dtype);
        self.replace_cache(recast);
        self.dtype = dtype;
        Ok(())
    }

    /// Resample this band into a target CRS using nearest-neighbor
    /// resampling; the previous pixel grid and cache are discarded
    pub fn reproject(&mut self, target_crs: &str) -> SceneResult<()> {
        let warped = io::reproject_band(self.read()?, &self.geo_transform, &self.crs, target_crs)?;
        let (height, width) = warped.pixels.dim();
        self.replace_cache(warped.pixels);
        self.geo_transform = warped.geo_transform;
        self.crs = warped.crs;
        self.height = height;
        self.width = width;
        self.reprojected = true;
        Ok(())
    }

    fn replace_cache(&mut self, pixels: PixelArray) {
        self.cache = OnceLock::new();
        let _ = self.cache.set(pixels);
    }
}
