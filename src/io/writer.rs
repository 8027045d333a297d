use crate::types::{DType, GeoTransform, PixelArray, PixelValue, SceneError, SceneResult};
use gdal::raster::{Buffer, GdalType, RasterCreationOption};
use gdal::DriverManager;
use std::path::Path;

/// One named band to be written
pub struct BandData<'a> {
    pub name: &'a str,
    pub pixels: &'a PixelArray,
}

/// Raster file writer
pub struct RasterWriter;

impl RasterWriter {
    /// Write bands to a single multi-band GeoTIFF.
    ///
    /// All bands must share the same dimensions; the photometric RGB tag
    /// is only valid for exactly 3 bands.
    pub fn write<P: AsRef<Path>>(
        path: P,
        bands: &[BandData],
        crs: &str,
        geo_transform: &GeoTransform,
        dtype: DType,
        photometric_rgb: bool,
        nodata: Option<f64>,
    ) -> SceneResult<()> {
        if bands.is_empty() {
            return Err(SceneError::InvalidInput(
                "cannot write a file with no bands".to_string(),
            ));
        }
        let (height, width) = bands[0].pixels.dim();
        for band in bands {
            if band.pixels.dim() != (height, width) {
                return Err(SceneError::InvalidInput(format!(
                    "band {} has dimensions {:?}, expected {:?}",
                    band.name,
                    band.pixels.dim(),
                    (height, width)
                )));
            }
        }
        if photometric_rgb && bands.len() != 3 {
            return Err(SceneError::InvalidInput(format!(
                "photometric RGB requires exactly 3 bands, got {}",
                bands.len()
            )));
        }

        log::info!(
            "Writing {} band(s) ({}x{}, {}) to {}",
            bands.len(),
            width,
            height,
            dtype,
            path.as_ref().display()
        );

        match dtype {
            DType::UInt8 => Self::write_typed::<u8, _>(path, bands, crs, geo_transform, dtype, photometric_rgb, nodata),
            DType::UInt16 => Self::write_typed::<u16, _>(path, bands, crs, geo_transform, dtype, photometric_rgb, nodata),
            DType::Int16 => Self::write_typed::<i16, _>(path, bands, crs, geo_transform, dtype, photometric_rgb, nodata),
            DType::UInt32 => Self::write_typed::<u32, _>(path, bands, crs, geo_transform, dtype, photometric_rgb, nodata),
            DType::Int32 => Self::write_typed::<i32, _>(path, bands, crs, geo_transform, dtype, photometric_rgb, nodata),
            DType::Float32 => Self::write_typed::<f32, _>(path, bands, crs, geo_transform, dtype, photometric_rgb, nodata),
            DType::Float64 => Self::write_typed::<f64, _>(path, bands, crs, geo_transform, dtype, photometric_rgb, nodata),
        }
    }

    fn write_typed<T, P>(
        path: P,
        bands: &[BandData],
        crs: &str,
        geo_transform: &GeoTransform,
        dtype: DType,
        photometric_rgb: bool,
        nodata: Option<f64>,
    ) -> SceneResult<()>
    where
        T: GdalType + Copy + num_traits::NumCast + num_traits::Zero,
        P: AsRef<Path>,
    {
        let driver = DriverManager::get_driver_by_name("GTiff")?;
        let (height, width) = bands[0].pixels.dim();

        let mut options = vec![
            RasterCreationOption {
                key: "COMPRESS",
                value: "DEFLATE",
            },
            RasterCreationOption {
                key: "TILED",
                value: "YES",
            },
        ];
        if photometric_rgb {
            options.push(RasterCreationOption {
                key: "PHOTOMETRIC",
                value: "RGB",
            });
        }

        let mut out_ds = driver.create_with_band_type_with_options::<T, _>(
            path.as_ref(),
            width as isize,
            height as isize,
            bands.len() as isize,
            &options,
        )?;

        out_ds.set_geo_transform(&geo_transform.to_array())?;
        if !crs.is_empty() {
            out_ds.set_projection(crs)?;
        }

        for (i, band) in bands.iter().enumerate() {
            let mut rasterband = out_ds.rasterband((i + 1) as isize)?;
            if let Some(nd) = nodata {
                rasterband.set_no_data_value(Some(nd))?;
            }
            log::debug!("Writing band {} as band {}", band.name, i + 1);

            let data: Vec<T> = band
                .pixels
                .iter()
                .map(|&v| convert_pixel::<T>(v, dtype))
                .collect();
            rasterband.write((0, 0), (width, height), &Buffer::new((width, height), data))?;
        }

        out_ds.flush_cache();
        Ok(())
    }
}

fn convert_pixel<T: num_traits::NumCast + num_traits::Zero>(value: PixelValue, dtype: DType) -> T {
    // clamp_value keeps the value within T's range; NaN degrades to zero
    num_traits::cast(dtype.clamp_value(value)).unwrap_or_else(T::zero)
}
