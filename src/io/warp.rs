use crate::types::{GeoTransform, PixelArray, SceneError, SceneResult};
use gdal::raster::Buffer;
use gdal::spatial_ref::{CoordTransform, SpatialRef};
use gdal::DriverManager;
use ndarray::Array2;

/// Result of warping a band into a new coordinate reference system
pub struct WarpedBand {
    pub pixels: PixelArray,
    pub geo_transform: GeoTransform,
    pub crs: String,
}

/// Resample a band into a target CRS using nearest-neighbor resampling.
///
/// The output grid keeps the input's pixel counts; pixel sizes are derived
/// from the reprojected extent.
pub fn reproject_band(
    pixels: &PixelArray,
    geo_transform: &GeoTransform,
    src_crs: &str,
    dst_crs: &str,
) -> SceneResult<WarpedBand> {
    let (height, width) = pixels.dim();
    log::info!(
        "Reprojecting {}x{} band to {}",
        width,
        height,
        dst_crs
    );

    let src_sr = spatial_ref(src_crs)?;
    let dst_sr = spatial_ref(dst_crs)?;

    let driver = DriverManager::get_driver_by_name("MEM")?;

    // Source dataset in memory
    let mut src_ds =
        driver.create_with_band_type::<f32, _>("", width as isize, height as isize, 1)?;
    src_ds.set_geo_transform(&geo_transform.to_array())?;
    src_ds.set_projection(&src_sr.to_wkt()?)?;
    let data: Vec<f32> = pixels.iter().copied().collect();
    src_ds
        .rasterband(1)?
        .write((0, 0), (width, height), &Buffer::new((width, height), data))?;

    // Transform the source corners to find the target extent
    let gt = geo_transform;
    let corners = [
        (0.0, 0.0),
        (width as f64, 0.0),
        (0.0, height as f64),
        (width as f64, height as f64),
    ];
    let mut xs = [0.0f64; 4];
    let mut ys = [0.0f64; 4];
    let mut zs = [0.0f64; 4];
    for (i, (col, row)) in corners.iter().enumerate() {
        xs[i] = gt.top_left_x + col * gt.pixel_width + row * gt.rotation_x;
        ys[i] = gt.top_left_y + col * gt.rotation_y + row * gt.pixel_height;
    }
    let transform = CoordTransform::new(&src_sr, &dst_sr)?;
    transform.transform_coords(&mut xs, &mut ys, &mut zs)?;

    let (x_min, x_max) = min_max(&xs);
    let (y_min, y_max) = min_max(&ys);
    let dst_geo_transform = GeoTransform {
        top_left_x: x_min,
        pixel_width: (x_max - x_min) / width as f64,
        rotation_x: 0.0,
        top_left_y: y_max,
        rotation_y: 0.0,
        pixel_height: -((y_max - y_min) / height as f64),
    };

    // Target dataset with the same pixel counts on the new grid
    let mut dst_ds =
        driver.create_with_band_type::<f32, _>("", width as isize, height as isize, 1)?;
    dst_ds.set_geo_transform(&dst_geo_transform.to_array())?;
    let dst_wkt = dst_sr.to_wkt()?;
    dst_ds.set_projection(&dst_wkt)?;

    gdal::raster::reproject(&src_ds, &dst_ds)?;

    let warped = dst_ds
        .rasterband(1)?
        .read_as::<f32>((0, 0), (width, height), (width, height), None)?;
    let pixels = Array2::from_shape_vec((height, width), warped.data)
        .map_err(|e| SceneError::Processing(format!("failed to reshape warped band: {}", e)))?;

    Ok(WarpedBand {
        pixels,
        geo_transform: dst_geo_transform,
        crs: dst_wkt,
    })
}

/// Build a spatial reference from a WKT definition or an `EPSG:n` code
pub fn spatial_ref(crs: &str) -> SceneResult<SpatialRef> {
    let sr = if let Some(code) = crs.strip_prefix("EPSG:") {
        let code: u32 = code
            .trim()
            .parse()
            .map_err(|_| SceneError::InvalidInput(format!("invalid EPSG code: {}", crs)))?;
        SpatialRef::from_epsg(code)?
    } else if crs.is_empty() {
        return Err(SceneError::InvalidInput(
            "cannot reproject a band without a CRS".to_string(),
        ));
    } else {
        SpatialRef::from_wkt(crs)?
    };
    sr.set_axis_mapping_strategy(gdal_sys::OSRAxisMappingStrategy::OAMS_TRADITIONAL_GIS_ORDER);
    Ok(sr)
}

fn min_max(values: &[f64]) -> (f64, f64) {
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    (min, max)
}
