use ndarray::Array2;
use satscene::io::{BandData, RasterWriter};
use satscene::raster::BandSource;
use satscene::{
    DType, GeoTransform, ProductOutput, ProductParams, ProductRegistry, Raster, Scene, SceneError,
};
use std::path::Path;
use std::sync::Arc;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn registry() -> Arc<ProductRegistry> {
    Arc::new(ProductRegistry::with_defaults())
}

fn geo() -> GeoTransform {
    GeoTransform::from_array(&[300000.0, 30.0, 0.0, 4650000.0, 0.0, -30.0])
}

fn write_band(path: &Path, name: &str, pixels: &Array2<f32>) {
    RasterWriter::write(
        path,
        &[BandData { name, pixels }],
        "",
        &geo(),
        DType::UInt16,
        false,
        None,
    )
    .expect("write test band");
}

#[test]
fn test_single_band_roundtrip() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test_B4.TIF");

    let pixels = Array2::from_shape_fn((5, 7), |(r, c)| (r * 7 + c) as f32);
    write_band(&path, "red", &pixels);

    let scene = Scene::from_files_with_bandnames(&[&path], &["red"], registry()).unwrap();
    let raster = scene.get("red").unwrap();
    assert_eq!((raster.height, raster.width), (5, 7));
    assert_eq!(raster.dtype, DType::UInt16);
    assert_eq!(raster.geo_transform, geo());

    // pixel data is lazy until first read
    assert!(!raster.is_loaded());
    assert_eq!(raster.read().unwrap(), &pixels);
    assert!(raster.is_loaded());
}

#[test]
fn test_missing_file_is_backing_source_error() {
    init_logging();
    let result = Scene::from_files(&["/nonexistent/scene_B1.TIF"], registry());
    assert!(matches!(result, Err(SceneError::BackingSource(_))));
}

#[test]
fn test_band_index_out_of_range() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test_B2.TIF");
    write_band(&path, "blue", &Array2::from_elem((3, 3), 7.0));

    let info = satscene::io::RasterReader::info(&path).unwrap();
    assert_eq!(info.num_bands, 1);

    let raster = Raster::from_source(
        "blue",
        BandSource {
            path: path.clone(),
            band_index: 5,
        },
        &info,
    );
    let err = raster.read().unwrap_err();
    assert!(matches!(err, SceneError::BackingSource(_)));
}

#[test]
fn test_save_three_bands_and_reopen() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();

    let mut scene = Scene::new(registry());
    for (name, value) in [("red", 100.0), ("green", 200.0), ("blue", 300.0)] {
        scene
            .add(Raster::from_array(
                name,
                Array2::from_elem((4, 6), value),
                "",
                geo(),
                DType::UInt16,
            ))
            .unwrap();
    }

    let out = dir.path().join("composite.tif");
    scene.save(&out, None).unwrap();

    let entries = [(
        out,
        vec!["red".to_string(), "green".to_string(), "blue".to_string()],
    )];
    let reopened = Scene::from_file_map(&entries, registry()).unwrap();
    assert_eq!(reopened.num_bands(), 3);
    assert_eq!(
        reopened.get("green").unwrap().read().unwrap(),
        &Array2::from_elem((4, 6), 200.0)
    );
}

#[test]
fn test_save_band_selection_capped_at_three() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();

    let mut scene = Scene::new(registry());
    for (name, value) in [("red", 1.0), ("green", 2.0), ("blue", 3.0), ("nir", 4.0)] {
        scene
            .add(Raster::from_array(
                name,
                Array2::from_elem((2, 2), value),
                "",
                geo(),
                DType::UInt16,
            ))
            .unwrap();
    }

    let out = dir.path().join("selected.tif");
    scene.save(&out, Some(&["nir", "red", "green", "blue"])).unwrap();

    let info = satscene::io::RasterReader::info(&out).unwrap();
    assert_eq!(info.num_bands, 3);
    let first = satscene::io::RasterReader::read_band(&out, 1).unwrap();
    assert_eq!(first, Array2::from_elem((2, 2), 4.0));

    let err = scene.save(dir.path().join("bad.tif"), Some(&["red", "missing"]));
    assert!(matches!(err, Err(SceneError::MissingBand(_))));
}

#[test]
fn test_mapped_open_and_ndvi_end_to_end() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let red_path = dir.path().join("LC80090612015251LGN00_B4.TIF");
    let nir_path = dir.path().join("LC80090612015251LGN00_B5.TIF");

    write_band(&red_path, "red", &Array2::from_elem((3, 3), 4.0));
    write_band(&nir_path, "nir", &Array2::from_elem((3, 3), 8.0));

    let mut scene = Scene::from_files_mapped(
        &[&red_path, &nir_path],
        &satscene::sensors::landsat8(),
        registry(),
    )
    .unwrap();

    assert_eq!(scene.basename(), "LC80090612015251LGN00");
    assert_eq!(scene.bands(), vec!["red", "nir"]);

    match scene.process("ndvi", &ProductParams::default()).unwrap() {
        ProductOutput::Band(name) => assert_eq!(name, "ndvi"),
        ProductOutput::Scene(_) => panic!("ndvi is a band product"),
    }
    assert_eq!(scene.num_bands(), 3);

    let ndvi = scene.get("ndvi").unwrap().read().unwrap();
    assert!((ndvi[[1, 1]] - (8.0 - 4.0) / (8.0 + 4.0)).abs() < 1e-6);
}

#[test]
fn test_reproject_to_geographic() {
    init_logging();

    let mut raster = Raster::from_array(
        "red",
        Array2::from_elem((10, 10), 42.0),
        "EPSG:32618",
        GeoTransform::from_array(&[500000.0, 30.0, 0.0, 4650000.0, 0.0, -30.0]),
        DType::UInt16,
    );

    // requires a PROJ installation; skip when the environment lacks one
    match raster.reproject("EPSG:4326") {
        Ok(()) => {
            assert!(raster.is_reprojected());
            assert!(raster.crs.contains("4326") || raster.crs.contains("WGS 84"));
            assert_eq!((raster.height, raster.width), (10, 10));
            assert!(raster.geo_transform.top_left_x < 0.0);
            assert!(raster.geo_transform.pixel_width > 0.0);
        }
        Err(e) => {
            println!("Reprojection unavailable in this environment, skipping: {}", e);
        }
    }
}
