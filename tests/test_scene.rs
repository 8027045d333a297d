use ndarray::Array2;
use satscene::{DType, GeoTransform, ProductRegistry, Raster, Scene, SceneError};
use std::sync::Arc;

fn raster(name: &str, value: f32) -> Raster {
    Raster::from_array(
        name,
        Array2::from_elem((4, 4), value),
        "",
        GeoTransform::default(),
        DType::UInt16,
    )
}

fn scene_with(bands: &[(&str, f32)]) -> Scene {
    let mut scene = Scene::new(Arc::new(ProductRegistry::with_defaults()));
    for (name, value) in bands {
        scene.add(raster(name, *value)).expect("unique test bandnames");
    }
    scene
}

#[test]
fn test_empty_file_list_is_invalid_input() {
    let paths: Vec<&str> = Vec::new();
    let result = Scene::from_files(&paths, Arc::new(ProductRegistry::with_defaults()));
    assert!(matches!(result, Err(SceneError::InvalidInput(_))));
}

#[test]
fn test_bandname_count_mismatch_is_invalid_input() {
    let paths = ["a.tif", "b.tif"];
    let result = Scene::from_files_with_bandnames(
        &paths,
        &["red"],
        Arc::new(ProductRegistry::with_defaults()),
    );
    assert!(matches!(result, Err(SceneError::InvalidInput(_))));
}

#[test]
fn test_get_by_position_and_name() {
    let scene = scene_with(&[("red", 1.0), ("nir", 2.0)]);

    assert_eq!(scene.get(0).unwrap().bandname(), "red");
    assert_eq!(scene.get(1).unwrap().bandname(), "nir");
    assert_eq!(scene.get("nir").unwrap().bandname(), "nir");

    let err = scene.get(2).unwrap_err();
    assert!(matches!(err, SceneError::InvalidBand(_)));

    let err = scene.get("swir1").unwrap_err();
    assert!(matches!(err, SceneError::InvalidBand(_)));
    assert!(err.to_string().contains("swir1"));
}

#[test]
fn test_has_bands_names_first_absent() {
    let scene = scene_with(&[("red", 1.0), ("green", 2.0)]);
    scene.has_bands(&["red", "green"]).unwrap();

    let err = scene.has_bands(&["red", "nir", "blue"]).unwrap_err();
    assert!(matches!(err, SceneError::MissingBand(_)));
    assert!(err.to_string().contains("nir"));
}

#[test]
fn test_select_copies_in_request_order() {
    let scene = scene_with(&[("red", 1.0), ("green", 2.0), ("blue", 3.0)]);
    let selection = scene.select(&["blue", "red"]).unwrap();

    assert_eq!(selection.bands(), vec!["blue", "red"]);
    assert_eq!(
        selection.get("red").unwrap().read().unwrap(),
        scene.get("red").unwrap().read().unwrap()
    );

    let err = scene.select(&["red", "swir2"]).unwrap_err();
    assert!(matches!(err, SceneError::InvalidBand(_)));
}

#[test]
fn test_select_mutation_does_not_touch_source() {
    let scene = scene_with(&[("red", 1.0), ("green", 2.0)]);
    let mut selection = scene.select(&["red"]).unwrap();

    selection
        .get_mut("red")
        .unwrap()
        .write(Array2::from_elem((4, 4), 99.0));

    assert_eq!(
        selection.get("red").unwrap().read().unwrap(),
        &Array2::from_elem((4, 4), 99.0)
    );
    assert_eq!(
        scene.get("red").unwrap().read().unwrap(),
        &Array2::from_elem((4, 4), 1.0)
    );
}

#[test]
fn test_set_bandname() {
    let mut scene = scene_with(&[("1", 1.0), ("2", 2.0)]);

    scene.set_bandname("red", 1).unwrap();
    scene.set_bandname("nir", 2).unwrap();
    assert_eq!(scene.bands(), vec!["red", "nir"]);

    // 1-based band numbers
    let err = scene.set_bandname("blue", 0).unwrap_err();
    assert!(matches!(err, SceneError::InvalidBand(_)));
    let err = scene.set_bandname("blue", 3).unwrap_err();
    assert!(matches!(err, SceneError::InvalidBand(_)));

    // renaming a band onto an existing name breaks uniqueness
    let err = scene.set_bandname("red", 2).unwrap_err();
    assert!(matches!(err, SceneError::InvalidBand(_)));

    // renaming a band to its own name is a no-op
    scene.set_bandname("red", 1).unwrap();
}

#[test]
fn test_set_bandnames() {
    let mut scene = scene_with(&[("1", 1.0), ("2", 2.0), ("3", 3.0)]);

    scene.set_bandnames(&["red", "green", "blue"]).unwrap();
    assert_eq!(scene.bands(), vec!["red", "green", "blue"]);

    let err = scene.set_bandnames(&["red", "green"]).unwrap_err();
    assert!(matches!(err, SceneError::InvalidBand(_)));

    let err = scene.set_bandnames(&["red", "red", "blue"]).unwrap_err();
    assert!(matches!(err, SceneError::InvalidBand(_)));
}

#[test]
fn test_add_rejects_duplicate_bandname() {
    let mut scene = scene_with(&[("red", 1.0)]);
    let err = scene.add(raster("red", 5.0)).unwrap_err();
    assert!(matches!(err, SceneError::InvalidBand(_)));
    assert_eq!(scene.num_bands(), 1);
}

#[test]
fn test_delete_by_name_and_position() {
    let mut scene = scene_with(&[("red", 1.0), ("green", 2.0), ("blue", 3.0)]);

    scene.delete(["green"]).unwrap();
    assert_eq!(scene.bands(), vec!["red", "blue"]);

    scene.delete([1usize]).unwrap();
    assert_eq!(scene.bands(), vec!["red"]);

    let err = scene.delete(["swir1"]).unwrap_err();
    assert!(matches!(err, SceneError::InvalidBand(_)));
    assert_eq!(scene.num_bands(), 1);
}

#[test]
fn test_delete_lookup_failure_removes_nothing() {
    let mut scene = scene_with(&[("red", 1.0), ("green", 2.0)]);
    let err = scene.delete(["red", "missing"]).unwrap_err();
    assert!(matches!(err, SceneError::InvalidBand(_)));
    assert_eq!(scene.num_bands(), 2);
}

#[test]
fn test_scene_recast_applies_to_every_band() {
    let mut scene = scene_with(&[("red", 300.0), ("nir", -7.0)]);
    scene.recast("uint8").unwrap();

    assert_eq!(scene.get("red").unwrap().dtype, DType::UInt8);
    assert_eq!(
        scene.get("red").unwrap().read().unwrap(),
        &Array2::from_elem((4, 4), 255.0)
    );
    assert_eq!(
        scene.get("nir").unwrap().read().unwrap(),
        &Array2::from_elem((4, 4), 0.0)
    );

    let err = scene.recast("int128").unwrap_err();
    assert!(matches!(err, SceneError::InvalidDType(_)));
}
