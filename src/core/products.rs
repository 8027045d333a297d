//! Built-in products: vegetation/water indices, quality mask, TOA
//! reflectance, and the stretched true-color composite

use crate::core::product::{
    Dependency, Product, ProductKind, ProductParams, ProductRegistry, ProductValue,
};
use crate::core::{algebra, color, quality};
use crate::raster::Raster;
use crate::scene::Scene;
use crate::types::{DType, PixelArray, SceneResult};

impl ProductRegistry {
    /// Registry with every built-in product
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(Ndvi));
        registry.register(Box::new(Evi));
        registry.register(Box::new(Nbr));
        registry.register(Box::new(Ndwi));
        registry.register(Box::new(Mask));
        registry.register(Box::new(Toa));
        registry.register(Box::new(Color));
        registry
    }
}

fn normalized_difference(a: &PixelArray, b: &PixelArray) -> PixelArray {
    #[cfg(feature = "parallel")]
    {
        algebra::normalized_difference_parallel(a, b)
    }
    #[cfg(not(feature = "parallel"))]
    {
        algebra::normalized_difference(a, b)
    }
}

/// Normalized Difference Vegetation Index
pub struct Ndvi;

impl Product for Ndvi {
    fn name(&self) -> &str {
        "ndvi"
    }

    fn description(&self) -> &str {
        "Normalized Difference Vegetation Index (NDVI)"
    }

    fn dependencies(&self) -> Vec<Dependency> {
        vec![Dependency::band("nir"), Dependency::band("red")]
    }

    fn compute(&self, scene: &Scene, _params: &ProductParams) -> SceneResult<ProductValue> {
        let nir = scene.get("nir")?.read()?;
        let red = scene.get("red")?.read()?;
        let index = normalized_difference(nir, red);
        Ok(ProductValue::Band(Raster::derived(
            self.name(),
            index,
            scene.get("red")?,
            DType::Float32,
        )))
    }
}

/// Enhanced Vegetation Index
pub struct Evi;

impl Product for Evi {
    fn name(&self) -> &str {
        "evi"
    }

    fn description(&self) -> &str {
        "Enhanced Vegetation Index (EVI)"
    }

    fn dependencies(&self) -> Vec<Dependency> {
        vec![
            Dependency::band("nir"),
            Dependency::band("red"),
            Dependency::band("blue"),
        ]
    }

    fn compute(&self, scene: &Scene, _params: &ProductParams) -> SceneResult<ProductValue> {
        let nir = scene.get("nir")?.read()?;
        let red = scene.get("red")?.read()?;
        let blue = scene.get("blue")?.read()?;
        #[cfg(feature = "parallel")]
        let index = algebra::enhanced_vegetation_index_parallel(nir, red, blue);
        #[cfg(not(feature = "parallel"))]
        let index = algebra::enhanced_vegetation_index(nir, red, blue);
        Ok(ProductValue::Band(Raster::derived(
            self.name(),
            index,
            scene.get("red")?,
            DType::Float32,
        )))
    }
}

/// Normalized Burn Ratio
pub struct Nbr;

impl Product for Nbr {
    fn name(&self) -> &str {
        "nbr"
    }

    fn description(&self) -> &str {
        "Normalized Burn Ratio (NBR)"
    }

    fn dependencies(&self) -> Vec<Dependency> {
        vec![Dependency::band("nir"), Dependency::band("swir2")]
    }

    fn compute(&self, scene: &Scene, _params: &ProductParams) -> SceneResult<ProductValue> {
        let nir = scene.get("nir")?.read()?;
        let swir2 = scene.get("swir2")?.read()?;
        let index = normalized_difference(nir, swir2);
        Ok(ProductValue::Band(Raster::derived(
            self.name(),
            index,
            scene.get("nir")?,
            DType::Float32,
        )))
    }
}

/// Normalized Difference Water Index
pub struct Ndwi;

impl Product for Ndwi {
    fn name(&self) -> &str {
        "ndwi"
    }

    fn description(&self) -> &str {
        "Normalized Difference Water Index (NDWI)"
    }

    fn dependencies(&self) -> Vec<Dependency> {
        vec![Dependency::band("green"), Dependency::band("nir")]
    }

    fn compute(&self, scene: &Scene, _params: &ProductParams) -> SceneResult<ProductValue> {
        let green = scene.get("green")?.read()?;
        let nir = scene.get("nir")?.read()?;
        let index = normalized_difference(green, nir);
        Ok(ProductValue::Band(Raster::derived(
            self.name(),
            index,
            scene.get("green")?,
            DType::Float32,
        )))
    }
}

/// Cloud/snow/fill mask decoded from the quality band
pub struct Mask;

impl Product for Mask {
    fn name(&self) -> &str {
        "mask"
    }

    fn description(&self) -> &str {
        "Cloud/snow/fill mask from the quality band"
    }

    fn dependencies(&self) -> Vec<Dependency> {
        vec![Dependency::band("quality")]
    }

    fn compute(&self, scene: &Scene, _params: &ProductParams) -> SceneResult<ProductValue> {
        let quality_band = scene.get("quality")?;
        let mask = quality::mask_raster(quality_band.read()?);
        Ok(ProductValue::Band(Raster::derived(
            self.name(),
            mask,
            quality_band,
            DType::UInt8,
        )))
    }
}

/// Top-of-Atmosphere reflectance scaling of every band.
///
/// Gain and offset come from the product params; the quality band carries
/// bit flags, not radiance, and is passed through unscaled.
pub struct Toa;

impl Product for Toa {
    fn name(&self) -> &str {
        "toa"
    }

    fn description(&self) -> &str {
        "Top of the Atmosphere (TOA) Reflectance"
    }

    fn dependencies(&self) -> Vec<Dependency> {
        Vec::new()
    }

    fn kind(&self) -> ProductKind {
        ProductKind::Scene
    }

    fn compute(&self, scene: &Scene, params: &ProductParams) -> SceneResult<ProductValue> {
        let mut derived = Scene::new(scene.registry_handle());
        derived.set_basename(format!("{}_{}", scene.basename(), self.name()));
        for name in scene.bands() {
            let raster = scene.get(name.as_str())?;
            if name == "quality" {
                derived.add(raster.clone())?;
                continue;
            }
            let reflectance = raster.read()?.mapv(|v| v * params.gain + params.offset);
            derived.add(Raster::derived(name, reflectance, raster, DType::Float32))?;
        }
        Ok(ProductValue::Scene(derived))
    }
}

/// Contrast-stretched 3-band color composite.
///
/// The stretch is driven by the snow/cloud coverage recovered from the
/// memoized mask product. Not memoized itself: the band selection can
/// differ between calls.
pub struct Color;

impl Product for Color {
    fn name(&self) -> &str {
        "color"
    }

    fn description(&self) -> &str {
        "Contrast-stretched color composite from 3 chosen bands"
    }

    fn dependencies(&self) -> Vec<Dependency> {
        vec![
            Dependency::band("red"),
            Dependency::band("green"),
            Dependency::band("blue"),
            Dependency::product("mask"),
        ]
    }

    fn kind(&self) -> ProductKind {
        ProductKind::Scene
    }

    fn compute(&self, scene: &Scene, params: &ProductParams) -> SceneResult<ProductValue> {
        let coverage = quality::coverage_from_mask(scene.get("mask")?.read()?);

        let default_bands = ["red", "green", "blue"];
        let bands: Vec<&str> = match &params.bands {
            Some(names) => names.iter().map(String::as_str).collect(),
            None => default_bands.to_vec(),
        };
        scene.has_bands(&bands)?;

        let mut composite = Scene::new(scene.registry_handle());
        composite.set_basename(format!("{}_{}", scene.basename(), self.name()));
        for name in bands {
            let raster = scene.get(name)?;
            let stretched = color::color_correction(raster.read()?, coverage);
            composite.add(Raster::derived(name, stretched, raster, raster.dtype))?;
        }
        Ok(ProductValue::Scene(composite))
    }
}
