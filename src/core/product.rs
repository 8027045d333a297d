//! Product declarations, registry, and dependency resolution
//!
//! A product is a named, derivable raster computed from bands and/or
//! other products. Resolution memoizes band-kind results into the scene:
//! a band already present under the product's name is the cached result
//! and is never recomputed unless the caller deletes it first.

use crate::raster::Raster;
use crate::scene::Scene;
use crate::types::{SceneError, SceneResult};

/// A declared requirement of a product, resolved in declaration order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dependency {
    /// A raw band that must be present in the scene
    Band(String),
    /// An upstream product, resolved recursively before this one
    Product(String),
}

impl Dependency {
    pub fn band(name: impl Into<String>) -> Self {
        Dependency::Band(name.into())
    }

    pub fn product(name: impl Into<String>) -> Self {
        Dependency::Product(name.into())
    }
}

/// What a product's computation yields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductKind {
    /// A single raster, memoized into the scene under the product's name
    Band,
    /// A derived scene, returned to the caller and never memoized
    Scene,
}

/// Computed product result
#[derive(Debug)]
pub enum ProductValue {
    Band(Raster),
    Scene(Scene),
}

/// Result of a `process` call
#[derive(Debug)]
pub enum ProductOutput {
    /// Name of the band now memoized in the scene
    Band(String),
    /// A derived scene owned by the caller
    Scene(Scene),
}

/// Options forwarded to product computations
#[derive(Debug, Clone)]
pub struct ProductParams {
    /// Reflectance rescaling gain (Landsat 8 default)
    pub gain: f32,
    /// Reflectance rescaling offset (Landsat 8 default)
    pub offset: f32,
    /// Band selection for composite products
    pub bands: Option<Vec<String>>,
}

impl Default for ProductParams {
    fn default() -> Self {
        Self {
            gain: 2.0e-5,
            offset: -0.1,
            bands: None,
        }
    }
}

/// A derivable raster product
pub trait Product: Send + Sync {
    /// Short lowercase product name, also the memoized bandname
    fn name(&self) -> &str;

    /// Human-readable description for help output
    fn description(&self) -> &str;

    /// Required bands and upstream products, in resolution order
    fn dependencies(&self) -> Vec<Dependency>;

    fn kind(&self) -> ProductKind {
        ProductKind::Band
    }

    /// Compute the product from a scene whose dependencies are satisfied
    fn compute(&self, scene: &Scene, params: &ProductParams) -> SceneResult<ProductValue>;
}

/// Name-indexed collection of products, shared by the scenes that use it
#[derive(Default)]
pub struct ProductRegistry {
    products: Vec<Box<dyn Product>>,
}

impl std::fmt::Debug for ProductRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductRegistry")
            .field(
                "products",
                &self.products.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl ProductRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a product, replacing any earlier product with the same name
    pub fn register(&mut self, product: Box<dyn Product>) {
        match self.products.iter_mut().find(|p| p.name() == product.name()) {
            Some(existing) => *existing = product,
            None => self.products.push(product),
        }
    }

    pub fn get(&self, name: &str) -> Option<&dyn Product> {
        self.products
            .iter()
            .find(|p| p.name() == name)
            .map(Box::as_ref)
    }

    /// Product names and descriptions, for help-generation collaborators
    pub fn descriptions(&self) -> Vec<(&str, &str)> {
        self.products
            .iter()
            .map(|p| (p.name(), p.description()))
            .collect()
    }

    /// Resolve a product request against a scene.
    ///
    /// Dependencies are resolved in declaration order; failures propagate
    /// immediately and leave the requested product uncomputed, while any
    /// intermediates already memoized stay in the scene.
    pub fn resolve(
        &self,
        scene: &mut Scene,
        name: &str,
        params: &ProductParams,
    ) -> SceneResult<ProductOutput> {
        if scene.has_band(name) {
            log::debug!("Product {} already computed, returning memoized band", name);
            return Ok(ProductOutput::Band(name.to_string()));
        }

        let product = self
            .get(name)
            .ok_or_else(|| SceneError::UnknownProduct(name.to_string()))?;

        for dependency in product.dependencies() {
            match dependency {
                Dependency::Band(band) => scene.has_bands(&[band.as_str()])?,
                Dependency::Product(dep_name) => {
                    let dep = self
                        .get(&dep_name)
                        .ok_or_else(|| SceneError::UnknownProduct(dep_name.clone()))?;
                    if dep.kind() == ProductKind::Scene {
                        return Err(SceneError::Processing(format!(
                            "product {} cannot depend on {}: derived scenes are not addressable as bands",
                            name, dep_name
                        )));
                    }
                    self.resolve(scene, &dep_name, params)?;
                }
            }
        }

        log::info!("Computing product {} ({})", name, product.description());
        match (product.kind(), product.compute(scene, params)?) {
            (ProductKind::Band, ProductValue::Band(mut raster)) => {
                raster.set_bandname(name);
                scene.add(raster)?;
                Ok(ProductOutput::Band(name.to_string()))
            }
            (ProductKind::Scene, ProductValue::Scene(derived)) => Ok(ProductOutput::Scene(derived)),
            _ => Err(SceneError::Processing(format!(
                "product {} returned a value inconsistent with its declared kind",
                name
            ))),
        }
    }
}
