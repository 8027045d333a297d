use crate::core::product::{ProductOutput, ProductParams, ProductRegistry};
use crate::io::{BandData, RasterReader, RasterWriter};
use crate::raster::{BandSource, Raster};
use crate::sensors::{self, BandMap};
use crate::types::{SceneError, SceneResult};
use std::path::Path;
use std::sync::Arc;

/// Band lookup key: 0-based position or bandname
#[derive(Debug, Clone)]
pub enum BandKey {
    Index(usize),
    Name(String),
}

impl From<usize> for BandKey {
    fn from(index: usize) -> Self {
        BandKey::Index(index)
    }
}

impl From<&str> for BandKey {
    fn from(name: &str) -> Self {
        BandKey::Name(name.to_string())
    }
}

impl From<String> for BandKey {
    fn from(name: String) -> Self {
        BandKey::Name(name)
    }
}

/// An ordered, name-indexed collection of bands covering one
/// spatio-temporal footprint.
///
/// Bandnames are unique within a scene; a raster's position in the
/// sequence is its externally visible band number. The scene owns its
/// rasters exclusively: `select` copies, never aliases.
#[derive(Debug)]
pub struct Scene {
    rasters: Vec<Raster>,
    basename: String,
    registry: Arc<ProductRegistry>,
}

impl Scene {
    /// An empty scene for programmatic assembly via `add`
    pub fn new(registry: Arc<ProductRegistry>) -> Self {
        Self {
            rasters: Vec::new(),
            basename: "scene".to_string(),
            registry,
        }
    }

    /// Open one band per file; bandnames default to `"1"`, `"2"`, …
    pub fn from_files<P: AsRef<Path>>(
        paths: &[P],
        registry: Arc<ProductRegistry>,
    ) -> SceneResult<Self> {
        Self::open_files(paths, None, registry)
    }

    /// Open one band per file with explicit bandnames
    pub fn from_files_with_bandnames<P: AsRef<Path>>(
        paths: &[P],
        bandnames: &[&str],
        registry: Arc<ProductRegistry>,
    ) -> SceneResult<Self> {
        Self::open_files(paths, Some(bandnames), registry)
    }

    /// Open one band per file, naming bands through a sensor band map
    /// applied to the `<basename>_<bandtoken>.<ext>` filename convention
    pub fn from_files_mapped<P: AsRef<Path>>(
        paths: &[P],
        band_map: &BandMap,
        registry: Arc<ProductRegistry>,
    ) -> SceneResult<Self> {
        let names: Vec<String> = paths
            .iter()
            .enumerate()
            .map(|(i, path)| {
                match sensors::parse_filename(&path.as_ref().to_string_lossy()) {
                    Some((_, token)) => band_map.canonical_or_token(&token).to_string(),
                    None => (i + 1).to_string(),
                }
            })
            .collect();
        let name_refs: Vec<&str> = names.iter().map(String::as_str).collect();
        Self::open_files(paths, Some(&name_refs), registry)
    }

    /// Open multi-band files from ordered `(path, bandnames)` pairs;
    /// bands within one file are assigned in on-disk order
    pub fn from_file_map<P: AsRef<Path>>(
        entries: &[(P, Vec<String>)],
        registry: Arc<ProductRegistry>,
    ) -> SceneResult<Self> {
        if entries.is_empty() {
            return Err(SceneError::InvalidInput(
                "cannot build a scene from an empty file map".to_string(),
            ));
        }

        let mut scene = Self::new(registry);
        scene.basename = Self::basename_of(entries[0].0.as_ref());
        for (path, names) in entries {
            let path = path.as_ref();
            if names.is_empty() {
                return Err(SceneError::InvalidInput(format!(
                    "no bandnames given for {}",
                    path.display()
                )));
            }
            let info = RasterReader::info(path)?;
            if names.len() > info.num_bands {
                return Err(SceneError::InvalidInput(format!(
                    "{} has {} band(s) but {} bandnames were given",
                    path.display(),
                    info.num_bands,
                    names.len()
                )));
            }
            for (i, name) in names.iter().enumerate() {
                scene.add(Raster::from_source(
                    name,
                    BandSource {
                        path: path.to_path_buf(),
                        band_index: i + 1,
                    },
                    &info,
                ))?;
            }
        }
        log::info!(
            "Opened scene {} with {} band(s): {:?}",
            scene.basename,
            scene.num_bands(),
            scene.bands()
        );
        Ok(scene)
    }

    fn open_files<P: AsRef<Path>>(
        paths: &[P],
        bandnames: Option<&[&str]>,
        registry: Arc<ProductRegistry>,
    ) -> SceneResult<Self> {
        if paths.is_empty() {
            return Err(SceneError::InvalidInput(
                "cannot build a scene from an empty file list".to_string(),
            ));
        }
        if let Some(names) = bandnames {
            if names.len() != paths.len() {
                return Err(SceneError::InvalidInput(format!(
                    "{} bandnames given for {} files",
                    names.len(),
                    paths.len()
                )));
            }
        }

        let mut scene = Self::new(registry);
        scene.basename = Self::basename_of(paths[0].as_ref());
        for (i, path) in paths.iter().enumerate() {
            let path = path.as_ref();
            let info = RasterReader::info(path)?;
            if info.num_bands > 1 {
                log::warn!(
                    "{} has {} bands, using band 1",
                    path.display(),
                    info.num_bands
                );
            }
            let name = match bandnames {
                Some(names) => names[i].to_string(),
                None => (i + 1).to_string(),
            };
            scene.add(Raster::from_source(
                name,
                BandSource {
                    path: path.to_path_buf(),
                    band_index: 1,
                },
                &info,
            ))?;
        }
        log::info!(
            "Opened scene {} with {} band(s): {:?}",
            scene.basename,
            scene.num_bands(),
            scene.bands()
        );
        Ok(scene)
    }

    fn basename_of(path: &Path) -> String {
        let name = path.to_string_lossy();
        match sensors::parse_filename(&name) {
            Some((basename, _)) => basename,
            None => path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "scene".to_string()),
        }
    }

    /// Scene identifier derived from the first opened filename
    pub fn basename(&self) -> &str {
        &self.basename
    }

    pub fn set_basename(&mut self, basename: impl Into<String>) {
        self.basename = basename.into();
    }

    /// Bandnames in band order
    pub fn bands(&self) -> Vec<String> {
        self.rasters.iter().map(|r| r.bandname().to_string()).collect()
    }

    pub fn num_bands(&self) -> usize {
        self.rasters.len()
    }

    pub fn has_band(&self, name: &str) -> bool {
        self.rasters.iter().any(|r| r.bandname() == name)
    }

    /// Verify all named bands are present, naming the first absent one
    pub fn has_bands(&self, names: &[&str]) -> SceneResult<()> {
        for name in names {
            if !self.has_band(name) {
                return Err(SceneError::MissingBand((*name).to_string()));
            }
        }
        Ok(())
    }

    /// Look up a band by 0-based position or by name
    pub fn get<K: Into<BandKey>>(&self, key: K) -> SceneResult<&Raster> {
        let key = key.into();
        let index = self.position(&key)?;
        Ok(&self.rasters[index])
    }

    pub fn get_mut<K: Into<BandKey>>(&mut self, key: K) -> SceneResult<&mut Raster> {
        let key = key.into();
        let index = self.position(&key)?;
        Ok(&mut self.rasters[index])
    }

    fn position(&self, key: &BandKey) -> SceneResult<usize> {
        match key {
            BandKey::Index(index) => {
                if *index < self.rasters.len() {
                    Ok(*index)
                } else {
                    Err(SceneError::InvalidBand(format!(
                        "band index {} out of range ({} bands)",
                        index,
                        self.rasters.len()
                    )))
                }
            }
            BandKey::Name(name) => self
                .rasters
                .iter()
                .position(|r| r.bandname() == name)
                .ok_or_else(|| SceneError::InvalidBand(format!("no band named {}", name))),
        }
    }

    /// New scene containing copies of the requested bands, in request
    /// order. Mutating the selection never mutates this scene.
    pub fn select(&self, names: &[&str]) -> SceneResult<Scene> {
        let mut selected = Scene::new(Arc::clone(&self.registry));
        selected.basename = self.basename.clone();
        for name in names {
            selected.add(self.get(*name)?.clone())?;
        }
        Ok(selected)
    }

    /// Rename the band at a 1-based position
    pub fn set_bandname(&mut self, name: &str, band_number: usize) -> SceneResult<()> {
        if band_number == 0 || band_number > self.rasters.len() {
            return Err(SceneError::InvalidBand(format!(
                "band number {} out of range ({} bands)",
                band_number,
                self.rasters.len()
            )));
        }
        let index = band_number - 1;
        if self
            .rasters
            .iter()
            .enumerate()
            .any(|(i, r)| i != index && r.bandname() == name)
        {
            return Err(SceneError::InvalidBand(format!(
                "bandname {} already in use",
                name
            )));
        }
        self.rasters[index].set_bandname(name);
        Ok(())
    }

    /// Rename every band; the list length must match the band count
    pub fn set_bandnames(&mut self, names: &[&str]) -> SceneResult<()> {
        if names.len() != self.rasters.len() {
            return Err(SceneError::InvalidBand(format!(
                "{} bandnames given for {} bands",
                names.len(),
                self.rasters.len()
            )));
        }
        for (i, a) in names.iter().enumerate() {
            if names[i + 1..].contains(a) {
                return Err(SceneError::InvalidBand(format!("duplicate bandname {}", a)));
            }
        }
        for (raster, name) in self.rasters.iter_mut().zip(names) {
            raster.set_bandname(*name);
        }
        Ok(())
    }

    /// Append a band; its name must not collide with an existing one
    pub fn add(&mut self, raster: Raster) -> SceneResult<()> {
        if self.has_band(raster.bandname()) {
            return Err(SceneError::InvalidBand(format!(
                "bandname {} already in use",
                raster.bandname()
            )));
        }
        self.rasters.push(raster);
        Ok(())
    }

    /// Remove bands by position or name; a failed lookup propagates
    /// before anything is removed
    pub fn delete<K: Into<BandKey>>(&mut self, keys: impl IntoIterator<Item = K>) -> SceneResult<()> {
        let mut positions = Vec::new();
        for key in keys {
            positions.push(self.position(&key.into())?);
        }
        positions.sort_unstable();
        positions.dedup();
        for index in positions.into_iter().rev() {
            let removed = self.rasters.remove(index);
            log::debug!("Deleted band {} from {}", removed.bandname(), self.basename);
        }
        Ok(())
    }

    /// Recast every band to a new nominal data type
    pub fn recast(&mut self, dtype_name: &str) -> SceneResult<()> {
        for raster in &mut self.rasters {
            raster.recast(dtype_name)?;
        }
        Ok(())
    }

    /// Reproject every band into a target CRS
    pub fn reproject(&mut self, target_crs: &str) -> SceneResult<()> {
        for raster in &mut self.rasters {
            raster.reproject(target_crs)?;
        }
        Ok(())
    }

    /// Write the first 1-3 selected bands (all bands, capped at 3, when
    /// unspecified) to one multi-band file. Exactly 3 bands sets the RGB
    /// photometric tag.
    pub fn save<P: AsRef<Path>>(&self, path: P, bands: Option<&[&str]>) -> SceneResult<()> {
        let selected: Vec<&Raster> = match bands {
            Some(names) => {
                self.has_bands(names)?;
                names
                    .iter()
                    .take(3)
                    .map(|name| self.get(*name))
                    .collect::<SceneResult<_>>()?
            }
            None => self.rasters.iter().take(3).collect(),
        };
        if selected.is_empty() {
            return Err(SceneError::InvalidInput(
                "scene has no bands to save".to_string(),
            ));
        }

        let mut band_data = Vec::with_capacity(selected.len());
        for raster in &selected {
            band_data.push(BandData {
                name: raster.bandname(),
                pixels: raster.read()?,
            });
        }

        let reference = selected[0];
        RasterWriter::write(
            path,
            &band_data,
            &reference.crs,
            &reference.geo_transform,
            reference.dtype,
            selected.len() == 3,
            None,
        )
    }

    /// Handle to the product registry this scene resolves against
    pub fn registry_handle(&self) -> Arc<ProductRegistry> {
        Arc::clone(&self.registry)
    }

    /// Product names and descriptions available to this scene
    pub fn available_products(&self) -> Vec<(&str, &str)> {
        self.registry.descriptions()
    }

    /// Resolve a product by name, memoizing band-kind results into this
    /// scene (see [`ProductRegistry::resolve`])
    pub fn process(&mut self, name: &str, params: &ProductParams) -> SceneResult<ProductOutput> {
        let registry = Arc::clone(&self.registry);
        registry.resolve(self, name, params)
    }
}
