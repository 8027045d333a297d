//! Sensor band-token tables and the filename convention
//!
//! Filenames encode band identity as `<basename>_<bandtoken>.<ext>`
//! (e.g. `LC80090612015251LGN00_B4.TIF`); a band map translates the
//! sensor token into a canonical bandname. Maps are plain values passed
//! into the scene constructor that wants them.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Mapping of sensor band tokens to canonical bandnames
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BandMap {
    tokens: HashMap<String, String>,
}

impl BandMap {
    pub fn new<I, S, T>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            tokens: pairs
                .into_iter()
                .map(|(token, name)| (token.into(), name.into()))
                .collect(),
        }
    }

    /// Canonical bandname for a sensor token, if the token is known
    pub fn canonical(&self, token: &str) -> Option<&str> {
        self.tokens.get(token).map(String::as_str)
    }

    /// Canonical bandname for a token, falling back to the token itself
    pub fn canonical_or_token<'a>(&'a self, token: &'a str) -> &'a str {
        self.canonical(token).unwrap_or(token)
    }
}

/// Landsat 8 OLI/TIRS band map
pub fn landsat8() -> BandMap {
    BandMap::new([
        ("B1", "coastal"),
        ("B2", "blue"),
        ("B3", "green"),
        ("B4", "red"),
        ("B5", "nir"),
        ("B6", "swir1"),
        ("B7", "swir2"),
        ("B8", "pan"),
        ("B9", "cirrus"),
        ("BQA", "quality"),
    ])
}

/// Sentinel-2 MSI band map
pub fn sentinel2() -> BandMap {
    BandMap::new([
        ("B01", "coastal"),
        ("B02", "blue"),
        ("B03", "green"),
        ("B04", "red"),
        ("B08", "nir"),
        ("B10", "cirrus"),
        ("B11", "swir1"),
        ("B12", "swir2"),
    ])
}

/// Split a filename into basename and band token.
///
/// Returns `None` when the name does not follow the
/// `<basename>_<bandtoken>.<ext>` convention.
pub fn parse_filename(filename: &str) -> Option<(String, String)> {
    // the token is everything after the last underscore of the stem
    let pattern = Regex::new(r"^(.*)_([^_.]+)\.[^.]+$").ok()?;
    let name = std::path::Path::new(filename).file_name()?.to_str()?;
    let captures = pattern.captures(name)?;
    Some((captures[1].to_string(), captures[2].to_string()))
}
