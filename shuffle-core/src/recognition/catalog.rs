//! Labelled face encodings, persisted as JSON or CBOR.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::encoding::FaceEncoding;
use crate::error::{Result, ShuffleError};

/// Current catalog format version.
pub const CATALOG_VERSION: u32 = 1;

/// One known face.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    pub encoding: FaceEncoding,
}

/// A set of known faces. A name may appear in several entries, one per
/// sample image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceCatalog {
    pub version: u32,
    entries: Vec<CatalogEntry>,
}

impl Default for FaceCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl FaceCatalog {
    pub fn new() -> Self {
        Self {
            version: CATALOG_VERSION,
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, name: impl Into<String>, encoding: FaceEncoding) {
        self.entries.push(CatalogEntry {
            name: name.into(),
            encoding,
        });
    }

    /// Append every entry of `other`. Existing entries are kept.
    pub fn merge(&mut self, other: FaceCatalog) {
        self.entries.extend(other.entries);
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.iter().map(|e| e.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
            .map_err(|e| ShuffleError::Catalog(format!("JSON serialization failed: {e}")))
    }

    pub fn to_cbor(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(self, &mut buf)
            .map_err(|e| ShuffleError::Catalog(format!("CBOR serialization failed: {e}")))?;
        Ok(buf)
    }

    /// Decode a catalog, trying CBOR first and then JSON.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let catalog = match ciborium::from_reader::<Self, _>(bytes) {
            Ok(catalog) => catalog,
            Err(cbor_err) => serde_json::from_slice::<Self>(bytes).map_err(|json_err| {
                ShuffleError::Catalog(format!(
                    "not a valid catalog (CBOR: {cbor_err}; JSON: {json_err})"
                ))
            })?,
        };

        if catalog.version > CATALOG_VERSION {
            return Err(ShuffleError::Catalog(format!(
                "unsupported catalog version {} (max {CATALOG_VERSION})",
                catalog.version
            )));
        }
        Ok(catalog)
    }

    /// Entries within `threshold` bits of `encoding`.
    pub fn matches<'a>(
        &'a self,
        encoding: &'a FaceEncoding,
        threshold: u32,
    ) -> impl Iterator<Item = &'a CatalogEntry> + 'a {
        self.entries.iter().filter(move |entry| {
            entry
                .encoding
                .distance(encoding)
                .is_some_and(|d| d <= threshold)
        })
    }

    /// Name of the face that best matches `encoding`.
    ///
    /// Every entry within `threshold` votes for its name; the name with the
    /// most votes wins, ties going to the alphabetically first name. `None`
    /// when nothing is within the threshold.
    pub fn recognize(&self, encoding: &FaceEncoding, threshold: u32) -> Option<&str> {
        let mut votes: BTreeMap<&str, usize> = BTreeMap::new();
        for entry in &self.entries {
            if entry.encoding.distance(encoding).is_some_and(|d| d <= threshold) {
                *votes.entry(entry.name.as_str()).or_default() += 1;
            }
        }
        debug!(candidates = votes.len(), threshold, "Catalog vote");

        votes
            .into_iter()
            .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(name, _)| name)
    }
}
