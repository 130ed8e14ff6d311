//! Catalog files: the configured set of shipping methods
//!
//! A catalog is a YAML (or JSON, by extension) document:
//!
//! ```yaml
//! version: 1
//! provinces: ["Buenos Aires", "Capital Federal", "Córdoba"]
//! methods:
//!   - id: 1
//!     code: correo_standard
//!     name: "Correo Argentino Estándar"
//!     base_cost: 1500
//!     display_order: 1
//!     rules:
//!       provinces:
//!         "Buenos Aires": { cost: 1200 }
//!       bulky_extra: 500
//!       free_shipping_threshold: 20000
//! ```
//!
//! A loaded [`Catalog`] is immutable. It carries a [`CatalogStamp`] so a
//! snapshot can be identified in logs and compared across reloads.

use crate::error::{Error, Result};
use crate::method::{MethodId, ShippingMethod};
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;

/// Supported catalog schema version
pub const CATALOG_VERSION: u32 = 1;

/// On-disk catalog document
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[schemars(title = "Shipping Catalog", description = "Shipping methods and cascade rules")]
pub struct CatalogFile {
    /// Schema version for migrations
    pub version: u32,

    /// Canonical province names; empty means "accept any"
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub provinces: Vec<String>,

    #[serde(default)]
    pub methods: Vec<ShippingMethod>,
}

/// Identity of a catalog snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CatalogStamp {
    /// Hash of the method records
    pub hash: String,

    /// When this snapshot was built (ISO 8601 string)
    #[schemars(with = "String")]
    pub loaded_at: DateTime<Utc>,
}

/// An immutable snapshot of shipping methods, in display order
#[derive(Debug, Clone)]
pub struct Catalog {
    methods: Vec<ShippingMethod>,
    provinces: Vec<String>,
    stamp: CatalogStamp,
}

impl Catalog {
    /// Build a snapshot; methods are ordered by `display_order`, ties kept
    pub fn new(mut methods: Vec<ShippingMethod>, provinces: Vec<String>) -> Self {
        methods.sort_by_key(|m| m.display_order);
        let stamp = CatalogStamp {
            hash: hash_methods(&methods),
            loaded_at: Utc::now(),
        };
        Self {
            methods,
            provinces,
            stamp,
        }
    }

    /// Load a catalog file; `.json` is parsed as JSON, anything else as YAML
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(Error::Io)?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));

        let file = if is_json {
            CatalogFile::from_json(&content)?
        } else {
            CatalogFile::from_yaml(&content)?
        };

        let catalog = Self::from_file(file)?;
        tracing::info!(
            path = %path.display(),
            methods = catalog.methods.len(),
            hash = %catalog.stamp.hash,
            "loaded shipping catalog"
        );
        Ok(catalog)
    }

    /// Parse a YAML catalog document
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Self::from_file(CatalogFile::from_yaml(yaml)?)
    }

    /// Check the version and build a snapshot
    pub fn from_file(file: CatalogFile) -> Result<Self> {
        if file.version != CATALOG_VERSION {
            return Err(Error::CatalogParse(format!(
                "Unsupported catalog version: {}",
                file.version
            )));
        }
        Ok(Self::new(file.methods, file.provinces))
    }

    /// Back to the on-disk shape
    pub fn to_file(&self) -> CatalogFile {
        CatalogFile {
            version: CATALOG_VERSION,
            provinces: self.provinces.clone(),
            methods: self.methods.clone(),
        }
    }

    /// All methods, enabled or not, in display order
    pub fn methods(&self) -> &[ShippingMethod] {
        &self.methods
    }

    /// Enabled methods in display order
    pub fn enabled(&self) -> impl Iterator<Item = &ShippingMethod> {
        self.methods.iter().filter(|m| m.enabled)
    }

    pub fn provinces(&self) -> &[String] {
        &self.provinces
    }

    pub fn stamp(&self) -> &CatalogStamp {
        &self.stamp
    }

    pub fn get(&self, id: MethodId) -> Option<&ShippingMethod> {
        self.methods.iter().find(|m| m.id == id)
    }

    pub fn get_by_code(&self, code: &str) -> Option<&ShippingMethod> {
        self.methods.iter().find(|m| m.code == code)
    }

    /// Look a method up by numeric id or by code
    pub fn lookup(&self, id_or_code: &str) -> Option<&ShippingMethod> {
        match id_or_code.parse::<MethodId>() {
            Ok(id) => self.get(id).or_else(|| self.get_by_code(id_or_code)),
            Err(_) => self.get_by_code(id_or_code),
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(Vec::new(), Vec::new())
    }
}

impl CatalogFile {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_norway::from_str(yaml).map_err(|e| Error::CatalogParse(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::CatalogParse(e.to_string()))
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_norway::to_string(self).map_err(|e| Error::CatalogParse(e.to_string()))
    }
}

/// Stamp hash used when the records cannot be serialized
pub const UNHASHED: &str = "sha256:unhashed";

/// Hash of the method records for change detection
fn hash_methods(methods: &[ShippingMethod]) -> String {
    content_hash(methods).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "cannot hash shipping methods; catalog stamp left unhashed");
        UNHASHED.to_string()
    })
}

/// Short sha256 of a value's JSON form
fn content_hash<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let content = serde_json::to_vec(value)?;
    let mut hasher = Sha256::new();
    hasher.update(&content);
    Ok(format!("sha256:{}", hex::encode(&hasher.finalize()[..8])))
}
