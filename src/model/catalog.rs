use regex_lite::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::{fmt::Display, path::Path, str::FromStr};

use crate::model::ParseError;
use log::{debug, error};
use toml::Value;

/// Identifier of a feature module, a short lowercase code such as `rms`.
///
/// The set of valid ids is closed at catalog load time: every id referenced
/// anywhere must resolve against the loaded catalog.
#[derive(Clone, Hash, Serialize, Debug, PartialEq, Eq, Ord, PartialOrd)]
pub struct ModuleId(String);

impl ModuleId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ModuleId {
    type Err = ParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if is_valid_id(value) {
            Ok(ModuleId(value.to_string()))
        } else {
            Err(ParseError::InvalidModuleId(value.to_string()))
        }
    }
}

impl Display for ModuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ModuleId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

/// Identifier of a preset bundle, e.g. `essential-hotel`.
#[derive(Clone, Hash, Serialize, Debug, PartialEq, Eq, Ord, PartialOrd)]
pub struct BundleId(String);

impl BundleId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for BundleId {
    type Err = ParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if is_valid_id(value) {
            Ok(BundleId(value.to_string()))
        } else {
            Err(ParseError::InvalidBundleId(value.to_string()))
        }
    }
}

impl Display for BundleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for BundleId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

fn is_valid_id(value: &str) -> bool {
    let re: Regex = Regex::new(r"^[a-z][a-z0-9_-]{0,15}$").unwrap();
    re.is_match(value)
}

/// One module as declared in the catalog file. `requires` holds direct
/// dependencies only, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDefinition {
    pub id: ModuleId,
    pub name: String,
    pub short_name: String,
    pub description: String,
    pub base: bool,
    pub requires: Vec<ModuleId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    pub id: BundleId,
    pub name: String,
    pub description: String,
    pub use_case: String,
    pub modules: Vec<ModuleId>,
    pub recommended: bool,
}

/// The raw, structurally parsed catalog document. Integrity checks (cycles,
/// unknown edges, bundle consistency) happen in [`crate::catalog::Catalog`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogFile {
    pub name: String,
    pub modules: Vec<ModuleDefinition>,
    pub bundles: Vec<Bundle>,
}

impl CatalogFile {
    pub fn from_file(path: &Path) -> Result<CatalogFile, ParseError> {
        debug!(
            "Attempting to read catalog from modsolve file {}",
            path.display()
        );
        let contents = std::fs::read_to_string(path)?;

        let catalog = CatalogFile::from_toml_str(&contents);
        if let Err(err) = &catalog {
            error!("Could not build a valid catalog from a modsolve toml file due to err {err}")
        }
        catalog
    }

    pub fn from_toml_str(data: &str) -> Result<CatalogFile, ParseError> {
        let mut table = toml::from_str::<toml::Table>(data)?;

        let name = table
            .remove("name")
            .ok_or_else(|| ParseError::MissingKey("name".to_string()))
            .and_then(|v| v.try_into::<String>().map_err(|e| e.into()))?;

        // `preserve_order` keeps the declaration order of the module tables,
        // which is the order listings and reports use.
        let modules = table
            .remove("modules")
            .map(|v| v.try_into::<toml::Table>())
            .map_or(Ok(None), |v| v.map(Some))?
            .unwrap_or_default()
            .into_iter()
            .map(|(id, value)| parse_module(&id, &value))
            .collect::<Result<Vec<_>, _>>()?;

        let bundles = table
            .remove("bundles")
            .map(|v| v.try_into::<Vec<Value>>())
            .map_or(Ok(None), |v| v.map(Some))?
            .unwrap_or_default()
            .iter()
            .map(parse_bundle)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CatalogFile {
            name,
            modules,
            bundles,
        })
    }
}

fn parse_module(id: &str, value: &Value) -> Result<ModuleDefinition, ParseError> {
    let id = id.parse::<ModuleId>()?;

    let name = value
        .get("name")
        .ok_or_else(|| ParseError::MissingKey("name".to_string()))
        .and_then(|v| v.clone().try_into::<String>().map_err(|e| e.into()))?;

    let short_name = value
        .get("short_name")
        .ok_or_else(|| ParseError::MissingKey("short_name".to_string()))
        .and_then(|v| v.clone().try_into::<String>().map_err(|e| e.into()))?;

    let description = value
        .get("description")
        .ok_or_else(|| ParseError::MissingKey("description".to_string()))
        .and_then(|v| v.clone().try_into::<String>().map_err(|e| e.into()))?;

    let base = value
        .get("base")
        .map(|v| v.clone().try_into::<bool>())
        .map_or(Ok(None), |v| v.map(Some))?
        .unwrap_or(false);

    let requires = value
        .get("requires")
        .map(|v| v.clone().try_into::<Vec<String>>())
        .map_or(Ok(None), |v| v.map(Some))?
        .unwrap_or_default()
        .into_iter()
        .map(|s| s.parse::<ModuleId>())
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ModuleDefinition {
        id,
        name,
        short_name,
        description,
        base,
        requires,
    })
}

fn parse_bundle(value: &Value) -> Result<Bundle, ParseError> {
    let id = value
        .get("id")
        .ok_or_else(|| ParseError::MissingKey("id".to_string()))
        .and_then(|v| v.clone().try_into::<String>().map_err(|e| e.into()))
        .and_then(|s| s.parse::<BundleId>())?;

    let name = value
        .get("name")
        .ok_or_else(|| ParseError::MissingKey("name".to_string()))
        .and_then(|v| v.clone().try_into::<String>().map_err(|e| e.into()))?;

    let description = value
        .get("description")
        .ok_or_else(|| ParseError::MissingKey("description".to_string()))
        .and_then(|v| v.clone().try_into::<String>().map_err(|e| e.into()))?;

    let use_case = value
        .get("use_case")
        .ok_or_else(|| ParseError::MissingKey("use_case".to_string()))
        .and_then(|v| v.clone().try_into::<String>().map_err(|e| e.into()))?;

    let modules = value
        .get("modules")
        .ok_or_else(|| ParseError::MissingKey("modules".to_string()))
        .and_then(|v| v.clone().try_into::<Vec<String>>().map_err(|e| e.into()))?
        .into_iter()
        .map(|s| s.parse::<ModuleId>())
        .collect::<Result<Vec<_>, _>>()?;

    let recommended = value
        .get("recommended")
        .map(|v| v.clone().try_into::<bool>())
        .map_or(Ok(None), |v| v.map(Some))?
        .unwrap_or(false);

    Ok(Bundle {
        id,
        name,
        description,
        use_case,
        modules,
        recommended,
    })
}
