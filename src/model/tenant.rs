use std::{collections::BTreeSet, path::Path};

use serde::{Deserialize, Serialize};

use crate::model::ParseError;

use super::catalog::ModuleId;

/// The per-tenant record of active modules, as read from and written back to
/// disk by the CLI. The resolver itself never touches this file; it only
/// operates on the set carried inside.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TenantFile {
    pub modules: BTreeSet<ModuleId>,
}

const VERSION: i64 = 1;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
struct VersionedTenantFile<'a> {
    pub version: i64,
    #[serde(flatten)]
    pub content: &'a TenantFile,
}

impl TenantFile {
    pub fn new(modules: BTreeSet<ModuleId>) -> TenantFile {
        TenantFile { modules }
    }

    pub fn from_file(file: &Path) -> Result<TenantFile, ParseError> {
        TenantFile::from_str(&std::fs::read_to_string(file)?)
    }

    pub fn from_str(s: &str) -> Result<TenantFile, ParseError> {
        let mut table = toml::from_str::<toml::Table>(s)?;
        match table.remove("version") {
            Some(toml::Value::Integer(VERSION)) => {
                table.try_into::<TenantFile>().map_err(Into::into)
            }
            Some(other) => Err(ParseError::UnsupportedTenantFileVersion(other)),
            None => Err(ParseError::MissingTenantFileVersion),
        }
    }

    pub fn to_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(&VersionedTenantFile {
            version: VERSION,
            content: self,
        })
    }
}

#[cfg(test)]
mod tests {
    use toml::toml;

    use super::*;

    use pretty_assertions::assert_eq;

    fn module(s: &str) -> ModuleId {
        s.parse().unwrap()
    }

    #[test]
    fn load_save_tenant_file() {
        let text = toml::to_string_pretty(&toml! {
            version = 1
            modules = ["crs", "rms"]
        })
        .unwrap();
        let data = TenantFile {
            modules: BTreeSet::from([module("crs"), module("rms")]),
        };
        let parsed = TenantFile::from_str(&text).unwrap();
        let formatted = data.to_string().unwrap();
        assert_eq!(parsed, data);
        assert_eq!(formatted, text);
    }

    #[test]
    fn load_tenant_file_deduplicates_modules() {
        let text = toml::to_string_pretty(&toml! {
            version = 1
            modules = ["rms", "rms"]
        })
        .unwrap();
        let parsed = TenantFile::from_str(&text).unwrap();
        assert_eq!(parsed.modules, BTreeSet::from([module("rms")]));
    }

    #[test]
    fn load_tenant_file_unversioned() {
        let text = toml::to_string_pretty(&toml! {
            modules = ["rms"]
        })
        .unwrap();
        TenantFile::from_str(&text).expect_err("should not parse unversioned tenant file");
    }

    #[test]
    fn load_tenant_file_future_version() {
        let text = toml::to_string_pretty(&toml! {
            version = 2
            modules = ["rms"]
        })
        .unwrap();
        TenantFile::from_str(&text).expect_err("should not parse tenant file from the future");
    }

    #[test]
    fn load_tenant_file_rejects_malformed_ids() {
        let text = toml::to_string_pretty(&toml! {
            version = 1
            modules = ["Not A Module"]
        })
        .unwrap();
        TenantFile::from_str(&text).expect_err("should not parse malformed module ids");
    }
}
