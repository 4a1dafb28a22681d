use std::{collections::HashMap, path::PathBuf};

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

pub struct ModsolveConfig {
    pub catalog_path: Option<PathBuf>,
    pub tenant_file: Option<PathBuf>,
}

impl ModsolveConfig {
    pub fn load() -> anyhow::Result<Self> {
        let raw_config = RawConfig::load(None)?;

        Ok(Self {
            catalog_path: raw_config.catalog.path,
            tenant_file: raw_config.tenant.file,
        })
    }
}

#[derive(Default, Debug, Deserialize, PartialEq, Eq)]
struct RawConfig {
    #[serde(default)]
    catalog: CatalogConfig,
    #[serde(default)]
    tenant: TenantConfig,
}

#[derive(Default, Debug, Deserialize, PartialEq, Eq)]
struct CatalogConfig {
    path: Option<PathBuf>,
}

#[derive(Default, Debug, Deserialize, PartialEq, Eq)]
struct TenantConfig {
    file: Option<PathBuf>,
}

impl RawConfig {
    fn load(env: Option<HashMap<String, String>>) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(
                Environment::with_prefix("MODSOLVE")
                    .separator("_")
                    .source(env),
            )
            .build()?
            .try_deserialize()
    }
}
