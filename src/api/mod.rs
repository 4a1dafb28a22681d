use std::{error::Error, path::PathBuf};

use crate::{
    catalog::Catalog,
    cli::command_handlers::{
        do_apply_bundle, do_bundles, do_catalog, do_disable, do_enable, do_validate,
    },
};

mod builder;

pub use builder::ModsolveBuilder;

/// File-backed entry point used by the CLI and embeddable by an admin layer:
/// a loaded catalog plus the location of the tenant file it operates on.
///
/// The pure resolver contract lives on [`Catalog`] and [`crate::resolver`];
/// everything here reads the tenant file, resolves, reports and writes back.
pub struct Modsolve {
    catalog: Catalog,
    root: PathBuf,
    tenant_file_name: PathBuf,
}

impl Modsolve {
    pub fn builder() -> ModsolveBuilder {
        ModsolveBuilder::default()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Prints every module in the catalog with its dependencies
    pub fn list_modules(&self) -> Result<(), Box<dyn Error>> {
        do_catalog(&self.catalog)
    }

    /// Prints the preset bundles
    pub fn list_bundles(&self) -> Result<(), Box<dyn Error>> {
        do_bundles(&self.catalog)
    }

    /// Validates the tenant's active module set; fails when it is inconsistent
    pub fn validate(&self) -> Result<(), Box<dyn Error>> {
        do_validate(&self.catalog, &self.root, &self.tenant_file_name)
    }

    /// Enables a module together with its dependency closure
    pub fn enable(&self, module: &str) -> Result<(), Box<dyn Error>> {
        do_enable(&self.catalog, &self.root, &self.tenant_file_name, module)
    }

    /// Disables a module; prints the cascade and stops unless `confirmed`
    pub fn disable(&self, module: &str, confirmed: bool) -> Result<(), Box<dyn Error>> {
        do_disable(
            &self.catalog,
            &self.root,
            &self.tenant_file_name,
            module,
            confirmed,
        )
    }

    /// Replaces the tenant's active modules with a bundle
    pub fn apply_bundle(&self, bundle: &str) -> Result<(), Box<dyn Error>> {
        do_apply_bundle(&self.catalog, &self.root, &self.tenant_file_name, bundle)
    }
}
