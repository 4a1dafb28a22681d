use std::{env, error::Error, path::PathBuf};

use log::debug;

use crate::{catalog::Catalog, Modsolve};

#[derive(Default)]
pub struct ModsolveBuilder {
    // All other paths are relative to `root`
    root: Option<PathBuf>,
    catalog_file_name: Option<PathBuf>,
    tenant_file_name: Option<PathBuf>,
}

impl ModsolveBuilder {
    /// Root directory holding the catalog and tenant files.
    ///
    /// Defaults to the current directory.
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Name of the catalog definition toml file.
    ///
    /// Defaults to `modsolve.toml`. When the file does not exist, the
    /// built-in catalog is used instead.
    pub fn catalog_file_name(mut self, path: impl Into<PathBuf>) -> Self {
        self.catalog_file_name = Some(path.into());
        self
    }

    /// Name of the tenant module file.
    ///
    /// Defaults to `tenant.toml`.
    pub fn tenant_file_name(mut self, path: impl Into<PathBuf>) -> Self {
        self.tenant_file_name = Some(path.into());
        self
    }

    pub fn try_build(self) -> Result<Modsolve, Box<dyn Error>> {
        let Self {
            root,
            catalog_file_name,
            tenant_file_name,
        } = self;

        let root = match root {
            Some(root) => root,
            None => env::current_dir()?,
        };

        let catalog_file_name = catalog_file_name.unwrap_or_else(|| PathBuf::from("modsolve.toml"));

        let tenant_file_name = tenant_file_name.unwrap_or_else(|| PathBuf::from("tenant.toml"));

        let catalog_file_path = root.join(&catalog_file_name);
        let catalog = if catalog_file_path.exists() {
            Catalog::from_file(&catalog_file_path)?
        } else {
            debug!(
                "Catalog file {} does not exist, using the built-in catalog",
                catalog_file_path.display()
            );
            Catalog::builtin()?
        };

        Ok(Modsolve {
            catalog,
            root,
            tenant_file_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_with_the_builtin_catalog_when_no_file_exists() {
        let dir = tempfile::tempdir().unwrap();
        let modsolve = Modsolve::builder().root(dir.path()).try_build().unwrap();
        assert_eq!(modsolve.catalog().name(), "hotel-suite");
    }

    #[test]
    fn builds_from_a_catalog_file_when_present() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("modsolve.toml"),
            r#"
            name = "tiny"
            [modules.a]
                name = "A"
                short_name = "A"
                description = "A"
                base = true
        "#,
        )
        .unwrap();
        let modsolve = Modsolve::builder().root(dir.path()).try_build().unwrap();
        assert_eq!(modsolve.catalog().name(), "tiny");
    }

    #[test]
    fn rejects_a_broken_catalog_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("modsolve.toml"),
            r#"
            name = "cyclic"
            [modules.a]
                name = "A"
                short_name = "A"
                description = "A"
                requires = ["b"]
            [modules.b]
                name = "B"
                short_name = "B"
                description = "B"
                requires = ["a"]
        "#,
        )
        .unwrap();
        assert!(Modsolve::builder().root(dir.path()).try_build().is_err());
    }
}
