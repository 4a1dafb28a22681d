use log::{debug, info, warn};

use crate::{
    catalog::Catalog,
    model::{
        catalog::{BundleId, ModuleId},
        tenant::TenantFile,
    },
    resolver::{
        activation::{self, DisableOutcome},
        validate, CascadeDecision,
    },
};
use std::{collections::BTreeSet, error::Error, path::Path};

/// Handler for the catalog command
pub fn do_catalog(catalog: &Catalog) -> Result<(), Box<dyn Error>> {
    println!("Catalog `{}`", catalog.name());
    for module in catalog.modules() {
        let tag = if module.base { " [base]" } else { "" };
        println!(
            "  {:<4} {}{} - {}",
            module.id.as_str(),
            module.short_name,
            tag,
            module.description
        );
        if !module.requires.is_empty() {
            let requires = module
                .requires
                .iter()
                .map(ModuleId::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            println!("       requires: {requires}");
        }
    }
    Ok(())
}

/// Handler for the bundles command
pub fn do_bundles(catalog: &Catalog) -> Result<(), Box<dyn Error>> {
    for bundle in catalog.bundles() {
        let marker = if bundle.recommended {
            " (recommended)"
        } else {
            ""
        };
        let modules = bundle
            .modules
            .iter()
            .map(ModuleId::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        println!("  {}{} - {}", bundle.id, marker, bundle.description);
        println!("       modules: {modules}");
        println!("       use case: {}", bundle.use_case);
    }
    Ok(())
}

/// Handler for the validate command. Fails when the tenant's active set is
/// not consistent, so the exit code can gate a commit.
pub fn do_validate(
    catalog: &Catalog,
    root: &Path,
    tenant_file_name: &Path,
) -> Result<(), Box<dyn Error>> {
    let tenant = load_tenant_file(&root.join(tenant_file_name))?;

    let result = validate::validate(catalog, &tenant.modules);
    if result.valid {
        info!(
            "Tenant module set is consistent ({} active)",
            tenant.modules.len()
        );
        Ok(())
    } else {
        for error in &result.errors {
            warn!("{error}");
        }
        Err("tenant module set is not consistent".into())
    }
}

/// Handler for the enable command
pub fn do_enable(
    catalog: &Catalog,
    root: &Path,
    tenant_file_name: &Path,
    module: &str,
) -> Result<(), Box<dyn Error>> {
    let target: ModuleId = module.parse()?;
    let tenant_file_path = root.join(tenant_file_name);
    let tenant = load_tenant_file(&tenant_file_path)?;

    let outcome = activation::enable(catalog, &target, &tenant.modules)?;

    info!("Enabled {}", catalog.short_name(&target));
    if let Some(summary) = outcome.summary(catalog, &target) {
        info!("{summary}");
    }
    store_tenant_file(&tenant_file_path, &outcome.new_active, &tenant.modules)?;

    Ok(())
}

/// Handler for the disable command.
///
/// Without `yes` this is the planning step: when other modules depend on the
/// target, the full blast radius is printed and nothing changes. `yes` is the
/// explicit confirmation that applies the cascade.
pub fn do_disable(
    catalog: &Catalog,
    root: &Path,
    tenant_file_name: &Path,
    module: &str,
    yes: bool,
) -> Result<(), Box<dyn Error>> {
    let target: ModuleId = module.parse()?;
    let tenant_file_path = root.join(tenant_file_name);
    let tenant = load_tenant_file(&tenant_file_path)?;

    if yes {
        let outcome = activation::confirm_disable(catalog, &target, &tenant.modules)?;
        match outcome.summary(catalog) {
            Some(summary) => info!("{summary}"),
            None => info!(
                "{} is not active, nothing to disable",
                catalog.short_name(&target)
            ),
        }
        store_tenant_file(&tenant_file_path, &outcome.new_active, &tenant.modules)?;
        return Ok(());
    }

    match activation::disable(catalog, &target, &tenant.modules)? {
        DisableOutcome::Applied { new_active } => {
            if new_active == tenant.modules {
                info!(
                    "{} is not active, nothing to disable",
                    catalog.short_name(&target)
                );
            } else {
                info!("Disabled {}", catalog.short_name(&target));
            }
            store_tenant_file(&tenant_file_path, &new_active, &tenant.modules)?;
        }
        DisableOutcome::RequiresConfirmation(decision) => {
            warn!("{}", describe_blocked_disable(catalog, &target, &decision));
        }
    }

    Ok(())
}

/// Handler for the apply-bundle command
pub fn do_apply_bundle(
    catalog: &Catalog,
    root: &Path,
    tenant_file_name: &Path,
    bundle: &str,
) -> Result<(), Box<dyn Error>> {
    let bundle_id: BundleId = bundle.parse()?;
    let tenant_file_path = root.join(tenant_file_name);
    let tenant = load_tenant_file(&tenant_file_path)?;

    let outcome = activation::apply_bundle(catalog, &bundle_id, &tenant.modules)?;

    info!("{}", outcome.summary(catalog, &bundle_id));
    if !outcome.added.is_empty() {
        info!("Added: {}", short_names(catalog, &outcome.added));
    }
    if !outcome.removed.is_empty() {
        info!("Removed: {}", short_names(catalog, &outcome.removed));
    }
    store_tenant_file(&tenant_file_path, &outcome.new_active, &tenant.modules)?;

    Ok(())
}

fn load_tenant_file(path: &Path) -> Result<TenantFile, Box<dyn Error>> {
    if path.exists() {
        Ok(TenantFile::from_file(path)?)
    } else {
        debug!(
            "Tenant file {} does not exist, starting from an empty module set",
            path.display()
        );
        Ok(TenantFile::default())
    }
}

fn store_tenant_file(
    path: &Path,
    modules: &BTreeSet<ModuleId>,
    previous: &BTreeSet<ModuleId>,
) -> Result<(), Box<dyn Error>> {
    if modules == previous {
        debug!("Tenant module set is unchanged");
        return Ok(());
    }
    let tenant = TenantFile::new(modules.clone());
    std::fs::write(path, tenant.to_string()?)?;
    info!("Wrote tenant file to {}", path.display());
    Ok(())
}

fn describe_blocked_disable(
    catalog: &Catalog,
    target: &ModuleId,
    decision: &CascadeDecision,
) -> String {
    format!(
        "Cannot disable {} on its own: {} depend on it. Re-run with --yes to disable all {} modules together ({})",
        catalog.short_name(target),
        short_names(catalog, &decision.blocking_modules),
        decision.full_cascade_set.len(),
        short_names(catalog, &decision.full_cascade_set),
    )
}

fn short_names(catalog: &Catalog, ids: &BTreeSet<ModuleId>) -> String {
    ids.iter()
        .map(|id| catalog.short_name(id))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn module(s: &str) -> ModuleId {
        s.parse().unwrap()
    }

    fn active(ids: &[&str]) -> BTreeSet<ModuleId> {
        ids.iter().map(|s| module(s)).collect()
    }

    fn write_tenant(root: &Path, modules: &[&str]) {
        let tenant = TenantFile::new(active(modules));
        std::fs::write(root.join("tenant.toml"), tenant.to_string().unwrap()).unwrap();
    }

    fn read_tenant(root: &Path) -> BTreeSet<ModuleId> {
        TenantFile::from_file(&root.join("tenant.toml"))
            .unwrap()
            .modules
    }

    #[test]
    fn enable_creates_and_fills_the_tenant_file() {
        let catalog = Catalog::builtin().unwrap();
        let dir = tempfile::tempdir().unwrap();

        do_enable(&catalog, dir.path(), Path::new("tenant.toml"), "crs").unwrap();

        assert_eq!(read_tenant(dir.path()), active(&["crs", "rms"]));
    }

    #[test]
    fn enable_rejects_malformed_module_ids() {
        let catalog = Catalog::builtin().unwrap();
        let dir = tempfile::tempdir().unwrap();

        let result = do_enable(&catalog, dir.path(), Path::new("tenant.toml"), "Not An Id");
        assert!(result.is_err());
        assert!(!dir.path().join("tenant.toml").exists());
    }

    #[test]
    fn blocked_disable_leaves_the_tenant_file_untouched() {
        let catalog = Catalog::builtin().unwrap();
        let dir = tempfile::tempdir().unwrap();
        write_tenant(dir.path(), &["crs", "rms"]);

        do_disable(&catalog, dir.path(), Path::new("tenant.toml"), "rms", false).unwrap();

        assert_eq!(read_tenant(dir.path()), active(&["crs", "rms"]));
    }

    #[test]
    fn confirmed_disable_applies_the_cascade() {
        let catalog = Catalog::builtin().unwrap();
        let dir = tempfile::tempdir().unwrap();
        write_tenant(dir.path(), &["crs", "rms", "tms"]);

        do_disable(&catalog, dir.path(), Path::new("tenant.toml"), "rms", true).unwrap();

        assert_eq!(read_tenant(dir.path()), active(&["tms"]));
    }

    #[test]
    fn apply_bundle_replaces_the_tenant_modules() {
        let catalog = Catalog::builtin().unwrap();
        let dir = tempfile::tempdir().unwrap();
        write_tenant(dir.path(), &["ims", "oms"]);

        do_apply_bundle(
            &catalog,
            dir.path(),
            Path::new("tenant.toml"),
            "essential-hotel",
        )
        .unwrap();

        assert_eq!(read_tenant(dir.path()), active(&["bms", "crs", "rms"]));
    }

    #[test]
    fn validate_passes_a_consistent_tenant_file() {
        let catalog = Catalog::builtin().unwrap();
        let dir = tempfile::tempdir().unwrap();
        write_tenant(dir.path(), &["crs", "rms"]);

        assert!(do_validate(&catalog, dir.path(), Path::new("tenant.toml")).is_ok());
    }

    #[test]
    fn validate_fails_an_inconsistent_tenant_file() {
        let catalog = Catalog::builtin().unwrap();
        let dir = tempfile::tempdir().unwrap();
        write_tenant(dir.path(), &["crs"]);

        assert!(do_validate(&catalog, dir.path(), Path::new("tenant.toml")).is_err());
    }

    #[test]
    fn validate_accepts_a_missing_tenant_file_as_empty() {
        let catalog = Catalog::builtin().unwrap();
        let dir = tempfile::tempdir().unwrap();

        assert!(do_validate(&catalog, dir.path(), Path::new("tenant.toml")).is_ok());
    }
}
