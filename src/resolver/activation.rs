use std::collections::BTreeSet;

use log::error;

use crate::{
    catalog::Catalog,
    model::catalog::{BundleId, ModuleId},
    resolver::{cascade, validate, CascadeDecision, ResolveError},
};

/// Result of enabling a module. `auto_added` lists the dependencies that were
/// not active before, in closure discovery order, for "Also enabled" messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnableOutcome {
    pub new_active: BTreeSet<ModuleId>,
    pub auto_added: Vec<ModuleId>,
}

impl EnableOutcome {
    pub fn summary(&self, catalog: &Catalog, target: &ModuleId) -> Option<String> {
        if self.auto_added.is_empty() {
            return None;
        }
        Some(format!(
            "Also enabled: {} (required by {})",
            short_names(catalog, self.auto_added.iter()),
            catalog.short_name(target)
        ))
    }
}

/// Result of a plain disable request. A cascade is never applied silently:
/// when other active modules depend on the target, the decision comes back
/// for the caller to confirm via [`confirm_disable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisableOutcome {
    Applied { new_active: BTreeSet<ModuleId> },
    RequiresConfirmation(CascadeDecision),
}

/// Result of a confirmed cascade disable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmOutcome {
    pub new_active: BTreeSet<ModuleId>,
    pub removed: BTreeSet<ModuleId>,
}

impl ConfirmOutcome {
    pub fn summary(&self, catalog: &Catalog) -> Option<String> {
        if self.removed.is_empty() {
            return None;
        }
        Some(format!(
            "Disabled: {}",
            short_names(catalog, self.removed.iter())
        ))
    }
}

/// Result of applying a bundle: the bundle's module set verbatim, plus the
/// diff against the previous active set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleOutcome {
    pub new_active: BTreeSet<ModuleId>,
    pub added: BTreeSet<ModuleId>,
    pub removed: BTreeSet<ModuleId>,
}

impl BundleOutcome {
    pub fn summary(&self, catalog: &Catalog, bundle: &BundleId) -> String {
        match catalog.bundle(bundle) {
            Some(bundle) => format!("Applied \"{}\" configuration", bundle.name),
            None => format!("Applied \"{bundle}\" configuration"),
        }
    }
}

/// Enables `target` along with its full dependency closure.
///
/// By construction the result satisfies every dependency, so the closing
/// validation can only fail on a catalog integrity defect; that failure is
/// surfaced as [`ResolveError::InconsistentResult`].
pub fn enable(
    catalog: &Catalog,
    target: &ModuleId,
    active: &BTreeSet<ModuleId>,
) -> Result<EnableOutcome, ResolveError> {
    let closure = catalog.closure(target)?;

    let mut new_active = active.clone();
    let mut auto_added: Vec<ModuleId> = Vec::new();
    for id in &closure {
        if new_active.insert(id.clone()) && id != target {
            auto_added.push(id.clone());
        }
    }

    ensure_consistent("enable", catalog, &new_active)?;

    Ok(EnableOutcome {
        new_active,
        auto_added,
    })
}

/// Disables `target` if nothing active depends on it; otherwise returns the
/// cascade decision for explicit confirmation.
pub fn disable(
    catalog: &Catalog,
    target: &ModuleId,
    active: &BTreeSet<ModuleId>,
) -> Result<DisableOutcome, ResolveError> {
    let decision = cascade::plan_disable(catalog, target, active)?;
    if !decision.can_disable_alone {
        return Ok(DisableOutcome::RequiresConfirmation(decision));
    }

    let mut new_active = active.clone();
    new_active.remove(target);
    ensure_consistent("disable", catalog, &new_active)?;

    Ok(DisableOutcome::Applied { new_active })
}

/// Applies the full cascade computed by [`cascade::plan_disable`]. This is
/// the second step of the two-step disable protocol.
pub fn confirm_disable(
    catalog: &Catalog,
    target: &ModuleId,
    active: &BTreeSet<ModuleId>,
) -> Result<ConfirmOutcome, ResolveError> {
    let decision = cascade::plan_disable(catalog, target, active)?;

    let new_active: BTreeSet<ModuleId> = active
        .difference(&decision.full_cascade_set)
        .cloned()
        .collect();
    ensure_consistent("confirm-disable", catalog, &new_active)?;

    Ok(ConfirmOutcome {
        new_active,
        removed: decision.full_cascade_set,
    })
}

/// Replaces the active set with the bundle's modules. Bundles fully replace,
/// they do not merge; the diff against the previous set is reported back.
pub fn apply_bundle(
    catalog: &Catalog,
    bundle_id: &BundleId,
    active: &BTreeSet<ModuleId>,
) -> Result<BundleOutcome, ResolveError> {
    let bundle = catalog
        .bundle(bundle_id)
        .ok_or_else(|| ResolveError::UnknownBundle(bundle_id.clone()))?;

    let new_active: BTreeSet<ModuleId> = bundle.modules.iter().cloned().collect();
    let added = new_active.difference(active).cloned().collect();
    let removed = active.difference(&new_active).cloned().collect();

    // Bundles are validated at catalog load, so as with enable a failure
    // here is a defect, not a user error.
    ensure_consistent("apply-bundle", catalog, &new_active)?;

    Ok(BundleOutcome {
        new_active,
        added,
        removed,
    })
}

fn ensure_consistent(
    operation: &'static str,
    catalog: &Catalog,
    candidate: &BTreeSet<ModuleId>,
) -> Result<(), ResolveError> {
    let result = validate::validate(catalog, candidate);
    if result.valid {
        return Ok(());
    }
    let errors = result.errors.join("; ");
    error!("`{operation}` produced an inconsistent module set: {errors}");
    Err(ResolveError::InconsistentResult { operation, errors })
}

fn short_names<'a>(catalog: &Catalog, ids: impl Iterator<Item = &'a ModuleId>) -> String {
    ids.map(|id| catalog.short_name(id))
        .collect::<Vec<_>>()
        .join(", ")
}
