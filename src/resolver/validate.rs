use std::collections::BTreeSet;

use crate::{catalog::Catalog, model::catalog::ModuleId, resolver::ValidationResult};

/// Checks the invariant "every active module's dependencies are active".
///
/// This is the single source of truth for configuration consistency: every
/// other resolver operation ends by running its proposed result through here
/// before reporting success. An id the catalog does not know is reported as a
/// violation too, so stale persisted state surfaces at the same place.
pub fn validate(catalog: &Catalog, active: &BTreeSet<ModuleId>) -> ValidationResult {
    let mut errors: Vec<String> = Vec::new();

    for id in active {
        match catalog.definition(id) {
            None => errors.push(format!("unknown module: {id}")),
            Some(module) => {
                for dependency in &module.requires {
                    if !active.contains(dependency) {
                        errors.push(format!(
                            "{} requires {}",
                            module.short_name,
                            catalog.short_name(dependency)
                        ));
                    }
                }
            }
        }
    }

    ValidationResult {
        valid: errors.is_empty(),
        errors,
    }
}
