use std::collections::BTreeSet;

use log::debug;

use crate::{
    catalog::Catalog,
    model::catalog::ModuleId,
    resolver::{CascadeDecision, ResolveError},
};

/// Decides whether `target` can be disabled on its own against `active`, and
/// if not, which modules would have to go with it.
///
/// Disabling a module that is not active is a no-op, not an error: the
/// decision comes back with empty sets.
pub fn plan_disable(
    catalog: &Catalog,
    target: &ModuleId,
    active: &BTreeSet<ModuleId>,
) -> Result<CascadeDecision, ResolveError> {
    if !catalog.contains(target) {
        return Err(ResolveError::UnknownModule(target.clone()));
    }

    if !active.contains(target) {
        debug!("Module {target} is not active, nothing to disable");
        return Ok(CascadeDecision {
            can_disable_alone: true,
            blocking_modules: BTreeSet::new(),
            full_cascade_set: BTreeSet::new(),
        });
    }

    let mut blocking_modules: BTreeSet<ModuleId> = BTreeSet::new();
    for id in active {
        if id == target {
            continue;
        }
        if catalog.closure(id)?.contains(target) {
            blocking_modules.insert(id.clone());
        }
    }

    // The one-hop blockers are not enough: a module depending on anything
    // already slated for removal must be removed too. Grow the set to a
    // fixed point; `active` is finite and the set only grows, so this
    // terminates.
    let mut full_cascade_set: BTreeSet<ModuleId> = BTreeSet::from([target.clone()]);
    loop {
        let mut grew = false;
        for id in active {
            if full_cascade_set.contains(id) {
                continue;
            }
            let closure = catalog.closure(id)?;
            if closure.iter().any(|m| full_cascade_set.contains(m)) {
                debug!("Disabling {target} also drags {id} into the cascade");
                full_cascade_set.insert(id.clone());
                grew = true;
            }
        }
        if !grew {
            break;
        }
    }

    Ok(CascadeDecision {
        can_disable_alone: blocking_modules.is_empty(),
        blocking_modules,
        full_cascade_set,
    })
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

    // a requires b, c requires b, b stands alone.
    const SHARED_BASE: &str = r#"
        name = "shared-base"
        [modules.b]
            name = "B"
            short_name = "B"
            description = "B"
            base = true
        [modules.a]
            name = "A"
            short_name = "A"
            description = "A"
            requires = ["b"]
        [modules.c]
            name = "C"
            short_name = "C"
            description = "C"
            requires = ["b"]
    "#;

    #[test]
    fn base_module_with_active_dependents_cannot_go_alone() {
        let catalog = Catalog::from_toml_str(SHARED_BASE).unwrap();
        let decision = plan_disable(&catalog, &module("b"), &active(&["b", "a", "c"])).unwrap();
        assert_eq!(decision, CascadeDecision {
            can_disable_alone: false,
            blocking_modules: active(&["a", "c"]),
            full_cascade_set: active(&["a", "b", "c"]),
        });
    }

    #[test]
    fn leaf_module_disables_alone() {
        let catalog = Catalog::from_toml_str(SHARED_BASE).unwrap();
        let decision = plan_disable(&catalog, &module("a"), &active(&["b", "a", "c"])).unwrap();
        assert_eq!(decision, CascadeDecision {
            can_disable_alone: true,
            blocking_modules: BTreeSet::new(),
            full_cascade_set: active(&["a"]),
        });
    }

    #[test]
    fn inactive_target_is_a_noop() {
        let catalog = Catalog::from_toml_str(SHARED_BASE).unwrap();
        let decision = plan_disable(&catalog, &module("a"), &active(&["b"])).unwrap();
        assert_eq!(decision, CascadeDecision {
            can_disable_alone: true,
            blocking_modules: BTreeSet::new(),
            full_cascade_set: BTreeSet::new(),
        });
    }

    #[test]
    fn unknown_target_is_rejected() {
        let catalog = Catalog::from_toml_str(SHARED_BASE).unwrap();
        assert!(matches!(
            plan_disable(&catalog, &module("ghost"), &active(&["b"])),
            Err(ResolveError::UnknownModule(id)) if id == module("ghost")
        ));
    }

    #[test]
    fn cascade_follows_transitive_dependents() {
        let catalog = Catalog::builtin().unwrap();
        // as depends on bms/crs/rms; crs depends on rms. Disabling rms must
        // cascade through crs up to as, but leave bms alone.
        let decision = plan_disable(
            &catalog,
            &module("rms"),
            &active(&["rms", "crs", "bms", "as"]),
        )
        .unwrap();
        assert_eq!(decision.can_disable_alone, false);
        assert_eq!(decision.blocking_modules, active(&["as", "crs"]));
        assert_eq!(decision.full_cascade_set, active(&["as", "crs", "rms"]));
    }

    #[test]
    fn diamond_dependency_cascades_once() {
        let catalog = Catalog::from_toml_str(
            r#"
            name = "diamond"
            [modules.a]
                name = "A"
                short_name = "A"
                description = "A"
                base = true
            [modules.b]
                name = "B"
                short_name = "B"
                description = "B"
                requires = ["a"]
            [modules.c]
                name = "C"
                short_name = "C"
                description = "C"
                requires = ["a"]
            [modules.d]
                name = "D"
                short_name = "D"
                description = "D"
                requires = ["b", "c"]
        "#,
        )
        .unwrap();
        let decision =
            plan_disable(&catalog, &module("a"), &active(&["a", "b", "c", "d"])).unwrap();
        assert_eq!(decision.blocking_modules, active(&["b", "c", "d"]));
        assert_eq!(decision.full_cascade_set, active(&["a", "b", "c", "d"]));
    }

    #[test]
    fn unrelated_modules_stay_out_of_the_cascade() {
        let catalog = Catalog::builtin().unwrap();
        let decision = plan_disable(
            &catalog,
            &module("ims"),
            &active(&["ims", "oms", "sms", "ams", "tms"]),
        )
        .unwrap();
        assert_eq!(decision.blocking_modules, active(&["oms", "sms"]));
        assert_eq!(decision.full_cascade_set, active(&["ims", "oms", "sms"]));
    }
}
