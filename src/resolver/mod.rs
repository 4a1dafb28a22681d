pub mod activation;
pub mod cascade;
pub mod validate;

use std::collections::BTreeSet;

use thiserror::Error;

use crate::model::catalog::{BundleId, ModuleId};

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Unknown module `{0}`")]
    UnknownModule(ModuleId),
    #[error("Unknown bundle `{0}`")]
    UnknownBundle(BundleId),
    /// The mandatory post-operation validation failed. This is a defect in
    /// the catalog or the resolver, never a normal outcome.
    #[error("`{operation}` produced an inconsistent module set: {errors}")]
    InconsistentResult {
        operation: &'static str,
        errors: String,
    },
}

/// Outcome of checking an active set against the catalog. `errors` carries
/// one message per violation, in active-set order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
}

/// What disabling one module means for the rest of the active set.
///
/// `blocking_modules` are the active modules that directly or transitively
/// require the target; `full_cascade_set` is the target plus everything that
/// would have to be disabled with it. Both are empty when the target is not
/// active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeDecision {
    pub can_disable_alone: bool,
    pub blocking_modules: BTreeSet<ModuleId>,
    pub full_cascade_set: BTreeSet<ModuleId>,
}
