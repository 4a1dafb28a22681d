use std::{
    collections::{HashMap, HashSet, VecDeque},
    path::Path,
};

use dashmap::DashMap;
use log::debug;
use thiserror::Error;

use crate::{
    model::{
        catalog::{Bundle, BundleId, CatalogFile, ModuleDefinition, ModuleId},
        ParseError,
    },
    resolver::{validate, ResolveError},
};

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Error parsing catalog: {0}")]
    Parse(#[from] ParseError),
    #[error("Module `{0}` is defined more than once")]
    DuplicateModule(ModuleId),
    #[error("Module `{0}` requires itself")]
    SelfDependency(ModuleId),
    #[error("Module `{module}` lists `{dependency}` more than once")]
    DuplicateDependency {
        module: ModuleId,
        dependency: ModuleId,
    },
    #[error("Module `{module}` requires `{dependency}`, which is not in the catalog")]
    UnknownDependency {
        module: ModuleId,
        dependency: ModuleId,
    },
    #[error("Dependency cycle in catalog: {0}")]
    DependencyCycle(String),
    #[error("Bundle `{0}` is defined more than once")]
    DuplicateBundle(BundleId),
    #[error("Bundle `{bundle}` references `{module}`, which is not in the catalog")]
    UnknownBundleModule { bundle: BundleId, module: ModuleId },
    #[error("Bundle `{bundle}` is not self-consistent: {errors}")]
    InconsistentBundle { bundle: BundleId, errors: String },
}

/// A catalog that passed every integrity check: all dependency edges resolve,
/// the dependency graph is acyclic, and every bundle is self-consistent.
///
/// Loaded once per process and shared read-only between callers. Closure
/// results are memoized per module; the cache lives behind a [`DashMap`] so a
/// shared `&Catalog` stays safe under concurrent use.
pub struct Catalog {
    name: String,
    modules: Vec<ModuleDefinition>,
    bundles: Vec<Bundle>,
    index: HashMap<ModuleId, usize>,
    closures: DashMap<ModuleId, Vec<ModuleId>>,
}

impl Catalog {
    pub fn new(file: CatalogFile) -> Result<Catalog, CatalogError> {
        let CatalogFile {
            name,
            modules,
            bundles,
        } = file;

        let mut index: HashMap<ModuleId, usize> = HashMap::new();
        for (position, module) in modules.iter().enumerate() {
            if index.insert(module.id.clone(), position).is_some() {
                return Err(CatalogError::DuplicateModule(module.id.clone()));
            }
        }

        for module in &modules {
            let mut seen: HashSet<&ModuleId> = HashSet::new();
            for dependency in &module.requires {
                if dependency == &module.id {
                    return Err(CatalogError::SelfDependency(module.id.clone()));
                }
                if !seen.insert(dependency) {
                    return Err(CatalogError::DuplicateDependency {
                        module: module.id.clone(),
                        dependency: dependency.clone(),
                    });
                }
                if !index.contains_key(dependency) {
                    return Err(CatalogError::UnknownDependency {
                        module: module.id.clone(),
                        dependency: dependency.clone(),
                    });
                }
            }
        }

        if let Some(cycle) = find_cycle(&modules, &index) {
            let path = cycle
                .iter()
                .map(ModuleId::as_str)
                .collect::<Vec<_>>()
                .join(" -> ");
            return Err(CatalogError::DependencyCycle(path));
        }

        let catalog = Catalog {
            name,
            modules,
            bundles,
            index,
            closures: DashMap::new(),
        };
        catalog.check_bundles()?;

        debug!(
            "Loaded catalog `{}` with {} modules and {} bundles",
            catalog.name,
            catalog.modules.len(),
            catalog.bundles.len()
        );

        Ok(catalog)
    }

    pub fn from_toml_str(data: &str) -> Result<Catalog, CatalogError> {
        Catalog::new(CatalogFile::from_toml_str(data)?)
    }

    pub fn from_file(path: &Path) -> Result<Catalog, CatalogError> {
        Catalog::new(CatalogFile::from_file(path)?)
    }

    /// The catalog shipped with the product.
    pub fn builtin() -> Result<Catalog, CatalogError> {
        Catalog::from_toml_str(include_str!("default_catalog.toml"))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Every module, in catalog declaration order.
    pub fn modules(&self) -> &[ModuleDefinition] {
        &self.modules
    }

    pub fn bundles(&self) -> &[Bundle] {
        &self.bundles
    }

    pub fn contains(&self, id: &ModuleId) -> bool {
        self.index.contains_key(id)
    }

    pub fn definition(&self, id: &ModuleId) -> Option<&ModuleDefinition> {
        self.index.get(id).map(|position| &self.modules[*position])
    }

    pub fn bundle(&self, id: &BundleId) -> Option<&Bundle> {
        self.bundles.iter().find(|bundle| &bundle.id == id)
    }

    /// Human-readable name for messages; falls back to the raw id for a
    /// module the catalog does not know.
    pub fn short_name<'a>(&'a self, id: &'a ModuleId) -> &'a str {
        self.definition(id)
            .map(|module| module.short_name.as_str())
            .unwrap_or_else(|| id.as_str())
    }

    /// The transitive dependency closure of `id`, including `id` itself, in
    /// breadth-first discovery order.
    ///
    /// The catalog is proven acyclic at load time, so the walk terminates and
    /// visits every node at most once. Results are memoized per module.
    pub fn closure(&self, id: &ModuleId) -> Result<Vec<ModuleId>, ResolveError> {
        if let Some(cached) = self.closures.get(id) {
            return Ok(cached.value().clone());
        }

        let start = self
            .definition(id)
            .ok_or_else(|| ResolveError::UnknownModule(id.clone()))?;

        let mut discovered: Vec<ModuleId> = vec![id.clone()];
        let mut visited: HashSet<ModuleId> = HashSet::from([id.clone()]);
        let mut queue: VecDeque<&ModuleDefinition> = VecDeque::from([start]);

        while let Some(module) = queue.pop_front() {
            for dependency in &module.requires {
                if visited.insert(dependency.clone()) {
                    discovered.push(dependency.clone());
                    if let Some(definition) = self.definition(dependency) {
                        queue.push_back(definition);
                    }
                }
            }
        }

        self.closures.insert(id.clone(), discovered.clone());
        Ok(discovered)
    }

    fn check_bundles(&self) -> Result<(), CatalogError> {
        let mut seen: HashSet<&BundleId> = HashSet::new();
        for bundle in &self.bundles {
            if !seen.insert(&bundle.id) {
                return Err(CatalogError::DuplicateBundle(bundle.id.clone()));
            }
            for module in &bundle.modules {
                if !self.contains(module) {
                    return Err(CatalogError::UnknownBundleModule {
                        bundle: bundle.id.clone(),
                        module: module.clone(),
                    });
                }
            }
            let result = validate::validate(self, &bundle.modules.iter().cloned().collect());
            if !result.valid {
                return Err(CatalogError::InconsistentBundle {
                    bundle: bundle.id.clone(),
                    errors: result.errors.join("; "),
                });
            }
        }
        Ok(())
    }
}

/// Depth-first search for a `requires` cycle. Returns the offending path,
/// ending on the module it revisits.
fn find_cycle(
    modules: &[ModuleDefinition],
    index: &HashMap<ModuleId, usize>,
) -> Option<Vec<ModuleId>> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Open,
        Done,
    }

    fn visit(
        id: &ModuleId,
        modules: &[ModuleDefinition],
        index: &HashMap<ModuleId, usize>,
        marks: &mut HashMap<ModuleId, Mark>,
        stack: &mut Vec<ModuleId>,
    ) -> Option<Vec<ModuleId>> {
        match marks.get(id) {
            Some(Mark::Done) => return None,
            Some(Mark::Open) => {
                let position = stack.iter().position(|m| m == id).unwrap_or(0);
                let mut cycle = stack[position..].to_vec();
                cycle.push(id.clone());
                return Some(cycle);
            }
            None => {}
        }

        marks.insert(id.clone(), Mark::Open);
        stack.push(id.clone());

        if let Some(module) = index.get(id).map(|position| &modules[*position]) {
            for dependency in &module.requires {
                if let Some(cycle) = visit(dependency, modules, index, marks, stack) {
                    return Some(cycle);
                }
            }
        }

        stack.pop();
        marks.insert(id.clone(), Mark::Done);
        None
    }

    let mut marks: HashMap<ModuleId, Mark> = HashMap::new();
    let mut stack: Vec<ModuleId> = Vec::new();
    for module in modules {
        if let Some(cycle) = visit(&module.id, modules, index, &mut marks, &mut stack) {
            return Some(cycle);
        }
    }
    None
}
