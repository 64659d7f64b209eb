//! Constraint solver
//!
//! Decides one module at a time, in the order modules become reachable from
//! the request. Each decision tries the versions satisfying every active
//! demand, highest first; a release whose own dependencies reject an earlier
//! decision is skipped. When a module has no candidate left the search
//! returns to the most recent decision and tries its next version.
//!
//! The search itself is synchronous. When it reaches modules the catalog has
//! not loaded yet it yields them, the driver fetches them concurrently and the
//! search picks up where it stopped.

use std::collections::HashMap;

use tracing::{debug, info};

use modforge_core::error::ForgeError;
use modforge_core::types::{ModuleName, Release, Version, VersionReq};
use modforge_registry::{Repository, VersionCatalog};

use crate::conflict::{Conflict, Demand, Requester, ResolveError};
use crate::graph::DemandGraph;
use crate::selector::VersionSelector;
use crate::tree::ResolutionNode;
use crate::ResolverResult;

/// One decided module and the versions it has not tried yet
#[derive(Debug)]
struct Decision {
    module: ModuleName,
    /// Remaining candidates, ascending; the next one is popped from the end
    remaining: Vec<Version>,
}

/// Outcome of running the search until it needs the catalog
#[derive(Debug)]
enum Step {
    Solved,
    Fetch(Vec<ModuleName>),
    Exhausted,
}

/// Resolver state for one run
#[derive(Debug)]
pub struct Solver<'c, 'r, R: Repository> {
    catalog: &'c VersionCatalog<'r, R>,
    graph: DemandGraph,
    selections: HashMap<ModuleName, Version>,
    decisions: Vec<Decision>,
    /// First module seen whose active demands admit no version
    conflict: Option<Conflict>,
    /// First release seen that rejected an earlier decision
    clash: Option<Conflict>,
    backtracks: usize,
}

impl<'c, 'r, R: Repository> Solver<'c, 'r, R> {
    fn new(catalog: &'c VersionCatalog<'r, R>) -> Self {
        Self {
            catalog,
            graph: DemandGraph::new(),
            selections: HashMap::new(),
            decisions: Vec::new(),
            conflict: None,
            clash: None,
            backtracks: 0,
        }
    }

    /// Resolve the whole transitive closure of `root` under `constraint`
    pub async fn resolve(
        catalog: &'c VersionCatalog<'r, R>,
        root: &ModuleName,
        constraint: &VersionReq,
    ) -> ResolverResult<ResolutionNode> {
        let mut solver = Self::new(catalog);
        solver.graph.add_root_demand(root, constraint.clone());

        loop {
            match solver.search()? {
                Step::Solved => break,
                Step::Fetch(modules) => catalog.fetch_all(modules).await?,
                Step::Exhausted => {
                    let conflict = solver.into_conflict(root);
                    debug!(
                        module = %conflict.module,
                        demands = conflict.demands.len(),
                        "no assignment satisfies every demand"
                    );
                    return Err(ResolveError::Unsatisfiable(conflict));
                },
            }
        }

        let tree = solver.tree(root)?;
        info!(
            root = %root,
            modules = tree.len(),
            discovered = solver.graph.module_count(),
            demands = solver.graph.demand_count(),
            backtracks = solver.backtracks,
            "resolution complete"
        );
        Ok(tree)
    }

    /// Resolve only the root module, ignoring its dependencies
    pub async fn resolve_root_only(
        catalog: &'c VersionCatalog<'r, R>,
        root: &ModuleName,
        constraint: &VersionReq,
    ) -> ResolverResult<ResolutionNode> {
        let releases = catalog.fetch(root).await?;
        let selector = VersionSelector::new(releases.iter().map(|r| r.version.clone()));

        let version = selector.select_best(&[constraint]).ok_or_else(|| {
            ResolveError::Unsatisfiable(Conflict {
                module: root.clone(),
                demands: vec![Demand::new(Requester::Request, constraint.clone())],
            })
        })?;
        let release = releases
            .iter()
            .find(|release| release.version == version)
            .ok_or_else(|| missing_release(root, &version))?;

        debug!(root = %root, version = %version, "resolved root module only");
        Ok(ResolutionNode::leaf(release))
    }

    /// Decide modules until every reachable one is decided, the catalog is
    /// missing releases, or every alternative has failed
    fn search(&mut self) -> ResolverResult<Step> {
        loop {
            let reachable = self.graph.reachable(&self.selections);
            let Some(module) = reachable
                .iter()
                .find(|module| !self.selections.contains_key(*module))
                .cloned()
            else {
                return Ok(Step::Solved);
            };

            let unfetched: Vec<ModuleName> = reachable
                .iter()
                .filter(|module| !self.catalog.contains(module))
                .cloned()
                .collect();
            if !unfetched.is_empty() {
                return Ok(Step::Fetch(unfetched));
            }

            let selector = self.selector(&module)?;
            let demands = self.graph.active_demands(&module, &self.selections);
            let constraints: Vec<&VersionReq> = demands.iter().map(|d| &d.constraint).collect();
            let remaining = selector.candidates(&constraints);

            if remaining.is_empty() {
                debug!(module = %module, demands = demands.len(), "no version satisfies demands");
                self.conflict.get_or_insert(Conflict { module, demands });
            } else {
                self.decisions.push(Decision { module, remaining });
            }

            if !self.next_candidate()? {
                return Ok(Step::Exhausted);
            }
        }
    }

    /// Select the next untried version of the latest decision, unwinding
    /// decisions that have none left
    ///
    /// Returns `false` once every decision is exhausted.
    fn next_candidate(&mut self) -> ResolverResult<bool> {
        loop {
            let Some(decision) = self.decisions.last_mut() else {
                return Ok(false);
            };
            let module = decision.module.clone();
            let next = decision.remaining.pop();
            let previous = self.selections.remove(&module);

            let Some(version) = next else {
                self.decisions.pop();
                continue;
            };
            if previous.is_some() {
                self.backtracks += 1;
            }

            let release = self
                .catalog
                .release(&module, &version)
                .ok_or_else(|| missing_release(&module, &version))?;
            self.graph.expand(&release);
            self.selections.insert(module.clone(), version.clone());

            if self.accepts_decisions(&release)? {
                debug!(
                    module = %module,
                    version = %version,
                    previous = ?previous.map(|v| v.to_string()),
                    "selected"
                );
                return Ok(true);
            }
        }
    }

    /// Whether every dependency of `release` on an already decided module
    /// accepts the version chosen for it
    fn accepts_decisions(&mut self, release: &Release) -> ResolverResult<bool> {
        for dependency in &release.dependencies {
            let Some(selected) = self.selections.get(&dependency.name) else {
                continue;
            };
            if dependency.version_req.matches(selected) {
                continue;
            }

            debug!(
                module = %release.module,
                version = %release.version,
                dependency = %dependency.name,
                selected = %selected,
                "release rejects an earlier decision"
            );
            let demands = self.graph.active_demands(&dependency.name, &self.selections);
            let conflict = Conflict {
                module: dependency.name.clone(),
                demands,
            };
            if self.is_contradiction(&conflict)? {
                self.conflict.get_or_insert(conflict);
            } else {
                self.clash.get_or_insert(conflict);
            }
            return Ok(false);
        }
        Ok(true)
    }

    /// Whether no known version of the module meets every listed demand
    fn is_contradiction(&self, conflict: &Conflict) -> ResolverResult<bool> {
        let constraints: Vec<&VersionReq> =
            conflict.demands.iter().map(|d| &d.constraint).collect();
        Ok(self.selector(&conflict.module)?.select_best(&constraints).is_none())
    }

    /// The conflict to report once the search is exhausted
    ///
    /// Prefers the first contradiction met while searching. Failing that,
    /// looks for a module whose demands from every release tried so far
    /// contradict each other, which is how a circular requirement shows up.
    fn into_conflict(mut self, root: &ModuleName) -> Conflict {
        if let Some(conflict) = self.conflict.take() {
            return conflict;
        }

        let accumulated = self.graph.modules().find_map(|module| {
            let conflict = Conflict {
                module: module.clone(),
                demands: self.graph.all_demands(module),
            };
            match self.is_contradiction(&conflict) {
                Ok(true) => Some(conflict),
                _ => None,
            }
        });

        let clash = self.clash.take();
        accumulated.or(clash).unwrap_or_else(|| Conflict {
            module: root.clone(),
            demands: self.graph.active_demands(root, &HashMap::new()),
        })
    }

    fn selector(&self, module: &ModuleName) -> ResolverResult<VersionSelector> {
        let releases = self
            .catalog
            .get(module)
            .ok_or_else(|| ForgeError::CatalogUnavailable {
                module: module.to_string(),
            })?;
        Ok(VersionSelector::new(releases.iter().map(|release| release.version.clone())))
    }

    fn tree(&self, root: &ModuleName) -> ResolverResult<ResolutionNode> {
        let root_release = self.selected_release(root).ok_or_else(|| {
            ForgeError::CatalogUnavailable {
                module: root.to_string(),
            }
        })?;

        let reachable = self.graph.reachable(&self.selections);
        Ok(ResolutionNode::build(&root_release, |module| {
            if reachable.contains(module) {
                self.selected_release(module)
            } else {
                None
            }
        }))
    }

    fn selected_release(&self, module: &ModuleName) -> Option<Release> {
        let version = self.selections.get(module)?;
        self.catalog.release(module, version)
    }
}

fn missing_release(module: &ModuleName, version: &Version) -> ResolveError {
    ResolveError::Catalog(ForgeError::MalformedRelease {
        module: module.to_string(),
        version: version.to_string(),
        reason: "release vanished from the catalog".to_string(),
    })
}
