//! Demand graph implementation using petgraph
//!
//! Nodes are the install request plus every module discovered so far. An
//! edge `a -> b` is a demand: release `a@v` (or the request) requires a
//! version of `b` matching a constraint. Edges are only ever added, so the
//! demand set of a module grows monotonically; which demands are *active*
//! depends on the versions currently selected for their requesters.

use std::collections::{HashMap, HashSet, VecDeque};

use indexmap::{IndexMap, IndexSet};
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use modforge_core::types::{ModuleName, Release, Version, VersionReq};

use crate::conflict::{Demand, Requester};

/// Node in the demand graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DemandNode {
    /// The install request
    Request,
    /// A module of the closure
    Module(ModuleName),
}

/// Edge in the demand graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemandEdge {
    /// Version of the requesting module that declares this demand, `None`
    /// for demands of the install request
    pub requester_version: Option<Version>,
    /// Constraint on the target module
    pub constraint: VersionReq,
}

/// Graph of every demand discovered during one resolution
#[derive(Debug)]
pub struct DemandGraph {
    graph: DiGraph<DemandNode, DemandEdge>,
    request: NodeIndex,
    /// Module nodes in discovery order
    modules: IndexMap<ModuleName, NodeIndex>,
    /// Releases whose dependencies are already recorded
    expanded: HashSet<(ModuleName, Version)>,
}

impl DemandGraph {
    /// Create a graph holding only the request node
    pub fn new() -> Self {
        let mut graph = DiGraph::new();
        let request = graph.add_node(DemandNode::Request);
        Self {
            graph,
            request,
            modules: IndexMap::new(),
            expanded: HashSet::new(),
        }
    }

    /// Node of a module, added on first sight
    pub fn add_module(&mut self, module: &ModuleName) -> NodeIndex {
        if let Some(index) = self.modules.get(module) {
            return *index;
        }
        let index = self.graph.add_node(DemandNode::Module(module.clone()));
        self.modules.insert(module.clone(), index);
        index
    }

    /// Record a demand of the install request
    pub fn add_root_demand(&mut self, module: &ModuleName, constraint: VersionReq) {
        let target = self.add_module(module);
        self.graph.add_edge(
            self.request,
            target,
            DemandEdge {
                requester_version: None,
                constraint,
            },
        );
    }

    /// Record the dependencies of a release once
    ///
    /// Returns `false` when the release was already expanded.
    pub fn expand(&mut self, release: &Release) -> bool {
        let key = (release.module.clone(), release.version.clone());
        if !self.expanded.insert(key) {
            return false;
        }

        let source = self.add_module(&release.module);
        for dependency in &release.dependencies {
            let target = self.add_module(&dependency.name);
            self.graph.add_edge(
                source,
                target,
                DemandEdge {
                    requester_version: Some(release.version.clone()),
                    constraint: dependency.version_req.clone(),
                },
            );
        }
        true
    }

    /// Modules in discovery order
    pub fn modules(&self) -> impl Iterator<Item = &ModuleName> {
        self.modules.keys()
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    pub fn demand_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Modules reachable from the request through active demands
    ///
    /// A demand is followed when its requester is the request, or when its
    /// requester is selected at exactly the version that declared it.
    /// Returned in breadth-first order.
    pub fn reachable(&self, selections: &HashMap<ModuleName, Version>) -> IndexSet<ModuleName> {
        let mut reached = IndexSet::new();
        let mut queue = VecDeque::from([self.request]);

        while let Some(node) = queue.pop_front() {
            for edge in self.ordered_edges(node, Direction::Outgoing) {
                let weight = &self.graph[edge];
                if !self.is_active_from(node, weight, selections) {
                    continue;
                }
                let Some((_, target)) = self.graph.edge_endpoints(edge) else {
                    continue;
                };
                if let DemandNode::Module(module) = &self.graph[target] {
                    if reached.insert(module.clone()) {
                        queue.push_back(target);
                    }
                }
            }
        }

        reached
    }

    /// Demands on `module` whose requester is the request or is selected at
    /// the declaring version, in the order they were discovered
    pub fn active_demands(
        &self,
        module: &ModuleName,
        selections: &HashMap<ModuleName, Version>,
    ) -> Vec<Demand> {
        self.demands_where(module, |source, weight| {
            self.is_active_from(source, weight, selections)
        })
    }

    /// Every demand ever recorded on `module`, whichever release declared it
    pub fn all_demands(&self, module: &ModuleName) -> Vec<Demand> {
        self.demands_where(module, |_, _| true)
    }

    fn demands_where<F>(&self, module: &ModuleName, keep: F) -> Vec<Demand>
    where
        F: Fn(NodeIndex, &DemandEdge) -> bool,
    {
        let Some(&target) = self.modules.get(module) else {
            return Vec::new();
        };

        self.ordered_edges(target, Direction::Incoming)
            .into_iter()
            .filter_map(|edge| {
                let (source, _) = self.graph.edge_endpoints(edge)?;
                let weight = &self.graph[edge];
                if !keep(source, weight) {
                    return None;
                }
                let requester = match (&self.graph[source], &weight.requester_version) {
                    (DemandNode::Module(module), Some(version)) => Requester::Release {
                        module: module.clone(),
                        version: version.clone(),
                    },
                    _ => Requester::Request,
                };
                Some(Demand::new(requester, weight.constraint.clone()))
            })
            .collect()
    }

    fn is_active_from(
        &self,
        source: NodeIndex,
        weight: &DemandEdge,
        selections: &HashMap<ModuleName, Version>,
    ) -> bool {
        match &self.graph[source] {
            DemandNode::Request => true,
            DemandNode::Module(module) => {
                weight.requester_version.is_some()
                    && selections.get(module) == weight.requester_version.as_ref()
            },
        }
    }

    /// Edges of a node in insertion order
    fn ordered_edges(&self, node: NodeIndex, direction: Direction) -> Vec<EdgeIndex> {
        let mut edges: Vec<EdgeIndex> = self
            .graph
            .edges_directed(node, direction)
            .map(|edge| edge.id())
            .collect();
        edges.sort();
        edges
    }
}

impl Default for DemandGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modforge_core::types::{ArchiveRef, Dependency};

    fn name(raw: &str) -> ModuleName {
        ModuleName::parse(raw).unwrap()
    }

    fn release(module: &str, version: Version, deps: &[(&str, &str)]) -> Release {
        deps.iter().fold(
            Release::new(name(module), version, ArchiveRef::new("/archive.tar.gz")),
            |release, (dep, req)| {
                release.with_dependency(Dependency::new(name(dep), VersionReq::parse(req).unwrap()))
            },
        )
    }

    #[test]
    fn test_demand_graph_creation() {
        let graph = DemandGraph::new();
        assert_eq!(graph.module_count(), 0);
        assert_eq!(graph.demand_count(), 0);
    }

    #[test]
    fn test_add_module_is_idempotent() {
        let mut graph = DemandGraph::new();
        let first = graph.add_module(&name("acme-base"));
        let second = graph.add_module(&name("acme/base"));
        assert_eq!(first, second);
        assert_eq!(graph.module_count(), 1);
    }

    #[test]
    fn test_expand_once() {
        let mut graph = DemandGraph::new();
        let apollo = release(
            "pmtacceptance-apollo",
            Version::new(0, 0, 2),
            &[("pmtacceptance-java", ">= 1.7.0"), ("pmtacceptance-stdlib", ">= 1.0.0")],
        );

        assert!(graph.expand(&apollo));
        assert!(!graph.expand(&apollo));
        assert_eq!(graph.demand_count(), 2);

        let modules: Vec<String> = graph.modules().map(|m| m.to_string()).collect();
        assert_eq!(
            modules,
            vec!["pmtacceptance-apollo", "pmtacceptance-java", "pmtacceptance-stdlib"]
        );
    }

    #[test]
    fn test_reachability_follows_selected_versions() {
        let mut graph = DemandGraph::new();
        graph.add_root_demand(&name("acme-app"), VersionReq::any());
        graph.expand(&release("acme-app", Version::new(1, 0, 0), &[("acme-old", "*")]));
        graph.expand(&release("acme-app", Version::new(2, 0, 0), &[("acme-new", "*")]));

        let mut selections = HashMap::new();
        selections.insert(name("acme-app"), Version::new(2, 0, 0));

        let reached = graph.reachable(&selections);
        assert!(reached.contains(&name("acme-app")));
        assert!(reached.contains(&name("acme-new")));
        assert!(!reached.contains(&name("acme-old")));

        selections.clear();
        let reached = graph.reachable(&selections);
        assert_eq!(reached.len(), 1);
    }

    #[test]
    fn test_active_demands_in_discovery_order() {
        let mut graph = DemandGraph::new();
        graph.add_root_demand(&name("pmtacceptance-apollo"), VersionReq::parse("0.0.1").unwrap());
        graph.expand(&release(
            "pmtacceptance-apollo",
            Version::new(0, 0, 1),
            &[("pmtacceptance-java", "1.7.1"), ("pmtacceptance-stdlib", "0.0.1")],
        ));
        graph.expand(&release(
            "pmtacceptance-java",
            Version::new(1, 7, 1),
            &[("pmtacceptance-stdlib", "1.0.0")],
        ));

        let mut selections = HashMap::new();
        selections.insert(name("pmtacceptance-apollo"), Version::new(0, 0, 1));
        selections.insert(name("pmtacceptance-java"), Version::new(1, 7, 1));
        assert!(graph
            .reachable(&selections)
            .contains(&name("pmtacceptance-stdlib")));

        let demands = graph.active_demands(&name("pmtacceptance-stdlib"), &selections);
        assert_eq!(demands.len(), 2);
        assert_eq!(
            demands[0].requester,
            Requester::Release {
                module: name("pmtacceptance-apollo"),
                version: Version::new(0, 0, 1)
            }
        );
        assert_eq!(demands[1].constraint.as_str(), "1.0.0");

        // java deselected: its demand on stdlib goes quiet but stays recorded
        selections.remove(&name("pmtacceptance-java"));
        let demands = graph.active_demands(&name("pmtacceptance-stdlib"), &selections);
        assert_eq!(demands.len(), 1);
        assert_eq!(graph.all_demands(&name("pmtacceptance-stdlib")).len(), 2);
    }

    #[test]
    fn test_root_demand_is_always_active() {
        let mut graph = DemandGraph::new();
        graph.add_root_demand(&name("acme-base"), VersionReq::parse(">= 1.0.0").unwrap());

        let demands = graph.active_demands(&name("acme-base"), &HashMap::new());
        assert_eq!(
            demands,
            vec![Demand::new(Requester::Request, VersionReq::parse(">= 1.0.0").unwrap())]
        );
        assert!(graph
            .active_demands(&name("acme-unknown"), &HashMap::new())
            .is_empty());
    }
}
