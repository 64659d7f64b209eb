//! Resolution trees
//!
//! The solver's answer as a tree rooted at the requested module. Every module
//! appears once, under the shallowest release that depends on it; children
//! keep the declaration order of their parent's dependencies.

use std::collections::{HashSet, VecDeque};

use modforge_core::types::{ArchiveRef, ModuleName, Release, Version};

/// One resolved module and the modules placed beneath it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionNode {
    pub module: ModuleName,
    pub version: Version,
    pub archive_ref: ArchiveRef,
    pub children: Vec<ResolutionNode>,
}

impl ResolutionNode {
    /// A node without children
    pub fn leaf(release: &Release) -> Self {
        Self {
            module: release.module.clone(),
            version: release.version.clone(),
            archive_ref: release.archive_ref.clone(),
            children: Vec::new(),
        }
    }

    /// Build the tree for a set of selected releases
    ///
    /// `selected` returns the chosen release of a module. Dependencies without
    /// a selection are skipped.
    pub fn build<F>(root: &Release, selected: F) -> Self
    where
        F: Fn(&ModuleName) -> Option<Release>,
    {
        // Breadth-first placement into an arena; children always land after
        // their parent
        let mut arena: Vec<(Release, Vec<usize>)> = vec![(root.clone(), Vec::new())];
        let mut placed: HashSet<ModuleName> = HashSet::from([root.module.clone()]);
        let mut queue = VecDeque::from([0usize]);

        while let Some(parent) = queue.pop_front() {
            let dependencies = arena[parent].0.dependencies.clone();
            for dependency in dependencies {
                if placed.contains(&dependency.name) {
                    continue;
                }
                let Some(release) = selected(&dependency.name) else {
                    continue;
                };
                placed.insert(dependency.name.clone());
                let index = arena.len();
                arena.push((release, Vec::new()));
                arena[parent].1.push(index);
                queue.push_back(index);
            }
        }

        let mut built: Vec<Option<ResolutionNode>> = vec![None; arena.len()];
        for (index, (release, child_indices)) in arena.iter().enumerate().rev() {
            let mut node = Self::leaf(release);
            node.children = child_indices
                .iter()
                .filter_map(|child| built[*child].take())
                .collect();
            built[index] = Some(node);
        }

        built
            .into_iter()
            .next()
            .flatten()
            .unwrap_or_else(|| Self::leaf(root))
    }

    /// All nodes in pre-order, root first
    pub fn iter(&self) -> impl Iterator<Item = &ResolutionNode> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }

    /// Number of nodes in the tree
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Find the node of a module
    pub fn find(&self, module: &ModuleName) -> Option<&ResolutionNode> {
        self.iter().find(|node| &node.module == module)
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}
