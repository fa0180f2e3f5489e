use std::collections::HashMap;

use crate::module_system::manifest::ModuleManifest;

/// A problem found while resolving the dependency graph. Each issue names
/// the modules dropped because of it; they are resolution errors, not load
/// errors.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphIssue {
    /// A module declared a dependency no discovered module provides
    MissingDependency { module: String, dependency: String },
    /// A dependency cycle; every member is dropped
    Cycle { detected_in: String, members: Vec<String> },
}

/// Result of graph resolution: the surviving modules in dependency-first
/// order, plus every issue found on the way.
#[derive(Debug, Clone)]
pub struct GraphResolution {
    pub order: Vec<ModuleManifest>,
    pub issues: Vec<GraphIssue>,
}

/// The "depends-on" graph over discovered module manifests.
///
/// Nodes keep discovery order, which breaks ties among independent modules
/// so the load order stays deterministic.
#[derive(Debug, Default)]
pub struct ModuleGraph {
    nodes: Vec<ModuleManifest>,
    index: HashMap<String, usize>,
}

impl ModuleGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a manifest, preserving discovery order. Returns `false` when a
    /// module with the same name is already present (the caller reports the
    /// conflict).
    pub fn insert(&mut self, manifest: ModuleManifest) -> bool {
        if self.index.contains_key(&manifest.name) {
            return false;
        }
        self.index.insert(manifest.name.clone(), self.nodes.len());
        self.nodes.push(manifest);
        true
    }

    pub fn get(&self, name: &str) -> Option<&ModuleManifest> {
        self.index.get(name).map(|&i| &self.nodes[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Validate dependencies, detect cycles and compute the load order.
    ///
    /// A module with an undeclared dependency is dropped. Cycles are found
    /// by depth-first traversal with a "visiting" marker; a back-edge to a
    /// node still being visited closes a cycle and drops every module on
    /// it. The remaining DAG is ordered dependency-first.
    pub fn resolve(&self) -> GraphResolution {
        let count = self.nodes.len();
        let mut issues = Vec::new();
        let mut dropped = vec![false; count];

        for (i, node) in self.nodes.iter().enumerate() {
            for dependency in &node.dependencies {
                if !self.index.contains_key(dependency) {
                    issues.push(GraphIssue::MissingDependency {
                        module: node.name.clone(),
                        dependency: dependency.clone(),
                    });
                    dropped[i] = true;
                }
            }
        }

        let mut color = vec![Color::White; count];
        let mut stack = Vec::new();
        for start in 0..count {
            if !dropped[start] && color[start] == Color::White {
                self.visit(start, &mut color, &mut stack, &mut dropped, &mut issues);
            }
        }

        GraphResolution { order: self.topological_order(&dropped), issues }
    }

    fn visit(
        &self,
        node: usize,
        color: &mut [Color],
        stack: &mut Vec<usize>,
        dropped: &mut [bool],
        issues: &mut Vec<GraphIssue>,
    ) {
        color[node] = Color::Visiting;
        stack.push(node);

        for dependency in &self.nodes[node].dependencies {
            let Some(&next) = self.index.get(dependency) else { continue };
            if dropped[next] {
                continue;
            }
            match color[next] {
                Color::White => self.visit(next, color, stack, dropped, issues),
                Color::Visiting => {
                    // Back-edge: the cycle is the stack suffix starting at
                    // the revisited node.
                    let pos = stack
                        .iter()
                        .position(|&s| s == next)
                        .expect("visiting node is on the stack");
                    let members: Vec<usize> = stack[pos..].to_vec();
                    issues.push(GraphIssue::Cycle {
                        detected_in: self.nodes[next].name.clone(),
                        members: members.iter().map(|&m| self.nodes[m].name.clone()).collect(),
                    });
                    for &member in &members {
                        dropped[member] = true;
                    }
                }
                Color::Done => {}
            }
        }

        stack.pop();
        color[node] = Color::Done;
    }

    /// Kahn's algorithm over the surviving nodes; at every step the
    /// earliest-discovered ready module goes next.
    fn topological_order(&self, dropped: &[bool]) -> Vec<ModuleManifest> {
        let count = self.nodes.len();
        let mut in_degree = vec![0usize; count];
        for (i, node) in self.nodes.iter().enumerate() {
            if dropped[i] {
                continue;
            }
            for dependency in &node.dependencies {
                if let Some(&dep) = self.index.get(dependency) {
                    if !dropped[dep] {
                        in_degree[i] += 1;
                    }
                }
            }
        }

        let mut placed = vec![false; count];
        let mut order = Vec::new();
        loop {
            let Some(next) = (0..count)
                .find(|&i| !dropped[i] && !placed[i] && in_degree[i] == 0)
            else {
                break;
            };
            placed[next] = true;
            order.push(self.nodes[next].clone());

            let next_name = &self.nodes[next].name;
            for (i, node) in self.nodes.iter().enumerate() {
                if dropped[i] || placed[i] {
                    continue;
                }
                for dependency in &node.dependencies {
                    if dependency == next_name {
                        in_degree[i] -= 1;
                    }
                }
            }
        }
        order
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Visiting,
    Done,
}
