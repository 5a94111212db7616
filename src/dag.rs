//! Arrow dependency graph.
//!
//! Maps each arrow id to the set of arrows currently blocking it. Inserting
//! an arrow touches both sides of the relation: the new node gets its
//! blocker set, and every arrow whose ray the new one lands on gains the new
//! arrow as a blocker. The graph stays acyclic because every insertion is
//! vetted by `would_create_cycle` first; an acyclic blocking relation is
//! exactly "a total removal order exists", so keeping the check is what
//! makes generated levels solvable.

use std::collections::{HashMap, HashSet, VecDeque};

#[derive(Debug, Default, Clone)]
pub struct DependencyGraph {
    edges: HashMap<String, HashSet<String>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn blockers_of(&self, id: &str) -> Option<&HashSet<String>> {
        self.edges.get(id)
    }

    /// Records a new node with its blocker set, and the new node as a fresh
    /// blocker of each of its dependents. The caller must have checked
    /// `would_create_cycle` for this exact edge set beforehand.
    pub fn add_arrow(&mut self, id: &str, blockers: &HashSet<String>, dependents: &HashSet<String>) {
        self.edges.insert(id.to_string(), blockers.clone());
        for dependent in dependents {
            self.edges
                .entry(dependent.clone())
                .or_default()
                .insert(id.to_string());
        }
    }

    /// Would inserting the candidate close a cycle? The new edges run from
    /// the candidate to each blocker and from each dependent to the
    /// candidate, so a cycle appears exactly when some blocker already
    /// reaches the candidate or one of its dependents through existing
    /// edges (an arrow that is both blocker and dependent is the degenerate
    /// two-node case).
    pub fn would_create_cycle(
        &self,
        candidate: &str,
        blockers: &HashSet<String>,
        dependents: &HashSet<String>,
    ) -> bool {
        let targets: HashSet<&str> = dependents
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(candidate))
            .collect();
        if blockers.iter().any(|b| targets.contains(b.as_str())) {
            return true;
        }

        // Multi-source DFS from the blockers; an explicit stack so deep
        // chains on large boards cannot overflow the call stack.
        let mut visited: HashSet<&str> = HashSet::new();
        let mut stack: Vec<&str> = blockers.iter().map(String::as_str).collect();

        while let Some(node) = stack.pop() {
            if targets.contains(node) {
                return true;
            }
            if !visited.insert(node) {
                continue;
            }
            if let Some(next) = self.edges.get(node) {
                stack.extend(next.iter().map(String::as_str));
            }
        }
        false
    }

    /// Longest dependency chain, via Kahn's algorithm. Free arrows sit at
    /// depth 0; each dependent is one deeper than its deepest blocker.
    pub fn depth(&self) -> usize {
        if self.edges.is_empty() {
            return 0;
        }

        // Reverse adjacency: blocker -> arrows it blocks. Edges to ids
        // outside the graph (should not happen) are ignored.
        let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();
        let mut in_degree: HashMap<&str, usize> = HashMap::new();
        for (id, blockers) in &self.edges {
            let known = blockers
                .iter()
                .filter(|b| self.edges.contains_key(*b))
                .count();
            in_degree.insert(id.as_str(), known);
            for blocker in blockers {
                if let Some((key, _)) = self.edges.get_key_value(blocker) {
                    dependents.entry(key.as_str()).or_default().push(id.as_str());
                }
            }
        }

        let mut queue: VecDeque<&str> = in_degree
            .iter()
            .filter(|(_, deg)| **deg == 0)
            .map(|(id, _)| *id)
            .collect();
        let mut depth: HashMap<&str, usize> = self.edges.keys().map(|id| (id.as_str(), 0)).collect();
        let mut max_depth = 0;

        while let Some(current) = queue.pop_front() {
            let current_depth = depth[current];
            max_depth = max_depth.max(current_depth);
            if let Some(deps) = dependents.get(current) {
                for &dep in deps {
                    let d = depth.get_mut(dep).unwrap();
                    *d = (*d).max(current_depth + 1);
                    let deg = in_degree.get_mut(dep).unwrap();
                    *deg -= 1;
                    if *deg == 0 {
                        queue.push_back(dep);
                    }
                }
            }
        }

        max_depth
    }
}
