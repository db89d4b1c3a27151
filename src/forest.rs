use std::collections::{HashMap, HashSet};

use crate::graph::PersonIndex;

/// One node in the layout forest. Index 0 is always the synthetic root, which
/// owns no person and binds every top-level root under one hierarchy.
#[derive(Debug, Clone)]
pub struct ForestNode {
    /// Person id; empty for the synthetic root.
    pub id: String,
    pub children: Vec<usize>,
    pub depth: u32,
}

impl ForestNode {
    pub fn is_synthetic(&self) -> bool {
        self.id.is_empty()
    }
}

/// Single-parent acyclic reduction of the relationship graph, built for
/// hierarchical layout. Arena-indexed; every person is materialized at most
/// once, so malformed cyclic input truncates to childless leaves instead of
/// recursing forever or duplicating people under multiple fallback roots.
#[derive(Debug)]
pub struct Forest {
    pub nodes: Vec<ForestNode>,
}

pub const ROOT: usize = 0;

impl Forest {
    pub fn build(index: &PersonIndex) -> Self {
        let mut structural_children: HashMap<&str, Vec<&str>> = HashMap::new();
        let mut non_roots: HashSet<&str> = HashSet::new();

        for id in index.ids_in_order() {
            // The structural parent is purely the first declared parent that
            // exists in the person set; spouse edges are never structural.
            if let Some(parent) = index.parents_of(id).first() {
                structural_children
                    .entry(parent.as_str())
                    .or_default()
                    .push(id.as_str());
                non_roots.insert(id.as_str());
            }
        }

        for children in structural_children.values_mut() {
            sort_people(children, index);
        }

        let mut roots: Vec<&str> = index
            .ids_in_order()
            .iter()
            .map(String::as_str)
            .filter(|id| !non_roots.contains(id))
            .collect();

        if roots.is_empty() && !index.is_empty() {
            // Every person resolved as someone's child, which implies a cycle.
            // Fall back to everyone at the globally minimum generation.
            let min_gen = index
                .ids_in_order()
                .iter()
                .map(|id| index.generation(id))
                .min()
                .unwrap_or(0);
            roots = index
                .ids_in_order()
                .iter()
                .map(String::as_str)
                .filter(|id| index.generation(id) == min_gen)
                .collect();
        }
        sort_people(&mut roots, index);

        let mut forest = Forest {
            nodes: vec![ForestNode {
                id: String::new(),
                children: Vec::new(),
                depth: 0,
            }],
        };

        let mut placed: HashSet<&str> = HashSet::new();
        for root in roots {
            // A fallback root may already sit inside an earlier root's cycle.
            if placed.contains(root) {
                continue;
            }
            let child = forest.grow(root, 1, &structural_children, &mut placed);
            forest.nodes[ROOT].children.push(child);
        }

        forest
    }

    fn grow<'a>(
        &mut self,
        id: &'a str,
        depth: u32,
        structural_children: &HashMap<&str, Vec<&'a str>>,
        placed: &mut HashSet<&'a str>,
    ) -> usize {
        let slot = self.nodes.len();
        self.nodes.push(ForestNode {
            id: id.to_string(),
            children: Vec::new(),
            depth,
        });

        placed.insert(id);
        if let Some(children) = structural_children.get(id) {
            for child_id in children {
                // An id already materialized anywhere means a cycle; the
                // branch becomes a childless leaf.
                if placed.contains(child_id) {
                    continue;
                }
                let child = self.grow(child_id, depth + 1, structural_children, placed);
                self.nodes[slot].children.push(child);
            }
        }

        slot
    }

    /// Number of leaf descendants under a node (a leaf counts itself as 1).
    pub fn leaf_count(&self, slot: usize) -> usize {
        let node = &self.nodes[slot];
        if node.children.is_empty() {
            1
        } else {
            node.children.iter().map(|&c| self.leaf_count(c)).sum()
        }
    }

    pub fn max_depth(&self) -> u32 {
        self.nodes.iter().map(|n| n.depth).max().unwrap_or(0)
    }
}

/// Ascending generation, then family name, then given name, case-insensitive.
fn sort_people(ids: &mut [&str], index: &PersonIndex) {
    ids.sort_by(|a, b| {
        let key = |id: &str| {
            let person = index.person(id);
            (
                person.map(|p| p.generation).unwrap_or(0),
                person
                    .map(|p| p.last_name.to_lowercase())
                    .unwrap_or_default(),
                person
                    .map(|p| p.first_name.to_lowercase())
                    .unwrap_or_default(),
            )
        };
        key(a).cmp(&key(b)).then_with(|| a.cmp(b))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::PersonIndex;
    use crate::testutil::{dataset, named, parent_child, person};

    #[test]
    fn first_existing_parent_is_structural() {
        let data = dataset(
            vec![person("dad", 0), person("mom", 0), person("kid", 1)],
            vec![parent_child("kid", &["ghost", "mom", "dad"])],
        );
        let forest = Forest::build(&PersonIndex::build(&data));

        let mom = forest.nodes.iter().find(|n| n.id == "mom").unwrap();
        let children: Vec<&str> = mom
            .children
            .iter()
            .map(|&c| forest.nodes[c].id.as_str())
            .collect();
        assert_eq!(children, ["kid"]);

        let dad = forest.nodes.iter().find(|n| n.id == "dad").unwrap();
        assert!(dad.children.is_empty());
    }

    #[test]
    fn roots_sorted_by_generation_then_name() {
        let data = dataset(
            vec![
                named("c", 1, "Young", "Zed"),
                named("a", 0, "Smith", "Bea"),
                named("b", 0, "Jones", "Amy"),
            ],
            vec![],
        );
        let forest = Forest::build(&PersonIndex::build(&data));
        let roots: Vec<&str> = forest.nodes[ROOT]
            .children
            .iter()
            .map(|&c| forest.nodes[c].id.as_str())
            .collect();
        assert_eq!(roots, ["b", "a", "c"]);
    }

    #[test]
    fn cycle_falls_back_to_min_generation_and_stays_finite() {
        let data = dataset(
            vec![person("a", 0), person("b", 1)],
            vec![parent_child("b", &["a"]), parent_child("a", &["b"])],
        );
        let forest = Forest::build(&PersonIndex::build(&data));

        // "a" (generation 0) becomes the fallback root; the a -> b -> a edge
        // is truncated, so both appear exactly once.
        assert_eq!(forest.nodes.len(), 3);
        assert!(forest.max_depth() <= 2);
        let mut seen: Vec<&str> = forest
            .nodes
            .iter()
            .skip(1)
            .map(|n| n.id.as_str())
            .collect();
        seen.sort();
        assert_eq!(seen, ["a", "b"]);
    }

    #[test]
    fn same_generation_cycle_materializes_each_person_once() {
        // Both cycle members survive the min-generation fallback as roots;
        // the second root must not regrow the cycle it already sits in.
        let data = dataset(
            vec![person("a", 0), person("b", 0)],
            vec![parent_child("b", &["a"]), parent_child("a", &["b"])],
        );
        let forest = Forest::build(&PersonIndex::build(&data));

        let mut seen: Vec<&str> = forest
            .nodes
            .iter()
            .skip(1)
            .map(|n| n.id.as_str())
            .collect();
        seen.sort();
        assert_eq!(seen, ["a", "b"]);
        assert_eq!(forest.nodes[ROOT].children.len(), 1);
    }

    #[test]
    fn self_cycle_becomes_leaf() {
        let data = dataset(
            vec![person("a", 0), person("b", 1), person("c", 2)],
            vec![
                parent_child("b", &["a"]),
                parent_child("c", &["b"]),
                parent_child("a", &["c"]),
            ],
        );
        let forest = Forest::build(&PersonIndex::build(&data));
        assert_eq!(forest.nodes.len(), 4);
        assert!(forest.max_depth() <= 3);
    }

    #[test]
    fn leaf_counts_sum_over_subtrees() {
        let data = dataset(
            vec![
                person("r", 0),
                person("x", 1),
                person("y", 1),
                person("z", 2),
            ],
            vec![
                parent_child("x", &["r"]),
                parent_child("y", &["r"]),
                parent_child("z", &["x"]),
            ],
        );
        let forest = Forest::build(&PersonIndex::build(&data));
        assert_eq!(forest.leaf_count(ROOT), 2);
    }
}
