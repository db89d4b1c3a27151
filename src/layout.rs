use std::collections::HashMap;

use crate::config::TreeConfig;
use crate::forest::{Forest, ROOT};
use crate::graph::PersonIndex;

/// A person with computed layout coordinates. Mutated in place through the
/// positioner and collision resolver, read-only once links are built.
#[derive(Debug, Clone)]
pub struct LaidNode {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub depth: u32,
    pub generation: i32,
}

/// All laid-out nodes for one pass, with an id lookup.
#[derive(Debug, Default)]
pub struct LaidOut {
    pub nodes: Vec<LaidNode>,
    slot_of: HashMap<String, usize>,
}

impl LaidOut {
    pub fn get(&self, id: &str) -> Option<&LaidNode> {
        self.slot_of.get(id).map(|&slot| &self.nodes[slot])
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut LaidNode> {
        match self.slot_of.get(id) {
            Some(&slot) => Some(&mut self.nodes[slot]),
            None => None,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.slot_of.contains_key(id)
    }

    fn push(&mut self, node: LaidNode) {
        self.slot_of.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
    }
}

/// Horizontal extent of one subtree, per depth level relative to its root.
type Contour = Vec<(f32, f32)>;

/// Tidy-tree initial placement: bottom-up contour merge with a custom
/// separation function, top-down nothing to do since shifts are applied
/// directly to the pre-order arena ranges. Afterwards every y is overwritten
/// by `generation * row_height`, which deliberately overrides tree depth so
/// same-generation people share a row even when re-marriages or missing links
/// shift their subtree depth.
pub fn run(forest: &Forest, index: &PersonIndex, config: &TreeConfig) -> LaidOut {
    let mut engine = Walker {
        forest,
        config,
        sizes: subtree_sizes(forest),
        leaves: leaf_counts(forest),
        xs: vec![0.0; forest.nodes.len()],
    };
    engine.place(ROOT);

    let mut out = LaidOut::default();
    for (slot, node) in forest.nodes.iter().enumerate() {
        if node.is_synthetic() {
            continue;
        }
        let generation = index.generation(&node.id);
        out.push(LaidNode {
            id: node.id.clone(),
            x: engine.xs[slot],
            y: generation as f32 * config.row_height,
            depth: node.depth,
            generation,
        });
    }
    out
}

struct Walker<'a> {
    forest: &'a Forest,
    config: &'a TreeConfig,
    /// Pre-order subtree sizes; subtree of `slot` is the arena range
    /// `slot..slot + sizes[slot]`.
    sizes: Vec<usize>,
    leaves: Vec<usize>,
    xs: Vec<f32>,
}

impl Walker<'_> {
    fn place(&mut self, slot: usize) -> Contour {
        let children = self.forest.nodes[slot].children.clone();
        if children.is_empty() {
            self.xs[slot] = 0.0;
            return vec![(0.0, 0.0)];
        }

        let mut merged = self.place(children[0]);
        for pair in children.windows(2) {
            let (prev, child) = (pair[0], pair[1]);
            let mut contour = self.place(child);

            // Push the new subtree right until every overlapping depth level
            // clears the accumulated contour by the separation distance.
            let mut shift = 0.0f32;
            for (level, &(child_min, _)) in contour.iter().enumerate() {
                let Some(&(_, merged_max)) = merged.get(level) else {
                    break;
                };
                let sep = self.separation(prev, child, level == 0);
                shift = shift.max(merged_max + sep - child_min);
            }

            let start = child;
            for x in &mut self.xs[start..start + self.sizes[child]] {
                *x += shift;
            }
            for level in 0..contour.len() {
                contour[level].0 += shift;
                contour[level].1 += shift;
                match merged.get_mut(level) {
                    Some(entry) => {
                        entry.0 = entry.0.min(contour[level].0);
                        entry.1 = entry.1.max(contour[level].1);
                    }
                    None => merged.push(contour[level]),
                }
            }
        }

        let first = self.xs[children[0]];
        let last = self.xs[*children.last().unwrap()];
        self.xs[slot] = (first + last) / 2.0;

        let mut contour = vec![(self.xs[slot], self.xs[slot])];
        contour.extend(merged);
        contour
    }

    /// Separation between two adjacent subtree roots. Siblings sit closer;
    /// wide subtrees (many leaf descendants) push apart more, capped so huge
    /// branches stay bounded; depth falloff narrows deeply nested levels.
    fn separation(&self, a: usize, b: usize, siblings: bool) -> f32 {
        let leaves = (self.leaves[a] + self.leaves[b]).min(16) as f32;
        let depth = self.forest.nodes[a].depth.min(self.forest.nodes[b].depth);
        let base = if siblings { 1.0 } else { 1.4 };
        self.config.h_spacing * base * (1.0 + leaves / 8.0) * self.config.depth_falloff(depth)
    }
}

fn subtree_sizes(forest: &Forest) -> Vec<usize> {
    let mut sizes = vec![1usize; forest.nodes.len()];
    // Children always have higher arena indices than their parent.
    for slot in (0..forest.nodes.len()).rev() {
        for &child in &forest.nodes[slot].children {
            sizes[slot] += sizes[child];
        }
    }
    sizes
}

fn leaf_counts(forest: &Forest) -> Vec<usize> {
    let mut leaves = vec![0usize; forest.nodes.len()];
    for slot in (0..forest.nodes.len()).rev() {
        let node = &forest.nodes[slot];
        if node.children.is_empty() {
            leaves[slot] = 1;
        } else {
            leaves[slot] = node.children.iter().map(|&c| leaves[c]).sum();
        }
    }
    leaves
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{dataset, parent_child, person};

    fn lay(data: &crate::model::Dataset, config: &TreeConfig) -> LaidOut {
        let index = PersonIndex::build(data);
        let forest = Forest::build(&index);
        run(&forest, &index, config)
    }

    #[test]
    fn y_is_a_strict_function_of_generation() {
        let config = TreeConfig::default();
        let data = dataset(
            vec![
                person("a", 0),
                person("b", 1),
                person("c", 1),
                person("d", 3),
            ],
            vec![
                parent_child("b", &["a"]),
                parent_child("c", &["a"]),
                // d is structurally at depth 3 in the forest but generation 3
                // regardless; depth and generation diverge on purpose.
                parent_child("d", &["c"]),
            ],
        );
        let out = lay(&data, &config);
        for node in &out.nodes {
            assert_eq!(node.y, node.generation as f32 * config.row_height);
        }
        assert_eq!(out.get("d").unwrap().y, 3.0 * config.row_height);
    }

    #[test]
    fn siblings_keep_declaration_independent_sorted_order() {
        let config = TreeConfig::default();
        let data = dataset(
            vec![
                person("root", 0),
                person("x", 1),
                person("y", 1),
                person("z", 1),
            ],
            vec![
                parent_child("z", &["root"]),
                parent_child("x", &["root"]),
                parent_child("y", &["root"]),
            ],
        );
        let out = lay(&data, &config);
        let (x, y, z) = (
            out.get("x").unwrap().x,
            out.get("y").unwrap().x,
            out.get("z").unwrap().x,
        );
        assert!(x < y && y < z);
        // Parent centered over its children.
        let root = out.get("root").unwrap().x;
        assert!((root - (x + z) / 2.0).abs() < 1e-3);
    }

    #[test]
    fn rerun_is_idempotent() {
        let config = TreeConfig::default();
        let data = dataset(
            vec![
                person("a", 0),
                person("b", 1),
                person("c", 1),
                person("d", 2),
            ],
            vec![
                parent_child("b", &["a"]),
                parent_child("c", &["a"]),
                parent_child("d", &["b"]),
            ],
        );
        let first = lay(&data, &config);
        let second = lay(&data, &config);
        for node in &first.nodes {
            let again = second.get(&node.id).unwrap();
            assert_eq!(node.x, again.x);
            assert_eq!(node.y, again.y);
        }
    }

    #[test]
    fn deep_trees_narrow_with_depth_falloff() {
        let config = TreeConfig::default();
        // Two sibling pairs, one at depth 1 and one at depth 4.
        let data = dataset(
            vec![
                person("r", 0),
                person("s1", 1),
                person("s2", 1),
                person("m", 1),
                person("n", 2),
                person("o", 3),
                person("d1", 4),
                person("d2", 4),
            ],
            vec![
                parent_child("s1", &["r"]),
                parent_child("s2", &["r"]),
                parent_child("m", &["r"]),
                parent_child("n", &["m"]),
                parent_child("o", &["n"]),
                parent_child("d1", &["o"]),
                parent_child("d2", &["o"]),
            ],
        );
        let out = lay(&data, &config);
        let shallow = (out.get("s1").unwrap().x - out.get("s2").unwrap().x).abs();
        let deep = (out.get("d1").unwrap().x - out.get("d2").unwrap().x).abs();
        assert!(deep < shallow);
    }
}
