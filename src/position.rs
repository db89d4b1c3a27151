use std::collections::HashMap;

use crate::config::TreeConfig;
use crate::graph::PersonIndex;
use crate::layout::LaidOut;
use crate::model::pair_key;

/// Synthetic union point for a two-parent couple: the parent midpoint at the
/// couple's shared row. Exists only when both parents are laid out.
#[derive(Debug, Clone, Copy)]
pub struct Hub {
    pub x: f32,
    pub y: f32,
}

/// Output of the positioner: hubs keyed by couple pair key, plus the
/// hub-derived target x recorded per person. Targets anchor collision units
/// independent of where the parents themselves end up after resolution.
#[derive(Debug, Default)]
pub struct Placement {
    pub hubs: HashMap<(String, String), Hub>,
    pub targets: HashMap<String, f32>,
}

/// Pull spouses onto shared rows, center sibling groups under their parent
/// centroid, and record union hubs for two-parent couples.
pub fn apply(out: &mut LaidOut, index: &PersonIndex, config: &TreeConfig) -> Placement {
    let mut placement = Placement::default();

    pull_spouses(out, index, config);
    center_sibling_groups(out, index, config, &mut placement);
    record_hubs(out, index, &mut placement);

    placement
}

fn pull_spouses(out: &mut LaidOut, index: &PersonIndex, config: &TreeConfig) {
    let mut pairs: Vec<&(String, String)> = index.spouse_pairs().collect();
    pairs.sort();

    for (a, b) in pairs {
        let (Some(na), Some(nb)) = (out.get(a), out.get(b)) else {
            continue;
        };
        let (gen_a, gen_b) = (na.generation, nb.generation);
        let depth = na.depth.min(nb.depth);

        if gen_a != gen_b {
            // Snap to the mean generation when it lands on a whole row;
            // otherwise leave the pair where the layout put them.
            if (gen_a + gen_b) % 2 != 0 {
                continue;
            }
            let mean = (gen_a + gen_b) / 2;
            for id in [a, b] {
                let node = out.get_mut(id).unwrap();
                node.generation = mean;
                node.y = mean as f32 * config.row_height;
            }
        }

        let (xa, xb) = (out.get(a).unwrap().x, out.get(b).unwrap().x);
        let mid = (xa + xb) / 2.0;
        let half = config.spouse_gap * config.depth_falloff(depth) / 2.0;
        let (left, right) = if xa <= xb { (a, b) } else { (b, a) };
        out.get_mut(left).unwrap().x = mid - half;
        out.get_mut(right).unwrap().x = mid + half;
    }
}

/// Key identifying one sibling group: the exact (one or two person) parent
/// set, order-independent.
fn group_key(parents: &[String]) -> (String, String) {
    match parents {
        [single] => (single.clone(), String::new()),
        [a, b, ..] => pair_key(a, b),
        [] => (String::new(), String::new()),
    }
}

fn center_sibling_groups(
    out: &mut LaidOut,
    index: &PersonIndex,
    config: &TreeConfig,
    placement: &mut Placement,
) {
    let mut groups: HashMap<(String, String), Vec<String>> = HashMap::new();
    for id in index.ids_in_order() {
        if !out.contains(id) {
            continue;
        }
        let parents: Vec<String> = index
            .parents_of(id)
            .iter()
            .take(2)
            .filter(|p| out.contains(p))
            .cloned()
            .collect();
        if parents.is_empty() {
            continue;
        }
        groups.entry(group_key(&parents)).or_default().push(id.clone());
    }

    let mut keys: Vec<&(String, String)> = groups.keys().collect();
    keys.sort();

    for key in keys {
        let children = &groups[key];
        let parent_ids: Vec<&str> = if key.1.is_empty() {
            vec![key.0.as_str()]
        } else {
            vec![key.0.as_str(), key.1.as_str()]
        };

        let centroid = parent_ids
            .iter()
            .filter_map(|p| out.get(p))
            .map(|n| n.x)
            .sum::<f32>()
            / parent_ids.len() as f32;
        let parent_gen = parent_ids
            .iter()
            .filter_map(|p| out.get(p))
            .map(|n| n.generation)
            .max()
            .unwrap_or(0);

        let mut ordered = children.clone();
        ordered.sort_by(|a, b| {
            let xa = out.get(a).map(|n| n.x).unwrap_or(0.0);
            let xb = out.get(b).map(|n| n.x).unwrap_or(0.0);
            xa.partial_cmp(&xb)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.cmp(b))
        });

        let count = ordered.len() as f32;
        for (i, child) in ordered.iter().enumerate() {
            let slot_x = centroid + (i as f32 - (count - 1.0) / 2.0) * config.sibling_gap;
            let node = out.get_mut(child).unwrap();
            node.x = slot_x;
            node.generation = parent_gen + 1;
            node.y = node.generation as f32 * config.row_height;
            placement.targets.insert(child.clone(), slot_x);
        }
    }
}

fn record_hubs(out: &LaidOut, index: &PersonIndex, placement: &mut Placement) {
    let mut couples: Vec<(String, String)> = Vec::new();
    for id in index.ids_in_order() {
        let parents = index.parents_of(id);
        if parents.len() >= 2 {
            couples.push(pair_key(&parents[0], &parents[1]));
        }
    }
    couples.sort();
    couples.dedup();

    for (a, b) in couples {
        let (Some(na), Some(nb)) = (out.get(&a), out.get(&b)) else {
            continue;
        };
        placement.hubs.insert(
            pair_key(&a, &b),
            Hub {
                x: (na.x + nb.x) / 2.0,
                y: na.y.max(nb.y),
            },
        );
    }
}
