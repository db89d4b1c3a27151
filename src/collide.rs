use std::collections::{BTreeMap, HashSet};

use crate::config::TreeConfig;
use crate::graph::PersonIndex;
use crate::layout::LaidOut;
use crate::position::Placement;

/// An atomic placement group on one row: a multi-spouse cluster, a couple, or
/// a single person. Members are ordered left to right.
#[derive(Debug, Clone)]
struct Unit {
    members: Vec<String>,
    /// Mean of the members' hub-derived target x, or their current mean x
    /// when no target exists.
    anchor: f32,
    /// Nominal occupied width: spousal gap times (members - 1).
    width: f32,
}

impl Unit {
    fn left(&self, center: f32) -> f32 {
        center - self.width / 2.0
    }

    fn right(&self, center: f32) -> f32 {
        center + self.width / 2.0
    }
}

/// Remove horizontal overlap per row while preserving relative unit order and
/// minimizing drift from anchor targets. Two passes: a left-to-right sweep
/// that pushes units right to enforce the minimum gap, then a right-to-left
/// tightening pass that only ever moves units back left toward their anchors.
pub fn resolve(out: &mut LaidOut, placement: &Placement, index: &PersonIndex, config: &TreeConfig) {
    // Same row means identical y, which is a strict function of generation.
    let mut rows: BTreeMap<i32, Vec<String>> = BTreeMap::new();
    for node in &out.nodes {
        rows.entry(node.generation).or_default().push(node.id.clone());
    }

    for members in rows.values() {
        let mut units = build_units(members, out, placement, index, config);
        let centers = sweep(&mut units, config.min_row_gap);

        for (unit, center) in units.iter().zip(centers.iter()) {
            let left = unit.left(*center);
            for (i, id) in unit.members.iter().enumerate() {
                if let Some(node) = out.get_mut(id) {
                    node.x = left + i as f32 * config.spouse_gap;
                }
            }
        }
    }
}

fn build_units(
    row: &[String],
    out: &LaidOut,
    placement: &Placement,
    index: &PersonIndex,
    config: &TreeConfig,
) -> Vec<Unit> {
    let row_set: HashSet<&str> = row.iter().map(String::as_str).collect();
    let mut by_x: Vec<&String> = row.iter().collect();
    by_x.sort_by(|a, b| {
        let xa = out.get(a).map(|n| n.x).unwrap_or(0.0);
        let xb = out.get(b).map(|n| n.x).unwrap_or(0.0);
        xa.partial_cmp(&xb)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.cmp(b))
    });

    let mut assigned: HashSet<&str> = HashSet::new();
    let mut units: Vec<Unit> = Vec::new();

    // Multi-spouse clusters form first. The center person usually sits to the
    // right of one of their spouses, and letting that spouse pair off as an
    // ordinary couple would split the cluster.
    for id in &by_x {
        if assigned.contains(id.as_str()) {
            continue;
        }
        let same_row_spouses: Vec<&String> = index
            .spouses_of(id)
            .iter()
            .filter(|s| row_set.contains(s.as_str()) && !assigned.contains(s.as_str()))
            .collect();
        if same_row_spouses.len() < 2 {
            continue;
        }

        // Spouses split left/right around the center person by current x.
        let center_x = out.get(id).map(|n| n.x).unwrap_or(0.0);
        let mut left: Vec<&String> = Vec::new();
        let mut right: Vec<&String> = Vec::new();
        for spouse in &same_row_spouses {
            let sx = out.get(spouse).map(|n| n.x).unwrap_or(0.0);
            if sx < center_x {
                left.push(spouse);
            } else {
                right.push(spouse);
            }
        }
        let by_pos = |a: &&String, b: &&String| {
            let xa = out.get(a).map(|n| n.x).unwrap_or(0.0);
            let xb = out.get(b).map(|n| n.x).unwrap_or(0.0);
            xa.partial_cmp(&xb)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.cmp(b))
        };
        left.sort_by(by_pos);
        right.sort_by(by_pos);

        let members: Vec<String> = left
            .into_iter()
            .chain(std::iter::once(*id))
            .chain(right)
            .cloned()
            .collect();
        mark_assigned(&mut assigned, &row_set, &members);
        units.push(make_unit(members, out, placement, config));
    }

    // Couples and singles fill in around the clusters.
    for id in &by_x {
        if assigned.contains(id.as_str()) {
            continue;
        }
        let spouse = index
            .spouses_of(id)
            .iter()
            .find(|s| row_set.contains(s.as_str()) && !assigned.contains(s.as_str()));

        let members: Vec<String> = if let Some(spouse) = spouse {
            let xa = out.get(id).map(|n| n.x).unwrap_or(0.0);
            let xb = out.get(spouse).map(|n| n.x).unwrap_or(0.0);
            if xa <= xb {
                vec![(*id).clone(), spouse.clone()]
            } else {
                vec![spouse.clone(), (*id).clone()]
            }
        } else {
            vec![(*id).clone()]
        };
        mark_assigned(&mut assigned, &row_set, &members);
        units.push(make_unit(members, out, placement, config));
    }

    units.sort_by(|a, b| {
        a.anchor
            .partial_cmp(&b.anchor)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.members[0].cmp(&b.members[0]))
    });
    units
}

/// Row membership is keyed by the interned row strings.
fn mark_assigned<'a>(
    assigned: &mut HashSet<&'a str>,
    row_set: &HashSet<&'a str>,
    members: &[String],
) {
    for member in members {
        if let Some(&name) = row_set.get(member.as_str()) {
            assigned.insert(name);
        }
    }
}

fn make_unit(members: Vec<String>, out: &LaidOut, placement: &Placement, config: &TreeConfig) -> Unit {
    let targets: Vec<f32> = members
        .iter()
        .filter_map(|m| placement.targets.get(m).copied())
        .collect();
    let anchor = if targets.is_empty() {
        members
            .iter()
            .filter_map(|m| out.get(m).map(|n| n.x))
            .sum::<f32>()
            / members.len() as f32
    } else {
        targets.iter().sum::<f32>() / targets.len() as f32
    };

    let width = config.spouse_gap * (members.len() as f32 - 1.0);
    Unit {
        members,
        anchor,
        width,
    }
}

/// Returns the resolved center x per unit, in the given (anchor) order.
fn sweep(units: &mut [Unit], min_gap: f32) -> Vec<f32> {
    let mut centers: Vec<f32> = units.iter().map(|u| u.anchor).collect();

    // Left to right: push right until the minimum gap holds.
    for i in 0..units.len() {
        if i > 0 {
            let floor = units[i - 1].right(centers[i - 1]) + min_gap + units[i].width / 2.0;
            if centers[i] < floor {
                centers[i] = floor;
            }
        }
    }

    // Right to left: tighten back toward anchors. Only ever decreases x, so
    // it can neither reintroduce overlap nor reverse unit order.
    for i in (0..units.len()).rev() {
        let desired = units[i].anchor;
        let floor = if i > 0 {
            units[i - 1].right(centers[i - 1]) + min_gap + units[i].width / 2.0
        } else {
            f32::NEG_INFINITY
        };
        let tightened = desired.max(floor);
        if tightened < centers[i] {
            centers[i] = tightened;
        }
    }

    centers
}
