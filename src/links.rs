use crate::config::TreeConfig;
use crate::graph::PersonIndex;
use crate::layout::LaidOut;
use crate::model::pair_key;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    /// Parent(s) to child, drawn as a smooth vertical connector.
    ChildDrop,
    /// Spouse pair on a shared row, drawn as a straight bar.
    SpouseBar,
    /// Spouse pair forced to arch above the row by configuration.
    SpouseArch,
    /// Bar at the hub row for two co-parents with no spouse relationship,
    /// so child connectors still have a visible attachment point.
    UnionBar,
}

/// A renderable edge with resolved endpoint coordinates and the persons it
/// connects (used for kinship highlighting).
#[derive(Debug, Clone)]
pub struct Link {
    pub kind: LinkKind,
    pub from: (f32, f32),
    pub to: (f32, f32),
    pub ids: Vec<String>,
}

impl Link {
    /// Whether this link connects the given pair of persons.
    pub fn connects(&self, a: &str, b: &str) -> bool {
        self.ids.iter().any(|id| id == a) && self.ids.iter().any(|id| id == b)
    }
}

/// Derive renderable edges from final node positions. Hubs are re-derived
/// from the parents' resolved positions so connectors attach where the
/// couple actually ended up.
pub fn build(out: &LaidOut, index: &PersonIndex, config: &TreeConfig) -> Vec<Link> {
    let mut links: Vec<Link> = Vec::new();

    // Parent -> child connectors.
    for child_id in index.ids_in_order() {
        let Some(child) = out.get(child_id) else {
            continue;
        };
        let parents: Vec<&str> = index
            .parents_of(child_id)
            .iter()
            .take(2)
            .map(String::as_str)
            .filter(|p| out.contains(p))
            .collect();

        let from = match parents.as_slice() {
            [] => continue,
            [single] => {
                let p = out.get(single).unwrap();
                (p.x, p.y)
            }
            [a, b, ..] => {
                let (pa, pb) = (out.get(a).unwrap(), out.get(b).unwrap());
                ((pa.x + pb.x) / 2.0, pa.y.max(pb.y))
            }
        };

        let mut ids = vec![child_id.clone()];
        ids.extend(parents.iter().map(|p| p.to_string()));
        links.push(Link {
            kind: LinkKind::ChildDrop,
            from,
            to: (child.x, child.y),
            ids,
        });
    }

    // Spouse bars and configured arches.
    let mut pairs: Vec<&(String, String)> = index.spouse_pairs().collect();
    pairs.sort();
    for (a, b) in pairs {
        let (Some(na), Some(nb)) = (out.get(a), out.get(b)) else {
            continue;
        };
        let kind = if config.is_arch_pair(a, b) {
            LinkKind::SpouseArch
        } else {
            LinkKind::SpouseBar
        };
        links.push(Link {
            kind,
            from: (na.x.min(nb.x), na.y),
            to: (na.x.max(nb.x), nb.y),
            ids: vec![a.clone(), b.clone()],
        });
    }

    // Union bars for co-parents who are not spouses.
    let mut couples: Vec<(String, String)> = Vec::new();
    for id in index.ids_in_order() {
        let parents = index.parents_of(id);
        if parents.len() >= 2 {
            couples.push(pair_key(&parents[0], &parents[1]));
        }
    }
    couples.sort();
    couples.dedup();
    for (a, b) in &couples {
        if index.are_spouses(a, b) {
            continue;
        }
        let (Some(na), Some(nb)) = (out.get(a), out.get(b)) else {
            continue;
        };
        links.push(Link {
            kind: LinkKind::UnionBar,
            from: (na.x.min(nb.x), na.y.max(nb.y)),
            to: (na.x.max(nb.x), na.y.max(nb.y)),
            ids: vec![a.clone(), b.clone()],
        });
    }

    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forest::Forest;
    use crate::testutil::{dataset, parent_child, person, spouse};

    fn scene(data: &crate::model::Dataset, config: &TreeConfig) -> (LaidOut, Vec<Link>) {
        let index = PersonIndex::build(data);
        let forest = Forest::build(&index);
        let mut out = crate::layout::run(&forest, &index, config);
        let placement = crate::position::apply(&mut out, &index, config);
        crate::collide::resolve(&mut out, &placement, &index, config);
        let links = build(&out, &index, config);
        (out, links)
    }

    #[test]
    fn two_parent_child_drops_from_hub_midpoint() {
        let config = TreeConfig::default();
        let data = dataset(
            vec![person("pa", 0), person("ma", 0), person("kid", 1)],
            vec![spouse("pa", "ma"), parent_child("kid", &["pa", "ma"])],
        );
        let (out, links) = scene(&data, &config);
        let drop = links
            .iter()
            .find(|l| l.kind == LinkKind::ChildDrop)
            .unwrap();
        let mid = (out.get("pa").unwrap().x + out.get("ma").unwrap().x) / 2.0;
        assert!((drop.from.0 - mid).abs() < 1e-3);
        assert_eq!(drop.to.1, out.get("kid").unwrap().y);
        assert!(drop.connects("kid", "pa"));
        assert!(drop.connects("kid", "ma"));
    }

    #[test]
    fn single_parent_child_drops_from_parent_point() {
        let config = TreeConfig::default();
        let data = dataset(
            vec![person("pa", 0), person("kid", 1)],
            vec![parent_child("kid", &["pa"])],
        );
        let (out, links) = scene(&data, &config);
        let drop = links
            .iter()
            .find(|l| l.kind == LinkKind::ChildDrop)
            .unwrap();
        assert_eq!(drop.from.0, out.get("pa").unwrap().x);
        assert_eq!(drop.from.1, out.get("pa").unwrap().y);
    }

    #[test]
    fn unmarried_co_parents_get_a_union_bar() {
        let config = TreeConfig::default();
        let data = dataset(
            vec![person("pa", 0), person("ma", 0), person("kid", 1)],
            vec![parent_child("kid", &["pa", "ma"])],
        );
        let (_, links) = scene(&data, &config);
        assert!(links.iter().any(|l| l.kind == LinkKind::UnionBar));
        assert!(!links.iter().any(|l| l.kind == LinkKind::SpouseBar));
    }

    #[test]
    fn married_co_parents_get_a_bar_not_a_union() {
        let config = TreeConfig::default();
        let data = dataset(
            vec![person("pa", 0), person("ma", 0), person("kid", 1)],
            vec![spouse("pa", "ma"), parent_child("kid", &["pa", "ma"])],
        );
        let (_, links) = scene(&data, &config);
        assert!(links.iter().any(|l| l.kind == LinkKind::SpouseBar));
        assert!(!links.iter().any(|l| l.kind == LinkKind::UnionBar));
    }

    #[test]
    fn configured_pair_arches_instead_of_bar() {
        let config = TreeConfig {
            arch_pairs: vec![("mid".into(), "right".into())],
            ..TreeConfig::default()
        };
        let data = dataset(
            vec![person("left", 0), person("mid", 0), person("right", 0)],
            vec![spouse("mid", "left"), spouse("mid", "right")],
        );
        let (_, links) = scene(&data, &config);
        let arch = links
            .iter()
            .find(|l| l.kind == LinkKind::SpouseArch)
            .unwrap();
        assert!(arch.connects("mid", "right"));
        let bar = links
            .iter()
            .find(|l| l.kind == LinkKind::SpouseBar)
            .unwrap();
        assert!(bar.connects("mid", "left"));
    }
}
