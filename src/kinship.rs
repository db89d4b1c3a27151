use std::collections::{HashMap, VecDeque};

use crate::graph::PersonIndex;
use crate::model::{Gender, pair_key};

/// Outcome of comparing two selected people.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    Related {
        /// Person ids from the primary to the compared person.
        path: Vec<String>,
        /// Pair keys of traversed edges, for highlighting.
        edges: Vec<(String, String)>,
        /// Relationship of the primary person to the compared person.
        label: String,
    },
    NoPath {
        a: String,
        b: String,
        message: String,
    },
}

/// Selection state driven by host click events.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Selection {
    #[default]
    Idle,
    Single(String),
    PathDisplayed {
        primary: String,
        result: QueryResult,
    },
}

/// Kinship query engine over the graph index. Selecting a new primary person
/// always clears any displayed path; a compare while a result is in flight
/// supersedes it rather than interleaving.
#[derive(Debug, Default)]
pub struct Engine {
    selection: Selection,
}

impl Engine {
    pub fn new() -> Self {
        Engine::default()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn clear(&mut self) {
        self.selection = Selection::Idle;
    }

    /// Primary node activation. Unknown ids deselect.
    pub fn select(&mut self, index: &PersonIndex, id: &str) -> &Selection {
        self.selection = if index.contains(id) {
            Selection::Single(id.to_string())
        } else {
            Selection::Idle
        };
        &self.selection
    }

    /// Compare gesture. With no primary selected this acts as a select.
    pub fn compare(&mut self, index: &PersonIndex, id: &str) -> &Selection {
        let primary = match &self.selection {
            Selection::Idle => return self.select(index, id),
            Selection::Single(p) => p.clone(),
            Selection::PathDisplayed { primary, .. } => primary.clone(),
        };
        let result = query(index, &primary, id);
        self.selection = Selection::PathDisplayed { primary, result };
        &self.selection
    }
}

/// Shortest relationship path and label between two people.
pub fn query(index: &PersonIndex, a: &str, b: &str) -> QueryResult {
    match shortest_path(index, a, b) {
        Some(path) => {
            let edges = path
                .windows(2)
                .map(|w| pair_key(&w[0], &w[1]))
                .collect();
            let label = classify(index, &path);
            QueryResult::Related { path, edges, label }
        }
        None => QueryResult::NoPath {
            a: a.to_string(),
            b: b.to_string(),
            message: format!("No relationship path found between {} and {}", a, b),
        },
    }
}

/// Breadth-first shortest path over the undirected union of spouse edges and
/// all declared parent-child edges. The forest's single structural parent is
/// irrelevant here on purpose: every declared parent counts.
pub fn shortest_path(index: &PersonIndex, a: &str, b: &str) -> Option<Vec<String>> {
    if !index.contains(a) || !index.contains(b) {
        return None;
    }
    if a == b {
        return Some(vec![a.to_string()]);
    }

    let mut prev: HashMap<&str, &str> = HashMap::new();
    let mut queue: VecDeque<&str> = VecDeque::new();
    prev.insert(a, a);
    queue.push_back(a);

    while let Some(current) = queue.pop_front() {
        let neighbors = index
            .spouses_of(current)
            .iter()
            .chain(index.parents_of(current))
            .chain(index.children_of(current));
        for neighbor in neighbors {
            if prev.contains_key(neighbor.as_str()) {
                continue;
            }
            prev.insert(neighbor, current);
            if neighbor.as_str() == b {
                let mut path = vec![neighbor.as_str()];
                let mut at = current;
                while at != a {
                    path.push(at);
                    at = prev[at];
                }
                path.push(a);
                path.reverse();
                return Some(path.into_iter().map(String::from).collect());
            }
            queue.push_back(neighbor);
        }
    }
    None
}

/// Whether a path hop crossed a marriage rather than a parent-child edge.
fn is_spouse_hop(index: &PersonIndex, a: &str, b: &str) -> bool {
    index.are_spouses(a, b)
        && !index.parents_of(a).iter().any(|p| p == b)
        && !index.parents_of(b).iter().any(|p| p == a)
}

fn shares_parent(index: &PersonIndex, a: &str, b: &str) -> bool {
    index
        .parents_of(a)
        .iter()
        .any(|p| index.parents_of(b).iter().any(|q| q == p))
}

fn is_parent_of(index: &PersonIndex, parent: &str, child: &str) -> bool {
    index.parents_of(child).iter().any(|p| p == parent)
}

/// Ancestor set with generational distance. Spouse hops cost nothing, so a
/// married couple shares one ancestral cluster; parent hops cost one
/// generation (0-1 BFS).
fn ancestor_distances(index: &PersonIndex, start: &str) -> HashMap<String, u32> {
    let mut dist: HashMap<String, u32> = HashMap::new();
    let mut queue: VecDeque<(String, u32)> = VecDeque::new();
    dist.insert(start.to_string(), 0);
    queue.push_back((start.to_string(), 0));

    while let Some((current, d)) = queue.pop_front() {
        if dist.get(&current).copied().unwrap_or(u32::MAX) < d {
            continue;
        }
        for spouse in index.spouses_of(&current) {
            if d < dist.get(spouse).copied().unwrap_or(u32::MAX) {
                dist.insert(spouse.clone(), d);
                queue.push_front((spouse.clone(), d));
            }
        }
        for parent in index.parents_of(&current) {
            if d + 1 < dist.get(parent).copied().unwrap_or(u32::MAX) {
                dist.insert(parent.clone(), d + 1);
                queue.push_back((parent.clone(), d + 1));
            }
        }
    }
    dist
}

/// Classify a found path into a relationship label for the primary person
/// (the path's first id) relative to the compared person (its last).
pub fn classify(index: &PersonIndex, path: &[String]) -> String {
    let (Some(a), Some(b)) = (path.first(), path.last()) else {
        return String::from("unrelated");
    };
    if path.len() == 1 {
        return String::from("same person");
    }

    let via_marriage = path
        .windows(2)
        .any(|w| is_spouse_hop(index, &w[0], &w[1]));

    if path.len() == 2 && via_marriage {
        // The marriage itself; no qualifier needed.
        return gendered(index, a, "husband", "wife", "spouse");
    }

    let base = in_law_label(index, path, a, b)
        .or_else(|| blood_label(index, a, b))
        .unwrap_or_else(|| String::from("related"));

    if via_marriage {
        format!("{} (via marriage)", base)
    } else {
        base
    }
}

/// In-law checks run before any common-ancestor math: a spouse hop at either
/// end of the path can make two otherwise-distant people immediate in-laws.
fn in_law_label(index: &PersonIndex, path: &[String], a: &str, b: &str) -> Option<String> {
    if path.len() < 3 {
        return None;
    }

    // First hop: primary married into the far endpoint's family.
    if is_spouse_hop(index, a, &path[1]) {
        let spouse = &path[1];
        if shares_parent(index, spouse, b) {
            return Some(gendered(
                index,
                a,
                "brother-in-law",
                "sister-in-law",
                "sibling-in-law",
            ));
        }
        if is_parent_of(index, b, spouse) {
            return Some(gendered(
                index,
                a,
                "son-in-law",
                "daughter-in-law",
                "child-in-law",
            ));
        }
    }

    // Last hop: the compared person married into the primary's family.
    let spouse = &path[path.len() - 2];
    if is_spouse_hop(index, spouse, b) {
        if shares_parent(index, spouse, a) {
            return Some(gendered(
                index,
                b,
                "brother-in-law",
                "sister-in-law",
                "sibling-in-law",
            ));
        }
        if is_parent_of(index, a, spouse) {
            return Some(gendered(
                index,
                a,
                "father-in-law",
                "mother-in-law",
                "parent-in-law",
            ));
        }
    }

    None
}

fn blood_label(index: &PersonIndex, a: &str, b: &str) -> Option<String> {
    let anc_a = ancestor_distances(index, a);
    let anc_b = ancestor_distances(index, b);

    let mut candidates: Vec<&String> = anc_a.keys().filter(|id| anc_b.contains_key(*id)).collect();
    candidates.sort();
    let nearest = candidates
        .into_iter()
        .min_by_key(|id| anc_a[*id] + anc_b[*id])?;

    let (da, db) = (anc_a[nearest], anc_b[nearest]);

    if da == 0 && db == 0 {
        return Some(gendered(index, a, "husband", "wife", "spouse"));
    }
    if da == 0 {
        return Some(lineage_up(db));
    }
    if db == 0 {
        return Some(lineage_down(da));
    }
    if da == 1 && db == 1 {
        return Some(String::from("siblings"));
    }

    let degree = da.min(db) - 1;
    let removal = da.abs_diff(db);
    if degree == 0 {
        // Aunt/uncle territory; the cousin formula bottoms out here.
        let label = if da < db {
            gendered(index, a, "uncle", "aunt", "aunt/uncle")
        } else {
            gendered(index, a, "nephew", "niece", "niece/nephew")
        };
        return Some(label);
    }

    let mut label = format!("{} cousin", ordinal(degree));
    match removal {
        0 => {}
        1 => label.push_str(" once removed"),
        n => label.push_str(&format!(" {} times removed", n)),
    }
    Some(label)
}

/// Relationship of an ancestor to their descendant, by generational hops.
fn lineage_up(hops: u32) -> String {
    match hops {
        1 => String::from("parent"),
        2 => String::from("grandparent"),
        n => format!("{}x great-grandparent", n - 2),
    }
}

fn lineage_down(hops: u32) -> String {
    match hops {
        1 => String::from("child"),
        2 => String::from("grandchild"),
        n => format!("{}x great-grandchild", n - 2),
    }
}

fn ordinal(n: u32) -> String {
    match n {
        1 => String::from("first"),
        2 => String::from("second"),
        3 => String::from("third"),
        4 => String::from("fourth"),
        5 => String::from("fifth"),
        6 => String::from("sixth"),
        7 => String::from("seventh"),
        8 => String::from("eighth"),
        9 => String::from("ninth"),
        n => format!("{}th", n),
    }
}

fn gendered(index: &PersonIndex, id: &str, male: &str, female: &str, neutral: &str) -> String {
    match index.person(id).map(|p| p.gender) {
        Some(Gender::Male) => male.to_string(),
        Some(Gender::Female) => female.to_string(),
        _ => neutral.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{dataset, parent_child, person, person_with_gender, spouse};

    fn label(index: &PersonIndex, a: &str, b: &str) -> String {
        match query(index, a, b) {
            QueryResult::Related { label, .. } => label,
            QueryResult::NoPath { .. } => String::from("<no path>"),
        }
    }

    #[test]
    fn shortest_path_crosses_marriage() {
        let data = dataset(
            vec![person("a", 0), person("b", 0), person("c", 1)],
            vec![spouse("a", "b"), parent_child("c", &["b"])],
        );
        let index = PersonIndex::build(&data);
        assert_eq!(
            shortest_path(&index, "a", "c").unwrap(),
            vec!["a", "b", "c"]
        );
        assert_eq!(label(&index, "a", "c"), "parent (via marriage)");
    }

    #[test]
    fn shared_parents_without_marriage_are_siblings() {
        let data = dataset(
            vec![
                person("pa", 0),
                person("ma", 0),
                person("x", 1),
                person("y", 1),
            ],
            vec![
                parent_child("x", &["pa", "ma"]),
                parent_child("y", &["pa", "ma"]),
            ],
        );
        let index = PersonIndex::build(&data);
        assert_eq!(label(&index, "x", "y"), "siblings");
    }

    #[test]
    fn cousin_degrees_and_removal() {
        // g has two children (p1, p2); their children c1, c2 are first
        // cousins; c2's child gc is c1's first cousin once removed.
        let data = dataset(
            vec![
                person("g", 0),
                person("p1", 1),
                person("p2", 1),
                person("c1", 2),
                person("c2", 2),
                person("gc", 3),
            ],
            vec![
                parent_child("p1", &["g"]),
                parent_child("p2", &["g"]),
                parent_child("c1", &["p1"]),
                parent_child("c2", &["p2"]),
                parent_child("gc", &["c2"]),
            ],
        );
        let index = PersonIndex::build(&data);
        assert_eq!(label(&index, "c1", "c2"), "first cousin");
        assert_eq!(label(&index, "c1", "gc"), "first cousin once removed");
    }

    #[test]
    fn spouses_parent_is_a_gendered_in_law() {
        let data = dataset(
            vec![
                person_with_gender("ma", 0, Gender::Female),
                person("kid", 1),
                person("wife", 1),
            ],
            vec![parent_child("kid", &["ma"]), spouse("kid", "wife")],
        );
        let index = PersonIndex::build(&data);
        assert_eq!(label(&index, "ma", "wife"), "mother-in-law (via marriage)");
        assert_eq!(
            label(&index, "wife", "ma"),
            "child-in-law (via marriage)"
        );
    }

    #[test]
    fn married_into_siblings_are_siblings_in_law() {
        let data = dataset(
            vec![
                person("pa", 0),
                person("sis", 1),
                person("bro", 1),
                person_with_gender("hub", 1, Gender::Male),
            ],
            vec![
                parent_child("sis", &["pa"]),
                parent_child("bro", &["pa"]),
                spouse("hub", "sis"),
            ],
        );
        let index = PersonIndex::build(&data);
        assert_eq!(
            label(&index, "hub", "bro"),
            "brother-in-law (via marriage)"
        );
    }

    #[test]
    fn lineage_chains_great_prefixes() {
        let data = dataset(
            vec![
                person("a", 0),
                person("b", 1),
                person("c", 2),
                person("d", 3),
            ],
            vec![
                parent_child("b", &["a"]),
                parent_child("c", &["b"]),
                parent_child("d", &["c"]),
            ],
        );
        let index = PersonIndex::build(&data);
        assert_eq!(label(&index, "a", "b"), "parent");
        assert_eq!(label(&index, "a", "c"), "grandparent");
        assert_eq!(label(&index, "a", "d"), "1x great-grandparent");
        assert_eq!(label(&index, "d", "a"), "1x great-grandchild");
    }

    #[test]
    fn disconnected_components_yield_no_path() {
        let data = dataset(vec![person("a", 0), person("z", 0)], vec![]);
        let index = PersonIndex::build(&data);
        match query(&index, "a", "z") {
            QueryResult::NoPath { message, .. } => {
                assert!(message.contains("No relationship path"));
            }
            other => panic!("expected NoPath, got {:?}", other),
        }
    }

    #[test]
    fn aunt_and_nephew_bottom_out_the_cousin_formula() {
        let data = dataset(
            vec![
                person("g", 0),
                person_with_gender("aunt", 1, Gender::Female),
                person("p", 1),
                person_with_gender("nephew", 2, Gender::Male),
            ],
            vec![
                parent_child("aunt", &["g"]),
                parent_child("p", &["g"]),
                parent_child("nephew", &["p"]),
            ],
        );
        let index = PersonIndex::build(&data);
        assert_eq!(label(&index, "aunt", "nephew"), "aunt");
        assert_eq!(label(&index, "nephew", "aunt"), "nephew");
    }

    #[test]
    fn selection_state_machine_supersedes_results() {
        let data = dataset(
            vec![person("a", 0), person("b", 0), person("c", 1)],
            vec![spouse("a", "b"), parent_child("c", &["b"])],
        );
        let index = PersonIndex::build(&data);
        let mut engine = Engine::new();

        assert_eq!(engine.selection(), &Selection::Idle);
        engine.select(&index, "a");
        assert_eq!(engine.selection(), &Selection::Single("a".into()));

        engine.compare(&index, "c");
        match engine.selection() {
            Selection::PathDisplayed { primary, result } => {
                assert_eq!(primary, "a");
                assert!(matches!(result, QueryResult::Related { .. }));
            }
            other => panic!("expected path, got {:?}", other),
        }

        // A fresh primary selection clears the displayed path.
        engine.select(&index, "b");
        assert_eq!(engine.selection(), &Selection::Single("b".into()));

        // A second compare supersedes the first result.
        engine.compare(&index, "a");
        engine.compare(&index, "c");
        match engine.selection() {
            Selection::PathDisplayed { primary, .. } => assert_eq!(primary, "b"),
            other => panic!("expected path, got {:?}", other),
        }
    }

    #[test]
    fn direct_spouses_are_labeled_without_qualifier() {
        let data = dataset(
            vec![
                person_with_gender("h", 0, Gender::Male),
                person_with_gender("w", 0, Gender::Female),
            ],
            vec![spouse("h", "w")],
        );
        let index = PersonIndex::build(&data);
        assert_eq!(label(&index, "h", "w"), "husband");
        assert_eq!(label(&index, "w", "h"), "wife");
    }
}
