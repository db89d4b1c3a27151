use std::collections::{HashMap, HashSet};

use crate::model::{Dataset, Person, Relationship, pair_key};

/// Lookup structures built once per layout pass from the raw records.
///
/// Relationships that reference unknown person ids contribute nothing; the
/// surrounding system owns data validation. Nothing here is mutated after
/// `build` returns.
#[derive(Debug, Default)]
pub struct PersonIndex {
    by_id: HashMap<String, Person>,
    /// Person ids in input declaration order, for deterministic iteration.
    order: Vec<String>,
    spouse_pairs: HashSet<(String, String)>,
    spouse_adj: HashMap<String, Vec<String>>,
    /// Declared parents per child, declaration order, unknown ids dropped.
    parents_of: HashMap<String, Vec<String>>,
    /// Inverse of `parents_of`, declaration order.
    children_of: HashMap<String, Vec<String>>,
}

impl PersonIndex {
    pub fn build(dataset: &Dataset) -> Self {
        let mut index = PersonIndex::default();

        for person in &dataset.people {
            if index.by_id.contains_key(&person.id) {
                continue;
            }
            index.order.push(person.id.clone());
            index.by_id.insert(person.id.clone(), person.clone());
        }

        // Explicit relationship records first, then back-references embedded
        // on the person records themselves.
        for relationship in &dataset.relationships {
            match relationship {
                Relationship::Spouse {
                    person_a_id,
                    person_b_id,
                } => index.add_spouse_pair(person_a_id, person_b_id),
                Relationship::ParentChild { child_id, .. } => {
                    for parent_id in relationship.declared_parents() {
                        index.add_parent(child_id, parent_id);
                    }
                }
            }
        }

        for person in &dataset.people {
            for spouse_id in &person.spouses {
                index.add_spouse_pair(&person.id, spouse_id);
            }
            for parent_id in &person.parents {
                index.add_parent(&person.id, parent_id);
            }
            for child_id in &person.children {
                index.add_parent(child_id, &person.id);
            }
        }

        index
    }

    fn add_spouse_pair(&mut self, a: &str, b: &str) {
        if a == b || !self.by_id.contains_key(a) || !self.by_id.contains_key(b) {
            return;
        }
        if self.spouse_pairs.insert(pair_key(a, b)) {
            self.spouse_adj
                .entry(a.to_string())
                .or_default()
                .push(b.to_string());
            self.spouse_adj
                .entry(b.to_string())
                .or_default()
                .push(a.to_string());
        }
    }

    fn add_parent(&mut self, child_id: &str, parent_id: &str) {
        if child_id == parent_id
            || !self.by_id.contains_key(child_id)
            || !self.by_id.contains_key(parent_id)
        {
            return;
        }
        let parents = self.parents_of.entry(child_id.to_string()).or_default();
        if parents.iter().any(|p| p == parent_id) {
            return;
        }
        parents.push(parent_id.to_string());
        self.children_of
            .entry(parent_id.to_string())
            .or_default()
            .push(child_id.to_string());
    }

    pub fn person(&self, id: &str) -> Option<&Person> {
        self.by_id.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn ids_in_order(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn are_spouses(&self, a: &str, b: &str) -> bool {
        self.spouse_pairs.contains(&pair_key(a, b))
    }

    pub fn spouse_pairs(&self) -> impl Iterator<Item = &(String, String)> {
        self.spouse_pairs.iter()
    }

    pub fn spouses_of(&self, id: &str) -> &[String] {
        self.spouse_adj.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn parents_of(&self, id: &str) -> &[String] {
        self.parents_of.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn children_of(&self, id: &str) -> &[String] {
        self.children_of.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn generation(&self, id: &str) -> i32 {
        self.by_id.get(id).map(|p| p.generation).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{dataset, parent_child, person, spouse};

    #[test]
    fn unknown_ids_are_dropped_silently() {
        let data = dataset(
            vec![person("a", 0), person("b", 1)],
            vec![
                spouse("a", "ghost"),
                parent_child("b", &["ghost", "a"]),
                parent_child("ghost2", &["a"]),
            ],
        );
        let index = PersonIndex::build(&data);

        assert!(!index.are_spouses("a", "ghost"));
        assert_eq!(index.parents_of("b"), ["a"]);
        assert!(index.children_of("a").contains(&"b".to_string()));
        assert!(index.parents_of("ghost2").is_empty());
    }

    #[test]
    fn embedded_arrays_merge_with_relationship_records() {
        let mut child = person("c", 1);
        child.parents = vec!["m".to_string()];
        let mut father = person("d", 0);
        father.children = vec!["c".to_string()];
        father.spouses = vec!["m".to_string()];
        let data = dataset(
            vec![person("m", 0), father, child],
            vec![parent_child("c", &["m"])],
        );
        let index = PersonIndex::build(&data);

        // Relationship record and embedded array agree on "m"; "d" comes from
        // the embedded children array only.
        assert_eq!(index.parents_of("c"), ["m", "d"]);
        assert!(index.are_spouses("m", "d"));
    }

    #[test]
    fn spouse_pair_test_is_order_independent() {
        let data = dataset(
            vec![person("a", 0), person("b", 0)],
            vec![spouse("b", "a")],
        );
        let index = PersonIndex::build(&data);
        assert!(index.are_spouses("a", "b"));
        assert!(index.are_spouses("b", "a"));
        assert_eq!(index.spouses_of("a"), ["b"]);
    }

    #[test]
    fn self_relationships_are_ignored() {
        let data = dataset(
            vec![person("a", 0)],
            vec![spouse("a", "a"), parent_child("a", &["a"])],
        );
        let index = PersonIndex::build(&data);
        assert!(!index.are_spouses("a", "a"));
        assert!(index.parents_of("a").is_empty());
    }
}
