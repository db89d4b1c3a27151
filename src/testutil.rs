//! Dataset builders shared by unit tests.

use crate::model::{Dataset, Gender, Person, Relationship};

pub fn person(id: &str, generation: i32) -> Person {
    Person {
        id: id.to_string(),
        first_name: String::new(),
        last_name: String::new(),
        gender: Gender::Unknown,
        generation,
        parents: Vec::new(),
        spouses: Vec::new(),
        children: Vec::new(),
    }
}

pub fn person_with_gender(id: &str, generation: i32, gender: Gender) -> Person {
    Person {
        gender,
        ..person(id, generation)
    }
}

pub fn named(id: &str, generation: i32, last_name: &str, first_name: &str) -> Person {
    Person {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        ..person(id, generation)
    }
}

pub fn spouse(a: &str, b: &str) -> Relationship {
    Relationship::Spouse {
        person_a_id: a.to_string(),
        person_b_id: b.to_string(),
    }
}

pub fn parent_child(child: &str, parents: &[&str]) -> Relationship {
    Relationship::ParentChild {
        child_id: child.to_string(),
        parent_id: None,
        parents: parents.iter().map(|p| p.to_string()).collect(),
    }
}

pub fn dataset(people: Vec<Person>, relationships: Vec<Relationship>) -> Dataset {
    Dataset {
        people,
        relationships,
    }
}
