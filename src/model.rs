use serde::{Deserialize, Deserializer};

/// Gender tag on a person record. Anything other than `M`/`F` is kept as
/// unknown rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gender {
    Male,
    Female,
    #[default]
    Unknown,
}

impl Gender {
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim() {
            "M" | "m" => Gender::Male,
            "F" | "f" => Gender::Female,
            _ => Gender::Unknown,
        }
    }
}

fn de_gender<'de, D>(deserializer: D) -> Result<Gender, D::Error>
where
    D: Deserializer<'de>,
{
    let tag: Option<String> = Option::deserialize(deserializer)?;
    Ok(tag.as_deref().map(Gender::from_tag).unwrap_or_default())
}

/// A person record as loaded from the data file. Treated as immutable input
/// for the duration of one layout pass.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default, deserialize_with = "de_gender")]
    pub gender: Gender,
    /// Integer tier used to force row alignment; absent means 0.
    #[serde(default)]
    pub generation: i32,
    #[serde(default)]
    pub parents: Vec<String>,
    #[serde(default)]
    pub spouses: Vec<String>,
    #[serde(default)]
    pub children: Vec<String>,
}

impl Person {
    pub fn display_name(&self) -> String {
        match (self.first_name.is_empty(), self.last_name.is_empty()) {
            (true, true) => self.id.clone(),
            (false, true) => self.first_name.clone(),
            (true, false) => self.last_name.clone(),
            (false, false) => format!("{} {}", self.first_name, self.last_name),
        }
    }
}

/// A relationship record. The legacy single-`parentId` form is equivalent to
/// a one-element parent list.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum Relationship {
    #[serde(rename = "spouse", rename_all = "camelCase")]
    Spouse {
        person_a_id: String,
        person_b_id: String,
    },
    #[serde(rename = "parent-child", rename_all = "camelCase")]
    ParentChild {
        child_id: String,
        #[serde(default)]
        parent_id: Option<String>,
        #[serde(default)]
        parents: Vec<String>,
    },
}

impl Relationship {
    /// All declared parents of a parent-child record, in declaration order.
    /// Empty for spouse records.
    pub fn declared_parents(&self) -> Vec<&str> {
        match self {
            Relationship::Spouse { .. } => Vec::new(),
            Relationship::ParentChild {
                parent_id, parents, ..
            } => {
                let mut out: Vec<&str> = parents.iter().map(String::as_str).collect();
                if out.is_empty() {
                    if let Some(id) = parent_id {
                        out.push(id.as_str());
                    }
                }
                out
            }
        }
    }
}

/// The full input handed to the layout pipeline.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(default)]
    pub people: Vec<Person>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

/// Order-independent key for a pair of person ids, so `(a, b)` and `(b, a)`
/// address the same couple.
pub fn pair_key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}
