pub mod collide;
pub mod config;
pub mod fonts;
pub mod forest;
pub mod graph;
pub mod kinship;
pub mod layout;
pub mod links;
pub mod model;
pub mod position;
pub mod render;
pub mod theme;
pub mod view;
pub mod xml;

#[cfg(test)]
pub mod testutil;

pub use config::TreeConfig;
pub use kinship::{Engine, QueryResult, Selection};
pub use model::{Dataset, Gender, Person, Relationship};
pub use theme::Palette;
pub use view::{Bounds, Highlight, ScenePerson, TreeView, Viewport};
