use crate::collide;
use crate::config::TreeConfig;
use crate::forest::Forest;
use crate::graph::PersonIndex;
use crate::kinship::{Engine, QueryResult, Selection};
use crate::layout::{self, LaidOut};
use crate::links::{self, Link};
use crate::model::{Dataset, Gender, Person, Relationship};
use crate::position;

/// One laid-out person, ready for a renderer.
#[derive(Debug, Clone)]
pub struct ScenePerson {
    pub id: String,
    pub name: String,
    pub gender: Gender,
    pub x: f32,
    pub y: f32,
    pub generation: i32,
}

/// Axis-aligned extent of the laid-out scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Bounds {
    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }
}

/// Pan/zoom transform mapping scene coordinates into the host viewport:
/// `screen = scene * scale + translate`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub translate_x: f32,
    pub translate_y: f32,
    pub scale: f32,
}

/// Scene elements the current kinship result wants emphasized.
#[derive(Debug, Clone, Default)]
pub struct Highlight {
    pub people: Vec<String>,
    pub edges: Vec<(String, String)>,
    pub label: Option<String>,
}

/// Owning handle over one laid-out tree: scene geometry, kinship selection
/// state, and the viewport transform. Construction runs the whole pipeline;
/// the same input always produces the same scene.
pub struct TreeView {
    index: PersonIndex,
    nodes: LaidOut,
    links: Vec<Link>,
    engine: Engine,
    config: TreeConfig,
    viewport_size: (f32, f32),
}

impl TreeView {
    pub fn new(people: Vec<Person>, relationships: Vec<Relationship>, config: TreeConfig) -> Self {
        let dataset = Dataset {
            people,
            relationships,
        };
        Self::from_dataset(&dataset, config)
    }

    pub fn from_dataset(dataset: &Dataset, config: TreeConfig) -> Self {
        let index = PersonIndex::build(dataset);
        let forest = Forest::build(&index);
        let mut nodes = layout::run(&forest, &index, &config);
        let placement = position::apply(&mut nodes, &index, &config);
        collide::resolve(&mut nodes, &placement, &index, &config);
        let links = links::build(&nodes, &index, &config);

        TreeView {
            index,
            nodes,
            links,
            engine: Engine::new(),
            config,
            viewport_size: (0.0, 0.0),
        }
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    pub fn people(&self) -> Vec<ScenePerson> {
        self.nodes
            .nodes
            .iter()
            .map(|node| {
                let person = self.index.person(&node.id);
                ScenePerson {
                    id: node.id.clone(),
                    name: person.map(Person::display_name).unwrap_or_default(),
                    gender: person.map(|p| p.gender).unwrap_or_default(),
                    x: node.x,
                    y: node.y,
                    generation: node.generation,
                }
            })
            .collect()
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn bounds(&self) -> Option<Bounds> {
        let mut nodes = self.nodes.nodes.iter();
        let first = nodes.next()?;
        let mut bounds = Bounds {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        for node in nodes {
            bounds.min_x = bounds.min_x.min(node.x);
            bounds.min_y = bounds.min_y.min(node.y);
            bounds.max_x = bounds.max_x.max(node.x);
            bounds.max_y = bounds.max_y.max(node.y);
        }
        Some(bounds)
    }

    /// Primary node activation; clears any displayed kinship path.
    pub fn select(&mut self, id: &str) -> &Selection {
        self.engine.select(&self.index, id)
    }

    /// Modifier-click gesture: compare the current primary against `id`.
    pub fn compare(&mut self, id: &str) -> &Selection {
        self.engine.compare(&self.index, id)
    }

    pub fn selection(&self) -> &Selection {
        self.engine.selection()
    }

    pub fn clear_selection(&mut self) {
        self.engine.clear();
    }

    /// What the renderer should emphasize for the current selection.
    pub fn highlight(&self) -> Highlight {
        match self.engine.selection() {
            Selection::Idle => Highlight::default(),
            Selection::Single(id) => Highlight {
                people: vec![id.clone()],
                ..Highlight::default()
            },
            Selection::PathDisplayed { result, .. } => match result {
                QueryResult::Related { path, edges, label } => Highlight {
                    people: path.clone(),
                    edges: edges.clone(),
                    label: Some(label.clone()),
                },
                QueryResult::NoPath { message, .. } => Highlight {
                    label: Some(message.clone()),
                    ..Highlight::default()
                },
            },
        }
    }

    /// Record the host viewport size and return a fresh fit transform.
    pub fn resize(&mut self, width: f32, height: f32) -> Viewport {
        self.viewport_size = (width, height);
        self.fit(self.config.node_radius * 2.0)
    }

    /// Transform that fits the whole scene inside the viewport with the given
    /// padding, scale clamped to the configured zoom range. Degenerate bounds
    /// (empty scene or a single point) center on the first node at scale 1.
    pub fn fit(&self, padding: f32) -> Viewport {
        let (width, height) = self.viewport_size;
        let fallback = |center: (f32, f32)| Viewport {
            translate_x: width / 2.0 - center.0,
            translate_y: height / 2.0 - center.1,
            scale: 1.0f32.clamp(self.config.zoom_min, self.config.zoom_max),
        };

        let Some(bounds) = self.bounds() else {
            return fallback((0.0, 0.0));
        };
        let first = (bounds.min_x, bounds.min_y);
        if bounds.width() <= f32::EPSILON && bounds.height() <= f32::EPSILON {
            return fallback(first);
        }

        let avail_w = (width - padding * 2.0).max(1.0);
        let avail_h = (height - padding * 2.0).max(1.0);
        let scale_x = if bounds.width() > f32::EPSILON {
            avail_w / bounds.width()
        } else {
            f32::INFINITY
        };
        let scale_y = if bounds.height() > f32::EPSILON {
            avail_h / bounds.height()
        } else {
            f32::INFINITY
        };
        let scale = scale_x
            .min(scale_y)
            .clamp(self.config.zoom_min, self.config.zoom_max);

        let center_x = (bounds.min_x + bounds.max_x) / 2.0;
        let center_y = (bounds.min_y + bounds.max_y) / 2.0;
        Viewport {
            translate_x: width / 2.0 - center_x * scale,
            translate_y: height / 2.0 - center_y * scale,
            scale,
        }
    }
}
