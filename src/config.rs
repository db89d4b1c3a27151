use serde::Deserialize;

const NODE_RADIUS: f32 = 18.0;
const H_SPACING: f32 = 70.0;
const ROW_HEIGHT: f32 = 120.0;
const ZOOM_MIN: f32 = 0.2;
const ZOOM_MAX: f32 = 4.0;
const TRANSITION_MS: u32 = 350;
const SPOUSE_GAP: f32 = 52.0;
const SIBLING_GAP: f32 = 64.0;
const MIN_ROW_GAP: f32 = 28.0;
const DEPTH_SPAN: u32 = 4;

/// Layout and interaction configuration, merged once at entry and immutable
/// afterwards. All fields are optional in override files.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeConfig {
    #[serde(default = "default_node_radius")]
    pub node_radius: f32,
    /// Base horizontal spacing fed to the tree layout separation function.
    #[serde(default = "default_h_spacing")]
    pub h_spacing: f32,
    /// Vertical distance between generation rows; `y = generation * row_height`.
    #[serde(default = "default_row_height")]
    pub row_height: f32,
    #[serde(default = "default_zoom_min")]
    pub zoom_min: f32,
    #[serde(default = "default_zoom_max")]
    pub zoom_max: f32,
    #[serde(default = "default_transition_ms")]
    pub transition_ms: u32,
    /// Base gap between the two members of a couple.
    #[serde(default = "default_spouse_gap")]
    pub spouse_gap: f32,
    /// Even spacing between members of one sibling group.
    #[serde(default = "default_sibling_gap")]
    pub sibling_gap: f32,
    /// Minimum horizontal clearance between adjacent units on one row.
    #[serde(default = "default_min_row_gap")]
    pub min_row_gap: f32,
    /// Depth levels past which separation growth stops widening.
    #[serde(default = "default_depth_span")]
    pub depth_span: u32,
    /// Spouse pairs whose connector is forced to render as an arch above the
    /// row instead of a bar. Order within a pair does not matter.
    #[serde(default)]
    pub arch_pairs: Vec<(String, String)>,
}

fn default_node_radius() -> f32 {
    NODE_RADIUS
}
fn default_h_spacing() -> f32 {
    H_SPACING
}
fn default_row_height() -> f32 {
    ROW_HEIGHT
}
fn default_zoom_min() -> f32 {
    ZOOM_MIN
}
fn default_zoom_max() -> f32 {
    ZOOM_MAX
}
fn default_transition_ms() -> u32 {
    TRANSITION_MS
}
fn default_spouse_gap() -> f32 {
    SPOUSE_GAP
}
fn default_sibling_gap() -> f32 {
    SIBLING_GAP
}
fn default_min_row_gap() -> f32 {
    MIN_ROW_GAP
}
fn default_depth_span() -> u32 {
    DEPTH_SPAN
}

impl Default for TreeConfig {
    fn default() -> Self {
        TreeConfig {
            node_radius: NODE_RADIUS,
            h_spacing: H_SPACING,
            row_height: ROW_HEIGHT,
            zoom_min: ZOOM_MIN,
            zoom_max: ZOOM_MAX,
            transition_ms: TRANSITION_MS,
            spouse_gap: SPOUSE_GAP,
            sibling_gap: SIBLING_GAP,
            min_row_gap: MIN_ROW_GAP,
            depth_span: DEPTH_SPAN,
            arch_pairs: Vec::new(),
        }
    }
}

impl TreeConfig {
    /// Parse a TOML override file; absent keys keep their defaults.
    pub fn from_toml(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| format!("Failed to parse config TOML: {}", e))
    }

    /// Whether a spouse pair is configured to render as an arch.
    pub fn is_arch_pair(&self, a: &str, b: &str) -> bool {
        self.arch_pairs
            .iter()
            .any(|(x, y)| (x == a && y == b) || (x == b && y == a))
    }

    /// Separation falloff for nested depth: grows with depth but stops
    /// widening past `depth_span` levels so deep trees don't explode laterally.
    pub fn depth_falloff(&self, depth: u32) -> f32 {
        let capped = depth.min(self.depth_span) as f32;
        1.0 / (1.0 + capped * 0.25)
    }
}
