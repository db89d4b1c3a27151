use serde::{Deserialize, Serialize};

const LIGHT_BACKGROUND: &str = "#ffffff";
const LIGHT_NODE_FILL: &str = "#f6f8fa";
const LIGHT_NODE_STROKE: &str = "#57606a";
const LIGHT_MALE_STROKE: &str = "#0969da";
const LIGHT_FEMALE_STROKE: &str = "#bf3989";
const LIGHT_TEXT: &str = "#24292f";
const LIGHT_LINK: &str = "#8c959f";
const LIGHT_ACCENT: &str = "#fb8500";
const LIGHT_CAPTION: &str = "#1b1f23";

const DARK_BACKGROUND: &str = "#0d1117";
const DARK_NODE_FILL: &str = "#161b22";
const DARK_NODE_STROKE: &str = "#8b949e";
const DARK_MALE_STROKE: &str = "#58a6ff";
const DARK_FEMALE_STROKE: &str = "#f778ba";
const DARK_TEXT: &str = "#c9d1d9";
const DARK_LINK: &str = "#484f58";
const DARK_ACCENT: &str = "#ffa657";
const DARK_CAPTION: &str = "#f0f6fc";

const SEPIA_BACKGROUND: &str = "#f4ecd8";
const SEPIA_NODE_FILL: &str = "#ece1c8";
const SEPIA_NODE_STROKE: &str = "#6f5b3e";
const SEPIA_MALE_STROKE: &str = "#38608f";
const SEPIA_FEMALE_STROKE: &str = "#97433f";
const SEPIA_TEXT: &str = "#3f3222";
const SEPIA_LINK: &str = "#a08a63";
const SEPIA_ACCENT: &str = "#c05621";
const SEPIA_CAPTION: &str = "#2c2416";

/// Colors used by the SVG renderer. Every field is optional in override
/// files; absent keys keep the light palette values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Palette {
    #[serde(default = "default_background")]
    pub background_color: String,
    #[serde(default = "default_node_fill")]
    pub node_fill_color: String,
    /// Stroke for persons of unknown gender.
    #[serde(default = "default_node_stroke")]
    pub node_stroke_color: String,
    #[serde(default = "default_male_stroke")]
    pub male_stroke_color: String,
    #[serde(default = "default_female_stroke")]
    pub female_stroke_color: String,
    #[serde(default = "default_text")]
    pub text_color: String,
    /// Connector bars and child drops.
    #[serde(default = "default_link")]
    pub link_color: String,
    /// Kinship path highlight.
    #[serde(default = "default_accent")]
    pub accent_color: String,
    /// Relationship label caption.
    #[serde(default = "default_caption")]
    pub caption_color: String,
}

fn default_background() -> String {
    LIGHT_BACKGROUND.to_string()
}
fn default_node_fill() -> String {
    LIGHT_NODE_FILL.to_string()
}
fn default_node_stroke() -> String {
    LIGHT_NODE_STROKE.to_string()
}
fn default_male_stroke() -> String {
    LIGHT_MALE_STROKE.to_string()
}
fn default_female_stroke() -> String {
    LIGHT_FEMALE_STROKE.to_string()
}
fn default_text() -> String {
    LIGHT_TEXT.to_string()
}
fn default_link() -> String {
    LIGHT_LINK.to_string()
}
fn default_accent() -> String {
    LIGHT_ACCENT.to_string()
}
fn default_caption() -> String {
    LIGHT_CAPTION.to_string()
}

impl Default for Palette {
    fn default() -> Self {
        Palette::light()
    }
}

impl Palette {
    pub fn light() -> Self {
        Palette {
            background_color: LIGHT_BACKGROUND.to_string(),
            node_fill_color: LIGHT_NODE_FILL.to_string(),
            node_stroke_color: LIGHT_NODE_STROKE.to_string(),
            male_stroke_color: LIGHT_MALE_STROKE.to_string(),
            female_stroke_color: LIGHT_FEMALE_STROKE.to_string(),
            text_color: LIGHT_TEXT.to_string(),
            link_color: LIGHT_LINK.to_string(),
            accent_color: LIGHT_ACCENT.to_string(),
            caption_color: LIGHT_CAPTION.to_string(),
        }
    }

    pub fn dark() -> Self {
        Palette {
            background_color: DARK_BACKGROUND.to_string(),
            node_fill_color: DARK_NODE_FILL.to_string(),
            node_stroke_color: DARK_NODE_STROKE.to_string(),
            male_stroke_color: DARK_MALE_STROKE.to_string(),
            female_stroke_color: DARK_FEMALE_STROKE.to_string(),
            text_color: DARK_TEXT.to_string(),
            link_color: DARK_LINK.to_string(),
            accent_color: DARK_ACCENT.to_string(),
            caption_color: DARK_CAPTION.to_string(),
        }
    }

    pub fn sepia() -> Self {
        Palette {
            background_color: SEPIA_BACKGROUND.to_string(),
            node_fill_color: SEPIA_NODE_FILL.to_string(),
            node_stroke_color: SEPIA_NODE_STROKE.to_string(),
            male_stroke_color: SEPIA_MALE_STROKE.to_string(),
            female_stroke_color: SEPIA_FEMALE_STROKE.to_string(),
            text_color: SEPIA_TEXT.to_string(),
            link_color: SEPIA_LINK.to_string(),
            accent_color: SEPIA_ACCENT.to_string(),
            caption_color: SEPIA_CAPTION.to_string(),
        }
    }

    pub fn from_builtin(name: &str) -> Result<Self, String> {
        let normalized = name.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "light" => Ok(Palette::light()),
            "dark" => Ok(Palette::dark()),
            "sepia" => Ok(Palette::sepia()),
            _ => Err(format!(
                "Unknown built-in palette '{}'. Available: {}",
                name,
                Self::list_builtins().join(", ")
            )),
        }
    }

    pub fn list_builtins() -> Vec<&'static str> {
        vec!["light", "dark", "sepia"]
    }

    pub fn from_toml(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| format!("Failed to parse palette TOML: {}", e))
    }

    pub fn from_yaml(content: &str) -> Result<Self, String> {
        serde_yaml::from_str(content).map_err(|e| format!("Failed to parse palette YAML: {}", e))
    }

    /// Parse an override file, trying TOML first and falling back to YAML.
    pub fn from_file_content(content: &str) -> Result<Self, String> {
        Self::from_toml(content).or_else(|toml_err| {
            Self::from_yaml(content).map_err(|yaml_err| {
                format!("Palette parse failed. {} / {}", toml_err, yaml_err)
            })
        })
    }

    /// Whether the background is dark enough that light text reads better.
    pub fn is_dark_background(&self) -> bool {
        relative_luminance(&self.background_color) < 0.45
    }

    /// The configured text color when it reads against the background, else
    /// plain black or white. Guards override files that change the background
    /// without adjusting the text color.
    pub fn readable_text_color(&self) -> &str {
        let contrast = (relative_luminance(&self.text_color)
            - relative_luminance(&self.background_color))
        .abs();
        if contrast >= 0.3 {
            &self.text_color
        } else if self.is_dark_background() {
            "#ffffff"
        } else {
            "#000000"
        }
    }
}

/// Approximate relative luminance of a `#rrggbb` color; malformed input reads
/// as white so contrast decisions stay conservative.
pub fn relative_luminance(hex: &str) -> f32 {
    let Some((r, g, b)) = parse_hex(hex) else {
        return 1.0;
    };
    0.2126 * channel(r) + 0.7152 * channel(g) + 0.0722 * channel(b)
}

fn channel(byte: u8) -> f32 {
    let c = byte as f32 / 255.0;
    if c <= 0.03928 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.trim().strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_builtin_accepts_hyphenated_and_case_insensitive_names() {
        let plain = Palette::from_builtin("dark").expect("plain name");
        let shouty = Palette::from_builtin(" DARK ").expect("shouty name");
        assert_eq!(plain.background_color, shouty.background_color);
        assert!(Palette::from_builtin("neon").is_err());
    }

    #[test]
    fn toml_overrides_keep_defaults_for_absent_keys() {
        let palette = Palette::from_toml("accent_color = \"#ff0000\"\n").unwrap();
        assert_eq!(palette.accent_color, "#ff0000");
        assert_eq!(palette.background_color, LIGHT_BACKGROUND);
    }

    #[test]
    fn file_content_falls_back_to_yaml() {
        let yaml = Palette::from_file_content("accent_color: \"#00ff00\"\n").unwrap();
        assert_eq!(yaml.accent_color, "#00ff00");
    }

    #[test]
    fn unreadable_text_color_falls_back_by_background() {
        // Dark background override without a matching text override.
        let palette = Palette {
            background_color: "#10131a".to_string(),
            ..Palette::light()
        };
        assert_eq!(palette.readable_text_color(), "#ffffff");
        assert_eq!(
            Palette::light().readable_text_color(),
            Palette::light().text_color
        );
    }

    #[test]
    fn luminance_separates_light_and_dark() {
        assert!(Palette::dark().is_dark_background());
        assert!(!Palette::light().is_dark_background());
        assert_eq!(relative_luminance("not-a-color"), 1.0);
    }
}
