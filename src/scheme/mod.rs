use egui::Color32;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

pub mod mock;

pub const DEFAULT_COLOR: &str = "#4287f5";

/// One candidate building-massing design. Dimensions are in meters; the
/// `parameters` and `evaluations` maps are display-only and keep their
/// insertion order. Missing or broken visualization fields are repaired to
/// defaults during deserialization, never rejected.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SchemeModel {
    pub id: u32,
    #[serde(default = "default_dimension", deserialize_with = "dimension_or_default")]
    pub width: f64,
    #[serde(default = "default_dimension", deserialize_with = "dimension_or_default")]
    pub height: f64,
    #[serde(default = "default_dimension", deserialize_with = "dimension_or_default")]
    pub depth: f64,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub parameters: Map<String, Value>,
    #[serde(default)]
    pub evaluations: Map<String, Value>,
}

impl SchemeModel {
    pub fn fill_color(&self) -> Color32 {
        parse_color(&self.color).unwrap_or_else(|| {
            parse_color(DEFAULT_COLOR).unwrap_or(Color32::from_rgb(0x42, 0x87, 0xF5))
        })
    }
}

fn default_dimension() -> f64 {
    1.0
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

fn dimension_or_default<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value.as_f64() {
        Some(dimension) if dimension.is_finite() && dimension > 0.0 => dimension,
        _ => default_dimension(),
    })
}

/// Parses a `#rrggbb` color token. Anything else is a `None`, which callers
/// repair with the default color rather than surfacing an error.
pub fn parse_color(token: &str) -> Option<Color32> {
    let hex = token.strip_prefix('#')?;
    // Length is in bytes; multibyte tokens must be rejected before slicing.
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let red = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let green = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let blue = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color32::from_rgb(red, green, blue))
}

/// Turns a snake_case field name into Title Case words for the detail panel.
pub fn format_field_label(name: &str) -> String {
    name.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Renders a parameter/evaluation scalar for a label/value row.
pub fn format_scalar(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}
