//! Engine independent description of map controls.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Corner of the map container a control is docked to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ControlPosition {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Default for ControlPosition {
    fn default() -> Self {
        ControlPosition::TopRight
    }
}

/// Built-in controls an engine may provide
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ControlKind {
    Zoom,
    Attribution,
    Custom(String),
}

impl fmt::Display for ControlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlKind::Zoom => write!(f, "ZOOM"),
            ControlKind::Attribution => write!(f, "ATTRIBUTION"),
            ControlKind::Custom(name) => write!(f, "{}", name),
        }
    }
}

impl FromStr for ControlKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_uppercase().as_str() {
            "ZOOM" => ControlKind::Zoom,
            "ATTRIBUTION" => ControlKind::Attribution,
            _ => ControlKind::Custom(s.to_string()),
        })
    }
}

/// Options for built-in controls
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ControlOptions {
    pub position: Option<ControlPosition>,
    /// Free-form engine options
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Options of [`MapControl`] instantiation
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateControlOptions {
    pub bar: bool,
    pub margin: bool,
    pub add_class: Option<String>,
}

/// Universal control that any map adapter can host.
pub trait MapControl: Send + Sync {
    /// Called when the control is mounted; returns the rendered content
    fn on_add(&self) -> String;

    fn on_remove(&self) {}
}
