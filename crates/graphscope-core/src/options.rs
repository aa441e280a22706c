//! Configuration options for picking.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::pick::ID_SPACE_END;

/// Configuration for the picking subsystem of a view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickingOptions {
    /// Whether picking is enabled when the view is created.
    pub enabled: bool,

    /// Whether pointer moves are hit-tested for hover events.
    pub hover: bool,

    /// Pointer travel (device pixels) above which a press/release pair is a
    /// drag rather than a click.
    pub click_drag_threshold: f32,

    /// Exclusive end of the usable pick id space.
    pub id_space_end: u32,
}

impl Default for PickingOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            hover: true,
            click_drag_threshold: 4.0,
            id_space_end: ID_SPACE_END,
        }
    }
}

impl PickingOptions {
    /// Parses options from a JSON string. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads options from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Serializes the options to pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let options = PickingOptions::from_json_str(r#"{ "hover": false }"#).unwrap();
        assert!(!options.hover);
        assert!(options.enabled);
        assert_eq!(options.id_space_end, ID_SPACE_END);
    }

    #[test]
    fn test_json_roundtrip() {
        let options = PickingOptions {
            enabled: false,
            click_drag_threshold: 2.5,
            ..PickingOptions::default()
        };
        let json = options.to_json_string().unwrap();
        assert_eq!(PickingOptions::from_json_str(&json).unwrap(), options);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(PickingOptions::from_json_str("{ enabled: ").is_err());
    }
}
