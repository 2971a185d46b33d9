//! `[correlate]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [correlate]
//! tooltip_ms = 2500           # How long the jump tooltip stays visible
//!
//! [[correlate.landmark]]
//! text = "Jane Doe"           # Text as it appears in the rendered document
//! file = "header.tex"         # Defaults to workspace.main
//! context = "document title"
//! ```
//!
//! Landmarks are the curated part of the correlation index: structural text
//! the brace scan cannot attribute reliably. Any scanned occurrence of the
//! same text takes precedence because it carries a line number.

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrelateConfig {
    /// Tooltip auto-dismiss delay in milliseconds.
    pub tooltip_ms: u64,

    /// Curated text → file entries.
    #[serde(rename = "landmark")]
    pub landmarks: Vec<LandmarkConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LandmarkConfig {
    pub text: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub context: String,
}

impl LandmarkConfig {
    fn heading(text: &str) -> Self {
        Self {
            text: text.into(),
            file: None,
            context: "section heading".into(),
        }
    }
}

impl CorrelateConfig {
    pub const LANDMARK: FieldPath = FieldPath::new("correlate.landmark");

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        for landmark in &self.landmarks {
            if landmark.text.trim().is_empty() {
                diag.error(Self::LANDMARK, "landmark text must not be empty");
            }
        }
    }
}

impl Default for CorrelateConfig {
    fn default() -> Self {
        Self {
            tooltip_ms: 2500,
            landmarks: vec![
                LandmarkConfig {
                    text: "Curriculum Vitae".into(),
                    file: None,
                    context: "document title".into(),
                },
                LandmarkConfig::heading("Experience"),
                LandmarkConfig::heading("Education"),
                LandmarkConfig::heading("Skills"),
                LandmarkConfig::heading("Projects"),
                LandmarkConfig::heading("Publications"),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{ConfigDiagnostics, test_parse_config};

    #[test]
    fn test_default_landmarks() {
        let config = test_parse_config("");
        assert_eq!(config.correlate.tooltip_ms, 2500);
        assert!(config.correlate.landmarks.iter().any(|l| l.text == "Experience"));
    }

    #[test]
    fn test_landmarks_replace_defaults() {
        let config = test_parse_config(
            "[[correlate.landmark]]\ntext = \"Jane Doe\"\nfile = \"header.tex\"\ncontext = \"name\"",
        );
        assert_eq!(config.correlate.landmarks.len(), 1);
        let landmark = &config.correlate.landmarks[0];
        assert_eq!(landmark.file.as_deref(), Some("header.tex"));
        assert_eq!(landmark.context, "name");
    }

    #[test]
    fn test_empty_landmark_rejected() {
        let config = test_parse_config("[[correlate.landmark]]\ntext = \"  \"");
        let mut diag = ConfigDiagnostics::new();
        config.correlate.validate(&mut diag);
        assert_eq!(diag.errors().len(), 1);
    }
}
