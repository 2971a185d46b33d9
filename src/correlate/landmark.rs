//! Curated landmarks from `[[correlate.landmark]]`.

use super::SourceLocation;
use crate::config::CorrelateConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Landmark {
    pub text: String,
    pub file: String,
    pub context: String,
}

impl Landmark {
    /// Landmarks without a `file` point at `main`.
    pub fn from_config(config: &CorrelateConfig, main: &str) -> Vec<Self> {
        config
            .landmarks
            .iter()
            .map(|l| Self {
                text: l.text.clone(),
                file: l.file.clone().unwrap_or_else(|| main.to_string()),
                context: l.context.clone(),
            })
            .collect()
    }

    pub(super) fn location(&self) -> SourceLocation {
        SourceLocation {
            file: self.file.clone(),
            line: None,
            context: self.context.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_file_defaults_to_main() {
        let config = test_parse_config(
            "[[correlate.landmark]]\ntext = \"Jane Doe\"\ncontext = \"name\"\n\
             [[correlate.landmark]]\ntext = \"Skills\"\nfile = \"skills.tex\"",
        );
        let landmarks = Landmark::from_config(&config.correlate, "resume.tex");
        assert_eq!(landmarks[0].file, "resume.tex");
        assert_eq!(landmarks[1].file, "skills.tex");
        assert_eq!(landmarks[1].context, "");
    }
}
