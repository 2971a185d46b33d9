use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use serde::Serialize;

use super::{Landmark, scan};
use crate::workspace::SourceFile;

/// Lookup key for a text fragment: lower-cased, outer whitespace trimmed.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Probable origin of a rendered fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    pub file: String,
    /// 1-based; landmarks have none.
    pub line: Option<usize>,
    pub context: String,
}

impl SourceLocation {
    /// `file:line`, or just `file` without a line.
    pub fn label(&self) -> String {
        match self.line {
            Some(line) => format!("{}:{}", self.file, line),
            None => self.file.clone(),
        }
    }
}

/// Normalized fragment → source location. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct CorrelationIndex {
    entries: FxHashMap<String, SourceLocation>,
}

impl CorrelationIndex {
    /// Build from curated landmarks, then the brace scan of `sources` on top.
    ///
    /// Sources are scanned in name order; within the scan a later occurrence
    /// replaces an earlier one, and any scanned entry replaces a landmark.
    pub fn build(landmarks: &[Landmark], sources: &[SourceFile]) -> Self {
        let mut entries = FxHashMap::default();

        for landmark in landmarks {
            let key = normalize(&landmark.text);
            if !key.is_empty() {
                entries.insert(key, landmark.location());
            }
        }

        let mut sources: Vec<&SourceFile> = sources.iter().collect();
        sources.sort_by(|a, b| a.name.cmp(&b.name));
        for source in sources {
            for (key, location) in scan::scan_source(&source.name, &source.content) {
                entries.insert(key, location);
            }
        }

        Self { entries }
    }

    pub fn lookup(&self, text: &str) -> Option<&SourceLocation> {
        self.entries.get(&normalize(text))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries ordered by key, for serialization.
    pub fn sorted(&self) -> BTreeMap<&str, &SourceLocation> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::SystemTime;

    fn source(name: &str, content: &str) -> SourceFile {
        SourceFile {
            name: name.into(),
            content: content.into(),
            modified: SystemTime::UNIX_EPOCH,
        }
    }

    fn landmark(text: &str) -> Landmark {
        Landmark {
            text: text.into(),
            file: "main.tex".into(),
            context: "section heading".into(),
        }
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  Senior Engineer \n"), "senior engineer");
        // inner whitespace and punctuation are kept
        assert_eq!(normalize("A  B."), "a  b.");
    }

    #[test]
    fn test_scanned_role_round_trip() {
        let content = "\\begin{document}\n\n\\role{Senior Engineer}\n";
        let index = CorrelationIndex::build(&[], &[source("experience.tex", content)]);

        let location = index.lookup("Senior Engineer").unwrap();
        assert_eq!(location.file, "experience.tex");
        assert_eq!(location.line, Some(3));
        assert_eq!(location.context, "\\role{Senior Engineer}");
        assert_eq!(location.label(), "experience.tex:3");
    }

    #[test]
    fn test_scan_overrides_landmark() {
        let index = CorrelationIndex::build(
            &[landmark("Experience"), landmark("Education")],
            &[source("main.tex", "\\section{Experience}")],
        );

        assert_eq!(index.lookup("experience").unwrap().line, Some(1));
        // no scanned collision: landmark stays, without a line
        let education = index.lookup("Education").unwrap();
        assert_eq!(education.line, None);
        assert_eq!(education.label(), "main.tex");
    }

    #[test]
    fn test_later_file_wins() {
        let index = CorrelationIndex::build(
            &[],
            &[
                source("b.tex", "\\item{Rust Tooling}"),
                source("a.tex", "\\item{Rust Tooling}"),
            ],
        );
        assert_eq!(index.lookup("rust tooling").unwrap().file, "b.tex");
    }

    #[test]
    fn test_miss() {
        let index = CorrelationIndex::build(&[landmark("Skills")], &[]);
        assert!(index.lookup("Senior Engineer").is_none());
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_sorted_view() {
        let index = CorrelationIndex::build(
            &[],
            &[source("main.tex", "\\a{Zeta Corp}\n\\b{Acme Inc}")],
        );
        let keys: Vec<_> = index.sorted().into_keys().collect();
        assert_eq!(keys, vec!["acme inc", "zeta corp"]);
    }
}
