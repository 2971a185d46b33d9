//! Heuristic brace scan.
//!
//! Every innermost `{...}` group is a candidate. Groups containing a
//! backslash are markup, not rendered text; groups of three characters or
//! fewer are too ambiguous (`{1em}`, `{r}`) to be worth an entry.

use std::sync::LazyLock;

use regex::Regex;

use super::{SourceLocation, normalize};

static RE_BRACE_GROUP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{([^{}]*)\}").unwrap());

const MIN_LEN: usize = 4;

/// Entries for one file in source order. Duplicates are kept; the caller's
/// insertion order decides which one survives.
pub(super) fn scan_source(file: &str, content: &str) -> Vec<(String, SourceLocation)> {
    let mut entries = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        for caps in RE_BRACE_GROUP.captures_iter(line) {
            let inner = &caps[1];
            if inner.contains('\\') || inner.chars().count() < MIN_LEN {
                continue;
            }
            let key = normalize(inner);
            if key.is_empty() {
                continue;
            }
            entries.push((
                key,
                SourceLocation {
                    file: file.to_string(),
                    line: Some(idx + 1),
                    context: line.trim().to_string(),
                },
            ));
        }
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(content: &str) -> Vec<String> {
        scan_source("main.tex", content)
            .into_iter()
            .map(|(k, _)| k)
            .collect()
    }

    #[test]
    fn test_multiple_groups_per_line() {
        assert_eq!(
            keys("\\job{Acme Inc}{Senior Engineer}{NYC}"),
            vec!["acme inc", "senior engineer"]
        );
    }

    #[test]
    fn test_length_threshold() {
        assert!(keys("\\vspace{1em}").is_empty());
        assert_eq!(keys("\\item{Rust}"), vec!["rust"]);
    }

    #[test]
    fn test_escapes_excluded() {
        assert!(keys("\\href{\\url{x}}{Website}").contains(&"website".to_string()));
        assert!(keys("{Research \\& Development}").is_empty());
    }

    #[test]
    fn test_only_innermost_groups() {
        assert_eq!(
            keys("\\textbf{\\emph{Distinguished Award}}"),
            vec!["distinguished award"]
        );
    }

    #[test]
    fn test_whitespace_only_group_skipped() {
        assert!(keys("\\hspace{    }").is_empty());
    }

    #[test]
    fn test_location_fields() {
        let entries = scan_source("skills.tex", "\n  \\skill{Distributed Systems}  \n");
        let (_, loc) = &entries[0];
        assert_eq!(loc.file, "skills.tex");
        assert_eq!(loc.line, Some(2));
        assert_eq!(loc.context, "\\skill{Distributed Systems}");
    }
}
