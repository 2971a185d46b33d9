//! Source lookup from the command line.

use anyhow::{Result, bail};
use owo_colors::OwoColorize;

use crate::config::PreviewConfig;
use crate::correlate::SourceLocation;
use crate::workspace::Workspace;

/// Print where `text` most likely comes from.
pub fn locate(config: &PreviewConfig, words: &[String], json: bool) -> Result<()> {
    let text = words.join(" ");
    let Some(location) = lookup(config, &text)? else {
        bail!("no source found for `{text}`");
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&location)?);
    } else {
        println!("{}", location.label().bold());
        if !location.context.is_empty() {
            println!("  {}", location.context.dimmed());
        }
    }
    Ok(())
}

fn lookup(config: &PreviewConfig, text: &str) -> Result<Option<SourceLocation>> {
    let workspace = Workspace::from_config(config);
    workspace.rebuild_index()?;
    Ok(workspace.controller().lookup(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config_at;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_lookup_scanned_and_landmark() {
        let temp = TempDir::new().unwrap();
        let config = test_config_at(temp.path());
        fs::write(
            temp.path().join("education.tex"),
            "\\section{Education}\n\\degree{MSc Computer Science}\n",
        )
        .unwrap();

        let hit = lookup(&config, "msc computer science").unwrap().unwrap();
        assert_eq!(hit.label(), "education.tex:2");

        // scanned occurrence wins over the landmark
        let heading = lookup(&config, "Education").unwrap().unwrap();
        assert_eq!(heading.label(), "education.tex:1");

        let landmark = lookup(&config, "Projects").unwrap().unwrap();
        assert_eq!(landmark.label(), "main.tex");
    }

    #[test]
    fn test_locate_miss_is_error() {
        let temp = TempDir::new().unwrap();
        let config = test_config_at(temp.path());
        let err = locate(&config, &["nothing".into(), "here".into()], false).unwrap_err();
        assert!(err.to_string().contains("nothing here"));
    }
}
