//! Click handling over the correlation index.
//!
//! In `Compare` mode a click on rendered text jumps to its source; in
//! `Select` mode clicks fall through to normal text selection. Switching
//! modes never touches the index.

use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::{CorrelationIndex, Landmark, SourceLocation};
use crate::debug;
use crate::workspace::SourceFile;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionMode {
    #[default]
    Compare,
    Select,
}

/// Transient hint shown at the jump target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tooltip {
    pub label: String,
    pub context: String,
    pub dismiss_after_ms: u64,
}

/// What the presentation layer should do after a hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JumpEffects {
    /// Set only when the target differs from the open file.
    pub open_file: Option<String>,
    pub caret_line: Option<usize>,
    pub tooltip: Tooltip,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ClickOutcome {
    /// Select mode.
    Ignored,
    /// Compare mode, no entry for the text.
    Miss,
    Jump(JumpEffects),
}

pub struct InteractionController {
    index: ArcSwap<CorrelationIndex>,
    landmarks: Vec<Landmark>,
    tooltip_ms: u64,
    mode: Mutex<InteractionMode>,
    open_file: Mutex<Option<String>>,
    last_jump: Mutex<Option<SourceLocation>>,
}

impl InteractionController {
    pub fn new(landmarks: Vec<Landmark>, tooltip_ms: u64) -> Self {
        let index = CorrelationIndex::build(&landmarks, &[]);
        Self {
            index: ArcSwap::from_pointee(index),
            landmarks,
            tooltip_ms,
            mode: Mutex::new(InteractionMode::default()),
            open_file: Mutex::new(None),
            last_jump: Mutex::new(None),
        }
    }

    /// Current index. Readers keep their snapshot across a rebuild.
    pub fn index(&self) -> Arc<CorrelationIndex> {
        self.index.load_full()
    }

    /// Rebuild from the full source set and swap it in.
    pub fn rebuild(&self, sources: &[SourceFile]) -> usize {
        let index = CorrelationIndex::build(&self.landmarks, sources);
        let len = index.len();
        self.index.store(Arc::new(index));
        debug!("correlate"; "index rebuilt: {} entries from {} files", len, sources.len());
        len
    }

    pub fn lookup(&self, text: &str) -> Option<SourceLocation> {
        self.index.load().lookup(text).cloned()
    }

    pub fn mode(&self) -> InteractionMode {
        *self.mode.lock()
    }

    pub fn set_mode(&self, mode: InteractionMode) {
        *self.mode.lock() = mode;
    }

    pub fn open_file(&self) -> Option<String> {
        self.open_file.lock().clone()
    }

    /// Record a file the user opened in the editor.
    pub fn set_open_file(&self, name: impl Into<String>) {
        *self.open_file.lock() = Some(name.into());
    }

    pub fn click(&self, text: &str) -> ClickOutcome {
        if self.mode() == InteractionMode::Select {
            return ClickOutcome::Ignored;
        }
        match self.lookup(text) {
            Some(location) => ClickOutcome::Jump(self.jump(location)),
            None => {
                debug!("correlate"; "no source for {:?}", text);
                ClickOutcome::Miss
            }
        }
    }

    /// Jump to the last target again, as when its tooltip is clicked.
    ///
    /// Effects are computed against the file open now, so a re-click after
    /// switching away reopens the target.
    pub fn repeat_jump(&self) -> Option<JumpEffects> {
        let location = self.last_jump.lock().clone()?;
        Some(self.jump(location))
    }

    fn jump(&self, location: SourceLocation) -> JumpEffects {
        *self.last_jump.lock() = Some(location.clone());
        let open_file = {
            let mut open = self.open_file.lock();
            if open.as_deref() == Some(location.file.as_str()) {
                None
            } else {
                *open = Some(location.file.clone());
                Some(location.file.clone())
            }
        };

        JumpEffects {
            open_file,
            caret_line: location.line,
            tooltip: Tooltip {
                label: location.label(),
                context: location.context.clone(),
                dismiss_after_ms: self.tooltip_ms,
            },
            location,
        }
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

    fn controller() -> InteractionController {
        let landmarks = vec![Landmark {
            text: "Education".into(),
            file: "main.tex".into(),
            context: "section heading".into(),
        }];
        let controller = InteractionController::new(landmarks, 2500);
        controller.rebuild(&[
            source("main.tex", "\\section{Experience}\n\\input{experience}"),
            source("experience.tex", "\n\\role{Senior Engineer}"),
        ]);
        controller
    }

    fn expect_jump(outcome: ClickOutcome) -> JumpEffects {
        match outcome {
            ClickOutcome::Jump(effects) => effects,
            other => panic!("expected jump, got {other:?}"),
        }
    }

    #[test]
    fn test_click_jumps_to_scanned_line() {
        let controller = controller();
        controller.set_open_file("main.tex");

        let effects = expect_jump(controller.click("senior engineer "));
        assert_eq!(effects.open_file.as_deref(), Some("experience.tex"));
        assert_eq!(effects.caret_line, Some(2));
        assert_eq!(effects.tooltip.label, "experience.tex:2");
        assert_eq!(effects.tooltip.context, "\\role{Senior Engineer}");
        assert_eq!(effects.tooltip.dismiss_after_ms, 2500);
        assert_eq!(controller.open_file().as_deref(), Some("experience.tex"));
    }

    #[test]
    fn test_same_file_is_not_reopened() {
        let controller = controller();
        controller.set_open_file("main.tex");

        let effects = expect_jump(controller.click("Experience"));
        assert!(effects.open_file.is_none());
        assert_eq!(effects.caret_line, Some(1));
    }

    #[test]
    fn test_landmark_jump_has_no_caret() {
        let controller = controller();
        let effects = expect_jump(controller.click("Education"));
        assert_eq!(effects.caret_line, None);
        assert_eq!(effects.tooltip.label, "main.tex");
    }

    #[test]
    fn test_miss_has_no_effect() {
        let controller = controller();
        controller.set_open_file("main.tex");
        assert_eq!(controller.click("Lorem ipsum"), ClickOutcome::Miss);
        assert_eq!(controller.open_file().as_deref(), Some("main.tex"));
        assert!(controller.repeat_jump().is_none());
    }

    #[test]
    fn test_select_mode_ignores_clicks() {
        let controller = controller();
        let before = controller.index();

        controller.set_mode(InteractionMode::Select);
        assert_eq!(controller.click("Senior Engineer"), ClickOutcome::Ignored);
        assert!(controller.open_file().is_none());

        controller.set_mode(InteractionMode::Compare);
        assert!(matches!(controller.click("Senior Engineer"), ClickOutcome::Jump(_)));
        // mode switches never rebuild
        assert!(Arc::ptr_eq(&before, &controller.index()));
    }

    #[test]
    fn test_repeat_jump() {
        let controller = controller();
        assert!(controller.repeat_jump().is_none());

        let first = expect_jump(controller.click("Senior Engineer"));
        assert_eq!(first.open_file.as_deref(), Some("experience.tex"));

        // target already open: same caret and tooltip, no file switch
        let again = controller.repeat_jump().unwrap();
        assert_eq!(again.open_file, None);
        assert_eq!(again.caret_line, first.caret_line);
        assert_eq!(again.tooltip, first.tooltip);
    }

    #[test]
    fn test_repeat_jump_after_switching_away() {
        let controller = controller();
        controller.set_open_file("experience.tex");
        let first = expect_jump(controller.click("Senior Engineer"));
        assert_eq!(first.open_file, None);

        controller.set_open_file("main.tex");
        let again = controller.repeat_jump().unwrap();
        assert_eq!(again.open_file.as_deref(), Some("experience.tex"));
        assert_eq!(again.caret_line, Some(2));
        assert_eq!(controller.open_file().as_deref(), Some("experience.tex"));
    }

    #[test]
    fn test_rebuild_swaps_index() {
        let controller = controller();
        let old = controller.index();

        controller.rebuild(&[source("main.tex", "\\role{Staff Engineer}")]);
        assert!(controller.lookup("Senior Engineer").is_none());
        assert!(controller.lookup("Staff Engineer").is_some());
        // earlier snapshot is unaffected
        assert!(old.lookup("Senior Engineer").is_some());
    }

    #[test]
    fn test_outcome_json() {
        let json = serde_json::to_value(ClickOutcome::Miss).unwrap();
        assert_eq!(json["outcome"], "miss");

        let controller = controller();
        let json = serde_json::to_value(controller.click("Senior Engineer")).unwrap();
        assert_eq!(json["outcome"], "jump");
        assert_eq!(json["caret_line"], 2);
        assert_eq!(json["tooltip"]["label"], "experience.tex:2");
    }

    #[test]
    fn test_mode_json() {
        let mode: InteractionMode = serde_json::from_str("\"select\"").unwrap();
        assert_eq!(mode, InteractionMode::Select);
    }
}
