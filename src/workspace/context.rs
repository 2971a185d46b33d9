//! The per-workspace context shared by the server, the watcher and the CLI.

use tokio::sync::broadcast;

use super::{SourceFile, SourceStore, StoreError};
use crate::compiler::Orchestrator;
use crate::config::PreviewConfig;
use crate::correlate::{InteractionController, Landmark};
use crate::log;

/// Store, orchestrator and interaction controller of one workspace.
pub struct Workspace {
    store: SourceStore,
    orchestrator: Orchestrator,
    controller: InteractionController,
    index_events: broadcast::Sender<usize>,
}

impl Workspace {
    pub fn from_config(config: &PreviewConfig) -> Self {
        let store = SourceStore::from_config(&config.workspace);
        let orchestrator = Orchestrator::new(store.clone(), &config.workspace, &config.compile);
        let landmarks = Landmark::from_config(&config.correlate, &config.workspace.main);
        let controller = InteractionController::new(landmarks, config.correlate.tooltip_ms);
        let (index_events, _) = broadcast::channel(16);

        Self {
            store,
            orchestrator,
            controller,
            index_events,
        }
    }

    pub fn store(&self) -> &SourceStore {
        &self.store
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    /// Receive the entry count after every index rebuild.
    pub fn subscribe_index(&self) -> broadcast::Receiver<usize> {
        self.index_events.subscribe()
    }

    /// Rebuild the correlation index from every tracked file.
    pub fn rebuild_index(&self) -> Result<usize, StoreError> {
        let sources = self.store.read_all()?;
        let len = self.controller.rebuild(&sources);
        let _ = self.index_events.send(len);
        Ok(len)
    }

    /// Save a file and refresh the index. Compiling is left to the caller's
    /// scheduler so bursts of saves collapse into one compile.
    pub fn save(&self, name: &str, content: &str) -> Result<SourceFile, StoreError> {
        let file = self.store.write(name, content)?;
        if let Err(e) = self.rebuild_index() {
            log!("correlate"; "index rebuild failed: {}", e);
        }
        Ok(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config_at;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_save_rebuilds_index() {
        let temp = TempDir::new().unwrap();
        let workspace = Workspace::from_config(&test_config_at(temp.path()));
        let mut events = workspace.subscribe_index();

        workspace.save("skills.tex", "\\skill{Distributed Systems}").unwrap();

        let location = workspace.controller().lookup("distributed systems").unwrap();
        assert_eq!(location.file, "skills.tex");
        assert_eq!(location.line, Some(1));
        assert!(events.try_recv().is_ok());
    }

    #[test]
    fn test_rejected_save_leaves_index() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("main.tex"), "\\role{Senior Engineer}").unwrap();
        let workspace = Workspace::from_config(&test_config_at(temp.path()));
        workspace.rebuild_index().unwrap();
        let before = workspace.controller().index();

        assert!(workspace.save("main.tex", "").is_err());
        assert!(std::sync::Arc::ptr_eq(&before, &workspace.controller().index()));
    }

    #[test]
    fn test_default_landmarks_point_at_main() {
        let temp = TempDir::new().unwrap();
        let workspace = Workspace::from_config(&test_config_at(temp.path()));
        let location = workspace.controller().lookup("experience").unwrap();
        assert_eq!(location.file, "main.tex");
        assert_eq!(location.line, None);
    }
}
