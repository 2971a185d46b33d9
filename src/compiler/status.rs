use std::time::SystemTime;

use serde::Serialize;

use crate::utils::time::serialize_opt_millis;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompileState {
    Idle,
    Compiling,
    Success,
    Error,
}

/// Snapshot of the orchestrator's state machine.
///
/// `last_success` is the watermark: the instant the last successful compile
/// started. `revision` grows on every terminal transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompileStatus {
    pub state: CompileState,
    #[serde(serialize_with = "serialize_opt_millis")]
    pub last_success: Option<SystemTime>,
    pub last_error: Option<String>,
    pub revision: u64,
}

impl Default for CompileStatus {
    fn default() -> Self {
        Self {
            state: CompileState::Idle,
            last_success: None,
            last_error: None,
            revision: 0,
        }
    }
}

impl CompileStatus {
    pub fn is_compiling(&self) -> bool {
        self.state == CompileState::Compiling
    }

    pub(super) fn begin(&mut self) {
        self.state = CompileState::Compiling;
        self.last_error = None;
    }

    pub(super) fn succeed(&mut self, started: SystemTime) {
        self.state = CompileState::Success;
        self.last_success = Some(started);
        self.last_error = None;
        self.revision += 1;
    }

    /// Previous `last_success` is kept: a failure never moves the watermark.
    pub(super) fn fail(&mut self, message: impl Into<String>) {
        self.state = CompileState::Error;
        self.last_error = Some(message.into());
        self.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_transitions() {
        let mut status = CompileStatus::default();
        assert_eq!(status.state, CompileState::Idle);

        status.begin();
        assert!(status.is_compiling());
        assert_eq!(status.revision, 0);

        let started = SystemTime::UNIX_EPOCH + Duration::from_secs(10);
        status.succeed(started);
        assert_eq!(status.state, CompileState::Success);
        assert_eq!(status.last_success, Some(started));
        assert_eq!(status.revision, 1);

        status.begin();
        status.fail("! Undefined control sequence.");
        assert_eq!(status.state, CompileState::Error);
        assert_eq!(status.last_success, Some(started));
        assert_eq!(status.revision, 2);

        status.begin();
        assert!(status.last_error.is_none());
    }

    #[test]
    fn test_serialized_shape() {
        let mut status = CompileStatus::default();
        status.succeed(SystemTime::UNIX_EPOCH + Duration::from_millis(1234));
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["state"], "success");
        assert_eq!(json["last_success"], 1234);
        assert!(json["last_error"].is_null());

        let json = serde_json::to_value(CompileStatus::default()).unwrap();
        assert_eq!(json["state"], "idle");
        assert_eq!(json["last_success"], 0);
    }
}
