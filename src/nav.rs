//! Grid/focus navigation state machine.
//!
//! The studio shows one session at a time. In grid mode all artifacts of
//! the current session are visible and next/prev step between sessions; in
//! focus mode a single artifact fills the stage and next/prev step between
//! the artifacts of the current session. Bounds saturate — repeated calls
//! never move an index out of range.

use serde::Serialize;

use crate::session::ARTIFACTS_PER_SESSION;

/// Navigation state for the studio view.
///
/// `current_session == None` means no sessions exist yet;
/// `focused_artifact == None` means grid mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Navigator {
    /// Index of the session currently on stage.
    pub current_session: Option<usize>,
    /// Index of the focused artifact, if any.
    pub focused_artifact: Option<usize>,
}

/// Derived view flags and indices, recomputed per request.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct ViewFlags {
    /// Session index on stage, if any.
    pub current_session: Option<usize>,
    /// Focused artifact index, if any.
    pub focused_artifact: Option<usize>,
    /// Whether prev would move.
    pub can_go_back: bool,
    /// Whether next would move.
    pub can_go_forward: bool,
}

impl Navigator {
    /// Create a navigator for an empty session list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Point the view at the newest session and drop focus.
    ///
    /// Called after a session is appended; `session_count` is the new list
    /// length and is always >= 1 here.
    pub fn on_session_created(&mut self, session_count: usize) {
        if session_count > 0 {
            self.current_session = Some(session_count - 1);
        }
        self.focused_artifact = None;
    }

    /// Step forward: next artifact in focus mode, next session in grid mode.
    pub fn next(&mut self, session_count: usize) {
        match self.focused_artifact {
            Some(i) if i + 1 < ARTIFACTS_PER_SESSION => {
                self.focused_artifact = Some(i + 1);
            }
            Some(_) => {}
            None => {
                if let Some(s) = self.current_session
                    && s + 1 < session_count
                {
                    self.current_session = Some(s + 1);
                }
            }
        }
    }

    /// Step backward: previous artifact in focus mode, previous session in
    /// grid mode.
    pub fn prev(&mut self) {
        match self.focused_artifact {
            Some(i) if i > 0 => {
                self.focused_artifact = Some(i - 1);
            }
            Some(_) => {}
            None => {
                if let Some(s) = self.current_session
                    && s > 0
                {
                    self.current_session = Some(s - 1);
                }
            }
        }
    }

    /// Enter focus mode on the given artifact index.
    ///
    /// Out-of-range indices are ignored.
    pub fn focus(&mut self, artifact_index: usize) {
        if artifact_index < ARTIFACTS_PER_SESSION && self.current_session.is_some() {
            self.focused_artifact = Some(artifact_index);
        }
    }

    /// Leave focus mode, back to the grid.
    pub fn unfocus(&mut self) {
        self.focused_artifact = None;
    }

    /// Whether prev would move, given the current mode.
    #[must_use]
    pub fn can_go_back(&self, session_count: usize) -> bool {
        if session_count == 0 {
            return false;
        }
        match self.focused_artifact {
            Some(i) => i > 0,
            None => self.current_session.is_some_and(|s| s > 0),
        }
    }

    /// Whether next would move, given the current mode.
    #[must_use]
    pub fn can_go_forward(&self, session_count: usize) -> bool {
        if session_count == 0 {
            return false;
        }
        match self.focused_artifact {
            Some(i) => i + 1 < ARTIFACTS_PER_SESSION,
            None => self
                .current_session
                .is_some_and(|s| s + 1 < session_count),
        }
    }

    /// Snapshot the derived flags for the UI.
    #[must_use]
    pub fn flags(&self, session_count: usize) -> ViewFlags {
        ViewFlags {
            current_session: self.current_session,
            focused_artifact: self.focused_artifact,
            can_go_back: self.can_go_back(session_count),
            can_go_forward: self.can_go_forward(session_count),
        }
    }
}
