//! Session state: current directory, transcript, pending input.
//!
//! [`SessionState`] is a plain cloneable value; the renderer only ever sees
//! snapshots of it. [`SessionStore`] owns the live copy and is mutated
//! exclusively by the dispatcher. Every mutation is a single call, so the
//! renderer can never observe a half-applied transition.

/// Root directory, also the fallback when the startup probe fails.
pub const ROOT_DIRECTORY: &str = "/";

/// One session's observable state.
///
/// Invariant: outside of an in-flight remote request, `current_directory`
/// equals `last_known_good_directory`. The scrollback only grows, except for
/// the explicit reset performed by the `clear` verb.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub current_directory: String,
    pub last_known_good_directory: String,
    /// Append-only transcript lines, insertion order significant.
    pub scrollback: Vec<String>,
    /// The line currently sitting in the input box.
    pub pending_input: String,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            current_directory: ROOT_DIRECTORY.to_string(),
            last_known_good_directory: ROOT_DIRECTORY.to_string(),
            scrollback: Vec::new(),
            pending_input: String::new(),
        }
    }
}

/// Owner of the live [`SessionState`].
#[derive(Debug, Default)]
pub struct SessionStore {
    state: SessionState,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state, cloned for the renderer.
    pub fn snapshot(&self) -> SessionState {
        self.state.clone()
    }

    /// Record the typed line while its submission is outstanding.
    pub fn set_pending(&mut self, input: &str) {
        self.state.pending_input = input.to_string();
    }

    /// Apply a confirmed directory change: both directory fields move to the
    /// server's answer, the given lines are appended, pending input clears.
    pub fn apply_success(&mut self, new_directory: &str, lines: Vec<String>) {
        self.state.current_directory = new_directory.to_string();
        self.state.last_known_good_directory = new_directory.to_string();
        self.state.scrollback.extend(lines);
        self.state.pending_input.clear();
    }

    /// Append transcript lines without touching the directory fields.
    ///
    /// Used both for failures and for successes that carry no directory
    /// (listing, history), whose state effect is identical.
    pub fn apply_output(&mut self, lines: Vec<String>) {
        self.state.scrollback.extend(lines);
        self.state.pending_input.clear();
    }

    /// The `clear` verb: empty the scrollback and the input box. Directory
    /// fields are untouched.
    pub fn reset(&mut self) {
        self.state.scrollback.clear();
        self.state.pending_input.clear();
    }
}
