//! The command dispatcher state machine.
//!
//! Sequences parse -> route -> remote call -> state update for each
//! submitted line. The dispatcher is the only writer of the session store;
//! every failure a handler can encounter is converted into a transcript
//! line, never propagated.
//!
//! Concurrency discipline: submissions are queued FIFO and drained one at a
//! time, so at most one remote call is ever outstanding. Each submission is
//! tagged with a monotonically increasing sequence number at submit time; a
//! remote outcome is applied only if its submission is still the most
//! recently issued one. A superseded outcome is discarded wholesale: no
//! directory change, no transcript line.

use std::collections::VecDeque;

use tracing::{debug, warn};

use webterm_protocol::{FailureClass, RemoteDirectoryClient, RemoteFailure};

use crate::parser::{Verb, parse_command};
use crate::session::{ROOT_DIRECTORY, SessionState, SessionStore};

/// Appended when the server rejects a command with a non-success status.
pub const COMMAND_NOT_FOUND: &str = "Command not found";
/// Appended when a command could not be carried out at all.
pub const EXECUTION_ERROR: &str = "Command execution error";

/// Dispatcher lifecycle states. `Settled` is transient: it is entered while
/// a handler's outcome is applied to the store and left again before the
/// next submission is taken off the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Idle,
    AwaitingRemote,
    Settled,
}

/// A queued line, tagged with its issue-order sequence number.
#[derive(Debug)]
struct Submission {
    seq: u64,
    raw: String,
}

/// What a settled handler wants done to the store.
enum Outcome {
    /// Confirmed directory change: move both directory fields, append lines.
    DirectoryChanged { cwd: String, lines: Vec<String> },
    /// Transcript-only result (listing, history, any failure).
    Output { lines: Vec<String> },
}

/// Drives one session against a [`RemoteDirectoryClient`].
pub struct Dispatcher<C> {
    client: C,
    store: SessionStore,
    state: DispatchState,
    queue: VecDeque<Submission>,
    latest_seq: u64,
}

impl<C: RemoteDirectoryClient> Dispatcher<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            store: SessionStore::new(),
            state: DispatchState::Idle,
            queue: VecDeque::new(),
            latest_seq: 0,
        }
    }

    /// Current session state, cloned for the renderer.
    pub fn snapshot(&self) -> SessionState {
        self.store.snapshot()
    }

    pub fn state(&self) -> DispatchState {
        self.state
    }

    /// One-shot startup probe: seed the directory fields from the server.
    ///
    /// On success the reported cwd becomes the initial directory and is
    /// appended to the transcript. On failure the session falls back to root
    /// and that fallback is appended instead; the probe never repeats. Any
    /// lines submitted before the probe settles are drained afterwards in
    /// order.
    pub async fn start(&mut self) {
        self.state = DispatchState::AwaitingRemote;
        let outcome = match self.client.probe_directory().await {
            Ok(cwd) => Outcome::DirectoryChanged {
                lines: vec![cwd.clone()],
                cwd,
            },
            Err(failure) => {
                warn!("startup probe failed, falling back to root: {failure}");
                Outcome::DirectoryChanged {
                    cwd: ROOT_DIRECTORY.to_string(),
                    lines: vec![ROOT_DIRECTORY.to_string()],
                }
            }
        };
        self.settle(outcome);
        self.run_until_idle().await;
    }

    /// Enqueue a typed line. Returns immediately; the line runs when
    /// [`run_until_idle`](Self::run_until_idle) drains the queue.
    pub fn submit(&mut self, line: &str) {
        self.latest_seq += 1;
        self.store.set_pending(line);
        self.queue.push_back(Submission {
            seq: self.latest_seq,
            raw: line.to_string(),
        });
    }

    /// Drain queued submissions FIFO, one remote call at a time.
    pub async fn run_until_idle(&mut self) {
        while let Some(submission) = self.queue.pop_front() {
            self.handle(submission).await;
        }
    }

    /// Submit a line and drain the queue: the common interactive path.
    pub async fn submit_and_run(&mut self, line: &str) {
        self.submit(line);
        self.run_until_idle().await;
    }

    async fn handle(&mut self, submission: Submission) {
        let command = parse_command(&submission.raw);
        match command.verb {
            // Purely local; no remote call, so the dispatcher never leaves
            // `Idle` and there is nothing to supersede.
            Verb::Clear => {
                self.store.reset();
            }
            Verb::History => {
                let limit = command.args.first().and_then(|arg| arg.parse::<usize>().ok());
                self.state = DispatchState::AwaitingRemote;
                let outcome = match self.client.fetch_history().await {
                    Ok(entries) => Outcome::Output {
                        lines: history_window(&entries, limit),
                    },
                    Err(failure) => {
                        debug!("history fetch failed: {failure}");
                        Outcome::Output {
                            lines: vec![COMMAND_NOT_FOUND.to_string()],
                        }
                    }
                };
                self.apply_if_current(submission.seq, outcome);
            }
            Verb::Ls => {
                let options = command.args.join(" ");
                self.state = DispatchState::AwaitingRemote;
                let outcome = match self.client.list_directory(&options).await {
                    Ok(listing) => Outcome::Output {
                        lines: vec![listing],
                    },
                    Err(failure) => {
                        debug!("listing failed: {failure}");
                        Outcome::Output {
                            lines: vec![ls_failure_line(failure)],
                        }
                    }
                };
                self.apply_if_current(submission.seq, outcome);
            }
            Verb::PassThrough => {
                self.state = DispatchState::AwaitingRemote;
                let outcome = match self.client.change_directory(&submission.raw).await {
                    Ok(cwd) => Outcome::DirectoryChanged {
                        lines: vec![cwd.clone()],
                        cwd,
                    },
                    Err(failure) => {
                        debug!("directory change rejected: {failure}");
                        Outcome::Output {
                            lines: vec![pass_through_failure_line(failure)],
                        }
                    }
                };
                self.apply_if_current(submission.seq, outcome);
            }
        }
    }

    /// Apply a remote outcome unless the submission has been superseded by a
    /// later one, in which case the outcome is dropped entirely.
    fn apply_if_current(&mut self, seq: u64, outcome: Outcome) {
        if seq == self.latest_seq {
            self.settle(outcome);
        } else {
            debug!(
                "discarding stale response for submission {seq} (latest is {})",
                self.latest_seq
            );
            self.state = DispatchState::Idle;
        }
    }

    fn settle(&mut self, outcome: Outcome) {
        self.state = DispatchState::Settled;
        match outcome {
            Outcome::DirectoryChanged { cwd, lines } => self.store.apply_success(&cwd, lines),
            Outcome::Output { lines } => self.store.apply_output(lines),
        }
        self.state = DispatchState::Idle;
    }
}

/// Select and number the displayed history window.
///
/// `limit` keeps the most-recent `min(limit, len)` entries; no limit keeps
/// them all. The window is displayed oldest-first and renumbered from 1.
fn history_window(entries: &[webterm_protocol::HistoryEntry], limit: Option<usize>) -> Vec<String> {
    let shown = limit.unwrap_or(entries.len()).min(entries.len());
    entries[entries.len() - shown..]
        .iter()
        .enumerate()
        .map(|(index, entry)| format!("{}. {}", index + 1, entry.command))
        .collect()
}

/// A failed listing shows the server's message when it sent one.
fn ls_failure_line(failure: RemoteFailure) -> String {
    failure
        .message
        .unwrap_or_else(|| EXECUTION_ERROR.to_string())
}

/// A rejected directory change reads differently from one that never
/// reached the server.
fn pass_through_failure_line(failure: RemoteFailure) -> String {
    match failure.class {
        FailureClass::Protocol => COMMAND_NOT_FOUND.to_string(),
        FailureClass::Transport => EXECUTION_ERROR.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use webterm_protocol::HistoryEntry;

    fn entries(commands: &[&str]) -> Vec<HistoryEntry> {
        commands
            .iter()
            .map(|c| HistoryEntry {
                command: (*c).to_string(),
                cwd: None,
            })
            .collect()
    }

    #[test]
    fn history_window_takes_most_recent_and_renumbers_oldest_first() {
        let all = entries(&["a", "b", "c", "d", "e"]);
        assert_eq!(
            history_window(&all, Some(3)),
            vec!["1. c".to_string(), "2. d".to_string(), "3. e".to_string()]
        );
    }

    #[test]
    fn history_window_without_limit_shows_everything() {
        let all = entries(&["a", "b"]);
        assert_eq!(
            history_window(&all, None),
            vec!["1. a".to_string(), "2. b".to_string()]
        );
    }

    #[test]
    fn history_window_clamps_oversized_limits() {
        let all = entries(&["a", "b"]);
        assert_eq!(history_window(&all, Some(10)).len(), 2);
        assert!(history_window(&all, Some(0)).is_empty());
    }

    #[test]
    fn ls_failure_prefers_the_server_message() {
        let with_message = RemoteFailure::protocol(Some("permission denied".to_string()));
        assert_eq!(ls_failure_line(with_message), "permission denied");
        assert_eq!(ls_failure_line(RemoteFailure::transport()), EXECUTION_ERROR);
        assert_eq!(
            ls_failure_line(RemoteFailure::protocol(None)),
            EXECUTION_ERROR
        );
    }

    #[test]
    fn pass_through_failure_lines_distinguish_classes() {
        assert_eq!(
            pass_through_failure_line(RemoteFailure::protocol(Some("ignored".to_string()))),
            COMMAND_NOT_FOUND
        );
        assert_eq!(
            pass_through_failure_line(RemoteFailure::transport()),
            EXECUTION_ERROR
        );
    }
}
