//! Command dispatch and session-state synchronization for the webterm
//! pseudo-shell.
//!
//! A session owns a transcript and a notion of "current directory" that the
//! remote directory service is authoritative over. Typed lines are parsed
//! into a verb plus arguments ([`parser`]), routed by the [`dispatch`] state
//! machine, and their outcomes applied to the [`session`] store. Rendering
//! the transcript and obtaining the session credential are the host page's
//! concern; this crate only ever exposes state snapshots.

pub mod dispatch;
pub mod parser;
pub mod session;

pub use dispatch::{COMMAND_NOT_FOUND, Dispatcher, DispatchState, EXECUTION_ERROR};
pub use parser::{CommandLine, Verb, parse_command};
pub use session::{SessionState, SessionStore};
