//! Command line parsing.
//!
//! The grammar is deliberately small: the first whitespace-delimited token,
//! lowercased, selects a verb; everything else on the line is an argument
//! with its casing preserved. Any verb outside the recognized set (the
//! empty verb from blank input included) is pass-through: the whole
//! original line is forwarded to the directory-change operation and the
//! server decides what it means. Parsing never fails.

/// Routing verb derived from the first token of a submitted line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    /// `clear`: local transcript reset, no remote call.
    Clear,
    /// `history [n]`: remote history fetch.
    History,
    /// `ls [options...]`: remote listing.
    Ls,
    /// Anything else, forwarded verbatim as a directory-change candidate.
    PassThrough,
}

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub verb: Verb,
    /// Tokens after the verb, casing preserved verbatim.
    pub args: Vec<String>,
    /// The original line exactly as typed, for pass-through forwarding.
    pub raw: String,
}

/// Parse a raw input line. Total: malformed input is pass-through, never an
/// error.
pub fn parse_command(raw: &str) -> CommandLine {
    let mut tokens = raw.split_whitespace();
    let verb = match tokens.next() {
        Some(first) => match first.to_lowercase().as_str() {
            "clear" => Verb::Clear,
            "history" => Verb::History,
            "ls" => Verb::Ls,
            _ => Verb::PassThrough,
        },
        None => Verb::PassThrough,
    };
    CommandLine {
        verb,
        args: tokens.map(str::to_string).collect(),
        raw: raw.to_string(),
    }
}
