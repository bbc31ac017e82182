//! Interactive spell-check server.
//!
//! A client connects, sends one line of words and answers a y/n prompt per
//! word. Each word is ranked against a shared dictionary by edit distance;
//! unknown words are either added to the dictionary or replaced by their
//! closest match. The dictionary is written back to disk after every
//! request.
//!
//! - [`cli`] parses the command-line interface for server and client modes.
//! - [`config`] holds the validated runtime [`config::Settings`].
//! - [`matching`] computes edit distances and top-k rankings.
//! - [`dictionary`] owns the shared word list behind a single lock.
//! - [`gate`] serializes the interactive prompt/response exchange.
//! - [`session`] drives one word from ranking to resolution.
//! - [`dispatcher`] validates a request, fans out sessions and persists.
//! - [`protocol`] is the plain-text wire format and connection wrapper.
//! - [`server`] accepts TCP connections; [`client`] is a terminal client.
//!
//! There are two independent locks. The dictionary lock covers scans,
//! appends and persists and is never held across client I/O. The
//! interactive gate covers a word's ranking, prompts and answers, and by default is
//! shared by the whole server so only one word anywhere waits on a client
//! at a time.

pub mod cli;
pub mod client;
pub mod config;
pub mod dictionary;
pub mod dispatcher;
pub mod gate;
pub mod matching;
pub mod protocol;
pub mod server;
pub mod session;
