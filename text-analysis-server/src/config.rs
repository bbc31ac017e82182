use std::{net::SocketAddr, path::PathBuf, time::Duration};

use anyhow::{Result, ensure};
use clap::ValueEnum;

pub const DEFAULT_LISTEN: &str = "0.0.0.0:60000";
pub const DEFAULT_INPUT_LIMIT: usize = 30;
pub const DEFAULT_OUTPUT_LIMIT: usize = 200;
pub const DEFAULT_TOP_K: usize = 5;
pub const DEFAULT_RESPONSE_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_DICTIONARY_FILE: &str = "basic_english_2000.txt";
pub const DEFAULT_UPDATED_DICTIONARY_FILE: &str = "new.txt";

/// How far the interactive prompt/response section reaches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum InteractiveScope {
    /// One exchange at a time across the whole server. A silent client
    /// stalls every other client's prompts until it answers or times out.
    #[default]
    Server,
    /// One exchange at a time per connection; clients never wait on each other.
    Connection,
}

/// Limits and paths shared by the server, dispatcher and word sessions.
#[derive(Debug, Clone)]
pub struct Settings {
    pub listen: SocketAddr,
    pub dictionary_path: PathBuf,
    pub output_path: PathBuf,
    /// Requests must be strictly shorter than this many characters.
    pub input_limit: usize,
    /// Size of one outgoing message including its terminator; messages are
    /// cut to one character less.
    pub output_limit: usize,
    pub top_k: usize,
    /// `None` waits for an answer indefinitely.
    pub response_timeout: Option<Duration>,
    pub interactive_scope: InteractiveScope,
}

impl Settings {
    pub fn validate(self) -> Result<Self> {
        ensure!(self.input_limit > 0, "input limit must be positive");
        ensure!(self.output_limit > 1, "output limit must leave room for text");
        ensure!(self.top_k > 0, "top-k must be positive");
        Ok(self)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([0, 0, 0, 0], 60000)),
            dictionary_path: PathBuf::from(DEFAULT_DICTIONARY_FILE),
            output_path: PathBuf::from(DEFAULT_UPDATED_DICTIONARY_FILE),
            input_limit: DEFAULT_INPUT_LIMIT,
            output_limit: DEFAULT_OUTPUT_LIMIT,
            top_k: DEFAULT_TOP_K,
            response_timeout: Some(Duration::from_secs(DEFAULT_RESPONSE_TIMEOUT_SECS)),
            interactive_scope: InteractiveScope::Server,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let settings = Settings::default();
        assert_eq!(settings.listen, DEFAULT_LISTEN.parse().expect("addr"));
        assert_eq!(settings.input_limit, 30);
        assert_eq!(settings.top_k, 5);
        assert_eq!(settings.interactive_scope, InteractiveScope::Server);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn zero_top_k_is_rejected() {
        let settings = Settings {
            top_k: 0,
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }
}
