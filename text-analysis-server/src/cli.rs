use std::{net::SocketAddr, path::PathBuf, time::Duration};

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use crate::config::{
    DEFAULT_DICTIONARY_FILE, DEFAULT_INPUT_LIMIT, DEFAULT_LISTEN, DEFAULT_OUTPUT_LIMIT,
    DEFAULT_RESPONSE_TIMEOUT_SECS, DEFAULT_TOP_K, DEFAULT_UPDATED_DICTIONARY_FILE,
    InteractiveScope, Settings,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the text analysis server.
    Serve(ServeArgs),
    /// Connect to a server, submit one line and answer its prompts.
    Client(ClientArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Socket address to bind. Use port 0 for an ephemeral port.
    #[arg(long, default_value = DEFAULT_LISTEN)]
    pub listen: SocketAddr,

    /// Seed dictionary, whitespace-delimited words.
    #[arg(long, default_value = DEFAULT_DICTIONARY_FILE)]
    pub dictionary: PathBuf,

    /// File the dictionary is written to after every request.
    #[arg(long, default_value = DEFAULT_UPDATED_DICTIONARY_FILE)]
    pub output: PathBuf,

    /// Requests must be shorter than this many characters.
    #[arg(long, default_value_t = DEFAULT_INPUT_LIMIT)]
    pub input_limit: usize,

    /// Maximum length of a single outgoing message.
    #[arg(long, default_value_t = DEFAULT_OUTPUT_LIMIT)]
    pub output_limit: usize,

    /// Number of ranked candidates shown per word.
    #[arg(long, default_value_t = DEFAULT_TOP_K)]
    pub top_k: usize,

    /// Seconds to wait for each y/n answer. 0 waits forever.
    #[arg(long, default_value_t = DEFAULT_RESPONSE_TIMEOUT_SECS)]
    pub response_timeout_secs: u64,

    /// Whether prompts are serialized across the server or per connection.
    #[arg(long, value_enum, default_value_t = InteractiveScope::Server)]
    pub interactive_scope: InteractiveScope,
}

impl ServeArgs {
    pub fn into_settings(self) -> Result<Settings> {
        let response_timeout =
            (self.response_timeout_secs > 0).then(|| Duration::from_secs(self.response_timeout_secs));

        Settings {
            listen: self.listen,
            dictionary_path: self.dictionary,
            output_path: self.output,
            input_limit: self.input_limit,
            output_limit: self.output_limit,
            top_k: self.top_k,
            response_timeout,
            interactive_scope: self.interactive_scope,
        }
        .validate()
    }
}

#[derive(Args, Debug, Clone)]
pub struct ClientArgs {
    /// Address of the server to connect to.
    #[arg(long, default_value = "127.0.0.1:60000")]
    pub server: SocketAddr,

    /// Line to submit. Read from stdin when omitted.
    #[arg(long)]
    pub text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_defaults_become_settings() {
        let cli = Cli::parse_from(["text-analysis-server", "serve"]);
        let Command::Serve(args) = cli.command else {
            panic!("expected serve command");
        };
        let settings = args.into_settings().expect("valid settings");

        assert_eq!(settings.listen.port(), 60000);
        assert_eq!(settings.input_limit, DEFAULT_INPUT_LIMIT);
        assert_eq!(settings.response_timeout, Some(Duration::from_secs(120)));
        assert_eq!(settings.interactive_scope, InteractiveScope::Server);
    }

    #[test]
    fn zero_timeout_waits_forever() {
        let cli = Cli::parse_from([
            "text-analysis-server",
            "serve",
            "--response-timeout-secs",
            "0",
            "--interactive-scope",
            "connection",
        ]);
        let Command::Serve(args) = cli.command else {
            panic!("expected serve command");
        };
        let settings = args.into_settings().expect("valid settings");

        assert_eq!(settings.response_timeout, None);
        assert_eq!(settings.interactive_scope, InteractiveScope::Connection);
    }
}
