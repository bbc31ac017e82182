use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};

use text_analysis_server::{
    cli::{Cli, Command},
    client,
    config::InteractiveScope,
    dictionary::DictionaryStore,
    server::Server,
};

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve(args) => {
            let settings = args.into_settings()?;
            let store = DictionaryStore::load(&settings.dictionary_path)
                .await
                .context("the server cannot run without a dictionary")?;

            let listener = TcpListener::bind(settings.listen)
                .await
                .with_context(|| format!("failed to bind {}", settings.listen))?;
            if settings.interactive_scope == InteractiveScope::Server {
                info!("prompts are serialized across all clients");
            }

            let server = Server::new(listener, Arc::new(store), settings);
            let addr = server.local_addr()?;
            info!("server listening on {}", addr);
            if let Err(err) = server.run_until_ctrl_c().await {
                warn!("server exited with error: {err:?}");
                return Err(err);
            }
        }
        Command::Client(args) => client::run(args).await?,
    }

    Ok(())
}
