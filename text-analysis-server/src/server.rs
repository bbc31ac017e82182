use std::{future::Future, net::SocketAddr, sync::Arc};

use anyhow::Result;
use tokio::{
    io::BufReader,
    net::{TcpListener, TcpStream},
    select,
};
use tracing::{info, warn};

use crate::{
    config::Settings,
    dictionary::DictionaryStore,
    dispatcher::{Dispatch, RequestDispatcher},
    gate::InteractiveGate,
    protocol::Connection,
    session::Outcome,
};

/// Accepts connections and serves one request per connection, each on its
/// own task. Runs until the shutdown future resolves.
pub struct Server {
    listener: TcpListener,
    state: Arc<ServerState>,
}

struct ServerState {
    dispatcher: RequestDispatcher,
    gate: InteractiveGate,
}

impl Server {
    pub fn new(listener: TcpListener, store: Arc<DictionaryStore>, settings: Settings) -> Self {
        Self {
            listener,
            state: Arc::new(ServerState {
                dispatcher: RequestDispatcher::new(store, Arc::new(settings)),
                gate: InteractiveGate::new(),
            }),
        }
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send,
    {
        let Server { listener, state } = self;
        tokio::pin!(shutdown);

        loop {
            select! {
                _ = &mut shutdown => {
                    info!("server shutting down");
                    break;
                }
                accept_result = listener.accept() => {
                    handle_accept_result(accept_result, &state);
                }
            }
        }

        Ok(())
    }

    pub async fn run_until_ctrl_c(self) -> Result<()> {
        self.run_until(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!(error = ?err, "failed to install ctrl-c handler");
            }
        })
        .await
    }
}

fn handle_accept_result(
    result: std::io::Result<(TcpStream, SocketAddr)>,
    state: &Arc<ServerState>,
) {
    match result {
        Ok((stream, peer)) => spawn_connection_handler(stream, peer, state),
        Err(err) => warn!(error = ?err, "failed to accept connection"),
    }
}

fn spawn_connection_handler(stream: TcpStream, peer: SocketAddr, state: &Arc<ServerState>) {
    let state = Arc::clone(state);
    tokio::spawn(async move {
        if let Err(err) = handle_connection(stream, peer, state).await {
            warn!(peer = %peer, error = ?err, "connection closed with error");
        }
    });
}

async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    state: Arc<ServerState>,
) -> Result<()> {
    let (reader, writer) = stream.into_split();
    let settings = state.dispatcher.settings();
    let conn = Arc::new(Connection::new(
        BufReader::new(reader),
        writer,
        settings.output_limit,
    ));
    let gate = state.gate.for_connection(settings.interactive_scope);

    info!(%peer, "client connected");
    match state.dispatcher.handle(conn, gate).await? {
        Dispatch::Completed(request) => {
            info!(
                %peer,
                request = %request.line,
                words = request.tasks.len(),
                added = request.count(|outcome| *outcome == Outcome::Added),
                "request completed"
            );
        }
        Dispatch::Refused(err) => info!(%peer, reason = %err, "request refused"),
        Dispatch::Disconnected => info!(%peer, "client left before sending a request"),
    }

    Ok(())
}
