//! Turns one request line into concurrent word sessions.
//!
//! The dispatcher validates the line, spawns one task per word, waits for
//! all of them and then persists the dictionary exactly once before closing
//! the connection. A refused request never touches the dictionary.

use std::sync::Arc;

use anyhow::Result;
use futures_util::future::join_all;
use tokio::io::{AsyncBufRead, AsyncWrite};
use tracing::{debug, info, warn};

use crate::{
    config::Settings,
    dictionary::DictionaryStore,
    gate::InteractiveGate,
    protocol::{self, Connection, RequestError},
    session::{Outcome, SessionSettings, WordSession, WordTask},
};

/// A fully processed request.
#[derive(Debug, Clone)]
pub struct ClientRequest {
    pub line: String,
    pub tokens: Vec<String>,
    pub tasks: Vec<WordTask>,
}

impl ClientRequest {
    /// The request with every replaced word swapped for its substitute.
    pub fn corrected(&self) -> Vec<String> {
        self.tasks
            .iter()
            .map(|task| task.effective_word().to_string())
            .collect()
    }

    pub fn count(&self, outcome: fn(&Outcome) -> bool) -> usize {
        self.tasks.iter().filter(|task| outcome(&task.outcome)).count()
    }
}

#[derive(Debug)]
pub enum Dispatch {
    Completed(ClientRequest),
    Refused(RequestError),
    /// The peer closed before sending a request.
    Disconnected,
}

#[derive(Clone)]
pub struct RequestDispatcher {
    store: Arc<DictionaryStore>,
    settings: Arc<Settings>,
}

impl RequestDispatcher {
    pub fn new(store: Arc<DictionaryStore>, settings: Arc<Settings>) -> Self {
        Self { store, settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Reads and serves one request on `conn`, then closes it.
    pub async fn handle<R, W>(
        &self,
        conn: Arc<Connection<R, W>>,
        gate: InteractiveGate,
    ) -> Result<Dispatch>
    where
        R: AsyncBufRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let Some(line) = conn.read_request(self.settings.input_limit).await? else {
            return Ok(Dispatch::Disconnected);
        };

        let request = match protocol::validate_request(&line, self.settings.input_limit) {
            Ok(request) => request,
            Err(err) => {
                info!(error = %err, "refusing request");
                conn.write_text(&err.wire_line()).await?;
                conn.close().await?;
                return Ok(Dispatch::Refused(err));
            }
        };

        let tokens = protocol::tokenize(request);
        debug!(words = tokens.len(), "dispatching request");
        let tasks = self.run_sessions(&tokens, &conn, &gate).await;

        if let Err(err) = self.store.persist(&self.settings.output_path).await {
            warn!(error = ?err, "dictionary not saved; in-memory copy is still current");
        }

        let request = ClientRequest {
            line: request.to_string(),
            tokens,
            tasks,
        };

        if let Err(err) = conn.write_text(&protocol::summary(&request.corrected())).await {
            debug!(error = ?err, "failed to send summary");
        }
        if let Err(err) = conn.close().await {
            debug!(error = ?err, "failed to close connection cleanly");
        }

        Ok(Dispatch::Completed(request))
    }

    /// Runs every word concurrently and waits for all of them.
    async fn run_sessions<R, W>(
        &self,
        tokens: &[String],
        conn: &Arc<Connection<R, W>>,
        gate: &InteractiveGate,
    ) -> Vec<WordTask>
    where
        R: AsyncBufRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let session_settings = SessionSettings {
            top_k: self.settings.top_k,
            response_timeout: self.settings.response_timeout,
        };

        let handles = tokens.iter().map(|word| {
            let session = WordSession::new(
                word.clone(),
                Arc::clone(&self.store),
                Arc::clone(conn),
                gate.clone(),
                session_settings,
            );
            tokio::spawn(session.run())
        });

        join_all(handles)
            .await
            .into_iter()
            .filter_map(|result| match result {
                Ok(task) => Some(task),
                Err(err) => {
                    warn!(error = ?err, "word session failed");
                    None
                }
            })
            .collect()
    }
}
