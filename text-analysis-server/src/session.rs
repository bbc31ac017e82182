//! Per-word matching and interactive resolution.
//!
//! A session moves through
//! `Start -> Matched -> {ExactFound, NotFound} -> AwaitingResponse -> Done`.
//! Ranking happens inside the interactive gate, so a word always sees the
//! appends of every session that resolved before it. A word repeated in one
//! request is added once and then confirmed as an exact match.

use std::{io, sync::Arc, time::Duration};

use tokio::io::{AsyncBufRead, AsyncWrite};
use tracing::{debug, info, trace};

use crate::{
    dictionary::DictionaryStore,
    gate::InteractiveGate,
    matching::RankedMatch,
    protocol::{self, Connection, Reply, is_affirmative},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Start,
    Matched,
    ExactFound,
    NotFound,
    AwaitingResponse,
    Done,
}

/// How a word was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Exact match, acknowledged by the client.
    Confirmed,
    /// Unknown word the client asked to add.
    Added,
    /// Unknown word swapped for its closest candidate.
    Replaced { with: String },
    /// Unknown word with nothing to substitute.
    Rejected,
    /// No answer before the timeout, or the client went away. The
    /// dictionary is left untouched.
    Abandoned,
}

/// One resolved word of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordTask {
    pub word: String,
    pub ranked: RankedMatch,
    pub outcome: Outcome,
}

impl WordTask {
    /// The word as it should appear in the corrected request.
    pub fn effective_word(&self) -> &str {
        match &self.outcome {
            Outcome::Replaced { with } => with,
            _ => &self.word,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SessionSettings {
    pub top_k: usize,
    pub response_timeout: Option<Duration>,
}

pub struct WordSession<R, W> {
    word: String,
    store: Arc<DictionaryStore>,
    conn: Arc<Connection<R, W>>,
    gate: InteractiveGate,
    settings: SessionSettings,
    state: SessionState,
}

impl<R, W> WordSession<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(
        word: String,
        store: Arc<DictionaryStore>,
        conn: Arc<Connection<R, W>>,
        gate: InteractiveGate,
        settings: SessionSettings,
    ) -> Self {
        Self {
            word,
            store,
            conn,
            gate,
            settings,
            state: SessionState::Start,
        }
    }

    /// Drives the session to `Done`.
    ///
    /// Failing to reach the client counts as [`Outcome::Abandoned`] unless the
    /// dictionary was already changed.
    pub async fn run(mut self) -> WordTask {
        let turn = self.gate.enter().await;
        let ranked = self.store.scan(&self.word, self.settings.top_k).await;
        self.transition(SessionState::Matched);

        let outcome = match self.interact(&ranked).await {
            Ok(outcome) => outcome,
            Err(err) => {
                debug!(word = %self.word, error = ?err, "lost client during exchange");
                Outcome::Abandoned
            }
        };
        drop(turn);

        self.transition(SessionState::Done);
        info!(word = %self.word, outcome = ?outcome, "word resolved");

        WordTask {
            word: self.word,
            ranked,
            outcome,
        }
    }

    async fn interact(&mut self, ranked: &RankedMatch) -> io::Result<Outcome> {
        for line in protocol::banner(&self.word, ranked) {
            self.conn.write_text(&line).await?;
        }

        if ranked.exact {
            self.transition(SessionState::ExactFound);
            self.confirm().await
        } else {
            self.transition(SessionState::NotFound);
            self.decide(ranked).await
        }
    }

    /// Re-prompts until the client answers `y`.
    async fn confirm(&mut self) -> io::Result<Outcome> {
        self.conn
            .write_text(&protocol::exact_prompt(&self.word))
            .await?;

        loop {
            self.transition(SessionState::AwaitingResponse);
            match self.conn.read_reply(self.settings.response_timeout).await? {
                Reply::Line(answer) if is_affirmative(&answer) => return Ok(Outcome::Confirmed),
                Reply::Line(_) => {
                    self.conn.write_text(&protocol::exact_reprompt()).await?;
                }
                reply => return Ok(self.abandon(reply).await),
            }
        }
    }

    /// Asks once whether to add the word; anything but `y` substitutes.
    async fn decide(&mut self, ranked: &RankedMatch) -> io::Result<Outcome> {
        self.conn
            .write_text(&protocol::add_prompt(&self.word))
            .await?;

        self.transition(SessionState::AwaitingResponse);
        let answer = match self.conn.read_reply(self.settings.response_timeout).await? {
            Reply::Line(answer) => answer,
            reply => return Ok(self.abandon(reply).await),
        };

        if is_affirmative(&answer) {
            self.store.append(&self.word).await;
            self.notify(&protocol::added(&self.word)).await;
            return Ok(Outcome::Added);
        }

        match ranked.best() {
            Some(best) => {
                self.notify(&protocol::replaced(&self.word, best)).await;
                Ok(Outcome::Replaced {
                    with: best.word.clone(),
                })
            }
            None => {
                self.notify(&protocol::rejected(&self.word)).await;
                Ok(Outcome::Rejected)
            }
        }
    }

    async fn abandon(&self, reply: Reply) -> Outcome {
        if reply == Reply::TimedOut {
            info!(word = %self.word, "no answer before timeout");
            self.notify(&protocol::abandoned(&self.word)).await;
        }
        Outcome::Abandoned
    }

    /// Best-effort message once the outcome is already decided.
    async fn notify(&self, text: &str) {
        if let Err(err) = self.conn.write_text(text).await {
            debug!(word = %self.word, error = ?err, "failed to report outcome");
        }
    }

    fn transition(&mut self, next: SessionState) {
        trace!(word = %self.word, from = ?self.state, to = ?next, "session transition");
        self.state = next;
    }
}
