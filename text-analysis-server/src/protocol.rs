//! Plain-text wire protocol.
//!
//! A client sends one request line of letters and spaces. The server then
//! streams banners, ranked candidates and prompts as raw text and reads one
//! answer line per prompt. Prompts are not newline-terminated so they work
//! with netcat-style tools.

use std::{io, time::Duration};

use thiserror::Error;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt},
    sync::Mutex,
    time::timeout,
};

use crate::matching::{Candidate, RankedMatch};

const LINE_ENDINGS: &[char] = &['\n', '\r'];

/// Why a request line was refused.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("Input exceeds the character limit.")]
    TooLong,
    #[error("Input contains invalid characters. Only alphabetic characters and spaces are allowed.")]
    InvalidCharacters,
}

impl RequestError {
    pub fn wire_line(&self) -> String {
        format!("Error: {self}\n")
    }
}

/// Checks the raw request and returns it trimmed.
///
/// The line (without its terminator) must be shorter than `input_limit`
/// characters and consist of ASCII letters and spaces only.
pub fn validate_request(line: &str, input_limit: usize) -> Result<&str, RequestError> {
    let line = line.trim_end_matches(LINE_ENDINGS);
    if line.chars().count() >= input_limit {
        return Err(RequestError::TooLong);
    }

    let trimmed = line.trim();
    if !trimmed.chars().all(|c| c.is_ascii_alphabetic() || c == ' ') {
        return Err(RequestError::InvalidCharacters);
    }

    Ok(trimmed)
}

pub fn tokenize(request: &str) -> Vec<String> {
    request.split_whitespace().map(str::to_string).collect()
}

/// Whether an answer line starts with `y` or `Y`.
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim_start().chars().next(), Some('y' | 'Y'))
}

/// Result of waiting for one answer line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Line(String),
    Closed,
    TimedOut,
}

/// Per-connection transport shared by every word session of a request.
///
/// Reader and writer are locked independently; the word sessions of one
/// request share this value through an `Arc`.
pub struct Connection<R, W> {
    reader: Mutex<R>,
    writer: Mutex<W>,
    output_limit: usize,
}

impl<R, W> Connection<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W, output_limit: usize) -> Self {
        Self {
            reader: Mutex::new(reader),
            writer: Mutex::new(writer),
            output_limit,
        }
    }

    /// Reads the request line, consuming at most a few bytes past
    /// `input_limit` so an oversized request cannot grow the buffer.
    ///
    /// Returns `None` when the peer closed before sending anything.
    pub async fn read_request(&self, input_limit: usize) -> io::Result<Option<String>> {
        let mut reader = self.reader.lock().await;
        let cap = u64::try_from(input_limit)
            .unwrap_or(u64::MAX)
            .saturating_add(2);
        let mut buf = Vec::new();
        let bytes = (&mut *reader).take(cap).read_until(b'\n', &mut buf).await?;
        if bytes == 0 {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
    }

    /// Reads one answer line, bounded by `limit` when given.
    pub async fn read_reply(&self, limit: Option<Duration>) -> io::Result<Reply> {
        let mut reader = self.reader.lock().await;
        let mut buf = Vec::new();

        let read = reader.read_until(b'\n', &mut buf);
        let bytes = match limit {
            Some(limit) => match timeout(limit, read).await {
                Ok(result) => result?,
                Err(_) => return Ok(Reply::TimedOut),
            },
            None => read.await?,
        };

        if bytes == 0 {
            return Ok(Reply::Closed);
        }
        let line = String::from_utf8_lossy(&buf);
        Ok(Reply::Line(line.trim_end_matches(LINE_ENDINGS).to_string()))
    }

    /// Writes `text` and flushes. The output limit counts a terminator, so
    /// at most `output_limit - 1` characters go out.
    pub async fn write_text(&self, text: &str) -> io::Result<()> {
        let text = truncate_chars(text, self.output_limit.saturating_sub(1));
        let mut writer = self.writer.lock().await;
        writer.write_all(text.as_bytes()).await?;
        writer.flush().await
    }

    pub async fn close(&self) -> io::Result<()> {
        self.writer.lock().await.shutdown().await
    }
}

fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

pub fn banner(word: &str, ranked: &RankedMatch) -> Vec<String> {
    let mut lines = vec![
        format!("\nProcessing word: '{word}'\n"),
        format!("Levenshtein results for '{word}':\n"),
    ];
    lines.extend(ranked.candidates.iter().map(|c| format!("{c}\n")));
    lines
}

pub fn exact_prompt(word: &str) -> String {
    format!("\nThe word '{word}' already exists in the dictionary.\nPress 'y' to continue: ")
}

pub fn exact_reprompt() -> String {
    "Invalid input. Press 'y' to continue: ".to_string()
}

pub fn add_prompt(word: &str) -> String {
    format!("\nThe word '{word}' was not found in the dictionary.\nDo you want to add it? (y/n): ")
}

pub fn added(word: &str) -> String {
    format!("The word '{word}' has been added to the dictionary.\n")
}

pub fn replaced(word: &str, best: &Candidate) -> String {
    format!(
        "The word '{word}' was not added. Replacing with closest match: '{}'.\n",
        best.word
    )
}

pub fn rejected(word: &str) -> String {
    format!("The word '{word}' was not added. No replacement available.\n")
}

pub fn abandoned(word: &str) -> String {
    format!("\nNo response received for '{word}'; skipping.\n")
}

pub fn summary(words: &[String]) -> String {
    format!("\nResult: '{}'\n", words.join(" "))
}
