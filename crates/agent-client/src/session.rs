//! Chat Session
//!
//! Drives one exchange at a time: the user message goes into the transcript,
//! an empty assistant message opens once the stream is established, and
//! fragments are appended to it as they arrive. Any failure ends the
//! exchange with an apology message.

use crate::backend::ChatBackend;
use crate::error::{ClientError, Result};
use crate::message::{ChatMessage, Transcript};
use crate::stream;

/// Progress of a single exchange
#[derive(Debug)]
pub enum ExchangeEvent<'a> {
    /// Stream established; the assistant message should be opened
    Opened,
    /// Text to append to the assistant message
    Fragment(&'a str),
    /// The exchange failed before or during streaming
    Failed(&'a ClientError),
}

/// Open a chat stream and report its progress through `on_event`.
///
/// This is the shared driver: the session below applies events to its own
/// transcript, UI hosts apply them to reactive state. Returns the number of
/// fragments delivered.
pub async fn exchange<B>(
    backend: &B,
    token: &str,
    message: &str,
    mut on_event: impl FnMut(ExchangeEvent<'_>),
) -> Result<usize>
where
    B: ChatBackend + ?Sized,
{
    let body = match backend.open_chat(token, message).await {
        Ok(body) => body,
        Err(e) => {
            tracing::error!("Chat request failed: {}", e);
            on_event(ExchangeEvent::Failed(&e));
            return Err(e);
        }
    };

    on_event(ExchangeEvent::Opened);

    let result = stream::consume(body, |fragment| on_event(ExchangeEvent::Fragment(fragment))).await;
    match result {
        Ok(count) => {
            tracing::debug!("Chat reply complete ({} fragments)", count);
            Ok(count)
        }
        Err(e) => {
            tracing::error!("Chat stream broke off: {}", e);
            on_event(ExchangeEvent::Failed(&e));
            Err(e)
        }
    }
}

/// Transcript plus the streaming flag
#[derive(Clone, Debug, Default)]
pub struct ChatSession {
    transcript: Transcript,
    streaming: bool,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub const fn is_streaming(&self) -> bool {
        self.streaming
    }

    /// Accept user input.
    ///
    /// Blank input and input while a reply is still streaming are ignored.
    /// Otherwise the trimmed text is recorded and returned for sending.
    pub fn begin(&mut self, input: &str) -> Option<String> {
        let text = input.trim();
        if text.is_empty() || self.streaming {
            return None;
        }

        self.transcript.push(ChatMessage::user(text));
        self.streaming = true;
        Some(text.to_string())
    }

    /// Apply an exchange event to the transcript
    pub fn apply(&mut self, event: &ExchangeEvent<'_>) {
        match event {
            ExchangeEvent::Opened => self.transcript.begin_assistant(),
            ExchangeEvent::Fragment(text) => {
                self.transcript.append_fragment(text);
            }
            ExchangeEvent::Failed(_) => self.transcript.push_apology(),
        }
    }

    /// Mark the exchange over
    pub fn finish(&mut self) {
        self.streaming = false;
    }
}
