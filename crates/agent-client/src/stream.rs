//! Chat Stream Decoding
//!
//! The chat endpoint answers with newline-delimited event frames:
//!
//! ```text
//! data: {"type":"content","content":"Hel"}
//! data: {"type":"content","content":"lo"}
//! data: [DONE]
//! ```
//!
//! Bytes arrive in arbitrary chunks. A stateful UTF-8 decoder carries split
//! multi-byte characters over to the next chunk, and partial lines are
//! buffered until their newline arrives. Lines that are not data frames, and
//! data frames whose JSON does not parse, are skipped.

use futures::{Stream, StreamExt};
use serde::Deserialize;

use crate::error::Result;

/// Prefix of every significant line
pub const DATA_MARKER: &str = "data: ";

/// Terminal sentinel payload
pub const DONE_SENTINEL: &str = "[DONE]";

/// Discriminator value of text fragments
const CONTENT_TYPE: &str = "content";

/// One meaningful frame
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StreamEvent {
    /// Text to append to the assistant reply
    Content(String),
    /// Terminal sentinel; carries no data
    Done,
    /// Well-formed frame of a type the transcript does not use
    Other(Option<String>),
}

#[derive(Deserialize)]
struct DataFrame {
    #[serde(rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    content: Option<serde_json::Value>,
}

/// Interpret one line; `None` for lines that carry nothing
pub fn parse_line(line: &str) -> Option<StreamEvent> {
    let payload = line.trim().strip_prefix(DATA_MARKER)?.trim();
    if payload == DONE_SENTINEL {
        return Some(StreamEvent::Done);
    }

    let frame: DataFrame = match serde_json::from_str(payload) {
        Ok(frame) => frame,
        Err(e) => {
            tracing::debug!("Skipping malformed stream frame: {}", e);
            return None;
        }
    };

    if frame.kind.as_deref() != Some(CONTENT_TYPE) {
        return Some(StreamEvent::Other(frame.kind));
    }

    match frame.content {
        Some(serde_json::Value::String(text)) => Some(StreamEvent::Content(text)),
        Some(serde_json::Value::Null) | None => None,
        Some(other) => Some(StreamEvent::Content(other.to_string())),
    }
}

/// Incremental UTF-8 decoder
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a chunk; an incomplete trailing sequence waits for the next one
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        self.pending.extend_from_slice(chunk);
        let buffer = std::mem::take(&mut self.pending);

        let mut out = String::with_capacity(buffer.len());
        let mut rest = buffer.as_slice();

        loop {
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    out.push_str(text);
                    break;
                }
                Err(e) => {
                    let (valid, after) = rest.split_at(e.valid_up_to());
                    if let Ok(text) = std::str::from_utf8(valid) {
                        out.push_str(text);
                    }
                    match e.error_len() {
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[len..];
                        }
                        None => {
                            self.pending = after.to_vec();
                            break;
                        }
                    }
                }
            }
        }

        out
    }

    /// Flush at end of input; a dangling partial sequence becomes U+FFFD
    pub fn finish(&mut self) -> String {
        if self.pending.is_empty() {
            String::new()
        } else {
            self.pending.clear();
            char::REPLACEMENT_CHARACTER.to_string()
        }
    }
}

/// Bytes in, frames out
#[derive(Debug, Default)]
pub struct FrameDecoder {
    utf8: Utf8Decoder,
    line: String,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and collect the frames completed by it
    pub fn push(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        let text = self.utf8.decode(chunk);
        self.push_text(&text)
    }

    /// End of input: decode whatever is still buffered
    pub fn finish(&mut self) -> Vec<StreamEvent> {
        let tail = self.utf8.finish();
        let mut events = self.push_text(&tail);
        let line = std::mem::take(&mut self.line);
        events.extend(parse_line(&line));
        events
    }

    fn push_text(&mut self, text: &str) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        let mut rest = text;

        while let Some(newline) = rest.find('\n') {
            self.line.push_str(&rest[..newline]);
            let line = std::mem::take(&mut self.line);
            events.extend(parse_line(&line));
            rest = &rest[newline + 1..];
        }
        self.line.push_str(rest);

        events
    }
}

/// Drain a byte stream, handing each content fragment to `on_fragment`.
///
/// Ends when the stream ends; a `[DONE]` frame is not required. A transport
/// error aborts the loop and is returned after the fragments already
/// delivered. Returns the number of fragments delivered.
pub async fn consume<S>(mut stream: S, mut on_fragment: impl FnMut(&str)) -> Result<usize>
where
    S: Stream<Item = Result<Vec<u8>>> + Unpin,
{
    let mut decoder = FrameDecoder::new();
    let mut delivered = 0;

    let mut deliver = |events: Vec<StreamEvent>| {
        for event in events {
            match event {
                StreamEvent::Content(text) => {
                    on_fragment(&text);
                    delivered += 1;
                }
                StreamEvent::Done => tracing::debug!("Stream sent terminal frame"),
                StreamEvent::Other(kind) => tracing::debug!("Ignoring stream frame of type {:?}", kind),
            }
        }
    };

    while let Some(chunk) = stream.next().await {
        deliver(decoder.push(&chunk?));
    }
    deliver(decoder.finish());

    Ok(delivered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;

    fn chunks(parts: &[&[u8]]) -> impl Stream<Item = Result<Vec<u8>>> + Unpin + use<> {
        futures::stream::iter(parts.iter().map(|p| Ok(p.to_vec())).collect::<Vec<_>>())
    }

    #[test]
    fn test_parse_content_line() {
        assert_eq!(
            parse_line(r#"  data: {"type":"content","content":"Hi"}  "#),
            Some(StreamEvent::Content("Hi".into()))
        );
    }

    #[test]
    fn test_parse_done_and_noise() {
        assert_eq!(parse_line("data: [DONE]"), Some(StreamEvent::Done));
        assert_eq!(parse_line("data:   [DONE]  "), Some(StreamEvent::Done));
        assert_eq!(parse_line(": keep-alive"), None);
        assert_eq!(parse_line(""), None);
        assert_eq!(parse_line("data: not-json"), None);
    }

    #[test]
    fn test_parse_other_types() {
        assert_eq!(
            parse_line(r#"data: {"type":"tool","name":"search"}"#),
            Some(StreamEvent::Other(Some("tool".into())))
        );
    }

    #[test]
    fn test_utf8_split_across_chunks() {
        let bytes = "añ€😀".as_bytes();
        let mut decoder = Utf8Decoder::new();

        let mut out = String::new();
        for byte in bytes {
            out.push_str(&decoder.decode(std::slice::from_ref(byte)));
        }
        out.push_str(&decoder.finish());
        assert_eq!(out, "añ€😀");
    }

    #[test]
    fn test_utf8_invalid_byte_replaced() {
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.decode(b"a\xffb"), "a\u{FFFD}b");
        assert_eq!(decoder.decode(b"\xe2\x82"), "");
        assert_eq!(decoder.finish(), "\u{FFFD}");
    }

    #[test]
    fn test_line_split_across_chunks() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.push(b"data: {\"type\":\"con").is_empty());
        assert_eq!(
            decoder.push(b"tent\",\"content\":\"Hi\"}\ndata: [DO"),
            vec![StreamEvent::Content("Hi".into())]
        );
        assert_eq!(decoder.push(b"NE]\n"), vec![StreamEvent::Done]);
        assert!(decoder.finish().is_empty());
    }

    #[test]
    fn test_unterminated_last_line_flushed() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.push(br#"data: {"type":"content","content":"tail"}"#).is_empty());
        assert_eq!(decoder.finish(), vec![StreamEvent::Content("tail".into())]);
    }

    #[tokio::test]
    async fn test_consume_hi_then_done() {
        let stream = chunks(&[
            b"data: {\"type\":\"content\",\"content\":\"Hi\"}\n",
            b"data: [DONE]\n",
        ]);
        let mut message = String::new();

        let delivered = consume(stream, |f| message.push_str(f)).await.unwrap();
        assert_eq!(delivered, 1);
        assert_eq!(message, "Hi");
    }

    #[tokio::test]
    async fn test_consume_skips_malformed_json() {
        let stream = chunks(&[b"data: not-json\n"]);
        let mut message = String::from("unchanged");

        let delivered = consume(stream, |f| message.push_str(f)).await.unwrap();
        assert_eq!(delivered, 0);
        assert_eq!(message, "unchanged");
    }

    #[tokio::test]
    async fn test_consume_multibyte_split() {
        let frame = "data: {\"type\":\"content\",\"content\":\"🌍 ok\"}\n".as_bytes();
        let split = frame.iter().position(|b| *b == 0xF0).unwrap() + 2;
        let stream = chunks(&[&frame[..split], &frame[split..]]);
        let mut message = String::new();

        consume(stream, |f| message.push_str(f)).await.unwrap();
        assert_eq!(message, "🌍 ok");
    }

    #[tokio::test]
    async fn test_consume_error_keeps_delivered_text() {
        let items: Vec<Result<Vec<u8>>> = vec![
            Ok(b"data: {\"type\":\"content\",\"content\":\"par\"}\n".to_vec()),
            Err(ClientError::Status {
                status: 502,
                context: "Reading the reply".into(),
            }),
            Ok(b"data: {\"type\":\"content\",\"content\":\"never\"}\n".to_vec()),
        ];
        let mut message = String::new();

        let result = consume(futures::stream::iter(items), |f| message.push_str(f)).await;
        assert!(result.is_err());
        assert_eq!(message, "par");
    }
}
