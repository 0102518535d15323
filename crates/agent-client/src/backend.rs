//! Chat Backend Seam
//!
//! The session logic only needs "given a bearer token and a message, give me
//! a byte stream". The HTTP client implements it; tests plug in fakes.

use async_trait::async_trait;
use futures::stream::LocalBoxStream;

use crate::error::Result;

/// Streamed response body
pub type ByteStream = LocalBoxStream<'static, Result<Vec<u8>>>;

/// Anything that can open a streamed chat reply.
///
/// Futures are not `Send`: in the browser they run on the single UI thread.
#[async_trait(?Send)]
pub trait ChatBackend {
    /// Send a user message and return the reply stream
    async fn open_chat(&self, token: &str, message: &str) -> Result<ByteStream>;
}
