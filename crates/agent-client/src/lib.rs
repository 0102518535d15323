//! Arthik Agent Client
//!
//! Everything the front-end needs from the network, minus the UI:
//!
//! - **api**: `reqwest` client for the agent backend and the land data host
//! - **stream**: incremental decoder for the `data: {...}` chat stream
//! - **session**: transcript plus the exchange driver that feeds it
//! - **markdown**: HTML rendering for assistant replies
//!
//! The crate builds both natively and for `wasm32-unknown-unknown`.

pub mod api;
pub mod backend;
pub mod config;
pub mod error;
pub mod markdown;
pub mod message;
pub mod session;
pub mod stream;
pub mod user;

pub use api::ApiClient;
pub use backend::{ByteStream, ChatBackend};
pub use config::{ClientConfig, LandSource};
pub use error::{ClientError, Result};
pub use message::{ChatMessage, Role, Transcript, APOLOGY};
pub use session::{exchange, ChatSession, ExchangeEvent};
pub use stream::{FrameDecoder, StreamEvent};
pub use user::{PasswordChange, User};
