//! Arthik Web Frontend
//!
//! Leptos-based WASM frontend: the agent chat and the land-dot globe.

mod api;
mod app;
mod components;
mod globe;
mod pages;

pub use app::App;
pub use globe::{CanvasSurface, Globe};

use wasm_bindgen::prelude::*;

/// WASM entry point
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();
    leptos::mount::mount_to_body(App);
}
