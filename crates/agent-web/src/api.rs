//! Browser-side API Glue
//!
//! Configuration baked in at build time, the stored bearer token and the
//! shared client handle used by the components.

use leptos::prelude::*;

use agent_client::{ApiClient, ClientConfig};

/// `localStorage` key holding the bearer token
pub const TOKEN_KEY: &str = "access_token";

/// Client configuration from `ARTHIK_*` values set at compile time
pub fn client_config() -> ClientConfig {
    ClientConfig::from_lookup(|key| {
        match key {
            "ARTHIK_BACKEND_URL" => option_env!("ARTHIK_BACKEND_URL"),
            "ARTHIK_LAND_URL" => option_env!("ARTHIK_LAND_URL"),
            "ARTHIK_LAND_POINTS_URL" => option_env!("ARTHIK_LAND_POINTS_URL"),
            "ARTHIK_DOT_SPACING" => option_env!("ARTHIK_DOT_SPACING"),
            _ => None,
        }
        .map(ToString::to_string)
    })
}

/// Bearer token saved by the login flow, if any
pub fn access_token() -> Option<String> {
    web_sys::window()?
        .local_storage()
        .ok()
        .flatten()?
        .get_item(TOKEN_KEY)
        .ok()
        .flatten()
        .filter(|t| !t.is_empty())
}

/// Forget the stored token once the backend has rejected it
pub fn clear_access_token() {
    let Some(storage) = web_sys::window().and_then(|w| w.local_storage().ok().flatten()) else {
        return;
    };
    if let Err(e) = storage.remove_item(TOKEN_KEY) {
        tracing::warn!("Could not clear access token: {:?}", e);
    }
}

/// API client for the configuration in context.
///
/// The handle is `Copy` so event handlers can capture it freely.
pub fn use_api_client() -> StoredValue<Option<ApiClient>, LocalStorage> {
    let config = use_context::<ClientConfig>().unwrap_or_else(client_config);

    let client = match ApiClient::new(config) {
        Ok(client) => Some(client),
        Err(e) => {
            tracing::error!("Could not build API client: {}", e);
            None
        }
    };

    StoredValue::new_local(client)
}
