//! Main App Component

use leptos::prelude::*;

use crate::api;
use crate::pages::HomePage;

/// Root application component
#[component]
pub fn App() -> impl IntoView {
    let config = api::client_config();
    tracing::info!("Arthik web starting against {}", config.backend_url);
    provide_context(config);

    view! {
        <main class="app">
            <HomePage />
        </main>
    }
}
