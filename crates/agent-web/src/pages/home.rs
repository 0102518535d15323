//! Home Page
//!
//! Agent chat on the left, the globe and account settings on the right.

use leptos::prelude::*;

use agent_client::{exchange, ChatMessage, ChatSession, Role, User};

use crate::api::{access_token, clear_access_token, use_api_client};
use crate::components::{MessageBubble, PasswordForm};
use crate::globe::Globe;

#[component]
pub fn HomePage() -> impl IntoView {
    let api = use_api_client();
    let session = RwSignal::new(ChatSession::new());
    let (input, set_input) = signal(String::new());
    let (user, set_user) = signal(None::<User>);

    if let (Some(client), Some(token)) = (api.get_value(), access_token()) {
        leptos::task::spawn_local(async move {
            match client.fetch_user(&token).await {
                Ok(profile) => set_user.set(Some(profile)),
                Err(e) if e.ends_session() => {
                    tracing::warn!("Session rejected; signing out");
                    clear_access_token();
                }
                Err(e) => tracing::warn!("Could not load profile: {}", e),
            }
        });
    }

    let send = move || {
        let text = input.get_untracked();
        if text.trim().is_empty() || session.with_untracked(ChatSession::is_streaming) {
            return;
        }
        let Some(client) = api.get_value() else {
            return;
        };
        let Some(token) = access_token() else {
            tracing::warn!("No access token; message not sent");
            return;
        };
        let Some(message) = session.try_update(|s| s.begin(&text)).flatten() else {
            return;
        };
        set_input.set(String::new());

        leptos::task::spawn_local(async move {
            // Failures are logged and turned into an apology by `apply`
            let _ = exchange(&client, &token, &message, |event| {
                session.update(|s| s.apply(&event));
            })
            .await;
            session.update(ChatSession::finish);
        });
    };

    let greeting = move || {
        user.with(|u| u.as_ref().map_or_else(|| "Welcome back".to_string(), User::greeting))
    };
    let awaiting_reply = move || {
        session.with(|s| s.is_streaming() && s.transcript().last().is_some_and(|m| m.role == Role::User))
    };

    view! {
        <div class="home">
            <section class="chat-panel">
                <header class="chat-header">
                    <div class="avatar">{move || user.with(|u| u.as_ref().map_or('U', User::initial).to_string())}</div>
                    <h1>{greeting}</h1>
                    <p class="tagline">"How can I help you today?"</p>
                </header>

                <div class="messages">
                    <For
                        each=move || session.with(|s| s.transcript().messages().to_vec())
                        key=|msg: &ChatMessage| (msg.id, msg.content.len())
                        children=move |msg| view! { <MessageBubble message=msg /> }
                    />
                    <Show when=awaiting_reply>
                        <div class="message loading">"..."</div>
                    </Show>
                </div>

                <div class="input-area">
                    <textarea
                        placeholder="Message AI Agent..."
                        prop:value=move || input.get()
                        on:input=move |ev| set_input.set(event_target_value(&ev))
                        on:keydown=move |ev| {
                            if ev.key() == "Enter" && !ev.shift_key() {
                                ev.prevent_default();
                                send();
                            }
                        }
                    />
                    <button
                        on:click=move |_| send()
                        disabled=move || input.get().trim().is_empty() || session.with(ChatSession::is_streaming)
                    >
                        "Send"
                    </button>
                </div>
            </section>

            <aside class="sidebar">
                <Globe />
                <PasswordForm />
            </aside>
        </div>
    }
}
