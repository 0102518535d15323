//! UI Components

use chrono::Local;
use leptos::prelude::*;

use agent_client::user::MIN_PASSWORD_LEN;
use agent_client::{markdown, ChatMessage, PasswordChange, Role};

use crate::api::{access_token, use_api_client};

/// Message bubble component; assistant replies are rendered from Markdown
#[component]
pub fn MessageBubble(message: ChatMessage) -> impl IntoView {
    let class = format!("message message-{}", message.role);
    let role = message.role.to_string();
    let time = message.timestamp.with_timezone(&Local).format("%H:%M").to_string();

    let body = if message.role == Role::Assistant {
        view! { <div class="content markdown" inner_html=markdown::to_html(&message.content)></div> }.into_any()
    } else {
        view! { <p class="content">{message.content}</p> }.into_any()
    };

    view! {
        <div class=class>
            <span class="role">{role}</span>
            {body}
            <span class="time">{time}</span>
        </div>
    }
}

/// Password change form
#[component]
pub fn PasswordForm() -> impl IntoView {
    let api = use_api_client();
    let (current, set_current) = signal(String::new());
    let (next, set_next) = signal(String::new());
    let (busy, set_busy) = signal(false);
    let (outcome, set_outcome) = signal(None::<Result<String, String>>);

    let submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get_untracked() {
            return;
        }
        let (Some(client), Some(token)) = (api.get_value(), access_token()) else {
            set_outcome.set(Some(Err("Please sign in first.".into())));
            return;
        };

        let change = PasswordChange {
            password: current.get_untracked(),
            new_password: next.get_untracked(),
        };
        set_busy.set(true);
        set_outcome.set(None);

        leptos::task::spawn_local(async move {
            match client.change_password(&token, &change).await {
                Ok(()) => {
                    set_current.set(String::new());
                    set_next.set(String::new());
                    set_outcome.set(Some(Ok("Password updated!".into())));
                }
                Err(e) => {
                    tracing::warn!("Password change failed: {}", e);
                    set_outcome.set(Some(Err(e.user_message())));
                }
            }
            set_busy.set(false);
        });
    };

    view! {
        <form class="password-form" on:submit=submit>
            <h2>"Change Password"</h2>
            <div class="field">
                <label>"Current password"</label>
                <input
                    type="password"
                    placeholder="Current Password"
                    required=true
                    prop:value=move || current.get()
                    on:input=move |ev| set_current.set(event_target_value(&ev))
                />
            </div>
            <div class="field">
                <label>"New password"</label>
                <input
                    type="password"
                    placeholder="New Password"
                    required=true
                    minlength=MIN_PASSWORD_LEN.to_string()
                    prop:value=move || next.get()
                    on:input=move |ev| set_next.set(event_target_value(&ev))
                />
            </div>
            <button
                type="submit"
                disabled=move || busy.get() || current.get().is_empty() || next.get().is_empty()
            >
                {move || if busy.get() { "..." } else { "Update" }}
            </button>
            {move || outcome.get().map(|outcome| {
                let (class, msg) = match outcome {
                    Ok(msg) => ("notice notice-ok", msg),
                    Err(msg) => ("notice notice-error", msg),
                };
                view! { <p class=class>{msg}</p> }
            })}
        </form>
    }
}
