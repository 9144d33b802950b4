//! Login notice page.
//!
//! Tokens are issued by the platform's identity service; this page only
//! explains why the visitor was sent here.

use leptos::prelude::*;
use leptos_router::hooks::use_query_map;

#[component]
pub fn LoginPage() -> impl IntoView {
    let query = use_query_map();
    let expired = move || query.read().get("reason").as_deref() == Some("expired");

    view! {
        <div class="login-page">
            <h1>"Sign in required"</h1>
            <Show when=expired>
                <p class="notice">"Your session has expired. Please sign in again."</p>
            </Show>
            <p>"Sign in through the Lost & Found portal to access the dashboard."</p>
        </div>
    }
}
