//! Shown when the gate refuses an authenticated visitor.

use crate::permissions::use_permissions;
use leptos::prelude::*;

#[component]
pub fn UnauthorizedPage() -> impl IntoView {
    let permissions = use_permissions();
    let reason = move || permissions.session().error().map(str::to_string);

    view! {
        <div class="unauthorized-page">
            <h1>"Access denied"</h1>
            <p>"Your role does not grant access to that section."</p>
            {move || reason().map(|reason| view! { <p class="session-error">{reason}</p> })}
            <a href="/dashboard">"Back to dashboard"</a>
        </div>
    }
}
