//! Landing page.

use crate::permissions::use_permissions;
use leptos::prelude::*;

#[component]
pub fn HomePage() -> impl IntoView {
    let permissions = use_permissions();

    view! {
        <div class="home-page">
            <h1>"Lost & Found"</h1>
            <p>"Administration of reported, found and claimed items."</p>
            {move || {
                if permissions.is_loading() {
                    view! { <p>"Loading..."</p> }.into_any()
                } else if permissions.session().is_authenticated() {
                    view! { <a href="/dashboard" class="cta-button">"Open dashboard"</a> }.into_any()
                } else {
                    view! { <a href="/login" class="cta-button">"Log in"</a> }.into_any()
                }
            }}
        </div>
    }
}
