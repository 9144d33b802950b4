//! Main Leptos application component and routing.

use leptos::prelude::*;
use leptos_meta::{Title, provide_meta_context};
use leptos_router::{
    components::{Route, Router, Routes},
    path,
};

use crate::pages::{
    DashboardPage, HomePage, LoginPage, SECTIONS, SectionPage, UnauthorizedPage,
};
use crate::permissions::{Can, PermissionContext, use_permissions};

/// The root application component.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();
    PermissionContext::provide();

    view! {
        <Title text="Lost & Found Dashboard"/>
        <Router>
            <Header/>
            <main class="container">
                <Routes fallback=|| "Page not found.".into_view()>
                    <Route path=path!("/") view=HomePage/>
                    <Route path=path!("/login") view=LoginPage/>
                    <Route path=path!("/unauthorized") view=UnauthorizedPage/>
                    <Route path=path!("/dashboard") view=DashboardPage/>
                    <Route path=path!("/dashboard/:section") view=SectionPage/>
                </Routes>
            </main>
        </Router>
    }
}

/// Header with permission-filtered navigation.
#[component]
fn Header() -> impl IntoView {
    view! {
        <header class="header">
            <div class="header-left">
                <a href="/dashboard" class="logo">"Lost & Found"</a>
            </div>
            <nav class="header-nav">
                {SECTIONS
                    .iter()
                    .map(|section| {
                        view! {
                            <Can permission=section.permission>
                                <a href=section.href>{section.title}</a>
                            </Can>
                        }
                    })
                    .collect_view()}
            </nav>
            <div class="header-right">
                <SessionBadge/>
            </div>
        </header>
    }
}

/// Current role, refresh control and any resolution error.
#[component]
fn SessionBadge() -> impl IntoView {
    let permissions = use_permissions();
    let refresher = permissions.clone();
    let on_refresh = move |_| refresher.refresh();

    view! {
        {move || {
            let session = permissions.session();
            let error = session
                .error()
                .map(|e| view! { <span class="session-error">{e.to_string()}</span> });
            if session.is_loading() {
                view! { <span class="session-loading">"Checking permissions..."</span> }.into_any()
            } else if session.is_authenticated() {
                let label = if session.has_full_access() {
                    format!("{} (full access)", session.role())
                } else {
                    session.role().to_string()
                };
                view! {
                    <div class="user-menu">
                        <span class="user-role">{label}</span>
                        {error}
                    </div>
                }
                .into_any()
            } else {
                view! {
                    <div class="user-menu">
                        {error}
                        <a href="/login" class="login-button">"Log in"</a>
                    </div>
                }
                .into_any()
            }
        }}
        <button class="refresh-button" on:click=on_refresh>"Refresh permissions"</button>
    }
}
