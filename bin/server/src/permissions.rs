//! Client-side permission state.
//!
//! The app resolves the session once on mount through [`resolve_session`]
//! and keeps it in a [`SessionStore`]. Components read it through
//! [`use_permissions`] or the [`Can`] wrapper. While the first resolution is
//! in flight every check fails, so nothing protected flashes on screen
//! during hydration.

use leptos::prelude::*;
use leptos::task::spawn_local;
use lostfound_access::{ResolvedSession, SessionStore};

/// Resolves the session behind the current server function call.
#[cfg(feature = "ssr")]
async fn request_session()
-> Result<(std::sync::Arc<crate::auth::GateState>, ResolvedSession), ServerFnError> {
    use crate::auth::{GateState, request_token};
    use crate::error::SessionError;
    use axum::Extension;
    use axum::http::HeaderMap;
    use axum_extra::extract::CookieJar;
    use std::sync::Arc;

    let Extension(state): Extension<Arc<GateState>> = leptos_axum::extract()
        .await
        .map_err(|_| SessionError::MissingState.into_server_error())?;
    let headers: HeaderMap = leptos_axum::extract().await.map_err(|e| {
        SessionError::Request {
            details: e.to_string(),
        }
        .into_server_error()
    })?;
    let jar: CookieJar = leptos_axum::extract().await.map_err(|e| {
        SessionError::Request {
            details: e.to_string(),
        }
        .into_server_error()
    })?;

    let token = request_token(&headers, &jar);
    let session = state.resolver.resolve(token.as_deref()).await.map_err(|e| {
        tracing::warn!(error = %e, "session resolution failed");
        SessionError::BackendUnavailable {
            details: e.current_context().to_string(),
        }
        .into_server_error()
    })?;
    Ok((state, session))
}

/// Resolves the caller's session on the server.
///
/// Reads the token from the request cookies (or `Authorization` header) and
/// runs the same resolver as the route gate.
#[server]
pub async fn resolve_session() -> Result<ResolvedSession, ServerFnError> {
    let (_, session) = request_session().await?;
    Ok(session)
}

/// Filters `candidates` down to the role labels the caller may assign.
///
/// Resolved on the server so the escalation policy in force applies.
#[server]
pub async fn list_assignable_roles(
    candidates: Vec<String>,
) -> Result<Vec<String>, ServerFnError> {
    let (state, session) = request_session().await?;
    Ok(session
        .assignable_roles(state.resolver.policy(), &candidates)
        .into_iter()
        .map(str::to_string)
        .collect())
}

/// Permission state of one mounted app.
#[derive(Clone)]
pub struct PermissionContext {
    session: RwSignal<ResolvedSession>,
    store: SessionStore,
}

impl PermissionContext {
    /// Creates the context, provides it to descendants and resolves on mount.
    ///
    /// The store is closed when the owning component is cleaned up; a
    /// resolution still in flight at that point is dropped.
    pub fn provide() -> Self {
        let context = Self {
            session: RwSignal::new(ResolvedSession::loading()),
            store: SessionStore::new(),
        };
        provide_context(context.clone());

        let on_mount = context.clone();
        Effect::new(move |_| on_mount.initialize());

        let store = context.store.clone();
        on_cleanup(move || store.close());

        context
    }

    /// Runs the first resolution. Later calls are no-ops.
    pub fn initialize(&self) {
        let store = self.store.clone();
        let session = self.session;
        spawn_local(async move {
            if store.initialize(resolve_session).await {
                publish(&store, session);
            }
        });
    }

    /// Drops the cached session and resolves again.
    pub fn refresh(&self) {
        let store = self.store.clone();
        let session = self.session;
        session.try_set(ResolvedSession::loading());
        spawn_local(async move {
            store.refresh(resolve_session).await;
            publish(&store, session);
        });
    }

    /// The current session; reactive.
    pub fn session(&self) -> ResolvedSession {
        self.session.get()
    }

    pub fn is_loading(&self) -> bool {
        self.session.with(ResolvedSession::is_loading)
    }

    pub fn has_permission(&self, name: &str) -> bool {
        self.session.with(|s| settled_and(s, |s| s.has_permission(name)))
    }

    pub fn has_any_permission<S: AsRef<str>>(&self, names: &[S]) -> bool {
        self.session.with(|s| settled_and(s, |s| s.has_any_permission(names)))
    }

    /// Unlike the session predicate, an empty list is refused while loading.
    pub fn has_all_permissions<S: AsRef<str>>(&self, names: &[S]) -> bool {
        self.session.with(|s| settled_and(s, |s| s.has_all_permissions(names)))
    }
}

/// Runs a check only once the session has been resolved.
fn settled_and(session: &ResolvedSession, check: impl FnOnce(&ResolvedSession) -> bool) -> bool {
    !session.is_loading() && check(session)
}

fn publish(store: &SessionStore, session: RwSignal<ResolvedSession>) {
    if !store.is_closed() {
        session.try_set(store.session());
    }
}

/// Returns the permission context provided by the app.
pub fn use_permissions() -> PermissionContext {
    expect_context::<PermissionContext>()
}

/// The checks behind [`Can`], on a resolved session.
fn session_passes(
    session: &ResolvedSession,
    permission: Option<&str>,
    any_of: &[String],
    all_of: &[String],
) -> bool {
    if !session.is_authenticated() {
        return false;
    }
    let single = permission.is_none_or(|name| session.has_permission(name));
    let any = any_of.is_empty() || session.has_any_permission(any_of);
    single && any && session.has_all_permissions(all_of)
}

/// Renders its children only if the session passes the given checks.
///
/// With no checks it requires an authenticated session. Nothing renders
/// while the session is loading.
#[component]
pub fn Can(
    /// A single required permission.
    #[prop(optional, into)]
    permission: Option<String>,
    /// At least one of these permissions.
    #[prop(optional)]
    any_of: Vec<String>,
    /// Every one of these permissions.
    #[prop(optional)]
    all_of: Vec<String>,
    /// Rendered when the checks fail.
    #[prop(optional, into)]
    fallback: ViewFn,
    children: ChildrenFn,
) -> impl IntoView {
    let permissions = use_permissions();
    let allowed = move || {
        permissions.session.with(|session| {
            settled_and(session, |session| {
                session_passes(session, permission.as_deref(), &any_of, &all_of)
            })
        })
    };

    view! {
        <Show when=allowed fallback=fallback>
            {children()}
        </Show>
    }
}
