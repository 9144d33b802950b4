//! Client-side session cache.
//!
//! A `SessionStore` holds the resolved session for one UI tree. The tree
//! creates it on mount, resolves once, may refresh explicitly, and closes it
//! on unmount. Stores are independent values, so separate trees (and tests)
//! never share state.
//!
//! The store does not know how resolution happens; callers hand it a
//! future producing a [`ResolvedSession`]. State transitions are wholesale:
//! readers see either the previous session, a loading placeholder, or the
//! next session, never a mix.

use futures::lock::Mutex;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, warn};

use crate::session::ResolvedSession;

/// Lifecycle of a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Created, nothing resolved yet.
    Uninitialized,
    /// A resolution pass is in flight.
    Loading,
    /// The last pass produced a session.
    Ready(ResolvedSession),
    /// The last pass failed; the fallback is a guest session.
    Failed {
        message: String,
        fallback: ResolvedSession,
    },
}

impl SessionState {
    /// The session readers should act on.
    ///
    /// Before the first pass completes this is a loading session, so every
    /// predicate evaluates to false.
    #[must_use]
    pub fn session(&self) -> ResolvedSession {
        match self {
            Self::Uninitialized | Self::Loading => ResolvedSession::loading(),
            Self::Ready(session) => session.clone(),
            Self::Failed { fallback, .. } => fallback.clone(),
        }
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Uninitialized | Self::Loading)
    }
}

struct Inner {
    state: RwLock<SessionState>,
    /// Serializes resolution passes; the flag records whether one has started.
    pass: Mutex<bool>,
    closed: AtomicBool,
}

/// Cache of the resolved session for one UI tree.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("state", &self.state())
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl SessionStore {
    /// Creates an uninitialized store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                state: RwLock::new(SessionState::Uninitialized),
                pass: Mutex::new(false),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Returns a copy of the current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.inner
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the session readers should act on.
    #[must_use]
    pub fn session(&self) -> ResolvedSession {
        self.state().session()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Shorthand for `self.session().has_permission(name)`.
    #[must_use]
    pub fn has_permission(&self, name: &str) -> bool {
        self.settled().is_some_and(|s| s.has_permission(name))
    }

    /// Shorthand for `self.session().has_any_permission(names)`.
    #[must_use]
    pub fn has_any_permission<S: AsRef<str>>(&self, names: &[S]) -> bool {
        self.settled().is_some_and(|s| s.has_any_permission(names))
    }

    /// Like `self.session().has_all_permissions(names)`, except that an
    /// empty list is not vacuously granted before the first pass settles.
    #[must_use]
    pub fn has_all_permissions<S: AsRef<str>>(&self, names: &[S]) -> bool {
        self.settled().is_some_and(|s| s.has_all_permissions(names))
    }

    /// The session, unless a pass has yet to produce one.
    fn settled(&self) -> Option<ResolvedSession> {
        let state = self.state();
        (!state.is_loading()).then(|| state.session())
    }

    /// Runs the first resolution pass.
    ///
    /// Only the first call resolves. Calls made while it is in flight wait
    /// for it and return without resolving again. Returns true if this call
    /// performed the pass.
    pub async fn initialize<F, Fut, E>(&self, resolve: F) -> bool
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<ResolvedSession, E>>,
        E: fmt::Display,
    {
        let mut started = self.inner.pass.lock().await;
        if *started {
            return false;
        }
        *started = true;
        self.run_pass(resolve).await;
        true
    }

    /// Discards the cached session and resolves again.
    ///
    /// Concurrent refreshes run one after another; the last one to finish
    /// determines the state.
    pub async fn refresh<F, Fut, E>(&self, resolve: F)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<ResolvedSession, E>>,
        E: fmt::Display,
    {
        let mut started = self.inner.pass.lock().await;
        *started = true;
        self.run_pass(resolve).await;
    }

    /// Tears the store down. Passes still in flight are discarded.
    pub fn close(&self) {
        self.inner.closed.store(true, Ordering::Release);
    }

    async fn run_pass<F, Fut, E>(&self, resolve: F)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<ResolvedSession, E>>,
        E: fmt::Display,
    {
        if !self.replace(SessionState::Loading) {
            return;
        }

        let next = match resolve().await {
            Ok(session) => {
                debug!(
                    authenticated = session.is_authenticated(),
                    role = %session.role(),
                    full_access = session.has_full_access(),
                    "session resolved"
                );
                SessionState::Ready(session)
            }
            Err(e) => {
                let message = e.to_string();
                warn!(error = %message, "session resolution failed, falling back to guest");
                SessionState::Failed {
                    fallback: ResolvedSession::guest().with_error(message.clone()),
                    message,
                }
            }
        };

        if !self.replace(next) {
            debug!("store closed while resolving, result discarded");
        }
    }

    /// Swaps the state unless the store is closed.
    fn replace(&self, next: SessionState) -> bool {
        let mut state = self
            .inner
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if self.is_closed() {
            return false;
        }
        *state = next;
        true
    }
}
