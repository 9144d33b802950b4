//! Per-request authorization middleware.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use lostfound_access::{
    AccessError, GateConfig,
    transport::{token_from_authorization, token_from_cookies},
};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::GateState;

/// Query flag appended to the login redirect when the token has expired.
pub const EXPIRED_QUERY: &str = "reason=expired";

/// Reads the bearer token from the request.
///
/// Cookies are consulted first, in their fixed priority order. The
/// `Authorization` header is the fallback.
pub fn request_token(headers: &HeaderMap, jar: &CookieJar) -> Option<String> {
    token_from_cookies(|name| jar.get(name).map(|cookie| cookie.value())).or_else(|| {
        headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(token_from_authorization)
    })
}

/// Refusal produced by the gate.
#[derive(Debug)]
pub struct GateRejection {
    reason: AccessError,
    location: String,
}

impl GateRejection {
    /// Picks the redirect target for a refusal.
    pub fn new(reason: AccessError, config: &GateConfig) -> Self {
        let location = match &reason {
            AccessError::NotAuthenticated => config.login_path().to_string(),
            AccessError::TokenExpired => format!("{}?{EXPIRED_QUERY}", config.login_path()),
            AccessError::PermissionDenied { .. } | AccessError::Unavailable { .. } => {
                config.unauthorized_path().to_string()
            }
        };
        Self { reason, location }
    }

    pub fn reason(&self) -> &AccessError {
        &self.reason
    }

    pub fn location(&self) -> &str {
        &self.location
    }
}

impl IntoResponse for GateRejection {
    fn into_response(self) -> Response {
        Redirect::to(&self.location).into_response()
    }
}

/// Guards protected routes.
///
/// Public routes pass straight through without resolving anything.
/// Protected routes resolve the session for this request only and either
/// forward the request or redirect.
pub async fn require_route_access(
    State(state): State<Arc<GateState>>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    let path = state.config.normalize(request.uri().path());
    let Some(rule) = state.routes.lookup(&path) else {
        debug!(path = %path, "unrestricted route");
        return next.run(request).await;
    };

    let token = request_token(request.headers(), &jar);
    let session = match state.resolver.resolve(token.as_deref()).await {
        Ok(session) => session,
        Err(e) => {
            warn!(path = %path, error = %e, "permission backend unreachable, refusing request");
            let reason = AccessError::Unavailable {
                details: e.current_context().to_string(),
            };
            return GateRejection::new(reason, &state.config).into_response();
        }
    };

    match rule.check(&session) {
        Ok(()) => {
            debug!(path = %path, role = %session.role(), "route access granted");
            next.run(request).await
        }
        Err(reason) => {
            info!(path = %path, role = %session.role(), reason = %reason, "route access refused");
            GateRejection::new(reason, &state.config).into_response()
        }
    }
}

#[cfg(all(test, feature = "ssr"))]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::{Router, body::Body, http::StatusCode, routing::get};
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use lostfound_access::{
        CRITICAL_PERMISSIONS, EscalationPolicy, LookupError, LookupOutcome, PermissionDirectory,
        PermissionSet, Resolver, RouteTable,
    };
    use lostfound_core::RoleId;
    use rootcause::Report;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    enum Answer {
        Grant(PermissionSet),
        Unreachable,
    }

    struct StubDirectory {
        answer: Answer,
        calls: AtomicUsize,
    }

    impl StubDirectory {
        fn granting(names: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                answer: Answer::Grant(names.iter().copied().collect()),
                calls: AtomicUsize::new(0),
            })
        }

        fn unreachable() -> Arc<Self> {
            Arc::new(Self {
                answer: Answer::Unreachable,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl PermissionDirectory for StubDirectory {
        async fn role_permissions(
            &self,
            _role_id: &RoleId,
            _token: &str,
        ) -> Result<LookupOutcome, Report<LookupError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.answer {
                Answer::Grant(set) => Ok(LookupOutcome::Granted(set.clone())),
                Answer::Unreachable => Err(LookupError::Unreachable {
                    details: "connection refused".to_string(),
                }
                .into()),
            }
        }
    }

    fn token(payload: serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload.to_string());
        format!("{header}.{body}.sig")
    }

    fn live_token() -> String {
        token(json!({ "sub": "u1", "role": "moderator", "roleId": "3", "exp": 4102444800i64 }))
    }

    fn app(directory: Arc<StubDirectory>) -> Router {
        let directory: Arc<dyn PermissionDirectory> = directory;
        let state = Arc::new(GateState::new(
            Resolver::new(directory, EscalationPolicy::default()),
            RouteTable::dashboard(),
            GateConfig::default(),
        ));
        Router::new()
            .route("/", get(|| async { "home" }))
            .route("/dashboard", get(|| async { "overview" }))
            .route("/dashboard/items/{id}", get(|| async { "item" }))
            .route("/{locale}/dashboard/items", get(|| async { "items" }))
            .route("/dashboard/users", get(|| async { "users" }))
            .layer(axum::middleware::from_fn_with_state(
                state,
                require_route_access,
            ))
    }

    async fn send(app: Router, uri: &str, cookie: Option<&str>) -> Response {
        let mut builder = axum::http::Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header("cookie", cookie);
        }
        app.oneshot(builder.body(Body::empty()).expect("request"))
            .await
            .expect("response")
    }

    fn location(response: &Response) -> &str {
        response
            .headers()
            .get("location")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }

    #[test]
    fn rejection_targets() {
        let config = GateConfig::default();
        assert_eq!(
            GateRejection::new(AccessError::NotAuthenticated, &config).location(),
            "/login"
        );
        assert_eq!(
            GateRejection::new(AccessError::TokenExpired, &config).location(),
            "/login?reason=expired"
        );
        let denied = AccessError::PermissionDenied {
            path: "/dashboard/users".to_string(),
        };
        assert_eq!(
            GateRejection::new(denied, &config).location(),
            "/unauthorized"
        );
    }

    #[test]
    fn token_prefers_cookie_over_header() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, "Bearer from-header".parse().expect("header"));
        let jar = CookieJar::new();
        assert_eq!(request_token(&headers, &jar).as_deref(), Some("from-header"));

        let jar = jar.add(axum_extra::extract::cookie::Cookie::new("jwt", "from-cookie"));
        assert_eq!(request_token(&headers, &jar).as_deref(), Some("from-cookie"));
    }

    #[tokio::test]
    async fn public_route_skips_resolution() {
        let directory = StubDirectory::granting(&[]);
        let response = send(app(directory.clone()), "/", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(directory.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn anonymous_request_redirects_to_login() {
        let directory = StubDirectory::granting(&[]);
        let response = send(app(directory.clone()), "/dashboard", None).await;
        assert!(response.status().is_redirection());
        assert_eq!(location(&response), "/login");
        assert_eq!(directory.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn expired_token_redirects_with_flag() {
        let expired = token(json!({ "roleId": "3", "exp": 1 }));
        let cookie = format!("token={expired}");
        let response = send(
            app(StubDirectory::granting(&[])),
            "/dashboard",
            Some(&cookie),
        )
        .await;
        assert_eq!(location(&response), "/login?reason=expired");
    }

    #[tokio::test]
    async fn authenticated_only_route_needs_no_permissions() {
        let cookie = format!("token={}", live_token());
        let response = send(
            app(StubDirectory::granting(&[])),
            "/dashboard",
            Some(&cookie),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn nested_path_uses_section_permission() {
        let cookie = format!("access_token={}", live_token());
        let allowed = send(
            app(StubDirectory::granting(&["can_manage_items"])),
            "/dashboard/items/123",
            Some(&cookie),
        )
        .await;
        assert_eq!(allowed.status(), StatusCode::OK);

        let refused = send(
            app(StubDirectory::granting(&["can_manage_claims"])),
            "/dashboard/items/123",
            Some(&cookie),
        )
        .await;
        assert_eq!(location(&refused), "/unauthorized");
    }

    #[tokio::test]
    async fn locale_prefix_is_stripped() {
        let cookie = format!("token={}", live_token());
        let response = send(
            app(StubDirectory::granting(&["can_manage_claims"])),
            "/ar/dashboard/items",
            Some(&cookie),
        )
        .await;
        assert_eq!(location(&response), "/unauthorized");
    }

    #[tokio::test]
    async fn full_access_passes_every_section() {
        let cookie = format!("jwt={}", live_token());
        let response = send(
            app(StubDirectory::granting(&CRITICAL_PERMISSIONS)),
            "/dashboard/users",
            Some(&cookie),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unreachable_backend_redirects_to_unauthorized() {
        let cookie = format!("token={}", live_token());
        let response = send(
            app(StubDirectory::unreachable()),
            "/dashboard/users",
            Some(&cookie),
        )
        .await;
        assert_eq!(location(&response), "/unauthorized");
    }

    #[tokio::test]
    async fn percent_encoded_cookie_is_decoded() {
        let directory = StubDirectory::granting(&["can_manage_items"]);
        let cookie = format!("token={}", live_token().replace('.', "%2E"));
        let response = send(app(directory.clone()), "/dashboard/items/1", Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(directory.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn every_request_resolves_again() {
        let directory = StubDirectory::granting(&["can_manage_items"]);
        let router = app(directory.clone());
        let cookie = format!("token={}", live_token());
        for _ in 0..2 {
            let response = send(router.clone(), "/dashboard/items/1", Some(&cookie)).await;
            assert_eq!(response.status(), StatusCode::OK);
        }
        assert_eq!(directory.calls.load(Ordering::SeqCst), 2);
    }
}
