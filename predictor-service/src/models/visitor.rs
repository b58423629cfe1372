use crate::AppState;
use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use service_core::error::AppError;
use uuid::Uuid;

/// Cookie holding the visitor id.
pub const VISITOR_COOKIE: &str = "visitor_id";

/// Anonymous visitor identified by a random id kept in a cookie.
///
/// The id keys the server-side [`SessionStore`](crate::services::session_store::SessionStore);
/// nothing else about the visitor lives in the cookie or anywhere else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visitor {
    pub id: String,
}

impl Visitor {
    /// Visitor named by the request cookie, or a new one when it is missing
    /// or not a UUID.
    pub fn from_jar(jar: &CookieJar) -> Self {
        let Some(cookie) = jar.get(VISITOR_COOKIE) else {
            return Self::fresh();
        };

        match Uuid::parse_str(cookie.value()) {
            Ok(id) => Visitor { id: id.to_string() },
            Err(e) => {
                tracing::warn!(error = %e, "Malformed visitor cookie, issuing a new id");
                Self::fresh()
            }
        }
    }

    fn fresh() -> Self {
        let id = Uuid::new_v4().to_string();
        tracing::debug!(visitor_id = %id, "New visitor");
        Visitor { id }
    }
}

/// Resolve the visitor for page routes and refresh the cookie on every
/// response, so it expires only after `session_idle_minutes` of inactivity.
pub async fn visitor_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> (CookieJar, Response) {
    let visitor = Visitor::from_jar(&jar);
    let server = &state.settings.server;

    let cookie = Cookie::build((VISITOR_COOKIE, visitor.id.clone()))
        .path("/")
        .http_only(true)
        .secure(server.secure_cookies)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::minutes(server.session_idle_minutes.max(1)))
        .build();

    request.extensions_mut().insert(visitor);
    let response = next.run(request).await;

    (jar.add(cookie), response)
}

#[async_trait]
impl<S> FromRequestParts<S> for Visitor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Visitor>().cloned().ok_or_else(|| {
            AppError::InternalError(anyhow::anyhow!("Visitor middleware is not installed"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_cookie_keeps_its_id() {
        let id = Uuid::new_v4().to_string();
        let jar = CookieJar::new().add(Cookie::new(VISITOR_COOKIE, id.clone()));

        assert_eq!(Visitor::from_jar(&jar).id, id);
    }

    #[test]
    fn missing_cookie_gets_a_new_id() {
        let first = Visitor::from_jar(&CookieJar::new());
        let second = Visitor::from_jar(&CookieJar::new());

        assert!(Uuid::parse_str(&first.id).is_ok());
        assert_ne!(first, second);
    }

    #[test]
    fn malformed_cookie_is_replaced() {
        let jar = CookieJar::new().add(Cookie::new(VISITOR_COOKIE, "not-a-uuid"));

        let visitor = Visitor::from_jar(&jar);
        assert_ne!(visitor.id, "not-a-uuid");
        assert!(Uuid::parse_str(&visitor.id).is_ok());
    }
}
