use std::convert::Infallible;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::CookieJar;
use tracing::debug;
use uuid::Uuid;

use super::claims::{Claims, Identity, Role};
use super::jwt::SessionKeys;

pub const TOKEN_COOKIE: &str = "token";

/// Authorization context of one request. A missing, malformed or expired
/// token is `Anonymous`; handlers decide what that means for them.
#[derive(Debug, Clone)]
pub enum Session {
    Anonymous,
    Authenticated(Claims),
}

impl Session {
    pub fn role(&self) -> Option<Role> {
        match self {
            Session::Anonymous => None,
            Session::Authenticated(claims) => Some(claims.role),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Session::Authenticated(_))
    }

    pub fn is_admin(&self) -> bool {
        self.role() == Some(Role::Admin)
    }

    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Session::Authenticated(claims) => claims.user.as_ref(),
            Session::Anonymous => None,
        }
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.identity().map(|i| i.id)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
    SessionKeys: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let Some(cookie) = jar.get(TOKEN_COOKIE) else {
            return Ok(Session::Anonymous);
        };

        let keys = SessionKeys::from_ref(state);
        match keys.verify(cookie.value()) {
            Ok(claims) => Ok(Session::Authenticated(claims)),
            Err(e) => {
                debug!(error = %e, "ignoring invalid or expired session token");
                Ok(Session::Anonymous)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;
    use axum::http::{header::COOKIE, Request};
    use time::OffsetDateTime;

    async fn session_for(state: &AppState, cookie: Option<String>) -> Session {
        let mut builder = Request::builder().uri("/");
        if let Some(c) = cookie {
            builder = builder.header(COOKIE, c);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        Session::from_request_parts(&mut parts, state).await.unwrap()
    }

    #[tokio::test]
    async fn no_cookie_is_anonymous() {
        let state = AppState::fake();
        assert!(!session_for(&state, None).await.is_authenticated());
    }

    #[tokio::test]
    async fn garbage_token_is_anonymous() {
        let state = AppState::fake();
        let session = session_for(&state, Some("token=not.a.jwt".into())).await;
        assert!(matches!(session, Session::Anonymous));
    }

    #[tokio::test]
    async fn valid_guest_token_is_authenticated() {
        let state = AppState::fake();
        let token = SessionKeys::from_ref(&state).sign_guest().unwrap();
        let session = session_for(&state, Some(format!("other=1; token={token}"))).await;
        assert_eq!(session.role(), Some(Role::Guest));
        assert!(session.identity().is_none());
    }

    #[tokio::test]
    async fn expired_token_is_same_as_none() {
        let state = AppState::fake();
        let keys = SessionKeys::from_ref(&state);
        let now = OffsetDateTime::now_utc().unix_timestamp() as usize;
        let stale = Claims {
            role: Role::Admin,
            user: None,
            iat: now - 3 * 60 * 60,
            exp: now - 60 * 60,
            iss: keys.issuer.clone(),
            aud: keys.audience.clone(),
        };
        let token = keys.encode_claims(&stale).unwrap();
        let session = session_for(&state, Some(format!("token={token}"))).await;
        assert!(matches!(session, Session::Anonymous));
        assert!(!session.is_admin());
    }
}
