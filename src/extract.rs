use axum::{
    async_trait,
    extract::{FromRequest, Request},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    Form, Json,
};
use serde::de::DeserializeOwned;

use crate::error::{json_error, JsonError};

/// Unreadable form or JSON body. Answers 400 in plain text; JSON endpoints
/// convert it into their `{"error": ...}` shape with `?`.
#[derive(Debug)]
pub struct BodyRejection(pub String);

impl IntoResponse for BodyRejection {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, self.0).into_response()
    }
}

impl From<BodyRejection> for JsonError {
    fn from(rejection: BodyRejection) -> Self {
        json_error(StatusCode::BAD_REQUEST, rejection.0)
    }
}

/// Accepts either `application/json` or an urlencoded form body, the way the
/// browser pages and scripted clients both post to the same endpoints.
pub struct FormOrJson<T>(pub T);

pub(crate) fn content_type(req: &Request) -> &str {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

#[async_trait]
impl<T, S> FromRequest<S> for FormOrJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = BodyRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if content_type(&req).starts_with("application/json") {
            let Json(value) = Json::<T>::from_request(req, state)
                .await
                .map_err(|e| BodyRejection(e.body_text()))?;
            Ok(FormOrJson(value))
        } else {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(|e| BodyRejection(e.body_text()))?;
            Ok(FormOrJson(value))
        }
    }
}

/// Empty strings count as missing, matching how the pages submit blank inputs.
pub fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Creds {
        #[serde(default)]
        email: Option<String>,
        #[serde(default)]
        password: Option<String>,
    }

    #[tokio::test]
    async fn reads_urlencoded_body() {
        let req = axum::http::Request::builder()
            .method("POST")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("email=a%40b.c&password=pw"))
            .unwrap();
        let FormOrJson(creds) = FormOrJson::<Creds>::from_request(req, &()).await.unwrap();
        assert_eq!(creds.email.as_deref(), Some("a@b.c"));
        assert_eq!(creds.password.as_deref(), Some("pw"));
    }

    #[tokio::test]
    async fn reads_json_body_with_missing_field() {
        let req = axum::http::Request::builder()
            .method("POST")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"email":"a@b.c"}"#))
            .unwrap();
        let FormOrJson(creds) = FormOrJson::<Creds>::from_request(req, &()).await.unwrap();
        assert_eq!(creds.email.as_deref(), Some("a@b.c"));
        assert!(creds.password.is_none());
    }

    #[tokio::test]
    async fn missing_content_type_is_a_plain_text_400() {
        let req = axum::http::Request::builder()
            .method("POST")
            .body(Body::from("email=a%40b.c"))
            .unwrap();
        let Err(rejection) = FormOrJson::<Creds>::from_request(req, &()).await else {
            panic!("body without a content type must be rejected");
        };
        let res = rejection.into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(res.headers()[CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/plain"));
    }

    #[test]
    fn rejection_converts_to_json_error() {
        let (status, axum::Json(body)) = JsonError::from(BodyRejection("bad body".into()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "bad body");
    }

    #[test]
    fn blank_values_are_missing() {
        assert_eq!(present(Some("  ".into())), None);
        assert_eq!(present(None), None);
        assert_eq!(present(Some("x".into())).as_deref(), Some("x"));
    }
}
