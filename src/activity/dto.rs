use axum::{
    async_trait,
    extract::{FromRequest, Multipart, Request},
    http::StatusCode,
};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{json_error, JsonError};
use crate::extract::{content_type, present, FormOrJson};

/// Raw `/log` input; every field is optional until the handler checks presence.
#[derive(Debug, Default, Deserialize)]
pub struct LogFields {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub activity: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub amount: Option<String>,
}

fn string_or_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(f64),
    }
    Ok(Option::<Raw>::deserialize(d)?.map(|raw| match raw {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    }))
}

impl LogFields {
    async fn from_multipart(mut mp: Multipart) -> Result<Self, JsonError> {
        let bad = |e: axum::extract::multipart::MultipartError| {
            json_error(StatusCode::BAD_REQUEST, e.body_text())
        };
        let mut fields = LogFields::default();
        while let Some(field) = mp.next_field().await.map_err(bad)? {
            let name = field.name().map(str::to_owned);
            match name.as_deref() {
                Some("date") => fields.date = Some(field.text().await.map_err(bad)?),
                Some("activity") => fields.activity = Some(field.text().await.map_err(bad)?),
                Some("amount") => fields.amount = Some(field.text().await.map_err(bad)?),
                _ => {}
            }
        }
        Ok(fields)
    }

    /// `(date, activity, amount)` when all three are non-blank.
    pub fn required(self) -> Option<(String, String, String)> {
        Some((
            present(self.date)?,
            present(self.activity)?,
            present(self.amount)?,
        ))
    }
}

/// `/log` body: multipart (the browser's `FormData`), JSON or urlencoded.
pub struct LogRequest(pub LogFields);

#[async_trait]
impl<S> FromRequest<S> for LogRequest
where
    S: Send + Sync,
{
    type Rejection = JsonError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if content_type(&req).starts_with("multipart/form-data") {
            let mp = Multipart::from_request(req, state)
                .await
                .map_err(|e| json_error(StatusCode::BAD_REQUEST, e.body_text()))?;
            return Ok(LogRequest(LogFields::from_multipart(mp).await?));
        }
        let FormOrJson(fields) = FormOrJson::<LogFields>::from_request(req, state).await?;
        Ok(LogRequest(fields))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogResponse {
    pub activity: String,
    pub amount: f64,
    pub carbon_emission: f64,
    pub message: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_accepts_number_or_string() {
        let f: LogFields =
            serde_json::from_str(r#"{"date":"2024-05-01","activity":"Driving","amount":100}"#)
                .unwrap();
        assert_eq!(f.amount.as_deref(), Some("100"));

        let f: LogFields = serde_json::from_str(r#"{"amount":"12.5"}"#).unwrap();
        assert_eq!(f.amount.as_deref(), Some("12.5"));
    }

    #[test]
    fn required_needs_all_three() {
        let f = LogFields {
            date: Some("2024-05-01".into()),
            activity: Some("Driving".into()),
            amount: Some("".into()),
        };
        assert!(f.required().is_none());
    }

    #[test]
    fn response_uses_camel_case() {
        let body = serde_json::to_value(LogResponse {
            activity: "Driving".into(),
            amount: 100.0,
            carbon_emission: 21.0,
            message: "ok",
        })
        .unwrap();
        assert_eq!(body["carbonEmission"], 21.0);
        assert_eq!(body["activity"], "Driving");
    }
}
