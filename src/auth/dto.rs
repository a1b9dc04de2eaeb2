use axum::extract::multipart::{Multipart, MultipartError};
use bytes::Bytes;
use serde::Deserialize;

use crate::extract::present;

/// Body of `POST /login`.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Body of `POST /admin`.
#[derive(Debug, Deserialize)]
pub struct AdminForm {
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug)]
pub struct AvatarUpload {
    pub file_name: String,
    pub content_type: String,
    pub body: Bytes,
}

/// Multipart body of `POST /register`. Unknown fields are ignored.
#[derive(Debug, Default)]
pub struct RegisterForm {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub avatar: Option<AvatarUpload>,
}

impl RegisterForm {
    pub async fn read(mut mp: Multipart) -> Result<Self, MultipartError> {
        let mut form = RegisterForm::default();
        while let Some(field) = mp.next_field().await? {
            let name = field.name().map(str::to_owned);
            match name.as_deref() {
                Some("username") => form.username = present(Some(field.text().await?)),
                Some("email") => form.email = present(Some(field.text().await?)),
                Some("password") => form.password = present(Some(field.text().await?)),
                Some("avatar") => {
                    let file_name = field.file_name().unwrap_or_default().to_string();
                    let content_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_string();
                    let body = field.bytes().await?;
                    // an untouched file input still posts an empty part
                    if !file_name.is_empty() && !body.is_empty() {
                        form.avatar = Some(AvatarUpload {
                            file_name,
                            content_type,
                            body,
                        });
                    }
                }
                _ => {}
            }
        }
        Ok(form)
    }
}
