use axum::{
    extract::{DefaultBodyLimit, FromRef, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use subtle::ConstantTimeEq;
use time::OffsetDateTime;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AdminForm, LoginForm, RegisterForm},
        extractors::{Session, TOKEN_COOKIE},
        jwt::SessionKeys,
        password::{hash_password_blocking, verify_password_blocking},
        repo_types::NewUser,
        services::{avatar_key, is_image_file_name, normalize_email},
    },
    db::StoreError,
    error::{internal_json, internal_text, json_error, JsonError, MessageBody},
    extract::{present, FormOrJson},
    pages::{
        render,
        templates::{AdminLoginTemplate, LoginTemplate, RegisterTemplate},
    },
    state::AppState,
};

const AVATAR_LIMIT_BYTES: usize = 10 * 1024 * 1024;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/register",
            get(register_page)
                .post(register)
                .layer(DefaultBodyLimit::max(AVATAR_LIMIT_BYTES)),
        )
        .route("/login", get(login_page).post(login))
        .route("/admin", get(admin_page).post(admin_login))
        .route("/guest-login", post(guest_login))
        .route("/logout", get(logout))
}

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

#[instrument(skip(state, mp))]
pub async fn register(
    State(state): State<AppState>,
    mp: Multipart,
) -> Result<(StatusCode, Json<MessageBody>), JsonError> {
    let form = RegisterForm::read(mp)
        .await
        .map_err(|e| json_error(StatusCode::BAD_REQUEST, e.body_text()))?;

    let (Some(name), Some(email), Some(password), Some(avatar)) =
        (form.username, form.email, form.password, form.avatar)
    else {
        warn!("register missing fields");
        return Err(json_error(
            StatusCode::BAD_REQUEST,
            "Missing required fields: email, password, or avatar file.",
        ));
    };

    if !is_image_file_name(&avatar.file_name) {
        warn!(file_name = %avatar.file_name, "register rejected non-image avatar");
        return Err(json_error(
            StatusCode::BAD_REQUEST,
            "Only image files are allowed!",
        ));
    }

    let email = normalize_email(&email);
    match state.store.find_user_by_email(&email).await {
        Ok(Some(_)) => {
            warn!(%email, "email already registered");
            return Err(json_error(
                StatusCode::BAD_REQUEST,
                "User with this email already exists.",
            ));
        }
        Ok(None) => {}
        Err(e) => return Err(internal_json(e)),
    }

    let password_hash = hash_password_blocking(password)
        .await
        .map_err(internal_json)?;

    let now_millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    let key = avatar_key(now_millis, &avatar.file_name);
    state
        .storage
        .put_object(&key, avatar.body, &avatar.content_type)
        .await
        .map_err(internal_json)?;

    let new_user = NewUser {
        avatar: state.storage.public_url(&key),
        name,
        email,
        password_hash,
    };
    let user = match state.store.insert_user(new_user).await {
        Ok(u) => u,
        Err(e) => {
            if let Err(cleanup) = state.storage.delete_object(&key).await {
                warn!(error = %cleanup, %key, "could not remove unused avatar");
            }
            return Err(match e {
                StoreError::DuplicateEmail => json_error(
                    StatusCode::BAD_REQUEST,
                    "User with this email already exists.",
                ),
                other => internal_json(other),
            });
        }
    };

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        MessageBody::new("User registered successfully!"),
    ))
}

#[instrument(skip(state, jar, form))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    FormOrJson(form): FormOrJson<LoginForm>,
) -> Result<(CookieJar, &'static str), (StatusCode, String)> {
    let (Some(email), Some(password)) = (present(form.email), present(form.password)) else {
        return Err((
            StatusCode::BAD_REQUEST,
            "Email and password are required.".into(),
        ));
    };
    let email = normalize_email(&email);

    let user = match state.store.find_user_by_email(&email).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            warn!(%email, "login unknown email");
            return Err((StatusCode::NOT_FOUND, "User not found.".into()));
        }
        Err(e) => return Err(internal_text(e)),
    };

    let ok = verify_password_blocking(password, user.password_hash.clone())
        .await
        .map_err(internal_text)?;
    if !ok {
        warn!(%email, user_id = %user.id, "login invalid password");
        return Err((StatusCode::FORBIDDEN, "Invalid credentials.".into()));
    }

    let token = SessionKeys::from_ref(&state)
        .sign_user(&user)
        .map_err(internal_text)?;

    info!(user_id = %user.id, "user logged in");
    Ok((jar.add(session_cookie(token)), "Login successful."))
}

#[instrument(skip(state, jar, form))]
pub async fn admin_login(
    State(state): State<AppState>,
    jar: CookieJar,
    FormOrJson(form): FormOrJson<AdminForm>,
) -> Result<(CookieJar, &'static str), (StatusCode, String)> {
    let Some(password) = present(form.password) else {
        return Err((StatusCode::BAD_REQUEST, "Password is required.".into()));
    };

    let expected = state.config.admin_password.as_bytes();
    if !bool::from(password.as_bytes().ct_eq(expected)) {
        warn!("admin login invalid password");
        return Err((StatusCode::FORBIDDEN, "Invalid password.".into()));
    }

    let token = SessionKeys::from_ref(&state)
        .sign_admin()
        .map_err(internal_text)?;

    info!("admin logged in");
    Ok((jar.add(session_cookie(token)), "Admin Login successful."))
}

#[instrument(skip(state, jar))]
pub async fn guest_login(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, &'static str), (StatusCode, String)> {
    let token = SessionKeys::from_ref(&state)
        .sign_guest()
        .map_err(internal_text)?;
    info!("guest session started");
    Ok((jar.add(session_cookie(token)), "Guest login successful."))
}

pub async fn logout(jar: CookieJar) -> (CookieJar, Json<MessageBody>) {
    let jar = jar.remove(Cookie::build(TOKEN_COOKIE).path("/"));
    (jar, MessageBody::new("Logged out successfully"))
}

pub async fn login_page(session: Session) -> Response {
    if session.is_authenticated() {
        return Redirect::to("/").into_response();
    }
    render(LoginTemplate {
        title: "Login - EcoTrack",
        viewer: None,
    })
}

pub async fn register_page() -> Response {
    render(RegisterTemplate {
        title: "Register - EcoTrack",
        viewer: None,
    })
}

pub async fn admin_page(session: Session) -> Response {
    if session.is_admin() {
        return Redirect::to("/dashboard").into_response();
    }
    render(AdminLoginTemplate {
        title: "Admin Login - EcoTrack",
        viewer: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_is_http_only() {
        let cookie = session_cookie("abc".into());
        assert_eq!(cookie.name(), "token");
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
    }
}
