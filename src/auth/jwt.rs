use std::time::Duration;

use anyhow::Context;
use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;

use super::claims::{Claims, Identity, Role};
use super::repo_types::User;
use crate::{config::JwtConfig, state::AppState};

/// Signing and verification keys plus the per-role token lifetimes.
#[derive(Clone)]
pub struct SessionKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
    pub guest_ttl: Duration,
    pub user_ttl: Duration,
    pub admin_ttl: Duration,
}

impl FromRef<AppState> for SessionKeys {
    fn from_ref(state: &AppState) -> Self {
        SessionKeys::from_config(&state.config.jwt)
    }
}

impl SessionKeys {
    pub fn from_config(cfg: &JwtConfig) -> Self {
        let JwtConfig {
            secret,
            issuer,
            audience,
            guest_ttl_minutes,
            user_ttl_minutes,
            admin_ttl_minutes,
        } = cfg.clone();
        let minutes = |m: i64| Duration::from_secs((m.max(0) as u64).saturating_mul(60));
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            audience,
            guest_ttl: minutes(guest_ttl_minutes),
            user_ttl: minutes(user_ttl_minutes),
            admin_ttl: minutes(admin_ttl_minutes),
        }
    }

    pub fn ttl_for(&self, role: Role) -> Duration {
        match role {
            Role::Guest => self.guest_ttl,
            Role::User => self.user_ttl,
            Role::Admin => self.admin_ttl,
        }
    }

    fn sign_role(&self, role: Role, user: Option<Identity>) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let ttl = i64::try_from(self.ttl_for(role).as_secs())?;
        let exp = now
            .checked_add(TimeDuration::seconds(ttl))
            .context("token lifetime out of range")?;
        let claims = Claims {
            role,
            user,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = self.encode_claims(&claims)?;
        debug!(role = role.as_str(), "session token signed");
        Ok(token)
    }

    pub(crate) fn encode_claims(&self, claims: &Claims) -> anyhow::Result<String> {
        Ok(encode(&Header::default(), claims, &self.encoding)?)
    }

    pub fn sign_guest(&self) -> anyhow::Result<String> {
        self.sign_role(Role::Guest, None)
    }

    pub fn sign_admin(&self) -> anyhow::Result<String> {
        self.sign_role(Role::Admin, None)
    }

    pub fn sign_user(&self, user: &User) -> anyhow::Result<String> {
        self.sign_role(
            Role::User,
            Some(Identity {
                id: user.id,
                email: user.email.clone(),
                name: user.name.clone(),
                avatar: user.avatar.clone(),
            }),
        )
    }

    /// Checks signature, issuer, audience and expiry.
    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let mut validation = Validation::default();
        validation.leeway = 0;
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        if data.claims.role == Role::User && data.claims.user.is_none() {
            anyhow::bail!("user token without identity");
        }
        debug!(role = data.claims.role.as_str(), "session token verified");
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn make_keys(secret: &str, issuer: &str, audience: &str) -> SessionKeys {
        SessionKeys::from_config(&JwtConfig {
            secret: secret.into(),
            issuer: issuer.into(),
            audience: audience.into(),
            guest_ttl_minutes: 60,
            user_ttl_minutes: 60 * 24 * 15,
            admin_ttl_minutes: 120,
        })
    }

    fn sample_user() -> User {
        let now = OffsetDateTime::now_utc();
        User {
            id: Uuid::new_v4(),
            avatar: "/uploads/1-me.png".into(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password_hash: "irrelevant".into(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn user_token_carries_identity() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let user = sample_user();
        let token = keys.sign_user(&user).expect("sign user");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.role, Role::User);
        let identity = claims.user.expect("identity");
        assert_eq!(identity.id, user.id);
        assert_eq!(identity.email, "ada@example.com");
        assert_eq!(identity.name, "Ada");
        assert_eq!(identity.avatar, "/uploads/1-me.png");
    }

    #[test]
    fn guest_and_admin_tokens_have_no_identity() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let guest = keys.verify(&keys.sign_guest().unwrap()).unwrap();
        assert_eq!(guest.role, Role::Guest);
        assert!(guest.user.is_none());

        let admin = keys.verify(&keys.sign_admin().unwrap()).unwrap();
        assert_eq!(admin.role, Role::Admin);
        assert!(admin.user.is_none());
    }

    #[test]
    fn expiry_follows_role() {
        let keys = make_keys("dev-secret", "iss", "aud");
        for (role, token, ttl) in [
            (Role::Guest, keys.sign_guest().unwrap(), 60 * 60),
            (Role::Admin, keys.sign_admin().unwrap(), 2 * 60 * 60),
            (Role::User, keys.sign_user(&sample_user()).unwrap(), 15 * 24 * 60 * 60),
        ] {
            let claims = keys.verify(&token).unwrap();
            assert_eq!(claims.role, role);
            assert_eq!(claims.exp - claims.iat, ttl);
        }
    }

    #[test]
    fn oversized_lifetime_fails_to_sign_instead_of_panicking() {
        let keys = SessionKeys::from_config(&JwtConfig {
            secret: "dev-secret".into(),
            issuer: "iss".into(),
            audience: "aud".into(),
            guest_ttl_minutes: i64::MAX,
            user_ttl_minutes: i64::MAX / 60,
            admin_ttl_minutes: 120,
        });
        assert!(keys.sign_guest().is_err());
        assert!(keys.sign_user(&sample_user()).is_err());
        assert!(keys.sign_admin().is_ok());
    }

    #[test]
    fn expired_token_is_rejected() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let now = OffsetDateTime::now_utc().unix_timestamp() as usize;
        let claims = Claims {
            role: Role::Guest,
            user: None,
            iat: now - 2 * 60 * 60,
            exp: now - 60 * 60,
            iss: "iss".into(),
            aud: "aud".into(),
        };
        let token = keys.encode_claims(&claims).unwrap();
        assert!(keys.verify(&token).is_err());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let good = make_keys("secret-a", "iss", "aud");
        let bad = make_keys("secret-b", "iss", "aud");
        let token = good.sign_guest().unwrap();
        assert!(bad.verify(&token).is_err());
    }

    #[test]
    fn wrong_issuer_or_audience_is_rejected() {
        let good = make_keys("same-secret", "good-iss", "good-aud");
        let bad = make_keys("same-secret", "bad-iss", "bad-aud");
        let token = good.sign_admin().unwrap();
        assert!(bad.verify(&token).is_err());
    }
}
