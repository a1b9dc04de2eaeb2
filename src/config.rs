use std::path::PathBuf;

use anyhow::Context;
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub guest_ttl_minutes: i64,
    pub user_ttl_minutes: i64,
    pub admin_ttl_minutes: i64,
}

#[derive(Debug, Clone)]
pub struct NewsConfig {
    pub api_url: String,
    /// Without a key the news page renders an empty list.
    pub api_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub admin_password: String,
    pub upload_dir: PathBuf,
    pub public_dir: PathBuf,
    pub news: NewsConfig,
    pub host: String,
    pub port: u16,
}

/// Token lifetimes are capped at ten years.
pub const MAX_TTL_MINUTES: i64 = 60 * 24 * 365 * 10;

fn minutes_var(name: &str, default: i64) -> anyhow::Result<i64> {
    parse_minutes(name, std::env::var(name).ok(), default)
}

fn parse_minutes(name: &str, raw: Option<String>, default: i64) -> anyhow::Result<i64> {
    let Some(raw) = raw.filter(|v| !v.trim().is_empty()) else {
        return Ok(default);
    };
    let minutes = raw
        .trim()
        .parse::<i64>()
        .with_context(|| format!("{name} must be a whole number of minutes"))?;
    if !(1..=MAX_TTL_MINUTES).contains(&minutes) {
        anyhow::bail!("{name} must be between 1 and {MAX_TTL_MINUTES} minutes");
    }
    Ok(minutes)
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET is not set")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "ecotrack".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "ecotrack-web".into()),
            guest_ttl_minutes: minutes_var("JWT_GUEST_TTL_MINUTES", 60)?,
            user_ttl_minutes: minutes_var("JWT_USER_TTL_MINUTES", 60 * 24 * 15)?,
            admin_ttl_minutes: minutes_var("JWT_ADMIN_TTL_MINUTES", 60 * 2)?,
        };
        let admin_password =
            std::env::var("ADMIN_PASSWORD").context("ADMIN_PASSWORD is not set")?;
        let news = NewsConfig {
            api_url: std::env::var("NEWS_API_URL")
                .unwrap_or_else(|_| "https://newsapi.org/v2".into()),
            api_key: std::env::var("NEWS_API_KEY").ok().filter(|k| !k.is_empty()),
        };
        let port = std::env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse::<u16>()
            .context("APP_PORT must be a port number")?;

        Ok(Self {
            database_url,
            jwt,
            admin_password,
            upload_dir: std::env::var("UPLOAD_DIR")
                .unwrap_or_else(|_| "uploads".into())
                .into(),
            public_dir: std::env::var("PUBLIC_DIR")
                .unwrap_or_else(|_| "public".into())
                .into(),
            news,
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_minutes_fall_back_to_default() {
        assert_eq!(parse_minutes("X", None, 60).unwrap(), 60);
        assert_eq!(parse_minutes("X", Some("  ".into()), 60).unwrap(), 60);
        assert_eq!(parse_minutes("X", Some("90".into()), 60).unwrap(), 90);
    }

    #[test]
    fn out_of_range_minutes_are_rejected() {
        for raw in ["0", "-5", "soon", "9223372036854775807"] {
            assert!(
                parse_minutes("JWT_USER_TTL_MINUTES", Some(raw.into()), 60).is_err(),
                "{raw}"
            );
        }
        assert!(parse_minutes("X", Some(MAX_TTL_MINUTES.to_string()), 60).is_ok());
    }
}
