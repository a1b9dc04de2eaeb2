use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::config::NewsConfig;

/// One headline as shown on the news page.
#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    pub title: String,
    pub description: String,
    pub url: String,
    pub image_url: Option<String>,
    pub source: String,
    pub published_at: String,
}

#[async_trait]
pub trait NewsClient: Send + Sync {
    async fn carbon_headlines(&self) -> anyhow::Result<Vec<Article>>;
}

#[derive(Debug, Deserialize)]
struct EverythingResponse {
    #[serde(default)]
    articles: Vec<RawArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArticle {
    #[serde(default)]
    source: Option<RawSource>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    url_to_image: Option<String>,
    #[serde(default)]
    published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSource {
    #[serde(default)]
    name: Option<String>,
}

/// Only `http` and `https` links end up in an `href` or `src`.
fn web_url(url: Option<String>) -> Option<String> {
    url.filter(|u| {
        let lower = u.trim_start().to_ascii_lowercase();
        lower.starts_with("https://") || lower.starts_with("http://")
    })
}

impl RawArticle {
    /// Articles without a title or a web link are dropped.
    fn into_article(self) -> Option<Article> {
        Some(Article {
            title: self.title.filter(|t| !t.is_empty())?,
            url: web_url(self.url)?,
            description: self.description.unwrap_or_default(),
            image_url: web_url(self.url_to_image),
            source: self.source.and_then(|s| s.name).unwrap_or_default(),
            published_at: self.published_at.unwrap_or_default(),
        })
    }
}

fn parse_articles(body: EverythingResponse) -> Vec<Article> {
    body.articles
        .into_iter()
        .filter_map(RawArticle::into_article)
        .collect()
}

/// newsapi.org `everything` search for carbon-related stories.
pub struct NewsApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl NewsApiClient {
    pub fn new(cfg: &NewsConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("ecotrack/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("build http client")?;
        Ok(Self {
            http,
            base_url: cfg.api_url.trim_end_matches('/').to_string(),
            api_key: cfg.api_key.clone(),
        })
    }
}

#[async_trait]
impl NewsClient for NewsApiClient {
    async fn carbon_headlines(&self) -> anyhow::Result<Vec<Article>> {
        let Some(key) = self.api_key.as_deref() else {
            debug!("no news api key configured");
            return Ok(Vec::new());
        };
        let body: EverythingResponse = self
            .http
            .get(format!("{}/everything", self.base_url))
            .query(&[("q", "carbon"), ("sortBy", "publishedAt"), ("apiKey", key)])
            .send()
            .await
            .context("news api request")?
            .error_for_status()
            .context("news api status")?
            .json()
            .await
            .context("news api body")?;
        Ok(parse_articles(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_newsapi_payload() {
        let raw = r#"{
            "status": "ok",
            "totalResults": 2,
            "articles": [
                {
                    "source": {"id": null, "name": "Example Times"},
                    "title": "Carbon prices climb",
                    "description": "Markets react.",
                    "url": "https://example.com/a",
                    "urlToImage": "https://example.com/a.jpg",
                    "publishedAt": "2024-05-01T10:00:00Z"
                },
                {"source": {"name": "Nowhere"}, "title": null, "url": "https://example.com/b"}
            ]
        }"#;
        let body: EverythingResponse = serde_json::from_str(raw).unwrap();
        let articles = parse_articles(body);
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title, "Carbon prices climb");
        assert_eq!(articles[0].source, "Example Times");
        assert_eq!(articles[0].image_url.as_deref(), Some("https://example.com/a.jpg"));
    }

    #[test]
    fn non_web_links_are_dropped() {
        let raw = r#"{
            "articles": [
                {"title": "Script link", "url": "javascript:alert(1)"},
                {"title": "Padded script link", "url": " JavaScript:alert(1)", "urlToImage": "https://x/i.png"},
                {"title": "Upper case", "url": "HTTPS://example.com/c", "urlToImage": "data:image/png;base64,AA"}
            ]
        }"#;
        let body: EverythingResponse = serde_json::from_str(raw).unwrap();
        let articles = parse_articles(body);
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].url, "HTTPS://example.com/c");
        assert!(articles[0].image_url.is_none());
    }

    #[tokio::test]
    async fn missing_key_yields_no_articles() {
        let client = NewsApiClient::new(&NewsConfig {
            api_url: "http://127.0.0.1:9".into(),
            api_key: None,
        })
        .unwrap();
        assert!(client.carbon_headlines().await.unwrap().is_empty());
    }
}
