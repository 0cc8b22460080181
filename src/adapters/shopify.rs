use crate::domain::model::{Article, Blog, ShopInfo};
use crate::domain::ports::ShopifyApi;
use crate::utils::error::{FixerError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_url};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

pub const DEFAULT_API_VERSION: &str = "2024-01";
pub const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

#[derive(Deserialize)]
struct ShopEnvelope {
    shop: ShopInfo,
}

#[derive(Deserialize)]
struct BlogsEnvelope {
    blogs: Vec<Blog>,
}

#[derive(Deserialize)]
struct ArticlesEnvelope {
    articles: Vec<Article>,
}

#[derive(Serialize)]
struct ArticleUpdate<'a> {
    article: ArticleUpdateBody<'a>,
}

#[derive(Serialize)]
struct ArticleUpdateBody<'a> {
    id: u64,
    body_html: &'a str,
}

/// 接受 `demo`、`demo.myshopify.com`、`https://demo.myshopify.com/` 等寫法
pub fn normalize_store_url(input: &str) -> Result<Url> {
    let trimmed = input.trim().trim_end_matches('/');
    validate_non_empty_string("storeUrl", trimmed)?;

    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };
    validate_url("storeUrl", &with_scheme)?;

    let invalid = |reason: String| FixerError::InvalidConfigValueError {
        field: "storeUrl".to_string(),
        value: input.to_string(),
        reason,
    };

    let mut url = Url::parse(&with_scheme).map_err(|e| invalid(e.to_string()))?;
    let host = url
        .host_str()
        .ok_or_else(|| invalid("URL has no host".to_string()))?
        .to_string();

    // 只給了商店代號時補上 myshopify 網域
    if !host.contains('.') && host != "localhost" && url.port().is_none() {
        url.set_host(Some(&format!("{}.myshopify.com", host)))
            .map_err(|e| invalid(e.to_string()))?;
    }

    url.set_path("");
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

#[derive(Debug, Clone)]
pub struct ShopifyClient {
    client: Client,
    base_url: String,
    api_version: String,
    access_token: String,
}

impl ShopifyClient {
    pub fn new(
        store_url: &str,
        access_token: &str,
        api_version: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Self::with_client(client, store_url, access_token, api_version)
    }

    pub fn with_client(
        client: Client,
        store_url: &str,
        access_token: &str,
        api_version: &str,
    ) -> Result<Self> {
        validate_non_empty_string("accessToken", access_token)?;
        let base_url = normalize_store_url(store_url)?
            .as_str()
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            client,
            base_url,
            api_version: api_version.to_string(),
            access_token: access_token.trim().to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/admin/api/{}/{}", self.base_url, self.api_version, path)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = self.endpoint(path);
        tracing::debug!("📡 GET {}", url);

        let response = self
            .client
            .get(&url)
            .header(ACCESS_TOKEN_HEADER, &self.access_token)
            .query(query)
            .send()
            .await?;

        let response = check_response(response).await?;
        Ok(response.json().await?)
    }
}

/// 非 2xx 回應轉成 `ShopifyStatusError`，訊息優先取 Shopify 的 `errors` 欄位
async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|json| json.get("errors").cloned())
        .map(|errors| match errors {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        })
        .unwrap_or(body);

    Err(FixerError::ShopifyStatusError {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl ShopifyApi for ShopifyClient {
    async fn shop(&self) -> Result<ShopInfo> {
        let envelope: ShopEnvelope = self.get_json("shop.json", &[]).await?;
        Ok(envelope.shop)
    }

    async fn list_blogs(&self) -> Result<Vec<Blog>> {
        let envelope: BlogsEnvelope = self.get_json("blogs.json", &[]).await?;
        Ok(envelope.blogs)
    }

    async fn list_articles(&self, blog_id: u64, limit: usize) -> Result<Vec<Article>> {
        let envelope: ArticlesEnvelope = self
            .get_json(
                &format!("blogs/{}/articles.json", blog_id),
                &[("limit", limit.to_string())],
            )
            .await?;
        Ok(envelope.articles)
    }

    async fn update_article(&self, blog_id: u64, article_id: u64, content: &str) -> Result<()> {
        let url = self.endpoint(&format!("blogs/{}/articles/{}.json", blog_id, article_id));
        tracing::debug!("📡 PUT {}", url);

        let payload = ArticleUpdate {
            article: ArticleUpdateBody {
                id: article_id,
                body_html: content,
            },
        };

        let response = self
            .client
            .put(&url)
            .header(ACCESS_TOKEN_HEADER, &self.access_token)
            .json(&payload)
            .send()
            .await?;

        check_response(response).await?;
        Ok(())
    }
}
