use crate::domain::model::{Article, Blog, ProgressEvent, ShopInfo};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Shopify Admin REST API 的最小介面
#[async_trait]
pub trait ShopifyApi: Send + Sync {
    async fn shop(&self) -> Result<ShopInfo>;
    async fn list_blogs(&self) -> Result<Vec<Blog>>;
    async fn list_articles(&self, blog_id: u64, limit: usize) -> Result<Vec<Article>>;
    /// 只有 2xx 回應才回傳 Ok
    async fn update_article(&self, blog_id: u64, article_id: u64, content: &str) -> Result<()>;
}

/// Receives progress events from a run. Implementations decide the transport.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: ProgressEvent);
}

/// 寫入前的節流
#[async_trait]
pub trait RateLimiter: Send + Sync {
    async fn acquire(&self);
}
