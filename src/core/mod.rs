pub mod analyzer;
pub mod connection;
pub mod processor;
pub mod rate_limit;
pub mod rewriter;

pub use crate::domain::model::{Article, Blog, IssueReport, Mode, ProgressEvent, RunSummary};
pub use crate::domain::ports::{ProgressSink, RateLimiter, ShopifyApi};
pub use crate::utils::error::Result;
