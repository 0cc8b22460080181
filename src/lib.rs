pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::adapters::{server::SeoServer, shopify::ShopifyClient};
pub use crate::config::AppConfig;
pub use crate::core::{
    analyzer::analyze,
    processor::{ArticleProcessor, RunOptions},
    rate_limit::IntervalLimiter,
    rewriter::rewrite,
};
pub use crate::utils::error::{FixerError, Result};
