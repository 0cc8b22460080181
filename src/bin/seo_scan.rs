use anyhow::Context;
use clap::Parser;
use shopify_seo_fixer::adapters::stream::ConsoleSink;
use shopify_seo_fixer::core::connection::test_connection;
use shopify_seo_fixer::domain::model::Mode;
use shopify_seo_fixer::utils::{logger, validation::Validate};
use shopify_seo_fixer::{AppConfig, ArticleProcessor, IntervalLimiter, RunOptions, ShopifyClient};

#[derive(Parser, Debug)]
#[command(name = "seo-scan")]
#[command(about = "Scan (and optionally fix) Shopify blog articles from the terminal")]
struct Args {
    /// Store URL or handle, e.g. demo.myshopify.com
    #[arg(long)]
    store_url: String,

    /// Admin API access token
    #[arg(long, env = "SHOPIFY_ACCESS_TOKEN", hide_env_values = true)]
    access_token: String,

    /// `dry-run` or `fix`
    #[arg(long, default_value = "dry-run")]
    mode: Mode,

    /// Maximum number of articles to process
    #[arg(long)]
    limit: Option<usize>,

    /// Path to TOML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Only check the store URL and token
    #[arg(long)]
    test_connection: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = AppConfig::load(args.config.as_deref())?;
    config.validate()?;
    logger::init_logger(config.log_format(), args.verbose);
    if let Some(path) = &args.config {
        tracing::info!("📁 Loaded configuration from: {}", path);
    }

    let client = ShopifyClient::new(
        &args.store_url,
        &args.access_token,
        config.api_version(),
        config.request_timeout(),
    )?;

    if args.test_connection {
        let shop = test_connection(&client)
            .await
            .with_context(|| format!("connection test against {} failed", client.base_url()))?;
        println!("✅ Connected to {}", shop.name);
        println!("{}", serde_json::to_string_pretty(&shop)?);
        return Ok(());
    }

    let options = RunOptions {
        store: client.base_url().to_string(),
        mode: args.mode,
        limit: config.resolve_limit(args.limit)?,
    };
    let processor = ArticleProcessor::new(client, IntervalLimiter::new(config.write_interval()));

    match processor.stream(&options, &ConsoleSink).await {
        Some(summary) => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(())
        }
        None => std::process::exit(1),
    }
}
