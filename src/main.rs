use clap::Parser;
use shopify_seo_fixer::utils::logger;
use shopify_seo_fixer::{CliConfig, SeoServer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 日誌格式取自配置，所以先載入配置
    let config = match cli.load_app_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Configuration validation failed: {}", e);
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };
    logger::init_logger(config.log_format(), cli.verbose);

    tracing::info!("Starting shopify-seo-fixer server");
    for line in cli.describe_sources() {
        tracing::info!("{}", line);
    }
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    tracing::info!(
        "🔧 Shopify API {} | write interval {:?} | default limit {}",
        config.api_version(),
        config.write_interval(),
        config.default_limit()
    );

    let server = SeoServer::bind(config)?;
    let shutdown = server.shutdown_handle();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("🛑 Ctrl-C received, shutting down");
            shutdown.shutdown();
        }
    });

    server.serve().await?;
    Ok(())
}
