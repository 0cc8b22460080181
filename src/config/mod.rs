pub mod toml_config;

pub use toml_config::AppConfig;

#[cfg(feature = "cli")]
use crate::utils::{error::Result, validation::Validate};
#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "seo-fixer")]
#[command(about = "Streams SEO fixes for Shopify blog articles over HTTP")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Override server.bind
    #[arg(long)]
    pub bind: Option<String>,

    /// Override processing.write_interval_ms
    #[arg(long)]
    pub write_interval_ms: Option<u64>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 載入檔案配置並套用命令列覆蓋設定
    ///
    /// 此時 logger 尚未安裝，要記錄的內容見 [`CliConfig::describe_sources`]
    pub fn load_app_config(&self) -> Result<AppConfig> {
        let mut config = AppConfig::load(self.config.as_deref())?;

        if let Some(bind) = &self.bind {
            config.server.bind = Some(bind.clone());
        }
        if let Some(interval) = self.write_interval_ms {
            config.processing.write_interval_ms = Some(interval);
        }

        config.validate()?;
        Ok(config)
    }

    /// 配置來源與命令列覆蓋項目，logger 初始化後逐行輸出
    pub fn describe_sources(&self) -> Vec<String> {
        let mut lines = vec![match &self.config {
            Some(path) => format!("📁 Loaded configuration from: {}", path),
            None => "📁 No configuration file given, using defaults".to_string(),
        }];
        if let Some(bind) = &self.bind {
            lines.push(format!("🔧 Bind address overridden to: {}", bind));
        }
        if let Some(interval) = self.write_interval_ms {
            lines.push(format!("🔧 Write interval overridden to: {}ms", interval));
        }
        lines
    }
}
