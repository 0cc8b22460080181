use crate::core::{analyzer::analyze, rewriter::rewrite};
use crate::domain::model::{
    Article, ArticleResult, ArticleStatus, Blog, Mode, ProgressEvent, RunSummary,
};
use crate::domain::ports::{ProgressSink, RateLimiter, ShopifyApi};
use crate::utils::error::Result;
use chrono::Utc;

/// Shopify 單次列出文章的上限
pub const MAX_ARTICLES_PER_REQUEST: usize = 250;

#[derive(Debug, Clone)]
pub struct RunOptions {
    /// 只用於日誌顯示
    pub store: String,
    pub mode: Mode,
    /// 整次執行最多處理的文章數（跨所有 blog）
    pub limit: usize,
}

pub struct ArticleProcessor<A: ShopifyApi, R: RateLimiter> {
    api: A,
    limiter: R,
}

impl<A: ShopifyApi, R: RateLimiter> ArticleProcessor<A, R> {
    pub fn new(api: A, limiter: R) -> Self {
        Self { api, limiter }
    }

    /// 執行一次掃描；任何未處理的錯誤都轉成單一 error 事件後結束
    pub async fn stream(
        &self,
        options: &RunOptions,
        sink: &dyn ProgressSink,
    ) -> Option<RunSummary> {
        match self.run(options, sink).await {
            Ok(summary) => Some(summary),
            Err(e) => {
                tracing::error!("❌ Run for {} aborted: {}", options.store, e);
                tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
                sink.emit(ProgressEvent::error(format!("Error: {}", e)));
                None
            }
        }
    }

    pub async fn run(&self, options: &RunOptions, sink: &dyn ProgressSink) -> Result<RunSummary> {
        let mut summary = RunSummary::new(options.mode);

        tracing::info!(
            "🚀 Starting {} run for {} (limit {})",
            options.mode,
            options.store,
            options.limit
        );
        sink.emit(ProgressEvent::info(format!(
            "Starting {} run for {} (limit {})",
            options.mode, options.store, options.limit
        )));

        let blogs = self.api.list_blogs().await?;
        tracing::info!("📚 Found {} blogs", blogs.len());
        sink.emit(ProgressEvent::info(format!("Found {} blog(s)", blogs.len())));

        for blog in &blogs {
            let remaining = options.limit.saturating_sub(summary.total_processed);
            if remaining == 0 {
                tracing::debug!("Limit of {} articles reached", options.limit);
                break;
            }

            sink.emit(ProgressEvent::info(format!("Processing blog '{}'", blog.title)));

            let articles = match self
                .api
                .list_articles(blog.id, remaining.min(MAX_ARTICLES_PER_REQUEST))
                .await
            {
                Ok(articles) => articles,
                Err(e) => {
                    tracing::warn!("⚠️ Skipping blog {} ({}): {}", blog.id, blog.title, e);
                    sink.emit(ProgressEvent::error(format!(
                        "Failed to fetch articles for blog '{}': {}",
                        blog.title, e
                    )));
                    continue;
                }
            };

            tracing::debug!("📄 Blog {} returned {} articles", blog.id, articles.len());
            sink.emit(ProgressEvent::info(format!(
                "Found {} article(s) in '{}'",
                articles.len(),
                blog.title
            )));

            for article in articles.iter().take(remaining) {
                summary.total_processed += 1;
                let result = self
                    .process_article(blog, article, options.mode, &mut summary, sink)
                    .await;
                summary.articles.push(result);
            }
        }

        summary.finished_at = Some(Utc::now());

        let fixed_label = match options.mode {
            Mode::Fix => "fixed",
            Mode::DryRun => "would be fixed",
        };
        tracing::info!(
            "✅ Run finished: processed={}, issues={}, fixed={}, failed={}",
            summary.total_processed,
            summary.issues_found,
            summary.fixed,
            summary.failed
        );
        sink.emit(ProgressEvent::success(format!(
            "Done: {} article(s) processed, {} with issues, {} {}",
            summary.total_processed, summary.issues_found, summary.fixed, fixed_label
        )));
        sink.emit(ProgressEvent::Results {
            results: summary.clone(),
        });

        Ok(summary)
    }

    async fn process_article(
        &self,
        blog: &Blog,
        article: &Article,
        mode: Mode,
        summary: &mut RunSummary,
        sink: &dyn ProgressSink,
    ) -> ArticleResult {
        let report = analyze(article.content());
        let mut result = ArticleResult {
            blog_id: blog.id,
            blog_title: blog.title.clone(),
            article_id: article.id,
            title: article.title.clone(),
            issues: report.descriptions(),
            status: ArticleStatus::Clean,
            error: None,
        };

        if !report.has_issues() {
            sink.emit(ProgressEvent::success(format!("'{}': no issues", article.title)));
            return result;
        }

        summary.issues_found += 1;
        tracing::debug!("Article {} issues: {:?}", article.id, result.issues);
        sink.emit(ProgressEvent::warning(format!(
            "'{}': {}",
            article.title,
            result.issues.join(", ")
        )));

        match mode {
            Mode::DryRun => {
                summary.fixed += 1;
                result.status = ArticleStatus::WouldFix;
                sink.emit(ProgressEvent::info(format!(
                    "[dry-run] Would fix '{}'",
                    article.title
                )));
            }
            Mode::Fix => {
                let content = rewrite(article.content());
                self.limiter.acquire().await;

                match self.api.update_article(blog.id, article.id, &content).await {
                    Ok(()) => {
                        summary.fixed += 1;
                        result.status = ArticleStatus::Fixed;
                        tracing::info!("🔧 Updated article {} in blog {}", article.id, blog.id);
                        sink.emit(ProgressEvent::success(format!("Fixed '{}'", article.title)));
                    }
                    Err(e) => {
                        summary.failed += 1;
                        result.status = ArticleStatus::Failed;
                        result.error = Some(e.to_string());
                        tracing::warn!("⚠️ Update failed for article {}: {}", article.id, e);
                        sink.emit(ProgressEvent::error(format!(
                            "Failed to update '{}': {}",
                            article.title, e
                        )));
                    }
                }
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::stream::MemorySink;
    use crate::core::rate_limit::IntervalLimiter;
    use crate::domain::model::{LogLevel, ShopInfo};
    use crate::utils::error::FixerError;
    use async_trait::async_trait;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeShopify {
        blogs: Vec<Blog>,
        articles: HashMap<u64, Vec<Article>>,
        failing_blogs: HashSet<u64>,
        failing_updates: HashSet<u64>,
        fail_blog_listing: bool,
        list_limits: Mutex<Vec<usize>>,
        updates: Mutex<Vec<(u64, u64, String)>>,
    }

    impl FakeShopify {
        fn with_blog(mut self, id: u64, title: &str, articles: Vec<Article>) -> Self {
            self.blogs.push(Blog {
                id,
                title: title.to_string(),
                handle: None,
            });
            self.articles.insert(id, articles);
            self
        }
    }

    #[async_trait]
    impl ShopifyApi for FakeShopify {
        async fn shop(&self) -> Result<ShopInfo> {
            unreachable!("processor never calls shop()")
        }

        async fn list_blogs(&self) -> Result<Vec<Blog>> {
            if self.fail_blog_listing {
                return Err(FixerError::ShopifyStatusError {
                    status: 401,
                    message: "Invalid API key or access token".to_string(),
                });
            }
            Ok(self.blogs.clone())
        }

        async fn list_articles(&self, blog_id: u64, limit: usize) -> Result<Vec<Article>> {
            self.list_limits.lock().unwrap().push(limit);
            if self.failing_blogs.contains(&blog_id) {
                return Err(FixerError::ShopifyStatusError {
                    status: 500,
                    message: "boom".to_string(),
                });
            }
            let mut articles = self.articles.get(&blog_id).cloned().unwrap_or_default();
            articles.truncate(limit);
            Ok(articles)
        }

        async fn update_article(&self, blog_id: u64, article_id: u64, content: &str) -> Result<()> {
            if self.failing_updates.contains(&article_id) {
                return Err(FixerError::ShopifyStatusError {
                    status: 422,
                    message: "Unprocessable".to_string(),
                });
            }
            self.updates
                .lock()
                .unwrap()
                .push((blog_id, article_id, content.to_string()));
            Ok(())
        }
    }

    fn article(id: u64, title: &str, html: &str) -> Article {
        Article {
            id,
            blog_id: None,
            title: title.to_string(),
            content: Some(html.to_string()),
        }
    }

    fn options(mode: Mode, limit: usize) -> RunOptions {
        RunOptions {
            store: "demo.myshopify.com".to_string(),
            mode,
            limit,
        }
    }

    fn sample_store() -> FakeShopify {
        FakeShopify::default().with_blog(
            1,
            "News",
            vec![
                article(
                    11,
                    "Broken",
                    r#"<body><p>a</p></body><body><img src="/x/cat.png"></body>"#,
                ),
                article(12, "Clean", "<p>Fine</p>"),
            ],
        )
    }

    #[tokio::test]
    async fn test_dry_run_counts_without_updates() {
        let processor = ArticleProcessor::new(sample_store(), IntervalLimiter::unlimited());
        let sink = MemorySink::new();

        let summary = processor.run(&options(Mode::DryRun, 50), &sink).await.unwrap();

        assert_eq!(summary.total_processed, 2);
        assert_eq!(summary.issues_found, 1);
        assert_eq!(summary.fixed, 1);
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.articles[0].status, ArticleStatus::WouldFix);
        assert_eq!(summary.articles[1].status, ArticleStatus::Clean);
        assert!(processor.api.updates.lock().unwrap().is_empty());

        let events = sink.events();
        assert!(matches!(events.last(), Some(ProgressEvent::Results { .. })));
    }

    #[tokio::test]
    async fn test_fix_mode_updates_flagged_article_once() {
        let processor = ArticleProcessor::new(sample_store(), IntervalLimiter::unlimited());
        let sink = MemorySink::new();

        let summary = processor.run(&options(Mode::Fix, 50), &sink).await.unwrap();

        assert_eq!(summary.fixed, 1);
        let updates = processor.api.updates.lock().unwrap();
        assert_eq!(updates.len(), 1);
        let (blog_id, article_id, content) = &updates[0];
        assert_eq!((*blog_id, *article_id), (1, 11));
        assert!(!content.contains("<body"));
        assert!(content.contains(r#"alt="Cat""#));
    }

    #[tokio::test]
    async fn test_failed_update_is_logged_and_run_continues() {
        let mut store = sample_store().with_blog(
            2,
            "Guides",
            vec![article(21, "Also broken", "<head></head><head></head>")],
        );
        store.failing_updates.insert(11);
        let processor = ArticleProcessor::new(store, IntervalLimiter::unlimited());
        let sink = MemorySink::new();

        let summary = processor.run(&options(Mode::Fix, 50), &sink).await.unwrap();

        assert_eq!(summary.total_processed, 3);
        assert_eq!(summary.issues_found, 2);
        assert_eq!(summary.fixed, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.articles[0].status, ArticleStatus::Failed);
        assert!(summary.articles[0].error.as_deref().unwrap().contains("422"));
        assert!(sink.logs(LogLevel::Error)[0].contains("Failed to update 'Broken'"));
    }

    #[tokio::test]
    async fn test_blog_fetch_failure_skips_blog() {
        let mut store = FakeShopify::default()
            .with_blog(1, "Broken blog", vec![article(11, "Never seen", "<p>x</p>")])
            .with_blog(2, "Working blog", vec![article(21, "Seen", "<p>y</p>")]);
        store.failing_blogs.insert(1);
        let processor = ArticleProcessor::new(store, IntervalLimiter::unlimited());
        let sink = MemorySink::new();

        let summary = processor.run(&options(Mode::DryRun, 50), &sink).await.unwrap();

        assert_eq!(summary.total_processed, 1);
        assert_eq!(summary.articles[0].title, "Seen");
        let errors = sink.logs(LogLevel::Error);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Broken blog"));
    }

    #[tokio::test]
    async fn test_limit_spans_blogs() {
        let store = FakeShopify::default()
            .with_blog(
                1,
                "A",
                vec![article(11, "a1", "<p/>"), article(12, "a2", "<p/>")],
            )
            .with_blog(
                2,
                "B",
                vec![article(21, "b1", "<p/>"), article(22, "b2", "<p/>")],
            )
            .with_blog(3, "C", vec![article(31, "c1", "<p/>")]);
        let processor = ArticleProcessor::new(store, IntervalLimiter::unlimited());
        let sink = MemorySink::new();

        let summary = processor.run(&options(Mode::DryRun, 3), &sink).await.unwrap();

        assert_eq!(summary.total_processed, 3);
        assert_eq!(*processor.api.list_limits.lock().unwrap(), vec![3, 1]);
    }

    #[tokio::test]
    async fn test_article_fetch_is_capped() {
        let processor = ArticleProcessor::new(sample_store(), IntervalLimiter::unlimited());
        let sink = MemorySink::new();

        processor.run(&options(Mode::DryRun, 1000), &sink).await.unwrap();

        assert_eq!(
            *processor.api.list_limits.lock().unwrap(),
            vec![MAX_ARTICLES_PER_REQUEST]
        );
    }

    #[tokio::test]
    async fn test_stream_turns_failure_into_single_error_event() {
        let store = FakeShopify {
            fail_blog_listing: true,
            ..Default::default()
        };
        let processor = ArticleProcessor::new(store, IntervalLimiter::unlimited());
        let sink = MemorySink::new();

        let summary = processor.stream(&options(Mode::Fix, 10), &sink).await;

        assert!(summary.is_none());
        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0],
            ProgressEvent::info("Starting fix run for demo.myshopify.com (limit 10)")
        );
        match &events[1] {
            ProgressEvent::Log { log, level } => {
                assert_eq!(*level, LogLevel::Error);
                assert!(log.contains("401"));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
