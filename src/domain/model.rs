use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Blog {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub handle: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Article {
    pub id: u64,
    #[serde(default)]
    pub blog_id: Option<u64>,
    pub title: String,
    /// Shopify 以 `body_html` 傳回文章內容，可能為 null
    #[serde(rename = "body_html", default)]
    pub content: Option<String>,
}

impl Article {
    pub fn content(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShopInfo {
    pub name: String,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub myshopify_domain: Option<String>,
    #[serde(default)]
    pub plan_name: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Mode {
    #[serde(rename = "fix")]
    Fix,
    #[serde(rename = "dry-run")]
    DryRun,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Fix => "fix",
            Mode::DryRun => "dry-run",
        }
    }
}

impl std::str::FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "fix" => Ok(Mode::Fix),
            "dry-run" => Ok(Mode::DryRun),
            other => Err(format!("unknown mode '{}', expected 'fix' or 'dry-run'", other)),
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IssueReport {
    pub multiple_body_tags: bool,
    pub multiple_head_tags: bool,
    pub multiple_title_tags: bool,
    pub images_missing_alt: Vec<String>,
}

impl IssueReport {
    pub fn has_issues(&self) -> bool {
        self.multiple_body_tags
            || self.multiple_head_tags
            || self.multiple_title_tags
            || !self.images_missing_alt.is_empty()
    }

    pub fn descriptions(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if self.multiple_body_tags {
            issues.push("multiple <body> tags".to_string());
        }
        if self.multiple_head_tags {
            issues.push("multiple <head> tags".to_string());
        }
        if self.multiple_title_tags {
            issues.push("multiple <title> tags".to_string());
        }
        match self.images_missing_alt.len() {
            0 => {}
            1 => issues.push("1 image missing alt text".to_string()),
            n => issues.push(format!("{} images missing alt text", n)),
        }
        issues
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// 串流給前端的單一事件；序列化為 `{log, type}` 或 `{results}`
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum ProgressEvent {
    Log {
        log: String,
        #[serde(rename = "type")]
        level: LogLevel,
    },
    Results {
        results: RunSummary,
    },
}

impl ProgressEvent {
    pub fn log(level: LogLevel, message: impl Into<String>) -> Self {
        ProgressEvent::Log {
            log: message.into(),
            level,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::log(LogLevel::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::log(LogLevel::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::log(LogLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::log(LogLevel::Error, message)
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ArticleStatus {
    Clean,
    WouldFix,
    Fixed,
    Failed,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ArticleResult {
    pub blog_id: u64,
    pub blog_title: String,
    pub article_id: u64,
    pub title: String,
    pub issues: Vec<String>,
    pub status: ArticleStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub mode: Mode,
    pub total_processed: usize,
    pub issues_found: usize,
    pub fixed: usize,
    pub failed: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub articles: Vec<ArticleResult>,
}

impl RunSummary {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            total_processed: 0,
            issues_found: 0,
            fixed: 0,
            failed: 0,
            started_at: Utc::now(),
            finished_at: None,
            articles: Vec::new(),
        }
    }
}

/// `POST /api/process` 的請求內容
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRequest {
    pub store_url: String,
    pub access_token: String,
    pub mode: Mode,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionRequest {
    pub store_url: String,
    pub access_token: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ConnectionResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shop: Option<ShopInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_request_from_json() {
        let request: ProcessRequest = serde_json::from_str(
            r#"{"storeUrl": "demo.myshopify.com", "accessToken": "shpat_x", "mode": "fix", "limit": 10}"#,
        )
        .unwrap();
        assert_eq!(request.mode, Mode::Fix);
        assert_eq!(request.limit, Some(10));

        let request: ProcessRequest = serde_json::from_str(
            r#"{"storeUrl": "demo", "accessToken": "shpat_x", "mode": "dry-run"}"#,
        )
        .unwrap();
        assert_eq!(request.limit, None);
    }

    #[test]
    fn test_log_event_wire_shape() {
        let event = ProgressEvent::warning("Issues found");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json, serde_json::json!({"log": "Issues found", "type": "warning"}));
    }

    #[test]
    fn test_results_event_wire_shape() {
        let mut summary = RunSummary::new(Mode::DryRun);
        summary.total_processed = 2;
        summary.issues_found = 1;
        summary.fixed = 1;

        let json = serde_json::to_value(ProgressEvent::Results { results: summary }).unwrap();
        let results = &json["results"];
        assert_eq!(results["mode"], "dry-run");
        assert_eq!(results["totalProcessed"], 2);
        assert_eq!(results["issuesFound"], 1);
        assert_eq!(results["fixed"], 1);
        assert!(results["articles"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_article_null_body_html() {
        let json = serde_json::json!({"id": 7, "title": "Empty", "body_html": null});
        let article: Article = serde_json::from_value(json).unwrap();
        assert_eq!(article.content(), "");
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("fix".parse::<Mode>().unwrap(), Mode::Fix);
        assert_eq!("dry-run".parse::<Mode>().unwrap(), Mode::DryRun);
        assert!("apply".parse::<Mode>().is_err());
        let mode: Mode = serde_json::from_str("\"dry-run\"").unwrap();
        assert_eq!(mode, Mode::DryRun);
    }

    #[test]
    fn test_issue_descriptions() {
        let report = IssueReport {
            multiple_body_tags: true,
            images_missing_alt: vec!["<img src=\"a.png\">".into(), "<img src=\"b.png\">".into()],
            ..Default::default()
        };
        assert!(report.has_issues());
        assert_eq!(
            report.descriptions(),
            vec!["multiple <body> tags", "2 images missing alt text"]
        );
        assert!(!IssueReport::default().has_issues());
    }
}
