use crate::domain::model::IssueReport;
use regex::Regex;
use std::sync::LazyLock;

// `(?:\s[^>]*)?` 讓 `<head>` 不會誤判 `<header>`
static BODY_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<body(?:\s[^>]*)?/?>").unwrap());
static HEAD_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<head(?:\s[^>]*)?/?>").unwrap());
static TITLE_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<title(?:\s[^>]*)?/?>").unwrap());
pub(crate) static IMG_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<img\b[^>]*>").unwrap());
// 沒有值的 `alt` 與 `alt=""` 一樣視為已有
pub(crate) static ALT_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\salt(?:\s*=|[\s/>])").unwrap());

/// 掃描文章 HTML 的結構性 SEO 問題
pub fn analyze(html: &str) -> IssueReport {
    IssueReport {
        multiple_body_tags: BODY_OPEN.find_iter(html).count() > 1,
        multiple_head_tags: HEAD_OPEN.find_iter(html).count() > 1,
        multiple_title_tags: TITLE_OPEN.find_iter(html).count() > 1,
        images_missing_alt: IMG_TAG
            .find_iter(html)
            .map(|m| m.as_str())
            .filter(|tag| !ALT_ATTR.is_match(tag))
            .map(str::to_string)
            .collect(),
    }
}
