use crate::core::analyzer::{ALT_ATTR, IMG_TAG};
use regex::{Captures, Regex};
use std::sync::LazyLock;

pub const WRAPPER_OPEN: &str = r#"<div class="article-content">"#;
pub const WRAPPER_CLOSE: &str = "</div>";
pub const FALLBACK_ALT: &str = "Blog image";

static HEAD_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<head(?:\s[^>]*)?>.*?</head\s*>").unwrap());
static TITLE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title(?:\s[^>]*)?>.*?</title\s*>").unwrap());
static DOCTYPE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<!doctype[^>]*>").unwrap());
static META_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<(?:meta|link)\b[^>]*>").unwrap());
// 未成對的 <head> 也一併移除
static WRAPPER_TAGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</?(?:html|head|body)(?:\s[^>]*)?/?>").unwrap());
static LOADING_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\sloading(?:\s*=|[\s/>])").unwrap());
static SRC_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\ssrc\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+))"#).unwrap()
});
static BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:[ \t]*\r?\n){3,}").unwrap());
static DIV_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<div\b[^>]*>|</div\s*>").unwrap());

/// 清除文章 HTML 中的整頁結構標籤並補上圖片屬性
///
/// 純文字處理，不驗證 HTML 樹。已經包在 `article-content` 容器中的內容不會再包一層，
/// 所以重複執行結果相同。
pub fn rewrite(html: &str) -> String {
    let content = HEAD_BLOCK.replace_all(html, "");
    let content = TITLE_BLOCK.replace_all(&content, "");
    let content = DOCTYPE.replace_all(&content, "");
    let content = META_LINK.replace_all(&content, "");
    let content = WRAPPER_TAGS.replace_all(&content, "");
    let content = IMG_TAG.replace_all(&content, |caps: &Captures| fix_image_tag(&caps[0]));
    let content = BLANK_LINES.replace_all(&content, "\n\n");
    let content = content.trim();

    if is_wrapped(content) {
        return content.to_string();
    }
    if content.is_empty() {
        return format!("{}{}", WRAPPER_OPEN, WRAPPER_CLOSE);
    }
    format!("{}\n{}\n{}", WRAPPER_OPEN, content, WRAPPER_CLOSE)
}

fn fix_image_tag(tag: &str) -> String {
    let needs_alt = !ALT_ATTR.is_match(tag);
    let needs_loading = !LOADING_ATTR.is_match(tag);
    if !needs_alt && !needs_loading {
        return tag.to_string();
    }

    // IMG_TAG 保證開頭是 ASCII 的 "<img"
    let (open, rest) = tag.split_at(4);
    let mut fixed = String::with_capacity(tag.len() + 48);
    fixed.push_str(open);
    if needs_alt {
        fixed.push_str(&format!(r#" alt="{}""#, derive_alt(tag)));
    }
    if needs_loading {
        fixed.push_str(r#" loading="lazy""#);
    }
    fixed.push_str(rest);
    fixed
}

/// 由 src 檔名推導 alt 文字，例如 `red-running_shoes.jpg?v=1` → `Red running shoes`
pub fn derive_alt(tag: &str) -> String {
    let src = SRC_ATTR.captures(tag).and_then(|caps| {
        caps.get(1)
            .or_else(|| caps.get(2))
            .or_else(|| caps.get(3))
            .map(|m| m.as_str())
    });

    let Some(src) = src.filter(|s| !s.trim_start().to_ascii_lowercase().starts_with("data:")) else {
        return FALLBACK_ALT.to_string();
    };

    let path = src.split(['?', '#']).next().unwrap_or("");
    let file = path.rsplit('/').next().unwrap_or("");
    let stem = match file.rsplit_once('.') {
        Some((stem, _ext)) if !stem.is_empty() => stem,
        _ => file,
    };

    let words: Vec<String> = stem
        .replace(['-', '_'], " ")
        .split_whitespace()
        .map(|word| word.chars().filter(|c| c.is_alphanumeric()).collect::<String>())
        .filter(|word| !word.is_empty())
        .collect();

    if words.is_empty() {
        return FALLBACK_ALT.to_string();
    }

    let alt = words.join(" ");
    let mut chars = alt.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => FALLBACK_ALT.to_string(),
    }
}

fn is_wrapped(content: &str) -> bool {
    if !content.starts_with(WRAPPER_OPEN) || !content.ends_with(WRAPPER_CLOSE) {
        return false;
    }

    let mut depth = 0usize;
    for tag in DIV_TAG.find_iter(content) {
        if tag.as_str().starts_with("</") {
            depth = depth.saturating_sub(1);
            if depth == 0 {
                return tag.end() == content.len();
            }
        } else {
            depth += 1;
        }
    }
    false
}
