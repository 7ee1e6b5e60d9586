//! Web text extraction.
//!
//! All HTML/boilerplate handling lives behind the `TextExtractor` trait; the
//! indexing pipeline only sees clean text plus a title and word count.

use std::time::Duration;

use async_trait::async_trait;

use crate::core::errors::RagError;

#[derive(Debug, Clone)]
pub struct ExtractedPage {
    pub title: String,
    pub text: String,
    pub word_count: usize,
}

#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn scrape(&self, url: &str) -> Result<ExtractedPage, RagError>;
}

pub struct HttpTextExtractor {
    client: reqwest::Client,
}

impl HttpTextExtractor {
    pub fn new(timeout_secs: u64) -> Result<Self, RagError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(RagError::extraction)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl TextExtractor for HttpTextExtractor {
    async fn scrape(&self, url: &str) -> Result<ExtractedPage, RagError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(RagError::extraction)?;

        if !response.status().is_success() {
            return Err(RagError::Extraction(format!(
                "fetch failed for {url}: {}",
                response.status()
            )));
        }

        let body = response.text().await.map_err(RagError::extraction)?;
        let title = extract_title(&body).unwrap_or_else(|| url.to_string());
        let text = strip_html(&body);
        let word_count = text.split_whitespace().count();

        Ok(ExtractedPage {
            title,
            text,
            word_count,
        })
    }
}

/// Reduces an HTML document to its visible text: script/style blocks are
/// dropped wholesale, remaining tags removed, whitespace collapsed per line.
pub fn strip_html(html: &str) -> String {
    let without_scripts = remove_enclosed(html, "<script", "</script>");
    let without_styles = remove_enclosed(&without_scripts, "<style", "</style>");

    let mut text = String::with_capacity(without_styles.len() / 2);
    let mut in_tag = false;
    for c in without_styles.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }

    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    lines.join("\n")
}

pub fn extract_title(html: &str) -> Option<String> {
    let open = find_ignore_case(html, "<title")?;
    let after_open = &html[open..];
    let content_start = open + after_open.find('>')? + 1;
    let content = &html[content_start..];
    let content_end = find_ignore_case(content, "</title>")?;
    let title = content[..content_end].trim();
    if title.is_empty() {
        None
    } else {
        Some(title.to_string())
    }
}

fn remove_enclosed(html: &str, open: &str, close: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    loop {
        let Some(start) = find_ignore_case(rest, open) else {
            out.push_str(rest);
            break;
        };
        out.push_str(&rest[..start]);
        match find_ignore_case(&rest[start..], close) {
            Some(end) => rest = &rest[start + end + close.len()..],
            // unterminated block: drop the remainder
            None => break,
        }
    }
    out
}

fn find_ignore_case(haystack: &str, needle: &str) -> Option<usize> {
    let haystack = haystack.as_bytes();
    let needle = needle.as_bytes();
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    (0..=haystack.len() - needle.len())
        .find(|&i| haystack[i..i + needle.len()].eq_ignore_ascii_case(needle))
}
