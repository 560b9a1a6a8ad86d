//! Web tools (§4.5): WebSearch (delegated to a provider, with allow/block
//! domain filtering) and WebReader (HTML → markdown, 15-minute memoized).

use crate::guard::WorkspaceGuard;
use crate::registry::{ExecutionContext, Tool};
use async_trait::async_trait;
use lru::LruCache;
use scraper::Html;
use serde_json::{json, Value};
use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

const CACHE_BUCKET_SECS: u64 = 900;
const CACHE_CAPACITY: usize = 128;
const FETCH_TIMEOUT_SECS: u64 = 30;

/// One search hit as returned by the provider.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// The external search provider WebSearch delegates to (§1: out of scope to
/// implement a search engine — this is the seam a real backend plugs into).
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, String>;
}

/// A provider that performs no network call; used when no search backend is
/// configured so the tool still degrades gracefully instead of panicking.
pub struct NullSearchProvider;

#[async_trait]
impl SearchProvider for NullSearchProvider {
    async fn search(&self, _query: &str) -> Result<Vec<SearchResult>, String> {
        Err("no search provider configured".to_string())
    }
}

pub struct WebSearchTool {
    provider: std::sync::Arc<dyn SearchProvider>,
}

impl WebSearchTool {
    pub fn new(provider: std::sync::Arc<dyn SearchProvider>) -> Self {
        Self { provider }
    }
}

impl Default for WebSearchTool {
    fn default() -> Self {
        Self::new(std::sync::Arc::new(NullSearchProvider))
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "WebSearch"
    }

    fn description(&self) -> &str {
        "Search the web and return up to 10 title/url/snippet results, optionally restricted to \
         or excluding domains."
    }

    fn is_read_only(&self) -> bool {
        true
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {"type": "string"},
                "allowed_domains": {"type": "array", "items": {"type": "string"}},
                "blocked_domains": {"type": "array", "items": {"type": "string"}}
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: Value, _ctx: &ExecutionContext) -> String {
        let Some(query) = args["query"].as_str() else {
            return "Error: missing required parameter 'query'".to_string();
        };

        let allowed: Vec<String> = args["allowed_domains"]
            .as_array()
            .map(|a| a.iter().filter_map(|v| v.as_str().map(String::from)).collect())
            .unwrap_or_default();
        let blocked: Vec<String> = args["blocked_domains"]
            .as_array()
            .map(|a| a.iter().filter_map(|v| v.as_str().map(String::from)).collect())
            .unwrap_or_default();

        let results = match self.provider.search(query).await {
            Ok(r) => r,
            Err(e) => return format!("Error: {e}"),
        };

        let filtered: Vec<&SearchResult> = results
            .iter()
            .filter(|r| allowed.is_empty() || allowed.iter().any(|d| r.url.contains(d)))
            .filter(|r| !blocked.iter().any(|d| r.url.contains(d)))
            .take(10)
            .collect();

        if filtered.is_empty() {
            return "No results found".to_string();
        }

        let rendered = filtered
            .iter()
            .map(|r| format!("## [{}]({})\n\n{}", r.title, r.url, r.snippet))
            .collect::<Vec<_>>()
            .join("\n\n");

        WorkspaceGuard::truncate_output(&rendered)
    }
}

/// Process-global cache entry: markdown body keyed by `(url, quarter_hour_bucket)`.
struct CacheEntry {
    markdown: String,
}

pub struct WebReaderTool {
    client: reqwest::Client,
    cache: Mutex<LruCache<(String, u64), CacheEntry>>,
}

impl WebReaderTool {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            cache: Mutex::new(LruCache::new(NonZeroUsize::new(CACHE_CAPACITY).unwrap())),
        }
    }
}

impl Default for WebReaderTool {
    fn default() -> Self {
        Self::new()
    }
}

fn cache_bucket() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
        / CACHE_BUCKET_SECS
}

#[async_trait]
impl Tool for WebReaderTool {
    fn name(&self) -> &str {
        "WebReader"
    }

    fn description(&self) -> &str {
        "Fetch a URL and return its content converted to markdown. Results are memoized for up \
         to 15 minutes."
    }

    fn is_read_only(&self) -> bool {
        true
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "url": {"type": "string"},
                "prompt": {"type": "string", "description": "What to look for (informational only)"}
            },
            "required": ["url", "prompt"]
        })
    }

    async fn execute(&self, args: Value, _ctx: &ExecutionContext) -> String {
        let Some(raw_url) = args["url"].as_str() else {
            return "Error: missing required parameter 'url'".to_string();
        };

        let url = upgrade_to_https(raw_url);
        let bucket = cache_bucket();

        if let Some(entry) = self.cache.lock().unwrap().get(&(url.clone(), bucket)) {
            return WorkspaceGuard::truncate_output(&entry.markdown);
        }

        let markdown = match fetch_markdown(&self.client, &url).await {
            Ok(m) => m,
            Err(e) => return format!("Error: {e}"),
        };

        self.cache
            .lock()
            .unwrap()
            .put((url, bucket), CacheEntry { markdown: markdown.clone() });

        WorkspaceGuard::truncate_output(&markdown)
    }
}

fn upgrade_to_https(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(mut parsed) if parsed.scheme() == "http" => {
            let _ = parsed.set_scheme("https");
            parsed.to_string()
        }
        _ => raw.to_string(),
    }
}

async fn fetch_markdown(client: &reqwest::Client, url: &str) -> Result<String, String> {
    let response = client
        .get(url)
        .timeout(std::time::Duration::from_secs(FETCH_TIMEOUT_SECS))
        .send()
        .await
        .map_err(|e| e.to_string())?;

    if !response.status().is_success() {
        return Err(format!("HTTP {}", response.status()));
    }

    let body = response.text().await.map_err(|e| e.to_string())?;
    Ok(html_to_markdown(&body))
}

/// Convert an HTML document to a readable markdown approximation: headings,
/// links, and list items are preserved; everything else collapses to plain
/// paragraphs. Falls back to tag-stripped text if the document has no
/// recognizable structure.
fn html_to_markdown(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut out = Vec::new();
    walk(document.root_element(), &mut out);
    let joined = out.join("\n\n");
    if joined.trim().is_empty() {
        strip_tags(html)
    } else {
        joined
    }
}

fn walk(element: scraper::ElementRef, out: &mut Vec<String>) {
    let tag = element.value().name();

    if tag == "script" || tag == "style" {
        return;
    }

    match tag {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = tag[1..].parse::<usize>().unwrap_or(1);
            let text = element.text().collect::<Vec<_>>().join("").trim().to_string();
            if !text.is_empty() {
                out.push(format!("{} {}", "#".repeat(level), text));
            }
        }
        "a" => {
            let text = element.text().collect::<Vec<_>>().join("").trim().to_string();
            let href = element.value().attr("href").unwrap_or("");
            if !text.is_empty() {
                out.push(if href.is_empty() {
                    text
                } else {
                    format!("[{text}]({href})")
                });
            }
        }
        "li" => {
            let text = element.text().collect::<Vec<_>>().join("").trim().to_string();
            if !text.is_empty() {
                out.push(format!("- {text}"));
            }
        }
        "p" | "div" | "section" | "article" | "body" | "html" | "main" => {
            for child in element.children() {
                if let Some(child_el) = scraper::ElementRef::wrap(child) {
                    walk(child_el, out);
                }
            }
            return;
        }
        _ => {
            let text = element.text().collect::<Vec<_>>().join("").trim().to_string();
            if !text.is_empty() && element.children().all(|c| c.value().is_text()) {
                out.push(text);
            } else {
                for child in element.children() {
                    if let Some(child_el) = scraper::ElementRef::wrap(child) {
                        walk(child_el, out);
                    }
                }
            }
        }
    }
}

fn strip_tags(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut text = String::with_capacity(html.len() / 2);
    for node in document.tree.values() {
        if let scraper::node::Node::Text(t) = node {
            let s = t.text.trim();
            if !s.is_empty() {
                if !text.is_empty() {
                    text.push(' ');
                }
                text.push_str(s);
            }
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn ctx() -> ExecutionContext {
        ExecutionContext::new(
            Arc::new(WorkspaceGuard::new("/tmp")),
            Arc::new(forgecode_core::NullSink),
        )
    }

    struct FixedProvider(Vec<SearchResult>);

    #[async_trait]
    impl SearchProvider for FixedProvider {
        async fn search(&self, _query: &str) -> Result<Vec<SearchResult>, String> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn renders_results_as_markdown_links() {
        let provider = FixedProvider(vec![SearchResult {
            title: "Example".into(),
            url: "https://example.com".into(),
            snippet: "An example site.".into(),
        }]);
        let tool = WebSearchTool::new(Arc::new(provider));
        let result = tool.execute(json!({"query": "example"}), &ctx()).await;
        assert_eq!(result, "## [Example](https://example.com)\n\nAn example site.");
    }

    #[tokio::test]
    async fn blocked_domains_are_filtered() {
        let provider = FixedProvider(vec![
            SearchResult { title: "Good".into(), url: "https://good.com".into(), snippet: "ok".into() },
            SearchResult { title: "Bad".into(), url: "https://bad.com".into(), snippet: "no".into() },
        ]);
        let tool = WebSearchTool::new(Arc::new(provider));
        let result = tool
            .execute(json!({"query": "x", "blocked_domains": ["bad.com"]}), &ctx())
            .await;
        assert!(result.contains("good.com"));
        assert!(!result.contains("bad.com"));
    }

    #[tokio::test]
    async fn no_provider_degrades_to_error_string() {
        let tool = WebSearchTool::default();
        let result = tool.execute(json!({"query": "x"}), &ctx()).await;
        assert!(result.starts_with("Error"));
    }

    #[test]
    fn upgrades_http_to_https() {
        assert_eq!(upgrade_to_https("http://example.com"), "https://example.com/");
        assert_eq!(upgrade_to_https("https://example.com"), "https://example.com/");
        assert_eq!(
            upgrade_to_https("http://example.com/a/b?x=1"),
            "https://example.com/a/b?x=1"
        );
        assert_eq!(upgrade_to_https("not a url"), "not a url");
    }

    #[test]
    fn html_to_markdown_preserves_headings_and_links() {
        let html = "<html><body><h1>Title</h1><p>Some <a href=\"/x\">link</a> text.</p></body></html>";
        let markdown = html_to_markdown(html);
        assert!(markdown.contains("# Title"));
        assert!(markdown.contains("[link](/x)"));
    }

    #[test]
    fn html_to_markdown_strips_script_and_style() {
        let html = "<html><body><script>alert(1)</script><style>.a{}</style><p>Hello</p></body></html>";
        let markdown = html_to_markdown(html);
        assert!(!markdown.contains("alert"));
        assert!(markdown.contains("Hello"));
    }
}
