// src/ingest/providers/rss.rs
//! RSS 2.0 / Atom fetch-and-parse collaborator.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use metrics::histogram;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::ingest::types::{FeedFetcher, FeedSource, RawEntry};

#[derive(Debug, Error)]
pub enum FeedParseError {
    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("document is not an RSS or Atom feed")]
    NotAFeed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Link,
    Published,
    Updated,
    Summary,
    Content,
}

fn field_for(name: &[u8]) -> Option<Field> {
    match name {
        b"title" => Some(Field::Title),
        b"link" => Some(Field::Link),
        b"pubDate" | b"published" | b"dc:date" => Some(Field::Published),
        b"updated" => Some(Field::Updated),
        b"description" | b"summary" => Some(Field::Summary),
        b"content:encoded" | b"content" => Some(Field::Content),
        _ => None,
    }
}

/// Text of one field element, closed when its own end tag arrives. Anything nested
/// inside (unescaped HTML, XHTML content) only contributes its text.
struct OpenField {
    field: Field,
    name: Vec<u8>,
    buf: String,
}

#[derive(Default)]
struct EntryBuilder {
    entry: RawEntry,
    link_is_alternate: bool,
}

impl EntryBuilder {
    fn set_field(&mut self, field: Field, text: String) {
        let e = &mut self.entry;
        match field {
            Field::Title => {
                e.title.get_or_insert(text);
            }
            Field::Link => {
                let t = text.trim();
                if e.link.is_none() && !t.is_empty() {
                    e.link = Some(t.to_string());
                }
            }
            Field::Published => {
                e.published.get_or_insert(text);
            }
            Field::Updated => {
                e.updated.get_or_insert(text);
            }
            Field::Summary => {
                e.summary.get_or_insert(text);
            }
            Field::Content => e.content.push(text),
        }
    }

    /// Atom `<link href rel>`: an alternate (or rel-less) link beats any other.
    fn offer_href(&mut self, tag: &BytesStart<'_>) {
        let href = attr(tag, "href");
        let Some(href) = href.filter(|h| !h.trim().is_empty()) else {
            return;
        };
        let alternate = attr(tag, "rel").map_or(true, |r| r == "alternate");
        if self.entry.link.is_none() || (alternate && !self.link_is_alternate) {
            self.entry.link = Some(href.trim().to_string());
            self.link_is_alternate = alternate;
        }
    }
}

fn attr(tag: &BytesStart<'_>, key: &str) -> Option<String> {
    tag.try_get_attribute(key)
        .ok()
        .flatten()
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

fn is_entry(name: &[u8]) -> bool {
    name == b"item" || name == b"entry"
}

fn is_feed_root(name: &[u8]) -> bool {
    matches!(name, b"rss" | b"feed" | b"rdf:RDF" | b"channel")
}

/// Parse an RSS 2.0 / RSS 1.0 / Atom document into raw entries.
///
/// Lenient about embedded HTML: end-tag names are not checked and text that is
/// not valid XML-escaped (e.g. `&nbsp;`) is passed through raw for the sanitizer.
pub fn parse_feed(xml: &str) -> Result<Vec<RawEntry>, FeedParseError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    reader.config_mut().check_end_names = false;

    let mut out = Vec::new();
    let mut saw_root = false;
    let mut current: Option<EntryBuilder> = None;
    let mut open: Option<OpenField> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = e.name();
                let name = name.as_ref();
                if is_feed_root(name) {
                    saw_root = true;
                }
                if open.is_some() {
                    continue;
                }
                if is_entry(name) {
                    current = Some(EntryBuilder::default());
                } else if let (Some(b), Some(field)) = (current.as_mut(), field_for(name)) {
                    if field == Field::Link {
                        b.offer_href(&e);
                    }
                    open = Some(OpenField {
                        field,
                        name: name.to_vec(),
                        buf: String::new(),
                    });
                }
            }
            Event::Empty(e) => {
                if open.is_some() {
                    continue;
                }
                if let Some(b) = current.as_mut() {
                    if e.name().as_ref() == b"link" {
                        b.offer_href(&e);
                    }
                }
            }
            Event::Text(t) => {
                if let Some(f) = open.as_mut() {
                    let text = t
                        .unescape()
                        .map(|c| c.into_owned())
                        .unwrap_or_else(|_| String::from_utf8_lossy(&t).into_owned());
                    push_text(&mut f.buf, &text);
                }
            }
            Event::CData(c) => {
                if let Some(f) = open.as_mut() {
                    push_text(&mut f.buf, &String::from_utf8_lossy(&c));
                }
            }
            Event::End(e) => {
                let name = e.name();
                let name = name.as_ref();
                if let Some(f) = open.take() {
                    if f.name == name {
                        if let Some(b) = current.as_mut() {
                            b.set_field(f.field, f.buf);
                        }
                        continue;
                    }
                    if !is_entry(name) {
                        open = Some(f);
                        continue;
                    }
                    // Unclosed field at the end of its entry: keep what we have.
                    if let Some(b) = current.as_mut() {
                        b.set_field(f.field, f.buf);
                    }
                }
                if is_entry(name) {
                    if let Some(b) = current.take() {
                        out.push(b.entry);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_root {
        return Err(FeedParseError::NotAFeed);
    }
    Ok(out)
}

fn push_text(buf: &mut String, text: &str) {
    if text.is_empty() {
        return;
    }
    if !buf.is_empty() {
        buf.push(' ');
    }
    buf.push_str(text);
}

/// Fetches feeds over HTTP with a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFeedFetcher {
    client: reqwest::Client,
}

impl HttpFeedFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .context("building feed http client")?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FeedFetcher for HttpFeedFetcher {
    async fn fetch(&self, source: &FeedSource) -> Result<Vec<RawEntry>> {
        let t0 = Instant::now();
        let resp = self
            .client
            .get(&source.url)
            .send()
            .await
            .with_context(|| format!("GET {}", source.url))?
            .error_for_status()
            .context("feed http status")?;
        let body = resp.text().await.context("feed http .text()")?;
        histogram!("ingest_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);

        parse_feed(&body).with_context(|| format!("parsing feed from {}", source.name))
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// Serves fixed XML documents keyed by feed URL. Used for fixtures and dry runs.
#[derive(Debug, Clone, Default)]
pub struct StaticFeedFetcher {
    documents: HashMap<String, String>,
}

impl StaticFeedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, url: impl Into<String>, xml: impl Into<String>) -> Self {
        self.documents.insert(url.into(), xml.into());
        self
    }
}

#[async_trait]
impl FeedFetcher for StaticFeedFetcher {
    async fn fetch(&self, source: &FeedSource) -> Result<Vec<RawEntry>> {
        let xml = self
            .documents
            .get(&source.url)
            .ok_or_else(|| anyhow!("no document for {}", source.url))?;
        parse_feed(xml).with_context(|| format!("parsing fixture for {}", source.name))
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:content="http://purl.org/rss/1.0/modules/content/" xmlns:dc="http://purl.org/dc/elements/1.1/">
  <channel>
    <title>Channel title is not an entry</title>
    <link>https://example.test/</link>
    <item>
      <title>Bitcoin &amp; Ether rally</title>
      <link>https://example.test/a</link>
      <pubDate>Mon, 19 Oct 2026 08:30:00 GMT</pubDate>
      <description><![CDATA[<p>Short summary</p>]]></description>
      <content:encoded><![CDATA[<p>Full <b>body</b></p>]]></content:encoded>
    </item>
    <item>
      <title><![CDATA[Second &nbsp; item]]></title>
      <link> https://example.test/b </link>
      <dc:date>2026-10-19T07:00:00Z</dc:date>
      <description>Plain text&nbsp;here</description>
    </item>
  </channel>
</rss>"#;

    const ATOM: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Atom feed</title>
  <entry>
    <title>Atom entry</title>
    <link rel="self" href="https://example.test/self"/>
    <link rel="alternate" href="https://example.test/post"/>
    <updated>2026-10-19T09:00:00Z</updated>
    <summary type="html">&lt;p&gt;Atom summary&lt;/p&gt;</summary>
  </entry>
</feed>"#;

    #[test]
    fn parses_rss_items_with_all_fields() {
        let v = parse_feed(RSS).unwrap();
        assert_eq!(v.len(), 2);

        assert_eq!(v[0].title.as_deref(), Some("Bitcoin & Ether rally"));
        assert_eq!(v[0].link.as_deref(), Some("https://example.test/a"));
        assert_eq!(v[0].published.as_deref(), Some("Mon, 19 Oct 2026 08:30:00 GMT"));
        assert_eq!(v[0].summary.as_deref(), Some("<p>Short summary</p>"));
        assert_eq!(v[0].content, vec!["<p>Full <b>body</b></p>".to_string()]);

        assert_eq!(v[1].link.as_deref(), Some("https://example.test/b"));
        assert_eq!(v[1].published.as_deref(), Some("2026-10-19T07:00:00Z"));
        // &nbsp; is not an XML entity; it is left for the sanitizer
        assert_eq!(v[1].summary.as_deref(), Some("Plain text&nbsp;here"));
        assert!(v[1].content.is_empty());
    }

    #[test]
    fn parses_atom_entries_and_prefers_alternate_link() {
        let v = parse_feed(ATOM).unwrap();
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].title.as_deref(), Some("Atom entry"));
        assert_eq!(v[0].link.as_deref(), Some("https://example.test/post"));
        assert_eq!(v[0].updated.as_deref(), Some("2026-10-19T09:00:00Z"));
        assert!(v[0].published.is_none());
        assert_eq!(v[0].summary.as_deref(), Some("<p>Atom summary</p>"));
    }

    #[test]
    fn unescaped_html_inside_description_is_tolerated() {
        let xml = r#"<rss><channel><item>
            <title>Loose</title>
            <link>https://example.test/loose</link>
            <description><p>one<br>two</p></description>
        </item></channel></rss>"#;
        let v = parse_feed(xml).unwrap();
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].summary.as_deref(), Some("one two"));
        assert_eq!(v[0].link.as_deref(), Some("https://example.test/loose"));
    }

    #[test]
    fn empty_channel_yields_no_entries() {
        let xml = r#"<?xml version="1.0"?><rss version="2.0"><channel></channel></rss>"#;
        assert!(parse_feed(xml).unwrap().is_empty());
    }

    #[test]
    fn html_page_is_not_a_feed() {
        let html = "<html><body><p>Service unavailable</p></body></html>";
        assert!(matches!(parse_feed(html), Err(FeedParseError::NotAFeed)));
    }

    #[tokio::test]
    async fn static_fetcher_serves_by_url() {
        let f = StaticFeedFetcher::new().with_document("https://feed.test/rss", RSS);
        let ok = FeedSource::new("A", "https://feed.test/rss", "Crypto News");
        let missing = FeedSource::new("B", "https://feed.test/none", "Crypto News");
        assert_eq!(f.name(), "static");
        assert_eq!(f.fetch(&ok).await.unwrap().len(), 2);
        assert!(f.fetch(&missing).await.is_err());
    }
}
