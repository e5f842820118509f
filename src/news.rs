//! Headlines from the Google News RSS search feed
//!
//! News is decoration: any failure yields an empty list, never an error for
//! the caller. Results, empty ones included, are cached per query.

use quick_xml::escape::unescape;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Serialize;
use std::borrow::Cow;
use std::sync::Arc;
use thiserror::Error;

use crate::api::{with_query, Transport, TransportError};
use crate::cache::TtlCache;
use crate::config::NewsConfig;

/// Errors that can occur while fetching a feed
#[derive(Debug, Error)]
pub enum NewsError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("HTTP {0} from news feed")]
    Status(u16),

    #[error("Malformed RSS: {0}")]
    Parse(#[from] quick_xml::Error),
}

/// One headline
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Article {
    pub title: String,
    pub url: String,
    pub source: Option<String>,
    pub published_at: Option<String>,
}

/// Search query for a driver, e.g. "Lando Norris F1 McLaren"
pub fn driver_query(given: &str, family: &str, constructor: Option<&str>) -> String {
    let name = format!("{} {}", given.trim(), family.trim());
    [name.trim(), "F1", constructor.map(str::trim).unwrap_or_default()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Search query for a team, e.g. "Ferrari F1"
pub fn team_query(name: &str) -> String {
    format!("{} F1", name.trim())
}

/// Which child of `<item>` the reader is inside
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Link,
    PubDate,
    Source,
}

impl Field {
    fn from_tag(tag: &[u8]) -> Option<Self> {
        match tag {
            b"title" => Some(Field::Title),
            b"link" => Some(Field::Link),
            b"pubDate" => Some(Field::PubDate),
            b"source" => Some(Field::Source),
            _ => None,
        }
    }
}

/// Parses up to `limit` items of an RSS 2.0 document
pub fn parse_rss(xml: &str, limit: usize) -> Result<Vec<Article>, NewsError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut articles = Vec::new();
    let mut current: Option<Article> = None;
    let mut field: Option<Field> = None;

    while articles.len() < limit {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"item" => current = Some(Article::default()),
                tag => field = current.as_ref().and(Field::from_tag(tag)),
            },
            Event::Text(e) => {
                if let (Some(article), Some(field)) = (current.as_mut(), field) {
                    append(article, field, &e.unescape()?);
                }
            }
            Event::CData(e) => {
                if let (Some(article), Some(field)) = (current.as_mut(), field) {
                    append(article, field, &String::from_utf8_lossy(&e));
                }
            }
            Event::End(e) => {
                if e.name().as_ref() == b"item" {
                    if let Some(mut article) = current.take() {
                        article.title = decode_entities(article.title);
                        articles.push(article);
                    }
                }
                field = None;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(articles)
}

/// Resolves entities left in text after XML unescaping
///
/// Feed titles are escaped twice (`&amp;#39;`), so one XML pass leaves
/// `&#39;` behind. Text with a bare `&` that is not an entity stays as is.
fn decode_entities(text: String) -> String {
    match unescape(&text) {
        Ok(Cow::Owned(decoded)) => decoded,
        Ok(Cow::Borrowed(_)) | Err(_) => text,
    }
}

fn append(article: &mut Article, field: Field, text: &str) {
    let slot = match field {
        Field::Title => {
            article.title.push_str(text);
            return;
        }
        Field::Link => {
            article.url.push_str(text);
            return;
        }
        Field::PubDate => &mut article.published_at,
        Field::Source => &mut article.source,
    };
    slot.get_or_insert_with(String::new).push_str(text);
}

/// Fetches and caches headlines
pub struct NewsClient {
    transport: Arc<dyn Transport>,
    config: NewsConfig,
    cache: TtlCache<(String, usize), Vec<Article>>,
}

impl std::fmt::Debug for NewsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewsClient")
            .field("config", &self.config)
            .field("cached", &self.cache.len())
            .finish()
    }
}

impl NewsClient {
    pub fn new(transport: Arc<dyn Transport>, config: NewsConfig) -> Self {
        let cache = TtlCache::new(config.ttl());
        Self {
            transport,
            config,
            cache,
        }
    }

    /// Feed URL for `query` in the configured edition
    pub fn feed_url(&self, query: &str) -> String {
        let language = self.config.language.as_str();
        let country = self.config.country.as_str();
        let edition = language.split('-').next().unwrap_or(language);
        with_query(
            &self.config.base_url,
            &[
                ("q", query.to_string()),
                ("hl", language.to_string()),
                ("gl", country.to_string()),
                ("ceid", format!("{}:{}", country, edition)),
            ],
        )
    }

    /// Up to `limit` headlines for `query`; empty on any failure
    pub async fn headlines(&self, query: &str, limit: usize) -> Vec<Article> {
        let key = (query.trim().to_lowercase(), limit);
        self.cache
            .get_or_try_insert_with(key, || async move {
                let articles = match self.try_headlines(query, limit).await {
                    Ok(articles) => articles,
                    Err(err) => {
                        tracing::warn!(query, error = %err, "news fetch failed");
                        Vec::new()
                    }
                };
                Ok::<_, std::convert::Infallible>(articles)
            })
            .await
            .unwrap_or_default()
    }

    /// Fetches and parses the feed, propagating failures
    pub async fn try_headlines(&self, query: &str, limit: usize) -> Result<Vec<Article>, NewsError> {
        let url = self.feed_url(query);
        let response = self.transport.get(&url, self.config.timeout()).await?;
        if !response.is_success() {
            return Err(NewsError::Status(response.status));
        }
        parse_rss(&response.body, limit)
    }
}
