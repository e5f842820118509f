//! Paginated collection loader
//!
//! Fetches a season-scoped collection page by page (`limit`/`offset`) and
//! merges the pages into one payload shaped like a single page. Results are
//! memoized in a shared [`TtlCache`] keyed by resource, season and page size.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use super::client::{ApiClient, ApiError};
use super::urls::{with_query, Endpoints};
use crate::cache::{CacheKey, TtlCache};
use crate::config::LoaderConfig;
use crate::data::MrData;

/// Errors that end a collection load
#[derive(Debug, Error)]
pub enum LoadError {
    /// A page failed for good, after retries if the failure was transient
    #[error("Failed to load {url} (attempts: {attempts}): {source}")]
    Exhausted {
        url: String,
        attempts: u32,
        #[source]
        source: ApiError,
    },
}

/// Season-scoped API resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Races,
    Results,
    Sprint,
    Qualifying,
    PitStops,
    Drivers,
    Constructors,
    DriverStandings,
    ConstructorStandings,
    Seasons,
}

impl Resource {
    /// Path segment used by the API
    pub fn path(self) -> &'static str {
        match self {
            Resource::Races => "races",
            Resource::Results => "results",
            Resource::Sprint => "sprint",
            Resource::Qualifying => "qualifying",
            Resource::PitStops => "pitstops",
            Resource::Drivers => "drivers",
            Resource::Constructors => "constructors",
            Resource::DriverStandings => "driverstandings",
            Resource::ConstructorStandings => "constructorstandings",
            Resource::Seasons => "seasons",
        }
    }

    /// How successive pages of this resource combine
    pub fn merge_strategy(self) -> MergeStrategy {
        match self {
            Resource::Races
            | Resource::Results
            | Resource::Sprint
            | Resource::Qualifying
            | Resource::PitStops => MergeStrategy::AppendRaces,
            Resource::Drivers => MergeStrategy::AppendDrivers,
            Resource::Constructors => MergeStrategy::AppendConstructors,
            Resource::DriverStandings | Resource::ConstructorStandings | Resource::Seasons => {
                MergeStrategy::Replace
            }
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Rule for folding a new page into the accumulated payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStrategy {
    /// Concatenate `RaceTable.Races`, joining a race split across pages
    AppendRaces,
    /// Concatenate `DriverTable.Drivers`
    AppendDrivers,
    /// Concatenate `ConstructorTable.Constructors`
    AppendConstructors,
    /// The latest page replaces everything accumulated so far
    Replace,
}

impl MergeStrategy {
    pub fn merge(self, acc: &mut MrData, page: MrData) {
        match self {
            MergeStrategy::AppendRaces => {
                let incoming = page.race_table.map(|t| t.races).unwrap_or_default();
                let races = &mut acc.race_table.get_or_insert_with(Default::default).races;
                for race in incoming {
                    // The API pages by result row, so one race can straddle two pages
                    match races.last_mut() {
                        Some(last) if last.same_round(&race) => last.absorb_rows(race),
                        _ => races.push(race),
                    }
                }
            }
            MergeStrategy::AppendDrivers => {
                let incoming = page.driver_table.map(|t| t.drivers).unwrap_or_default();
                acc.driver_table
                    .get_or_insert_with(Default::default)
                    .drivers
                    .extend(incoming);
            }
            MergeStrategy::AppendConstructors => {
                let incoming = page
                    .constructor_table
                    .map(|t| t.constructors)
                    .unwrap_or_default();
                acc.constructor_table
                    .get_or_insert_with(Default::default)
                    .constructors
                    .extend(incoming);
            }
            MergeStrategy::Replace => *acc = page,
        }
    }
}

/// A resource, optionally narrowed to one constructor
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Collection {
    pub resource: Resource,
    pub constructor: Option<String>,
}

impl Collection {
    pub fn season(resource: Resource) -> Self {
        Self {
            resource,
            constructor: None,
        }
    }

    /// `constructors/{id}/{resource}`
    pub fn for_constructor(constructor_id: &str, resource: Resource) -> Self {
        Self {
            resource,
            constructor: Some(constructor_id.to_lowercase()),
        }
    }

    /// Path below the season, also used as the cache key's resource name
    pub fn path(&self) -> String {
        match &self.constructor {
            Some(id) => format!("constructors/{}/{}", id, self.resource.path()),
            None => self.resource.path().to_string(),
        }
    }

    pub fn merge_strategy(&self) -> MergeStrategy {
        self.resource.merge_strategy()
    }
}

/// Loads and memoizes complete season collections
#[derive(Debug, Clone)]
pub struct CollectionLoader {
    client: ApiClient,
    endpoints: Endpoints,
    config: LoaderConfig,
    cache: Arc<TtlCache<CacheKey, MrData>>,
}

impl CollectionLoader {
    pub fn new(
        client: ApiClient,
        endpoints: Endpoints,
        config: LoaderConfig,
        cache: Arc<TtlCache<CacheKey, MrData>>,
    ) -> Self {
        Self {
            client,
            endpoints,
            config,
            cache,
        }
    }

    /// Loads `collection` for `year` with the configured page size
    pub async fn load(&self, collection: &Collection, year: u16) -> Result<MrData, LoadError> {
        self.load_with_page_size(collection, year, self.config.page_size)
            .await
    }

    /// Loads `collection` for `year`, serving a fresh cached copy when present
    pub async fn load_with_page_size(
        &self,
        collection: &Collection,
        year: u16,
        page_size: u32,
    ) -> Result<MrData, LoadError> {
        let page_size = page_size.max(1);
        let key = CacheKey::new(collection.path(), year, page_size);
        let base = self.endpoints.season(year, &collection.path());
        let strategy = collection.merge_strategy();

        self.cache
            .get_or_try_insert_with(key, || self.fetch_all(base, strategy, page_size))
            .await
    }

    /// Walks every page of `base`, without consulting the cache
    async fn fetch_all(
        &self,
        base: String,
        strategy: MergeStrategy,
        page_size: u32,
    ) -> Result<MrData, LoadError> {
        let mut merged: Option<MrData> = None;
        let mut offset: u32 = 0;
        let mut pages = 0;

        loop {
            let url = with_query(&base, &[("limit", page_size), ("offset", offset)]);
            let page = self.fetch_page(&url).await?;
            pages += 1;

            let total = page.total;
            let limit = if page.limit == 0 { page_size } else { page.limit };
            let page_offset = if page.offset == 0 { offset } else { page.offset };

            match merged.as_mut() {
                None => merged = Some(page),
                Some(acc) => strategy.merge(acc, page),
            }

            offset = page_offset.saturating_add(limit);
            if total == 0 || offset >= total {
                break;
            }
        }

        let merged = merged.unwrap_or_default();
        tracing::debug!(
            url = %base,
            pages,
            total = merged.total,
            items = merged.item_count(),
            "loaded collection"
        );
        Ok(merged)
    }

    /// Fetches one page, retrying with linear backoff
    async fn fetch_page(&self, url: &str) -> Result<MrData, LoadError> {
        let attempts = self.config.attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.client.try_fetch(url).await {
                Ok(envelope) => return Ok(envelope.mr_data),
                Err(err) if attempt < attempts && self.client.is_retryable(&err) => {
                    let delay = backoff_delay(self.config.backoff(), attempt);
                    tracing::warn!(url, attempt, error = %err, ?delay, "page fetch failed, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(source) => {
                    return Err(LoadError::Exhausted {
                        url: url.to_string(),
                        attempts: attempt,
                        source,
                    })
                }
            }
        }
    }
}

/// Linear backoff: the `attempt`-th failure waits `attempt * unit`
pub fn backoff_delay(unit: Duration, attempt: u32) -> Duration {
    unit.saturating_mul(attempt)
}
