//! Season data aggregation service
//!
//! `SeasonService` answers the questions the CLI asks: the calendar, results
//! so far, standings, session data for a round, driver and constructor season
//! profiles, roster menus and API health. It is built once per process and
//! owns the caches it uses.

mod menus;
mod profiles;

pub use menus::{resolve_year, ApiHealth, MenuEntry, DEGRADED_ADVISORY};
pub use profiles::{ConstructorProfile, DriverProfile};

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::api::{with_query, ApiClient, Collection, CollectionLoader, Endpoints, LoadError, Resource};
use crate::cache::TtlCache;
use crate::config::Config;
use crate::data::{ConstructorStanding, DriverStanding, Race, StandingsList};

/// `limit` for single-shot season requests that are never paged
const SEASON_LIMIT: u32 = 1000;

/// `limit` for round-scoped requests
const ROUND_LIMIT: u32 = 200;

/// How many completed races the recent-races list shows
const RECENT_RACES: usize = 5;

/// Errors surfaced to callers of the season service
#[derive(Debug, Error)]
pub enum SeasonError {
    /// The season, round or entity has no data upstream
    #[error("{0} not found")]
    NotFound(String),

    /// A paginated load exhausted its retries
    #[error(transparent)]
    Load(#[from] LoadError),
}

/// Per-round session types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    Race,
    Qualifying,
    Sprint,
    PitStops,
}

impl SessionKind {
    /// All kinds, in the order they are probed and listed
    pub const ALL: [SessionKind; 4] = [
        SessionKind::Race,
        SessionKind::Qualifying,
        SessionKind::Sprint,
        SessionKind::PitStops,
    ];

    /// Parses a session name, accepting common aliases
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "race" | "results" => Some(SessionKind::Race),
            "qualifying" | "quali" => Some(SessionKind::Qualifying),
            "sprint" => Some(SessionKind::Sprint),
            "pitstops" => Some(SessionKind::PitStops),
            _ => None,
        }
    }

    pub fn resource(self) -> Resource {
        match self {
            SessionKind::Race => Resource::Results,
            SessionKind::Qualifying => Resource::Qualifying,
            SessionKind::Sprint => Resource::Sprint,
            SessionKind::PitStops => Resource::PitStops,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SessionKind::Race => "Race Results",
            SessionKind::Qualifying => "Qualifying",
            SessionKind::Sprint => "Sprint",
            SessionKind::PitStops => "Pit Stops",
        }
    }
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Completed part of a season's calendar
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonResults {
    pub year: u16,
    pub races: Vec<Race>,
    pub completed_rounds: usize,
    pub total_rounds: usize,
}

/// Data for one session of one round
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionReport {
    pub year: u16,
    pub round: u32,
    pub kind: SessionKind,
    pub race: Race,
}

/// Both championships for a season on one page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearOverview {
    pub year: u16,
    /// Round after which the snapshot was taken
    pub round: u32,
    pub drivers: Vec<DriverStanding>,
    pub constructors: Vec<ConstructorStanding>,
}

/// Aggregates season data from the F1 API
pub struct SeasonService {
    client: ApiClient,
    endpoints: Endpoints,
    loader: CollectionLoader,
    recent_races: TtlCache<u16, Vec<Race>>,
    drivers_menu: TtlCache<u16, Vec<MenuEntry>>,
    constructors_menu: TtlCache<u16, Vec<MenuEntry>>,
    health: TtlCache<(), bool>,
    health_timeout: Duration,
}

impl fmt::Debug for SeasonService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeasonService")
            .field("endpoints", &self.endpoints)
            .field("loader", &self.loader)
            .finish()
    }
}

impl SeasonService {
    /// Wires the service and its caches from configuration
    pub fn new(client: ApiClient, config: &Config) -> Self {
        let endpoints = Endpoints::from_config(&config.api);
        let collections = Arc::new(TtlCache::new(config.cache.collections_ttl()));
        let loader = CollectionLoader::new(
            client.clone(),
            endpoints.clone(),
            config.loader.clone(),
            collections,
        );

        Self {
            client,
            endpoints,
            loader,
            recent_races: TtlCache::new(config.cache.recent_races_ttl()),
            drivers_menu: TtlCache::new(config.cache.drivers_menu_ttl()),
            constructors_menu: TtlCache::new(config.cache.constructors_menu_ttl()),
            health: TtlCache::new(config.cache.health_ttl()),
            health_timeout: config.api.health_timeout(),
        }
    }

    /// Every race in the season, ordered by round
    pub async fn calendar(&self, year: u16) -> Result<Vec<Race>, SeasonError> {
        let data = self
            .loader
            .load(&Collection::season(Resource::Races), year)
            .await?;
        let mut races = data.races().to_vec();
        races.sort_by_key(|race| race.round);
        Ok(races)
    }

    /// Full calendar; a season without races is not found
    pub async fn schedule(&self, year: u16) -> Result<Vec<Race>, SeasonError> {
        let races = self.calendar(year).await?;
        if races.is_empty() {
            return Err(SeasonError::NotFound(format!("Schedule for {}", year)));
        }
        Ok(races)
    }

    /// Races up to and including the latest completed round
    pub async fn season_results(
        &self,
        year: u16,
        today: NaiveDate,
    ) -> Result<SeasonResults, SeasonError> {
        let calendar = self.calendar(year).await?;
        let total_rounds = calendar.len();
        let races: Vec<Race> = match last_completed_round(&calendar, today) {
            Some(last) => calendar.into_iter().filter(|r| r.round <= last).collect(),
            None => Vec::new(),
        };

        Ok(SeasonResults {
            year,
            completed_rounds: races.len(),
            total_rounds,
            races,
        })
    }

    /// The last few completed races, oldest first
    pub async fn recent_races(&self, year: u16, today: NaiveDate) -> Result<Vec<Race>, SeasonError> {
        self.recent_races
            .get_or_try_insert_with(year, || async move {
                let results = self.season_results(year, today).await?;
                let skip = results.races.len().saturating_sub(RECENT_RACES);
                Ok::<_, SeasonError>(results.races.into_iter().skip(skip).collect())
            })
            .await
    }

    /// Which sessions of a round have data
    ///
    /// Each kind is probed with a degrading request, so an unreachable API
    /// yields an empty list rather than an error.
    pub async fn sessions(&self, year: u16, round: u32) -> Vec<SessionKind> {
        let mut available = Vec::new();
        for kind in SessionKind::ALL {
            let url = self.endpoints.round(year, round, kind.resource().path());
            let envelope = self.client.fetch_envelope(&url).await;
            if envelope.mr_data.total > 0 {
                available.push(kind);
            }
        }
        available
    }

    /// One session's data for a round
    pub async fn session(
        &self,
        year: u16,
        round: u32,
        kind: SessionKind,
    ) -> Result<SessionReport, SeasonError> {
        let url = with_query(
            &self.endpoints.round(year, round, kind.resource().path()),
            &[("limit", ROUND_LIMIT)],
        );
        let envelope = self.client.fetch_envelope(&url).await;
        let race = envelope
            .mr_data
            .race_table
            .and_then(|table| table.races.into_iter().next())
            .ok_or_else(|| {
                SeasonError::NotFound(format!("{} for {} round {}", kind.label(), year, round))
            })?;

        Ok(SessionReport {
            year,
            round,
            kind,
            race,
        })
    }

    /// Latest drivers' championship snapshot
    pub async fn driver_standings(&self, year: u16) -> Result<StandingsList, SeasonError> {
        self.standings(year, Resource::DriverStandings)
            .await
            .filter(|list| !list.driver_standings.is_empty())
            .ok_or_else(|| SeasonError::NotFound(format!("Driver standings for {}", year)))
    }

    /// Latest constructors' championship snapshot
    pub async fn constructor_standings(&self, year: u16) -> Result<StandingsList, SeasonError> {
        self.standings(year, Resource::ConstructorStandings)
            .await
            .filter(|list| !list.constructor_standings.is_empty())
            .ok_or_else(|| SeasonError::NotFound(format!("Constructor standings for {}", year)))
    }

    /// Both championships; constructors may be missing (pre-1958 seasons)
    pub async fn year_overview(&self, year: u16) -> Result<YearOverview, SeasonError> {
        let drivers = self.driver_standings(year).await?;
        let constructors = self
            .standings(year, Resource::ConstructorStandings)
            .await
            .map(|list| list.constructor_standings)
            .unwrap_or_default();

        Ok(YearOverview {
            year,
            round: drivers.round,
            drivers: drivers.driver_standings,
            constructors,
        })
    }

    /// First standings list of a season, via a degrading request
    async fn standings(&self, year: u16, resource: Resource) -> Option<StandingsList> {
        let url = with_query(
            &self.endpoints.season(year, resource.path()),
            &[("limit", SEASON_LIMIT)],
        );
        let envelope = self.client.fetch_envelope(&url).await;
        envelope
            .mr_data
            .standings_table
            .and_then(|table| table.standings_lists.into_iter().next())
    }
}

/// Highest round dated on or before `today`
pub fn last_completed_round(races: &[Race], today: NaiveDate) -> Option<u32> {
    races
        .iter()
        .filter(|race| race.is_completed(today))
        .map(|race| race.round)
        .max()
}
