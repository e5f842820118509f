//! Core data models for Pitwall
//!
//! Typed records for the Ergast-compatible F1 API. Payloads are parsed into
//! these types at the API boundary so the rest of the crate never handles
//! raw JSON maps.

pub mod de;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Top-level API response wrapper
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "MRData", default)]
    pub mr_data: MrData,
}

impl Envelope {
    /// Parses an already-decoded JSON value into a typed envelope
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}

/// The paginated body of every API response
///
/// Exactly one of the tables is normally populated, depending on the
/// resource that was requested.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MrData {
    /// Page size the server applied
    #[serde(default, deserialize_with = "de::number")]
    pub limit: u32,
    /// Offset of the first item on this page
    #[serde(default, deserialize_with = "de::number")]
    pub offset: u32,
    /// Total number of items across all pages
    #[serde(default, deserialize_with = "de::number")]
    pub total: u32,
    #[serde(rename = "RaceTable", default, skip_serializing_if = "Option::is_none")]
    pub race_table: Option<RaceTable>,
    #[serde(rename = "DriverTable", default, skip_serializing_if = "Option::is_none")]
    pub driver_table: Option<DriverTable>,
    #[serde(
        rename = "ConstructorTable",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub constructor_table: Option<ConstructorTable>,
    #[serde(
        rename = "StandingsTable",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub standings_table: Option<StandingsTable>,
}

impl MrData {
    /// Races in this payload, or an empty slice
    pub fn races(&self) -> &[Race] {
        self.race_table.as_ref().map_or(&[], |t| t.races.as_slice())
    }

    /// Drivers in this payload, or an empty slice
    pub fn drivers(&self) -> &[Driver] {
        self.driver_table.as_ref().map_or(&[], |t| t.drivers.as_slice())
    }

    /// Constructors in this payload, or an empty slice
    pub fn constructors(&self) -> &[Constructor] {
        self.constructor_table
            .as_ref()
            .map_or(&[], |t| t.constructors.as_slice())
    }

    /// Standings snapshots in this payload, or an empty slice
    pub fn standings_lists(&self) -> &[StandingsList] {
        self.standings_table
            .as_ref()
            .map_or(&[], |t| t.standings_lists.as_slice())
    }

    /// Number of paginated items held, counted the way the API counts `total`
    ///
    /// Race-scoped resources paginate by row (result, qualifying, pit stop),
    /// so those rows are counted when present; a bare calendar counts races.
    pub fn item_count(&self) -> usize {
        if let Some(table) = &self.race_table {
            let rows: usize = table.races.iter().map(Race::row_count).sum();
            return if rows > 0 { rows } else { table.races.len() };
        }
        if let Some(table) = &self.driver_table {
            return table.drivers.len();
        }
        if let Some(table) = &self.constructor_table {
            return table.constructors.len();
        }
        if let Some(table) = &self.standings_table {
            return table.standings_lists.len();
        }
        0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RaceTable {
    #[serde(default)]
    pub season: Option<String>,
    #[serde(rename = "Races", default)]
    pub races: Vec<Race>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DriverTable {
    #[serde(rename = "Drivers", default)]
    pub drivers: Vec<Driver>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstructorTable {
    #[serde(rename = "Constructors", default)]
    pub constructors: Vec<Constructor>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StandingsTable {
    #[serde(default)]
    pub season: Option<String>,
    #[serde(rename = "StandingsLists", default)]
    pub standings_lists: Vec<StandingsList>,
}

/// One race weekend in a season
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Race {
    #[serde(default)]
    pub season: String,
    /// 1-based position in the season calendar
    #[serde(default, deserialize_with = "de::number")]
    pub round: u32,
    #[serde(rename = "raceName", default)]
    pub name: String,
    #[serde(rename = "Circuit", default)]
    pub circuit: Circuit,
    /// Race day; `None` when upstream omits or mangles it
    #[serde(default, deserialize_with = "de::optional_date")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(rename = "Results", default, skip_serializing_if = "Vec::is_empty")]
    pub results: Vec<ResultRow>,
    #[serde(
        rename = "SprintResults",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub sprint_results: Vec<ResultRow>,
    #[serde(
        rename = "QualifyingResults",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub qualifying_results: Vec<QualifyingRow>,
    #[serde(rename = "PitStops", default, skip_serializing_if = "Vec::is_empty")]
    pub pit_stops: Vec<PitStop>,
}

impl Race {
    /// Total number of per-driver rows attached to this race
    pub fn row_count(&self) -> usize {
        self.results.len()
            + self.sprint_results.len()
            + self.qualifying_results.len()
            + self.pit_stops.len()
    }

    /// Whether `other` describes the same season and round
    pub fn same_round(&self, other: &Race) -> bool {
        self.round == other.round && self.season == other.season
    }

    /// Moves all rows of `other` onto this race
    pub fn absorb_rows(&mut self, other: Race) {
        self.results.extend(other.results);
        self.sprint_results.extend(other.sprint_results);
        self.qualifying_results.extend(other.qualifying_results);
        self.pit_stops.extend(other.pit_stops);
    }

    /// Whether the race has taken place on or before `today`
    pub fn is_completed(&self, today: NaiveDate) -> bool {
        self.date.is_some_and(|d| d <= today)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Circuit {
    #[serde(default)]
    pub circuit_id: String,
    #[serde(default)]
    pub circuit_name: String,
    #[serde(rename = "Location", default)]
    pub location: Location,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub locality: String,
    #[serde(default)]
    pub country: String,
}

/// A driver's identity record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Driver {
    #[serde(default)]
    pub driver_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permanent_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default)]
    pub given_name: String,
    #[serde(default)]
    pub family_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub nationality: String,
}

impl Driver {
    /// "Given Family"
    pub fn full_name(&self) -> String {
        format!("{} {}", self.given_name, self.family_name)
            .trim()
            .to_string()
    }

    /// Three-letter code, falling back to the driver id
    pub fn short_code(&self) -> &str {
        self.code
            .as_deref()
            .filter(|c| !c.is_empty())
            .unwrap_or(&self.driver_id)
    }

    /// Case-insensitive match on `driverId`
    pub fn matches_id(&self, driver_id: &str) -> bool {
        self.driver_id.eq_ignore_ascii_case(driver_id)
    }

    /// Portrait file name in the `family-given.png` convention
    pub fn image_slug(&self) -> String {
        let family = slug_part(&self.family_name);
        let given = slug_part(&self.given_name);
        if family.is_empty() && given.is_empty() {
            "placeholder.png".to_string()
        } else {
            format!("{}-{}.png", family, given)
        }
    }
}

/// A team's identity record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Constructor {
    #[serde(default)]
    pub constructor_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub nationality: String,
}

impl Constructor {
    /// Case-insensitive match on `constructorId`
    pub fn matches_id(&self, constructor_id: &str) -> bool {
        self.constructor_id.eq_ignore_ascii_case(constructor_id)
    }

    /// Livery file name, e.g. `aston_martin` -> `aston-martin.png`
    pub fn image_slug(&self) -> String {
        livery_slug(&self.constructor_id)
    }
}

/// Livery file name for a raw constructor id
pub fn livery_slug(constructor_id: &str) -> String {
    let id = constructor_id.trim().to_lowercase();
    if id.is_empty() {
        "placeholder.png".to_string()
    } else {
        format!("{}.png", id.replace('_', "-"))
    }
}

fn slug_part(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "-")
}

/// One driver's outcome in a race or sprint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    /// Classified finishing position
    #[serde(default, deserialize_with = "de::optional_number")]
    pub position: Option<u32>,
    /// Position as displayed: a number, or "R", "D", "E", "W", "F", "N"
    #[serde(default)]
    pub position_text: String,
    #[serde(default, deserialize_with = "de::number")]
    pub points: f64,
    #[serde(rename = "Driver", default)]
    pub driver: Driver,
    #[serde(rename = "Constructor", default)]
    pub constructor: Constructor,
    /// Starting slot; 0 means pit-lane start
    #[serde(default, deserialize_with = "de::optional_number")]
    pub grid: Option<u32>,
    #[serde(default, deserialize_with = "de::optional_number")]
    pub laps: Option<u32>,
    #[serde(default)]
    pub status: String,
    #[serde(rename = "Time", default, skip_serializing_if = "Option::is_none")]
    pub time: Option<RaceTime>,
}

impl ResultRow {
    /// Finishing time or gap, if classified with one
    pub fn time_text(&self) -> Option<&str> {
        self.time.as_ref().map(|t| t.time.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RaceTime {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub millis: Option<String>,
    #[serde(default)]
    pub time: String,
}

/// One driver's qualifying session outcome
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualifyingRow {
    #[serde(default, deserialize_with = "de::optional_number")]
    pub position: Option<u32>,
    #[serde(rename = "Driver", default)]
    pub driver: Driver,
    #[serde(rename = "Constructor", default)]
    pub constructor: Constructor,
    #[serde(rename = "Q1", default, skip_serializing_if = "Option::is_none")]
    pub q1: Option<String>,
    #[serde(rename = "Q2", default, skip_serializing_if = "Option::is_none")]
    pub q2: Option<String>,
    #[serde(rename = "Q3", default, skip_serializing_if = "Option::is_none")]
    pub q3: Option<String>,
}

impl QualifyingRow {
    /// Time from the furthest session the driver reached
    pub fn best_time(&self) -> Option<&str> {
        self.q3
            .as_deref()
            .or(self.q2.as_deref())
            .or(self.q1.as_deref())
            .filter(|t| !t.is_empty())
    }
}

/// A single pit stop
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PitStop {
    #[serde(default)]
    pub driver_id: String,
    #[serde(default, deserialize_with = "de::number")]
    pub lap: u32,
    #[serde(default, deserialize_with = "de::number")]
    pub stop: u32,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub duration: String,
}

/// Authoritative championship snapshot after a given round
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StandingsList {
    #[serde(default)]
    pub season: String,
    #[serde(default, deserialize_with = "de::number")]
    pub round: u32,
    #[serde(
        rename = "DriverStandings",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub driver_standings: Vec<DriverStanding>,
    #[serde(
        rename = "ConstructorStandings",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub constructor_standings: Vec<ConstructorStanding>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverStanding {
    #[serde(default, deserialize_with = "de::optional_number")]
    pub position: Option<u32>,
    #[serde(default)]
    pub position_text: String,
    #[serde(default, deserialize_with = "de::number")]
    pub points: f64,
    #[serde(default, deserialize_with = "de::number")]
    pub wins: u32,
    #[serde(rename = "Driver", default)]
    pub driver: Driver,
    #[serde(rename = "Constructors", default)]
    pub constructors: Vec<Constructor>,
}

impl DriverStanding {
    /// Name of the driver's (first) team this season
    pub fn constructor_name(&self) -> Option<&str> {
        self.constructors.first().map(|c| c.name.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstructorStanding {
    #[serde(default, deserialize_with = "de::optional_number")]
    pub position: Option<u32>,
    #[serde(default)]
    pub position_text: String,
    #[serde(default, deserialize_with = "de::number")]
    pub points: f64,
    #[serde(default, deserialize_with = "de::number")]
    pub wins: u32,
    #[serde(rename = "Constructor", default)]
    pub constructor: Constructor,
}
