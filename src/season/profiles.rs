//! Driver and constructor season profiles

use chrono::NaiveDate;
use serde::Serialize;

use super::{SeasonError, SeasonService};
use crate::api::{Collection, Resource};
use crate::data::{livery_slug, Driver};
use crate::stats::{self, RaceLine, RaceTally, Session, SprintTally};

/// Races shown in a driver's recent form
const RECENT_FORM: usize = 5;

/// Drivers listed on a constructor profile
const LINEUP_SIZE: usize = 2;

/// A driver's season at a glance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverProfile {
    pub year: u16,
    pub driver: Driver,
    pub constructor: Option<String>,
    pub championship_position: Option<u32>,
    pub championship_points: Option<f64>,
    pub grand_prix: RaceTally,
    pub sprint: SprintTally,
    /// Latest completed races, most recent first
    pub recent: Vec<RaceLine>,
    pub image: String,
}

/// A constructor's season at a glance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstructorProfile {
    pub year: u16,
    pub constructor_id: String,
    pub name: String,
    pub drivers: Vec<Driver>,
    pub championship_position: Option<u32>,
    pub championship_points: Option<f64>,
    pub grand_prix: RaceTally,
    pub sprint: SprintTally,
    pub livery: String,
}

impl SeasonService {
    /// Season statistics for one driver
    pub async fn driver_profile(
        &self,
        year: u16,
        driver_id: &str,
        today: NaiveDate,
    ) -> Result<DriverProfile, SeasonError> {
        let roster = self
            .loader
            .load(&Collection::season(Resource::Drivers), year)
            .await?;
        let driver = roster
            .drivers()
            .iter()
            .find(|d| d.matches_id(driver_id))
            .cloned()
            .ok_or_else(|| SeasonError::NotFound(format!("Driver '{}' in {}", driver_id, year)))?;

        let standing = self.standings(year, Resource::DriverStandings).await.and_then(|list| {
            list.driver_standings
                .into_iter()
                .find(|s| s.driver.matches_id(&driver.driver_id))
        });

        let calendar = self.calendar(year).await?;
        let results = self
            .loader
            .load(&Collection::season(Resource::Results), year)
            .await?;
        let sprints = self
            .loader
            .load(&Collection::season(Resource::Sprint), year)
            .await?;

        let grand_prix = stats::driver_race_lines(
            &calendar,
            results.races(),
            Session::GrandPrix,
            &driver.driver_id,
            today,
        );
        let sprint_lines = stats::driver_race_lines(
            &calendar,
            sprints.races(),
            Session::Sprint,
            &driver.driver_id,
            today,
        );

        tracing::debug!(
            driver = %driver.driver_id,
            year,
            races = grand_prix.len(),
            sprints = sprint_lines.len(),
            "built driver profile"
        );

        Ok(DriverProfile {
            year,
            constructor: standing
                .as_ref()
                .and_then(|s| s.constructor_name())
                .map(str::to_string),
            championship_position: standing.as_ref().and_then(|s| s.position),
            championship_points: standing.as_ref().map(|s| s.points),
            grand_prix: stats::tally_driver_races(&grand_prix),
            sprint: stats::tally_driver_sprints(&sprint_lines),
            recent: stats::most_recent(&grand_prix, RECENT_FORM),
            image: driver.image_slug(),
            driver,
        })
    }

    /// Season statistics for one constructor, summed over all its cars
    pub async fn constructor_profile(
        &self,
        year: u16,
        constructor_id: &str,
        today: NaiveDate,
    ) -> Result<ConstructorProfile, SeasonError> {
        let constructor_id = constructor_id.trim().to_lowercase();

        let roster = self
            .loader
            .load(
                &Collection::for_constructor(&constructor_id, Resource::Drivers),
                year,
            )
            .await?;
        let mut drivers = roster.drivers().to_vec();
        if drivers.is_empty() {
            return Err(SeasonError::NotFound(format!(
                "Constructor '{}' in {}",
                constructor_id, year
            )));
        }
        drivers.sort_by_key(|d| d.family_name.to_lowercase());
        drivers.truncate(LINEUP_SIZE);

        let standing = self
            .standings(year, Resource::ConstructorStandings)
            .await
            .and_then(|list| {
                list.constructor_standings
                    .into_iter()
                    .find(|s| s.constructor.matches_id(&constructor_id))
            });

        let calendar = self.calendar(year).await?;
        let results = self
            .loader
            .load(
                &Collection::for_constructor(&constructor_id, Resource::Results),
                year,
            )
            .await?;
        let sprints = self
            .loader
            .load(
                &Collection::for_constructor(&constructor_id, Resource::Sprint),
                year,
            )
            .await?;

        let name = standing
            .as_ref()
            .map(|s| s.constructor.name.clone())
            .or_else(|| {
                results
                    .races()
                    .iter()
                    .flat_map(|race| race.results.iter())
                    .map(|row| row.constructor.name.clone())
                    .find(|name| !name.is_empty())
            })
            .unwrap_or_else(|| constructor_id.clone());

        Ok(ConstructorProfile {
            year,
            name,
            drivers,
            championship_position: standing.as_ref().and_then(|s| s.position),
            championship_points: standing.as_ref().map(|s| s.points),
            grand_prix: stats::tally_constructor_races(
                &calendar,
                results.races(),
                &constructor_id,
                today,
            ),
            sprint: stats::tally_constructor_sprints(
                &calendar,
                sprints.races(),
                &constructor_id,
                today,
            ),
            livery: livery_slug(&constructor_id),
            constructor_id,
        })
    }
}
