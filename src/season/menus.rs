//! Roster menus, API health and year resolution

use serde::Serialize;

use super::{SeasonError, SeasonService};
use crate::api::{with_query, Collection, Resource};

/// Shown when the health probe fails
pub const DEGRADED_ADVISORY: &str = "Live F1 data is currently slow or unreachable. \
Some stats may be missing or out of date. Please try again in a few minutes.";

/// Earliest championship season
const FIRST_SEASON: u16 = 1950;

/// One entry of the drivers or constructors roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuEntry {
    pub id: String,
    pub label: String,
    pub image: String,
}

/// Outcome of the API health probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ApiHealth {
    pub healthy: bool,
}

impl ApiHealth {
    /// Message to show the user, if any
    pub fn advisory(&self) -> Option<&'static str> {
        if self.healthy {
            None
        } else {
            Some(DEGRADED_ADVISORY)
        }
    }
}

impl SeasonService {
    /// Season drivers, sorted by family name, labelled "Family, Given"
    pub async fn drivers_menu(&self, year: u16) -> Result<Vec<MenuEntry>, SeasonError> {
        self.drivers_menu
            .get_or_try_insert_with(year, || async move {
                let data = self
                    .loader
                    .load(&Collection::season(Resource::Drivers), year)
                    .await?;
                let mut drivers = data.drivers().to_vec();
                drivers.sort_by_key(|d| (d.family_name.to_lowercase(), d.given_name.to_lowercase()));
                Ok::<_, SeasonError>(drivers
                    .into_iter()
                    .map(|d| MenuEntry {
                        label: format!("{}, {}", d.family_name, d.given_name)
                            .trim_matches(|c| c == ',' || c == ' ')
                            .to_string(),
                        image: d.image_slug(),
                        id: d.driver_id,
                    })
                    .collect())
            })
            .await
    }

    /// Season constructors, sorted by name
    pub async fn constructors_menu(&self, year: u16) -> Result<Vec<MenuEntry>, SeasonError> {
        self.constructors_menu
            .get_or_try_insert_with(year, || async move {
                let data = self
                    .loader
                    .load(&Collection::season(Resource::Constructors), year)
                    .await?;
                let mut constructors = data.constructors().to_vec();
                constructors.sort_by_key(|c| c.name.to_lowercase());
                Ok::<_, SeasonError>(constructors
                    .into_iter()
                    .map(|c| MenuEntry {
                        image: c.image_slug(),
                        label: c.name,
                        id: c.constructor_id,
                    })
                    .collect())
            })
            .await
    }

    /// Probes the API with a short timeout; the verdict is cached briefly
    pub async fn api_health(&self) -> ApiHealth {
        let healthy = self
            .health
            .get_or_try_insert_with((), || async move {
                let url = with_query(&self.endpoints.seasons(), &[("limit", 1)]);
                let probe = self.client.with_timeout(self.health_timeout);
                let envelope = probe.fetch_envelope(&url).await;
                let healthy = envelope.mr_data.total > 0;
                if !healthy {
                    tracing::warn!(url = %url, "API health probe failed");
                }
                Ok::<_, std::convert::Infallible>(healthy)
            })
            .await
            .unwrap_or(false);
        ApiHealth { healthy }
    }
}

/// Parses a season from user input
///
/// Anything unparsable or outside 1950 through next year falls back to
/// `current`.
pub fn resolve_year(input: &str, current: u16) -> u16 {
    match input.trim().parse::<u16>() {
        Ok(year) if (FIRST_SEASON..=current.saturating_add(1)).contains(&year) => year,
        _ => current,
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::api::transport::fake::ScriptedTransport;
    use std::sync::Arc;

    #[test]
    fn test_resolve_year() {
        assert_eq!(resolve_year("2008", 2025), 2008);
        assert_eq!(resolve_year(" 1950 ", 2025), 1950);
        assert_eq!(resolve_year("2026", 2025), 2026);
        assert_eq!(resolve_year("2027", 2025), 2025);
        assert_eq!(resolve_year("1949", 2025), 2025);
        assert_eq!(resolve_year("abc", 2025), 2025);
        assert_eq!(resolve_year("", 2025), 2025);
    }

    #[tokio::test]
    async fn test_drivers_menu_sorted_by_family_name() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.json(
            &collection_url(2024, "drivers"),
            r#"{"MRData": {"total": "3", "DriverTable": {"Drivers": [
                {"driverId": "verstappen", "givenName": "Max", "familyName": "Verstappen"},
                {"driverId": "albon", "givenName": "Alexander", "familyName": "Albon"},
                {"driverId": "norris", "givenName": "Lando", "familyName": "Norris"}]}}}"#,
        );
        let service = service(transport.clone());

        let menu = service.drivers_menu(2024).await.unwrap();

        let labels: Vec<&str> = menu.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["Albon, Alexander", "Norris, Lando", "Verstappen, Max"]);
        assert_eq!(menu[0].image, "albon-alexander.png");

        service.drivers_menu(2024).await.unwrap();
        assert_eq!(transport.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_constructors_menu_sorted_by_name() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.json(
            &collection_url(2024, "constructors"),
            r#"{"MRData": {"total": "2", "ConstructorTable": {"Constructors": [
                {"constructorId": "red_bull", "name": "Red Bull"},
                {"constructorId": "aston_martin", "name": "Aston Martin"}]}}}"#,
        );

        let menu = service(transport).constructors_menu(2024).await.unwrap();

        assert_eq!(menu[0].id, "aston_martin");
        assert_eq!(menu[0].image, "aston-martin.png");
        assert_eq!(menu[1].label, "Red Bull");
    }

    #[tokio::test]
    async fn test_health_probe_is_cached() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.json(
            &format!("{}/seasons/?limit=1", ROOT),
            r#"{"MRData": {"total": "76", "SeasonTable": {"Seasons": [{"season": "1950"}]}}}"#,
        );
        let service = service(transport.clone());

        let health = service.api_health().await;
        assert!(health.healthy);
        assert_eq!(health.advisory(), None);

        service.api_health().await;
        assert_eq!(transport.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_unreachable_api_is_degraded() {
        let transport = Arc::new(ScriptedTransport::new());

        let health = service(transport).api_health().await;

        assert!(!health.healthy);
        assert_eq!(health.advisory(), Some(DEGRADED_ADVISORY));
    }
}
