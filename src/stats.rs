//! Derived season statistics
//!
//! Aggregates wins, podiums, poles, top finishes, points and mechanical
//! retirements for one driver or constructor from a season's result rows.
//! Only races already run count: the calendar is walked in round order and
//! the walk stops at the first race dated after `today`.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

use crate::data::{Race, ResultRow};

/// Status fragments meaning the car was classified, or removed by stewards
const FINISH_MARKERS: &[&str] = &["finished", "lap", "disqualified", "excluded"];

/// Retirement causes that are not the car's fault
const NON_MECHANICAL_CAUSES: &[&str] = &[
    "accident",
    "collision",
    "spin",
    "crash",
    "contact",
    "black flag",
    "illegal",
    "time penalty",
    "did not qualify",
    "not classified",
    "injury",
    "illness",
    "withdrew",
];

/// Retirement causes attributed to the car
const MECHANICAL_CAUSES: &[&str] = &[
    "retired",
    "mechanical",
    "engine",
    "power unit",
    "gearbox",
    "hydraul",
    "electrical",
    "suspension",
    "brake",
    "clutch",
    "driveshaft",
    "exhaust",
    "fuel",
    "oil",
    "overheating",
    "steering",
    "battery",
    "radiator",
    "turbo",
    "ers",
    "ignition",
    "water pressure",
    "throttle",
    "wheel",
    "puncture",
    "tyre",
    "cooling",
];

/// Classifies a result as a mechanical retirement
///
/// Free-text heuristic over the upstream status: a classified finish, a
/// disqualification or a non-mechanical cause is never mechanical; otherwise
/// a retired position marker (`"R"`) or a mechanical keyword is.
pub fn is_mechanical_dnf(status: &str, position_text: Option<&str>) -> bool {
    let status = status.trim().to_lowercase();
    let position_text = position_text.unwrap_or("").trim();

    if contains_any(&status, FINISH_MARKERS) || contains_any(&status, NON_MECHANICAL_CAUSES) {
        return false;
    }

    position_text.eq_ignore_ascii_case("r") || contains_any(&status, MECHANICAL_CAUSES)
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

/// Which result rows of a race to read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Session {
    GrandPrix,
    Sprint,
}

impl Session {
    pub fn rows(self, race: &Race) -> &[ResultRow] {
        match self {
            Session::GrandPrix => &race.results,
            Session::Sprint => &race.sprint_results,
        }
    }
}

/// The parts of one result that the tallies count
#[derive(Debug, Clone, Copy)]
struct Finish {
    position: Option<u32>,
    grid: Option<u32>,
    points: f64,
    mechanical_dnf: bool,
}

impl Finish {
    fn within(self, places: u32) -> bool {
        self.position.is_some_and(|p| (1..=places).contains(&p))
    }
}

impl From<&ResultRow> for Finish {
    fn from(row: &ResultRow) -> Self {
        Self {
            position: row.position,
            grid: row.grid,
            points: row.points,
            mechanical_dnf: is_mechanical_dnf(&row.status, Some(&row.position_text)),
        }
    }
}

impl From<&RaceLine> for Finish {
    fn from(line: &RaceLine) -> Self {
        Self {
            position: line.position,
            grid: line.grid,
            points: line.points,
            mechanical_dnf: line.is_mechanical_dnf(),
        }
    }
}

/// Grand prix aggregates for a season
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RaceTally {
    pub entered: u32,
    pub points: f64,
    pub wins: u32,
    pub podiums: u32,
    pub poles: u32,
    pub top10: u32,
    pub mechanical_dnfs: u32,
}

impl RaceTally {
    /// Adds one row's contribution; `entered` is counted per race by callers
    pub fn record(&mut self, row: &ResultRow) {
        self.count(row.into());
    }

    /// Adds one race line, which is always a race entered
    pub fn record_line(&mut self, line: &RaceLine) {
        self.entered += 1;
        self.count(line.into());
    }

    fn count(&mut self, finish: Finish) {
        self.points += finish.points;
        if finish.position == Some(1) {
            self.wins += 1;
        }
        if finish.within(3) {
            self.podiums += 1;
        }
        if finish.grid == Some(1) {
            self.poles += 1;
        }
        if finish.within(10) {
            self.top10 += 1;
        }
        if finish.mechanical_dnf {
            self.mechanical_dnfs += 1;
        }
    }
}

/// Sprint aggregates for a season
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SprintTally {
    pub entered: u32,
    pub points: f64,
    pub wins: u32,
    pub podiums: u32,
    pub top8: u32,
}

impl SprintTally {
    pub fn record(&mut self, row: &ResultRow) {
        self.count(row.into());
    }

    pub fn record_line(&mut self, line: &RaceLine) {
        self.entered += 1;
        self.count(line.into());
    }

    fn count(&mut self, finish: Finish) {
        self.points += finish.points;
        if finish.position == Some(1) {
            self.wins += 1;
        }
        if finish.within(3) {
            self.podiums += 1;
        }
        if finish.within(8) {
            self.top8 += 1;
        }
    }
}

/// A driver's outcome in one completed race
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RaceLine {
    pub round: u32,
    pub date: Option<NaiveDate>,
    pub race_name: String,
    pub country: String,
    pub circuit: String,
    pub position: Option<u32>,
    pub position_text: String,
    pub grid: Option<u32>,
    pub points: f64,
    pub status: String,
    pub time: Option<String>,
}

impl RaceLine {
    fn new(race: &Race, row: &ResultRow) -> Self {
        Self {
            round: race.round,
            date: race.date,
            race_name: race.name.clone(),
            country: race.circuit.location.country.clone(),
            circuit: race.circuit.circuit_name.clone(),
            position: row.position,
            position_text: row.position_text.clone(),
            grid: row.grid,
            points: row.points,
            status: row.status.clone(),
            time: row.time_text().map(str::to_string),
        }
    }

    pub fn is_mechanical_dnf(&self) -> bool {
        is_mechanical_dnf(&self.status, Some(&self.position_text))
    }
}

/// Calendar races run on or before `today`, in round order
///
/// Stops at the first race that is undated or in the future; later rounds are
/// assumed to be later in the year.
pub fn completed_races(calendar: &[Race], today: NaiveDate) -> Vec<&Race> {
    let mut ordered: Vec<&Race> = calendar.iter().collect();
    ordered.sort_by_key(|race| race.round);
    ordered
        .into_iter()
        .take_while(|race| race.is_completed(today))
        .collect()
}

fn by_round(results: &[Race]) -> HashMap<u32, &Race> {
    results.iter().map(|race| (race.round, race)).collect()
}

/// The driver's row for every completed race they took part in
pub fn driver_race_lines(
    calendar: &[Race],
    results: &[Race],
    session: Session,
    driver_id: &str,
    today: NaiveDate,
) -> Vec<RaceLine> {
    let results = by_round(results);
    completed_races(calendar, today)
        .into_iter()
        .filter_map(|scheduled| {
            let race = results.get(&scheduled.round)?;
            let row = session
                .rows(race)
                .iter()
                .find(|row| row.driver.matches_id(driver_id))?;
            Some(RaceLine::new(scheduled, row))
        })
        .collect()
}

/// Grand prix tally from a driver's race lines
pub fn tally_driver_races(lines: &[RaceLine]) -> RaceTally {
    lines.iter().fold(RaceTally::default(), |mut tally, line| {
        tally.record_line(line);
        tally
    })
}

/// Sprint tally from a driver's sprint lines
pub fn tally_driver_sprints(lines: &[RaceLine]) -> SprintTally {
    lines.iter().fold(SprintTally::default(), |mut tally, line| {
        tally.record_line(line);
        tally
    })
}

/// Rows belonging to `constructor_id` in each completed race it entered
fn constructor_rows<'a>(
    calendar: &[Race],
    results: &'a [Race],
    session: Session,
    constructor_id: &'a str,
    today: NaiveDate,
) -> Vec<Vec<&'a ResultRow>> {
    let results = by_round(results);
    completed_races(calendar, today)
        .into_iter()
        .filter_map(|scheduled| results.get(&scheduled.round).copied())
        .map(|race| {
            session
                .rows(race)
                .iter()
                .filter(|row| row.constructor.matches_id(constructor_id))
                .collect::<Vec<_>>()
        })
        .filter(|rows| !rows.is_empty())
        .collect()
}

/// Grand prix tally over every car a constructor ran
pub fn tally_constructor_races(
    calendar: &[Race],
    results: &[Race],
    constructor_id: &str,
    today: NaiveDate,
) -> RaceTally {
    let mut tally = RaceTally::default();
    for rows in constructor_rows(calendar, results, Session::GrandPrix, constructor_id, today) {
        tally.entered += 1;
        rows.into_iter().for_each(|row| tally.record(row));
    }
    tally
}

/// Sprint tally over every car a constructor ran
pub fn tally_constructor_sprints(
    calendar: &[Race],
    results: &[Race],
    constructor_id: &str,
    today: NaiveDate,
) -> SprintTally {
    let mut tally = SprintTally::default();
    for rows in constructor_rows(calendar, results, Session::Sprint, constructor_id, today) {
        tally.entered += 1;
        rows.into_iter().for_each(|row| tally.record(row));
    }
    tally
}

/// The last `n` lines, most recent first
pub fn most_recent(lines: &[RaceLine], n: usize) -> Vec<RaceLine> {
    lines.iter().rev().take(n).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Constructor, Driver};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn race(round: u32, date: NaiveDate) -> Race {
        Race {
            season: "2024".to_string(),
            round,
            name: format!("Round {} Grand Prix", round),
            date: Some(date),
            ..Default::default()
        }
    }

    fn row(driver: &str, team: &str, position: u32, grid: u32, points: f64, status: &str) -> ResultRow {
        let position_text = if status == "Finished" || status.starts_with('+') {
            position.to_string()
        } else {
            "R".to_string()
        };
        ResultRow {
            position: Some(position),
            position_text,
            points,
            grid: Some(grid),
            status: status.to_string(),
            driver: Driver {
                driver_id: driver.to_string(),
                ..Default::default()
            },
            constructor: Constructor {
                constructor_id: team.to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn with_results(mut race: Race, rows: Vec<ResultRow>) -> Race {
        race.results = rows;
        race
    }

    /// Three completed rounds and two in the future
    fn season() -> (Vec<Race>, Vec<Race>, NaiveDate) {
        let today = day(2024, 4, 1);
        let calendar = vec![
            race(1, day(2024, 3, 2)),
            race(2, day(2024, 3, 9)),
            race(3, day(2024, 3, 24)),
            race(4, day(2024, 4, 7)),
            race(5, day(2024, 4, 21)),
        ];
        let results = vec![
            with_results(
                calendar[0].clone(),
                vec![
                    row("ham", "merc", 1, 1, 25.0, "Finished"),
                    row("rus", "merc", 4, 3, 12.0, "Finished"),
                ],
            ),
            with_results(
                calendar[1].clone(),
                vec![
                    row("ham", "merc", 3, 2, 15.0, "Finished"),
                    row("rus", "merc", 18, 6, 0.0, "Collision"),
                ],
            ),
            with_results(
                calendar[2].clone(),
                vec![
                    row("ham", "merc", 17, 4, 0.0, "Gearbox"),
                    row("rus", "merc", 2, 1, 18.0, "Finished"),
                ],
            ),
            // Results present for a future date must still be ignored
            with_results(
                calendar[3].clone(),
                vec![row("ham", "merc", 1, 1, 25.0, "Finished")],
            ),
        ];
        (calendar, results, today)
    }

    #[test]
    fn test_classifier_reference_cases() {
        assert!(!is_mechanical_dnf("Accident", Some("R")));
        assert!(is_mechanical_dnf("Retired", Some("R")));
        assert!(!is_mechanical_dnf("Finished", None));
        assert!(is_mechanical_dnf("Gearbox", Some("R")));
        assert!(!is_mechanical_dnf("Disqualified", None));
    }

    #[test]
    fn test_classifier_lap_count_is_a_finish() {
        assert!(!is_mechanical_dnf("+1 Lap", Some("12")));
        assert!(!is_mechanical_dnf("+3 Laps", Some("R")));
    }

    #[test]
    fn test_classifier_keyword_without_retired_marker() {
        assert!(is_mechanical_dnf("Power Unit", Some("19")));
        assert!(is_mechanical_dnf("Hydraulics", None));
        assert!(is_mechanical_dnf("  ENGINE ", Some("")));
    }

    #[test]
    fn test_classifier_non_mechanical_wins_over_marker() {
        assert!(!is_mechanical_dnf("Collision damage", Some("R")));
        assert!(!is_mechanical_dnf("Withdrew", Some("W")));
        assert!(!is_mechanical_dnf("Excluded", Some("E")));
    }

    #[test]
    fn test_classifier_unknown_status_is_not_mechanical() {
        assert!(!is_mechanical_dnf("Did not start", Some("W")));
        assert!(!is_mechanical_dnf("", None));
    }

    #[test]
    fn test_completed_races_stop_at_first_future_race() {
        let (calendar, _, today) = season();
        let rounds: Vec<u32> = completed_races(&calendar, today)
            .iter()
            .map(|r| r.round)
            .collect();
        assert_eq!(rounds, vec![1, 2, 3]);
    }

    #[test]
    fn test_completed_races_orders_by_round() {
        let calendar = vec![race(2, day(2024, 3, 9)), race(1, day(2024, 3, 2))];
        let rounds: Vec<u32> = completed_races(&calendar, day(2024, 12, 31))
            .iter()
            .map(|r| r.round)
            .collect();
        assert_eq!(rounds, vec![1, 2]);
    }

    #[test]
    fn test_undated_race_ends_the_window() {
        let mut calendar = vec![race(1, day(2024, 3, 2)), race(2, day(2024, 3, 9))];
        calendar[0].date = None;
        assert!(completed_races(&calendar, day(2024, 12, 31)).is_empty());
    }

    #[test]
    fn test_driver_season_end_to_end() {
        let (calendar, results, today) = season();

        let lines = driver_race_lines(&calendar, &results, Session::GrandPrix, "HAM", today);
        let tally = tally_driver_races(&lines);

        assert_eq!(tally.entered, 3);
        assert_eq!(tally.wins, 1);
        assert_eq!(tally.podiums, 2);
        assert_eq!(tally.mechanical_dnfs, 1);
        assert_eq!(tally.poles, 1);
        assert_eq!(tally.top10, 2);
        assert!((tally.points - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_line_and_row_tallies_agree() {
        let (calendar, results, today) = season();
        let lines = driver_race_lines(&calendar, &results, Session::GrandPrix, "ham", today);

        let mut from_rows = RaceTally::default();
        let mut sprint_rows = SprintTally::default();
        for race in &results[..3] {
            let row = &race.results[0];
            from_rows.entered += 1;
            from_rows.record(row);
            sprint_rows.entered += 1;
            sprint_rows.record(row);
        }

        assert_eq!(tally_driver_races(&lines), from_rows);
        assert_eq!(tally_driver_sprints(&lines), sprint_rows);
    }

    #[test]
    fn test_future_race_never_contributes() {
        let (calendar, results, _) = season();
        let before_round_one = day(2024, 3, 1);

        let lines = driver_race_lines(&calendar, &results, Session::GrandPrix, "ham", before_round_one);
        assert!(lines.is_empty());
        assert_eq!(tally_driver_races(&lines), RaceTally::default());
    }

    #[test]
    fn test_fractional_points_are_summed() {
        let today = day(2024, 12, 31);
        let calendar = vec![race(1, day(2024, 3, 2)), race(2, day(2024, 3, 9)), race(3, day(2024, 3, 24))];
        let results: Vec<Race> = calendar
            .iter()
            .cloned()
            .zip([25.0, 18.0, 15.5])
            .map(|(r, pts)| with_results(r, vec![row("ver", "rbr", 2, 2, pts, "Finished")]))
            .collect();

        let lines = driver_race_lines(&calendar, &results, Session::GrandPrix, "ver", today);
        assert!((tally_driver_races(&lines).points - 58.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_race_lines_carry_race_details() {
        let (calendar, results, today) = season();
        let lines = driver_race_lines(&calendar, &results, Session::GrandPrix, "ham", today);

        assert_eq!(lines[2].round, 3);
        assert_eq!(lines[2].status, "Gearbox");
        assert_eq!(lines[2].position_text, "R");
        assert!(lines[2].is_mechanical_dnf());
    }

    #[test]
    fn test_most_recent_is_reversed() {
        let (calendar, results, today) = season();
        let lines = driver_race_lines(&calendar, &results, Session::GrandPrix, "ham", today);

        let recent: Vec<u32> = most_recent(&lines, 2).iter().map(|l| l.round).collect();
        assert_eq!(recent, vec![3, 2]);
        assert_eq!(most_recent(&lines, 5).len(), 3);
    }

    #[test]
    fn test_constructor_tally_counts_both_cars() {
        let (calendar, results, today) = season();

        let tally = tally_constructor_races(&calendar, &results, "MERC", today);

        assert_eq!(tally.entered, 3);
        assert_eq!(tally.wins, 1);
        assert_eq!(tally.podiums, 3);
        assert_eq!(tally.poles, 2);
        assert_eq!(tally.top10, 4);
        assert_eq!(tally.mechanical_dnfs, 1);
        assert!((tally.points - 70.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_constructor_without_rows_has_empty_tally() {
        let (calendar, results, today) = season();
        assert_eq!(
            tally_constructor_races(&calendar, &results, "ferrari", today),
            RaceTally::default()
        );
    }

    #[test]
    fn test_sprint_tallies() {
        let today = day(2024, 12, 31);
        let calendar = vec![race(1, day(2024, 4, 20)), race(2, day(2024, 5, 4))];
        let mut sprint_one = calendar[0].clone();
        sprint_one.sprint_results = vec![
            row("nor", "mcl", 1, 1, 8.0, "Finished"),
            row("pia", "mcl", 7, 5, 2.0, "Finished"),
        ];
        let mut sprint_two = calendar[1].clone();
        sprint_two.sprint_results = vec![row("nor", "mcl", 9, 3, 0.0, "Finished")];
        let results = vec![sprint_one, sprint_two];

        let lines = driver_race_lines(&calendar, &results, Session::Sprint, "nor", today);
        let driver = tally_driver_sprints(&lines);
        assert_eq!(driver.entered, 2);
        assert_eq!(driver.wins, 1);
        assert_eq!(driver.top8, 1);
        assert!((driver.points - 8.0).abs() < f64::EPSILON);

        let team = tally_constructor_sprints(&calendar, &results, "mcl", today);
        assert_eq!(team.entered, 2);
        assert_eq!(team.podiums, 1);
        assert_eq!(team.top8, 2);
        assert!((team.points - 10.0).abs() < f64::EPSILON);
    }
}
