//! Plain-text rendering for terminal output
//!
//! Every renderer returns a `String` so output can be tested without a
//! terminal. `--json` bypasses this module entirely.

use chrono::NaiveDate;

use crate::data::{Race, StandingsList};
use crate::news::Article;
use crate::season::{
    ConstructorProfile, DriverProfile, MenuEntry, SeasonResults, SessionKind, SessionReport,
    YearOverview,
};
use crate::stats::{RaceLine, RaceTally, SprintTally};

/// Points without a trailing `.0`, e.g. `40` or `58.5`
pub fn format_points(points: f64) -> String {
    if points.fract() == 0.0 {
        format!("{:.0}", points)
    } else {
        format!("{}", points)
    }
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%a %d %b %Y").to_string())
        .unwrap_or_else(|| "TBC".to_string())
}

fn format_position(position: Option<u32>, text: &str) -> String {
    match position {
        Some(p) => p.to_string(),
        None if !text.is_empty() => text.to_string(),
        None => "-".to_string(),
    }
}

fn heading(title: &str) -> Vec<String> {
    vec![title.to_string(), "=".repeat(title.chars().count())]
}

/// Season calendar, one line per round
pub fn render_schedule(year: u16, races: &[Race]) -> String {
    let mut lines = heading(&format!("{} Calendar", year));
    for race in races {
        lines.push(format!(
            "{:>2}  {:<16} {:<28} {}",
            race.round,
            format_date(race.date),
            race.name,
            race.circuit.location.country
        ));
    }
    lines.join("\n")
}

/// Every completed round so far
pub fn render_season_results(results: &SeasonResults) -> String {
    let mut lines = heading(&format!(
        "{} Results ({} of {} rounds)",
        results.year, results.completed_rounds, results.total_rounds
    ));
    if results.races.is_empty() {
        lines.push("No races completed yet.".to_string());
    }
    for race in &results.races {
        lines.push(format!(
            "{:>2}  {:<16} {}",
            race.round,
            format_date(race.date),
            race.name
        ));
    }
    lines.join("\n")
}

/// Drivers' championship table
pub fn render_driver_standings(year: u16, list: &StandingsList) -> String {
    let mut lines = heading(&format!("{} Drivers' Championship (after round {})", year, list.round));
    for standing in &list.driver_standings {
        lines.push(format!(
            "{:>3}  {:<24} {:<18} {:>6}  {} wins",
            format_position(standing.position, &standing.position_text),
            standing.driver.full_name(),
            standing.constructor_name().unwrap_or("-"),
            format_points(standing.points),
            standing.wins
        ));
    }
    lines.join("\n")
}

/// Constructors' championship table
pub fn render_constructor_standings(year: u16, list: &StandingsList) -> String {
    let mut lines = heading(&format!(
        "{} Constructors' Championship (after round {})",
        year, list.round
    ));
    for standing in &list.constructor_standings {
        lines.push(format!(
            "{:>3}  {:<24} {:>6}  {} wins",
            format_position(standing.position, &standing.position_text),
            standing.constructor.name,
            format_points(standing.points),
            standing.wins
        ));
    }
    lines.join("\n")
}

/// Top of both championships
pub fn render_year_overview(overview: &YearOverview) -> String {
    let drivers = StandingsList {
        round: overview.round,
        driver_standings: overview.drivers.clone(),
        ..Default::default()
    };
    let mut out = render_driver_standings(overview.year, &drivers);
    if overview.constructors.is_empty() {
        out.push_str("\n\nNo constructors' championship this season.");
    } else {
        let constructors = StandingsList {
            round: overview.round,
            constructor_standings: overview.constructors.clone(),
            ..Default::default()
        };
        out.push_str("\n\n");
        out.push_str(&render_constructor_standings(overview.year, &constructors));
    }
    out
}

/// Sessions available for a round
pub fn render_sessions(year: u16, round: u32, kinds: &[SessionKind]) -> String {
    let mut lines = heading(&format!("{} Round {} Sessions", year, round));
    if kinds.is_empty() {
        lines.push("No session data available.".to_string());
    }
    lines.extend(kinds.iter().map(|kind| format!("  {}", kind.label())));
    lines.join("\n")
}

/// One session's classification
pub fn render_session(report: &SessionReport) -> String {
    let race = &report.race;
    let mut lines = heading(&format!(
        "{} Round {}: {} {}",
        report.year, report.round, race.name, report.kind
    ));

    match report.kind {
        SessionKind::Race | SessionKind::Sprint => {
            let rows = if report.kind == SessionKind::Race {
                &race.results
            } else {
                &race.sprint_results
            };
            for row in rows {
                lines.push(format!(
                    "{:>3}  {:<24} {:<18} {:>4}  {}",
                    format_position(row.position, &row.position_text),
                    row.driver.full_name(),
                    row.constructor.name,
                    format_points(row.points),
                    row.time_text().unwrap_or(row.status.as_str())
                ));
            }
        }
        SessionKind::Qualifying => {
            for row in &race.qualifying_results {
                lines.push(format!(
                    "{:>3}  {:<24} {:<18} {}",
                    format_position(row.position, ""),
                    row.driver.full_name(),
                    row.constructor.name,
                    row.best_time().unwrap_or("-")
                ));
            }
        }
        SessionKind::PitStops => {
            for stop in &race.pit_stops {
                lines.push(format!(
                    "{:<20} lap {:>3}  stop {}  {}",
                    stop.driver_id, stop.lap, stop.stop, stop.duration
                ));
            }
        }
    }
    lines.join("\n")
}

fn race_tally_lines(tally: &RaceTally) -> Vec<String> {
    vec![
        format!(
            "  Grand Prix: {} entered, {} pts, {} wins, {} podiums, {} poles",
            tally.entered,
            format_points(tally.points),
            tally.wins,
            tally.podiums,
            tally.poles
        ),
        format!(
            "              {} top-10 finishes, {} mechanical DNFs",
            tally.top10, tally.mechanical_dnfs
        ),
    ]
}

fn sprint_tally_line(tally: &SprintTally) -> String {
    format!(
        "  Sprint:     {} entered, {} pts, {} wins, {} podiums, {} top-8",
        tally.entered,
        format_points(tally.points),
        tally.wins,
        tally.podiums,
        tally.top8
    )
}

fn championship_line(position: Option<u32>, points: Option<f64>) -> String {
    match (position, points) {
        (Some(p), Some(pts)) => format!("  Championship: P{} on {} pts", p, format_points(pts)),
        (None, Some(pts)) => format!("  Championship: {} pts", format_points(pts)),
        _ => "  Championship: not classified".to_string(),
    }
}

fn race_line(line: &RaceLine) -> String {
    format!(
        "  R{:<2} {:<28} P{:<3} {:>4} pts  {}{}",
        line.round,
        line.race_name,
        format_position(line.position, &line.position_text),
        format_points(line.points),
        line.status,
        if line.is_mechanical_dnf() { " (mechanical)" } else { "" }
    )
}

pub fn render_driver_profile(profile: &DriverProfile) -> String {
    let driver = &profile.driver;
    let mut lines = heading(&format!("{} ({})", driver.full_name(), profile.year));
    lines.push(format!(
        "  {} | {} | #{}",
        profile.constructor.as_deref().unwrap_or("-"),
        if driver.nationality.is_empty() { "-" } else { driver.nationality.as_str() },
        driver.permanent_number.as_deref().unwrap_or("-")
    ));
    lines.push(championship_line(
        profile.championship_position,
        profile.championship_points,
    ));
    lines.extend(race_tally_lines(&profile.grand_prix));
    lines.push(sprint_tally_line(&profile.sprint));
    if !profile.recent.is_empty() {
        lines.push(String::new());
        lines.push("Recent races".to_string());
        lines.extend(profile.recent.iter().map(race_line));
    }
    lines.join("\n")
}

pub fn render_constructor_profile(profile: &ConstructorProfile) -> String {
    let mut lines = heading(&format!("{} ({})", profile.name, profile.year));
    let drivers: Vec<String> = profile.drivers.iter().map(|d| d.full_name()).collect();
    lines.push(format!("  Drivers: {}", drivers.join(", ")));
    lines.push(championship_line(
        profile.championship_position,
        profile.championship_points,
    ));
    lines.extend(race_tally_lines(&profile.grand_prix));
    lines.push(sprint_tally_line(&profile.sprint));
    lines.join("\n")
}

/// Roster listing: id and label
pub fn render_menu(title: &str, entries: &[MenuEntry]) -> String {
    let mut lines = heading(title);
    let width = entries.iter().map(|e| e.id.len()).max().unwrap_or(0);
    lines.extend(
        entries
            .iter()
            .map(|e| format!("  {:<width$}  {}", e.id, e.label, width = width)),
    );
    lines.join("\n")
}

pub fn render_news(query: &str, articles: &[Article]) -> String {
    let mut lines = heading(&format!("News: {}", query));
    if articles.is_empty() {
        lines.push("No headlines available.".to_string());
    }
    for article in articles {
        let source = article
            .source
            .as_deref()
            .map(|s| format!(" ({})", s))
            .unwrap_or_default();
        lines.push(format!("- {}{}", article.title, source));
        lines.push(format!("  {}", article.url));
    }
    lines.join("\n")
}
