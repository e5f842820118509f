//! Pitwall - Formula 1 schedules, standings and season statistics
//!
//! A command-line tool that aggregates season data from the Jolpica
//! (Ergast-compatible) F1 API and prints it as text or JSON.

use std::error::Error;
use std::process::ExitCode;
use std::sync::Arc;

use chrono::{Datelike, Local, NaiveDate};
use clap::Parser;
use serde::Serialize;

use pitwall::api::{ApiClient, ReqwestTransport, RSS_ACCEPT};
use pitwall::cli::{Championship, Cli, Command};
use pitwall::config::Config;
use pitwall::logging;
use pitwall::news::{driver_query, team_query, NewsClient};
use pitwall::output;
use pitwall::season::{self, SeasonService};

/// Prints `value` as pretty JSON or through its text renderer
fn emit<T: Serialize>(
    json: bool,
    value: &T,
    render: impl FnOnce(&T) -> String,
) -> Result<(), Box<dyn Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", render(value));
    }
    Ok(())
}

/// Everything a command needs besides its own arguments
struct Context {
    service: SeasonService,
    news: NewsClient,
    config: Config,
    today: NaiveDate,
    current_year: u16,
    json: bool,
}

impl Context {
    fn year(&self, year: Option<u16>) -> u16 {
        year.unwrap_or(self.current_year)
    }

    async fn headlines(&self, query: &str) -> Result<(), Box<dyn Error>> {
        let articles = self.news.headlines(query, self.config.news.limit).await;
        emit(self.json, &articles, |a| {
            format!("\n{}", output::render_news(query, a))
        })
    }
}

async fn run(ctx: &Context, command: Command) -> Result<(), Box<dyn Error>> {
    match command {
        Command::Schedule { year, recent } => {
            let year = ctx.year(year);
            if recent {
                let races = ctx.service.recent_races(year, ctx.today).await?;
                emit(ctx.json, &races, |r| output::render_schedule(year, r))
            } else {
                let races = ctx.service.schedule(year).await?;
                emit(ctx.json, &races, |r| output::render_schedule(year, r))
            }
        }
        Command::Results { year } => {
            let year = season::resolve_year(&year, ctx.current_year);
            let results = ctx.service.season_results(year, ctx.today).await?;
            emit(ctx.json, &results, output::render_season_results)
        }
        Command::Standings { championship, year } => {
            let year = ctx.year(year);
            match championship {
                Championship::Drivers => {
                    let list = ctx.service.driver_standings(year).await?;
                    emit(ctx.json, &list, |l| output::render_driver_standings(year, l))
                }
                Championship::Constructors => {
                    let list = ctx.service.constructor_standings(year).await?;
                    emit(ctx.json, &list, |l| {
                        output::render_constructor_standings(year, l)
                    })
                }
                Championship::Both => {
                    let overview = ctx.service.year_overview(year).await?;
                    emit(ctx.json, &overview, output::render_year_overview)
                }
            }
        }
        Command::Sessions { year, round } => {
            let kinds = ctx.service.sessions(year, round).await;
            emit(ctx.json, &kinds, |k| output::render_sessions(year, round, k))
        }
        Command::Session { year, round, kind } => {
            let report = ctx.service.session(year, round, kind).await?;
            emit(ctx.json, &report, output::render_session)
        }
        Command::Driver { id, year, news } => {
            let profile = ctx
                .service
                .driver_profile(ctx.year(year), &id, ctx.today)
                .await?;
            emit(ctx.json, &profile, output::render_driver_profile)?;
            if news {
                let query = driver_query(
                    &profile.driver.given_name,
                    &profile.driver.family_name,
                    profile.constructor.as_deref(),
                );
                ctx.headlines(&query).await?;
            }
            Ok(())
        }
        Command::Constructor { id, year, news } => {
            let profile = ctx
                .service
                .constructor_profile(ctx.year(year), &id, ctx.today)
                .await?;
            emit(ctx.json, &profile, output::render_constructor_profile)?;
            if news {
                ctx.headlines(&team_query(&profile.name)).await?;
            }
            Ok(())
        }
        Command::Drivers { year } => {
            let year = ctx.year(year);
            let menu = ctx.service.drivers_menu(year).await?;
            emit(ctx.json, &menu, |m| {
                output::render_menu(&format!("{} Drivers", year), m)
            })
        }
        Command::Teams { year } => {
            let year = ctx.year(year);
            let menu = ctx.service.constructors_menu(year).await?;
            emit(ctx.json, &menu, |m| {
                output::render_menu(&format!("{} Constructors", year), m)
            })
        }
        Command::Health => {
            let health = ctx.service.api_health().await;
            emit(ctx.json, &health, |h| {
                h.advisory()
                    .unwrap_or("F1 API is reachable.")
                    .to_string()
            })
        }
        Command::News { query, limit } => {
            let limit = limit.unwrap_or(ctx.config.news.limit);
            let articles = ctx.news.headlines(&query, limit).await;
            emit(ctx.json, &articles, |a| output::render_news(&query, a))
        }
    }
}

async fn start(cli: Cli) -> Result<(), Box<dyn Error>> {
    logging::init()?;

    let config = Config::load(cli.config.as_deref())?;
    let client = ApiClient::new(&config.api)?;
    let feeds = ReqwestTransport::with_accept(RSS_ACCEPT)?;
    let news = NewsClient::new(Arc::new(feeds), config.news.clone());
    let service = SeasonService::new(client, &config);

    let today = Local::now().date_naive();
    let ctx = Context {
        service,
        news,
        today,
        current_year: u16::try_from(today.year())?,
        json: cli.json,
        config,
    };

    // Data commands warn up front when the API is degraded
    if !matches!(cli.command, Command::Health | Command::News { .. }) {
        if let Some(advisory) = ctx.service.api_health().await.advisory() {
            eprintln!("{}", advisory);
        }
    }

    run(&ctx, cli.command).await
}

#[tokio::main]
async fn main() -> ExitCode {
    match start(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}
