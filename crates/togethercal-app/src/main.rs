//! Operator binary: imports a holiday feed into an in-memory store, then
//! renders the requested month grid and day view, optionally writing an
//! ICS feed for the displayed month.

use std::env;
use std::process;

use chrono::{Datelike, Days, NaiveDate};
use getopts::Options;
use tracing_subscriber::EnvFilter;

use togethercal_core::config::load_config;
use togethercal_service::import;
use togethercal_service::month_grid::MonthGrid;
use togethercal_service::ordering::{self, ResolvedOccurrence};
use togethercal_service::recurrence::RecurrenceEngine;
use togethercal_store::MemoryStore;

struct Args {
    url: String,
    month: Option<(i32, u32)>,
    day_offset: Option<i64>,
    feed_path: Option<String>,
    json: bool,
    ignore_past: bool,
}

fn opts() -> Options {
    let mut opts = Options::new();
    opts.optflag(
        "h",
        "help",
        concat!("Print the help output of ", env!("CARGO_PKG_NAME")),
    );
    opts.optopt(
        "m",
        "month",
        "Month to render as YYYY-MM [Default: the current month]",
        "YYYY-MM",
    );
    opts.optopt(
        "d",
        "day-offset",
        "Also print the day view for today plus this many days",
        "DAYS",
    );
    opts.optopt(
        "f",
        "feed",
        "Write an ICS feed for the rendered month to this file",
        "FILE",
    );
    opts.optflag("j", "json", "Print the month grid as JSON instead of text");
    opts.optflag("p", "ignore-past", "Skip feed events that already ended");
    opts
}

fn parse_args(args: Vec<String>) -> Args {
    let opts = opts();

    let matches = match opts.parse(args) {
        Ok(matches) => matches,
        Err(fail) => {
            eprintln!("{fail}");
            process::exit(1);
        }
    };

    if matches.opt_present("help") || matches.free.is_empty() {
        println!(
            "{}",
            opts.usage(&format!(
                "Usage: {} [options] <holiday-feed-url>",
                env!("CARGO_PKG_NAME")
            ))
        );
        process::exit(i32::from(matches.free.is_empty()));
    }

    let month = matches.opt_str("month").map(|value| {
        match parse_month(&value) {
            Some(month) => month,
            None => {
                eprintln!("Provided value for option 'month' is invalid: {value}");
                process::exit(1);
            }
        }
    });

    let day_offset = matches.opt_str("day-offset").map(|value| {
        match value.parse::<i64>() {
            Ok(offset) => offset,
            Err(err) => {
                eprintln!("Provided value for option 'day-offset' is invalid: {err}");
                process::exit(1);
            }
        }
    });

    Args {
        url: matches.free[0].clone(),
        month,
        day_offset,
        feed_path: matches.opt_str("feed"),
        json: matches.opt_present("json"),
        ignore_past: matches.opt_present("ignore-past"),
    }
}

fn parse_month(value: &str) -> Option<(i32, u32)> {
    let (year, month) = value.split_once('-')?;
    let year = year.parse::<i32>().ok()?;
    let month = month.parse::<u32>().ok()?;
    (1..=12).contains(&month).then_some((year, month))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(config.logging.level.as_str())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = parse_args(env::args().skip(1).collect());

    let today = chrono::Local::now().date_naive();
    let (year, month) = args
        .month
        .unwrap_or((today.year(), today.month()));

    let store = MemoryStore::new();
    let engine = RecurrenceEngine::new(config.calendar.horizon_years);

    let stats =
        import::fetch_and_import(&store, &engine, &args.url, today, args.ignore_past).await?;
    tracing::info!(
        created = stats.created,
        updated = stats.updated,
        skipped = stats.skipped,
        "holiday feed imported"
    );

    let grid = MonthGrid::build(
        &store,
        year,
        month,
        today,
        config.calendar.first_weekday()?,
        &config.feed.default_icon,
    )?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&grid)?);
    } else {
        print!("{}", render_grid(&grid));
    }

    if let Some(offset) = args.day_offset {
        let day = shifted(today, offset);
        let view = ordering::day_view(&store, day)?;
        print!("{}", render_day(day, &view));
    }

    if let Some(path) = &args.feed_path {
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| anyhow::anyhow!("no such month: {year}-{month}"))?;
        let last = togethercal_service::month_grid::last_day_of_month(first);
        let feed = togethercal_service::feed::build_feed(&store, first, last)?;
        std::fs::write(path, feed.to_string())?;
        tracing::info!(path, "feed written");
    }

    Ok(())
}

fn shifted(today: NaiveDate, offset: i64) -> NaiveDate {
    let days = Days::new(offset.unsigned_abs());
    let shifted = if offset >= 0 {
        today.checked_add_days(days)
    } else {
        today.checked_sub_days(days)
    };
    shifted.unwrap_or(today)
}

fn render_grid(grid: &MonthGrid) -> String {
    let mut out = format!("{:>4}-{:02}\n", grid.year, grid.month);
    for week in &grid.weeks {
        for cell in week {
            match cell {
                Some(cell) => {
                    let marker = if cell.is_today {
                        '*'
                    } else if cell.is_holiday {
                        '!'
                    } else {
                        ' '
                    };
                    out.push_str(&format!("{:>3}{marker}", cell.day));
                }
                None => out.push_str("    "),
            }
        }
        out.push('\n');
        for cell in week.iter().flatten() {
            for entry in &cell.entries {
                out.push_str(&format!("  {:>2}: {}\n", cell.day, entry.title));
            }
        }
    }
    out
}

fn render_day(day: NaiveDate, view: &[ResolvedOccurrence]) -> String {
    let mut out = format!("{day}\n");
    if view.is_empty() {
        out.push_str("  (nothing scheduled)\n");
        return out;
    }
    for resolved in view {
        let span = match resolved.hours() {
            (Some(start), Some(end)) => format!("{}-{}", start.format("%H:%M"), end.format("%H:%M")),
            (Some(start), None) => format!("{}-", start.format("%H:%M")),
            (None, Some(end)) => format!("-{}", end.format("%H:%M")),
            (None, None) => "all day".to_string(),
        };
        out.push_str(&format!(
            "  [{}] {} ({span})\n",
            resolved.kind(),
            resolved.title()
        ));
    }
    out
}
