//! Race command

use colored::Colorize;

use crate::config::get_config;
use crate::errors::Result;
use crate::race::{RaceReport, run_race};

/// Run the first-access race and print the report
pub fn race(threads: Option<usize>, prefix: Option<String>, json: bool) -> Result<()> {
    let config = get_config();
    let threads = threads.unwrap_or(config.race.threads);
    let prefix = prefix.unwrap_or_else(|| config.race.prefix.clone());

    let report = run_race(threads, &prefix)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &RaceReport) {
    println!("{} {}", "Threads:".bold(), report.threads);

    let identical = if report.all_identical {
        "yes".green()
    } else {
        "no".red()
    };
    println!("{} {}", "Same instance:".bold(), identical);
    println!(
        "{} {}",
        "Winning payload:".bold(),
        report.winning_payload.cyan()
    );
    println!(
        "{} {}",
        "Constructed events:".bold(),
        report.constructed_events
    );
    println!(
        "{} {} slow-path entries, {} lost races, {} failures",
        "Stats:".bold(),
        report.stats.slow_path_entries,
        report.stats.lost_races,
        report.stats.failed_constructions
    );
}
