use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use kicker_vision::config::Config;
use kicker_vision::detection::{AbsenceReason, KickerPipeline, PresenceDecision, PresenceReport, PresenceSignal};
use kicker_vision::logging;
use kicker_vision::orientation::{MatchScore, OrientationReport};
use kicker_vision::AppResult;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        println!("Usage: kicker <image_path>");
        return ExitCode::from(1);
    }

    logging::initialize_tracing();
    let config = Config::load_or_default();

    let valid = match inspect(&args[1], &config) {
        Ok(valid) => valid,
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            false
        }
    };

    if valid {
        println!("Kicker in valid position.");
    } else {
        println!("Issue with the kicker");
    }

    ExitCode::SUCCESS
}

fn inspect(image_path: &str, config: &Config) -> AppResult<bool> {
    let pipeline = KickerPipeline::new(config);
    let outcome = pipeline
        .run(Path::new(image_path), &config.orientation.references)
        .with_context(|| format!("Kicker inspection failed for {}", image_path))?;

    print_presence(&outcome.presence);
    match &outcome.orientation {
        Some(report) => print_orientation(report),
        None => println!("No kicker detected."),
    }

    Ok(outcome.is_valid())
}

fn print_presence(report: &PresenceReport) {
    let decision = report.decision();

    match decision {
        PresenceDecision::Present(PresenceSignal::LinesConfirmedByCoverage)
        | PresenceDecision::Absent(AbsenceReason::InsufficientCoverage) => {
            println!("Lines detected ({}), checking white pixel coverage...", report.line_count)
        }
        _ => println!(
            "No sufficient lines detected ({}). Checking white pixel coverage...",
            report.line_count
        ),
    }
    println!("White Pixel Percentage in Upper Region: {:.2}%", report.white_percentage);

    match decision {
        PresenceDecision::Present(PresenceSignal::LinesConfirmedByCoverage) => {
            println!("Kicker detected by lines and white pixel coverage.")
        }
        PresenceDecision::Present(PresenceSignal::CoverageFallback) => {
            println!("Kicker detected by white pixel coverage.")
        }
        PresenceDecision::Absent(AbsenceReason::InsufficientCoverage) => {
            println!("No kicker detected due to insufficient white pixels.")
        }
        PresenceDecision::Absent(AbsenceReason::NoSignal) => {}
    }
}

fn print_orientation(report: &OrientationReport) {
    for comparison in &report.comparisons {
        match comparison.score {
            MatchScore::Composite(score) => {
                println!("ROI {} - Combined Score: {:.4}", comparison.label, score.combined)
            }
            MatchScore::AbsDiff(difference) => {
                println!("ROI {} - Absolute Difference: {}", comparison.label, difference)
            }
        }
    }
    println!("{}", report.verdict);
}
