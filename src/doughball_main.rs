use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use kicker_vision::config::Config;
use kicker_vision::detection::{DetectionContext, DetectionResult, Detector, DoughballDetector};
use kicker_vision::{imaging, logging, AppResult};

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 2 {
        println!("Usage: doughball <image_path>");
        return ExitCode::from(1);
    }

    logging::initialize_tracing();
    let config = Config::load_or_default();

    match detect(&args[1], &config) {
        Ok(DetectionResult::Doughball { .. }) => println!("Doughball detected"),
        Ok(_) => println!("No doughball detected"),
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("Error: {:#}", e);
        }
    }

    ExitCode::SUCCESS
}

fn detect(image_path: &str, config: &Config) -> AppResult<DetectionResult> {
    let gray = imaging::load_gray(Path::new(image_path))
        .with_context(|| format!("Unable to load image at {}", image_path))?;

    let detector = DoughballDetector::new(&config.doughball);
    let context = DetectionContext::new(gray);
    let result = detector.detect(&context);

    tracing::info!("{}: {:?} in {:?}", detector.name(), result, context.timestamp.elapsed());
    Ok(result)
}
