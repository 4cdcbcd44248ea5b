use std::path::Path;

use anyhow::Context;
use kicker_vision::classifier::{check_request, ImageClassifier};
use kicker_vision::config::Config;
use kicker_vision::{imaging, logging, AppResult, ClassifierError};

fn main() -> AppResult<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        println!("Usage: classify <image_path> <model_choice> (1, 2, or 3)");
        return Ok(());
    }

    let image_path = Path::new(&args[1]);
    let choice = match check_request(image_path, &args[2]) {
        Ok(choice) => choice,
        Err(ClassifierError::ChoiceNotANumber(_)) => {
            println!("Invalid model choice. Please enter 1, 2, or 3.");
            return Ok(());
        }
        Err(ClassifierError::MissingImage(_)) => {
            println!("Error: The image path '{}' does not exist.", image_path.display());
            return Ok(());
        }
        Err(ClassifierError::InvalidChoice(_)) => {
            println!("Invalid choice! Please choose 1, 2, or 3.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    logging::initialize_tracing();
    let config = Config::load_or_default();

    let classifier = ImageClassifier::load(choice, &config.classifier)
        .with_context(|| format!("Could not prepare the {:?} model", choice))?;

    let image = match imaging::load_color(image_path) {
        Ok(image) => image,
        Err(e) => {
            println!("Error loading image: {}", image_path.display());
            tracing::warn!("{:#}", anyhow::Error::from(e));
            return Ok(());
        }
    };

    let prediction = classifier.predict(&image).context("Inference failed")?;
    println!("Predicted label: {}", prediction.label);

    Ok(())
}
