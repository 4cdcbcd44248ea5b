//! Frame classifier backed by an ONNX model
//!
//! Three exports of the same network are supported. They differ only in the
//! input element type: the float models take `[0, 1]` values, the quantized
//! model takes raw bytes. All of them expect a `1 x S x S x 3` tensor in BGR
//! channel order.
use std::path::Path;
use std::time::Instant;

use image::imageops::{self, FilterType};
use image::DynamicImage;
use tract_onnx::prelude::*;

use crate::config::ClassifierConfig;
use crate::error::ClassifierError;

type RunnableModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// Which model artifact to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelChoice {
    /// Float32 model
    Float32 = 1,
    /// Int8-quantized model with u8 input
    QuantizedU8 = 2,
    /// Keras model, exported to ONNX
    Keras = 3,
}

impl ModelChoice {
    /// Parse the numeric choice given on the command line
    pub fn parse(value: &str) -> Result<Self, ClassifierError> {
        match value.trim().parse::<i64>() {
            Ok(1) => Ok(ModelChoice::Float32),
            Ok(2) => Ok(ModelChoice::QuantizedU8),
            Ok(3) => Ok(ModelChoice::Keras),
            _ => Err(ClassifierError::InvalidChoice(value.to_string())),
        }
    }

    pub fn model_path<'a>(&self, config: &'a ClassifierConfig) -> &'a str {
        match self {
            ModelChoice::Float32 => &config.float_model_path,
            ModelChoice::QuantizedU8 => &config.quantized_model_path,
            ModelChoice::Keras => &config.keras_model_path,
        }
    }

    fn takes_bytes(&self) -> bool {
        matches!(self, ModelChoice::QuantizedU8)
    }
}

/// Validate a request before any model is loaded
///
/// Problems are reported in a fixed order: a choice that is not a number,
/// then a missing image, then a number that names no model.
pub fn check_request(image_path: &Path, choice: &str) -> Result<ModelChoice, ClassifierError> {
    if choice.trim().parse::<i64>().is_err() {
        return Err(ClassifierError::ChoiceNotANumber(choice.to_string()));
    }

    if !image_path.exists() {
        return Err(ClassifierError::MissingImage(image_path.display().to_string()));
    }

    ModelChoice::parse(choice)
}

/// Output of one inference
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Index of the highest score
    pub label: usize,
    pub scores: Vec<f32>,
}

/// A loaded, optimized model ready for repeated inference
pub struct ImageClassifier {
    choice: ModelChoice,
    input_size: u32,
    model: RunnableModel,
}

impl ImageClassifier {
    /// Load and optimize the model selected by `choice`
    pub fn load(choice: ModelChoice, config: &ClassifierConfig) -> Result<Self, ClassifierError> {
        let path = choice.model_path(config);
        let t = Instant::now();
        let model = load_model(Path::new(path), choice, config.input_size).map_err(|source| {
            ClassifierError::ModelLoadFailed {
                path: path.to_string(),
                source: source.into(),
            }
        })?;

        tracing::info!("Loaded {:?} model from {} in {:?}", choice, path, t.elapsed());

        Ok(Self {
            choice,
            input_size: config.input_size,
            model,
        })
    }

    pub fn choice(&self) -> ModelChoice {
        self.choice
    }

    /// Classify one image
    pub fn predict(&self, image: &DynamicImage) -> Result<Prediction, ClassifierError> {
        let t = Instant::now();
        let input = preprocess(image, self.input_size, self.choice);

        let outputs = self
            .model
            .run(tvec!(input.into()))
            .map_err(|e| ClassifierError::InferenceFailed(e.into()))?;
        let output = outputs.first().ok_or(ClassifierError::EmptyOutput)?;
        let scores: Vec<f32> = output
            .cast_to::<f32>()
            .and_then(|t| Ok(t.as_slice::<f32>()?.to_vec()))
            .map_err(|e| ClassifierError::InferenceFailed(e.into()))?;

        let label = argmax(&scores).ok_or(ClassifierError::EmptyOutput)?;
        tracing::debug!("Scores {:?} -> label {} in {:?}", scores, label, t.elapsed());

        Ok(Prediction { label, scores })
    }
}

fn load_model(path: &Path, choice: ModelChoice, input_size: u32) -> TractResult<RunnableModel> {
    let size = input_size as usize;
    let fact: InferenceFact = if choice.takes_bytes() {
        u8::fact([1, size, size, 3]).into()
    } else {
        f32::fact([1, size, size, 3]).into()
    };

    tract_onnx::onnx()
        .model_for_path(path)?
        .with_input_fact(0, fact)?
        .into_optimized()?
        .into_runnable()
}

/// Resize to `size x size` and lay out as NHWC with BGR channels
pub fn preprocess(image: &DynamicImage, size: u32, choice: ModelChoice) -> Tensor {
    let rgb = imageops::resize(&image.to_rgb8(), size, size, FilterType::Triangle);
    let shape = (1, size as usize, size as usize, 3);
    let bgr = |y: usize, x: usize, c: usize| rgb.get_pixel(x as u32, y as u32)[2 - c];

    if choice.takes_bytes() {
        tract_ndarray::Array4::from_shape_fn(shape, |(_, y, x, c)| bgr(y, x, c)).into()
    } else {
        tract_ndarray::Array4::from_shape_fn(shape, |(_, y, x, c)| bgr(y, x, c) as f32 / 255.0).into()
    }
}

/// Index of the largest value; the first one wins a tie
pub fn argmax(scores: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (index, &score) in scores.iter().enumerate() {
        if best.map_or(true, |(_, b)| score > b) {
            best = Some((index, score));
        }
    }
    best.map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_parse_model_choice() {
        assert_eq!(ModelChoice::parse("1").unwrap(), ModelChoice::Float32);
        assert_eq!(ModelChoice::parse("2").unwrap(), ModelChoice::QuantizedU8);
        assert_eq!(ModelChoice::parse(" 3 ").unwrap(), ModelChoice::Keras);

        assert!(matches!(ModelChoice::parse("4"), Err(ClassifierError::InvalidChoice(_))));
        assert!(matches!(ModelChoice::parse("one"), Err(ClassifierError::InvalidChoice(_))));
    }

    #[test]
    fn test_missing_image_is_reported_before_out_of_range_choice() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.png");

        assert!(matches!(
            check_request(&missing, "4"),
            Err(ClassifierError::MissingImage(_))
        ));
        assert!(matches!(
            check_request(&missing, "abc"),
            Err(ClassifierError::ChoiceNotANumber(_))
        ));

        let present = dir.path().join("frame.png");
        std::fs::write(&present, b"not decoded here").unwrap();
        assert!(matches!(
            check_request(&present, "4"),
            Err(ClassifierError::InvalidChoice(_))
        ));
        assert_eq!(check_request(&present, " 2 ").unwrap(), ModelChoice::QuantizedU8);
    }

    #[test]
    fn test_model_paths() {
        let config = ClassifierConfig::default();
        assert_eq!(ModelChoice::Float32.model_path(&config), "models/custom_tinyml128.onnx");
        assert_eq!(
            ModelChoice::QuantizedU8.model_path(&config),
            "models/TINYml_best_quantized_int8.onnx"
        );
        assert_eq!(ModelChoice::Keras.model_path(&config), "models/TinyML128Best.onnx");
    }

    #[test]
    fn test_argmax_ties_go_to_first() {
        assert_eq!(argmax(&[0.1, 0.7, 0.2]), Some(1));
        assert_eq!(argmax(&[0.4, 0.4, 0.2]), Some(0));
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn test_preprocess_layout() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(10, 6, Rgb([255, 0, 51])));

        let tensor = preprocess(&image, 4, ModelChoice::Float32);
        assert_eq!(tensor.shape(), &[1, 4, 4, 3]);
        let values = tensor.as_slice::<f32>().unwrap();
        // BGR order
        assert!((values[0] - 0.2).abs() < 1e-6);
        assert_eq!(values[1], 0.0);
        assert_eq!(values[2], 1.0);

        let tensor = preprocess(&image, 4, ModelChoice::QuantizedU8);
        assert_eq!(&tensor.as_slice::<u8>().unwrap()[..3], &[51, 0, 255]);
    }

    #[test]
    fn test_missing_model_fails_to_load() {
        let mut config = ClassifierConfig::default();
        config.float_model_path = "no/such/model.onnx".to_string();

        let result = ImageClassifier::load(ModelChoice::Float32, &config);
        assert!(matches!(result, Err(ClassifierError::ModelLoadFailed { .. })));
    }
}
