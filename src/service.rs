//! The module that owns the handwritten digit classification Model: its
//! architecture, its training entry point and its inference entry point.
//!
//! The functions here are a thin façade over [`crate::Model`] that pins
//! down the digit contract (`28x28x1` grayscale inputs, ten output
//! classes) and validates everything crossing it, so a caller can never
//! silently train or predict over data of the wrong shape or kind.
//!
//! # Examples
//!
//! ```rust
//! use digitnet::service;
//! use digitnet::tensor::{Batch, InferenceInput};
//!
//! let mut model = service::create_model();
//!
//! let data = Batch::random_normal(10, service::INPUT_SHAPE);
//! let labels = vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 9];
//! let history = service::train_model(&mut model, &data, &labels).unwrap();
//! assert!(history.epochs() >= 1);
//!
//! let input = InferenceInput::Tensor(Batch::random_normal(1, service::INPUT_SHAPE));
//! let prediction = service::predict(&mut model, &input).unwrap();
//! assert_eq!(prediction.scores()[0].len(), service::CLASSES_AMOUNT);
//! ```

use std::fmt;

use crate::layers::activations::{ReLU, SoftMax};
use crate::layers::{Conv2D, Dense, MaxPool2D};
use crate::loss_functions::CategoricalCrossEntropy;
use crate::model::Model;
use crate::tensor::{Batch, InferenceInput, SampleShape};
use crate::types::{TrainingHistory, TrainingOptions};

/// The shape every training and inference sample must have.
pub const INPUT_SHAPE: SampleShape = SampleShape::new(28, 28, 1);

/// The amount of digit classes the Model scores every sample against.
pub const CLASSES_AMOUNT: usize = 10;

/// The learning rate [`train_model`] uses.
pub const DEFAULT_LEARNING_RATE: f32 = 0.05;

/// The amount of epochs [`train_model`] runs.
pub const DEFAULT_EPOCHS: usize = 2;

const FILTERS_AMOUNT: usize = 8;
const FILTER_SIZE: (usize, usize) = (3, 3);
const POOL_SIZE: usize = 2;

/// The error that can happen when training the digit Model over a labeled
/// batch.
#[derive(Debug)]
pub enum TrainingError {
    /// The batch's per-sample shape does not match the Model's declared
    /// input shape.
    InvalidShape {
        /// The shape the Model was built for.
        expected: SampleShape,
        /// The shape the batch actually carries.
        found: SampleShape,
    },
    /// The batch holds no samples at all.
    EmptyBatch,
    /// There is not exactly one label per sample.
    SampleAmountMismatch {
        /// The amount of samples in the batch.
        samples: usize,
        /// The amount of labels given.
        labels: usize,
    },
    /// A label does not name one of the Model's classes.
    LabelOutOfRange {
        /// The index of the offending label.
        index: usize,
        /// The label itself.
        label: usize,
        /// The amount of classes the Model has.
        classes: usize,
    },
}

impl fmt::Display for TrainingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrainingError::InvalidShape { expected, found } => write!(
                f,
                "training data of shape {} does not match the model's input shape {}",
                found, expected
            ),
            TrainingError::EmptyBatch => {
                write!(f, "cannot train over a batch with no samples")
            }
            TrainingError::SampleAmountMismatch { samples, labels } => write!(
                f,
                "{} samples were given but {} labels",
                samples, labels
            ),
            TrainingError::LabelOutOfRange {
                index,
                label,
                classes,
            } => write!(
                f,
                "label #{} is {} but must be below {}",
                index, label, classes
            ),
        }
    }
}

impl std::error::Error for TrainingError {}

/// The error that can happen when running inference over the digit Model.
#[derive(Debug)]
pub enum PredictionError {
    /// The payload is not a numeric tensor at all.
    TypeMismatch {
        /// The kind of payload that was actually given.
        found: &'static str,
    },
    /// The batch's per-sample shape does not match the Model's declared
    /// input shape.
    InvalidShape {
        /// The shape the Model was built for.
        expected: SampleShape,
        /// The shape the batch actually carries.
        found: SampleShape,
    },
    /// The batch holds no samples at all.
    EmptyBatch,
}

impl fmt::Display for PredictionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredictionError::TypeMismatch { found } => write!(
                f,
                "inference expects a numeric tensor but a {} payload was given",
                found
            ),
            PredictionError::InvalidShape { expected, found } => write!(
                f,
                "inference input of shape {} does not match the model's input shape {}",
                found, expected
            ),
            PredictionError::EmptyBatch => {
                write!(f, "cannot predict over a batch with no samples")
            }
        }
    }
}

impl std::error::Error for PredictionError {}

/// The class scores the Model computed for a batch of samples, one row of
/// [`CLASSES_AMOUNT`] scores per sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    scores: Vec<Vec<f32>>,
}

impl Prediction {
    /// The per-class scores, as a `samples_amount x CLASSES_AMOUNT` matrix.
    pub fn scores(&self) -> &Vec<Vec<f32>> {
        &self.scores
    }

    /// The amount of samples that were scored.
    pub fn samples_amount(&self) -> usize {
        self.scores.len()
    }

    /// The highest scoring class per sample.
    pub fn predicted_classes(&self) -> Vec<usize> {
        self.scores
            .iter()
            .map(|sample_scores| {
                sample_scores
                    .iter()
                    .enumerate()
                    .max_by(|(_, a), (_, b)| a.total_cmp(b))
                    .map(|(class, _)| class)
                    .unwrap_or(0)
            })
            .collect()
    }
}

/// Creates the digit classification Model: a convolutional feature
/// extractor followed by a max pooled, densely connected classification
/// head ending in a SoftMax over the ten digit classes.
///
/// The returned Model is untrained; its filters and weights are randomly
/// initialized.
pub fn create_model() -> Model {
    let (input_width, input_height) = (INPUT_SHAPE.width, INPUT_SHAPE.height);
    let (conv_width, conv_height) = (
        input_width - FILTER_SIZE.0 + 1,
        input_height - FILTER_SIZE.1 + 1,
    );
    let (pooled_width, pooled_height) = (conv_width / POOL_SIZE, conv_height / POOL_SIZE);

    Model::new(vec![
        Conv2D::new((input_width, input_height), FILTER_SIZE, FILTERS_AMOUNT),
        ReLU::new(conv_width * conv_height * FILTERS_AMOUNT),
        MaxPool2D::new((conv_width, conv_height), FILTERS_AMOUNT, POOL_SIZE),
        Dense::new(pooled_width * pooled_height * FILTERS_AMOUNT, CLASSES_AMOUNT),
        SoftMax::new(CLASSES_AMOUNT),
    ])
}

/// Trains the Model in place over a labeled batch with the default
/// categorical cross entropy options, returning the per-epoch loss history.
///
/// Training is not idempotent: calling this again continues from wherever
/// the parameters currently are.
pub fn train_model(
    model: &mut Model,
    data: &Batch,
    labels: &[usize],
) -> Result<TrainingHistory, TrainingError> {
    let mut options = TrainingOptions {
        loss_algorithm: CategoricalCrossEntropy::new(),
        learning_rate: DEFAULT_LEARNING_RATE,
        epochs: DEFAULT_EPOCHS,
        verbose: false,
    };

    train_model_with_options(model, data, labels, &mut options)
}

/// Trains the Model in place over a labeled batch with caller-chosen
/// training options, returning the per-epoch loss history.
pub fn train_model_with_options(
    model: &mut Model,
    data: &Batch,
    labels: &[usize],
    options: &mut TrainingOptions,
) -> Result<TrainingHistory, TrainingError> {
    if data.is_empty() {
        return Err(TrainingError::EmptyBatch);
    }

    if data.shape() != INPUT_SHAPE {
        return Err(TrainingError::InvalidShape {
            expected: INPUT_SHAPE,
            found: data.shape(),
        });
    }

    if labels.len() != data.samples_amount() {
        return Err(TrainingError::SampleAmountMismatch {
            samples: data.samples_amount(),
            labels: labels.len(),
        });
    }

    let expected_outputs = one_hot_encode(labels)?;

    Ok(model.fit(data.samples(), &expected_outputs, options))
}

/// Runs the Model over an inference payload, resulting in one row of class
/// scores per sample.
///
/// Only numeric tensor payloads of the Model's declared input shape are
/// accepted; the Model's learnable parameters are left untouched, so for
/// fixed parameters the same input always scores the same.
pub fn predict(
    model: &mut Model,
    input: &InferenceInput,
) -> Result<Prediction, PredictionError> {
    let batch = match input {
        InferenceInput::Tensor(batch) => batch,
        _ => {
            return Err(PredictionError::TypeMismatch {
                found: input.kind(),
            })
        }
    };

    if batch.is_empty() {
        return Err(PredictionError::EmptyBatch);
    }

    if batch.shape() != INPUT_SHAPE {
        return Err(PredictionError::InvalidShape {
            expected: INPUT_SHAPE,
            found: batch.shape(),
        });
    }

    let scores = model.predict(batch.samples());

    Ok(Prediction { scores })
}

fn one_hot_encode(labels: &[usize]) -> Result<Vec<Vec<f32>>, TrainingError> {
    labels
        .iter()
        .enumerate()
        .map(|(index, label)| {
            if *label >= CLASSES_AMOUNT {
                return Err(TrainingError::LabelOutOfRange {
                    index,
                    label: *label,
                    classes: CLASSES_AMOUNT,
                });
            }

            let mut expected_output = vec![0.0; CLASSES_AMOUNT];
            expected_output[*label] = 1.0;

            Ok(expected_output)
        })
        .collect()
}
