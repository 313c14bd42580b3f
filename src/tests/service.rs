//! Exercises the digit Model's lifecycle end to end: creation, training,
//! inference and the input contracts around them.

use std::time::{Duration, Instant};

use rand::{thread_rng, Rng};

use crate::service::{
    self, PredictionError, TrainingError, CLASSES_AMOUNT, INPUT_SHAPE,
};
use crate::tensor::{Batch, InferenceInput, SampleShape};

fn random_labels(amount: usize) -> Vec<usize> {
    let mut rng = thread_rng();
    (0..amount).map(|_| rng.gen_range(0..CLASSES_AMOUNT)).collect()
}

#[test]
fn created_models_should_have_layers() {
    let model = service::create_model();

    assert!(!model.layers.is_empty());
}

#[test]
fn training_should_return_a_loss_history() {
    let mut model = service::create_model();
    let data = Batch::random_normal(10, INPUT_SHAPE);
    let labels = random_labels(10);

    let history = service::train_model(&mut model, &data, &labels)
        .expect("training over a valid batch should work");

    assert!(history.epochs() >= 1);
    assert!(history.last_loss().is_some());
}

#[test]
fn predictions_should_score_every_class() {
    let mut model = service::create_model();
    let input = InferenceInput::Tensor(Batch::random_normal(1, INPUT_SHAPE));

    let prediction =
        service::predict(&mut model, &input).expect("predicting over a valid batch should work");

    assert_eq!(prediction.samples_amount(), 1);
    assert_eq!(prediction.scores()[0].len(), CLASSES_AMOUNT);
}

#[test]
fn training_and_predicting_should_compose() {
    let mut model = service::create_model();
    let data = Batch::random_normal(10, INPUT_SHAPE);
    let labels = random_labels(10);

    service::train_model(&mut model, &data, &labels)
        .expect("training over a valid batch should work");

    let input = InferenceInput::Tensor(Batch::random_normal(1, INPUT_SHAPE));
    let prediction = service::predict(&mut model, &input)
        .expect("predicting right after training should work");

    assert!(!prediction.scores().is_empty());
    assert!(prediction.predicted_classes()[0] < CLASSES_AMOUNT);
}

#[test]
fn predictions_should_be_deterministic_for_fixed_parameters() {
    let mut model = service::create_model();
    let input = InferenceInput::Tensor(Batch::random_normal(2, INPUT_SHAPE));

    let first = service::predict(&mut model, &input).unwrap();
    let second = service::predict(&mut model, &input).unwrap();

    assert_eq!(first, second);
}

#[test]
fn training_should_reject_mismatched_shapes() {
    let mut model = service::create_model();
    let data = Batch::random_normal(10, SampleShape::new(32, 32, 1));
    let labels = random_labels(10);

    let result = service::train_model(&mut model, &data, &labels);

    assert!(matches!(
        result,
        Err(TrainingError::InvalidShape { expected, found })
            if expected == INPUT_SHAPE && found == SampleShape::new(32, 32, 1)
    ));
}

#[test]
fn training_should_reject_out_of_range_labels() {
    let mut model = service::create_model();
    let data = Batch::random_normal(3, INPUT_SHAPE);

    let result = service::train_model(&mut model, &data, &[1, CLASSES_AMOUNT, 2]);

    assert!(matches!(
        result,
        Err(TrainingError::LabelOutOfRange { index: 1, .. })
    ));
}

#[test]
fn training_should_reject_unlabeled_samples() {
    let mut model = service::create_model();
    let data = Batch::random_normal(4, INPUT_SHAPE);

    let result = service::train_model(&mut model, &data, &[0, 1]);

    assert!(matches!(
        result,
        Err(TrainingError::SampleAmountMismatch {
            samples: 4,
            labels: 2
        })
    ));
}

#[test]
fn empty_batches_should_be_rejected_everywhere() {
    let mut model = service::create_model();
    let empty = Batch::new(Vec::new(), INPUT_SHAPE).unwrap();

    assert!(matches!(
        service::train_model(&mut model, &empty, &[]),
        Err(TrainingError::EmptyBatch)
    ));
    assert!(matches!(
        service::predict(&mut model, &InferenceInput::Tensor(empty)),
        Err(PredictionError::EmptyBatch)
    ));
}

#[test]
fn predicting_should_reject_textual_payloads() {
    let mut model = service::create_model();
    let input = InferenceInput::Text("invalid_data".to_string());

    let result = service::predict(&mut model, &input);

    assert!(matches!(
        result,
        Err(PredictionError::TypeMismatch { found: "text" })
    ));
}

#[test]
fn predicting_should_reject_mismatched_shapes() {
    let mut model = service::create_model();
    let input = InferenceInput::Tensor(Batch::random_normal(1, SampleShape::new(28, 28, 3)));

    let result = service::predict(&mut model, &input);

    assert!(matches!(
        result,
        Err(PredictionError::InvalidShape { .. })
    ));
}

// A coarse regression guard, not a precise performance target: training on
// a low-thousands batch has to stay within an order of magnitude of what a
// development machine handles comfortably.
#[test]
fn training_a_thousand_samples_should_stay_within_budget() {
    let mut model = service::create_model();
    let data = Batch::random_normal(1_000, INPUT_SHAPE);
    let labels = random_labels(1_000);

    let started_at = Instant::now();
    let history = service::train_model(&mut model, &data, &labels)
        .expect("training over a valid batch should work");
    let elapsed = started_at.elapsed();

    assert!(history.last_loss().is_some());
    assert!(
        elapsed < Duration::from_secs(60),
        "training 1000 samples took {:?}",
        elapsed
    );
}
