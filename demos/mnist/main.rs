use digitnet::datasets::mnist;
use digitnet::loss_functions::CategoricalCrossEntropy;
use digitnet::service;
use digitnet::tensor::{Batch, InferenceInput};
use digitnet::types::TrainingOptions;
use digitnet::Model;

const MODEL_PATH: &str = "mnist-model.bin";

// Full-batch gradient descent over all 60k images is painfully slow on a
// laptop, so the demo trains on a slice of the training set.
const TRAINING_SAMPLES: usize = 4_000;
const TEST_SAMPLES: usize = 1_000;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (training_images, training_labels) = mnist::training_set()?;
    let (test_images, test_labels) = mnist::test_set()?;

    let training_data = Batch::new(
        training_images
            .samples()
            .iter()
            .take(TRAINING_SAMPLES)
            .cloned()
            .collect(),
        service::INPUT_SHAPE,
    )?;
    let training_labels = &training_labels[..TRAINING_SAMPLES];

    let mut model = service::create_model();

    service::train_model_with_options(
        &mut model,
        &training_data,
        training_labels,
        &mut TrainingOptions {
            loss_algorithm: CategoricalCrossEntropy::new(),
            learning_rate: 0.1,
            epochs: 30,
            verbose: true,
        },
    )?;

    let test_data = Batch::new(
        test_images
            .samples()
            .iter()
            .take(TEST_SAMPLES)
            .cloned()
            .collect(),
        service::INPUT_SHAPE,
    )?;

    let input = InferenceInput::Tensor(test_data);
    let prediction = service::predict(&mut model, &input)?;

    let hits = prediction
        .predicted_classes()
        .iter()
        .zip(&test_labels[..TEST_SAMPLES])
        .filter(|(predicted, expected)| predicted == expected)
        .count();

    println!(
        "{} out of {} held out digits classified correctly",
        hits, TEST_SAMPLES
    );

    model.save(MODEL_PATH)?;

    let mut loaded_model = Model::load(MODEL_PATH)?;
    let loaded_prediction = service::predict(&mut loaded_model, &input)?;
    assert_eq!(loaded_prediction, prediction);
    println!("model saved to {} and loaded back intact", MODEL_PATH);

    Ok(())
}
