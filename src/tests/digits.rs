//! Trains the full convolutional stack on a tiny synthetic image problem
//! and checks that it actually learns something.

use crate::layers::activations::{ReLU, SoftMax};
use crate::layers::{Conv2D, Dense, MaxPool2D};
use crate::loss_functions::CategoricalCrossEntropy;
use crate::model::Model;
use crate::types::{ModelLayer, TrainingOptions};

const IMAGE_SIDE: usize = 8;

/// An 8x8 image with one bright half: samples of class 0 light up the top
/// half and samples of class 1 the bottom one. The offset nudges a couple
/// of pixels so the samples of one class are not all identical.
fn half_bright_image(bright_top: bool, offset: usize) -> Vec<f32> {
    (0..IMAGE_SIDE * IMAGE_SIDE)
        .map(|index| {
            let row = index / IMAGE_SIDE;
            let bright = if bright_top {
                row < IMAGE_SIDE / 2
            } else {
                row >= IMAGE_SIDE / 2
            };

            if bright {
                1.0 - ((index + offset) % 5) as f32 * 0.02
            } else {
                ((index + offset) % 3) as f32 * 0.01
            }
        })
        .collect()
}

#[test]
fn should_decrease_error() -> () {
    let conv_side = IMAGE_SIDE - 2;
    let pooled_side = conv_side / 2;
    let filters_amount = 2;

    let mut conv = Conv2D::new_raw((IMAGE_SIDE, IMAGE_SIDE), (3, 3), filters_amount);
    // Fixed filters keep the feature maps of both classes apart from the
    // start, the rest of the parameters stay random.
    conv.filter_weights = vec![
        vec![vec![0.5; 3]; 3],
        vec![
            vec![0.5, 0.5, 0.5],
            vec![0.0, 0.0, 0.0],
            vec![-0.5, -0.5, -0.5],
        ],
    ];

    let layers: Vec<ModelLayer> = vec![
        conv.into(),
        ReLU::new(conv_side * conv_side * filters_amount),
        MaxPool2D::new((conv_side, conv_side), filters_amount, 2),
        Dense::new(pooled_side * pooled_side * filters_amount, 2),
        SoftMax::new(2),
    ];

    let mut model = Model::new(layers);

    let mut training_input_samples = Vec::new();
    let mut training_output_samples = Vec::new();
    for offset in 0..8 {
        training_input_samples.push(half_bright_image(true, offset));
        training_output_samples.push(vec![1.0, 0.0]);

        training_input_samples.push(half_bright_image(false, offset));
        training_output_samples.push(vec![0.0, 1.0]);
    }

    let history = model.fit(
        &training_input_samples,
        &training_output_samples,
        &mut TrainingOptions {
            loss_algorithm: CategoricalCrossEntropy::new(),
            learning_rate: 0.1,
            epochs: 150,
            verbose: false,
        },
    );

    assert_eq!(history.epochs(), 150);

    let first_loss = history.epoch_losses[0];
    let last_loss = history.last_loss().unwrap();

    assert!(
        last_loss < first_loss,
        "loss went from {} to {} without improving",
        first_loss,
        last_loss
    );
    assert!(
        last_loss < 0.5,
        "a linearly separable problem should end well below {}",
        last_loss
    );
}
