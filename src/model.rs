//! The module that defines the sequential Model.

use indicatif::{ProgressBar, ProgressStyle};
use rayon::iter::{IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator};
use savefile::prelude::*;
use savefile_derive::Savefile;

use crate::layers::Layer;
use crate::loss_functions::LossFunction;
use crate::types::{ModelLayer, ModelLossFunction, TrainingHistory, TrainingOptions};

#[derive(Debug, Savefile)]
/// A Model can be defined as just an ordering of some layers with their
/// inputs and outputs: the Model receives the inputs for the first layer
/// and results in the outputs of the last layer.
///
/// Fitting the Model runs the back_propagate method on each layer going
/// from the last to the first one, computing the loss for every epoch with
/// the defined loss function.
pub struct Model {
    /// The layers the Model propagates its inputs through, in order.
    pub layers: Vec<ModelLayer>,
}

impl Model {
    /// Creates a new Model out of the given layers.
    pub fn new(layers: Vec<ModelLayer>) -> Model {
        Model { layers }
    }

    /// Propagates the input samples sequentially through every layer,
    /// resulting in the Model's output for each sample.
    ///
    /// Learnable parameters are never touched here; the layers do cache the
    /// values flowing through them for a possible subsequent backward pass.
    pub fn predict(&mut self, input_samples: &Vec<Vec<f32>>) -> Vec<Vec<f32>> {
        let mut current_values = input_samples.to_vec();

        for layer in self.layers.iter_mut() {
            current_values = layer.propagate(&current_values);
        }

        current_values
    }

    /// Computes the average loss of the Model's current predictions over the
    /// given samples.
    pub fn compute_loss(
        &mut self,
        input_samples: &Vec<Vec<f32>>,
        expected_output_samples: &Vec<Vec<f32>>,
        loss_algorithm: &ModelLossFunction,
    ) -> f32 {
        let actual_sample_outputs = self.predict(input_samples);

        loss_algorithm.average_loss_for_samples(&actual_sample_outputs, expected_output_samples)
    }

    /// Fits the Model to best suit the training data, running as many
    /// epochs as the training options ask for and returning the loss
    /// measured after every one of them.
    ///
    /// Calling fit again continues training from the current parameters.
    pub fn fit(
        &mut self,
        training_input_samples: &Vec<Vec<f32>>,
        training_expected_output_samples: &Vec<Vec<f32>>,
        training_options: &mut TrainingOptions,
    ) -> TrainingHistory {
        assert_eq!(
            training_input_samples.len(),
            training_expected_output_samples.len()
        );
        assert!(!training_input_samples.is_empty());

        let progress = if training_options.verbose {
            let bar = ProgressBar::new(training_options.epochs as u64);
            bar.set_style(
                ProgressStyle::with_template(
                    "[{elapsed_precise}] {bar:40.cyan/blue} epoch {pos}/{len} {msg}",
                )
                .expect("unable to create the training progress bar style"),
            );
            Some(bar)
        } else {
            None
        };

        let mut history = TrainingHistory::with_capacity(training_options.epochs);

        for _ in 0..training_options.epochs {
            self.back_propagate(
                training_input_samples,
                training_expected_output_samples,
                training_options,
            );

            let epoch_loss = self.compute_loss(
                training_input_samples,
                training_expected_output_samples,
                &training_options.loss_algorithm,
            );
            history.epoch_losses.push(epoch_loss);

            if let Some(bar) = &progress {
                bar.set_message(format!("loss: {:.6}", epoch_loss));
                bar.inc(1);
            }
        }

        if let Some(bar) = &progress {
            bar.finish();
        }

        history
    }

    /// Runs one full backward pass: predicts over the training samples,
    /// derives the loss with respect to every output and feeds those
    /// derivatives through the layers in reverse order.
    fn back_propagate(
        &mut self,
        training_input_samples: &Vec<Vec<f32>>,
        training_expected_output_samples: &Vec<Vec<f32>>,
        training_options: &TrainingOptions,
    ) {
        let training_actual_outputs = self.predict(training_input_samples);

        let outputs_amount = training_expected_output_samples[0].len();
        let loss_algorithm = &training_options.loss_algorithm;

        let mut loss_to_outputs_derivatives = training_expected_output_samples
            .par_iter()
            .zip(training_actual_outputs)
            .map(|(expected_outputs, actual_outputs)| {
                expected_outputs
                    .iter()
                    .zip(actual_outputs)
                    .map(|(expected_output, actual_output)| {
                        loss_algorithm.compute_loss_derivative_with_respect_to_output(
                            outputs_amount,
                            actual_output,
                            *expected_output,
                        )
                    })
                    .collect::<Vec<f32>>()
            })
            .collect::<Vec<Vec<f32>>>();

        for (layer_index, layer) in self.layers.iter_mut().enumerate().rev() {
            if layer_index > 0 {
                // always Some
                loss_to_outputs_derivatives = layer
                    .back_propagate(
                        true,
                        &loss_to_outputs_derivatives,
                        training_options.learning_rate,
                    )
                    .unwrap();
            } else {
                layer.back_propagate(
                    // always None
                    false,
                    &loss_to_outputs_derivatives,
                    training_options.learning_rate,
                );
            }
        }
    }

    /// Saves the Model's layers and parameters into the given file using
    /// the `savefile` crate's binary format.
    pub fn save(&self, path: &str) -> Result<(), SavefileError> {
        save_file(path, 0, self)
    }

    /// Loads a Model previously written with [`Model::save`].
    ///
    /// The layers' propagation caches are not part of the file and come
    /// back empty.
    pub fn load(path: &str) -> Result<Model, SavefileError> {
        load_file(path, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::Model;
    use crate::layers::activations::SoftMax;
    use crate::layers::Dense;
    use crate::types::ModelLayer;

    #[test]
    fn should_propagate_through_every_layer() {
        let layers: Vec<ModelLayer> = vec![Dense::new(4, 3), SoftMax::new(3)];
        let mut model = Model::new(layers);

        let outputs = model.predict(&vec![vec![0.5, -0.5, 1.0, 0.0], vec![0.0, 0.0, 0.0, 0.0]]);

        assert_eq!(outputs.len(), 2);
        for sample_outputs in &outputs {
            assert_eq!(sample_outputs.len(), 3);
            let total: f32 = sample_outputs.iter().sum();
            assert!((total - 1.0).abs() <= 0.000_01);
        }
    }
}
