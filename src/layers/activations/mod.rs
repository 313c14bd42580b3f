//! The module that contains all of the activation functions, implemented as
//! layers.

pub mod relu;
pub mod softmax;

pub use relu::ReLU;
pub use softmax::SoftMax;

use rayon::iter::{IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator};

use crate::layers::Layer;

/// The shared definition of an activation function as a Layer: a function
/// applied over every sample plus the differentials the backward pass needs.
pub trait ActivationLayer: Layer
where
    Self: Sync + Send,
{
    /// Computes the activated values for one sample's inputs.
    fn function(inputs: &Vec<f32>) -> Vec<f32>;

    /// The derivative of one output of the activation with respect to one of
    /// its inputs, on the values of the last forward pass.
    ///
    /// This is defined per index pair mostly because of activations like
    /// softmax where every output depends on every input; activations with a
    /// diagonal jacobian can skip [`ActivationLayer::base_back_propagate`]
    /// entirely and route derivatives element-wise.
    fn differential_of_output_with_respect_to_input(
        &self,
        sample_index: usize,
        input_index: usize,
        output_index: usize,
    ) -> f32;

    /// Stores the input samples of the current forward pass.
    fn set_last_inputs(&mut self, input_samples: &Vec<Vec<f32>>);

    /// Stores the output samples of the current forward pass.
    fn set_last_outputs(&mut self, output_samples: &Vec<Vec<f32>>);

    /// Applies [`ActivationLayer::function`] over every sample caching the
    /// inputs and outputs.
    fn base_propagate(&mut self, input_samples: &Vec<Vec<f32>>) -> Vec<Vec<f32>> {
        self.set_last_inputs(input_samples);

        let output_samples = input_samples
            .par_iter()
            .map(|inputs| Self::function(inputs))
            .collect::<Vec<Vec<f32>>>();

        self.set_last_outputs(&output_samples);

        output_samples
    }

    /// Chains the output derivatives through the full jacobian of the
    /// activation, one sample at a time.
    fn base_back_propagate(
        &mut self,
        should_calculate_input_to_error_derivative: bool,
        layer_output_to_error_derivative: &Vec<Vec<f32>>,
    ) -> Option<Vec<Vec<f32>>> {
        if should_calculate_input_to_error_derivative {
            Some(
                layer_output_to_error_derivative
                    .par_iter()
                    .enumerate()
                    .map(|(sample_index, output_derivatives)| {
                        (0..output_derivatives.len())
                            .map(|input_index| {
                                output_derivatives
                                    .iter()
                                    .enumerate()
                                    .map(|(output_index, output_derivative)| {
                                        self.differential_of_output_with_respect_to_input(
                                            sample_index,
                                            input_index,
                                            output_index,
                                        ) * output_derivative
                                    })
                                    .sum::<f32>()
                            })
                            .collect::<Vec<f32>>()
                    })
                    .collect::<Vec<Vec<f32>>>(),
            )
        } else {
            None
        }
    }
}
