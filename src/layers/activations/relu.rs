//! The module that defines the Rectified Linear Unit activation layer.

use rayon::iter::{IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator};
use savefile_derive::Savefile;

use crate::layers::activations::ActivationLayer;
use crate::layers::Layer;
use crate::types::ModelLayer;

#[derive(Debug, Savefile)]
/// The Rectified Linear Unit activation, which just zeroes out every
/// negative value and keeps the positive ones untouched.
pub struct ReLU {
    /// The amount of inputs, and therefore outputs, of this layer.
    pub inputs_amount: usize,

    #[savefile_ignore]
    #[savefile_introspect_ignore]
    last_inputs: Vec<Vec<f32>>,
    #[savefile_ignore]
    #[savefile_introspect_ignore]
    last_outputs: Vec<Vec<f32>>,
}

impl ReLU {
    /// Creates a new ReLU activation layer wrapped into a [`ModelLayer`].
    pub fn new(inputs_amount: usize) -> ModelLayer {
        Self::new_raw(inputs_amount).into()
    }

    /// Creates a new raw ReLU activation layer.
    pub fn new_raw(inputs_amount: usize) -> ReLU {
        ReLU {
            inputs_amount,
            last_inputs: Vec::new(),
            last_outputs: Vec::new(),
        }
    }
}

impl ActivationLayer for ReLU {
    fn function(inputs: &Vec<f32>) -> Vec<f32> {
        inputs
            .iter()
            .map(|input| input.max(0.0))
            .collect::<Vec<f32>>()
    }

    fn differential_of_output_with_respect_to_input(
        &self,
        sample_index: usize,
        input_index: usize,
        _: usize,
    ) -> f32 {
        if self.last_outputs[sample_index][input_index] == 0.0_f32 {
            0.0
        } else {
            1.0
        }
    }

    fn set_last_inputs(&mut self, input_samples: &Vec<Vec<f32>>) {
        self.last_inputs = input_samples.to_vec();
    }

    fn set_last_outputs(&mut self, output_samples: &Vec<Vec<f32>>) {
        self.last_outputs = output_samples.to_vec();
    }
}

impl Layer for ReLU {
    fn get_last_inputs(&self) -> &Vec<Vec<f32>> {
        &self.last_inputs
    }

    fn get_last_outputs(&self) -> &Vec<Vec<f32>> {
        &self.last_outputs
    }

    fn get_inputs_amount(&self) -> usize {
        self.inputs_amount
    }

    fn get_outputs_amount(&self) -> usize {
        self.inputs_amount
    }

    fn propagate(&mut self, inputs: &Vec<Vec<f32>>) -> Vec<Vec<f32>> {
        self.base_propagate(inputs)
    }

    fn back_propagate(
        &mut self,
        should_calculate_input_to_error_derivative: bool,
        layer_output_to_error_derivative: &Vec<Vec<f32>>,
        _learning_rate: f32,
    ) -> Option<Vec<Vec<f32>>> {
        // ReLU's jacobian is diagonal, so instead of going through the
        // generic base_back_propagate the derivatives are routed
        // element-wise.
        if should_calculate_input_to_error_derivative {
            Some(
                layer_output_to_error_derivative
                    .par_iter()
                    .enumerate()
                    .map(|(sample_index, output_derivatives)| {
                        output_derivatives
                            .iter()
                            .enumerate()
                            .map(|(input_index, output_derivative)| {
                                self.differential_of_output_with_respect_to_input(
                                    sample_index,
                                    input_index,
                                    input_index,
                                ) * output_derivative
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

#[cfg(test)]
mod tests {
    use super::ReLU;
    use crate::layers::Layer;

    #[test]
    fn should_zero_out_negative_values() {
        let mut layer = ReLU::new_raw(4);
        let outputs = layer.propagate(&vec![vec![-1.0, 0.5, -0.25, 2.0]]);

        assert_eq!(outputs, vec![vec![0.0, 0.5, 0.0, 2.0]]);
    }

    #[test]
    fn should_only_pass_derivatives_through_active_units() {
        let mut layer = ReLU::new_raw(4);
        layer.propagate(&vec![vec![-1.0, 0.5, -0.25, 2.0]]);

        let derivatives = layer
            .back_propagate(true, &vec![vec![1.0, 1.0, 1.0, 1.0]], 0.0)
            .expect("ReLU should route derivatives when asked to");

        assert_eq!(derivatives, vec![vec![0.0, 1.0, 0.0, 1.0]]);
    }
}
