//! The module that defines the SoftMax activation layer.

use savefile_derive::Savefile;

use crate::layers::activations::ActivationLayer;
use crate::layers::Layer;
use crate::types::ModelLayer;
use crate::utils::VectorOperations;

#[derive(Debug, Savefile)]
/// The SoftMax activation, which squashes a sample's values into a
/// probability distribution: every output lands in `(0, 1)` and they all
/// sum up to one.
///
/// The largest input is subtracted from every value before exponentiating,
/// which keeps the exponentials from overflowing without changing the
/// resulting distribution.
pub struct SoftMax {
    /// The amount of inputs, and therefore outputs, of this layer.
    pub inputs_amount: usize,

    #[savefile_ignore]
    #[savefile_introspect_ignore]
    last_inputs: Vec<Vec<f32>>,
    #[savefile_ignore]
    #[savefile_introspect_ignore]
    last_outputs: Vec<Vec<f32>>,
}

impl SoftMax {
    /// Creates a new SoftMax activation layer wrapped into a
    /// [`ModelLayer`].
    pub fn new(inputs_amount: usize) -> ModelLayer {
        Self::new_raw(inputs_amount).into()
    }

    /// Creates a new raw SoftMax activation layer.
    pub fn new_raw(inputs_amount: usize) -> SoftMax {
        SoftMax {
            inputs_amount,
            last_inputs: Vec::new(),
            last_outputs: Vec::new(),
        }
    }
}

impl ActivationLayer for SoftMax {
    fn function(inputs: &Vec<f32>) -> Vec<f32> {
        let max_input = inputs.iter().copied().fold(f32::NEG_INFINITY, f32::max);

        let exponentials = inputs
            .subtract_number(max_input)
            .iter()
            .map(|x| x.exp())
            .collect::<Vec<f32>>();
        let total = exponentials.iter().sum::<f32>();

        exponentials.divide_number(total)
    }

    fn differential_of_output_with_respect_to_input(
        &self,
        sample_index: usize,
        input_index: usize,
        output_index: usize,
    ) -> f32 {
        if input_index == output_index {
            self.last_outputs[sample_index][input_index]
                * (1.0 - self.last_outputs[sample_index][output_index])
        } else {
            -self.last_outputs[sample_index][input_index]
                * self.last_outputs[sample_index][output_index]
        }
    }

    fn set_last_inputs(&mut self, input_samples: &Vec<Vec<f32>>) {
        self.last_inputs = input_samples.to_vec();
    }

    fn set_last_outputs(&mut self, output_samples: &Vec<Vec<f32>>) {
        self.last_outputs = output_samples.to_vec();
    }
}

impl Layer for SoftMax {
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
        self.base_back_propagate(
            should_calculate_input_to_error_derivative,
            layer_output_to_error_derivative,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::SoftMax;
    use crate::layers::Layer;
    use crate::utils::approx_eq::assert_approx_equal_distance;

    #[test]
    fn should_squash_values_into_a_distribution() {
        let mut layer = SoftMax::new_raw(3);
        let outputs = layer.propagate(&vec![vec![1.0, 2.0, 3.0]]);

        let total: f32 = outputs[0].iter().sum();
        assert!((total - 1.0).abs() <= 0.000_01);
        assert!(outputs[0][0] < outputs[0][1] && outputs[0][1] < outputs[0][2]);
    }

    #[test]
    fn should_compute_known_distributions() {
        let mut layer = SoftMax::new_raw(2);
        let outputs = layer.propagate(&vec![vec![0.0, (2.0_f32).ln()]]);

        assert_approx_equal_distance(&outputs[0], &vec![1.0 / 3.0, 2.0 / 3.0], 0.000_01);
    }

    #[test]
    fn should_not_overflow_on_large_inputs() {
        let mut layer = SoftMax::new_raw(2);
        let outputs = layer.propagate(&vec![vec![1_000.0, 1_000.0]]);

        assert_approx_equal_distance(&outputs[0], &vec![0.5, 0.5], 0.000_01);
    }
}
