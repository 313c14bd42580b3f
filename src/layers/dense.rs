//! The module that defines the fully connected Dense layer.

use rayon::iter::{IntoParallelIterator, IntoParallelRefIterator, ParallelIterator};
use savefile_derive::Savefile;

use crate::layers::initializers::{
    ConstantInitializer, Initializer, InitializerTrait,
};
use crate::layers::Layer;
use crate::types::ModelLayer;
use crate::utils::{MatrixOperations, VectorOperations};

#[derive(Debug, Savefile)]
/// A densely connected layer, mapping its inputs into its outputs through a
/// `inputs_amount x outputs_amount` weight matrix and one bias per output.
pub struct Dense {
    /// The amount of inputs this Dense layer receives per sample.
    pub inputs_amount: usize,
    /// The amount of outputs this Dense layer computes per sample.
    pub outputs_amount: usize,

    /// The connection weights, laid out as `weights[input][output]`.
    pub weights: Vec<Vec<f32>>,
    /// One bias per output.
    pub biases: Vec<f32>,

    #[savefile_ignore]
    #[savefile_introspect_ignore]
    last_inputs: Vec<Vec<f32>>,
    #[savefile_ignore]
    #[savefile_introspect_ignore]
    last_outputs: Vec<Vec<f32>>,
}

impl Dense {
    /// Creates a new Dense layer wrapped into a [`ModelLayer`], with Glorot
    /// uniform weights and zeroed biases.
    pub fn new(inputs_amount: usize, outputs_amount: usize) -> ModelLayer {
        Self::new_raw(inputs_amount, outputs_amount).into()
    }

    /// Creates a new raw Dense layer with Glorot uniform weights and zeroed
    /// biases.
    pub fn new_raw(inputs_amount: usize, outputs_amount: usize) -> Dense {
        Self::new_with_initializers(
            inputs_amount,
            outputs_amount,
            Initializer::default(),
            Initializer::Constant(ConstantInitializer::new(0.0)),
        )
    }

    /// Creates a new raw Dense layer initializing the weights and the biases
    /// with the given initializers.
    pub fn new_with_initializers(
        inputs_amount: usize,
        outputs_amount: usize,
        weights_initializer: Initializer,
        biases_initializer: Initializer,
    ) -> Dense {
        let mut dense = Dense {
            inputs_amount,
            outputs_amount,
            weights: Vec::new(),
            biases: Vec::new(),
            last_inputs: Vec::new(),
            last_outputs: Vec::new(),
        };

        dense.weights =
            weights_initializer.initialize_2d((inputs_amount, outputs_amount), &dense);
        dense.biases = biases_initializer.initialize_1d(outputs_amount, &dense);

        dense
    }
}

impl Layer for Dense {
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
        self.outputs_amount
    }

    fn propagate(&mut self, input_samples: &Vec<Vec<f32>>) -> Vec<Vec<f32>> {
        self.last_inputs = input_samples.to_vec();
        self.last_outputs = input_samples
            .par_iter()
            .map(|inputs| self.biases.add(&self.weights.dot_product(inputs)))
            .collect::<Vec<Vec<f32>>>();
        self.last_outputs.to_vec()
    }

    fn back_propagate(
        &mut self,
        should_calculate_input_to_error_derivative: bool,
        layer_output_to_error_derivative: &Vec<Vec<f32>>,
        learning_rate: f32,
    ) -> Option<Vec<Vec<f32>>> {
        assert!(!self.last_inputs.is_empty());
        let samples_amount = layer_output_to_error_derivative.len();
        let float_samples_amount = samples_amount as f32;

        // The input derivatives must use the weights as they were on the
        // forward pass, so they are computed before the update is applied.
        let layer_input_to_error_derivatives = if should_calculate_input_to_error_derivative {
            Some(
                layer_output_to_error_derivative
                    .par_iter()
                    .map(|sample_output_derivatives| {
                        self.weights
                            .iter()
                            .map(|input_to_outputs| {
                                input_to_outputs
                                    .iter()
                                    .enumerate()
                                    .map(|(j, weight)| weight * sample_output_derivatives[j])
                                    .sum::<f32>()
                            })
                            .collect::<Vec<f32>>()
                    })
                    .collect::<Vec<Vec<f32>>>(),
            )
        } else {
            None
        };

        self.weights = (0..self.inputs_amount)
            .into_par_iter()
            .map(|l| {
                (0..self.outputs_amount)
                    .map(|j| {
                        self.weights[l][j]
                            - learning_rate
                                * layer_output_to_error_derivative
                                    .iter()
                                    .enumerate()
                                    .map(|(sample_index, sample_output_derivatives)| {
                                        sample_output_derivatives[j]
                                            * self.last_inputs[sample_index][l]
                                    })
                                    .sum::<f32>()
                                / float_samples_amount
                    })
                    .collect::<Vec<f32>>()
            })
            .collect::<Vec<Vec<f32>>>();

        self.biases = (0..self.outputs_amount)
            .into_par_iter()
            .map(|j| {
                self.biases[j]
                    - learning_rate
                        * layer_output_to_error_derivative
                            .iter()
                            .map(|sample_output_derivatives| sample_output_derivatives[j])
                            .sum::<f32>()
                        / float_samples_amount
            })
            .collect::<Vec<f32>>();

        layer_input_to_error_derivatives
    }
}

#[cfg(test)]
mod tests {
    use super::Dense;
    use crate::layers::Layer;
    use crate::utils::approx_eq::assert_approx_equal_matrix;

    #[test]
    fn should_propagate_with_known_weights() {
        let mut layer = Dense::new_raw(3, 2);
        layer.weights = vec![vec![0.5, -1.0], vec![0.25, 0.5], vec![2.0, 0.0]];
        layer.biases = vec![0.1, -0.2];

        let inputs = vec![vec![1.0, 2.0, 0.5], vec![0.0, -1.0, 1.0]];
        let outputs = layer.propagate(&inputs);

        let expected = vec![
            vec![
                0.1 + 1.0 * 0.5 + 2.0 * 0.25 + 0.5 * 2.0,
                -0.2 + 1.0 * -1.0 + 2.0 * 0.5 + 0.5 * 0.0,
            ],
            vec![
                0.1 + 0.0 * 0.5 + -1.0 * 0.25 + 1.0 * 2.0,
                -0.2 + 0.0 * -1.0 + -1.0 * 0.5 + 1.0 * 0.0,
            ],
        ];

        assert_approx_equal_matrix(&outputs, &expected, 0.000_01);
    }

    #[test]
    fn should_apply_gradients_against_the_derivatives() {
        let mut layer = Dense::new_raw(1, 1);
        layer.weights = vec![vec![1.0]];
        layer.biases = vec![0.0];

        layer.propagate(&vec![vec![2.0]]);
        layer.back_propagate(false, &vec![vec![3.0]], 0.1);

        // dE/dw = 3.0 * 2.0 and dE/db = 3.0, both scaled by the 0.1 learning
        // rate and the single sample.
        assert!((layer.weights[0][0] - (1.0 - 0.1 * 6.0)).abs() <= 0.000_01);
        assert!((layer.biases[0] - (0.0 - 0.1 * 3.0)).abs() <= 0.000_01);
    }
}
