//! The module that defines the 2D max pooling layer.

use rayon::prelude::*;
use savefile_derive::Savefile;

use crate::layers::Layer;
use crate::types::ModelLayer;

#[derive(Debug, Savefile)]
/// A layer that downsamples every feature map it receives by keeping only
/// the largest value inside each `pool_size x pool_size` window.
///
/// The backward pass routes each output derivative to the input position
/// that won its window, so the layer has to remember those positions from
/// the last forward pass. It has no learnable parameters.
pub struct MaxPool2D {
    /// The size of every incoming feature map, width and height
    /// respectively.
    pub inputs_size: (usize, usize),
    /// The amount of feature maps each sample carries.
    pub channels_amount: usize,
    /// The side of the square pooling window, which is also the stride.
    pub pool_size: usize,

    #[savefile_ignore]
    #[savefile_introspect_ignore]
    last_inputs: Vec<Vec<f32>>,
    #[savefile_ignore]
    #[savefile_introspect_ignore]
    last_outputs: Vec<Vec<f32>>,
    #[savefile_ignore]
    #[savefile_introspect_ignore]
    last_max_indices: Vec<Vec<usize>>,
}

impl MaxPool2D {
    /// Creates a new 2D max pooling layer wrapped into a [`ModelLayer`].
    pub fn new(
        inputs_size: (usize, usize),
        channels_amount: usize,
        pool_size: usize,
    ) -> ModelLayer {
        Self::new_raw(inputs_size, channels_amount, pool_size).into()
    }

    /// Creates a new raw 2D max pooling layer.
    pub fn new_raw(
        inputs_size: (usize, usize),
        channels_amount: usize,
        pool_size: usize,
    ) -> MaxPool2D {
        assert!(pool_size > 0);
        assert!(inputs_size.0 >= pool_size && inputs_size.1 >= pool_size);

        MaxPool2D {
            inputs_size,
            channels_amount,
            pool_size,
            last_inputs: Vec::new(),
            last_outputs: Vec::new(),
            last_max_indices: Vec::new(),
        }
    }

    /// The size of one pooled feature map, width and height respectively.
    pub fn pooled_size(&self) -> (usize, usize) {
        (
            (self.inputs_size.0 - self.pool_size) / self.pool_size + 1,
            (self.inputs_size.1 - self.pool_size) / self.pool_size + 1,
        )
    }
}

impl Layer for MaxPool2D {
    fn get_last_inputs(&self) -> &Vec<Vec<f32>> {
        &self.last_inputs
    }

    fn get_last_outputs(&self) -> &Vec<Vec<f32>> {
        &self.last_outputs
    }

    fn get_inputs_amount(&self) -> usize {
        self.inputs_size.0 * self.inputs_size.1 * self.channels_amount
    }

    fn get_outputs_amount(&self) -> usize {
        let (pooled_width, pooled_height) = self.pooled_size();
        pooled_width * pooled_height * self.channels_amount
    }

    fn propagate(&mut self, input_samples: &Vec<Vec<f32>>) -> Vec<Vec<f32>> {
        let inputs_amount = self.get_inputs_amount();
        assert!(input_samples
            .iter()
            .all(|sample| sample.len() == inputs_amount));

        let (input_width, input_height) = self.inputs_size;
        let map_volume = input_width * input_height;
        let (pooled_width, pooled_height) = self.pooled_size();

        let pooled: Vec<(Vec<f32>, Vec<usize>)> = input_samples
            .par_iter()
            .map(|sample| {
                let mut outputs =
                    Vec::with_capacity(pooled_width * pooled_height * self.channels_amount);
                let mut max_indices =
                    Vec::with_capacity(pooled_width * pooled_height * self.channels_amount);

                for channel in 0..self.channels_amount {
                    for y in 0..pooled_height {
                        for x in 0..pooled_width {
                            let mut best = f32::NEG_INFINITY;
                            let mut best_index = 0;

                            for ky in 0..self.pool_size {
                                for kx in 0..self.pool_size {
                                    let input_index = channel * map_volume
                                        + (y * self.pool_size + ky) * input_width
                                        + (x * self.pool_size + kx);
                                    let value = sample[input_index];

                                    if value > best {
                                        best = value;
                                        best_index = input_index;
                                    }
                                }
                            }

                            outputs.push(best);
                            max_indices.push(best_index);
                        }
                    }
                }

                (outputs, max_indices)
            })
            .collect();

        self.last_inputs = input_samples.to_vec();
        self.last_outputs = pooled.iter().map(|(outputs, _)| outputs.to_vec()).collect();
        self.last_max_indices = pooled.into_iter().map(|(_, indices)| indices).collect();

        self.last_outputs.to_vec()
    }

    fn back_propagate(
        &mut self,
        should_calculate_input_to_error_derivative: bool,
        layer_output_to_error_derivative: &Vec<Vec<f32>>,
        _learning_rate: f32,
    ) -> Option<Vec<Vec<f32>>> {
        assert!(!self.last_max_indices.is_empty());

        if should_calculate_input_to_error_derivative {
            let inputs_amount = self.get_inputs_amount();

            Some(
                layer_output_to_error_derivative
                    .par_iter()
                    .zip(&self.last_max_indices)
                    .map(|(sample_output_derivatives, max_indices)| {
                        let mut input_derivatives = vec![0.0_f32; inputs_amount];

                        for (output_derivative, max_index) in
                            sample_output_derivatives.iter().zip(max_indices)
                        {
                            input_derivatives[*max_index] += output_derivative;
                        }

                        input_derivatives
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
    use super::MaxPool2D;
    use crate::layers::Layer;

    #[test]
    fn should_keep_the_largest_value_of_every_window() {
        let sample = vec![
            0.1, 0.9, 0.2, 0.4, //
            0.3, 0.5, 0.8, 0.6, //
            0.2, 0.1, 0.3, 0.2, //
            0.7, 0.4, 0.1, 0.5,
        ];

        let mut layer = MaxPool2D::new_raw((4, 4), 1, 2);
        let result = layer.propagate(&vec![sample]);

        assert_eq!(result, vec![vec![0.9, 0.8, 0.7, 0.5]]);
    }

    #[test]
    fn should_route_derivatives_back_to_the_window_winners() {
        let sample = vec![
            0.1, 0.9, 0.2, 0.4, //
            0.3, 0.5, 0.8, 0.6, //
            0.2, 0.1, 0.3, 0.2, //
            0.7, 0.4, 0.1, 0.5,
        ];

        let mut layer = MaxPool2D::new_raw((4, 4), 1, 2);
        layer.propagate(&vec![sample]);

        let derivatives = layer
            .back_propagate(true, &vec![vec![1.0, 2.0, 3.0, 4.0]], 0.0)
            .expect("max pooling should route derivatives when asked to");

        let mut expected = vec![0.0_f32; 16];
        expected[1] = 1.0;
        expected[6] = 2.0;
        expected[12] = 3.0;
        expected[15] = 4.0;

        assert_eq!(derivatives, vec![expected]);
    }
}
