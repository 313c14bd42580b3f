//! The module that defines the convolutional layer.

use rayon::prelude::*;
use savefile_derive::Savefile;

use crate::layers::initializers::{Initializer, InitializerTrait, LimitedRandomInitializer};
use crate::layers::Layer;
use crate::types::ModelLayer;

#[derive(Debug, Savefile)]
/// A layer that tries to compact data from a 2D image, or just a matrix,
/// without losing spatial information, by sliding a set of small filters
/// side-to-side over the image and multiplying the covered pixels by the
/// filter's weights.
///
/// The layer expects single-channel images and computes one feature map per
/// filter using valid padding and a stride of one, so a `WxH` image becomes
/// `filters_amount` maps of `(W - FW + 1)x(H - FH + 1)` values, flattened
/// filter-major into each output sample.
pub struct Conv2D {
    /// The size of the inputs, width and height respectively.
    pub inputs_size: (usize, usize),
    /// The size of every filter, width and height respectively.
    pub filter_size: (usize, usize),
    /// The amount of filters slid over the image.
    pub filters_amount: usize,

    /// The weights of every filter, laid out as `[filter][row][column]`.
    pub filter_weights: Vec<Vec<Vec<f32>>>,
    /// One bias per filter, added to every value of that filter's map.
    pub biases: Vec<f32>,

    #[savefile_ignore]
    #[savefile_introspect_ignore]
    last_inputs: Vec<Vec<f32>>,
    #[savefile_ignore]
    #[savefile_introspect_ignore]
    last_outputs: Vec<Vec<f32>>,
}

impl Conv2D {
    /// Creates a new 2D convolutional layer with random filters, wrapped
    /// into a [`ModelLayer`] ready for being used in a Model.
    pub fn new(
        inputs_size: (usize, usize),
        filter_size: (usize, usize),
        filters_amount: usize,
    ) -> ModelLayer {
        Self::new_raw(inputs_size, filter_size, filters_amount).into()
    }

    /// Creates a new raw 2D convolutional layer with random filters.
    pub fn new_raw(
        inputs_size: (usize, usize),
        filter_size: (usize, usize),
        filters_amount: usize,
    ) -> Conv2D {
        let mut conv2d = Conv2D {
            inputs_size,
            filter_size,
            filters_amount,
            filter_weights: Vec::new(),
            biases: Vec::new(),
            last_inputs: Vec::new(),
            last_outputs: Vec::new(),
        };

        let weights_initializer =
            Initializer::LimitedRandom(LimitedRandomInitializer::new(-1.0_f32..1.0_f32));
        conv2d.filter_weights = weights_initializer.initialize_3d(
            (filters_amount, filter_size.1, filter_size.0),
            &conv2d,
        );
        conv2d.biases = vec![0.0; filters_amount];

        conv2d
    }

    /// The size of one feature map, width and height respectively.
    pub fn convolution_size(&self) -> (usize, usize) {
        (
            self.inputs_size.0 - self.filter_size.0 + 1,
            self.inputs_size.1 - self.filter_size.1 + 1,
        )
    }
}

impl Layer for Conv2D {
    fn get_last_inputs(&self) -> &Vec<Vec<f32>> {
        &self.last_inputs
    }

    fn get_last_outputs(&self) -> &Vec<Vec<f32>> {
        &self.last_outputs
    }

    fn get_inputs_amount(&self) -> usize {
        self.inputs_size.0 * self.inputs_size.1
    }

    fn get_outputs_amount(&self) -> usize {
        let (conv_width, conv_height) = self.convolution_size();
        conv_width * conv_height * self.filters_amount
    }

    fn propagate(&mut self, input_samples: &Vec<Vec<f32>>) -> Vec<Vec<f32>> {
        let image_volume = self.get_inputs_amount();
        assert!(input_samples
            .iter()
            .all(|sample| sample.len() == image_volume));

        let (input_width, _) = self.inputs_size;
        let (filter_width, filter_height) = self.filter_size;
        let (conv_width, conv_height) = self.convolution_size();

        self.last_inputs = input_samples.to_vec();
        self.last_outputs = input_samples
            .par_iter()
            .map(|image| {
                let mut outputs =
                    Vec::with_capacity(conv_width * conv_height * self.filters_amount);

                for (filter, bias) in self.filter_weights.iter().zip(&self.biases) {
                    for y in 0..conv_height {
                        for x in 0..conv_width {
                            let mut acc = *bias;

                            for ky in 0..filter_height {
                                for kx in 0..filter_width {
                                    acc += filter[ky][kx]
                                        * image[(y + ky) * input_width + (x + kx)];
                                }
                            }

                            outputs.push(acc);
                        }
                    }
                }

                outputs
            })
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

        let (input_width, _) = self.inputs_size;
        let (filter_width, filter_height) = self.filter_size;
        let (conv_width, conv_height) = self.convolution_size();
        let conv_volume = conv_width * conv_height;
        let image_volume = self.get_inputs_amount();

        // As with the other parameterized layers the input derivatives are
        // computed against the filters as they were on the forward pass.
        let layer_input_to_error_derivatives = if should_calculate_input_to_error_derivative {
            Some(
                layer_output_to_error_derivative
                    .par_iter()
                    .map(|sample_output_derivatives| {
                        let mut input_derivatives = vec![0.0_f32; image_volume];

                        for (filter_index, filter) in self.filter_weights.iter().enumerate() {
                            for y in 0..conv_height {
                                for x in 0..conv_width {
                                    let output_derivative = sample_output_derivatives
                                        [filter_index * conv_volume + y * conv_width + x];

                                    for ky in 0..filter_height {
                                        for kx in 0..filter_width {
                                            input_derivatives
                                                [(y + ky) * input_width + (x + kx)] +=
                                                output_derivative * filter[ky][kx];
                                        }
                                    }
                                }
                            }
                        }

                        input_derivatives
                    })
                    .collect::<Vec<Vec<f32>>>(),
            )
        } else {
            None
        };

        self.filter_weights = (0..self.filters_amount)
            .into_par_iter()
            .map(|filter_index| {
                (0..filter_height)
                    .map(|ky| {
                        (0..filter_width)
                            .map(|kx| {
                                let gradient = layer_output_to_error_derivative
                                    .iter()
                                    .zip(&self.last_inputs)
                                    .map(|(sample_output_derivatives, image)| {
                                        let mut acc = 0.0_f32;

                                        for y in 0..conv_height {
                                            for x in 0..conv_width {
                                                acc += sample_output_derivatives[filter_index
                                                    * conv_volume
                                                    + y * conv_width
                                                    + x]
                                                    * image[(y + ky) * input_width + (x + kx)];
                                            }
                                        }

                                        acc
                                    })
                                    .sum::<f32>()
                                    / float_samples_amount;

                                self.filter_weights[filter_index][ky][kx]
                                    - learning_rate * gradient
                            })
                            .collect::<Vec<f32>>()
                    })
                    .collect::<Vec<Vec<f32>>>()
            })
            .collect::<Vec<Vec<Vec<f32>>>>();

        self.biases = (0..self.filters_amount)
            .into_par_iter()
            .map(|filter_index| {
                let gradient = layer_output_to_error_derivative
                    .iter()
                    .map(|sample_output_derivatives| {
                        sample_output_derivatives
                            [filter_index * conv_volume..(filter_index + 1) * conv_volume]
                            .iter()
                            .sum::<f32>()
                    })
                    .sum::<f32>()
                    / float_samples_amount;

                self.biases[filter_index] - learning_rate * gradient
            })
            .collect::<Vec<f32>>();

        layer_input_to_error_derivatives
    }
}

#[cfg(test)]
mod tests {
    use super::Conv2D;
    use crate::layers::Layer;
    use crate::utils::approx_eq::assert_approx_equal_distance;

    #[test]
    fn should_convolute_correctly() -> () {
        let image = vec![
            0.5, 0.2, 0.8, //
            0.1, 0.9, 0.4, //
            0.7, 0.3, 0.6,
        ];
        let filter = vec![vec![1.0, -1.0], vec![0.5, 2.0]];

        let mut layer = Conv2D::new_raw((3, 3), (2, 2), 1);
        layer.filter_weights = vec![filter];
        layer.biases = vec![0.0];

        let result = layer.propagate(&vec![image]);

        let convolution = vec![
            0.5 * 1.0 + 0.2 * -1.0 + 0.1 * 0.5 + 0.9 * 2.0,
            0.2 * 1.0 + 0.8 * -1.0 + 0.9 * 0.5 + 0.4 * 2.0,
            0.1 * 1.0 + 0.9 * -1.0 + 0.7 * 0.5 + 0.3 * 2.0,
            0.9 * 1.0 + 0.4 * -1.0 + 0.3 * 0.5 + 0.6 * 2.0,
        ];

        assert_eq!(result.len(), 1);
        assert_approx_equal_distance(&result[0], &convolution, 0.000_01);
    }

    #[test]
    fn should_stack_one_feature_map_per_filter() -> () {
        let image = vec![
            0.5, 0.2, 0.8, //
            0.1, 0.9, 0.4, //
            0.7, 0.3, 0.6,
        ];

        let mut layer = Conv2D::new_raw((3, 3), (2, 2), 2);
        layer.filter_weights = vec![
            vec![vec![1.0, 0.0], vec![0.0, 0.0]],
            vec![vec![0.0, 0.0], vec![0.0, 1.0]],
        ];
        layer.biases = vec![0.0, 0.25];

        let result = layer.propagate(&vec![image]);

        // The first filter picks the top-left pixel of every window while
        // the second picks the bottom-right one, plus its bias.
        let expected = vec![
            0.5, 0.2, 0.1, 0.9, //
            0.9 + 0.25, 0.4 + 0.25, 0.3 + 0.25, 0.6 + 0.25,
        ];

        assert_eq!(layer.get_outputs_amount(), 8);
        assert_approx_equal_distance(&result[0], &expected, 0.000_01);
    }
}
