//! The module that contains all of the layers a sequential Model can be
//! assembled from.

pub mod activations;
pub mod conv2d;
pub mod dense;
pub mod initializers;
pub mod max_pool2d;

pub use conv2d::Conv2D;
pub use dense::Dense;
pub use max_pool2d::MaxPool2D;

/// A layer can be defined basically as a function receiving some input
/// samples and giving output samples, something can be called a 'Layer' if
/// it does that.
///
/// Samples are kept flattened: a batch is a `Vec` with one inner `Vec<f32>`
/// per sample. Layers cache the inputs and outputs of their last forward
/// pass since the backward pass needs them.
pub trait Layer {
    /// Gets the last input samples that were used in the 'propagate' method,
    /// having this getter forces a struct that implements Layer to save its
    /// inputs on propagate.
    fn get_last_inputs(&self) -> &Vec<Vec<f32>>;

    /// Gets the last output samples that were the result in the 'propagate'
    /// method, having this getter forces a struct that implements Layer to
    /// save its outputs on propagate.
    fn get_last_outputs(&self) -> &Vec<Vec<f32>>;

    /// Gets the amount of inputs this layer is expected to receive.
    ///
    /// Some layers just have an arbitrary value for this, like activation
    /// layers where `outputs_amount == inputs_amount`, but layers like the
    /// Dense layer have a specific amount because of their architecture.
    fn get_inputs_amount(&self) -> usize;

    /// Gets the amount of outputs this layer is expected to result in on
    /// propagation.
    fn get_outputs_amount(&self) -> usize;

    /// Should calculate the outputs of the layer based on the inputs.
    fn propagate(&mut self, inputs: &Vec<Vec<f32>>) -> Vec<Vec<f32>>;

    /// Should calculate and apply the gradients, receiving the derivatives
    /// of the loss with respect to the outputs and then returning the
    /// derivatives of the loss with respect to the inputs.
    ///
    /// dE/dI <- back_propagate <- dE/dO
    ///
    /// The returning part can be disabled where the layer is the first one
    /// of the Model and there is nothing left to receive the derivatives.
    fn back_propagate(
        &mut self,
        should_calculate_input_to_error_derivative: bool,
        layer_output_to_error_derivative: &Vec<Vec<f32>>,
        learning_rate: f32,
    ) -> Option<Vec<Vec<f32>>>;
}
