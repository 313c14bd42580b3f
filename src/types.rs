//! A module containing the crate-wide data types: the enums a sequential
//! Model dispatches through and the types that configure and describe a
//! training run.

use savefile_derive::Savefile;

use crate::layers::activations::{ReLU, SoftMax};
use crate::layers::{Conv2D, Dense, Layer, MaxPool2D};
use crate::loss_functions::{CategoricalCrossEntropy, LossFunction, MeanSquared};

#[derive(Debug, Savefile)]
/// All of the possible layers that a usual sequential Model can have.
#[allow(missing_docs)]
pub enum ModelLayer {
    Dense(Dense),
    Conv2D(Conv2D),
    MaxPool2D(MaxPool2D),
    ReLU(ReLU),
    SoftMax(SoftMax),
}

impl From<Dense> for ModelLayer {
    fn from(layer: Dense) -> Self {
        ModelLayer::Dense(layer)
    }
}

impl From<Conv2D> for ModelLayer {
    fn from(layer: Conv2D) -> Self {
        ModelLayer::Conv2D(layer)
    }
}

impl From<MaxPool2D> for ModelLayer {
    fn from(layer: MaxPool2D) -> Self {
        ModelLayer::MaxPool2D(layer)
    }
}

impl From<ReLU> for ModelLayer {
    fn from(layer: ReLU) -> Self {
        ModelLayer::ReLU(layer)
    }
}

impl From<SoftMax> for ModelLayer {
    fn from(layer: SoftMax) -> Self {
        ModelLayer::SoftMax(layer)
    }
}

impl Layer for ModelLayer {
    fn get_last_inputs(&self) -> &Vec<Vec<f32>> {
        match self {
            ModelLayer::Dense(layer) => layer.get_last_inputs(),
            ModelLayer::Conv2D(layer) => layer.get_last_inputs(),
            ModelLayer::MaxPool2D(layer) => layer.get_last_inputs(),
            ModelLayer::ReLU(layer) => layer.get_last_inputs(),
            ModelLayer::SoftMax(layer) => layer.get_last_inputs(),
        }
    }

    fn get_last_outputs(&self) -> &Vec<Vec<f32>> {
        match self {
            ModelLayer::Dense(layer) => layer.get_last_outputs(),
            ModelLayer::Conv2D(layer) => layer.get_last_outputs(),
            ModelLayer::MaxPool2D(layer) => layer.get_last_outputs(),
            ModelLayer::ReLU(layer) => layer.get_last_outputs(),
            ModelLayer::SoftMax(layer) => layer.get_last_outputs(),
        }
    }

    fn get_inputs_amount(&self) -> usize {
        match self {
            ModelLayer::Dense(layer) => layer.get_inputs_amount(),
            ModelLayer::Conv2D(layer) => layer.get_inputs_amount(),
            ModelLayer::MaxPool2D(layer) => layer.get_inputs_amount(),
            ModelLayer::ReLU(layer) => layer.get_inputs_amount(),
            ModelLayer::SoftMax(layer) => layer.get_inputs_amount(),
        }
    }

    fn get_outputs_amount(&self) -> usize {
        match self {
            ModelLayer::Dense(layer) => layer.get_outputs_amount(),
            ModelLayer::Conv2D(layer) => layer.get_outputs_amount(),
            ModelLayer::MaxPool2D(layer) => layer.get_outputs_amount(),
            ModelLayer::ReLU(layer) => layer.get_outputs_amount(),
            ModelLayer::SoftMax(layer) => layer.get_outputs_amount(),
        }
    }

    fn propagate(&mut self, inputs: &Vec<Vec<f32>>) -> Vec<Vec<f32>> {
        match self {
            ModelLayer::Dense(layer) => layer.propagate(inputs),
            ModelLayer::Conv2D(layer) => layer.propagate(inputs),
            ModelLayer::MaxPool2D(layer) => layer.propagate(inputs),
            ModelLayer::ReLU(layer) => layer.propagate(inputs),
            ModelLayer::SoftMax(layer) => layer.propagate(inputs),
        }
    }

    fn back_propagate(
        &mut self,
        should_calculate_input_to_error_derivative: bool,
        layer_output_to_error_derivative: &Vec<Vec<f32>>,
        learning_rate: f32,
    ) -> Option<Vec<Vec<f32>>> {
        match self {
            ModelLayer::Dense(layer) => layer.back_propagate(
                should_calculate_input_to_error_derivative,
                layer_output_to_error_derivative,
                learning_rate,
            ),
            ModelLayer::Conv2D(layer) => layer.back_propagate(
                should_calculate_input_to_error_derivative,
                layer_output_to_error_derivative,
                learning_rate,
            ),
            ModelLayer::MaxPool2D(layer) => layer.back_propagate(
                should_calculate_input_to_error_derivative,
                layer_output_to_error_derivative,
                learning_rate,
            ),
            ModelLayer::ReLU(layer) => layer.back_propagate(
                should_calculate_input_to_error_derivative,
                layer_output_to_error_derivative,
                learning_rate,
            ),
            ModelLayer::SoftMax(layer) => layer.back_propagate(
                should_calculate_input_to_error_derivative,
                layer_output_to_error_derivative,
                learning_rate,
            ),
        }
    }
}

#[derive(Debug)]
/// All of the loss functions implemented in the crate that a usual
/// sequential Model can use.
#[allow(missing_docs)]
pub enum ModelLossFunction {
    MeanSquared(MeanSquared),
    CategoricalCrossEntropy(CategoricalCrossEntropy),
}

impl From<MeanSquared> for ModelLossFunction {
    fn from(loss: MeanSquared) -> Self {
        ModelLossFunction::MeanSquared(loss)
    }
}

impl From<CategoricalCrossEntropy> for ModelLossFunction {
    fn from(loss: CategoricalCrossEntropy) -> Self {
        ModelLossFunction::CategoricalCrossEntropy(loss)
    }
}

impl LossFunction for ModelLossFunction {
    fn compute_loss(&self, outputs: &Vec<f32>, expected_outputs: &Vec<f32>) -> f32 {
        match self {
            ModelLossFunction::MeanSquared(lossfn) => {
                lossfn.compute_loss(outputs, expected_outputs)
            }
            ModelLossFunction::CategoricalCrossEntropy(lossfn) => {
                lossfn.compute_loss(outputs, expected_outputs)
            }
        }
    }

    fn compute_loss_derivative_with_respect_to_output(
        &self,
        outputs_amount: usize,
        output: f32,
        expected_output: f32,
    ) -> f32 {
        match self {
            ModelLossFunction::MeanSquared(lossfn) => lossfn
                .compute_loss_derivative_with_respect_to_output(
                    outputs_amount,
                    output,
                    expected_output,
                ),
            ModelLossFunction::CategoricalCrossEntropy(lossfn) => lossfn
                .compute_loss_derivative_with_respect_to_output(
                    outputs_amount,
                    output,
                    expected_output,
                ),
        }
    }
}

/// A struct that defines the options for training a Model.
pub struct TrainingOptions {
    /// The loss function that will be used for calculating how **wrong** the
    /// Model was after some prediction over many samples.
    pub loss_algorithm: ModelLossFunction,
    /// The amount at which the gradients should be multiplied as to have a
    /// gradual learning experience for the Model.
    pub learning_rate: f32,
    /// The amount of epochs that the Model should train for.
    pub epochs: usize,
    /// Weather or not the training process should render a progress bar with
    /// the current epoch and the loss after applying its gradients.
    pub verbose: bool,
}

#[derive(Debug, Clone, PartialEq)]
/// What one call to [`crate::Model::fit`] leaves behind: the loss measured
/// at the end of every epoch, in order.
pub struct TrainingHistory {
    /// The average loss over the training samples after each epoch.
    pub epoch_losses: Vec<f32>,
}

impl TrainingHistory {
    /// Creates a history with room for the given amount of epochs.
    pub(crate) fn with_capacity(epochs: usize) -> TrainingHistory {
        TrainingHistory {
            epoch_losses: Vec::with_capacity(epochs),
        }
    }

    /// The amount of epochs this history covers.
    pub fn epochs(&self) -> usize {
        self.epoch_losses.len()
    }

    /// The loss after the last epoch, if any epoch ran at all.
    pub fn last_loss(&self) -> Option<f32> {
        self.epoch_losses.last().copied()
    }
}
