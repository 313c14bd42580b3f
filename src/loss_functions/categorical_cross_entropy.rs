//! The module that implements the Categorical Cross Entropy loss function.

use crate::loss_functions::LossFunction;
use crate::types::ModelLossFunction;

/// Probabilities are clamped to at least this value before taking their
/// logarithm or dividing by them, as a raw `0.0` would yield infinities.
const MIN_PROBABILITY: f32 = 1e-7;

#[derive(Debug)]
/// The **Categorical Cross Entropy** loss function made for, as the name
/// may suggest, classifying the loss of a categorical Model.
///
/// This loss function is very good for categorical problems because it
/// penalizes heavily when the probability of the expected class gets close
/// to zero, much more than a distance-based loss would.
///
/// Expects the Model's outputs to be a probability distribution, so it
/// should be paired with a final SoftMax layer, and the expected outputs to
/// be one-hot encoded class vectors.
pub struct CategoricalCrossEntropy;

impl CategoricalCrossEntropy {
    /// Creates a new Categorical Cross Entropy loss function wrapped into a
    /// [`ModelLossFunction`].
    pub fn new() -> ModelLossFunction {
        Self::new_raw().into()
    }

    /// Creates a new raw Categorical Cross Entropy loss function.
    pub fn new_raw() -> CategoricalCrossEntropy {
        CategoricalCrossEntropy
    }
}

impl LossFunction for CategoricalCrossEntropy {
    fn compute_loss(&self, outputs: &Vec<f32>, expected_outputs: &Vec<f32>) -> f32 {
        assert_eq!(outputs.len(), expected_outputs.len());

        -outputs
            .iter()
            .zip(expected_outputs)
            .map(|(output, expected_output)| expected_output * output.max(MIN_PROBABILITY).ln())
            .sum::<f32>()
    }

    fn compute_loss_derivative_with_respect_to_output(
        &self,
        _outputs_amount: usize,
        output: f32,
        expected_output: f32,
    ) -> f32 {
        -expected_output / output.max(MIN_PROBABILITY)
    }
}

#[cfg(test)]
mod tests {
    use super::CategoricalCrossEntropy;
    use crate::loss_functions::LossFunction;

    #[test]
    fn should_compute_the_expected_class_surprisal() {
        let loss = CategoricalCrossEntropy::new_raw();

        let computed = loss.compute_loss(&vec![0.7, 0.2, 0.1], &vec![1.0, 0.0, 0.0]);

        assert!((computed - -(0.7_f32.ln())).abs() <= 0.000_01);
    }

    #[test]
    fn should_penalize_confidently_wrong_predictions_more() {
        let loss = CategoricalCrossEntropy::new_raw();

        let somewhat_wrong = loss.compute_loss(&vec![0.4, 0.6], &vec![1.0, 0.0]);
        let confidently_wrong = loss.compute_loss(&vec![0.05, 0.95], &vec![1.0, 0.0]);

        assert!(confidently_wrong > somewhat_wrong);
    }

    #[test]
    fn should_not_yield_infinities_on_zeroed_probabilities() {
        let loss = CategoricalCrossEntropy::new_raw();

        let computed = loss.compute_loss(&vec![0.0, 1.0], &vec![1.0, 0.0]);
        let derivative = loss.compute_loss_derivative_with_respect_to_output(2, 0.0, 1.0);

        assert!(computed.is_finite());
        assert!(derivative.is_finite());
    }
}
