//! The module that implements the Mean Squared loss function.

use crate::loss_functions::LossFunction;
use crate::types::ModelLossFunction;

#[derive(Debug)]
/// The **Mean Squared** loss function, which just averages the squared
/// distance between every output and what it was expected to be.
///
/// Penalizes large mistakes much more than small ones, and works for about
/// any regression-shaped problem.
pub struct MeanSquared;

impl MeanSquared {
    /// Creates a new Mean Squared loss function wrapped into a
    /// [`ModelLossFunction`].
    pub fn new() -> ModelLossFunction {
        Self::new_raw().into()
    }

    /// Creates a new raw Mean Squared loss function.
    pub fn new_raw() -> MeanSquared {
        MeanSquared
    }
}

impl LossFunction for MeanSquared {
    fn compute_loss(&self, outputs: &Vec<f32>, expected_outputs: &Vec<f32>) -> f32 {
        assert_eq!(outputs.len(), expected_outputs.len());

        outputs
            .iter()
            .zip(expected_outputs)
            .map(|(output, expected_output)| (output - expected_output).powi(2))
            .sum::<f32>()
            / outputs.len() as f32
    }

    fn compute_loss_derivative_with_respect_to_output(
        &self,
        outputs_amount: usize,
        output: f32,
        expected_output: f32,
    ) -> f32 {
        2.0 * (output - expected_output) / outputs_amount as f32
    }
}

#[cfg(test)]
mod tests {
    use super::MeanSquared;
    use crate::loss_functions::LossFunction;

    #[test]
    fn should_compute_the_averaged_squared_distance() {
        let loss = MeanSquared::new_raw();

        let computed = loss.compute_loss(&vec![1.0, 2.0], &vec![0.0, 4.0]);

        assert!((computed - (1.0 + 4.0) / 2.0).abs() <= 0.000_01);
    }

    #[test]
    fn should_compute_derivatives_pointing_towards_the_expected_output() {
        let loss = MeanSquared::new_raw();

        // Too large of an output must yield a positive derivative and too
        // small of one a negative derivative.
        assert!(loss.compute_loss_derivative_with_respect_to_output(2, 1.0, 0.0) > 0.0);
        assert!(loss.compute_loss_derivative_with_respect_to_output(2, 0.0, 1.0) < 0.0);
    }
}
