//! The module that contains all of the loss functions a Model can be
//! trained against.

pub mod categorical_cross_entropy;
pub mod mean_squared;

pub use categorical_cross_entropy::CategoricalCrossEntropy;
pub use mean_squared::MeanSquared;

use std::fmt::Debug;

use rayon::iter::{IntoParallelIterator, ParallelIterator};

/// A trait representing the definitions of a function for computing the
/// loss/cost/error of a Model.
pub trait LossFunction
where
    Self: Sync + Send + Debug,
{
    /// Computes the loss of one sample based on the implementation in
    /// question.
    ///
    /// Don't recommend using any kind of parallel computing to compute this
    /// loss as rayon is already used when averaging losses.
    fn compute_loss(&self, outputs: &Vec<f32>, expected_outputs: &Vec<f32>) -> f32;

    /// Computes the derivative of the loss with respect to one of the
    /// Model's outputs.
    ///
    /// dE/dO
    fn compute_loss_derivative_with_respect_to_output(
        &self,
        outputs_amount: usize,
        output: f32,
        expected_output: f32,
    ) -> f32;

    /// Computes the average of the loss over all of the samples using the
    /// current implementation.
    fn average_loss_for_samples(
        &self,
        sample_outputs: &Vec<Vec<f32>>,
        sample_expected_outputs: &Vec<Vec<f32>>,
    ) -> f32 {
        let samples_amount = sample_outputs.len();
        assert_eq!(samples_amount, sample_expected_outputs.len());

        (0..samples_amount)
            .into_par_iter()
            .map(|sample_index| {
                self.compute_loss(
                    &sample_outputs[sample_index],
                    &sample_expected_outputs[sample_index],
                )
            })
            .sum::<f32>()
            / samples_amount as f32
    }
}
