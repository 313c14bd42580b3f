//! The module that defines how batches of numeric samples enter the crate.
//!
//! A [`Batch`] carries flattened `f32` samples together with the
//! [`SampleShape`] every sample must conform to, so that shape violations
//! are caught at the boundary instead of surfacing as garbage predictions
//! deep inside a layer.

use std::fmt;

use rand::thread_rng;
use rand_distr::{Distribution, Normal};
use savefile_derive::Savefile;

/// The `height x width x channels` shape every sample of a [`Batch`] must
/// have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Savefile)]
pub struct SampleShape {
    /// The amount of rows of a sample.
    pub height: usize,
    /// The amount of columns of a sample.
    pub width: usize,
    /// The amount of channels of a sample.
    pub channels: usize,
}

impl SampleShape {
    /// Creates a new shape out of its three dimensions.
    pub const fn new(height: usize, width: usize, channels: usize) -> SampleShape {
        SampleShape {
            height,
            width,
            channels,
        }
    }

    /// The amount of numbers a sample with this shape holds once flattened.
    pub fn volume(&self) -> usize {
        self.height * self.width * self.channels
    }
}

impl fmt::Display for SampleShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.height, self.width, self.channels)
    }
}

/// The error that happens when constructing a [`Batch`] out of samples whose
/// flattened length does not match the declared shape.
#[derive(Debug, PartialEq)]
pub struct BatchShapeError {
    /// The index of the offending sample.
    pub sample_index: usize,
    /// The length the declared shape requires.
    pub expected_len: usize,
    /// The length the sample actually had.
    pub found_len: usize,
}

impl fmt::Display for BatchShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sample #{} has {} values but the declared shape requires {}",
            self.sample_index, self.found_len, self.expected_len
        )
    }
}

impl std::error::Error for BatchShapeError {}

/// A batch of flattened numeric samples that all conform to one
/// [`SampleShape`].
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    shape: SampleShape,
    samples: Vec<Vec<f32>>,
}

impl Batch {
    /// Creates a new Batch after checking that every sample's flattened
    /// length matches the volume of **shape**.
    pub fn new(samples: Vec<Vec<f32>>, shape: SampleShape) -> Result<Batch, BatchShapeError> {
        let expected_len = shape.volume();

        for (sample_index, sample) in samples.iter().enumerate() {
            if sample.len() != expected_len {
                return Err(BatchShapeError {
                    sample_index,
                    expected_len,
                    found_len: sample.len(),
                });
            }
        }

        Ok(Batch { shape, samples })
    }

    /// Creates a Batch of **samples_amount** samples drawn from a standard
    /// normal distribution, mostly useful for exercising models before real
    /// data is wired in.
    pub fn random_normal(samples_amount: usize, shape: SampleShape) -> Batch {
        let distribution =
            Normal::new(0.0_f32, 1.0_f32).expect("unable to create the standard normal distribution");
        let mut rng = thread_rng();
        let volume = shape.volume();

        let samples = (0..samples_amount)
            .map(|_| {
                (0..volume)
                    .map(|_| distribution.sample(&mut rng))
                    .collect::<Vec<f32>>()
            })
            .collect::<Vec<Vec<f32>>>();

        Batch { shape, samples }
    }

    /// The shape every sample of this Batch conforms to.
    pub fn shape(&self) -> SampleShape {
        self.shape
    }

    /// The flattened samples of this Batch.
    pub fn samples(&self) -> &Vec<Vec<f32>> {
        &self.samples
    }

    /// Consumes the Batch yielding its flattened samples.
    pub fn into_samples(self) -> Vec<Vec<f32>> {
        self.samples
    }

    /// The amount of samples in this Batch.
    pub fn samples_amount(&self) -> usize {
        self.samples.len()
    }

    /// Weather or not this Batch holds no samples at all.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// The payload handed to [`crate::service::predict`].
///
/// Inference requests arrive from callers that do not necessarily hand over
/// well-formed tensors, so the boundary keeps both the numeric case and the
/// textual one representable and lets the service reject the latter.
#[derive(Debug, Clone)]
pub enum InferenceInput {
    /// A batch of numeric samples ready to be propagated through a model.
    Tensor(Batch),
    /// A textual payload, never accepted for inference.
    Text(String),
}

impl InferenceInput {
    /// A short description of the payload kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            InferenceInput::Tensor(_) => "tensor",
            InferenceInput::Text(_) => "text",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Batch, SampleShape};

    #[test]
    fn should_compute_shape_volumes() {
        assert_eq!(SampleShape::new(28, 28, 1).volume(), 784);
        assert_eq!(SampleShape::new(4, 3, 2).volume(), 24);
    }

    #[test]
    fn should_accept_samples_matching_the_shape() {
        let shape = SampleShape::new(2, 2, 1);
        let batch = Batch::new(vec![vec![0.0; 4], vec![1.0; 4]], shape)
            .expect("samples matching the shape should be accepted");

        assert_eq!(batch.samples_amount(), 2);
        assert_eq!(batch.shape(), shape);
    }

    #[test]
    fn should_reject_samples_not_matching_the_shape() {
        let shape = SampleShape::new(2, 2, 1);
        let result = Batch::new(vec![vec![0.0; 4], vec![1.0; 9]], shape);

        let err = result.expect_err("a 9 value sample should not fit a 2x2x1 shape");
        assert_eq!(err.sample_index, 1);
        assert_eq!(err.expected_len, 4);
        assert_eq!(err.found_len, 9);
    }

    #[test]
    fn should_generate_random_batches_with_the_right_volume() {
        let shape = SampleShape::new(28, 28, 1);
        let batch = Batch::random_normal(5, shape);

        assert_eq!(batch.samples_amount(), 5);
        for sample in batch.samples() {
            assert_eq!(sample.len(), shape.volume());
        }
    }
}
