//! The module for the datasets feature of the crate.
//!
//! Currently contains the following datasets.
//! - MNIST

/// The module containing the MNIST dataset of handwritten digits.
#[cfg(feature = "mnist")]
pub mod mnist;
