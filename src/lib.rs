//! A layer-driven **Machine Learning** crate that makes it extremely easy
//! creating, training and running a convolutional Model for predicting
//! handwritten digits out of `28x28x1` grayscale images.
//!
//! The [`service`] module is the intended entry point: it builds the digit
//! classification Model, trains it on a labeled [`tensor::Batch`] and runs
//! inference over it, validating the input contracts along the way. The
//! modules below it (`layers`, `loss_functions`, `model`) are the machine
//! learning core the service delegates to and can also be used directly to
//! assemble custom sequential models.

#[deny(missing_docs)]
pub mod layers;
pub mod loss_functions;
pub mod model;
pub mod service;
pub mod tensor;
pub mod utils;

pub use model::Model;

pub mod types;

pub mod datasets;

#[cfg(test)]
mod tests;
