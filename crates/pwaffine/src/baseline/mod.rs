//! Baseline models to compare piecewise affine models against.

mod naive_bayes;

pub use naive_bayes::GaussianNaiveBayes;
