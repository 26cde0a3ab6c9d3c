pub mod calculator;
pub mod classifier;

#[cfg(test)]
mod classifier_tests;

pub use calculator::*;
pub use classifier::*;
