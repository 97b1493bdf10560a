use thiserror::Error;

pub mod activity;
pub mod tasks;

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("Cannot pick {requested} distinct task names from a pool of {available} templates")]
    InsufficientTemplates { requested: usize, available: usize },

    #[error("Cannot split {duration}h into {count} positive durations")]
    ArithmeticInvariant { duration: u32, count: usize },

    #[error("Date out of range: {0}")]
    DateOutOfRange(#[from] jiff::Error),
}
