//! Error types for the mining pipeline

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MineError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A backing resource (kernel, worker pool) is unavailable. Fatal for the run.
    #[error("Mining environment unavailable: {0}")]
    Environment(String),

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Synthetic itemset ids ran past `u32::MAX`.
    #[error("Itemset id space exhausted: {recorded} ids allocated above universe {universe}")]
    IdSpaceExhausted { universe: u32, recorded: usize },

    #[error("Candidate buffer of {slots} slots does not fit 32-bit offsets")]
    BufferOverflow { slots: usize },

    #[error("Cannot {operation} in phase {found}, expected {expected}")]
    Phase {
        operation: &'static str,
        expected: &'static str,
        found: &'static str,
    },
}

impl MineError {
    pub fn config(message: impl Into<String>) -> Self {
        MineError::InvalidConfig(message.into())
    }

    pub fn environment(message: impl Into<String>) -> Self {
        MineError::Environment(message.into())
    }
}

pub type Result<T> = std::result::Result<T, MineError>;
