// Array module - flattened, position-addressed FP-arrays and their seeds

mod flatten;
mod types;

pub use flatten::{flatten, FlattenedTree, GroupArrays};
pub use types::{Candidate, ElePos, FpArray, FpArrayEntry, NO_PARENT};
