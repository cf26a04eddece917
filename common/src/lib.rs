//! Job model shared by the distributed and sequential runners: the map and
//! reduce functions of each analysis job and the errors of the pipeline.

pub mod apps;
pub mod error;

pub use apps::{reduce, FinalResult, Frequencies, JobKind, WORD_COUNT_KEY};
pub use error::{Error, Result};
