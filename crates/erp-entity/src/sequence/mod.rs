//! Sequence counter entities.

pub mod format;
pub mod model;

pub use format::format_sequence;
pub use model::{CreateSequence, Sequence, UpdateSequence};
