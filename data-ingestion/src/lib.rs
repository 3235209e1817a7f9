//! Input and output collaborators for the dataset builder.
//!
//! Readers turn the price, rate and sentiment CSV exports into typed
//! observations; the table sink writes finished datasets back to CSV.

mod error;
pub mod sinks;
pub mod sources;

pub use error::{IngestError, IngestResult};
