//! Shared domain types for the announcement dataset workspace.
//!
//! Price, rate and sentiment observations, the `InstrumentId` tag that
//! replaces one-hot index columns internally, and the date-keyed `Table`
//! every stage hands to the next.

pub mod columns;
pub mod instrument;
pub mod observation;
pub mod table;

pub use instrument::{IndicatorResolution, InstrumentId};
pub use observation::{PriceObservation, RateObservation, SentimentTable};
pub use table::{Table, TableRow, UnknownColumn};

pub use chrono::NaiveDate;
