//! Domain layer for PN records: the date value, the record model, field
//! predicates and the consistency engine deciding admission.

pub mod consistency;
pub mod date;
pub mod error;
pub mod record;
pub mod validation;

pub use date::{Date, DateError};
pub use error::RecordError;
pub use record::{Reason, Record, RecordInput};
