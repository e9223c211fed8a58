//! Field extraction and record assembly
//!
//! A record shape is a table of [`FieldDescriptor`]s. One generic routine,
//! [`extract`], walks each descriptor through locate → parse → default, and
//! [`RecordBuilder`] applies the whole table to a detail document.

mod field;
mod record;

pub use field::{
    extract, try_extract, FieldDescriptor, FieldError, FieldParser, FieldSource, FieldValue,
    NOT_AVAILABLE,
};
pub use record::{fields, Record, RecordBuilder};
