//! Strongly-typed rtnetlink notification payloads.
//!
//! Only the fields interface tracking needs are decoded; other attributes
//! are skipped.

mod address;
mod link;

pub use address::*;
pub use link::*;
