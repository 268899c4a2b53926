//! Core types shared across the viewfilter crates
//!
//! - **Correlation**: `RequestId` identifying a single projection call
//! - **Schema constants**: canonical field keys and event names for
//!   structured logging

pub mod correlation;
pub mod schema;

pub use correlation::RequestId;
