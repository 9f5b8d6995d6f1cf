//! Test modules for the scanner core
//!
//! Everything runs against the in-memory backend; see `helpers` for the
//! shared fixtures.

pub mod helpers;

mod codec;
