//! Request middleware.
//!
//! Purpose: Attach a trace identifier to every request so logs and error
//! payloads can be correlated.

pub mod trace;

pub use trace::Trace;
