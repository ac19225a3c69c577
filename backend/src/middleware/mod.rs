//! Request middleware.
//!
//! Purpose: scope a trace identifier around each request.

pub mod trace;

pub use trace::Trace;
