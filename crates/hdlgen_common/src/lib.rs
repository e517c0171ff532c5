//! Shared foundational types used across the hdlgen workspace.
//!
//! This crate provides the error taxonomy raised by model construction and
//! rendering, and the [`Polarity`] of clock edges and control signals.

#![warn(missing_docs)]

pub mod polarity;
pub mod result;

pub use polarity::Polarity;
pub use result::{RtlError, RtlResult};
