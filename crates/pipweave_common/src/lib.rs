//! Shared foundational types used across the pipweave interconnect fuzzer.
//!
//! This crate provides interned identifiers for tile, wire, PIP and pin names,
//! and the common internal result type.

#![warn(missing_docs)]

pub mod ident;
pub mod result;

pub use ident::{Ident, Interner};
pub use result::{InternalError, PipweaveResult};
