//! Shared foundational types used across the strata hierarchy engine.
//!
//! This crate provides interned identifiers and the fatal internal-error type
//! that every stage of scope construction and rebasing reports through.

#![warn(missing_docs)]

pub mod ident;
pub mod result;

pub use ident::{Ident, Interner};
pub use result::{InternalError, StrataResult};
