//! This module contains the error types for the library: the closed taxonomy
//! of type checking errors, the [`typecheck::Diagnostic`] pairing an error
//! with the source range to report it at, and the [`typecheck::Diagnostics`]
//! collection a batch check files its failures into.
//!
//! A single expression check returns at most one diagnostic — the first
//! error raised aborts the expression — while batch checking files one
//! diagnostic per failing expression, kept in source order.

pub mod typecheck;

pub use typecheck::{Diagnostic, Diagnostics};
