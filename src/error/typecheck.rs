//! This module contains the diagnostics that type checking an annotation
//! expression can produce.
//!
//! Every error is raised at exactly one site in the checker and aborts the
//! expression it occurred in: there is no recovery and no partial type. A
//! raised error travels as a [`Diagnostic`], which tags it with the source
//! range the driver should report it at. Conditions that a resolved host AST
//! can never produce (an unknown elementary type name, an ambiguous overload
//! after filtering) are fatal assertions in the checker rather than members
//! of this taxonomy.

use std::fmt::{Display, Formatter};

use serde::Serialize;
use thiserror::Error as ThisError;

use crate::{ast::SourceRange, types::Type};

/// The result type for methods that can raise a type checking diagnostic.
pub type Result<T> = std::result::Result<T, Diagnostic>;

/// The errors raised while checking an annotation expression.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, ThisError)]
#[serde(rename_all = "snake_case")]
pub enum Error {
    #[error("unknown identifier `{name}`")]
    UnknownId { name: String },

    #[error("type {base} has no member `{member}`")]
    NoField { base: Type, member: String },

    #[error("unexpected type {actual}: expected {expected}")]
    WrongType { actual: Type, expected: String },

    #[error("declaration of `{name}` has no resolvable type")]
    MissingHostType { name: String },

    #[error("expected {expected} expression(s), found {actual}")]
    CountMismatch { expected: usize, actual: usize },

    #[error("no candidate for `{callee}` accepts these arguments")]
    UnresolvedCall { callee: String },

    #[error("function `{callee}` does not return a value")]
    NoReturnValue { callee: String },

    #[error("arguments to `{callee}` do not match its parameters")]
    ArgumentMismatch { callee: String },

    #[error("types {left} and {right} are incompatible")]
    IncompatibleTypes { left: Type, right: Type },

    #[error("keyword `{keyword}` is not valid here")]
    InvalidKeyword { keyword: String },

    #[error("{feature} is not yet supported")]
    NotYetSupported { feature: String },
}

impl Error {
    /// Tags the error with the source range of the offending subexpression,
    /// turning it into a reportable [`Diagnostic`].
    #[must_use]
    pub fn at(self, range: impl Into<SourceRange>) -> Diagnostic {
        Diagnostic {
            range: range.into(),
            kind: self,
        }
    }
}

/// A failed check: the error that aborted an annotation expression, together
/// with the source range of the offending subexpression (or, for call
/// resolution failures, of the call).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, ThisError)]
#[error("{range}: {kind}")]
pub struct Diagnostic {
    /// Where in the annotation source to report the problem.
    pub range: SourceRange,

    /// What the problem is.
    pub kind: Error,
}

/// The diagnostics filed while checking a batch of annotation expressions.
///
/// Batch checking aborts each failing expression at its first error but
/// carries on with the remaining expressions, so a driver ends up with one
/// diagnostic per failing annotation. The collection keeps them ordered by
/// source range, not by the order the expressions were handed over in, since
/// that is the order a driver renders them in.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    sorted: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Files `diagnostic`, keeping the collection in source order.
    ///
    /// Diagnostics with identical ranges stay in the order they were filed.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        let at = self.sorted.partition_point(|d| d.range <= diagnostic.range);
        self.sorted.insert(at, diagnostic);
    }

    /// Views the diagnostics, in source order.
    #[must_use]
    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.sorted
    }

    /// Iterates the diagnostics, in source order.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.sorted.iter()
    }

    /// Gets the number of diagnostics filed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    /// Checks whether no diagnostic has been filed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.sorted.into_iter()
    }
}

/// Renders one diagnostic per line, in source order.
impl Display for Diagnostics {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.sorted.is_empty() {
            return write!(f, "no diagnostics");
        }
        for (i, diagnostic) in self.sorted.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{diagnostic}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostics {}
