//! This library implements the type checker and name resolver for a
//! specification/annotation expression language layered on top of a
//! Solidity-like contract language. Annotations extend the host expression
//! grammar with `old(...)`, `$result`, `let .. in ..` bindings and the
//! logical implication `==>`, and may refer to anything in scope at the
//! annotation site.
//!
//! Note that this library neither parses the host language nor evaluates
//! annotations; it assigns types and reports precise diagnostics, and leaves
//! everything else to its caller.
//!
//! # How it Works
//!
//! From a very high level, checking an annotation proceeds as follows:
//!
//! 1. The driver describes the resolved host program as a [`sol::Namespace`]
//!    and the parsed annotation as nodes in an [`ast::ExprArena`].
//! 2. The driver builds a [`scope::TypingContext`]: the stack of lexical
//!    scopes at the annotation site (source units, the contract, and the
//!    function when the annotation sits on one).
//! 3. A [`TypeChecker`] walks the expression, resolving names against the
//!    context, ingesting host types into the [`types::Type`] algebra via
//!    [`types::ingest`], and recording the type of every node in its
//!    [`TypeCache`].
//! 4. Overload sets produced by name or member resolution are narrowed at
//!    their call sites, once the argument types are known.
//! 5. The first failure aborts the expression with a diagnostic from
//!    [`error::typecheck`] carrying the source range to report.
//!
//! # Basic Usage
//!
//! Describe the host program, build the annotation expression, and check it:
//!
//! ```
//! use annotation_typechecker::{
//!     ast::{BinaryOp, ExprArena},
//!     scope::TypingContext,
//!     sol::{ContractKind, Namespace, SolTypeName, Visibility},
//!     types::Type,
//!     TypeChecker,
//! };
//!
//! // contract Token { uint128 balance; }
//! let mut ns = Namespace::new();
//! let unit = ns.add_source_unit();
//! let token = ns.declare_contract(unit, "Token", ContractKind::Contract, vec![]);
//! ns.declare_state_var(
//!     token,
//!     "balance",
//!     SolTypeName::elementary("uint128"),
//!     None,
//!     Visibility::Internal,
//! );
//!
//! // The annotation `balance + 1`.
//! let mut arena = ExprArena::new();
//! let balance = arena.ident("balance", 0..7);
//! let one = arena.number(1, 10..11);
//! let sum = arena.binary(BinaryOp::Add, balance, one, 0..11);
//!
//! let ctx = TypingContext::new(vec![unit], token);
//! let mut checker = TypeChecker::new(&ns, &arena);
//! let ty = checker.check(sum, &ctx).expect("the annotation checks");
//!
//! assert_eq!(ty, Type::uint(128));
//! ```

#![warn(clippy::all, clippy::cargo, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)] // Allows for better API naming

pub mod ast;
pub mod builtins;
pub mod checker;
pub mod constant;
pub mod error;
pub mod scope;
pub mod sol;
pub mod types;

// Re-exports to provide the library interface.
pub use checker::{coerce::implicitly_castable, TypeCache, TypeChecker};
pub use types::{
    ingest::{despecialize, specialize, type_name_to_type, variable_to_type},
    DataLocation,
    Type,
};
