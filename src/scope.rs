//! This module contains the typing context — the ordered stack of lexical
//! scopes an annotation expression is checked in — and the name lookups that
//! walk it.
//!
//! The stack always starts with the global scope (a set of source units)
//! followed by a contract scope; the driver pushes a function scope when the
//! annotation sits on a function, and the checker itself pushes a scope for
//! every `let` binding it descends into.

use itertools::Itertools;

use crate::{
    ast::{ExprArena, ExprId, ExprKind},
    sol::{ContractId, FunctionId, Namespace, SourceUnitId, TypeDefRef, VarId},
};

/// One entry of the scope stack.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Scope {
    /// The global scope, exposing the top-level declarations of a set of
    /// source units. No variables live here.
    Units(Vec<SourceUnitId>),

    /// A contract scope, exposing the state variables, nested types and
    /// functions of the contract and its linearized bases.
    Contract(ContractId),

    /// A function scope, exposing the function's parameters and returns.
    Function(FunctionId),

    /// A `let` scope, exposing the names bound by the given `let` node.
    Let(ExprId),
}

/// The ordered scope stack, outermost scope first.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TypingContext {
    scopes: Vec<Scope>,
}

impl TypingContext {
    /// Creates a context for an annotation on `contract`, with the global
    /// scope exposing `units`.
    #[must_use]
    pub fn new(units: Vec<SourceUnitId>, contract: ContractId) -> Self {
        Self {
            scopes: vec![Scope::Units(units), Scope::Contract(contract)],
        }
    }

    /// Extends the context with a scope for `function`, for annotations that
    /// sit on a function of the contract.
    #[must_use]
    pub fn enter_function(&self, function: FunctionId) -> Self {
        let mut extended = self.clone();
        extended.scopes.push(Scope::Function(function));
        extended
    }

    /// Extends the context with a scope for the bindings of the `let` node
    /// `binding`.
    #[must_use]
    pub(crate) fn enter_let(&self, binding: ExprId) -> Self {
        let mut extended = self.clone();
        extended.scopes.push(Scope::Let(binding));
        extended
    }

    /// Iterates the scopes innermost first, which is the order every lookup
    /// searches them in.
    pub fn scopes(&self) -> impl Iterator<Item = &Scope> {
        self.scopes.iter().rev()
    }

    /// Gets the innermost scope.
    ///
    /// # Panics
    ///
    /// Never panics in practice, as a context cannot be constructed empty.
    #[must_use]
    pub fn innermost(&self) -> &Scope {
        self.scopes.last().expect("context is never empty")
    }

    /// Gets the contract the annotation is attached to.
    ///
    /// # Panics
    ///
    /// Never panics in practice, as every constructor includes a contract
    /// scope.
    #[must_use]
    pub fn contract(&self) -> ContractId {
        self.scopes()
            .find_map(|s| match s {
                Scope::Contract(c) => Some(*c),
                _ => None,
            })
            .expect("context always contains a contract scope")
    }

    /// Renders the scope stack for use in diagnostic headers, outermost
    /// scope first.
    #[must_use]
    pub fn describe(&self, ns: &Namespace, arena: &ExprArena) -> String {
        self.scopes
            .iter()
            .map(|scope| match scope {
                Scope::Units(units) => format!("{} source unit(s)", units.len()),
                Scope::Contract(c) => format!("contract {}", ns.contract(*c).name),
                Scope::Function(f) => {
                    let decl = ns.function(*f);
                    format!(
                        "function {}.{}",
                        ns.contract(decl.contract).name,
                        decl.name
                    )
                }
                Scope::Let(node) => match &arena.get(*node).kind {
                    ExprKind::Let { names, .. } => {
                        format!("let {}", names.iter().join(", "))
                    }
                    _ => "let".to_string(),
                },
            })
            .join(" > ")
    }
}

/// The result of a successful variable lookup.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum VarLookup {
    /// A host-language variable declaration.
    Host(VarId),

    /// The binding at `index` of the `let` node `binding`.
    LetBinding { binding: ExprId, index: usize },
}

/// The declaration site an identifier resolved to, recorded per identifier
/// node during checking.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DefSite {
    /// A host-language variable declaration.
    Var(VarId),

    /// The binding at `index` of the `let` node `binding`.
    LetBinding { binding: ExprId, index: usize },

    /// The `this` keyword.
    This,

    /// The name of one or more functions of the enclosing contract.
    FunctionName,

    /// The name of a user-defined type.
    TypeName,
}

/// Searches the context for a variable called `name`, innermost scope first.
///
/// Function scopes expose parameters before returns; contract scopes expose
/// the state variables of the whole linearized base chain; the global scope
/// exposes no variables.
#[must_use]
pub fn lookup_var(
    ns: &Namespace,
    arena: &ExprArena,
    ctx: &TypingContext,
    name: &str,
) -> Option<VarLookup> {
    if name.is_empty() {
        return None;
    }

    for scope in ctx.scopes() {
        match scope {
            Scope::Units(_) => (),
            Scope::Contract(c) => {
                if let Some(v) = ns.resolve_state_var(*c, name) {
                    return Some(VarLookup::Host(v));
                }
            }
            Scope::Function(f) => {
                let decl = ns.function(*f);
                let found = decl
                    .params
                    .iter()
                    .chain(decl.returns.iter())
                    .copied()
                    .find(|v| ns.variable(*v).name == name);
                if let Some(v) = found {
                    return Some(VarLookup::Host(v));
                }
            }
            Scope::Let(node) => {
                let ExprKind::Let { names, .. } = &arena.get(*node).kind else {
                    unreachable!("let scope always refers to a let node");
                };
                if let Some(index) = names.iter().position(|n| n == name) {
                    return Some(VarLookup::LetBinding {
                        binding: *node,
                        index,
                    });
                }
            }
        }
    }

    None
}

/// Searches the context for a user-defined type called `name`, innermost
/// scope first. Function and `let` scopes declare no types and are skipped.
///
/// Contract scopes expose the structs and enums of the linearized base
/// chain; the global scope exposes each unit's top-level structs, enums and
/// then contracts.
#[must_use]
pub fn resolve_type_name(ns: &Namespace, ctx: &TypingContext, name: &str) -> Option<TypeDefRef> {
    for scope in ctx.scopes() {
        match scope {
            Scope::Function(_) | Scope::Let(_) => (),
            Scope::Contract(c) => {
                if let Some(def) = ns.resolve_nested_type(*c, name) {
                    return Some(def);
                }
            }
            Scope::Units(units) => {
                for unit in units {
                    let unit = ns.source_unit(*unit);
                    if let Some(s) = unit
                        .structs
                        .iter()
                        .copied()
                        .find(|s| ns.struct_decl(*s).name == name)
                    {
                        return Some(TypeDefRef::Struct(s));
                    }
                    if let Some(e) = unit
                        .enums
                        .iter()
                        .copied()
                        .find(|e| ns.enum_decl(*e).name == name)
                    {
                        return Some(TypeDefRef::Enum(e));
                    }
                    if let Some(c) = unit
                        .contracts
                        .iter()
                        .copied()
                        .find(|c| ns.contract(*c).name == name)
                    {
                        return Some(TypeDefRef::Contract(c));
                    }
                }
            }
        }
    }

    None
}
