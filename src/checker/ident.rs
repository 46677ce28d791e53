//! This module contains the resolution of bare identifiers and of the
//! `$result` keyword.
//!
//! An identifier is tried against the possible meanings in a fixed order,
//! and the first meaning that applies wins: the `this` keyword, a builtin
//! type token, a variable in scope, a function of the enclosing contract, a
//! user-defined type in scope, and finally a builtin symbol. The winning
//! meaning also determines the def-site annotation stamped onto the node.

use crate::{
    ast::{Expr, ExprId, ExprKind},
    builtins,
    checker::TypeChecker,
    error::typecheck::{Error, Result},
    scope::{self, DefSite, Scope, TypingContext, VarLookup},
    sol::{TypeDefRef, VarId},
    types::{ingest, Callable, DataLocation, Type},
};

impl TypeChecker<'_> {
    pub(super) fn check_ident(
        &mut self,
        expr: &Expr,
        name: &str,
        ctx: &TypingContext,
    ) -> Result<Type> {
        if name == "this" {
            let contract = ctx.contract();
            self.cache.record_def_site(expr.id, DefSite::This);
            return Ok(Type::pointer(
                Type::UserDefined {
                    name: self.ns.contract(contract).name.clone(),
                    def: TypeDefRef::Contract(contract),
                },
                DataLocation::Storage,
            ));
        }

        if let Some(ty) = builtins::type_name(name) {
            return Ok(ty);
        }

        if let Some(found) = scope::lookup_var(self.ns, self.arena, ctx, name) {
            return match found {
                VarLookup::Host(var) => {
                    self.cache.record_def_site(expr.id, DefSite::Var(var));
                    ingest::variable_to_type(self.ns, var, None).ok_or_else(|| {
                        Error::MissingHostType { name: name.into() }.at(expr.range)
                    })
                }
                VarLookup::LetBinding { binding, index } => {
                    self.cache
                        .record_def_site(expr.id, DefSite::LetBinding { binding, index });
                    self.let_binding_type(binding, index, ctx)
                }
            };
        }

        let functions = self.ns.resolve_functions(ctx.contract(), name);
        if !functions.is_empty() {
            self.cache.record_def_site(expr.id, DefSite::FunctionName);
            return Ok(Type::fun_set(
                functions.into_iter().map(Callable::Function).collect(),
            ));
        }

        if let Some(def) = scope::resolve_type_name(self.ns, ctx, name) {
            self.cache.record_def_site(expr.id, DefSite::TypeName);
            return Ok(Type::UserTypeName {
                name: self.ns.qualified_name(def),
                def,
            });
        }

        if let Some(ty) = builtins::symbol(name) {
            return Ok(ty);
        }

        Err(Error::UnknownId { name: name.into() }.at(expr.range))
    }

    /// Computes the type bound to position `index` of the `let` node
    /// `binding`: the matching tuple element when the right-hand side is a
    /// tuple, and the whole right-hand type otherwise.
    fn let_binding_type(
        &mut self,
        binding: ExprId,
        index: usize,
        ctx: &TypingContext,
    ) -> Result<Type> {
        let arena = self.arena;
        let ExprKind::Let { names, rhs, .. } = &arena.get(binding).kind else {
            unreachable!("let binding always refers to a let node");
        };

        // The right-hand side was already checked when the binding's scope
        // was entered, so this is a cache lookup.
        let rhs_ty = self.check(*rhs, ctx)?;
        match rhs_ty {
            Type::Tuple { elements } if elements.len() == names.len() => {
                Ok(elements[index].clone())
            }
            other => Ok(other),
        }
    }

    pub(super) fn check_result(&mut self, expr: &Expr, ctx: &TypingContext) -> Result<Type> {
        let Scope::Function(function) = ctx.innermost() else {
            return Err(Error::InvalidKeyword {
                keyword: "$result".into(),
            }
            .at(expr.range));
        };

        let decl = self.ns.function(*function);
        let ingest_return = |var: &VarId| {
            ingest::variable_to_type(self.ns, *var, None).ok_or_else(|| {
                Error::MissingHostType {
                    name: decl.name.clone(),
                }
                .at(expr.range)
            })
        };

        match decl.returns.as_slice() {
            [] => Err(Error::NoReturnValue {
                callee: decl.name.clone(),
            }
            .at(expr.range)),
            [only] => ingest_return(only),
            many => Ok(Type::tuple(
                many.iter().map(ingest_return).collect::<Result<Vec<_>>>()?,
            )),
        }
    }
}
