//! This module contains the typing rules for calls, covering casts through
//! type literals, struct constructors, calls of function-typed values, and
//! the narrowing of overload sets to the single definition that accepts the
//! call's arguments.

use itertools::Itertools;

use crate::{
    ast::{Expr, ExprId},
    checker::{coerce, TypeChecker},
    error::typecheck::{Error, Result},
    scope::TypingContext,
    sol::{SolTypeName, TypeDefRef},
    types::{ingest::variable_to_type, Callable, DataLocation, Type},
};

impl TypeChecker<'_> {
    pub(super) fn check_call(
        &mut self,
        expr: &Expr,
        callee: ExprId,
        args: &[ExprId],
        ctx: &TypingContext,
    ) -> Result<Type> {
        let callee_ty = self.check(callee, ctx)?;

        match callee_ty {
            // A cast through a builtin type literal, e.g. `uint64(x)`. The
            // argument is still checked so that its subexpressions land in
            // the cache, but the result is the named type unconditionally.
            Type::TypeName { inner } => {
                self.expect_arg_count(expr, args, 1)?;
                self.check_args(args, ctx)?;
                Ok(*inner)
            }

            Type::UserTypeName { name, def } => {
                let result = match def {
                    // A struct constructor builds a fresh value in memory.
                    TypeDefRef::Struct(_) => {
                        self.check_args(args, ctx)?;
                        Type::pointer(
                            Type::UserDefined { name, def },
                            DataLocation::Memory,
                        )
                    }
                    // A contract cast reinterprets an address-like argument.
                    TypeDefRef::Contract(_) => {
                        self.expect_arg_count(expr, args, 1)?;
                        self.check_args(args, ctx)?;
                        Type::pointer(
                            Type::UserDefined { name, def },
                            DataLocation::Storage,
                        )
                    }
                    // Enums are value types, so the cast result carries no
                    // data location.
                    TypeDefRef::Enum(_) => {
                        self.expect_arg_count(expr, args, 1)?;
                        self.check_args(args, ctx)?;
                        Type::UserDefined { name, def }
                    }
                };
                Ok(result)
            }

            Type::FunctionSet { defs, default_arg } => {
                self.narrow_overloads(expr, callee, &defs, default_arg, args, ctx)
            }

            Type::Function {
                params, returns, ..
            } => {
                if args.len() != params.len() {
                    return Err(Error::CountMismatch {
                        expected: params.len(),
                        actual: args.len(),
                    }
                    .at(expr.range));
                }
                let arg_types = self.check_args(args, ctx)?;
                let accepted = arg_types
                    .iter()
                    .zip(params.iter())
                    .all(|(actual, formal)| coerce::implicitly_castable(actual, formal));
                if !accepted {
                    return Err(Error::ArgumentMismatch {
                        callee: self.arena.render(callee),
                    }
                    .at(expr.range));
                }
                self.returns_to_type(expr, callee, returns)
            }

            other => Err(Error::WrongType {
                actual: other,
                expected: "a callable expression".into(),
            }
            .at(self.arena.get(callee).range)),
        }
    }

    /// Narrows an overload set to the single candidate that accepts the
    /// call's arguments, rewrites the cached callee type to the narrowed
    /// set, and produces the call's result type.
    ///
    /// When the set carries a receiver from a `using for` lookup, the
    /// receiver is prepended to the argument list before matching.
    ///
    /// # Panics
    ///
    /// Panics when more than one candidate accepts the arguments; the host
    /// language rejects such programs, so a resolved host AST cannot produce
    /// this situation.
    fn narrow_overloads(
        &mut self,
        expr: &Expr,
        callee: ExprId,
        defs: &[Callable],
        default_arg: Option<ExprId>,
        args: &[ExprId],
        ctx: &TypingContext,
    ) -> Result<Type> {
        let actuals: Vec<ExprId> = default_arg.into_iter().chain(args.iter().copied()).collect();
        let actual_types = self.check_args(&actuals, ctx)?;

        let survivors: Vec<Callable> = defs
            .iter()
            .copied()
            .filter(|candidate| match candidate {
                Callable::Function(f) => {
                    let params = &self.ns.function(*f).params;
                    params.len() == actual_types.len()
                        && params.iter().zip(actual_types.iter()).all(|(p, actual)| {
                            variable_to_type(self.ns, *p, None)
                                .is_some_and(|formal| coerce::implicitly_castable(actual, &formal))
                        })
                }
                // A getter takes no arguments.
                Callable::Getter(_) => actual_types.is_empty(),
            })
            .collect();

        let chosen = match survivors.as_slice() {
            [] => {
                return Err(Error::UnresolvedCall {
                    callee: self.arena.render(callee),
                }
                .at(expr.range));
            }
            [only] => *only,
            many => panic!(
                "call of `{}` is ambiguous between {} candidates",
                self.arena.render(callee),
                many.len()
            ),
        };

        // Narrow the callee's cached type to the surviving definition, so
        // later consumers see a resolved set.
        self.cache.record_type(
            callee,
            Type::FunctionSet {
                defs: vec![chosen],
                default_arg,
            },
        );

        match chosen {
            Callable::Function(f) => {
                let returns = self.ns.function(f).returns.clone();
                let return_types = returns
                    .iter()
                    .map(|r| {
                        variable_to_type(self.ns, *r, None).ok_or_else(|| {
                            Error::MissingHostType {
                                name: self.ns.function(f).name.clone(),
                            }
                            .at(expr.range)
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                match return_types.len() {
                    0 => Err(Error::NoReturnValue {
                        callee: self.arena.render(callee),
                    }
                    .at(expr.range)),
                    1 => Ok(return_types.into_iter().next().expect("length checked")),
                    _ => Ok(Type::tuple(return_types)),
                }
            }
            Callable::Getter(var) => {
                let decl = self.ns.variable(var);
                if matches!(decl.type_name, Some(SolTypeName::UserDefined { .. })) {
                    return Err(Error::NotYetSupported {
                        feature: "getters of user-defined-typed state variables".into(),
                    }
                    .at(expr.range));
                }
                variable_to_type(self.ns, var, None).ok_or_else(|| {
                    Error::MissingHostType {
                        name: decl.name.clone(),
                    }
                    .at(expr.range)
                })
            }
        }
    }

    /// Turns the ingested return types of a function-typed callee into the
    /// call's result type.
    fn returns_to_type(&self, expr: &Expr, callee: ExprId, returns: Vec<Type>) -> Result<Type> {
        match returns.len() {
            0 => Err(Error::NoReturnValue {
                callee: self.arena.render(callee),
            }
            .at(expr.range)),
            1 => Ok(returns.into_iter().next().expect("length checked")),
            _ => Ok(Type::tuple(returns)),
        }
    }

    fn check_args(&mut self, args: &[ExprId], ctx: &TypingContext) -> Result<Vec<Type>> {
        args.iter().map(|a| self.check(*a, ctx)).try_collect()
    }

    fn expect_arg_count(&self, expr: &Expr, args: &[ExprId], expected: usize) -> Result<()> {
        if args.len() == expected {
            Ok(())
        } else {
            Err(Error::CountMismatch {
                expected,
                actual: args.len(),
            }
            .at(expr.range))
        }
    }
}
