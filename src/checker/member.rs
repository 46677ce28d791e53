//! This module contains the typing rules for member access, dispatching on
//! the shape of the base type, with the `using for` library lookup as the
//! shared fallback.

use itertools::Itertools;

use crate::{
    ast::{Expr, ExprId},
    builtins,
    checker::TypeChecker,
    constant::{DEFAULT_INT_BITS, SELECTOR_WIDTH_BYTES},
    error::typecheck::{Error, Result},
    scope::TypingContext,
    sol::{ContractId, TypeDefRef},
    types::{
        ingest::{despecialize, type_name_to_type, variable_to_type},
        Callable,
        Type,
    },
};

impl TypeChecker<'_> {
    pub(super) fn check_member(
        &mut self,
        expr: &Expr,
        base: ExprId,
        member: &str,
        ctx: &TypingContext,
    ) -> Result<Type> {
        let base_ty = self.check(base, ctx)?;

        if let Some(ty) = self.member_of(expr, &base_ty, member)? {
            return Ok(ty);
        }

        // Nothing structural matched, so the member may be a library function
        // attached to the base's type by a `using for` directive.
        if let Some(ty) = self.using_for_member(&base_ty, base, member, ctx) {
            return Ok(ty);
        }

        Err(Error::NoField {
            base: base_ty,
            member: member.into(),
        }
        .at(expr.range))
    }

    /// Resolves `member` against the structure of `base_ty`, returning
    /// [`None`] when the base offers no such member structurally.
    fn member_of(&self, expr: &Expr, base_ty: &Type, member: &str) -> Result<Option<Type>> {
        let ns = self.ns;

        let resolved = match base_ty {
            Type::BuiltinStruct { members, .. } => members
                .iter()
                .find(|(name, _)| name == member)
                .map(|(_, ty)| ty.clone()),

            Type::Pointer { to, location } => match to.as_ref() {
                Type::Array { .. } if member == "length" => Some(Type::uint(DEFAULT_INT_BITS)),

                Type::UserDefined {
                    def: TypeDefRef::Struct(def),
                    ..
                } => {
                    let field = ns
                        .struct_decl(*def)
                        .fields
                        .iter()
                        .copied()
                        .find(|f| ns.variable(*f).name == member);
                    match field {
                        // Fields inherit the data location of the struct
                        // value they are read from.
                        Some(f) => Some(
                            variable_to_type(ns, f, Some(*location)).ok_or_else(|| {
                                Error::MissingHostType {
                                    name: member.into(),
                                }
                                .at(expr.range)
                            })?,
                        ),
                        None => None,
                    }
                }

                Type::UserDefined {
                    def: TypeDefRef::Contract(def),
                    ..
                } => self.contract_value_member(*def, member),

                _ => None,
            },

            Type::Address { .. } => builtins::address_member(member),

            Type::UserTypeName {
                def: TypeDefRef::Contract(def),
                ..
            } => {
                // Nested type names shadow the contract's functions here, so
                // `Lib.T` resolves to the type even when a function shares
                // its name.
                if let Some(nested) = ns.resolve_nested_type(*def, member) {
                    Some(Type::UserTypeName {
                        name: ns.qualified_name(nested),
                        def: nested,
                    })
                } else {
                    let functions = ns.resolve_functions(*def, member);
                    (!functions.is_empty()).then(|| {
                        Type::fun_set(functions.into_iter().map(Callable::Function).collect())
                    })
                }
            }

            Type::UserTypeName {
                def: TypeDefRef::Enum(def),
                ..
            } => {
                let decl = ns.enum_decl(*def);
                decl.members
                    .iter()
                    .any(|m| m == member)
                    .then(|| Type::UserDefined {
                        name: ns.qualified_name(TypeDefRef::Enum(*def)),
                        def: TypeDefRef::Enum(*def),
                    })
            }

            Type::FunctionSet { defs, .. } if defs.len() == 1 && member == "selector" => {
                Some(Type::fixed_bytes(SELECTOR_WIDTH_BYTES))
            }

            _ => None,
        };

        Ok(resolved)
    }

    /// Resolves `member` on a contract-typed value: the contract's functions
    /// first, then a getter for a public state variable, then the builtin
    /// address members.
    fn contract_value_member(&self, def: ContractId, member: &str) -> Option<Type> {
        let functions = self.ns.resolve_functions(def, member);
        if !functions.is_empty() {
            return Some(Type::fun_set(
                functions.into_iter().map(Callable::Function).collect(),
            ));
        }

        if let Some(var) = self.ns.resolve_public_state_var(def, member) {
            return Some(Type::fun_set(vec![Callable::Getter(var)]));
        }

        builtins::address_member(member)
    }

    /// Collects the library functions called `member` that some `using for`
    /// directive of the enclosing contract (or one of its bases) attaches to
    /// the base expression's type.
    ///
    /// A directive applies when it is unrestricted or when its target type
    /// equals the despecialized type of the base. The resulting overload set
    /// records the base expression as the receiver to prepend at the call
    /// site.
    fn using_for_member(
        &self,
        base_ty: &Type,
        base: ExprId,
        member: &str,
        ctx: &TypingContext,
    ) -> Option<Type> {
        let ns = self.ns;
        let general = despecialize(base_ty);

        let found: Vec<_> = ns
            .linearized(ctx.contract())
            .iter()
            .flat_map(|c| ns.contract(*c).using.iter())
            .filter(|directive| match &directive.target {
                None => true,
                Some(target) => type_name_to_type(ns, target) == general,
            })
            .flat_map(|directive| ns.contract(directive.library).functions.iter().copied())
            .filter(|f| ns.function(*f).name == member)
            .unique()
            .map(Callable::Function)
            .collect();

        (!found.is_empty()).then(|| Type::fun_set_with_receiver(found, base))
    }
}
